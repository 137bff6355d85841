//! Matrix math for projection, model and world transforms.
//!
//! All matrices are `cgmath::Matrix4<f32>`, stored column-major, which is the
//! layout the WGSL shader expects for a `mat4x4<f32>` uniform. Nothing in this
//! module touches the GPU.

use cgmath::{InnerSpace, Matrix4, Rad, SquareMatrix, Vector3};

/// Vertical field of view of every projection.
pub const FOV_DEGREES: f32 = 45.0;
pub const Z_NEAR: f32 = 0.1;
pub const Z_FAR: f32 = 100.0;

/// Number of floats in one 4x4 matrix uniform.
pub const MATRIX_FLOATS: usize = 16;

/// cgmath builds OpenGL clip space (z in -1..1), wgpu expects z in 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// A rotation by `radians` about `axis`. The axis does not need to be normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    pub radians: f32,
    pub axis: Vector3<f32>,
}

impl Rotation {
    pub fn new(radians: f32, axis: Vector3<f32>) -> Self {
        Self { radians, axis }
    }

    pub fn from_degrees(degrees: f32, axis: Vector3<f32>) -> Self {
        Self {
            radians: degrees.to_radians(),
            axis,
        }
    }

    /// The rotation as a matrix, or `None` when the axis has no direction.
    fn to_matrix(self) -> Option<Matrix4<f32>> {
        if self.axis.magnitude2() <= f32::EPSILON {
            return None;
        }
        Some(Matrix4::from_axis_angle(
            self.axis.normalize(),
            Rad(self.radians),
        ))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Translation {
    pub vector: Vector3<f32>,
}

impl Translation {
    pub fn new(vector: Vector3<f32>) -> Self {
        Self { vector }
    }
}

impl From<Vector3<f32>> for Translation {
    fn from(vector: Vector3<f32>) -> Self {
        Self { vector }
    }
}

/// Perspective projection with a 45° field of view and `width / height` aspect.
///
/// Both sides are clamped to at least one pixel, so a zero-sized surface
/// yields a finite matrix instead of a panic.
pub fn create_projection_matrix(width: u32, height: u32) -> Matrix4<f32> {
    let aspect = width.max(1) as f32 / height.max(1) as f32;
    OPENGL_TO_WGPU_MATRIX
        * cgmath::perspective(cgmath::Deg(FOV_DEGREES), aspect, Z_NEAR, Z_FAR)
}

/// Identity, translated first and then rotated about the translated origin.
pub fn create_model_matrix(rotation: &Rotation, translation: &Translation) -> Matrix4<f32> {
    let mut matrix = Matrix4::identity();
    translate_in_place(&mut matrix, translation);
    rotate_in_place(&mut matrix, rotation);
    matrix
}

/// Right-multiplies `matrix` by the rotation, keeping prior transforms.
///
/// A zero-length axis leaves the matrix untouched.
pub fn rotate_in_place(matrix: &mut Matrix4<f32>, rotation: &Rotation) {
    if let Some(rotation) = rotation.to_matrix() {
        *matrix = *matrix * rotation;
    }
}

/// Right-multiplies `matrix` by the translation, keeping prior transforms.
pub fn translate_in_place(matrix: &mut Matrix4<f32>, translation: &Translation) {
    *matrix = *matrix * Matrix4::from_translation(translation.vector);
}

/// `projection × model_view`.
pub fn compose_transform(projection: &Matrix4<f32>, model_view: &Matrix4<f32>) -> Matrix4<f32> {
    *projection * *model_view
}

/// Flattens a matrix into the 16 column-major floats uploaded to the GPU.
pub fn to_floats(matrix: &Matrix4<f32>) -> [f32; MATRIX_FLOATS] {
    let flat: &[f32; MATRIX_FLOATS] = matrix.as_ref();
    *flat
}

/// Projection for a `width × height` surface times the model-view built from
/// `rotation` and `translation`, flattened for upload.
pub fn transformation_matrix(
    width: u32,
    height: u32,
    rotation: &Rotation,
    translation: &Translation,
) -> [f32; MATRIX_FLOATS] {
    let projection = create_projection_matrix(width, height);
    let model_view = create_model_matrix(rotation, translation);
    to_floats(&compose_transform(&projection, &model_view))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_axis_rotation_is_ignored() {
        let mut matrix = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        let before = matrix;
        rotate_in_place(&mut matrix, &Rotation::new(1.0, Vector3::new(0.0, 0.0, 0.0)));
        assert_eq!(matrix, before);
    }

    #[test]
    fn flattening_is_column_major() {
        let matrix = Matrix4::from_translation(Vector3::new(4.0, 5.0, 6.0));
        let floats = to_floats(&matrix);
        assert_eq!(&floats[12..15], &[4.0, 5.0, 6.0]);
        assert_eq!(floats[15], 1.0);
    }
}
