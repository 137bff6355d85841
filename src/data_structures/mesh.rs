//! Mesh data: the fixed vertex layout and the built-in mesh table.
//!
//! Every vertex is 8 interleaved floats: a homogeneous position (x, y, z, w)
//! followed by an RGBA color. Meshes are unindexed triangle lists unless an
//! index list is attached.

use std::mem;

/// Floats per vertex: 4 position + 4 color.
pub const FLOATS_PER_VERTEX: usize = 8;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 4],
    pub color: [f32; 4],
}

impl Vertex for ColorVertex {
    /**
     * stride: 32 bytes per vertex, advanced per vertex.
     * position: @location(0), offset 0
     * color: @location(1), offset 16
     */
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Raw vertex values of one body, optionally indexed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<f32>,
    indices: Option<Vec<u16>>,
}

impl Mesh {
    pub fn new(vertices: Vec<f32>) -> Self {
        Self {
            vertices,
            indices: None,
        }
    }

    pub fn indexed(vertices: Vec<f32>, indices: Vec<u16>) -> Self {
        Self {
            vertices,
            indices: Some(indices),
        }
    }

    pub fn from_vertices(vertices: &[ColorVertex]) -> Self {
        Self::new(bytemuck::cast_slice::<ColorVertex, f32>(vertices).to_vec())
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> Option<&[u16]> {
        self.indices.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / FLOATS_PER_VERTEX
    }
}

/// Named body types and their meshes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyType {
    /// 36-vertex cube, one color per face.
    ColorCube,
    /// The same cube as 24 vertices and 36 indices.
    IndexedColorCube,
}

impl BodyType {
    pub fn mesh(self) -> Mesh {
        match self {
            BodyType::ColorCube => color_cube(),
            BodyType::IndexedColorCube => indexed_color_cube(),
        }
    }
}

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
const GREEN: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
const YELLOW: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
const PURPLE: [f32; 4] = [1.0, 0.0, 1.0, 1.0];

fn color_cube() -> Mesh {
    #[rustfmt::skip]
    let faces: [([f32; 4], [[f32; 3]; 6]); 6] = [
        (WHITE, [
            [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0],
            [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, -1.0],
        ]),
        (RED, [
            [1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [1.0, -1.0, -1.0],
            [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, -1.0],
        ]),
        (GREEN, [
            [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0],
            [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, -1.0],
        ]),
        (BLUE, [
            [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0],
            [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, -1.0],
        ]),
        (YELLOW, [
            [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0],
            [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0],
        ]),
        (PURPLE, [
            [1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0],
            [1.0, 1.0, -1.0], [1.0, -1.0, -1.0], [-1.0, 1.0, -1.0],
        ]),
    ];
    let vertices: Vec<ColorVertex> = faces
        .iter()
        .flat_map(|(color, corners)| {
            corners.iter().map(move |&[x, y, z]| ColorVertex {
                position: [x, y, z, 1.0],
                color: *color,
            })
        })
        .collect();
    Mesh::from_vertices(&vertices)
}

fn indexed_color_cube() -> Mesh {
    #[rustfmt::skip]
    let faces: [([f32; 4], [[f32; 3]; 4]); 6] = [
        // front
        (WHITE, [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
        // back
        (RED, [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]]),
        // top
        (GREEN, [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]]),
        // bottom
        (BLUE, [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]]),
        // right
        (YELLOW, [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]]),
        // left
        (PURPLE, [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]]),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (face, (color, corners)) in faces.iter().enumerate() {
        let base = (face * 4) as u16;
        vertices.extend(corners.iter().map(|&[x, y, z]| ColorVertex {
            position: [x, y, z, 1.0],
            color: *color,
        }));
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    Mesh::indexed(bytemuck::cast_slice::<ColorVertex, f32>(&vertices).to_vec(), indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_layout_matches_the_raw_stride() {
        let layout = ColorVertex::desc();
        assert_eq!(layout.array_stride, (FLOATS_PER_VERTEX * 4) as u64);
        assert_eq!(layout.attributes[1].offset, 16);
    }

    #[test]
    fn cubes_describe_twelve_triangles() {
        let cube = BodyType::ColorCube.mesh();
        assert_eq!(cube.vertex_count(), 36);
        assert!(cube.indices().is_none());

        let indexed = BodyType::IndexedColorCube.mesh();
        assert_eq!(indexed.vertex_count(), 24);
        assert_eq!(indexed.indices().map(<[u16]>::len), Some(36));
    }
}
