#![allow(dead_code)]

use approx::assert_abs_diff_eq;
use body_ngin::{
    Body, BodyType, World,
    cgmath::{Matrix4, Vector3},
    recording::{GpuOp, Handle, RecordingBackend},
};

pub(crate) type TestBody = Body<RecordingBackend>;

pub(crate) fn recording_world() -> World<RecordingBackend> {
    World::new(RecordingBackend::new()).unwrap()
}

pub(crate) fn cube_at(x: f32, y: f32, z: f32) -> TestBody {
    let mut body = Body::of_type(BodyType::ColorCube);
    body.translate(Vector3::new(x, y, z));
    body
}

/// Handle of the body's model uniform. The body must be bound.
pub(crate) fn model_handle(body: &TestBody) -> Handle {
    body.renderable().unwrap().model_uniform.handle()
}

pub(crate) fn assert_floats_eq(actual: &[f32], expected: &[f32]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_abs_diff_eq!(*a, *e, epsilon = 1e-5);
    }
}

pub(crate) fn assert_matrix_eq(actual: &Matrix4<f32>, expected: &Matrix4<f32>) {
    let actual: &[f32; 16] = actual.as_ref();
    let expected: &[f32; 16] = expected.as_ref();
    assert_floats_eq(actual, expected);
}

pub(crate) fn count_passes(ops: &[GpuOp]) -> usize {
    ops.iter()
        .filter(|op| matches!(op, GpuOp::RenderPass { .. }))
        .count()
}
