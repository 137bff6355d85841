mod common;

use body_ngin::{
    Backend, Body, BodyType, EngineError, Mesh, Renderable, StateError,
    cgmath::{Matrix4, Vector3, Vector4},
    math,
    recording::{GpuOp, RecordingBackend},
};

use crate::common::test_utils::{assert_floats_eq, cube_at, model_handle};

#[test]
fn binding_twice_returns_the_cached_renderable() {
    let engine = RecordingBackend::new();
    let mut body = Body::of_type(BodyType::ColorCube);

    let first: *const Renderable<RecordingBackend> = body.get_renderable(&engine).unwrap();
    let second: *const Renderable<RecordingBackend> = body.get_renderable(&engine).unwrap();
    assert!(std::ptr::eq(first, second));

    let ops = engine.ops();
    assert_eq!(ops.len(), 2);
    assert!(matches!(
        ops[0],
        GpuOp::CreateVertices {
            vertex_count: 36,
            index_count: None,
            ..
        }
    ));
    assert!(matches!(
        ops[1],
        GpuOp::CreateUniform {
            size_in_floats: 16,
            group: 1,
            binding: 0,
            ..
        }
    ));
}

#[test]
fn update_before_binding_fails_without_writing() {
    let engine = RecordingBackend::new();
    let body: Body<RecordingBackend> = Body::of_type(BodyType::ColorCube);

    let err = body.update().unwrap_err();
    assert!(matches!(
        err,
        EngineError::State(StateError::Unbound(id)) if id == body.id()
    ));
    assert!(engine.ops().is_empty());
}

#[test]
fn binding_to_a_second_engine_is_rejected() {
    let first = RecordingBackend::new();
    let second = RecordingBackend::new();
    let mut body = Body::of_type(BodyType::ColorCube);
    body.get_renderable(&first).unwrap();

    let err = body.get_renderable(&second).unwrap_err();
    match err {
        EngineError::State(StateError::BoundToOtherEngine {
            body: id,
            bound,
            requested,
        }) => {
            assert_eq!(id, body.id());
            assert_eq!(bound, first.id());
            assert_eq!(requested, second.id());
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(second.ops().is_empty());
    // the first binding is still usable
    body.update().unwrap();
}

#[test]
fn update_writes_the_model_matrix() {
    let engine = RecordingBackend::new();
    let mut body = cube_at(1.0, 2.0, 3.0);
    body.get_renderable(&engine).unwrap();
    body.rotate(15.0, Vector3::new(0.0, 1.0, 0.0));

    body.update().unwrap();

    let written = engine.last_write(model_handle(&body)).unwrap();
    assert_floats_eq(&written, &math::to_floats(body.model_matrix()));
}

#[test]
fn indexed_meshes_upload_their_indices() {
    let engine = RecordingBackend::new();
    let mut body = Body::of_type(BodyType::IndexedColorCube);
    body.get_renderable(&engine).unwrap();

    assert!(matches!(
        engine.ops()[0],
        GpuOp::CreateVertices {
            vertex_count: 24,
            index_count: Some(36),
            ..
        }
    ));
}

#[test]
fn position_keeps_the_orientation() {
    let mut body: Body<RecordingBackend> = Body::new(Mesh::default());
    body.rotate(90.0, Vector3::new(0.0, 0.0, 1.0));
    let rotated_x = body.model_matrix().x;

    body.position(Vector3::new(-6.0, 2.0, 10.0));

    assert_eq!(body.model_matrix().x, rotated_x);
    assert_eq!(body.model_matrix().w, Vector4::new(-6.0, 2.0, 10.0, 1.0));
}

#[test]
fn translate_moves_along_local_axes() {
    let mut body: Body<RecordingBackend> = Body::new(Mesh::default());
    body.rotate(90.0, Vector3::new(0.0, 0.0, 1.0));
    body.translate(Vector3::new(1.0, 0.0, 0.0));

    let expected = Matrix4::from_angle_z(body_ngin::cgmath::Deg(90.0))
        * Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0));
    assert_floats_eq(
        &math::to_floats(body.model_matrix()),
        &math::to_floats(&expected),
    );
}

#[test]
fn uniforms_outside_the_pipeline_layout_are_rejected() {
    let engine = RecordingBackend::new();

    let err = engine.create_uniform(16, 7, 3).unwrap_err();
    assert!(matches!(
        err,
        EngineError::State(StateError::UnknownBinding {
            group: 7,
            binding: 3
        })
    ));
    let err = engine.create_uniform(16, 1, 1).unwrap_err();
    assert!(matches!(
        err,
        EngineError::State(StateError::UnknownBinding {
            group: 1,
            binding: 1
        })
    ));
    assert!(engine.ops().is_empty());

    engine.create_uniform(16, 0, 0).unwrap();
    engine.create_uniform(16, 1, 0).unwrap();
}
