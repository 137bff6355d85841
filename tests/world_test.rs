mod common;

use std::time::Duration;

use approx::assert_abs_diff_eq;
use body_ngin::{
    Body, BodyId, BodyType, EngineError, Mesh, UniformBuffer, ViewTransform, World,
    cgmath::{Matrix4, Vector3},
    math,
    recording::{GpuOp, RecordingBackend},
};

use crate::common::test_utils::{
    assert_floats_eq, count_passes, cube_at, model_handle, recording_world,
};

#[test]
fn empty_world_completes_a_frame() {
    let world = recording_world();
    let global = world.global_uniform().handle();
    let mut show = world.show(|_| {}).unwrap();

    show.frame(Duration::ZERO).unwrap();

    let ops = show.world().engine().ops();
    assert_eq!(
        ops[0],
        GpuOp::CreateUniform {
            handle: global,
            size_in_floats: 16,
            group: 0,
            binding: 0,
        }
    );
    assert!(matches!(&ops[1], GpuOp::WriteUniform { handle, .. } if *handle == global));
    assert_eq!(
        ops[2],
        GpuOp::RenderPass {
            global,
            draws: vec![],
        }
    );
    assert_eq!(ops.len(), 3);
}

#[test]
fn two_bodies_are_drawn_with_their_own_matrices() {
    let mut world = recording_world();
    world.add_bodies([cube_at(-2.0, 0.0, 0.0), cube_at(2.0, 0.0, 0.0)]);
    let global = world.global_uniform().handle();
    let mut show = world.show(|_| {}).unwrap();

    show.frame(Duration::from_millis(16)).unwrap();

    let world = show.world();
    let engine = world.engine();
    let view = ViewTransform::default();
    let expected_global =
        math::transformation_matrix(640, 640, &view.rotation(), &view.translation());
    assert_floats_eq(&engine.last_write(global).unwrap(), &expected_global);

    let mut xs = Vec::new();
    for body in world.bodies().iter() {
        let written = engine.last_write(model_handle(body)).unwrap();
        let x = written[12];
        let expected = Matrix4::from_translation(Vector3::new(x, 0.0, 0.0));
        assert_floats_eq(&written, &math::to_floats(&expected));
        xs.push(x);
    }
    xs.sort_by(f32::total_cmp);
    assert_eq!(xs, vec![-2.0, 2.0]);

    let passes = engine.render_passes();
    assert_eq!(passes.len(), 1);
    assert_eq!(passes[0].1.len(), 2);
    assert!(passes[0].1.iter().all(|draw| draw.count == 36 && !draw.indexed));
}

#[test]
fn adding_the_same_body_twice_is_a_no_op() {
    let mut world = recording_world();
    let id = BodyId::new(7);

    assert!(world.add_body(Body::with_id(id, BodyType::ColorCube.mesh())));
    assert!(!world.add_body(Body::with_id(id, BodyType::IndexedColorCube.mesh())));

    assert_eq!(world.bodies().len(), 1);
    let kept = world.bodies().get(id).unwrap();
    assert!(kept.mesh().indices().is_none());
}

#[test]
fn callback_mutations_reach_the_gpu() {
    let mut world = recording_world();
    world.add_body(cube_at(0.0, 1.0, 0.0));
    let mut show = world
        .show(|ctx| {
            for body in ctx.bodies.iter_mut() {
                body.rotate(4.0, Vector3::new(1.0, 0.5, -1.0));
            }
            ctx.view.rotate(0.5, Vector3::new(0.3, 1.0, 0.5));
        })
        .unwrap();

    show.frame(Duration::ZERO).unwrap();
    show.frame(Duration::ZERO).unwrap();

    let world = show.world();
    assert_abs_diff_eq!(world.view().angle_degrees, 1.0, epsilon = 1e-5);
    assert_eq!(world.view().axis, Vector3::new(0.3, 1.0, 0.5));

    let body = world.bodies().iter().next().unwrap();
    let mut expected = Matrix4::from_translation(Vector3::new(0.0, 1.0, 0.0));
    let axis = Vector3::new(1.0, 0.5, -1.0);
    math::rotate_in_place(&mut expected, &math::Rotation::from_degrees(8.0, axis));
    let written = world.engine().last_write(model_handle(body)).unwrap();
    assert_floats_eq(&written, &math::to_floats(&expected));

    let global = world.engine().last_write(world.global_uniform().handle()).unwrap();
    assert_floats_eq(&global, &world.global_transform());
}

#[test]
fn global_write_precedes_body_writes_precedes_the_pass() {
    let mut world = recording_world();
    world.add_bodies([cube_at(-2.0, 0.0, 0.0), cube_at(2.0, 0.0, 0.0)]);
    let global = world.global_uniform().handle();
    let mut show = world.show(|_| {}).unwrap();
    show.world().engine().clear();

    show.frame(Duration::ZERO).unwrap();

    let ops = show.world().engine().ops();
    assert_eq!(ops.len(), 4);
    assert!(matches!(&ops[0], GpuOp::WriteUniform { handle, .. } if *handle == global));
    assert!(matches!(&ops[1], GpuOp::WriteUniform { handle, .. } if *handle != global));
    assert!(matches!(&ops[2], GpuOp::WriteUniform { handle, .. } if *handle != global));
    assert!(matches!(ops[3], GpuOp::RenderPass { .. }));
}

#[test]
fn every_frame_submits_exactly_one_pass() {
    let mut world = recording_world();
    world.add_body(cube_at(0.0, 0.0, 0.0));
    let mut seen = Vec::new();
    {
        let mut show = world.show(|ctx| seen.push(ctx.frame)).unwrap();
        for _ in 0..3 {
            show.frame(Duration::from_millis(16)).unwrap();
        }
        assert_eq!(show.world().frames(), 3);
        assert_eq!(count_passes(&show.world().engine().ops()), 3);
    }
    assert_eq!(seen, vec![0, 1, 2]);
}

#[test]
fn bodies_added_mid_loop_are_bound_before_the_frame_draws() {
    let mut world = recording_world();
    world.add_body(cube_at(0.0, 0.0, 0.0));
    let mut show = world
        .show(|ctx| {
            if ctx.frame == 1 {
                ctx.bodies.insert(Body::of_type(BodyType::IndexedColorCube));
            }
        })
        .unwrap();

    show.frame(Duration::ZERO).unwrap();
    show.frame(Duration::ZERO).unwrap();

    let passes = show.world().engine().render_passes();
    assert_eq!(passes[0].1.len(), 1);
    assert_eq!(passes[1].1.len(), 2);
    assert!(show.world().bodies().iter().all(Body::is_bound));
}

#[test]
fn bodies_without_vertices_are_skipped() {
    let mut world = recording_world();
    world.add_body(Body::new(Mesh::default()));
    world.add_body(cube_at(0.0, 0.0, 0.0));
    let mut show = world.show(|_| {}).unwrap();

    show.frame(Duration::ZERO).unwrap();

    let passes = show.world().engine().render_passes();
    assert_eq!(passes[0].1.len(), 1);
}

#[test]
fn world_rotation_wraps_negative_angles() {
    let mut world = recording_world();
    world.rotate(-370.0, Vector3::new(0.0, 1.0, 0.0));
    assert_abs_diff_eq!(world.view().angle_degrees, 350.0, epsilon = 1e-4);

    world.translate(Vector3::new(0.0, 0.0, -3.0));
    assert_eq!(world.view().translation, Vector3::new(0.0, 0.0, -10.0));
}

#[test]
fn partial_uniform_writes_are_rejected() {
    let world = recording_world();
    let err = world.global_uniform().write(&[0.0; 4]).unwrap_err();
    assert!(matches!(
        err,
        EngineError::UniformSize {
            expected: 16,
            actual: 4
        }
    ));
}

#[test]
fn the_projection_follows_the_surface_size() {
    let world = World::new(RecordingBackend::with_size(1280, 640)).unwrap();
    let view = world.view();
    assert_floats_eq(
        &world.global_transform(),
        &math::transformation_matrix(1280, 640, &view.rotation(), &view.translation()),
    );
}

#[test]
fn renderables_list_every_body_after_frames() {
    let mut world = recording_world();
    world.add_bodies([cube_at(-2.0, 0.0, 0.0), cube_at(2.0, 0.0, 0.0)]);
    let mut show = world.show(|_| {}).unwrap();
    show.frame(Duration::ZERO).unwrap();
    show.frame(Duration::ZERO).unwrap();

    let mut world = show.into_world();
    let creates_before = world.engine().ops().len();
    assert_eq!(world.get_renderables().unwrap().len(), 2);
    // already bound, nothing new is allocated
    assert_eq!(world.engine().ops().len(), creates_before);
}
