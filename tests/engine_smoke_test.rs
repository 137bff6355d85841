//! Opens a real window. Needs a display and a GPU, so it only runs with
//! `--features integration-tests`.

#[test]
#[cfg(feature = "integration-tests")]
fn should_draw_until_the_frame_limit() {
    use body_ngin::{Body, BodyType, EngineConfig, cgmath::Vector3, flow};

    let mut frames = Vec::new();
    flow::run(
        EngineConfig::default()
            .with_title("engine smoke test")
            .with_frame_limit(5),
        |world| {
            world.add_body(Body::of_type(BodyType::ColorCube));
            world.add_body(Body::of_type(BodyType::IndexedColorCube));
            Ok(())
        },
        |ctx| {
            for body in ctx.bodies.iter_mut() {
                body.rotate(4.0, Vector3::new(1.0, 0.5, -1.0));
            }
            frames.push(ctx.frame);
        },
    )
    .unwrap();

    // a skipped frame runs the callback again with the same number
    frames.dedup();
    assert_eq!(frames, vec![0, 1, 2, 3, 4]);
}
