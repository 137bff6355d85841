//! A 4x4x4 grid of color cubes, each spinning on its own axis while the whole
//! world turns.
//!
//! Run with `cargo run --example cubes`; `RUST_LOG=debug` shows every buffer
//! the engine allocates.

use body_ngin::{
    Body, BodyType, EngineConfig,
    cgmath::Vector3,
    flow,
};

const GRID: i32 = 4;
const SPACING: f32 = 4.0;

fn main() -> anyhow::Result<()> {
    flow::run(
        EngineConfig::default().with_title("cubes"),
        |world| {
            let offset = |i: i32| i as f32 * SPACING - 6.0;
            for z in 0..GRID {
                for y in 0..GRID {
                    for x in 0..GRID {
                        let mut cube = Body::of_type(BodyType::ColorCube);
                        cube.position(Vector3::new(offset(x), offset(y), offset(z)));
                        world.add_body(cube);
                    }
                }
            }
            Ok(())
        },
        |ctx| {
            for body in ctx.bodies.iter_mut() {
                body.rotate(4.0, Vector3::new(1.0, 0.5, -1.0));
            }
            ctx.view.rotate(0.5, Vector3::new(0.3, 1.0, 0.5));
        },
    )
}
