//! body-ngin
//!
//! A small wgpu renderer that draws a set of colored bodies under one shared
//! pipeline. Every body owns its model matrix and a uniform buffer; the world
//! owns a global projection × view transform and issues a single render pass
//! per frame covering all bodies.
//!
//! High-level modules
//! - `backend`: the trait the scene allocates and draws through
//! - `data_structures`: bodies, meshes, GPU buffers and the depth texture
//! - `engine`: the wgpu device, surface and pipeline owner
//! - `error`: error types returned by the engine and the scene
//! - `flow`: the winit application loop
//! - `math`: projection and model matrix helpers
//! - `pipelines`: the shared body pipeline and its shader
//! - `recording`: a GPU-free backend that records every operation
//! - `render`: per-frame render pass setup
//! - `world`: the scene and its frame cycle
//!

pub mod backend;
pub mod data_structures;
pub mod engine;
pub mod error;
pub mod flow;
pub mod math;
pub mod pipelines;
pub mod recording;
pub mod render;
pub mod world;

pub use backend::{Backend, EngineId, Renderable, UniformBuffer};
pub use data_structures::body::{Body, BodyId};
pub use data_structures::mesh::{BodyType, ColorVertex, Mesh};
pub use engine::{Engine, EngineConfig, EngineLatch};
pub use error::{EngineError, InitError, StateError};
pub use world::{BodySet, FrameContext, Show, ViewTransform, World};

// Re-exports commonly used crates for convenience in downstream code.
pub use cgmath;
pub use wgpu;
pub use winit;
