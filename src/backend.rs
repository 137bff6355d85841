//! The GPU-touching surface the scene talks to.
//!
//! [`World`](crate::world::World) and [`Body`](crate::data_structures::body::Body)
//! never call wgpu directly. They allocate and draw through a [`Backend`]:
//! the wgpu [`Engine`](crate::engine::Engine) in an application, or the
//! [`RecordingBackend`](crate::recording::RecordingBackend) when no GPU is
//! around.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::error::{EngineError, StateError};

/// Bind group of the global (projection × view) uniform.
pub const GLOBAL_GROUP: u32 = 0;
/// Bind group of the per-body model uniform.
pub const MODEL_GROUP: u32 = 1;
/// Both uniforms sit at binding 0 of their group.
pub const UNIFORM_BINDING: u32 = 0;

/// Identity of one backend instance.
///
/// Bodies remember which engine they were bound to so a second engine can be
/// told apart from the first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EngineId(u64);

impl EngineId {
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A uniform buffer already bound into a bind group.
pub trait UniformBuffer {
    /// Capacity in `f32`s.
    fn size_in_floats(&self) -> usize;

    /// Replaces the full buffer contents. `values` must match the capacity.
    fn write(&self, values: &[f32]) -> Result<(), EngineError>;
}

/// The GPU state needed to draw one body: its vertices and its model uniform.
pub struct Renderable<B: Backend> {
    pub vertex_info: B::Vertices,
    pub model_uniform: B::Uniform,
}

impl<B: Backend> fmt::Debug for Renderable<B>
where
    B::Vertices: fmt::Debug,
    B::Uniform: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderable")
            .field("vertex_info", &self.vertex_info)
            .field("model_uniform", &self.model_uniform)
            .finish()
    }
}

pub trait Backend: Sized {
    type Uniform: UniformBuffer;
    type Vertices;

    fn id(&self) -> EngineId;

    /// Current drawable size in physical pixels. Never zero.
    fn surface_size(&self) -> (u32, u32);

    /// Allocates a uniform of `size_in_floats` floats and binds it at
    /// `group`/`binding` of the shared pipeline layout.
    fn create_uniform(
        &self,
        size_in_floats: usize,
        group: u32,
        binding: u32,
    ) -> Result<Self::Uniform, EngineError>;

    /// Uploads interleaved position/color floats, 8 per vertex.
    fn create_vertex_buffer_info(&self, raw_values: &[f32]) -> Result<Self::Vertices, EngineError>;

    /// Same as [`create_vertex_buffer_info`](Self::create_vertex_buffer_info)
    /// plus a triangle-list index buffer.
    fn create_indexed_vertex_buffer_info(
        &self,
        raw_values: &[f32],
        indices: &[u16],
    ) -> Result<Self::Vertices, EngineError>;

    /// Records one pass drawing every renderable under the shared pipeline and
    /// submits it. Exactly one submission per call.
    fn do_render_pass(
        &self,
        global: &Self::Uniform,
        renderables: &[&Renderable<Self>],
    ) -> Result<(), EngineError>;
}

/// Checks a whole-buffer write against the uniform's capacity.
pub(crate) fn check_uniform_write(expected: usize, values: &[f32]) -> Result<(), EngineError> {
    if values.len() != expected {
        return Err(EngineError::UniformSize {
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

/// Checks that `group`/`binding` names one of the pipeline's uniform slots.
pub(crate) fn check_binding(group: u32, binding: u32) -> Result<(), StateError> {
    match (group, binding) {
        (GLOBAL_GROUP | MODEL_GROUP, UNIFORM_BINDING) => Ok(()),
        _ => Err(StateError::UnknownBinding { group, binding }),
    }
}
