//! A single mesh instance in the scene.
//!
//! A [`Body`] lives in two phases. Right after construction it is CPU-only: its
//! model matrix can be rotated, translated and positioned freely. Binding it to
//! a backend with [`Body::get_renderable`] uploads its mesh and allocates its
//! model uniform once; from then on [`Body::update`] copies the model matrix to
//! the GPU.

use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use cgmath::{Matrix4, SquareMatrix, Vector3, Vector4};

use crate::{
    backend::{Backend, EngineId, MODEL_GROUP, Renderable, UNIFORM_BINDING, UniformBuffer},
    data_structures::mesh::{BodyType, Mesh},
    error::{EngineError, StateError},
    math::{self, MATRIX_FLOATS, Rotation, Translation},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(u64);

impl BodyId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// A process-unique id. Ids handed out here never collide with each other.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1 << 32);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Binding<B: Backend> {
    engine: EngineId,
    renderable: Renderable<B>,
}

pub struct Body<B: Backend> {
    id: BodyId,
    mesh: Mesh,
    model: Matrix4<f32>,
    binding: Option<Binding<B>>,
}

impl<B: Backend> Body<B> {
    pub fn new(mesh: Mesh) -> Self {
        Self::with_id(BodyId::next(), mesh)
    }

    /// Bodies sharing an id count as the same body in a
    /// [`BodySet`](crate::world::BodySet).
    pub fn with_id(id: BodyId, mesh: Mesh) -> Self {
        Self {
            id,
            mesh,
            model: Matrix4::identity(),
            binding: None,
        }
    }

    pub fn of_type(body_type: BodyType) -> Self {
        Self::new(body_type.mesh())
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn model_matrix(&self) -> &Matrix4<f32> {
        &self.model
    }

    /// Rotates the body about its local `axis`, on top of prior transforms.
    pub fn rotate(&mut self, angle_degrees: f32, axis: Vector3<f32>) {
        math::rotate_in_place(&mut self.model, &Rotation::from_degrees(angle_degrees, axis));
    }

    /// Moves the body along its local axes.
    pub fn translate(&mut self, vector: Vector3<f32>) {
        math::translate_in_place(&mut self.model, &Translation::new(vector));
    }

    /// Places the body at `vector` in world units, keeping its orientation.
    pub fn position(&mut self, vector: Vector3<f32>) {
        self.model.w = Vector4::new(vector.x, vector.y, vector.z, self.model.w.w);
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn renderable(&self) -> Option<&Renderable<B>> {
        self.binding.as_ref().map(|binding| &binding.renderable)
    }

    /// Returns the body's GPU state, allocating it through `engine` on first use.
    ///
    /// Later calls with the same engine return the cached pair unchanged. A
    /// body bound to one engine cannot be drawn by another.
    pub fn get_renderable(&mut self, engine: &B) -> Result<&Renderable<B>, EngineError> {
        match self.binding.as_ref().map(|binding| binding.engine) {
            Some(bound) if bound != engine.id() => {
                return Err(StateError::BoundToOtherEngine {
                    body: self.id,
                    bound,
                    requested: engine.id(),
                }
                .into());
            }
            Some(_) => {}
            None => {
                let vertex_info = match self.mesh.indices() {
                    Some(indices) => {
                        engine.create_indexed_vertex_buffer_info(self.mesh.vertices(), indices)?
                    }
                    None => engine.create_vertex_buffer_info(self.mesh.vertices())?,
                };
                let model_uniform =
                    engine.create_uniform(MATRIX_FLOATS, MODEL_GROUP, UNIFORM_BINDING)?;
                log::debug!("bound body {} to engine {}", self.id, engine.id());
                self.binding = Some(Binding {
                    engine: engine.id(),
                    renderable: Renderable {
                        vertex_info,
                        model_uniform,
                    },
                });
            }
        }
        self.renderable()
            .ok_or_else(|| StateError::Unbound(self.id).into())
    }

    /// Writes the model matrix into the body's uniform.
    pub fn update(&self) -> Result<(), EngineError> {
        let renderable = self.renderable().ok_or(StateError::Unbound(self.id))?;
        renderable
            .model_uniform
            .write(&math::to_floats(&self.model))
    }
}

impl<B: Backend> fmt::Debug for Body<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("id", &self.id)
            .field("vertices", &self.mesh.vertex_count())
            .field("model", &self.model)
            .field("bound", &self.is_bound())
            .finish()
    }
}
