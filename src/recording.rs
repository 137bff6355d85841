//! A [`Backend`] that never touches a GPU.
//!
//! Every allocation, uniform write and render pass is appended to a shared
//! log of [`GpuOp`]s, so the frame cycle of a [`World`](crate::world::World)
//! can be run and inspected headless.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{
    backend::{Backend, EngineId, Renderable, UniformBuffer, check_binding, check_uniform_write},
    data_structures::mesh::FLOATS_PER_VERTEX,
    error::EngineError,
};

/// Handle of a recorded uniform or vertex buffer, unique within one backend.
pub type Handle = usize;

/// One draw call inside a recorded render pass.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedDraw {
    pub vertices: Handle,
    pub model_uniform: Handle,
    pub indexed: bool,
    pub count: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GpuOp {
    CreateUniform {
        handle: Handle,
        size_in_floats: usize,
        group: u32,
        binding: u32,
    },
    CreateVertices {
        handle: Handle,
        vertex_count: u32,
        index_count: Option<u32>,
    },
    WriteUniform {
        handle: Handle,
        values: Vec<f32>,
    },
    /// One pass, one submission.
    RenderPass {
        global: Handle,
        draws: Vec<RecordedDraw>,
    },
}

type OpLog = Rc<RefCell<Vec<GpuOp>>>;

#[derive(Debug)]
pub struct RecordedUniform {
    handle: Handle,
    size_in_floats: usize,
    log: OpLog,
}

impl RecordedUniform {
    pub fn handle(&self) -> Handle {
        self.handle
    }
}

impl UniformBuffer for RecordedUniform {
    fn size_in_floats(&self) -> usize {
        self.size_in_floats
    }

    fn write(&self, values: &[f32]) -> Result<(), EngineError> {
        check_uniform_write(self.size_in_floats, values)?;
        self.log.borrow_mut().push(GpuOp::WriteUniform {
            handle: self.handle,
            values: values.to_vec(),
        });
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecordedVertices {
    pub handle: Handle,
    pub vertex_count: u32,
    pub index_count: Option<u32>,
}

impl RecordedVertices {
    fn draw_count(&self) -> u32 {
        self.index_count.unwrap_or(self.vertex_count)
    }
}

#[derive(Debug)]
pub struct RecordingBackend {
    id: EngineId,
    size: (u32, u32),
    log: OpLog,
    next_handle: Cell<Handle>,
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingBackend {
    /// A backend with the default 640x640 surface.
    pub fn new() -> Self {
        Self::with_size(640, 640)
    }

    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            id: EngineId::next(),
            size: (width.max(1), height.max(1)),
            log: Rc::default(),
            next_handle: Cell::new(0),
        }
    }

    /// Snapshot of every operation recorded so far, oldest first.
    pub fn ops(&self) -> Vec<GpuOp> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    pub fn render_passes(&self) -> Vec<(Handle, Vec<RecordedDraw>)> {
        self.log
            .borrow()
            .iter()
            .filter_map(|op| match op {
                GpuOp::RenderPass { global, draws } => Some((*global, draws.clone())),
                _ => None,
            })
            .collect()
    }

    /// Every write to `handle`, oldest first.
    pub fn writes(&self, handle: Handle) -> Vec<Vec<f32>> {
        self.log
            .borrow()
            .iter()
            .filter_map(|op| match op {
                GpuOp::WriteUniform { handle: h, values } if *h == handle => Some(values.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_write(&self, handle: Handle) -> Option<Vec<f32>> {
        self.writes(handle).pop()
    }

    fn next_handle(&self) -> Handle {
        let handle = self.next_handle.get();
        self.next_handle.set(handle + 1);
        handle
    }

    fn record_vertices(
        &self,
        raw_values: &[f32],
        index_count: Option<u32>,
    ) -> RecordedVertices {
        let vertices = RecordedVertices {
            handle: self.next_handle(),
            vertex_count: (raw_values.len() / FLOATS_PER_VERTEX) as u32,
            index_count,
        };
        self.log.borrow_mut().push(GpuOp::CreateVertices {
            handle: vertices.handle,
            vertex_count: vertices.vertex_count,
            index_count,
        });
        vertices
    }
}

impl Backend for RecordingBackend {
    type Uniform = RecordedUniform;
    type Vertices = RecordedVertices;

    fn id(&self) -> EngineId {
        self.id
    }

    fn surface_size(&self) -> (u32, u32) {
        self.size
    }

    fn create_uniform(
        &self,
        size_in_floats: usize,
        group: u32,
        binding: u32,
    ) -> Result<RecordedUniform, EngineError> {
        check_binding(group, binding)?;
        let handle = self.next_handle();
        self.log.borrow_mut().push(GpuOp::CreateUniform {
            handle,
            size_in_floats,
            group,
            binding,
        });
        Ok(RecordedUniform {
            handle,
            size_in_floats,
            log: self.log.clone(),
        })
    }

    fn create_vertex_buffer_info(&self, raw_values: &[f32]) -> Result<RecordedVertices, EngineError> {
        Ok(self.record_vertices(raw_values, None))
    }

    fn create_indexed_vertex_buffer_info(
        &self,
        raw_values: &[f32],
        indices: &[u16],
    ) -> Result<RecordedVertices, EngineError> {
        Ok(self.record_vertices(raw_values, Some(indices.len() as u32)))
    }

    fn do_render_pass(
        &self,
        global: &RecordedUniform,
        renderables: &[&Renderable<Self>],
    ) -> Result<(), EngineError> {
        let draws = renderables
            .iter()
            .filter(|renderable| {
                let empty = renderable.vertex_info.draw_count() == 0;
                if empty {
                    log::warn!("you attempted to render a body without vertices");
                }
                !empty
            })
            .map(|renderable| RecordedDraw {
                vertices: renderable.vertex_info.handle,
                model_uniform: renderable.model_uniform.handle,
                indexed: renderable.vertex_info.index_count.is_some(),
                count: renderable.vertex_info.draw_count(),
            })
            .collect();
        self.log.borrow_mut().push(GpuOp::RenderPass {
            global: global.handle,
            draws,
        });
        Ok(())
    }
}
