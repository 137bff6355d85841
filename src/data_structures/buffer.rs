//! GPU buffers handed out by the [`Engine`](crate::engine::Engine).
//!
//! A [`BoundUniformBuffer`] couples a uniform buffer with the bind group that
//! exposes it to the shaders, so a draw only needs `set_bind_group`. A
//! [`VertexBufferInfo`] couples a vertex buffer with the number of vertices
//! (and optionally an index buffer) it holds.

use wgpu::util::DeviceExt;

use crate::{
    backend::{UniformBuffer, check_uniform_write},
    data_structures::mesh::FLOATS_PER_VERTEX,
    error::EngineError,
};

const F32_BYTE_LEN: usize = std::mem::size_of::<f32>();

/// A uniform buffer plus its bind group.
///
/// Holds a clone of the queue so writes need no engine reference; `Queue`
/// clones share the same underlying queue.
#[derive(Debug)]
pub struct BoundUniformBuffer {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    size_in_floats: usize,
    queue: wgpu::Queue,
}

impl BoundUniformBuffer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        group: u32,
        binding: u32,
        size_in_floats: usize,
    ) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("Uniform Buffer (group {})", group)),
            size: (size_in_floats * F32_BYTE_LEN) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding,
                resource: buffer.as_entire_binding(),
            }],
            label: Some(&format!("uniform_bind_group_{}", group)),
        });
        Self {
            buffer,
            bind_group,
            size_in_floats,
            queue: queue.clone(),
        }
    }
}

impl UniformBuffer for BoundUniformBuffer {
    fn size_in_floats(&self) -> usize {
        self.size_in_floats
    }

    fn write(&self, values: &[f32]) -> Result<(), EngineError> {
        check_uniform_write(self.size_in_floats, values)?;
        self.queue
            .write_buffer(&self.buffer, 0, bytemuck::cast_slice(values));
        Ok(())
    }
}

#[derive(Debug)]
pub struct IndexBufferInfo {
    pub buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// A vertex buffer and the number of vertices in it.
#[derive(Debug)]
pub struct VertexBufferInfo {
    pub buffer: wgpu::Buffer,
    pub vertex_count: u32,
    pub indices: Option<IndexBufferInfo>,
}

impl VertexBufferInfo {
    /// Uploads `raw_values` right away. The vertex count assumes the fixed
    /// 8-float stride; a trailing partial vertex is not counted.
    pub fn new(device: &wgpu::Device, raw_values: &[f32], indices: Option<&[u16]>) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(raw_values),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });
        let indices = indices.map(|indices| IndexBufferInfo {
            buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Index Buffer"),
                contents: bytemuck::cast_slice(&pad_indices(indices)),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: indices.len() as u32,
        });
        Self {
            buffer,
            vertex_count: (raw_values.len() / FLOATS_PER_VERTEX) as u32,
            indices,
        }
    }

    /// Number of elements one draw call covers.
    pub fn draw_count(&self) -> u32 {
        match &self.indices {
            Some(indices) => indices.index_count,
            None => self.vertex_count,
        }
    }
}

/// Buffer writes must be a multiple of 4 bytes, so odd `u16` counts get one
/// zero of padding. The padding is never drawn.
fn pad_indices(indices: &[u16]) -> Vec<u16> {
    let mut padded = indices.to_vec();
    if padded.len() % 2 == 1 {
        padded.push(0);
    }
    padded
}
