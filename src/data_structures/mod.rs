//! Engine data structures: bodies, meshes, GPU buffers and textures.
//!
//! - `body` is a single mesh instance with its own model matrix
//! - `buffer` wraps wgpu buffers with their bind group or vertex count
//! - `mesh` holds the vertex layout and the built-in mesh table
//! - `texture` contains the depth texture used by every pass

pub mod body;
pub mod buffer;
pub mod mesh;
pub mod texture;
