//! Error taxonomy of the engine.
//!
//! Initialization errors are fatal and surface once at startup. State errors
//! report misuse of a [`Body`](crate::data_structures::body::Body) or a
//! binding slot and are returned to the immediate caller. Nothing is retried.

use thiserror::Error;

use crate::{backend::EngineId, data_structures::body::BodyId};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Init(#[from] InitError),
    #[error(transparent)]
    State(#[from] StateError),
    /// Uniform writes always replace the whole buffer.
    #[error("uniform buffer holds {expected} floats but {actual} were written")]
    UniformSize { expected: usize, actual: usize },
    #[error("could not acquire the next frame: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Failures while acquiring the GPU or the drawable surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("no suitable GPU adapter: {0}")]
    NoAdapter(String),
    #[error("unable to create the GPU device: {0}")]
    NoDevice(String),
    #[error("unable to create a surface for the window: {0}")]
    Surface(String),
    #[error("the surface does not support any format for this adapter")]
    UnsupportedSurface,
    #[error("an engine was already created in this process")]
    AlreadyInitialized,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("body {0} has no renderable; bind it to an engine first")]
    Unbound(BodyId),
    #[error("body {body} is bound to engine {bound}, not to engine {requested}")]
    BoundToOtherEngine {
        body: BodyId,
        bound: EngineId,
        requested: EngineId,
    },
    #[error("the pipeline has no uniform at group {group}, binding {binding}")]
    UnknownBinding { group: u32, binding: u32 },
}
