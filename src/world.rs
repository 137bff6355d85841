//! The scene: a set of bodies drawn under one global transform.
//!
//! A [`World`] owns its backend, the global (projection × view) uniform and the
//! registered bodies. Each call to [`World::frame`] runs one cycle:
//!
//! 1. the caller's before-update callback mutates bodies or the view,
//! 2. bodies registered since the last frame are bound,
//! 3. the global transform is recomputed and written,
//! 4. every body writes its model matrix,
//! 5. one render pass draws every body.
//!
//! [`World::show`] binds the registered bodies and hands back a [`Show`], which
//! the host steps once per display refresh.

use std::{collections::BTreeMap, fmt, time::Duration};

use cgmath::Vector3;

use crate::{
    backend::{Backend, GLOBAL_GROUP, Renderable, UNIFORM_BINDING, UniformBuffer},
    data_structures::body::{Body, BodyId},
    error::EngineError,
    math::{self, MATRIX_FLOATS, Rotation, Translation},
};

/// The world's own rotation and translation, from which the view matrix is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Always within `[0, 360)`.
    pub angle_degrees: f32,
    pub axis: Vector3<f32>,
    pub translation: Vector3<f32>,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            angle_degrees: 0.0,
            axis: Vector3::new(0.0, -1.0, 0.7),
            translation: Vector3::new(0.0, 0.0, -7.0),
        }
    }
}

impl ViewTransform {
    /// Adds `angle_degrees` to the accumulated angle and makes `axis` the
    /// rotation axis. The angle wraps into `[0, 360)`.
    pub fn rotate(&mut self, angle_degrees: f32, axis: Vector3<f32>) {
        self.angle_degrees = (self.angle_degrees + angle_degrees).rem_euclid(360.0);
        // rem_euclid can round up to exactly 360 for tiny negative inputs
        if self.angle_degrees >= 360.0 {
            self.angle_degrees = 0.0;
        }
        self.axis = axis;
    }

    pub fn translate(&mut self, vector: Vector3<f32>) {
        self.translation += vector;
    }

    pub fn rotation(&self) -> Rotation {
        Rotation::from_degrees(self.angle_degrees, self.axis)
    }

    pub fn translation(&self) -> Translation {
        Translation::new(self.translation)
    }
}

/// Registered bodies keyed by id. Iteration follows id order, so it is the
/// same in every frame.
pub struct BodySet<B: Backend> {
    bodies: BTreeMap<BodyId, Body<B>>,
}

impl<B: Backend> Default for BodySet<B> {
    fn default() -> Self {
        Self {
            bodies: BTreeMap::new(),
        }
    }
}

impl<B: Backend> BodySet<B> {
    /// Adds `body` unless a body with the same id is already registered.
    /// Returns whether it was added.
    pub fn insert(&mut self, body: Body<B>) -> bool {
        if self.bodies.contains_key(&body.id()) {
            log::warn!("body {} is already registered", body.id());
            return false;
        }
        self.bodies.insert(body.id(), body);
        true
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body<B>> {
        self.bodies.get(&id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body<B>> {
        self.bodies.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body<B>> {
        self.bodies.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body<B>> {
        self.bodies.values_mut()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl<B: Backend> fmt::Debug for BodySet<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.bodies.values()).finish()
    }
}

/// What the before-update callback may touch during one frame.
pub struct FrameContext<'a, B: Backend> {
    pub bodies: &'a mut BodySet<B>,
    pub view: &'a mut ViewTransform,
    /// Number of frames drawn before this one.
    pub frame: u64,
    /// Time since the previous frame.
    pub dt: Duration,
}

pub struct World<B: Backend> {
    engine: B,
    view: ViewTransform,
    global_uniform: B::Uniform,
    bodies: BodySet<B>,
    frames: u64,
}

impl<B: Backend> World<B> {
    /// Takes ownership of the backend and allocates the global uniform at
    /// group 0, binding 0.
    pub fn new(engine: B) -> Result<Self, EngineError> {
        let global_uniform = engine.create_uniform(MATRIX_FLOATS, GLOBAL_GROUP, UNIFORM_BINDING)?;
        log::info!("world created on engine {}", engine.id());
        Ok(Self {
            engine,
            view: ViewTransform::default(),
            global_uniform,
            bodies: BodySet::default(),
            frames: 0,
        })
    }

    pub fn engine(&self) -> &B {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut B {
        &mut self.engine
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn bodies(&self) -> &BodySet<B> {
        &self.bodies
    }

    pub fn bodies_mut(&mut self) -> &mut BodySet<B> {
        &mut self.bodies
    }

    pub fn global_uniform(&self) -> &B::Uniform {
        &self.global_uniform
    }

    /// Frames completed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn add_body(&mut self, body: Body<B>) -> bool {
        self.bodies.insert(body)
    }

    pub fn add_bodies(&mut self, bodies: impl IntoIterator<Item = Body<B>>) {
        for body in bodies {
            self.add_body(body);
        }
    }

    pub fn rotate(&mut self, angle_degrees: f32, axis: Vector3<f32>) {
        self.view.rotate(angle_degrees, axis);
    }

    pub fn translate(&mut self, vector: Vector3<f32>) {
        self.view.translate(vector);
    }

    /// Projection for the current surface size times the view, flattened.
    pub fn global_transform(&self) -> [f32; MATRIX_FLOATS] {
        let (width, height) = self.engine.surface_size();
        math::transformation_matrix(width, height, &self.view.rotation(), &self.view.translation())
    }

    pub fn update_global_transform(&self) -> Result<(), EngineError> {
        self.global_uniform.write(&self.global_transform())
    }

    /// Binds every body not bound yet and returns the draw list in set order.
    pub fn get_renderables(&mut self) -> Result<Vec<&Renderable<B>>, EngineError> {
        let Self { engine, bodies, .. } = self;
        bodies
            .iter_mut()
            .map(|body| body.get_renderable(engine))
            .collect()
    }

    /// Binds every body not bound yet.
    fn bind_pending(&mut self) -> Result<(), EngineError> {
        let Self { engine, bodies, .. } = self;
        for body in bodies.iter_mut().filter(|body| !body.is_bound()) {
            body.get_renderable(engine)?;
        }
        Ok(())
    }

    /// Runs one frame cycle. Exactly one render pass is submitted on success.
    pub fn frame<F>(&mut self, before_update: &mut F, dt: Duration) -> Result<(), EngineError>
    where
        F: FnMut(&mut FrameContext<'_, B>),
    {
        let mut ctx = FrameContext {
            bodies: &mut self.bodies,
            view: &mut self.view,
            frame: self.frames,
            dt,
        };
        before_update(&mut ctx);

        // bodies added by the callback
        self.bind_pending()?;

        self.update_global_transform()?;
        for body in self.bodies.iter() {
            body.update()?;
        }

        let Self {
            engine,
            bodies,
            global_uniform,
            ..
        } = self;
        let renderables = bodies
            .iter()
            .filter_map(Body::renderable)
            .collect::<Vec<_>>();
        engine.do_render_pass(global_uniform, &renderables)?;

        self.frames += 1;
        Ok(())
    }

    /// Binds every registered body and starts the frame loop.
    ///
    /// The returned [`Show`] draws one frame per [`Show::frame`] call; the host
    /// decides when to call it.
    pub fn show<F>(mut self, before_update: F) -> Result<Show<B, F>, EngineError>
    where
        F: FnMut(&mut FrameContext<'_, B>),
    {
        self.bind_pending()?;
        log::info!("showing {} bodies", self.bodies.len());
        Ok(Show {
            world: self,
            before_update,
        })
    }
}

impl<B: Backend> fmt::Debug for World<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("engine", &self.engine.id())
            .field("view", &self.view)
            .field("bodies", &self.bodies.len())
            .field("frames", &self.frames)
            .finish()
    }
}

/// A running frame loop.
pub struct Show<B: Backend, F> {
    world: World<B>,
    before_update: F,
}

impl<B, F> Show<B, F>
where
    B: Backend,
    F: FnMut(&mut FrameContext<'_, B>),
{
    pub fn frame(&mut self, dt: Duration) -> Result<(), EngineError> {
        self.world.frame(&mut self.before_update, dt)
    }

    pub fn world(&self) -> &World<B> {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World<B> {
        &mut self.world
    }

    pub fn into_world(self) -> World<B> {
        self.world
    }
}
