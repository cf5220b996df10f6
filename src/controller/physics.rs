use std::num::NonZeroUsize;
use std::sync::Mutex;

use glam::Vec2;
use rapier2d::prelude::*;

use crate::config::PhysicsConfig;
use crate::controller::contact::{ContactListener, ContactPair};
use crate::model::ActorId;
use crate::utils::{from_na_point, from_na_vector, isometry_to_pos_rot, to_na_point, to_na_vector};

/// Handle to a body owned by the `SimulationWorld`
pub type BodyHandle = RigidBodyHandle;

/// Identity stored in a body's user data slot so that collision events,
/// which only name colliders, can be resolved back to the object owning
/// the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BodyTag {
    Actor(ActorId),
    Scenery,
}

const TAG_KIND_SHIFT: u32 = 64;
const TAG_KIND_ACTOR: u128 = 1;
const TAG_KIND_SCENERY: u128 = 2;

impl BodyTag {
    pub fn to_user_data(self) -> u128 {
        match self {
            BodyTag::Actor(id) => (TAG_KIND_ACTOR << TAG_KIND_SHIFT) | id.0 as u128,
            BodyTag::Scenery => TAG_KIND_SCENERY << TAG_KIND_SHIFT,
        }
    }

    /// `None` for untagged bodies (user data 0) and unknown kinds
    pub fn from_user_data(data: u128) -> Option<Self> {
        match data >> TAG_KIND_SHIFT {
            TAG_KIND_ACTOR => Some(BodyTag::Actor(ActorId((data & u32::MAX as u128) as u32))),
            TAG_KIND_SCENERY => Some(BodyTag::Scenery),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    Dynamic,
    Static,
}

/// Collision shape, in body-local coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColliderShape {
    Cuboid { half_extents: Vec2 },
    Segment { a: Vec2, b: Vec2 },
}

/// Everything needed to create a body with a single collider
#[derive(Clone, Copy, Debug)]
pub struct BodyDesc {
    pub kind: BodyKind,
    pub position: Vec2,
    pub shape: ColliderShape,
    pub density: f32,
    pub friction: f32,
}

impl BodyDesc {
    pub fn dynamic(position: Vec2, shape: ColliderShape) -> Self {
        Self { kind: BodyKind::Dynamic, position, shape, density: 1.0, friction: 0.2 }
    }

    pub fn fixed(position: Vec2, shape: ColliderShape) -> Self {
        Self { kind: BodyKind::Static, position, shape, density: 1.0, friction: 0.2 }
    }

    pub fn with_material(mut self, density: f32, friction: f32) -> Self {
        self.density = density;
        self.friction = friction;
        self
    }
}

/// Collects collision events raised during a step. rapier requires event
/// handlers to be `Send + Sync`; the lock is only ever taken on the
/// simulation thread.
struct CollisionCollector {
    events: Mutex<Vec<CollisionEvent>>,
}

impl CollisionCollector {
    fn new() -> Self {
        Self { events: Mutex::new(Vec::new()) }
    }

    fn drain(&self) -> Vec<CollisionEvent> {
        match self.events.lock() {
            Ok(mut events) => std::mem::take(&mut *events),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl EventHandler for CollisionCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&rapier2d::geometry::ContactPair>,
    ) {
        match self.events.lock() {
            Ok(mut events) => events.push(event),
            Err(poisoned) => poisoned.into_inner().push(event),
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &rapier2d::geometry::ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// Owns the physics engine and advances it in fixed increments
pub struct SimulationWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,
    collector: CollisionCollector,
    steps: u64,
}

impl SimulationWorld {
    pub fn new(config: &PhysicsConfig) -> Self {
        let integration_parameters = IntegrationParameters {
            dt: config.timestep,
            num_solver_iterations: NonZeroUsize::new(config.velocity_iterations.max(1))
                .unwrap_or(NonZeroUsize::MIN),
            num_internal_stabilization_iterations: config.position_iterations,
            ..IntegrationParameters::default()
        };

        tracing::info!(
            gravity = ?config.gravity,
            timestep = config.timestep,
            velocity_iterations = config.velocity_iterations,
            position_iterations = config.position_iterations,
            "simulation world created"
        );

        Self {
            gravity: to_na_vector(config.gravity),
            integration_parameters,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            collector: CollisionCollector::new(),
            steps: 0,
        }
    }

    pub fn timestep(&self) -> f32 {
        self.integration_parameters.dt
    }

    pub fn gravity(&self) -> Vec2 {
        from_na_vector(&self.gravity)
    }

    /// Number of completed `advance` calls
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Step the simulation by exactly one timestep, then deliver every
    /// contact begin/end produced by the step to `listener` before returning.
    pub fn advance<L: ContactListener>(&mut self, listener: &mut L) {
        self.pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.collector,
        );
        self.steps += 1;

        for event in self.collector.drain() {
            let (h1, h2, started) = match event {
                CollisionEvent::Started(h1, h2, _) => (h1, h2, true),
                CollisionEvent::Stopped(h1, h2, _) => (h1, h2, false),
            };
            let pair = ContactPair {
                a: self.collider_tag(h1),
                b: self.collider_tag(h2),
            };
            if started {
                listener.begin_contact(&pair);
            } else {
                listener.end_contact(&pair);
            }
        }
    }

    /// Create a body with one collider and stamp `tag` into its user data
    pub fn create_body(&mut self, desc: &BodyDesc, tag: BodyTag) -> BodyHandle {
        let body_type = match desc.kind {
            BodyKind::Dynamic => RigidBodyType::Dynamic,
            BodyKind::Static => RigidBodyType::Fixed,
        };
        let body = RigidBodyBuilder::new(body_type)
            .translation(to_na_vector(desc.position))
            .user_data(tag.to_user_data())
            .build();
        let handle = self.bodies.insert(body);

        let collider = match desc.shape {
            ColliderShape::Cuboid { half_extents } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            }
            ColliderShape::Segment { a, b } => ColliderBuilder::segment(to_na_point(a), to_na_point(b)),
        }
        .density(desc.density)
        .friction(desc.friction)
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .build();
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        // mass is readable before the first step
        if let Some(rb) = self.bodies.get_mut(handle) {
            rb.recompute_mass_properties_from_colliders(&self.colliders);
        }

        tracing::debug!(?tag, kind = ?desc.kind, position = ?desc.position, "body created");
        handle
    }

    /// Remove a body together with its colliders
    pub fn destroy_body(&mut self, body: BodyHandle) {
        let removed = self.bodies.remove(
            body,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        if removed.is_none() {
            tracing::warn!(?body, "destroy_body on unknown handle");
        }
    }

    pub fn contains_body(&self, body: BodyHandle) -> bool {
        self.bodies.contains(body)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn body_tag(&self, body: BodyHandle) -> Option<BodyTag> {
        self.bodies
            .get(body)
            .and_then(|rb| BodyTag::from_user_data(rb.user_data))
    }

    pub fn linear_velocity(&self, body: BodyHandle) -> Vec2 {
        self.bodies
            .get(body)
            .map(|rb| from_na_vector(rb.linvel()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.set_linvel(to_na_vector(velocity), true);
        }
    }

    /// Centre of mass in world coordinates
    pub fn world_center(&self, body: BodyHandle) -> Vec2 {
        self.bodies
            .get(body)
            .map(|rb| from_na_point(rb.center_of_mass()))
            .unwrap_or(Vec2::ZERO)
    }

    pub fn mass(&self, body: BodyHandle) -> f32 {
        self.bodies.get(body).map(|rb| rb.mass()).unwrap_or(0.0)
    }

    pub fn position(&self, body: BodyHandle) -> Vec2 {
        self.transform(body).0
    }

    pub fn rotation(&self, body: BodyHandle) -> f32 {
        self.transform(body).1
    }

    /// (translation, angle) of the body
    pub fn transform(&self, body: BodyHandle) -> (Vec2, f32) {
        self.bodies
            .get(body)
            .map(|rb| isometry_to_pos_rot(rb.position()))
            .unwrap_or((Vec2::ZERO, 0.0))
    }

    /// Apply `impulse` at a world-space `point`, waking the body
    pub fn apply_linear_impulse(&mut self, body: BodyHandle, impulse: Vec2, point: Vec2) {
        if let Some(rb) = self.bodies.get_mut(body) {
            rb.apply_impulse_at_point(to_na_vector(impulse), to_na_point(point), true);
        }
    }

    fn collider_tag(&self, collider: ColliderHandle) -> Option<BodyTag> {
        let parent = self.colliders.get(collider)?.parent()?;
        self.body_tag(parent)
    }
}
