use glam::Vec2;

use crate::config::ActorConfig;
use crate::controller::physics::{BodyDesc, BodyHandle, BodyTag, ColliderShape, SimulationWorld};
use crate::model::shape::{Color, RectShape};
use crate::view::Canvas;

/// Index of an actor inside its `ActorSet`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u32);

/// Number of contacts an actor is currently part of.
///
/// A single flag cannot represent "touching anything" once contacts overlap:
/// an end from contact A after a begin from contact B would clear it while B
/// still touches. Counting begins and ends keeps the answer right; `end` never
/// drops below zero, so a stray end is absorbed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContactState {
    count: u32,
}

impl ContactState {
    pub fn begin(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    pub fn end(&mut self) {
        self.count = self.count.saturating_sub(1);
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_contacting(&self) -> bool {
        self.count > 0
    }
}

/// A dynamic box coupling one physics body to one rectangle on screen
#[derive(Debug)]
pub struct Actor {
    id: ActorId,
    body: BodyHandle,
    shape: RectShape,
    contacts: ContactState,
    base_color: Color,
    highlight_color: Color,
}

impl Actor {
    /// Create the body at `position` and tag it with `id`
    pub fn spawn(world: &mut SimulationWorld, id: ActorId, position: Vec2, config: &ActorConfig) -> Self {
        let shape = RectShape::new(config.size)
            .centered()
            .with_position(position)
            .with_fill(config.base_color)
            .with_outline(config.outline_color, config.outline_thickness);

        let desc = BodyDesc::dynamic(position, ColliderShape::Cuboid { half_extents: config.size * 0.5 })
            .with_material(config.density, config.friction);
        let body = world.create_body(&desc, BodyTag::Actor(id));

        tracing::info!(actor = id.0, ?position, "actor spawned");

        Self {
            id,
            body,
            shape,
            contacts: ContactState::default(),
            base_color: config.base_color,
            highlight_color: config.highlight_color,
        }
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn shape(&self) -> &RectShape {
        &self.shape
    }

    pub fn mark_contact_begin(&mut self) {
        self.contacts.begin();
    }

    pub fn mark_contact_end(&mut self) {
        self.contacts.end();
    }

    pub fn contact_count(&self) -> u32 {
        self.contacts.count()
    }

    pub fn is_contacting(&self) -> bool {
        self.contacts.is_contacting()
    }

    pub fn fill_color(&self) -> Color {
        if self.is_contacting() {
            self.highlight_color
        } else {
            self.base_color
        }
    }

    /// Copy the body's transform onto the visual. Run after the world
    /// advanced and before rendering.
    pub fn sync_from_body(&mut self, world: &SimulationWorld) {
        let (position, rotation) = world.transform(self.body);
        self.shape.position = position;
        self.shape.rotation = rotation;
    }

    pub fn render<C: Canvas>(&self, canvas: &mut C) {
        canvas.draw_rect(&RectShape { fill: self.fill_color(), ..self.shape });
    }
}

/// Arena of actors addressed by `ActorId`
#[derive(Debug, Default)]
pub struct ActorSet {
    actors: Vec<Actor>,
}

impl ActorSet {
    pub fn new() -> Self {
        Self { actors: Vec::new() }
    }

    pub fn spawn(&mut self, world: &mut SimulationWorld, position: Vec2, config: &ActorConfig) -> ActorId {
        let id = ActorId(self.actors.len() as u32);
        self.actors.push(Actor::spawn(world, id, position, config));
        id
    }

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.0 as usize)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id.0 as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Actor> {
        self.actors.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    /// Destroy every actor body. Safe to call more than once.
    pub fn despawn_all(&mut self, world: &mut SimulationWorld) {
        for actor in self.actors.drain(..) {
            world.destroy_body(actor.body);
            tracing::debug!(actor = actor.id.0, "actor despawned");
        }
    }
}
