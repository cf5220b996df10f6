use crate::config::{LevelConfig, SceneryConfig, SceneryShape};
use crate::controller::physics::{BodyDesc, BodyHandle, BodyTag, ColliderShape, SimulationWorld};
use crate::model::shape::RectShape;
use crate::view::Canvas;

/// A static collision surface plus the rectangle drawn for it.
///
/// The visual is placed from its own config, not from the body, and is never
/// re-synced; keeping the two aligned is up to whoever authors the level.
#[derive(Debug)]
pub struct Scenery {
    name: String,
    body: BodyHandle,
    visual: RectShape,
}

impl Scenery {
    pub fn spawn(world: &mut SimulationWorld, config: &SceneryConfig) -> Self {
        let shape = match config.shape {
            SceneryShape::Box { half_extents } => ColliderShape::Cuboid { half_extents },
            SceneryShape::Edge { from, to } => ColliderShape::Segment { a: from, b: to },
        };
        let desc = BodyDesc::fixed(config.body_position, shape).with_material(config.density, config.friction);
        let body = world.create_body(&desc, BodyTag::Scenery);

        let mut visual = RectShape::new(config.visual.size)
            .with_position(config.visual.position)
            .with_fill(config.visual.fill);
        if config.visual.centered {
            visual = visual.centered();
        }

        tracing::debug!(name = %config.name, position = ?config.body_position, "scenery spawned");

        Self { name: config.name.clone(), body, visual }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn visual(&self) -> &RectShape {
        &self.visual
    }
}

/// Container for the static pieces of the playground
#[derive(Debug, Default)]
pub struct Level {
    pieces: Vec<Scenery>,
}

impl Level {
    pub fn build(world: &mut SimulationWorld, config: &LevelConfig) -> Self {
        let pieces = config.pieces.iter().map(|piece| Scenery::spawn(world, piece)).collect::<Vec<_>>();
        tracing::info!(pieces = pieces.len(), "level built");
        Self { pieces }
    }

    pub fn pieces(&self) -> &[Scenery] {
        &self.pieces
    }

    pub fn render<C: Canvas>(&self, canvas: &mut C) {
        for piece in &self.pieces {
            canvas.draw_rect(&piece.visual);
        }
    }

    /// Destroy every scenery body. Safe to call more than once.
    pub fn teardown(&mut self, world: &mut SimulationWorld) {
        for piece in self.pieces.drain(..) {
            world.destroy_body(piece.body);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use glam::Vec2;

    #[test]
    fn test_default_level_builds_ground_and_ledge() {
        let mut world = SimulationWorld::new(&PhysicsConfig::default());
        let level = Level::build(&mut world, &LevelConfig::default());

        assert_eq!(level.pieces().len(), 2);
        assert_eq!(world.body_count(), 2);

        let ground = &level.pieces()[0];
        assert_eq!(ground.name(), "ground");
        assert_eq!(world.body_tag(ground.body()), Some(BodyTag::Scenery));
        assert_eq!(world.position(ground.body()), Vec2::new(300.0, 300.0));
        assert_eq!(ground.visual().corners()[0], Vec2::new(150.0, 250.0));

        let ledge = &level.pieces()[1];
        assert_eq!(ledge.visual().position, Vec2::new(600.0, 300.0));
        assert_eq!(ledge.visual().origin, Vec2::ZERO);
    }

    #[test]
    fn test_scenery_bodies_do_not_move() {
        let mut world = SimulationWorld::new(&PhysicsConfig::default());
        let level = Level::build(&mut world, &LevelConfig::default());
        let mut actors = crate::model::ActorSet::new();
        for _ in 0..30 {
            world.advance(&mut crate::controller::contact::ContactRouter::new(&mut actors));
        }
        assert_eq!(world.position(level.pieces()[0].body()), Vec2::new(300.0, 300.0));
    }

    #[test]
    fn test_teardown_destroys_bodies() {
        let mut world = SimulationWorld::new(&PhysicsConfig::default());
        let mut level = Level::build(&mut world, &LevelConfig::default());
        level.teardown(&mut world);
        level.teardown(&mut world);
        assert_eq!(world.body_count(), 0);
        assert!(level.pieces().is_empty());
    }
}
