//! Routing of collision begin/end notifications to actors

use crate::controller::physics::BodyTag;
use crate::model::ActorSet;

/// The two sides of a contact, already resolved to body tags.
/// A side is `None` when its body carries no tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContactPair {
    pub a: Option<BodyTag>,
    pub b: Option<BodyTag>,
}

impl ContactPair {
    pub fn sides(&self) -> [Option<BodyTag>; 2] {
        [self.a, self.b]
    }
}

/// Receives contact notifications synchronously from `SimulationWorld::advance`
pub trait ContactListener {
    fn begin_contact(&mut self, pair: &ContactPair);
    fn end_contact(&mut self, pair: &ContactPair);
}

/// Stateless dispatcher: each actor side of a pair is told about the
/// contact independently; scenery and untagged sides are skipped.
pub struct ContactRouter<'a> {
    actors: &'a mut ActorSet,
}

impl<'a> ContactRouter<'a> {
    pub fn new(actors: &'a mut ActorSet) -> Self {
        Self { actors }
    }
}

impl ContactListener for ContactRouter<'_> {
    fn begin_contact(&mut self, pair: &ContactPair) {
        for side in pair.sides() {
            match side {
                Some(BodyTag::Actor(id)) => match self.actors.get_mut(id) {
                    Some(actor) => {
                        actor.mark_contact_begin();
                        tracing::debug!(actor = id.0, contacts = actor.contact_count(), "contact begin");
                    }
                    None => tracing::trace!(actor = id.0, "contact begin for unknown actor"),
                },
                other => tracing::trace!(side = ?other, "contact begin on non-actor body"),
            }
        }
    }

    fn end_contact(&mut self, pair: &ContactPair) {
        for side in pair.sides() {
            match side {
                Some(BodyTag::Actor(id)) => match self.actors.get_mut(id) {
                    Some(actor) => {
                        actor.mark_contact_end();
                        tracing::debug!(actor = id.0, contacts = actor.contact_count(), "contact end");
                    }
                    None => tracing::trace!(actor = id.0, "contact end for unknown actor"),
                },
                other => tracing::trace!(side = ?other, "contact end on non-actor body"),
            }
        }
    }
}
