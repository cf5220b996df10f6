// MODEL: actors, static level geometry, and drawable shapes
pub mod actor;
pub mod level;
pub mod shape;

pub use actor::{Actor, ActorId, ActorSet, ContactState};
pub use level::{Level, Scenery};
pub use shape::{Color, RectShape};
