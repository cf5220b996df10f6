// CONTROLLER: physics stepping, contact routing, input, and the frame loop
pub mod contact;
pub mod frame_loop;
pub mod input;
pub mod physics;

pub use contact::{ContactListener, ContactPair, ContactRouter};
pub use frame_loop::{FrameLoop, LoopState};
pub use input::{ControlOutcome, InputController, InputEvent, InputState, KeyBindings};
pub use physics::{BodyDesc, BodyHandle, BodyKind, BodyTag, ColliderShape, SimulationWorld};
