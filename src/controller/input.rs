//! Keyboard input handling and impulse-based control

use std::collections::{HashSet, VecDeque};

use glam::Vec2;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::config::ControlConfig;
use crate::controller::physics::{BodyHandle, SimulationWorld};

/// Discrete input events, already translated from window events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyPressed(KeyCode),
    KeyReleased(KeyCode),
    CloseRequested,
    FocusLost,
}

impl InputEvent {
    /// Key transition to event. Auto-repeats are dropped so a held key
    /// yields exactly one press and one release.
    pub fn from_key(code: KeyCode, state: ElementState, repeat: bool) -> Option<Self> {
        if repeat {
            return None;
        }
        Some(match state {
            ElementState::Pressed => InputEvent::KeyPressed(code),
            ElementState::Released => InputEvent::KeyReleased(code),
        })
    }

    /// The window events the frame loop cares about; everything else is `None`
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent { state, physical_key: PhysicalKey::Code(code), repeat, .. },
                ..
            } => Self::from_key(*code, *state, *repeat),
            WindowEvent::CloseRequested => Some(InputEvent::CloseRequested),
            WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
            _ => None,
        }
    }
}

/// Held keys plus the discrete events not yet consumed by a frame
#[derive(Debug, Default)]
pub struct InputState {
    held_keys: HashSet<KeyCode>,
    pending: VecDeque<InputEvent>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event: held keys update immediately, the event is queued
    pub fn push(&mut self, event: InputEvent) {
        match event {
            InputEvent::KeyPressed(key) => {
                self.held_keys.insert(key);
            }
            InputEvent::KeyReleased(key) => {
                self.held_keys.remove(&key);
            }
            InputEvent::FocusLost => self.clear_keys(),
            InputEvent::CloseRequested => {}
        }
        self.pending.push_back(event);
    }

    pub fn drain_events(&mut self) -> Vec<InputEvent> {
        self.pending.drain(..).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.held_keys.contains(&key)
    }

    pub fn clear_keys(&mut self) {
        self.held_keys.clear();
    }
}

/// Key mapping configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBindings {
    pub jump: KeyCode,
    pub quit: KeyCode,
    pub left: KeyCode,
    pub right: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            jump: KeyCode::Space,
            quit: KeyCode::Escape,
            left: KeyCode::ArrowLeft,
            right: KeyCode::ArrowRight,
        }
    }
}

/// What the frame loop should do after input was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    Continue,
    Quit,
}

/// Impulse that takes a body of `mass` from `current` to `target` velocity
/// along one axis. Multiplying by mass cancels `impulse = mass * dv`, so the
/// resulting velocity does not depend on how heavy the body is.
pub fn velocity_change_impulse(mass: f32, current: f32, target: f32) -> f32 {
    mass * (target - current)
}

/// Turns key state into target-velocity impulses on one body
#[derive(Debug, Clone)]
pub struct InputController {
    bindings: KeyBindings,
    jump_velocity: f32,
    move_speed: f32,
}

impl InputController {
    pub fn new(bindings: KeyBindings, control: &ControlConfig) -> Self {
        Self {
            bindings,
            jump_velocity: control.jump_velocity,
            move_speed: control.move_speed,
        }
    }

    /// Horizontal target velocity from held keys. Left wins when both are held.
    pub fn horizontal_target(&self, input: &InputState) -> Option<f32> {
        if input.is_key_held(self.bindings.left) {
            Some(-self.move_speed)
        } else if input.is_key_held(self.bindings.right) {
            Some(self.move_speed)
        } else {
            None
        }
    }

    /// Drain pending events, then apply held-key movement to `body`.
    /// Returns `Quit` on a quit-key release or a close request.
    pub fn apply(&self, input: &mut InputState, world: &mut SimulationWorld, body: BodyHandle) -> ControlOutcome {
        for event in input.drain_events() {
            match event {
                InputEvent::CloseRequested => {
                    tracing::info!("close requested");
                    return ControlOutcome::Quit;
                }
                InputEvent::KeyReleased(key) if key == self.bindings.quit => {
                    tracing::info!(?key, "quit key released");
                    return ControlOutcome::Quit;
                }
                InputEvent::KeyReleased(key) if key == self.bindings.jump => {
                    let impulse = velocity_change_impulse(
                        world.mass(body),
                        world.linear_velocity(body).y,
                        self.jump_velocity,
                    );
                    world.apply_linear_impulse(body, Vec2::new(0.0, impulse), world.world_center(body));
                    tracing::debug!(impulse, "jump");
                }
                _ => {}
            }
        }

        if let Some(target) = self.horizontal_target(input) {
            let impulse = velocity_change_impulse(world.mass(body), world.linear_velocity(body).x, target);
            world.apply_linear_impulse(body, Vec2::new(impulse, 0.0), world.world_center(body));
            tracing::trace!(impulse, target, "horizontal impulse");
        }

        ControlOutcome::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::controller::physics::{BodyDesc, BodyTag, ColliderShape};
    use crate::model::ActorId;

    struct NoContacts;

    impl crate::controller::contact::ContactListener for NoContacts {
        fn begin_contact(&mut self, _pair: &crate::controller::contact::ContactPair) {}
        fn end_contact(&mut self, _pair: &crate::controller::contact::ContactPair) {}
    }

    /// Zero-gravity world with one free box of the given density
    fn world_with_box(density: f32) -> (SimulationWorld, BodyHandle) {
        let mut world = SimulationWorld::new(&PhysicsConfig { gravity: Vec2::ZERO, ..PhysicsConfig::default() });
        let desc = BodyDesc::dynamic(Vec2::new(400.0, 50.0), ColliderShape::Cuboid { half_extents: Vec2::splat(10.0) })
            .with_material(density, 0.1);
        let body = world.create_body(&desc, BodyTag::Actor(ActorId(0)));
        world.advance(&mut NoContacts);
        (world, body)
    }

    fn controller() -> InputController {
        InputController::new(KeyBindings::default(), &ControlConfig::default())
    }

    #[test]
    fn test_velocity_change_impulse_formula() {
        assert_eq!(velocity_change_impulse(40.0, 3.0, -20.0), 40.0 * -23.0);
        assert_eq!(velocity_change_impulse(2.0, 5.0, 5.0), 0.0);
    }

    #[test]
    fn test_key_repeats_are_dropped() {
        assert_eq!(
            InputEvent::from_key(KeyCode::Space, ElementState::Pressed, false),
            Some(InputEvent::KeyPressed(KeyCode::Space))
        );
        assert_eq!(InputEvent::from_key(KeyCode::Space, ElementState::Pressed, true), None);
        assert_eq!(InputEvent::from_key(KeyCode::Space, ElementState::Released, true), None);
        assert_eq!(
            InputEvent::from_key(KeyCode::Space, ElementState::Released, false),
            Some(InputEvent::KeyReleased(KeyCode::Space))
        );
    }

    #[test]
    fn test_held_space_with_auto_repeat_queues_one_release() {
        let mut input = InputState::new();
        let stream = [
            (ElementState::Pressed, false),
            (ElementState::Pressed, true),
            (ElementState::Pressed, true),
            (ElementState::Released, false),
        ];
        for (state, repeat) in stream {
            if let Some(event) = InputEvent::from_key(KeyCode::Space, state, repeat) {
                input.push(event);
            }
        }
        let events = input.drain_events();
        assert_eq!(
            events,
            vec![InputEvent::KeyPressed(KeyCode::Space), InputEvent::KeyReleased(KeyCode::Space)]
        );
    }

    #[test]
    fn test_window_events_map_to_input_events() {
        assert_eq!(InputEvent::from_window_event(&WindowEvent::CloseRequested), Some(InputEvent::CloseRequested));
        assert_eq!(InputEvent::from_window_event(&WindowEvent::Focused(false)), Some(InputEvent::FocusLost));
        assert_eq!(InputEvent::from_window_event(&WindowEvent::Focused(true)), None);
        assert_eq!(InputEvent::from_window_event(&WindowEvent::RedrawRequested), None);
    }

    #[test]
    fn test_input_state_tracks_held_keys_and_queue() {
        let mut input = InputState::new();
        input.push(InputEvent::KeyPressed(KeyCode::ArrowLeft));
        assert!(input.is_key_held(KeyCode::ArrowLeft));
        input.push(InputEvent::KeyReleased(KeyCode::ArrowLeft));
        assert!(!input.is_key_held(KeyCode::ArrowLeft));
        assert_eq!(input.drain_events().len(), 2);
        assert!(!input.has_pending());

        input.push(InputEvent::KeyPressed(KeyCode::ArrowRight));
        input.push(InputEvent::FocusLost);
        assert!(!input.is_key_held(KeyCode::ArrowRight));
    }

    #[test]
    fn test_jump_reaches_target_independent_of_mass() {
        for density in [0.05, 0.1, 2.0] {
            let (mut world, body) = world_with_box(density);
            world.set_linear_velocity(body, Vec2::new(0.0, 7.5));

            let mut input = InputState::new();
            input.push(InputEvent::KeyPressed(KeyCode::Space));
            input.push(InputEvent::KeyReleased(KeyCode::Space));
            assert_eq!(controller().apply(&mut input, &mut world, body), ControlOutcome::Continue);
            world.advance(&mut NoContacts);

            let vy = world.linear_velocity(body).y;
            assert!((vy + 20.0).abs() < 1e-3, "density {density}: vy = {vy}");
        }
    }

    #[test]
    fn test_jump_fires_on_release_only() {
        let (mut world, body) = world_with_box(0.1);
        let mut input = InputState::new();
        input.push(InputEvent::KeyPressed(KeyCode::Space));
        controller().apply(&mut input, &mut world, body);
        assert_eq!(world.linear_velocity(body).y, 0.0);
    }

    #[test]
    fn test_repeated_jump_releases_land_on_target() {
        let (mut world, body) = world_with_box(0.1);
        let mut input = InputState::new();
        for _ in 0..3 {
            input.push(InputEvent::KeyReleased(KeyCode::Space));
        }
        controller().apply(&mut input, &mut world, body);
        assert!((world.linear_velocity(body).y + 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_held_right_moves_at_target_speed() {
        let (mut world, body) = world_with_box(0.1);
        world.set_linear_velocity(body, Vec2::new(-2.0, 0.0));
        let mut input = InputState::new();
        input.push(InputEvent::KeyPressed(KeyCode::ArrowRight));
        controller().apply(&mut input, &mut world, body);
        assert!((world.linear_velocity(body).x - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_left_wins_when_both_held() {
        let control = controller();

        let mut both = InputState::new();
        both.push(InputEvent::KeyPressed(KeyCode::ArrowRight));
        both.push(InputEvent::KeyPressed(KeyCode::ArrowLeft));
        let mut left_only = InputState::new();
        left_only.push(InputEvent::KeyPressed(KeyCode::ArrowLeft));
        assert_eq!(control.horizontal_target(&both), control.horizontal_target(&left_only));
        assert_eq!(control.horizontal_target(&both), Some(-5.0));

        let (mut world_a, body_a) = world_with_box(0.1);
        let (mut world_b, body_b) = world_with_box(0.1);
        control.apply(&mut both, &mut world_a, body_a);
        control.apply(&mut left_only, &mut world_b, body_b);
        assert_eq!(world_a.linear_velocity(body_a), world_b.linear_velocity(body_b));
    }

    #[test]
    fn test_no_input_applies_no_impulse() {
        let (mut world, body) = world_with_box(0.1);
        world.set_linear_velocity(body, Vec2::new(1.5, -0.5));
        let mut input = InputState::new();
        controller().apply(&mut input, &mut world, body);
        assert_eq!(world.linear_velocity(body), Vec2::new(1.5, -0.5));
    }

    #[test]
    fn test_quit_and_close_end_control() {
        let (mut world, body) = world_with_box(0.1);

        let mut input = InputState::new();
        input.push(InputEvent::KeyPressed(KeyCode::Escape));
        assert_eq!(controller().apply(&mut input, &mut world, body), ControlOutcome::Continue);
        input.push(InputEvent::KeyReleased(KeyCode::Escape));
        assert_eq!(controller().apply(&mut input, &mut world, body), ControlOutcome::Quit);

        input.push(InputEvent::CloseRequested);
        assert_eq!(controller().apply(&mut input, &mut world, body), ControlOutcome::Quit);
    }
}
