use std::convert::Infallible;

use glam::Vec2;
use impulse_playground::config::{ActorConfig, ControlConfig, PhysicsConfig, PlaygroundConfig};
use impulse_playground::controller::{
    BodyTag, ContactListener, ContactPair, ContactRouter, FrameLoop, InputController, InputEvent, InputState,
    KeyBindings, LoopState, SimulationWorld,
};
use impulse_playground::model::{ActorSet, Color, RectShape};
use impulse_playground::view::Canvas;
use winit::keyboard::KeyCode;

#[derive(Default)]
struct RecordingCanvas {
    rects: Vec<RectShape>,
    presents: usize,
}

impl Canvas for RecordingCanvas {
    type Error = Infallible;

    fn clear(&mut self, _color: Color) {
        self.rects.clear();
    }

    fn draw_rect(&mut self, rect: &RectShape) {
        self.rects.push(*rect);
    }

    fn present(&mut self) -> Result<(), Infallible> {
        self.presents += 1;
        Ok(())
    }
}

fn zero_gravity() -> PhysicsConfig {
    PhysicsConfig { gravity: Vec2::ZERO, ..PhysicsConfig::default() }
}

#[test]
fn two_contacts_survive_one_end() {
    let mut world = SimulationWorld::new(&PhysicsConfig::default());
    let mut actors = ActorSet::new();
    let id = actors.spawn(&mut world, Vec2::new(400.0, 50.0), &ActorConfig::default());
    let pair = ContactPair { a: Some(BodyTag::Actor(id)), b: Some(BodyTag::Scenery) };

    let mut router = ContactRouter::new(&mut actors);
    router.begin_contact(&pair);
    router.begin_contact(&pair);
    router.end_contact(&pair);

    let actor = actors.get(id).unwrap();
    assert!(actor.is_contacting());
    assert_eq!(actor.contact_count(), 1);
}

#[test]
fn single_contact_end_clears_state() {
    let mut world = SimulationWorld::new(&PhysicsConfig::default());
    let mut actors = ActorSet::new();
    let id = actors.spawn(&mut world, Vec2::new(400.0, 50.0), &ActorConfig::default());
    let pair = ContactPair { a: Some(BodyTag::Scenery), b: Some(BodyTag::Actor(id)) };

    let mut router = ContactRouter::new(&mut actors);
    router.begin_contact(&pair);
    router.end_contact(&pair);
    // stray end never underflows
    router.end_contact(&pair);

    let actor = actors.get(id).unwrap();
    assert!(!actor.is_contacting());
    assert_eq!(actor.fill_color(), Color::RED);
}

#[test]
fn jump_velocity_is_mass_independent() {
    let control = InputController::new(KeyBindings::default(), &ControlConfig::default());

    for density in [0.1, 1.0, 10.0] {
        let mut world = SimulationWorld::new(&zero_gravity());
        let mut actors = ActorSet::new();
        let config = ActorConfig { density, ..ActorConfig::default() };
        let id = actors.spawn(&mut world, Vec2::new(400.0, 50.0), &config);
        let body = actors.get(id).unwrap().body();
        world.advance(&mut ContactRouter::new(&mut actors));
        world.set_linear_velocity(body, Vec2::new(0.0, 3.0));

        let mut input = InputState::new();
        input.push(InputEvent::KeyReleased(KeyCode::Space));
        control.apply(&mut input, &mut world, body);
        world.advance(&mut ContactRouter::new(&mut actors));

        let vy = world.linear_velocity(body).y;
        assert!((vy + 20.0).abs() < 1e-3, "density {density}: vy = {vy}");
    }
}

#[test]
fn first_frame_only_gravity_acts() {
    let config = PlaygroundConfig::default();
    let mut frame_loop = FrameLoop::new(&config);
    let mut canvas = RecordingCanvas::default();

    assert_eq!(frame_loop.run_frame(&mut canvas), Ok(LoopState::Running));

    let body = frame_loop.actors().get(frame_loop.player()).unwrap().body();
    let vel = frame_loop.world().linear_velocity(body);
    assert!((vel.y - 9.8 / 60.0).abs() < 1e-3);
    assert_eq!(vel.x, 0.0);
    assert_eq!(canvas.presents, 1);
}

#[test]
fn holding_both_directions_moves_left() {
    let mut config = PlaygroundConfig::default();
    config.physics = zero_gravity();
    let mut frame_loop = FrameLoop::new(&config);
    let mut canvas = RecordingCanvas::default();

    frame_loop.push_event(InputEvent::KeyPressed(KeyCode::ArrowRight));
    frame_loop.push_event(InputEvent::KeyPressed(KeyCode::ArrowLeft));
    frame_loop.run_frame(&mut canvas).unwrap();

    let body = frame_loop.actors().get(frame_loop.player()).unwrap().body();
    let vx = frame_loop.world().linear_velocity(body).x;
    assert!((vx + 5.0).abs() < 1e-3, "vx = {vx}");
}

#[test]
fn escape_release_ends_the_loop() {
    let mut frame_loop = FrameLoop::new(&PlaygroundConfig::default());
    let mut canvas = RecordingCanvas::default();

    frame_loop.push_event(InputEvent::KeyPressed(KeyCode::Escape));
    frame_loop.push_event(InputEvent::KeyReleased(KeyCode::Escape));
    assert_eq!(frame_loop.run_frame(&mut canvas), Ok(LoopState::Terminated));
    assert_eq!(frame_loop.world().steps(), 0);

    frame_loop.teardown();
    assert_eq!(frame_loop.world().body_count(), 0);
}

#[test]
fn config_file_overrides_spawn() {
    let config = PlaygroundConfig::from_json_str(r#"{ "actor": { "spawn": [100.0, 20.0] } }"#).unwrap();
    let frame_loop = FrameLoop::new(&config);
    let body = frame_loop.actors().get(frame_loop.player()).unwrap().body();
    assert_eq!(frame_loop.world().position(body), Vec2::new(100.0, 20.0));
    assert_eq!(frame_loop.level().pieces().len(), 2);
}
