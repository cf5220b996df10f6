use crate::config::PlaygroundConfig;
use crate::controller::contact::ContactRouter;
use crate::controller::input::{ControlOutcome, InputController, InputEvent, InputState, KeyBindings};
use crate::controller::physics::SimulationWorld;
use crate::model::{ActorId, ActorSet, Color, Level};
use crate::view::Canvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Terminated,
}

/// Main loop state: owns the world, the level, the actors and the input
/// pipeline, and runs one frame at a time.
pub struct FrameLoop {
    world: SimulationWorld,
    level: Level,
    actors: ActorSet,
    player: ActorId,
    input: InputState,
    controller: InputController,
    clear_color: Color,
    state: LoopState,
    frames: u64,
}

impl FrameLoop {
    /// Wire world, static geometry, one controllable actor and the input
    /// pipeline from `config`
    pub fn new(config: &PlaygroundConfig) -> Self {
        let mut world = SimulationWorld::new(&config.physics);
        let level = Level::build(&mut world, &config.level);
        let mut actors = ActorSet::new();
        let player = actors.spawn(&mut world, config.actor.spawn, &config.actor);
        let controller = InputController::new(KeyBindings::default(), &config.control);

        Self {
            world,
            level,
            actors,
            player,
            input: InputState::new(),
            controller,
            clear_color: config.window.clear_color,
            state: LoopState::Running,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn world(&self) -> &SimulationWorld {
        &self.world
    }

    pub fn actors(&self) -> &ActorSet {
        &self.actors
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn player(&self) -> ActorId {
        self.player
    }

    /// Queue an input event for the next frame
    pub fn push_event(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Terminate right away, without waiting for the next frame to drain
    /// the input queue
    pub fn request_quit(&mut self) {
        if self.state == LoopState::Running {
            tracing::info!(frames = self.frames, "quit requested");
            self.state = LoopState::Terminated;
        }
    }

    /// Run one iteration: input, advance, sync, render, present.
    /// Once terminated this does nothing.
    pub fn run_frame<C: Canvas>(&mut self, canvas: &mut C) -> Result<LoopState, C::Error> {
        if self.state == LoopState::Terminated {
            return Ok(self.state);
        }

        if let Some(body) = self.actors.get(self.player).map(|player| player.body()) {
            if self.controller.apply(&mut self.input, &mut self.world, body) == ControlOutcome::Quit {
                tracing::info!(frames = self.frames, "frame loop terminated");
                self.state = LoopState::Terminated;
                return Ok(self.state);
            }
        }

        self.world.advance(&mut ContactRouter::new(&mut self.actors));

        for actor in self.actors.iter_mut() {
            actor.sync_from_body(&self.world);
        }

        canvas.clear(self.clear_color);
        self.level.render(canvas);
        for actor in self.actors.iter() {
            actor.render(canvas);
        }
        canvas.present()?;

        self.frames += 1;
        tracing::trace!(frame = self.frames, "frame done");
        Ok(self.state)
    }

    /// Destroy every body created by the loop. Safe to call more than once;
    /// also runs on drop, before the world itself goes away.
    pub fn teardown(&mut self) {
        if self.actors.is_empty() && self.level.pieces().is_empty() {
            return;
        }
        self.actors.despawn_all(&mut self.world);
        self.level.teardown(&mut self.world);
        tracing::info!(remaining_bodies = self.world.body_count(), "bodies destroyed");
    }
}

impl Drop for FrameLoop {
    fn drop(&mut self) {
        self.teardown();
    }
}
