//! Frame loop and lifecycle shared by every game.
//!
//! An [`Engine`] owns one [`Simulation`] together with its canvas, input port
//! and asset registry. The host calls [`Engine::tick`] whenever its refresh
//! primitive fires and a frame is pending.

use anyhow::{Context, Result};
use crossterm::event::KeyCode;

use crate::assets::{AssetLoader, Assets};
use crate::config::SurfaceConfig;
use crate::input::{InputEvent, InputSource, Touch};
use crate::surface::{Canvas, Rgb, Surface};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Running,
    Paused,
    GameOver,
}

/// What a simulation asks of the engine after handling a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    None,
    Restart,
}

pub trait Simulation {
    fn name(&self) -> &str;

    /// Sprite paths this game renders with.
    fn asset_paths(&self) -> Vec<String>;

    fn state(&self) -> GameState;
    fn set_state(&mut self, state: GameState);

    /// Advances the simulation by `delta_ms`. Implementations do nothing
    /// unless running.
    fn update(&mut self, delta_ms: f64);

    fn render(&self, surface: &mut dyn Surface, assets: &Assets);

    fn on_key(&mut self, key: KeyCode) -> Control;

    fn on_touch_start(&mut self, _touch: Touch) {}

    fn on_touch_move(&mut self, _touch: Touch) {}

    /// Puts game-specific state back to its initial configuration.
    fn reset(&mut self) {}

    /// Headline score shown by the cabinet.
    fn score(&self) -> u32;
}

impl<S: Simulation + ?Sized> Simulation for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn asset_paths(&self) -> Vec<String> {
        (**self).asset_paths()
    }

    fn state(&self) -> GameState {
        (**self).state()
    }

    fn set_state(&mut self, state: GameState) {
        (**self).set_state(state)
    }

    fn update(&mut self, delta_ms: f64) {
        (**self).update(delta_ms)
    }

    fn render(&self, surface: &mut dyn Surface, assets: &Assets) {
        (**self).render(surface, assets)
    }

    fn on_key(&mut self, key: KeyCode) -> Control {
        (**self).on_key(key)
    }

    fn on_touch_start(&mut self, touch: Touch) {
        (**self).on_touch_start(touch)
    }

    fn on_touch_move(&mut self, touch: Touch) {
        (**self).on_touch_move(touch)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn score(&self) -> u32 {
        (**self).score()
    }
}

pub struct Engine<S> {
    sim: S,
    canvas: Canvas,
    input: Box<dyn InputSource>,
    assets: Assets,
    pending_frame: Option<u64>,
    next_frame_id: u64,
    last_timestamp: Option<f64>,
}

impl<S: Simulation> Engine<S> {
    /// Acquires the drawing surface and subscribes to `input`. Fails when no
    /// surface can be had.
    pub fn new(
        surface: SurfaceConfig,
        sim: S,
        mut input: Box<dyn InputSource>,
        assets: Assets,
    ) -> Result<Self> {
        let canvas = Canvas::acquire(surface.width, surface.height)
            .with_context(|| format!("could not get a drawing surface for {}", sim.name()))?;
        input.subscribe();
        tracing::debug!(target: "engine", game = sim.name(), "engine constructed");
        Ok(Self {
            sim,
            canvas,
            input,
            assets,
            pending_frame: None,
            next_frame_id: 0,
            last_timestamp: None,
        })
    }

    /// Like [`Engine::new`], loading the game's sprites from `loader`.
    pub fn launch(
        surface: SurfaceConfig,
        sim: S,
        input: Box<dyn InputSource>,
        loader: &AssetLoader,
    ) -> Result<Self> {
        let assets = loader.load(&sim.asset_paths());
        Self::new(surface, sim, input, assets)
    }

    pub fn start(&mut self) {
        tracing::debug!(target: "engine", game = self.sim.name(), "start");
        self.sim.set_state(GameState::Running);
        self.last_timestamp = None;
        self.request_frame();
    }

    pub fn pause(&mut self) {
        tracing::debug!(target: "engine", game = self.sim.name(), "pause");
        self.sim.set_state(GameState::Paused);
        self.cancel_frame();
    }

    pub fn resume(&mut self) {
        if self.sim.state() == GameState::Paused {
            tracing::debug!(target: "engine", game = self.sim.name(), "resume");
            self.sim.set_state(GameState::Running);
            self.last_timestamp = None;
            self.request_frame();
        }
    }

    pub fn restart(&mut self) {
        tracing::debug!(target: "engine", game = self.sim.name(), "restart");
        self.sim.reset();
        self.start();
    }

    /// Cancels the pending frame and releases the input port. Safe to call
    /// any number of times.
    pub fn cleanup(&mut self) {
        self.cancel_frame();
        if self.input.is_subscribed() {
            tracing::debug!(target: "engine", game = self.sim.name(), "cleanup");
            self.input.unsubscribe();
        }
    }

    pub fn frame_pending(&self) -> bool {
        self.pending_frame.is_some()
    }

    /// Runs one frame at `timestamp_ms`: update, clear, render, and request
    /// the next frame. A tick with no pending request, or while not running,
    /// does nothing.
    pub fn tick(&mut self, timestamp_ms: f64) {
        if self.pending_frame.take().is_none() {
            return;
        }
        if self.sim.state() != GameState::Running {
            return;
        }

        let delta = match self.last_timestamp {
            Some(last) => (timestamp_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_timestamp = Some(timestamp_ms);

        self.assets.poll();
        self.sim.update(delta);
        self.canvas.clear(Rgb::BLACK);
        self.sim.render(&mut self.canvas, &self.assets);

        self.request_frame();
    }

    /// Drains the input port into the simulation's handlers.
    pub fn pump_input(&mut self) {
        while let Some(event) = self.input.poll() {
            match event {
                InputEvent::Key(key) => {
                    if self.sim.on_key(key) == Control::Restart {
                        self.restart();
                    }
                }
                InputEvent::TouchStart(touch) => self.sim.on_touch_start(touch),
                InputEvent::TouchMove(touch) => self.sim.on_touch_move(touch),
            }
        }
    }

    pub fn state(&self) -> GameState {
        self.sim.state()
    }

    pub fn simulation(&self) -> &S {
        &self.sim
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn assets_mut(&mut self) -> &mut Assets {
        &mut self.assets
    }

    fn request_frame(&mut self) {
        self.next_frame_id += 1;
        self.pending_frame = Some(self.next_frame_id);
    }

    fn cancel_frame(&mut self) {
        self.pending_frame = None;
    }
}

impl<S> Drop for Engine<S> {
    fn drop(&mut self) {
        self.pending_frame = None;
        if self.input.is_subscribed() {
            self.input.unsubscribe();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputQueue;

    struct Counter {
        state: GameState,
        updates: Vec<f64>,
        renders: std::cell::Cell<u32>,
        end_after: Option<usize>,
    }

    impl Counter {
        fn new() -> Self {
            Self {
                state: GameState::Running,
                updates: Vec::new(),
                renders: std::cell::Cell::new(0),
                end_after: None,
            }
        }
    }

    impl Simulation for Counter {
        fn name(&self) -> &str {
            "counter"
        }

        fn asset_paths(&self) -> Vec<String> {
            Vec::new()
        }

        fn state(&self) -> GameState {
            self.state
        }

        fn set_state(&mut self, state: GameState) {
            self.state = state;
        }

        fn update(&mut self, delta_ms: f64) {
            if self.state != GameState::Running {
                return;
            }
            self.updates.push(delta_ms);
            if Some(self.updates.len()) == self.end_after {
                self.state = GameState::GameOver;
            }
        }

        fn render(&self, _surface: &mut dyn Surface, _assets: &Assets) {
            self.renders.set(self.renders.get() + 1);
        }

        fn on_key(&mut self, key: KeyCode) -> Control {
            if key == KeyCode::Enter {
                Control::Restart
            } else {
                Control::None
            }
        }

        fn reset(&mut self) {
            self.updates.clear();
        }

        fn score(&self) -> u32 {
            self.updates.len() as u32
        }
    }

    fn engine(sim: Counter) -> Engine<Counter> {
        Engine::new(
            SurfaceConfig::default(),
            sim,
            Box::new(InputQueue::new()),
            Assets::pending::<&str>(&[]),
        )
        .unwrap()
    }

    #[test]
    fn construction_fails_without_surface() {
        let result = Engine::new(
            SurfaceConfig { width: 0, height: 0 },
            Counter::new(),
            Box::new(InputQueue::new()),
            Assets::pending::<&str>(&[]),
        );
        assert!(result.is_err());
    }

    #[test]
    fn first_tick_has_zero_delta() {
        let mut e = engine(Counter::new());
        e.start();
        e.tick(1000.0);
        e.tick(1016.0);
        assert_eq!(e.simulation().updates, vec![0.0, 16.0]);
        assert_eq!(e.simulation().renders.get(), 2);
    }

    #[test]
    fn tick_without_request_is_ignored() {
        let mut e = engine(Counter::new());
        e.tick(5.0);
        assert!(e.simulation().updates.is_empty());
    }

    #[test]
    fn pause_stops_updates_until_resume() {
        let mut e = engine(Counter::new());
        e.start();
        e.tick(0.0);
        e.pause();
        assert!(!e.frame_pending());
        e.tick(16.0);
        assert_eq!(e.simulation().updates.len(), 1);

        e.resume();
        e.tick(500.0);
        assert_eq!(e.simulation().updates, vec![0.0, 0.0]);
    }

    #[test]
    fn game_over_renders_once_then_stops() {
        let mut sim = Counter::new();
        sim.end_after = Some(2);
        let mut e = engine(sim);
        e.start();
        e.tick(0.0);
        e.tick(16.0);
        assert_eq!(e.state(), GameState::GameOver);
        assert_eq!(e.simulation().renders.get(), 2);
        assert!(e.frame_pending());

        e.tick(32.0);
        assert!(!e.frame_pending());
        assert_eq!(e.simulation().renders.get(), 2);
    }

    #[test]
    fn restart_key_goes_through_engine() {
        let mut queue = InputQueue::new();
        queue.subscribe();
        queue.push(InputEvent::Key(KeyCode::Enter));
        let mut e = Engine::new(
            SurfaceConfig::default(),
            Counter::new(),
            Box::new(queue),
            Assets::pending::<&str>(&[]),
        )
        .unwrap();
        e.start();
        e.tick(0.0);
        e.pump_input();
        assert!(e.simulation().updates.is_empty());
        assert!(e.frame_pending());
    }

    #[test]
    fn cleanup_twice_leaves_nothing_pending() {
        let mut e = engine(Counter::new());
        e.start();
        e.cleanup();
        e.cleanup();
        assert!(!e.frame_pending());
        e.tick(16.0);
        assert!(e.simulation().updates.is_empty());
    }
}
