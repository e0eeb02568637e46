//! Fixed timestep loop driver
//!
//! `Game` owns the scenes and the stop/pause flags. The host calls
//! `advance` with wall-clock time each frame; whole ticks are run out of an
//! accumulator so simulation stays independent of frame rate.

use super::scene::{Scene, TickReport};
use crate::error::{EngineError, Result};
use crate::settings::Settings;

/// Largest frame delta fed to the accumulator, in seconds
const MAX_FRAME_DT: f32 = 0.1;

#[derive(Debug)]
pub struct Game {
    settings: Settings,
    scenes: Vec<Scene>,
    paused: bool,
    stopped: bool,
    accumulator: f32,
    ticks: u64,
}

impl Game {
    /// New game, stopped until `start` is called
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            settings,
            scenes: Vec::new(),
            paused: false,
            stopped: true,
            accumulator: 0.0,
            ticks: 0,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Create a scene with the game's settings and return it for setup
    pub fn make_scene(&mut self, name: impl Into<String>) -> Result<&mut Scene> {
        let scene = Scene::new(name, self.settings.clone())?;
        self.scenes.push(scene);
        self.scenes
            .last_mut()
            .ok_or_else(|| EngineError::InvariantViolation("scene list empty after push".into()))
    }

    pub fn add_scene(&mut self, scene: Scene) {
        self.scenes.push(scene);
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.name() == name)
    }

    pub fn scene_mut(&mut self, name: &str) -> Option<&mut Scene> {
        self.scenes.iter_mut().find(|s| s.name() == name)
    }

    pub fn start(&mut self) {
        if self.stopped {
            log::info!("Game started with {} scene(s)", self.scenes.len());
        }
        self.stopped = false;
    }

    /// Halt scheduling. Leftover accumulated time is dropped.
    pub fn stop(&mut self) {
        if !self.stopped {
            log::info!("Game stopped after {} ticks", self.ticks);
        }
        self.stopped = true;
        self.accumulator = 0.0;
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Ticks run since creation
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Run exactly one tick of every scene, in insertion order.
    ///
    /// Returns no reports while stopped or paused.
    pub fn step(&mut self) -> Vec<TickReport> {
        if self.stopped || self.paused {
            return Vec::new();
        }
        self.ticks += 1;
        self.scenes.iter_mut().map(Scene::tick).collect()
    }

    /// Feed wall-clock time and run as many whole ticks as fit, up to
    /// `max_substeps`. Returns the number of ticks run.
    pub fn advance(&mut self, elapsed_secs: f32) -> u32 {
        if self.stopped || self.paused || !elapsed_secs.is_finite() {
            return 0;
        }

        let sim_dt = self.settings.tick_dt();
        let dt = elapsed_secs.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= sim_dt && substeps < self.settings.max_substeps {
            self.step();
            self.accumulator -= sim_dt;
            substeps += 1;
        }
        substeps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityBuilder;
    use crate::sim::sprite::Kinematics;

    fn game() -> Game {
        let mut g = Game::new(Settings::default()).unwrap();
        let scene = g.make_scene("main").unwrap();
        let k = Kinematics::new().with_velocity(1.0, 0.0);
        scene
            .spawn(EntityBuilder::new(2.0, 2.0).at(10.0, 10.0).kinematic(k))
            .unwrap();
        g
    }

    fn x_of_first(g: &Game) -> f32 {
        g.scene("main").unwrap().entities()[0].position().x()
    }

    #[test]
    fn test_new_game_is_stopped() {
        let mut g = game();
        assert!(g.is_stopped());
        assert!(g.step().is_empty());
        assert_eq!(g.advance(1.0), 0);
        assert_eq!(x_of_first(&g), 10.0);
    }

    #[test]
    fn test_step_runs_one_tick() {
        let mut g = game();
        g.start();
        let reports = g.step();
        assert_eq!(reports.len(), 1);
        assert!(reports[0].ticked);
        assert_eq!(g.ticks(), 1);
        assert_eq!(x_of_first(&g), 11.0);
    }

    #[test]
    fn test_pause_skips_ticks() {
        let mut g = game();
        g.start();
        g.pause();
        assert!(g.step().is_empty());
        assert_eq!(g.advance(0.05), 0);
        g.unpause();
        g.step();
        assert_eq!(x_of_first(&g), 11.0);
    }

    #[test]
    fn test_advance_accumulates_partial_frames() {
        let mut g = game();
        g.start();
        let dt = g.settings().tick_dt();
        // Two frames of 0.6 ticks each make one whole tick
        assert_eq!(g.advance(dt * 0.6), 0);
        assert_eq!(g.advance(dt * 0.6), 1);
        assert_eq!(g.ticks(), 1);
    }

    #[test]
    fn test_advance_caps_substeps() {
        let mut settings = Settings::default();
        settings.tick_rate = 1000.0;
        settings.max_substeps = 4;
        let mut g = Game::new(settings).unwrap();
        g.start();
        // A long stall is clamped and then capped
        assert_eq!(g.advance(5.0), 4);
        assert_eq!(g.ticks(), 4);
    }

    #[test]
    fn test_stop_drops_accumulated_time() {
        let mut g = game();
        g.start();
        let dt = g.settings().tick_dt();
        g.advance(dt * 0.9);
        g.stop();
        g.start();
        assert_eq!(g.advance(dt * 0.5), 0);
    }

    #[test]
    fn test_advance_ignores_bad_deltas() {
        let mut g = game();
        g.start();
        assert_eq!(g.advance(f32::NAN), 0);
        assert_eq!(g.advance(-1.0), 0);
        assert_eq!(g.ticks(), 0);
    }

    #[test]
    fn test_scenes_tick_in_order() {
        let mut g = game();
        g.make_scene("second").unwrap();
        g.start();
        let reports = g.step();
        assert_eq!(reports.len(), 2);
        assert_eq!(g.scenes()[1].name(), "second");
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let settings = Settings::with_size(-1.0, 10.0);
        assert!(Game::new(settings).is_err());
    }
}
