//! Engine settings
//!
//! Scene extent bounds the sprite boundary policy; the debug flag turns on
//! per-entity tick logging. Loaded from JSON, defaults when absent.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SCENE_HEIGHT, DEFAULT_SCENE_WIDTH, DEFAULT_TICK_RATE, MAX_SUBSTEPS};
use crate::error::{EngineError, Result};
use crate::sim::Bounds;

/// Engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Scene width in pixels
    pub scene_width: f32,
    /// Scene height in pixels
    pub scene_height: f32,

    /// Log every entity's pose and collider each tick
    pub debug: bool,

    // === Loop timing ===
    /// Fixed updates per second
    pub tick_rate: f32,
    /// Cap on ticks run by a single `advance` call
    pub max_substeps: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scene_width: DEFAULT_SCENE_WIDTH,
            scene_height: DEFAULT_SCENE_HEIGHT,
            debug: false,
            tick_rate: DEFAULT_TICK_RATE,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

impl Settings {
    /// Settings with the given scene size, defaults elsewhere
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            scene_width: width,
            scene_height: height,
            ..Self::default()
        }
    }

    /// Reject values the loop and boundary policy cannot work with
    pub fn validate(&self) -> Result<()> {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !positive(self.scene_width) || !positive(self.scene_height) {
            return Err(EngineError::invalid(format!(
                "scene size must be positive, got {}x{}",
                self.scene_width, self.scene_height
            )));
        }
        if !positive(self.tick_rate) {
            return Err(EngineError::invalid(format!(
                "tick rate must be positive, got {}",
                self.tick_rate
            )));
        }
        if self.max_substeps == 0 {
            return Err(EngineError::invalid("max_substeps must be at least 1"));
        }
        Ok(())
    }

    /// Seconds per fixed update
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.scene_width, self.scene_height)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file; defaults if the file does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert_eq!(s.bounds(), Bounds::new(640.0, 480.0));
        assert!(!s.debug);
        assert!(s.validate().is_ok());
        assert!((s.tick_dt() - 1.0 / 60.0).abs() < 1e-7);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let s = Settings::from_json(r#"{ "scene_width": 800, "debug": true }"#).unwrap();
        assert_eq!(s.scene_width, 800.0);
        assert_eq!(s.scene_height, 480.0);
        assert!(s.debug);
    }

    #[test]
    fn test_json_roundtrip() {
        let s = Settings::with_size(320.0, 200.0);
        let back = Settings::from_json(&s.to_json().unwrap()).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            Settings::from_json(r#"{ "scene_width": 0 }"#),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(matches!(
            Settings::from_json(r#"{ "max_substeps": 0 }"#),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(matches!(
            Settings::from_json("not json"),
            Err(EngineError::Config(_))
        ));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("sprite-engine-missing-settings.json");
        let _ = std::fs::remove_file(&path);
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!(
            "sprite-engine-settings-{}.json",
            std::process::id()
        ));
        let s = Settings::with_size(1024.0, 768.0);
        s.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), s);
        let _ = std::fs::remove_file(&path);
    }
}
