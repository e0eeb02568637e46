//! Sprite Engine - a small 2D sprite engine core
//!
//! Core modules:
//! - `math`: `Vector2` with synced cartesian/polar forms, `Angle` in degrees/radians
//! - `sim`: Colliders (SAT overlap), entities, sprite kinematics, scene and loop driver
//! - `settings`: Scene extent, debug flag and loop timing
//! - `error`: Typed engine errors

pub mod error;
pub mod math;
pub mod settings;
pub mod sim;

pub use error::{EngineError, Result};
pub use math::{Angle, Vector2};
pub use settings::Settings;

/// Engine configuration constants
pub mod consts {
    /// Default scene width in pixels
    pub const DEFAULT_SCENE_WIDTH: f32 = 640.0;
    /// Default scene height in pixels
    pub const DEFAULT_SCENE_HEIGHT: f32 = 480.0;

    /// Default fixed update rate
    pub const DEFAULT_TICK_RATE: f32 = 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Tolerance for geometric invariant checks (normal ⟂ edge)
    pub const GEOMETRY_EPSILON: f32 = 1e-4;

    /// Minimum vertex count for a polygon collider
    pub const MIN_POLYGON_VERTICES: usize = 3;
}

/// Full turn in degrees
pub const FULL_TURN_DEGREES: f32 = 360.0;

/// Reduce an angle by one period if it is past a full turn.
///
/// This is intentionally a single subtraction, not a modulo: values more than
/// one period over stay over, negative values stay negative.
#[inline]
pub fn wrap_once(value: f32, period: f32) -> f32 {
    if value > period { value - period } else { value }
}
