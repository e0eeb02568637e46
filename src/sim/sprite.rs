//! Sprite motion: velocity, acceleration and the scene-boundary policy
//!
//! Motion is one Euler step per frame (no dt, no substeps): velocity picks up
//! acceleration, position picks up velocity, then the boundary policy runs.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::math::angle::to_radians;
use crate::math::{Angle, Vector2};

/// What a sprite does when it crosses the scene edge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoundAction {
    /// Keep going
    #[default]
    None,
    /// Reappear on the opposite edge
    Wrap,
    /// Clamp to the edge and reverse that velocity component
    Bounce,
    /// Mark the sprite deleted
    Destroy,
}

/// Playable area, `[0, width] x [0, height]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Velocity, acceleration and boundary policy of a moving entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub velocity: Vector2,
    pub acceleration: Vector2,
    pub bound_action: BoundAction,
}

impl Kinematics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_velocity(mut self, x: f32, y: f32) -> Self {
        self.velocity = Vector2::new(x, y);
        self
    }

    pub fn with_acceleration(mut self, x: f32, y: f32) -> Self {
        self.acceleration = Vector2::new(x, y);
        self
    }

    pub fn with_bound_action(mut self, action: BoundAction) -> Self {
        self.bound_action = action;
        self
    }

    /// How fast the sprite is moving
    pub fn speed(&self) -> f32 {
        self.velocity.magnitude()
    }

    /// Set speed in the current direction of motion
    pub fn set_speed(&mut self, speed: f32) {
        self.velocity.set_magnitude(speed);
    }

    /// Direction of motion, measured from the x-axis
    pub fn move_angle(&self) -> Angle {
        Angle::radians(self.velocity.angle())
    }

    pub fn set_move_angle(&mut self, degrees: f32) {
        self.velocity.set_angle(to_radians(degrees));
    }

    pub fn rotate_move_angle(&mut self, degrees: f32) {
        self.set_move_angle(self.move_angle().deg() + degrees);
    }

    pub fn set_velocity(&mut self, velocity: Vector2) -> Result<()> {
        self.velocity = finite(velocity, "velocity")?;
        Ok(())
    }

    pub fn set_acceleration(&mut self, acceleration: Vector2) -> Result<()> {
        self.acceleration = finite(acceleration, "acceleration")?;
        Ok(())
    }

    /// Add a force straight onto the velocity
    pub fn add_force(&mut self, force: Vector2) {
        self.velocity.add_with(force);
    }

    /// One Euler step. Returns the new position without committing anything
    /// if the result would not be finite.
    pub fn integrate(&mut self, position: Vector2) -> Result<Vector2> {
        let velocity = self.velocity + self.acceleration;
        let next = position + velocity;
        if !velocity.is_finite() || !next.is_finite() {
            return Err(EngineError::invalid(format!(
                "integration diverged: velocity {velocity}, position {next}"
            )));
        }
        self.velocity = velocity;
        Ok(next)
    }

    /// Apply the boundary policy to `position`, each axis independently.
    ///
    /// Returns true when the policy asks for the sprite to be deleted.
    pub fn apply_bounds(
        &mut self,
        position: &mut Vector2,
        half_extents: Vec2,
        bounds: Bounds,
    ) -> bool {
        let mut pos = position.as_vec2();
        let mut vel = self.velocity.as_vec2();
        let extent = Vec2::new(bounds.width, bounds.height);
        let mut destroy = false;

        for axis in 0..2 {
            match self.bound_action {
                BoundAction::None => {}
                BoundAction::Wrap => {
                    if pos[axis] > extent[axis] {
                        pos[axis] = 0.0;
                    } else if pos[axis] < 0.0 {
                        pos[axis] = extent[axis];
                    }
                }
                BoundAction::Bounce => {
                    if pos[axis] > extent[axis] {
                        pos[axis] = extent[axis];
                        vel[axis] = -vel[axis];
                    } else if pos[axis] < 0.0 {
                        pos[axis] = 0.0;
                        vel[axis] = -vel[axis];
                    }
                }
                BoundAction::Destroy => {
                    if pos[axis] + half_extents[axis] > extent[axis]
                        || pos[axis] - half_extents[axis] < 0.0
                    {
                        destroy = true;
                    }
                }
            }
        }

        if pos != position.as_vec2() {
            position.set_cartesian(pos.x, pos.y);
        }
        if vel != self.velocity.as_vec2() {
            self.velocity.set_cartesian(vel.x, vel.y);
        }
        destroy
    }
}

fn finite(v: Vector2, what: &str) -> Result<Vector2> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(EngineError::invalid(format!("{what} must be finite, got {v}")))
    }
}
