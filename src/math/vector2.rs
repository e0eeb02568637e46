//! 2D vector with synchronized cartesian and polar representations
//!
//! Every mutation of one representation recomputes the other, so `x`/`y` and
//! `magnitude`/`angle` always describe the same point.

use std::fmt;
use std::ops::{Add, Neg, Sub};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::wrap_once;

/// A 2D vector. Serializes as its cartesian pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "Vec2", into = "Vec2")]
pub struct Vector2 {
    cart: Vec2,
    r: f32,
    angle: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self {
        cart: Vec2::ZERO,
        r: 0.0,
        angle: 0.0,
    };

    pub fn new(x: f32, y: f32) -> Self {
        let mut v = Self {
            cart: Vec2::new(x, y),
            r: 0.0,
            angle: 0.0,
        };
        v.recalc_from_cart();
        v
    }

    /// Build a vector, rejecting non-finite components
    pub fn try_new(x: f32, y: f32) -> Result<Self> {
        if !x.is_finite() || !y.is_finite() {
            return Err(EngineError::invalid(format!(
                "vector components must be finite, got ({x}, {y})"
            )));
        }
        Ok(Self::new(x, y))
    }

    /// Build a vector from a magnitude and an angle in radians
    pub fn from_polar(r: f32, theta: f32) -> Self {
        let mut v = Self {
            cart: Vec2::ZERO,
            r,
            angle: theta,
        };
        v.recalc_from_polar();
        v
    }

    #[inline]
    pub fn x(&self) -> f32 {
        self.cart.x
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.cart.y
    }

    /// Length of the vector
    #[inline]
    pub fn magnitude(&self) -> f32 {
        self.r
    }

    /// Direction in radians, as given by `atan2(y, x)`
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn as_vec2(&self) -> Vec2 {
        self.cart
    }

    pub fn is_finite(&self) -> bool {
        self.cart.is_finite()
    }

    pub fn set_x(&mut self, x: f32) -> &mut Self {
        self.cart.x = x;
        self.recalc_from_cart();
        self
    }

    pub fn set_y(&mut self, y: f32) -> &mut Self {
        self.cart.y = y;
        self.recalc_from_cart();
        self
    }

    pub fn set_cartesian(&mut self, x: f32, y: f32) -> &mut Self {
        self.cart = Vec2::new(x, y);
        self.recalc_from_cart();
        self
    }

    /// Set the direction (radians), keeping the magnitude.
    ///
    /// Angles past a full turn are reduced by exactly one turn.
    pub fn set_angle(&mut self, theta: f32) -> &mut Self {
        self.angle = wrap_once(theta, std::f32::consts::TAU);
        self.recalc_from_polar();
        self
    }

    /// Set the length, keeping the direction
    pub fn set_magnitude(&mut self, r: f32) -> &mut Self {
        self.r = r;
        self.recalc_from_polar();
        self
    }

    /// Rotate by the given number of radians
    pub fn rotate(&mut self, rad: f32) -> &mut Self {
        self.set_angle(self.angle + rad)
    }

    /// Component-wise add in place
    pub fn add_with(&mut self, v: Vector2) -> &mut Self {
        self.cart += v.cart;
        self.recalc_from_cart();
        self
    }

    /// Scale in place
    pub fn scale_by(&mut self, n: f32) -> &mut Self {
        self.cart *= n;
        self.recalc_from_cart();
        self
    }

    #[inline]
    pub fn dot(&self, v: Vector2) -> f32 {
        self.cart.dot(v.cart)
    }

    /// Unit vector in the same direction. Fails for a zero-length vector.
    pub fn unit(&self) -> Result<Vector2> {
        if self.r == 0.0 || !self.r.is_finite() {
            return Err(EngineError::invalid(format!(
                "cannot take the unit vector of {self} (magnitude {})",
                self.r
            )));
        }
        Ok(Self::new(self.cart.x / self.r, self.cart.y / self.r))
    }

    /// Perpendicular vector, rotated a quarter turn counter-clockwise
    #[inline]
    pub fn normal(&self) -> Vector2 {
        Self::new(-self.cart.y, self.cart.x)
    }

    /// `v0 * (1 - t) + v1 * t`
    pub fn lerp(v0: Vector2, v1: Vector2, t: f32) -> Vector2 {
        Self::from(v0.cart * (1.0 - t) + v1.cart * t)
    }

    pub fn sum(a: Vector2, b: Vector2) -> Vector2 {
        Self::from(a.cart + b.cart)
    }

    /// `a - b`
    pub fn diff(a: Vector2, b: Vector2) -> Vector2 {
        Self::from(a.cart - b.cart)
    }

    pub fn distance_to(&self, v: Vector2) -> f32 {
        self.cart.distance(v.cart)
    }

    /// Angle (radians) of the direction from this point to `v`
    pub fn angle_to(&self, v: Vector2) -> f32 {
        let d = v.cart - self.cart;
        d.y.atan2(d.x)
    }

    fn recalc_from_cart(&mut self) {
        self.r = self.cart.length();
        self.angle = self.cart.y.atan2(self.cart.x);
    }

    fn recalc_from_polar(&mut self) {
        self.cart = self.r * Vec2::from_angle(self.angle);
    }
}

impl Default for Vector2 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for Vector2 {
    fn eq(&self, other: &Self) -> bool {
        self.cart == other.cart
    }
}

impl From<Vec2> for Vector2 {
    fn from(v: Vec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<Vector2> for Vec2 {
    fn from(v: Vector2) -> Self {
        v.cart
    }
}

impl Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::sum(self, rhs)
    }
}

impl Sub for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Vector2 {
        Vector2::diff(self, rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Vector2 {
        Vector2::from(-self.cart)
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.cart.x, self.cart.y)
    }
}
