//! Angle kept in both degrees and radians

use std::f32::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{FULL_TURN_DEGREES, wrap_once};

/// An angle with synchronized degree and radian values.
///
/// Setters reduce by exactly one period when the value is past a full turn
/// (`> 360` / `> 2π`). Larger or negative inputs are stored as given after
/// that single step, so repeated small increments wrap correctly while a
/// multiply-wrapped input does not. Serializes as radians.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct Angle {
    degrees: f32,
    radians: f32,
}

impl Angle {
    pub const ZERO: Self = Self {
        degrees: 0.0,
        radians: 0.0,
    };

    pub fn degrees(deg: f32) -> Self {
        let mut a = Self::ZERO;
        a.set_degrees(deg);
        a
    }

    pub fn radians(rad: f32) -> Self {
        let mut a = Self::ZERO;
        a.set_radians(rad);
        a
    }

    #[inline]
    pub fn deg(&self) -> f32 {
        self.degrees
    }

    #[inline]
    pub fn rad(&self) -> f32 {
        self.radians
    }

    pub fn set_degrees(&mut self, deg: f32) -> &mut Self {
        let deg = wrap_once(deg, FULL_TURN_DEGREES);
        self.degrees = deg;
        self.radians = to_radians(deg);
        self
    }

    pub fn set_radians(&mut self, rad: f32) -> &mut Self {
        let rad = wrap_once(rad, TAU);
        self.radians = rad;
        self.degrees = to_degrees(rad);
        self
    }

    pub fn add_degrees(&mut self, deg: f32) -> &mut Self {
        self.set_degrees(self.degrees + deg)
    }

    pub fn add_radians(&mut self, rad: f32) -> &mut Self {
        self.set_radians(self.radians + rad)
    }
}

#[inline]
pub fn to_radians(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

#[inline]
pub fn to_degrees(radians: f32) -> f32 {
    radians * 180.0 / std::f32::consts::PI
}

impl From<f32> for Angle {
    fn from(rad: f32) -> Self {
        Self::radians(rad)
    }
}

impl From<Angle> for f32 {
    fn from(a: Angle) -> Self {
        a.radians
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_degrees_and_radians_in_sync() {
        let a = Angle::degrees(90.0);
        assert!((a.rad() - FRAC_PI_2).abs() < 1e-6);

        let b = Angle::radians(PI);
        assert!((b.deg() - 180.0).abs() < 1e-4);
    }

    #[test]
    fn test_single_period_reduction() {
        assert!((Angle::degrees(370.0).deg() - 10.0).abs() < 1e-4);
        // Exactly one turn is not reduced
        assert_eq!(Angle::degrees(360.0).deg(), 360.0);
        // Documented limitation: only one period is removed
        assert!((Angle::degrees(730.0).deg() - 370.0).abs() < 1e-4);
        // Negative values are left alone
        assert_eq!(Angle::degrees(-45.0).deg(), -45.0);
    }

    #[test]
    fn test_repeated_increments_wrap() {
        let mut a = Angle::ZERO;
        for _ in 0..40 {
            a.add_degrees(10.0);
        }
        // 400 → 40 after the step that crossed 360
        assert!((a.deg() - 40.0).abs() < 1e-3);
        assert!((a.rad() - to_radians(40.0)).abs() < 1e-5);
    }

    #[test]
    fn test_add_radians() {
        let mut a = Angle::radians(6.0);
        a.add_radians(0.5);
        assert!((a.rad() - (6.5 - TAU)).abs() < 1e-5);
    }

    #[test]
    fn test_serde_as_radians() {
        let a = Angle::degrees(180.0);
        let json = serde_json::to_string(&a).unwrap();
        let back: Angle = serde_json::from_str(&json).unwrap();
        assert!((back.deg() - 180.0).abs() < 1e-3);
    }

    proptest! {
        #[test]
        fn prop_degree_radian_consistency(deg in -360.0f32..720.0) {
            let a = Angle::degrees(deg);
            let b = Angle::degrees(a.deg());
            prop_assert!((b.rad() - a.rad()).abs() < 1e-5);
            prop_assert!((to_degrees(a.rad()) - a.deg()).abs() < 1e-3);
        }
    }
}
