//! Vector and angle math shared by colliders and kinematics

pub mod angle;
pub mod vector2;

pub use angle::Angle;
pub use vector2::Vector2;
