//! Simulation module
//!
//! Entities, sprite kinematics, SAT colliders and the scene tick. Nothing in
//! here renders or touches the platform:
//! - One Euler step per tick, no sub-stepping inside an entity
//! - Update phase strictly before collision phase
//! - Stable iteration order (roster insertion order)

pub mod collision;
pub mod entity;
pub mod events;
pub mod scene;
pub mod sprite;
pub mod tick;

pub use collision::{Collider, ColliderShape, Pose, Projection};
pub use entity::{Entity, EntityBuilder, EntityId, Motion};
pub use events::{EngineEvent, EventBus, EventKind, EventSink, SubscriberId};
pub use scene::{Scene, TickReport};
pub use sprite::{BoundAction, Bounds, Kinematics};
pub use tick::Game;
