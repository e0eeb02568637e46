//! Entities: placed, headed objects that own a collider
//!
//! A sprite is an entity whose `motion` is `Motion::Kinematic`. There is no
//! subclassing: the per-frame update dispatches on the motion policy.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Collider, Pose};
use super::events::{EngineEvent, EventSink};
use super::sprite::{Bounds, Kinematics};
use crate::error::{EngineError, Result};
use crate::math::{Angle, Vector2};

/// Stable entity handle, allocated by the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How an entity moves each frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    /// Stays where it is put; only the collider is synced
    #[default]
    Static,
    /// Sprite motion with a boundary policy
    Kinematic(Kinematics),
}

/// Builder for entities; validated when the scene builds it
#[derive(Debug, Clone, Default)]
pub struct EntityBuilder {
    name: Option<String>,
    width: f32,
    height: f32,
    position: (f32, f32),
    heading_degrees: f32,
    motion: Motion,
    polygon: Option<Vec<(f32, f32)>>,
}

impl EntityBuilder {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = (x, y);
        self
    }

    /// Initial heading. The collider is rotated to it at build time, not
    /// left axis-aligned.
    pub fn heading(mut self, degrees: f32) -> Self {
        self.heading_degrees = degrees;
        self
    }

    /// Make it a sprite
    pub fn kinematic(mut self, kinematics: Kinematics) -> Self {
        self.motion = Motion::Kinematic(kinematics);
        self
    }

    /// Use a custom polygon instead of the default box. Points are offsets
    /// from the entity's position.
    pub fn polygon(mut self, points: Vec<(f32, f32)>) -> Self {
        self.polygon = Some(points);
        self
    }

    /// Build the entity. Nothing half-built escapes: any failure returns an
    /// error and no entity.
    pub fn build(self, id: EntityId) -> Result<Entity> {
        let (w, h) = (self.width, self.height);
        check_size(id, w, h)?;

        let (x, y) = self.position;
        let position = Vector2::try_new(x, y).map_err(|e| {
            EngineError::ConstructionFailure(format!("entity {id} position: {e}"))
        })?;
        let pose = Pose::new(position, Angle::degrees(self.heading_degrees));

        let mut collider = match &self.polygon {
            Some(points) => {
                let world: Vec<(f32, f32)> = points.iter().map(|&(px, py)| (x + px, y + py)).collect();
                Collider::from_points(position, &world)
            }
            None => Collider::boxed(position, w / 2.0, h / 2.0),
        }
        .map_err(|e| EngineError::ConstructionFailure(format!("entity {id} collider: {e}")))?;
        collider.set_owner(id);
        collider.update(&pose)?;

        Ok(Entity {
            id,
            name: self.name,
            pose,
            width: w,
            height: h,
            collider,
            motion: self.motion,
            visible: true,
            deleted: false,
            colliding: false,
        })
    }
}

fn check_size(id: EntityId, w: f32, h: f32) -> Result<()> {
    if !(w > 0.0 && h > 0.0) || !w.is_finite() || !h.is_finite() {
        return Err(EngineError::ConstructionFailure(format!(
            "entity {id} needs a positive width and height, got {w}x{h}"
        )));
    }
    Ok(())
}

/// A placed object in the scene
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "EntityData", into = "EntityData")]
pub struct Entity {
    id: EntityId,
    name: Option<String>,
    pose: Pose,
    width: f32,
    height: f32,
    collider: Collider,
    motion: Motion,
    visible: bool,
    deleted: bool,
    /// Set during the last collision phase; read by the debug overlay
    colliding: bool,
}

impl Entity {
    #[inline]
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    #[inline]
    pub fn position(&self) -> Vector2 {
        self.pose.position
    }

    #[inline]
    pub fn heading(&self) -> Angle {
        self.pose.heading
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn half_width(&self) -> f32 {
        self.width / 2.0
    }

    pub fn half_height(&self) -> f32 {
        self.height / 2.0
    }

    pub fn collider(&self) -> &Collider {
        &self.collider
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn kinematics(&self) -> Option<&Kinematics> {
        match &self.motion {
            Motion::Kinematic(k) => Some(k),
            Motion::Static => None,
        }
    }

    pub fn kinematics_mut(&mut self) -> Option<&mut Kinematics> {
        match &mut self.motion {
            Motion::Kinematic(k) => Some(k),
            Motion::Static => None,
        }
    }

    pub fn is_sprite(&self) -> bool {
        matches!(self.motion, Motion::Kinematic(_))
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn hidden(&self) -> bool {
        !self.visible
    }

    pub fn deleted(&self) -> bool {
        self.deleted
    }

    pub fn colliding(&self) -> bool {
        self.colliding
    }

    pub(crate) fn set_colliding(&mut self, colliding: bool) {
        self.colliding = colliding;
    }

    /// Hide the entity and disable its collider
    pub fn hide(&mut self) {
        self.visible = false;
        self.collider.disable();
    }

    /// Show the entity and enable its collider. Deleted entities stay hidden.
    pub fn show(&mut self) {
        if self.deleted {
            return;
        }
        self.visible = true;
        self.collider.enable();
    }

    pub fn set_position(&mut self, x: f32, y: f32) -> Result<()> {
        self.pose.position = Vector2::try_new(x, y)?;
        Ok(())
    }

    /// Shift relative to the current position
    pub fn translate(&mut self, dx: f32, dy: f32) -> Result<()> {
        let p = self.pose.position;
        self.set_position(p.x() + dx, p.y() + dy)
    }

    pub fn set_heading(&mut self, heading: Angle) {
        self.pose.heading = heading;
    }

    pub fn rotate_heading(&mut self, degrees: f32) {
        self.pose.heading.add_degrees(degrees);
    }

    /// Point heading and, for sprites, the direction of motion at `degrees`
    pub fn set_angle(&mut self, degrees: f32) {
        if let Some(k) = self.kinematics_mut() {
            k.set_move_angle(degrees);
        }
        self.pose.heading.set_degrees(degrees);
    }

    /// Rotate heading and, for sprites, the direction of motion
    pub fn rotate(&mut self, degrees: f32) {
        if let Some(k) = self.kinematics_mut() {
            k.rotate_move_angle(degrees);
        }
        self.rotate_heading(degrees);
    }

    pub fn angle_to(&self, v: Vector2) -> Angle {
        Angle::radians(self.pose.position.angle_to(v))
    }

    pub fn distance_to(&self, v: Vector2) -> f32 {
        self.pose.position.distance_to(v)
    }

    /// Replace the collider. It is re-anchored onto this entity's pose.
    pub fn apply_collider(&mut self, mut collider: Collider) -> Result<()> {
        collider.update(&self.pose)?;
        collider.set_owner(self.id);
        if !self.visible {
            collider.disable();
        }
        self.collider = collider;
        Ok(())
    }

    /// Flag for deletion: hides the entity and raises `MarkedForDeletion`.
    ///
    /// Only the first call raises the signal. Removal from the roster is the
    /// scene's job.
    pub fn mark_deleted(&mut self, sink: &mut impl EventSink) -> bool {
        if self.deleted {
            return false;
        }
        self.deleted = true;
        self.hide();
        log::debug!("entity {} marked for deletion", self.id);
        sink.emit(EngineEvent::MarkedForDeletion(self.id));
        true
    }

    pub fn destroy(&mut self, sink: &mut impl EventSink) -> bool {
        self.mark_deleted(sink)
    }

    /// Move the collider onto the current pose
    pub fn sync_collider(&mut self) -> Result<()> {
        self.collider.update(&self.pose)
    }

    /// Per-frame update.
    ///
    /// Sprites integrate (velocity += acceleration, position += velocity) and
    /// apply their boundary policy first; every entity then syncs its collider.
    /// Deleted entities are inert.
    pub fn update(&mut self, bounds: Bounds, sink: &mut impl EventSink) -> Result<()> {
        if self.deleted {
            return Ok(());
        }

        let mut destroy = false;
        if let Motion::Kinematic(k) = &mut self.motion {
            let mut next = k.integrate(self.pose.position)?;
            let half = Vec2::new(self.width / 2.0, self.height / 2.0);
            destroy = k.apply_bounds(&mut next, half, bounds);
            self.pose.position = next;
        }
        if destroy {
            self.mark_deleted(sink);
        }

        self.sync_collider()
    }

    /// Collider overlap test between two entities.
    ///
    /// Raises exactly one `Collision` signal when they overlap.
    pub fn collides_with(&self, other: &Entity, sink: &mut impl EventSink) -> Result<bool> {
        if self.id == other.id || self.deleted || other.deleted {
            return Ok(false);
        }
        let hit = self.collider.collides_with(&other.collider)?;
        if hit {
            sink.emit(EngineEvent::Collision {
                first: self.id,
                second: other.id,
            });
        }
        Ok(hit)
    }
}

/// Serialized form; validated and re-synced on load
#[derive(Serialize, Deserialize)]
struct EntityData {
    id: EntityId,
    name: Option<String>,
    pose: Pose,
    width: f32,
    height: f32,
    collider: Collider,
    motion: Motion,
    visible: bool,
    deleted: bool,
    colliding: bool,
}

impl TryFrom<EntityData> for Entity {
    type Error = EngineError;

    fn try_from(data: EntityData) -> Result<Self> {
        let id = data.id;
        check_size(id, data.width, data.height)?;
        data.pose
            .validate()
            .map_err(|e| EngineError::ConstructionFailure(format!("entity {id} pose: {e}")))?;

        let mut collider = data.collider;
        collider.update(&data.pose)?;
        collider.set_owner(id);
        if data.visible && !data.deleted {
            collider.enable();
        } else {
            collider.disable();
        }

        Ok(Entity {
            id,
            name: data.name,
            pose: data.pose,
            width: data.width,
            height: data.height,
            collider,
            motion: data.motion,
            visible: data.visible && !data.deleted,
            deleted: data.deleted,
            colliding: data.colliding,
        })
    }
}

impl From<Entity> for EntityData {
    fn from(e: Entity) -> Self {
        Self {
            id: e.id,
            name: e.name,
            pose: e.pose,
            width: e.width,
            height: e.height,
            collider: e.collider,
            motion: e.motion,
            visible: e.visible,
            deleted: e.deleted,
            colliding: e.colliding,
        }
    }
}
