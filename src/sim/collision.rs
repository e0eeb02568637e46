//! Convex polygon colliders and the Separating Axis Theorem overlap test
//!
//! A collider is a closed vertex loop (last vertex connects to the first)
//! synced every frame to its owner's pose. Overlap testing is pure boolean
//! SAT: no penetration depth, no response.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use crate::consts::{GEOMETRY_EPSILON, MIN_POLYGON_VERTICES};
use crate::error::{EngineError, Result};
use crate::math::{Angle, Vector2};

/// Position plus heading: everything a collider needs from its owner
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Vector2,
    pub heading: Angle,
}

impl Pose {
    pub fn new(position: Vector2, heading: Angle) -> Self {
        Self { position, heading }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.position.is_finite() || !self.heading.rad().is_finite() {
            return Err(EngineError::invalid(format!(
                "pose must be finite, got position {} heading {}",
                self.position,
                self.heading.rad()
            )));
        }
        Ok(())
    }
}

/// A polygon's extent along one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub min: f32,
    pub max: f32,
}

impl Projection {
    /// Interval overlap as the engine has always tested it.
    ///
    /// One interval's minimum has to fall strictly inside the other. Touching
    /// intervals, and intervals sharing the same minimum, are reported as
    /// separated.
    #[inline]
    pub fn overlaps(&self, other: &Projection) -> bool {
        let cond1 = self.min < other.max && self.min > other.min;
        let cond2 = other.min < self.max && other.min > self.min;
        cond1 || cond2
    }
}

/// How the collider was built
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// Arbitrary convex vertex loop
    Polygon,
    /// Rectangle built around an entity's position from its half extents
    Box { half_width: f32, half_height: f32 },
}

/// Convex polygon collider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "ColliderData", into = "ColliderData")]
pub struct Collider {
    shape: ColliderShape,
    vertices: Vec<Vector2>,
    /// `vertices[i + 1] - vertices[i]`, wrapping
    edges: Vec<Vector2>,
    /// Last-seen owner position; rotation pivot
    anchor: Vector2,
    /// Last-seen owner heading (radians)
    angle: f32,
    enabled: bool,
    owner: Option<EntityId>,
}

impl Collider {
    /// Build a polygon collider anchored at `anchor`.
    ///
    /// Winding order is kept as given.
    pub fn polygon(anchor: Vector2, vertices: Vec<Vector2>) -> Result<Self> {
        Self::build(ColliderShape::Polygon, anchor, 0.0, vertices)
    }

    /// Build a polygon collider from `(x, y)` pairs
    pub fn from_points(anchor: Vector2, points: &[(f32, f32)]) -> Result<Self> {
        let vertices = points.iter().map(|&(x, y)| Vector2::new(x, y)).collect();
        Self::polygon(anchor, vertices)
    }

    /// Axis-aligned rectangle centered on `position`.
    ///
    /// Corners go top-left, top-right, bottom-right, bottom-left. The collider
    /// starts at angle 0, so the first `update` swings it to the owner's heading.
    pub fn boxed(position: Vector2, half_width: f32, half_height: f32) -> Result<Self> {
        let (x0, y0) = (position.x() - half_width, position.y() - half_height);
        let (x1, y1) = (position.x() + half_width, position.y() + half_height);
        let vertices = vec![
            Vector2::new(x0, y0),
            Vector2::new(x1, y0),
            Vector2::new(x1, y1),
            Vector2::new(x0, y1),
        ];
        Self::build(
            ColliderShape::Box {
                half_width,
                half_height,
            },
            position,
            0.0,
            vertices,
        )
    }

    fn build(
        shape: ColliderShape,
        anchor: Vector2,
        angle: f32,
        vertices: Vec<Vector2>,
    ) -> Result<Self> {
        if vertices.len() < MIN_POLYGON_VERTICES {
            return Err(EngineError::invalid(format!(
                "collider needs at least {MIN_POLYGON_VERTICES} vertices, got {}",
                vertices.len()
            )));
        }
        if !anchor.is_finite() || vertices.iter().any(|v| !v.is_finite()) {
            return Err(EngineError::invalid("collider geometry must be finite"));
        }

        let edges = make_edges(&vertices);
        if let Some(i) = edges.iter().position(|e| e.magnitude() == 0.0) {
            return Err(EngineError::invalid(format!(
                "collider edge {i} has zero length (duplicate consecutive vertices)"
            )));
        }

        Ok(Self {
            shape,
            vertices,
            edges,
            anchor,
            angle,
            enabled: true,
            owner: None,
        })
    }

    #[inline]
    pub fn shape(&self) -> ColliderShape {
        self.shape
    }

    #[inline]
    pub fn vertices(&self) -> &[Vector2] {
        &self.vertices
    }

    #[inline]
    pub fn edges(&self) -> &[Vector2] {
        &self.edges
    }

    /// Reference position (last-seen owner position)
    #[inline]
    pub fn anchor(&self) -> Vector2 {
        self.anchor
    }

    /// Reference angle in radians (last-seen owner heading)
    #[inline]
    pub fn angle(&self) -> f32 {
        self.angle
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    #[inline]
    pub fn owner(&self) -> Option<EntityId> {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: EntityId) {
        self.owner = Some(owner);
    }

    /// Unit normals of every edge, the candidate separating axes
    pub fn axes(&self) -> Result<Vec<Vector2>> {
        self.edges
            .iter()
            .map(|&edge| edge_axis(edge, edge.normal()))
            .collect()
    }

    /// Extent of this polygon along a unit axis
    pub fn project(&self, axis: Vector2) -> Projection {
        let first = axis.dot(self.vertices[0]);
        self.vertices[1..]
            .iter()
            .fold(Projection { min: first, max: first }, |p, &v| {
                let d = axis.dot(v);
                Projection {
                    min: p.min.min(d),
                    max: p.max.max(d),
                }
            })
    }

    /// Separating Axis Theorem overlap test.
    ///
    /// A collider never collides with itself, and disabled colliders never
    /// collide. Colliders whose anchors coincide exactly are colliding.
    pub fn collides_with(&self, other: &Collider) -> Result<bool> {
        if std::ptr::eq(self, other) {
            return Ok(false);
        }
        if !self.enabled || !other.enabled {
            return Ok(false);
        }
        if self.anchor.x() == other.anchor.x() && self.anchor.y() == other.anchor.y() {
            return Ok(true);
        }

        let mut axes = self.axes()?;
        axes.extend(other.axes()?);

        for axis in axes {
            let p1 = self.project(axis);
            let p2 = other.project(axis);
            if !p1.overlaps(&p2) {
                log::trace!("separating axis {axis}: {p1:?} vs {p2:?}");
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Sync vertices to the owner's current pose.
    ///
    /// Rotates every vertex about the anchor by the heading delta, then
    /// translates by the position delta, then rebuilds edges. Calling it again
    /// with the same pose changes nothing.
    pub fn update(&mut self, pose: &Pose) -> Result<()> {
        pose.validate()?;

        let delta_angle = pose.heading.rad() - self.angle;
        let delta_pos = pose.position.as_vec2() - self.anchor.as_vec2();

        if delta_angle != 0.0 {
            let pivot = self.anchor.as_vec2();
            let rotation = Vec2::from_angle(delta_angle);
            for vertex in &mut self.vertices {
                let p = rotation.rotate(vertex.as_vec2() - pivot) + pivot;
                vertex.set_cartesian(p.x, p.y);
            }
        }

        if delta_pos != Vec2::ZERO {
            let shift = Vector2::from(delta_pos);
            for vertex in &mut self.vertices {
                vertex.add_with(shift);
            }
        }

        self.edges = make_edges(&self.vertices);
        self.anchor = pose.position;
        self.angle = pose.heading.rad();
        Ok(())
    }
}

fn make_edges(vertices: &[Vector2]) -> Vec<Vector2> {
    vertices
        .iter()
        .zip(vertices.iter().cycle().skip(1))
        .map(|(&a, &b)| b - a)
        .collect()
}

/// Check a candidate normal against its edge and normalize it
fn edge_axis(edge: Vector2, normal: Vector2) -> Result<Vector2> {
    let dot = normal.dot(edge);
    let scale = edge.magnitude() * normal.magnitude();
    if dot.abs() > GEOMETRY_EPSILON * scale.max(1.0) {
        return Err(EngineError::InvariantViolation(format!(
            "normal {normal} is not perpendicular to edge {edge} (dot {dot})"
        )));
    }
    normal.unit()
}

/// Serialized form; edges are rebuilt on load
#[derive(Serialize, Deserialize)]
struct ColliderData {
    shape: ColliderShape,
    vertices: Vec<Vector2>,
    anchor: Vector2,
    angle: f32,
    enabled: bool,
    owner: Option<EntityId>,
}

impl TryFrom<ColliderData> for Collider {
    type Error = EngineError;

    fn try_from(data: ColliderData) -> Result<Self> {
        let mut collider = Self::build(data.shape, data.anchor, data.angle, data.vertices)?;
        collider.enabled = data.enabled;
        collider.owner = data.owner;
        Ok(collider)
    }
}

impl From<Collider> for ColliderData {
    fn from(c: Collider) -> Self {
        Self {
            shape: c.shape,
            vertices: c.vertices,
            anchor: c.anchor,
            angle: c.angle,
            enabled: c.enabled,
            owner: c.owner,
        }
    }
}
