//! Scene: the entity roster and the per-tick phase ordering
//!
//! A tick is strictly: update every live entity (kinematics, boundary policy,
//! collider sync), then test every pair for overlap, then drop entities that
//! were marked deleted. Colliders are therefore always synced before any
//! overlap test in the same tick.

use super::entity::{Entity, EntityBuilder, EntityId};
use super::events::{EngineEvent, EventBus, EventKind, EventSink, SubscriberId};
use super::sprite::Bounds;
use crate::error::{EngineError, Result};
use crate::settings::Settings;

/// What happened during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// False when the scene was paused and nothing ran
    pub ticked: bool,
    /// Overlapping pairs found in the collision phase, in roster order
    pub collisions: Vec<(EntityId, EntityId)>,
    /// Entities dropped from the roster at the end of the tick
    pub removed: Vec<EntityId>,
    /// Entities whose update or overlap test failed; the tick carried on
    pub failures: Vec<(EntityId, String)>,
    /// Every signal raised, in order
    pub events: Vec<EngineEvent>,
}

/// Owns the roster and the event bus
#[derive(Debug)]
pub struct Scene {
    name: String,
    settings: Settings,
    entities: Vec<Entity>,
    next_id: u32,
    paused: bool,
    bus: EventBus,
}

impl Scene {
    pub fn new(name: impl Into<String>, settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            name: name.into(),
            settings,
            entities: Vec::new(),
            next_id: 1,
            paused: false,
            bus: EventBus::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn bounds(&self) -> Bounds {
        self.settings.bounds()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id() == id)
    }

    /// Subscribe to a kind of signal
    pub fn on<F>(&mut self, kind: EventKind, callback: F) -> SubscriberId
    where
        F: FnMut(&EngineEvent) + 'static,
    {
        self.bus.on(kind, callback)
    }

    pub fn off(&mut self, id: SubscriberId) -> bool {
        self.bus.off(id)
    }

    fn next_entity_id(&mut self) -> Result<EntityId> {
        let id = EntityId(self.next_id);
        self.next_id = self.next_id.checked_add(1).ok_or_else(|| {
            EngineError::invalid(format!("scene {} has run out of entity ids", self.name))
        })?;
        Ok(id)
    }

    /// Build and register an entity.
    ///
    /// On failure nothing is registered and `EntityCreationFailed` is raised.
    pub fn spawn(&mut self, builder: EntityBuilder) -> Result<EntityId> {
        match self.next_entity_id().and_then(|id| builder.build(id)) {
            Ok(entity) => {
                let id = entity.id();
                self.entities.push(entity);
                self.bus.emit(EngineEvent::EntityCreated(id));
                Ok(id)
            }
            Err(e) => {
                log::warn!("scene {}: entity creation failed: {e}", self.name);
                self.bus.emit(EngineEvent::EntityCreationFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Register an entity built elsewhere. Its id must be unused.
    pub fn add_entity(&mut self, entity: Entity) -> Result<EntityId> {
        let id = entity.id();
        if self.entity(id).is_some() {
            return Err(EngineError::invalid(format!(
                "scene {} already has entity {id}",
                self.name
            )));
        }
        let after = id.0.checked_add(1).ok_or_else(|| {
            EngineError::invalid(format!("entity id {id} leaves no room for further ids"))
        })?;
        self.next_id = self.next_id.max(after);
        self.entities.push(entity);
        self.bus.emit(EngineEvent::EntityCreated(id));
        Ok(id)
    }

    /// Take an entity out of the roster immediately
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        Some(self.entities.remove(index))
    }

    /// Mark an entity deleted; it leaves the roster at the end of the next tick
    pub fn destroy(&mut self, id: EntityId) -> bool {
        let Self { entities, bus, .. } = self;
        entities
            .iter_mut()
            .find(|e| e.id() == id)
            .map(|e| e.mark_deleted(bus))
            .unwrap_or(false)
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Overlap test for a driver-chosen pair
    pub fn test_pair(&mut self, a: EntityId, b: EntityId) -> Result<bool> {
        let (Some(first), Some(second)) = (self.entity(a), self.entity(b)) else {
            return Err(EngineError::invalid(format!(
                "scene {} has no pair {a}/{b}",
                self.name
            )));
        };
        let mut events = Vec::new();
        let hit = first.collides_with(second, &mut events)?;
        for event in events {
            self.bus.emit(event);
        }
        Ok(hit)
    }

    /// Run one tick. Does nothing while paused.
    pub fn tick(&mut self) -> TickReport {
        if self.paused {
            return TickReport::default();
        }

        let bounds = self.bounds();
        let mut report = TickReport {
            ticked: true,
            ..Default::default()
        };

        // Update phase
        for entity in &mut self.entities {
            if let Err(e) = entity.update(bounds, &mut report.events) {
                log::warn!("scene {}: update of entity {} failed: {e}", self.name, entity.id());
                report.failures.push((entity.id(), e.to_string()));
            }
            if self.settings.debug {
                log::debug!(
                    "{} pos={} heading={} vertices={:?}",
                    entity.id(),
                    entity.position(),
                    entity.heading(),
                    entity.collider().vertices()
                );
            }
        }

        // Collision phase
        let mut hits = Vec::new();
        for i in 0..self.entities.len() {
            for j in (i + 1)..self.entities.len() {
                let (a, b) = (&self.entities[i], &self.entities[j]);
                match a.collides_with(b, &mut report.events) {
                    Ok(true) => {
                        hits.push((i, j));
                        report.collisions.push((a.id(), b.id()));
                    }
                    Ok(false) => {}
                    Err(e) => {
                        log::warn!("scene {}: overlap test {}/{} failed: {e}", self.name, a.id(), b.id());
                        report.failures.push((a.id(), e.to_string()));
                    }
                }
            }
        }
        for entity in &mut self.entities {
            entity.set_colliding(false);
        }
        for (i, j) in hits {
            self.entities[i].set_colliding(true);
            self.entities[j].set_colliding(true);
        }

        // Removal
        report.removed = self
            .entities
            .iter()
            .filter(|e| e.deleted())
            .map(|e| e.id())
            .collect();
        self.entities.retain(|e| !e.deleted());

        if !report.collisions.is_empty() || !report.removed.is_empty() {
            log::debug!(
                "scene {}: {} collisions, {} removed",
                self.name,
                report.collisions.len(),
                report.removed.len()
            );
        }

        for event in &report.events {
            self.bus.emit(event.clone());
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::sprite::{BoundAction, Kinematics};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn scene() -> Scene {
        Scene::new("test", Settings::default()).unwrap()
    }

    #[test]
    fn test_spawn_assigns_ids_and_signals() {
        let mut s = scene();
        let created = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&created);
        s.on(EventKind::EntityCreated, move |e| c.borrow_mut().push(e.clone()));

        let a = s.spawn(EntityBuilder::new(10.0, 10.0)).unwrap();
        let b = s.spawn(EntityBuilder::new(10.0, 10.0)).unwrap();
        assert_ne!(a, b);
        assert_eq!(s.len(), 2);
        assert_eq!(created.borrow().len(), 2);
    }

    #[test]
    fn test_failed_spawn_registers_nothing() {
        let mut s = scene();
        let failures = Rc::new(RefCell::new(0));
        let f = Rc::clone(&failures);
        s.on(EventKind::EntityCreationFailed, move |_| *f.borrow_mut() += 1);

        let result = s.spawn(EntityBuilder::new(0.0, 10.0));
        assert!(matches!(result, Err(EngineError::ConstructionFailure(_))));
        assert!(s.is_empty());
        assert_eq!(*failures.borrow(), 1);
    }

    #[test]
    fn test_tick_reports_collision_once_per_pair() {
        let mut s = scene();
        let collisions = Rc::new(RefCell::new(Vec::new()));
        let c = Rc::clone(&collisions);
        s.on(EventKind::Collision, move |e| c.borrow_mut().push(e.clone()));

        let a = s.spawn(EntityBuilder::new(25.0, 25.0).at(100.0, 100.0)).unwrap();
        let b = s.spawn(EntityBuilder::new(25.0, 25.0).at(112.0, 112.0)).unwrap();
        s.spawn(EntityBuilder::new(25.0, 25.0).at(400.0, 400.0)).unwrap();

        let report = s.tick();
        assert!(report.ticked);
        assert_eq!(report.collisions, vec![(a, b)]);
        assert_eq!(
            *collisions.borrow(),
            vec![EngineEvent::Collision { first: a, second: b }]
        );
        assert!(s.entity(a).unwrap().colliding());
        assert!(s.entity(b).unwrap().colliding());

        s.entity_mut(b).unwrap().set_position(200.0, 200.0).unwrap();
        let report = s.tick();
        assert!(report.collisions.is_empty());
        assert!(!s.entity(a).unwrap().colliding());
    }

    #[test]
    fn test_collision_sees_positions_from_same_tick() {
        let mut s = scene();
        let k = Kinematics::new().with_velocity(-50.0, 0.0);
        let a = s.spawn(EntityBuilder::new(20.0, 20.0).at(100.0, 100.0)).unwrap();
        let b = s
            .spawn(EntityBuilder::new(20.0, 20.0).at(165.0, 104.0).kinematic(k))
            .unwrap();

        // Before the tick they are apart; after moving 50 left they overlap
        assert!(!s.test_pair(a, b).unwrap());
        let report = s.tick();
        assert_eq!(report.collisions, vec![(a, b)]);
    }

    #[test]
    fn test_destroyed_sprite_is_removed_at_end_of_tick() {
        let mut s = scene();
        let deleted = Rc::new(RefCell::new(0));
        let d = Rc::clone(&deleted);
        s.on(EventKind::MarkedForDeletion, move |_| *d.borrow_mut() += 1);

        let k = Kinematics::new()
            .with_velocity(5.0, 0.0)
            .with_bound_action(BoundAction::Destroy);
        let id = s
            .spawn(EntityBuilder::new(2.0, 2.0).at(637.0, 100.0).kinematic(k))
            .unwrap();

        let report = s.tick();
        assert_eq!(report.removed, vec![id]);
        assert!(s.entity(id).is_none());
        assert_eq!(*deleted.borrow(), 1);

        s.tick();
        assert_eq!(*deleted.borrow(), 1);
    }

    #[test]
    fn test_destroy_by_id() {
        let mut s = scene();
        let id = s.spawn(EntityBuilder::new(5.0, 5.0).at(10.0, 10.0)).unwrap();
        assert!(s.destroy(id));
        assert!(!s.destroy(id));
        assert!(s.entity(id).unwrap().hidden());
        assert_eq!(s.tick().removed, vec![id]);
    }

    #[test]
    fn test_paused_scene_skips_tick() {
        let mut s = scene();
        let k = Kinematics::new().with_velocity(1.0, 0.0);
        let id = s
            .spawn(EntityBuilder::new(2.0, 2.0).at(10.0, 10.0).kinematic(k))
            .unwrap();
        s.pause();
        assert!(!s.tick().ticked);
        assert_eq!(s.entity(id).unwrap().position().x(), 10.0);
        s.resume();
        assert!(s.tick().ticked);
        assert_eq!(s.entity(id).unwrap().position().x(), 11.0);
    }

    #[test]
    fn test_failing_entity_does_not_stop_others() {
        let mut s = scene();
        let mut bad = Kinematics::new();
        bad.velocity = crate::math::Vector2::new(f32::MAX, 0.0);
        bad.acceleration = crate::math::Vector2::new(f32::MAX, 0.0);
        let good = Kinematics::new().with_velocity(0.0, 1.0);

        let bad_id = s
            .spawn(EntityBuilder::new(2.0, 2.0).at(10.0, 10.0).kinematic(bad))
            .unwrap();
        let good_id = s
            .spawn(EntityBuilder::new(2.0, 2.0).at(50.0, 50.0).kinematic(good))
            .unwrap();

        let report = s.tick();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, bad_id);
        assert_eq!(s.entity(good_id).unwrap().position().y(), 51.0);
        assert_eq!(s.entity(bad_id).unwrap().position().x(), 10.0);
    }

    #[test]
    fn test_add_entity_rejects_duplicate_id() {
        let mut s = scene();
        let e = EntityBuilder::new(4.0, 4.0).build(EntityId(5)).unwrap();
        s.add_entity(e.clone()).unwrap();
        assert!(s.add_entity(e).is_err());
        // Fresh ids skip past the manual one
        let next = s.spawn(EntityBuilder::new(4.0, 4.0)).unwrap();
        assert_eq!(next, EntityId(6));
        assert!(s.remove_entity(EntityId(5)).is_some());
    }

    #[test]
    fn test_add_entity_rejects_last_id() {
        let mut s = scene();
        let last = EntityBuilder::new(4.0, 4.0).build(EntityId(u32::MAX)).unwrap();
        assert!(matches!(
            s.add_entity(last),
            Err(EngineError::InvalidArgument(_))
        ));
        assert!(s.is_empty());
    }

    #[test]
    fn test_spawn_fails_cleanly_when_ids_run_out() {
        let mut s = scene();
        let failures = Rc::new(RefCell::new(0));
        let f = Rc::clone(&failures);
        s.on(EventKind::EntityCreationFailed, move |_| *f.borrow_mut() += 1);

        let near_end = EntityBuilder::new(4.0, 4.0).build(EntityId(u32::MAX - 1)).unwrap();
        s.add_entity(near_end).unwrap();
        let result = s.spawn(EntityBuilder::new(4.0, 4.0));
        assert!(matches!(result, Err(EngineError::InvalidArgument(_))));
        assert_eq!(s.len(), 1);
        assert_eq!(*failures.borrow(), 1);
    }

    #[test]
    fn test_restored_entity_must_be_valid_to_register() {
        let mut s = scene();
        let saved = EntityBuilder::new(4.0, 4.0)
            .at(30.0, 30.0)
            .build(EntityId(3))
            .unwrap();
        let mut value = serde_json::to_value(&saved).unwrap();

        value["width"] = serde_json::json!(0.0);
        value["height"] = serde_json::json!(-3.0);
        assert!(serde_json::from_value::<Entity>(value.clone()).is_err());

        value["width"] = serde_json::json!(4.0);
        value["height"] = serde_json::json!(4.0);
        let restored: Entity = serde_json::from_value(value).unwrap();
        assert_eq!(s.add_entity(restored).unwrap(), EntityId(3));
    }

    #[test]
    fn test_test_pair_unknown_id() {
        let mut s = scene();
        let a = s.spawn(EntityBuilder::new(4.0, 4.0)).unwrap();
        assert!(s.test_pair(a, EntityId(99)).is_err());
    }
}
