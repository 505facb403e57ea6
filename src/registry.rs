//! Registry of every propagated body and its runtime state.
//!
//! The registry is a Bevy `Resource` and is only mutated by systems in
//! [`SimulationSet::Propagate`](crate::types::SimulationSet) and the selection
//! fetch poller, so ECS scheduling enforces a single writer per frame.

use bevy::math::{DQuat, DVec3};
use bevy::prelude::*;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use crate::ephemeris::{
    OrbitDirection, OrbitalElements, SpinAxis, advance, position_for_anomaly, recompute_at_time,
};
use crate::types::wrap_two_pi;

/// Maximum parent chain followed when resolving world positions.
const MAX_PARENT_DEPTH: usize = 8;

/// String identifier of a registered body (`"earth"`, `"selected"`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(String);

impl BodyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for BodyId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BodyId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for BodyId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Whether a body was registered at startup or by a selection.
///
/// Fixed bodies are propagated before dynamic ones within a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BodyOrigin {
    #[default]
    Fixed,
    Dynamic,
}

/// Camera-facing capabilities of a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusCapability {
    /// Whether the camera may anchor to this body.
    pub focusable: bool,
    /// Camera distance for a fresh focus transition.
    pub initial_distance: f64,
    /// Body radius in scene units; bounds how close the camera may get.
    pub radius: f64,
}

impl Default for FocusCapability {
    fn default() -> Self {
        Self {
            focusable: false,
            initial_distance: 4.0,
            radius: 1.0,
        }
    }
}

impl FocusCapability {
    pub fn focusable(initial_distance: f64, radius: f64) -> Self {
        Self {
            focusable: true,
            initial_distance,
            radius,
        }
    }

    /// Camera offset from the anchor at the end of a focus transition.
    pub fn anchor_offset(&self) -> DVec3 {
        DVec3::new(0.0, self.initial_distance / 4.0, self.initial_distance)
    }
}

/// How a body and its orbit path are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrbitStyle {
    /// Sphere and path colour as `0xRRGGBB`.
    pub color: u32,
    /// Orbit path sample count.
    pub segments: usize,
}

impl Default for OrbitStyle {
    fn default() -> Self {
        Self {
            color: 0xffffff,
            segments: 512,
        }
    }
}

/// Entities rendering a body.
///
/// `root` is the orbit frame: parent translation and orbital-plane rotation,
/// with the orbit path as a child. `body` is the sphere, positioned directly
/// in camera-relative coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderHandle {
    pub root: Entity,
    pub body: Entity,
}

/// Mutable runtime state of one registered body.
#[derive(Clone, Debug)]
pub struct BodyState {
    elements: OrbitalElements,
    anomaly: f64,
    direction: OrbitDirection,
    pub origin: BodyOrigin,
    pub parent: Option<BodyId>,
    pub focus: FocusCapability,
    pub label: String,
    pub style: OrbitStyle,
    pub renderable: Option<RenderHandle>,
    local_position: DVec3,
    plane_rotation: DQuat,
    spin: Option<SpinAxis>,
    spin_angle: f64,
}

impl BodyState {
    /// New state at scene anomaly `anomaly`.
    pub fn new(elements: OrbitalElements, anomaly: f64, direction: OrbitDirection) -> Self {
        let anomaly = wrap_two_pi(anomaly);
        Self {
            local_position: position_for_anomaly(anomaly, &elements),
            plane_rotation: elements.plane_rotation(),
            elements,
            anomaly,
            direction,
            origin: BodyOrigin::Fixed,
            parent: None,
            focus: FocusCapability::default(),
            label: String::new(),
            style: OrbitStyle::default(),
            renderable: None,
            spin: None,
            spin_angle: 0.0,
        }
    }

    pub fn with_origin(mut self, origin: BodyOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_parent(mut self, parent: impl Into<BodyId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_focus(mut self, focus: FocusCapability) -> Self {
        self.focus = focus;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_style(mut self, style: OrbitStyle) -> Self {
        self.style = style;
        self
    }

    /// Spin about `spin`'s axis, starting at `angle`.
    pub fn with_spin(mut self, spin: SpinAxis, angle: f64) -> Self {
        self.spin = Some(spin);
        self.spin_angle = wrap_two_pi(angle);
        self
    }

    pub fn elements(&self) -> &OrbitalElements {
        &self.elements
    }

    /// Current scene anomaly in `[0, 2π)`.
    pub fn anomaly(&self) -> f64 {
        self.anomaly
    }

    pub fn direction(&self) -> OrbitDirection {
        self.direction
    }

    /// Position in the orbital-plane frame.
    pub fn local_position(&self) -> DVec3 {
        self.local_position
    }

    /// Fixed orbital-plane to scene rotation.
    pub fn plane_rotation(&self) -> DQuat {
        self.plane_rotation
    }

    pub fn spin(&self) -> Option<&SpinAxis> {
        self.spin.as_ref()
    }

    /// Current spin angle in `[0, 2π)`; zero for bodies that do not spin.
    pub fn spin_angle(&self) -> f64 {
        self.spin_angle
    }

    /// Body-fixed to scene rotation (tilt and spin).
    pub fn orientation(&self) -> DQuat {
        self.spin.map_or(DQuat::IDENTITY, |spin| spin.orientation(self.spin_angle))
    }

    /// Position relative to the parent (or the Sun), in scene axes.
    pub fn offset_from_parent(&self) -> DVec3 {
        self.plane_rotation * self.local_position
    }

    fn step_by(&mut self, simulated_delta_secs: f64) {
        let step = advance(self.anomaly, simulated_delta_secs, &self.elements, self.direction);
        self.anomaly = step.anomaly;
        self.local_position = step.position;
        if let Some(spin) = &self.spin {
            self.spin_angle = spin.advance(self.spin_angle, simulated_delta_secs);
        }
    }

    fn step_to(&mut self, target_unix_ms: f64) {
        let step = recompute_at_time(target_unix_ms, &self.elements, self.direction);
        self.anomaly = step.anomaly;
        self.local_position = step.position;
        if let Some(spin) = &self.spin {
            self.spin_angle = spin.angle_at(target_unix_ms);
        }
    }
}

/// Mapping from body identifier to its runtime state.
#[derive(Resource, Default, Debug)]
pub struct BodyRegistry {
    bodies: HashMap<BodyId, BodyState>,
}

impl BodyRegistry {
    /// Register `state` under `id`, returning the state it replaced.
    pub fn register(&mut self, id: impl Into<BodyId>, state: BodyState) -> Option<BodyState> {
        self.bodies.insert(id.into(), state)
    }

    /// Remove a body, returning its final state.
    pub fn deregister(&mut self, id: &str) -> Option<BodyState> {
        self.bodies.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&BodyState> {
        self.bodies.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut BodyState> {
        self.bodies.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.bodies.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BodyId, &BodyState)> {
        self.bodies.iter()
    }

    /// Current scene anomaly of a body.
    pub fn current_anomaly(&self, id: &str) -> Option<f64> {
        self.bodies.get(id).map(BodyState::anomaly)
    }

    /// Attach render entities to an already registered body.
    ///
    /// Returns `false` if the body is not registered.
    pub fn attach_renderable(&mut self, id: &str, handle: RenderHandle) -> bool {
        match self.bodies.get_mut(id) {
            Some(state) => {
                state.renderable = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Heliocentric scene position, following the parent chain.
    ///
    /// `None` if the body or any ancestor is not registered.
    pub fn world_position(&self, id: &str) -> Option<DVec3> {
        let mut position = DVec3::ZERO;
        let mut current = self.bodies.get(id)?;
        for _ in 0..MAX_PARENT_DEPTH {
            position += current.offset_from_parent();
            match &current.parent {
                Some(parent) => current = self.bodies.get(parent.as_str())?,
                None => return Some(position),
            }
        }
        None
    }

    /// World position of a body's parent frame (the Sun at the origin for
    /// top-level bodies).
    pub fn parent_position(&self, id: &str) -> Option<DVec3> {
        match &self.bodies.get(id)?.parent {
            Some(parent) => self.world_position(parent.as_str()),
            None => Some(DVec3::ZERO),
        }
    }

    /// Incremental propagation of every body by `simulated_delta_secs`.
    ///
    /// Fixed bodies are advanced before dynamic ones.
    pub fn tick(&mut self, simulated_delta_secs: f64) {
        for origin in [BodyOrigin::Fixed, BodyOrigin::Dynamic] {
            for state in self.bodies.values_mut().filter(|s| s.origin == origin) {
                state.step_by(simulated_delta_secs);
            }
        }
    }

    /// Absolute propagation of every body to `target_unix_ms`.
    pub fn set_absolute_time(&mut self, target_unix_ms: f64) {
        for origin in [BodyOrigin::Fixed, BodyOrigin::Dynamic] {
            for state in self.bodies.values_mut().filter(|s| s.origin == origin) {
                state.step_to(target_unix_ms);
            }
        }
    }

    /// Focusable body identifiers, sorted for stable UI ordering.
    pub fn focusable_ids(&self) -> Vec<BodyId> {
        let mut ids: Vec<_> = self
            .bodies
            .iter()
            .filter(|(_, state)| state.focus.focusable)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{ElementSet, Epoch, initial_anomaly};
    use crate::types::{J2000_JD, SECONDS_PER_DAY, angular_distance};
    use approx::assert_abs_diff_eq;

    fn circular(a: f64, period_days: f64) -> OrbitalElements {
        OrbitalElements::try_from(ElementSet {
            semi_major_axis: a,
            eccentricity: 0.0,
            period_days,
            inclination: 0.0,
            ascending_node: 0.0,
            argument_of_periapsis: 0.0,
            mean_anomaly_at_epoch: 0.0,
            epoch: Epoch::JulianDate(J2000_JD),
        })
        .unwrap()
    }

    fn registry_with_earth_and_moon() -> BodyRegistry {
        let mut registry = BodyRegistry::default();
        registry.register(
            "earth",
            BodyState::new(circular(100.0, 365.25), 0.0, OrbitDirection::default()),
        );
        registry.register(
            "moon",
            BodyState::new(circular(10.0, 27.3), 0.0, OrbitDirection::default())
                .with_parent("earth"),
        );
        registry
    }

    #[test]
    fn test_register_replaces_previous_state() {
        let mut registry = BodyRegistry::default();
        let elements = circular(1.0, 10.0);
        assert!(registry
            .register("x", BodyState::new(elements.clone(), 1.0, OrbitDirection::default()))
            .is_none());
        let old = registry.register("x", BodyState::new(elements, 2.0, OrbitDirection::default()));

        assert_eq!(old.map(|s| s.anomaly()), Some(1.0));
        assert_eq!(registry.current_anomaly("x"), Some(2.0));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_deregister_returns_state() {
        let mut registry = registry_with_earth_and_moon();
        let removed = registry.deregister("earth");
        assert!(removed.is_some());
        assert!(!registry.contains("earth"));
        assert!(registry.deregister("earth").is_none());
    }

    #[test]
    fn test_world_position_adds_parent() {
        let registry = registry_with_earth_and_moon();
        let earth = registry.world_position("earth").unwrap();
        let moon = registry.world_position("moon").unwrap();

        assert_abs_diff_eq!(earth.x, 100.0, epsilon = 1e-9);
        assert_abs_diff_eq!(moon.x, 110.0, epsilon = 1e-9);
        assert_eq!(registry.parent_position("moon"), Some(earth));
        assert_eq!(registry.parent_position("earth"), Some(DVec3::ZERO));
    }

    #[test]
    fn test_orphaned_body_has_no_world_position() {
        let mut registry = registry_with_earth_and_moon();
        registry.deregister("earth");
        assert!(registry.world_position("moon").is_none());
        assert!(registry.world_position("missing").is_none());
    }

    #[test]
    fn test_parent_cycle_is_bounded() {
        let mut registry = BodyRegistry::default();
        let elements = circular(1.0, 10.0);
        registry.register(
            "a",
            BodyState::new(elements.clone(), 0.0, OrbitDirection::default()).with_parent("b"),
        );
        registry.register(
            "b",
            BodyState::new(elements, 0.0, OrbitDirection::default()).with_parent("a"),
        );
        assert!(registry.world_position("a").is_none());
    }

    #[test]
    fn test_tick_advances_every_body() {
        let mut registry = registry_with_earth_and_moon();
        registry.tick(SECONDS_PER_DAY);

        let earth = registry.current_anomaly("earth").unwrap();
        let moon = registry.current_anomaly("moon").unwrap();
        assert!(angular_distance(earth, -std::f64::consts::TAU / 365.25) < 1e-12);
        assert!(angular_distance(moon, -std::f64::consts::TAU / 27.3) < 1e-12);
    }

    #[test]
    fn test_set_absolute_time_matches_initial_at_epoch() {
        let mut registry = registry_with_earth_and_moon();
        registry.tick(10.0 * SECONDS_PER_DAY);
        let epoch_ms = Epoch::JulianDate(J2000_JD).unix_ms();
        registry.set_absolute_time(epoch_ms);

        let earth = registry.get("earth").unwrap();
        let expected = initial_anomaly(earth.elements(), earth.direction());
        assert_abs_diff_eq!(earth.anomaly(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_attach_renderable_requires_registration() {
        let mut registry = registry_with_earth_and_moon();
        let handle = RenderHandle {
            root: Entity::PLACEHOLDER,
            body: Entity::PLACEHOLDER,
        };
        assert!(registry.attach_renderable("earth", handle));
        assert!(!registry.attach_renderable("pluto", handle));
        assert_eq!(registry.get("earth").unwrap().renderable, Some(handle));
    }

    #[test]
    fn test_focusable_ids_sorted() {
        let mut registry = registry_with_earth_and_moon();
        for id in ["moon", "earth"] {
            registry.get_mut(id).unwrap().focus = FocusCapability::focusable(4.0, 1.0);
        }
        let ids: Vec<_> = registry.focusable_ids().into_iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["earth", "moon"]);
    }

    #[test]
    fn test_anchor_offset() {
        let focus = FocusCapability::focusable(60.0, 10.97);
        assert_eq!(focus.anchor_offset(), DVec3::new(0.0, 15.0, 60.0));
    }

    #[test]
    fn test_spin_follows_tick_and_travel() {
        let mut registry = registry_with_earth_and_moon();
        let spin = SpinAxis::earth();
        let epoch_ms = spin.epoch_unix_ms;
        if let Some(earth) = registry.deregister("earth") {
            registry.register("earth", earth.with_spin(spin, spin.angle_at(epoch_ms)));
        }

        registry.tick(0.25 * SECONDS_PER_DAY);
        let ticked = registry.get("earth").unwrap().spin_angle();
        let expected = spin.angle_at(epoch_ms + 0.25 * 86_400_000.0);
        assert!(angular_distance(ticked, expected) < 1e-9);

        registry.set_absolute_time(epoch_ms + 3.0 * 86_400_000.0);
        let travelled = registry.get("earth").unwrap().spin_angle();
        assert!(angular_distance(travelled, spin.angle_at(epoch_ms + 3.0 * 86_400_000.0)) < 1e-12);

        // Bodies without a spin axis keep an identity orientation.
        assert_eq!(registry.get("moon").unwrap().orientation(), DQuat::IDENTITY);
    }
}
