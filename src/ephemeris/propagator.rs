//! Orbit propagation: incremental per-tick advance and absolute time travel.
//!
//! Both modes derive from one convention. The scene anomaly of a body at
//! time `t` is
//!
//! ```text
//! M_scene(t) = wrap2π(s · (M0 + n · Δdays(t − epoch)))
//! ```
//!
//! where `s` is the direction sign (`+1` clockwise, `−1` counter-clockwise).
//! Incremental mode adds `s · n · Δdays` to the stored anomaly, absolute mode
//! evaluates the formula directly, so travelling to a date and then resuming
//! real-time animation never jumps.

use bevy::math::DVec3;

use super::elements::OrbitalElements;
use super::kepler::{plane_position, solve_eccentric_anomaly};
use crate::types::{MS_PER_DAY, SECONDS_PER_DAY, wrap_two_pi};

/// Sense in which a body's scene anomaly advances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrbitDirection {
    /// Anomaly decreases with time (the convention used for Earth).
    #[default]
    CounterClockwise,
    /// Anomaly increases with time.
    Clockwise,
}

impl OrbitDirection {
    /// `+1` for clockwise, `−1` for counter-clockwise.
    pub fn sign(self) -> f64 {
        match self {
            OrbitDirection::Clockwise => 1.0,
            OrbitDirection::CounterClockwise => -1.0,
        }
    }
}

/// Result of one propagation step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Propagation {
    /// New scene anomaly, wrapped to `[0, 2π)`.
    pub anomaly: f64,
    /// Position in the body's orbital-plane frame.
    pub position: DVec3,
}

/// Orbital-plane position for a stored scene anomaly.
pub fn position_for_anomaly(anomaly: f64, elements: &OrbitalElements) -> DVec3 {
    let e_anomaly = solve_eccentric_anomaly(anomaly, elements.eccentricity());
    plane_position(elements.semi_major_axis(), elements.eccentricity(), e_anomaly)
}

/// Incremental mode: advance `current` by `simulated_delta_secs`.
pub fn advance(
    current: f64,
    simulated_delta_secs: f64,
    elements: &OrbitalElements,
    direction: OrbitDirection,
) -> Propagation {
    let delta_days = simulated_delta_secs / SECONDS_PER_DAY;
    let anomaly =
        wrap_two_pi(current + direction.sign() * elements.mean_motion_per_day() * delta_days);
    Propagation {
        anomaly,
        position: position_for_anomaly(anomaly, elements),
    }
}

/// Scene anomaly at an absolute time (Unix milliseconds).
pub fn anomaly_at_time(
    target_unix_ms: f64,
    elements: &OrbitalElements,
    direction: OrbitDirection,
) -> f64 {
    let delta_days = (target_unix_ms - elements.epoch().unix_ms()) / MS_PER_DAY;
    wrap_two_pi(
        direction.sign()
            * (elements.mean_anomaly_at_epoch() + elements.mean_motion_per_day() * delta_days),
    )
}

/// Absolute mode: recompute a body's state at `target_unix_ms`.
pub fn recompute_at_time(
    target_unix_ms: f64,
    elements: &OrbitalElements,
    direction: OrbitDirection,
) -> Propagation {
    let anomaly = anomaly_at_time(target_unix_ms, elements, direction);
    Propagation {
        anomaly,
        position: position_for_anomaly(anomaly, elements),
    }
}

/// Scene anomaly at the elements' own epoch: `wrap2π(s · M0)`.
pub fn initial_anomaly(elements: &OrbitalElements, direction: OrbitDirection) -> f64 {
    wrap_two_pi(direction.sign() * elements.mean_anomaly_at_epoch())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::elements::{ElementSet, Epoch};
    use crate::types::{J2000_JD, angular_distance};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::TAU;

    fn unit_orbit(eccentricity: f64, mean_anomaly_at_epoch: f64) -> OrbitalElements {
        OrbitalElements::try_from(ElementSet {
            semi_major_axis: 1.0,
            eccentricity,
            period_days: 365.25,
            inclination: 0.0,
            ascending_node: 0.0,
            argument_of_periapsis: 0.0,
            mean_anomaly_at_epoch,
            epoch: Epoch::JulianDate(J2000_JD),
        })
        .unwrap()
    }

    #[test]
    fn test_full_period_returns_to_start() {
        let elements = unit_orbit(0.0, 0.0);
        let step = advance(0.0, 365.25 * SECONDS_PER_DAY, &elements, OrbitDirection::default());

        assert!(angular_distance(step.anomaly, 0.0) < 1e-9);
        assert_abs_diff_eq!(step.position.x, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(step.position.y, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(step.position.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_counter_clockwise_decreases_anomaly() {
        let elements = unit_orbit(0.1, 0.0);
        let quarter = 365.25 / 4.0 * SECONDS_PER_DAY;

        let ccw = advance(1.0, quarter, &elements, OrbitDirection::CounterClockwise);
        let cw = advance(1.0, quarter, &elements, OrbitDirection::Clockwise);

        assert_abs_diff_eq!(ccw.anomaly, wrap_two_pi(1.0 - TAU / 4.0), epsilon = 1e-12);
        assert_abs_diff_eq!(cw.anomaly, 1.0 + TAU / 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_delta_keeps_anomaly() {
        let elements = unit_orbit(0.2, 0.0);
        let step = advance(2.5, 0.0, &elements, OrbitDirection::default());
        assert_eq!(step.anomaly, 2.5);
        assert_eq!(step.position, position_for_anomaly(2.5, &elements));
    }

    #[test]
    fn test_absolute_at_epoch_matches_initial() {
        let elements = unit_orbit(0.1, 0.7);
        for direction in [OrbitDirection::Clockwise, OrbitDirection::CounterClockwise] {
            let at_epoch = anomaly_at_time(elements.epoch().unix_ms(), &elements, direction);
            assert_abs_diff_eq!(at_epoch, initial_anomaly(&elements, direction), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_counter_clockwise_absolute_negates_epoch_anomaly_and_rate() {
        let elements = unit_orbit(0.1, 0.7);
        let ten_days = elements.epoch().unix_ms() + 10.0 * MS_PER_DAY;
        let m = anomaly_at_time(ten_days, &elements, OrbitDirection::CounterClockwise);
        let expected = wrap_two_pi(-0.7 - elements.mean_motion_per_day() * 10.0);
        assert_abs_diff_eq!(m, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_travel_then_resume_is_continuous() {
        let elements = unit_orbit(0.15, 2.0);
        let direction = OrbitDirection::default();
        let target = elements.epoch().unix_ms() + 1234.5 * MS_PER_DAY;

        let travelled = recompute_at_time(target, &elements, direction);
        let resumed = advance(travelled.anomaly, 3600.0, &elements, direction);
        let direct = recompute_at_time(target + 3_600_000.0, &elements, direction);

        assert!(angular_distance(resumed.anomaly, direct.anomaly) < 1e-9);
        assert!((resumed.position - direct.position).length() < 1e-9);
    }

    #[test]
    fn test_reepoch_preserves_trajectory() {
        let elements = unit_orbit(0.1, 0.3);
        let direction = OrbitDirection::default();
        let later = Epoch::UnixMillis(elements.epoch().unix_ms() + 40.0 * MS_PER_DAY);
        let moved = elements.reepoch(later);

        let t = later.unix_ms() + 5.0 * MS_PER_DAY;
        assert!(
            angular_distance(
                anomaly_at_time(t, &elements, direction),
                anomaly_at_time(t, &moved, direction)
            ) < 1e-9
        );
        assert_abs_diff_eq!(
            initial_anomaly(&moved, direction),
            anomaly_at_time(later.unix_ms(), &elements, direction),
            epsilon = 1e-9
        );
    }
}
