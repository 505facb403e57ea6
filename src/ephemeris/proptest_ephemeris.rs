//! Property-based tests for ephemeris computations using proptest.
//!
//! These tests verify that the solver, angle wrapping and both propagation
//! modes keep their guarantees across a wide range of inputs.

use proptest::prelude::*;
use std::f64::consts::TAU;

use super::elements::{ElementSet, Epoch, OrbitalElements};
use super::kepler::solve_eccentric_anomaly;
use super::propagator::{
    OrbitDirection, advance, anomaly_at_time, initial_anomaly, recompute_at_time,
};
use crate::registry::{BodyRegistry, BodyState};
use crate::types::{J2000_JD, MS_PER_DAY, SECONDS_PER_DAY, angular_distance, wrap_two_pi};

fn elements(
    eccentricity: f64,
    period_days: f64,
    mean_anomaly_at_epoch: f64,
) -> OrbitalElements {
    OrbitalElements::try_from(ElementSet {
        semi_major_axis: 23455.0,
        eccentricity,
        period_days,
        inclination: 0.1,
        ascending_node: 1.0,
        argument_of_periapsis: 2.0,
        mean_anomaly_at_epoch,
        epoch: Epoch::JulianDate(J2000_JD),
    })
    .unwrap()
}

fn direction_strategy() -> impl Strategy<Value = OrbitDirection> {
    prop_oneof![
        Just(OrbitDirection::Clockwise),
        Just(OrbitDirection::CounterClockwise)
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Five Newton iterations satisfy Kepler's equation for the supported
    /// eccentricity range.
    #[test]
    fn prop_kepler_solver_convergence(
        mean_anomaly_normalized in 0.0f64..1.0,
        eccentricity in 0.0f64..=0.3,
    ) {
        let mean_anomaly = mean_anomaly_normalized * TAU;
        let e_anom = solve_eccentric_anomaly(mean_anomaly, eccentricity);
        let m_check = wrap_two_pi(e_anom - eccentricity * e_anom.sin());

        let error = angular_distance(m_check, mean_anomaly);
        prop_assert!(
            error < 1e-4,
            "Kepler solver failed: M={}, e={}, E={}, M_check={}, error={}",
            mean_anomaly, eccentricity, e_anom, m_check, error
        );
    }

    /// Wrapping is idempotent and lands in [0, 2π).
    #[test]
    fn prop_wrap_idempotent_and_bounded(angle in -1e6f64..1e6) {
        let once = wrap_two_pi(angle);
        prop_assert!((0.0..TAU).contains(&once), "wrap({}) = {}", angle, once);
        prop_assert_eq!(wrap_two_pi(once), once);
    }

    /// Stepping incrementally from the epoch to T lands where absolute mode
    /// puts the body at T.
    #[test]
    fn prop_incremental_matches_absolute(
        eccentricity in 0.0f64..0.3,
        period_days in 20.0f64..100_000.0,
        mean_anomaly_at_epoch in 0.0f64..TAU,
        step_secs in 60.0f64..(30.0 * SECONDS_PER_DAY),
        steps in 1usize..500,
        direction in direction_strategy(),
    ) {
        let orbit = elements(eccentricity, period_days, mean_anomaly_at_epoch);

        let mut anomaly = initial_anomaly(&orbit, direction);
        for _ in 0..steps {
            anomaly = advance(anomaly, step_secs, &orbit, direction).anomaly;
        }

        let target = orbit.epoch().unix_ms() + steps as f64 * step_secs * 1000.0;
        let absolute = anomaly_at_time(target, &orbit, direction);

        prop_assert!(
            angular_distance(anomaly, absolute) < 1e-6,
            "incremental {} vs absolute {}", anomaly, absolute
        );
    }

    /// Absolute positions agree with incremental positions, not just anomalies.
    #[test]
    fn prop_absolute_position_continuous_with_incremental(
        eccentricity in 0.0f64..0.3,
        days in -20_000.0f64..20_000.0,
        direction in direction_strategy(),
    ) {
        let orbit = elements(eccentricity, 365.25, 1.0);
        let target = orbit.epoch().unix_ms() + days * MS_PER_DAY;

        let travelled = recompute_at_time(target, &orbit, direction);
        let next = advance(travelled.anomaly, SECONDS_PER_DAY, &orbit, direction);
        let direct = recompute_at_time(target + MS_PER_DAY, &orbit, direction);

        prop_assert!((next.position - direct.position).length() < 1e-3);
    }

    /// Deregistering and re-registering with the captured anomaly reproduces
    /// the uninterrupted trajectory.
    #[test]
    fn prop_deregister_reregister_round_trip(
        eccentricity in 0.0f64..0.3,
        period_days in 20.0f64..10_000.0,
        before in 1usize..50,
        after in 1usize..50,
        dt in 1.0f64..SECONDS_PER_DAY,
    ) {
        let orbit = elements(eccentricity, period_days, 0.5);
        let direction = OrbitDirection::default();
        let start = initial_anomaly(&orbit, direction);

        let mut uninterrupted = BodyRegistry::default();
        uninterrupted.register("neo", BodyState::new(orbit.clone(), start, direction));
        let mut interrupted = BodyRegistry::default();
        interrupted.register("neo", BodyState::new(orbit.clone(), start, direction));

        for _ in 0..before {
            uninterrupted.tick(dt);
            interrupted.tick(dt);
        }

        let captured = interrupted.deregister("neo").unwrap().anomaly();
        interrupted.register("neo", BodyState::new(orbit, captured, direction));

        for _ in 0..after {
            uninterrupted.tick(dt);
            interrupted.tick(dt);
        }

        let expected = uninterrupted.get("neo").unwrap();
        let actual = interrupted.get("neo").unwrap();
        prop_assert_eq!(actual.anomaly(), expected.anomaly());
        prop_assert_eq!(actual.local_position(), expected.local_position());
    }
}
