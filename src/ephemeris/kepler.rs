//! Kepler equation solver and orbital-plane positions.

use bevy::math::DVec3;

/// Newton-Raphson iterations used for registered bodies.
///
/// Fixed count, no convergence check. Adequate for the e < 0.3 orbits that
/// dominate the scene; higher eccentricities can under-converge near
/// periapsis (see `test_high_eccentricity_precision_limit`).
pub const KEPLER_ITERATIONS: usize = 5;

/// Solve Kepler's equation `M = E − e·sin(E)` for the eccentric anomaly E.
///
/// `mean_anomaly` should already be wrapped to `[0, 2π)`. The result is not
/// wrapped; it is only consumed through `sin`/`cos`.
pub fn solve_eccentric_anomaly(mean_anomaly: f64, eccentricity: f64) -> f64 {
    solve_eccentric_anomaly_with(mean_anomaly, eccentricity, KEPLER_ITERATIONS)
}

/// [`solve_eccentric_anomaly`] with an explicit iteration count.
pub fn solve_eccentric_anomaly_with(
    mean_anomaly: f64,
    eccentricity: f64,
    iterations: usize,
) -> f64 {
    let mut e_anomaly = mean_anomaly;
    for _ in 0..iterations {
        let f = e_anomaly - eccentricity * e_anomaly.sin() - mean_anomaly;
        let f_prime = 1.0 - eccentricity * e_anomaly.cos();
        e_anomaly -= f / f_prime;
    }
    e_anomaly
}

/// Position in the orbital-plane frame for eccentric anomaly `e_anomaly`.
///
/// The ellipse lies in local XZ with the focus at the origin and periapsis on
/// +X: `(a(cos E − e), 0, b sin E)`.
pub fn plane_position(semi_major_axis: f64, eccentricity: f64, e_anomaly: f64) -> DVec3 {
    let b = semi_major_axis * (1.0 - eccentricity * eccentricity).sqrt();
    let (sin_e, cos_e) = e_anomaly.sin_cos();
    DVec3::new(semi_major_axis * (cos_e - eccentricity), 0.0, b * sin_e)
}
