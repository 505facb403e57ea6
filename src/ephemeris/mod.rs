//! Two-body orbital mechanics for every body in the scene.
//!
//! Each body is propagated independently on its own Keplerian ellipse. No
//! perturbations and no inter-body coupling.
//!
//! Coordinate frame:
//! - Orbital-plane positions lie in local XZ with periapsis on +X.
//! - The plane is oriented in the scene by a fixed rotation built from
//!   inclination, node and argument of periapsis.
//! - Fixed bodies also spin about a tilted axis; see [`rotation`].

pub mod data;
pub mod elements;
pub mod kepler;
pub mod propagator;
pub mod rotation;

#[cfg(test)]
mod proptest_ephemeris;

pub use data::{FixedBodyData, FixedBodyId, get_body_data};
pub use elements::{ElementSet, ElementsError, Epoch, OrbitRecord, OrbitalElements};
pub use kepler::{KEPLER_ITERATIONS, solve_eccentric_anomaly};
pub use propagator::{
    OrbitDirection, Propagation, advance, anomaly_at_time, initial_anomaly, position_for_anomaly,
    recompute_at_time,
};
pub use rotation::SpinAxis;
