//! Axial rotation of the fixed bodies.
//!
//! A body spins about its own +Y axis at a constant sidereal rate; the spin
//! axis is then tilted about scene +X (the vernal equinox direction) by the
//! obliquity. Like orbital propagation, the spin angle has an incremental
//! and an absolute form that agree exactly:
//!
//! ```text
//! θ(t) = wrap2π(θ0 + 2π · Δdays(t − epoch) / P)
//! ```
//!
//! Body-fixed longitude 0 lies on +X before rotation, so for Earth `θ` is the
//! Greenwich sidereal angle.

use bevy::math::DQuat;
use std::f64::consts::TAU;

use crate::types::{DEG_TO_RAD, J2000_JD, MS_PER_DAY, SECONDS_PER_DAY, jd_to_unix_ms, wrap_two_pi};

/// Greenwich mean sidereal angle at J2000, degrees.
pub const GMST_J2000_DEG: f64 = 280.46061837;

/// Earth's sidereal rotation rate, degrees per day.
pub const EARTH_ROTATION_DEG_PER_DAY: f64 = 360.98564736629;

/// Earth's obliquity of the ecliptic at J2000, degrees.
pub const EARTH_OBLIQUITY_DEG: f64 = 23.4392911;

/// Constant-rate spin about a tilted axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpinAxis {
    /// Tilt of the spin axis from scene +Y, radians.
    pub obliquity: f64,
    /// Sidereal rotation period in days; negative for retrograde rotation.
    pub sidereal_period_days: f64,
    /// Spin angle at `epoch_unix_ms`, radians.
    pub angle_at_epoch: f64,
    pub epoch_unix_ms: f64,
}

impl SpinAxis {
    /// Spin referenced to J2000 with the given tilt (degrees) and period.
    pub fn j2000(obliquity_deg: f64, sidereal_period_days: f64, angle_at_epoch_deg: f64) -> Self {
        Self {
            obliquity: obliquity_deg * DEG_TO_RAD,
            sidereal_period_days,
            angle_at_epoch: angle_at_epoch_deg * DEG_TO_RAD,
            epoch_unix_ms: jd_to_unix_ms(J2000_JD),
        }
    }

    /// Earth: GMST at J2000 and the sidereal day.
    pub fn earth() -> Self {
        Self::j2000(
            EARTH_OBLIQUITY_DEG,
            360.0 / EARTH_ROTATION_DEG_PER_DAY,
            GMST_J2000_DEG,
        )
    }

    /// Radians per day, signed.
    pub fn rate_per_day(&self) -> f64 {
        if self.sidereal_period_days == 0.0 {
            0.0
        } else {
            TAU / self.sidereal_period_days
        }
    }

    /// Incremental spin: advance `angle` by `simulated_delta_secs`.
    pub fn advance(&self, angle: f64, simulated_delta_secs: f64) -> f64 {
        wrap_two_pi(angle + self.rate_per_day() * simulated_delta_secs / SECONDS_PER_DAY)
    }

    /// Absolute spin angle at `target_unix_ms`.
    pub fn angle_at(&self, target_unix_ms: f64) -> f64 {
        let delta_days = (target_unix_ms - self.epoch_unix_ms) / MS_PER_DAY;
        wrap_two_pi(self.angle_at_epoch + self.rate_per_day() * delta_days)
    }

    /// Rotation tilting body +Y onto the spin axis.
    ///
    /// Earth's north pole ends up at ecliptic longitude 90°, i.e. leaning
    /// towards scene −Z.
    pub fn tilt(&self) -> DQuat {
        DQuat::from_rotation_x(-self.obliquity)
    }

    /// Body-fixed to scene rotation for spin angle `angle`.
    pub fn orientation(&self, angle: f64) -> DQuat {
        self.tilt() * DQuat::from_rotation_y(angle)
    }
}
