//! Orbital elements: validated two-body orbits and the external record shape
//! they are ingested from.

use bevy::math::{DQuat, DVec3};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use thiserror::Error;

use crate::types::{MS_PER_DAY, jd_to_unix_ms, unix_ms_to_jd, wrap_two_pi};

/// Configuration errors detected while ingesting orbital data.
///
/// A body whose elements fail validation is never registered.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ElementsError {
    #[error("orbital period must be positive and finite, got {0}")]
    InvalidPeriod(f64),
    #[error("eccentricity {0} outside supported range [0, 1)")]
    UnsupportedEccentricity(f64),
    #[error("semi-major axis must be positive and finite, got {0}")]
    InvalidSemiMajorAxis(f64),
    #[error("{field} is not a finite number ({value})")]
    NonFinite { field: &'static str, value: f64 },
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
}

/// Reference time of a set of elements.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Epoch {
    /// Julian Date (days).
    JulianDate(f64),
    /// Milliseconds since the Unix epoch.
    UnixMillis(f64),
}

impl Epoch {
    /// Epoch as Unix milliseconds.
    pub fn unix_ms(self) -> f64 {
        match self {
            Epoch::JulianDate(jd) => jd_to_unix_ms(jd),
            Epoch::UnixMillis(ms) => ms,
        }
    }

    /// Epoch as a Julian Date.
    pub fn julian_date(self) -> f64 {
        match self {
            Epoch::JulianDate(jd) => jd,
            Epoch::UnixMillis(ms) => unix_ms_to_jd(ms),
        }
    }
}

/// Raw element values before validation.
///
/// Angles in radians, semi-major axis in scene units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementSet {
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub period_days: f64,
    pub inclination: f64,
    pub ascending_node: f64,
    pub argument_of_periapsis: f64,
    pub mean_anomaly_at_epoch: f64,
    pub epoch: Epoch,
}

/// One body's osculating two-body orbit at an epoch.
///
/// Immutable once constructed. A body whose elements change is re-registered
/// with a new value rather than mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitalElements {
    semi_major_axis: f64,
    eccentricity: f64,
    period_days: f64,
    inclination: f64,
    ascending_node: f64,
    argument_of_periapsis: f64,
    mean_anomaly_at_epoch: f64,
    epoch: Epoch,
}

impl TryFrom<ElementSet> for OrbitalElements {
    type Error = ElementsError;

    fn try_from(set: ElementSet) -> Result<Self, Self::Error> {
        if !(set.period_days.is_finite() && set.period_days > 0.0) {
            return Err(ElementsError::InvalidPeriod(set.period_days));
        }
        if !(0.0..1.0).contains(&set.eccentricity) {
            return Err(ElementsError::UnsupportedEccentricity(set.eccentricity));
        }
        if !(set.semi_major_axis.is_finite() && set.semi_major_axis > 0.0) {
            return Err(ElementsError::InvalidSemiMajorAxis(set.semi_major_axis));
        }
        let epoch_value = match set.epoch {
            Epoch::JulianDate(v) | Epoch::UnixMillis(v) => v,
        };
        for (field, value) in [
            ("inclination", set.inclination),
            ("ascending node", set.ascending_node),
            ("argument of periapsis", set.argument_of_periapsis),
            ("mean anomaly", set.mean_anomaly_at_epoch),
            ("epoch", epoch_value),
        ] {
            if !value.is_finite() {
                return Err(ElementsError::NonFinite { field, value });
            }
        }

        Ok(Self {
            semi_major_axis: set.semi_major_axis,
            eccentricity: set.eccentricity,
            period_days: set.period_days,
            inclination: set.inclination,
            ascending_node: wrap_two_pi(set.ascending_node),
            argument_of_periapsis: wrap_two_pi(set.argument_of_periapsis),
            mean_anomaly_at_epoch: wrap_two_pi(set.mean_anomaly_at_epoch),
            epoch: set.epoch,
        })
    }
}

impl OrbitalElements {
    /// Semi-major axis in scene units.
    pub fn semi_major_axis(&self) -> f64 {
        self.semi_major_axis
    }

    /// Semi-minor axis `b = a·√(1−e²)`.
    pub fn semi_minor_axis(&self) -> f64 {
        self.semi_major_axis * (1.0 - self.eccentricity * self.eccentricity).sqrt()
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn period_days(&self) -> f64 {
        self.period_days
    }

    pub fn inclination(&self) -> f64 {
        self.inclination
    }

    pub fn ascending_node(&self) -> f64 {
        self.ascending_node
    }

    pub fn argument_of_periapsis(&self) -> f64 {
        self.argument_of_periapsis
    }

    /// Mean anomaly at epoch, wrapped to `[0, 2π)`.
    pub fn mean_anomaly_at_epoch(&self) -> f64 {
        self.mean_anomaly_at_epoch
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Mean motion in radians per day: `2π / period`.
    pub fn mean_motion_per_day(&self) -> f64 {
        TAU / self.period_days
    }

    /// The same orbit with its epoch moved to `epoch`, mean anomaly advanced
    /// accordingly.
    pub fn reepoch(&self, epoch: Epoch) -> Self {
        let delta_days = (epoch.unix_ms() - self.epoch.unix_ms()) / MS_PER_DAY;
        Self {
            mean_anomaly_at_epoch: wrap_two_pi(
                self.mean_anomaly_at_epoch + self.mean_motion_per_day() * delta_days,
            ),
            epoch,
            ..self.clone()
        }
    }

    /// Fixed rotation from the orbital-plane frame (orbit in local XZ, normal +Y)
    /// to the scene frame.
    ///
    /// Ω about +Y, then i about the line of nodes, then ω about the tilted
    /// orbit normal.
    pub fn plane_rotation(&self) -> DQuat {
        let q_node = DQuat::from_axis_angle(DVec3::Y, self.ascending_node);
        let node_axis = (q_node * DVec3::X).normalize();
        let q_incl = DQuat::from_axis_angle(node_axis, self.inclination);
        let normal = (q_incl * (q_node * DVec3::Y)).normalize();
        let q_peri = DQuat::from_axis_angle(normal, self.argument_of_periapsis);

        q_node * q_incl * q_peri
    }
}

/// Orbital-element record as delivered by an external data provider.
///
/// Accepts both planet-ephemeris labels (`A`, `E`, `IN`, `OM`, `W`, `M0`,
/// `PR`, `N`) and small-body labels (`a`, `e`, `i`, `om`, `w`, `ma`,
/// `periodDays`). Angles in radians, distance in AU, epoch as a Julian Date.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitRecord {
    #[serde(alias = "A")]
    pub a: Option<f64>,
    #[serde(alias = "E")]
    pub e: Option<f64>,
    #[serde(rename = "periodDays", alias = "PR")]
    pub period_days: Option<f64>,
    #[serde(alias = "IN")]
    pub i: Option<f64>,
    #[serde(alias = "OM")]
    pub om: Option<f64>,
    #[serde(alias = "W")]
    pub w: Option<f64>,
    #[serde(alias = "M0")]
    pub ma: Option<f64>,
    /// Mean motion in rad/day as reported by the provider. Informational; the
    /// period is authoritative.
    #[serde(alias = "N")]
    pub n: Option<f64>,
    pub epoch_jd: Option<f64>,
}

impl OrbitRecord {
    /// Validate and convert to scene-unit elements.
    ///
    /// `au_scale` converts AU to scene units. Records without an epoch are
    /// taken to be osculating at `fallback_epoch`.
    pub fn into_elements(
        self,
        au_scale: f64,
        fallback_epoch: Epoch,
    ) -> Result<OrbitalElements, ElementsError> {
        let a = self.a.ok_or(ElementsError::MissingField("a"))?;
        let e = self.e.ok_or(ElementsError::MissingField("e"))?;
        let period_days = self
            .period_days
            .ok_or(ElementsError::MissingField("periodDays"))?;

        OrbitalElements::try_from(ElementSet {
            semi_major_axis: a * au_scale,
            eccentricity: e,
            period_days,
            inclination: self.i.unwrap_or(0.0),
            ascending_node: self.om.unwrap_or(0.0),
            argument_of_periapsis: self.w.unwrap_or(0.0),
            mean_anomaly_at_epoch: self.ma.unwrap_or(0.0),
            epoch: self.epoch_jd.map_or(fallback_epoch, Epoch::JulianDate),
        })
    }
}
