//! Orbital elements for the fixed solar-system bodies (J2000 epoch).
//! Source: NASA JPL approximate planetary elements, mean values.

use super::elements::{ElementSet, ElementsError, Epoch, OrbitalElements};
use super::rotation::SpinAxis;
use crate::types::{DEG_TO_RAD, EARTH_A, J2000_JD};

/// Identifier for the fixed bodies registered at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FixedBodyId {
    Mercury,
    Venus,
    Earth,
    Moon,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl FixedBodyId {
    /// All fixed bodies, parents before their satellites.
    pub const ALL: &'static [FixedBodyId] = &[
        FixedBodyId::Mercury,
        FixedBodyId::Venus,
        FixedBodyId::Earth,
        FixedBodyId::Moon,
        FixedBodyId::Mars,
        FixedBodyId::Jupiter,
        FixedBodyId::Saturn,
        FixedBodyId::Uranus,
        FixedBodyId::Neptune,
        FixedBodyId::Pluto,
    ];

    /// Registry key.
    pub fn key(&self) -> &'static str {
        match self {
            FixedBodyId::Mercury => "mercury",
            FixedBodyId::Venus => "venus",
            FixedBodyId::Earth => "earth",
            FixedBodyId::Moon => "moon",
            FixedBodyId::Mars => "mars",
            FixedBodyId::Jupiter => "jupiter",
            FixedBodyId::Saturn => "saturn",
            FixedBodyId::Uranus => "uranus",
            FixedBodyId::Neptune => "neptune",
            FixedBodyId::Pluto => "pluto",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            FixedBodyId::Mercury => "Mercury",
            FixedBodyId::Venus => "Venus",
            FixedBodyId::Earth => "Earth",
            FixedBodyId::Moon => "Moon",
            FixedBodyId::Mars => "Mars",
            FixedBodyId::Jupiter => "Jupiter",
            FixedBodyId::Saturn => "Saturn",
            FixedBodyId::Uranus => "Uranus",
            FixedBodyId::Neptune => "Neptune",
            FixedBodyId::Pluto => "Pluto",
        }
    }

    /// Get the parent body (for moons)
    pub fn parent(&self) -> Option<FixedBodyId> {
        match self {
            FixedBodyId::Moon => Some(FixedBodyId::Earth),
            _ => None,
        }
    }
}

/// Baked elements in catalogue units: AU (or scene units for satellites),
/// degrees, days.
#[derive(Clone, Copy, Debug)]
struct BakedElements {
    a: f64,
    e: f64,
    i_deg: f64,
    node_deg: f64,
    peri_deg: f64,
    mean_anomaly_deg: f64,
    period_days: f64,
}

impl BakedElements {
    fn to_elements(self, au_scale: f64) -> Result<OrbitalElements, ElementsError> {
        OrbitalElements::try_from(ElementSet {
            semi_major_axis: self.a * au_scale,
            eccentricity: self.e,
            period_days: self.period_days,
            inclination: self.i_deg * DEG_TO_RAD,
            ascending_node: self.node_deg * DEG_TO_RAD,
            argument_of_periapsis: self.peri_deg * DEG_TO_RAD,
            mean_anomaly_at_epoch: self.mean_anomaly_deg * DEG_TO_RAD,
            epoch: Epoch::JulianDate(J2000_JD),
        })
    }
}

/// Static data for a fixed body.
#[derive(Clone, Debug)]
pub struct FixedBodyData {
    pub id: FixedBodyId,
    /// Elements in scene units.
    pub elements: OrbitalElements,
    /// Render radius in scene units (Earth = 1).
    pub radius: f64,
    /// Sphere and orbit colour as `0xRRGGBB`.
    pub color: u32,
    /// Orbit path sample count.
    pub segments: usize,
    /// Camera distance used when focusing this body.
    pub initial_distance: f64,
    /// Axial tilt and sidereal rotation.
    pub spin: SpinAxis,
}

fn baked(id: FixedBodyId) -> (BakedElements, f64, u32, usize, f64) {
    // (elements, radius, colour, path segments, focus distance)
    match id {
        FixedBodyId::Mercury => (
            BakedElements {
                a: 0.387098,
                e: 0.205630,
                i_deg: 7.005,
                node_deg: 48.331,
                peri_deg: 29.124,
                mean_anomaly_deg: 174.796,
                period_days: 87.969,
            },
            0.363,
            0xC0C0C0,
            512,
            3.0,
        ),
        FixedBodyId::Venus => (
            BakedElements {
                a: 0.723332,
                e: 0.006772,
                i_deg: 3.39458,
                node_deg: 76.680,
                peri_deg: 54.884,
                mean_anomaly_deg: 50.115,
                period_days: 224.701,
            },
            0.949,
            0xADFF2F,
            512,
            4.0,
        ),
        FixedBodyId::Earth => (
            BakedElements {
                a: 1.000001,
                e: 0.0167086,
                i_deg: 0.0,
                node_deg: 0.0,
                peri_deg: 102.9372,
                mean_anomaly_deg: 357.51716,
                period_days: 365.256,
            },
            1.0,
            0x87CEFA,
            1024,
            4.0,
        ),
        // Geocentric; `a` is already in scene units (Earth radii).
        FixedBodyId::Moon => (
            BakedElements {
                a: 60.27,
                e: 0.055,
                i_deg: 5.145,
                node_deg: 125.08,
                peri_deg: 318.15,
                mean_anomaly_deg: 115.3654,
                period_days: 27.321661,
            },
            0.2727,
            0xffffff,
            256,
            1.5,
        ),
        FixedBodyId::Mars => (
            BakedElements {
                a: 1.523679,
                e: 0.0934,
                i_deg: 1.850,
                node_deg: 49.558,
                peri_deg: 286.502,
                mean_anomaly_deg: 19.412,
                period_days: 686.98,
            },
            0.53,
            0xdb6037,
            1024,
            4.0,
        ),
        FixedBodyId::Jupiter => (
            BakedElements {
                a: 5.2044,
                e: 0.0489,
                i_deg: 1.303,
                node_deg: 100.464,
                peri_deg: 273.867,
                mean_anomaly_deg: 20.020,
                period_days: 4332.59,
            },
            10.97,
            0xD4A373,
            2048,
            60.0,
        ),
        FixedBodyId::Saturn => (
            BakedElements {
                a: 9.5826,
                e: 0.0565,
                i_deg: 2.485,
                node_deg: 113.665,
                peri_deg: 339.392,
                mean_anomaly_deg: 317.020,
                period_days: 10759.22,
            },
            9.14,
            0xD8C16F,
            2048,
            50.0,
        ),
        FixedBodyId::Uranus => (
            BakedElements {
                a: 19.2184,
                e: 0.046381,
                i_deg: 0.773,
                node_deg: 74.006,
                peri_deg: 96.998857,
                mean_anomaly_deg: 142.2386,
                period_days: 30688.5,
            },
            3.98,
            0x78DBE2,
            4096,
            30.0,
        ),
        FixedBodyId::Neptune => (
            BakedElements {
                a: 30.07,
                e: 0.008678,
                i_deg: 1.770,
                node_deg: 131.784,
                peri_deg: 276.336,
                mean_anomaly_deg: 256.228,
                period_days: 60195.0,
            },
            3.87,
            0x4169E1,
            4096,
            30.0,
        ),
        FixedBodyId::Pluto => (
            BakedElements {
                a: 39.482,
                e: 0.2488,
                i_deg: 17.16,
                node_deg: 110.299,
                peri_deg: 113.834,
                mean_anomaly_deg: 14.53,
                period_days: 90560.0,
            },
            0.19,
            0xC2A383,
            4096,
            4.0,
        ),
    }
}

/// Axial rotation: obliquity to the ecliptic in degrees and sidereal period
/// in days, negative for retrograde spin. Earth is referenced to GMST.
fn spin(id: FixedBodyId) -> SpinAxis {
    let (obliquity_deg, period_days) = match id {
        FixedBodyId::Earth => return SpinAxis::earth(),
        FixedBodyId::Mercury => (0.034, 58.6462),
        FixedBodyId::Venus => (2.64, -243.018),
        FixedBodyId::Moon => (1.5424, 27.321661),
        FixedBodyId::Mars => (25.19, 1.02595676),
        FixedBodyId::Jupiter => (3.13, 0.41354),
        FixedBodyId::Saturn => (26.73, 0.44401),
        FixedBodyId::Uranus => (82.23, -0.71833),
        FixedBodyId::Neptune => (28.32, 0.67125),
        FixedBodyId::Pluto => (57.47, -6.38723),
    };
    SpinAxis::j2000(obliquity_deg, period_days, 0.0)
}

/// Get orbital and render data for a fixed body.
pub fn get_body_data(id: FixedBodyId) -> Result<FixedBodyData, ElementsError> {
    let (elements, radius, color, segments, initial_distance) = baked(id);
    let au_scale = if id.parent().is_some() { 1.0 } else { EARTH_A };

    Ok(FixedBodyData {
        id,
        elements: elements.to_elements(au_scale)?,
        radius,
        color,
        segments,
        initial_distance,
        spin: spin(id),
    })
}
