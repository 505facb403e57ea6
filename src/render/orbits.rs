//! Orbit path geometry.
//!
//! Each body's ellipse is sampled once, in its orbital-plane frame, and drawn
//! as a line strip under the body's orbit frame entity. The plane rotation is
//! applied by that entity's transform, so paths never need resampling.

use bevy::{asset::RenderAssetUsages, mesh::PrimitiveTopology, prelude::*};

use crate::ephemeris::OrbitalElements;
use crate::ephemeris::kepler::plane_position;

/// Settings for orbit path rendering.
#[derive(Resource)]
pub struct OrbitPathSettings {
    /// Whether to show orbit paths.
    pub visible: bool,
    /// Alpha value for orbit path color.
    pub alpha: f32,
    /// Lower bound on samples per path.
    pub min_segments: usize,
}

impl Default for OrbitPathSettings {
    fn default() -> Self {
        Self {
            visible: true,
            alpha: 0.6,
            min_segments: 64,
        }
    }
}

/// Points along the full ellipse, sampled uniformly in eccentric anomaly.
///
/// Returns `segments + 1` points; the last repeats the first so the strip
/// closes.
pub fn orbit_path_points(elements: &OrbitalElements, segments: usize) -> Vec<Vec3> {
    let segments = segments.max(3);
    (0..=segments)
        .map(|k| {
            let theta = std::f64::consts::TAU * k as f64 / segments as f64;
            plane_position(elements.semi_major_axis(), elements.eccentricity(), theta).as_vec3()
        })
        .collect()
}

/// Line-strip mesh through `points`.
pub fn orbit_path_mesh(points: Vec<Vec3>) -> Mesh {
    Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, points)
}

/// Convert `0xRRGGBB` to a colour with the given alpha.
pub fn hex_color(rgb: u32, alpha: f32) -> Color {
    let [_, r, g, b] = rgb.to_be_bytes();
    Color::srgba_u8(r, g, b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::{ElementSet, Epoch};
    use crate::types::J2000_JD;

    fn ellipse(a: f64, e: f64) -> OrbitalElements {
        OrbitalElements::try_from(ElementSet {
            semi_major_axis: a,
            eccentricity: e,
            period_days: 100.0,
            inclination: 0.4,
            ascending_node: 1.0,
            argument_of_periapsis: 2.0,
            mean_anomaly_at_epoch: 0.0,
            epoch: Epoch::JulianDate(J2000_JD),
        })
        .unwrap()
    }

    #[test]
    fn test_path_is_closed() {
        let points = orbit_path_points(&ellipse(10.0, 0.3), 128);
        assert_eq!(points.len(), 129);
        assert!((points[0] - points[128]).length() < 1e-4);
    }

    #[test]
    fn test_path_lies_in_plane_between_apsides() {
        let a = 10.0;
        let e = 0.3;
        for p in orbit_path_points(&ellipse(a, e), 64) {
            assert_eq!(p.y, 0.0);
            let r = p.length() as f64;
            assert!(r >= a * (1.0 - e) - 1e-4 && r <= a * (1.0 + e) + 1e-4);
        }
    }

    #[test]
    fn test_segments_floor() {
        assert_eq!(orbit_path_points(&ellipse(1.0, 0.0), 0).len(), 4);
    }

    #[test]
    fn test_hex_color() {
        let color = hex_color(0xff8000, 1.0).to_srgba();
        assert_eq!(color.red, 1.0);
        assert!((color.green - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(color.blue, 0.0);
        assert_eq!(color.alpha, 1.0);
    }
}
