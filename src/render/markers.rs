//! Impact markers left by surface flights.
//!
//! A marker is three concentric translucent discs lying on the body's
//! surface. They are children of the body's sphere, so they follow its
//! orbit and its spin.

use bevy::prelude::*;

use crate::camera::{SurfaceFlightRequest, surface_offset};
use crate::registry::{BodyId, BodyRegistry};
use crate::render::orbits::hex_color;

/// Disc radius, height above the surface (both per unit body radius) and
/// colour, innermost first.
pub const MARKER_RINGS: [(f64, f64, u32); 3] = [
    (0.02, 0.0012, 0xd96609),
    (0.03, 0.0008, 0xe8544d),
    (0.045, 0.0005, 0xbce84d),
];

/// Marker disc opacity.
const MARKER_ALPHA: f32 = 0.35;

/// One disc of an impact marker.
#[derive(Component, Clone, Debug)]
pub struct ImpactMarker {
    pub body: BodyId,
    pub ring: usize,
}

/// Local placement of a marker disc on a sphere of `radius`: centred above
/// latitude/longitude (degrees) and facing away from the centre.
pub fn marker_transform(radius: f64, latitude: f64, longitude: f64, lift: f64) -> Transform {
    let normal = surface_offset(1.0, latitude.clamp(-90.0, 90.0), longitude).as_vec3();
    Transform::from_translation(normal * (radius + lift * radius) as f32)
        .with_rotation(Quat::from_rotation_arc(Vec3::Z, normal.normalize()))
}

/// Spawn markers for surface flights that ask for one.
///
/// Bodies without render entities yet are skipped.
pub fn spawn_impact_markers(
    mut commands: Commands,
    mut requests: MessageReader<SurfaceFlightRequest>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    registry: Res<BodyRegistry>,
) {
    for request in requests.read().filter(|r| r.marker) {
        let Some(state) = registry.get(request.body.as_str()) else {
            warn!("No body {} to mark", request.body);
            continue;
        };
        let Some(handle) = state.renderable else {
            warn!("Body {} is not rendered yet, skipping marker", request.body);
            continue;
        };
        let radius = state.focus.radius;

        for (ring, &(disc_radius, lift, color)) in MARKER_RINGS.iter().enumerate() {
            let mesh = meshes.add(Circle::new((disc_radius * radius) as f32));
            let material = materials.add(StandardMaterial {
                base_color: hex_color(color, MARKER_ALPHA),
                unlit: true,
                alpha_mode: AlphaMode::Blend,
                cull_mode: None,
                double_sided: true,
                ..default()
            });
            let marker = commands
                .spawn((
                    Mesh3d(mesh),
                    MeshMaterial3d(material),
                    marker_transform(radius, request.latitude, request.longitude, lift),
                    ImpactMarker {
                        body: request.body.clone(),
                        ring,
                    },
                ))
                .id();
            commands.entity(handle.body).add_child(marker);
        }

        info!(
            "Marked impact at {:.2}, {:.2} on {}",
            request.latitude, request.longitude, request.body
        );
    }
}
