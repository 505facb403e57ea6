//! Body rendering and spawning.
//!
//! Handles the visual representation of the Sun and every registered body.
//! Render entities are created lazily for registry entries that do not have
//! any yet, so fixed and dynamically selected bodies share one path.

use bevy::prelude::*;
use std::collections::HashSet;

use crate::camera::RenderOrigin;
use crate::registry::{BodyId, BodyRegistry, RenderHandle};
use crate::render::orbits::{OrbitPathSettings, hex_color, orbit_path_mesh, orbit_path_points};
use crate::types::SUN_RADIUS;

/// Sphere of a registered body.
#[derive(Component)]
pub struct RenderedBody(pub BodyId);

/// Orbit frame of a registered body (parent translation + plane rotation).
#[derive(Component)]
pub struct OrbitFrame(pub BodyId);

/// Orbit path line, child of an [`OrbitFrame`].
#[derive(Component)]
pub struct OrbitPath;

/// The Sun at the scene origin.
#[derive(Component)]
pub struct Sun;

/// Bodies the user has hidden.
#[derive(Resource, Default, Debug)]
pub struct HiddenBodies(pub HashSet<BodyId>);

impl HiddenBodies {
    pub fn is_hidden(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    /// Flip a body's visibility.
    pub fn toggle(&mut self, id: &str) {
        if !self.0.remove(id) {
            self.0.insert(BodyId::from(id));
        }
    }
}

/// Plugin providing body spawning and transform sync.
pub struct BodyRenderPlugin;

impl Plugin for BodyRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HiddenBodies>()
            .add_systems(Startup, spawn_sun);
    }
}

/// Spawn the emissive Sun with its light.
fn spawn_sun(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let color = Color::srgb(1.0, 0.85, 0.4);
    commands
        .spawn((
            Mesh3d(meshes.add(Sphere::new(SUN_RADIUS as f32).mesh().uv(64, 32))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: color,
                emissive: color.to_linear() * 4.0,
                unlit: true,
                ..default()
            })),
            Transform::default(),
            Sun,
        ))
        .with_child(PointLight {
            intensity: 1.0e9,
            range: 1.0e7,
            radius: SUN_RADIUS as f32,
            shadows_enabled: false,
            ..default()
        });

    info!("Spawned the Sun");
}

/// Create sphere and orbit path entities for registry entries lacking them.
pub fn spawn_body_renderables(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut registry: ResMut<BodyRegistry>,
    path_settings: Res<OrbitPathSettings>,
) {
    let missing: Vec<BodyId> = registry
        .iter()
        .filter(|(_, state)| state.renderable.is_none())
        .map(|(id, _)| id.clone())
        .collect();

    for id in missing {
        let Some(state) = registry.get(id.as_str()) else {
            continue;
        };

        let color = hex_color(state.style.color, 1.0);
        let sphere = meshes.add(Sphere::new(state.focus.radius as f32).mesh().uv(32, 16));
        let body_material = materials.add(StandardMaterial {
            base_color: color,
            perceptual_roughness: 0.9,
            ..default()
        });
        let body = commands
            .spawn((
                Mesh3d(sphere),
                MeshMaterial3d(body_material),
                Transform::default(),
                RenderedBody(id.clone()),
            ))
            .id();

        let segments = state.style.segments.max(path_settings.min_segments);
        let path = meshes.add(orbit_path_mesh(orbit_path_points(state.elements(), segments)));
        let path_material = materials.add(StandardMaterial {
            base_color: hex_color(state.style.color, path_settings.alpha),
            unlit: true,
            alpha_mode: AlphaMode::Blend,
            ..default()
        });
        let root = commands
            .spawn((
                Transform::from_rotation(state.plane_rotation().as_quat()),
                Visibility::default(),
                OrbitFrame(id.clone()),
            ))
            .with_child((
                Mesh3d(path),
                MeshMaterial3d(path_material),
                Transform::default(),
                OrbitPath,
            ))
            .id();

        registry.attach_renderable(id.as_str(), RenderHandle { root, body });
        debug!("Spawned render entities for {}", id);
    }
}

/// Write camera-relative transforms from the registry.
///
/// Spheres also take the body's tilt and spin.
pub fn sync_body_transforms(
    registry: Res<BodyRegistry>,
    origin: Res<RenderOrigin>,
    hidden: Res<HiddenBodies>,
    path_settings: Res<OrbitPathSettings>,
    mut bodies: Query<(&RenderedBody, &mut Transform, &mut Visibility), Without<OrbitFrame>>,
    mut frames: Query<(&OrbitFrame, &mut Transform, &mut Visibility), Without<RenderedBody>>,
    mut sun: Query<&mut Transform, (With<Sun>, Without<RenderedBody>, Without<OrbitFrame>)>,
) {
    for (RenderedBody(id), mut transform, mut visibility) in &mut bodies {
        let Some((state, world)) = registry
            .get(id.as_str())
            .zip(registry.world_position(id.as_str()))
        else {
            *visibility = Visibility::Hidden;
            continue;
        };
        transform.translation = (world - origin.0).as_vec3();
        transform.rotation = state.orientation().as_quat();
        *visibility = if hidden.is_hidden(id.as_str()) {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
    }

    for (OrbitFrame(id), mut transform, mut visibility) in &mut frames {
        let Some(parent) = registry.parent_position(id.as_str()) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        transform.translation = (parent - origin.0).as_vec3();
        *visibility = if path_settings.visible && !hidden.is_hidden(id.as_str()) {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }

    for mut transform in &mut sun {
        transform.translation = (-origin.0).as_vec3();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_toggle() {
        let mut hidden = HiddenBodies::default();
        hidden.toggle("mars");
        assert!(hidden.is_hidden("mars"));
        hidden.toggle("mars");
        assert!(!hidden.is_hidden("mars"));
    }
}
