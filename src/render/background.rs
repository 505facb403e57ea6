//! Background rendering for the solar system visualization.
//!
//! Provides the starfield and scene lighting.

use bevy::{
    asset::RenderAssetUsages, camera::visibility::NoFrustumCulling, mesh::PrimitiveTopology,
    prelude::*,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::f64::consts::TAU;

use crate::camera::MainCamera;

/// Number of background stars.
pub const STAR_COUNT: usize = 4000;

/// Radius of the star shell around the camera target, scene units.
///
/// Beyond the Oort cloud and inside the camera far plane.
pub const STAR_SHELL_RADIUS: f64 = 4.0e9;

const STAR_SEED: u64 = 0x57a2_f1e1d;

/// Plugin providing background visual elements.
pub struct BackgroundPlugin;

impl Plugin for BackgroundPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_starfield)
            .add_systems(Update, attach_ambient_light);
    }
}

/// Points distributed uniformly over a sphere of `radius`.
pub fn star_shell(count: usize, radius: f64, rng: &mut impl Rng) -> Vec<[f32; 3]> {
    (0..count)
        .map(|_| {
            let z: f64 = rng.gen_range(-1.0..=1.0);
            let phi: f64 = rng.gen_range(0.0..TAU);
            let ring = (1.0 - z * z).sqrt();
            [
                (radius * ring * phi.cos()) as f32,
                (radius * z) as f32,
                (radius * ring * phi.sin()) as f32,
            ]
        })
        .collect()
}

/// Spawn the starfield as a single point cloud.
///
/// It is never translated, so it stays centred on the camera target.
fn spawn_starfield(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let mut rng = StdRng::seed_from_u64(STAR_SEED);
    let points = star_shell(STAR_COUNT, STAR_SHELL_RADIUS, &mut rng);

    let mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, points);

    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::WHITE,
            unlit: true,
            ..default()
        })),
        Transform::default(),
        NoFrustumCulling,
    ));

    info!("Spawned {} background stars", STAR_COUNT);
}

/// Attach ambient light to the main camera.
fn attach_ambient_light(mut commands: Commands, cameras: Query<Entity, Added<MainCamera>>) {
    for camera in &cameras {
        commands.entity(camera).insert(AmbientLight {
            color: Color::WHITE,
            brightness: 80.0,
            ..default()
        });
        info!("Scene lighting initialized");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_star_shell_radius() {
        let mut rng = StdRng::seed_from_u64(1);
        for p in star_shell(200, 1000.0, &mut rng) {
            let r = Vec3::from(p).length();
            assert!((r - 1000.0).abs() < 0.01);
        }
    }
}
