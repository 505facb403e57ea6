//! Asteroid belt, Kuiper belt and Oort cloud point clouds.
//!
//! Every particle carries its own Keplerian orbit and is propagated each frame
//! with a short fixed-iteration Kepler solve. Orbits are stored as
//! structure-of-arrays with the perifocal basis vectors precomputed, so the
//! per-frame work is four-wide SIMD over contiguous `f64` lanes.

use bevy::{
    asset::RenderAssetUsages, camera::visibility::NoFrustumCulling, mesh::PrimitiveTopology,
    prelude::*,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::f64::consts::TAU;
use wide::f64x4;

use crate::camera::RenderOrigin;
use crate::render::orbits::hex_color;
use crate::time::FrameSimDelta;
use crate::types::{DEG_TO_RAD, EARTH_A, wrap_two_pi};

/// Newton iterations per particle per frame.
pub const BELT_KEPLER_ITERATIONS: usize = 3;

/// Resonance gaps in the main asteroid belt as `(centre, half-width)` in AU.
pub const KIRKWOOD_GAPS: [(f64, f64); 4] = [(2.50, 0.04), (2.82, 0.03), (2.95, 0.02), (3.27, 0.04)];

/// Semi-major axis draws before a gap-rejecting sample gives up.
const MAX_GAP_REJECTIONS: usize = 64;

/// Parameters of one belt population.
#[derive(Clone, Debug, PartialEq)]
pub struct BeltConfig {
    pub name: &'static str,
    pub count: usize,
    /// Inner edge in AU.
    pub inner_au: f64,
    /// Outer edge in AU.
    pub outer_au: f64,
    pub max_inclination_deg: f64,
    /// Scale applied to the out-of-ecliptic component (1 = spherical).
    pub flatten: f64,
    pub color: u32,
    pub kirkwood_gaps: bool,
}

impl BeltConfig {
    pub fn asteroid_belt() -> Self {
        Self {
            name: "Asteroid Belt",
            count: 5000,
            inner_au: 2.1,
            outer_au: 3.0,
            max_inclination_deg: 12.0,
            flatten: 0.1,
            color: 0xbababa,
            kirkwood_gaps: true,
        }
    }

    pub fn kuiper_belt() -> Self {
        Self {
            name: "Kuiper Belt",
            count: 8000,
            inner_au: 30.0,
            outer_au: 50.0,
            max_inclination_deg: 30.0,
            flatten: 0.2,
            color: 0xEBDDBF,
            kirkwood_gaps: false,
        }
    }

    pub fn oort_cloud() -> Self {
        Self {
            name: "Oort Cloud",
            count: 15000,
            inner_au: 2000.0,
            outer_au: 100_000.0,
            max_inclination_deg: 90.0,
            flatten: 1.0,
            color: 0xC8C8FF,
            kirkwood_gaps: false,
        }
    }
}

/// Belt rendering configuration.
#[derive(Resource, Clone, Debug)]
pub struct BeltSettings {
    pub visible: bool,
    pub seed: u64,
    pub belts: Vec<BeltConfig>,
}

impl Default for BeltSettings {
    fn default() -> Self {
        Self {
            visible: true,
            seed: 0x5eed_be17,
            belts: vec![
                BeltConfig::asteroid_belt(),
                BeltConfig::kuiper_belt(),
                BeltConfig::oort_cloud(),
            ],
        }
    }
}

/// Whether `a_au` falls inside one of the main-belt resonance gaps.
pub fn in_kirkwood_gap(a_au: f64) -> bool {
    KIRKWOOD_GAPS
        .iter()
        .any(|&(centre, half_width)| (a_au - centre).abs() < half_width)
}

/// Semi-major axis in AU, biased toward the middle of the band by a
/// smoothstep curve.
fn sample_semi_major_axis(config: &BeltConfig, rng: &mut impl Rng) -> f64 {
    let mut a_au = config.inner_au;
    for _ in 0..MAX_GAP_REJECTIONS {
        let t: f64 = rng.gen_range(0.0..1.0);
        let s = t * t * (3.0 - 2.0 * t);
        a_au = config.inner_au + (config.outer_au - config.inner_au) * s;
        if !config.kirkwood_gaps || !in_kirkwood_gap(a_au) {
            break;
        }
    }
    a_au
}

/// Orbits of every particle in one belt, stored column-wise.
#[derive(Clone, Debug, Default)]
pub struct BeltPopulation {
    /// Semi-major axis in AU.
    semi_major_axis: Vec<f64>,
    semi_minor_axis: Vec<f64>,
    eccentricity: Vec<f64>,
    /// Mean motion in radians per day.
    mean_motion: Vec<f64>,
    mean_anomaly: Vec<f64>,
    // Perifocal basis in the ecliptic frame: P toward periapsis, Q 90° ahead.
    p: [Vec<f64>; 3],
    q: [Vec<f64>; 3],
    flatten: f64,
}

impl BeltPopulation {
    /// Draw `config.count` particles from `rng`.
    pub fn generate(config: &BeltConfig, rng: &mut impl Rng) -> Self {
        let mut population = Self {
            flatten: config.flatten,
            ..Default::default()
        };

        for _ in 0..config.count {
            let a_au = sample_semi_major_axis(config, rng);
            let e = (0.08 + 0.05 * rng.gen_range(-1.0_f64..1.0)).clamp(0.0, 0.3);
            let inclination = rng.gen_range(0.0..=config.max_inclination_deg) * DEG_TO_RAD;
            let node = rng.gen_range(0.0..TAU);
            let peri = rng.gen_range(0.0..TAU);
            let phase = rng.gen_range(0.0..TAU);
            let period_days = a_au.powi(3).sqrt() * 365.25;

            population.push(a_au, e, inclination, node, peri, phase, TAU / period_days);
        }

        population
    }

    fn push(
        &mut self,
        a_au: f64,
        e: f64,
        inclination: f64,
        node: f64,
        peri: f64,
        mean_anomaly: f64,
        mean_motion: f64,
    ) {
        let (sin_o, cos_o) = node.sin_cos();
        let (sin_w, cos_w) = peri.sin_cos();
        let (sin_i, cos_i) = inclination.sin_cos();

        let p = [
            cos_o * cos_w - sin_o * sin_w * cos_i,
            sin_o * cos_w + cos_o * sin_w * cos_i,
            sin_w * sin_i,
        ];
        let q = [
            -cos_o * sin_w - sin_o * cos_w * cos_i,
            -sin_o * sin_w + cos_o * cos_w * cos_i,
            cos_w * sin_i,
        ];

        self.semi_major_axis.push(a_au);
        self.semi_minor_axis.push(a_au * (1.0 - e * e).sqrt());
        self.eccentricity.push(e);
        self.mean_motion.push(mean_motion);
        self.mean_anomaly.push(mean_anomaly);
        for k in 0..3 {
            self.p[k].push(p[k]);
            self.q[k].push(q[k]);
        }
    }

    pub fn len(&self) -> usize {
        self.semi_major_axis.len()
    }

    pub fn is_empty(&self) -> bool {
        self.semi_major_axis.is_empty()
    }

    pub fn semi_major_axes(&self) -> &[f64] {
        &self.semi_major_axis
    }

    pub fn eccentricities(&self) -> &[f64] {
        &self.eccentricity
    }

    pub fn mean_anomalies(&self) -> &[f64] {
        &self.mean_anomaly
    }

    /// Advance every particle by `delta_days` and write scene positions
    /// (heliocentric, scene units) into `out`.
    pub fn step(&mut self, delta_days: f64, out: &mut Vec<[f32; 3]>) {
        out.resize(self.len(), [0.0; 3]);

        let lanes = self.len() / 4 * 4;
        for start in (0..lanes).step_by(4) {
            self.step_lanes(start, delta_days, out);
        }
        for idx in lanes..self.len() {
            self.step_single(idx, delta_days, out);
        }
    }

    fn step_lanes(&mut self, start: usize, delta_days: f64, out: &mut [[f32; 3]]) {
        let load = |column: &[f64]| -> f64x4 {
            f64x4::new([
                column[start],
                column[start + 1],
                column[start + 2],
                column[start + 3],
            ])
        };

        let advanced =
            load(&self.mean_anomaly) + load(&self.mean_motion) * f64x4::splat(delta_days);
        let wrapped = advanced.to_array().map(wrap_two_pi);
        self.mean_anomaly[start..start + 4].copy_from_slice(&wrapped);
        let m = f64x4::new(wrapped);

        let e = load(&self.eccentricity);
        let one = f64x4::splat(1.0);
        let mut ecc_anomaly = m;
        for _ in 0..BELT_KEPLER_ITERATIONS {
            let (sin_e, cos_e) = ecc_anomaly.sin_cos();
            ecc_anomaly = ecc_anomaly - (ecc_anomaly - e * sin_e - m) / (one - e * cos_e);
        }

        let (sin_e, cos_e) = ecc_anomaly.sin_cos();
        let x = (load(&self.semi_major_axis) * (cos_e - e)).to_array();
        let y = (load(&self.semi_minor_axis) * sin_e).to_array();

        for lane in 0..4 {
            out[start + lane] = self.scene_position(start + lane, x[lane], y[lane]);
        }
    }

    fn step_single(&mut self, idx: usize, delta_days: f64, out: &mut [[f32; 3]]) {
        let m = wrap_two_pi(self.mean_anomaly[idx] + self.mean_motion[idx] * delta_days);
        self.mean_anomaly[idx] = m;

        let e = self.eccentricity[idx];
        let mut ecc_anomaly = m;
        for _ in 0..BELT_KEPLER_ITERATIONS {
            ecc_anomaly -=
                (ecc_anomaly - e * ecc_anomaly.sin() - m) / (1.0 - e * ecc_anomaly.cos());
        }

        let (sin_e, cos_e) = ecc_anomaly.sin_cos();
        let x = self.semi_major_axis[idx] * (cos_e - e);
        let y = self.semi_minor_axis[idx] * sin_e;
        out[idx] = self.scene_position(idx, x, y);
    }

    /// Perifocal `(x, y)` in AU to scene coordinates.
    ///
    /// Ecliptic `(X, Y, Z)` maps to scene `(X, Z·flatten, −Y)`, matching the
    /// orientation used for planetary orbit planes.
    fn scene_position(&self, idx: usize, x: f64, y: f64) -> [f32; 3] {
        let ecl_x = x * self.p[0][idx] + y * self.q[0][idx];
        let ecl_y = x * self.p[1][idx] + y * self.q[1][idx];
        let ecl_z = x * self.p[2][idx] + y * self.q[2][idx];
        [
            (ecl_x * EARTH_A) as f32,
            (ecl_z * self.flatten * EARTH_A) as f32,
            (-ecl_y * EARTH_A) as f32,
        ]
    }
}

/// A belt's point cloud.
#[derive(Component)]
pub struct BeltCloud {
    pub name: &'static str,
    population: BeltPopulation,
    positions: Vec<[f32; 3]>,
}

/// Plugin providing belt populations.
pub struct BeltPlugin;

impl Plugin for BeltPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<BeltSettings>()
            .add_systems(Startup, spawn_belts);
    }
}

/// Generate every configured belt and spawn its point cloud.
fn spawn_belts(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    settings: Res<BeltSettings>,
) {
    let mut rng = StdRng::seed_from_u64(settings.seed);

    for config in &settings.belts {
        let mut population = BeltPopulation::generate(config, &mut rng);
        let mut positions = Vec::with_capacity(population.len());
        population.step(0.0, &mut positions);

        let mesh = Mesh::new(
            PrimitiveTopology::PointList,
            RenderAssetUsages::MAIN_WORLD | RenderAssetUsages::RENDER_WORLD,
        )
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions.clone());

        commands.spawn((
            Mesh3d(meshes.add(mesh)),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: hex_color(config.color, 0.8),
                unlit: true,
                alpha_mode: AlphaMode::Blend,
                ..default()
            })),
            Transform::default(),
            NoFrustumCulling,
            BeltCloud {
                name: config.name,
                population,
                positions,
            },
        ));

        info!("Spawned {} with {} particles", config.name, config.count);
    }
}

/// Propagate belt particles and upload their positions.
pub fn update_belts(
    frame_delta: Res<FrameSimDelta>,
    settings: Res<BeltSettings>,
    origin: Res<RenderOrigin>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut belts: Query<(&mut BeltCloud, &Mesh3d, &mut Transform, &mut Visibility)>,
) {
    let delta_days = frame_delta.0 / crate::types::SECONDS_PER_DAY;

    for (mut cloud, mesh_handle, mut transform, mut visibility) in &mut belts {
        *visibility = if settings.visible {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        transform.translation = (-origin.0).as_vec3();

        if delta_days == 0.0 {
            continue;
        }

        let BeltCloud {
            population,
            positions,
            ..
        } = &mut *cloud;
        population.step(delta_days, positions);

        if let Some(mesh) = meshes.get_mut(&mesh_handle.0) {
            mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::angular_distance;

    fn small_belt(count: usize) -> BeltConfig {
        BeltConfig {
            count,
            ..BeltConfig::asteroid_belt()
        }
    }

    #[test]
    fn test_generation_is_seeded() {
        let config = small_belt(64);
        let a = BeltPopulation::generate(&config, &mut StdRng::seed_from_u64(7));
        let b = BeltPopulation::generate(&config, &mut StdRng::seed_from_u64(7));
        assert_eq!(a.semi_major_axes(), b.semi_major_axes());
        assert_eq!(a.mean_anomalies(), b.mean_anomalies());
    }

    #[test]
    fn test_asteroid_belt_avoids_kirkwood_gaps() {
        let config = small_belt(2000);
        let population = BeltPopulation::generate(&config, &mut StdRng::seed_from_u64(1));
        for &a in population.semi_major_axes() {
            assert!((config.inner_au..=config.outer_au).contains(&a));
            assert!(!in_kirkwood_gap(a), "particle at {a} AU sits in a gap");
        }
    }

    #[test]
    fn test_eccentricity_is_capped() {
        let population =
            BeltPopulation::generate(&BeltConfig::kuiper_belt(), &mut StdRng::seed_from_u64(3));
        assert!(
            population
                .eccentricities()
                .iter()
                .all(|&e| (0.0..=0.3).contains(&e))
        );
    }

    #[test]
    fn test_simd_and_scalar_paths_agree() {
        // Seven particles: one four-wide batch plus three scalar leftovers.
        let config = small_belt(7);
        let mut batched = BeltPopulation::generate(&config, &mut StdRng::seed_from_u64(11));
        let mut scalar = batched.clone();

        let mut batched_out = Vec::new();
        batched.step(123.4, &mut batched_out);

        let mut scalar_out = vec![[0.0; 3]; scalar.len()];
        for idx in 0..scalar.len() {
            scalar.step_single(idx, 123.4, &mut scalar_out);
        }

        for idx in 0..7 {
            assert!(
                angular_distance(batched.mean_anomalies()[idx], scalar.mean_anomalies()[idx])
                    < 1e-9
            );
            for k in 0..3 {
                let diff = (batched_out[idx][k] - scalar_out[idx][k]).abs();
                assert!(diff <= 1e-3 * scalar_out[idx][k].abs().max(1.0));
            }
        }
    }

    #[test]
    fn test_step_keeps_anomalies_wrapped() {
        let config = small_belt(9);
        let mut population = BeltPopulation::generate(&config, &mut StdRng::seed_from_u64(5));
        let mut out = Vec::new();
        for _ in 0..50 {
            population.step(400.0, &mut out);
        }
        assert_eq!(out.len(), 9);
        assert!(
            population
                .mean_anomalies()
                .iter()
                .all(|&m| (0.0..TAU).contains(&m))
        );
    }

    #[test]
    fn test_particles_stay_within_apsides() {
        let config = small_belt(16);
        let mut population = BeltPopulation::generate(&config, &mut StdRng::seed_from_u64(9));
        let mut out = Vec::new();
        population.step(37.0, &mut out);

        for (idx, p) in out.iter().enumerate() {
            let a = population.semi_major_axes()[idx] * EARTH_A;
            let e = population.eccentricities()[idx];
            // Flattening only shrinks the radius.
            let r = Vec3::from(*p).length() as f64;
            assert!(r <= a * (1.0 + e) * 1.0001, "particle {idx} beyond apoapsis");
        }
    }

    #[test]
    fn test_inner_belt_moves_faster() {
        let mut population = BeltPopulation::default();
        population.push(2.2, 0.0, 0.0, 0.0, 0.0, 0.0, TAU / (2.2f64.powi(3).sqrt() * 365.25));
        population.push(2.9, 0.0, 0.0, 0.0, 0.0, 0.0, TAU / (2.9f64.powi(3).sqrt() * 365.25));
        let mut out = Vec::new();
        population.step(100.0, &mut out);
        let anomalies = population.mean_anomalies();
        assert!(anomalies[0] > anomalies[1]);
    }
}
