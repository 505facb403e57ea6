//! Headless Bevy integration tests.
//!
//! These tests drive the simulation plugins under `MinimalPlugins`, without a
//! window or GPU.

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::math::DVec3;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;

use pleiades::camera::{
    AnchorState, CameraAnchorController, CameraPose, CameraRig, CameraSettings, FocusRequest,
    MainCamera, RenderOrigin, SurfaceFlightRequest, follow_anchor,
};
use pleiades::ephemeris::{OrbitDirection, SpinAxis, anomaly_at_time};
use pleiades::registry::{BodyRegistry, RenderHandle};
use pleiades::render::markers::{ImpactMarker, MARKER_RINGS, spawn_impact_markers};
use pleiades::time::{AnimationClock, TimePlugin, TravelRequest, TravelTarget};
use pleiades::types::{J2000_JD, SECONDS_PER_DAY, SimulationSet, angular_distance, jd_to_unix_ms};

fn create_minimal_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app
}

/// App with the clock and fixed bodies, stepping `frame_secs` per update.
fn create_sim_app(frame_secs: f64, multiplier: f64) -> App {
    let mut app = create_minimal_app();
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        frame_secs,
    )));
    // Virtual time clamps long frames by default.
    app.world_mut()
        .resource_mut::<Time<Virtual>>()
        .set_max_delta(Duration::from_secs(10));
    let mut clock = AnimationClock::starting_at(jd_to_unix_ms(J2000_JD));
    clock.multiplier = multiplier;
    app.insert_resource(clock);
    app.add_plugins(TimePlugin);
    app
}

fn anomaly(app: &App, id: &str) -> f64 {
    app.world()
        .resource::<BodyRegistry>()
        .current_anomaly(id)
        .expect("body should be registered")
}

fn expected_anomaly(app: &App, id: &str, date_ms: f64) -> f64 {
    let registry = app.world().resource::<BodyRegistry>();
    let state = registry.get(id).expect("body should be registered");
    anomaly_at_time(date_ms, state.elements(), OrbitDirection::default())
}

#[test]
fn test_fixed_bodies_registered_at_startup() {
    let mut app = create_sim_app(0.0, 1.0);
    app.update();

    let registry = app.world().resource::<BodyRegistry>();
    for id in ["mercury", "venus", "earth", "moon", "mars", "jupiter", "neptune", "pluto"] {
        assert!(registry.contains(id), "{id} missing");
    }
    assert_eq!(
        registry.get("moon").and_then(|s| s.parent.as_ref()).map(|p| p.as_str()),
        Some("earth")
    );

    let j2000 = jd_to_unix_ms(J2000_JD);
    let expected = expected_anomaly(&app, "earth", j2000);
    assert!(angular_distance(anomaly(&app, "earth"), expected) < 1e-12);
}

#[test]
fn test_clock_drives_incremental_propagation() {
    let mut app = create_sim_app(1.0, SECONDS_PER_DAY);
    for _ in 0..20 {
        app.update();
    }

    let date_ms = app.world().resource::<AnimationClock>().date_ms();
    let elapsed_days = (date_ms - jd_to_unix_ms(J2000_JD)) / 86_400_000.0;
    assert!(elapsed_days > 15.0, "only {elapsed_days} days elapsed");

    // Incremental steps land where absolute propagation says they should.
    for id in ["earth", "mars", "moon"] {
        let diff = angular_distance(anomaly(&app, id), expected_anomaly(&app, id, date_ms));
        assert!(diff < 1e-6, "{id} drifted by {diff}");
    }

    // Earth's spin tracks sidereal time the same way.
    let registry = app.world().resource::<BodyRegistry>();
    let spin_angle = registry.get("earth").map(|s| s.spin_angle()).expect("earth registered");
    let sidereal = SpinAxis::earth().angle_at(date_ms);
    assert!(angular_distance(spin_angle, sidereal) < 1e-6);
}

#[test]
fn test_paused_clock_freezes_bodies() {
    let mut app = create_sim_app(1.0, SECONDS_PER_DAY);
    app.update();
    app.world_mut().resource_mut::<AnimationClock>().paused = true;

    let date_before = app.world().resource::<AnimationClock>().date_ms();
    let earth_before = anomaly(&app, "earth");
    for _ in 0..5 {
        app.update();
    }

    assert_eq!(app.world().resource::<AnimationClock>().date_ms(), date_before);
    assert_eq!(anomaly(&app, "earth"), earth_before);
}

#[test]
fn test_time_travel_then_resume_is_continuous() {
    let mut app = create_sim_app(1.0, SECONDS_PER_DAY);
    app.update();

    let target = jd_to_unix_ms(2_462_240.5);
    app.world_mut().write_message(TravelRequest(TravelTarget::Date(target)));
    app.update();

    assert_eq!(app.world().resource::<AnimationClock>().date_ms(), target);
    assert!(angular_distance(anomaly(&app, "mars"), expected_anomaly(&app, "mars", target)) < 1e-9);

    for _ in 0..10 {
        app.update();
    }
    let date_ms = app.world().resource::<AnimationClock>().date_ms();
    assert!(date_ms > target);
    let expected = expected_anomaly(&app, "mars", date_ms);
    assert!(angular_distance(anomaly(&app, "mars"), expected) < 1e-6);
}

/// Sim app plus the anchor-following system and a bare camera entity.
fn create_camera_app() -> App {
    let mut app = create_sim_app(0.5, 0.0);
    app.init_resource::<RenderOrigin>()
        .insert_resource(CameraAnchorController::new("earth", CameraSettings::default()))
        .add_message::<FocusRequest>()
        .add_message::<SurfaceFlightRequest>()
        .add_systems(Update, follow_anchor.in_set(SimulationSet::Camera));
    app.world_mut().spawn((
        Transform::default(),
        MainCamera,
        CameraRig {
            pose: CameraPose {
                position: DVec3::new(0.0, 1.0, 4.0),
                target: DVec3::ZERO,
            },
        },
    ));
    app
}

fn rig_pose(app: &mut App) -> CameraPose {
    let mut query = app.world_mut().query::<&CameraRig>();
    query
        .single(app.world())
        .expect("camera should exist")
        .pose
}

#[test]
fn test_camera_tracks_anchor_and_render_origin() {
    let mut app = create_camera_app();
    for _ in 0..3 {
        app.update();
    }

    let earth = app
        .world()
        .resource::<BodyRegistry>()
        .world_position("earth")
        .expect("earth registered");
    let pose = rig_pose(&mut app);
    assert!((pose.target - earth).length() < 1e-9);
    assert_eq!(app.world().resource::<RenderOrigin>().0, pose.target);
}

#[test]
fn test_focus_request_transitions_to_new_anchor() {
    let mut app = create_camera_app();
    app.update();

    app.world_mut().write_message(FocusRequest("mars".into()));
    // 1.5 s transition at 0.5 s per frame.
    for _ in 0..6 {
        app.update();
    }

    let controller = app.world().resource::<CameraAnchorController>();
    assert!(matches!(
        controller.state(),
        AnchorState::Idle { anchor } if anchor.as_str() == "mars"
    ));

    let registry = app.world().resource::<BodyRegistry>();
    let mars = registry.world_position("mars").expect("mars registered");
    let nominal = registry
        .get("mars")
        .map(|s| s.focus.anchor_offset())
        .expect("mars registered");

    let pose = rig_pose(&mut app);
    assert!((pose.target - mars).length() < 1e-6);
    assert!((pose.offset() - nominal).length() < 1e-6);
}

/// Sim app plus the impact-marker system, with asset storage but no renderer.
fn create_marker_app() -> App {
    let mut app = create_sim_app(0.5, 0.0);
    app.add_plugins(AssetPlugin::default())
        .init_asset::<Mesh>()
        .init_asset::<StandardMaterial>()
        .add_message::<SurfaceFlightRequest>()
        .add_systems(Update, spawn_impact_markers.in_set(SimulationSet::Sync));
    app.update();
    app
}

fn request_flight(app: &mut App, body: &str, marker: bool) {
    app.world_mut().write_message(SurfaceFlightRequest {
        body: body.into(),
        latitude: 51.48,
        longitude: 0.0,
        marker,
    });
}

#[test]
fn test_surface_flight_spawns_marker_on_body() {
    let mut app = create_marker_app();
    let sphere = app.world_mut().spawn((Transform::default(), Visibility::default())).id();
    let handle = RenderHandle {
        root: sphere,
        body: sphere,
    };
    {
        let mut registry = app.world_mut().resource_mut::<BodyRegistry>();
        assert!(registry.attach_renderable("earth", handle));
    }

    request_flight(&mut app, "earth", false);
    app.update();
    let mut markers = app.world_mut().query::<&ImpactMarker>();
    assert_eq!(markers.iter(app.world()).count(), 0);

    request_flight(&mut app, "earth", true);
    app.update();

    let mut markers = app.world_mut().query::<(&ImpactMarker, &ChildOf)>();
    let spawned: Vec<_> = markers
        .iter(app.world())
        .map(|(marker, child_of)| (marker.body.to_string(), marker.ring, child_of.parent()))
        .collect();
    assert_eq!(spawned.len(), MARKER_RINGS.len());
    assert!(spawned.iter().all(|(body, _, parent)| body == "earth" && *parent == sphere));
}

#[test]
fn test_marker_skipped_for_unrendered_body() {
    let mut app = create_marker_app();
    request_flight(&mut app, "mars", true);
    request_flight(&mut app, "missing", true);
    app.update();

    let mut markers = app.world_mut().query::<&ImpactMarker>();
    assert_eq!(markers.iter(app.world()).count(), 0);
}

