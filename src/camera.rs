//! Camera anchoring, focus transitions and orbit-style controls.
//!
//! The camera always looks at an anchor body. Selecting a new anchor starts a
//! short eased transition to a fixed offset from it; afterwards the camera
//! keeps whatever framing the user gives it while following the anchor.
//!
//! Rendering uses a floating origin: every transform is written relative to
//! the camera target so f32 precision is spent near the viewer.

use bevy::{
    input::mouse::{AccumulatedMouseMotion, AccumulatedMouseScroll},
    math::{DQuat, DVec3},
    prelude::*,
};
use bevy_egui::EguiContexts;

use crate::registry::{BodyId, BodyRegistry, BodyState};
use crate::types::{CONTROL_MIN_DISTANCE, SimulationSet};

/// Focus transition duration in seconds.
pub const FOCUS_TRANSITION_SECS: f64 = 1.5;

/// Surface flight duration in seconds.
pub const SURFACE_FLIGHT_SECS: f64 = 2.2;

/// Height above the surface at the end of a surface flight.
pub const SURFACE_STANDOFF: f64 = 0.2;

/// Body the camera anchors to at startup.
pub const INITIAL_ANCHOR: &str = "earth";

/// Vertical field of view in degrees.
pub const FIELD_OF_VIEW_DEG: f32 = 40.0;

/// Zoom speed multiplier for scroll wheel.
pub const ZOOM_SPEED: f64 = 0.1;

/// Radians of rotation per pixel of mouse drag.
pub const ROTATE_SPEED: f64 = 0.005;

/// Furthest the camera may zoom out from its target.
pub const MAX_DISTANCE: f64 = 5.0e9;

/// Marker component for the main camera.
#[derive(Component)]
pub struct MainCamera;

/// Camera position and look-at target in scene coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: DVec3,
    pub target: DVec3,
}

impl CameraPose {
    /// Camera position relative to its target.
    pub fn offset(&self) -> DVec3 {
        self.position - self.target
    }
}

/// Double-precision pose of the main camera.
#[derive(Component, Clone, Copy, Debug)]
pub struct CameraRig {
    pub pose: CameraPose,
}

/// Scene point subtracted from every rendered translation.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct RenderOrigin(pub DVec3);

/// Tunables for the camera controller.
#[derive(Resource, Clone, Debug)]
pub struct CameraSettings {
    pub transition_secs: f64,
    pub surface_flight_secs: f64,
    pub surface_standoff: f64,
    pub zoom_speed: f64,
    pub rotate_speed: f64,
    pub max_distance: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            transition_secs: FOCUS_TRANSITION_SECS,
            surface_flight_secs: SURFACE_FLIGHT_SECS,
            surface_standoff: SURFACE_STANDOFF,
            zoom_speed: ZOOM_SPEED,
            rotate_speed: ROTATE_SPEED,
            max_distance: MAX_DISTANCE,
        }
    }
}

/// Where a transition ends relative to its anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionGoal {
    /// The anchor's nominal offset `(0, d/4, d)`.
    Focus,
    /// Just above the surface at the given latitude/longitude (degrees).
    Surface { latitude: f64, longitude: f64 },
}

/// Anchor state machine.
#[derive(Clone, Debug, PartialEq)]
pub enum AnchorState {
    /// Tracking `anchor`, preserving the user's framing.
    Idle { anchor: BodyId },
    /// Animating from `from` to the goal around `anchor`.
    Transitioning {
        anchor: BodyId,
        from: DVec3,
        goal: TransitionGoal,
        elapsed: f64,
        duration: f64,
    },
}

impl AnchorState {
    pub fn anchor(&self) -> &BodyId {
        match self {
            AnchorState::Idle { anchor } | AnchorState::Transitioning { anchor, .. } => anchor,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, AnchorState::Idle { .. })
    }
}

/// Result of a focus request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusOutcome {
    Started,
    /// Already anchored to (or heading for) that body.
    Unchanged,
    /// The body is registered but not focusable.
    Rejected,
}

/// Ease-out quadratic: `1 − (1 − t)²`.
pub fn ease_out(t: f64) -> f64 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv
}

/// Point at `distance` from a body centre above latitude/longitude (degrees).
pub fn surface_offset(distance: f64, latitude: f64, longitude: f64) -> DVec3 {
    let phi = (90.0 - latitude).to_radians();
    let theta = (longitude + 180.0).to_radians();
    DVec3::new(
        -distance * phi.sin() * theta.cos(),
        distance * phi.cos(),
        distance * phi.sin() * theta.sin(),
    )
}

/// [`surface_offset`] carried into the scene by a body's current
/// orientation, so latitude/longitude stay fixed to the spinning surface.
pub fn surface_point(orientation: DQuat, distance: f64, latitude: f64, longitude: f64) -> DVec3 {
    orientation * surface_offset(distance, latitude, longitude)
}

/// Decides which body the camera tracks and animates changes of anchor.
#[derive(Resource, Clone, Debug)]
pub struct CameraAnchorController {
    state: AnchorState,
    settings: CameraSettings,
}

impl Default for CameraAnchorController {
    fn default() -> Self {
        Self::new(INITIAL_ANCHOR, CameraSettings::default())
    }
}

impl CameraAnchorController {
    pub fn new(anchor: impl Into<BodyId>, settings: CameraSettings) -> Self {
        Self {
            state: AnchorState::Idle {
                anchor: anchor.into(),
            },
            settings,
        }
    }

    pub fn state(&self) -> &AnchorState {
        &self.state
    }

    pub fn anchor(&self) -> &BodyId {
        self.state.anchor()
    }

    /// Anchor to `anchor` and animate to its nominal offset.
    ///
    /// Bodies not yet registered are accepted; the transition waits until
    /// they appear.
    pub fn focus(
        &mut self,
        anchor: &str,
        registry: &BodyRegistry,
        pose: &CameraPose,
    ) -> FocusOutcome {
        if registry.get(anchor).is_some_and(|s| !s.focus.focusable) {
            return FocusOutcome::Rejected;
        }
        let heading_to_focus = match &self.state {
            AnchorState::Idle { .. } => true,
            AnchorState::Transitioning { goal, .. } => *goal == TransitionGoal::Focus,
        };
        if self.anchor().as_str() == anchor && heading_to_focus {
            return FocusOutcome::Unchanged;
        }

        self.start(anchor, pose, TransitionGoal::Focus, self.settings.transition_secs);
        FocusOutcome::Started
    }

    /// Anchor to `body` and fly to just above its surface at the given
    /// latitude/longitude (degrees).
    pub fn fly_to_surface(
        &mut self,
        body: &str,
        latitude: f64,
        longitude: f64,
        registry: &BodyRegistry,
        pose: &CameraPose,
    ) -> FocusOutcome {
        if registry.get(body).is_some_and(|s| !s.focus.focusable) {
            return FocusOutcome::Rejected;
        }
        self.start(
            body,
            pose,
            TransitionGoal::Surface {
                latitude: latitude.clamp(-90.0, 90.0),
                longitude,
            },
            self.settings.surface_flight_secs,
        );
        FocusOutcome::Started
    }

    fn start(&mut self, anchor: &str, pose: &CameraPose, goal: TransitionGoal, duration: f64) {
        self.state = AnchorState::Transitioning {
            anchor: BodyId::from(anchor),
            from: pose.position,
            goal,
            elapsed: 0.0,
            duration,
        };
    }

    /// Advance by `real_delta_secs` and move `pose` with the anchor.
    ///
    /// A tick where the anchor has no world position is skipped entirely.
    pub fn update(&mut self, real_delta_secs: f64, registry: &BodyRegistry, pose: &mut CameraPose) {
        let Some(anchor_position) = registry.world_position(self.anchor().as_str()) else {
            return;
        };

        match &mut self.state {
            AnchorState::Idle { .. } => {
                let offset = pose.offset();
                pose.target = anchor_position;
                pose.position = anchor_position + offset;
            }
            AnchorState::Transitioning {
                anchor,
                from,
                goal,
                elapsed,
                duration,
            } => {
                let state = registry.get(anchor.as_str());
                let focus = state.map(|s| s.focus).unwrap_or_default();
                let orientation = state.map_or(DQuat::IDENTITY, BodyState::orientation);
                let goal_offset = match *goal {
                    TransitionGoal::Focus => focus.anchor_offset(),
                    TransitionGoal::Surface {
                        latitude,
                        longitude,
                    } => surface_point(
                        orientation,
                        focus.radius + self.settings.surface_standoff,
                        latitude,
                        longitude,
                    ),
                };

                *elapsed += real_delta_secs;
                let t = if *duration > 0.0 {
                    (*elapsed / *duration).min(1.0)
                } else {
                    1.0
                };

                pose.target = anchor_position;
                pose.position = from.lerp(anchor_position + goal_offset, ease_out(t));

                if t >= 1.0 {
                    let anchor = anchor.clone();
                    self.state = AnchorState::Idle { anchor };
                }
            }
        }
    }

    /// Closest the camera may come to the anchor centre.
    pub fn min_distance(&self, registry: &BodyRegistry) -> f64 {
        registry
            .get(self.anchor().as_str())
            .map_or(CONTROL_MIN_DISTANCE, |s| s.focus.radius * CONTROL_MIN_DISTANCE)
    }
}

/// Request to focus the camera on a body.
#[derive(Message, Clone, Debug)]
pub struct FocusRequest(pub BodyId);

/// Request to fly the camera to a surface point.
#[derive(Message, Clone, Debug)]
pub struct SurfaceFlightRequest {
    pub body: BodyId,
    pub latitude: f64,
    pub longitude: f64,
    /// Also leave an impact marker at the point.
    pub marker: bool,
}

/// Plugin providing camera functionality.
pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraSettings>()
            .init_resource::<RenderOrigin>()
            .add_message::<FocusRequest>()
            .add_message::<SurfaceFlightRequest>()
            .add_systems(Startup, setup_camera)
            .add_systems(
                Update,
                (
                    (camera_orbit, camera_zoom).before(SimulationSet::Camera),
                    follow_anchor.in_set(SimulationSet::Camera),
                ),
            );
    }
}

/// Spawn the main camera with a perspective projection.
fn setup_camera(mut commands: Commands, settings: Res<CameraSettings>) {
    commands.insert_resource(CameraAnchorController::new(INITIAL_ANCHOR, settings.clone()));

    let pose = CameraPose {
        position: DVec3::new(0.0, 1.0, 4.0),
        target: DVec3::ZERO,
    };
    commands.spawn((
        Camera3d::default(),
        Projection::from(PerspectiveProjection {
            fov: FIELD_OF_VIEW_DEG.to_radians(),
            near: 0.01,
            far: 1.0e10,
            ..default()
        }),
        Transform::from_translation(pose.offset().as_vec3()).looking_at(Vec3::ZERO, Vec3::Y),
        MainCamera,
        CameraRig { pose },
    ));
}

/// Handle focus requests, advance the anchor state machine and write the
/// camera transform.
pub fn follow_anchor(
    time: Res<Time>,
    registry: Res<BodyRegistry>,
    mut controller: ResMut<CameraAnchorController>,
    mut focus_requests: MessageReader<FocusRequest>,
    mut surface_requests: MessageReader<SurfaceFlightRequest>,
    mut origin: ResMut<RenderOrigin>,
    mut camera_query: Query<(&mut CameraRig, &mut Transform), With<MainCamera>>,
) {
    let Ok((mut rig, mut transform)) = camera_query.single_mut() else {
        return;
    };

    for FocusRequest(id) in focus_requests.read() {
        match controller.focus(id.as_str(), &registry, &rig.pose) {
            FocusOutcome::Started => info!("Camera focusing on {}", id),
            FocusOutcome::Rejected => warn!("Body {} cannot be focused", id),
            FocusOutcome::Unchanged => {}
        }
    }
    for request in surface_requests.read() {
        if controller.fly_to_surface(
            request.body.as_str(),
            request.latitude,
            request.longitude,
            &registry,
            &rig.pose,
        ) == FocusOutcome::Started
        {
            info!(
                "Camera flying to {:.2}, {:.2} on {}",
                request.latitude, request.longitude, request.body
            );
        }
    }

    controller.update(time.delta_secs_f64(), &registry, &mut rig.pose);

    origin.0 = rig.pose.target;
    *transform =
        Transform::from_translation(rig.pose.offset().as_vec3()).looking_at(Vec3::ZERO, Vec3::Y);
}

/// Whether egui is using the pointer this frame.
fn egui_wants_pointer(contexts: &mut EguiContexts) -> bool {
    contexts
        .ctx_mut()
        .is_ok_and(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
}

/// Left-drag orbits the camera around its target.
fn camera_orbit(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    settings: Res<CameraSettings>,
    mut contexts: EguiContexts,
    mut camera_query: Query<&mut CameraRig, With<MainCamera>>,
) {
    if !mouse_buttons.pressed(MouseButton::Left) || mouse_motion.delta == Vec2::ZERO {
        return;
    }
    if egui_wants_pointer(&mut contexts) {
        return;
    }
    let Ok(mut rig) = camera_query.single_mut() else {
        return;
    };

    let offset = rig.pose.offset();
    let yaw = -(mouse_motion.delta.x as f64) * settings.rotate_speed;
    let pitch = -(mouse_motion.delta.y as f64) * settings.rotate_speed;
    rig.pose.position = rig.pose.target + orbit_offset(offset, yaw, pitch);
}

/// Rotate `offset` by `yaw` about +Y and `pitch` about the camera's right
/// axis, never passing over the poles.
pub fn orbit_offset(offset: DVec3, yaw: f64, pitch: f64) -> DVec3 {
    let radius = offset.length();
    if radius == 0.0 {
        return offset;
    }
    let polar = (offset.y / radius).clamp(-1.0, 1.0).acos();
    let azimuth = offset.z.atan2(offset.x);

    let polar = (polar + pitch).clamp(1e-3, std::f64::consts::PI - 1e-3);
    let azimuth = azimuth + yaw;
    DVec3::new(
        radius * polar.sin() * azimuth.cos(),
        radius * polar.cos(),
        radius * polar.sin() * azimuth.sin(),
    )
}

/// Scroll wheel zooms towards the target, never inside the anchor body.
fn camera_zoom(
    mouse_scroll: Res<AccumulatedMouseScroll>,
    settings: Res<CameraSettings>,
    registry: Res<BodyRegistry>,
    controller: Option<Res<CameraAnchorController>>,
    mut contexts: EguiContexts,
    mut camera_query: Query<&mut CameraRig, With<MainCamera>>,
) {
    // Skip if no scroll input
    if mouse_scroll.delta.y == 0.0 {
        return;
    }
    if egui_wants_pointer(&mut contexts) {
        return;
    }
    let Some(controller) = controller else {
        return;
    };
    let Ok(mut rig) = camera_query.single_mut() else {
        return;
    };

    let min_distance = controller.min_distance(&registry);
    rig.pose.position = rig.pose.target
        + zoom_offset(
            rig.pose.offset(),
            mouse_scroll.delta.y as f64 * settings.zoom_speed,
            min_distance,
            settings.max_distance,
        );
}

/// Logarithmic zoom: scale the offset length by `1 − amount`, clamped.
pub fn zoom_offset(offset: DVec3, amount: f64, min_distance: f64, max_distance: f64) -> DVec3 {
    let distance = offset.length();
    if distance == 0.0 {
        return offset;
    }
    let new_distance = (distance * (1.0 - amount)).clamp(min_distance, max_distance);
    offset * (new_distance / distance)
}
