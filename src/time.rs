//! Animation clock and the per-frame propagation driver.
//!
//! Converts wall-clock frame time into simulated time using a multiplier and
//! pause flag, then propagates every registered body.

use bevy::prelude::*;

use crate::ephemeris::{FixedBodyId, OrbitDirection, anomaly_at_time, get_body_data};
use crate::registry::{BodyRegistry, BodyState, FocusCapability, OrbitStyle};
use crate::types::{SimulationSet, current_unix_ms, unix_ms_to_date_string};

/// Simulated seconds per real second for the speed presets.
pub const SPEED_PRESETS: [(f64, &str); 5] = [
    (1.0, "Real"),
    (86_400.0, "1 day/s"),
    (604_800.0, "1 week/s"),
    (2_592_000.0, "1 month/s"),
    (15_552_000.0, "6 months/s"),
];

/// Upper end of the speed slider: one year per second.
pub const MAX_MULTIPLIER: f64 = 31_536_000.0;

/// Tunables for the animation clock.
#[derive(Resource, Clone, Debug)]
pub struct ClockSettings {
    /// Preset multipliers offered by the HUD.
    pub presets: Vec<(f64, &'static str)>,
    /// Slider maximum.
    pub max_multiplier: f64,
    /// Multiplier at startup.
    pub initial_multiplier: f64,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            presets: SPEED_PRESETS.to_vec(),
            max_multiplier: MAX_MULTIPLIER,
            initial_multiplier: 1.0,
        }
    }
}

/// Per-frame simulation driver state.
#[derive(Resource, Clone, Debug)]
pub struct AnimationClock {
    /// Simulated seconds per real second.
    pub multiplier: f64,
    pub paused: bool,
    /// Simulated calendar date, Unix milliseconds.
    date_ms: f64,
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::starting_at(current_unix_ms())
    }
}

impl AnimationClock {
    /// Running clock at real-time speed starting from `date_ms`.
    pub fn starting_at(date_ms: f64) -> Self {
        Self {
            multiplier: 1.0,
            paused: false,
            date_ms,
        }
    }

    /// Simulated seconds elapsed for a real frame of `real_delta_secs`.
    ///
    /// Zero while paused.
    pub fn simulated_delta(&self, real_delta_secs: f64) -> f64 {
        if self.paused {
            0.0
        } else {
            real_delta_secs * self.multiplier
        }
    }

    /// Advance the simulated date, returning the simulated delta in seconds.
    pub fn tick(&mut self, real_delta_secs: f64) -> f64 {
        let simulated = self.simulated_delta(real_delta_secs);
        self.date_ms += simulated * 1000.0;
        simulated
    }

    /// Set the simulated date without propagating.
    pub fn jump_to(&mut self, date_ms: f64) {
        self.date_ms = date_ms;
    }

    pub fn date_ms(&self) -> f64 {
        self.date_ms
    }

    pub fn date_string(&self) -> String {
        unix_ms_to_date_string(self.date_ms)
    }

    /// Clamp and apply a new multiplier.
    pub fn set_multiplier(&mut self, multiplier: f64, settings: &ClockSettings) {
        self.multiplier = multiplier.clamp(0.0, settings.max_multiplier);
    }
}

/// Target of a time-travel request.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TravelTarget {
    /// Absolute date, Unix milliseconds.
    Date(f64),
    /// Wall-clock now.
    Present,
}

/// Request to jump every body to an absolute date.
#[derive(Message, Clone, Copy, Debug)]
pub struct TravelRequest(pub TravelTarget);

/// Simulated seconds elapsed in the current frame.
#[derive(Resource, Default, Clone, Copy, Debug)]
pub struct FrameSimDelta(pub f64);

/// Plugin providing the animation clock and orbit propagation.
pub struct TimePlugin;

impl Plugin for TimePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ClockSettings>()
            .init_resource::<BodyRegistry>()
            .init_resource::<FrameSimDelta>()
            .add_message::<TravelRequest>()
            .add_systems(Startup, (init_clock, register_fixed_bodies).chain())
            .configure_sets(
                Update,
                (
                    SimulationSet::Propagate,
                    SimulationSet::Camera,
                    SimulationSet::Sync,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (advance_clock, handle_travel, propagate_bodies)
                    .chain()
                    .in_set(SimulationSet::Propagate),
            );
    }
}

/// Create the clock unless one was inserted up front.
fn init_clock(
    mut commands: Commands,
    clock: Option<Res<AnimationClock>>,
    settings: Res<ClockSettings>,
) {
    if clock.is_some() {
        return;
    }
    let mut clock = AnimationClock::default();
    clock.set_multiplier(settings.initial_multiplier, &settings);
    info!("Simulation clock started at {}", clock.date_string());
    commands.insert_resource(clock);
}

/// Register the fixed solar-system bodies at the clock's date.
///
/// A body whose baked elements fail validation is skipped.
pub fn register_fixed_bodies(
    clock: Option<Res<AnimationClock>>,
    mut registry: ResMut<BodyRegistry>,
) {
    let date_ms = clock.map_or_else(current_unix_ms, |c| c.date_ms());
    let direction = OrbitDirection::default();

    for &id in FixedBodyId::ALL {
        let data = match get_body_data(id) {
            Ok(data) => data,
            Err(err) => {
                warn!("Skipping {}: {err}", id.name());
                continue;
            }
        };

        let anomaly = anomaly_at_time(date_ms, &data.elements, direction);
        let mut state = BodyState::new(data.elements, anomaly, direction)
            .with_spin(data.spin, data.spin.angle_at(date_ms))
            .with_focus(FocusCapability::focusable(data.initial_distance, data.radius))
            .with_label(id.name())
            .with_style(OrbitStyle {
                color: data.color,
                segments: data.segments,
            });
        if let Some(parent) = id.parent() {
            state = state.with_parent(parent.key());
        }
        registry.register(id.key(), state);
    }

    info!("Registered {} fixed bodies", registry.len());
}

/// Advance simulated time for this frame.
fn advance_clock(
    time: Res<Time>,
    clock: Option<ResMut<AnimationClock>>,
    mut frame_delta: ResMut<FrameSimDelta>,
) {
    let Some(mut clock) = clock else {
        frame_delta.0 = 0.0;
        return;
    };
    frame_delta.0 = clock.tick(time.delta_secs_f64());
}

/// Apply time-travel requests with absolute propagation.
///
/// A travel suppresses this frame's incremental step so the body lands
/// exactly on the requested date.
fn handle_travel(
    mut requests: MessageReader<TravelRequest>,
    clock: Option<ResMut<AnimationClock>>,
    mut registry: ResMut<BodyRegistry>,
    mut frame_delta: ResMut<FrameSimDelta>,
) {
    let Some(mut clock) = clock else {
        requests.clear();
        return;
    };
    let Some(TravelRequest(target)) = requests.read().last().copied() else {
        return;
    };

    let target_ms = match target {
        TravelTarget::Date(ms) => ms,
        TravelTarget::Present => current_unix_ms(),
    };

    registry.set_absolute_time(target_ms);
    clock.jump_to(target_ms);
    frame_delta.0 = 0.0;

    info!("Time travel to {}", clock.date_string());
}

/// Incremental propagation of every registered body.
pub fn propagate_bodies(frame_delta: Res<FrameSimDelta>, mut registry: ResMut<BodyRegistry>) {
    if frame_delta.0 == 0.0 {
        return;
    }
    registry.tick(frame_delta.0);
}
