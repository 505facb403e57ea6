//! Keyboard shortcuts for the clock and scene toggles.

use bevy::prelude::*;

use crate::render::belts::BeltSettings;
use crate::render::orbits::OrbitPathSettings;
use crate::time::{AnimationClock, ClockSettings};

/// Plugin providing keyboard input handling.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (clock_shortcuts, scene_toggles));
    }
}

const PRESET_KEYS: [KeyCode; 5] = [
    KeyCode::Digit1,
    KeyCode::Digit2,
    KeyCode::Digit3,
    KeyCode::Digit4,
    KeyCode::Digit5,
];

/// Space toggles pause; 1-5 pick a speed preset.
pub fn clock_shortcuts(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<ClockSettings>,
    mut clock: ResMut<AnimationClock>,
) {
    if keys.just_pressed(KeyCode::Space) {
        clock.paused = !clock.paused;
        info!("Animation {}", if clock.paused { "paused" } else { "running" });
    }

    for (key, &(multiplier, label)) in PRESET_KEYS.iter().zip(settings.presets.iter()) {
        if keys.just_pressed(*key) {
            clock.set_multiplier(multiplier, &settings);
            info!("Time speed: {}", label);
        }
    }
}

/// O toggles orbit paths, B toggles belts.
fn scene_toggles(
    keys: Res<ButtonInput<KeyCode>>,
    mut orbit_settings: ResMut<OrbitPathSettings>,
    mut belt_settings: ResMut<BeltSettings>,
) {
    if keys.just_pressed(KeyCode::KeyO) {
        orbit_settings.visible = !orbit_settings.visible;
    }
    if keys.just_pressed(KeyCode::KeyB) {
        belt_settings.visible = !belt_settings.visible;
    }
}
