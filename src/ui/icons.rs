//! Phosphor icon definitions for the UI.
//!
//! Icons are initialized via `setup_fonts` when the app starts.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

/// Resource to track if fonts have been initialized.
#[derive(Resource, Default)]
pub struct FontsInitialized(pub bool);

/// System to initialize Phosphor icon fonts.
/// Runs in EguiPrimaryContextPass where the egui context is guaranteed to be ready.
pub fn setup_fonts(mut contexts: EguiContexts, mut initialized: ResMut<FontsInitialized>) {
    if initialized.0 {
        return;
    }

    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    let mut fonts = egui::FontDefinitions::default();
    egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);

    ctx.set_fonts(fonts);
    initialized.0 = true;

    info!("Phosphor icon fonts initialized");
}

// Browse all icons at https://phosphoricons.com/

pub const PLAY: &str = egui_phosphor::regular::PLAY;
pub const PAUSE: &str = egui_phosphor::regular::PAUSE;
/// Jump to the close-approach date.
pub const TRAVEL: &str = egui_phosphor::regular::CALENDAR_CHECK;
/// Return to the present.
pub const PRESENT: &str = egui_phosphor::regular::CLOCK_COUNTER_CLOCKWISE;
pub const CLOCK: &str = egui_phosphor::regular::CLOCK;

pub const SUN: &str = egui_phosphor::regular::SUN;
pub const PLANET: &str = egui_phosphor::regular::GLOBE;
pub const MOON: &str = egui_phosphor::regular::MOON;
pub const ASTEROID: &str = egui_phosphor::regular::ASTERISK;

/// Visible toggle.
pub const EYE: &str = egui_phosphor::regular::EYE;
/// Hidden toggle.
pub const EYE_CLOSED: &str = egui_phosphor::regular::EYE_SLASH;
pub const TARGET: &str = egui_phosphor::regular::CROSSHAIR;
/// Surface flight.
pub const LANDING: &str = egui_phosphor::regular::MAP_PIN;
pub const ORBIT: &str = egui_phosphor::regular::PATH;
