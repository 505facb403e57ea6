//! UI module providing the egui HUD.
//!
//! The HUD reads core state and writes requests; nothing in here is needed
//! for the simulation to run headless.

mod bodies_panel;
pub mod icons;
mod time_controls;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

pub use bodies_panel::SurfaceFlightForm;
pub use time_controls::approach_date_ms;

/// Plugin that adds all UI systems.
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<icons::FontsInitialized>()
            .init_resource::<SurfaceFlightForm>()
            // Font initialization MUST run before any UI systems that use icons
            .add_systems(EguiPrimaryContextPass, icons::setup_fonts)
            .add_systems(
                EguiPrimaryContextPass,
                (time_controls::time_controls_panel, bodies_panel::bodies_panel)
                    .after(icons::setup_fonts)
                    .run_if(|init: Res<icons::FontsInitialized>| init.0),
            );
    }
}
