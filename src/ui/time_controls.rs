//! Time controls panel at the bottom of the screen.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::selection::{NeoCatalog, SelectionSlot, SelectionTracker};
use crate::time::{AnimationClock, ClockSettings, TravelRequest, TravelTarget};
use crate::types::jd_to_unix_ms;
use crate::ui::icons;

/// Colors for the time panel.
mod colors {
    use bevy_egui::egui::Color32;

    pub const PANEL_BG: Color32 = Color32::from_rgba_premultiplied(20, 20, 30, 220);
    pub const PLAY_ICON: Color32 = Color32::from_rgb(85, 221, 136);
    pub const PAUSE_ICON: Color32 = Color32::from_rgb(221, 170, 85);
}

/// Close-approach date of the current selection, Unix milliseconds.
///
/// The approach slot wins over the main selection.
pub fn approach_date_ms(tracker: &SelectionTracker, catalog: &NeoCatalog) -> Option<f64> {
    [SelectionSlot::Approach, SelectionSlot::Selected]
        .into_iter()
        .filter_map(|slot| tracker.identifier(slot))
        .find_map(|designation| catalog.find(designation)?.approach_jd)
        .map(jd_to_unix_ms)
}

/// Human-readable multiplier, e.g. `86400×`.
fn multiplier_text(multiplier: f64) -> String {
    if multiplier >= 1000.0 {
        format!("{:.0}×", multiplier)
    } else {
        format!("{:.1}×", multiplier)
    }
}

/// System that renders the time controls panel.
pub fn time_controls_panel(
    mut contexts: EguiContexts,
    mut clock: ResMut<AnimationClock>,
    settings: Res<ClockSettings>,
    tracker: Res<SelectionTracker>,
    catalog: Res<NeoCatalog>,
    mut travel: MessageWriter<TravelRequest>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::TopBottomPanel::bottom("time_controls")
        .frame(
            egui::Frame::NONE
                .fill(colors::PANEL_BG)
                .inner_margin(egui::Margin::symmetric(16, 8)),
        )
        .show(ctx, |ui| {
            ui.horizontal_centered(|ui| {
                ui.spacing_mut().item_spacing.x = 12.0;

                let (icon, color, tooltip) = if clock.paused {
                    (icons::PLAY, colors::PLAY_ICON, "Play (Space)")
                } else {
                    (icons::PAUSE, colors::PAUSE_ICON, "Pause (Space)")
                };
                if ui
                    .button(egui::RichText::new(icon).size(20.0).color(color))
                    .on_hover_text(tooltip)
                    .clicked()
                {
                    clock.paused = !clock.paused;
                }

                ui.separator();

                ui.label(egui::RichText::new(icons::CLOCK).size(16.0));
                ui.label(egui::RichText::new(clock.date_string()).monospace());

                ui.separator();

                for (i, &(multiplier, label)) in settings.presets.iter().enumerate() {
                    let is_selected = (clock.multiplier - multiplier).abs() < 0.5;
                    if ui
                        .selectable_label(is_selected, label)
                        .on_hover_text(format!("Set speed ({})", i + 1))
                        .clicked()
                    {
                        clock.set_multiplier(multiplier, &settings);
                    }
                }

                let mut multiplier = clock.multiplier.max(1.0);
                if ui
                    .add(
                        egui::Slider::new(&mut multiplier, 1.0..=settings.max_multiplier)
                            .logarithmic(true)
                            .show_value(false),
                    )
                    .changed()
                {
                    clock.set_multiplier(multiplier, &settings);
                }
                ui.label(egui::RichText::new(multiplier_text(clock.multiplier)).monospace());

                ui.separator();

                let approach = approach_date_ms(&tracker, &catalog);
                if ui
                    .add_enabled(
                        approach.is_some(),
                        egui::Button::new(format!("{} Approach", icons::TRAVEL)),
                    )
                    .on_hover_text("Travel to the selected object's close approach")
                    .clicked()
                    && let Some(date_ms) = approach
                {
                    travel.write(TravelRequest(TravelTarget::Date(date_ms)));
                }
                if ui
                    .button(format!("{} Now", icons::PRESENT))
                    .on_hover_text("Return to the present")
                    .clicked()
                {
                    travel.write(TravelRequest(TravelTarget::Present));
                }
            });
        });
}
