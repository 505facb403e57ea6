//! Side panel: focus targets, visibility toggles, NEO pickers and surface
//! flight.
//!
//! The panel only emits messages or edits view settings; it owns no
//! simulation state.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::camera::{CameraAnchorController, FocusRequest, SurfaceFlightRequest};
use crate::registry::{BodyOrigin, BodyRegistry};
use crate::render::{BeltSettings, HiddenBodies, LabelSettings, OrbitPathSettings};
use crate::selection::{
    NeoCatalog, NeoSelection, SelectionChanged, SelectionSlot, SelectionTracker,
};
use crate::ui::icons;

/// Coordinates typed into the surface-flight form, degrees.
#[derive(Resource, Clone, Debug)]
pub struct SurfaceFlightForm {
    pub latitude: f64,
    pub longitude: f64,
    /// Leave an impact marker at the destination.
    pub mark_impact: bool,
}

impl Default for SurfaceFlightForm {
    fn default() -> Self {
        // Greenwich
        Self {
            latitude: 51.48,
            longitude: 0.0,
            mark_impact: false,
        }
    }
}

/// Picker heading for a slot.
fn slot_title(slot: SelectionSlot) -> &'static str {
    match slot {
        SelectionSlot::Selected => "Selected NEO",
        SelectionSlot::Approach => "Approach preview",
    }
}

/// The bodies side panel.
pub fn bodies_panel(
    mut contexts: EguiContexts,
    registry: Res<BodyRegistry>,
    controller: Res<CameraAnchorController>,
    tracker: Res<SelectionTracker>,
    catalog: Res<NeoCatalog>,
    mut hidden: ResMut<HiddenBodies>,
    mut orbit_settings: ResMut<OrbitPathSettings>,
    mut belt_settings: ResMut<BeltSettings>,
    mut label_settings: ResMut<LabelSettings>,
    mut form: ResMut<SurfaceFlightForm>,
    mut focus: MessageWriter<FocusRequest>,
    mut surface: MessageWriter<SurfaceFlightRequest>,
    mut selection: MessageWriter<SelectionChanged>,
) {
    let Ok(ctx) = contexts.ctx_mut() else {
        return;
    };

    egui::SidePanel::left("bodies_panel")
        .resizable(false)
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading(format!("{} Bodies", icons::SUN));
            ui.separator();

            let anchor = controller.anchor().clone();
            for id in registry.focusable_ids() {
                let Some(state) = registry.get(id.as_str()) else {
                    continue;
                };
                let icon = match (state.origin, state.parent.is_some()) {
                    (BodyOrigin::Dynamic, _) => icons::ASTEROID,
                    (BodyOrigin::Fixed, true) => icons::MOON,
                    (BodyOrigin::Fixed, false) => icons::PLANET,
                };
                let name = if state.label.is_empty() {
                    id.as_str()
                } else {
                    state.label.as_str()
                };

                ui.horizontal(|ui| {
                    let is_hidden = hidden.is_hidden(id.as_str());
                    let eye = if is_hidden {
                        icons::EYE_CLOSED
                    } else {
                        icons::EYE
                    };
                    if ui.small_button(eye).on_hover_text("Show / hide").clicked() {
                        hidden.toggle(id.as_str());
                    }
                    if ui
                        .selectable_label(anchor == id, format!("{icon} {name}"))
                        .on_hover_text("Focus camera")
                        .clicked()
                    {
                        focus.write(FocusRequest(id.clone()));
                    }
                });
            }

            ui.separator();
            ui.checkbox(&mut orbit_settings.visible, format!("{} Orbits (O)", icons::ORBIT));
            ui.checkbox(&mut belt_settings.visible, "Belts (B)");
            ui.checkbox(&mut label_settings.visible, "Labels");

            for slot in SelectionSlot::ALL {
                ui.separator();
                ui.label(slot_title(slot));

                let current = tracker.identifier(slot);
                let current_text = current
                    .and_then(|d| catalog.find(d))
                    .map_or_else(|| current.unwrap_or("None").to_string(), |e| e.name.clone());

                egui::ComboBox::from_id_salt(("neo_picker", slot.key()))
                    .selected_text(current_text)
                    .show_ui(ui, |ui| {
                        if ui.selectable_label(current.is_none(), "None").clicked() {
                            selection.write(SelectionChanged {
                                slot,
                                selection: None,
                            });
                        }
                        for entry in &catalog.entries {
                            let chosen = current == Some(entry.designation.as_str());
                            let label = ui.selectable_label(chosen, entry.name.as_str());
                            if label.clicked() && !chosen {
                                selection.write(SelectionChanged {
                                    slot,
                                    selection: Some(NeoSelection::designation(
                                        entry.designation.clone(),
                                        entry.name.clone(),
                                    )),
                                });
                            }
                        }
                    });
            }

            ui.separator();
            ui.label(format!("{} Surface flight ({})", icons::LANDING, anchor));
            ui.horizontal(|ui| {
                ui.label("Lat");
                ui.add(
                    egui::DragValue::new(&mut form.latitude)
                        .range(-90.0..=90.0)
                        .speed(0.1)
                        .suffix("°"),
                );
                ui.label("Lon");
                ui.add(
                    egui::DragValue::new(&mut form.longitude)
                        .range(-180.0..=180.0)
                        .speed(0.1)
                        .suffix("°"),
                );
            });
            ui.checkbox(&mut form.mark_impact, "Mark impact");
            if ui
                .button(format!("{} Fly", icons::TARGET))
                .on_hover_text("Fly to this point above the focused body")
                .clicked()
            {
                surface.write(SurfaceFlightRequest {
                    body: anchor.clone(),
                    latitude: form.latitude,
                    longitude: form.longitude,
                    marker: form.mark_impact,
                });
            }
        });
}
