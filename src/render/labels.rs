//! Body labels using egui for text rendering.
//!
//! Renders each registered body's label next to its sphere.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};

use crate::camera::MainCamera;
use crate::registry::BodyRegistry;
use crate::render::bodies::RenderedBody;

/// Plugin providing body label rendering.
pub struct LabelPlugin;

impl Plugin for LabelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<LabelSettings>()
            .add_systems(EguiPrimaryContextPass, draw_body_labels);
    }
}

/// Settings for label rendering.
#[derive(Resource)]
pub struct LabelSettings {
    /// Whether labels are visible.
    pub visible: bool,
    /// Offset from body center in screen pixels.
    pub offset: f32,
    /// Labels further than this from the camera are hidden, scene units.
    pub max_distance: f32,
}

impl Default for LabelSettings {
    fn default() -> Self {
        Self {
            visible: true,
            offset: 12.0,
            max_distance: 2.0e6,
        }
    }
}

/// Draw labels for all visible registered bodies.
fn draw_body_labels(
    mut egui_ctx: EguiContexts,
    registry: Res<BodyRegistry>,
    bodies: Query<(&RenderedBody, &Transform, &Visibility)>,
    camera: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    settings: Res<LabelSettings>,
) {
    if !settings.visible {
        return;
    }
    let Ok((camera, camera_transform)) = camera.single() else {
        return;
    };
    let Ok(ctx) = egui_ctx.ctx_mut() else {
        return;
    };

    egui::Area::new(egui::Id::new("body_labels"))
        .fixed_pos(egui::pos2(0.0, 0.0))
        .order(egui::Order::Background)
        .interactable(false)
        .show(ctx, |ui| {
            let painter = ui.painter();

            for (RenderedBody(id), transform, visibility) in &bodies {
                if *visibility == Visibility::Hidden {
                    continue;
                }
                let Some(text) = registry
                    .get(id.as_str())
                    .map(|state| state.label.as_str())
                    .filter(|label| !label.is_empty())
                else {
                    continue;
                };

                let world_pos = transform.translation;
                if world_pos.distance(camera_transform.translation()) > settings.max_distance {
                    continue;
                }
                let Ok(screen_pos) = camera.world_to_viewport(camera_transform, world_pos) else {
                    continue;
                };

                let label_pos = egui::pos2(
                    screen_pos.x + settings.offset,
                    screen_pos.y - settings.offset,
                );
                let font = egui::FontId::proportional(13.0);

                // Shadow
                painter.text(
                    label_pos + egui::vec2(1.0, 1.0),
                    egui::Align2::LEFT_BOTTOM,
                    text,
                    font.clone(),
                    egui::Color32::from_rgba_unmultiplied(0, 0, 0, 180),
                );
                painter.text(
                    label_pos,
                    egui::Align2::LEFT_BOTTOM,
                    text,
                    font,
                    egui::Color32::from_rgba_unmultiplied(220, 220, 220, 230),
                );
            }
        });
}
