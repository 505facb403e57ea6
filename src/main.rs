//! Pleiades - NEO Solar System Visualizer
//!
//! Desktop application showing the planets, the asteroid and Kuiper belts,
//! the Oort cloud and selected near-Earth objects on their orbits.

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use pleiades::camera::CameraPlugin;
use pleiades::input::InputPlugin;
use pleiades::render::RenderPlugin;
use pleiades::selection::SelectionPlugin;
use pleiades::time::TimePlugin;
use pleiades::ui::UiPlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Pleiades".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin::default())
        .insert_resource(ClearColor(Color::BLACK))
        // Simulation first, then everything that reads it
        .add_plugins((TimePlugin, SelectionPlugin, CameraPlugin))
        .add_plugins((RenderPlugin, InputPlugin, UiPlugin))
        .run();
}
