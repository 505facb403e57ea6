//! Rendering systems for the solar system scene.
//!
//! All translations are written relative to [`RenderOrigin`](crate::camera::RenderOrigin)
//! (the camera target), so `f32` transforms stay precise near the camera even
//! at Oort-cloud distances.

mod background;
pub mod belts;
pub mod bodies;
mod labels;
pub mod markers;
pub mod orbits;

use bevy::prelude::*;

use crate::types::SimulationSet;

use self::background::BackgroundPlugin;
use self::belts::{BeltPlugin, update_belts};
use self::bodies::{BodyRenderPlugin, spawn_body_renderables, sync_body_transforms};
use self::labels::LabelPlugin;
use self::markers::spawn_impact_markers;

pub use self::belts::{BeltConfig, BeltSettings};
pub use self::bodies::{HiddenBodies, RenderedBody};
pub use self::labels::LabelSettings;
pub use self::markers::ImpactMarker;
pub use self::orbits::OrbitPathSettings;

/// Plugin aggregating all rendering functionality.
pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitPathSettings>()
            .add_plugins((BodyRenderPlugin, BeltPlugin, BackgroundPlugin, LabelPlugin))
            // Spawning must see this frame's registrations; sync runs after the
            // camera has fixed the render origin.
            .add_systems(
                Update,
                (
                    (spawn_body_renderables, spawn_impact_markers, sync_body_transforms).chain(),
                    update_belts,
                )
                    .in_set(SimulationSet::Sync),
            );
    }
}
