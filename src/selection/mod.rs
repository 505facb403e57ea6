//! Dynamically selected bodies: the main NEO and the approach preview.
//!
//! Selection changes arrive as [`SelectionChanged`] messages. Each slot holds at
//! most one registered body; replacing it tears the old one down before a new
//! fetch starts. Every slot carries a generation counter so fetches that
//! resolve after the slot moved on, or after the tracker was disposed, are
//! dropped instead of applied.

pub mod source;

use bevy::app::AppExit;
use bevy::prelude::*;
use bevy::tasks::{IoTaskPool, Task, block_on, futures_lite::future};

use crate::ephemeris::{Epoch, OrbitDirection, OrbitRecord, initial_anomaly};
use crate::registry::{BodyOrigin, BodyRegistry, BodyState, FocusCapability, OrbitStyle};
use crate::time::AnimationClock;
use crate::types::{EARTH_A, SimulationSet, current_unix_ms};

pub use source::{
    CatalogEntry, CatalogError, CatalogSource, ElementsProvider, ElementsSource, FetchError,
    NeoCatalog, bundled_catalog, load_catalog, parse_catalog,
};

/// Render radius of a selected NEO.
pub const NEO_RADIUS: f64 = 0.02;

/// Camera distance when focusing a selected NEO.
pub const NEO_FOCUS_DISTANCE: f64 = 0.5;

/// Orbit path samples for selected NEOs.
pub const NEO_PATH_SEGMENTS: usize = 4096;

/// Named selection slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionSlot {
    /// The main selected NEO.
    Selected,
    /// The close-approach preview.
    Approach,
}

impl SelectionSlot {
    pub const ALL: [SelectionSlot; 2] = [SelectionSlot::Selected, SelectionSlot::Approach];

    /// Registry key of the body occupying this slot.
    pub fn key(self) -> &'static str {
        match self {
            SelectionSlot::Selected => "selected",
            SelectionSlot::Approach => "approach",
        }
    }

    fn index(self) -> usize {
        match self {
            SelectionSlot::Selected => 0,
            SelectionSlot::Approach => 1,
        }
    }
}

/// Externally supplied description of a selected object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeoSelection {
    pub reference_id: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
}

impl NeoSelection {
    /// Selection identified by a catalog designation.
    pub fn designation(designation: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            reference_id: Some(designation.into()),
            id: None,
            name: Some(name.into()),
        }
    }

    /// Stable identifier: reference id, then id, then name.
    pub fn identifier(&self) -> Option<&str> {
        [&self.reference_id, &self.id, &self.name]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|s| !s.trim().is_empty())
    }

    /// Name shown in labels.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.identifier())
    }
}

/// A selection slot changed.
#[derive(Message, Clone, Debug)]
pub struct SelectionChanged {
    pub slot: SelectionSlot,
    pub selection: Option<NeoSelection>,
}

/// Handle for an outstanding element fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub slot: SelectionSlot,
    pub generation: u64,
    pub designation: String,
    pub display_name: String,
}

/// Effect of a selection change on the registry.
#[derive(Debug, Default)]
pub struct SelectionChange {
    /// State of the body torn down from the slot.
    pub removed: Option<BodyState>,
    /// Fetch to start for the new selection.
    pub ticket: Option<FetchTicket>,
}

/// What happened to a completed fetch.
#[derive(Debug)]
pub enum FetchOutcome {
    Registered,
    /// The slot moved on before the fetch resolved.
    Stale,
    /// The tracker was disposed before the fetch resolved.
    Disposed,
    /// The slot stays empty.
    Failed(FetchError),
}

/// Per-slot presentation settings.
#[derive(Resource, Clone, Debug)]
pub struct SelectionSettings {
    pub selected_color: u32,
    pub approach_color: u32,
    pub selected_prefix: &'static str,
    pub approach_prefix: &'static str,
    pub segments: usize,
    pub radius: f64,
    pub focus_distance: f64,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            selected_color: 0xff0000,
            approach_color: 0xffff00,
            selected_prefix: "NEO",
            approach_prefix: "APP",
            segments: NEO_PATH_SEGMENTS,
            radius: NEO_RADIUS,
            focus_distance: NEO_FOCUS_DISTANCE,
        }
    }
}

impl SelectionSettings {
    pub fn color(&self, slot: SelectionSlot) -> u32 {
        match slot {
            SelectionSlot::Selected => self.selected_color,
            SelectionSlot::Approach => self.approach_color,
        }
    }

    pub fn label(&self, slot: SelectionSlot, name: &str) -> String {
        let prefix = match slot {
            SelectionSlot::Selected => self.selected_prefix,
            SelectionSlot::Approach => self.approach_prefix,
        };
        format!("{prefix}: {name}")
    }
}

#[derive(Clone, Debug, Default)]
struct SlotState {
    identifier: Option<String>,
    generation: u64,
}

/// Keeps the two selection slots in sync with the registry.
#[derive(Resource, Debug, Default)]
pub struct SelectionTracker {
    slots: [SlotState; 2],
    disposed: bool,
}

impl SelectionTracker {
    /// Identifier currently assigned to `slot`.
    pub fn identifier(&self, slot: SelectionSlot) -> Option<&str> {
        self.slots[slot.index()].identifier.as_deref()
    }

    pub fn generation(&self, slot: SelectionSlot) -> u64 {
        self.slots[slot.index()].generation
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Apply a new selection for `slot`.
    ///
    /// No-op when the identifier is unchanged. Otherwise the slot's body is
    /// deregistered before any fetch for the new selection is issued.
    pub fn on_selection_changed(
        &mut self,
        slot: SelectionSlot,
        selection: Option<&NeoSelection>,
        registry: &mut BodyRegistry,
    ) -> SelectionChange {
        if self.disposed {
            return SelectionChange::default();
        }

        let identifier = selection.and_then(NeoSelection::identifier);
        let state = &mut self.slots[slot.index()];
        if state.identifier.as_deref() == identifier {
            return SelectionChange::default();
        }

        state.generation += 1;
        state.identifier = identifier.map(str::to_owned);
        let removed = registry.deregister(slot.key());

        let ticket = identifier.map(|designation| FetchTicket {
            slot,
            generation: state.generation,
            designation: designation.to_owned(),
            display_name: selection
                .and_then(NeoSelection::display_name)
                .unwrap_or(designation)
                .to_owned(),
        });

        SelectionChange { removed, ticket }
    }

    /// Apply the result of a fetch.
    ///
    /// The elements are moved to `now` so the body starts where the rest of
    /// the scene is, with initial anomaly `wrap2π(−M0)` at that epoch.
    pub fn complete(
        &mut self,
        ticket: &FetchTicket,
        result: Result<OrbitRecord, FetchError>,
        now: Epoch,
        settings: &SelectionSettings,
        registry: &mut BodyRegistry,
    ) -> FetchOutcome {
        if self.disposed {
            return FetchOutcome::Disposed;
        }
        let state = &mut self.slots[ticket.slot.index()];
        if state.generation != ticket.generation {
            return FetchOutcome::Stale;
        }

        let elements = match result
            .and_then(|record| record.into_elements(EARTH_A, now).map_err(FetchError::from))
        {
            Ok(elements) => elements.reepoch(now),
            Err(err) => {
                // Forget the identifier so selecting the same object retries.
                state.identifier = None;
                return FetchOutcome::Failed(err);
            }
        };

        let direction = OrbitDirection::default();
        let anomaly = initial_anomaly(&elements, direction);
        let body = BodyState::new(elements, anomaly, direction)
            .with_origin(BodyOrigin::Dynamic)
            .with_focus(FocusCapability::focusable(settings.focus_distance, settings.radius))
            .with_label(settings.label(ticket.slot, &ticket.display_name))
            .with_style(OrbitStyle {
                color: settings.color(ticket.slot),
                segments: settings.segments,
            });
        registry.register(ticket.slot.key(), body);
        FetchOutcome::Registered
    }

    /// Give up on a ticket whose fetch was never started.
    ///
    /// The slot forgets the identifier so selecting it again retries.
    pub fn abandon(&mut self, ticket: &FetchTicket) {
        let state = &mut self.slots[ticket.slot.index()];
        if state.generation == ticket.generation {
            state.identifier = None;
        }
    }

    /// Tear down both slots and drop all future fetch results.
    pub fn dispose(&mut self, registry: &mut BodyRegistry) -> Vec<BodyState> {
        self.disposed = true;
        SelectionSlot::ALL
            .iter()
            .filter_map(|slot| {
                let state = &mut self.slots[slot.index()];
                state.identifier = None;
                state.generation += 1;
                registry.deregister(slot.key())
            })
            .collect()
    }
}

/// An element fetch running on the IO task pool.
#[derive(Component)]
pub struct PendingFetch {
    pub ticket: FetchTicket,
    task: Task<Result<OrbitRecord, FetchError>>,
}

/// Plugin providing selection tracking and element fetching.
pub struct SelectionPlugin;

impl Plugin for SelectionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectionTracker>()
            .init_resource::<SelectionSettings>()
            .init_resource::<NeoCatalog>()
            .add_message::<SelectionChanged>()
            .add_systems(Startup, load_neo_catalog)
            .add_systems(
                Update,
                (apply_selection_changes, poll_fetches)
                    .chain()
                    .in_set(SimulationSet::Propagate)
                    .after(crate::time::propagate_bodies),
            )
            .add_systems(Last, dispose_on_exit);
    }
}

/// Load the bundled catalog and install it as the element source unless
/// another provider was inserted up front.
fn load_neo_catalog(
    mut commands: Commands,
    provider: Option<Res<ElementsProvider>>,
    mut catalog: ResMut<NeoCatalog>,
) {
    match bundled_catalog() {
        Ok(entries) => {
            info!("Loaded {} catalog objects", entries.len());
            if provider.is_none() {
                commands.insert_resource(ElementsProvider::new(CatalogSource::new(&entries)));
            }
            catalog.entries = entries;
        }
        Err(err) => {
            warn!("NEO catalog unavailable: {err}");
            if provider.is_none() {
                commands.insert_resource(ElementsProvider::new(CatalogSource::default()));
            }
        }
    }
}

/// Despawn a body's render entities if it had any.
pub fn despawn_renderable(commands: &mut Commands, state: &BodyState) {
    let Some(handle) = state.renderable else {
        return;
    };
    for entity in [handle.root, handle.body] {
        if let Ok(mut entity) = commands.get_entity(entity) {
            entity.despawn();
        }
    }
}

/// Handle selection change messages: tear down, cancel and start fetches.
pub fn apply_selection_changes(
    mut commands: Commands,
    mut changes: MessageReader<SelectionChanged>,
    mut tracker: ResMut<SelectionTracker>,
    mut registry: ResMut<BodyRegistry>,
    provider: Option<Res<ElementsProvider>>,
    pending: Query<(Entity, &PendingFetch)>,
) {
    for change in changes.read() {
        let SelectionChange { removed, ticket } =
            tracker.on_selection_changed(change.slot, change.selection.as_ref(), &mut registry);

        if let Some(state) = removed {
            despawn_renderable(&mut commands, &state);
            info!("Removed {} from slot {}", state.label, change.slot.key());
        }

        let Some(ticket) = ticket else {
            continue;
        };

        // Dropping a task cancels it; its result would be stale anyway.
        for (entity, fetch) in &pending {
            if fetch.ticket.slot == change.slot {
                commands.entity(entity).despawn();
            }
        }

        let Some(provider) = provider.as_ref() else {
            warn!("No element provider; {} stays empty", change.slot.key());
            tracker.abandon(&ticket);
            continue;
        };
        let source = provider.0.clone();
        let designation = ticket.designation.clone();
        let task = IoTaskPool::get().spawn(async move { source.fetch(&designation) });

        debug!("Fetching elements for {} ({})", ticket.designation, change.slot.key());
        commands.spawn(PendingFetch { ticket, task });
    }
}

/// Apply fetches that resolved since the last frame.
pub fn poll_fetches(
    mut commands: Commands,
    mut tracker: ResMut<SelectionTracker>,
    mut registry: ResMut<BodyRegistry>,
    settings: Res<SelectionSettings>,
    clock: Option<Res<AnimationClock>>,
    mut pending: Query<(Entity, &mut PendingFetch)>,
) {
    let now = Epoch::UnixMillis(clock.map_or_else(current_unix_ms, |c| c.date_ms()));

    for (entity, mut fetch) in &mut pending {
        let Some(result) = block_on(future::poll_once(&mut fetch.task)) else {
            continue;
        };
        commands.entity(entity).despawn();

        let ticket = &fetch.ticket;
        match tracker.complete(ticket, result, now, &settings, &mut registry) {
            FetchOutcome::Registered => {
                info!("Registered {} in slot {}", ticket.designation, ticket.slot.key());
            }
            FetchOutcome::Stale => {
                debug!("Discarded stale elements for {}", ticket.designation);
            }
            FetchOutcome::Disposed => {
                debug!("Discarded elements for {} after dispose", ticket.designation);
            }
            FetchOutcome::Failed(err) => {
                error!(
                    "Failed to load {} for slot {}: {err}",
                    ticket.designation,
                    ticket.slot.key()
                );
            }
        }
    }
}

/// Dispose the tracker when the app is shutting down.
pub fn dispose_on_exit(
    mut commands: Commands,
    mut exits: MessageReader<AppExit>,
    mut tracker: ResMut<SelectionTracker>,
    mut registry: ResMut<BodyRegistry>,
    pending: Query<Entity, With<PendingFetch>>,
) {
    if exits.read().next().is_none() || tracker.is_disposed() {
        return;
    }
    for state in tracker.dispose(&mut registry) {
        despawn_renderable(&mut commands, &state);
    }
    for entity in &pending {
        commands.entity(entity).despawn();
    }
    info!("Selection tracker disposed");
}
