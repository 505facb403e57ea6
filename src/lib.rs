//! Pleiades - NEO Solar System Visualizer
//!
//! Keplerian propagation of the planets, belts and selected near-Earth
//! objects, with a camera that follows whichever body is in focus.
//! The library exposes every plugin and core type for tests and integration.

pub mod camera;
pub mod ephemeris;
pub mod input;
pub mod registry;
pub mod render;
pub mod selection;
pub mod time;
pub mod types;
pub mod ui;
