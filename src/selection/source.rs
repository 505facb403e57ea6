//! Orbital-element providers for dynamically selected bodies.
//!
//! The core only sees parsed [`OrbitRecord`]s. Transports live behind the
//! [`ElementsSource`] trait and run on Bevy's IO task pool.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::ephemeris::{ElementsError, OrbitRecord};

/// Catalog location relative to the working directory.
pub const CATALOG_PATH: &str = "assets/catalog/neos.json";

/// Transient failures while fetching elements for a selection.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no orbital elements known for `{0}`")]
    UnknownDesignation(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("malformed element payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid orbital elements: {0}")]
    InvalidElements(#[from] ElementsError),
}

/// Errors loading a record catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Platform-agnostic element provider.
///
/// `fetch` is blocking; callers run it on a task pool.
pub trait ElementsSource: Send + Sync {
    fn fetch(&self, designation: &str) -> Result<OrbitRecord, FetchError>;
}

/// Shared handle to the active element provider.
#[derive(Resource, Clone)]
pub struct ElementsProvider(pub Arc<dyn ElementsSource>);

impl ElementsProvider {
    pub fn new(source: impl ElementsSource + 'static) -> Self {
        Self(Arc::new(source))
    }
}

/// One catalog row: an object and its elements.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub designation: String,
    pub name: String,
    #[serde(flatten)]
    pub record: OrbitRecord,
    /// Julian Date of the next notable close approach, if any.
    #[serde(default)]
    pub approach_jd: Option<f64>,
}

/// Entries offered by the selection pickers.
#[derive(Resource, Clone, Debug, Default)]
pub struct NeoCatalog {
    pub entries: Vec<CatalogEntry>,
}

impl NeoCatalog {
    pub fn find(&self, designation: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.designation == designation)
    }
}

/// Parse a JSON array of [`CatalogEntry`].
pub fn parse_catalog(json: &str) -> Result<Vec<CatalogEntry>, CatalogError> {
    Ok(serde_json::from_str(json)?)
}

/// Read and parse a catalog file.
pub fn load_catalog(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let json = std::fs::read_to_string(path)?;
    parse_catalog(&json)
}

/// The catalog shipped with the application.
#[cfg(feature = "embedded-catalog")]
pub fn bundled_catalog() -> Result<Vec<CatalogEntry>, CatalogError> {
    parse_catalog(include_str!("../../assets/catalog/neos.json"))
}

/// The catalog shipped with the application.
#[cfg(not(feature = "embedded-catalog"))]
pub fn bundled_catalog() -> Result<Vec<CatalogEntry>, CatalogError> {
    load_catalog(Path::new(CATALOG_PATH))
}

/// In-memory element source backed by catalog entries.
///
/// Lookups match the designation first, then the name (case-insensitive).
#[derive(Clone, Debug, Default)]
pub struct CatalogSource {
    by_designation: HashMap<String, OrbitRecord>,
    by_name: HashMap<String, String>,
}

impl CatalogSource {
    pub fn new(entries: &[CatalogEntry]) -> Self {
        let mut source = Self::default();
        for entry in entries {
            source
                .by_designation
                .insert(entry.designation.clone(), entry.record.clone());
            source
                .by_name
                .insert(entry.name.to_lowercase(), entry.designation.clone());
        }
        source
    }

    pub fn len(&self) -> usize {
        self.by_designation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_designation.is_empty()
    }
}

impl ElementsSource for CatalogSource {
    fn fetch(&self, designation: &str) -> Result<OrbitRecord, FetchError> {
        self.by_designation
            .get(designation)
            .or_else(|| {
                self.by_name
                    .get(&designation.to_lowercase())
                    .and_then(|d| self.by_designation.get(d))
            })
            .cloned()
            .ok_or_else(|| FetchError::UnknownDesignation(designation.to_owned()))
    }
}
