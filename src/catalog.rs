//! Upcoming-release catalog.
//!
//! A fixed, ordered list of upcoming product releases with related
//! card-name keywords, an expected percentage impact range, and
//! human-readable commentary. Loaded once at startup from a TOML file
//! and never mutated. File order is preserved: the pricing engine
//! returns the *first* matching release, so order carries priority.
//!
//! Validation is fail-fast: one malformed entry rejects the whole file.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use tracing::info;

use crate::pricing::parse_impact_range;
use crate::types::{DeskError, UpcomingRelease};

/// Date format used in the catalog file.
const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// File shapes (TOML → Rust)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    release: Vec<RawRelease>,
}

/// A release entry as written in the file. The impact range arrives as
/// the literal `"<min>-<max>%"` form and is parsed during validation.
#[derive(Debug, Deserialize)]
struct RawRelease {
    name: String,
    release_date: String,
    related_names: Vec<String>,
    impact: String,
    commentary: String,
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The validated, ordered release catalog.
#[derive(Debug, Clone, Default)]
pub struct ReleaseCatalog {
    releases: Vec<UpcomingRelease>,
}

impl ReleaseCatalog {
    /// Build a catalog from already-validated entries (used by tests
    /// and anywhere a fixture catalog is injected).
    pub fn from_releases(releases: Vec<UpcomingRelease>) -> Self {
        Self { releases }
    }

    /// Load and validate the catalog from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file: {path}"))?;
        let file: CatalogFile = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse catalog file: {path}"))?;

        let mut releases = Vec::with_capacity(file.release.len());
        for raw in file.release {
            releases.push(validate_entry(raw)?);
        }

        info!(path, count = releases.len(), "Release catalog loaded");
        Ok(Self { releases })
    }

    /// Releases in file (priority) order.
    pub fn releases(&self) -> &[UpcomingRelease] {
        &self.releases
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }
}

/// Validate one raw entry into an `UpcomingRelease`.
fn validate_entry(raw: RawRelease) -> Result<UpcomingRelease> {
    let entry = raw.name.clone();

    if raw.related_names.is_empty() {
        return Err(DeskError::Catalog {
            entry,
            message: "related_names must not be empty".to_string(),
        }
        .into());
    }

    let release_date = NaiveDate::parse_from_str(&raw.release_date, DATE_FORMAT)
        .map_err(|e| DeskError::Catalog {
            entry: entry.clone(),
            message: format!("invalid release_date \"{}\": {e}", raw.release_date),
        })?;

    let impact = parse_impact_range(&raw.impact)
        .with_context(|| format!("Catalog entry \"{entry}\" has a malformed impact range"))?;

    if impact.min > impact.max {
        return Err(DeskError::Catalog {
            entry,
            message: format!("impact range min exceeds max: {impact}"),
        }
        .into());
    }

    Ok(UpcomingRelease {
        name: raw.name,
        release_date,
        related_names: raw.related_names,
        impact,
        commentary: raw.commentary,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
