//! Facwatch: facility inspection report aggregator
//!
//! Loads state inspection exports (JSON), groups the raw records into
//! facilities, indexes them for alphabet navigation, and renders
//! filtered/sorted views as HTML, console, or JSON reports.

pub mod aggregator;
pub mod cache;
pub mod config;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod indexer;
pub mod loader;
pub mod profile;
pub mod reporter;
pub mod titlecase;
pub mod view;
pub mod watcher;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single cited violation or noted issue within one inspection record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deficiency {
    /// Entry type marker; some sources tag placeholder entries (e.g. "none")
    pub kind: Option<String>,
    /// Regulation or rule reference cited
    pub citation: Option<String>,
    /// Free-text description of the violation
    pub description: Option<String>,
    /// Corrective-action / plan-of-correction text
    pub correction: Option<String>,
}

impl Deficiency {
    /// True when the entry carries actual violation content in any field
    pub fn has_content(&self) -> bool {
        [&self.citation, &self.description, &self.correction]
            .iter()
            .any(|f| f.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }
}

/// Identity fields shared by all inspections of one facility.
///
/// Snapshot-copied from the first record seen for a facility key; later
/// records never overwrite these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub name: String,
    pub address: Option<String>,
    pub administrator: Option<String>,
    pub capacity: Option<String>,
    pub status: Option<String>,
    pub facility_type: Option<String>,
    pub phone: Option<String>,
}

/// An immutable fact describing one inspection/citation event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRecord {
    /// Jurisdiction-specific identity key (license/provider number or name)
    pub facility_key: String,
    /// Date string as it appeared in the source
    pub date_raw: Option<String>,
    /// Parsed date; None when missing or unparsable (sorts as epoch-0)
    pub date: Option<NaiveDate>,
    /// Inspection/report type label
    pub kind: Option<String>,
    /// Identity candidate fields carried on this record
    pub identity: Identity,
    pub deficiencies: Vec<Deficiency>,
    /// Extra label/value lines for the inspection card, per profile
    pub details: Vec<(String, String)>,
}

impl InspectionRecord {
    /// Date used for ordering; missing/unparsable dates are the epoch
    pub fn sort_date(&self) -> NaiveDate {
        self.date.unwrap_or_default()
    }
}

/// Aggregation root: one physical site and all of its inspections.
///
/// Invariant: the inspection list is never empty once the facility exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    pub key: String,
    pub identity: Identity,
    /// Inspections sorted newest-first after aggregation
    pub inspections: Vec<InspectionRecord>,
}

impl Facility {
    pub fn name(&self) -> &str {
        &self.identity.name
    }

    /// Most recent inspection date; epoch when no inspection has a
    /// parsable date
    pub fn most_recent_date(&self) -> NaiveDate {
        self.inspections
            .iter()
            .filter_map(|i| i.date)
            .max()
            .unwrap_or_default()
    }
}

/// Letter buckets (`A`–`Z` or `#`) for facility-list navigation.
///
/// BTreeMap keeps the letters themselves in display order.
pub type LetterIndex = BTreeMap<String, Vec<Facility>>;

/// Sort mode applied by the view engine after mode-specific filtering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Passthrough, no reordering
    #[default]
    None,
    /// Ascending by display name
    Name,
    /// Keep only violation-bearing inspections, name order
    ViolationsOnly,
    /// Keep only violation-bearing inspections, most violations first
    ViolationsDesc,
    /// Most recent inspection date first
    RecentInspection,
}

impl std::str::FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "none" => Ok(SortMode::None),
            "name" => Ok(SortMode::Name),
            "violations-only" => Ok(SortMode::ViolationsOnly),
            "violations-desc" => Ok(SortMode::ViolationsDesc),
            "recent-inspection" => Ok(SortMode::RecentInspection),
            other => Err(format!(
                "unknown sort mode '{}' (expected name, violations-only, violations-desc, or recent-inspection)",
                other
            )),
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortMode::None => write!(f, "none"),
            SortMode::Name => write!(f, "name"),
            SortMode::ViolationsOnly => write!(f, "violations-only"),
            SortMode::ViolationsDesc => write!(f, "violations-desc"),
            SortMode::RecentInspection => write!(f, "recent-inspection"),
        }
    }
}

/// Parse a date the way the source exports write them.
///
/// Tries ISO first, then the US formats seen in state exports. Returns
/// None for anything unparsable; callers treat that as the epoch.
pub fn parse_inspection_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    const FORMATS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%m-%d-%Y", "%B %d, %Y"];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}
