//! The filter/sort engine: turns the letter index plus a view state into
//! the ordered facility list the renderer shows.
//!
//! Two modes: letter mode shows one bucket; a non-empty search term
//! switches to search mode across every bucket. The sort mode is applied
//! after mode filtering. All of it is pure so it can be tested without
//! any renderer.

use crate::profile::{Profile, SearchField, ViolationRule};
use crate::{Facility, InspectionRecord, LetterIndex, SortMode};

/// What the user currently has selected.
///
/// Owned by the caller (one per report run); the engine never mutates it.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Active letter; None selects the first available bucket
    pub current_letter: Option<String>,
    /// Free-text search; non-empty switches to search mode
    pub search_term: String,
    pub sort: SortMode,
}

impl ViewState {
    pub fn is_searching(&self) -> bool {
        !self.search_term.trim().is_empty()
    }
}

/// An ordered, filtered view ready for rendering
#[derive(Debug, Clone)]
pub struct ViewResult {
    pub facilities: Vec<Facility>,
    /// Letter label, or "Search Results" in search mode
    pub context_label: String,
    pub is_search: bool,
}

/// Produce the visible facility list for a view state.
///
/// Letter mode with an unknown/absent letter falls back to the first
/// available bucket (`#` sorts before `A`, matching the navigation
/// order). Search mode flattens every bucket, matches the profile's
/// search fields case-insensitively, and clears the letter context.
pub fn view(index: &LetterIndex, state: &ViewState, profile: &Profile) -> ViewResult {
    if state.is_searching() {
        let term = state.search_term.trim().to_lowercase();
        let matched: Vec<Facility> = index
            .values()
            .flatten()
            .filter(|f| matches_search(f, &term, &profile.search_fields))
            .cloned()
            .collect();
        return ViewResult {
            facilities: apply_sort(matched, state.sort, profile),
            context_label: "Search Results".to_string(),
            is_search: true,
        };
    }

    let letter = state
        .current_letter
        .as_ref()
        .filter(|l| index.contains_key(*l))
        .cloned()
        .or_else(|| index.keys().next().cloned());

    let Some(letter) = letter else {
        return ViewResult {
            facilities: Vec::new(),
            context_label: String::new(),
            is_search: false,
        };
    };

    let bucket = index.get(&letter).cloned().unwrap_or_default();
    ViewResult {
        facilities: apply_sort(bucket, state.sort, profile),
        context_label: letter,
        is_search: false,
    }
}

/// True when the inspection counts as violation-bearing for the rule
pub fn inspection_has_violations(inspection: &InspectionRecord, rule: ViolationRule) -> bool {
    if inspection.deficiencies.is_empty() {
        return false;
    }
    match rule {
        ViolationRule::AnyEntry => true,
        ViolationRule::ContentBearing => inspection.deficiencies.iter().any(|d| d.has_content()),
        ViolationRule::NonTrivialKind => inspection.deficiencies.iter().any(is_non_trivial_entry),
    }
}

/// True when a single deficiency entry counts toward violation totals.
///
/// Only the non-trivial-kind rule discriminates at the entry level; the
/// other rules count every entry once the inspection qualifies.
pub fn entry_counts(d: &crate::Deficiency, rule: ViolationRule) -> bool {
    match rule {
        ViolationRule::NonTrivialKind => is_non_trivial_entry(d),
        _ => true,
    }
}

/// Placeholder entries are tagged `type: "none"` or carry the literal
/// description "None"
fn is_non_trivial_entry(d: &crate::Deficiency) -> bool {
    d.kind.as_deref() != Some("none") && d.description.as_deref() != Some("None")
}

/// Total qualifying deficiency entries across a facility's inspections.
///
/// Counted over whatever inspection list the facility currently holds;
/// after violations filtering that is the filtered set, so the number
/// sorted on is the number rendered.
pub fn count_violations(facility: &Facility, rule: ViolationRule) -> usize {
    facility
        .inspections
        .iter()
        .map(|i| i.deficiencies.iter().filter(|d| entry_counts(d, rule)).count())
        .sum()
}

fn apply_sort(facilities: Vec<Facility>, sort: SortMode, profile: &Profile) -> Vec<Facility> {
    let mut facilities = match sort {
        SortMode::ViolationsOnly | SortMode::ViolationsDesc => facilities
            .into_iter()
            .filter_map(|mut f| {
                f.inspections
                    .retain(|i| inspection_has_violations(i, profile.violation_rule));
                if f.inspections.is_empty() {
                    None
                } else {
                    Some(f)
                }
            })
            .collect(),
        _ => facilities,
    };

    match sort {
        SortMode::None => {}
        SortMode::Name | SortMode::ViolationsOnly => {
            facilities.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
        }
        SortMode::ViolationsDesc => {
            facilities.sort_by(|a, b| {
                count_violations(b, profile.violation_rule)
                    .cmp(&count_violations(a, profile.violation_rule))
            });
        }
        SortMode::RecentInspection => {
            facilities.sort_by(|a, b| b.most_recent_date().cmp(&a.most_recent_date()));
        }
    }
    facilities
}

fn matches_search(facility: &Facility, term: &str, fields: &[SearchField]) -> bool {
    fields.iter().any(|field| {
        let value = match field {
            SearchField::Name => Some(facility.name()),
            SearchField::Key => Some(facility.key.as_str()),
            SearchField::Address => facility.identity.address.as_deref(),
            SearchField::Administrator => facility.identity.administrator.as_deref(),
            SearchField::FacilityType => facility.identity.facility_type.as_deref(),
            SearchField::Status => facility.identity.status.as_deref(),
        };
        value.is_some_and(|v| v.to_lowercase().contains(term))
    })
}
