//! JSON reporter for machine-readable output

use crate::loader::LoadSummary;
use crate::view::ViewResult;
use crate::Facility;
use serde::Serialize;

/// Reporter for JSON output
pub struct JsonReporter {
    /// Whether to pretty-print JSON
    pretty: bool,
}

impl JsonReporter {
    /// Create a new JSON reporter
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Enable pretty-printing
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Serialize the current view plus the load diagnostics
    pub fn report(&self, view: &ViewResult, summary: &LoadSummary) -> String {
        let output = JsonOutput {
            context: &view.context_label,
            is_search: view.is_search,
            facility_count: view.facilities.len(),
            facilities: &view.facilities,
            load_summary: summary,
        };

        if self.pretty {
            serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
        } else {
            serde_json::to_string(&output).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOutput<'a> {
    context: &'a str,
    is_search: bool,
    facility_count: usize,
    facilities: &'a [Facility],
    load_summary: &'a LoadSummary,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Facility, Identity, InspectionRecord};

    fn make_view(names: &[&str]) -> ViewResult {
        ViewResult {
            facilities: names
                .iter()
                .map(|n| Facility {
                    key: n.to_string(),
                    identity: Identity {
                        name: n.to_string(),
                        ..Default::default()
                    },
                    inspections: vec![InspectionRecord {
                        facility_key: n.to_string(),
                        date_raw: Some("2024-01-01".into()),
                        date: crate::parse_inspection_date("2024-01-01"),
                        kind: None,
                        identity: Identity::default(),
                        deficiencies: vec![],
                        details: vec![],
                    }],
                })
                .collect(),
            context_label: "A".to_string(),
            is_search: false,
        }
    }

    #[test]
    fn output_has_expected_keys() {
        let view = make_view(&["Alpha House"]);
        let json = JsonReporter::new().report(&view, &LoadSummary::default());
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["context"], "A");
        assert_eq!(parsed["isSearch"], false);
        assert_eq!(parsed["facilityCount"], 1);
        assert!(parsed.get("facilities").is_some());
        assert!(parsed.get("loadSummary").is_some());

        let facilities = parsed["facilities"].as_array().unwrap();
        assert_eq!(facilities[0]["identity"]["name"], "Alpha House");
        assert_eq!(facilities[0]["inspections"][0]["dateRaw"], "2024-01-01");
    }

    #[test]
    fn pretty_output_is_indented() {
        let view = make_view(&["Alpha House"]);
        let json = JsonReporter::new().pretty().report(&view, &LoadSummary::default());
        assert!(json.contains('\n'));
        assert!(json.contains("  "));
    }

    #[test]
    fn empty_view_still_serializes() {
        let view = make_view(&[]);
        let json = JsonReporter::new().report(&view, &LoadSummary::default());
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["facilityCount"], 0);
        assert!(parsed["facilities"].as_array().unwrap().is_empty());
    }
}
