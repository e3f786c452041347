//! Jurisdiction profiles: the per-state field mapping as configuration.
//!
//! Each state export uses different field names for the same facts. A
//! Profile tells the loader where the facility key, name, dates, and
//! deficiency entries live, which fields search matches against, and which
//! acronym/special-name tables the renderer applies. Six built-ins cover
//! the known jurisdictions; config files can override any of it.

use serde::{Deserialize, Serialize};

/// How a jurisdiction decides an inspection is violation-bearing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationRule {
    /// Any deficiency entry at all counts (Washington)
    AnyEntry,
    /// At least one entry must carry citation/description/correction text
    #[default]
    ContentBearing,
    /// Entries tagged with a trivial kind (e.g. "none") do not count
    /// (Connecticut)
    NonTrivialKind,
}

/// Facility fields the search box matches against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchField {
    Name,
    Key,
    Address,
    Administrator,
    FacilityType,
    Status,
}

/// Field-name fallback chains for the identity snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IdentityFields {
    pub address: Vec<String>,
    pub administrator: Vec<String>,
    pub capacity: Vec<String>,
    pub status: Vec<String>,
    pub facility_type: Vec<String>,
    pub phone: Vec<String>,
}

/// Field-name fallback chains for deficiency entries
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeficiencyFields {
    pub kind: Vec<String>,
    pub citation: Vec<String>,
    pub description: Vec<String>,
    pub correction: Vec<String>,
}

/// A label/field pair rendered as one detail line in an inspection card
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailField {
    pub label: String,
    pub field: String,
}

impl DetailField {
    fn new(label: &str, field: &str) -> Self {
        Self {
            label: label.to_string(),
            field: field.to_string(),
        }
    }
}

/// Everything that varies per jurisdiction, as one strategy object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Short id, e.g. "ca"
    pub name: String,
    /// Heading shown next to the facility key, e.g. "License Number"
    pub key_label: String,
    /// Prefix for the fallback display name when a record has no name,
    /// e.g. "Facility" renders as "Facility #12345"
    pub fallback_name_prefix: String,
    /// Dotted path to the record array inside each document; None means
    /// the document itself is the array
    #[serde(default)]
    pub records_path: Option<String>,
    /// Dotted path to a nested inspection array inside each record, for
    /// sources that ship pre-grouped facilities (Connecticut)
    #[serde(default)]
    pub inspections_path: Option<String>,
    /// Fallback chain for the facility identity key
    pub key_fields: Vec<String>,
    /// Fallback chain for the display name
    pub name_fields: Vec<String>,
    /// Fallback chain for the inspection date
    pub date_fields: Vec<String>,
    /// Fallback chain for the inspection/report type label
    pub type_fields: Vec<String>,
    #[serde(default)]
    pub identity: IdentityFields,
    /// Dotted path to the deficiency array inside an inspection
    pub deficiency_path: String,
    #[serde(default)]
    pub deficiency_fields: DeficiencyFields,
    #[serde(default)]
    pub violation_rule: ViolationRule,
    pub search_fields: Vec<SearchField>,
    /// Detail lines rendered inside each inspection card
    #[serde(default)]
    pub inspection_details: Vec<DetailField>,
    /// Acronyms kept fully uppercase by the title-caser, in addition to
    /// the shared base table
    #[serde(default)]
    pub acronyms: Vec<String>,
    /// Proper-name overrides, lowercase form to display form
    #[serde(default)]
    pub special_names: Vec<(String, String)>,
}

impl Profile {
    /// Look up a built-in jurisdiction profile by its short id
    pub fn builtin(name: &str) -> Option<Profile> {
        match name.to_lowercase().as_str() {
            "ca" => Some(Self::california()),
            "az" => Some(Self::arizona()),
            "ut" => Some(Self::utah()),
            "tx" => Some(Self::texas()),
            "wa" => Some(Self::washington()),
            "ct" => Some(Self::connecticut()),
            _ => None,
        }
    }

    /// Ids of all built-in profiles
    pub fn builtin_names() -> &'static [&'static str] {
        &["ca", "az", "ut", "tx", "wa", "ct"]
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// California community-care licensing exports: flat per-visit records
    /// keyed by facility number.
    pub fn california() -> Profile {
        Profile {
            name: "ca".into(),
            key_label: "Facility Number".into(),
            fallback_name_prefix: "Facility".into(),
            records_path: None,
            inspections_path: None,
            key_fields: Self::strings(&["facility_number"]),
            name_fields: Self::strings(&["facility_name"]),
            date_fields: Self::strings(&["visit_date"]),
            type_fields: Self::strings(&["report_type"]),
            identity: IdentityFields {
                administrator: Self::strings(&["administrator"]),
                capacity: Self::strings(&["capacity"]),
                facility_type: Self::strings(&["facility_type_name"]),
                ..Default::default()
            },
            deficiency_path: "deficiencies".into(),
            deficiency_fields: DeficiencyFields {
                citation: Self::strings(&["section_cited"]),
                description: Self::strings(&["description"]),
                correction: Self::strings(&["plan_of_correction"]),
                ..Default::default()
            },
            violation_rule: ViolationRule::ContentBearing,
            search_fields: vec![
                SearchField::Name,
                SearchField::FacilityType,
                SearchField::Administrator,
                SearchField::Key,
            ],
            inspection_details: vec![
                DetailField::new("Visit Date", "visit_date"),
                DetailField::new("Report Date", "report_date"),
                DetailField::new("Form Number", "form_number"),
                DetailField::new("Census", "census"),
                DetailField::new("Complaint Status", "complaint_status"),
                DetailField::new("Met With", "met_with"),
            ],
            acronyms: Self::strings(&[
                "FDA", "CDC", "CMS", "HHS", "DOH", "OSHA", "JCAHO", "THP", "FC", "STRTP", "ARS",
                "TRSCF", "OC", "TLC", "BCFS", "SFH", "THPP",
            ]),
            special_names: vec![],
        }
    }

    /// Arizona licensing exports: flat records keyed by license number
    pub fn arizona() -> Profile {
        Profile {
            name: "az".into(),
            key_label: "License Number".into(),
            fallback_name_prefix: "License".into(),
            records_path: None,
            inspections_path: None,
            key_fields: Self::strings(&["license_number"]),
            name_fields: Self::strings(&["legal_name"]),
            date_fields: Self::strings(&["inspection_date"]),
            type_fields: Self::strings(&["inspection_type"]),
            identity: IdentityFields {
                address: Self::strings(&["address"]),
                administrator: Self::strings(&["chief_administrative_officer", "owner_licensee"]),
                capacity: Self::strings(&["max_licensed_capacity"]),
                status: Self::strings(&["facility_status", "license_status"]),
                phone: Self::strings(&["phone"]),
                ..Default::default()
            },
            deficiency_path: "deficiencies".into(),
            deficiency_fields: DeficiencyFields {
                citation: Self::strings(&["rule"]),
                description: Self::strings(&["evidence"]),
                correction: Self::strings(&["findings"]),
                ..Default::default()
            },
            violation_rule: ViolationRule::ContentBearing,
            search_fields: vec![
                SearchField::Name,
                SearchField::Key,
                SearchField::Address,
                SearchField::Administrator,
            ],
            inspection_details: vec![
                DetailField::new("Inspection Date", "inspection_date"),
                DetailField::new("Inspection Number", "inspection_number"),
                DetailField::new("Certificate Number", "certificate_number"),
            ],
            acronyms: Self::strings(&["ADHS", "BHRF", "DCS"]),
            special_names: vec![],
        }
    }

    /// Utah exports: facility name doubles as the identity key
    pub fn utah() -> Profile {
        Profile {
            name: "ut".into(),
            key_label: "Facility".into(),
            fallback_name_prefix: "Facility".into(),
            records_path: None,
            inspections_path: None,
            key_fields: Self::strings(&["facility_name"]),
            name_fields: Self::strings(&["facility_name"]),
            date_fields: Self::strings(&["inspection_date"]),
            type_fields: Self::strings(&["inspection_type"]),
            identity: IdentityFields {
                address: Self::strings(&["address"]),
                ..Default::default()
            },
            deficiency_path: "inspection_findings".into(),
            deficiency_fields: DeficiencyFields {
                citation: Self::strings(&["rule_number"]),
                description: Self::strings(&["finding", "description"]),
                correction: Self::strings(&["corrective_action"]),
                ..Default::default()
            },
            violation_rule: ViolationRule::ContentBearing,
            search_fields: vec![SearchField::Name, SearchField::Address],
            inspection_details: vec![
                DetailField::new("Inspection Date", "inspection_date"),
                DetailField::new("Inspection Type", "inspection_type"),
            ],
            acronyms: Self::strings(&["DHHS", "RTC"]),
            special_names: vec![],
        }
    }

    /// Texas HHS operation exports: spreadsheet-style column names
    pub fn texas() -> Profile {
        Profile {
            name: "tx".into(),
            key_label: "Provider Number".into(),
            fallback_name_prefix: "Provider".into(),
            records_path: None,
            inspections_path: None,
            key_fields: Self::strings(&["Operation #", "operation_number", "provider_number"]),
            name_fields: Self::strings(&[
                "Operation/Caregiver Name",
                "facility_name",
                "name",
            ]),
            date_fields: Self::strings(&["Inspection Date", "inspection_date", "Issue Date"]),
            type_fields: Self::strings(&["Operation Type", "inspection_type"]),
            identity: IdentityFields {
                address: Self::strings(&["Location Address", "address"]),
                facility_type: Self::strings(&["Operation Type", "facility_type"]),
                capacity: Self::strings(&["Total Capacity", "capacity"]),
                ..Default::default()
            },
            deficiency_path: "deficiencies".into(),
            deficiency_fields: DeficiencyFields {
                citation: Self::strings(&["Standard Number Cited", "standard_cited"]),
                description: Self::strings(&["Standard Description", "description"]),
                correction: Self::strings(&["Corrected Date", "correction"]),
                ..Default::default()
            },
            violation_rule: ViolationRule::ContentBearing,
            search_fields: vec![
                SearchField::Name,
                SearchField::FacilityType,
                SearchField::Key,
                SearchField::Address,
            ],
            inspection_details: vec![
                DetailField::new("Inspection Date", "Inspection Date"),
                DetailField::new("Issue Date", "Issue Date"),
            ],
            acronyms: Self::strings(&["HHS", "CPA", "GRO", "RTC"]),
            special_names: vec![],
        }
    }

    /// Washington agency exports: keyed by name with license/source-file
    /// fallbacks; any deficiency entry counts as a violation.
    pub fn washington() -> Profile {
        Profile {
            name: "wa".into(),
            key_label: "License Number".into(),
            fallback_name_prefix: "Agency".into(),
            records_path: None,
            inspections_path: None,
            key_fields: Self::strings(&["facility_name", "license_number", "source_file"]),
            name_fields: Self::strings(&["facility_name", "license_number"]),
            date_fields: Self::strings(&["inspection_date"]),
            type_fields: Self::strings(&["inspection_type"]),
            identity: IdentityFields {
                address: Self::strings(&["facility_address"]),
                administrator: Self::strings(&["administrator"]),
                ..Default::default()
            },
            deficiency_path: "deficiencies".into(),
            deficiency_fields: DeficiencyFields {
                citation: Self::strings(&["wac_code", "rule"]),
                description: Self::strings(&["description", "finding"]),
                correction: Self::strings(&["corrective_action"]),
                ..Default::default()
            },
            violation_rule: ViolationRule::AnyEntry,
            search_fields: vec![
                SearchField::Name,
                SearchField::Key,
                SearchField::Address,
                SearchField::Administrator,
            ],
            inspection_details: vec![
                DetailField::new("Inspection Date", "inspection_date"),
                DetailField::new("Inspection Number", "inspection_number"),
                DetailField::new("Inspector", "inspector"),
                DetailField::new("Service Types", "service_types"),
            ],
            acronyms: Self::strings(&["DCYF", "WAC", "RTF"]),
            special_names: vec![],
        }
    }

    /// Connecticut DCF exports: pre-grouped facilities with nested report
    /// lists and `type: "none"` placeholder entries.
    pub fn connecticut() -> Profile {
        Profile {
            name: "ct".into(),
            key_label: "Program".into(),
            fallback_name_prefix: "Program".into(),
            records_path: Some("facilities".into()),
            inspections_path: Some("reports".into()),
            key_fields: Self::strings(&["facility_info.facility_name"]),
            name_fields: Self::strings(&["facility_info.facility_name"]),
            date_fields: Self::strings(&["report_date"]),
            type_fields: Self::strings(&["report_id"]),
            identity: IdentityFields {
                address: Self::strings(&[
                    "facility_info.full_address",
                    "facility_info.city_state_zip",
                ]),
                administrator: Self::strings(&["facility_info.executive_director"]),
                capacity: Self::strings(&["facility_info.bed_capacity"]),
                status: Self::strings(&["facility_info.program_category"]),
                facility_type: Self::strings(&["facility_info.program_name"]),
                phone: Self::strings(&["facility_info.phone"]),
                ..Default::default()
            },
            deficiency_path: "categories.regulatory_non_compliance".into(),
            deficiency_fields: DeficiencyFields {
                kind: Self::strings(&["type"]),
                citation: Self::strings(&["regulation", "area_type"]),
                description: Self::strings(&["description"]),
                ..Default::default()
            },
            violation_rule: ViolationRule::NonTrivialKind,
            search_fields: vec![
                SearchField::Name,
                SearchField::FacilityType,
                SearchField::Administrator,
                SearchField::Status,
                SearchField::Address,
            ],
            inspection_details: vec![
                DetailField::new("Report ID", "report_id"),
                DetailField::new("Report Date", "report_date"),
                DetailField::new("Summary", "summary"),
            ],
            acronyms: Self::strings(&["DCF"]),
            special_names: vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_builtins_resolve() {
        for name in Profile::builtin_names() {
            let profile = Profile::builtin(name).unwrap_or_else(|| panic!("missing {}", name));
            assert_eq!(&profile.name, name);
            assert!(!profile.key_fields.is_empty(), "{} needs key fields", name);
            assert!(!profile.search_fields.is_empty());
        }
    }

    #[test]
    fn builtin_lookup_is_case_insensitive() {
        assert!(Profile::builtin("CA").is_some());
        assert!(Profile::builtin("mt").is_none());
    }

    #[test]
    fn connecticut_is_pre_grouped() {
        let ct = Profile::connecticut();
        assert_eq!(ct.records_path.as_deref(), Some("facilities"));
        assert_eq!(ct.inspections_path.as_deref(), Some("reports"));
        assert_eq!(ct.violation_rule, ViolationRule::NonTrivialKind);
    }

    #[test]
    fn profile_round_trips_through_json() {
        let ca = Profile::california();
        let json = serde_json::to_string(&ca).unwrap();
        let back: Profile = serde_json::from_str(&json).unwrap();
        assert_eq!(back.name, "ca");
        assert_eq!(back.key_fields, ca.key_fields);
    }
}
