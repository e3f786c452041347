//! Groups raw inspection records into facilities.
//!
//! First record seen for a key creates the facility and snapshots its
//! identity; every later record for the same key only appends an
//! inspection. After grouping, each facility's inspections are stably
//! sorted newest-first, with missing/unparsable dates treated as the
//! epoch so they land last.

use crate::{Facility, InspectionRecord};
use std::collections::HashMap;

/// Aggregate a flat record list into facilities.
///
/// Facilities come back in first-seen key order. Records with an empty
/// key were already dropped by the loader, but an empty key arriving
/// here is dropped too rather than grouping strangers together.
pub fn aggregate(records: Vec<InspectionRecord>) -> Vec<Facility> {
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut facilities: Vec<Facility> = Vec::new();

    for record in records {
        if record.facility_key.trim().is_empty() {
            continue;
        }
        match by_key.get(&record.facility_key) {
            Some(&idx) => facilities[idx].inspections.push(record),
            None => {
                by_key.insert(record.facility_key.clone(), facilities.len());
                facilities.push(Facility {
                    key: record.facility_key.clone(),
                    identity: record.identity.clone(),
                    inspections: vec![record],
                });
            }
        }
    }

    for facility in &mut facilities {
        // stable: equal dates keep their input order
        facility
            .inspections
            .sort_by(|a, b| b.sort_date().cmp(&a.sort_date()));
    }

    facilities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_inspection_date, Identity};

    fn record(key: &str, name: &str, date: &str) -> InspectionRecord {
        InspectionRecord {
            facility_key: key.into(),
            date_raw: Some(date.into()),
            date: parse_inspection_date(date),
            kind: None,
            identity: Identity {
                name: name.into(),
                ..Default::default()
            },
            deficiencies: vec![],
            details: vec![],
        }
    }

    #[test]
    fn same_key_groups_with_dates_descending() {
        let facilities = aggregate(vec![
            record("12345", "Harbor Home", "2023-01-01"),
            record("12345", "Harbor Home", "2024-06-01"),
        ]);
        assert_eq!(facilities.len(), 1);
        let dates: Vec<_> = facilities[0]
            .inspections
            .iter()
            .map(|i| i.date_raw.clone().unwrap())
            .collect();
        assert_eq!(dates, vec!["2024-06-01", "2023-01-01"]);
    }

    #[test]
    fn identity_comes_from_first_record_only() {
        let facilities = aggregate(vec![
            record("9", "First Name", "2020-01-01"),
            record("9", "Renamed Later", "2021-01-01"),
        ]);
        assert_eq!(facilities[0].identity.name, "First Name");
        assert_eq!(facilities[0].inspections.len(), 2);
    }

    #[test]
    fn unparsable_dates_sort_last() {
        let facilities = aggregate(vec![
            record("1", "A", "garbage"),
            record("1", "A", "2022-03-03"),
        ]);
        let last = facilities[0].inspections.last().unwrap();
        assert_eq!(last.date, None);
    }

    #[test]
    fn empty_key_is_dropped() {
        let facilities = aggregate(vec![
            record("", "Keyless", "2022-01-01"),
            record("  ", "Blank", "2022-01-01"),
        ]);
        assert!(facilities.is_empty());
    }

    #[test]
    fn no_facility_has_an_empty_inspection_list() {
        let facilities = aggregate(vec![
            record("1", "A", "2022-01-01"),
            record("2", "B", "nope"),
        ]);
        assert_eq!(facilities.len(), 2);
        assert!(facilities.iter().all(|f| !f.inspections.is_empty()));
    }

    #[test]
    fn equal_dates_keep_input_order() {
        let mut a = record("1", "A", "2022-01-01");
        a.kind = Some("first".into());
        let mut b = record("1", "A", "2022-01-01");
        b.kind = Some("second".into());
        let facilities = aggregate(vec![a, b]);
        let kinds: Vec<_> = facilities[0]
            .inspections
            .iter()
            .map(|i| i.kind.clone().unwrap())
            .collect();
        assert_eq!(kinds, vec!["first", "second"]);
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::{Identity, InspectionRecord};
    use proptest::prelude::*;

    fn arbitrary_record() -> impl Strategy<Value = InspectionRecord> {
        (
            prop::sample::select(vec!["1", "2", "3", "4", ""]),
            prop::sample::select(vec!["2022-01-01", "2023-06-15", "2024-12-31", "garbage"]),
            0usize..4,
        )
            .prop_map(|(key, date, n_deficiencies)| InspectionRecord {
                facility_key: key.to_string(),
                date_raw: Some(date.to_string()),
                date: crate::parse_inspection_date(date),
                kind: None,
                identity: Identity {
                    name: format!("Facility {}", key),
                    ..Default::default()
                },
                deficiencies: vec![Default::default(); n_deficiencies],
                details: vec![],
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn facility_set_is_permutation_invariant(
            mut records in prop::collection::vec(arbitrary_record(), 0..20)
        ) {
            let forward = aggregate(records.clone());
            records.reverse();
            let backward = aggregate(records);

            let mut fwd_keys: Vec<_> = forward.iter().map(|f| f.key.clone()).collect();
            let mut bwd_keys: Vec<_> = backward.iter().map(|f| f.key.clone()).collect();
            fwd_keys.sort();
            bwd_keys.sort();
            prop_assert_eq!(fwd_keys, bwd_keys);

            let total_fwd: usize = forward.iter().map(|f| f.inspections.len()).sum();
            let total_bwd: usize = backward.iter().map(|f| f.inspections.len()).sum();
            prop_assert_eq!(total_fwd, total_bwd);
        }

        #[test]
        fn inspections_always_newest_first(
            records in prop::collection::vec(arbitrary_record(), 0..20)
        ) {
            for facility in aggregate(records) {
                prop_assert!(!facility.inspections.is_empty());
                for pair in facility.inspections.windows(2) {
                    prop_assert!(pair[0].sort_date() >= pair[1].sort_date());
                }
            }
        }
    }
}
