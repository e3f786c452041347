//! Buckets facilities by the first letter of their display name.

use crate::{Facility, LetterIndex};

/// Bucket key for a display name: its uppercased first character when
/// `A`–`Z`, otherwise `#` (covering digits, punctuation, and empty names)
pub fn letter_for(name: &str) -> String {
    match name.chars().next() {
        Some(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase().to_string(),
        _ => "#".to_string(),
    }
}

/// Build the letter index. Pure: same facilities in, same buckets out.
///
/// Each bucket is sorted case-insensitively ascending by display name;
/// empty names compare as the empty string and come first.
pub fn index_by_letter(facilities: Vec<Facility>) -> LetterIndex {
    let mut index = LetterIndex::new();
    for facility in facilities {
        let letter = letter_for(facility.name());
        index.entry(letter).or_default().push(facility);
    }
    for bucket in index.values_mut() {
        bucket.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
        });
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Identity;

    fn facility(name: &str) -> Facility {
        Facility {
            key: name.into(),
            identity: Identity {
                name: name.into(),
                ..Default::default()
            },
            inspections: vec![crate::InspectionRecord {
                facility_key: name.into(),
                date_raw: None,
                date: None,
                kind: None,
                identity: Identity::default(),
                deficiencies: vec![],
                details: vec![],
            }],
        }
    }

    #[test]
    fn letters_and_hash_bucket() {
        assert_eq!(letter_for("Alpha House"), "A");
        assert_eq!(letter_for("zephyr"), "Z");
        assert_eq!(letter_for("3rd Street Shelter"), "#");
        assert_eq!(letter_for("'Ohana Home"), "#");
        assert_eq!(letter_for(""), "#");
    }

    #[test]
    fn buckets_sorted_case_insensitively() {
        let index = index_by_letter(vec![
            facility("delta home"),
            facility("Alpha House"),
            facility("DELTA ANNEX"),
        ]);
        let d_names: Vec<_> = index["D"].iter().map(|f| f.name().to_string()).collect();
        assert_eq!(d_names, vec!["DELTA ANNEX", "delta home"]);
        assert_eq!(index["A"].len(), 1);
    }

    #[test]
    fn every_facility_lands_in_exactly_one_bucket() {
        let names = ["Alpha", "beta", "42nd Street", "", "Gamma"];
        let index = index_by_letter(names.iter().map(|n| facility(n)).collect());
        let total: usize = index.values().map(|b| b.len()).sum();
        assert_eq!(total, names.len());
    }

    #[test]
    fn empty_names_sort_first_in_hash_bucket() {
        let index = index_by_letter(vec![facility("9th Ave"), facility("")]);
        assert_eq!(index["#"][0].name(), "");
    }
}
