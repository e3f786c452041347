//! Display-name casing for facility and administrator names.
//!
//! Source exports ship names in inconsistent all-caps or all-lowercase.
//! The renderer lowercases everything and rebuilds: capitalize each word
//! (delimited by space, hyphen, or slash), keep minor words lowercase
//! unless leading, force known acronyms to uppercase, apply proper-name
//! overrides like McDonald, and keep dotted acronyms (B.W.I.T.) as a unit.

use crate::profile::Profile;
use regex::Regex;
use std::collections::{HashMap, HashSet};

/// Acronyms shared by every jurisdiction; profiles add their own
const BASE_ACRONYMS: &[&str] = &[
    "LLC", "LLP", "INC", "CORP", "CO", "LTD", "MD", "RN", "LPN", "LCSW", "LPA", "LPCC", "LISW",
    "MSW", "BSW", "RD", "CNA", "CMA", "EMT", "LVN", "DON", "CEO", "COO", "CFO", "HR", "IT", "VP",
    "AVP", "USA", "US", "ID", "SSN", "II", "III",
];

/// Words kept lowercase unless they lead the name
const MINOR_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "if", "in", "of", "on", "or", "the", "to",
    "up", "via", "with", "from", "into", "onto", "upon", "over", "under", "above", "below", "is",
];

/// Proper names whose casing a plain capitalize pass would get wrong
const SPECIAL_NAMES: &[(&str, &str)] = &[
    ("mcdonald", "McDonald"),
    ("mcdonalds", "McDonald's"),
    ("mcdowell", "McDowell"),
    ("mccarthy", "McCarthy"),
    ("obrien", "O'Brien"),
    ("oconnor", "O'Connor"),
    ("osullivan", "O'Sullivan"),
    ("mcalister", "McAlister"),
    ("mckays", "McKay's"),
    ("mckinley", "McKinley"),
    ("mckee", "McKee"),
];

/// Title-caser with the acronym/special-name tables of one jurisdiction
pub struct TitleCaser {
    acronyms: HashSet<String>,
    special: HashMap<String, String>,
    minor: HashSet<&'static str>,
    dotted: Regex,
}

impl TitleCaser {
    /// Build a caser from the base tables plus a profile's additions
    pub fn for_profile(profile: &Profile) -> Self {
        Self::with_additions(&profile.acronyms, &profile.special_names)
    }

    /// Base tables only, no jurisdiction additions
    pub fn base() -> Self {
        Self::with_additions(&[], &[])
    }

    fn with_additions(acronym_extra: &[String], special_extra: &[(String, String)]) -> Self {
        let mut acronyms: HashSet<String> =
            BASE_ACRONYMS.iter().map(|s| s.to_string()).collect();
        acronyms.extend(acronym_extra.iter().map(|s| s.to_uppercase()));

        let mut special: HashMap<String, String> = SPECIAL_NAMES
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        special.extend(
            special_extra
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.clone())),
        );

        Self {
            acronyms,
            special,
            minor: MINOR_WORDS.iter().copied().collect(),
            // dotted acronym like b.w.i.t. or b.w.i.t
            dotted: Regex::new(r"(?i)\b[a-z](?:\.[a-z])+\.?").expect("static regex"),
        }
    }

    /// Apply the full casing algorithm to one display string
    pub fn title_case(&self, input: &str) -> String {
        if input.is_empty() {
            return String::new();
        }
        let lower = input.to_lowercase();
        let chars: Vec<char> = lower.chars().collect();
        let mut out = String::with_capacity(lower.len());
        let mut i = 0;
        let mut first_word = true;

        while i < chars.len() {
            if chars[i].is_alphanumeric() {
                let start = i;
                while i < chars.len() && chars[i].is_alphanumeric() {
                    i += 1;
                }
                let run: String = chars[start..i].iter().collect();
                // words directly after an apostrophe ("mcdonald's") keep
                // their case; only space/hyphen/slash starts a new word
                let prev = if start == 0 { None } else { Some(chars[start - 1]) };
                let capitalizable = match prev {
                    None => true,
                    Some(c) => c.is_whitespace() || c == '-' || c == '/',
                };
                out.push_str(&self.cased_word(&run, first_word, capitalizable));
                first_word = false;
            } else {
                out.push(chars[i]);
                i += 1;
            }
        }

        self.dotted
            .replace_all(&out, |caps: &regex::Captures<'_>| caps[0].to_uppercase())
            .into_owned()
    }

    fn cased_word(&self, run: &str, first_word: bool, capitalizable: bool) -> String {
        if let Some(special) = self.special.get(run) {
            return special.clone();
        }
        let upper = run.to_uppercase();
        if self.acronyms.contains(&upper) {
            return upper;
        }
        if !first_word && self.minor.contains(run) {
            return run.to_string();
        }
        if capitalizable {
            capitalize_first(run)
        } else {
            run.to_string()
        }
    }
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caser() -> TitleCaser {
        TitleCaser::base()
    }

    #[test]
    fn special_name_with_possessive() {
        assert_eq!(
            caser().title_case("MCDONALD'S RESIDENTIAL CENTER"),
            "McDonald's Residential Center"
        );
    }

    #[test]
    fn first_word_overrides_minor_word_and_acronym_uppercased() {
        assert_eq!(
            caser().title_case("the willow creek llc"),
            "The Willow Creek LLC"
        );
    }

    #[test]
    fn minor_words_stay_lowercase_mid_name() {
        assert_eq!(
            caser().title_case("HOUSE OF THE RISING SUN"),
            "House of the Rising Sun"
        );
    }

    #[test]
    fn dotted_acronyms_kept_as_unit() {
        assert_eq!(caser().title_case("b.w.i.t. program"), "B.W.I.T. Program");
    }

    #[test]
    fn hyphen_and_slash_delimit_words() {
        assert_eq!(
            caser().title_case("smith-jones home/center"),
            "Smith-Jones Home/Center"
        );
    }

    #[test]
    fn obrien_apostrophe_restored() {
        assert_eq!(caser().title_case("OBRIEN GROUP HOME"), "O'Brien Group Home");
    }

    #[test]
    fn profile_acronyms_extend_base() {
        let caser = TitleCaser::for_profile(&Profile::california());
        assert_eq!(caser.title_case("strtp of fresno"), "STRTP of Fresno");
    }

    #[test]
    fn empty_input() {
        assert_eq!(caser().title_case(""), "");
    }
}
