//! Reporter module for output formatting

pub mod console;
pub mod html;
pub mod json;

pub use console::ConsoleReporter;
pub use html::HtmlReporter;
pub use json::JsonReporter;

/// The message shown when a search turns up nothing.
pub const NO_SEARCH_RESULTS: &str = "No facilities found matching your search.";

/// Render the empty-letter message for a given letter label.
pub fn no_letter_results(letter: &str) -> String {
    format!("No facilities found for the letter \"{}\".", letter)
}

/// Render the search hit-count banner.
pub fn search_count_banner(count: usize) -> String {
    format!("Found {} facilities matching your search", count)
}

/// Fallback label for an inspection whose kind is missing.
pub fn inspection_label(kind: Option<&str>) -> &str {
    match kind {
        Some(k) if !k.trim().is_empty() => k,
        _ => "Inspection",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_letter_message_quotes_the_letter() {
        assert_eq!(
            no_letter_results("B"),
            "No facilities found for the letter \"B\"."
        );
    }

    #[test]
    fn banner_includes_count() {
        assert_eq!(
            search_count_banner(3),
            "Found 3 facilities matching your search"
        );
    }

    #[test]
    fn blank_kind_falls_back() {
        assert_eq!(inspection_label(None), "Inspection");
        assert_eq!(inspection_label(Some("  ")), "Inspection");
        assert_eq!(inspection_label(Some("Annual")), "Annual");
    }
}
