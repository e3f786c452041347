//! Console reporter with colored output

use crate::loader::LoadSummary;
use crate::profile::{Profile, ViolationRule};
use crate::reporter::{inspection_label, no_letter_results, search_count_banner, NO_SEARCH_RESULTS};
use crate::titlecase::TitleCaser;
use crate::view::{count_violations, entry_counts, inspection_has_violations, ViewResult};
use crate::{Facility, InspectionRecord, LetterIndex};
use colored::Colorize;

/// Reporter for terminal output
pub struct ConsoleReporter {
    /// Whether to show deficiency detail under each inspection
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a new console reporter
    pub fn new() -> Self {
        Self { verbose: false }
    }

    /// Enable verbose output
    pub fn verbose(mut self) -> Self {
        self.verbose = true;
        self
    }

    /// Report the current view
    pub fn report(&self, view: &ViewResult, profile: &Profile, caser: &TitleCaser) {
        self.print_header(view);

        if view.facilities.is_empty() {
            let message = if view.is_search {
                NO_SEARCH_RESULTS.to_string()
            } else {
                no_letter_results(&view.context_label)
            };
            println!("   {}", message.yellow());
            println!();
            return;
        }

        if view.is_search {
            println!(
                "   {}",
                search_count_banner(view.facilities.len()).dimmed()
            );
            println!();
        }

        for facility in &view.facilities {
            self.print_facility(facility, profile, caser);
        }
    }

    /// Report in quiet mode (one line per facility)
    pub fn report_quiet(&self, view: &ViewResult, profile: &Profile, caser: &TitleCaser) {
        for facility in &view.facilities {
            println!(
                "{}: {} inspections, {} violations",
                caser.title_case(facility.name()),
                facility.inspections.len(),
                count_violations(facility, profile.violation_rule)
            );
        }
    }

    /// List the letters that have at least one facility
    pub fn report_letters(&self, index: &LetterIndex) {
        println!();
        println!("{}", "Available letters:".bold());
        for (letter, facilities) in index {
            println!(
                "   {} {}",
                letter.bold(),
                format!("({} facilities)", facilities.len()).dimmed()
            );
        }
        println!();
    }

    /// Print per-source warnings for whatever went wrong during loading
    pub fn report_load_summary(&self, summary: &LoadSummary) {
        for outcome in &summary.sources {
            if let Some(ref error) = outcome.error {
                eprintln!(
                    "{} {}: {}",
                    "Warning:".yellow().bold(),
                    outcome.source,
                    error
                );
            }
        }
        if summary.records_dropped > 0 {
            eprintln!(
                "{} {} records skipped (no usable facility key)",
                "Warning:".yellow().bold(),
                summary.records_dropped
            );
        }
    }

    fn print_header(&self, view: &ViewResult) {
        println!();
        if view.is_search {
            println!("{}", "🔍 Search Results".bold());
        } else {
            println!(
                "{}",
                format!("📋 Facilities — {}", view.context_label).bold()
            );
        }
        println!();
    }

    fn print_facility(&self, facility: &Facility, profile: &Profile, caser: &TitleCaser) {
        println!(
            "   {} {}",
            caser.title_case(facility.name()).bold(),
            format!("({} {})", profile.key_label, facility.key).dimmed()
        );

        if let Some(ref address) = facility.identity.address {
            println!("      {}", address);
        }
        if let Some(ref admin) = facility.identity.administrator {
            println!("      Administrator: {}", caser.title_case(admin));
        }
        if let Some(ref kind) = facility.identity.facility_type {
            println!("      Type: {}", kind);
        }
        if let Some(ref capacity) = facility.identity.capacity {
            println!("      Capacity: {}", capacity);
        }
        if let Some(ref phone) = facility.identity.phone {
            println!("      Phone: {}", phone);
        }
        if let Some(ref status) = facility.identity.status {
            println!("      Status: {}", status);
        }

        for inspection in &facility.inspections {
            self.print_inspection(inspection, profile.violation_rule);
        }
        println!();
    }

    fn print_inspection(&self, inspection: &InspectionRecord, rule: ViolationRule) {
        let date = inspection
            .date_raw
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or("Unknown date");
        let label = inspection_label(inspection.kind.as_deref());
        let count = inspection
            .deficiencies
            .iter()
            .filter(|d| entry_counts(d, rule))
            .count();

        let count_str = if inspection_has_violations(inspection, rule) {
            format!("{} deficiencies", count).red().to_string()
        } else {
            "no violations noted".green().to_string()
        };
        println!("      {} {} — {}", date.cyan(), label, count_str);

        if self.verbose {
            for deficiency in inspection
                .deficiencies
                .iter()
                .filter(|d| entry_counts(d, rule))
            {
                if let Some(ref description) = deficiency.description {
                    println!("         {} {}", "→".dimmed(), description);
                }
            }
            for (label, value) in &inspection.details {
                println!("         {} {}", format!("{}:", label).dimmed(), value);
            }
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}
