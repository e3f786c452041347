//! Facwatch: facility inspection report browser CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use facwatch::aggregator::aggregate;
use facwatch::cache::RecordCache;
use facwatch::config::{build_ignore_set, load_config, Config, CONFIG_FILENAME};
use facwatch::indexer::index_by_letter;
use facwatch::loader::{load_all, resolve_sources, LoadResult};
use facwatch::profile::Profile;
use facwatch::reporter::{ConsoleReporter, HtmlReporter, JsonReporter};
use facwatch::titlecase::TitleCaser;
use facwatch::view::{view, ViewState};
use facwatch::watcher::DataWatcher;
use facwatch::SortMode;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Facwatch: facility inspection report aggregator
#[derive(Parser, Debug)]
#[command(name = "facwatch")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Data files, directories, or URLs (defaults to config "sources")
    sources: Vec<String>,

    /// Jurisdiction profile: ca, az, ut, tx, wa, ct
    #[arg(long, short)]
    state: Option<String>,

    /// Show only facilities under this letter (A-Z or #)
    #[arg(long, short)]
    letter: Option<String>,

    /// Filter facilities by a search term
    #[arg(long)]
    search: Option<String>,

    /// Sort mode: name, violations-only, violations-desc, recent-inspection
    #[arg(long)]
    sort: Option<SortMode>,

    /// Write a self-contained HTML report to this file
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,

    /// Output the current view as JSON
    #[arg(long, short)]
    json: bool,

    /// List available letters and facility counts, then exit
    #[arg(long)]
    letters: bool,

    /// Quiet mode (one line per facility)
    #[arg(long, short)]
    quiet: bool,

    /// Verbose output (deficiency text and inspection details)
    #[arg(long, short)]
    verbose: bool,

    /// Path to config file (default: search .facwatchrc.json in current dir and parents)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Watch data sources for changes and re-render
    #[arg(long)]
    watch: bool,

    /// Disable caching (re-parse all files even if unchanged)
    #[arg(long)]
    no_cache: bool,

    /// Clear the record cache before running
    #[arg(long)]
    clear_cache: bool,

    /// Number of parallel threads (default: number of CPU cores)
    #[arg(long, value_name = "N")]
    jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create .facwatchrc.json with sensible defaults
    Init {
        /// Jurisdiction profile to preselect
        #[arg(long)]
        state: Option<String>,

        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    if let Some(Commands::Init { state, dir }) = args.command {
        return run_init(state.as_deref(), dir.as_deref());
    }

    let work_dir = std::env::current_dir().context("Failed to get current directory")?;
    let config = load_config(&work_dir, args.config.as_deref())?;

    let source_specs: Vec<String> = if args.sources.is_empty() {
        config.sources.clone()
    } else {
        args.sources.clone()
    };
    if source_specs.is_empty() {
        anyhow::bail!(
            "no data sources given; pass files/directories or set \"sources\" in {}",
            CONFIG_FILENAME
        );
    }

    let profile = config.resolve_profile(args.state.as_deref())?;

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    if args.watch {
        return run_watch(&args, &config, &profile, &source_specs, &work_dir);
    }

    let mut cache = make_cache(&args, &work_dir);
    if args.clear_cache {
        cache.clear();
        if !args.quiet {
            eprintln!("{}: Cache cleared", "Info".blue());
        }
    }

    let (_result, code) = run_pipeline(&args, &config, &profile, &source_specs, &mut cache)?;

    if let Err(e) = cache.save() {
        if !args.quiet {
            eprintln!("{}: Failed to save cache: {}", "Warning".yellow(), e);
        }
    }

    Ok(code)
}

fn make_cache(args: &Args, work_dir: &Path) -> RecordCache {
    if args.no_cache {
        RecordCache::disabled()
    } else {
        RecordCache::new(work_dir)
    }
}

/// Load, aggregate, and render once. Returns the load result so watch
/// mode can reuse it.
fn run_pipeline(
    args: &Args,
    config: &Config,
    profile: &Profile,
    source_specs: &[String],
    cache: &mut RecordCache,
) -> Result<(LoadResult, ExitCode)> {
    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_ignore_set(&config.ignore)?)
    };

    let sources = resolve_sources(source_specs, ignore_set.as_ref());
    if sources.is_empty() {
        eprintln!("{}: No data files found", "Warning".yellow());
        return Ok((LoadResult::default(), ExitCode::from(2)));
    }

    let result = load_all(&sources, profile, cache);

    if result.summary.all_failed() {
        eprintln!(
            "{}: All {} data sources failed to load",
            "Error".red(),
            result.summary.sources.len()
        );
        for outcome in &result.summary.sources {
            if let Some(ref error) = outcome.error {
                eprintln!("  {}: {}", outcome.source, error);
            }
        }
        return Ok((result, ExitCode::from(1)));
    }

    let facilities = aggregate(result.records.clone());
    let index = index_by_letter(facilities.clone());
    let caser = TitleCaser::for_profile(profile);

    let state = ViewState {
        current_letter: args.letter.as_ref().map(|l| l.to_uppercase()),
        search_term: args.search.clone().unwrap_or_default(),
        sort: args.sort.or(config.sort).unwrap_or_default(),
    };
    let current = view(&index, &state, profile);

    let reporter = if args.verbose {
        ConsoleReporter::new().verbose()
    } else {
        ConsoleReporter::new()
    };

    if args.letters {
        reporter.report_letters(&index);
        return Ok((result, ExitCode::SUCCESS));
    }

    let html_path = args.html.clone().or_else(|| config.output.clone());
    if let Some(ref path) = html_path {
        let html = HtmlReporter::new().report(&facilities, profile, &caser, &result.summary);
        std::fs::write(path, html)
            .with_context(|| format!("Failed to write HTML report to {}", path.display()))?;
        if !args.quiet && !args.json {
            eprintln!(
                "{}: HTML report written to {} ({} facilities)",
                "Info".blue(),
                path.display(),
                facilities.len()
            );
        }
    }

    if args.json {
        println!("{}", JsonReporter::new().pretty().report(&current, &result.summary));
    } else if html_path.is_none() {
        if !args.quiet {
            reporter.report_load_summary(&result.summary);
        }
        if args.quiet {
            reporter.report_quiet(&current, profile, &caser);
        } else {
            reporter.report(&current, profile, &caser);
        }
    }

    Ok((result, ExitCode::SUCCESS))
}

fn run_init(state: Option<&str>, dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let profile_value = match state.map(str::to_lowercase) {
        Some(s) if Profile::builtin(&s).is_some() => s,
        Some(other) => anyhow::bail!(
            "unknown profile '{}' (built-ins: {})",
            other,
            Profile::builtin_names().join(", ")
        ),
        None => "ca".to_string(),
    };

    let json = format!(
        r#"{{
  "profile": "{}",
  "sources": ["data"],
  "ignore": [
    "**/archive/**",
    "**/.facwatch-cache.json"
  ],
  "sort": "name",
  "acronyms": [],
  "specialNames": {{}}
}}
"#,
        profile_value
    );

    std::fs::write(&config_path, json)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    println!(
        "{}: Created {} with profile={}",
        "Done".green().bold(),
        config_path.display(),
        profile_value
    );
    Ok(ExitCode::SUCCESS)
}

fn run_watch(
    args: &Args,
    config: &Config,
    profile: &Profile,
    source_specs: &[String],
    work_dir: &Path,
) -> Result<ExitCode> {
    let mut cache = make_cache(args, work_dir);
    if args.clear_cache {
        cache.clear();
    }

    // Initial render before waiting for changes
    run_pipeline(args, config, profile, source_specs, &mut cache)?;
    if let Err(e) = cache.save() {
        if !args.quiet {
            eprintln!("{}: Failed to save cache: {}", "Warning".yellow(), e);
        }
    }

    let watch_paths: Vec<PathBuf> = source_specs
        .iter()
        .filter(|s| !s.starts_with("http://") && !s.starts_with("https://"))
        .map(PathBuf::from)
        .collect();
    if watch_paths.is_empty() {
        anyhow::bail!("--watch requires at least one local file or directory source");
    }

    let watcher = DataWatcher::watch(&watch_paths).context("Failed to create file watcher")?;
    eprintln!("{}: Watching for changes... (Ctrl+C to stop)", "Info".blue());

    loop {
        let changed = watcher.next_changes();
        if changed.is_empty() {
            continue;
        }
        if !args.quiet {
            eprintln!(
                "{}: {} data file(s) changed, reloading",
                "Info".blue(),
                changed.len()
            );
        }
        run_pipeline(args, config, profile, source_specs, &mut cache)?;
        if let Err(e) = cache.save() {
            if !args.quiet {
                eprintln!("{}: Failed to save cache: {}", "Warning".yellow(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_pipeline_flags() {
        let args = Args::parse_from([
            "facwatch",
            "data/ca",
            "--state",
            "ca",
            "--letter",
            "b",
            "--sort",
            "violations-desc",
            "--json",
        ]);
        assert_eq!(args.sources, vec!["data/ca".to_string()]);
        assert_eq!(args.state.as_deref(), Some("ca"));
        assert_eq!(args.letter.as_deref(), Some("b"));
        assert_eq!(args.sort, Some(SortMode::ViolationsDesc));
        assert!(args.json);
    }

    #[test]
    fn cli_rejects_unknown_sort() {
        assert!(Args::try_parse_from(["facwatch", "data", "--sort", "sideways"]).is_err());
    }

    #[test]
    fn init_subcommand_parses() {
        let args = Args::parse_from(["facwatch", "init", "--state", "wa"]);
        match args.command {
            Some(Commands::Init { state, .. }) => assert_eq!(state.as_deref(), Some("wa")),
            other => panic!("expected init, got {:?}", other),
        }
    }
}
