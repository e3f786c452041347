//! Data loading: reads raw inspection exports and normalizes them.
//!
//! Sources are local JSON files, directories of them, or (with the fetch
//! feature) HTTP URLs. A failing source never aborts the run; it is
//! recorded in the LoadSummary and the pipeline proceeds with whatever
//! loaded, so the reporters can distinguish "nothing matched" from
//! "nothing loaded".

use crate::cache::RecordCache;
use crate::profile::Profile;
use crate::{parse_inspection_date, Deficiency, Identity, InspectionRecord};
use globset::GlobSet;
use rayon::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Why one source produced no records
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },
    #[error("remote source {url} requires building with the fetch feature")]
    FetchUnavailable { url: String },
}

/// One data source to load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl Source {
    pub fn label(&self) -> String {
        match self {
            Source::File(p) => p.display().to_string(),
            Source::Url(u) => u.clone(),
        }
    }
}

/// Per-source outcome for the load summary
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceOutcome {
    pub source: String,
    pub records: usize,
    pub error: Option<String>,
}

/// What happened during loading, for diagnostics and reporters
#[derive(Debug, Clone, Default, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    pub sources: Vec<SourceOutcome>,
    /// Raw records seen across all sources that loaded
    pub records_seen: usize,
    /// Records silently dropped for a missing/empty facility key
    pub records_dropped: usize,
}

impl LoadSummary {
    pub fn sources_failed(&self) -> usize {
        self.sources.iter().filter(|s| s.error.is_some()).count()
    }

    /// True when at least one source was configured and every one failed
    pub fn all_failed(&self) -> bool {
        !self.sources.is_empty() && self.sources_failed() == self.sources.len()
    }
}

/// Everything the loader produced
#[derive(Debug, Default)]
pub struct LoadResult {
    pub records: Vec<InspectionRecord>,
    pub summary: LoadSummary,
}

/// Expand source specs: directories become their .json files (sorted,
/// ignore patterns applied), http(s) strings become URL sources.
pub fn resolve_sources(specs: &[String], ignore: Option<&GlobSet>) -> Vec<Source> {
    let mut sources = Vec::new();
    for spec in specs {
        if spec.starts_with("http://") || spec.starts_with("https://") {
            sources.push(Source::Url(spec.clone()));
            continue;
        }
        let path = PathBuf::from(spec);
        if path.is_dir() {
            sources.extend(collect_data_files(&path, ignore).into_iter().map(Source::File));
        } else {
            sources.push(Source::File(path));
        }
    }
    sources
}

/// Collect .json data files under a directory
pub fn collect_data_files(dir: &Path, ignore: Option<&GlobSet>) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .filter(|p| ignore.map(|set| !set.is_match(p)).unwrap_or(true))
        .collect();
    files.sort();
    files
}

/// Load every source, normalize records per the profile, and merge.
///
/// File parsing runs on the rayon pool when there are enough files to be
/// worth it; URL sources are fetched sequentially.
pub fn load_all(sources: &[Source], profile: &Profile, cache: &mut RecordCache) -> LoadResult {
    let (files, urls): (Vec<_>, Vec<_>) = sources
        .iter()
        .cloned()
        .partition(|s| matches!(s, Source::File(_)));

    let mut result = if files.len() > 4 {
        load_files_parallel(&files, profile, cache)
    } else {
        load_files_sequential(&files, profile, cache)
    };

    for url_source in urls {
        let Source::Url(url) = url_source else {
            continue;
        };
        match fetch_document(&url) {
            Ok(doc) => {
                let (records, dropped) = normalize_document(&doc, profile);
                result.summary.records_seen += records.len() + dropped;
                result.summary.records_dropped += dropped;
                result.summary.sources.push(SourceOutcome {
                    source: url,
                    records: records.len(),
                    error: None,
                });
                result.records.extend(records);
            }
            Err(e) => result.summary.sources.push(SourceOutcome {
                source: url,
                records: 0,
                error: Some(e.to_string()),
            }),
        }
    }

    result
}

#[cfg(feature = "fetch")]
fn fetch_document(url: &str) -> Result<Value, LoadError> {
    crate::fetch::fetch_json(url)
}

#[cfg(not(feature = "fetch"))]
fn fetch_document(url: &str) -> Result<Value, LoadError> {
    Err(LoadError::FetchUnavailable {
        url: url.to_string(),
    })
}

fn load_files_sequential(
    files: &[Source],
    profile: &Profile,
    cache: &mut RecordCache,
) -> LoadResult {
    let mut result = LoadResult::default();
    for source in files {
        let Source::File(path) = source else { continue };
        match load_one_file(path, profile, &mut *cache) {
            Ok((records, dropped)) => {
                result.summary.records_seen += records.len() + dropped;
                result.summary.records_dropped += dropped;
                result.summary.sources.push(SourceOutcome {
                    source: path.display().to_string(),
                    records: records.len(),
                    error: None,
                });
                result.records.extend(records);
            }
            Err(e) => result.summary.sources.push(SourceOutcome {
                source: path.display().to_string(),
                records: 0,
                error: Some(e.to_string()),
            }),
        }
    }
    result
}

/// Parallel variant: the cache is read-only here, matching how the
/// sequential path is the only writer.
fn load_files_parallel(files: &[Source], profile: &Profile, cache: &RecordCache) -> LoadResult {
    let outcomes: Vec<_> = files
        .par_iter()
        .filter_map(|source| {
            let Source::File(path) = source else {
                return None;
            };
            Some(match load_one_file_readonly(path, profile, cache) {
                Ok((records, dropped)) => (path.clone(), Ok((records, dropped))),
                Err(e) => (path.clone(), Err(e)),
            })
        })
        .collect();

    let mut result = LoadResult::default();
    for (path, outcome) in outcomes {
        match outcome {
            Ok((records, dropped)) => {
                result.summary.records_seen += records.len() + dropped;
                result.summary.records_dropped += dropped;
                result.summary.sources.push(SourceOutcome {
                    source: path.display().to_string(),
                    records: records.len(),
                    error: None,
                });
                result.records.extend(records);
            }
            Err(e) => result.summary.sources.push(SourceOutcome {
                source: path.display().to_string(),
                records: 0,
                error: Some(e.to_string()),
            }),
        }
    }
    result
}

fn load_one_file(
    path: &Path,
    profile: &Profile,
    cache: &mut RecordCache,
) -> Result<(Vec<InspectionRecord>, usize), LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    if let Some(hit) = cache.get(path, &content, &profile.name) {
        return Ok(hit);
    }
    let doc: Value = serde_json::from_str(&content).map_err(|e| LoadError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    let (records, dropped) = normalize_document(&doc, profile);
    cache.set(path, &content, &profile.name, &records, dropped);
    Ok((records, dropped))
}

fn load_one_file_readonly(
    path: &Path,
    profile: &Profile,
    cache: &RecordCache,
) -> Result<(Vec<InspectionRecord>, usize), LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    if let Some(hit) = cache.get(path, &content, &profile.name) {
        return Ok(hit);
    }
    let doc: Value = serde_json::from_str(&content).map_err(|e| LoadError::Json {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(normalize_document(&doc, profile))
}

/// Normalize one JSON document into inspection records.
///
/// Returns the records plus the count of raw records dropped for a
/// missing facility key. Documents that are neither a record array nor
/// hold one at the profile's records path yield zero records.
pub fn normalize_document(doc: &Value, profile: &Profile) -> (Vec<InspectionRecord>, usize) {
    let records_value = match profile.records_path {
        Some(ref path) => json_path(doc, path),
        None => Some(doc),
    };
    let Some(raw_records) = records_value.and_then(Value::as_array) else {
        return (Vec::new(), 0);
    };

    let mut out = Vec::new();
    let mut dropped = 0usize;
    for raw in raw_records {
        let Some(key) = first_string(raw, &profile.key_fields) else {
            dropped += count_inspections(raw, profile);
            continue;
        };
        let identity = extract_identity(raw, &key, profile);

        match profile.inspections_path {
            Some(ref path) => {
                let Some(inspections) = json_path(raw, path).and_then(Value::as_array) else {
                    continue;
                };
                for inspection in inspections {
                    out.push(normalize_inspection(inspection, &key, &identity, profile));
                }
            }
            None => out.push(normalize_inspection(raw, &key, &identity, profile)),
        }
    }
    (out, dropped)
}

/// How many inspection rows a keyless raw record represents
fn count_inspections(raw: &Value, profile: &Profile) -> usize {
    match profile.inspections_path {
        Some(ref path) => json_path(raw, path)
            .and_then(Value::as_array)
            .map(|a| a.len())
            .unwrap_or(0),
        None => 1,
    }
}

fn normalize_inspection(
    inspection: &Value,
    key: &str,
    identity: &Identity,
    profile: &Profile,
) -> InspectionRecord {
    let date_raw = first_string(inspection, &profile.date_fields);
    let date = date_raw.as_deref().and_then(parse_inspection_date);
    let kind = first_string(inspection, &profile.type_fields);

    let deficiencies = json_path(inspection, &profile.deficiency_path)
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(|e| normalize_deficiency(e, profile)).collect())
        .unwrap_or_default();

    let details = profile
        .inspection_details
        .iter()
        .filter_map(|d| {
            json_path(inspection, &d.field)
                .and_then(value_to_string)
                .map(|v| (d.label.clone(), v))
        })
        .collect();

    InspectionRecord {
        facility_key: key.to_string(),
        date_raw,
        date,
        kind,
        identity: identity.clone(),
        deficiencies,
        details,
    }
}

fn normalize_deficiency(entry: &Value, profile: &Profile) -> Deficiency {
    if !entry.is_object() {
        // some exports list bare strings for findings
        return Deficiency {
            description: value_to_string(entry),
            ..Default::default()
        };
    }
    Deficiency {
        kind: first_string(entry, &profile.deficiency_fields.kind),
        citation: first_string(entry, &profile.deficiency_fields.citation),
        description: first_string(entry, &profile.deficiency_fields.description),
        correction: first_string(entry, &profile.deficiency_fields.correction),
    }
}

fn extract_identity(raw: &Value, key: &str, profile: &Profile) -> Identity {
    let name = first_string(raw, &profile.name_fields)
        .unwrap_or_else(|| format!("{} #{}", profile.fallback_name_prefix, key));
    Identity {
        name,
        address: first_string(raw, &profile.identity.address),
        administrator: first_string(raw, &profile.identity.administrator),
        capacity: first_string(raw, &profile.identity.capacity),
        status: first_string(raw, &profile.identity.status),
        facility_type: first_string(raw, &profile.identity.facility_type),
        phone: first_string(raw, &profile.identity.phone),
    }
}

/// First non-empty value along a field fallback chain
fn first_string(value: &Value, fields: &[String]) -> Option<String> {
    fields
        .iter()
        .filter_map(|f| json_path(value, f))
        .find_map(value_to_string)
}

/// Dotted-path lookup into a JSON object tree
fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current)
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
