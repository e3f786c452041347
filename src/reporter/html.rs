//! HTML reporter: generates a self-contained facility browser page
//!
//! Embeds the aggregated facilities as JSON and renders everything
//! client-side with vanilla JS: an A–Z letter bar, live search over the
//! configured fields, and the same sort modes the CLI offers.

use crate::indexer::letter_for;
use crate::loader::LoadSummary;
use crate::profile::{Profile, SearchField};
use crate::reporter::inspection_label;
use crate::titlecase::TitleCaser;
use crate::view::{entry_counts, inspection_has_violations};
use crate::Facility;
use serde::Serialize;

/// Escapes a string for embedding inside a script block
fn escape_json_for_script(s: &str) -> String {
    // serde_json already escapes quotes/backslashes; we just need to ensure
    // no </script> can appear inside the block.
    s.replace("</script>", "<\\/script>")
}

/// Escapes text interpolated directly into markup
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Reporter that generates a self-contained HTML page
pub struct HtmlReporter;

/// Per-deficiency struct for the JSON payload
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsDeficiency {
    citation: Option<String>,
    description: Option<String>,
    correction: Option<String>,
}

/// Per-inspection struct for the JSON payload
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsInspection {
    date: String,
    sort_date: String,
    label: String,
    has_violations: bool,
    violation_count: usize,
    deficiencies: Vec<JsDeficiency>,
    details: Vec<(String, String)>,
}

/// Per-facility struct for the JSON payload (names pre-title-cased)
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsFacility {
    name: String,
    key: String,
    letter: String,
    address: Option<String>,
    administrator: Option<String>,
    facility_type: Option<String>,
    status: Option<String>,
    capacity: Option<String>,
    phone: Option<String>,
    inspections: Vec<JsInspection>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsConfig {
    key_label: String,
    search_fields: Vec<&'static str>,
    sources_failed: usize,
    sources_total: usize,
}

impl HtmlReporter {
    pub fn new() -> Self {
        Self
    }

    /// Generate the full HTML page from the complete facility list
    pub fn report(
        &self,
        facilities: &[Facility],
        profile: &Profile,
        caser: &TitleCaser,
        summary: &LoadSummary,
    ) -> String {
        let js_facilities: Vec<JsFacility> = facilities
            .iter()
            .map(|f| self.to_js_facility(f, profile, caser))
            .collect();
        let data_json =
            serde_json::to_string(&js_facilities).unwrap_or_else(|_| "[]".to_string());

        let config = JsConfig {
            key_label: profile.key_label.clone(),
            search_fields: profile
                .search_fields
                .iter()
                .map(|f| match f {
                    SearchField::Name => "name",
                    SearchField::Key => "key",
                    SearchField::Address => "address",
                    SearchField::Administrator => "administrator",
                    SearchField::FacilityType => "facilityType",
                    SearchField::Status => "status",
                })
                .collect(),
            sources_failed: summary.sources_failed(),
            sources_total: summary.sources.len(),
        };
        let config_json = serde_json::to_string(&config).unwrap_or_else(|_| "{}".to_string());

        let mut html = String::with_capacity(32_768);
        html.push_str(Self::template_head());
        html.push_str("<script>const DATA=");
        html.push_str(&escape_json_for_script(&data_json));
        html.push_str(";const CONFIG=");
        html.push_str(&escape_json_for_script(&config_json));
        html.push_str(";</script>\n");
        html.push_str(&Self::template_body(&profile.name));
        html.push_str(Self::template_script());
        html.push_str("</body>\n</html>");
        html
    }

    fn to_js_facility(
        &self,
        facility: &Facility,
        profile: &Profile,
        caser: &TitleCaser,
    ) -> JsFacility {
        let inspections = facility
            .inspections
            .iter()
            .map(|i| {
                let date = i
                    .date_raw
                    .as_deref()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or("Unknown date")
                    .to_string();
                // Placeholder entries never reach the page, so the badge
                // count always equals the number of cards rendered.
                let deficiencies: Vec<JsDeficiency> = i
                    .deficiencies
                    .iter()
                    .filter(|d| entry_counts(d, profile.violation_rule))
                    .map(|d| JsDeficiency {
                        citation: d.citation.clone(),
                        description: d.description.clone(),
                        correction: d.correction.clone(),
                    })
                    .collect();
                JsInspection {
                    date,
                    sort_date: i.sort_date().to_string(),
                    label: inspection_label(i.kind.as_deref()).to_string(),
                    has_violations: inspection_has_violations(i, profile.violation_rule),
                    violation_count: deficiencies.len(),
                    deficiencies,
                    details: i.details.clone(),
                }
            })
            .collect();

        JsFacility {
            name: caser.title_case(facility.name()),
            key: facility.key.clone(),
            letter: letter_for(facility.name()),
            address: facility.identity.address.clone(),
            administrator: facility
                .identity
                .administrator
                .as_deref()
                .map(|a| caser.title_case(a)),
            facility_type: facility.identity.facility_type.clone(),
            status: facility.identity.status.clone(),
            capacity: facility.identity.capacity.clone(),
            phone: facility.identity.phone.clone(),
            inspections,
        }
    }

    // ─── HTML template pieces ────────────────────────────────────────────

    fn template_head() -> &'static str {
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Facility Inspection Reports</title>
<style>
:root{--bg:#f6f7f9;--surface:#ffffff;--border:#d9dde3;--text:#1f2430;--muted:#6b7280;--accent:#1d4ed8;--green:#15803d;--red:#b91c1c;--radius:8px}
*{box-sizing:border-box;margin:0;padding:0}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Oxygen,sans-serif;background:var(--bg);color:var(--text);line-height:1.5}
header{padding:1.25rem 1.5rem;border-bottom:1px solid var(--border);background:var(--surface)}
header h1{font-size:1.25rem}
header .meta{font-size:.8125rem;color:var(--muted)}
.banner{margin:1rem 1.5rem 0;padding:.625rem .875rem;border-radius:var(--radius);background:#fef3c7;border:1px solid #f59e0b;font-size:.8125rem}
.controls{display:flex;gap:.75rem;flex-wrap:wrap;align-items:center;padding:1rem 1.5rem}
#searchInput{background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);padding:.5rem .75rem;font-size:.875rem;width:260px;outline:none}
#searchInput:focus{border-color:var(--accent)}
#sortBy{background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);padding:.45rem .6rem;font-size:.875rem;cursor:pointer}
#clearSearch{border:1px solid var(--border);border-radius:var(--radius);background:var(--surface);padding:.45rem .8rem;font-size:.8125rem;cursor:pointer;display:none}
#alphabet-filter{display:flex;flex-wrap:wrap;gap:4px;padding:0 1.5rem .75rem}
#alphabet-filter button{border:1px solid var(--border);border-radius:6px;background:var(--surface);padding:.3rem .6rem;font-size:.8125rem;font-weight:600;cursor:pointer;color:var(--muted)}
#alphabet-filter button.active{background:var(--accent);border-color:var(--accent);color:#fff}
#alphabet-filter button:disabled{opacity:.35;cursor:default}
#report-container{padding:0 1.5rem 2rem;max-width:960px}
.result-count{font-size:.8125rem;color:var(--muted);margin-bottom:.75rem}
.empty-state{padding:2rem 0;color:var(--muted);font-size:.9375rem}
details.facility{background:var(--surface);border:1px solid var(--border);border-radius:var(--radius);margin-bottom:.625rem;overflow:hidden}
details.facility>summary{padding:.75rem 1rem;cursor:pointer;list-style:none;display:flex;justify-content:space-between;gap:1rem;align-items:baseline}
details.facility>summary::-webkit-details-marker{display:none}
.facility-name{font-weight:600}
.facility-key{font-size:.75rem;color:var(--muted);white-space:nowrap}
.facility-body{padding:0 1rem 1rem;border-top:1px solid var(--border)}
.identity{font-size:.8125rem;color:var(--muted);padding:.625rem 0}
.identity div{margin-bottom:2px}
details.inspection{border:1px solid var(--border);border-radius:6px;margin-bottom:.5rem}
details.inspection>summary{padding:.5rem .75rem;cursor:pointer;font-size:.875rem;display:flex;gap:.75rem;align-items:baseline}
.inspection-date{font-weight:600}
.violation-count{font-size:.75rem;color:var(--red)}
.clean{font-size:.75rem;color:var(--green)}
.inspection-body{padding:.25rem .75rem .75rem;font-size:.8125rem}
.detail-line{color:var(--muted);margin-bottom:2px}
.deficiency{border-left:3px solid var(--red);padding:.375rem .625rem;margin:.5rem 0;background:#fef2f2;border-radius:0 6px 6px 0}
.deficiency .citation{font-weight:600;font-size:.75rem}
.deficiency .correction{color:var(--muted);margin-top:2px}
.no-violations{color:var(--green);padding:.375rem 0}
</style>
</head>
<body>
"##
    }

    fn template_body(profile_name: &str) -> String {
        let mut body = String::new();
        body.push_str("<header>\n<h1>Facility Inspection Reports</h1>\n<div class=\"meta\">");
        body.push_str(&escape_html(profile_name));
        body.push_str("</div>\n</header>\n");
        body.push_str(
            r#"<div id="load-banner"></div>
<div class="controls">
<input type="text" id="searchInput" placeholder="Search facilities...">
<select id="sortBy">
<option value="none">Sort: none</option>
<option value="name">Name (A–Z)</option>
<option value="violations-only">Violations only</option>
<option value="violations-desc">Most violations first</option>
<option value="recent-inspection">Most recent inspection</option>
</select>
<button id="clearSearch">Clear</button>
</div>
<div id="alphabet-filter"></div>
<div id="report-container"></div>
"#,
        );
        body
    }

    fn template_script() -> &'static str {
        r#"<script>
const esc = s => String(s ?? '').replace(/&/g,'&amp;').replace(/</g,'&lt;').replace(/>/g,'&gt;').replace(/"/g,'&quot;');
const state = { letter: null, term: '', sort: 'none', savedLetter: null };

const letters = [...new Set(DATA.map(f => f.letter))].sort();
const index = {};
for (const f of DATA) (index[f.letter] ||= []).push(f);
for (const l of letters) index[l].sort((a, b) => a.name.toLowerCase().localeCompare(b.name.toLowerCase()));

function violationCount(f) {
  return f.inspections.reduce((n, i) => n + (i.hasViolations ? i.violationCount : 0), 0);
}

function matches(f, term) {
  return CONFIG.searchFields.some(field => (f[field] || '').toLowerCase().includes(term));
}

function currentFacilities() {
  const term = state.term.trim().toLowerCase();
  if (term) return DATA.filter(f => matches(f, term));
  if (!state.letter || !index[state.letter]) state.letter = letters[0] || null;
  return state.letter ? [...index[state.letter]] : [];
}

function applySort(facilities) {
  let list = facilities.map(f => ({ ...f }));
  if (state.sort === 'violations-only' || state.sort === 'violations-desc') {
    list = list
      .map(f => ({ ...f, inspections: f.inspections.filter(i => i.hasViolations) }))
      .filter(f => f.inspections.length > 0);
  }
  if (state.sort === 'name' || state.sort === 'violations-only') {
    list.sort((a, b) => a.name.toLowerCase().localeCompare(b.name.toLowerCase()));
  } else if (state.sort === 'violations-desc') {
    list.sort((a, b) => violationCount(b) - violationCount(a));
  } else if (state.sort === 'recent-inspection') {
    const latest = f => f.inspections.reduce((m, i) => i.sortDate > m ? i.sortDate : m, '');
    list.sort((a, b) => latest(b).localeCompare(latest(a)));
  }
  return list;
}

function renderDeficiency(d) {
  let html = '<div class="deficiency">';
  if (d.citation) html += `<div class="citation">${esc(d.citation)}</div>`;
  if (d.description) html += `<div>${esc(d.description)}</div>`;
  if (d.correction) html += `<div class="correction">Plan of correction: ${esc(d.correction)}</div>`;
  return html + '</div>';
}

function renderInspection(i) {
  const badge = i.hasViolations
    ? `<span class="violation-count">${i.violationCount} deficiencies</span>`
    : '<span class="clean">no violations</span>';
  let html = `<details class="inspection"><summary><span class="inspection-date">${esc(i.date)}</span><span>${esc(i.label)}</span>${badge}</summary><div class="inspection-body">`;
  for (const [label, value] of i.details) html += `<div class="detail-line">${esc(label)}: ${esc(value)}</div>`;
  if (i.hasViolations) {
    html += i.deficiencies.map(renderDeficiency).join('');
  } else {
    html += '<div class="no-violations">No violations noted in this inspection.</div>';
  }
  return html + '</div></details>';
}

function renderFacility(f) {
  const identity = [
    f.address && `<div>${esc(f.address)}</div>`,
    f.administrator && `<div>Administrator: ${esc(f.administrator)}</div>`,
    f.facilityType && `<div>Type: ${esc(f.facilityType)}</div>`,
    f.status && `<div>Status: ${esc(f.status)}</div>`,
    f.capacity && `<div>Capacity: ${esc(f.capacity)}</div>`,
    f.phone && `<div>Phone: ${esc(f.phone)}</div>`,
  ].filter(Boolean).join('');
  return `<details class="facility"><summary><span class="facility-name">${esc(f.name)}</span><span class="facility-key">${esc(CONFIG.keyLabel)} ${esc(f.key)}</span></summary><div class="facility-body"><div class="identity">${identity}</div>${f.inspections.map(renderInspection).join('')}</div></details>`;
}

function render() {
  const container = document.getElementById('report-container');
  const searching = state.term.trim() !== '';
  const facilities = applySort(currentFacilities());

  document.getElementById('clearSearch').style.display = searching ? 'inline-block' : 'none';

  if (facilities.length === 0) {
    const message = searching
      ? 'No facilities found matching your search.'
      : `No facilities found for the letter "${esc(state.letter || '')}".`;
    container.innerHTML = `<div class="empty-state">${message}</div>`;
  } else {
    let html = '';
    if (searching) html = `<div class="result-count">Found ${facilities.length} facilities matching your search</div>`;
    container.innerHTML = html + facilities.map(renderFacility).join('');
  }
  renderAlphabet(searching);
}

function renderAlphabet(searching) {
  const bar = document.getElementById('alphabet-filter');
  const all = ['#', ...'ABCDEFGHIJKLMNOPQRSTUVWXYZ'];
  bar.innerHTML = all.map(l => {
    const exists = letters.includes(l);
    const active = !searching && l === state.letter;
    return `<button data-letter="${l}"${exists ? '' : ' disabled'}${active ? ' class="active"' : ''}>${l}</button>`;
  }).join('');
}

document.getElementById('alphabet-filter').addEventListener('click', e => {
  const letter = e.target.dataset?.letter;
  if (!letter || !letters.includes(letter)) return;
  state.letter = letter;
  state.term = '';
  document.getElementById('searchInput').value = '';
  render();
});

document.getElementById('searchInput').addEventListener('input', e => {
  const was = state.term.trim() === '';
  if (was && e.target.value.trim() !== '') state.savedLetter = state.letter;
  state.term = e.target.value;
  if (state.term.trim() === '' && state.savedLetter) state.letter = state.savedLetter;
  render();
});

document.getElementById('clearSearch').addEventListener('click', () => {
  state.term = '';
  document.getElementById('searchInput').value = '';
  if (state.savedLetter) state.letter = state.savedLetter;
  render();
});

document.getElementById('sortBy').addEventListener('change', e => {
  state.sort = e.target.value;
  render();
});

if (CONFIG.sourcesFailed > 0) {
  document.getElementById('load-banner').innerHTML =
    `<div class="banner">${CONFIG.sourcesFailed} of ${CONFIG.sourcesTotal} data sources failed to load; results may be incomplete.</div>`;
}

render();
</script>
"#
    }
}

impl Default for HtmlReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_inspection_date, Deficiency, Identity, InspectionRecord};

    fn sample_facility(name: &str) -> Facility {
        Facility {
            key: "42".into(),
            identity: Identity {
                name: name.into(),
                address: Some("1 Main St".into()),
                ..Default::default()
            },
            inspections: vec![InspectionRecord {
                facility_key: "42".into(),
                date_raw: Some("2024-06-01".into()),
                date: parse_inspection_date("2024-06-01"),
                kind: Some("Annual".into()),
                identity: Identity::default(),
                deficiencies: vec![Deficiency {
                    description: Some("Broken <alarm>".into()),
                    ..Default::default()
                }],
                details: vec![],
            }],
        }
    }

    fn render(facilities: &[Facility]) -> String {
        let profile = Profile::california();
        let caser = TitleCaser::for_profile(&profile);
        HtmlReporter::new().report(facilities, &profile, &caser, &LoadSummary::default())
    }

    #[test]
    fn page_has_expected_dom_hooks() {
        let html = render(&[sample_facility("ALPHA HOUSE")]);
        for id in [
            "id=\"report-container\"",
            "id=\"alphabet-filter\"",
            "id=\"searchInput\"",
            "id=\"sortBy\"",
            "id=\"clearSearch\"",
        ] {
            assert!(html.contains(id), "missing {}", id);
        }
    }

    #[test]
    fn facility_names_are_title_cased_in_payload() {
        let html = render(&[sample_facility("ALPHA HOUSE LLC")]);
        assert!(html.contains("Alpha House LLC"));
        assert!(!html.contains("ALPHA HOUSE LLC"));
    }

    #[test]
    fn payload_cannot_break_out_of_script() {
        let html = render(&[sample_facility("</script><b>x")]);
        assert!(!html.contains("</script><b>"));
    }

    #[test]
    fn empty_state_messages_are_in_page_script() {
        let html = render(&[]);
        assert!(html.contains("No facilities found matching your search."));
        assert!(html.contains("No facilities found for the letter"));
        assert!(html.contains("No violations noted in this inspection."));
    }

    #[test]
    fn placeholder_entries_are_dropped_from_payload() {
        let facility = Facility {
            key: "HARBOR".into(),
            identity: Identity {
                name: "HARBOR LIGHT RESIDENTIAL".into(),
                ..Default::default()
            },
            inspections: vec![InspectionRecord {
                facility_key: "HARBOR".into(),
                date_raw: Some("2024-02-20".into()),
                date: parse_inspection_date("2024-02-20"),
                kind: None,
                identity: Identity::default(),
                deficiencies: vec![
                    Deficiency {
                        kind: Some("staffing".into()),
                        description: Some("Overnight shift below ratio.".into()),
                        ..Default::default()
                    },
                    Deficiency {
                        kind: Some("none".into()),
                        description: Some("None".into()),
                        ..Default::default()
                    },
                ],
                details: vec![],
            }],
        };
        let profile = Profile::connecticut();
        let caser = TitleCaser::for_profile(&profile);
        let html =
            HtmlReporter::new().report(&[facility], &profile, &caser, &LoadSummary::default());

        assert!(html.contains("\"violationCount\":1"));
        assert!(!html.contains("\"violationCount\":2"));
        assert!(!html.contains("\"description\":\"None\""));
    }

    #[test]
    fn page_is_self_contained() {
        let html = render(&[sample_facility("ALPHA")]);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.ends_with("</html>"));
        assert!(!html.contains("src=\"http"));
        assert!(!html.contains("href=\"http"));
    }
}
