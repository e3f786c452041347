//! Config file schema and profile resolution

use crate::profile::{Profile, SearchField};
use crate::SortMode;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// `.facwatchrc.json` contents.
///
/// Everything is optional; CLI flags take precedence over the file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    /// Built-in profile id (`ca`, `az`, `ut`, `tx`, `wa`, `ct`)
    pub profile: Option<String>,
    /// Full inline profile; overrides `profile` when present
    pub custom_profile: Option<Profile>,
    /// Data sources: files, directories, or (with the fetch feature) URLs
    pub sources: Vec<String>,
    /// Default HTML output path
    pub output: Option<PathBuf>,
    /// Glob patterns for data files to skip when scanning directories
    pub ignore: Vec<String>,
    /// Default sort mode
    pub sort: Option<SortMode>,
    /// Extra acronyms for the title-caser
    pub acronyms: Vec<String>,
    /// Extra proper-name overrides, lowercase form to display form
    pub special_names: HashMap<String, String>,
    /// Replace the profile's search field set
    pub search_fields: Option<Vec<SearchField>>,
}

impl Config {
    /// Resolve the effective profile: CLI `--state` wins, then the config
    /// file, then config-level table/field overrides are applied on top.
    pub fn resolve_profile(&self, cli_state: Option<&str>) -> Result<Profile> {
        let mut profile = if let Some(state) = cli_state {
            Profile::builtin(state).ok_or_else(|| unknown_profile(state))?
        } else if let Some(ref custom) = self.custom_profile {
            custom.clone()
        } else if let Some(ref name) = self.profile {
            Profile::builtin(name).ok_or_else(|| unknown_profile(name))?
        } else {
            anyhow::bail!(
                "no jurisdiction profile selected; pass --state or set \"profile\" in the config \
                 (built-ins: {})",
                Profile::builtin_names().join(", ")
            );
        };

        profile.acronyms.extend(self.acronyms.iter().cloned());
        profile.special_names.extend(
            self.special_names
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        if let Some(ref fields) = self.search_fields {
            profile.search_fields = fields.clone();
        }
        Ok(profile)
    }
}

fn unknown_profile(name: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "unknown profile '{}' (built-ins: {})",
        name,
        Profile::builtin_names().join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_state_overrides_config_profile() {
        let config = Config {
            profile: Some("ct".into()),
            ..Default::default()
        };
        let profile = config.resolve_profile(Some("az")).unwrap();
        assert_eq!(profile.name, "az");
    }

    #[test]
    fn config_profile_used_without_cli() {
        let config = Config {
            profile: Some("wa".into()),
            ..Default::default()
        };
        assert_eq!(config.resolve_profile(None).unwrap().name, "wa");
    }

    #[test]
    fn no_profile_is_an_error() {
        let err = Config::default().resolve_profile(None).unwrap_err();
        assert!(err.to_string().contains("--state"));
    }

    #[test]
    fn unknown_profile_lists_builtins() {
        let err = Config::default().resolve_profile(Some("zz")).unwrap_err();
        assert!(err.to_string().contains("ca"));
    }

    #[test]
    fn config_overrides_extend_tables() {
        let mut names = HashMap::new();
        names.insert("mcgee".to_string(), "McGee".to_string());
        let config = Config {
            profile: Some("ca".into()),
            acronyms: vec!["YMCA".into()],
            special_names: names,
            search_fields: Some(vec![SearchField::Name]),
            ..Default::default()
        };
        let profile = config.resolve_profile(None).unwrap();
        assert!(profile.acronyms.iter().any(|a| a == "YMCA"));
        assert!(profile
            .special_names
            .iter()
            .any(|(k, _)| k == "mcgee"));
        assert_eq!(profile.search_fields, vec![SearchField::Name]);
    }
}
