// ABOUTME: Read-only environment snapshots and the key, keyOrDefault and ls template functions
// ABOUTME: Abstracts the process environment behind a trait so functions can run against frozen snapshots

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A read-only view of environment variables.
pub trait Environment: Send + Sync {
    /// Look up a single variable.
    fn var(&self, key: &str) -> Option<String>;

    /// Enumerate every variable. Order is unspecified.
    fn vars(&self) -> Vec<(String, String)>;
}

/// The live environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
    }

    fn vars(&self) -> Vec<(String, String)> {
        std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    v.to_string_lossy().into_owned(),
                )
            })
            .collect()
    }
}

/// An in-memory environment snapshot.
#[derive(Debug, Clone, Default)]
pub struct MapEnvironment {
    vars: HashMap<String, String>,
}

impl MapEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.vars.remove(key)
    }
}

impl FromIterator<(String, String)> for MapEnvironment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

impl Environment for MapEnvironment {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn vars(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// One key/value pair returned by `ls`. Serialized with the field names
/// templates use (`Key`, `Value`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentEntry {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: String,
}

/// Value of `name`, or the empty string when unset.
pub fn key(env: &dyn Environment, name: &str) -> String {
    env.var(name).unwrap_or_default()
}

/// Value of `name` when set (even to the empty string), otherwise `default`.
pub fn key_or_default(env: &dyn Environment, name: &str, default: &str) -> String {
    env.var(name).unwrap_or_else(|| default.to_string())
}

/// Every variable whose key starts with `prefix`.
///
/// The returned key is the remainder after `prefix`, reduced to its last
/// `/`-separated segment. The prefix is removed even when it ends inside that
/// segment: `app/db_host` listed under `app/db_` yields `host`.
pub fn ls(env: &dyn Environment, prefix: &str) -> Vec<EnvironmentEntry> {
    env.vars()
        .into_iter()
        .filter_map(|(k, value)| {
            let rest = k.strip_prefix(prefix)?;
            Some(EnvironmentEntry {
                key: last_segment(rest).to_string(),
                value,
            })
        })
        .collect()
}

fn last_segment(key: &str) -> &str {
    match key.rfind('/') {
        Some(idx) => &key[idx + 1..],
        None => key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut entries: Vec<EnvironmentEntry>) -> Vec<EnvironmentEntry> {
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    fn entry(key: &str, value: &str) -> EnvironmentEntry {
        EnvironmentEntry {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_ls_filters_by_prefix() {
        let env = MapEnvironment::new()
            .with_var("FOO_A", "1")
            .with_var("FOO_B", "2")
            .with_var("BAR", "3");

        let entries = sorted(ls(&env, "FOO_"));
        assert_eq!(entries, vec![entry("A", "1"), entry("B", "2")]);
    }

    #[test]
    fn test_ls_strips_path_segments() {
        let env = MapEnvironment::new()
            .with_var("app/db/host", "localhost")
            .with_var("app/db/port", "5432")
            .with_var("app/cache/", "empty");

        let entries = sorted(ls(&env, "app/"));
        assert_eq!(
            entries,
            vec![
                entry("", "empty"),
                entry("host", "localhost"),
                entry("port", "5432"),
            ]
        );
    }

    #[test]
    fn test_ls_reduces_nested_remainder_to_last_segment() {
        let env = MapEnvironment::new().with_var("config/app/db/host", "db1");
        assert_eq!(ls(&env, "config/"), vec![entry("host", "db1")]);
        assert_eq!(ls(&env, "conf"), vec![entry("host", "db1")]);
    }

    #[test]
    fn test_ls_prefix_inside_last_segment_is_stripped() {
        let env = MapEnvironment::new()
            .with_var("app/db_host", "db1")
            .with_var("app/db_port", "5432")
            .with_var("app/cache_host", "c1");

        let entries = sorted(ls(&env, "app/db_"));
        assert_eq!(entries, vec![entry("host", "db1"), entry("port", "5432")]);
    }

    #[test]
    fn test_ls_no_matches() {
        let env = MapEnvironment::new().with_var("BAR", "3");
        assert!(ls(&env, "FOO_").is_empty());
    }

    #[test]
    fn test_key_and_default() {
        let env = MapEnvironment::new()
            .with_var("PRESENT", "yes")
            .with_var("EMPTY", "");

        assert_eq!(key(&env, "PRESENT"), "yes");
        assert_eq!(key(&env, "MISSING"), "");
        assert_eq!(key_or_default(&env, "PRESENT", "no"), "yes");
        assert_eq!(key_or_default(&env, "EMPTY", "no"), "");
        assert_eq!(key_or_default(&env, "MISSING", "no"), "no");
    }

    #[test]
    fn test_process_environment_reads_live_values() {
        std::env::set_var("ENVPLATE_ENV_TEST_LIVE/name", "live");
        let env = ProcessEnvironment;

        assert_eq!(
            env.var("ENVPLATE_ENV_TEST_LIVE/name"),
            Some("live".to_string())
        );
        assert_eq!(
            ls(&env, "ENVPLATE_ENV_TEST_LIVE/"),
            vec![entry("name", "live")]
        );

        std::env::remove_var("ENVPLATE_ENV_TEST_LIVE/name");
        assert!(ls(&env, "ENVPLATE_ENV_TEST_LIVE/").is_empty());
    }

    #[test]
    fn test_entry_serializes_with_template_field_names() {
        let json = serde_json::to_value(entry("A", "1")).unwrap();
        assert_eq!(json, serde_json::json!({"Key": "A", "Value": "1"}));
    }
}
