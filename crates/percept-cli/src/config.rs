//! Configuration – reads `percept.toml`.
//!
//! ```toml
//! [run]
//! radar_path = "radar_data.txt"
//! camera_path = "camera_data.txt"
//! log_path = "perception_log.txt"
//! capacity = 200
//! alignment = "positional"
//!
//! [run.thresholds]
//! dist_threshold = 70.0
//! confidence_gate = 0.5
//!
//! [generator]
//! count = 200
//! seed = 42
//! ```
//!
//! Every key is optional.

use percept_fusion::AlignmentStrategy;
use percept_runtime::RunConfig;
use percept_types::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "percept.toml";

/// Settings for the `generate` subcommand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of objects written to each sensor file.
    #[serde(default = "default_count")]
    pub count: usize,

    /// Fixed RNG seed. Fresh entropy is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_count() -> usize {
    DEFAULT_CAPACITY
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            seed: None,
        }
    }
}

/// Contents of `percept.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Resolve the config path: the explicit one, or [`CONFIG_FILE`].
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

/// Load the config from `path`.  Returns `None` if the file does not exist.
pub fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `PERCEPT_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `PERCEPT_RADAR_PATH` | `run.radar_path` |
/// | `PERCEPT_CAMERA_PATH` | `run.camera_path` |
/// | `PERCEPT_LOG_PATH` | `run.log_path` |
/// | `PERCEPT_CAPACITY` | `run.capacity` |
/// | `PERCEPT_ALIGNMENT` | `run.alignment` (`positional` / `keyed`) |
/// | `PERCEPT_DIST_THRESHOLD` | `run.thresholds.dist_threshold` |
///
/// Values that fail to parse are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("PERCEPT_RADAR_PATH") {
        cfg.run.radar_path = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("PERCEPT_CAMERA_PATH") {
        cfg.run.camera_path = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("PERCEPT_LOG_PATH") {
        cfg.run.log_path = PathBuf::from(v);
    }
    if let Ok(v) = std::env::var("PERCEPT_CAPACITY")
        && let Ok(capacity) = v.parse::<usize>()
    {
        cfg.run.capacity = capacity;
    }
    if let Ok(v) = std::env::var("PERCEPT_ALIGNMENT")
        && let Some(alignment) = parse_alignment(&v)
    {
        cfg.run.alignment = alignment;
    }
    if let Ok(v) = std::env::var("PERCEPT_DIST_THRESHOLD")
        && let Ok(threshold) = v.parse::<f64>()
    {
        cfg.run.thresholds.dist_threshold = threshold;
    }
}

pub fn parse_alignment(value: &str) -> Option<AlignmentStrategy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "positional" => Some(AlignmentStrategy::Positional),
        "keyed" => Some(AlignmentStrategy::Keyed),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_returns_none() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let result = load_from(&dir.path().join(CONFIG_FILE)).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "").unwrap();
        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.run.capacity, 200);
        assert_eq!(cfg.run.thresholds.dist_threshold, 70.0);
        assert_eq!(cfg.generator.count, 200);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            "[run]\ncapacity = 50\nalignment = \"keyed\"\n\n[run.thresholds]\nconfidence_gate = 0.8\n\n[generator]\nseed = 9\n",
        )
        .unwrap();
        let cfg = load_from(&path).expect("load ok").expect("some");
        assert_eq!(cfg.run.capacity, 50);
        assert_eq!(cfg.run.alignment, AlignmentStrategy::Keyed);
        assert_eq!(cfg.run.thresholds.confidence_gate, 0.8);
        assert_eq!(cfg.run.thresholds.dist_threshold, 70.0);
        assert_eq!(cfg.run.log_path, PathBuf::from("perception_log.txt"));
        assert_eq!(cfg.generator.seed, Some(9));
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[run]\ncapacity = \"lots\"\n").unwrap();
        let err = load_from(&path).unwrap_err();
        assert!(err.contains("Failed to parse config"));
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let mut cfg = Config::default();
        cfg.generator.seed = Some(1);
        cfg.run.alignment = AlignmentStrategy::Keyed;
        let raw = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&raw).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn explicit_path_wins() {
        assert_eq!(config_path(None), PathBuf::from(CONFIG_FILE));
        assert_eq!(
            config_path(Some(Path::new("/etc/percept.toml"))),
            PathBuf::from("/etc/percept.toml")
        );
    }

    #[test]
    fn parse_alignment_accepts_known_values() {
        assert_eq!(parse_alignment("Keyed"), Some(AlignmentStrategy::Keyed));
        assert_eq!(parse_alignment(" positional "), Some(AlignmentStrategy::Positional));
        assert_eq!(parse_alignment("fuzzy"), None);
    }

    // All env-var mutations live in one test so parallel tests never race.
    #[test]
    fn apply_env_overrides_updates_fields() {
        // SAFETY: no other test reads or writes PERCEPT_* variables.
        unsafe {
            std::env::set_var("PERCEPT_LOG_PATH", "/tmp/decisions.txt");
            std::env::set_var("PERCEPT_CAPACITY", "25");
            std::env::set_var("PERCEPT_ALIGNMENT", "keyed");
            std::env::set_var("PERCEPT_DIST_THRESHOLD", "not-a-number");
        }
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.run.log_path, PathBuf::from("/tmp/decisions.txt"));
        assert_eq!(cfg.run.capacity, 25);
        assert_eq!(cfg.run.alignment, AlignmentStrategy::Keyed);
        assert_eq!(cfg.run.thresholds.dist_threshold, 70.0);
        unsafe {
            std::env::remove_var("PERCEPT_LOG_PATH");
            std::env::remove_var("PERCEPT_CAPACITY");
            std::env::remove_var("PERCEPT_ALIGNMENT");
            std::env::remove_var("PERCEPT_DIST_THRESHOLD");
        }
    }
}
