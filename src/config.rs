use anyhow::{Context, Result};
use facematch_engine::MatchConfig;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub static CONFIG_PATH: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(option_env!("FACEMATCH_CONFIG_PATH").unwrap_or("/usr/local/etc/facematch/config.toml"))
});

pub static FACE_STORE_PREFIX: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(option_env!("FACEMATCH_STORE_PREFIX").unwrap_or("/usr/local/var/facematch"))
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum detector score for a capture to count as a usable face.
    pub min_detection_score: f32,
    /// Directory holding one subdirectory per registered person.
    pub store_prefix: PathBuf,
    pub matching: MatchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_detection_score: 0.6,
            store_prefix: FACE_STORE_PREFIX.to_path_buf(),
            matching: MatchConfig::default(),
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(&CONFIG_PATH);
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

/// Load the config file, apply environment overrides, and validate.
pub fn load_effective(path: Option<&Path>) -> Result<Config> {
    let mut cfg = load_config(path)?;
    apply_overrides(&mut cfg, |key| std::env::var(key).ok())?;
    cfg.matching.validate().context("invalid matching configuration")?;
    Ok(cfg)
}

/// Override settings from `lookup`, which maps variable names such as
/// `MATCH_THRESHOLD` to their values.
pub fn apply_overrides<F>(cfg: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = parse_var(&lookup, "MATCH_THRESHOLD")? {
        cfg.matching.match_threshold = v;
    }
    if let Some(v) = parse_var(&lookup, "TOP2_GAP_THRESHOLD")? {
        cfg.matching.gap_threshold = v;
    }
    if let Some(v) = parse_var(&lookup, "REQUIRED_SAMPLE_COUNT")? {
        cfg.matching.required_samples = v;
    }
    if let Some(v) = parse_var(&lookup, "CENTROID_PREFILTER")? {
        cfg.matching.centroid_prefilter = Some(v);
    }
    if let Some(v) = parse_var(&lookup, "MIN_DETECTION_SCORE")? {
        cfg.min_detection_score = v;
    }
    if let Some(v) = lookup("FACEMATCH_STORE").filter(|v| !v.trim().is_empty()) {
        cfg.store_prefix = PathBuf::from(v);
    }
    Ok(())
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("parsing {key}={raw}")),
        _ => Ok(None),
    }
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(&CONFIG_PATH);
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_missing_file_gives_defaults() -> Result<()> {
        let path = std::env::temp_dir().join(format!("facematch-{}.toml", uuid::Uuid::new_v4()));
        let cfg = load_config(Some(&path))?;
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.matching.match_threshold, 0.5);
        assert_eq!(cfg.matching.gap_threshold, 0.03);
        assert_eq!(cfg.matching.required_samples, 3);
        Ok(())
    }

    #[test]
    fn test_partial_toml() -> Result<()> {
        let cfg: Config = toml::from_str(
            r#"
            store_prefix = "/tmp/faces"

            [matching]
            match_threshold = 0.6
            "#,
        )?;
        assert_eq!(cfg.store_prefix, PathBuf::from("/tmp/faces"));
        assert_eq!(cfg.matching.match_threshold, 0.6);
        assert_eq!(cfg.matching.gap_threshold, 0.03);
        assert_eq!(cfg.min_detection_score, 0.6);
        Ok(())
    }

    #[test]
    fn test_save_and_reload() -> Result<()> {
        let path = std::env::temp_dir()
            .join(format!("facematch-{}", uuid::Uuid::new_v4()))
            .join("config.toml");
        let mut cfg = Config::default();
        cfg.matching.centroid_prefilter = Some(0.25);
        cfg.matching.required_samples = 5;
        save_config(&cfg, Some(&path))?;
        assert_eq!(load_config(Some(&path))?, cfg);
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir)?;
        }
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let mut cfg = Config::default();
        apply_overrides(
            &mut cfg,
            env(&[
                ("MATCH_THRESHOLD", "0.42"),
                ("TOP2_GAP_THRESHOLD", " 0.1 "),
                ("REQUIRED_SAMPLE_COUNT", "5"),
                ("CENTROID_PREFILTER", "0.3"),
                ("MIN_DETECTION_SCORE", "0.75"),
                ("FACEMATCH_STORE", "/srv/faces"),
            ]),
        )?;
        assert_eq!(cfg.matching.match_threshold, 0.42);
        assert_eq!(cfg.matching.gap_threshold, 0.1);
        assert_eq!(cfg.matching.required_samples, 5);
        assert_eq!(cfg.matching.centroid_prefilter, Some(0.3));
        assert_eq!(cfg.min_detection_score, 0.75);
        assert_eq!(cfg.store_prefix, PathBuf::from("/srv/faces"));
        Ok(())
    }

    #[test]
    fn test_blank_override_ignored() -> Result<()> {
        let mut cfg = Config::default();
        apply_overrides(&mut cfg, env(&[("MATCH_THRESHOLD", "  ")]))?;
        assert_eq!(cfg, Config::default());
        Ok(())
    }

    #[test]
    fn test_bad_override_names_variable() {
        let mut cfg = Config::default();
        let err = apply_overrides(&mut cfg, env(&[("REQUIRED_SAMPLE_COUNT", "three")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("REQUIRED_SAMPLE_COUNT"));
    }
}
