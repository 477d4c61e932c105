//! YAML configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discover::DiscoveryOptions;
use crate::engine::{EngineOptions, DEFAULT_COMPLEXITY_THRESHOLD};

/// File names searched for when no `--config` is given.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["repo-analyzer.yaml", ".repo-analyzer.yaml"];

/// Analysis settings. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Cyclomatic complexity above which a function is flagged (default: 10)
    #[serde(default)]
    pub complexity_threshold: Option<u32>,
    /// Glob patterns for paths to skip, relative to the analysed root
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    /// Whether to analyse test files (default: false)
    #[serde(default)]
    pub include_tests: Option<bool>,
    /// Worker threads (default: available cores)
    #[serde(default)]
    pub parallelism: Option<usize>,
    /// Baseline metrics JSON for regression checks
    #[serde(default)]
    pub baseline: Option<PathBuf>,
}

impl Config {
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse a config file. A relative `baseline` is taken relative to the
    /// file's directory.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {}", path.display(), e))?;
        let mut config = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        if let (Some(baseline), Some(dir)) = (&config.baseline, path.parent()) {
            if baseline.is_relative() {
                config.baseline = Some(dir.join(baseline));
            }
        }
        Ok(config)
    }

    /// Load `explicit` if given, otherwise the first default-named file in
    /// `root` or the current directory. Returns the path used, if any.
    pub fn load(explicit: Option<&Path>, root: &Path) -> anyhow::Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover(root),
        };
        match path {
            Some(p) => {
                debug!(path = %p.display(), "loading config");
                let config = Self::parse_file(&p)?;
                validate(&config)?;
                Ok((config, Some(p)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.complexity_threshold.unwrap_or(DEFAULT_COMPLEXITY_THRESHOLD)
    }

    pub fn should_include_tests(&self) -> bool {
        self.include_tests.unwrap_or(false)
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            complexity_threshold: self.threshold(),
            parallelism: self.parallelism,
            discovery: DiscoveryOptions {
                exclude_patterns: self.exclude_patterns.clone(),
                include_tests: self.should_include_tests(),
            },
        }
    }
}

/// Find a default-named config in `root` (when it is a directory), then in
/// the current directory.
pub fn discover(root: &Path) -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if root.is_dir() {
        dirs.push(root.to_path_buf());
    }
    dirs.push(PathBuf::from("."));

    dirs.iter()
        .flat_map(|dir| DEFAULT_CONFIG_NAMES.iter().map(move |name| dir.join(name)))
        .find(|p| p.is_file())
}

/// Validate a config for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    if config.complexity_threshold == Some(0) {
        anyhow::bail!("complexity_threshold must be at least 1");
    }
    if config.parallelism == Some(0) {
        anyhow::bail!("parallelism must be at least 1");
    }
    for pattern in &config.exclude_patterns {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid exclude_patterns entry {:?}: {}", pattern, e))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
complexity_threshold: 15
exclude_patterns:
  - "**/generated/**"
include_tests: true
parallelism: 4
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.threshold(), 15);
        assert!(config.should_include_tests());
        let options = config.engine_options();
        assert_eq!(options.parallelism, Some(4));
        assert_eq!(options.discovery.exclude_patterns, vec!["**/generated/**"]);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.threshold(), 10);
        assert!(!config.should_include_tests());
        assert!(config.parallelism.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            complexity_threshold: Some(0),
            ..Default::default()
        };
        assert!(validate(&config).is_err());

        let config = Config {
            parallelism: Some(0),
            ..Default::default()
        };
        assert!(validate(&config).is_err());

        let config = Config {
            exclude_patterns: vec!["src/[".to_string()],
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_type_is_error() {
        assert!(Config::parse("complexity_threshold: high\n").is_err());
    }

    #[test]
    fn test_load_discovers_in_root() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(".repo-analyzer.yaml"),
            "complexity_threshold: 7\nbaseline: base.json\n",
        )
        .unwrap();

        let (config, path) = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.threshold(), 7);
        assert_eq!(path, Some(dir.path().join(".repo-analyzer.yaml")));
        assert_eq!(config.baseline, Some(dir.path().join("base.json")));
    }

    #[test]
    fn test_load_explicit_invalid() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "parallelism: 0\n").unwrap();
        assert!(Config::load(Some(&path), dir.path()).is_err());
        assert!(Config::load(Some(&dir.path().join("missing.yaml")), dir.path()).is_err());
    }
}
