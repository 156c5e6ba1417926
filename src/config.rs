use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::query::impact::RiskThresholds;
use crate::query::metrics::DEFAULT_TOP_N;
use crate::resolver::Resolver;

/// Name of the configuration file looked up at the repository root.
pub const CONFIG_FILE: &str = "depgraph.toml";

/// Directories never descended into during discovery, regardless of ignore files.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    "__pycache__",
    "venv",
    "env",
    "dist",
    "build",
];

/// Configuration loaded from `depgraph.toml` at the repository root.
///
/// Every field is optional; unset fields fall back to the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DepGraphConfig {
    /// Additional glob patterns to exclude from discovery (beyond .gitignore).
    pub exclude: Option<Vec<String>>,
    /// Replaces [`DEFAULT_SKIP_DIRS`] when set.
    pub skip_dirs: Option<Vec<String>>,
    /// Extensions tried when resolving extensionless imports, in order.
    pub extensions: Option<Vec<String>>,
    /// Length of the critical/complex rankings.
    pub top_n: Option<usize>,
    pub risk: RiskThresholds,
}

impl DepGraphConfig {
    /// Load configuration from `depgraph.toml` in the given root directory.
    ///
    /// Returns the default configuration if the file does not exist or cannot be parsed.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);

        if !config_path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(err) => {
                    warn!(path = %config_path.display(), error = %err, "failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                warn!(path = %config_path.display(), error = %err, "failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn skip_dirs(&self) -> Vec<&str> {
        match &self.skip_dirs {
            Some(dirs) => dirs.iter().map(String::as_str).collect(),
            None => DEFAULT_SKIP_DIRS.to_vec(),
        }
    }

    pub fn exclude_patterns(&self) -> &[String] {
        self.exclude.as_deref().unwrap_or(&[])
    }

    pub fn resolver(&self) -> Resolver {
        match &self.extensions {
            Some(exts) => Resolver::new(exts),
            None => Resolver::default(),
        }
    }

    pub fn top_n(&self) -> usize {
        self.top_n.unwrap_or(DEFAULT_TOP_N)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = DepGraphConfig::load(dir.path());
        assert!(config.exclude_patterns().is_empty());
        assert_eq!(config.skip_dirs(), DEFAULT_SKIP_DIRS.to_vec());
        assert_eq!(config.top_n(), DEFAULT_TOP_N);
        assert_eq!(config.risk, RiskThresholds::default());
        assert_eq!(config.resolver().extensions(), Resolver::default().extensions());
    }

    #[test]
    fn test_full_config_parses() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"
exclude = ["*.generated.ts"]
skip_dirs = ["vendor"]
extensions = ["py", ".ts"]
top_n = 3

[risk]
high = 20
"#,
        )
        .unwrap();

        let config = DepGraphConfig::load(dir.path());
        assert_eq!(config.exclude_patterns(), ["*.generated.ts".to_string()]);
        assert_eq!(config.skip_dirs(), vec!["vendor"]);
        assert_eq!(config.resolver().extensions(), [".py".to_string(), ".ts".to_string()]);
        assert_eq!(config.top_n(), 3);
        assert_eq!(config.risk.high, 20);
        assert_eq!(config.risk.medium, 3, "unset threshold keeps its default");
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "top_n = \"lots\"\n[[[").unwrap();
        let config = DepGraphConfig::load(dir.path());
        assert_eq!(config.top_n(), DEFAULT_TOP_N);
        assert!(config.exclude.is_none());
    }
}
