//! Configuration for xtp2code.
//!
//! Loads optional defaults from `xtp2code.toml` in the working directory (or
//! the file named by `--config`). Command-line values override file values.
//!
//! Example xtp2code.toml:
//! ```toml
//! lang = "go"
//! pkg = "fruit"
//! force = false
//! types = "go-types"
//! plugin = "go-plugin"
//! ```

use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "xtp2code.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Target language name or alias.
    pub lang: Option<String>,
    /// Package name for the generated types.
    pub pkg: Option<String>,
    /// Overwrite existing files.
    pub force: bool,
    /// Output directory for the types layout.
    pub types: Option<PathBuf>,
    /// Output directory for the plugin layout.
    pub plugin: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, `xtp2code.toml` in `cwd` is
    /// used when present; a missing default file yields the defaults.
    pub fn load(path: Option<&Path>, cwd: &Path) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load_file(path),
            None => {
                let default = cwd.join(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    Self::load_file(&default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load config from a file path.
    fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn missing_default_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn loads_default_file() {
        let dir = TempDir::new().unwrap();
        let mut file = std::fs::File::create(dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        writeln!(
            file,
            r#"
lang = "mbt"
pkg = "fruit"
plugin = "mbt-plugin"
"#
        )
        .unwrap();

        let config = Config::load(None, dir.path()).unwrap();
        assert_eq!(config.lang.as_deref(), Some("mbt"));
        assert_eq!(config.pkg.as_deref(), Some("fruit"));
        assert_eq!(config.plugin, Some(PathBuf::from("mbt-plugin")));
        assert_eq!(config.types, None);
        assert!(!config.force); // default
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = Config::load(Some(&missing), dir.path()).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "language = \"go\"\n").unwrap();
        let err = Config::load(Some(&path), dir.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config"));
    }
}
