use anyhow::{Context, Result};
use globset::Glob;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root of the document tree to walk.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("storage")
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    /// CSV sink path. Existing contents are fully replaced on export.
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
        }
    }
}

fn default_output_path() -> PathBuf {
    PathBuf::from("output/extracted_data.csv")
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct CrawlConfig {
    #[serde(default)]
    pub follow_symlinks: bool,
    /// Glob patterns (relative to the storage root) to skip during the walk.
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate globs up front so a typo fails the run, not the walk
    for pattern in &config.crawl.exclude_globs {
        Glob::new(pattern)
            .with_context(|| format!("Invalid exclude glob: '{}'", pattern))?;
    }

    if config.storage.root.as_os_str().is_empty() {
        anyhow::bail!("storage.root must not be empty");
    }
    if config.output.path.as_os_str().is_empty() {
        anyhow::bail!("output.path must not be empty");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_invocation_surface() {
        let cfg = Config::default();
        assert_eq!(cfg.storage.root, PathBuf::from("storage"));
        assert_eq!(cfg.output.path, PathBuf::from("output/extracted_data.csv"));
        assert!(!cfg.crawl.follow_symlinks);
        assert!(cfg.crawl.exclude_globs.is_empty());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let cfg: Config = toml::from_str("[storage]\nroot = \"docs\"\n").unwrap();
        assert_eq!(cfg.storage.root, PathBuf::from("docs"));
        assert_eq!(cfg.output.path, PathBuf::from("output/extracted_data.csv"));
    }

    #[test]
    fn invalid_glob_rejected() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[crawl]\nexclude_globs = [\"**/{bad\"]\n",
        )
        .unwrap();
        assert!(load_config(tmp.path()).is_err());
    }
}
