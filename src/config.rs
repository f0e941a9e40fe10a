use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, warn};

use crate::graph::GraphStyle;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Upper bound on commits read per load
    pub max_commits: usize,
    /// Diff lines kept per commit before the truncation marker
    pub diff_line_cap: usize,
    /// Rows moved by a page up/down
    pub page_size: usize,
    pub graph_style: GraphStyle,
    /// Widest the graph panel may grow, as a percentage of the terminal
    pub graph_panel_max_percent: usize,
    /// Reload automatically when the repository changes on disk
    pub watch_repo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_commits: 5000,
            diff_line_cap: 300,
            page_size: 10,
            graph_style: GraphStyle::Unicode,
            graph_panel_max_percent: 60,
            watch_repo: true,
        }
    }
}

/// `$XDG_CONFIG_HOME/gitraffe`, `$HOME/.config/gitraffe`, or a temp fallback
pub fn config_dir() -> PathBuf {
    let xdg = std::env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty());
    if let Some(base) = xdg {
        return PathBuf::from(base).join("gitraffe");
    }
    match std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        Some(home) => PathBuf::from(home).join(".config").join("gitraffe"),
        None => std::env::temp_dir().join("gitraffe"),
    }
}

impl Config {
    fn config_path() -> PathBuf {
        config_dir().join("settings.json")
    }

    /// Load from the default location. On first run the defaults are written
    /// out so there is a file to edit.
    pub fn load() -> Self {
        Self::load_or_init(&Self::config_path())
    }

    fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::load_from(path);
        }
        let config = Self::default();
        match config.save_to(path) {
            Ok(()) => debug!("wrote default config to {}", path.display()),
            Err(e) => warn!("Could not write default config: {e:#}"),
        }
        config
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(data) = fs::read_to_string(path) else {
            debug!("no config at {}, using defaults", path.display());
            return Self::default();
        };
        match serde_json::from_str::<Config>(&data) {
            Ok(config) => config.sanitized(),
            Err(e) => {
                warn!("Ignoring malformed config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating config dir {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(self).context("serializing config")?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Replace values that would make the viewer unusable
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.max_commits == 0 {
            self.max_commits = defaults.max_commits;
        }
        if self.page_size == 0 {
            self.page_size = defaults.page_size;
        }
        self.graph_panel_max_percent = self.graph_panel_max_percent.clamp(10, 90);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::load_from(&dir.path().join("settings.json")), Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "max_commits": 200, "graph_style": "ascii" }"#).unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.max_commits, 200);
        assert_eq!(config.graph_style, GraphStyle::Ascii);
        assert_eq!(config.diff_line_cap, 300);
        assert!(config.watch_repo);
    }

    #[test]
    fn test_malformed_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_unusable_values_are_replaced() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "page_size": 0, "graph_panel_max_percent": 100 }"#).unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.page_size, 10);
        assert_eq!(config.graph_panel_max_percent, 90);
    }

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gitraffe").join("settings.json");
        assert_eq!(Config::load_or_init(&path), Config::default());
        assert!(path.exists());

        fs::write(&path, r#"{ "page_size": 3 }"#).unwrap();
        assert_eq!(Config::load_or_init(&path).page_size, 3);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let config = Config {
            page_size: 25,
            watch_repo: false,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }
}
