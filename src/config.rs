use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Defaults for the CLI flags, loadable from TOML. Every field is optional;
/// explicit command-line flags always win.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    pub output: Option<String>,
    pub metadata_table: Option<bool>,
    pub include_hash: Option<bool>,
    pub verbose: Option<bool>,
    pub no_color: Option<bool>,
    pub progress: Option<bool>,
}

impl Config {
    pub fn merge(&mut self, other: Config) {
        if other.output.is_some() {
            self.output = other.output;
        }
        if other.metadata_table.is_some() {
            self.metadata_table = other.metadata_table;
        }
        if other.include_hash.is_some() {
            self.include_hash = other.include_hash;
        }
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
        if other.no_color.is_some() {
            self.no_color = other.no_color;
        }
        if other.progress.is_some() {
            self.progress = other.progress;
        }
    }
}

/// Global config from `~/.codecontexter/config.toml`, then the project's
/// `.codecontexter.toml`; the project file overrides. Unreadable or
/// malformed files are simply skipped.
pub fn load_config(project_root: &Path) -> Config {
    let mut config = Config::default();

    if let Some(home_dir) = dirs::home_dir() {
        let global_path = home_dir.join(".codecontexter").join("config.toml");
        if let Ok(content) = fs::read_to_string(global_path) {
            if let Ok(global_config) = toml::from_str::<Config>(&content) {
                config.merge(global_config);
            }
        }
    }

    let repo_path = project_root.join(".codecontexter.toml");
    if let Ok(content) = fs::read_to_string(repo_path) {
        if let Ok(repo_config) = toml::from_str::<Config>(&content) {
            config.merge(repo_config);
        }
    }

    config
}
