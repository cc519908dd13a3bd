// Application settings
// Loaded from ~/.config/combimatch/settings.json

use combimatch_recon::{Cents, SearchParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How an input file is split into amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// One amount per line (default)
    #[default]
    Line,
    /// Amounts separated by commas
    Comma,
    /// One column of a CSV file
    Csv,
}

impl InputMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputMode::Line => "line",
            InputMode::Comma => "comma",
            InputMode::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Search defaults
    #[serde(rename = "search.tolerance")]
    pub tolerance: Cents,

    #[serde(rename = "search.minSize")]
    pub min_size: usize,

    #[serde(rename = "search.maxSize")]
    pub max_size: usize,

    #[serde(rename = "search.maxResults")]
    pub max_results: usize,

    // Input
    #[serde(rename = "input.mode")]
    pub input_mode: InputMode,

    #[serde(rename = "input.csvColumn")]
    pub csv_column: Option<String>,  // header name or letter, None = first column

    #[serde(rename = "input.hasHeaders")]
    pub has_headers: bool,

    // Ledger
    #[serde(rename = "ledger.path")]
    pub ledger_path: Option<PathBuf>,  // None = <data_dir>/combimatch/ledger.json
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Search
            tolerance: Cents::ZERO,
            min_size: 1,
            max_size: 10,
            max_results: 100,
            // Input
            input_mode: InputMode::Line,
            csv_column: None,
            has_headers: true,
            // Ledger
            ledger_path: None,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("combimatch");
        config_dir.join("settings.json")
    }

    /// Ledger file used when none is given on the command line
    pub fn ledger_file(&self) -> PathBuf {
        match &self.ledger_path {
            Some(path) => path.clone(),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("combimatch")
                .join("ledger.json"),
        }
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load from an explicit path. A missing file is created with defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            let settings = Self::default();
            settings.create_default_file(path);
            return settings;
        }

        match fs::read_to_string(path) {
            Ok(contents) => {
                // Strip comments (lines starting with //)
                let cleaned: String = contents
                    .lines()
                    .filter(|line| !line.trim().starts_with("//"))
                    .collect::<Vec<_>>()
                    .join("\n");

                match serde_json::from_str(&cleaned) {
                    Ok(settings) => settings,
                    Err(e) => {
                        log::warn!("error parsing {}: {}", path.display(), e);
                        log::warn!("using default settings");
                        Self::default()
                    }
                }
            }
            Err(e) => {
                log::warn!("error reading {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| e.to_string())?;

        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Search parameters for `target` using the stored defaults
    pub fn search_params(&self, target: Cents) -> SearchParams {
        SearchParams::new(target)
            .with_tolerance(self.tolerance)
            .with_sizes(self.min_size, self.max_size)
            .with_max_results(self.max_results)
    }

    /// Create default settings file with comments
    fn create_default_file(&self, path: &Path) {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::warn!("error creating config directory: {}", e);
                return;
            }
        }

        let default_config = r#"{
    // Search defaults (amounts accept "12.50" or 12.5)
    "search.tolerance": "0.00",
    "search.minSize": 1,
    "search.maxSize": 10,
    "search.maxResults": 100,

    // Input: "line", "comma" or "csv"
    "input.mode": "line",
    // CSV column by header name or letter; null = first column
    "input.csvColumn": null,
    "input.hasHeaders": true,

    // Finalization ledger; null = default data directory
    "ledger.path": null
}
"#;

        if let Err(e) = fs::write(path, default_config) {
            log::warn!("error writing default settings file: {}", e);
        }
    }
}
