use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::color::SeriesColor;
use crate::data::loader::{Source, SourceColumns};

/// Path of an optional JSON config file.
pub const CONFIG_ENV: &str = "CALLVOLUME_CONFIG";
/// Overrides `source` from the file or defaults.
pub const SOURCE_ENV: &str = "CALLVOLUME_SOURCE";

pub const DEFAULT_SOURCE: &str = concat!(
    "https://raw.githubusercontent.com/Brunosilva-data/",
    "Atendimento_WhatsApp/main/Report_WhatsApp_2023_2024.csv"
);

/// Dashboard settings. Every field is optional in the JSON file.
///
/// ```json
/// {
///   "source": "data/calls.csv",
///   "timeout_secs": 10,
///   "pinned_colors": { "Assistente CSF": "#006400" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// URL (`http[s]://`) or local path of the call log.
    pub source: String,
    pub category_column: String,
    pub date_column: String,
    pub timeout_secs: u64,
    pub area_fill: SeriesColor,
    /// Category → fixed line colour in the comparison chart.
    pub pinned_colors: BTreeMap<String, SeriesColor>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            category_column: "Papel do criador".to_string(),
            date_column: "Data de abertura".to_string(),
            timeout_secs: 30,
            area_fill: SeriesColor::AREA_FILL,
            pinned_colors: BTreeMap::from([(
                "Assistente CSF".to_string(),
                SeriesColor::DARK_GREEN,
            )]),
        }
    }
}

impl DashboardConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("parsing dashboard config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Defaults, then the file named by `CALLVOLUME_CONFIG`, then
    /// `CALLVOLUME_SOURCE`.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_source_override(std::env::var(SOURCE_ENV).ok());
        Ok(config)
    }

    /// Blank overrides are ignored.
    pub fn apply_source_override(&mut self, source: Option<String>) {
        if let Some(src) = source.filter(|s| !s.trim().is_empty()) {
            self.source = src;
        }
    }

    pub fn source(&self) -> Source {
        Source::parse(&self.source)
    }

    pub fn columns(&self) -> SourceColumns {
        SourceColumns {
            category: self.category_column.clone(),
            date: self.date_column.clone(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
