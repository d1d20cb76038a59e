use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::layout_engine::RequestMode;

pub fn config_file() -> Option<PathBuf> { dirs::home_dir().map(|home| home.join(".dashgrid.toml")) }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Table layout used for grids of icons and windows
    #[serde(default)]
    pub table: TableSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct TableSettings {
    /// Space between two rows, in pixels
    #[serde(default)]
    pub row_spacing: f64,
    /// Space between two columns, in pixels
    #[serde(default)]
    pub column_spacing: f64,
    /// Which axis wins when a container is constrained in both directions.
    /// Used for containers that do not state a preference themselves.
    #[serde(default)]
    pub request_mode: RequestMode,
}

impl Settings {
    pub fn validate(&self) -> Vec<String> { self.table.validate() }

    pub fn auto_fix_values(&mut self) -> usize { self.table.auto_fix_values() }
}

impl TableSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !valid_spacing(self.row_spacing) {
            issues.push(format!(
                "table.row_spacing must be a non-negative number, got {}",
                self.row_spacing
            ));
        }

        if !valid_spacing(self.column_spacing) {
            issues.push(format!(
                "table.column_spacing must be a non-negative number, got {}",
                self.column_spacing
            ));
        }

        issues
    }

    pub fn auto_fix_values(&mut self) -> usize {
        let mut fixes = 0;

        if !valid_spacing(self.row_spacing) {
            self.row_spacing = 0.0;
            fixes += 1;
        }

        if !valid_spacing(self.column_spacing) {
            self.column_spacing = 0.0;
            fixes += 1;
        }

        fixes
    }
}

fn valid_spacing(value: f64) -> bool { value.is_finite() && value >= 0.0 }

impl Default for Config {
    fn default() -> Self {
        Self::parse(include_str!("../../dashgrid.default.toml"))
            .expect("built-in dashgrid.default.toml must parse")
    }
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::parse(&buf).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Reads `path` if it exists, otherwise the built-in defaults.
    pub fn read_or_default(path: Option<&Path>) -> anyhow::Result<Config> {
        match path {
            Some(path) if path.exists() => Self::read(path),
            _ => Ok(Config::default()),
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let buf = toml::to_string_pretty(self).context("serializing config")?;
        std::fs::write(path, buf).with_context(|| format!("writing config to {}", path.display()))
    }

    pub fn validate(&self) -> Vec<String> { self.settings.validate() }

    pub fn auto_fix_values(&mut self) -> usize { self.settings.auto_fix_values() }

    fn parse(buf: &str) -> anyhow::Result<Config> { Ok(toml::from_str(buf)?) }
}
