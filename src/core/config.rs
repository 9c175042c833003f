use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Config file picked up from the working directory when no path is given.
pub const LOCAL_CONFIG_FILE: &str = "properties.yaml";

/// Zero-based position of a cell among the data rows of the price table.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct CellPosition {
    pub row: usize,
    pub column: usize,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub buy: CellPosition,
    pub sell: CellPosition,
}

impl Default for TableLayout {
    fn default() -> Self {
        TableLayout {
            buy: CellPosition { row: 1, column: 2 },
            sell: CellPosition { row: 2, column: 2 },
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ChartConfig {
    pub output_path: Option<String>,
    pub title: String,
    pub buy_label: String,
    pub sell_label: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub width: u32,
    pub height: u32,
    /// Number of most recent rows printed to the terminal
    pub table_rows: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        ChartConfig {
            output_path: None,
            title: "台灣銀行黃金牌價".to_string(),
            buy_label: "賣出價格".to_string(),
            sell_label: "買進價格".to_string(),
            x_axis_label: "日期".to_string(),
            y_axis_label: "價格 (新台幣)".to_string(),
            width: 1280,
            height: 720,
            table_rows: 10,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub bot_url: String,
    pub gold_price_history_path: String,
    /// Opaque page-element settings; carried through but not interpreted.
    #[serde(default)]
    pub bot_elements: Option<serde_yaml::Value>,
    #[serde(default)]
    pub table_layout: TableLayout,
    #[serde(default)]
    pub chart: ChartConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let local = Path::new(LOCAL_CONFIG_FILE);
        if local.exists() {
            debug!("Loading config from working directory");
            return Self::load_from_path(local);
        }

        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("tw", "aurum", "aurum")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn history_path(&self) -> PathBuf {
        PathBuf::from(&self.gold_price_history_path)
    }

    /// Chart destination; defaults to the history file with an `svg` extension.
    pub fn chart_path(&self) -> PathBuf {
        match &self.chart.output_path {
            Some(path) => PathBuf::from(path),
            None => self.history_path().with_extension("svg"),
        }
    }
}
