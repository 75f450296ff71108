//! Engine configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path, or the override in the data dir
//!    (~/.local/share/outlay/config/outlay.toml) when it exists
//! 2. The embedded defaults (compiled into the binary)

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::duplicate::DuplicateGuard;
use crate::error::{Error, Result};
use crate::export::ExportFormatter;
use crate::query::{QueryEngine, ALL_EXPENSES_LABEL};
use crate::reports::{ReportEngine, DEFAULT_MONTH_TOP_CATEGORIES, DEFAULT_TOP_CATEGORIES};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/outlay.toml");

/// Bounds for the plain-text description column
pub const MIN_DESCRIPTION_WIDTH: usize = 30;
pub const MAX_DESCRIPTION_WIDTH: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub all_expenses_label: String,
    pub top_categories: usize,
    pub month_top_categories: usize,
    /// Always within `MIN_DESCRIPTION_WIDTH..=MAX_DESCRIPTION_WIDTH`
    pub description_width: usize,
    pub title_width: usize,
    pub currency_symbol: String,
    pub base_filename: String,
    pub duplicate_check: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            all_expenses_label: ALL_EXPENSES_LABEL.to_string(),
            top_categories: DEFAULT_TOP_CATEGORIES,
            month_top_categories: DEFAULT_MONTH_TOP_CATEGORIES,
            description_width: MAX_DESCRIPTION_WIDTH,
            title_width: 15,
            currency_symbol: "$".to_string(),
            base_filename: "expense_report".to_string(),
            duplicate_check: true,
        }
    }
}

impl EngineConfig {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path, falling back to embedded defaults if it is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    pub fn query_engine(&self) -> QueryEngine {
        QueryEngine::with_label(self.all_expenses_label.clone())
    }

    pub fn report_engine(&self) -> ReportEngine {
        ReportEngine::with_limits(self.top_categories, self.month_top_categories)
    }

    pub fn export_formatter(&self) -> ExportFormatter {
        ExportFormatter::new()
            .description_width(self.description_width)
            .title_width(self.title_width)
            .currency_symbol(self.currency_symbol.clone())
            .base_filename(self.base_filename.clone())
    }

    pub fn duplicate_guard(&self) -> DuplicateGuard {
        DuplicateGuard::new(self.duplicate_check)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("outlay").join("config").join("outlay.toml"))
}

fn load_config(override_path: Option<&Path>) -> Result<EngineConfig> {
    let path = override_path
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .filter(|p| p.exists());

    let content = match &path {
        Some(p) => {
            debug!(path = %p.display(), "Loading config override");
            fs::read_to_string(p)
                .map_err(|e| Error::Config(format!("Failed to read {}: {}", p.display(), e)))?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    view: Option<RawView>,
    reports: Option<RawReports>,
    export: Option<RawExport>,
    duplicates: Option<RawDuplicates>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawView {
    all_expenses_label: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReports {
    top_categories: Option<usize>,
    month_top_categories: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawExport {
    description_width: Option<usize>,
    title_width: Option<usize>,
    currency_symbol: Option<String>,
    base_filename: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDuplicates {
    enabled: Option<bool>,
}

/// Parse config from TOML content
pub fn parse_config(content: &str) -> Result<EngineConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = EngineConfig::default();

    if let Some(view) = raw.view {
        if let Some(label) = view.all_expenses_label {
            config.all_expenses_label = label;
        }
    }

    if let Some(reports) = raw.reports {
        if let Some(n) = reports.top_categories {
            config.top_categories = n;
        }
        if let Some(n) = reports.month_top_categories {
            config.month_top_categories = n;
        }
    }

    if let Some(export) = raw.export {
        if let Some(width) = export.description_width {
            config.description_width = width.clamp(MIN_DESCRIPTION_WIDTH, MAX_DESCRIPTION_WIDTH);
        }
        if let Some(width) = export.title_width {
            config.title_width = width.max(1);
        }
        if let Some(symbol) = export.currency_symbol {
            config.currency_symbol = symbol;
        }
        if let Some(name) = export.base_filename {
            if name.trim().is_empty() {
                return Err(Error::Config("export.base_filename must not be empty".into()));
            }
            config.base_filename = name;
        }
    }

    if let Some(duplicates) = raw.duplicates {
        if let Some(enabled) = duplicates.enabled {
            config.duplicate_check = enabled;
        }
    }

    Ok(config)
}
