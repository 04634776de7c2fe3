use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::model::DescriptionModifier;
use crate::pattern::{IdPattern, PatternError};
use crate::report::ReportFormat;
use crate::search::SearchMask;

/// Fatal configuration problems, reported before any scanning starts
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No report location given")]
    MissingReportLocation,
    #[error("No baseline location given")]
    MissingBaselineLocation,
    #[error("Neither API nor internal references requested")]
    NothingToSearch,
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),
}

/// Configuration for an API use scan
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UseConfig {
    /// Snapshot file or directory holding the baseline
    pub baseline: Option<PathBuf>,

    /// Report file; cleaned before each run
    pub report: Option<PathBuf>,

    /// Stdout rendering: terminal, json
    pub format: ReportFormat,

    /// Report references to API members
    pub include_api: bool,

    /// Report references to internal members
    pub include_internal: bool,

    /// Regex (full match) selecting the components to scan
    pub scope_pattern: Option<String>,

    /// Regex (full match) selecting the components that count as targets
    pub reference_pattern: Option<String>,

    /// `componentId:suffix` archives to leave out of the scan
    pub archive_patterns: Option<Vec<String>>,

    /// Package regexes re-tagged as API before the search
    pub api_patterns: Option<Vec<String>>,

    /// Package regexes re-tagged as internal before the search
    pub internal_patterns: Option<Vec<String>>,

    /// Scan components on the rayon pool
    pub parallel: bool,
}

/// Patterns of a validated configuration, ready to use
#[derive(Debug, Clone, Default)]
pub struct CompiledPatterns {
    pub scope: Option<IdPattern>,
    pub reference: Option<IdPattern>,
    pub archives: Vec<String>,
    /// Only present when API or internal package patterns are configured
    pub modifier: Option<DescriptionModifier>,
}

impl UseConfig {
    /// Load configuration from a file (YAML or TOML)
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match extension {
            "yml" | "yaml" => serde_yaml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse YAML config"),
            "toml" => toml::from_str(&contents)
                .into_diagnostic()
                .wrap_err("Failed to parse TOML config"),
            _ => {
                if let Ok(config) = serde_yaml::from_str(&contents) {
                    Ok(config)
                } else {
                    toml::from_str(&contents)
                        .into_diagnostic()
                        .wrap_err("Failed to parse config file")
                }
            }
        }
    }

    /// Try to load configuration from default locations under `root`
    pub fn from_default_locations(root: &Path) -> Result<Self> {
        let default_names = [
            ".apiuse.yml",
            ".apiuse.yaml",
            ".apiuse.toml",
            "apiuse.yml",
            "apiuse.yaml",
            "apiuse.toml",
        ];

        for name in &default_names {
            let path = root.join(name);
            if path.exists() {
                debug!("Using config file {}", path.display());
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    pub fn mask(&self) -> SearchMask {
        SearchMask::new(self.include_api, self.include_internal)
    }

    /// Run the fatal checks and compile every pattern.
    ///
    /// Checks run in a fixed order: report location, baseline location,
    /// include flags, then patterns.
    pub fn validate(&self) -> Result<CompiledPatterns, ConfigError> {
        if self.report.is_none() {
            return Err(ConfigError::MissingReportLocation);
        }
        if self.baseline.is_none() {
            return Err(ConfigError::MissingBaselineLocation);
        }
        if self.mask().is_empty() {
            return Err(ConfigError::NothingToSearch);
        }

        let scope = self.scope_pattern.as_deref().map(IdPattern::compile).transpose()?;
        let reference = self
            .reference_pattern
            .as_deref()
            .map(IdPattern::compile)
            .transpose()?;

        let modifier = if self.api_patterns.is_some() || self.internal_patterns.is_some() {
            Some(DescriptionModifier::new(
                self.api_patterns.as_deref().unwrap_or_default(),
                self.internal_patterns.as_deref().unwrap_or_default(),
            )?)
        } else {
            None
        };

        Ok(CompiledPatterns {
            scope,
            reference,
            archives: self.archive_patterns.clone().unwrap_or_default(),
            modifier,
        })
    }
}
