//! Usage reporting
//!
//! [`UseReporter`] collects what the search engine streams to it and renders
//! the result once the search is over: a JSON document written to the report
//! location, plus a terminal or JSON rendering on stdout.

mod json;
mod summary;
mod terminal;

pub use json::JsonReporter;
pub use summary::{ComponentUsage, ComponentUse, UsageCount, UsageSummary};
pub use terminal::TerminalReporter;

use miette::{IntoDiagnostic, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::scope::SkippedComponent;
use crate::search::{AcceptedReference, ReporterError, SearchReporter};

/// Output format for stdout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

/// Buffers search results and renders them when the search is done
#[derive(Debug)]
pub struct UseReporter {
    location: PathBuf,
    format: ReportFormat,
    quiet: bool,
    references: Vec<AcceptedReference>,
    skipped: Vec<SkippedComponent>,
}

impl UseReporter {
    /// `location` is the JSON report file
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            format: ReportFormat::default(),
            quiet: false,
            references: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Write the report file only
    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn references(&self) -> &[AcceptedReference] {
        &self.references
    }

    pub fn skipped(&self) -> &[SkippedComponent] {
        &self.skipped
    }

    /// Write the report file and print the stdout rendering
    pub fn finish(&self) -> Result<()> {
        let json = JsonReporter::new(Some(self.location.clone())).report(&self.references, &self.skipped)?;
        info!("Report written to: {}", self.location.display());

        if self.quiet {
            return Ok(());
        }
        match self.format {
            ReportFormat::Terminal => TerminalReporter::new().report(&self.references, &self.skipped),
            ReportFormat::Json => println!("{}", json),
        }
        Ok(())
    }
}

impl SearchReporter for UseReporter {
    fn report_accepted(&mut self, reference: AcceptedReference) -> Result<(), ReporterError> {
        self.references.push(reference);
        Ok(())
    }

    fn report_skipped(&mut self, skipped: &[SkippedComponent]) {
        debug!("{} components skipped", skipped.len());
        self.skipped = skipped.to_vec();
    }
}

/// Remove whatever is at the report location so stale results never survive
pub fn clean_report_location(location: &Path) -> Result<()> {
    if !location.exists() {
        return Ok(());
    }
    debug!("Cleaning report location {}", location.display());

    let removed = if location.is_dir() {
        std::fs::remove_dir_all(location)
    } else {
        std::fs::remove_file(location)
    };
    removed
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to clean report location {}", location.display()))
}
