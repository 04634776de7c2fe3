//! One API use scan, from validated configuration to reported results

use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::Path;
use tracing::{debug, info};

use crate::baseline::{BaselineGuard, SnapshotLoader};
use crate::config::{CompiledPatterns, ConfigError, UseConfig};
use crate::report::clean_report_location;
use crate::scope::ScopeBuilder;
use crate::search::{SearchEngine, SearchReporter, SearchStats, UseSearchRequestor};

/// A validated scan, ready to execute
#[derive(Debug)]
pub struct UseTask {
    config: UseConfig,
    patterns: CompiledPatterns,
    progress: bool,
}

impl UseTask {
    /// Validate `config`; every fatal configuration error surfaces here
    pub fn new(config: UseConfig) -> Result<Self, ConfigError> {
        let patterns = config.validate()?;
        Ok(Self {
            config,
            patterns,
            progress: false,
        })
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &UseConfig {
        &self.config
    }

    /// Run the scan, streaming results into `reporter`.
    ///
    /// The baseline is disposed on every path out of this function, after
    /// the reporter has received the skipped components.
    pub fn execute<P>(&self, reporter: &mut P) -> Result<SearchStats>
    where
        P: SearchReporter + ?Sized,
    {
        let (Some(baseline_location), Some(report_location)) =
            (self.config.baseline.as_deref(), self.config.report.as_deref())
        else {
            // validate() already guarantees both
            return Err(ConfigError::MissingBaselineLocation).into_diagnostic();
        };

        self.write_debug_header(baseline_location, report_location);
        clean_report_location(report_location)?;

        let loaded = SnapshotLoader::new()
            .load(baseline_location)
            .into_diagnostic()
            .wrap_err("Failed to load baseline")?;
        let mut baseline = BaselineGuard::new(loaded);

        if let Some(modifier) = &self.patterns.modifier {
            info!("Applying API description overrides...");
            let updated = baseline.apply_modifier(modifier);
            info!("Updated {} API descriptions", updated);
        }

        let builder = ScopeBuilder::new(self.patterns.reference.clone(), self.patterns.scope.clone());
        let context = builder.build_context(baseline.components());
        let skipped = context.skipped_list();

        let requestor = UseSearchRequestor::new(&baseline, context.ids, context.scope, self.config.mask())
            .with_archive_patterns(&self.patterns.archives);

        let engine = SearchEngine::new()
            .with_parallel(self.config.parallel)
            .with_progress(self.progress && !self.config.parallel);

        info!("Searching for references...");
        engine
            .search(&requestor, reporter, &skipped)
            .into_diagnostic()
            .wrap_err("Search failed")
    }

    fn write_debug_header(&self, baseline: &Path, report: &Path) {
        debug!("Product location to search: {}", baseline.display());
        debug!("Report location: {}", report.display());
        debug!("Searching for API references: {}", self.config.include_api);
        debug!("Searching for internal references: {}", self.config.include_internal);
        match &self.config.scope_pattern {
            Some(pattern) => debug!("Scope pattern: {}", pattern),
            None => debug!("No scope pattern defined, searching all components"),
        }
        match &self.config.reference_pattern {
            Some(pattern) => debug!("Reference pattern: {}", pattern),
            None => debug!("No reference pattern defined, reporting references to all components"),
        }
    }
}
