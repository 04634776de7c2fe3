use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::{AcceptedReference, ReporterError, SearchReporter, SearchRequestor};
use crate::model::Component;
use crate::scope::SkippedComponent;

/// Counters collected during a scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub components_scanned: usize,
    pub containers_skipped: usize,
    pub members_skipped: usize,
    pub references_examined: usize,
    pub references_accepted: usize,
}

impl SearchStats {
    fn merge(&mut self, other: &SearchStats) {
        self.components_scanned += other.components_scanned;
        self.containers_skipped += other.containers_skipped;
        self.members_skipped += other.members_skipped;
        self.references_examined += other.references_examined;
        self.references_accepted += other.references_accepted;
    }
}

impl std::fmt::Display for SearchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} references accepted of {} examined in {} components ({} containers, {} members skipped)",
            self.references_accepted,
            self.references_examined,
            self.components_scanned,
            self.containers_skipped,
            self.members_skipped
        )
    }
}

/// Accepted references of one component, in scan order
struct ComponentScan {
    accepted: Vec<AcceptedReference>,
    stats: SearchStats,
}

/// Drives a requestor over its scope and streams results to a reporter
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    parallel: bool,
    progress: bool,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan scope components on the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Show a progress bar while scanning sequentially
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Run the search.
    ///
    /// `skipped` is handed to the reporter exactly once, after the scan,
    /// whether or not the scan completed.
    pub fn search<R, P>(
        &self,
        requestor: &R,
        reporter: &mut P,
        skipped: &[SkippedComponent],
    ) -> Result<SearchStats, ReporterError>
    where
        R: SearchRequestor + Sync,
        P: SearchReporter + ?Sized,
    {
        let result = if self.parallel {
            self.scan_parallel(requestor, reporter)
        } else {
            self.scan_sequential(requestor, reporter)
        };

        reporter.report_skipped(skipped);

        if let Ok(stats) = &result {
            info!("Search complete: {}", stats);
        }
        result
    }

    fn scan_sequential<R, P>(&self, requestor: &R, reporter: &mut P) -> Result<SearchStats, ReporterError>
    where
        R: SearchRequestor,
        P: SearchReporter + ?Sized,
    {
        let components = requestor.scope().components();
        let pb = self.progress_bar(components.len());
        let mut stats = SearchStats::default();

        for component in components {
            if let Some(scan) = scan_component(requestor, component) {
                stats.merge(&scan.stats);
                for accepted in scan.accepted {
                    reporter.report_accepted(accepted)?;
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }
        Ok(stats)
    }

    fn scan_parallel<R, P>(&self, requestor: &R, reporter: &mut P) -> Result<SearchStats, ReporterError>
    where
        R: SearchRequestor + Sync,
        P: SearchReporter + ?Sized,
    {
        let components = requestor.scope().components();
        info!("Scanning {} components in parallel...", components.len());

        // Collected in scope order so delivery stays deterministic
        let scans: Vec<Option<ComponentScan>> = components
            .par_iter()
            .map(|component| scan_component(requestor, component))
            .collect();

        let mut stats = SearchStats::default();
        for scan in scans.into_iter().flatten() {
            stats.merge(&scan.stats);
            for accepted in scan.accepted {
                reporter.report_accepted(accepted)?;
            }
        }
        Ok(stats)
    }

    fn progress_bar(&self, len: usize) -> Option<ProgressBar> {
        if !self.progress {
            return None;
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        Some(pb)
    }
}

/// Scan one component; `None` when the requestor vetoes it
fn scan_component<R>(requestor: &R, component: &Component) -> Option<ComponentScan>
where
    R: SearchRequestor + ?Sized,
{
    if !requestor.accept_component(component) {
        debug!("Requestor declined {}", component.key());
        return None;
    }

    let kinds = requestor.reference_kinds();
    let mut stats = SearchStats {
        components_scanned: 1,
        ..SearchStats::default()
    };
    let mut accepted = Vec::new();

    for container in &component.containers {
        if !requestor.accept_container(container) {
            stats.containers_skipped += 1;
            continue;
        }

        for member in &container.members {
            if !requestor.accept_member(member) {
                stats.members_skipped += 1;
                continue;
            }

            for reference in member.references.iter().filter(|r| kinds.contains(r.kind)) {
                stats.references_examined += 1;
                if !requestor.accept_reference(reference) {
                    continue;
                }
                let visibility = requestor.visibility_of(reference);
                if let Some(result) = AcceptedReference::new(reference, visibility) {
                    stats.references_accepted += 1;
                    accepted.push(result);
                }
            }
        }
    }

    debug!(
        "{}: {} of {} references accepted",
        component.key(),
        stats.references_accepted,
        stats.references_examined
    );
    Some(ComponentScan { accepted, stats })
}
