use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use std::path::{Path, PathBuf};

use super::summary::{ComponentUsage, UsageSummary};
use crate::model::ReferenceKind;
use crate::scope::SkippedComponent;
use crate::search::AcceptedReference;

/// JSON reporter: writes to a file, or to stdout without one
pub struct JsonReporter {
    output_path: Option<PathBuf>,
}

impl JsonReporter {
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self { output_path }
    }

    /// Emit the document and hand it back for further rendering
    pub fn report(&self, references: &[AcceptedReference], skipped: &[SkippedComponent]) -> Result<String> {
        let report = JsonReport::new(references, skipped);
        let json = serde_json::to_string_pretty(&report).into_diagnostic()?;

        match &self.output_path {
            Some(path) => write(path, &json)?,
            None => println!("{}", json),
        }

        Ok(json)
    }
}

fn write(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, json)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write report to {}", path.display()))
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    total_references: usize,
    references: Vec<JsonReference<'a>>,
    by_component: Vec<ComponentUsage>,
    skipped: &'a [SkippedComponent],
}

#[derive(Serialize)]
struct JsonReference<'a> {
    kind: ReferenceKind,
    visibility: &'static str,
    source_component: &'a str,
    source_version: &'a str,
    source: String,
    target_component: &'a str,
    target: String,
    line: Option<u32>,
}

impl<'a> JsonReport<'a> {
    fn new(references: &'a [AcceptedReference], skipped: &'a [SkippedComponent]) -> Self {
        let summary = UsageSummary::from_references(references);

        Self {
            version: "1.0",
            total_references: references.len(),
            references: references
                .iter()
                .map(|r| JsonReference {
                    kind: r.kind,
                    visibility: r.visibility.as_str(),
                    source_component: &r.source_component.id,
                    source_version: &r.source_component.version,
                    source: r.source.to_string(),
                    target_component: &r.target_component,
                    target: r.target.to_string(),
                    line: r.line,
                })
                .collect(),
            by_component: summary.by_referenced(),
            skipped,
        }
    }
}
