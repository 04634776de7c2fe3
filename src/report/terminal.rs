use colored::Colorize;
use std::collections::BTreeMap;
use std::fmt::Write;

use super::summary::{UsageCount, UsageSummary};
use crate::model::Visibility;
use crate::scope::SkippedComponent;
use crate::search::AcceptedReference;

/// Terminal reporter with colored output
pub struct TerminalReporter {
    /// List every reference under its component pair
    show_references: bool,
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            show_references: true,
        }
    }

    pub fn with_references(mut self, show: bool) -> Self {
        self.show_references = show;
        self
    }

    pub fn report(&self, references: &[AcceptedReference], skipped: &[SkippedComponent]) {
        print!("{}", self.render(references, skipped));
    }

    pub fn render(&self, references: &[AcceptedReference], skipped: &[SkippedComponent]) -> String {
        let mut out = String::new();

        if references.is_empty() {
            let _ = writeln!(out, "{}", "No references found.".green().bold());
        } else {
            self.render_references(&mut out, references);
        }

        if !skipped.is_empty() {
            self.render_skipped(&mut out, skipped);
        }

        out
    }

    fn render_references(&self, out: &mut String, references: &[AcceptedReference]) {
        let summary = UsageSummary::from_references(references);

        // referenced -> referencing -> references
        let mut grouped: BTreeMap<&str, BTreeMap<&str, Vec<&AcceptedReference>>> = BTreeMap::new();
        for reference in references {
            grouped
                .entry(reference.target_component.as_str())
                .or_default()
                .entry(reference.source_component.id.as_str())
                .or_default()
                .push(reference);
        }

        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}",
            format!("Found {} references:", references.len()).yellow().bold()
        );
        let _ = writeln!(out);

        for usage in summary.by_referenced() {
            let _ = writeln!(
                out,
                "{} {}",
                usage.component.cyan().bold(),
                counts(&usage.total).dimmed()
            );

            for user in &usage.used_by {
                let _ = writeln!(out, "  {} {} {}", "←".dimmed(), user.component.white(), counts(&user.count));

                if !self.show_references {
                    continue;
                }
                let items = grouped
                    .get(usage.component.as_str())
                    .and_then(|users| users.get(user.component.as_str()));
                for item in items.into_iter().flatten() {
                    self.render_item(out, item);
                }
            }
            let _ = writeln!(out);
        }

        let total = summary
            .by_referenced()
            .iter()
            .fold(UsageCount::default(), |acc, u| UsageCount {
                api: acc.api + u.total.api,
                internal: acc.internal + u.total.internal,
                unannotated: acc.unannotated + u.total.unannotated,
            });

        let _ = writeln!(out, "{}", "─".repeat(60).dimmed());
        let mut parts = Vec::new();
        if total.api > 0 {
            parts.push(format!("{} api", total.api).green().to_string());
        }
        if total.internal > 0 {
            parts.push(format!("{} internal", total.internal).red().to_string());
        }
        if total.unannotated > 0 {
            parts.push(format!("{} unannotated", total.unannotated).dimmed().to_string());
        }
        let _ = writeln!(out, "Summary: {}", parts.join(", "));
    }

    fn render_item(&self, out: &mut String, item: &AcceptedReference) {
        let visibility = match item.visibility {
            Visibility::Api => "api".green().bold(),
            Visibility::Internal => "internal".red().bold(),
            Visibility::Unannotated => "unannotated".dimmed(),
        };

        let line = item
            .line
            .map(|l| format!(":{}", l))
            .unwrap_or_default();

        let _ = writeln!(
            out,
            "      {} {}{} {} {} [{}]",
            visibility,
            item.source.to_string().dimmed(),
            line.dimmed(),
            "→".dimmed(),
            item.target,
            item.kind.display_name().dimmed()
        );
    }

    fn render_skipped(&self, out: &mut String, skipped: &[SkippedComponent]) {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}",
            format!("Skipped {} components:", skipped.len()).yellow()
        );
        for component in skipped {
            let _ = writeln!(out, "  {} ({})", component.id.white(), component.version.dimmed());
            for error in &component.errors {
                let _ = writeln!(out, "    {} {}", "✗".red(), error.message);
            }
        }
    }
}

fn counts(count: &UsageCount) -> String {
    format!("(api: {}, internal: {}, unannotated: {})", count.api, count.internal, count.unannotated)
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}
