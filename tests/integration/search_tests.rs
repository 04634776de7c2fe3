//! End-to-end search tests
//!
//! These tests run the whole pipeline over the fixture snapshots: loading,
//! scope building, searching and reporting.

use std::path::PathBuf;

use apiuse::baseline::BaselineGuard;
use apiuse::model::DescriptionModifier;
use apiuse::pattern::IdPattern;
use apiuse::search::{AcceptedReference, ReporterError};
use apiuse::{
    ReportFormat, ScopeBuilder, SearchEngine, SearchMask, SearchReporter, SkippedComponent,
    SnapshotLoader, UseConfig, UseReporter, UseSearchRequestor, UseTask, Visibility,
};
use tempfile::TempDir;

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[derive(Default)]
struct Collected {
    accepted: Vec<AcceptedReference>,
    skipped: Vec<SkippedComponent>,
    skipped_calls: usize,
}

impl SearchReporter for Collected {
    fn report_accepted(&mut self, reference: AcceptedReference) -> Result<(), ReporterError> {
        self.accepted.push(reference);
        Ok(())
    }

    fn report_skipped(&mut self, skipped: &[SkippedComponent]) {
        self.skipped_calls += 1;
        self.skipped = skipped.to_vec();
    }
}

impl Collected {
    fn targets(&self) -> Vec<String> {
        self.accepted
            .iter()
            .map(|r| format!("{} -> {}", r.source, r.target))
            .collect()
    }
}

struct Search {
    mask: SearchMask,
    archives: Vec<String>,
    scope: Option<&'static str>,
    parallel: bool,
}

impl Search {
    fn new(mask: SearchMask) -> Self {
        Self {
            mask,
            archives: Vec::new(),
            scope: None,
            parallel: false,
        }
    }

    fn run(&self) -> Collected {
        let baseline = SnapshotLoader::new()
            .load(&fixtures_path().join("product.json"))
            .unwrap();
        let guard = BaselineGuard::new(baseline);

        let scope = self.scope.map(|p| IdPattern::compile(p).unwrap());
        let context = ScopeBuilder::new(None, scope).build_context(guard.components());
        let skipped = context.skipped_list();

        let requestor = UseSearchRequestor::new(&guard, context.ids, context.scope, self.mask)
            .with_archive_patterns(&self.archives);

        let mut collected = Collected::default();
        SearchEngine::new()
            .with_parallel(self.parallel)
            .search(&requestor, &mut collected, &skipped)
            .unwrap();
        collected
    }
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_both_kinds_accept_every_cross_component_reference() {
    let collected = Search::new(SearchMask::both()).run();

    assert_eq!(
        collected.targets(),
        vec![
            "org.example.app.Main -> org.example.core.Api#start()V",
            "org.example.app.Main -> org.example.core.internal.Impl",
            "org.example.app.legacy.Old -> org.example.core.internal.Impl",
            "org.example.core.Api -> org.example.util.Strings#trim(Ljava/lang/String;)Ljava/lang/String;",
        ]
    );

    let visibility: Vec<_> = collected.accepted.iter().map(|r| r.visibility).collect();
    assert_eq!(
        visibility,
        vec![
            Visibility::Api,
            Visibility::Internal,
            Visibility::Internal,
            Visibility::Unannotated
        ]
    );
}

#[test]
fn test_api_only() {
    let collected = Search::new(SearchMask::new(true, false)).run();

    assert_eq!(
        collected.targets(),
        vec!["org.example.app.Main -> org.example.core.Api#start()V"]
    );
    assert_eq!(collected.accepted[0].line, Some(14));
}

#[test]
fn test_internal_only() {
    let collected = Search::new(SearchMask::new(false, true)).run();

    assert_eq!(collected.accepted.len(), 2);
    assert!(collected
        .accepted
        .iter()
        .all(|r| r.visibility == Visibility::Internal && r.target_component == "org.example.core"));
}

#[test]
fn test_unannotated_targets_need_both_kinds() {
    let api = Search::new(SearchMask::new(true, false)).run();
    let internal = Search::new(SearchMask::new(false, true)).run();

    assert!(api.accepted.iter().all(|r| r.target_component != "org.example.util"));
    assert!(internal.accepted.iter().all(|r| r.target_component != "org.example.util"));
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_archive_patterns_exclude_containers() {
    let mut search = Search::new(SearchMask::new(false, true));
    search.archives = vec!["org.example.app:legacy.jar".to_string()];
    let collected = search.run();

    assert_eq!(
        collected.targets(),
        vec!["org.example.app.Main -> org.example.core.internal.Impl"]
    );
}

#[test]
fn test_scope_pattern_restricts_scanned_components() {
    let mut search = Search::new(SearchMask::both());
    search.scope = Some("org\\.example\\.core");
    let collected = search.run();

    assert_eq!(collected.accepted.len(), 1);
    assert_eq!(collected.accepted[0].source_component.id, "org.example.core");

    let skipped: Vec<_> = collected.skipped.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(skipped, vec!["org.example.app", "org.example.util"]);
}

#[test]
fn test_skipped_reported_once_in_order() {
    let collected = Search::new(SearchMask::both()).run();

    assert_eq!(collected.skipped_calls, 1);
    assert_eq!(collected.skipped.len(), 1);
    assert_eq!(collected.skipped[0].id, "org.example.util");
}

#[test]
fn test_parallel_search_is_deterministic() {
    let sequential = Search::new(SearchMask::both()).run();
    let mut search = Search::new(SearchMask::both());
    search.parallel = true;
    let parallel = search.run();

    assert_eq!(sequential.accepted, parallel.accepted);
    assert_eq!(sequential.skipped, parallel.skipped);
}

// ============================================================================
// Description overrides
// ============================================================================

#[test]
fn test_package_overrides_reclassify_targets() {
    let mut baseline = SnapshotLoader::new()
        .load(&fixtures_path().join("product.json"))
        .unwrap();
    let modifier = DescriptionModifier::new(&["\\.internal$".to_string()], &["^org\\.example".to_string()])
        .unwrap();
    baseline.apply_modifier(&modifier);

    let context = ScopeBuilder::default().build_context(baseline.components());
    let skipped = context.skipped_list();
    let requestor = UseSearchRequestor::new(&baseline, context.ids, context.scope, SearchMask::new(true, false));

    let mut collected = Collected::default();
    SearchEngine::new().search(&requestor, &mut collected, &skipped).unwrap();

    // API patterns win over internal ones, so the internal package is now API
    let targets: Vec<_> = collected.accepted.iter().map(|r| r.target.type_name.as_str()).collect();
    assert_eq!(
        targets,
        vec!["org.example.core.internal.Impl", "org.example.core.internal.Impl"]
    );
}

// ============================================================================
// Snapshot directories
// ============================================================================

#[test]
fn test_directory_snapshot() {
    let baseline = SnapshotLoader::new()
        .load(&fixtures_path().join("components"))
        .unwrap();
    assert_eq!(baseline.name(), "components");

    let context = ScopeBuilder::default().build_context(baseline.components());
    let skipped = context.skipped_list();
    let requestor = UseSearchRequestor::new(&baseline, context.ids, context.scope, SearchMask::new(true, false));

    let mut collected = Collected::default();
    let stats = SearchEngine::new().search(&requestor, &mut collected, &skipped).unwrap();

    assert_eq!(stats.references_examined, 2);
    assert_eq!(
        collected.targets(),
        vec!["org.sample.app.Client -> org.sample.api.Service#call()V"]
    );
}

// ============================================================================
// Task
// ============================================================================

#[test]
fn test_task_writes_report() {
    let temp_dir = TempDir::new().unwrap();
    let report = temp_dir.path().join("reports").join("use.json");

    let config = UseConfig {
        baseline: Some(fixtures_path().join("product.json")),
        report: Some(report.clone()),
        include_api: true,
        include_internal: true,
        format: ReportFormat::Json,
        ..UseConfig::default()
    };

    let task = UseTask::new(config).unwrap();
    let mut reporter = UseReporter::new(&report).with_quiet(true);
    let stats = task.execute(&mut reporter).unwrap();
    reporter.finish().unwrap();

    assert_eq!(stats.components_scanned, 2);
    assert_eq!(stats.references_accepted, 4);

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["total_references"], 4);
    assert_eq!(value["skipped"][0]["id"], "org.example.util");
    assert_eq!(value["by_component"][0]["component"], "org.example.core");
    assert_eq!(value["by_component"][0]["used_by"][0]["component"], "org.example.app");
    assert_eq!(value["by_component"][0]["used_by"][0]["internal"], 2);
}

#[test]
fn test_task_loads_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = UseConfig::from_file(&fixtures_path().join("apiuse.yml")).unwrap();
    config.baseline = Some(fixtures_path().join("product.json"));
    config.report = Some(temp_dir.path().join("report.json"));

    let task = UseTask::new(config).unwrap();
    let mut reporter = UseReporter::new(temp_dir.path().join("report.json")).with_quiet(true);
    let stats = task.execute(&mut reporter).unwrap();

    assert_eq!(stats.containers_skipped, 1);
    assert_eq!(stats.references_accepted, 3);
}
