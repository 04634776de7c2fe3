//! Scope building integration tests
//!
//! These tests load the fixture product and check how components are split
//! into reference targets, scanned scope and skipped components.

use std::path::PathBuf;

use apiuse::model::{Container, ResolverError};
use apiuse::pattern::{parse_patterns, ArchiveFilter, IdPattern};
use apiuse::{Baseline, Component, ScopeBuilder, SnapshotLoader};

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn product() -> Baseline {
    SnapshotLoader::new()
        .load(&fixtures_path().join("product.json"))
        .expect("fixture product should load")
}

fn sorted_ids(ids: &std::collections::HashSet<String>) -> Vec<String> {
    let mut ids: Vec<_> = ids.iter().cloned().collect();
    ids.sort();
    ids
}

// ============================================================================
// Partitioning
// ============================================================================

#[test]
fn test_default_partition() {
    let baseline = product();
    let context = ScopeBuilder::default().build_context(baseline.components());

    assert_eq!(
        sorted_ids(&context.ids),
        vec!["org.example.app", "org.example.core", "org.example.util"],
        "System components are never reference targets"
    );

    let scope: Vec<_> = context.scope.components().iter().map(|c| c.id.as_str()).collect();
    assert_eq!(scope, vec!["org.example.app", "org.example.core"]);

    let skipped = context.skipped_list();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].id, "org.example.util");
    assert_eq!(skipped[0].version, "2.0.0");
    assert_eq!(
        skipped[0].errors,
        vec![ResolverError::new("Missing required bundle org.example.missing")]
    );
}

#[test]
fn test_scope_pattern_records_mismatches_as_skipped() {
    let baseline = product();
    let builder = ScopeBuilder::new(None, Some(IdPattern::compile("org\\.example\\.app").unwrap()));
    let context = builder.build_context(baseline.components());

    assert_eq!(context.scope.len(), 1);
    assert_eq!(context.scope.components()[0].id, "org.example.app");

    let skipped: Vec<_> = context.skipped_list().into_iter().map(|s| s.id).collect();
    assert_eq!(skipped, vec!["org.example.core", "org.example.util"]);

    // The id-set is not affected by the scope pattern
    assert_eq!(context.ids.len(), 3);
}

#[test]
fn test_reference_pattern_limits_targets_only() {
    let baseline = product();
    let builder = ScopeBuilder::new(Some(IdPattern::compile("org\\.example\\.util").unwrap()), None);
    let context = builder.build_context(baseline.components());

    assert_eq!(sorted_ids(&context.ids), vec!["org.example.util"]);
    assert_eq!(context.scope.len(), 2);
}

#[test]
fn test_id_patterns_match_the_whole_id() {
    let baseline = product();
    let builder = ScopeBuilder::new(Some(IdPattern::compile("org\\.example").unwrap()), None);
    let context = builder.build_context(baseline.components());

    assert!(context.ids.is_empty(), "A prefix is not a full match");
}

#[test]
fn test_broken_component_is_target_but_never_scanned() {
    let universe = vec![
        Component::new("a", "1.0").system(),
        Component::new("b", "1.0"),
        Component::new("c", "1.0").with_error("E1"),
    ];
    let context = ScopeBuilder::default().build_context(&universe);

    assert!(context.ids.contains("c"));
    assert!(!context.scope.contains(&universe[2]));
    assert_eq!(context.skipped.len(), 1);
    assert!(context.skipped.iter().all(|s| s.has_errors()));
}

#[test]
fn test_rebuilding_gives_the_same_context() {
    let baseline = product();
    let builder = ScopeBuilder::new(None, Some(IdPattern::compile("org\\.example\\..*").unwrap()));

    let first = builder.build_context(baseline.components());
    let second = builder.build_context(baseline.components());

    assert_eq!(first.ids, second.ids);
    assert_eq!(first.scope.components(), second.scope.components());
    assert_eq!(first.skipped_list(), second.skipped_list());
}

// ============================================================================
// Pattern lists
// ============================================================================

#[test]
fn test_parse_patterns() {
    assert_eq!(parse_patterns(None), None);
    assert_eq!(parse_patterns(Some("  ")), None);
    assert_eq!(
        parse_patterns(Some("bundle.x:/META-INF/foo.jar, ,bundle.y:lib.jar")),
        Some(vec![
            "bundle.x:/META-INF/foo.jar".to_string(),
            "bundle.y:lib.jar".to_string()
        ])
    );
}

#[test]
fn test_archive_filter_matches_owner_and_suffix() {
    let filter = ArchiveFilter::new(&parse_patterns(Some("bundle.x:/META-INF/foo.jar")).unwrap());

    let owned_by_x = Component::new("bundle.x", "1.0")
        .with_container(Container::archive("lib/META-INF/foo.jar"));
    let owned_by_y = Component::new("bundle.y", "1.0")
        .with_container(Container::archive("lib/META-INF/foo.jar"));

    assert!(filter.excludes(&owned_by_x.containers[0]));
    assert!(!filter.excludes(&owned_by_y.containers[0]));
}

#[test]
fn test_malformed_archive_patterns_are_ignored() {
    let filter = ArchiveFilter::new(&["no-colon".to_string(), "a:b:c".to_string()]);
    assert!(filter.is_empty());
}
