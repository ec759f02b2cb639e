// tests/unit_merge.rs
use std::sync::Arc;

use tidemark_core::finding::Finding;
use tidemark_core::merge::{
    apply_transforms, flag_new_findings, merge_reports, DiffOptions, Transform,
};
use tidemark_core::origin::Origin;
use tidemark_core::report::{FileEntry, Report};
use tidemark_core::severity::Severity;

fn entry(name: &str, package: &str, findings: Vec<Finding>) -> FileEntry {
    let class_name = name
        .rsplit('/')
        .next()
        .unwrap()
        .trim_end_matches(".java")
        .to_string();
    FileEntry {
        name: name.to_string(),
        package: package.to_string(),
        source_dir: "src".to_string(),
        class_name,
        loc: 100,
        findings,
    }
}

fn warning(symbol: &str, message: &str, line: i32, since: i64) -> Finding {
    let mut f = Finding::simple(
        Origin::BugFinder,
        Arc::from(symbol),
        Severity::Warning,
        message.to_string(),
        line,
    );
    f.since = Some(since);
    f
}

fn report(files: Vec<FileEntry>) -> Report {
    let mut r = Report::new(1_000);
    r.files = files;
    r
}

#[test]
fn merge_concatenates_shared_files_without_dedup() {
    let a = report(vec![entry(
        "src/demo/Widget.java",
        "demo",
        vec![warning("W1", "dup msg", 5, 1)],
    )]);
    let b = report(vec![
        entry(
            "src/demo/Widget.java",
            "demo",
            vec![warning("W1", "dup msg", 5, 1)],
        ),
        entry("src/demo/Other.java", "demo", vec![]),
    ]);

    let merged = merge_reports(vec![a, b], 2_000);
    assert_eq!(merged.files.len(), 2);
    let widget = merged.find_file("src/demo/Widget.java").unwrap();
    // Each tool is authoritative for its own findings.
    assert_eq!(widget.findings.len(), 2);
}

#[test]
fn transforms_apply_in_order() {
    let mut merged = report(vec![
        entry(
            "src/demo/Widget.java",
            "demo",
            vec![warning("W1", "m", 5, 1), warning("W2", "m", 6, 1)],
        ),
        entry("generated/Out.java", "gen", vec![warning("W1", "m", 1, 1)]),
    ]);

    apply_transforms(
        &mut merged,
        &[
            Transform::ExcludePath {
                pattern: "generated/*".to_string(),
            },
            Transform::ExcludeSymbol {
                symbol: "W2".to_string(),
            },
        ],
    )
    .unwrap();

    assert_eq!(merged.files.len(), 1);
    assert_eq!(merged.files[0].findings.len(), 1);
    assert_eq!(merged.files[0].findings[0].symbol.as_ref(), "W1");
}

#[test]
fn diff_of_identical_reports_flags_nothing() {
    let files = vec![entry(
        "src/demo/Widget.java",
        "demo",
        vec![
            warning("W1", "first", 10, 111),
            warning("W2", "second", 20, 222),
        ],
    )];
    let previous = report(files.clone());
    let mut current = report(files);

    flag_new_findings(&mut current, &previous, 9_999, &DiffOptions::default());

    let widget = current.find_file("src/demo/Widget.java").unwrap();
    assert_eq!(widget.findings.len(), 2);
    assert!(widget.findings.iter().all(|f| !f.new && !f.old));
    // Age is preserved, not reset.
    assert_eq!(widget.findings[0].since, Some(111));
    assert_eq!(widget.findings[1].since, Some(222));
}

#[test]
fn moved_finding_pairs_in_partial_pass_and_keeps_age() {
    let previous = report(vec![entry(
        "src/demo/Widget.java",
        "demo",
        vec![warning("W1", "msg", 10, 111)],
    )]);
    let mut current = report(vec![entry(
        "src/demo/Widget.java",
        "demo",
        vec![warning("W1", "msg", 12, 0)],
    )]);

    flag_new_findings(&mut current, &previous, 9_999, &DiffOptions::default());

    let widget = current.find_file("src/demo/Widget.java").unwrap();
    assert_eq!(widget.findings.len(), 1);
    let moved = &widget.findings[0];
    assert!(!moved.new, "moved finding must not be flagged new");
    assert_eq!(moved.since, Some(111));
}

#[test]
fn unmatched_sides_become_new_and_fixed() {
    let previous = report(vec![entry(
        "src/demo/Widget.java",
        "demo",
        vec![warning("GONE", "resolved issue", 4, 50)],
    )]);
    let mut current = report(vec![entry(
        "src/demo/Widget.java",
        "demo",
        vec![warning("FRESH", "introduced issue", 8, 0)],
    )]);

    flag_new_findings(&mut current, &previous, 9_999, &DiffOptions::default());

    let widget = current.find_file("src/demo/Widget.java").unwrap();
    assert_eq!(widget.findings.len(), 2);

    let fresh = widget.findings.iter().find(|f| f.new).unwrap();
    assert_eq!(fresh.symbol.as_ref(), "FRESH");
    assert_eq!(fresh.since, Some(9_999));

    // The resolved finding is re-inserted with OK severity.
    let fixed = widget.findings.iter().find(|f| f.old).unwrap();
    assert_eq!(fixed.symbol.as_ref(), "GONE");
    assert_eq!(fixed.severity, Severity::Ok);
}

#[test]
fn new_file_flags_only_age_tracked_findings() {
    let previous = report(vec![]);
    let mut info = Finding::simple(
        Origin::Style,
        Arc::from("todo-comment"),
        Severity::Info,
        "note".to_string(),
        1,
    );
    info.since = None;
    let mut current = report(vec![entry(
        "src/demo/New.java",
        "demo",
        vec![warning("W1", "m", 3, 0), info],
    )]);

    flag_new_findings(&mut current, &previous, 9_999, &DiffOptions::default());

    let new_file = current.find_file("src/demo/New.java").unwrap();
    let flagged: Vec<_> = new_file.findings.iter().filter(|f| f.new).collect();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].symbol.as_ref(), "W1");
}

#[test]
fn duplication_pairs_on_message_prefix_window() {
    let mut old_dup = Finding::simple(
        Origin::Duplication,
        Arc::from("duplicated-code"),
        Severity::Cpd,
        "Duplication of 50 tokens (10 lines), also found in: demo.B, demo.C".to_string(),
        5,
    );
    old_dup.since = Some(77);
    // Peer list reordered between runs; the prefix window tolerates it.
    let new_dup = Finding::simple(
        Origin::Duplication,
        Arc::from("duplicated-code"),
        Severity::Cpd,
        "Duplication of 50 tokens (10 lines), also found in: demo.C, demo.B".to_string(),
        5,
    );

    let previous = report(vec![entry("src/demo/A.java", "demo", vec![old_dup])]);
    let mut current = report(vec![entry("src/demo/A.java", "demo", vec![new_dup])]);

    let opts = DiffOptions { prefix_window: 40 };
    flag_new_findings(&mut current, &previous, 9_999, &opts);

    let a = current.find_file("src/demo/A.java").unwrap();
    assert_eq!(a.findings.len(), 1);
    assert!(!a.findings[0].new);
    assert_eq!(a.findings[0].since, Some(77));
}

#[test]
fn renamed_file_matches_by_class_and_package() {
    // Same package and class name, different path prefix.
    let previous = report(vec![entry(
        "old-src/demo/Widget.java",
        "demo",
        vec![warning("W1", "m", 10, 42)],
    )]);
    let mut current = report(vec![entry(
        "src/demo/Widget.java",
        "demo",
        vec![warning("W1", "m", 10, 0)],
    )]);

    flag_new_findings(&mut current, &previous, 9_999, &DiffOptions::default());

    let widget = current.find_file("src/demo/Widget.java").unwrap();
    assert!(!widget.findings[0].new);
    assert_eq!(widget.findings[0].since, Some(42));
}
