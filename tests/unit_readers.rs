// tests/unit_readers.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use tidemark_core::origin::Origin;
use tidemark_core::readers::{
    BugReader, CoverageReader, DuplicationReader, FindingMap, GenericReader, ReadContext,
    ReportReader, StyleReader,
};
use tidemark_core::resource::ResourceRegistry;
use tidemark_core::severity::Severity;
use tidemark_core::taxonomy::{format, Taxonomy};

fn write_report(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn ctx<'a>(
    registry: &'a ResourceRegistry,
    taxonomy: &'a Taxonomy,
    roots: &'a [PathBuf],
) -> ReadContext<'a> {
    ReadContext {
        registry,
        taxonomy,
        source_roots: roots,
        verbose: false,
    }
}

#[test]
fn style_reader_classifies_and_falls_back_to_rule_tail() {
    let dir = TempDir::new().unwrap();
    let report = write_report(
        &dir,
        "style.xml",
        r#"<?xml version="1.0"?>
<checkresult>
  <file name="src/demo/Widget.java">
    <error severity="warning" line="7" column="81"
           message="Line is longer than 80 characters (found 95)."
           source="com.tool.rules.LineLengthCheck"/>
    <error severity="error" line="12" column="5"
           message="Some unanticipated diagnostic text."
           source="com.tool.rules.FooBarCheck"/>
  </file>
  <file name="generated/Out.java">
    <error severity="error" line="1" column="1" message="whatever" source="x.Y"/>
  </file>
</checkresult>
"#,
    );

    let registry = ResourceRegistry::new();
    registry.register("src/demo/Widget.java", "demo", "src").unwrap();
    let taxonomy = Taxonomy::new();
    taxonomy.initialize(Origin::Style).unwrap();
    let roots = vec![];
    let map = StyleReader
        .read(&report, &ctx(&registry, &taxonomy, &roots))
        .unwrap();

    // The unregistered file is dropped without error.
    assert_eq!(map.len(), 1);
    let findings = map.values().next().unwrap();
    assert_eq!(findings.len(), 2);

    let classified = &findings[0];
    assert_eq!(classified.symbol.as_ref(), "line-length");
    assert_eq!(classified.severity, Severity::CodeStyle);
    assert_eq!(classified.line, 7);
    assert_eq!(classified.column, 81);

    let fallback = &findings[1];
    assert_eq!(fallback.symbol.as_ref(), "FooBarCheck");
    assert_eq!(fallback.severity, Severity::Error);
}

#[test]
fn duplication_fans_out_excluding_self() {
    let dir = TempDir::new().unwrap();
    let report = write_report(
        &dir,
        "cpd.xml",
        r#"<?xml version="1.0"?>
<duplications>
  <duplication lines="10" tokens="50">
    <file path="src/demo/A.java" line="5"/>
    <file path="src/demo/B.java" line="40"/>
    <file path="src/demo/C.java" line="77"/>
  </duplication>
</duplications>
"#,
    );

    let registry = ResourceRegistry::new();
    for name in ["A", "B", "C"] {
        registry
            .register(&format!("src/demo/{name}.java"), "demo", "src")
            .unwrap();
    }
    let taxonomy = Taxonomy::new();
    let roots = vec![];
    let map = DuplicationReader
        .read(&report, &ctx(&registry, &taxonomy, &roots))
        .unwrap();

    assert_eq!(map.len(), 3);
    let total: usize = map.values().map(Vec::len).sum();
    assert_eq!(total, 3);

    let a = registry.lookup_path("src/demo/A.java").unwrap();
    let finding = &map[&a][0];
    assert_eq!(finding.severity, Severity::Cpd);
    assert_eq!(finding.line, 5);
    assert_eq!(finding.end_line, 14);
    assert!(finding.message.contains("50 tokens"));
    assert!(finding.message.contains("demo.B"));
    assert!(finding.message.contains("demo.C"));
    assert!(!finding.message.contains("demo.A"));
}

#[test]
fn bug_reader_line_override_policy() {
    let dir = TempDir::new().unwrap();
    let report = write_report(
        &dir,
        "bugs.xml",
        r#"<?xml version="1.0"?>
<bug-collection>
  <bug-instance type="NULL_DEREF" priority="1">
    <class name="com.acme.Widget"/>
    <source-line start="12" end="14"/>
    <method><source-line start="40"/></method>
    <source-line start="99" end="99"/>
  </bug-instance>
  <bug-instance type="DEAD_STORE" priority="2">
    <class name="com.acme.Widget"/>
    <method><source-line start="40"/></method>
    <count>3</count>
  </bug-instance>
  <bug-instance type="ORPHAN" priority="1">
    <class name="com.acme.Missing"/>
    <source-line start="1"/>
  </bug-instance>
</bug-collection>
"#,
    );

    let registry = ResourceRegistry::new();
    registry
        .register("src/com/acme/Widget.java", "com.acme", "src")
        .unwrap();
    let taxonomy = Taxonomy::new();
    let roots = vec![];
    let map = BugReader
        .read(&report, &ctx(&registry, &taxonomy, &roots))
        .unwrap();

    // The instance anchored on an unknown class is dropped.
    assert_eq!(map.len(), 1);
    let findings = map.values().next().unwrap();
    assert_eq!(findings.len(), 2);

    let null_deref = findings
        .iter()
        .find(|f| f.symbol.as_ref() == "NULL_DEREF")
        .unwrap();
    // The first positive line wins; later source lines are ignored.
    assert_eq!(null_deref.line, 12);
    assert_eq!(null_deref.end_line, 14);
    assert_eq!(null_deref.severity, Severity::Error);

    let dead_store = findings
        .iter()
        .find(|f| f.symbol.as_ref() == "DEAD_STORE")
        .unwrap();
    // No top-level source line: the method's own line is used.
    assert_eq!(dead_store.line, 40);
    assert_eq!(dead_store.severity, Severity::Warning);
    assert_eq!(dead_store.counter, Some(3));
}

#[test]
fn coverage_reader_emits_covered_lines_only() {
    let dir = TempDir::new().unwrap();
    let report = write_report(
        &dir,
        "coverage.xml",
        r#"<?xml version="1.0"?>
<coverage>
  <class name="demo.Widget" filename="src/demo/Widget.java">
    <lines>
      <line number="3" hits="7"/>
      <line number="4" hits="0"/>
      <line number="5" hits="1"/>
    </lines>
  </class>
</coverage>
"#,
    );

    let registry = ResourceRegistry::new();
    registry.register("src/demo/Widget.java", "demo", "src").unwrap();
    let taxonomy = Taxonomy::new();
    let roots = vec![];
    let map = CoverageReader
        .read(&report, &ctx(&registry, &taxonomy, &roots))
        .unwrap();

    let findings = map.values().next().unwrap();
    assert_eq!(findings.len(), 2);
    assert!(findings.iter().all(|f| f.severity == Severity::Coverage));
    assert!(findings.iter().all(|f| f.origin == Origin::Coverage));
    let first = findings.iter().find(|f| f.line == 3).unwrap();
    assert_eq!(first.counter, Some(7));
}

#[test]
fn malformed_document_becomes_system_finding() {
    let dir = TempDir::new().unwrap();
    let report = write_report(&dir, "broken.xml", "<oops ><<<");

    let registry = ResourceRegistry::new();
    let taxonomy = Taxonomy::new();
    let roots = vec![];
    let map = StyleReader
        .read(&report, &ctx(&registry, &taxonomy, &roots))
        .unwrap();

    assert_eq!(map.len(), 1);
    let findings = map.values().next().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].origin, Origin::System);
    assert_eq!(findings[0].severity, Severity::Error);
    assert!(findings[0].global);
}

#[test]
fn generic_reparse_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let log = write_report(
        &dir,
        "tool.log",
        "src/demo/Widget.java:3: error: broken widget\nsrc/demo/Widget.java:9: warning: loose bolt\n",
    );
    let fmt = format::parse(
        r#"
<finding-format>
  <root pattern="(?m)^([^\s:]+):(\d+): " filename-group="1" line-group="2"/>
  <type symbol="log-error" pattern="error: (.+)" priority="10" severity="error" text-group="1"/>
  <type symbol="log-warning" pattern="warning: (.+)" priority="5" severity="warning" text-group="1"/>
</finding-format>
"#,
        Path::new("fmt.xml"),
    )
    .unwrap();

    let registry = ResourceRegistry::new();
    registry.register("src/demo/Widget.java", "demo", "src").unwrap();
    let taxonomy = Taxonomy::new();
    let roots = vec![];
    let context = ctx(&registry, &taxonomy, &roots);
    let reader = GenericReader::new(vec![Arc::new(fmt)]);

    let mut target = FindingMap::new();
    reader.read_into(&log, &context, &mut target).unwrap();
    let once: usize = target.values().map(Vec::len).sum();
    reader.read_into(&log, &context, &mut target).unwrap();
    let twice: usize = target.values().map(Vec::len).sum();

    assert_eq!(once, 2);
    assert_eq!(once, twice);
}
