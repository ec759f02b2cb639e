// tests/unit_taxonomy.rs
use std::path::Path;

use tidemark_core::origin::Origin;
use tidemark_core::severity::Severity;
use tidemark_core::taxonomy::{format, Taxonomy};

#[test]
fn style_classification_takes_first_full_match() {
    let taxonomy = Taxonomy::new();
    taxonomy.initialize(Origin::Style).unwrap();

    let descriptor = taxonomy
        .classify_style("Line is longer than 100 characters (found 142).")
        .unwrap();
    assert_eq!(descriptor.symbol.as_ref(), "line-length");
    assert_eq!(descriptor.severity, Severity::CodeStyle);

    // Substring matches are not full matches.
    assert!(taxonomy
        .classify_style("prefix Line is longer than 100 characters (found 142).")
        .is_none());
}

#[test]
fn initialize_is_idempotent() {
    let taxonomy = Taxonomy::new();
    taxonomy.initialize(Origin::Style).unwrap();
    let first = taxonomy.descriptors_for(Origin::Style).len();
    taxonomy.initialize(Origin::Style).unwrap();
    assert_eq!(taxonomy.descriptors_for(Origin::Style).len(), first);
    assert!(first > 0);
}

#[test]
fn unknown_symbols_get_placeholder_descriptors() {
    let taxonomy = Taxonomy::new();
    let descriptor = taxonomy.from_symbol("SOME_FUTURE_DETECTOR");
    assert_eq!(descriptor.symbol.as_ref(), "SOME_FUTURE_DETECTOR");
    assert!(descriptor.pattern.is_none());

    // Interned: the same symbol resolves to the same descriptor.
    let again = taxonomy.from_symbol("SOME_FUTURE_DETECTOR");
    assert!(std::sync::Arc::ptr_eq(&descriptor, &again));
}

#[test]
fn format_types_sort_by_priority_then_symbol() {
    let xml = r#"
<finding-format>
  <root pattern="(?m)^(\S+):(\d+): " filename-group="1" line-group="2"/>
  <type symbol="zeta" pattern="z: (.+)" priority="5" text-group="1"/>
  <type symbol="alpha" pattern="a: (.+)" priority="5" text-group="1"/>
  <type symbol="omega" pattern="o: (.+)" priority="9" text-group="1"/>
</finding-format>
"#;
    let fmt = format::parse(xml, Path::new("fmt.xml")).unwrap();
    let order: Vec<&str> = fmt.types.iter().map(|t| t.symbol.as_ref()).collect();
    assert_eq!(order, ["omega", "alpha", "zeta"]);
}

#[test]
fn format_without_types_is_rejected() {
    let xml = r#"
<finding-format>
  <root pattern="(?m)^(\S+): " filename-group="1"/>
</finding-format>
"#;
    assert!(format::parse(xml, Path::new("fmt.xml")).is_err());
}
