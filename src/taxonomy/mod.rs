// src/taxonomy/mod.rs
//! Registry of finding-type definitions, grouped by originating tool.
//!
//! Two styles of taxonomy feed this registry: a hand-authored enumerated
//! set for the style checker (`style_rules`), and declarative
//! pattern-format definitions for free-text tool logs (`format`).

pub mod format;
pub mod style_rules;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use regex::Regex;

use crate::error::Result;
use crate::origin::Origin;
use crate::severity::Severity;

pub use format::{GenericFormat, RootPattern};

/// Capture-group offsets for extracting finding fields out of a pattern
/// match. `None` means the field is not extracted.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureOffsets {
    pub text: Option<usize>,
    pub line_start: Option<usize>,
    pub line_end: Option<usize>,
    pub column_start: Option<usize>,
    pub column_end: Option<usize>,
    pub source_text: Option<usize>,
}

/// Immutable definition of one finding type. Created once at taxonomy
/// initialization and shared for the rest of the process.
#[derive(Debug)]
pub struct FindingTypeDescriptor {
    pub symbol: Arc<str>,
    pub short_text: String,
    pub description: String,
    pub severity: Severity,
    pub origin: Origin,
    /// Message-matching pattern. Enumerated descriptors anchor it for
    /// full-match semantics; declarative sub-patterns are matched with
    /// looking-at semantics by the classifier.
    pub pattern: Option<Regex>,
    pub offsets: CaptureOffsets,
    /// Evaluation priority for declarative sub-patterns, highest first.
    pub priority: i32,
    /// The column is marked by a `^` caret below the echoed source line
    /// rather than captured by a group.
    pub caret_column: bool,
}

impl FindingTypeDescriptor {
    /// Hand-authored descriptor whose pattern matches a full tool message.
    ///
    /// # Errors
    /// Returns an error if the pattern does not compile.
    pub fn enumerated(
        symbol: &str,
        short_text: &str,
        severity: Severity,
        pattern: &str,
    ) -> Result<Self> {
        Ok(Self {
            symbol: Arc::from(symbol),
            short_text: short_text.to_string(),
            description: String::new(),
            severity,
            origin: Origin::Style,
            pattern: Some(Regex::new(&format!("^(?:{pattern})$"))?),
            offsets: CaptureOffsets::default(),
            priority: 0,
            caret_column: false,
        })
    }

    /// Minimal symbol-only descriptor for symbols the taxonomy does not
    /// enumerate (historical or foreign report data).
    #[must_use]
    pub fn placeholder(symbol: &str) -> Self {
        Self {
            symbol: Arc::from(symbol),
            short_text: symbol.to_string(),
            description: String::new(),
            severity: Severity::Warning,
            origin: Origin::System,
            pattern: None,
            offsets: CaptureOffsets::default(),
            priority: 0,
            caret_column: false,
        }
    }

    /// Full match of `message` against the descriptor pattern.
    #[must_use]
    pub fn matches(&self, message: &str) -> bool {
        self.pattern.as_ref().is_some_and(|p| p.is_match(message))
    }
}

#[derive(Default)]
struct Inner {
    by_symbol: HashMap<Arc<str>, Arc<FindingTypeDescriptor>>,
    by_origin: HashMap<Origin, Vec<Arc<FindingTypeDescriptor>>>,
    initialized: HashSet<Origin>,
}

/// Process-lifetime symbol → descriptor registry. Created at pipeline start
/// and passed explicitly to readers and merger; per-origin initialization
/// happens at most once even under concurrent first use.
#[derive(Default)]
pub struct Taxonomy {
    inner: Mutex<Inner>,
}

impl Taxonomy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the descriptor set for `origin`, at most once per process.
    /// Subsequent calls are no-ops.
    ///
    /// # Errors
    /// Returns an error if a built-in descriptor pattern fails to compile.
    pub fn initialize(&self, origin: Origin) -> Result<()> {
        let mut inner = self.inner.lock().expect("taxonomy poisoned");
        if !inner.initialized.insert(origin) {
            return Ok(());
        }
        if origin == Origin::Style {
            for descriptor in style_rules::build()? {
                Self::insert(&mut inner, Arc::new(descriptor));
            }
        }
        Ok(())
    }

    /// Interns descriptors loaded from a declarative format definition.
    pub fn register_format(&self, fmt: &GenericFormat) {
        let mut inner = self.inner.lock().expect("taxonomy poisoned");
        for descriptor in &fmt.types {
            Self::insert(&mut inner, Arc::clone(descriptor));
        }
    }

    fn insert(inner: &mut Inner, descriptor: Arc<FindingTypeDescriptor>) {
        inner
            .by_origin
            .entry(descriptor.origin)
            .or_default()
            .push(Arc::clone(&descriptor));
        inner
            .by_symbol
            .insert(Arc::clone(&descriptor.symbol), descriptor);
    }

    /// Returns the descriptor for `symbol`, synthesizing and registering a
    /// placeholder if unknown. Never fails: historical or foreign report
    /// data can carry symbols this build does not enumerate.
    #[must_use]
    pub fn from_symbol(&self, symbol: &str) -> Arc<FindingTypeDescriptor> {
        let mut inner = self.inner.lock().expect("taxonomy poisoned");
        if let Some(found) = inner.by_symbol.get(symbol) {
            return Arc::clone(found);
        }
        let descriptor = Arc::new(FindingTypeDescriptor::placeholder(symbol));
        Self::insert(&mut inner, Arc::clone(&descriptor));
        descriptor
    }

    /// Interned symbol for `symbol`, registering a placeholder if needed.
    #[must_use]
    pub fn intern(&self, symbol: &str) -> Arc<str> {
        Arc::clone(&self.from_symbol(symbol).symbol)
    }

    /// Matches a raw style-checker message against the enumerated
    /// descriptors in order; first full match wins.
    #[must_use]
    pub fn classify_style(&self, message: &str) -> Option<Arc<FindingTypeDescriptor>> {
        let inner = self.inner.lock().expect("taxonomy poisoned");
        inner
            .by_origin
            .get(&Origin::Style)?
            .iter()
            .find(|d| d.matches(message))
            .map(Arc::clone)
    }

    /// Descriptors registered for `origin`, in registration order.
    #[must_use]
    pub fn descriptors_for(&self, origin: Origin) -> Vec<Arc<FindingTypeDescriptor>> {
        let inner = self.inner.lock().expect("taxonomy poisoned");
        inner.by_origin.get(&origin).cloned().unwrap_or_default()
    }
}
