// src/resource.rs
//! Canonical source-file identities.
//!
//! Tools refer to the same file inconsistently: absolute path, relative
//! path, dotted class name. The registry converges them on one
//! [`ResourceInfo`] per file via two indices kept in lockstep: by
//! canonical path and by (package, class name).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{Result, TidemarkError};

/// File extensions registered when scanning source roots.
const SOURCE_EXTS: &[&str] = &[
    "java", "kt", "kts", "scala", "groovy", "rs", "py", "ts", "js", "go", "c", "cc", "cpp", "h",
    "hpp",
];

/// One logical source file. Identity is the (name, package, source_dir)
/// triple; the class name and line count are derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceInfo {
    /// Canonical resource name (separator-normalized path).
    pub name: String,
    /// Dot-separated package, empty for the default package.
    pub package: String,
    /// Source root this file was found under.
    pub source_dir: String,
    /// File stem, with compiler-synthesized inner units collapsed.
    pub class_name: String,
    #[serde(skip)]
    line_count: OnceLock<usize>,
}

impl PartialEq for ResourceInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.package == other.package
            && self.source_dir == other.source_dir
    }
}

impl Eq for ResourceInfo {}

impl std::hash::Hash for ResourceInfo {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.package.hash(state);
        self.source_dir.hash(state);
    }
}

impl ResourceInfo {
    #[must_use]
    pub fn new(name: &str, package: &str, source_dir: &str) -> Self {
        let canonical = canonical_name(name);
        let class_name = class_name_of(&canonical);
        Self {
            name: canonical,
            package: package.to_string(),
            source_dir: source_dir.to_string(),
            class_name,
            line_count: OnceLock::new(),
        }
    }

    /// Number of lines in the file, read lazily on first use.
    /// Unreadable files count as zero lines.
    pub fn line_count(&self) -> usize {
        *self.line_count.get_or_init(|| {
            fs::read_to_string(&self.name)
                .map(|s| s.lines().count())
                .unwrap_or(0)
        })
    }
}

/// Normalizes a raw file reference to its canonical form: forward slashes,
/// no leading `./`, and inner-unit references (`Outer$Inner.ext`) collapsed
/// to the enclosing file.
#[must_use]
pub fn canonical_name(raw: &str) -> String {
    let mut name = raw.replace('\\', "/");
    while name.starts_with("./") {
        name.drain(..2);
    }
    collapse_inner_unit(&name)
}

fn collapse_inner_unit(name: &str) -> String {
    let (dir, file) = match name.rfind('/') {
        Some(idx) => (&name[..=idx], &name[idx + 1..]),
        None => ("", name),
    };
    let Some(dollar) = file.find('$') else {
        return name.to_string();
    };
    let ext = Path::new(file)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    format!("{dir}{}{ext}", &file[..dollar])
}

fn class_name_of(canonical: &str) -> String {
    Path::new(canonical)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[derive(Default)]
struct Indices {
    by_path: HashMap<String, Arc<ResourceInfo>>,
    by_class: HashMap<(String, String), Arc<ResourceInfo>>,
}

/// Registry of canonical resource identities for one processing run.
///
/// Both indices mutate under one lock so readers running in parallel can
/// never observe a resource present in one index but not the other.
#[derive(Default)]
pub struct ResourceRegistry {
    indices: Mutex<Indices>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical resource for `name`, creating it on first
    /// sight.
    ///
    /// # Errors
    /// Returns `ResourceConflict` if `name` was already registered with a
    /// different package or source dir: two tools disagreeing about a path
    /// corrupts resource identity and must fail fast.
    pub fn register(&self, name: &str, package: &str, source_dir: &str) -> Result<Arc<ResourceInfo>> {
        let info = ResourceInfo::new(name, package, source_dir);
        let mut indices = self.indices.lock().expect("resource registry poisoned");
        if let Some(existing) = indices.by_path.get(&info.name) {
            if existing.package != info.package || existing.source_dir != info.source_dir {
                return Err(TidemarkError::ResourceConflict {
                    name: info.name,
                    existing: format!("({}, {})", existing.package, existing.source_dir),
                    incoming: format!("({}, {})", info.package, info.source_dir),
                });
            }
            return Ok(Arc::clone(existing));
        }
        let info = Arc::new(info);
        indices.by_path.insert(info.name.clone(), Arc::clone(&info));
        indices.by_class.insert(
            (info.package.clone(), info.class_name.clone()),
            Arc::clone(&info),
        );
        Ok(info)
    }

    /// Looks up a resource by exact or canonicalized path.
    #[must_use]
    pub fn lookup_path(&self, raw: &str) -> Option<Arc<ResourceInfo>> {
        let indices = self.indices.lock().expect("resource registry poisoned");
        if let Some(found) = indices.by_path.get(raw) {
            return Some(Arc::clone(found));
        }
        indices.by_path.get(&canonical_name(raw)).map(Arc::clone)
    }

    /// Secondary index: looks up a resource by package and class name.
    #[must_use]
    pub fn lookup_class(&self, package: &str, class_name: &str) -> Option<Arc<ResourceInfo>> {
        let indices = self.indices.lock().expect("resource registry poisoned");
        indices
            .by_class
            .get(&(package.to_string(), class_name.to_string()))
            .map(Arc::clone)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.lock().expect("resource registry poisoned").by_path.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Walks the configured source roots and registers every source file,
/// deriving the package from the directory path relative to its root.
///
/// # Errors
/// Returns an error on unreadable directories or on a resource identity
/// conflict between roots.
pub fn populate_from_roots(registry: &ResourceRegistry, roots: &[PathBuf]) -> Result<usize> {
    let mut registered = 0;
    for root in roots {
        let root_name = canonical_name(&root.to_string_lossy());
        for entry in WalkDir::new(root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let ext = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            if !SOURCE_EXTS.contains(&ext) {
                continue;
            }
            let package = package_of(root, entry.path());
            registry.register(&entry.path().to_string_lossy(), &package, &root_name)?;
            registered += 1;
        }
    }
    Ok(registered)
}

fn package_of(root: &Path, file: &Path) -> String {
    let rel = file.parent().and_then(|p| p.strip_prefix(root).ok());
    match rel {
        Some(dir) => dir
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("."),
        None => String::new(),
    }
}
