//! Curated annotations and the annotation-index lookup
//!
//! Annotations are human-authored descriptions keyed by file path, sourced
//! from `index_.txt` files shipped alongside the corpus. The core treats
//! the lookup as a pure, awaitable collaborator; the bundled in-memory
//! implementation backs both the CLI and the tests.

pub mod parser;

pub use parser::IndexParser;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// A curated annotation for one corpus file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub description: String,
    /// Path of the index file this annotation came from
    pub source_index: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub systems: Vec<String>,
    /// Declared content hashes (MD5/SHA-256), carried verbatim
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hashes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Annotation {
    pub fn new(description: impl Into<String>, source_index: impl Into<String>) -> Self {
        Self {
            date: None,
            description: description.into(),
            source_index: source_index.into(),
            tags: Vec::new(),
            systems: Vec::new(),
            hashes: BTreeMap::new(),
            author: None,
            category: None,
        }
    }
}

/// External annotation-index lookup.
///
/// Pure and side-effect free from the pipeline's point of view.
#[async_trait]
pub trait AnnotationIndex: Send + Sync {
    async fn lookup(&self, path: &Path) -> Option<Annotation>;
}

/// In-memory annotation index keyed by filename.
///
/// Index files name entries by bare filename, so lookups match on the
/// path's final component first and fall back to the full path string.
#[derive(Debug, Default, Clone)]
pub struct InMemoryAnnotationIndex {
    entries: HashMap<String, Annotation>,
}

impl InMemoryAnnotationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, filename: impl Into<String>, annotation: Annotation) {
        self.entries.insert(filename.into(), annotation);
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.get(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn get(&self, path: &Path) -> Option<&Annotation> {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if let Some(annotation) = self.entries.get(name) {
                return Some(annotation);
            }
        }
        self.entries.get(&path.to_string_lossy().to_string())
    }
}

#[async_trait]
impl AnnotationIndex for InMemoryAnnotationIndex {
    async fn lookup(&self, path: &Path) -> Option<Annotation> {
        self.get(path).cloned()
    }
}
