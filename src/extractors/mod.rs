//! Metadata extraction over file text and paths
//!
//! Three independent sub-algorithms share this module: software/component
//! detection, severity classification, and software-relation resolution.
//! Each is pure over its inputs; the only shared state is the read-only
//! pattern library.

pub mod relations;
pub mod severity;
pub mod software;

pub use relations::{IncompatibilityReport, RelationResolver, RelationSet};
pub use severity::{SeverityAssessment, SeverityClassifier, SeverityFactors, SeverityLevel};
pub use software::SoftwareExtractor;

use serde::{Deserialize, Serialize};

/// What kind of software a detected component is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Cms,
    Plugin,
    Theme,
    Language,
    Application,
    Database,
    Server,
    Framework,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Cms => "cms",
            ComponentKind::Plugin => "plugin",
            ComponentKind::Theme => "theme",
            ComponentKind::Language => "language",
            ComponentKind::Application => "application",
            ComponentKind::Database => "database",
            ComponentKind::Server => "server",
            ComponentKind::Framework => "framework",
        }
    }
}

/// A named piece of software detected in a file.
///
/// Plugins and themes carry a `parent_cms` back-reference naming the
/// platform whose pattern group matched; it is a lookup key, not an owning
/// link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedComponent {
    pub kind: ComponentKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_cms: Option<String>,
}

impl ExtractedComponent {
    pub fn new(kind: ComponentKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            version: None,
            author: None,
            category: None,
            parent_cms: None,
        }
    }
}

/// Coalesces duplicate `(kind, name)` pairs, keeping the first version,
/// author and category found across all matches.
pub fn coalesce_components(found: Vec<ExtractedComponent>) -> Vec<ExtractedComponent> {
    let mut out: Vec<ExtractedComponent> = Vec::with_capacity(found.len());
    for component in found {
        if let Some(existing) = out
            .iter_mut()
            .find(|c| c.kind == component.kind && c.name == component.name)
        {
            if existing.version.is_none() {
                existing.version = component.version;
            }
            if existing.author.is_none() {
                existing.author = component.author;
            }
            if existing.category.is_none() {
                existing.category = component.category;
            }
            if existing.parent_cms.is_none() {
                existing.parent_cms = component.parent_cms;
            }
        } else {
            out.push(component);
        }
    }
    out
}
