//! Tier classification for corpus files
//!
//! Every file gets exactly one processing tier. The decision is a strict
//! priority chain: a curated annotation always dominates content sniffing,
//! because human-authored index entries are more reliable than automatic
//! detection. Classification is total - an unrecognizable file is simply
//! `Generic`.

use crate::languages::AnalyzerRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Immutable description of one candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_mime: Option<String>,
    pub size: u64,
    /// Whether the external annotation index has an entry for this path
    pub has_prior_annotation: bool,
}

impl FileDescriptor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            declared_mime: None,
            size: 0,
            has_prior_annotation: false,
        }
    }
}

/// The processing strategy assigned to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Annotated,
    SourceCode,
    Generic,
}

impl Tier {
    /// Scheduling priority; lower runs earlier.
    pub fn priority(&self) -> u8 {
        match self {
            Tier::Annotated => 0,
            Tier::SourceCode => 1,
            Tier::Generic => 2,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Annotated => "annotated",
            Tier::SourceCode => "source_code",
            Tier::Generic => "generic",
        };
        write!(f, "{}", s)
    }
}

/// Assigns processing tiers.
#[derive(Clone)]
pub struct ContentClassifier {
    languages: Arc<AnalyzerRegistry>,
}

impl ContentClassifier {
    pub fn new(languages: Arc<AnalyzerRegistry>) -> Self {
        Self { languages }
    }

    /// Classifies a file; never fails.
    ///
    /// `head` is an optional prefix of the file's bytes and feeds only the
    /// shebang heuristic. Scheduling-time classification passes `None`, so
    /// the priority decision is deterministic given the descriptor and the
    /// annotation lookup alone; passing the bytes later can only upgrade
    /// `Generic` to `SourceCode`, never change an `Annotated` decision.
    pub fn classify(&self, descriptor: &FileDescriptor, head: Option<&[u8]>) -> Tier {
        if descriptor.has_prior_annotation {
            return Tier::Annotated;
        }

        if let Some(mime) = &descriptor.declared_mime {
            if self.languages.language_for_mime(mime).is_some() {
                return Tier::SourceCode;
            }
        }

        if let Some(ext) = descriptor.path.extension().and_then(|e| e.to_str()) {
            if self.languages.known_extension(ext) {
                return Tier::SourceCode;
            }
        }

        if let Some(head) = head {
            let prefix = String::from_utf8_lossy(&head[..head.len().min(256)]);
            if let Some(first_line) = prefix.lines().next() {
                if self.languages.language_for_shebang(first_line).is_some() {
                    return Tier::SourceCode;
                }
            }
        }

        Tier::Generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> ContentClassifier {
        ContentClassifier::new(Arc::new(AnalyzerRegistry::with_defaults()))
    }

    #[test]
    fn test_annotation_dominates_everything() {
        let descriptor = FileDescriptor {
            path: PathBuf::from("exploits/sploit.c"),
            declared_mime: Some("text/x-c".to_string()),
            size: 100,
            has_prior_annotation: true,
        };
        // Even with source-looking bytes and extension, annotation wins.
        assert_eq!(
            classifier().classify(&descriptor, Some(b"#!/bin/sh\n")),
            Tier::Annotated
        );
    }

    #[test]
    fn test_known_extension_is_source() {
        let descriptor = FileDescriptor::new("exploits/sploit.c");
        assert_eq!(classifier().classify(&descriptor, None), Tier::SourceCode);
    }

    #[test]
    fn test_declared_mime_is_source() {
        let mut descriptor = FileDescriptor::new("payload.bin");
        descriptor.declared_mime = Some("application/x-perl".to_string());
        assert_eq!(classifier().classify(&descriptor, None), Tier::SourceCode);
    }

    #[test]
    fn test_shebang_upgrade_with_head_bytes() {
        let descriptor = FileDescriptor::new("tools/scanner");
        assert_eq!(classifier().classify(&descriptor, None), Tier::Generic);
        assert_eq!(
            classifier().classify(&descriptor, Some(b"#!/usr/bin/env python\nprint()\n")),
            Tier::SourceCode
        );
    }

    #[test]
    fn test_unknown_file_is_generic() {
        let descriptor = FileDescriptor::new("docs/advisory.txt");
        assert_eq!(classifier().classify(&descriptor, None), Tier::Generic);
        assert_eq!(
            classifier().classify(&descriptor, Some(&[0u8, 159, 255, 7])),
            Tier::Generic
        );
    }

    #[test]
    fn test_classification_is_total_on_binary_head() {
        let descriptor = FileDescriptor::new("blob");
        let garbage = [0xffu8; 512];
        assert_eq!(classifier().classify(&descriptor, Some(&garbage)), Tier::Generic);
    }
}
