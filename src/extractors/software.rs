//! Software/component detection from file text and paths
//!
//! Applies each platform's pattern group against both the path and the
//! text, plus flat keyword patterns for languages, databases, servers,
//! frameworks, and standalone applications. Version extraction is a
//! secondary pass scoped to a bounded window after a matched name, which
//! keeps unrelated numbers elsewhere in the text from being picked up.

use crate::extractors::{coalesce_components, ComponentKind, ExtractedComponent};
use crate::patterns::{PatternLibrary, PlatformGroup, VERSION_WINDOW_CHARS};
use regex::Regex;
use std::sync::Arc;

/// Detects software components mentioned in a file.
#[derive(Clone)]
pub struct SoftwareExtractor {
    patterns: Arc<PatternLibrary>,
}

impl SoftwareExtractor {
    pub fn new(patterns: Arc<PatternLibrary>) -> Self {
        Self { patterns }
    }

    /// Extracts all components from `(text, path)`.
    ///
    /// Stateless and idempotent: the same input always yields the same
    /// component list. An unrecognized platform simply contributes nothing.
    pub fn extract(&self, text: &str, path: &str) -> Vec<ExtractedComponent> {
        let norm_path = path.replace('\\', "/");
        let header_version = self.header_version(text);
        let header_author = self.header_author(text);

        let mut found = Vec::new();

        for group in &self.patterns.platforms {
            self.extract_platform(
                group,
                text,
                &norm_path,
                header_version.as_deref(),
                header_author.as_deref(),
                &mut found,
            );
        }

        for kw in &self.patterns.keywords {
            if let Some(m) = kw.pattern.find(text) {
                let mut component = ExtractedComponent::new(kw.kind, kw.name);
                component.version = self.version_after(text, m.end());
                found.push(component);
            } else if kw.pattern.is_match(&norm_path) {
                found.push(ExtractedComponent::new(kw.kind, kw.name));
            }
        }

        coalesce_components(found)
    }

    fn extract_platform(
        &self,
        group: &PlatformGroup,
        text: &str,
        norm_path: &str,
        header_version: Option<&str>,
        header_author: Option<&str>,
        found: &mut Vec<ExtractedComponent>,
    ) {
        // Path-segment matches name the file's own subject, so readme-style
        // Version:/Author: headers in the text belong to them.
        let mut path_component = |pattern: &Regex, kind: ComponentKind| {
            for caps in pattern.captures_iter(norm_path) {
                if let Some(name) = caps.get(1) {
                    let name = name.as_str().to_lowercase();
                    let version = header_version
                        .map(|v| v.to_string())
                        .or_else(|| self.version_near_name(text, &name));
                    found.push(ExtractedComponent {
                        kind,
                        name,
                        version,
                        author: header_author.map(|a| a.to_string()),
                        category: None,
                        parent_cms: Some(group.cms.to_string()),
                    });
                }
            }
        };

        for pattern in &group.plugin_paths {
            path_component(pattern, ComponentKind::Plugin);
        }
        for pattern in &group.theme_paths {
            path_component(pattern, ComponentKind::Theme);
        }

        for pattern in &group.component_prefixes {
            for haystack in [text, norm_path] {
                for caps in pattern.captures_iter(haystack) {
                    if let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) {
                        let category = match whole.as_str().to_lowercase() {
                            s if s.starts_with("com_") => Some("component".to_string()),
                            s if s.starts_with("mod_") => Some("module".to_string()),
                            s if s.starts_with("plg_") => Some("plugin".to_string()),
                            _ => None,
                        };
                        found.push(ExtractedComponent {
                            kind: ComponentKind::Plugin,
                            name: name.as_str().to_lowercase(),
                            version: self.version_after(haystack, whole.end()),
                            author: None,
                            category,
                            parent_cms: Some(group.cms.to_string()),
                        });
                    }
                }
            }
        }

        // The CMS itself is only reported on an explicit mention; a plugin
        // path alone names the plugin, not the platform.
        if let Some(m) = group.mention.find(text) {
            let mut component = ExtractedComponent::new(ComponentKind::Cms, group.cms);
            component.version = self.version_after(text, m.end());
            found.push(component);
        } else if group.mention.is_match(norm_path) {
            found.push(ExtractedComponent::new(ComponentKind::Cms, group.cms));
        }
    }

    /// Best-effort document author from `Author:` headers or
    /// `Authored by` credit lines.
    pub fn author_of(&self, text: &str) -> Option<String> {
        self.header_author(text)
    }

    fn header_version(&self, text: &str) -> Option<String> {
        self.patterns
            .version_header
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn header_author(&self, text: &str) -> Option<String> {
        self.patterns
            .author_header
            .captures(text)
            .or_else(|| self.patterns.authored_by.captures(text))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Dotted version in the bounded window following byte offset `end`.
    fn version_after(&self, text: &str, end: usize) -> Option<String> {
        let mut upper = (end + VERSION_WINDOW_CHARS).min(text.len());
        while !text.is_char_boundary(upper) {
            upper -= 1;
        }
        let window = &text[end..upper];
        self.patterns
            .version_window
            .captures(window)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Version window keyed off a name occurrence inside the text body.
    /// The scan runs over the lowercased copy so the offset stays valid.
    fn version_near_name(&self, text: &str, name: &str) -> Option<String> {
        let lowered = text.to_lowercase();
        let at = lowered.find(name)?;
        self.version_after(&lowered, at + name.len())
    }
}
