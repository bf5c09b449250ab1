//! Static pattern registries driving extraction and classification
//!
//! The library is pure data: regular-expression groups for component
//! detection, the severity factor tables, and the software compatibility
//! table. It is built once at startup and shared read-only across workers,
//! so extraction needs no locking.

pub mod relations;
pub mod severity;

pub use relations::{compatibility_entry, CompatEntry};
pub use severity::SeverityTable;

use crate::extractors::ComponentKind;
use regex::Regex;

/// How many characters after a matched name the version pass may look at.
pub const VERSION_WINDOW_CHARS: usize = 80;

/// Pattern group for one CMS platform and its plugin/theme ecosystems.
pub struct PlatformGroup {
    /// Canonical platform name, lowercase
    pub cms: &'static str,
    /// Text mention of the platform itself
    pub mention: Regex,
    /// Path-segment patterns whose first capture is a plugin name
    pub plugin_paths: Vec<Regex>,
    /// Path-segment patterns whose first capture is a theme name
    pub theme_paths: Vec<Regex>,
    /// Prefix-style component patterns (com_/mod_/plg_) applied to text and path
    pub component_prefixes: Vec<Regex>,
}

/// A single keyword mention pattern for a non-platform component.
pub struct KeywordPattern {
    pub kind: ComponentKind,
    pub name: &'static str,
    pub pattern: Regex,
}

/// Process-wide registry of extraction patterns.
pub struct PatternLibrary {
    pub platforms: Vec<PlatformGroup>,
    pub keywords: Vec<KeywordPattern>,
    /// Dotted version number inside the bounded window after a name match
    pub version_window: Regex,
    /// `Version: 5.1.2` style header line
    pub version_header: Regex,
    /// `Author: Jane Doe` style header line
    pub author_header: Regex,
    /// `Authored by Jane Doe` credit line
    pub authored_by: Regex,
    /// CVE identifiers
    pub cve: Regex,
    pub severity: SeverityTable,
}

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

fn keyword(kind: ComponentKind, name: &'static str, pattern: &str) -> KeywordPattern {
    KeywordPattern {
        kind,
        name,
        pattern: re(pattern),
    }
}

impl PatternLibrary {
    pub fn with_defaults() -> Self {
        let platforms = vec![
            PlatformGroup {
                cms: "wordpress",
                mention: re(r"(?i)\bwordpress\b"),
                plugin_paths: vec![re(r"(?i)wp-content/plugins/([a-z0-9][a-z0-9_\-]*)")],
                theme_paths: vec![re(r"(?i)wp-content/themes/([a-z0-9][a-z0-9_\-]*)")],
                component_prefixes: Vec::new(),
            },
            PlatformGroup {
                cms: "joomla",
                mention: re(r"(?i)\bjoomla\b"),
                plugin_paths: vec![re(r"(?i)components/com_([a-z0-9_]+)")],
                theme_paths: vec![re(r"(?i)templates/([a-z0-9][a-z0-9_\-]*)")],
                component_prefixes: vec![
                    re(r"(?i)\bcom_([a-z0-9_]+)"),
                    re(r"(?i)\bmod_([a-z0-9_]+)"),
                    re(r"(?i)\bplg_([a-z0-9_]+)"),
                ],
            },
            PlatformGroup {
                cms: "drupal",
                mention: re(r"(?i)\bdrupal\b"),
                plugin_paths: vec![re(r"(?i)sites/(?:all/)?modules/([a-z0-9_]+)")],
                theme_paths: vec![re(r"(?i)sites/(?:all/)?themes/([a-z0-9_]+)")],
                component_prefixes: Vec::new(),
            },
        ];

        let keywords = vec![
            keyword(ComponentKind::Language, "php", r"(?i)\bphp\b"),
            keyword(ComponentKind::Language, "python", r"(?i)\bpython\b"),
            keyword(ComponentKind::Language, "perl", r"(?i)\bperl\b"),
            keyword(ComponentKind::Language, "ruby", r"(?i)\bruby\b"),
            keyword(ComponentKind::Language, "asp", r"(?i)\basp(?:\.net)?\b"),
            keyword(ComponentKind::Database, "mysql", r"(?i)\bmysql\b"),
            keyword(ComponentKind::Database, "postgresql", r"(?i)\bpostgres(?:ql)?\b"),
            keyword(ComponentKind::Database, "mssql", r"(?i)\b(?:mssql|sql server)\b"),
            keyword(ComponentKind::Database, "oracle", r"(?i)\boracle\b"),
            keyword(ComponentKind::Database, "sqlite", r"(?i)\bsqlite\b"),
            keyword(ComponentKind::Server, "apache", r"(?i)\bapache\b"),
            keyword(ComponentKind::Server, "nginx", r"(?i)\bnginx\b"),
            keyword(ComponentKind::Server, "iis", r"(?i)\biis\b"),
            keyword(ComponentKind::Server, "tomcat", r"(?i)\btomcat\b"),
            keyword(ComponentKind::Framework, "laravel", r"(?i)\blaravel\b"),
            keyword(ComponentKind::Framework, "django", r"(?i)\bdjango\b"),
            keyword(ComponentKind::Framework, "rails", r"(?i)\b(?:ruby on )?rails\b"),
            keyword(ComponentKind::Framework, "struts", r"(?i)\bstruts\b"),
            keyword(ComponentKind::Framework, "symfony", r"(?i)\bsymfony\b"),
            keyword(ComponentKind::Application, "phpmyadmin", r"(?i)\bphpmyadmin\b"),
            keyword(ComponentKind::Application, "vbulletin", r"(?i)\bvbulletin\b"),
            keyword(ComponentKind::Application, "phpbb", r"(?i)\bphpbb\b"),
            keyword(ComponentKind::Application, "magento", r"(?i)\bmagento\b"),
            keyword(ComponentKind::Application, "webmin", r"(?i)\bwebmin\b"),
            keyword(ComponentKind::Application, "mybb", r"(?i)\bmybb\b"),
        ];

        Self {
            platforms,
            keywords,
            version_window: re(r"(?i)\bv?(\d+(?:\.\d+){1,3}[a-z0-9\-]*)"),
            version_header: re(r"(?im)^\s*version\s*[:=]\s*v?([0-9][0-9a-z.\-]*)"),
            author_header: re(r"(?im)^\s*author\s*[:=]\s*(\S[^\r\n]*?)\s*$"),
            authored_by: re(r"(?im)\bauthored by\s+(\S[^\r\n]*?)\s*$"),
            cve: re(r"(?i)\bCVE-\d{4}-\d{4,7}\b"),
            severity: SeverityTable::with_defaults(),
        }
    }

    /// All CVE identifiers in `text`, uppercased, first occurrence order,
    /// de-duplicated.
    pub fn find_cve_ids(&self, text: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for m in self.cve.find_iter(text) {
            let id = m.as_str().to_uppercase();
            if !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_builds() {
        let lib = PatternLibrary::with_defaults();
        assert_eq!(lib.platforms.len(), 3);
        assert!(!lib.keywords.is_empty());
    }

    #[test]
    fn test_wordpress_plugin_path_capture() {
        let lib = PatternLibrary::with_defaults();
        let wp = &lib.platforms[0];
        let caps = wp.plugin_paths[0]
            .captures("wp-content/plugins/contact-form-7/readme.txt")
            .unwrap();
        assert_eq!(&caps[1], "contact-form-7");
    }

    #[test]
    fn test_joomla_component_prefix() {
        let lib = PatternLibrary::with_defaults();
        let joomla = &lib.platforms[1];
        let caps = joomla.component_prefixes[0]
            .captures("index.php?option=com_jce&task=plugin")
            .unwrap();
        assert_eq!(&caps[1], "jce");
    }

    #[test]
    fn test_version_header() {
        let lib = PatternLibrary::with_defaults();
        let caps = lib
            .version_header
            .captures("Contact Form 7\nVersion: 5.1.2\nAuthor: X")
            .unwrap();
        assert_eq!(&caps[1], "5.1.2");
    }

    #[test]
    fn test_version_window_requires_dotted_number() {
        let lib = PatternLibrary::with_defaults();
        assert!(lib.version_window.captures("released in 2019").is_none());
        let caps = lib.version_window.captures(" 5.5 something").unwrap();
        assert_eq!(&caps[1], "5.5");
    }

    #[test]
    fn test_find_cve_ids_dedup_and_case() {
        let lib = PatternLibrary::with_defaults();
        let ids = lib.find_cve_ids("cve-2019-6977 and CVE-2019-6977 plus CVE-2020-123456");
        assert_eq!(ids, vec!["CVE-2019-6977", "CVE-2020-123456"]);
    }

    #[test]
    fn test_keyword_word_boundaries() {
        let lib = PatternLibrary::with_defaults();
        let php = lib.keywords.iter().find(|k| k.name == "php").unwrap();
        assert!(php.pattern.is_match("requires PHP 7.2"));
        assert!(!php.pattern.is_match("phpmyadmin"));
    }
}
