//! Static software compatibility table
//!
//! Keyed by the canonical lowercase name of a primary software item.
//! Constraints are rendered as `subject op version` strings; the resolver
//! parses and evaluates them against known runtime versions.

/// Compatibility data for one primary software item.
pub struct CompatEntry {
    pub name: &'static str,
    /// (category, constraint) pairs that must be satisfied
    pub requires: &'static [(&'static str, &'static str)],
    /// (category, constraint) pairs that improve the installation when present
    pub optional: &'static [(&'static str, &'static str)],
    /// Environment constraints known to break this software
    pub incompatible: &'static [&'static str],
}

pub const COMPATIBILITY_TABLE: &[CompatEntry] = &[
    CompatEntry {
        name: "wordpress",
        requires: &[("language", "php >= 5.6.20"), ("database", "mysql >= 5.5")],
        optional: &[("server", "apache >= 2.4"), ("cache", "redis >= 3.0")],
        incompatible: &["php < 5.6", "mysql < 5.0"],
    },
    CompatEntry {
        name: "joomla",
        requires: &[("language", "php >= 7.2.5"), ("database", "mysql >= 5.6")],
        optional: &[("server", "apache >= 2.4")],
        incompatible: &["php < 7.2"],
    },
    CompatEntry {
        name: "drupal",
        requires: &[("language", "php >= 7.3"), ("database", "mysql >= 5.7.8")],
        optional: &[("cache", "memcached >= 1.5")],
        incompatible: &["php < 7.0"],
    },
    CompatEntry {
        name: "magento",
        requires: &[("language", "php >= 7.4"), ("database", "mysql >= 8.0")],
        optional: &[("search", "elasticsearch >= 7.6")],
        incompatible: &["php < 7.4"],
    },
    CompatEntry {
        name: "phpbb",
        requires: &[("language", "php >= 7.1.3"), ("database", "mysql >= 4.1.3")],
        optional: &[],
        incompatible: &["php < 7.1"],
    },
];

/// Looks up a compatibility entry by canonical name, case-insensitive.
pub fn compatibility_entry(name: &str) -> Option<&'static CompatEntry> {
    COMPATIBILITY_TABLE
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(name))
}
