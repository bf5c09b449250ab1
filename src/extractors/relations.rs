//! Dependency and compatibility resolution for detected software
//!
//! Renders a read-only view over the static compatibility table. With a
//! known runtime version the incompatibility list is narrowed to
//! constraints that are genuinely violated; without one, every entry is
//! reported as a potential conflict and marked unverified.

use crate::patterns::relations::{compatibility_entry, CompatEntry};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One entry from a resolved incompatibility list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncompatibilityReport {
    /// Rendered constraint, e.g. `php < 5.6`
    pub constraint: String,
    /// True when the constraint was evaluated against a known version and
    /// found violated; false when no version was available to check.
    pub verified: bool,
}

/// Dependency/compatibility view for one primary software item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSet {
    pub requires: BTreeMap<String, String>,
    pub optional: BTreeMap<String, String>,
    pub incompatible: Vec<IncompatibilityReport>,
}

/// Comparison operator inside a constraint string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VersionOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

struct Constraint<'a> {
    subject: &'a str,
    op: VersionOp,
    version: &'a str,
}

fn parse_constraint(raw: &str) -> Option<Constraint<'_>> {
    let mut parts = raw.split_whitespace();
    let subject = parts.next()?;
    let op = match parts.next()? {
        "<" => VersionOp::Lt,
        "<=" => VersionOp::Le,
        ">" => VersionOp::Gt,
        ">=" => VersionOp::Ge,
        "=" | "==" => VersionOp::Eq,
        _ => return None,
    };
    let version = parts.next()?;
    Some(Constraint {
        subject,
        op,
        version,
    })
}

/// Dotted-numeric version comparison, lenient on trailing segments and
/// non-numeric suffixes (`5.6-beta` compares as `5.6`).
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let segments = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|seg| {
                let digits: String = seg.chars().take_while(|c| c.is_ascii_digit()).collect();
                digits.parse::<u64>().unwrap_or(0)
            })
            .collect()
    };
    let left = segments(a);
    let right = segments(b);
    let len = left.len().max(right.len());
    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(0);
        let r = right.get(i).copied().unwrap_or(0);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

fn constraint_violated(constraint: &Constraint<'_>, known: &str) -> bool {
    let cmp = compare_versions(known, constraint.version);
    match constraint.op {
        VersionOp::Lt => cmp == Ordering::Less,
        VersionOp::Le => cmp != Ordering::Greater,
        VersionOp::Gt => cmp == Ordering::Greater,
        VersionOp::Ge => cmp != Ordering::Less,
        VersionOp::Eq => cmp == Ordering::Equal,
    }
}

/// The language subject of `primary_name`'s runtime requirement ("php" for
/// the bundled CMS entries); used by callers to pick which detected
/// language version is worth passing to `resolve`.
pub fn runtime_subject(primary_name: &str) -> Option<&'static str> {
    let entry = compatibility_entry(primary_name)?;
    entry
        .requires
        .iter()
        .find(|(category, _)| *category == "language")
        .and_then(|(_, constraint)| constraint.split_whitespace().next())
}

/// Resolves relation sets from the static compatibility table.
#[derive(Clone, Default)]
pub struct RelationResolver;

impl RelationResolver {
    pub fn new() -> Self {
        Self
    }

    /// Looks up `primary_name`; `None` when the table has no entry.
    ///
    /// `known_runtime_version` is the known version of the primary's
    /// required language runtime (the `requires["language"]` subject, e.g.
    /// PHP for the bundled CMS entries). Constraints on any other subject
    /// cannot be evaluated against it and stay in the list unverified.
    pub fn resolve(
        &self,
        primary_name: &str,
        known_runtime_version: Option<&str>,
    ) -> Option<RelationSet> {
        let entry = compatibility_entry(primary_name)?;
        Some(render(entry, known_runtime_version))
    }
}

fn render(entry: &CompatEntry, known_runtime_version: Option<&str>) -> RelationSet {
    let to_map = |pairs: &[(&str, &str)]| -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(category, constraint)| (category.to_string(), constraint.to_string()))
            .collect()
    };

    let runtime_subject = entry
        .requires
        .iter()
        .find(|(category, _)| *category == "language")
        .and_then(|(_, constraint)| parse_constraint(constraint))
        .map(|c| c.subject);

    let mut incompatible = Vec::new();
    for raw in entry.incompatible {
        match (known_runtime_version, parse_constraint(raw)) {
            (Some(known), Some(constraint))
                if Some(constraint.subject) == runtime_subject =>
            {
                if constraint_violated(&constraint, known) {
                    incompatible.push(IncompatibilityReport {
                        constraint: raw.to_string(),
                        verified: true,
                    });
                }
                // Satisfied runtime constraints drop out of the view.
            }
            _ => {
                incompatible.push(IncompatibilityReport {
                    constraint: raw.to_string(),
                    verified: false,
                });
            }
        }
    }

    RelationSet {
        requires: to_map(entry.requires),
        optional: to_map(entry.optional),
        incompatible,
    }
}
