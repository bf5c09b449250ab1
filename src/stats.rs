//! Batch statistics for dry runs and post-run summaries
//!
//! Counts categories, tags, systems, file types, authors and severity
//! levels across a batch and renders a bar-chart text report. Drives the
//! CLI's `--dry-run` mode.

use crate::processors::ProcessingResult;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

const BAR_WIDTH: usize = 30;

#[derive(Debug, Default, Serialize)]
pub struct StatsReport {
    pub total_entries: usize,
    pub categories: BTreeMap<String, usize>,
    pub tags: BTreeMap<String, usize>,
    pub systems: BTreeMap<String, usize>,
    pub file_types: BTreeMap<String, usize>,
    pub authors: BTreeMap<String, usize>,
    pub severities: BTreeMap<String, usize>,
    pub component_kinds: BTreeMap<String, usize>,
    pub errors: Vec<String>,
}

fn bump(counter: &mut BTreeMap<String, usize>, key: impl Into<String>) {
    *counter.entry(key.into()).or_insert(0) += 1;
}

impl StatsReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_result(&mut self, path: &Path, result: &ProcessingResult) {
        self.total_entries += 1;

        let category = result
            .metadata
            .category
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        bump(&mut self.categories, category);

        for tag in &result.metadata.tags {
            bump(&mut self.tags, tag.clone());
        }
        for system in &result.metadata.systems {
            bump(&mut self.systems, system.clone());
        }

        let file_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_else(|| "no_extension".to_string());
        bump(&mut self.file_types, file_type);

        let author = result
            .metadata
            .author
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        bump(&mut self.authors, author);

        if let Some(severity) = &result.metadata.severity {
            bump(&mut self.severities, severity.level.to_string());
        }

        for component in &result.metadata.components {
            bump(&mut self.component_kinds, component.kind.as_str());
        }

        for error in &result.errors {
            self.errors
                .push(format!("{}: {} ({})", path.display(), error.message, error.stage));
        }
    }

    /// Renders one counter as a ranked bar list.
    fn format_counter(&self, counter: &BTreeMap<String, usize>, limit: usize) -> String {
        if counter.is_empty() {
            return "No data".to_string();
        }

        let mut items: Vec<(&String, &usize)> = counter.iter().collect();
        items.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
        items.truncate(limit);

        let max_count = items.iter().map(|(_, c)| **c).max().unwrap_or(1).max(1);

        items
            .iter()
            .map(|(name, count)| {
                let filled = (**count * BAR_WIDTH) / max_count;
                let bar: String = "#".repeat(filled) + &"-".repeat(BAR_WIDTH - filled);
                let percent = if self.total_entries > 0 {
                    (**count as f64 / self.total_entries as f64) * 100.0
                } else {
                    0.0
                };
                format!("{:<20} [{}] {:>4} ({:>5.1}%)", name, bar, count, percent)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn render(&self) -> String {
        let mut sections = vec![
            (
                "Summary".to_string(),
                format!(
                    "Total entries: {}\nErrors: {}",
                    self.total_entries,
                    self.errors.len()
                ),
            ),
            (
                "Categories".to_string(),
                self.format_counter(&self.categories, 10),
            ),
            ("Tags".to_string(), self.format_counter(&self.tags, 15)),
            (
                "Target systems".to_string(),
                self.format_counter(&self.systems, 10),
            ),
            (
                "File types".to_string(),
                self.format_counter(&self.file_types, 10),
            ),
            ("Authors".to_string(), self.format_counter(&self.authors, 5)),
            (
                "Severities".to_string(),
                self.format_counter(&self.severities, 4),
            ),
            (
                "Component kinds".to_string(),
                self.format_counter(&self.component_kinds, 8),
            ),
        ];

        if !self.errors.is_empty() {
            sections.push((
                "Errors".to_string(),
                self.errors
                    .iter()
                    .map(|e| format!("- {}", e))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ));
        }

        let rule = "=".repeat(80);
        sections
            .into_iter()
            .map(|(title, body)| format!("{}\n{}\n{}\n{}", rule, title, rule, body))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
