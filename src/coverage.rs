//! Annotation coverage analysis
//!
//! Compares the files actually present in a corpus against the filenames
//! declared by its annotation indexes, answering "how much of this archive
//! is documented at all". Pure bookkeeping over two sets; the walk and the
//! index parsing are fed in by the caller.

use crate::annotations::IndexParser;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub total_files: usize,
    pub indexed_files: usize,
    pub coverage_percent: f64,
    pub missing_files: usize,
    pub categories: BTreeMap<String, usize>,
    pub top_extensions: Vec<(String, usize)>,
    pub top_directories: Vec<(String, usize)>,
}

#[derive(Debug, Default)]
pub struct CoverageAnalyzer {
    all_files: BTreeSet<String>,
    indexed_files: BTreeSet<String>,
    categories: BTreeMap<String, usize>,
    extensions: BTreeMap<String, usize>,
    directories: BTreeMap<String, usize>,
}

impl CoverageAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one file found on disk, by corpus-relative path.
    pub fn add_corpus_file(&mut self, relative_path: &str) {
        if relative_path.is_empty() {
            return;
        }
        self.all_files.insert(relative_path.to_string());

        let path = Path::new(relative_path);
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_else(|| "no_extension".to_string());
        *self.extensions.entry(ext).or_insert(0) += 1;

        if let Some(first_dir) = path.components().next() {
            let dir = first_dir.as_os_str().to_string_lossy().to_string();
            if dir != relative_path {
                *self.directories.entry(dir).or_insert(0) += 1;
            }
        }
    }

    /// Parses one annotation index and registers its declared filenames.
    pub fn add_index_content(&mut self, index_path: &Path, content: &str) {
        let mut parser = IndexParser::new();
        for (filename, annotation) in parser.parse_str(content, index_path) {
            self.indexed_files.insert(filename);
            let category = annotation
                .category
                .unwrap_or_else(|| "unknown".to_string());
            *self.categories.entry(category).or_insert(0) += 1;
        }
    }

    pub fn report(&self) -> CoverageReport {
        let total_files = self.all_files.len();
        // Indexes name files by bare filename; match on final component.
        let indexed: usize = self
            .all_files
            .iter()
            .filter(|path| {
                Path::new(path)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(|name| self.indexed_files.contains(name))
                    .unwrap_or(false)
            })
            .count();

        let coverage_percent = if total_files > 0 {
            (indexed as f64 / total_files as f64) * 100.0
        } else {
            0.0
        };

        CoverageReport {
            total_files,
            indexed_files: indexed,
            coverage_percent,
            missing_files: total_files - indexed,
            categories: self.categories.clone(),
            top_extensions: top_n(&self.extensions, 10),
            top_directories: top_n(&self.directories, 10),
        }
    }
}

fn top_n(counter: &BTreeMap<String, usize>, n: usize) -> Vec<(String, usize)> {
    let mut items: Vec<(String, usize)> = counter
        .iter()
        .map(|(k, v)| (k.clone(), *v))
        .collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items.truncate(n);
    items
}

impl CoverageReport {
    pub fn render(&self) -> String {
        let mut lines = vec![
            "# Corpus coverage".to_string(),
            String::new(),
            "## Summary".to_string(),
            format!("- Total files: {}", self.total_files),
            format!("- Annotated files: {}", self.indexed_files),
            format!("- Coverage: {:.2}%", self.coverage_percent),
            format!("- Files without annotations: {}", self.missing_files),
            String::new(),
            "## Categories".to_string(),
        ];
        for (category, count) in &self.categories {
            lines.push(format!("- {}: {}", category, count));
        }
        lines.push(String::new());
        lines.push("## Top extensions".to_string());
        for (ext, count) in &self.top_extensions {
            lines.push(format!("- .{}: {}", ext, count));
        }
        lines.push(String::new());
        lines.push("## Top directories".to_string());
        for (dir, count) in &self.top_directories {
            lines.push(format!("- {}: {}", dir, count));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const INDEX: &str = "\
File Name: sploit.c
Description:
Root exploit.
///
File Name: scanner.pl
Description:
Port scanner.
///
";

    fn analyzer() -> CoverageAnalyzer {
        let mut analyzer = CoverageAnalyzer::new();
        analyzer.add_corpus_file("exploits/sploit.c");
        analyzer.add_corpus_file("exploits/other.c");
        analyzer.add_corpus_file("util/scanner.pl");
        analyzer.add_corpus_file("Doc/readme.txt");
        analyzer.add_index_content(&PathBuf::from("exploits/index_.txt"), INDEX);
        analyzer
    }

    #[test]
    fn test_coverage_counts() {
        let report = analyzer().report();
        assert_eq!(report.total_files, 4);
        assert_eq!(report.indexed_files, 2);
        assert_eq!(report.missing_files, 2);
        assert!((report.coverage_percent - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_category_counts_from_index_path() {
        let report = analyzer().report();
        assert_eq!(report.categories.get("exploit"), Some(&2));
    }

    #[test]
    fn test_top_extensions_and_directories() {
        let report = analyzer().report();
        assert_eq!(report.top_extensions[0], ("c".to_string(), 2));
        assert!(report
            .top_directories
            .iter()
            .any(|(d, c)| d == "exploits" && *c == 2));
    }

    #[test]
    fn test_render() {
        let rendered = analyzer().report().render();
        assert!(rendered.contains("# Corpus coverage"));
        assert!(rendered.contains("Coverage: 50.00%"));
        assert!(rendered.contains("- .c: 2"));
    }

    #[test]
    fn test_empty_corpus() {
        let report = CoverageAnalyzer::new().report();
        assert_eq!(report.total_files, 0);
        assert_eq!(report.coverage_percent, 0.0);
    }
}
