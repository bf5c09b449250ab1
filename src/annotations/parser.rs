//! Parser for `index_.txt` annotation files
//!
//! The format is line-oriented with `///` separating entries:
//!
//! ```text
//! File Name: sploit.c
//! Description:
//! Local root exploit for example 2.4.
//! tags | local, root
//! systems | linux
//! MD5 | d41d8cd98f00b204e9800998ecf8427e
//! Authored by John Doe
//! ///
//! ```
//!
//! The category of every entry is inferred from the index file's own path
//! (exploits/, shellcodes/, util/, Doc/, systemerror/).

use super::Annotation;
use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// Accepted annotation date formats, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Path-segment markers for category inference.
const CATEGORY_MARKERS: &[(&str, &str)] = &[
    ("exploits", "exploit"),
    ("shellcodes", "shellcode"),
    ("util", "tool"),
    ("Doc", "doc"),
    ("systemerror", "systemerror"),
];

/// Parses annotation index files into `(filename, Annotation)` pairs.
pub struct IndexParser {
    errors: Vec<String>,
}

impl IndexParser {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Parse errors accumulated so far (entries skipped, bad dates).
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Parses index file content. `source_index` is the index file's own
    /// path, used for the category inference and the provenance field.
    pub fn parse_str(&mut self, content: &str, source_index: &Path) -> Vec<(String, Annotation)> {
        let file_name_re = Regex::new(r"^File Name:\s*(.+)").expect("valid regex");
        let hash_re = Regex::new(r"^(MD5|SHA-256)\s*\|\s*(.+)").expect("valid regex");
        let authored_re = Regex::new(r"^Authored by\s+(.+)").expect("valid regex");
        let date_re = Regex::new(r"^Date:\s*(.+)").expect("valid regex");

        let category = infer_category(source_index);
        let source = source_index.to_string_lossy().to_string();

        let mut results = Vec::new();

        for entry_text in content.split("///") {
            if entry_text.trim().is_empty() {
                continue;
            }

            let mut filename: Option<String> = None;
            let mut annotation = Annotation::new("", source.clone());
            annotation.category = category.map(|c| c.to_string());
            let mut description_lines: Vec<String> = Vec::new();
            let mut in_description = false;

            for raw_line in entry_text.lines() {
                let line = raw_line.trim();
                if line.is_empty() {
                    continue;
                }

                if let Some(caps) = file_name_re.captures(line) {
                    let name = caps[1].trim();
                    if !name.is_empty() && name != ":" {
                        filename = Some(name.to_string());
                    }
                    continue;
                }

                if line == "Description:" {
                    in_description = true;
                    continue;
                }

                if let Some(rest) = line.strip_prefix("tags |") {
                    in_description = false;
                    annotation.tags = split_list(rest);
                    continue;
                }

                if let Some(rest) = line.strip_prefix("systems |") {
                    in_description = false;
                    annotation.systems = split_list(rest);
                    continue;
                }

                if let Some(caps) = hash_re.captures(line) {
                    in_description = false;
                    annotation
                        .hashes
                        .insert(caps[1].to_string(), caps[2].trim().to_string());
                    continue;
                }

                if let Some(caps) = authored_re.captures(line) {
                    in_description = false;
                    annotation.author = Some(caps[1].trim().to_string());
                    continue;
                }

                if let Some(caps) = date_re.captures(line) {
                    in_description = false;
                    annotation.date = self.parse_date(&caps[1]);
                    continue;
                }

                if in_description {
                    description_lines.push(line.to_string());
                }
            }

            annotation.description = description_lines.join(" ").trim().to_string();
            if annotation.description.is_empty() {
                annotation.description = "No description available".to_string();
            }

            match filename {
                Some(name) => results.push((name, annotation)),
                None => self.errors.push(format!(
                    "Skipped entry without a file name in {}",
                    source
                )),
            }
        }

        debug!(
            index = %source,
            entries = results.len(),
            errors = self.errors.len(),
            "Parsed annotation index"
        );

        results
    }

    fn parse_date(&mut self, raw: &str) -> Option<NaiveDate> {
        let trimmed = raw.trim();
        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
                return Some(date);
            }
        }
        self.errors.push(format!("Could not parse date: {}", trimmed));
        None
    }
}

impl Default for IndexParser {
    fn default() -> Self {
        Self::new()
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

fn infer_category(source_index: &Path) -> Option<&'static str> {
    for part in source_index.components() {
        let part = part.as_os_str().to_string_lossy();
        for (marker, category) in CATEGORY_MARKERS {
            if part == *marker {
                return Some(category);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SAMPLE: &str = "\
File Name: sploit.c
Description:
Local root exploit for example kernel module.
Second line of the description.
tags | local, root,
systems | linux, freebsd
MD5 | d41d8cd98f00b204e9800998ecf8427e
Authored by John Doe
///
File Name: advisory.txt
Date: 2003-11-02
Description:
tags | remote
///
Description:
An orphan entry without a file name.
///
";

    #[test]
    fn test_parse_entries() {
        let mut parser = IndexParser::new();
        let entries = parser.parse_str(SAMPLE, &PathBuf::from("corpus/exploits/index_.txt"));

        assert_eq!(entries.len(), 2);

        let (name, annotation) = &entries[0];
        assert_eq!(name, "sploit.c");
        assert!(annotation.description.starts_with("Local root exploit"));
        assert!(annotation.description.contains("Second line"));
        assert_eq!(annotation.tags, vec!["local", "root"]);
        assert_eq!(annotation.systems, vec!["linux", "freebsd"]);
        assert_eq!(
            annotation.hashes.get("MD5").map(String::as_str),
            Some("d41d8cd98f00b204e9800998ecf8427e")
        );
        assert_eq!(annotation.author.as_deref(), Some("John Doe"));
        assert_eq!(annotation.category.as_deref(), Some("exploit"));
    }

    #[test]
    fn test_missing_description_placeholder() {
        let mut parser = IndexParser::new();
        let entries = parser.parse_str(SAMPLE, &PathBuf::from("corpus/exploits/index_.txt"));
        let (_, annotation) = &entries[1];
        assert_eq!(annotation.description, "No description available");
        assert_eq!(
            annotation.date,
            NaiveDate::from_ymd_opt(2003, 11, 2)
        );
    }

    #[test]
    fn test_orphan_entry_recorded_as_error() {
        let mut parser = IndexParser::new();
        parser.parse_str(SAMPLE, &PathBuf::from("corpus/exploits/index_.txt"));
        assert_eq!(parser.errors().len(), 1);
        assert!(parser.errors()[0].contains("without a file name"));
    }

    #[test]
    fn test_category_markers() {
        assert_eq!(
            infer_category(&PathBuf::from("corpus/shellcodes/index_.txt")),
            Some("shellcode")
        );
        assert_eq!(
            infer_category(&PathBuf::from("corpus/Doc/index_.txt")),
            Some("doc")
        );
        assert_eq!(infer_category(&PathBuf::from("corpus/misc/index_.txt")), None);
    }

    #[test]
    fn test_date_formats() {
        let mut parser = IndexParser::new();
        assert_eq!(
            parser.parse_date("02.11.2003"),
            NaiveDate::from_ymd_opt(2003, 11, 2)
        );
        assert_eq!(
            parser.parse_date("2003/11/02"),
            NaiveDate::from_ymd_opt(2003, 11, 2)
        );
        assert_eq!(
            parser.parse_date("02-11-2003"),
            NaiveDate::from_ymd_opt(2003, 11, 2)
        );
        assert!(parser.parse_date("yesterday").is_none());
        assert_eq!(parser.errors().len(), 1);
    }
}
