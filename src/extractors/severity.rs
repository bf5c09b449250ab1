//! Severity classification from advisory text
//!
//! Scans raw text for vulnerability-type, impact, and access-context
//! keywords against the static factor tables. The highest band with at
//! least one type keyword AND at least one impact or access keyword wins; a
//! bare type match with no corroborating signal never classifies above
//! `Low`. Identical input text always yields the identical assessment.

use crate::extractors::ExtractedComponent;
use crate::patterns::severity::SeverityBand;
use crate::patterns::PatternLibrary;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Keyword hits above this count no longer raise the score.
const SCORE_HIT_CAP: usize = 6;

/// One of four ordered criticality levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityLevel {
    Critical,
    High,
    Medium,
    Low,
}

impl SeverityLevel {
    /// Whether `score` falls inside this level's band.
    pub fn contains_score(&self, score: f64) -> bool {
        match self {
            SeverityLevel::Critical => (9.0..=10.0).contains(&score),
            SeverityLevel::High => (7.0..9.0).contains(&score),
            SeverityLevel::Medium => (4.0..7.0).contains(&score),
            SeverityLevel::Low => (0.0..4.0).contains(&score),
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SeverityLevel::Critical => "critical",
            SeverityLevel::High => "high",
            SeverityLevel::Medium => "medium",
            SeverityLevel::Low => "low",
        };
        write!(f, "{}", s)
    }
}

/// The first matched keyword from each factor set of the chosen band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityFactors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vuln_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
}

/// A severity level with its derived numeric score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityAssessment {
    pub level: SeverityLevel,
    pub score: f64,
    pub factors: SeverityFactors,
}

/// Classifies advisory text into a severity band.
#[derive(Clone)]
pub struct SeverityClassifier {
    patterns: Arc<PatternLibrary>,
}

struct BandHits<'a> {
    types: Vec<&'a str>,
    impacts: Vec<&'a str>,
    accesses: Vec<&'a str>,
}

impl<'a> BandHits<'a> {
    fn total(&self) -> usize {
        self.types.len() + self.impacts.len() + self.accesses.len()
    }
}

fn scan_band<'a>(band: &'a SeverityBand, text: &str) -> BandHits<'a> {
    let hits = |set: &'a [crate::patterns::severity::FactorKeyword]| -> Vec<&'a str> {
        set.iter()
            .filter(|kw| kw.pattern.is_match(text))
            .map(|kw| kw.text)
            .collect()
    };
    BandHits {
        types: hits(&band.vuln_types),
        impacts: hits(&band.impacts),
        accesses: hits(&band.accesses),
    }
}

/// Linear score inside the band's range, driven by distinct keyword hits.
fn band_score(band: &SeverityBand, hits: usize) -> f64 {
    let span = band.ceiling - band.floor;
    let capped = hits.clamp(1, SCORE_HIT_CAP) as f64;
    let raw = band.floor + span * ((capped - 1.0) / SCORE_HIT_CAP as f64);
    (raw * 10.0).round() / 10.0
}

impl SeverityClassifier {
    pub fn new(patterns: Arc<PatternLibrary>) -> Self {
        Self { patterns }
    }

    /// Assigns a severity, or `None` when no vulnerability-type keyword is
    /// present in `raw_text`.
    pub fn classify(
        &self,
        components: &[ExtractedComponent],
        raw_text: &str,
    ) -> Option<SeverityAssessment> {
        trace!(
            components = components.len(),
            text_len = raw_text.len(),
            "severity scan"
        );

        // Highest band with a type hit plus an impact or access hit wins.
        for band in &self.patterns.severity.bands {
            let hits = scan_band(band, raw_text);
            if !hits.types.is_empty() && (!hits.impacts.is_empty() || !hits.accesses.is_empty()) {
                return Some(SeverityAssessment {
                    level: band.level,
                    score: band_score(band, hits.total()),
                    factors: SeverityFactors {
                        vuln_type: hits.types.first().map(|s| s.to_string()),
                        impact: hits.impacts.first().map(|s| s.to_string()),
                        access: hits.accesses.first().map(|s| s.to_string()),
                    },
                });
            }
        }

        // A bare type keyword without impact/access signal classifies low.
        for band in &self.patterns.severity.bands {
            let hits = scan_band(band, raw_text);
            if !hits.types.is_empty() {
                let low = self.patterns.severity.band(SeverityLevel::Low);
                return Some(SeverityAssessment {
                    level: SeverityLevel::Low,
                    score: band_score(low, hits.types.len()),
                    factors: SeverityFactors {
                        vuln_type: hits.types.first().map(|s| s.to_string()),
                        impact: None,
                        access: None,
                    },
                });
            }
        }

        None
    }
}
