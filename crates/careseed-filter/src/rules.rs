use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::section::Section;

/// Which sections to drop from a script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterRules {
    /// Entity names matched case-insensitively against section markers.
    pub excluded: Vec<String>,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            excluded: vec!["profiles".to_string()],
        }
    }
}

impl FilterRules {
    pub fn skip_reason(&self, section: &Section) -> Option<SkipReason> {
        let marker = section.name().to_lowercase();
        if let Some(name) = self
            .excluded
            .iter()
            .find(|name| marker.contains(&name.to_lowercase()))
        {
            return Some(SkipReason::Excluded(name.clone()));
        }
        if !section.has_inserts() {
            return Some(SkipReason::NoInserts);
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum SkipReason {
    /// Marker names an excluded entity.
    Excluded(String),
    /// Header or empty section.
    NoInserts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSection {
    pub marker: Option<String>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub kept: Vec<Section>,
    pub skipped: Vec<SkippedSection>,
    /// Exclusion list the outcome was produced with, for the output header.
    pub excluded: Vec<String>,
}

/// Split `sections` into kept and skipped according to `rules`.
pub fn apply(sections: Vec<Section>, rules: &FilterRules) -> FilterOutcome {
    let mut kept = Vec::new();
    let mut skipped = Vec::new();

    for section in sections {
        match rules.skip_reason(&section) {
            Some(reason) => {
                info!(section = section.name(), reason = ?reason, "section skipped");
                skipped.push(SkippedSection {
                    marker: section.marker,
                    reason,
                });
            }
            None => {
                debug!(section = section.name(), "section kept");
                kept.push(section);
            }
        }
    }

    FilterOutcome {
        kept,
        skipped,
        excluded: rules.excluded.clone(),
    }
}

/// Filtered script text: a header line, a blank line, then each kept
/// section followed by a blank line.
pub fn render(outcome: &FilterOutcome) -> String {
    let mut out = format!(
        "-- FILTERED SEED DATA (Skipped {})\n\n",
        outcome.excluded.join(", ")
    );
    for section in &outcome.kept {
        out.push_str(&section.text());
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(marker: &str, lines: &[&str]) -> Section {
        let mut all = vec![marker.to_string()];
        all.extend(lines.iter().map(|line| line.to_string()));
        Section {
            marker: Some(marker.to_string()),
            lines: all,
        }
    }

    #[test]
    fn exclusion_is_case_insensitive() {
        let rules = FilterRules {
            excluded: vec!["Compliance".to_string()],
        };
        let compliance = section(
            "-- 10. COMPLIANCE (1 records)",
            &["INSERT INTO compliance (id) VALUES ('c');"],
        );
        assert_eq!(
            rules.skip_reason(&compliance),
            Some(SkipReason::Excluded("Compliance".to_string()))
        );
    }

    #[test]
    fn header_sections_have_no_inserts() {
        let header = section("-- COMPREHENSIVE SEED DATA - 16 Tables", &["-- Generated: now"]);
        assert_eq!(
            FilterRules::default().skip_reason(&header),
            Some(SkipReason::NoInserts)
        );
    }
}
