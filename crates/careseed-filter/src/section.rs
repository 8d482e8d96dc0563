use regex::Regex;

use crate::errors::FilterError;

const MARKER_PATTERN: &str = r"^--\s+\d+\.\s+\S";

/// A run of script lines opened by a marker comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Marker line, trimmed. `None` for lines before the first marker.
    pub marker: Option<String>,
    /// Every line of the section, the marker included.
    pub lines: Vec<String>,
}

impl Section {
    pub fn name(&self) -> &str {
        self.marker.as_deref().unwrap_or("")
    }

    pub fn has_inserts(&self) -> bool {
        self.lines.iter().any(|line| line.contains("INSERT"))
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Recognises section markers: numbered table markers and `SEED DATA` headers.
#[derive(Debug, Clone)]
pub struct SectionSplitter {
    marker: Regex,
}

impl SectionSplitter {
    pub fn new() -> Result<Self, FilterError> {
        Ok(Self {
            marker: Regex::new(MARKER_PATTERN)?,
        })
    }

    pub fn is_marker(&self, line: &str) -> bool {
        let line = line.trim();
        self.marker.is_match(line) || (line.starts_with("-- ") && line.contains("SEED DATA"))
    }

    pub fn partition(&self, text: &str) -> Vec<Section> {
        let mut sections = Vec::new();
        let mut current = Section {
            marker: None,
            lines: Vec::new(),
        };

        for line in text.split('\n') {
            if self.is_marker(line) {
                if !current.lines.is_empty() {
                    sections.push(current);
                }
                current = Section {
                    marker: Some(line.trim().to_string()),
                    lines: Vec::new(),
                };
            }
            current.lines.push(line.to_string());
        }
        if !current.lines.is_empty() {
            sections.push(current);
        }
        sections
    }
}

/// Split `text` into sections with the default marker rules.
pub fn partition(text: &str) -> Result<Vec<Section>, FilterError> {
    Ok(SectionSplitter::new()?.partition(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_markers() {
        let splitter = SectionSplitter::new().unwrap();
        assert!(splitter.is_marker("-- 2. PROFILES (4 records)"));
        assert!(splitter.is_marker("  -- 12. ADMIN_WORKFLOWS (3 records)"));
        assert!(splitter.is_marker("-- COMPREHENSIVE SEED DATA - 16 Tables"));
        assert!(!splitter.is_marker("-- Generated: 2024-06-01T09:00:00"));
        assert!(!splitter.is_marker("INSERT INTO agencies (id) VALUES ('-- 1. x');"));
    }

    #[test]
    fn lines_before_first_marker_form_a_preamble() {
        let text =
            "-- note\n\n-- 1. AGENCIES (1 records)\nINSERT INTO agencies (id) VALUES ('a');\n";
        let sections = partition(text).unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].marker, None);
        assert!(!sections[0].has_inserts());
        assert_eq!(sections[1].name(), "-- 1. AGENCIES (1 records)");
        assert_eq!(
            sections[1].lines,
            vec![
                "-- 1. AGENCIES (1 records)",
                "INSERT INTO agencies (id) VALUES ('a');",
                ""
            ]
        );
    }
}
