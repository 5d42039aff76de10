//! Field extraction from a single record chunk.
//!
//! # Design Decision
//!
//! ## Field Processing Strategy
//! - **Mapping-driven**: only tags named by the [`TagMapping`] are buffered;
//!   everything else is dropped on sight
//! - **Multi-valued**: every occurrence of a tag opens a new value
//! - **Continuations**: an untagged line extends the latest value of the
//!   current tag, joined with a single space
//! - **First-wins**: title, journal and year read the first value only
//! - **Degrade, don't fail**: every field falls back to absent/empty

use crate::regex::Regex;
use crate::ris::split::RecordChunk;
use crate::ris::tags::{RisTag, parse_tag_line};
use crate::{NormalizedRecord, TagMapping};
use itertools::Itertools;
use std::collections::HashMap;
use std::sync::LazyLock;

static YEAR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[0-9]{4}\b").unwrap());

/// Per-record extraction state: the tag receiving continuation lines, and
/// the values collected so far for every tracked tag.
#[derive(Debug)]
pub(crate) struct TagBuffers<'m> {
    tracked: Vec<&'m RisTag>,
    current: Option<&'m RisTag>,
    values: HashMap<&'m RisTag, Vec<String>>,
}

impl<'m> TagBuffers<'m> {
    pub(crate) fn new(mapping: &'m TagMapping) -> Self {
        Self {
            tracked: mapping.tracked_tags().collect(),
            current: None,
            values: HashMap::new(),
        }
    }

    /// Feed one trimmed, non-empty line.
    pub(crate) fn push_line(&mut self, line: &str) {
        match parse_tag_line(line) {
            Some((code, content)) => {
                self.current = self
                    .tracked
                    .iter()
                    .copied()
                    .find(|tag| tag.as_str() == code);
                if let Some(tag) = self.current {
                    self.values
                        .entry(tag)
                        .or_default()
                        .push(content.to_string());
                }
            }
            None => {
                let last = self
                    .current
                    .and_then(|tag| self.values.get_mut(tag))
                    .and_then(|values| values.last_mut());
                if let Some(last) = last {
                    last.push(' ');
                    last.push_str(line);
                }
            }
        }
    }

    /// All values collected for `tag`, empty if it never occurred.
    pub(crate) fn get(&self, tag: Option<&RisTag>) -> &[String] {
        tag.and_then(|tag| self.values.get(tag))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First value collected for `tag`.
    pub(crate) fn get_first(&self, tag: Option<&RisTag>) -> Option<&str> {
        self.get(tag).first().map(String::as_str)
    }

    /// Resolve the buffered values into a record.
    pub(crate) fn into_record(self, mapping: &TagMapping) -> NormalizedRecord {
        let title = non_blank(self.get_first(mapping.title.as_ref()));
        let journal = non_blank(self.get_first(mapping.journal_name.as_ref()));
        let year = self
            .get_first(mapping.publication_year.as_ref())
            .and_then(parse_year);

        let abstract_values = self.get(mapping.abstract_text.as_ref());
        let abstract_text =
            Some(abstract_values.iter().join(" ")).filter(|text| !text.trim().is_empty());

        let authors = trimmed(self.get(mapping.author.as_ref()));
        let keywords = trimmed(self.get(mapping.keywords.as_ref()));

        NormalizedRecord {
            title,
            journal,
            year,
            abstract_text,
            authors,
            keywords,
        }
    }
}

/// Extract a [`NormalizedRecord`] from one chunk.
///
/// Never fails: missing mappings and missing content leave the matching
/// field absent or empty.
pub fn extract_record(chunk: &RecordChunk<'_>, mapping: &TagMapping) -> NormalizedRecord {
    let mut buffers = TagBuffers::new(mapping);
    for line in &chunk.lines {
        buffers.push_line(line);
    }
    buffers.into_record(mapping)
}

/// First stand-alone four digit run, e.g. `2020` in `Feb 2020`.
fn parse_year(value: &str) -> Option<i32> {
    YEAR_REGEX.find(value)?.as_str().parse().ok()
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SemanticField;
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn mapping() -> TagMapping {
        TagMapping::from_json(
            r#"{"title":"TI","author":"AU","journal_name":"JO","publication_year":"PY","keywords":"KW","abstract":"AB"}"#,
        )
        .unwrap()
    }

    fn chunk<'a>(lines: &[&'a str]) -> RecordChunk<'a> {
        RecordChunk {
            line_number: 1,
            lines: lines.to_vec(),
        }
    }

    #[test]
    fn test_extract_full_record() {
        let record = extract_record(
            &chunk(&[
                "TY  - JOUR",
                "TI  - Deep Learning",
                "AU  - Smith, J.",
                "AU  - Doe, A.",
                "JO  - Nature",
                "PY  - 2015/05/28",
                "KW  - neural networks",
                "KW  - representation learning",
                "AB  - Deep learning allows",
                "computational models",
            ]),
            &mapping(),
        );

        assert_eq!(
            record,
            NormalizedRecord {
                title: Some("Deep Learning".to_string()),
                journal: Some("Nature".to_string()),
                year: Some(2015),
                abstract_text: Some("Deep learning allows computational models".to_string()),
                authors: vec!["Smith, J.".to_string(), "Doe, A.".to_string()],
                keywords: vec![
                    "neural networks".to_string(),
                    "representation learning".to_string()
                ],
            }
        );
    }

    #[test]
    fn test_round_trip_title() {
        let mapping = TagMapping::default()
            .with(SemanticField::Title, "TI")
            .unwrap();
        let record = extract_record(&chunk(&["TI  - Hello"]), &mapping);
        assert_eq!(record.title.as_deref(), Some("Hello"));
        assert_eq!(record.authors, Vec::<String>::new());
        assert_eq!(record.abstract_text, None);
    }

    #[test]
    fn test_continuation_merges_into_latest_value() {
        let record = extract_record(&chunk(&["AB  - Part one", "of the abstract"]), &mapping());
        assert_eq!(
            record.abstract_text.as_deref(),
            Some("Part one of the abstract")
        );
    }

    #[test]
    fn test_continuation_extends_last_author_only() {
        let record = extract_record(&chunk(&["AU  - Smith, J.", "AU  - Doe,", "A."]), &mapping());
        assert_eq!(record.authors, vec!["Smith, J.", "Doe, A."]);
    }

    #[test]
    fn test_repeated_abstract_tags_are_joined() {
        let record = extract_record(
            &chunk(&["AB  - Background.", "AB  - Methods.", "AB  - Results."]),
            &mapping(),
        );
        assert_eq!(
            record.abstract_text.as_deref(),
            Some("Background. Methods. Results.")
        );
    }

    #[test]
    fn test_untracked_tag_resets_current_tag() {
        let record = extract_record(
            &chunk(&[
                "AB  - Abstract text",
                "UR  - https://example.com",
                "stray continuation",
                "TI  - Title",
            ]),
            &mapping(),
        );
        assert_eq!(record.abstract_text.as_deref(), Some("Abstract text"));
        assert_eq!(record.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_leading_untagged_lines_are_dropped() {
        let record = extract_record(
            &chunk(&["Record #1 of 2", "Provider: Some Provider", "TI  - Title"]),
            &mapping(),
        );
        assert_eq!(record.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_first_title_wins() {
        let record = extract_record(
            &chunk(&["TI  - First title", "TI  - Second title"]),
            &mapping(),
        );
        assert_eq!(record.title.as_deref(), Some("First title"));
    }

    #[rstest]
    #[case("Feb 2020", Some(2020))]
    #[case("2020///", Some(2020))]
    #[case("2019/12/25/Christmas edition", Some(2019))]
    #[case("published 1998, reprinted 2004", Some(1998))]
    #[case("Spring", None)]
    #[case("12/10", None)]
    #[case("202012", None)]
    fn test_year(#[case] content: &str, #[case] expected: Option<i32>) {
        let line = format!("PY  - {content}");
        let record = extract_record(&chunk(&[line.as_str()]), &mapping());
        assert_eq!(record.year, expected);
    }

    #[test]
    fn test_year_reads_first_value_only() {
        let record = extract_record(&chunk(&["PY  - n.d.", "PY  - 2021"]), &mapping());
        assert_eq!(record.year, None);
    }

    #[test]
    fn test_exporter_specific_mapping() {
        let mapping = TagMapping::from_json(
            r#"{"title":"T1","author":"A1","journal_name":"JF","publication_year":"Y1","keywords":null,"abstract":"N2"}"#,
        )
        .unwrap();
        let record = extract_record(
            &chunk(&[
                "T1  - Albendazole therapy",
                "A1  - Baranwal, Arun K",
                "JF  - Pediatric infectious disease journal",
                "Y1  - 1998///",
                "KW  - ignored keyword",
                "N2  - Summary",
                "TI  - Ignored title",
            ]),
            &mapping,
        );
        assert_eq!(record.title.as_deref(), Some("Albendazole therapy"));
        assert_eq!(record.authors, vec!["Baranwal, Arun K"]);
        assert_eq!(record.year, Some(1998));
        assert_eq!(record.keywords, Vec::<String>::new());
        assert_eq!(record.abstract_text.as_deref(), Some("Summary"));
    }

    #[test]
    fn test_unmapped_fields_degrade() {
        let record = extract_record(
            &chunk(&["TI  - Title", "AU  - Smith, J.", "AB  - Text"]),
            &TagMapping::default(),
        );
        assert_eq!(record, NormalizedRecord::default());
    }

    #[test]
    fn test_blank_title_is_absent() {
        let record = extract_record(&chunk(&["TI  - ", "AU  - Smith, J."]), &mapping());
        assert_eq!(record.title, None);
        assert_eq!(record.authors, vec!["Smith, J."]);
    }

    #[test]
    fn test_shared_tag_feeds_both_fields() {
        let mapping = TagMapping::default()
            .with(SemanticField::Title, "TI")
            .and_then(|m| m.with(SemanticField::Keywords, "TI"))
            .unwrap();
        let record = extract_record(&chunk(&["TI  - One", "TI  - Two"]), &mapping);
        assert_eq!(record.title.as_deref(), Some("One"));
        assert_eq!(record.keywords, vec!["One", "Two"]);
    }
}
