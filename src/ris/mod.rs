//! RIS format parser implementation.
//!
//! Parsing happens in two steps: [`split_records`] cuts the text into one
//! [`RecordChunk`] per entry, and [`extract_record`] turns a chunk into a
//! [`NormalizedRecord`](crate::NormalizedRecord) according to a
//! [`TagMapping`]. [`RisParser`] runs both and drops entries without a title.
//!
//! # Example
//!
//! ```
//! use risdedupe::{RisParser, TagMapping, SemanticField};
//!
//! let input = r#"TY  - JOUR
//! TI  - Example Title
//! AU  - Smith, John
//! ER  -"#;
//!
//! let mapping = TagMapping::default()
//!     .with(SemanticField::Title, "TI")
//!     .and_then(|m| m.with(SemanticField::Author, "AU"))
//!     .unwrap();
//! let parser = RisParser::new(mapping);
//!
//! let records = parser.parse(input);
//! assert_eq!(records[0].title.as_deref(), Some("Example Title"));
//! assert_eq!(records[0].authors, vec!["Smith, John"]);
//! ```

mod extract;
mod sample;
mod split;
mod tags;

use crate::{NormalizedRecord, TagMapping};
use split::RecordSplit;
use tracing::debug;

pub use extract::extract_record;
pub use sample::sample_tag_lines;
pub use split::RecordChunk;
pub use tags::RisTag;

/// Split RIS text into per-record chunks on end-of-record lines.
pub fn split_records(text: &str) -> Vec<RecordChunk<'_>> {
    RecordSplit::new(text).collect()
}

/// Parser for RIS exports whose tag assignment is described by a
/// [`TagMapping`].
#[derive(Debug, Clone, Default)]
pub struct RisParser {
    mapping: TagMapping,
}

impl RisParser {
    /// Creates a parser for files following `mapping`.
    #[must_use]
    pub fn new(mapping: TagMapping) -> Self {
        Self { mapping }
    }

    pub fn mapping(&self) -> &TagMapping {
        &self.mapping
    }

    /// Parses every record in `input`, in file order.
    ///
    /// Records without a title are dropped; stray or garbage chunks are
    /// routine in exports and are not reported as errors.
    pub fn parse(&self, input: &str) -> Vec<NormalizedRecord> {
        RecordSplit::new(input)
            .filter_map(|chunk| {
                let record = extract_record(&chunk, &self.mapping);
                if record.title.is_none() {
                    debug!(
                        line = chunk.line_number,
                        lines = chunk.lines.len(),
                        "dropping record without title"
                    );
                    return None;
                }
                Some(record)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parser() -> RisParser {
        RisParser::new(
            TagMapping::from_json(
                r#"{"title":"TI","author":"AU","journal_name":"JO","publication_year":"PY","keywords":"KW","abstract":"AB"}"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_parse_simple_ris() {
        let input = r#"TY  - JOUR
TI  - Test Article Title
AU  - Smith, John
JO  - Test Journal
PY  - 2023/12/25/Christmas edition
VL  - 10
DO  - 10.1000/test
AB  - This is a test abstract.
KW  - Keyword1
KW  - Keyword2
ER  -

"#;
        let result = parser().parse(input);
        assert_eq!(result.len(), 1);
        let record = &result[0];
        assert_eq!(record.title.as_deref(), Some("Test Article Title"));
        assert_eq!(record.authors, vec!["Smith, John"]);
        assert_eq!(record.journal.as_deref(), Some("Test Journal"));
        assert_eq!(record.year, Some(2023));
        assert_eq!(record.keywords, vec!["Keyword1", "Keyword2"]);
    }

    #[test]
    fn test_parse_drops_untitled_chunks() {
        let input = r#"Record #1 of 2
Provider: Some Provider
ER  -
TY  - JOUR
AU  - Nobody, N.
ER  -
TY  - JOUR
TI  - Kept
ER  -"#;
        let result = parser().parse(input);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title.as_deref(), Some("Kept"));
    }

    #[test]
    fn test_parse_last_record_without_terminator() {
        let input = "TI  - First\nER  -\nTI  - Second\nAB  - Unterminated";
        let titles: Vec<_> = parser()
            .parse(input)
            .into_iter()
            .filter_map(|record| record.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn test_parse_is_idempotent() {
        let input = "TI  - A\nAB  - one\ntwo\nER  -\nTI  - B\nKW  - x\nER  -\n";
        let parser = parser();
        assert_eq!(parser.parse(input), parser.parse(input));
    }

    #[test]
    fn test_split_records_counts_chunks() {
        let chunks = split_records("TI  - A\nER  -\nTI  - B\nER  -\n");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].line_number, 3);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parser().parse("").is_empty());
    }
}
