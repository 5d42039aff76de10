//! RIS tag codes and tag-line recognition.
//!
//! A tag line looks like `TI  - Some content`: a two character code, two
//! spaces, a dash, one separator character, then the content. Codes are not
//! checked against a fixed vocabulary; exporters disagree on which code holds
//! which field, so the meaning of a code comes from a [`crate::TagMapping`].
//! See: http://en.wikipedia.org/wiki/RIS_(file_format)

use compact_str::CompactString;
use serde::Serialize;
use std::fmt;

/// Separator between a tag code and its content.
pub(crate) const TAG_SEPARATOR: &str = "  -";

/// A two character RIS tag code such as `TI`, `AU` or `N2`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RisTag(CompactString);

impl RisTag {
    /// Builds a tag from its code. Returns `None` unless `code` is exactly
    /// two characters long.
    ///
    /// # Examples
    ///
    /// ```
    /// use risdedupe::RisTag;
    ///
    /// assert!(RisTag::new("TI").is_some());
    /// assert!(RisTag::new("TITLE").is_none());
    /// ```
    pub fn new(code: &str) -> Option<Self> {
        (code.chars().count() == 2).then(|| Self(CompactString::from(code)))
    }

    /// The tag code as written in the file.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RisTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits a trimmed line into its tag code and trimmed content.
///
/// A line is a tag line iff it holds at least six characters and characters
/// 2..5 are the separator. The content is everything after character 6, so
/// the character right after the dash is always skipped.
pub(crate) fn parse_tag_line(line: &str) -> Option<(&str, &str)> {
    let mut offsets = line.char_indices().map(|(offset, _)| offset);
    let tag_end = offsets.nth(2)?;
    let separator_end = offsets.nth(2)?;
    let content_start = offsets.next().unwrap_or(line.len());

    if &line[tag_end..separator_end] != TAG_SEPARATOR {
        return None;
    }

    Some((&line[..tag_end], line[content_start..].trim()))
}

/// The tag code of a trimmed line that starts with `XX  -`, whatever follows.
///
/// Unlike [`parse_tag_line`] this accepts five character lines such as
/// `AB  -`, which is how the sample builder sees tags.
pub(crate) fn tag_prefix(line: &str) -> Option<&str> {
    let mut offsets = line.char_indices().map(|(offset, _)| offset);
    let tag_end = offsets.nth(2)?;
    let separator_end = offsets.nth(2).unwrap_or(line.len());
    (line.get(tag_end..separator_end) == Some(TAG_SEPARATOR)).then(|| &line[..tag_end])
}
