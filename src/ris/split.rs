use super::tags::TAG_SEPARATOR;

/// One bibliographic entry cut out of a RIS file: its trimmed, non-empty
/// lines in file order, plus the line number where it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordChunk<'a> {
    pub line_number: usize,
    pub lines: Vec<&'a str>,
}

/// An [Iterator] which splits RIS text into [`RecordChunk`]s on `ER` lines.
///
/// Blank lines are dropped. The end-of-record line itself is not part of
/// any chunk. Trailing lines without a final `ER` still come out as a last
/// chunk, so truncated exports keep their last record.
pub(crate) struct RecordSplit<'a> {
    lines: std::iter::Enumerate<std::str::Lines<'a>>,
}

impl<'a> RecordSplit<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
        }
    }
}

impl<'a> Iterator for RecordSplit<'a> {
    type Item = RecordChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chunk: Option<RecordChunk<'a>> = None;

        for (index, line) in self.lines.by_ref() {
            let line = line.trim();
            if is_end_of_record(line) {
                if chunk.is_some() {
                    return chunk;
                }
                continue;
            }
            if line.is_empty() {
                continue;
            }
            chunk
                .get_or_insert_with(|| RecordChunk {
                    line_number: index + 1,
                    lines: Vec::new(),
                })
                .lines
                .push(line);
        }

        chunk
    }
}

/// `ER` on its own, or `ER` followed by the tag separator.
fn is_end_of_record(line: &str) -> bool {
    line == "ER"
        || line
            .strip_prefix("ER")
            .is_some_and(|rest| rest.starts_with(TAG_SEPARATOR))
}
