use crate::ris::tags::tag_prefix;
use std::collections::HashSet;

/// Collect one representative occurrence of every tag in a RIS file.
///
/// The result is what a mapping provider gets to look at: the first line of
/// each distinct tag, in file order, followed by that occurrence's
/// continuation lines. Later occurrences of an already seen tag are skipped
/// together with their continuations. Lines are trimmed and blank lines
/// dropped.
///
/// # Examples
///
/// ```
/// use risdedupe::ris::sample_tag_lines;
///
/// let input = "TY  - JOUR\nAU  - Smith, J.\nAU  - Doe, A.\nAB  - Long\nabstract\nER  -";
/// assert_eq!(
///     sample_tag_lines(input),
///     vec!["TY  - JOUR", "AU  - Smith, J.", "AB  - Long", "abstract", "ER  -"]
/// );
/// ```
pub fn sample_tag_lines(text: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut sample = Vec::new();
    let mut collecting = false;

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        if let Some(tag) = tag_prefix(line) {
            collecting = seen.insert(tag);
        }
        if collecting {
            sample.push(line);
        }
    }

    sample
}
