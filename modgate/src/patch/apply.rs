//! Applying a patch document to base content.

use std::fmt;

use super::diff::{diff_chars, levenshtein, x_index, Edit, EditOp};
use super::document::{Hunk, PatchDocument};
use super::make::PATCH_MARGIN;
use super::matcher::{match_main, MATCH_MAX_BITS};

/// Largest share of a long source text that may differ in a fuzzy match.
pub const DELETE_THRESHOLD: f64 = 0.5;

/// How one hunk fared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkOutcome {
    /// Source text found verbatim where expected.
    Clean,
    /// Source text found verbatim, displaced by `by` characters.
    Offset { by: isize },
    /// Source text found approximately; edits were mapped onto it.
    Fuzzy { offset: isize },
    /// The hunk's result is already present; nothing changed.
    AlreadyApplied,
    /// No acceptable match; the hunk was skipped.
    NotFound,
}

impl HunkOutcome {
    /// Whether the content reflects this hunk after application.
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::NotFound)
    }

    /// Whether this outcome changed the content.
    pub fn changed_content(&self) -> bool {
        matches!(self, Self::Clean | Self::Offset { .. } | Self::Fuzzy { .. })
    }
}

impl fmt::Display for HunkOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clean => write!(f, "clean"),
            Self::Offset { by } => write!(f, "offset by {}", by),
            Self::Fuzzy { offset } => write!(f, "fuzzy at offset {}", offset),
            Self::AlreadyApplied => write!(f, "already applied"),
            Self::NotFound => write!(f, "not found"),
        }
    }
}

/// Output of [`PatchDocument::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchResult {
    /// Patched content. Always present, even when hunks failed.
    pub content: String,
    /// One outcome per hunk, in document order.
    pub outcomes: Vec<HunkOutcome>,
}

impl PatchResult {
    pub fn all_applied(&self) -> bool {
        self.outcomes.iter().all(HunkOutcome::is_applied)
    }

    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_applied()).count()
    }

    /// Indices of hunks that were skipped.
    pub fn failed_hunks(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .enumerate()
            .filter(|(_, o)| !o.is_applied())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Where a hunk's source text was located.
struct Located {
    start: usize,
    /// End of the matched region when the source was matched by its ends.
    end: Option<usize>,
}

impl Located {
    /// End of the text region compared against a pattern of `len` chars.
    fn region_end(&self, text_len: usize, len: usize) -> usize {
        match self.end {
            Some(end) => (end + MATCH_MAX_BITS).min(text_len),
            None => (self.start + len).min(text_len),
        }
    }
}

fn locate(text: &[char], source: &[char], expected: usize) -> Option<Located> {
    if source.len() <= MATCH_MAX_BITS {
        return match_main(text, source, expected).map(|start| Located {
            start: start.min(text.len()),
            end: None,
        });
    }

    let start = match_main(text, &source[..MATCH_MAX_BITS], expected)?;
    let tail = &source[source.len() - MATCH_MAX_BITS..];
    let end = match_main(text, tail, expected + source.len() - MATCH_MAX_BITS)?;
    if start >= end {
        return None;
    }
    Some(Located {
        start: start.min(text.len()),
        end: Some(end),
    })
}

/// Best match of `pattern` near `expected` and its edit distance.
fn closest_match(text: &[char], pattern: &[char], expected: usize) -> Option<(usize, usize)> {
    if pattern.is_empty() {
        return None;
    }
    let located = locate(text, pattern, expected)?;
    let found: String = text[located.start..located.region_end(text.len(), pattern.len())]
        .iter()
        .collect();
    let pattern: String = pattern.iter().collect();
    Some((located.start, levenshtein(&diff_chars(&pattern, &found))))
}

/// Control characters wrapped around the content while patching, so hunks
/// at either end of a file keep a full margin of context.
fn null_padding() -> String {
    (1..=PATCH_MARGIN as u32).filter_map(char::from_u32).collect()
}

/// Copies of `hunks` shifted into padded coordinates, with the edge hunks'
/// context extended into the padding.
fn pad_hunks(hunks: &[Hunk], padding: &str) -> Vec<Hunk> {
    let pad_len = padding.chars().count();
    let mut hunks = hunks.to_vec();
    for hunk in &mut hunks {
        hunk.start1 += pad_len;
        hunk.start2 += pad_len;
    }

    if let Some(first) = hunks.first_mut() {
        let leading = first
            .edits
            .first()
            .filter(|edit| edit.op == EditOp::Equal)
            .map(Edit::char_len);
        let extra = match leading {
            None => {
                first.edits.insert(0, Edit::equal(padding));
                pad_len
            }
            Some(len) if len < pad_len => {
                let head: String = padding.chars().skip(len).collect();
                first.edits[0].text.insert_str(0, &head);
                pad_len - len
            }
            Some(_) => 0,
        };
        first.start1 -= extra;
        first.start2 -= extra;
        first.length1 += extra;
        first.length2 += extra;
    }

    if let Some(last) = hunks.last_mut() {
        let trailing = last
            .edits
            .last()
            .filter(|edit| edit.op == EditOp::Equal)
            .map(Edit::char_len);
        let extra = match trailing {
            None => {
                last.edits.push(Edit::equal(padding));
                pad_len
            }
            Some(len) if len < pad_len => {
                let tail: String = padding.chars().take(pad_len - len).collect();
                if let Some(edit) = last.edits.last_mut() {
                    edit.text.push_str(&tail);
                }
                pad_len - len
            }
            Some(_) => 0,
        };
        last.length1 += extra;
        last.length2 += extra;
    }

    hunks
}

fn strip_padding(text: &[char], pad_len: usize) -> String {
    let start = pad_len.min(text.len());
    let end = text.len().saturating_sub(pad_len).max(start);
    text[start..end].iter().collect()
}

fn has_at(text: &[char], pattern: &[char], at: usize) -> bool {
    at + pattern.len() <= text.len() && &text[at..at + pattern.len()] == pattern
}

impl PatchDocument {
    /// Apply every hunk in order to `base`.
    ///
    /// ```
    /// use modgate::patch::{HunkOutcome, PatchDocument};
    ///
    /// let doc = PatchDocument::make("one two three", "one 2 three");
    /// let first = doc.apply("zero one two three");
    /// assert_eq!(first.content, "zero one 2 three");
    /// assert_eq!(first.outcomes, vec![HunkOutcome::Offset { by: 5 }]);
    ///
    /// let again = doc.apply(&first.content);
    /// assert_eq!(again.content, first.content);
    /// assert!(!again.outcomes[0].changed_content());
    /// ```
    pub fn apply(&self, base: &str) -> PatchResult {
        if self.hunks.is_empty() {
            return PatchResult {
                content: base.to_string(),
                outcomes: Vec::new(),
            };
        }

        let padding = null_padding();
        let hunks = pad_hunks(&self.hunks, &padding);
        let mut text: Vec<char> = padding
            .chars()
            .chain(base.chars())
            .chain(padding.chars())
            .collect();
        let mut outcomes = Vec::with_capacity(hunks.len());
        let mut delta: isize = 0;

        for hunk in &hunks {
            let (outcome, drift) = apply_hunk(&mut text, hunk, delta);
            delta += drift;
            outcomes.push(outcome);
        }

        PatchResult {
            content: strip_padding(&text, padding.chars().count()),
            outcomes,
        }
    }
}

/// Apply one hunk; returns the outcome and the change to the running drift.
fn apply_hunk(text: &mut Vec<char>, hunk: &Hunk, delta: isize) -> (HunkOutcome, isize) {
    let source: Vec<char> = hunk.source_text().chars().collect();
    let target: Vec<char> = hunk.target_text().chars().collect();
    let expected_signed = hunk.start2 as isize + delta;
    let expected = expected_signed.max(0) as usize;
    let not_found_drift = hunk.length1 as isize - hunk.length2 as isize;

    if target != source && !target.is_empty() && has_at(text, &target, expected) {
        return (HunkOutcome::AlreadyApplied, expected as isize - expected_signed);
    }

    let Some(located) = locate(text, &source, expected) else {
        return (HunkOutcome::NotFound, not_found_drift);
    };

    let start = located.start;
    let offset = start as isize - expected_signed;

    if target != source && has_at(text, &target, start) {
        return (HunkOutcome::AlreadyApplied, offset);
    }

    let found_end = located.region_end(text.len(), source.len());
    let found: Vec<char> = text[start..found_end].to_vec();

    if found == source {
        text.splice(start..start + source.len(), target);
        let outcome = if offset == 0 {
            HunkOutcome::Clean
        } else {
            HunkOutcome::Offset { by: offset }
        };
        return (outcome, offset);
    }

    let source_str: String = source.iter().collect();
    let found_str: String = found.iter().collect();
    let mapping = diff_chars(&source_str, &found_str);
    let source_errors = levenshtein(&mapping);
    if source.len() > MATCH_MAX_BITS
        && source_errors as f64 / source.len() as f64 > DELETE_THRESHOLD
    {
        return (HunkOutcome::NotFound, not_found_drift);
    }

    // The result text fitting better than the source means the hunk went in
    // on an earlier pass; mapping the edits again would corrupt it.
    if target != source {
        if let Some((at, errors)) = closest_match(text, &target, expected) {
            if errors < source_errors {
                return (HunkOutcome::AlreadyApplied, at as isize - expected_signed);
            }
        }
    }

    let mut index1 = 0;
    for edit in &hunk.edits {
        let len = edit.char_len();
        if edit.op != EditOp::Equal {
            let index2 = x_index(&mapping, index1);
            match edit.op {
                EditOp::Insert => {
                    let at = (start + index2).min(text.len());
                    text.splice(at..at, edit.text.chars());
                }
                EditOp::Delete => {
                    let to = (start + x_index(&mapping, index1 + len)).min(text.len());
                    let from = (start + index2).min(to);
                    text.drain(from..to);
                }
                EditOp::Equal => {}
            }
        }
        if edit.op != EditOp::Delete {
            index1 += len;
        }
    }

    (HunkOutcome::Fuzzy { offset }, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::Edit;

    const PAGE: &str = "<html>\n<head>\n<title>Game</title>\n</head>\n<body>\n<div id=\"hud\"></div>\n</body>\n</html>\n";

    fn patched_page() -> String {
        PAGE.replace(
            "</body>",
            "<script src=\"mods/loader.js\"></script>\n</body>",
        )
    }

    #[test]
    fn test_apply_clean() {
        let new = patched_page();
        let result = PatchDocument::make(PAGE, &new).apply(PAGE);
        assert_eq!(result.content, new);
        assert_eq!(result.outcomes, vec![HunkOutcome::Clean]);
        assert!(result.all_applied());
    }

    #[test]
    fn test_reapply_leaves_content_unchanged() {
        let new = patched_page();
        let doc = PatchDocument::make(PAGE, &new);
        let result = doc.apply(&new);
        assert_eq!(result.content, new);
        assert!(result
            .outcomes
            .iter()
            .all(|o| matches!(o, HunkOutcome::AlreadyApplied | HunkOutcome::NotFound)));
    }

    #[test]
    fn test_reapply_deletion() {
        let old = "keep this line\nremove me\nkeep that line\n";
        let new = "keep this line\nkeep that line\n";
        let doc = PatchDocument::make(old, new);
        let result = doc.apply(new);
        assert_eq!(result.content, new);
        assert!(!result.outcomes[0].changed_content());
    }

    #[test]
    fn test_apply_to_missing_base() {
        let doc = PatchDocument::make("", "body { color: red; }\n");
        let result = doc.apply("");
        assert_eq!(result.content, "body { color: red; }\n");
        assert!(result.all_applied());
    }

    #[test]
    fn test_edge_hunk_matches_through_padding() {
        let doc = PatchDocument::make("y", "y123");
        let result = doc.apply("x");
        assert_eq!(result.content, "x123");
        assert!(matches!(result.outcomes[..], [HunkOutcome::Fuzzy { .. }]));
    }

    #[test]
    fn test_padding_leaves_document_untouched() {
        let doc = PatchDocument::new(vec![Hunk {
            start1: 0,
            start2: 0,
            length1: 2,
            length2: 3,
            edits: vec![Edit::equal("ab"), Edit::insert("c")],
        }]);
        let result = doc.apply("ab");
        assert_eq!(result.content, "abc");
        assert_eq!(result.outcomes, vec![HunkOutcome::Clean]);
        assert_eq!(doc.hunks()[0].edits, vec![Edit::equal("ab"), Edit::insert("c")]);
    }

    #[test]
    fn test_pad_hunks_extends_edge_context() {
        let padding = null_padding();
        let hunks = pad_hunks(
            &[Hunk {
                start1: 0,
                start2: 0,
                length1: 1,
                length2: 4,
                edits: vec![Edit::equal("y"), Edit::insert("123")],
            }],
            &padding,
        );
        assert_eq!(hunks[0].start1, 1);
        assert_eq!(hunks[0].length1, 8);
        assert_eq!(hunks[0].length2, 11);
        assert_eq!(hunks[0].source_text(), "\u{2}\u{3}\u{4}y\u{1}\u{2}\u{3}\u{4}");
    }

    #[test]
    fn test_reapply_after_fuzzy_pass_is_stable() {
        let doc = PatchDocument::make(
            "The quick brown fox jumps over the lazy dog.",
            "That quick brown fox jumped over a lazy dog.",
        );
        let first = doc.apply("The quick red rabbit jumps over the tired tiger.");
        assert_eq!(first.content, "That quick red rabbit jumped over a tired tiger.");
        assert!(first.all_applied());

        let second = doc.apply(&first.content);
        assert_eq!(second.content, first.content);
        assert!(second.outcomes.iter().all(|o| !o.changed_content()));
    }

    #[test]
    fn test_apply_with_drift() {
        let new = patched_page();
        let doc = PatchDocument::make(PAGE, &new);
        let drifted = format!("<!-- build 42 -->\n{}", PAGE);
        let result = doc.apply(&drifted);
        assert_eq!(result.content, format!("<!-- build 42 -->\n{}", new));
        assert_eq!(result.outcomes, vec![HunkOutcome::Offset { by: 18 }]);
    }

    #[test]
    fn test_apply_fuzzy_context() {
        let old = "function init() {\n  setup();\n}\n";
        let new = "function init() {\n  setup();\n  loadMods();\n}\n";
        let doc = PatchDocument::make(old, new);
        let edited = "function init() {\n  setUp();\n}\n";
        let result = doc.apply(edited);
        assert!(matches!(result.outcomes[0], HunkOutcome::Fuzzy { .. }));
        assert_eq!(result.content, "function init() {\n  setUp();\n  loadMods();\n}\n");
    }

    #[test]
    fn test_unrelated_base_not_found() {
        let doc = PatchDocument::make("alpha beta gamma", "alpha BETA gamma");
        let base = "0123456789 0123456789";
        let result = doc.apply(base);
        assert_eq!(result.outcomes, vec![HunkOutcome::NotFound]);
        assert_eq!(result.content, base);
        assert_eq!(result.failed_hunks(), vec![0]);
    }

    #[test]
    fn test_long_hunk_matched_by_ends() {
        let head = "The quick brown fox jumps over ";
        let tail = "the lazy dog and keeps running";
        let doc = PatchDocument::new(vec![Hunk {
            start1: 0,
            start2: 0,
            length1: 61,
            length2: 62,
            edits: vec![Edit::equal(head), Edit::insert("X"), Edit::equal(tail)],
        }]);
        let result = doc.apply(&format!("xx{}{}", head, tail));
        assert_eq!(result.content, format!("xx{}X{}", head, tail));
        assert_eq!(result.outcomes, vec![HunkOutcome::Offset { by: 2 }]);
    }

    #[test]
    fn test_empty_document_is_identity() {
        let result = PatchDocument::default().apply("abc");
        assert_eq!(result.content, "abc");
        assert!(result.outcomes.is_empty());
    }

    #[test]
    fn test_multiple_hunks_track_drift() {
        let old = "header line\n".to_string() + &"filler text\n".repeat(10) + "footer line\n";
        let new = old
            .replace("header line", "HEADER LINE plus more")
            .replace("footer line", "FOOTER");
        let doc = PatchDocument::make(&old, &new);
        assert!(doc.hunks().len() >= 2);
        let result = doc.apply(&old);
        assert_eq!(result.content, new);
        assert!(result.outcomes.iter().all(|o| *o == HunkOutcome::Clean));
    }
}
