//! Authoring patch documents from two versions of a text.

use super::diff::{diff_chars, find_chars, rfind_chars, Edit, EditOp};
use super::document::{Hunk, PatchDocument};
use super::matcher::MATCH_MAX_BITS;

/// Characters of context kept around each edit.
pub const PATCH_MARGIN: usize = 4;

impl PatchDocument {
    /// Build a document that turns `old` into `new`.
    ///
    /// ```
    /// use modgate::patch::PatchDocument;
    ///
    /// let old = "<body>\n</body>\n";
    /// let new = "<body>\n<script src=\"mod.js\"></script>\n</body>\n";
    /// let doc = PatchDocument::make(old, new);
    /// assert_eq!(doc.apply(old).content, new);
    /// ```
    pub fn make(old: &str, new: &str) -> Self {
        let edits = diff_chars(old, new);
        Self::from_edits(old, &edits)
    }

    fn from_edits(old: &str, edits: &[Edit]) -> Self {
        let mut hunks = Vec::new();
        if edits.is_empty() {
            return Self::new(hunks);
        }

        let mut hunk = Hunk::default();
        let mut count1 = 0;
        let mut count2 = 0;
        // Context is taken from the text as patched so far, which is where
        // `start2` points.
        let mut prepatch: Vec<char> = old.chars().collect();
        let mut postpatch: Vec<char> = prepatch.clone();

        for (i, edit) in edits.iter().enumerate() {
            let len = edit.char_len();
            if hunk.edits.is_empty() && edit.op != EditOp::Equal {
                hunk.start1 = count1;
                hunk.start2 = count2;
            }

            match edit.op {
                EditOp::Insert => {
                    hunk.edits.push(edit.clone());
                    hunk.length2 += len;
                    postpatch.splice(count2..count2, edit.text.chars());
                }
                EditOp::Delete => {
                    hunk.length1 += len;
                    hunk.edits.push(edit.clone());
                    postpatch.drain(count2..count2 + len);
                }
                EditOp::Equal => {
                    if len <= 2 * PATCH_MARGIN && !hunk.edits.is_empty() && i != edits.len() - 1 {
                        hunk.edits.push(edit.clone());
                        hunk.length1 += len;
                        hunk.length2 += len;
                    }
                    if len >= 2 * PATCH_MARGIN && !hunk.edits.is_empty() {
                        add_context(&mut hunk, &prepatch);
                        hunks.push(std::mem::take(&mut hunk));
                        prepatch = postpatch.clone();
                        count1 = count2;
                    }
                }
            }

            if edit.op != EditOp::Insert {
                count1 += len;
            }
            if edit.op != EditOp::Delete {
                count2 += len;
            }
        }

        if !hunk.edits.is_empty() {
            add_context(&mut hunk, &prepatch);
            hunks.push(hunk);
        }
        Self::new(hunks)
    }
}

fn is_unique(text: &[char], pattern: &[char]) -> bool {
    find_chars(text, pattern, 0) == rfind_chars(text, pattern, text.len())
}

/// Grow the hunk's context until its source text is unique, within the
/// matcher's window.
fn add_context(hunk: &mut Hunk, text: &[char]) {
    if text.is_empty() {
        return;
    }
    let end = |padding: usize| (hunk.start2 + hunk.length1 + padding).min(text.len());
    let mut pattern = &text[hunk.start2..end(0)];
    let mut padding = 0;

    while !is_unique(text, pattern)
        && pattern.len() < MATCH_MAX_BITS - PATCH_MARGIN - PATCH_MARGIN
    {
        padding += PATCH_MARGIN;
        pattern = &text[hunk.start2.saturating_sub(padding)..end(padding)];
    }
    padding += PATCH_MARGIN;

    let prefix: String = text[hunk.start2.saturating_sub(padding)..hunk.start2]
        .iter()
        .collect();
    let suffix: String = text[end(0)..end(padding)].iter().collect();
    let (prefix_len, suffix_len) = (prefix.chars().count(), suffix.chars().count());

    if !prefix.is_empty() {
        hunk.edits.insert(0, Edit::equal(prefix));
    }
    if !suffix.is_empty() {
        hunk.edits.push(Edit::equal(suffix));
    }

    hunk.start1 -= prefix_len;
    hunk.start2 -= prefix_len;
    hunk.length1 += prefix_len + suffix_len;
    hunk.length2 += prefix_len + suffix_len;
}
