//! Character-level diffing.
//!
//! A Myers diff with the middle-snake bisection, so memory stays linear in
//! the input length. Used to author patches and to map a hunk's edits onto
//! drifted text.

use std::fmt;

/// Kind of an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOp {
    Equal,
    Delete,
    Insert,
}

impl EditOp {
    /// Leading character of a patch body line for this edit.
    pub fn sign(&self) -> char {
        match self {
            Self::Equal => ' ',
            Self::Delete => '-',
            Self::Insert => '+',
        }
    }
}

/// A run of text with one edit kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub op: EditOp,
    pub text: String,
}

impl Edit {
    pub fn new(op: EditOp, text: impl Into<String>) -> Self {
        Self {
            op,
            text: text.into(),
        }
    }

    pub fn equal(text: impl Into<String>) -> Self {
        Self::new(EditOp::Equal, text)
    }

    pub fn delete(text: impl Into<String>) -> Self {
        Self::new(EditOp::Delete, text)
    }

    pub fn insert(text: impl Into<String>) -> Self {
        Self::new(EditOp::Insert, text)
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:?}", self.op.sign(), self.text)
    }
}

/// Text before the edits: equalities and deletions.
pub fn source_text(edits: &[Edit]) -> String {
    edits
        .iter()
        .filter(|e| e.op != EditOp::Insert)
        .map(|e| e.text.as_str())
        .collect()
}

/// Text after the edits: equalities and insertions.
pub fn target_text(edits: &[Edit]) -> String {
    edits
        .iter()
        .filter(|e| e.op != EditOp::Delete)
        .map(|e| e.text.as_str())
        .collect()
}

/// Diff two strings character by character.
///
/// ```
/// use modgate::patch::{diff_chars, Edit};
///
/// let edits = diff_chars("abc", "abXc");
/// assert_eq!(
///     edits,
///     vec![Edit::equal("ab"), Edit::insert("X"), Edit::equal("c")]
/// );
/// ```
pub fn diff_chars(old: &str, new: &str) -> Vec<Edit> {
    let a: Vec<char> = old.chars().collect();
    let b: Vec<char> = new.chars().collect();
    let mut edits = diff_main(&a, &b);
    merge(&mut edits);
    edits
}

/// Edit distance of a diff, counting a substitution as one.
pub fn levenshtein(edits: &[Edit]) -> usize {
    let mut distance = 0;
    let mut inserted = 0;
    let mut deleted = 0;
    for edit in edits {
        match edit.op {
            EditOp::Insert => inserted += edit.char_len(),
            EditOp::Delete => deleted += edit.char_len(),
            EditOp::Equal => {
                distance += inserted.max(deleted);
                inserted = 0;
                deleted = 0;
            }
        }
    }
    distance + inserted.max(deleted)
}

/// Map a character index in the source text to the target text.
///
/// An index inside a deletion maps to the start of that deletion.
pub fn x_index(edits: &[Edit], loc: usize) -> usize {
    let mut chars1 = 0;
    let mut chars2 = 0;
    let mut last_chars1 = 0;
    let mut last_chars2 = 0;
    let mut landed_in: Option<EditOp> = None;

    for edit in edits {
        let len = edit.char_len();
        if edit.op != EditOp::Insert {
            chars1 += len;
        }
        if edit.op != EditOp::Delete {
            chars2 += len;
        }
        if chars1 > loc {
            landed_in = Some(edit.op);
            break;
        }
        last_chars1 = chars1;
        last_chars2 = chars2;
    }

    if landed_in == Some(EditOp::Delete) {
        last_chars2
    } else {
        last_chars2 + (loc - last_chars1)
    }
}

fn collect(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Position of `needle` in `hay` at or after `from`.
pub(crate) fn find_chars(hay: &[char], needle: &[char], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return (from <= hay.len()).then_some(from);
    }
    if needle.len() > hay.len() {
        return None;
    }
    (from..=hay.len() - needle.len()).find(|&i| &hay[i..i + needle.len()] == needle)
}

/// Last position of `needle` in `hay` starting at or before `before`.
pub(crate) fn rfind_chars(hay: &[char], needle: &[char], before: usize) -> Option<usize> {
    if needle.len() > hay.len() {
        return None;
    }
    let last = (hay.len() - needle.len()).min(before);
    (0..=last)
        .rev()
        .find(|&i| &hay[i..i + needle.len()] == needle)
}

fn common_prefix(a: &[char], b: &[char]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[char], b: &[char]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

fn diff_main(a: &[char], b: &[char]) -> Vec<Edit> {
    if a == b {
        return if a.is_empty() {
            Vec::new()
        } else {
            vec![Edit::equal(collect(a))]
        };
    }

    let prefix = common_prefix(a, b);
    let (a_rest, b_rest) = (&a[prefix..], &b[prefix..]);
    let suffix = common_suffix(a_rest, b_rest);
    let a_mid = &a_rest[..a_rest.len() - suffix];
    let b_mid = &b_rest[..b_rest.len() - suffix];

    let mut edits = Vec::new();
    if prefix > 0 {
        edits.push(Edit::equal(collect(&a[..prefix])));
    }
    edits.extend(compute(a_mid, b_mid));
    if suffix > 0 {
        edits.push(Edit::equal(collect(&a_rest[a_rest.len() - suffix..])));
    }
    edits
}

fn compute(a: &[char], b: &[char]) -> Vec<Edit> {
    if a.is_empty() {
        return vec![Edit::insert(collect(b))];
    }
    if b.is_empty() {
        return vec![Edit::delete(collect(a))];
    }

    let (long, short, op) = if a.len() > b.len() {
        (a, b, EditOp::Delete)
    } else {
        (b, a, EditOp::Insert)
    };
    if let Some(i) = find_chars(long, short, 0) {
        return vec![
            Edit::new(op, collect(&long[..i])),
            Edit::equal(collect(short)),
            Edit::new(op, collect(&long[i + short.len()..])),
        ];
    }
    if short.len() == 1 {
        return vec![Edit::delete(collect(a)), Edit::insert(collect(b))];
    }

    bisect(a, b)
}

/// Find the middle snake and recurse on both halves.
fn bisect(a: &[char], b: &[char]) -> Vec<Edit> {
    let n = a.len() as isize;
    let m = b.len() as isize;
    let max_d = (n + m + 1) / 2;
    let v_offset = max_d;
    let v_length = 2 * max_d;
    let mut v1 = vec![-1isize; v_length as usize];
    let mut v2 = vec![-1isize; v_length as usize];
    v1[(v_offset + 1) as usize] = 0;
    v2[(v_offset + 1) as usize] = 0;
    let delta = n - m;
    // Odd delta: the forward path collides with the reverse one.
    let front = delta % 2 != 0;
    let (mut k1start, mut k1end, mut k2start, mut k2end) = (0isize, 0isize, 0isize, 0isize);

    for d in 0..max_d {
        let mut k1 = -d + k1start;
        while k1 <= d - k1end {
            let k1_offset = (v_offset + k1) as usize;
            let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                v1[k1_offset + 1]
            } else {
                v1[k1_offset - 1] + 1
            };
            let mut y1 = x1 - k1;
            while x1 < n && y1 < m && a[x1 as usize] == b[y1 as usize] {
                x1 += 1;
                y1 += 1;
            }
            v1[k1_offset] = x1;
            if x1 > n {
                k1end += 2;
            } else if y1 > m {
                k1start += 2;
            } else if front {
                let k2_offset = v_offset + delta - k1;
                if k2_offset >= 0 && k2_offset < v_length && v2[k2_offset as usize] != -1 {
                    let x2 = n - v2[k2_offset as usize];
                    if x1 >= x2 {
                        return bisect_split(a, b, x1 as usize, y1 as usize);
                    }
                }
            }
            k1 += 2;
        }

        let mut k2 = -d + k2start;
        while k2 <= d - k2end {
            let k2_offset = (v_offset + k2) as usize;
            let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                v2[k2_offset + 1]
            } else {
                v2[k2_offset - 1] + 1
            };
            let mut y2 = x2 - k2;
            while x2 < n
                && y2 < m
                && a[(n - x2 - 1) as usize] == b[(m - y2 - 1) as usize]
            {
                x2 += 1;
                y2 += 1;
            }
            v2[k2_offset] = x2;
            if x2 > n {
                k2end += 2;
            } else if y2 > m {
                k2start += 2;
            } else if !front {
                let k1_offset = v_offset + delta - k2;
                if k1_offset >= 0 && k1_offset < v_length && v1[k1_offset as usize] != -1 {
                    let x1 = v1[k1_offset as usize];
                    let y1 = v_offset + x1 - k1_offset;
                    if x1 >= n - x2 {
                        return bisect_split(a, b, x1 as usize, y1 as usize);
                    }
                }
            }
            k2 += 2;
        }
    }

    vec![Edit::delete(collect(a)), Edit::insert(collect(b))]
}

fn bisect_split(a: &[char], b: &[char], x: usize, y: usize) -> Vec<Edit> {
    let mut edits = diff_main(&a[..x], &b[..y]);
    edits.extend(diff_main(&a[x..], &b[y..]));
    edits
}

/// Coalesce adjacent runs, put deletions before insertions between
/// equalities, and drop empty edits.
fn merge(edits: &mut Vec<Edit>) {
    let mut merged: Vec<Edit> = Vec::with_capacity(edits.len());
    let mut deleted = String::new();
    let mut inserted = String::new();

    let flush = |merged: &mut Vec<Edit>, deleted: &mut String, inserted: &mut String| {
        if !deleted.is_empty() {
            merged.push(Edit::delete(std::mem::take(deleted)));
        }
        if !inserted.is_empty() {
            merged.push(Edit::insert(std::mem::take(inserted)));
        }
    };

    for edit in edits.drain(..) {
        match edit.op {
            EditOp::Delete => deleted.push_str(&edit.text),
            EditOp::Insert => inserted.push_str(&edit.text),
            EditOp::Equal => {
                if edit.text.is_empty() {
                    continue;
                }
                flush(&mut merged, &mut deleted, &mut inserted);
                match merged.last_mut() {
                    Some(last) if last.op == EditOp::Equal => last.text.push_str(&edit.text),
                    _ => merged.push(edit),
                }
            }
        }
    }
    flush(&mut merged, &mut deleted, &mut inserted);
    *edits = merged;
}
