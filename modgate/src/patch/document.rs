//! Patch documents: hunks, parsing and serialization.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use super::diff::{source_text, target_text, Edit, EditOp};
use super::encoding::{decode_body, encode_body};

/// Errors raised while parsing a patch document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("line {line}: invalid hunk header '{text}'")]
    InvalidHeader { line: usize, text: String },

    #[error("line {line}: invalid mode '{mode}' in '{text}'")]
    InvalidLine { line: usize, mode: char, text: String },

    #[error("line {line}: {reason}")]
    InvalidEscape { line: usize, reason: String },
}

/// One context-anchored edit of a patch document.
///
/// Coordinates are 0-based character offsets: `start1`/`length1` locate the
/// source text in the original, `start2`/`length2` locate the result in the
/// patched text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hunk {
    pub start1: usize,
    pub start2: usize,
    pub length1: usize,
    pub length2: usize,
    pub edits: Vec<Edit>,
}

impl Hunk {
    /// Text the hunk expects to find: context plus deletions.
    pub fn source_text(&self) -> String {
        source_text(&self.edits)
    }

    /// Text the hunk leaves behind: context plus insertions.
    pub fn target_text(&self) -> String {
        target_text(&self.edits)
    }

    fn header(&self) -> String {
        format!(
            "@@ -{} +{} @@",
            coordinates(self.start1, self.length1),
            coordinates(self.start2, self.length2)
        )
    }
}

fn coordinates(start: usize, length: usize) -> String {
    match length {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, length),
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header())?;
        for edit in &self.edits {
            writeln!(f, "{}{}", edit.op.sign(), encode_body(&edit.text))?;
        }
        Ok(())
    }
}

/// An ordered list of hunks describing edits to one text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchDocument {
    pub(crate) hunks: Vec<Hunk>,
}

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^@@ -(\d+),?(\d*) \+(\d+),?(\d*) @@$").unwrap())
}

/// Convert a header coordinate pair to a 0-based start and a length.
fn parse_coordinates(start: &str, length: &str) -> Option<(usize, usize)> {
    let start: usize = start.parse().ok()?;
    match length {
        "" => Some((start.checked_sub(1)?, 1)),
        "0" => Some((start, 0)),
        _ => Some((start.checked_sub(1)?, length.parse().ok()?)),
    }
}

impl PatchDocument {
    pub fn new(hunks: Vec<Hunk>) -> Self {
        Self { hunks }
    }

    /// Parse the textual form.
    ///
    /// Empty lines are ignored anywhere; a trailing carriage return on a
    /// line is dropped.
    ///
    /// ```
    /// use modgate::patch::PatchDocument;
    ///
    /// let doc = PatchDocument::parse("@@ -1,3 +1,4 @@\n ab\n+X\n c\n").unwrap();
    /// assert_eq!(doc.hunks().len(), 1);
    /// assert_eq!(doc.apply("abc").content, "abXc");
    /// ```
    pub fn parse(text: &str) -> Result<Self, PatchError> {
        let mut hunks: Vec<Hunk> = Vec::new();
        let mut current: Option<Hunk> = None;

        for (index, raw) in text.split('\n').enumerate() {
            let line_no = index + 1;
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let Some(mode) = line.chars().next() else {
                continue;
            };

            if mode == '@' {
                if let Some(hunk) = current.take() {
                    hunks.push(hunk);
                }
                current = Some(Self::parse_header(line, line_no)?);
                continue;
            }

            let Some(hunk) = current.as_mut() else {
                return Err(PatchError::InvalidHeader {
                    line: line_no,
                    text: line.to_string(),
                });
            };
            let op = match mode {
                ' ' => EditOp::Equal,
                '-' => EditOp::Delete,
                '+' => EditOp::Insert,
                _ => {
                    return Err(PatchError::InvalidLine {
                        line: line_no,
                        mode,
                        text: line.to_string(),
                    })
                }
            };
            let body = decode_body(&line[mode.len_utf8()..]).map_err(|reason| {
                PatchError::InvalidEscape {
                    line: line_no,
                    reason,
                }
            })?;
            hunk.edits.push(Edit::new(op, body));
        }

        if let Some(hunk) = current {
            hunks.push(hunk);
        }
        Ok(Self { hunks })
    }

    fn parse_header(line: &str, line_no: usize) -> Result<Hunk, PatchError> {
        let invalid = || PatchError::InvalidHeader {
            line: line_no,
            text: line.to_string(),
        };
        let caps = header_pattern().captures(line).ok_or_else(invalid)?;
        let (start1, length1) = parse_coordinates(&caps[1], &caps[2]).ok_or_else(invalid)?;
        let (start2, length2) = parse_coordinates(&caps[3], &caps[4]).ok_or_else(invalid)?;
        Ok(Hunk {
            start1,
            start2,
            length1,
            length2,
            edits: Vec::new(),
        })
    }

    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }

    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    /// Serialize to the textual form accepted by [`PatchDocument::parse`].
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PatchDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hunk in &self.hunks {
            write!(f, "{}", hunk)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for PatchDocument {
    type Err = PatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
