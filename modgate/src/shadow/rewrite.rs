//! Cross-reference rewriting in the root document.
//!
//! Every whole-token occurrence of a shadowed original path is replaced by
//! its shadow path. The scan is single-pass and tries longer paths first, so
//! `hud/main.js` is never matched as `main.js`, and text that was just
//! replaced is never looked at again.

use super::naming::shadow_path;

/// Characters that may appear inside a relative path token.
fn is_path_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '\\')
}

/// Whether a match may start at byte `at`.
fn starts_token(document: &str, at: usize) -> bool {
    let before = &document[..at];
    match before.chars().next_back() {
        None => true,
        Some(c) if !is_path_char(c) => true,
        // "./path" refers to the same file.
        Some('/') => before
            .strip_suffix("./")
            .map(|rest| rest.chars().next_back().map_or(true, |c| !is_path_char(c)))
            .unwrap_or(false),
        Some(_) => false,
    }
}

fn ends_token(document: &str, at: usize) -> bool {
    document[at..].chars().next().map_or(true, |c| !is_path_char(c))
}

/// Result of [`rewrite_references`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOutcome {
    pub content: String,
    /// Number of references replaced.
    pub replacements: usize,
}

/// Replace references to `originals` with their shadow paths.
///
/// ```
/// use modgate::shadow::rewrite_references;
///
/// let html = r#"<script src="hud/main.js"></script><script src="main.js"></script>"#;
/// let originals = vec!["main.js".to_string(), "hud/main.js".to_string()];
/// let outcome = rewrite_references(html, &originals);
/// assert_eq!(
///     outcome.content,
///     r#"<script src="hud/__main.js"></script><script src="__main.js"></script>"#
/// );
/// assert_eq!(outcome.replacements, 2);
/// ```
pub fn rewrite_references(document: &str, originals: &[String]) -> RewriteOutcome {
    let mut candidates: Vec<(&str, String)> = originals
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| (p.as_str(), shadow_path(p)))
        .collect();
    candidates.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(b.0)));
    candidates.dedup_by(|a, b| a.0 == b.0);

    let mut content = String::with_capacity(document.len());
    let mut replacements = 0;
    let mut at = 0;

    while at < document.len() {
        let replaced = starts_token(document, at)
            .then(|| {
                candidates.iter().find(|(original, _)| {
                    document[at..].starts_with(original) && ends_token(document, at + original.len())
                })
            })
            .flatten();

        match replaced {
            Some((original, shadow)) => {
                content.push_str(shadow);
                at += original.len();
                replacements += 1;
            }
            None => {
                let c = document[at..].chars().next().unwrap_or_default();
                content.push(c);
                at += c.len_utf8().max(1);
            }
        }
    }

    RewriteOutcome {
        content,
        replacements,
    }
}
