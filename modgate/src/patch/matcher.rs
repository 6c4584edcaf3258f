//! Approximate location of a pattern near an expected position.
//!
//! Exact match at the expected location first, then a bitap search scored on
//! both error count and distance from the expected location.

use std::collections::HashMap;

use super::diff::{find_chars, rfind_chars};

/// Longest pattern the bitap search handles (bits in the match mask).
pub const MATCH_MAX_BITS: usize = 32;

/// Worst acceptable score: 0.0 is a perfect match, 1.0 matches anything.
pub const MATCH_THRESHOLD: f64 = 0.5;

/// Distance from the expected location at which a perfect match scores 1.0.
pub const MATCH_DISTANCE: usize = 1000;

/// Locate `pattern` in `text`, preferring positions near `loc`.
///
/// Returns the start index of the best match.
pub fn match_main(text: &[char], pattern: &[char], loc: usize) -> Option<usize> {
    let loc = loc.min(text.len());
    if text == pattern {
        Some(0)
    } else if text.is_empty() {
        None
    } else if loc + pattern.len() <= text.len() && &text[loc..loc + pattern.len()] == pattern {
        Some(loc)
    } else {
        match_bitap(text, pattern, loc)
    }
}

fn score(errors: usize, x: usize, loc: usize, pattern_len: usize) -> f64 {
    let accuracy = errors as f64 / pattern_len as f64;
    let proximity = (loc as f64 - x as f64).abs();
    accuracy + proximity / MATCH_DISTANCE as f64
}

fn alphabet(pattern: &[char]) -> HashMap<char, u64> {
    let mut masks = HashMap::new();
    for (i, c) in pattern.iter().enumerate() {
        *masks.entry(*c).or_insert(0u64) |= 1u64 << (pattern.len() - i - 1);
    }
    masks
}

fn match_bitap(text: &[char], pattern: &[char], loc: usize) -> Option<usize> {
    let plen = pattern.len();
    if plen == 0 || plen > MATCH_MAX_BITS {
        return None;
    }
    let masks = alphabet(pattern);

    let mut threshold = MATCH_THRESHOLD;
    if let Some(exact) = find_chars(text, pattern, loc) {
        threshold = threshold.min(score(0, exact, loc, plen));
        if let Some(exact) = rfind_chars(text, pattern, loc + plen) {
            threshold = threshold.min(score(0, exact, loc, plen));
        }
    }

    let match_mask = 1u64 << (plen - 1);
    let mut best_loc: Option<usize> = None;
    let mut bin_max = plen + text.len();
    let mut last_rd: Vec<u64> = Vec::new();

    for d in 0..plen {
        // Widest window around `loc` that can still beat the threshold.
        let mut bin_min = 0;
        let mut bin_mid = bin_max;
        while bin_min < bin_mid {
            if score(d, loc + bin_mid, loc, plen) <= threshold {
                bin_min = bin_mid;
            } else {
                bin_max = bin_mid;
            }
            bin_mid = (bin_max - bin_min) / 2 + bin_min;
        }
        bin_max = bin_mid;

        let mut start = (loc as isize - bin_mid as isize + 1).max(1) as usize;
        let finish = (loc + bin_mid).min(text.len()) + plen;

        let mut rd = vec![0u64; finish + 2];
        rd[finish + 1] = (1u64 << d) - 1;
        let mut j = finish;
        while j >= start {
            let char_match = text
                .get(j - 1)
                .and_then(|c| masks.get(c))
                .copied()
                .unwrap_or(0);
            rd[j] = ((rd[j + 1] << 1) | 1) & char_match;
            if d > 0 {
                let prev = |i: usize| last_rd.get(i).copied().unwrap_or(0);
                rd[j] |= (((prev(j + 1) | prev(j)) << 1) | 1) | prev(j + 1);
            }
            if rd[j] & match_mask != 0 {
                let candidate = score(d, j - 1, loc, plen);
                if candidate <= threshold {
                    threshold = candidate;
                    best_loc = Some(j - 1);
                    if j - 1 > loc {
                        start = (2 * loc as isize - (j - 1) as isize).max(1) as usize;
                    } else {
                        break;
                    }
                }
            }
            j -= 1;
        }

        if score(d + 1, loc, loc, plen) > threshold {
            break;
        }
        last_rd = rd;
    }

    best_loc
}
