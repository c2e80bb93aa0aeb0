//! Fuzzy string scoring on a 0..=100 scale.
//!
//! The scorer combines a plain edit-distance ratio with token-sort and
//! token-set comparisons, and switches to best-window (partial) matching when
//! one string is much longer than the other. Inputs are pre-processed by
//! lower-casing and replacing every non-alphanumeric character with a space.
//!
//! The base ratio is the normalized Damerau–Levenshtein similarity, so a
//! single swapped pair of letters ("axsi" vs "axis") costs one edit.

use std::collections::BTreeSet;

use strsim::normalized_damerau_levenshtein;

/// Lower-case, map punctuation to spaces, collapse whitespace.
pub fn full_process(s: &str) -> String {
    let mapped: String = s
        .chars()
        .flat_map(|c| {
            let keep = if c.is_alphanumeric() { c } else { ' ' };
            keep.to_lowercase()
        })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Edit-distance similarity of two already-processed strings.
pub fn ratio(a: &str, b: &str) -> u8 {
    to_score(normalized_damerau_levenshtein(a, b) * 100.0)
}

/// Best `ratio` of the shorter string against every equally long window of the longer one.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if short.is_empty() {
        return 0;
    }
    if short.len() == long.len() {
        return ratio(a, b);
    }

    let short: String = short.into_iter().collect();
    let mut best = 0u8;
    for window in long.windows(short.chars().count()) {
        let candidate: String = window.iter().collect();
        best = best.max(ratio(&short, &candidate));
        if best == 100 {
            break;
        }
    }
    best
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

pub fn partial_token_sort_ratio(a: &str, b: &str) -> u8 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// The three strings compared by the token-set scorers:
/// sorted intersection, intersection + rest of `a`, intersection + rest of `b`.
fn token_set_parts(a: &str, b: &str) -> (String, String, String) {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |set: Vec<&str>| set.join(" ");
    let intersection = join(ta.intersection(&tb).copied().collect());
    let diff_ab = join(ta.difference(&tb).copied().collect());
    let diff_ba = join(tb.difference(&ta).copied().collect());

    let combine = |diff: &str| format!("{intersection} {diff}").trim().to_string();
    let with_a = combine(&diff_ab);
    let with_b = combine(&diff_ba);
    (intersection, with_a, with_b)
}

pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let (t0, t1, t2) = token_set_parts(a, b);
    ratio(&t0, &t1).max(ratio(&t0, &t2)).max(ratio(&t1, &t2))
}

pub fn partial_token_set_ratio(a: &str, b: &str) -> u8 {
    let (t0, t1, t2) = token_set_parts(a, b);
    partial_ratio(&t0, &t1)
        .max(partial_ratio(&t0, &t2))
        .max(partial_ratio(&t1, &t2))
}

/// Weighted combination of all scorers; this is what the resolver ranks by.
///
/// Returns 0 when either side has no alphanumeric content.
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    let p1 = full_process(a);
    let p2 = full_process(b);
    if p1.is_empty() || p2.is_empty() {
        return 0;
    }

    let base = ratio(&p1, &p2) as f64;
    let len1 = p1.chars().count() as f64;
    let len2 = p2.chars().count() as f64;
    let len_ratio = len1.max(len2) / len1.min(len2);

    const UNBASE_SCALE: f64 = 0.95;

    let best = if len_ratio < 1.5 {
        let tsor = token_sort_ratio(&p1, &p2) as f64 * UNBASE_SCALE;
        let tser = token_set_ratio(&p1, &p2) as f64 * UNBASE_SCALE;
        base.max(tsor).max(tser)
    } else {
        let partial_scale = if len_ratio > 8.0 { 0.6 } else { 0.9 };
        let partial = partial_ratio(&p1, &p2) as f64 * partial_scale;
        let ptsor = partial_token_sort_ratio(&p1, &p2) as f64 * UNBASE_SCALE * partial_scale;
        let ptser = partial_token_set_ratio(&p1, &p2) as f64 * UNBASE_SCALE * partial_scale;
        base.max(partial).max(ptsor).max(ptser)
    };

    to_score(best)
}

fn to_score(v: f64) -> u8 {
    if !v.is_finite() {
        return 0;
    }
    v.round().clamp(0.0, 100.0) as u8
}
