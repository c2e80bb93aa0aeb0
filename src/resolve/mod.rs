//! Company name resolution.
//!
//! Free-text queries are scored against every catalog name with
//! [`fuzz::weighted_ratio`]. Two modes share the scorer:
//!
//! - [`resolve`] returns the single best name; callers accept it at
//!   [`ACCEPT_THRESHOLD`] or above
//! - [`suggest`] returns a short ranked list gated at [`SUGGEST_THRESHOLD`]
//!
//! Anything below threshold is a "no match" and the caller asks for the
//! statement URLs by hand.

pub mod fuzz;

use crate::domain::{MatchResult, Suggestion};

/// Minimum score for a single best match to be used without confirmation.
pub const ACCEPT_THRESHOLD: u8 = 70;

/// Minimum score for a name to appear in the suggestion list.
pub const SUGGEST_THRESHOLD: u8 = 60;

/// Suggestion list length used by the dashboards.
pub const DEFAULT_SUGGEST_LIMIT: usize = 5;

/// Best-scoring catalog name for `query`.
///
/// An empty (or whitespace-only) query returns an absent candidate with
/// confidence 0 without scoring anything.
///
/// Distinct names often tie (a short query that is a token of several
/// names, e.g. "tata"); the earliest in catalog order wins.
pub fn resolve<'a, I>(query: &str, names: I) -> MatchResult
where
    I: IntoIterator<Item = &'a str>,
{
    let query = query.trim();
    if query.is_empty() {
        return MatchResult::none();
    }

    let mut best: Option<(&str, u8)> = None;
    for name in names {
        let score = fuzz::weighted_ratio(query, name);
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((name, score)),
        }
    }

    match best {
        Some((name, score)) => MatchResult {
            candidate: Some(name.to_string()),
            confidence: score,
        },
        None => MatchResult::none(),
    }
}

/// Best match, but only if it clears [`ACCEPT_THRESHOLD`].
pub fn accept<'a, I>(query: &str, names: I) -> Option<MatchResult>
where
    I: IntoIterator<Item = &'a str>,
{
    let result = resolve(query, names);
    if result.candidate.is_some() && result.confidence >= ACCEPT_THRESHOLD {
        Some(result)
    } else {
        None
    }
}

/// Up to `limit` names scoring at least [`SUGGEST_THRESHOLD`], best first.
///
/// Equal scores keep catalog order.
pub fn suggest<'a, I>(query: &str, names: I, limit: usize) -> Vec<Suggestion>
where
    I: IntoIterator<Item = &'a str>,
{
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let mut scored: Vec<Suggestion> = names
        .into_iter()
        .map(|name| Suggestion {
            name: name.to_string(),
            score: fuzz::weighted_ratio(query, name),
        })
        .filter(|s| s.score >= SUGGEST_THRESHOLD)
        .collect();

    // `sort_by` is stable, so ties stay in catalog order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(limit);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMES: [&str; 4] = ["Axis Bank", "Infosys Ltd", "Tata Steel Ltd", "Tata Motors Ltd"];

    #[test]
    fn empty_query_returns_absent() {
        assert_eq!(resolve("", NAMES), MatchResult::none());
        assert_eq!(resolve("   ", NAMES), MatchResult::none());
        assert!(suggest("", NAMES, 5).is_empty());
    }

    #[test]
    fn empty_catalog_returns_absent() {
        let names: [&str; 0] = [];
        assert_eq!(resolve("axis", names), MatchResult::none());
    }

    #[test]
    fn typo_resolves_to_catalog_name() {
        let m = resolve("axsi bank", NAMES);
        assert_eq!(m.candidate.as_deref(), Some("Axis Bank"));
        assert!(m.confidence >= ACCEPT_THRESHOLD, "confidence {}", m.confidence);
        assert!(accept("axsi bank", NAMES).is_some());
    }

    #[test]
    fn candidate_is_member_and_score_bounded() {
        for q in ["tata", "infy", "zzzz", "Tata Steel", "motors"] {
            let m = resolve(q, NAMES);
            let name = m.candidate.expect("non-empty catalog always yields a candidate");
            assert!(NAMES.contains(&name.as_str()));
            assert!(m.confidence <= 100);
        }
    }

    #[test]
    fn accept_rejects_weak_matches() {
        assert!(accept("qwerty", NAMES).is_none());
    }

    #[test]
    fn suggest_orders_by_score_and_respects_limit() {
        let s = suggest("tata steel", NAMES, 5);
        assert!(!s.is_empty());
        assert_eq!(s[0].name, "Tata Steel Ltd");
        assert!(s.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(s.iter().all(|x| x.score >= SUGGEST_THRESHOLD));

        let one = suggest("tata", NAMES, 1);
        assert_eq!(one.len(), 1);
    }

    #[test]
    fn resolve_ties_go_to_catalog_order() {
        let names = ["Tata Power Ltd", "Tata Elxsi Ltd"];
        let first = resolve("tata", names);
        let reversed = resolve("tata", [names[1], names[0]]);
        assert_eq!(first.confidence, reversed.confidence);
        assert_eq!(first.candidate.as_deref(), Some("Tata Power Ltd"));
        assert_eq!(reversed.candidate.as_deref(), Some("Tata Elxsi Ltd"));
    }

    #[test]
    fn suggest_ties_keep_catalog_order() {
        let names = ["Alpha Ltd", "Alpha Ltd."];
        let s = suggest("alpha ltd", names, 5);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].score, s[1].score);
        assert_eq!(s[0].name, "Alpha Ltd");
    }
}
