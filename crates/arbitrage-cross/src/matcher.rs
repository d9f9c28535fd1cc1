//! Market matching for cross-venue arbitrage (C2).
//!
//! Pairs outcomes across the two venues by fuzzy title similarity (C1). The
//! algorithm is greedy and insertion-order-dependent on the A-side by
//! design: stability matters more than global optimality because the active
//! set is small and turnover is continuous. Callers that need stable
//! determinism across restarts should pre-sort the A-side list by a stable
//! key (e.g. title) before calling [`match_outcomes`].

use crate::similarity::combined_similarity;
use crate::types::{MatchedPair, Outcome};

/// Default similarity threshold below which a candidate pairing is rejected.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// For each A-outcome in input order, scans unpaired B-outcomes, computes
/// the combined similarity, and keeps the argmax if it clears `tau`. The
/// chosen B-outcome is then ineligible for later A-outcomes. Ties inside the
/// inner scan resolve to the first candidate encountered.
#[must_use]
pub fn match_outcomes(outcomes_a: &[Outcome], outcomes_b: &[Outcome], tau: f64) -> Vec<MatchedPair> {
    let mut consumed_b = vec![false; outcomes_b.len()];
    let mut pairs = Vec::new();

    for a in outcomes_a {
        let mut best: Option<(usize, f64)> = None;

        for (j, b) in outcomes_b.iter().enumerate() {
            if consumed_b[j] {
                continue;
            }
            let score = combined_similarity(&a.outcome_title, &b.outcome_title);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((j, score)),
            }
        }

        if let Some((j, score)) = best {
            if score >= tau {
                consumed_b[j] = true;
                pairs.push(MatchedPair {
                    outcome_a: a.clone(),
                    outcome_b: outcomes_b[j].clone(),
                    similarity: score,
                });
            }
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Venue;

    fn outcome(venue: Venue, title: &str) -> Outcome {
        Outcome {
            venue,
            market_id: title.to_string(),
            outcome_title: title.to_string(),
            yes_id: format!("{title}-yes"),
            no_id: format!("{title}-no"),
            yes_price_cents: 50,
            no_price_cents: 50,
            volume_usd: 100.0,
        }
    }

    #[test]
    fn matches_identical_titles() {
        let a = vec![outcome(Venue::A, "Bitcoin above $100,000 by Friday")];
        let b = vec![outcome(Venue::B, "Bitcoin above $100,000 by Friday")];
        let pairs = match_outcomes(&a, &b, DEFAULT_THRESHOLD);
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].similarity, 1.0);
    }

    #[test]
    fn rejects_below_threshold() {
        let a = vec![outcome(Venue::A, "Bitcoin above $100,000 by Friday")];
        let b = vec![outcome(Venue::B, "Ethereum below $2,000 by Monday")];
        let pairs = match_outcomes(&a, &b, DEFAULT_THRESHOLD);
        assert!(pairs.is_empty());
    }

    #[test]
    fn output_is_one_to_one() {
        let a = vec![
            outcome(Venue::A, "Bitcoin above $100,000 by Friday"),
            outcome(Venue::A, "Bitcoin above $100,000 by Saturday"),
        ];
        let b = vec![outcome(Venue::B, "Bitcoin above $100,000 by Friday")];
        let pairs = match_outcomes(&a, &b, DEFAULT_THRESHOLD);
        // Both A-outcomes are similar to the single B-outcome, but only one
        // can consume it.
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn matching_is_deterministic_across_runs() {
        let a = vec![
            outcome(Venue::A, "Bitcoin above $100,000 by Friday"),
            outcome(Venue::A, "Ethereum above $5,000 by Friday"),
        ];
        let b = vec![
            outcome(Venue::B, "Ethereum above $5,000 by Friday"),
            outcome(Venue::B, "Bitcoin above $100,000 by Friday"),
        ];
        let first = match_outcomes(&a, &b, DEFAULT_THRESHOLD);
        let second = match_outcomes(&a, &b, DEFAULT_THRESHOLD);
        assert_eq!(first.len(), second.len());
        for (p1, p2) in first.iter().zip(second.iter()) {
            assert_eq!(p1.outcome_a.market_id, p2.outcome_a.market_id);
            assert_eq!(p1.outcome_b.market_id, p2.outcome_b.market_id);
        }
    }

    #[test]
    fn every_pair_clears_threshold() {
        let a = vec![outcome(Venue::A, "Bitcoin above $100,000 by Friday")];
        let b = vec![outcome(Venue::B, "Bitcoin above one hundred thousand dollars")];
        let pairs = match_outcomes(&a, &b, 0.3);
        for pair in &pairs {
            assert!(pair.similarity >= 0.3);
        }
    }
}
