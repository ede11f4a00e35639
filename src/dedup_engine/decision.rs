//! Weighted duplicate decisioning across offer fields

use crate::dedup_engine::fingerprint::payout_residue;
use crate::dedup_engine::similarity::similarity;
use crate::dedup_engine::{DeduplicationConfig, DuplicationResult, OfferRecord};

// Field weights, summing to 1.0
const WEIGHT_MERCHANT: f64 = 0.35;
const WEIGHT_TITLE: f64 = 0.45;
const WEIGHT_PAYOUT: f64 = 0.20;

/// Score at or above which a comparison is declared a duplicate.
const DUPLICATE_THRESHOLD: f64 = 0.75;

/// Numeric payouts closer than this count as equal.
const PAYOUT_EXACT_TOLERANCE: f64 = 1.0;
/// Wider tolerance used when fuzzy payout matching is enabled.
const PAYOUT_FUZZY_TOLERANCE: f64 = 5.0;

/// Confidence multiplier applied when both offers carry expiration dates
/// that disagree.
const EXPIRATION_PENALTY: f64 = 0.8;

/// Compare an incoming offer against one existing offer and produce a
/// verdict with the signals that contributed to it.
pub fn check_duplicate(
    incoming: &OfferRecord,
    existing: &OfferRecord,
    config: &DeduplicationConfig,
) -> DuplicationResult {
    let mut score = 0.0;
    let mut reasons = Vec::new();

    // 1. Merchant signal
    let merchant_sim = similarity(&incoming.merchant, &existing.merchant);
    if config.match_merchant_exactly {
        if incoming.merchant.to_lowercase() == existing.merchant.to_lowercase() {
            score += WEIGHT_MERCHANT;
            reasons.push(format!("Exact merchant match ({})", incoming.merchant));
        } else if merchant_sim > 0.8 {
            // Near-identical brands ("Uber" vs "Uber Eats") earn partial credit
            score += WEIGHT_MERCHANT * 0.5;
            reasons.push(format!(
                "High merchant similarity ({}%)",
                (merchant_sim * 100.0).round()
            ));
        }
    } else if merchant_sim > 0.7 {
        score += merchant_sim * WEIGHT_MERCHANT;
        reasons.push(format!(
            "Fuzzy merchant match ({}%)",
            (merchant_sim * 100.0).round()
        ));
    }

    // 2. Title signal
    let title_sim = similarity(&incoming.title, &existing.title);
    if title_sim >= config.title_similarity_threshold {
        score += title_sim * WEIGHT_TITLE;
        reasons.push(format!(
            "Title similarity high ({}%)",
            (title_sim * 100.0).round()
        ));
    } else if title_sim > 0.5 {
        // Partial credit, below the strong-match bar
        score += title_sim * WEIGHT_TITLE * 0.5;
    }

    // 3. Payout signal
    match (
        parse_payout(&incoming.payout_terms),
        parse_payout(&existing.payout_terms),
    ) {
        (Some(p1), Some(p2)) => {
            let diff = (p1 - p2).abs();
            if diff < PAYOUT_EXACT_TOLERANCE {
                score += WEIGHT_PAYOUT;
                reasons.push(format!("Payout match (${} vs ${})", p1, p2));
            } else if config.match_payout_fuzzy && diff < PAYOUT_FUZZY_TOLERANCE {
                score += WEIGHT_PAYOUT * 0.5;
            }
        }
        _ => {
            // Non-numeric payout such as "Free Trial"
            if incoming.payout_terms.to_lowercase() == existing.payout_terms.to_lowercase() {
                score += WEIGHT_PAYOUT;
                reasons.push("Payout text match".to_string());
            }
        }
    }

    // 4. Expiration penalty: same deal re-run for a different window is
    // likely a distinct promotion
    if let (Some(d1), Some(d2)) = (&incoming.expiration_date, &existing.expiration_date) {
        if d1 != d2 {
            score *= EXPIRATION_PENALTY;
            reasons.push("Expiration dates differ".to_string());
        }
    }

    DuplicationResult {
        is_duplicate: score >= DUPLICATE_THRESHOLD,
        confidence_score: score,
        reasons,
    }
}

/// Numeric value extracted from free-form payout text, if any.
fn parse_payout(payout_terms: &str) -> Option<f64> {
    payout_residue(payout_terms).parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(title: &str, merchant: &str, payout: &str) -> OfferRecord {
        OfferRecord {
            title: title.to_string(),
            merchant: merchant.to_string(),
            payout_terms: payout.to_string(),
            expiration_date: None,
            redemption_steps: Vec::new(),
            risk_notes: None,
            source_tags: Vec::new(),
        }
    }

    fn expiring(title: &str, merchant: &str, payout: &str, date: &str) -> OfferRecord {
        OfferRecord {
            expiration_date: Some(date.to_string()),
            ..offer(title, merchant, payout)
        }
    }

    #[test]
    fn near_duplicate_card_offers_stay_below_threshold() {
        // Merchant similarity lands at exactly 0.5 (no credit in strict
        // mode), title similarity at 28/46, and the payout residues read
        // "60000750" vs "60000", so only partial title credit accrues.
        let incoming = offer(
            "Chase Sapphire Preferred - 60,000 Bonus Points",
            "Chase Bank",
            "60,000 Points ($750 value)",
        );
        let existing = offer(
            "Chase Sapphire Preferred\u{ae} Card - Earn 60k Pts",
            "Chase",
            "60000 pts",
        );

        let result = check_duplicate(&incoming, &existing, &DeduplicationConfig::default());

        let expected = (1.0 - 18.0 / 46.0) * WEIGHT_TITLE * 0.5;
        assert!(!result.is_duplicate);
        assert!((result.confidence_score - expected).abs() < 1e-12);
        assert!((result.confidence_score - 0.13695652173913045).abs() < 1e-9);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn identical_offers_score_full_confidence() {
        let incoming = offer("Chase Sapphire Preferred", "Chase", "$50");
        let existing = offer("Chase Sapphire Preferred", "Chase", "$50.00");

        let result = check_duplicate(&incoming, &existing, &DeduplicationConfig::default());

        assert!(result.is_duplicate);
        assert!((result.confidence_score - 1.0).abs() < 1e-12);
        assert_eq!(
            result.reasons,
            vec![
                "Exact merchant match (Chase)".to_string(),
                "Title similarity high (100%)".to_string(),
                "Payout match ($50 vs $50)".to_string(),
            ]
        );
    }

    #[test]
    fn unrelated_offers_score_zero_with_no_reasons() {
        let incoming = offer("Free iPhone with trade-in", "Chase", "Free Trial");
        let existing = offer("60,000 bonus points on signup", "Verizon", "Gift Card");

        let result = check_duplicate(&incoming, &existing, &DeduplicationConfig::default());

        assert!(!result.is_duplicate);
        assert_eq!(result.confidence_score, 0.0);
        assert!(result.reasons.is_empty());
    }

    #[test]
    fn differing_expirations_cut_confidence_by_a_fifth() {
        let incoming = expiring("Chase Sapphire Preferred", "Chase", "$50", "2026-11-30");
        let existing = expiring("Chase Sapphire Preferred", "Chase", "$50", "2026-12-31");

        let result = check_duplicate(&incoming, &existing, &DeduplicationConfig::default());

        // 0.8x the unpenalized full score of 1.0; still over the line
        assert!((result.confidence_score - 0.8).abs() < 1e-12);
        assert!(result.is_duplicate);
        assert!(result
            .reasons
            .contains(&"Expiration dates differ".to_string()));
    }

    #[test]
    fn missing_expiration_skips_the_penalty() {
        let incoming = expiring("Chase Sapphire Preferred", "Chase", "$50", "2026-11-30");
        let existing = offer("Chase Sapphire Preferred", "Chase", "$50");

        let result = check_duplicate(&incoming, &existing, &DeduplicationConfig::default());

        assert!((result.confidence_score - 1.0).abs() < 1e-12);
        assert!(!result
            .reasons
            .contains(&"Expiration dates differ".to_string()));
    }

    #[test]
    fn high_merchant_similarity_earns_half_credit_in_strict_mode() {
        let incoming = offer("Prime Day deal", "Amazon Inc", "$20");
        let existing = offer("Prime Day deal", "Amazon Inc.", "$20");

        let result = check_duplicate(&incoming, &existing, &DeduplicationConfig::default());

        // 10/11 merchant similarity: half the merchant weight
        let expected = WEIGHT_MERCHANT * 0.5 + WEIGHT_TITLE + WEIGHT_PAYOUT;
        assert!((result.confidence_score - expected).abs() < 1e-12);
        assert!(result
            .reasons
            .contains(&"High merchant similarity (91%)".to_string()));
    }

    #[test]
    fn fuzzy_merchant_mode_weights_by_similarity() {
        let incoming = offer("Prime Day deal", "Amazon", "$20");
        let existing = offer("Prime Day deal", "Amazonn", "$20");
        let config = DeduplicationConfig {
            match_merchant_exactly: false,
            ..Default::default()
        };

        let result = check_duplicate(&incoming, &existing, &config);

        // 6/7 merchant similarity times the merchant weight
        let expected = (1.0 - 1.0 / 7.0) * WEIGHT_MERCHANT + WEIGHT_TITLE + WEIGHT_PAYOUT;
        assert!((result.confidence_score - expected).abs() < 1e-12);
        assert!(result.is_duplicate);
        assert!(result
            .reasons
            .contains(&"Fuzzy merchant match (86%)".to_string()));
    }

    #[test]
    fn nearby_payouts_earn_half_credit_only_when_fuzzy() {
        let incoming = offer("Cashback offer", "Chase", "$50");
        let existing = offer("Cashback offer", "Chase", "$53");

        let fuzzy = check_duplicate(&incoming, &existing, &DeduplicationConfig::default());
        let expected = WEIGHT_MERCHANT + WEIGHT_TITLE + WEIGHT_PAYOUT * 0.5;
        assert!((fuzzy.confidence_score - expected).abs() < 1e-12);

        let strict_config = DeduplicationConfig {
            match_payout_fuzzy: false,
            ..Default::default()
        };
        let strict = check_duplicate(&incoming, &existing, &strict_config);
        let expected = WEIGHT_MERCHANT + WEIGHT_TITLE;
        assert!((strict.confidence_score - expected).abs() < 1e-12);
    }

    #[test]
    fn non_numeric_payouts_fall_back_to_text_equality() {
        let incoming = offer("Streaming promo", "Hulu", "Free Trial");
        let existing = offer("Streaming promo", "Hulu", "free trial");

        let result = check_duplicate(&incoming, &existing, &DeduplicationConfig::default());

        assert!((result.confidence_score - 1.0).abs() < 1e-12);
        assert!(result.reasons.contains(&"Payout text match".to_string()));
    }

    #[test]
    fn decision_is_symmetric() {
        let pairs = [
            (
                offer("Chase Sapphire Preferred - 60,000 Bonus Points", "Chase Bank", "60,000 Points ($750 value)"),
                offer("Chase Sapphire Preferred\u{ae} Card - Earn 60k Pts", "Chase", "60000 pts"),
            ),
            (
                offer("Prime Day deal", "Amazon Inc", "$20"),
                offer("Prime Day deal", "Amazon Inc.", "$20"),
            ),
            (
                expiring("Cashback offer", "Chase", "$50", "2026-11-30"),
                expiring("Cashback offer", "Chase", "$53", "2026-12-31"),
            ),
        ];
        let config = DeduplicationConfig::default();

        for (a, b) in &pairs {
            let forward = check_duplicate(a, b, &config);
            let backward = check_duplicate(b, a, &config);
            assert_eq!(forward.is_duplicate, backward.is_duplicate);
            assert_eq!(forward.confidence_score, backward.confidence_score);
        }
    }

    #[test]
    fn repeated_checks_yield_identical_results() {
        let incoming = offer("Chase Sapphire Preferred", "Chase", "$50");
        let existing = expiring("Chase Sapphire Preferred", "Chase", "$50.00", "2026-12-31");
        let config = DeduplicationConfig::default();

        let first = check_duplicate(&incoming, &existing, &config);
        let second = check_duplicate(&incoming, &existing, &config);

        assert_eq!(first, second);
    }
}
