//! Canonical fingerprint generation for offer records

use crate::dedup_engine::OfferRecord;
use sha2::{Digest, Sha256};

/// Caps how much of the title feeds the fingerprint, keeping it stable
/// under trailing edits.
const TITLE_RESIDUE_LEN: usize = 20;

/// SHA-256 digest over the normalized identity fields of an offer, as
/// lowercase hex. Intended as a cheap equality-bucketing key: records that
/// collide are duplicate *candidates*, not confirmed duplicates.
pub fn fingerprint(offer: &OfferRecord) -> String {
    let merchant = normalize(&offer.merchant);
    let title: String = normalize(&offer.title)
        .chars()
        .take(TITLE_RESIDUE_LEN)
        .collect();
    let payout = payout_residue(&offer.payout_terms);

    // '|' cannot survive normalization, so the parts stay unambiguous
    let canonical = format!("{}|{}|{}", merchant, title, payout);

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Lowercase the text and keep only ASCII letters and digits.
pub(crate) fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect()
}

/// Digits-and-dot residue of the payout text, e.g. "$50.00" -> "50.00".
///
/// Best-effort only: a payout mentioning two numbers concatenates their
/// digits ("60,000 Points ($750 value)" -> "60000750").
pub(crate) fn payout_residue(payout_terms: &str) -> String {
    payout_terms
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}
