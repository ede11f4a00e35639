//! Offer deduplication engine
//!
//! Core components for deciding whether a newly ingested promotional offer
//! duplicates a previously seen one: canonical fingerprinting, edit-distance
//! similarity scoring, and weighted duplicate decisioning.

pub mod catalog;
pub mod decision;
pub mod fingerprint;
pub mod similarity;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A promotional offer as handed over by the ingestion pipeline.
///
/// Only `title`, `merchant`, `payout_terms` and `expiration_date` feed the
/// duplicate decision; the remaining fields are carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferRecord {
    pub title: String,
    pub merchant: String,
    pub payout_terms: String,
    #[serde(default)]
    pub expiration_date: Option<String>,
    #[serde(default)]
    pub redemption_steps: Vec<String>,
    #[serde(default)]
    pub risk_notes: Option<String>,
    #[serde(default)]
    pub source_tags: Vec<String>,
}

/// Tuning knobs for the duplicate decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeduplicationConfig {
    /// Minimum title similarity for a strong title match, in (0, 1].
    pub title_similarity_threshold: f64,
    /// Strict merchant equality vs. similarity-weighted matching.
    pub match_merchant_exactly: bool,
    /// Whether near-equal numeric payouts still earn partial credit.
    pub match_payout_fuzzy: bool,
}

impl Default for DeduplicationConfig {
    fn default() -> Self {
        Self {
            title_similarity_threshold: 0.85,
            match_merchant_exactly: true,
            match_payout_fuzzy: true,
        }
    }
}

impl DeduplicationConfig {
    pub fn validate(&self) -> Result<(), DedupError> {
        // NaN fails this check as well
        if !(self.title_similarity_threshold > 0.0 && self.title_similarity_threshold <= 1.0) {
            return Err(DedupError::InvalidThreshold {
                value: self.title_similarity_threshold,
            });
        }
        Ok(())
    }
}

/// Verdict of a single incoming-vs-existing comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicationResult {
    pub is_duplicate: bool,
    pub confidence_score: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Error)]
pub enum DedupError {
    #[error("title similarity threshold must be in (0, 1], got {value}")]
    InvalidThreshold { value: f64 },
}
