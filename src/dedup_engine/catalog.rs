//! In-memory offer catalog with fingerprint-bucketed duplicate lookup
//!
//! The catalog owns the fingerprint index so the decision engine itself can
//! stay a pure function. Candidates are pre-filtered by exact fingerprint
//! and by normalized merchant before the weighted comparison runs.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::dedup_engine::decision::check_duplicate;
use crate::dedup_engine::fingerprint::{fingerprint, normalize};
use crate::dedup_engine::{DeduplicationConfig, DuplicationResult, OfferRecord};

/// An offer accepted into the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct StoredOffer {
    pub id: Uuid,
    pub record: OfferRecord,
    pub fingerprint: String,
    pub merchant_key: String,
    pub ingested_at: DateTime<Utc>,
}

/// Outcome of offering a record to the catalog.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum IngestOutcome {
    Stored {
        id: Uuid,
        fingerprint: String,
    },
    Duplicate {
        duplicate_of: Uuid,
        fingerprint: String,
        result: DuplicationResult,
    },
}

/// Summary of a batch deduplication pass.
#[derive(Debug, Clone, Serialize)]
pub struct DedupStats {
    pub original_count: usize,
    pub unique_count: usize,
    pub removed_count: usize,
    pub removal_rate: f64,
    pub merchant_counts: HashMap<String, usize>,
}

#[derive(Default)]
struct CatalogIndex {
    offers: HashMap<Uuid, StoredOffer>,
    by_fingerprint: HashMap<String, Vec<Uuid>>,
    by_merchant: HashMap<String, Vec<Uuid>>,
}

pub struct OfferCatalog {
    index: Mutex<CatalogIndex>,
}

impl OfferCatalog {
    pub fn new() -> Self {
        Self {
            index: Mutex::new(CatalogIndex::default()),
        }
    }

    /// Offer a record to the catalog. Candidates sharing the fingerprint or
    /// the merchant are compared with the weighted decision engine; the
    /// best-scoring duplicate verdict wins. A fingerprint collision alone
    /// never rejects a record.
    pub async fn ingest(&self, record: OfferRecord, config: &DeduplicationConfig) -> IngestOutcome {
        let digest = fingerprint(&record);
        let merchant_key = normalize(&record.merchant);

        let mut index = self.index.lock().await;

        let mut candidate_ids: Vec<Uuid> = index
            .by_fingerprint
            .get(&digest)
            .cloned()
            .unwrap_or_default();
        if let Some(ids) = index.by_merchant.get(&merchant_key) {
            for id in ids {
                if !candidate_ids.contains(id) {
                    candidate_ids.push(*id);
                }
            }
        }

        let mut best: Option<(Uuid, DuplicationResult)> = None;
        for id in candidate_ids {
            let result = check_duplicate(&record, &index.offers[&id].record, config);
            if !result.is_duplicate {
                continue;
            }
            let improves = best
                .as_ref()
                .map_or(true, |(_, held)| result.confidence_score > held.confidence_score);
            if improves {
                best = Some((id, result));
            }
        }

        if let Some((duplicate_of, result)) = best {
            tracing::debug!(
                "Rejected duplicate of {} (confidence {:.2})",
                duplicate_of,
                result.confidence_score
            );
            return IngestOutcome::Duplicate {
                duplicate_of,
                fingerprint: digest,
                result,
            };
        }

        let stored = StoredOffer {
            id: Uuid::new_v4(),
            record,
            fingerprint: digest.clone(),
            merchant_key: merchant_key.clone(),
            ingested_at: Utc::now(),
        };
        index.by_fingerprint.entry(digest.clone()).or_default().push(stored.id);
        index.by_merchant.entry(merchant_key).or_default().push(stored.id);
        let id = stored.id;
        index.offers.insert(id, stored);

        IngestOutcome::Stored {
            id,
            fingerprint: digest,
        }
    }

    pub async fn len(&self) -> usize {
        self.index.lock().await.offers.len()
    }

    /// Collapse a batch of offers without touching catalog state.
    ///
    /// First pass drops exact fingerprint repeats, second pass runs the
    /// weighted comparison within merchant groups.
    pub fn dedupe_batch(
        offers: Vec<OfferRecord>,
        config: &DeduplicationConfig,
    ) -> Vec<OfferRecord> {
        let mut seen_fingerprints: HashSet<String> = HashSet::new();
        let mut unique = Vec::new();
        for offer in offers {
            if seen_fingerprints.insert(fingerprint(&offer)) {
                unique.push(offer);
            }
        }

        let mut merchant_groups: HashMap<String, Vec<OfferRecord>> = HashMap::new();
        for offer in unique {
            merchant_groups
                .entry(normalize(&offer.merchant))
                .or_default()
                .push(offer);
        }

        let mut kept = Vec::new();
        for (_, group) in merchant_groups {
            let mut group_kept: Vec<OfferRecord> = Vec::new();
            for offer in group {
                let is_duplicate = group_kept
                    .iter()
                    .any(|existing| check_duplicate(&offer, existing, config).is_duplicate);
                if !is_duplicate {
                    group_kept.push(offer);
                }
            }
            kept.extend(group_kept);
        }

        kept
    }

    /// Summary statistics for a completed batch pass.
    pub fn stats(original: &[OfferRecord], deduplicated: &[OfferRecord]) -> DedupStats {
        let original_count = original.len();
        let unique_count = deduplicated.len();
        let removed_count = original_count - unique_count;

        let mut merchant_counts = HashMap::new();
        for offer in original {
            *merchant_counts.entry(normalize(&offer.merchant)).or_insert(0) += 1;
        }

        let removal_rate = if original_count == 0 {
            0.0
        } else {
            removed_count as f64 / original_count as f64 * 100.0
        };

        DedupStats {
            original_count,
            unique_count,
            removed_count,
            removal_rate,
            merchant_counts,
        }
    }
}

impl Default for OfferCatalog {
    fn default() -> Self {
        Self::new()
    }
}
