//! HTTP handlers exposing the deduplication engine

use axum::{
    extract::Extension,
    http::StatusCode,
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::dedup_engine::catalog::{DedupStats, IngestOutcome, OfferCatalog};
use crate::dedup_engine::decision::check_duplicate;
use crate::dedup_engine::fingerprint::fingerprint;
use crate::dedup_engine::similarity::similarity;
use crate::dedup_engine::{DeduplicationConfig, DuplicationResult, OfferRecord};

#[derive(Debug, Deserialize)]
pub struct FingerprintRequest {
    pub offer: OfferRecord,
}

#[derive(Debug, Serialize)]
pub struct FingerprintResponse {
    pub fingerprint: String,
}

#[derive(Debug, Deserialize)]
pub struct SimilarityRequest {
    pub a: String,
    pub b: String,
}

#[derive(Debug, Serialize)]
pub struct SimilarityResponse {
    pub similarity: f64,
}

#[derive(Debug, Deserialize)]
pub struct CheckDuplicateRequest {
    pub incoming: OfferRecord,
    pub existing: OfferRecord,
    #[serde(default)]
    pub config: Option<DeduplicationConfig>,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub offer: OfferRecord,
    #[serde(default)]
    pub config: Option<DeduplicationConfig>,
}

#[derive(Debug, Deserialize)]
pub struct DeduplicateRequest {
    pub offers: Vec<OfferRecord>,
    #[serde(default)]
    pub config: Option<DeduplicationConfig>,
}

#[derive(Debug, Serialize)]
pub struct DeduplicateResponse {
    pub offers: Vec<OfferRecord>,
    pub stats: DedupStats,
}

pub fn offer_routes() -> Router {
    Router::new()
        .route("/fingerprint", post(fingerprint_offer))
        .route("/similarity", post(score_similarity))
        .route("/check", post(check_offer))
        .route("/ingest", post(ingest_offer))
        .route("/deduplicate", post(deduplicate_offers))
}

async fn fingerprint_offer(
    Json(payload): Json<FingerprintRequest>,
) -> Json<FingerprintResponse> {
    Json(FingerprintResponse {
        fingerprint: fingerprint(&payload.offer),
    })
}

async fn score_similarity(Json(payload): Json<SimilarityRequest>) -> Json<SimilarityResponse> {
    Json(SimilarityResponse {
        similarity: similarity(&payload.a, &payload.b),
    })
}

async fn check_offer(
    Json(payload): Json<CheckDuplicateRequest>,
) -> Result<Json<DuplicationResult>, StatusCode> {
    let config = validated_config(payload.config)?;
    Ok(Json(check_duplicate(
        &payload.incoming,
        &payload.existing,
        &config,
    )))
}

async fn ingest_offer(
    Extension(catalog): Extension<Arc<OfferCatalog>>,
    Json(payload): Json<IngestRequest>,
) -> Result<Json<IngestOutcome>, StatusCode> {
    let config = validated_config(payload.config)?;
    let outcome = catalog.ingest(payload.offer, &config).await;
    Ok(Json(outcome))
}

async fn deduplicate_offers(
    Json(payload): Json<DeduplicateRequest>,
) -> Result<Json<DeduplicateResponse>, StatusCode> {
    let config = validated_config(payload.config)?;
    let unique = OfferCatalog::dedupe_batch(payload.offers.clone(), &config);
    let stats = OfferCatalog::stats(&payload.offers, &unique);
    Ok(Json(DeduplicateResponse {
        offers: unique,
        stats,
    }))
}

fn validated_config(config: Option<DeduplicationConfig>) -> Result<DeduplicationConfig, StatusCode> {
    let config = config.unwrap_or_default();
    if let Err(e) = config.validate() {
        tracing::warn!("Rejected deduplication config: {}", e);
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(config)
}
