use axum::{extract::Extension, routing::get, Json, Router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

mod dedup_engine;
mod routes;

use dedup_engine::catalog::OfferCatalog;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let catalog = Arc::new(OfferCatalog::new());

    let app = Router::new()
        .route("/health", get(health))
        .nest("/offers", routes::offers::offer_routes())
        .layer(Extension(catalog))
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8001").await.unwrap();
    tracing::info!("Offer dedup service running on port 8001");
    axum::serve(listener, app).await.unwrap();
}

async fn health(Extension(catalog): Extension<Arc<OfferCatalog>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "offer-dedup-service",
        "features": ["fingerprint", "similarity", "dedup"],
        "catalog_size": catalog.len().await
    }))
}
