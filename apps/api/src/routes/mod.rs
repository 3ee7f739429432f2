pub mod health;
pub mod params;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;
use crate::{analysis, discovery, generation, offers, packs, references, watchlists};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/health", get(health::readiness_handler))
        // References
        .route(
            "/api/references",
            get(references::handlers::handle_list_references)
                .post(references::handlers::handle_create_reference),
        )
        .route(
            "/api/references/:id",
            get(references::handlers::handle_get_reference),
        )
        // Discovery
        .route(
            "/api/discover/ingest",
            post(discovery::handlers::handle_ingest),
        )
        .route(
            "/api/discover/suggest",
            post(discovery::handlers::handle_suggest),
        )
        // Analysis
        .route("/api/analyze", post(analysis::handlers::handle_analyze))
        // Generation
        .route("/api/generate", post(generation::handlers::handle_generate))
        .route("/api/jobs/:id", get(generation::handlers::handle_get_job))
        // Offer profiles
        .route(
            "/api/offers",
            get(offers::handlers::handle_list_offers)
                .post(offers::handlers::handle_create_offer)
                .put(offers::handlers::handle_update_offer)
                .delete(offers::handlers::handle_delete_offer),
        )
        // Packs
        .route(
            "/api/packs",
            get(packs::handlers::handle_list_packs).post(packs::handlers::handle_create_pack),
        )
        .route(
            "/api/packs/:id",
            get(packs::handlers::handle_get_pack)
                .patch(packs::handlers::handle_patch_pack)
                .delete(packs::handlers::handle_delete_pack),
        )
        .route(
            "/api/packs/:id/duplicate",
            post(packs::handlers::handle_duplicate_pack),
        )
        .route(
            "/api/packs/:id/regenerate",
            post(packs::handlers::handle_regenerate_pack),
        )
        // Watchlists
        .route(
            "/api/tiktok/watchlists",
            post(watchlists::handlers::handle_create_watchlist),
        )
        .with_state(state)
}
