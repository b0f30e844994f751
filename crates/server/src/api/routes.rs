use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{handlers, ingest, instances, items};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let inventory_routes = Router::new()
        // Items (reference-expanded reads)
        .route(
            "/items",
            get(items::list_items)
                .post(items::create_item)
                .delete(items::delete_all_items),
        )
        .route(
            "/items/{id}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        // Instances
        .route(
            "/instances",
            get(instances::list_instances)
                .post(instances::create_instance)
                .delete(instances::delete_all_instances),
        )
        .route(
            "/instances/{id}",
            get(instances::get_instance)
                .put(instances::update_instance)
                .delete(instances::delete_instance),
        )
        // Background ingest
        .route("/ingest/records", post(ingest::ingest_records))
        .route("/ingest/status/{id}", get(ingest::ingest_status));

    Router::new()
        // Health, config and metrics
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/metrics", get(handlers::metrics))
        .nest("/inventory", inventory_routes)
        .layer(middleware::from_fn(super::middleware::track_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
