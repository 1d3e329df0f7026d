use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use super::{catalog, handlers, middleware as mw, sync};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Triggering a run is the only mutating route
    let protected = Router::new()
        .route("/sync", post(sync::trigger))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            mw::require_api_key,
        ));

    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Sync
        .route("/sync/status", get(sync::get_status))
        .merge(protected)
        // Synced documents
        .route("/catalog/{kind}/{key}", get(catalog::get_document))
        .with_state(state.clone());

    let mut router = Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics).with_state(state.clone()));

    // Cached assets, when blobs live on the local filesystem
    if let Some(root) = state.asset_root() {
        let assets = Router::new()
            .fallback_service(ServeDir::new(root))
            .layer(middleware::from_fn(mw::hide_dotfiles));
        router = router.nest_service("/assets", assets);
    }

    router
        .layer(middleware::from_fn(mw::metrics_middleware))
        .layer(TraceLayer::new_for_http())
}
