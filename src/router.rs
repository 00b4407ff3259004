use axum::{
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/content",
            get(handlers::list_events)
                .put(handlers::missing_event_id)
                .delete(handlers::missing_event_id),
        )
        .route(
            "/content/",
            put(handlers::missing_event_id).delete(handlers::missing_event_id),
        )
        .route("/contents", post(handlers::create_event))
        .route(
            "/content/:id",
            put(handlers::update_event).delete(handlers::delete_event),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
