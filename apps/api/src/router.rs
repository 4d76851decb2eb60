use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use booking_cell::router::booking_routes;
use schedule_cell::router::schedule_routes;
use shared_store::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Carebook API is running!" }))
        .nest("/doctors", schedule_routes(state.clone()))
        .nest("/appointments", booking_routes(state.clone()))
}
