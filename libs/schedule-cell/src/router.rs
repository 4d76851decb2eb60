use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use shared_store::AppState;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn schedule_routes(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/availability", post(handlers::create_window))
        .route("/availability/{doctor_id}", get(handlers::list_windows))
        .route("/windows/{window_id}", delete(handlers::delete_window))
        .route("/slots", get(handlers::list_open_slots))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new().merge(protected_routes).with_state(state)
}
