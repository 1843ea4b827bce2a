//! HTTP API module
//!
//! Timer, capsule and preset endpoints plus the server-sent event stream
//! that front-ends render from.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", get(list_timers_handler).post(create_timer_handler))
        .route("/timers/:id", delete(stop_timer_handler))
        .route("/timers/:id/snooze", post(snooze_timer_handler))
        .route("/timers/:id/dismiss", post(dismiss_timer_handler))
        .route("/drag", get(drag_state_handler))
        .route("/drag/move", post(drag_move_handler))
        .route("/drag/minutes", put(drag_minutes_handler))
        .route("/drag/title", put(drag_title_handler))
        .route("/drag/commit", post(drag_commit_handler))
        .route("/drag/cancel", post(drag_cancel_handler))
        .route("/drag/favorite", post(drag_favorite_handler))
        .route("/mapper/distance", get(mapper_distance_handler))
        .route("/presets", get(list_presets_handler))
        .route("/presets/toggle", post(toggle_preset_handler))
        .route("/presets/:id", delete(delete_preset_handler))
        .route("/presets/:id/start", post(start_preset_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
