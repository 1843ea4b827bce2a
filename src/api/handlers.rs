//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use chrono::Local;
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    state::{predict_end, AppState, EndPrediction, TimerId, TimerSnapshot},
};
use super::responses::{
    ApiResponse, CreateTimerRequest, DistanceResponse, DragMoveRequest, DragResponse,
    DragStateResponse, HealthResponse, ListQuery, MinutesRequest, PresetResponse, SnoozeRequest,
    StatusResponse, TitleRequest, TogglePresetRequest,
};

type HandlerResult<T> = Result<Json<T>, StatusCode>;

fn internal_error(context: &str, e: AppError) -> StatusCode {
    error!("{}: {}", context, e);
    StatusCode::INTERNAL_SERVER_ERROR
}

fn current_timers(state: &AppState) -> Result<Vec<TimerSnapshot>, StatusCode> {
    state
        .list_timers(false)
        .map_err(|e| internal_error("Failed to list timers", e))
}

fn prediction(minutes: u32) -> Option<EndPrediction> {
    (minutes > 0).then(|| predict_end(Local::now(), minutes))
}

// ── Timers ───────────────────────────────────────────────────────────

/// Handle GET /timers - List running timers
pub async fn list_timers_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> HandlerResult<Vec<TimerSnapshot>> {
    state
        .list_timers(query.is_reverse())
        .map(Json)
        .map_err(|e| internal_error("Failed to list timers", e))
}

/// Handle POST /timers - Start a countdown
pub async fn create_timer_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateTimerRequest>,
) -> HandlerResult<ApiResponse> {
    if request.minutes == 0 {
        warn!("Rejecting zero-minute timer");
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let timer = state
        .create_timer(request.minutes, request.title)
        .map_err(|e| internal_error("Failed to create timer", e))?;
    info!("Timer {} created via API", timer.id);

    Ok(Json(ApiResponse::ok(
        format!("Timer started for {} min", timer.total_minutes),
        Some(timer),
        current_timers(&state)?,
    )))
}

/// Handle DELETE /timers/:id - Stop a timer
pub async fn stop_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> HandlerResult<ApiResponse> {
    let id = TimerId::from(id);
    let stopped = state
        .stop(id)
        .map_err(|e| internal_error("Failed to stop timer", e))?;

    Ok(Json(ApiResponse::applied(
        stopped,
        format!("Timer {} stopped", id),
        None,
        current_timers(&state)?,
    )))
}

/// Handle POST /timers/:id/snooze - Re-arm a timer
pub async fn snooze_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    request: Option<Json<SnoozeRequest>>,
) -> HandlerResult<ApiResponse> {
    let id = TimerId::from(id);
    let minutes = request.and_then(|Json(request)| request.minutes);

    let snoozed = state
        .snooze(id, minutes)
        .map_err(|e| internal_error("Failed to snooze timer", e))?;
    let timer = state
        .get_timer(id)
        .map_err(|e| internal_error("Failed to read timer", e))?;

    Ok(Json(ApiResponse::applied(
        snoozed,
        format!("Timer {} snoozed", id),
        timer,
        current_timers(&state)?,
    )))
}

/// Handle POST /timers/:id/dismiss - Acknowledge a finished timer
pub async fn dismiss_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> HandlerResult<ApiResponse> {
    let id = TimerId::from(id);
    let dismissed = state
        .dismiss(id)
        .map_err(|e| internal_error("Failed to dismiss timer", e))?;

    Ok(Json(ApiResponse::applied(
        dismissed,
        format!("Timer {} dismissed", id),
        None,
        current_timers(&state)?,
    )))
}

// ── Capsule ──────────────────────────────────────────────────────────

/// Handle GET /drag - Current capsule value
pub async fn drag_state_handler(State(state): State<Arc<AppState>>) -> HandlerResult<DragStateResponse> {
    let drag = state
        .drag_state()
        .map_err(|e| internal_error("Failed to read capsule", e))?;

    Ok(Json(DragStateResponse {
        prediction: prediction(drag.minutes),
        minutes: drag.minutes,
        title: drag.title,
        handle_distance: drag.handle_distance,
        is_favorite: drag.is_favorite,
    }))
}

/// Handle POST /drag/move - Feed the drag translation
pub async fn drag_move_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DragMoveRequest>,
) -> HandlerResult<DragResponse> {
    let reading = state
        .drag_move(request.distance)
        .map_err(|e| internal_error("Failed to update capsule", e))?;

    Ok(Json(DragResponse::new(
        reading,
        request.distance.max(0.0),
        prediction(reading.minutes),
    )))
}

/// Handle PUT /drag/minutes - Manual minute entry
pub async fn drag_minutes_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MinutesRequest>,
) -> HandlerResult<DistanceResponse> {
    let (minutes, distance) = state
        .drag_set_minutes(request.minutes)
        .map_err(|e| internal_error("Failed to set capsule minutes", e))?;

    Ok(Json(DistanceResponse { minutes, distance }))
}

/// Handle PUT /drag/title - Name the capsule
pub async fn drag_title_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TitleRequest>,
) -> Result<StatusCode, StatusCode> {
    state
        .drag_set_title(request.title)
        .map_err(|e| internal_error("Failed to set capsule title", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle POST /drag/commit - Start a timer from the capsule
pub async fn drag_commit_handler(State(state): State<Arc<AppState>>) -> HandlerResult<ApiResponse> {
    let timer = state
        .drag_commit()
        .map_err(|e| internal_error("Failed to commit capsule", e))?;
    let timers = current_timers(&state)?;

    Ok(Json(match timer {
        Some(timer) => ApiResponse::ok(
            format!("Timer started for {} min", timer.total_minutes),
            Some(timer),
            timers,
        ),
        None => ApiResponse::noop("Capsule is empty".to_string(), timers),
    }))
}

/// Handle POST /drag/cancel - Collapse the capsule
pub async fn drag_cancel_handler(State(state): State<Arc<AppState>>) -> Result<StatusCode, StatusCode> {
    state
        .drag_cancel()
        .map_err(|e| internal_error("Failed to reset capsule", e))?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handle POST /drag/favorite - Toggle the capsule value as a preset
pub async fn drag_favorite_handler(State(state): State<Arc<AppState>>) -> HandlerResult<PresetResponse> {
    let favorite = state
        .drag_toggle_favorite()
        .map_err(|e| internal_error("Failed to toggle favorite", e))?;
    preset_response(&state, favorite.is_some(), favorite)
}

/// Handle GET /mapper/distance - Handle distance for a duration
pub async fn mapper_distance_handler(
    State(state): State<Arc<AppState>>,
    Query(request): Query<MinutesRequest>,
) -> HandlerResult<DistanceResponse> {
    let (minutes, distance) = state
        .distance_for_minutes(request.minutes)
        .map_err(|e| internal_error("Failed to map minutes", e))?;

    Ok(Json(DistanceResponse { minutes, distance }))
}

// ── Presets ──────────────────────────────────────────────────────────

fn preset_response(
    state: &AppState,
    changed: bool,
    favorite: Option<bool>,
) -> HandlerResult<PresetResponse> {
    let presets = state
        .list_presets()
        .map_err(|e| internal_error("Failed to list presets", e))?;

    Ok(Json(PresetResponse {
        status: if changed { "ok" } else { "noop" }.to_string(),
        favorite,
        presets,
    }))
}

/// Handle GET /presets - List presets
pub async fn list_presets_handler(State(state): State<Arc<AppState>>) -> HandlerResult<PresetResponse> {
    preset_response(&state, true, None)
}

/// Handle POST /presets/toggle - Favorite or un-favorite a duration
pub async fn toggle_preset_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TogglePresetRequest>,
) -> HandlerResult<PresetResponse> {
    let favorite = state
        .toggle_preset(request.minutes, &request.title)
        .map_err(|e| internal_error("Failed to toggle preset", e))?;
    preset_response(&state, favorite.is_some(), favorite)
}

/// Handle DELETE /presets/:id - Delete a preset
pub async fn delete_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<PresetResponse> {
    let deleted = state
        .delete_preset(id)
        .map_err(|e| internal_error("Failed to delete preset", e))?;
    preset_response(&state, deleted, None)
}

/// Handle POST /presets/:id/start - Start a timer from a preset
pub async fn start_preset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> HandlerResult<ApiResponse> {
    let timer = state
        .start_preset(id)
        .map_err(|e| internal_error("Failed to start preset", e))?;
    let timers = current_timers(&state)?;

    Ok(Json(match timer {
        Some(timer) => ApiResponse::ok(
            format!("Preset {} started", timer.title),
            Some(timer),
            timers,
        ),
        None => ApiResponse::noop(format!("No preset {}", id), timers),
    }))
}

// ── Events and status ────────────────────────────────────────────────

/// Handle GET /events - Stream timer events as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = state.subscribe();

    let stream = stream::unfold(events, |mut events| async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    let message = Event::default()
                        .event(event.kind())
                        .json_data(&event)
                        .unwrap_or_else(|e| {
                            warn!("Failed to encode event: {}", e);
                            Event::default().comment("unencodable event")
                        });
                    return Some((Ok(message), events));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream client lagged by {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return daemon status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> HandlerResult<StatusResponse> {
    let (running, finished) = state
        .timer_counts()
        .map_err(|e| internal_error("Failed to count timers", e))?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        running_timers: running,
        finished_timers: finished,
        snooze_options: state.settings.snooze_options.clone(),
        notification: state.settings.notification,
        banner_timeout_seconds: state.settings.banner_timeout.map(|t| t.as_secs()),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
