use super::state::AppState;
use crate::analytics::WorkoutReport;
use crate::geo::GeoPoint;
use crate::recorder::FinishedTrack;
use crate::source::FixEvent;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use tracing::{error, info, warn};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StartWorkoutResponse {
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StopWorkoutResponse {
    pub session_id: String,
    pub status: String,
    pub workout: FinishedTrack,
    pub report: WorkoutReport,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /workout/start
pub async fn start_workout(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.lock().await;

    match session.start().await {
        Ok(()) => {
            info!("Workout {} started over HTTP", session.id());
            (
                StatusCode::OK,
                Json(StartWorkoutResponse {
                    session_id: session.id().to_string(),
                    status: "recording".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            warn!("Refused to start workout: {:#}", e);
            error_response(StatusCode::CONFLICT, format!("{:#}", e))
        }
    }
}

/// POST /workout/stop
pub async fn stop_workout(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.lock().await;

    match session.stop().await {
        Ok(workout) => {
            let report = workout.report(&state.split);
            (
                StatusCode::OK,
                Json(StopWorkoutResponse {
                    session_id: session.id().to_string(),
                    status: "finished".to_string(),
                    workout,
                    report,
                }),
            )
                .into_response()
        }
        Err(e) => {
            warn!("Refused to stop workout: {:#}", e);
            error_response(StatusCode::CONFLICT, format!("{:#}", e))
        }
    }
}

/// POST /workout/fix
/// Body: {"latitude": .., "longitude": .., "timestamp": ..?}
pub async fn push_fix(
    State(state): State<AppState>,
    Json(point): Json<GeoPoint>,
) -> impl IntoResponse {
    if !point.is_valid() {
        return error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!(
                "Invalid coordinates: latitude={}, longitude={}",
                point.latitude, point.longitude
            ),
        );
    }

    match state.inlet.push(FixEvent::Fix(point)).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => error_response(StatusCode::CONFLICT, format!("{:#}", e)),
    }
}

/// GET /workout/live
pub async fn live_stats(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;
    (StatusCode::OK, Json(session.snapshot().await)).into_response()
}

/// GET /checkpoint
pub async fn get_checkpoint(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;

    match session.pending_checkpoint().await {
        Some(checkpoint) => (StatusCode::OK, Json(checkpoint)).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No unfinished workout"),
    }
}

/// POST /checkpoint/resume
pub async fn resume_checkpoint(State(state): State<AppState>) -> impl IntoResponse {
    let mut session = state.session.lock().await;

    let Some(checkpoint) = session.pending_checkpoint().await else {
        return error_response(StatusCode::NOT_FOUND, "No unfinished workout");
    };

    match session.resume(checkpoint).await {
        Ok(()) => (StatusCode::OK, Json(session.snapshot().await)).into_response(),
        Err(e) => {
            error!("Failed to resume workout: {:#}", e);
            error_response(StatusCode::CONFLICT, format!("{:#}", e))
        }
    }
}

/// POST /checkpoint/discard
pub async fn discard_checkpoint(State(state): State<AppState>) -> impl IntoResponse {
    let session = state.session.lock().await;

    match session.discard_checkpoint().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(StatusCode::CONFLICT, format!("{:#}", e)),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
