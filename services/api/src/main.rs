use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use signing::{
    signatures::{self, CaptureOptions, Outcome, Session},
    Error,
};
use ulid::Ulid;

/// Surface cap for requests; replay rasterizes and encodes the whole pixmap
const API_MAX_SURFACE_PX: u32 = 2048;

#[derive(Clone)]
struct AppState {
    options: CaptureOptions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let addr = std::env::var("SIGNING_API_ADDR").unwrap_or("127.0.0.1:3000".to_string());
    let max_surface_px = match std::env::var("SIGNING_MAX_SURFACE_PX") {
        Ok(value) => value.parse().with_context(|| {
            format!("SIGNING_MAX_SURFACE_PX must be a pixel count, got {}", value)
        })?,
        Err(_) => API_MAX_SURFACE_PX,
    };

    let state = AppState {
        options: CaptureOptions { max_surface_px },
    };

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Signature API listening on {}", addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/signatures", post(create_signature))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// Replay a recorded capture session and return its outbound signal
async fn create_signature(
    State(state): State<AppState>,
    Json(session): Json<Session>,
) -> Result<Response, (StatusCode, String)> {
    let request_id = Ulid::new().to_string();
    tracing::info!(
        "Replaying session {} with {} inputs",
        request_id,
        session.inputs.len()
    );

    let options = state.options;
    let replayed = tokio::task::spawn_blocking(move || signatures::replay(&session, options))
        .await
        .map_err(|e| {
            tracing::error!("Session {} replay aborted: {}", request_id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .map_err(|e| {
            tracing::warn!("Session {} rejected: {}", request_id, e);
            error_status(e)
        })?;

    for signal in &replayed.signals {
        tracing::info!(
            "Emitting {} for capture {} (session {})",
            signal.event_type,
            signal.aggregate_id,
            request_id
        );
    }

    match replayed.outcome {
        Outcome::Signed(payload) => Ok((StatusCode::CREATED, Json(payload)).into_response()),
        Outcome::Closed => Ok(Json(serde_json::json!({ "closed": true })).into_response()),
    }
}

fn error_status(error: Error) -> (StatusCode, String) {
    let status = match error {
        Error::Validation { .. } | Error::UnsupportedEnvironment { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        Error::Encoding { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, error.to_string())
}
