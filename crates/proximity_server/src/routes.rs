//! HTTP route handlers and router configuration

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use proximity_core::{Coordinate, EntityId, NeighbourTrail, ProximityError, ProximityResult, RecordedLocation};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::{Result, ServerError};
use crate::extract::{LocationBody, LocationParams};
use crate::state::AppState;

/// Header carrying the caller's entity id.
pub const USER_ID_HEADER: &str = "x-user-id";

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/location", post(record_location))
        .route("/neighbours", get(neighbours))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let service = state.service.clone();
    let entities = run_blocking(move || service.entity_count()).await?;
    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "entities": entities,
    })))
}

async fn record_location(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<LocationParams>,
    LocationBody(body): LocationBody,
) -> Result<(StatusCode, Json<RecordedLocation>)> {
    let user_id = user_id(&headers)?;
    let params = body.or(query);
    let latitude = required(params.latitude, "Latitude")?;
    let longitude = required(params.longitude, "Longitude")?;
    let coordinate = Coordinate::parse(&latitude, &longitude).map_err(ProximityError::from)?;

    let now = state.clock.now();
    let service = state.service.clone();
    let recorded = run_blocking(move || service.record_location(&user_id, now, coordinate)).await?;

    info!(
        component = "location",
        event = "location_recorded",
        user_id = %recorded.user_id,
        timestamp = recorded.timestamp,
        "Recorded position"
    );
    Ok((StatusCode::CREATED, Json(recorded)))
}

async fn neighbours(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Json<Vec<NeighbourTrail>>> {
    let user_id = user_id(&headers)?;
    let now = state.clock.now();
    let service = state.service.clone();
    let lookup_id = user_id.clone();
    let neighbours = run_blocking(move || service.neighbours_with_trails(&lookup_id, now)).await?;

    info!(
        component = "neighbours",
        event = "neighbours_found",
        user_id = %user_id,
        now,
        neighbours = neighbours.len(),
        trail_points = neighbours.iter().map(|n| n.trail.len()).sum::<usize>(),
        "Found neighbours"
    );
    Ok(Json(neighbours))
}

fn user_id(headers: &HeaderMap) -> Result<EntityId> {
    headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(EntityId::from)
        .ok_or(ServerError::MissingUserId)
}

fn required(value: Option<String>, name: &'static str) -> Result<String> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or(ServerError::MissingParam(name))
}

/// Run a core call on the blocking pool; store access may block.
async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> ProximityResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|error| ServerError::Internal(format!("blocking task failed: {error}")))?
        .map_err(ServerError::from)
}
