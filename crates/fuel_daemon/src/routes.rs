use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::{HeaderValue, Method, StatusCode},
    response::{
        sse::{Event, Sse},
        Json,
    },
    routing::get,
    Router,
};
use fuel_core::{DestinationOutcome, EnvironmentSnapshot, EventEnvelope};
use std::collections::VecDeque;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[cfg(test)]
pub fn make_router(state: AppState) -> Router {
    make_router_with_cors(state, HeaderValue::from_static("http://localhost:5173"))
}

pub fn make_router_with_cors(state: AppState, cors_origin: HeaderValue) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/step", get(step_handler))
        .route(
            "/set_tanker_destination/:destination",
            get(set_destination_handler),
        )
        .route("/api/v1/meta", get(meta_handler))
        .route("/api/v1/snapshot", get(snapshot_handler))
        .route("/api/v1/metrics", get(metrics_handler))
        .route("/api/v1/alerts", get(alerts_handler))
        .route("/api/v1/stream", get(stream_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Advance the world by one tick and return the new state.
pub async fn step_handler(State(app_state): State<AppState>) -> Json<EnvironmentSnapshot> {
    let mut sim = app_state.sim.lock();
    let events = sim.step();
    let snapshot = sim.env.state_as_model();
    drop(sim);

    tracing::debug!(tick = snapshot.tick, events = events.len(), "stepped");
    broadcast_events(&app_state, events);
    Json(snapshot)
}

/// `"x,y"` from the path. Both parts must be finite numbers.
fn parse_coordinates(raw: &str) -> Option<(f64, f64)> {
    let (x, y) = raw.split_once(',')?;
    let x: f64 = x.trim().parse().ok()?;
    let y: f64 = y.trim().parse().ok()?;
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

pub async fn set_destination_handler(
    State(app_state): State<AppState>,
    Path(destination): Path<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    let Some((x, y)) = parse_coordinates(&destination) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "status": "bad_request",
                "message": format!("expected '<x>,<y>', got '{destination}'"),
            })),
        );
    };

    let (outcome, events) = app_state.sim.lock().set_destination(x, y);
    broadcast_events(&app_state, events);

    let status = match outcome {
        DestinationOutcome::NotFound => {
            tracing::warn!(x, y, "no destination at requested coordinates");
            (StatusCode::NOT_FOUND, "not_found")
        }
        DestinationOutcome::Station(_) | DestinationOutcome::Depot => {
            tracing::info!(x, y, "tanker destination overridden");
            (StatusCode::OK, "ok")
        }
    };
    (
        status.0,
        Json(serde_json::json!({
            "status": status.1,
            "message": outcome.message(),
        })),
    )
}

pub async fn meta_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let sim = app_state.sim.lock();
    Json(serde_json::json!({
        "tick": sim.env.meta.tick,
        "config_version": sim.env.meta.config_version,
        "stations": sim.env.stations.len(),
        "low_fuel_threshold": sim.env.constants.low_fuel_threshold,
        "metrics_every": sim.metrics_every,
    }))
}

pub async fn snapshot_handler(State(app_state): State<AppState>) -> Json<EnvironmentSnapshot> {
    let sim = app_state.sim.lock();
    Json(sim.env.state_as_model())
}

pub async fn metrics_handler(
    State(app_state): State<AppState>,
) -> Json<VecDeque<fuel_core::MetricsSnapshot>> {
    let sim = app_state.sim.lock();
    Json(sim.metrics_history.clone())
}

async fn alerts_handler(State(app_state): State<AppState>) -> Json<serde_json::Value> {
    let sim = app_state.sim.lock();
    let active_ids = sim.alert_engine.active_alert_ids();
    Json(serde_json::json!({ "active_alerts": active_ids }))
}

fn broadcast_events(app_state: &AppState, events: Vec<EventEnvelope>) {
    if !events.is_empty() {
        // No subscribers is fine.
        let _ = app_state.event_tx.send(events);
    }
}

pub async fn stream_handler(
    State(app_state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let mut rx = app_state.event_tx.subscribe();
    let sim = app_state.sim.clone();

    let stream = async_stream::stream! {
        let mut heartbeat = tokio::time::interval(Duration::from_secs(5));
        heartbeat.tick().await; // discard the immediate first tick
        let mut flush = tokio::time::interval(Duration::from_millis(50));
        flush.tick().await; // discard the immediate first tick
        let mut pending: Vec<EventEnvelope> = Vec::new();
        loop {
            tokio::select! {
                result = rx.recv() => {
                    match result {
                        Ok(events) => pending.extend(events),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "event stream subscriber lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
                _ = flush.tick() => {
                    if !pending.is_empty() {
                        let data = serde_json::to_string(&pending).unwrap_or_default();
                        pending.clear();
                        yield Ok(Event::default().data(data));
                    }
                }
                _ = heartbeat.tick() => {
                    let tick = sim.lock().env.meta.tick;
                    let hb = serde_json::json!({"heartbeat": true, "tick": tick});
                    yield Ok(Event::default().data(hb.to_string()));
                }
            }
        }
    };

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    )
}
