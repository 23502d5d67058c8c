//! HTTP surface with observability for the travel booking participants.
//!
//! A saga coordinator delivers commands to `POST /commands` and reads the
//! stored aggregates back from `GET /reservations/{kind}/{correlation_id}`.
//! Structured logging comes from tracing and metrics are exported in
//! Prometheus format.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use participant::{ParticipantConfig, ParticipantContext, TravelParticipant};
use reservation_store::ReservationStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::commands::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: ReservationStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/commands", post(routes::commands::dispatch::<S>))
        .route(
            "/reservations/{kind}/{correlation_id}",
            get(routes::reservations::get::<S>),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with every participant over one store.
pub fn create_default_state<S: ReservationStore + Clone + 'static>(
    store: S,
    config: &ParticipantConfig,
) -> Arc<AppState<S>> {
    let context = ParticipantContext::from_config(config);

    Arc::new(AppState {
        participant: TravelParticipant::new(store, context),
    })
}
