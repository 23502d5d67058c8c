//! Read access to stored aggregates.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use common::CorrelationId;
use domain::ResourceKind;
use reservation_store::ReservationStore;

use crate::error::ApiError;
use crate::routes::commands::AppState;

/// GET /reservations/{kind}/{correlation_id}: returns the stored aggregate.
pub async fn get<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path((kind, correlation_id)): Path<(String, String)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let kind = ResourceKind::parse(&kind)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown resource kind: {kind}")))?;
    let correlation_id =
        CorrelationId::parse(&correlation_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let aggregate = state.participant.find(kind, &correlation_id).await?;

    aggregate.map(Json).ok_or_else(|| {
        ApiError::NotFound(format!(
            "No {kind} found for correlation id {correlation_id}"
        ))
    })
}
