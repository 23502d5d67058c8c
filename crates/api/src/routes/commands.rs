//! Command delivery endpoint used by the saga coordinator.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use participant::{Command, Reply, StepOutcome, TravelParticipant};
use reservation_store::ReservationStore;

use crate::error::ApiError;

/// Shared application state.
pub struct AppState<S: ReservationStore> {
    pub participant: TravelParticipant<S>,
}

/// POST /commands: delivers one command and returns its reply.
///
/// Recoverable failures answer with `"retryable": true`; the coordinator
/// may deliver the same command again.
pub async fn dispatch<S: ReservationStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<Command>, JsonRejection>,
) -> Result<Json<Reply>, ApiError> {
    let Json(command) = payload?;

    match state.participant.dispatch(command).await {
        StepOutcome::Succeeded(reply) => Ok(Json(reply)),
        StepOutcome::Recoverable(err) | StepOutcome::Fatal(err) => Err(err.into()),
    }
}
