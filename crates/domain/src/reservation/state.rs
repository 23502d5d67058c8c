//! Reservation state machine.

use serde::{Deserialize, Serialize};

/// The state of a flight, hotel or car reservation.
///
/// State transitions:
/// ```text
/// Pending ──► Reserved ──┬──► Cancelled
///                        └──► Completed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationState {
    /// Created by a reserve command, no resource held yet.
    #[default]
    Pending,

    /// Resource held with details and a confirmation number.
    Reserved,

    /// Released by compensation (terminal state).
    Cancelled,

    /// Trip went ahead with this reservation (terminal state).
    Completed,
}

impl ReservationState {
    /// Returns true if the resource can be reserved in this state.
    pub fn can_reserve(&self) -> bool {
        matches!(self, ReservationState::Pending)
    }

    /// Returns true if the reservation can be cancelled in this state.
    pub fn can_cancel(&self) -> bool {
        matches!(self, ReservationState::Reserved)
    }

    /// Returns true if the reservation can be completed in this state.
    pub fn can_complete(&self) -> bool {
        matches!(self, ReservationState::Reserved)
    }

    /// Returns true if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationState::Cancelled | ReservationState::Completed)
    }

    /// Returns the state name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReservationState::Pending => "PENDING",
            ReservationState::Reserved => "RESERVED",
            ReservationState::Cancelled => "CANCELLED",
            ReservationState::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for ReservationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
