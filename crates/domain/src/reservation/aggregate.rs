//! Generic reservation aggregate.

use chrono::{DateTime, Utc};
use common::{ClientId, CorrelationId, ReservationId};
use reservation_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::value_objects::ConfirmationNumber;

use super::{ReservationError, ReservationState, Resource};

/// Reservation aggregate root for one resource of one trip.
///
/// Created `Pending` by a reserve command, mutated once by `reserve`, and at
/// most once more by `cancel` or `complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "", rename_all = "camelCase")]
pub struct Reservation<R: Resource> {
    /// Unique reservation identifier.
    id: ReservationId,

    /// Current version for optimistic concurrency.
    #[serde(default)]
    version: Version,

    /// Trip this reservation belongs to.
    correlation_id: CorrelationId,

    /// Customer the trip is booked for.
    client_id: ClientId,

    state: ReservationState,

    /// Parameters the reservation was requested with.
    request: R::Request,

    /// Assigned on reservation, absent while pending.
    details: Option<R::Details>,

    confirmation_number: Option<ConfirmationNumber>,

    created_at: DateTime<Utc>,
    reserved_at: Option<DateTime<Utc>>,
    cancelled_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl<R: Resource> Aggregate for Reservation<R> {
    fn kind() -> &'static str {
        R::KIND.as_str()
    }

    fn id(&self) -> ReservationId {
        self.id
    }

    fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn state_name(&self) -> &'static str {
        self.state.as_str()
    }

    fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

// Query methods
impl<R: Resource> Reservation<R> {
    /// Returns the current state.
    pub fn state(&self) -> ReservationState {
        self.state
    }

    /// Returns the client the reservation was made for.
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns the request parameters.
    pub fn request(&self) -> &R::Request {
        &self.request
    }

    /// Returns the resource details, once reserved.
    pub fn details(&self) -> Option<&R::Details> {
        self.details.as_ref()
    }

    /// Returns the confirmation number, once reserved.
    pub fn confirmation_number(&self) -> Option<&ConfirmationNumber> {
        self.confirmation_number.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn reserved_at(&self) -> Option<DateTime<Utc>> {
        self.reserved_at
    }

    pub fn cancelled_at(&self) -> Option<DateTime<Utc>> {
        self.cancelled_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}

// Command methods
impl<R: Resource> Reservation<R> {
    /// Creates a pending reservation after validating the request.
    pub fn new(
        correlation_id: CorrelationId,
        client_id: ClientId,
        request: R::Request,
    ) -> Result<Self, ReservationError> {
        R::validate(&request)?;

        Ok(Self {
            id: ReservationId::new(),
            version: Version::initial(),
            correlation_id,
            client_id,
            state: ReservationState::Pending,
            request,
            details: None,
            confirmation_number: None,
            created_at: Utc::now(),
            reserved_at: None,
            cancelled_at: None,
            completed_at: None,
        })
    }

    /// Holds the resource, assigning its details and confirmation number.
    ///
    /// Rejected once reserved, so a duplicate command that slipped past the
    /// idempotency check cannot double-book.
    pub fn reserve(
        &mut self,
        details: R::Details,
        confirmation_number: ConfirmationNumber,
    ) -> Result<(), ReservationError> {
        if !self.state.can_reserve() {
            return Err(ReservationError::InvalidStateTransition {
                current_state: self.state,
                action: "reserve",
            });
        }

        self.details = Some(details);
        self.confirmation_number = Some(confirmation_number);
        self.state = ReservationState::Reserved;
        self.reserved_at = Some(Utc::now());
        Ok(())
    }

    /// Releases a held resource.
    pub fn cancel(&mut self) -> Result<(), ReservationError> {
        if !self.state.can_cancel() {
            return Err(ReservationError::InvalidStateTransition {
                current_state: self.state,
                action: "cancel",
            });
        }

        self.state = ReservationState::Cancelled;
        self.cancelled_at = Some(Utc::now());
        Ok(())
    }

    /// Marks a held resource as used by the confirmed trip.
    pub fn complete(&mut self) -> Result<(), ReservationError> {
        if !self.state.can_complete() {
            return Err(ReservationError::InvalidStateTransition {
                current_state: self.state,
                action: "complete",
            });
        }

        self.state = ReservationState::Completed;
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}
