//! Domain event types
//!
//! Every state transition publishes one of these on the event bus for
//! notification and messaging integrations.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Payload for rent request lifecycle events
#[derive(Debug, Clone, Serialize)]
pub struct RentRequestEventData {
    pub rent_request_id: Uuid,
    pub property_id: Uuid,
    pub renter_id: Uuid,
    pub owner_id: Uuid,
    pub status: String,
}

/// Payload for checkout workflow events
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutEventData {
    pub checkout_id: Uuid,
    pub rent_request_id: Uuid,
    pub owner_confirmation: String,
}

/// Payload for settlement events
#[derive(Debug, Clone, Serialize)]
pub struct SettlementEventData {
    pub checkout_id: Uuid,
    pub rent_request_id: Uuid,
    /// Decimal string, minor-unit exact
    pub final_refund_amount: String,
    /// Decimal string, minor-unit exact
    pub final_payout_amount: String,
    pub deposit_return_percent: String,
    pub decided_by_agent: bool,
}

/// Domain events emitted by the rent workflow
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum Event {
    RentRequestCreated(RentRequestEventData),
    RentRequestConfirmed(RentRequestEventData),
    RentRequestRejected(RentRequestEventData),
    RentRequestCancelled(RentRequestEventData),
    RentRequestCancelledByOwner(RentRequestEventData),
    RentRequestPaid(RentRequestEventData),
    RentRequestCompleted(RentRequestEventData),
    CheckoutRequested(CheckoutEventData),
    CheckoutOwnerConfirmed(CheckoutEventData),
    CheckoutOwnerRejected(CheckoutEventData),
    CheckoutAutoConfirmed(CheckoutEventData),
    CheckoutAgentDecided(CheckoutEventData),
    CheckoutSettled(SettlementEventData),
}

impl Event {
    /// Stable event type identifier
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RentRequestCreated(_) => "rent_request_created",
            Self::RentRequestConfirmed(_) => "rent_request_confirmed",
            Self::RentRequestRejected(_) => "rent_request_rejected",
            Self::RentRequestCancelled(_) => "rent_request_cancelled",
            Self::RentRequestCancelledByOwner(_) => "rent_request_cancelled_by_owner",
            Self::RentRequestPaid(_) => "rent_request_paid",
            Self::RentRequestCompleted(_) => "rent_request_completed",
            Self::CheckoutRequested(_) => "checkout_requested",
            Self::CheckoutOwnerConfirmed(_) => "checkout_owner_confirmed",
            Self::CheckoutOwnerRejected(_) => "checkout_owner_rejected",
            Self::CheckoutAutoConfirmed(_) => "checkout_auto_confirmed",
            Self::CheckoutAgentDecided(_) => "checkout_agent_decided",
            Self::CheckoutSettled(_) => "checkout_settled",
        }
    }

    /// The rental the event concerns
    pub fn rent_request_id(&self) -> Uuid {
        match self {
            Self::RentRequestCreated(d)
            | Self::RentRequestConfirmed(d)
            | Self::RentRequestRejected(d)
            | Self::RentRequestCancelled(d)
            | Self::RentRequestCancelledByOwner(d)
            | Self::RentRequestPaid(d)
            | Self::RentRequestCompleted(d) => d.rent_request_id,
            Self::CheckoutRequested(d)
            | Self::CheckoutOwnerConfirmed(d)
            | Self::CheckoutOwnerRejected(d)
            | Self::CheckoutAutoConfirmed(d)
            | Self::CheckoutAgentDecided(d) => d.rent_request_id,
            Self::CheckoutSettled(d) => d.rent_request_id,
        }
    }
}

/// Event wrapper with emission timestamp
#[derive(Debug, Clone, Serialize)]
pub struct EventMessage {
    pub event: Event,
    pub timestamp: DateTime<Utc>,
}

impl EventMessage {
    pub fn new(event: Event) -> Self {
        Self {
            event,
            timestamp: Utc::now(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
