//! Domain events for quotes and policies
//!
//! Aggregates record events as they change; the services drain them with
//! `take_events()` after a successful write and log them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DocumentNumber, EndorsementId, Money, PolicyId, QuoteId};

use crate::endorsement::EndorsementType;

/// Domain events emitted by the Quote and Policy aggregates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyEvent {
    /// A priced quote has been issued
    QuoteGenerated {
        quote_id: QuoteId,
        quote_number: DocumentNumber,
        total_premium: Money,
        expiry_date: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    QuoteAccepted {
        quote_id: QuoteId,
        timestamp: DateTime<Utc>,
    },

    QuoteRejected {
        quote_id: QuoteId,
        timestamp: DateTime<Utc>,
    },

    /// The quote has been claimed by a policy
    QuoteConverted {
        quote_id: QuoteId,
        policy_id: PolicyId,
        timestamp: DateTime<Utc>,
    },

    /// A draft policy has been created from a quote
    PolicyIssued {
        policy_id: PolicyId,
        policy_number: DocumentNumber,
        quote_id: Option<QuoteId>,
        timestamp: DateTime<Utc>,
    },

    /// Payment received, policy in force
    PolicyActivated {
        policy_id: PolicyId,
        payment_reference: String,
        timestamp: DateTime<Utc>,
    },

    PolicySuspended {
        policy_id: PolicyId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    PolicyCancelled {
        policy_id: PolicyId,
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// An endorsement has been appended
    EndorsementApplied {
        policy_id: PolicyId,
        endorsement_id: EndorsementId,
        endorsement_number: DocumentNumber,
        endorsement_type: EndorsementType,
        premium_adjustment: Money,
        timestamp: DateTime<Utc>,
    },
}

impl PolicyEvent {
    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            PolicyEvent::QuoteGenerated { timestamp, .. } => *timestamp,
            PolicyEvent::QuoteAccepted { timestamp, .. } => *timestamp,
            PolicyEvent::QuoteRejected { timestamp, .. } => *timestamp,
            PolicyEvent::QuoteConverted { timestamp, .. } => *timestamp,
            PolicyEvent::PolicyIssued { timestamp, .. } => *timestamp,
            PolicyEvent::PolicyActivated { timestamp, .. } => *timestamp,
            PolicyEvent::PolicySuspended { timestamp, .. } => *timestamp,
            PolicyEvent::PolicyCancelled { timestamp, .. } => *timestamp,
            PolicyEvent::EndorsementApplied { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            PolicyEvent::QuoteGenerated { .. } => "QuoteGenerated",
            PolicyEvent::QuoteAccepted { .. } => "QuoteAccepted",
            PolicyEvent::QuoteRejected { .. } => "QuoteRejected",
            PolicyEvent::QuoteConverted { .. } => "QuoteConverted",
            PolicyEvent::PolicyIssued { .. } => "PolicyIssued",
            PolicyEvent::PolicyActivated { .. } => "PolicyActivated",
            PolicyEvent::PolicySuspended { .. } => "PolicySuspended",
            PolicyEvent::PolicyCancelled { .. } => "PolicyCancelled",
            PolicyEvent::EndorsementApplied { .. } => "EndorsementApplied",
        }
    }
}
