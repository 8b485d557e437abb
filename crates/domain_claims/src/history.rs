//! Claim audit trail
//!
//! Every transition and administrative action appends one entry. Entries are
//! never edited, removed or reordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::ClaimHistoryId;

use crate::workflow::ClaimStatus;

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryAction {
    ClaimCreated,
    ClaimSubmitted,
    ReviewStarted,
    ExpertAssigned,
    ExpertiseSubmitted,
    ClaimApproved,
    ClaimRejected,
    ClaimSettled,
    ClaimClosed,
    ClaimUpdated,
    DocumentUploaded,
    DocumentDeleted,
    ThirdPartyAdded,
    ThirdPartyRemoved,
    ThirdPartyUpdated,
    NotesUpdated,
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// One audit entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimHistory {
    pub id: ClaimHistoryId,
    pub action_type: HistoryAction,
    pub description: String,
    /// Set only for status transitions
    pub old_status: Option<ClaimStatus>,
    pub new_status: Option<ClaimStatus>,
    pub performed_by: Option<String>,
    pub comment: Option<String>,
    pub action_date: DateTime<Utc>,
}

impl ClaimHistory {
    pub fn new(action_type: HistoryAction, description: impl Into<String>, action_date: DateTime<Utc>) -> Self {
        Self {
            id: ClaimHistoryId::new_v7(),
            action_type,
            description: description.into(),
            old_status: None,
            new_status: None,
            performed_by: None,
            comment: None,
            action_date,
        }
    }

    pub fn with_transition(mut self, old_status: Option<ClaimStatus>, new_status: ClaimStatus) -> Self {
        self.old_status = old_status;
        self.new_status = Some(new_status);
        self
    }

    pub fn by(mut self, performed_by: Option<&str>) -> Self {
        self.performed_by = performed_by.map(str::to_string);
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    /// Returns true if this entry records a status change
    pub fn is_transition(&self) -> bool {
        self.new_status.is_some()
    }
}
