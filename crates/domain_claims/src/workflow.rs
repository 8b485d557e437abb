//! Claims workflow: status set and transition table

use serde::{Deserialize, Serialize};
use std::fmt;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Being captured, still editable
    Draft,
    /// Declared by the insured
    Submitted,
    UnderReview,
    /// An expert has been assigned
    Investigating,
    Approved,
    Rejected,
    /// Payment made
    Settled,
    Closed,
}

impl ClaimStatus {
    /// Returns true once no further adjudication can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::Rejected | ClaimStatus::Settled | ClaimStatus::Closed)
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Operations that move (or may move) a claim through the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimAction {
    Submit,
    StartReview,
    AssignExpert,
    SubmitExpertise,
    Approve,
    Reject,
    Settle,
    Close,
    Update,
}

impl ClaimAction {
    /// Status a claim in `from` ends up in after this action, if allowed
    pub fn target(&self, from: ClaimStatus) -> Option<ClaimStatus> {
        use ClaimStatus::*;
        match (self, from) {
            (ClaimAction::Submit, Draft) => Some(Submitted),
            (ClaimAction::StartReview, Submitted) => Some(UnderReview),
            (ClaimAction::AssignExpert, UnderReview | Investigating) => Some(Investigating),
            (ClaimAction::SubmitExpertise, Investigating) => Some(Investigating),
            (ClaimAction::Approve, UnderReview | Investigating) => Some(Approved),
            (ClaimAction::Reject, status) if !status.is_terminal() => Some(Rejected),
            (ClaimAction::Settle, Approved) => Some(Settled),
            (ClaimAction::Close, Settled | Rejected) => Some(Closed),
            (ClaimAction::Update, Draft) => Some(Draft),
            _ => None,
        }
    }

    /// Name of the status this action aims for, for error messages
    pub fn target_name(&self) -> &'static str {
        match self {
            ClaimAction::Submit => "Submitted",
            ClaimAction::StartReview => "UnderReview",
            ClaimAction::AssignExpert | ClaimAction::SubmitExpertise => "Investigating",
            ClaimAction::Approve => "Approved",
            ClaimAction::Reject => "Rejected",
            ClaimAction::Settle => "Settled",
            ClaimAction::Close => "Closed",
            ClaimAction::Update => "Draft",
        }
    }
}
