//! Claims Management Domain
//!
//! This crate implements the motor claim lifecycle from declaration through
//! adjudication to settlement and closure.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Draft -> Submitted -> UnderReview -> Investigating -> Approved -> Settled -> Closed
//!                                  \------------------/
//!   (any open status) -> Rejected -> Closed
//! ```
//!
//! Every transition and administrative action is appended to the claim's
//! history.

pub mod claim;
pub mod workflow;
pub mod history;
pub mod documents;
pub mod third_party;
pub mod ports;
pub mod services;
pub mod error;

pub use claim::{
    Approval, Claim, ClaimKind, ClaimRequest, ClaimUpdate, ExpertAssignment, Expertise,
    MotorClaimDetails, MotorClaimType, Settlement,
};
pub use workflow::{ClaimAction, ClaimStatus};
pub use history::{ClaimHistory, HistoryAction};
pub use documents::{ClaimDocument, NewDocument};
pub use third_party::{ThirdParty, ThirdPartyDetails};
pub use ports::{InsuredPolicy, PolicyLookupPort};
pub use services::{Actor, ClaimService};
pub use error::ClaimError;
