//! Strongly-typed identifiers for domain entities
//!
//! Newtype wrappers around UUIDs keep a quote id from ever being passed where
//! a policy id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates a new time-ordered identifier (v7)
            pub fn new_v7() -> Self {
                Self(Uuid::now_v7())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Returns the identifier prefix for display
            pub fn prefix() -> &'static str {
                $prefix
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}-{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let uuid_str = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                Ok(Self(Uuid::parse_str(uuid_str)?))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Uuid {
                id.0
            }
        }
    };
}

// Quote and policy
define_id!(QuoteId, "QUO");
define_id!(PolicyId, "POL");
define_id!(PolicyCoverageId, "PCOV");
define_id!(EndorsementId, "END");

// Claims
define_id!(ClaimId, "CLM");
define_id!(ClaimDocumentId, "DOC");
define_id!(ThirdPartyId, "TPY");
define_id!(ClaimHistoryId, "CLH");

// Reference data
define_id!(ClientId, "CLI");
define_id!(DistributorId, "DST");
define_id!(ProductId, "PRD");
define_id!(CoverageId, "COV");
define_id!(VehicleCategoryId, "VCAT");
define_id!(VehicleMakeId, "VMK");
define_id!(VehicleModelId, "VMD");
