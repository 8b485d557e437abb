//! Human-readable document numbers
//!
//! Quotes, policies, endorsements and claims carry numbers of the form
//! `{PREFIX}-{YYYY}-{MM}-{NNNN}` where the sequence restarts every calendar
//! month. Allocation of the sequence itself belongs to a
//! [`SequenceGenerator`](crate::ports::SequenceGenerator); this module only
//! formats and parses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::temporal::Timezone;

/// Kind of numbered document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    Quote,
    Policy,
    Endorsement,
    Claim,
}

impl DocumentKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "QTE",
            DocumentKind::Policy => "POL",
            DocumentKind::Endorsement => "AVE",
            DocumentKind::Claim => "SIN",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "QTE" => Some(DocumentKind::Quote),
            "POL" => Some(DocumentKind::Policy),
            "AVE" => Some(DocumentKind::Endorsement),
            "SIN" => Some(DocumentKind::Claim),
            _ => None,
        }
    }
}

/// Calendar month a sequence is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NumberingPeriod {
    pub year: i32,
    pub month: u32,
}

impl NumberingPeriod {
    pub fn new(year: i32, month: u32) -> Result<Self, NumberingError> {
        if !(1..=12).contains(&month) {
            return Err(NumberingError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// Period containing `instant` in the given business time zone
    pub fn containing(instant: DateTime<Utc>, tz: &Timezone) -> Self {
        let (year, month) = tz.year_month(instant);
        Self { year, month }
    }
}

impl fmt::Display for NumberingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NumberingError {
    #[error("Malformed document number: {0}")]
    Malformed(String),

    #[error("Invalid month: {0}")]
    InvalidMonth(u32),
}

/// A formatted document number such as `SIN-2025-03-0007`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentNumber {
    pub kind: DocumentKind,
    pub period: NumberingPeriod,
    pub sequence: u32,
}

impl DocumentNumber {
    pub fn new(kind: DocumentKind, period: NumberingPeriod, sequence: u32) -> Self {
        Self { kind, period, sequence }
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:04}",
            self.kind.prefix(),
            self.period,
            self.sequence
        )
    }
}

impl FromStr for DocumentNumber {
    type Err = NumberingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || NumberingError::Malformed(s.to_string());
        let mut parts = s.split('-');

        let kind = parts
            .next()
            .and_then(DocumentKind::from_prefix)
            .ok_or_else(malformed)?;
        let year: i32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        let month: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        let sequence: u32 = parts.next().and_then(|p| p.parse().ok()).ok_or_else(malformed)?;
        if parts.next().is_some() {
            return Err(malformed());
        }

        Ok(Self {
            kind,
            period: NumberingPeriod::new(year, month)?,
            sequence,
        })
    }
}

impl Serialize for DocumentNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DocumentNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
