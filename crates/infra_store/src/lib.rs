//! Infrastructure Store Layer
//!
//! In-memory implementations of the ports consumed by the lifecycle services.
//! They back the test suites and embedded use of the core; a database-backed
//! adapter only has to honour the same port contracts.
//!
//! # Contracts
//!
//! - Records carry a version; `update` is a compare-and-swap on it and a stale
//!   write fails with `PortError::Conflict`
//! - Sequences are allocated under a lock, one counter per (kind, year, month)
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_store::{InMemoryRecordStore, InMemorySequenceGenerator};
//!
//! let quotes: Arc<dyn RecordStore<Quote>> = Arc::new(InMemoryRecordStore::new());
//! let sequences = Arc::new(InMemorySequenceGenerator::new());
//! ```

pub mod record_store;
pub mod sequence;
pub mod reference;
pub mod policy_lookup;

pub use record_store::InMemoryRecordStore;
pub use sequence::InMemorySequenceGenerator;
pub use reference::InMemoryReferenceData;
pub use policy_lookup::PolicyStoreLookup;
