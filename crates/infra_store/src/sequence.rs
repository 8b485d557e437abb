//! Monthly document sequences

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use core_kernel::{DocumentKind, DomainPort, NumberingPeriod, PortError, SequenceGenerator};

/// Counter per (document kind, numbering period), allocated under a lock
#[derive(Debug, Clone, Default)]
pub struct InMemorySequenceGenerator {
    counters: Arc<Mutex<HashMap<(DocumentKind, NumberingPeriod), u32>>>,
}

impl InMemorySequenceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value handed out for a key, zero if none
    pub async fn current(&self, kind: DocumentKind, period: NumberingPeriod) -> u32 {
        self.counters.lock().await.get(&(kind, period)).copied().unwrap_or(0)
    }
}

impl DomainPort for InMemorySequenceGenerator {}

#[async_trait]
impl SequenceGenerator for InMemorySequenceGenerator {
    async fn next_value(&self, kind: DocumentKind, period: NumberingPeriod) -> Result<u32, PortError> {
        let mut counters = self.counters.lock().await;
        let counter = counters.entry((kind, period)).or_insert(0);
        *counter = counter
            .checked_add(1)
            .ok_or_else(|| PortError::internal(format!("{} sequence exhausted for {}", kind.prefix(), period)))?;
        debug!(prefix = kind.prefix(), period = %period, value = *counter, "Sequence allocated");
        Ok(*counter)
    }
}
