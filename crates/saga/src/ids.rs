//! Transaction id generation.
//!
//! Transaction ids are produced by an injected generator rather than read
//! from ambient process state (clocks, globals), so orchestrator instances
//! stay testable and collisions stay impossible across replicas.

use std::sync::atomic::{AtomicU64, Ordering};

use common::TransactionId;
use uuid::Uuid;

/// Source of externally visible transaction ids.
pub trait TransactionIdGenerator: Send + Sync {
    /// Returns a fresh, unique transaction id.
    fn next_id(&self) -> TransactionId;
}

/// UUID-backed generator for production use.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTransactionIds;

impl TransactionIdGenerator for UuidTransactionIds {
    fn next_id(&self) -> TransactionId {
        TransactionId::new(format!("TXN-{}", Uuid::new_v4().simple()))
    }
}

/// Monotonic counter generator for deterministic tests.
#[derive(Debug, Default)]
pub struct SequentialTransactionIds {
    counter: AtomicU64,
}

impl SequentialTransactionIds {
    /// Creates a generator starting at `TXN-0001`.
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransactionIdGenerator for SequentialTransactionIds {
    fn next_id(&self) -> TransactionId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        TransactionId::new(format!("TXN-{n:04}"))
    }
}
