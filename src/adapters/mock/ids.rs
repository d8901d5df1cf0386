//! Deterministic identifier generator for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::traits::IdGenerator;

/// Yields `id0000001`, `id0000002`, ... in order.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    counter: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("id{:07}", n)
    }
}
