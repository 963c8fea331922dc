//! Snowflake-style 64-bit id generation.
//!
//! Layout (most significant first): 1 unused sign bit, 41 bits of
//! milliseconds since [`EPOCH_MILLIS`], 10 bits of worker id, 12 bits of
//! per-millisecond sequence.

use entity::Id;
use std::sync::atomic::{AtomicU64, Ordering};

/// 2020-01-01T00:00:00Z
pub const EPOCH_MILLIS: i64 = 1_577_836_800_000;

const WORKER_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;
const WORKER_MASK: u64 = (1 << WORKER_BITS) - 1;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;

/// Lock-free generator of unique, strictly increasing ids.
///
/// If the wall clock steps backwards, or a millisecond's sequence is
/// exhausted, ids keep counting forward from the last issued timestamp
/// instead of waiting.
pub struct IdGenerator {
    worker_id: u64,
    /// `(millis since epoch << SEQUENCE_BITS) | sequence` of the last id
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new(worker_id: u16) -> Self {
        debug_assert!(u64::from(worker_id) <= WORKER_MASK);
        Self {
            worker_id: u64::from(worker_id) & WORKER_MASK,
            last: AtomicU64::new(0),
        }
    }

    pub fn next_id(&self) -> Id {
        let now = Self::now_millis();
        let mut last = self.last.load(Ordering::Acquire);

        loop {
            let last_millis = last >> SEQUENCE_BITS;
            let next = if now > last_millis {
                now << SEQUENCE_BITS
            } else if last & SEQUENCE_MASK < SEQUENCE_MASK {
                last + 1
            } else {
                (last_millis + 1) << SEQUENCE_BITS
            };

            match self
                .last
                .compare_exchange_weak(last, next, Ordering::AcqRel, Ordering::Acquire)
            {
                Ok(_) => return self.compose(next),
                Err(actual) => last = actual,
            }
        }
    }

    pub fn worker_id(&self) -> u16 {
        self.worker_id as u16
    }

    fn compose(&self, state: u64) -> Id {
        let millis = state >> SEQUENCE_BITS;
        let sequence = state & SEQUENCE_MASK;
        ((millis << (WORKER_BITS + SEQUENCE_BITS)) | (self.worker_id << SEQUENCE_BITS) | sequence)
            as Id
    }

    fn now_millis() -> u64 {
        (chrono::Utc::now().timestamp_millis() - EPOCH_MILLIS).max(0) as u64
    }
}

/// Worker id encoded in `id`.
pub fn worker_of(id: Id) -> u16 {
    (((id as u64) >> SEQUENCE_BITS) & WORKER_MASK) as u16
}
