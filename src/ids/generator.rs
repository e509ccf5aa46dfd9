// Time-ordered identifier generator
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::ids::SortableId;

/// Generator for time-ordered 64-bit identifiers.
///
/// Format (64 bits):
/// - 41 bits: timestamp in milliseconds since custom epoch
/// - 10 bits: machine/worker ID
/// - 12 bits: sequence number
///
/// Sorting the produced values numerically sorts them chronologically, which
/// is the whole point of [`SortableId`]. Generation is infallible: when the
/// wall clock moves backwards the timestamp is clamped to the last value
/// handed out and the sequence absorbs the burst.
pub struct IdGenerator {
    /// Machine/worker ID (0-1023)
    worker_id: u16,

    /// Custom epoch (milliseconds since Unix epoch)
    epoch: u64,

    /// State protected by mutex
    state: Mutex<GeneratorState>,
}

struct GeneratorState {
    last_timestamp: u64,
    sequence: u16,
}

impl IdGenerator {
    /// Custom epoch: 2024-01-01 00:00:00 UTC
    pub const DEFAULT_EPOCH: u64 = 1704067200000;

    /// Maximum worker ID
    pub const MAX_WORKER_ID: u16 = 1023;

    /// Maximum sequence number
    const MAX_SEQUENCE: u16 = 4095;

    pub fn new(worker_id: u16) -> Self {
        Self::with_epoch(worker_id, Self::DEFAULT_EPOCH)
    }

    pub fn with_epoch(worker_id: u16, epoch: u64) -> Self {
        assert!(
            worker_id <= Self::MAX_WORKER_ID,
            "worker_id must be <= {}",
            Self::MAX_WORKER_ID
        );

        Self {
            worker_id,
            epoch,
            state: Mutex::new(GeneratorState {
                last_timestamp: 0,
                sequence: 0,
            }),
        }
    }

    /// Generate the next identifier.
    pub fn next_id(&self) -> SortableId {
        let mut state = self.state.lock().unwrap();

        // Clamp instead of failing when the clock runs backwards; callers
        // (predicate placeholders, lazy key assignment) cannot retry.
        let mut timestamp = self.current_timestamp().max(state.last_timestamp);

        if timestamp == state.last_timestamp {
            state.sequence = (state.sequence + 1) & Self::MAX_SEQUENCE;

            if state.sequence == 0 {
                // Sequence overflow - wait for next millisecond
                timestamp = self.wait_next_millis(state.last_timestamp);
            }
        } else {
            state.sequence = 0;
        }

        state.last_timestamp = timestamp;

        let id = ((timestamp - self.epoch) << 22)
            | ((self.worker_id as u64) << 12)
            | (state.sequence as u64);

        SortableId::new(id as i64)
    }

    fn current_timestamp(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(self.epoch)
    }

    fn wait_next_millis(&self, last_timestamp: u64) -> u64 {
        let mut timestamp = self.current_timestamp();
        while timestamp <= last_timestamp {
            timestamp = self.current_timestamp();
        }
        timestamp
    }

    /// Extract the millisecond timestamp encoded in an identifier.
    pub fn extract_timestamp(&self, id: SortableId) -> u64 {
        ((id.number() as u64) >> 22) + self.epoch
    }

    /// Extract the worker ID encoded in an identifier.
    pub fn extract_worker_id(&self, id: SortableId) -> u16 {
        (((id.number() as u64) >> 12) & 0x3FF) as u16
    }

    /// Extract the sequence number encoded in an identifier.
    pub fn extract_sequence(&self, id: SortableId) -> u16 {
        ((id.number() as u64) & 0xFFF) as u16
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(0)
    }
}
