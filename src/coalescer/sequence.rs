//! Ordered record of dispatched calls.

use std::collections::VecDeque;
use std::sync::Arc;

/// Result slot of one dispatched call.
#[derive(Debug)]
pub enum RecordState<R> {
    /// Dispatched, no successful result yet (in flight or failed).
    Unresolved,
    Resolved(Arc<R>),
}

impl<R> Clone for RecordState<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Unresolved => Self::Unresolved,
            Self::Resolved(value) => Self::Resolved(Arc::clone(value)),
        }
    }
}

impl<R> RecordState<R> {
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    #[must_use]
    pub fn value(&self) -> Option<&R> {
        match self {
            Self::Unresolved => None,
            Self::Resolved(value) => Some(value),
        }
    }
}

/// One dispatched call, identified by its sequence number.
#[derive(Debug)]
pub struct CallRecord<R> {
    pub seq: u64,
    pub query: String,
    pub state: RecordState<R>,
}

impl<R> Clone for CallRecord<R> {
    fn clone(&self) -> Self {
        Self {
            seq: self.seq,
            query: self.query.clone(),
            state: self.state.clone(),
        }
    }
}

impl<R> CallRecord<R> {
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        self.state.is_resolved()
    }

    #[must_use]
    pub fn value(&self) -> Option<&R> {
        self.state.value()
    }
}

/// Records in dispatch order.
///
/// Sequence numbers come from a counter that survives [`CallSequence::clear`],
/// so a record appended after a clear is always newer than anything before it.
/// When `capacity` is reached the oldest record is evicted.
#[derive(Debug)]
pub struct CallSequence<R> {
    records: VecDeque<CallRecord<R>>,
    next_seq: u64,
    capacity: usize,
}

impl<R> CallSequence<R> {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::new(),
            next_seq: 0,
            capacity: capacity.max(1),
        }
    }

    /// Append an unresolved record for `query` and return its sequence number.
    pub fn append(&mut self, query: impl Into<String>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        while self.records.len() >= self.capacity {
            if let Some(evicted) = self.records.pop_front() {
                tracing::trace!(seq = evicted.seq, "evicting oldest call record");
            }
        }
        self.records.push_back(CallRecord {
            seq,
            query: query.into(),
            state: RecordState::Unresolved,
        });
        seq
    }

    /// Store the result of call `seq`. Returns false if that record is gone.
    pub fn resolve(&mut self, seq: u64, value: R) -> bool {
        match self.position(seq) {
            Some(index) => {
                self.records[index].state = RecordState::Resolved(Arc::new(value));
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn get(&self, seq: u64) -> Option<&CallRecord<R>> {
        self.position(seq).map(|index| &self.records[index])
    }

    /// Snapshot of the most recently appended record.
    #[must_use]
    pub fn latest(&self) -> Option<CallRecord<R>> {
        self.records.back().cloned()
    }

    #[must_use]
    pub fn latest_record(&self) -> Option<&CallRecord<R>> {
        self.records.back()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn records(&self) -> impl Iterator<Item = &CallRecord<R>> {
        self.records.iter()
    }

    // Records are appended with increasing seq, so the deque stays sorted.
    fn position(&self, seq: u64) -> Option<usize> {
        self.records.binary_search_by_key(&seq, |record| record.seq).ok()
    }
}
