/// History Buffer
///
/// Most-recent-first record of past SQL results, kept as two parallel
/// sequences: the rows half and the metadata half of each result record.
use crate::core::db::value::{FieldDescriptor, Payload, ResultRecord};
use std::collections::VecDeque;
use tracing::trace;

#[derive(Debug, Clone, Default)]
pub struct HistoryBuffer {
    rows: VecDeque<Payload>,
    metadata: VecDeque<Option<Vec<FieldDescriptor>>>,
}

/// A read-only view of one history entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryEntry<'a> {
    pub rows: &'a Payload,
    pub metadata: Option<&'a [FieldDescriptor]>,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a result at the front, then evicts the oldest entries beyond `capacity`.
    pub fn push(&mut self, record: ResultRecord, capacity: usize) {
        self.rows.push_front(record.payload);
        self.metadata.push_front(record.fields);
        self.rows.truncate(capacity);
        self.metadata.truncate(capacity);
        trace!("history holds {} entries", self.rows.len());
    }

    /// The entry at `index`, where 0 is the most recent.
    pub fn get(&self, index: usize) -> Option<HistoryEntry<'_>> {
        let rows = self.rows.get(index)?;
        let metadata = self.metadata.get(index)?.as_deref();
        Some(HistoryEntry { rows, metadata })
    }

    /// The most recent entry.
    pub fn get0(&self) -> Option<HistoryEntry<'_>> {
        self.get(0)
    }

    pub fn rows(&self) -> impl Iterator<Item = &Payload> {
        self.rows.iter()
    }

    pub fn metadata(&self) -> impl Iterator<Item = Option<&[FieldDescriptor]>> {
        self.metadata.iter().map(|m| m.as_deref())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
