//! Bounded, deduplicated draw history
//!
//! Records are kept sorted by issue id, oldest at the front. Reads hand out
//! newest-first copies. Inserting an issue id that is already present is a
//! no-op, and overflow drops the oldest records.

use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

use crate::domain::{DrawRecord, IssueId};
use crate::error::Result;
use crate::persistence::ByteStore;

#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    records: VecDeque<DrawRecord>,
    ids: HashSet<IssueId>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            ids: HashSet::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, issue: &IssueId) -> bool {
        self.ids.contains(issue)
    }

    pub fn get(&self, issue: &IssueId) -> Option<&DrawRecord> {
        if !self.ids.contains(issue) {
            return None;
        }
        self.records.iter().rev().find(|r| &r.issue == issue)
    }

    /// Most recent draw
    pub fn newest(&self) -> Option<&DrawRecord> {
        self.records.back()
    }

    /// Newest-first iterator over every retained draw
    pub fn iter_newest_first(&self) -> impl Iterator<Item = &DrawRecord> {
        self.records.iter().rev()
    }

    /// Insert every record whose issue id is not yet present.
    ///
    /// Returns how many records were actually retained. A record older than
    /// everything in a full buffer is skipped, since it would be evicted at once.
    pub fn ingest<I>(&mut self, batch: I) -> usize
    where
        I: IntoIterator<Item = DrawRecord>,
    {
        let mut inserted = 0;

        for record in batch {
            if self.ids.contains(&record.issue) {
                continue;
            }

            if self.records.len() >= self.capacity {
                match self.records.front() {
                    Some(oldest) if record.issue < oldest.issue => {
                        debug!(issue = %record.issue, "skipping draw older than retained window");
                        continue;
                    }
                    _ => {}
                }
            }

            let pos = self.records.partition_point(|r| r.issue < record.issue);
            self.ids.insert(record.issue.clone());
            self.records.insert(pos, record);
            inserted += 1;

            while self.records.len() > self.capacity {
                if let Some(evicted) = self.records.pop_front() {
                    self.ids.remove(&evicted.issue);
                }
            }
        }

        inserted
    }

    /// Up to `limit` most recent draws, newest first
    pub fn snapshot(&self, limit: usize) -> Vec<DrawRecord> {
        self.records.iter().rev().take(limit).cloned().collect()
    }

    /// Write the whole buffer, newest first, as a JSON array
    pub fn persist(&self, store: &dyn ByteStore) -> Result<()> {
        let all: Vec<&DrawRecord> = self.iter_newest_first().collect();
        let bytes = serde_json::to_vec(&all)?;
        store.save(&bytes)
    }

    /// Rebuild a buffer from a store.
    ///
    /// Never fails: a missing, unreadable or non-array document yields an empty
    /// buffer, and malformed entries inside an array are skipped.
    pub fn restore(store: &dyn ByteStore, capacity: usize) -> Self {
        let mut buffer = Self::new(capacity);

        let bytes = match store.load() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!(store = %store.describe(), "no saved history, starting empty");
                return buffer;
            }
            Err(e) => {
                warn!(store = %store.describe(), error = %e, "failed to read history, starting empty");
                return buffer;
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_slice(&bytes) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(store = %store.describe(), error = %e, "corrupt history document, starting empty");
                return buffer;
            }
        };

        let total = entries.len();
        let mut records = Vec::with_capacity(total);
        let mut rejected = 0usize;
        for entry in entries {
            match DrawRecord::try_from(entry) {
                Ok(record) => records.push(record),
                Err(e) => {
                    rejected += 1;
                    debug!(error = %e, "dropping malformed saved draw");
                }
            }
        }

        let inserted = buffer.ingest(records);
        if rejected > 0 {
            warn!(rejected, total, "skipped malformed entries in saved history");
        }
        info!(
            store = %store.describe(),
            restored = inserted,
            "history restored"
        );
        buffer
    }
}
