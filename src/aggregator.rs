use crate::stats::{Stats, compute_stats};
use crate::types::LogEntry;
use std::cmp::Ordering;

/// Merge new entries with an existing collection, most recent first.
///
/// New entries are placed ahead of existing ones before a stable sort, so equal
/// timestamps keep that order. Entries whose date cannot be parsed go last.
#[must_use]
pub fn aggregate(new_entries: Vec<LogEntry>, existing_entries: Vec<LogEntry>) -> Vec<LogEntry> {
    let mut merged = new_entries;
    merged.extend(existing_entries);

    let mut keyed: Vec<_> = merged.into_iter().map(|e| (e.timestamp(), e)).collect();
    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    keyed.into_iter().map(|(_, e)| e).collect()
}

/// Current collection, replaced wholesale on every ingest.
#[derive(Debug, Default, Clone)]
pub struct Session {
    entries: Vec<LogEntry>,
}

impl Session {
    #[must_use]
    pub fn new(existing: Vec<LogEntry>) -> Self {
        Session {
            entries: aggregate(Vec::new(), existing),
        }
    }

    pub fn ingest(&mut self, new_entries: Vec<LogEntry>) {
        let current = std::mem::take(&mut self.entries);
        self.entries = aggregate(new_entries, current);
    }

    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn stats(&self) -> Stats {
        compute_stats(&self.entries)
    }
}
