//! Grouping of alignment records by read identifier within a bounded
//! look-ahead window.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::trace;

use crate::errors::Error;
use crate::errors::Result;
use crate::utils::records::RecordView;

/// All of the alignment records sharing one read identifier, in arrival order.
#[derive(Clone, Debug)]
pub struct ReadGroup {
    /// The shared read identifier.
    pub read_id: String,

    /// The records for the read, in the order they were encountered.
    pub records: Vec<RecordView>,
}

/// Groups records by read identifier, holding at most `capacity` distinct
/// identifiers at once.
///
/// When a record with a new identifier arrives and the window is already full,
/// every pending group is flushed (in first-seen order) before the new
/// identifier is admitted. Records for an identifier must therefore be
/// contiguous within the window: an identifier that shows up again after its
/// group was flushed is an [`Error::OrderingViolation`], however many windows
/// later it appears. Every flushed identifier is therefore remembered for the
/// lifetime of the window.
#[derive(Debug)]
pub struct ReadGroupWindow {
    capacity: usize,
    pending: IndexMap<String, Vec<RecordView>>,
    flushed_ids: HashSet<String>,
}

impl ReadGroupWindow {
    /// Creates a new [`ReadGroupWindow`]. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);

        ReadGroupWindow {
            capacity,
            pending: IndexMap::with_capacity(capacity),
            flushed_ids: HashSet::new(),
        }
    }

    /// The maximum number of distinct identifiers held at once.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Adds a record to the window. Returns the groups that had to be flushed
    /// to make room for it (usually none).
    pub fn push(&mut self, record: RecordView) -> Result<Vec<ReadGroup>> {
        if let Some(records) = self.pending.get_mut(record.read_id()) {
            records.push(record);
            return Ok(Vec::new());
        }

        if self.flushed_ids.contains(record.read_id()) {
            return Err(Error::OrderingViolation {
                read_id: record.read_id().to_string(),
                reason: String::from(
                    "records for this read were seen again after its group was closed; \
                    the input must be grouped by read identifier (consider a larger window)",
                ),
                records: vec![record.raw().to_string()],
            });
        }

        let flushed = if self.pending.len() >= self.capacity {
            self.flush()
        } else {
            Vec::new()
        };

        self.pending
            .insert(record.read_id().to_string(), vec![record]);

        Ok(flushed)
    }

    /// Closes and returns every pending group, in first-seen order.
    pub fn flush(&mut self) -> Vec<ReadGroup> {
        trace!("Flushing {} read groups.", self.pending.len());

        let flushed_ids = &mut self.flushed_ids;

        self.pending
            .drain(..)
            .map(|(read_id, records)| {
                flushed_ids.insert(read_id.clone());
                ReadGroup { read_id, records }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(read_id: &str) -> RecordView {
        let line = format!("{}\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\tIIII", read_id);
        RecordView::parse(&line, 1).unwrap()
    }

    fn ids(groups: &[ReadGroup]) -> Vec<(&str, usize)> {
        groups
            .iter()
            .map(|g| (g.read_id.as_str(), g.records.len()))
            .collect()
    }

    #[test]
    fn test_window_of_one_groups_contiguous_records() {
        let mut window = ReadGroupWindow::new(1);
        assert!(window.push(record("a")).unwrap().is_empty());
        assert!(window.push(record("a")).unwrap().is_empty());

        let flushed = window.push(record("b")).unwrap();
        assert_eq!(ids(&flushed), vec![("a", 2)]);

        let flushed = window.flush();
        assert_eq!(ids(&flushed), vec![("b", 1)]);
        assert!(window.flush().is_empty());
    }

    #[test]
    fn test_window_flushes_in_first_seen_order() {
        let mut window = ReadGroupWindow::new(2);
        window.push(record("b")).unwrap();
        window.push(record("a")).unwrap();
        window.push(record("b")).unwrap();

        let flushed = window.push(record("c")).unwrap();
        assert_eq!(ids(&flushed), vec![("b", 2), ("a", 1)]);
        assert_eq!(ids(&window.flush()), vec![("c", 1)]);
    }

    #[test]
    fn test_interleaved_records_within_window_are_grouped() {
        let mut window = ReadGroupWindow::new(3);
        for id in ["a", "b", "a", "c", "b"] {
            assert!(window.push(record(id)).unwrap().is_empty());
        }

        let flushed = window.flush();
        assert_eq!(ids(&flushed), vec![("a", 2), ("b", 2), ("c", 1)]);
    }

    #[test]
    fn test_reappearing_identifier_is_an_ordering_violation() {
        let mut window = ReadGroupWindow::new(1);
        window.push(record("a")).unwrap();
        window.push(record("b")).unwrap();

        let err = window.push(record("a")).unwrap_err();
        match err {
            Error::OrderingViolation { read_id, .. } => assert_eq!(read_id, "a"),
            _ => panic!("expected an ordering violation"),
        }
    }

    #[test]
    fn test_identifier_reappearing_windows_later_is_an_ordering_violation() {
        let mut window = ReadGroupWindow::new(1);
        for id in ["a", "b", "c"] {
            window.push(record(id)).unwrap();
        }

        let err = window.push(record("a")).unwrap_err();
        assert!(matches!(err, Error::OrderingViolation { read_id, .. } if read_id == "a"));
    }

    #[test]
    fn test_zero_capacity_is_treated_as_one() {
        let window = ReadGroupWindow::new(0);
        assert_eq!(window.capacity(), 1);
    }
}
