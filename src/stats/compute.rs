//! Module holding the logic for computing mapping statistics and library
//! complexity over a stream of alignment records.

use std::ops::AddAssign;

use tracing::debug;

use crate::errors::Result;
use crate::stats::classify::classify;
use crate::stats::classify::Classification;
use crate::stats::complexity::ComplexityTracker;
use crate::stats::counts::MappingCounts;
use crate::stats::grouping::ReadGroup;
use crate::stats::grouping::ReadGroupWindow;
use crate::stats::results::MappingStatsResult;
use crate::utils::records::RecordView;

/// An alignment retained for pass-through output, along with the number of
/// alignments computed for its read (or mate), when known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnnotatedRecord {
    /// The original alignment line.
    pub line: String,

    /// The multiplicity of the read (or mate) the alignment belongs to.
    pub nh: Option<usize>,
}

impl AnnotatedRecord {
    /// Renders the record, appending an `NH:i` tag when requested and a
    /// multiplicity is known.
    pub fn render(&self, add_nh: bool) -> String {
        match (add_nh, self.nh) {
            (true, Some(nh)) => format!("{}\tNH:i:{}", self.line, nh),
            _ => self.line.clone(),
        }
    }
}

/// Every counter accumulated over a run. States computed over partitions of
/// the input that never split a read's records can be merged with `+=`.
#[derive(Clone, Debug, Default)]
pub struct MappingState {
    /// The categorical counters.
    pub counts: MappingCounts,

    /// The library complexity tracker.
    pub complexity: ComplexityTracker,
}

impl MappingState {
    /// Creates an empty [`MappingState`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies a closed read group and folds it into the counters.
    pub fn consume(&mut self, group: &ReadGroup) -> Result<Classification> {
        let classification = classify(group)?;

        if let Some(key) = classification.unique_position() {
            self.complexity.observe(key.clone());
        }

        self.counts.update(group, &classification);
        Ok(classification)
    }

    /// Computes the reported statistics from the current counters.
    pub fn finalize(&self) -> MappingStatsResult {
        MappingStatsResult::new(&self.counts, self.complexity.summary())
    }
}

impl AddAssign for MappingState {
    fn add_assign(&mut self, other: Self) {
        self.counts += other.counts;
        self.complexity += other.complexity;
    }
}

/// Lists the alignments of a classified group that are passed through, with
/// their multiplicities. Unmapped records are never passed through.
pub fn annotate(group: ReadGroup, classification: &Classification) -> Vec<AnnotatedRecord> {
    group
        .records
        .into_iter()
        .filter(|record| !record.flags().unmapped)
        .map(|record| {
            let flags = record.flags();

            let nh = match classification {
                Classification::Paired { nh1, nh2, .. } => {
                    if flags.first_in_pair {
                        Some(*nh1)
                    } else if flags.second_in_pair {
                        Some(*nh2)
                    } else {
                        None
                    }
                }
                Classification::Unpaired { nh, .. } => Some(*nh),
            };

            AnnotatedRecord {
                line: record.raw().to_string(),
                nh,
            }
        })
        .collect()
}

/// The mapping statistics engine: groups incoming records by read identifier
/// and folds each closed group into a [`MappingState`].
#[derive(Debug)]
pub struct MappingStatsEngine {
    window: ReadGroupWindow,
    state: MappingState,
    pass_through: bool,
}

impl MappingStatsEngine {
    /// Creates a new engine that holds up to `window` read identifiers at once.
    /// When `pass_through` is set, the alignments of each closed group are
    /// returned for output.
    pub fn new(window: usize, pass_through: bool) -> Self {
        let window = ReadGroupWindow::new(window);

        debug!(
            "Grouping alignments with a window of {} read(s); pass through: {}.",
            window.capacity(),
            pass_through
        );

        MappingStatsEngine {
            window,
            state: MappingState::new(),
            pass_through,
        }
    }

    fn consume_all(&mut self, groups: Vec<ReadGroup>) -> Result<Vec<AnnotatedRecord>> {
        let mut emitted = Vec::new();

        for group in groups {
            let classification = self.state.consume(&group)?;

            if self.pass_through {
                emitted.extend(annotate(group, &classification));
            }
        }

        Ok(emitted)
    }

    /// Adds one record. Returns the alignments released for pass-through
    /// output as a consequence (always empty when pass-through is disabled).
    pub fn process(&mut self, record: RecordView) -> Result<Vec<AnnotatedRecord>> {
        let flushed = self.window.push(record)?;
        self.consume_all(flushed)
    }

    /// Closes every pending group. Returns the final state along with any
    /// alignments released for pass-through output.
    pub fn finish(mut self) -> Result<(MappingState, Vec<AnnotatedRecord>)> {
        let flushed = self.window.flush();
        let emitted = self.consume_all(flushed)?;
        Ok((self.state, emitted))
    }
}
