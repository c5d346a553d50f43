//! Classification of a read group's pairing and mapping status.

use serde::Serialize;

use crate::errors::Error;
use crate::errors::Result;
use crate::stats::grouping::ReadGroup;
use crate::utils::records::RecordView;

/// The strand-aware mapping position of a read (or pair) used to detect
/// duplicates. For unpaired reads, `pos1 == pos2`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PositionKey {
    /// The reference sequence name.
    pub chrom: String,

    /// The signed 5' position of the first mate (or of the read).
    pub pos1: i64,

    /// The signed 5' position of the second mate (or of the read, again).
    pub pos2: i64,
}

impl PositionKey {
    /// Creates a new [`PositionKey`].
    pub fn new(chrom: impl Into<String>, pos1: i64, pos2: i64) -> Self {
        PositionKey {
            chrom: chrom.into(),
            pos1,
            pos2,
        }
    }
}

/// The pairing and mapping status of one read group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Classification {
    /// A read pair.
    Paired {
        /// The number of mapped records for the first mate.
        nh1: usize,

        /// The number of mapped records for the second mate.
        nh2: usize,

        /// Whether neither mate reports its partner as unmapped and both
        /// mates map the same number of times.
        is_proper_pair: bool,

        /// The canonical position of the pair, if both mates are mapped.
        position_key: Option<PositionKey>,
    },

    /// A single-end read.
    Unpaired {
        /// The number of records for the read.
        nh: usize,

        /// Whether the read's only record is unmapped.
        is_unaligned: bool,

        /// The canonical position of the read, if it maps exactly once.
        position_key: Option<PositionKey>,
    },
}

impl Classification {
    /// Returns the position key to count towards library complexity, if the
    /// read (or proper pair) maps uniquely.
    pub fn unique_position(&self) -> Option<&PositionKey> {
        match self {
            Classification::Paired {
                nh1,
                is_proper_pair,
                position_key,
                ..
            } => {
                if *is_proper_pair && *nh1 == 1 {
                    position_key.as_ref()
                } else {
                    None
                }
            }
            Classification::Unpaired {
                nh,
                is_unaligned,
                position_key,
            } => {
                if !*is_unaligned && *nh == 1 {
                    position_key.as_ref()
                } else {
                    None
                }
            }
        }
    }
}

/// Classifies a read group. A group is paired-end if any of its records
/// carries the first or last segment bit.
pub fn classify(group: &ReadGroup) -> Result<Classification> {
    let paired = group
        .records
        .iter()
        .any(|r| r.flags().first_in_pair || r.flags().second_in_pair);

    if paired {
        Ok(classify_paired(group))
    } else {
        classify_unpaired(group)
    }
}

fn classify_paired(group: &ReadGroup) -> Classification {
    let mut nh1 = 0;
    let mut nh2 = 0;
    let mut first: Option<&RecordView> = None;
    let mut second: Option<&RecordView> = None;
    let mut is_proper_pair = true;

    for record in &group.records {
        let flags = record.flags();

        if flags.first_in_pair {
            if !flags.unmapped {
                nh1 += 1;
                first.get_or_insert(record);
            }
        } else if flags.second_in_pair && !flags.unmapped {
            nh2 += 1;
            second.get_or_insert(record);
        }

        if flags.is_mapped_with_unmapped_mate() {
            is_proper_pair = false;
        }
    }

    if nh1 != nh2 {
        is_proper_pair = false;
    }

    let position_key = match (first, second) {
        (Some(first), Some(second)) => Some(PositionKey::new(
            first.ref_name(),
            first.signed_position(),
            second.signed_position(),
        )),
        _ => None,
    };

    Classification::Paired {
        nh1,
        nh2,
        is_proper_pair,
        position_key,
    }
}

fn classify_unpaired(group: &ReadGroup) -> Result<Classification> {
    let nh = group.records.len();
    let has_unmapped = group.records.iter().any(|r| r.flags().unmapped);

    if has_unmapped && nh > 1 {
        return Err(Error::OrderingViolation {
            read_id: group.read_id.clone(),
            reason: format!(
                "read is unmapped but {} alignment records were found for it",
                nh
            ),
            records: group.records.iter().map(|r| r.raw().to_string()).collect(),
        });
    }

    let position_key = match group.records.as_slice() {
        [record] if !has_unmapped => Some(PositionKey::new(
            record.ref_name(),
            record.signed_position(),
            record.signed_position(),
        )),
        _ => None,
    };

    Ok(Classification::Unpaired {
        nh,
        is_unaligned: has_unmapped,
        position_key,
    })
}
