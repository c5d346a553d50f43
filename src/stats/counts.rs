//! Categorical counters keyed by multiplicity.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use serde::Serialize;

use crate::stats::classify::Classification;
use crate::stats::grouping::ReadGroup;

/// A table from multiplicity (the number of alignments for a read or mate) to
/// a tally.
pub type MultiplicityTable<T> = BTreeMap<usize, T>;

/// Sums every bucket of a table except the unique (multiplicity one) bucket.
pub fn multi<T>(table: &MultiplicityTable<T>) -> T
where
    T: Copy + Default + AddAssign,
{
    let mut total = T::default();

    for (_, value) in table.iter().filter(|(nh, _)| **nh != 1) {
        total += *value;
    }

    total
}

/// The unique (multiplicity one) bucket of a table.
pub fn unique<T>(table: &MultiplicityTable<T>) -> T
where
    T: Copy + Default,
{
    table.get(&1).copied().unwrap_or_default()
}

fn add_tables<T>(into: &mut MultiplicityTable<T>, from: MultiplicityTable<T>)
where
    T: Default + AddAssign,
{
    for (nh, value) in from {
        *into.entry(nh).or_default() += value;
    }
}

/// The categorical counters for the mapping statistics of a run.
///
/// Spliced and unspliced tallies are weighted differently for each mode: mates
/// of a pair contribute `1 / NH` of a unit per record while unpaired reads
/// contribute a whole unit per record, keyed by `NH` either way.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MappingCounts {
    /// Proper pairs by the shared multiplicity of their mates.
    pub proper_pairs: MultiplicityTable<u64>,

    /// Pairs that are not proper, by the larger multiplicity of their mates.
    pub not_proper_pairs: MultiplicityTable<u64>,

    /// Mapped records of unpaired reads, by the multiplicity of the read.
    pub unpaired: MultiplicityTable<u64>,

    /// Pairs for which neither mate is mapped.
    pub unaligned_pairs: u64,

    /// Unpaired reads which are not mapped.
    pub unaligned_unpaired: u64,

    /// Spliced alignments by multiplicity.
    pub spliced: MultiplicityTable<f64>,

    /// Unspliced alignments by multiplicity.
    pub unspliced: MultiplicityTable<f64>,

    /// Read length distribution, weighted by `1 / NH` for multimapping reads.
    pub read_lengths: BTreeMap<usize, f64>,
}

impl MappingCounts {
    /// Creates an empty set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates the counters with a classified read group.
    pub fn update(&mut self, group: &ReadGroup, classification: &Classification) {
        match classification {
            Classification::Paired {
                nh1,
                nh2,
                is_proper_pair,
                ..
            } => self.update_paired(group, *nh1, *nh2, *is_proper_pair),
            Classification::Unpaired {
                nh, is_unaligned, ..
            } => self.update_unpaired(group, *nh, *is_unaligned),
        }
    }

    fn splicing(&mut self, spliced: bool, nh: usize, weight: f64) {
        let table = if spliced {
            &mut self.spliced
        } else {
            &mut self.unspliced
        };

        *table.entry(nh).or_default() += weight;
    }

    fn update_paired(&mut self, group: &ReadGroup, nh1: usize, nh2: usize, is_proper_pair: bool) {
        if is_proper_pair {
            if nh1 == 0 {
                self.unaligned_pairs += 1;
            } else {
                *self.proper_pairs.entry(nh1).or_default() += 1;
            }
        } else {
            *self.not_proper_pairs.entry(nh1.max(nh2)).or_default() += 1;
        }

        for record in &group.records {
            let flags = record.flags();
            let spliced = record.is_spliced();

            if flags.first_in_pair && nh1 > 0 {
                self.splicing(spliced, nh1, 1.0 / nh1 as f64);
            }

            if flags.second_in_pair && nh2 > 0 {
                self.splicing(spliced, nh2, 1.0 / nh2 as f64);
            }

            // Every record of a pair registers its length, even when it does
            // not contribute any weight to it.
            let length = self
                .read_lengths
                .entry(record.sequence_length())
                .or_default();

            if !flags.unmapped {
                if flags.first_in_pair {
                    *length += 1.0 / nh1 as f64;
                } else if flags.second_in_pair {
                    *length += 1.0 / nh2 as f64;
                }
            }
        }
    }

    fn update_unpaired(&mut self, group: &ReadGroup, nh: usize, is_unaligned: bool) {
        if is_unaligned {
            self.unaligned_unpaired += 1;
            return;
        }

        for record in &group.records {
            *self
                .read_lengths
                .entry(record.sequence_length())
                .or_default() += 1.0 / nh as f64;
            *self.unpaired.entry(nh).or_default() += 1;
            self.splicing(record.is_spliced(), nh, 1.0);
        }
    }
}

impl AddAssign for MappingCounts {
    fn add_assign(&mut self, other: Self) {
        add_tables(&mut self.proper_pairs, other.proper_pairs);
        add_tables(&mut self.not_proper_pairs, other.not_proper_pairs);
        add_tables(&mut self.unpaired, other.unpaired);
        self.unaligned_pairs += other.unaligned_pairs;
        self.unaligned_unpaired += other.unaligned_unpaired;
        add_tables(&mut self.spliced, other.spliced);
        add_tables(&mut self.unspliced, other.unspliced);
        add_tables(&mut self.read_lengths, other.read_lengths);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::classify::classify;
    use crate::utils::records::RecordView;

    fn counts_for(groups: &[&[&str]]) -> MappingCounts {
        let mut counts = MappingCounts::new();

        for lines in groups {
            let records: Vec<RecordView> = lines
                .iter()
                .map(|line| RecordView::parse(line, 1).unwrap())
                .collect();
            let group = ReadGroup {
                read_id: records[0].read_id().to_string(),
                records,
            };
            let classification = classify(&group).unwrap();
            counts.update(&group, &classification);
        }

        counts
    }

    #[test]
    fn test_unique_proper_pair() {
        let counts = counts_for(&[&[
            "p\t99\tchr1\t100\t60\t2M100N2M\t=\t200\t150\tACGT\t*",
            "p\t147\tchr1\t200\t60\t6M\t=\t100\t-150\tACGTAC\t*",
        ]]);

        assert_eq!(unique(&counts.proper_pairs), 1);
        assert_eq!(multi(&counts.proper_pairs), 0);
        assert_eq!(unique(&counts.spliced), 1.0);
        assert_eq!(unique(&counts.unspliced), 1.0);
        assert_eq!(counts.read_lengths.get(&4), Some(&1.0));
        assert_eq!(counts.read_lengths.get(&6), Some(&1.0));
    }

    #[test]
    fn test_multimapping_pair_is_weighted() {
        let counts = counts_for(&[&[
            "p\t67\tchr1\t100\t0\t4M\t=\t200\t104\tACGT\t*",
            "p\t131\tchr1\t200\t0\t4M\t=\t100\t-104\tTTTT\t*",
            "p\t323\tchr9\t100\t0\t4M\t=\t200\t104\t*\t*",
            "p\t387\tchr9\t200\t0\t4M\t=\t100\t-104\t*\t*",
        ]]);

        assert_eq!(unique(&counts.proper_pairs), 0);
        assert_eq!(counts.proper_pairs.get(&2), Some(&1));
        assert_eq!(multi(&counts.proper_pairs), 1);
        assert_eq!(counts.unspliced.get(&2), Some(&2.0));
        assert_eq!(counts.read_lengths.get(&4), Some(&1.0));
        assert_eq!(counts.read_lengths.get(&0), Some(&1.0));
    }

    #[test]
    fn test_not_proper_pair_uses_larger_multiplicity() {
        let counts = counts_for(&[&[
            "p\t65\tchr1\t100\t0\t4M\tchr2\t50\t0\tACGT\t*",
            "p\t321\tchr3\t900\t0\t4M\tchr2\t50\t0\t*\t*",
            "p\t129\tchr2\t50\t0\t4M\tchr1\t100\t0\tTTTT\t*",
        ]]);

        assert_eq!(counts.not_proper_pairs.get(&2), Some(&1));
        assert_eq!(multi(&counts.not_proper_pairs), 1);
        assert_eq!(unique(&counts.not_proper_pairs), 0);
    }

    #[test]
    fn test_unaligned_reads_and_pairs() {
        let counts = counts_for(&[
            &[
                "p\t77\t*\t0\t0\t*\t*\t0\t0\tACGT\t*",
                "p\t141\t*\t0\t0\t*\t*\t0\t0\tTTTT\t*",
            ],
            &["r\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\t*"],
        ]);

        assert_eq!(counts.unaligned_pairs, 1);
        assert_eq!(counts.unaligned_unpaired, 1);
        assert!(counts.proper_pairs.is_empty());
        assert!(counts.spliced.is_empty() && counts.unspliced.is_empty());
        // Records of a pair register their length without any weight.
        assert_eq!(counts.read_lengths.get(&4), Some(&0.0));
    }

    #[test]
    fn test_unpaired_multimapping_counts_whole_units() {
        let counts = counts_for(&[
            &[
                "r\t0\tchr2\t1000\t1\t4M\t*\t0\t0\tACGT\t*",
                "r\t256\tchr5\t10\t1\t2M50N2M\t*\t0\t0\tACGT\t*",
            ],
            &["s\t0\tchr2\t5\t60\t4M\t*\t0\t0\tACGT\t*"],
        ]);

        assert_eq!(unique(&counts.unpaired), 1);
        assert_eq!(counts.unpaired.get(&2), Some(&2));
        assert_eq!(counts.spliced.get(&2), Some(&1.0));
        assert_eq!(counts.unspliced.get(&2), Some(&1.0));
        assert_eq!(unique(&counts.unspliced), 1.0);
        assert_eq!(counts.read_lengths.get(&4), Some(&2.0));
    }

    #[test]
    fn test_merge_adds_elementwise() {
        let a = counts_for(&[&["s\t0\tchr2\t5\t60\t4M\t*\t0\t0\tACGT\t*"]]);
        let b = counts_for(&[
            &["t\t0\tchr2\t9\t60\t4M\t*\t0\t0\tACGT\t*"],
            &["u\t4\t*\t0\t0\t*\t*\t0\t0\tACGT\t*"],
        ]);

        let mut merged = a.clone();
        merged += b.clone();

        let mut reversed = b;
        reversed += a;

        assert_eq!(merged, reversed);
        assert_eq!(unique(&merged.unpaired), 2);
        assert_eq!(merged.unaligned_unpaired, 1);
        assert_eq!(merged.read_lengths.get(&4), Some(&2.0));
    }
}
