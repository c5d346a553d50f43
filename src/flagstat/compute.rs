//! Module holding the logic for computing per-read flagstat counts over a file
//! sorted by read identifier.
//!
//! Unlike a naive per-line count, every category is computed once per *read*:
//! the category values of all alignments of a read are OR-combined before
//! being added to the totals. A read is identified by its name together with
//! its sequence, so that the two mates of a pair count as two reads.

use std::ops::AddAssign;

use serde::Serialize;

use crate::utils::records::RecordView;
use crate::utils::records::MISSING;

/// The number of flagstat categories.
pub const NUM_CATEGORIES: usize = 13;

/// The flagstat categories, in reporting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    /// Every read.
    Total = 0,
    /// Reads with a secondary alignment.
    Secondary,
    /// Reads with a supplementary alignment.
    Supplementary,
    /// Reads marked as duplicates.
    Duplicates,
    /// Reads with at least one mapped alignment.
    Mapped,
    /// Primary reads paired in sequencing.
    PairedInSequencing,
    /// Primary first mates.
    Read1,
    /// Primary last mates.
    Read2,
    /// Primary mapped reads flagged as properly paired.
    ProperlyPaired,
    /// Primary reads mapped with their mate mapped.
    WithItselfAndMateMapped,
    /// Primary reads mapped with their mate unmapped.
    Singletons,
    /// Primary reads whose mate maps to a different reference sequence.
    MateOnDifferentChromosome,
    /// As [`Category::MateOnDifferentChromosome`], with a mapping quality of at
    /// least five.
    MateOnDifferentChromosomeQ5,
}

impl Category {
    /// Every category, in reporting order.
    pub const ALL: [Category; NUM_CATEGORIES] = [
        Category::Total,
        Category::Secondary,
        Category::Supplementary,
        Category::Duplicates,
        Category::Mapped,
        Category::PairedInSequencing,
        Category::Read1,
        Category::Read2,
        Category::ProperlyPaired,
        Category::WithItselfAndMateMapped,
        Category::Singletons,
        Category::MateOnDifferentChromosome,
        Category::MateOnDifferentChromosomeQ5,
    ];

    /// The label printed for the category.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Total => "in total",
            Category::Secondary => "secondary",
            Category::Supplementary => "supplementary",
            Category::Duplicates => "duplicates",
            Category::Mapped => "mapped",
            Category::PairedInSequencing => "paired in sequencing",
            Category::Read1 => "read1",
            Category::Read2 => "read2",
            Category::ProperlyPaired => "properly paired",
            Category::WithItselfAndMateMapped => "with itself and mate mapped",
            Category::Singletons => "singletons",
            Category::MateOnDifferentChromosome => "with mate mapped to a different chr",
            Category::MateOnDifferentChromosomeQ5 => {
                "with mate mapped to a different chr (mapQ>=5)"
            }
        }
    }
}

/// The category values of one alignment (or, OR-combined, of one read).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReadCategories {
    values: [bool; NUM_CATEGORIES],
    primary: bool,
}

impl ReadCategories {
    /// Computes the category values of a single alignment. The pairing
    /// categories are only set for primary alignments.
    pub fn from_record(record: &RecordView) -> Self {
        let flags = record.flags();
        let primary = flags.is_primary();
        let mapped = !flags.unmapped;
        let paired = flags.paired && primary;
        let both_mapped = paired && mapped && !flags.mate_unmapped;
        let mate_elsewhere =
            both_mapped && record.mate_ref() != "=" && record.mate_ref() != record.ref_name();

        let mut values = [false; NUM_CATEGORIES];
        values[Category::Total as usize] = true;
        values[Category::Secondary as usize] = flags.secondary;
        values[Category::Supplementary as usize] = flags.supplementary;
        values[Category::Duplicates as usize] = flags.duplicate;
        values[Category::Mapped as usize] = mapped;
        values[Category::PairedInSequencing as usize] = paired;
        values[Category::Read1 as usize] = paired && flags.first_in_pair;
        values[Category::Read2 as usize] = paired && flags.second_in_pair;
        values[Category::ProperlyPaired as usize] = paired && mapped && flags.proper_pair;
        values[Category::WithItselfAndMateMapped as usize] = both_mapped;
        values[Category::Singletons as usize] = paired && mapped && flags.mate_unmapped;
        values[Category::MateOnDifferentChromosome as usize] = mate_elsewhere;
        values[Category::MateOnDifferentChromosomeQ5 as usize] =
            mate_elsewhere && record.mapq() >= 5;

        ReadCategories { values, primary }
    }

    /// Whether the category is set.
    pub fn get(&self, category: Category) -> bool {
        self.values[category as usize]
    }

    /// Whether any alignment was primary.
    pub fn is_primary(&self) -> bool {
        self.primary
    }

    /// OR-combines another set of category values into this one.
    pub fn combine(&mut self, other: &ReadCategories) {
        for (value, other) in self.values.iter_mut().zip(other.values.iter()) {
            *value |= *other;
        }

        self.primary |= other.primary;
    }
}

/// The per-category read totals for one QC class.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FlagstatCounts {
    /// The totals, indexed by [`Category`].
    pub counts: [u64; NUM_CATEGORIES],

    /// The number of reads with a primary alignment, used as the denominator
    /// for the reported ratios.
    pub primary: u64,
}

impl FlagstatCounts {
    /// The total for a category.
    pub fn get(&self, category: Category) -> u64 {
        self.counts[category as usize]
    }

    /// Adds one read's combined categories to the totals.
    pub fn add_read(&mut self, read: &ReadCategories) {
        for (count, set) in self.counts.iter_mut().zip(read.values.iter()) {
            *count += u64::from(*set);
        }

        self.primary += u64::from(read.primary);
    }

    /// The fraction of primary reads in the category, if there are any
    /// primary reads.
    pub fn ratio(&self, category: Category) -> Option<f64> {
        match self.primary {
            0 => None,
            n => Some(self.get(category) as f64 / n as f64),
        }
    }
}

impl AddAssign for FlagstatCounts {
    fn add_assign(&mut self, other: Self) {
        for (count, other) in self.counts.iter_mut().zip(other.counts.iter()) {
            *count += other;
        }

        self.primary += other.primary;
    }
}

/// Flagstat totals split by QC status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FlagstatTotals {
    /// Reads that passed QC.
    pub qc_passed: FlagstatCounts,

    /// Reads that failed QC.
    pub qc_failed: FlagstatCounts,
}

impl AddAssign for FlagstatTotals {
    fn add_assign(&mut self, other: Self) {
        self.qc_passed += other.qc_passed;
        self.qc_failed += other.qc_failed;
    }
}

/// The read currently being accumulated.
#[derive(Debug)]
struct CurrentRead {
    read_id: String,
    sequence: String,
    qc_passed: Option<ReadCategories>,
    qc_failed: Option<ReadCategories>,
}

impl CurrentRead {
    fn new(record: &RecordView) -> Self {
        CurrentRead {
            read_id: record.read_id().to_string(),
            sequence: record.sequence().to_string(),
            qc_passed: None,
            qc_failed: None,
        }
    }

    /// Whether the record belongs to this read. An omitted sequence (as is
    /// common for secondary alignments) matches any sequence.
    fn contains(&self, record: &RecordView) -> bool {
        record.read_id() == self.read_id
            && (record.sequence() == self.sequence
                || record.sequence() == MISSING
                || self.sequence == MISSING)
    }

    fn add(&mut self, record: &RecordView) {
        if self.sequence == MISSING {
            self.sequence = record.sequence().to_string();
        }

        let categories = ReadCategories::from_record(record);
        let slot = if record.flags().qc_fail {
            &mut self.qc_failed
        } else {
            &mut self.qc_passed
        };

        slot.get_or_insert_with(ReadCategories::default)
            .combine(&categories);
    }
}

/// Accumulates per-read flagstat totals from records sorted by read
/// identifier.
#[derive(Debug, Default)]
pub struct FlagstatAccumulator {
    current: Option<CurrentRead>,
    totals: FlagstatTotals,
    reads: u64,
}

impl FlagstatAccumulator {
    /// Creates a new, empty [`FlagstatAccumulator`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record. Records for one read must be adjacent.
    pub fn push(&mut self, record: &RecordView) {
        if let Some(current) = self.current.as_mut().filter(|c| c.contains(record)) {
            current.add(record);
            return;
        }

        self.close_current();

        let mut current = CurrentRead::new(record);
        current.add(record);
        self.current = Some(current);
    }

    fn close_current(&mut self) {
        if let Some(current) = self.current.take() {
            if let Some(read) = current.qc_passed {
                self.totals.qc_passed.add_read(&read);
            }

            if let Some(read) = current.qc_failed {
                self.totals.qc_failed.add_read(&read);
            }

            self.reads += 1;
        }
    }

    /// The number of distinct reads closed so far.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Closes the final read and returns the totals. Further calls return the
    /// same totals.
    pub fn finish(&mut self) -> FlagstatTotals {
        self.close_current();
        self.totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals(sam: &str) -> FlagstatTotals {
        let mut accumulator = FlagstatAccumulator::new();

        for (i, line) in sam.lines().enumerate() {
            accumulator.push(&RecordView::parse(line, i + 1).unwrap());
        }

        accumulator.finish()
    }

    #[test]
    fn test_read_with_multiple_alignments_counts_once() {
        let totals = totals(
            "\
r\t67\tchr1\t100\t60\t4M\t=\t200\t104\tACGT\t*
r\t325\t*\t0\t0\t*\t=\t200\t0\tACGT\t*
",
        );

        let pass = totals.qc_passed;
        assert_eq!(pass.get(Category::Total), 1);
        assert_eq!(pass.get(Category::Mapped), 1);
        assert_eq!(pass.get(Category::ProperlyPaired), 1);
        assert_eq!(pass.get(Category::Secondary), 1);
        assert_eq!(pass.get(Category::PairedInSequencing), 1);
        assert_eq!(pass.get(Category::Read1), 1);
        assert_eq!(pass.primary, 1);
        assert_eq!(totals.qc_failed, FlagstatCounts::default());
    }

    #[test]
    fn test_reads_are_counted_once_finished() {
        let mut accumulator = FlagstatAccumulator::new();

        for (i, line) in [
            "p\t99\tchr1\t100\t60\t4M\t=\t200\t104\tACGT\t*",
            "p\t355\tchr9\t100\t0\t4M\t=\t200\t104\t*\t*",
            "p\t147\tchr1\t200\t60\t4M\t=\t100\t-104\tGGCC\t*",
            "q\t4\t*\t0\t0\t*\t*\t0\t0\tTTTT\t*",
        ]
        .iter()
        .enumerate()
        {
            accumulator.push(&RecordView::parse(line, i + 1).unwrap());
        }

        assert_eq!(accumulator.reads(), 2);

        let totals = accumulator.finish();
        assert_eq!(accumulator.reads(), 3);
        assert_eq!(accumulator.finish(), totals);
    }

    #[test]
    fn test_mates_are_separate_reads() {
        let totals = totals(
            "\
p\t99\tchr1\t100\t60\t4M\t=\t200\t104\tACGT\t*
p\t147\tchr1\t200\t60\t4M\t=\t100\t-104\tGGCC\t*
p\t355\tchr9\t100\t0\t4M\t=\t200\t104\t*\t*
",
        );

        let pass = totals.qc_passed;
        assert_eq!(pass.get(Category::Total), 2);
        assert_eq!(pass.get(Category::Read1), 1);
        assert_eq!(pass.get(Category::Read2), 1);
        assert_eq!(pass.get(Category::ProperlyPaired), 2);
        assert_eq!(pass.get(Category::WithItselfAndMateMapped), 2);
        assert_eq!(pass.get(Category::Secondary), 1);
        assert_eq!(pass.get(Category::MateOnDifferentChromosome), 0);
    }

    #[test]
    fn test_pairing_categories_ignore_non_primary_alignments() {
        let totals = totals("s\t2369\tchr2\t50\t60\t4M\tchr3\t10\t0\tACGT\t*\n");

        let pass = totals.qc_passed;
        assert_eq!(pass.get(Category::Total), 1);
        assert_eq!(pass.get(Category::Supplementary), 1);
        assert_eq!(pass.get(Category::Mapped), 1);
        assert_eq!(pass.get(Category::PairedInSequencing), 0);
        assert_eq!(pass.get(Category::MateOnDifferentChromosome), 0);
        assert_eq!(pass.primary, 0);
        assert_eq!(pass.ratio(Category::Mapped), None);
    }

    #[test]
    fn test_singletons_and_mates_on_other_chromosomes() {
        let totals = totals(
            "\
a\t73\tchr1\t100\t60\t4M\t=\t100\t0\tACGT\t*
a\t133\tchr1\t100\t0\t*\t=\t100\t0\tTTTT\t*
b\t65\tchr1\t100\t3\t4M\tchr2\t50\t0\tACGT\t*
b\t129\tchr2\t50\t30\t4M\tchr1\t100\t0\tTTTT\t*
",
        );

        let pass = totals.qc_passed;
        assert_eq!(pass.get(Category::Total), 4);
        assert_eq!(pass.get(Category::Mapped), 3);
        assert_eq!(pass.get(Category::Singletons), 1);
        assert_eq!(pass.get(Category::WithItselfAndMateMapped), 2);
        assert_eq!(pass.get(Category::MateOnDifferentChromosome), 2);
        assert_eq!(pass.get(Category::MateOnDifferentChromosomeQ5), 1);
        assert_eq!(pass.ratio(Category::Mapped), Some(0.75));
        assert_eq!(pass.ratio(Category::Singletons), Some(0.25));
    }

    #[test]
    fn test_qc_failed_reads_are_counted_separately() {
        let totals = totals(
            "\
x\t512\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\t*
y\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\t*
z\t516\t*\t0\t0\t*\t*\t0\t0\tACGT\t*
",
        );

        assert_eq!(totals.qc_passed.get(Category::Total), 1);
        assert_eq!(totals.qc_failed.get(Category::Total), 2);
        assert_eq!(totals.qc_failed.get(Category::Mapped), 1);
        assert_eq!(totals.qc_failed.ratio(Category::Mapped), Some(0.5));
    }

    #[test]
    fn test_merge_is_elementwise_and_commutative() {
        let a = totals("x\t512\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\t*\n");
        let b = totals("y\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\t*\n");
        let whole = totals(
            "\
x\t512\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\t*
y\t0\tchr1\t100\t60\t4M\t*\t0\t0\tACGT\t*
",
        );

        let mut ab = a;
        ab += b;
        let mut ba = b;
        ba += a;

        assert_eq!(ab, whole);
        assert_eq!(ba, whole);

        let mut failed = a.qc_failed;
        failed += b.qc_failed;
        assert_eq!(failed, whole.qc_failed);
    }
}
