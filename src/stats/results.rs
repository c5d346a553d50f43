//! Module holding the results structs for the `samstats stats` subcommand.

use std::fmt::Display;

use serde::Serialize;

use crate::stats::complexity::ComplexitySummary;
use crate::stats::counts;
use crate::stats::counts::MappingCounts;

/// The placeholder reported for metrics which are not defined.
pub const NOT_APPLICABLE: &str = "NA";

/// Formats an optional metric, falling back to [`NOT_APPLICABLE`].
pub fn or_na<T: Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::from(NOT_APPLICABLE),
    }
}

/// Summary of the read length distribution.
#[derive(Debug, Serialize)]
pub struct ReadLengthResult {
    /// The shortest read length registered.
    pub minimum: Option<usize>,

    /// The longest read length registered.
    pub maximum: Option<usize>,

    /// The multiplicity-weighted average read length.
    pub average: Option<f64>,
}

impl ReadLengthResult {
    /// Summarises a weighted read length distribution.
    pub fn new(read_lengths: &std::collections::BTreeMap<usize, f64>) -> Self {
        let total_reads: f64 = read_lengths.values().sum();
        let total_length: f64 = read_lengths
            .iter()
            .map(|(length, weight)| *length as f64 * weight)
            .sum();

        let average = if total_reads > 0.0 {
            Some(total_length / total_reads)
        } else {
            None
        };

        ReadLengthResult {
            minimum: read_lengths.keys().next().copied(),
            maximum: read_lengths.keys().next_back().copied(),
            average,
        }
    }
}

/// Library complexity metrics, computed over uniquely mapping reads and pairs.
#[derive(Debug, Serialize)]
pub struct LibraryComplexityResult {
    /// Distinct positions.
    pub u_p: u64,

    /// Uniquely mapping reads or pairs.
    pub u_r: u64,

    /// Positions observed at least once.
    pub m0: u64,

    /// Positions observed exactly once.
    pub m1: u64,

    /// Positions observed exactly twice.
    pub m2: u64,

    /// PCR bottlenecking coefficient 1.
    pub pbc1: Option<f64>,

    /// PCR bottlenecking coefficient 2.
    pub pbc2: Option<f64>,

    /// Non-redundant fraction.
    pub nrf: Option<f64>,
}

impl From<ComplexitySummary> for LibraryComplexityResult {
    fn from(summary: ComplexitySummary) -> Self {
        LibraryComplexityResult {
            u_p: summary.u_p,
            u_r: summary.u_r,
            m0: summary.m0,
            m1: summary.m1,
            m2: summary.m2,
            pbc1: summary.pbc1(),
            pbc2: summary.pbc2(),
            nrf: summary.nrf(),
        }
    }
}

/// Struct holding the final results for a `samstats stats` subcommand call.
#[derive(Debug, Serialize)]
pub struct MappingStatsResult {
    /// Proper pairs in which both mates map uniquely.
    pub unique_proper_pairs: u64,

    /// Pairs that are not proper, with a largest mate multiplicity of one.
    pub unique_not_proper_pairs: u64,

    /// Uniquely mapping unpaired reads.
    pub unique_unpaired: u64,

    /// Proper pairs in which both mates map more than once.
    pub multiread_proper_pairs: u64,

    /// Pairs that are not proper, with a mate mapping more than once.
    pub multiread_not_proper_pairs: u64,

    /// Mapped records of multimapping unpaired reads.
    pub multiread_unpaired: u64,

    /// Pairs with neither mate mapped.
    pub unaligned_pairs: u64,

    /// Unmapped unpaired reads.
    pub unaligned_unpaired: u64,

    /// Spliced alignments of uniquely mapping reads.
    pub spliced_unique: u64,

    /// Spliced alignments of multimapping reads.
    pub spliced_multi: u64,

    /// Unspliced alignments of uniquely mapping reads.
    pub unspliced_unique: u64,

    /// Unspliced alignments of multimapping reads.
    pub unspliced_multi: u64,

    /// Read length summary.
    pub read_length: ReadLengthResult,

    /// Library complexity metrics.
    pub library_complexity: LibraryComplexityResult,
}

impl MappingStatsResult {
    /// Finalizes the counters of a run into the reported statistics.
    pub fn new(counts: &MappingCounts, complexity: ComplexitySummary) -> Self {
        MappingStatsResult {
            unique_proper_pairs: counts::unique(&counts.proper_pairs),
            unique_not_proper_pairs: counts::unique(&counts.not_proper_pairs),
            unique_unpaired: counts::unique(&counts.unpaired),
            multiread_proper_pairs: counts::multi(&counts.proper_pairs),
            multiread_not_proper_pairs: counts::multi(&counts.not_proper_pairs),
            multiread_unpaired: counts::multi(&counts.unpaired),
            unaligned_pairs: counts.unaligned_pairs,
            unaligned_unpaired: counts.unaligned_unpaired,
            spliced_unique: counts::unique(&counts.spliced) as u64,
            spliced_multi: counts::multi(&counts.spliced) as u64,
            unspliced_unique: counts::unique(&counts.unspliced) as u64,
            unspliced_multi: counts::multi(&counts.unspliced) as u64,
            read_length: ReadLengthResult::new(&counts.read_lengths),
            library_complexity: LibraryComplexityResult::from(complexity),
        }
    }

    /// The statistics as an ordered list of `(label, value)` pairs. A label
    /// with an empty value is a section heading.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let lc = &self.library_complexity;

        let pairs: Vec<(&str, String)> = vec![
            ("unique pairs, proper:", self.unique_proper_pairs.to_string()),
            (
                "unique pairs, not proper:",
                self.unique_not_proper_pairs.to_string(),
            ),
            ("unique unpaired reads:", self.unique_unpaired.to_string()),
            (
                "multiread pairs, proper:",
                self.multiread_proper_pairs.to_string(),
            ),
            (
                "multiread pairs, not proper:",
                self.multiread_not_proper_pairs.to_string(),
            ),
            ("multiread unpaired:", self.multiread_unpaired.to_string()),
            ("unaligned pairs:", self.unaligned_pairs.to_string()),
            ("unaligned unpaired reads:", self.unaligned_unpaired.to_string()),
            ("spliced unique reads:", self.spliced_unique.to_string()),
            ("spliced multireads:", self.spliced_multi.to_string()),
            ("unspliced unique reads:", self.unspliced_unique.to_string()),
            ("unspliced multireads:", self.unspliced_multi.to_string()),
            ("Read Length, Minimum:", or_na(self.read_length.minimum)),
            ("Read Length, Maximum:", or_na(self.read_length.maximum)),
            ("Read Length, Average:", or_na(self.read_length.average)),
            (
                "#Library complexity metrics (unique reads/pairs only):",
                String::new(),
            ),
            ("U_P", lc.u_p.to_string()),
            ("U_R", lc.u_r.to_string()),
            ("M_0", lc.m0.to_string()),
            ("M_1", lc.m1.to_string()),
            ("M_2", lc.m2.to_string()),
            ("PBC1", or_na(lc.pbc1)),
            ("PBC2", or_na(lc.pbc2)),
            ("NRF", or_na(lc.nrf)),
        ];

        pairs
            .into_iter()
            .map(|(label, value)| (label.to_string(), value))
            .collect()
    }
}
