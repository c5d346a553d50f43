//! Utilities related to displaying things.

use std::fmt;

use num_format::Locale;
use num_format::ToFormattedString;
use tracing::info;

use crate::utils::args::NumberOfRecords;

/// Utility struct for displaying an optional ratio with three decimal places,
/// or `NA` when the ratio is not defined.
pub struct RatioFormat(pub Option<f64>);

impl fmt::Display for RatioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(ratio) => write!(f, "{:.3}", ratio),
            None => f.write_str("NA"),
        }
    }
}

/// Utility struct used to uniformly count and report the number of alignment
/// records processed.
pub struct RecordCounter {
    /// The number of records processed.
    count: usize,

    /// The number of records to log every.
    log_every: usize,
}

impl Default for RecordCounter {
    fn default() -> Self {
        RecordCounter::new(None)
    }
}

impl RecordCounter {
    /// Creates a new `RecordCounter`, logging every million records unless
    /// told otherwise.
    pub fn new(log_every: Option<usize>) -> Self {
        RecordCounter {
            count: 0,
            log_every: log_every.unwrap_or(1_000_000).max(1),
        }
    }

    /// Gets the current number of records counted.
    pub fn get(&self) -> usize {
        self.count
    }

    /// Increments the counter and reports the number of records processed (if
    /// appropriate).
    pub fn inc(&mut self) {
        self.count += 1;

        if self.count % self.log_every == 0 {
            info!(
                "  [*] Processed {} alignment records.",
                self.count.to_formatted_string(&Locale::en),
            );
        }
    }

    /// Whether the maximum number of records to process has been reached.
    pub fn time_to_break(&self, limit: &NumberOfRecords) -> bool {
        match limit {
            NumberOfRecords::Some(v) => self.count >= *v,
            NumberOfRecords::All => false,
        }
    }
}
