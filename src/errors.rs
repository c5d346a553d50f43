//! Errors raised while computing statistics over alignment records.
//!
//! Every error here is fatal: the statistics are only meaningful after a
//! complete, ordered traversal of the input, so nothing is skipped and
//! processing stops at the first problem.

use tracing::error;

/// Shorthand for results returned by the statistics engines.
pub type Result<T> = std::result::Result<T, Error>;

/// The errors that can occur while computing statistics.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum Error {
    /// A line could not be decoded into an alignment record.
    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord {
        /// The 1-based line number of the offending line.
        line: usize,

        /// What was wrong with the line.
        reason: String,
    },

    /// The records for a read identifier were not grouped as required.
    #[error("ordering violation for read '{read_id}': {reason}\n{}", .records.join("\n"))]
    OrderingViolation {
        /// The offending read identifier.
        read_id: String,

        /// What was wrong with the grouping.
        reason: String,

        /// The raw records seen for the identifier, if any were retained.
        records: Vec<String>,
    },
}

/// Exit codes used by the `samstats` binary.
pub enum ExitCode {
    /// Indicates that invalid data was supplied to the given subcommand.
    InvalidInputData = 1,
}

/// Logs the message and exits the process with the given code.
pub fn exit<I>(message: I, code: ExitCode) -> !
where
    I: tracing::Value,
{
    error!(message);
    std::process::exit(code as i32);
}
