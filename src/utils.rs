//! Utilities that are used across the `samstats` subcommands.

pub mod args;
pub mod cigar;
pub mod display;
pub mod flags;
pub mod formats;
pub mod records;
