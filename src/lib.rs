//! `samstats` computes summary mapping statistics over alignment records in
//! the SAM text format. This package is composed of both a library crate, as
//! well as a binary crate.
//!
//! Two modes are offered:
//!
//! * [`stats`] groups the alignments of each read (or read pair) with a
//!   bounded look-ahead window, classifies each group and reports counts of
//!   unique, multimapping, unaligned and spliced reads alongside library
//!   complexity metrics (PBC1, PBC2 and NRF).
//! * [`flagstat`] reports the thirteen standard flagstat categories counted
//!   once per read rather than once per alignment.
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]

pub mod errors;
pub mod flagstat;
pub mod stats;
pub mod utils;

pub use errors::Error;
pub use errors::Result;
