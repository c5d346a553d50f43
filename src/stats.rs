//! Mapping statistics and library complexity over alignment records.

pub mod classify;
pub mod command;
pub mod complexity;
pub mod compute;
pub mod counts;
pub mod grouping;
pub mod results;
