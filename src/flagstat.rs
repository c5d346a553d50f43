//! Per-read flagstat counts over alignment records sorted by read name.

pub mod command;
pub mod compute;
pub mod results;
