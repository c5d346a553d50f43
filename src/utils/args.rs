//! Utilities related to the parsing of arguments.

use tracing::debug;

//===================//
// Number of Records //
//===================//

/// Utility enum to designate whether we are reviewing all records in the file
/// or just some of them.
pub enum NumberOfRecords {
    /// Designates that we should review _all_ of the records in the file.
    All,

    /// Designates that we should review _some_ of the records in the file. The
    /// exact count of records is stored in the `usize`.
    Some(usize),
}

impl From<Option<usize>> for NumberOfRecords {
    fn from(num_records: Option<usize>) -> Self {
        match num_records {
            Some(n) => {
                debug!("Reading a maximum of {} records.", n);
                NumberOfRecords::Some(n)
            }
            None => {
                debug!("Reading all available records.");
                NumberOfRecords::All
            }
        }
    }
}

//=============//
// Window size //
//=============//

/// Utility method to parse the grouping window passed in on the command line
/// and ensure it holds at least one read.
pub fn window_in_range(window_raw: &str) -> Result<usize, String> {
    let window: usize = window_raw
        .parse()
        .map_err(|_| format!("{} isn't a positive integer", window_raw))?;

    match window >= 1 {
        true => Ok(window),
        false => Err(String::from("The window must hold at least one read")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_in_range() {
        assert_eq!(window_in_range("1"), Ok(1));
        assert_eq!(window_in_range("100000"), Ok(100_000));
        assert!(window_in_range("0").is_err());
        assert!(window_in_range("-3").is_err());
        assert!(window_in_range("many").is_err());
    }
}
