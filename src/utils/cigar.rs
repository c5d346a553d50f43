//! Utilities related to CIGAR string processing.

use noodles::sam::record::cigar::op::Kind;
use noodles::sam::record::Cigar;

/// Parses a CIGAR string. An unavailable CIGAR (`*`) is `None`.
pub fn parse(raw: &str) -> Result<Option<Cigar>, String> {
    if raw == "*" {
        return Ok(None);
    }

    raw.parse::<Cigar>()
        .map(Some)
        .map_err(|e| format!("invalid CIGAR '{}': {}", raw, e))
}

/// Reports whether a CIGAR contains at least one skipped region of the
/// reference (an intron, for spliced alignments).
pub fn is_spliced(cigar: &Cigar) -> bool {
    cigar.iter().any(|op| matches!(op.kind(), Kind::Skip))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spliced(raw: &str) -> bool {
        parse(raw).unwrap().map_or(false, |cigar| is_spliced(&cigar))
    }

    #[test]
    fn test_spliced_cigars() {
        assert!(spliced("20M1000N30M"));
        assert!(spliced("5S10M200N35M"));
    }

    #[test]
    fn test_unspliced_cigars() {
        assert!(!spliced("50M"));
        assert!(!spliced("10M2D38M2I"));
        assert!(!spliced("*"));
    }

    #[test]
    fn test_invalid_cigars_are_rejected() {
        assert!(parse("N").is_err());
        assert!(parse("xyzN").is_err());
        assert!(parse("10Q5N").is_err());
    }
}
