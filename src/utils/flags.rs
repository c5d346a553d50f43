//! Decoding of SAM alignment flags into named predicates.

use noodles::sam::record::Flags;
use serde::Serialize;

/// The largest flag value made up entirely of the twelve defined SAM flag bits.
pub const MAX_FLAG: u16 = 0xfff;

/// The decomposition of an alignment flag into its named predicates.
///
/// Bits outside of the twelve defined by the SAM format are dropped
/// during decoding. For any value in `[0, MAX_FLAG]`, [`FlagSet::bits`]
/// reproduces the decoded value exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FlagSet {
    /// 0x1: the template has multiple segments in sequencing.
    pub paired: bool,

    /// 0x2: each segment is properly aligned according to the aligner.
    pub proper_pair: bool,

    /// 0x4: the segment itself is unmapped.
    pub unmapped: bool,

    /// 0x8: the next segment in the template is unmapped.
    pub mate_unmapped: bool,

    /// 0x10: the sequence is reverse complemented.
    pub reverse_strand: bool,

    /// 0x20: the sequence of the next segment is reverse complemented.
    pub mate_reverse: bool,

    /// 0x40: the first segment in the template.
    pub first_in_pair: bool,

    /// 0x80: the last segment in the template.
    pub second_in_pair: bool,

    /// 0x100: a secondary alignment.
    pub secondary: bool,

    /// 0x200: the read did not pass platform/vendor quality checks.
    pub qc_fail: bool,

    /// 0x400: a PCR or optical duplicate.
    pub duplicate: bool,

    /// 0x800: a supplementary alignment.
    pub supplementary: bool,
}

impl FlagSet {
    /// Reconstructs the flag value from the predicates that are set.
    pub fn bits(&self) -> u16 {
        let predicates: [(bool, u16); 12] = [
            (self.paired, 0x1),
            (self.proper_pair, 0x2),
            (self.unmapped, 0x4),
            (self.mate_unmapped, 0x8),
            (self.reverse_strand, 0x10),
            (self.mate_reverse, 0x20),
            (self.first_in_pair, 0x40),
            (self.second_in_pair, 0x80),
            (self.secondary, 0x100),
            (self.qc_fail, 0x200),
            (self.duplicate, 0x400),
            (self.supplementary, 0x800),
        ];

        predicates
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, bit)| *bit)
            .sum()
    }

    /// Whether the alignment is the primary one for its read (neither
    /// secondary nor supplementary).
    pub fn is_primary(&self) -> bool {
        !self.secondary && !self.supplementary
    }

    /// Whether the record is mapped but reports its mate as unmapped.
    pub fn is_mapped_with_unmapped_mate(&self) -> bool {
        self.mate_unmapped && !self.unmapped
    }
}

impl From<Flags> for FlagSet {
    fn from(flags: Flags) -> Self {
        FlagSet {
            paired: flags.is_segmented(),
            proper_pair: flags.is_properly_aligned(),
            unmapped: flags.is_unmapped(),
            mate_unmapped: flags.is_mate_unmapped(),
            reverse_strand: flags.is_reverse_complemented(),
            mate_reverse: flags.is_mate_reverse_complemented(),
            first_in_pair: flags.is_first_segment(),
            second_in_pair: flags.is_last_segment(),
            secondary: flags.is_secondary(),
            qc_fail: flags.is_qc_fail(),
            duplicate: flags.is_duplicate(),
            supplementary: flags.is_supplementary(),
        }
    }
}

impl From<u16> for FlagSet {
    fn from(value: u16) -> Self {
        FlagSet::from(Flags::from(value & MAX_FLAG))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_flag_reconstructs_exactly() {
        for value in 0..=MAX_FLAG {
            assert_eq!(FlagSet::from(value).bits(), value);
        }
    }

    #[test]
    fn test_unknown_bits_are_ignored() {
        let flags = FlagSet::from(0x1000_u16 | 0x4);
        assert!(flags.unmapped);
        assert_eq!(flags.bits(), 0x4);
    }

    #[test]
    fn test_decodes_named_predicates() {
        // paired, proper, mate reverse, first in pair
        let flags = FlagSet::from(99_u16);
        assert!(flags.paired);
        assert!(flags.proper_pair);
        assert!(flags.mate_reverse);
        assert!(flags.first_in_pair);
        assert!(!flags.second_in_pair);
        assert!(!flags.reverse_strand);
        assert!(flags.is_primary());

        let flags = FlagSet::from(0x100_u16 | 0x8);
        assert!(!flags.is_primary());
        assert!(flags.is_mapped_with_unmapped_mate());
    }
}
