//! A read-only view over the fields of a SAM alignment line that the
//! statistics engines need.

use crate::errors::Error;
use crate::errors::Result;
use crate::utils::cigar;
use crate::utils::flags::FlagSet;
use crate::utils::flags::MAX_FLAG;

/// The number of mandatory tab-separated fields in a SAM alignment line.
pub const MANDATORY_FIELDS: usize = 11;

/// The placeholder used by SAM for unavailable string fields.
pub const MISSING: &str = "*";

/// A parsed projection of one SAM alignment line.
///
/// The view owns a copy of the raw line so that it can be passed through
/// unchanged (optionally annotated) once its read has been classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordView {
    read_id: String,
    flags: FlagSet,
    ref_name: String,
    position: u64,
    mapq: u8,
    mate_ref: String,
    spliced: bool,
    sequence: String,
    raw: String,
}

fn malformed(line: usize, reason: String) -> Error {
    Error::MalformedRecord { line, reason }
}

impl RecordView {
    /// Parses a single (non-header) SAM line. `line_number` is only used for
    /// error reporting.
    pub fn parse(line: &str, line_number: usize) -> Result<Self> {
        let raw = line.trim_end_matches(['\n', '\r']);
        let fields: Vec<&str> = raw.split('\t').collect();

        if fields.len() < MANDATORY_FIELDS {
            return Err(malformed(
                line_number,
                format!(
                    "expected at least {} tab-separated fields, found {}",
                    MANDATORY_FIELDS,
                    fields.len()
                ),
            ));
        }

        let flag: u16 = fields[1]
            .parse()
            .map_err(|_| malformed(line_number, format!("invalid FLAG: '{}'", fields[1])))?;

        if flag > MAX_FLAG {
            return Err(malformed(
                line_number,
                format!("FLAG {} is outside of [0, {}]", flag, MAX_FLAG),
            ));
        }

        let position: u64 = fields[3]
            .parse()
            .map_err(|_| malformed(line_number, format!("invalid POS: '{}'", fields[3])))?;

        let mapq: u8 = fields[4]
            .parse()
            .map_err(|_| malformed(line_number, format!("invalid MAPQ: '{}'", fields[4])))?;

        let spliced = cigar::parse(fields[5])
            .map_err(|reason| malformed(line_number, reason))?
            .map_or(false, |cigar| cigar::is_spliced(&cigar));

        Ok(RecordView {
            read_id: fields[0].to_string(),
            flags: FlagSet::from(flag),
            ref_name: fields[2].to_string(),
            position,
            mapq,
            mate_ref: fields[6].to_string(),
            spliced,
            sequence: fields[9].to_string(),
            raw: raw.to_string(),
        })
    }

    /// The read identifier (QNAME).
    pub fn read_id(&self) -> &str {
        &self.read_id
    }

    /// The decoded alignment flags.
    pub fn flags(&self) -> FlagSet {
        self.flags
    }

    /// The reference sequence name (RNAME).
    pub fn ref_name(&self) -> &str {
        &self.ref_name
    }

    /// The mapping quality.
    pub fn mapq(&self) -> u8 {
        self.mapq
    }

    /// The reference sequence name of the mate (RNEXT).
    pub fn mate_ref(&self) -> &str {
        &self.mate_ref
    }

    /// The segment sequence (SEQ), `*` when omitted.
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// The number of bases in the sequence (zero when omitted).
    pub fn sequence_length(&self) -> usize {
        if self.sequence == MISSING {
            0
        } else {
            self.sequence.len()
        }
    }

    /// The original line, without its line terminator.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the alignment skips a region of the reference.
    pub fn is_spliced(&self) -> bool {
        self.spliced
    }

    /// The strand-aware 5' position of the alignment: the start for forward
    /// strand alignments and `-(start + sequence length)` for reverse strand
    /// alignments.
    pub fn signed_position(&self) -> i64 {
        let start = self.position as i64;

        if self.flags.reverse_strand {
            -(start + self.sequence_length() as i64)
        } else {
            start
        }
    }
}
