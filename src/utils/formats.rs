//! Utilities related to the alignment file formats accepted on the command
//! line.

pub mod sam;

use std::fmt;
use std::path::Path;

/// The name used on the command line for the standard input/output streams.
pub const STDIO: &str = "-";

/// The alignment formats that can be read.
#[allow(non_camel_case_types, clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlignmentFileFormat {
    /// Plain-text Sequence Alignment Map.
    SAM,

    /// Gzip-compressed Sequence Alignment Map.
    SAM_GZ,
}

impl AlignmentFileFormat {
    /// Attempts to detect the format of a path from its extension. Standard
    /// input is always treated as plain-text SAM.
    pub fn try_detect(path: &Path) -> Option<Self> {
        if path == Path::new(STDIO) {
            return Some(AlignmentFileFormat::SAM);
        }

        let name = path.file_name()?.to_str()?.to_ascii_lowercase();

        if name.ends_with(".sam.gz") {
            Some(AlignmentFileFormat::SAM_GZ)
        } else if name.ends_with(".sam") {
            Some(AlignmentFileFormat::SAM)
        } else {
            None
        }
    }
}

impl fmt::Display for AlignmentFileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentFileFormat::SAM => write!(f, "SAM"),
            AlignmentFileFormat::SAM_GZ => write!(f, "SAM (gzipped)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_formats() {
        assert_eq!(
            AlignmentFileFormat::try_detect(Path::new("sample.sam")),
            Some(AlignmentFileFormat::SAM)
        );
        assert_eq!(
            AlignmentFileFormat::try_detect(Path::new("dir/sample.SAM.gz")),
            Some(AlignmentFileFormat::SAM_GZ)
        );
        assert_eq!(
            AlignmentFileFormat::try_detect(Path::new("-")),
            Some(AlignmentFileFormat::SAM)
        );
        assert_eq!(AlignmentFileFormat::try_detect(Path::new("sample.bam")), None);
    }
}
