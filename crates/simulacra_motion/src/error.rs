//! # Motion Error Types
//!
//! All errors that can occur while loading a capture file.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Part of a capture file an error was found in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Section {
    /// Joint hierarchy (`HIERARCHY` up to `MOTION`).
    Hierarchy,
    /// Frame data (`MOTION` to end of file).
    Motion,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hierarchy => f.write_str("hierarchy"),
            Self::Motion => f.write_str("motion"),
        }
    }
}

/// A capture file that cannot be turned into a skeleton and frames.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormatError {
    /// A structural problem at a specific line.
    #[error("{section} section, line {line}: {reason}")]
    Malformed {
        /// Section the line belongs to.
        section: Section,
        /// 1-based line number.
        line: usize,
        /// What was wrong.
        reason: String,
    },

    /// A numeric row whose length does not match the skeleton.
    #[error("motion section, line {line}: frame {frame} has {found} values, expected {expected}")]
    FrameLength {
        /// 0-based frame index.
        frame: usize,
        /// 1-based line number.
        line: usize,
        /// Sum of channel counts across all joints.
        expected: usize,
        /// Values on the row.
        found: usize,
    },

    /// The hierarchy declares no joint at all.
    #[error("hierarchy section: no ROOT joint declared")]
    NoRoot,

    /// The file ends before a `MOTION` line.
    #[error("motion section missing")]
    MissingMotion,
}

impl FormatError {
    /// Section the error was found in.
    #[must_use]
    pub const fn section(&self) -> Section {
        match self {
            Self::Malformed { section, .. } => *section,
            Self::FrameLength { .. } | Self::MissingMotion => Section::Motion,
            Self::NoRoot => Section::Hierarchy,
        }
    }

    pub(crate) fn hierarchy(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            section: Section::Hierarchy,
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn motion(line: usize, reason: impl Into<String>) -> Self {
        Self::Malformed {
            section: Section::Motion,
            line,
            reason: reason.into(),
        }
    }
}

/// Errors from loading a clip off disk.
#[derive(Error, Debug)]
pub enum MotionError {
    /// File could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// File was read but is not a valid capture.
    #[error("invalid capture file: {0}")]
    Format(#[from] FormatError),
}

/// Result type for motion operations.
pub type MotionResult<T> = Result<T, MotionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_names_section() {
        let err = FormatError::hierarchy(12, "unbalanced '}'");
        assert_eq!(err.section(), Section::Hierarchy);
        assert_eq!(err.to_string(), "hierarchy section, line 12: unbalanced '}'");

        let err = FormatError::FrameLength { frame: 3, line: 40, expected: 9, found: 8 };
        assert_eq!(err.section(), Section::Motion);
        assert!(err.to_string().starts_with("motion section"));
    }
}
