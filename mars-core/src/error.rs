use core::fmt;

use redcode_parser::ParseError;

use crate::CoreAddr;

/// Result type shared by the execution core
pub type MarsResult<T> = core::result::Result<T, MarsError>;

/// Failure kinds surfaced to callers of the execution core.
///
/// Redcode-level faults are deliberately absent: executing a `DAT` or
/// dividing by zero is the defined mechanism for killing a redcode thread,
/// not an error of the host.  Those events leave the warrior with a shorter
/// thread queue and produce no [`MarsError`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarsError {
    /// Warrior source text was rejected by the redcode parser
    Parse(ParseError),

    /// `initial_program` was called with no base on a warrior that was never
    /// loaded
    Unseeded,

    /// `run` was called on a warrior whose thread queue is empty
    DeadWarrior,

    /// A warrior placement overlaps or crowds a previously loaded warrior
    LoadConflict {
        /// The rejected load base, canonicalised
        base: CoreAddr,
    },

    /// A warrior body exceeds the configured `max_length`
    ProgramTooLong {
        /// Instructions in the rejected program
        len: usize,
        /// The configured cap
        max: usize,
    },
}

impl fmt::Display for MarsError {
    #[allow(clippy::pattern_type_mismatch)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => {
                write!(f, "failed to assemble warrior: {err}")
            }
            Self::Unseeded => {
                write!(
                    f,
                    "initial_program requires a base address for a warrior \
                     that has never been loaded"
                )
            }
            Self::DeadWarrior => {
                write!(f, "cannot run a warrior with no live threads")
            }
            Self::LoadConflict { base } => {
                write!(
                    f,
                    "cannot load a warrior at {base}: too close to a warrior \
                     that is already loaded"
                )
            }
            Self::ProgramTooLong { len, max } => {
                write!(
                    f,
                    "warrior has {len} instructions but the core allows at \
                     most {max}"
                )
            }
        }
    }
}

impl From<ParseError> for MarsError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

#[cfg(test)]
mod tests {
    use coverage_helper::test;

    use super::*;

    #[test]
    fn display_forms_are_distinct() {
        let errors = [
            MarsError::Unseeded,
            MarsError::DeadWarrior,
            MarsError::LoadConflict { base: 17 },
            MarsError::ProgramTooLong { len: 200, max: 100 },
        ];
        for (i, left) in errors.iter().enumerate() {
            for (j, right) in errors.iter().enumerate() {
                assert_eq!(
                    i == j,
                    left.to_string() == right.to_string(),
                    "error messages must identify the failure kind"
                );
            }
        }
    }
}
