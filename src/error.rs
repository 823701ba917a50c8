use crate::family::Family;

/// Errors produced while parsing, converting or combining addresses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddrError {
    /// Malformed textual, binary or word-tuple input.
    #[error("invalid format: {0}")]
    Format(String),

    /// A value, prefix length, step or count outside the family's domain.
    #[error("out of range: {0}")]
    Range(String),

    #[error("index {index} out of range for {len} words")]
    Index { index: isize, len: usize },

    /// A valid value that cannot be mapped losslessly onto the requested form.
    #[error("conversion failed: {0}")]
    Conversion(String),

    #[error("address family mismatch: {0} and {1}")]
    TypeMismatch(Family, Family),
}

pub type Result<T> = std::result::Result<T, AddrError>;

impl AddrError {
    pub(crate) fn format(family: Family, input: &str) -> Self {
        AddrError::Format(format!("{:?} is not a valid {} address", input, family))
    }

    /// Fails with `TypeMismatch` unless both families agree.
    pub(crate) fn check_family(expected: Family, actual: Family) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(AddrError::TypeMismatch(expected, actual))
        }
    }
}
