use std::fmt;

/// Fixed catalogue of client-facing error codes.
///
/// Each variant maps to an immutable `(code, message)` pair that is returned
/// verbatim in error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Unexpected runtime failure.
    Gen001,
    /// No item matches the requested identifier.
    Inf001,
    /// Category identifier was empty.
    Cnf001,
    /// No category matches the requested identifier.
    Cnf002,
    /// No restaurant matches the requested identifier.
    Rnf001,
    /// Restaurant identifier was empty.
    Rnf002,
}

impl ErrorCode {
    pub fn code(self) -> &'static str {
        match self {
            Self::Gen001 => "GEN-001",
            Self::Inf001 => "INF-001",
            Self::Cnf001 => "CNF-001",
            Self::Cnf002 => "CNF-002",
            Self::Rnf001 => "RNF-001",
            Self::Rnf002 => "RNF-002",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Gen001 => "An unexpected error occurred. Please contact System Administrator",
            Self::Inf001 => "No item by this id exist",
            Self::Cnf001 => "Category id field should not be empty",
            Self::Cnf002 => "No category by this id",
            Self::Rnf001 => "No restaurant by this id",
            Self::Rnf002 => "Restaurant id field should not be empty",
        }
    }

    /// Returns `true` for codes raised when a lookup finds nothing.
    pub fn is_not_found(self) -> bool {
        matches!(self, Self::Inf001 | Self::Cnf002 | Self::Rnf001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}
