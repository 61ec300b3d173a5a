use std::fmt;

/// Error codes for semantic problems.
///
/// Format: E3### for resolution problems, E9### for internal errors.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Name not found
    E3001,
    /// Ambiguous lookup or overload
    E3002,
    /// No viable overload candidate
    E3003,
    /// Template argument deduction failed
    E3004,
    /// Type mismatch
    E3005,
    /// Request cancelled
    E3006,
    /// Instantiation or deduction recursion limit reached
    E3007,
    /// Internal error
    E9001,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E9001 => "E9001",
        }
    }

    pub fn is_internal(&self) -> bool {
        self.as_str().starts_with("E9")
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E3001.to_string(), "E3001");
        assert!(!ErrorCode::E3002.is_internal());
        assert!(ErrorCode::E9001.is_internal());
    }
}
