/// Stable error codes shared by the normalizer, the scheduler and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    Success = 0,
    GeneralError = 1,
    ParseError = 2,
    ValidationError = 3,
    DependencyError = 11,
    CircularDependency = 12,
    ConventionViolation = 13,
    Timeout = 30,
    Cancelled = 31,
    ConfigError = 40,
    InvalidPath = 64,
    PathTraversal = 65,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}
