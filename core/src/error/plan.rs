use std::fmt;

use thiserror::Error;

use super::code::ErrorCode;

/// Why a step path was rejected before any ignore check ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathViolation {
    Empty,
    Absolute,
    Traversal,
    Backslash,
    NulByte,
}

impl fmt::Display for PathViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::Empty => "path is empty",
            Self::Absolute => "path must be relative",
            Self::Traversal => "path must not contain '..' segments",
            Self::Backslash => "path must use '/' separators",
            Self::NulByte => "path contains a NUL byte",
        };
        f.write_str(msg)
    }
}

/// Terminal error of a plan normalization. No partial plan accompanies it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("plan is not valid JSON: {0}")]
    Parse(String),

    #[error("plan is missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("step at index {index} (expected step {expected}) is invalid: {reason}")]
    InvalidStep {
        index: usize,
        expected: usize,
        reason: String,
    },

    #[error("step {step}: field '{field}' {reason}")]
    InvalidField {
        step: usize,
        field: &'static str,
        reason: String,
    },

    #[error("step {step}: unsafe path '{path}': {violation}")]
    UnsafePath {
        step: usize,
        path: String,
        violation: PathViolation,
    },

    #[error("step {step}: path '{path}' violates convention rule '{rule}'")]
    ConventionViolation {
        step: usize,
        path: String,
        rule: String,
    },
}

impl PlanError {
    /// Offending 0-based step index, when the error concerns one step.
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::InvalidStep { index, .. } => Some(*index),
            Self::InvalidField { step, .. }
            | Self::UnsafePath { step, .. }
            | Self::ConventionViolation { step, .. } => Some(step.saturating_sub(1)),
            Self::Parse(_) | Self::MissingField { .. } => None,
        }
    }

    /// Offending path, when the error concerns a path.
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::UnsafePath { path, .. } | Self::ConventionViolation { path, .. } => Some(path),
            _ => None,
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Parse(_) => ErrorCode::ParseError,
            Self::MissingField { .. } => ErrorCode::ParseError,
            Self::InvalidStep { .. } => ErrorCode::ValidationError,
            Self::InvalidField { .. } => ErrorCode::ValidationError,
            Self::UnsafePath { violation, .. } => match violation {
                PathViolation::Traversal => ErrorCode::PathTraversal,
                _ => ErrorCode::InvalidPath,
            },
            Self::ConventionViolation { .. } => ErrorCode::ConventionViolation,
        }
    }
}
