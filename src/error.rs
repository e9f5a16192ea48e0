//! Error types for the residency rules engine.
//!
//! Two classes of failure exist. [`EngineError`] covers unexpected
//! failures (a malformed template, an unavailable record source) that the
//! caller is expected to propagate. [`RuleViolation`] is an expected
//! verdict: a limit was exceeded, a prerequisite is missing, a record was
//! not found. It carries a stable [`ErrorCode`] that callers branch on.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unexpected failures raised by the engine.
///
/// # Example
///
/// ```
/// use residency_engine::error::EngineError;
///
/// let error = EngineError::TemplateNotFound {
///     path: "/missing/cardiology.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Template file not found: /missing/cardiology.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A template file or directory was not found.
    #[error("Template file not found: {path}")]
    TemplateNotFound {
        /// The path that was not found.
        path: String,
    },

    /// A template file could not be parsed.
    #[error("Failed to parse template file '{path}': {message}")]
    TemplateParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No template is registered for the program code and version.
    #[error("No requirement template for program '{code}' version '{version}'")]
    TemplateNotRegistered {
        /// The program code.
        code: String,
        /// The template version.
        version: String,
    },

    /// A template does not define the requested module.
    #[error("Module requirements not found: {code}")]
    ModuleRequirementsNotFound {
        /// The module code that was requested.
        code: String,
    },

    /// A template parsed but its content is inconsistent.
    #[error("Invalid template '{code}': {message}")]
    InvalidTemplate {
        /// The program code of the template.
        code: String,
        /// What is wrong with it.
        message: String,
    },

    /// The record source failed to deliver training records.
    #[error("Training records unavailable: {message}")]
    RecordsUnavailable {
        /// A description of the failure.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;

/// Machine-readable code attached to every [`RuleViolation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A referenced trainee or record does not exist.
    NotFound,
    /// The input breaks a hard limit.
    ValidationError,
    /// The input is well-formed but a training rule forbids it.
    BusinessRuleViolation,
    /// The input collides with existing data.
    Conflict,
}

impl ErrorCode {
    /// Returns the wire representation of the code.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::BusinessRuleViolation => "BUSINESS_RULE_VIOLATION",
            ErrorCode::Conflict => "CONFLICT",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An expected rule failure with a human-readable message.
///
/// # Example
///
/// ```
/// use residency_engine::error::{ErrorCode, RuleViolation};
///
/// let violation =
///     RuleViolation::conflict("Shift overlaps with existing shift from 08:00 to 16:00");
/// assert_eq!(violation.code, ErrorCode::Conflict);
/// assert_eq!(violation.code.as_str(), "CONFLICT");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct RuleViolation {
    /// The stable code callers branch on.
    pub code: ErrorCode,
    /// Details specific enough to render to the trainee.
    pub message: String,
}

impl RuleViolation {
    /// Creates a violation with the given code.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Creates a `NOT_FOUND` violation.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Creates a `VALIDATION_ERROR` violation.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Creates a `BUSINESS_RULE_VIOLATION` violation.
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BusinessRuleViolation, message)
    }

    /// Creates a `CONFLICT` violation.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Conflict, message)
    }
}

/// Outcome of a rule check.
pub type RuleResult<T> = Result<T, RuleViolation>;
