//! Verdicts returned by the type checker

use crate::error::{BspError, BspResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a failed type check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionKind {
    /// Bad delimiters, unknown keyword or malformed size token
    MalformedTypeExpression,
    /// Rank or dimension length outside the declared range
    ValueShapeMismatch,
    /// Fundamental kind differs (numeric, text, cell, ...)
    ValueKindMismatch,
    /// Required struct fields are absent
    MissingField,
    /// Text not among the enumerated literals
    DisallowedValue,
    /// Empty value where the expression forbids it
    EmptyValue,
}

impl fmt::Display for RejectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RejectionKind::MalformedTypeExpression => "malformed type expression",
            RejectionKind::ValueShapeMismatch => "shape mismatch",
            RejectionKind::ValueKindMismatch => "kind mismatch",
            RejectionKind::MissingField => "missing field",
            RejectionKind::DisallowedValue => "disallowed value",
            RejectionKind::EmptyValue => "empty value",
        };
        f.write_str(label)
    }
}

/// A rejected check: category plus a non-empty diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    kind: RejectionKind,
    message: String,
}

impl Rejection {
    /// Create a rejection; an empty message is replaced by a generic one
    pub fn new(kind: RejectionKind, message: impl Into<String>) -> Self {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = format!("value does not match its type definition ({})", kind);
        }
        Rejection { kind, message }
    }

    pub fn kind(&self) -> RejectionKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Raise as a top-level failure for variable `name`
    pub fn into_error(self, name: &str) -> BspError {
        BspError::TypeCheck {
            name: name.to_string(),
            kind: self.kind,
            message: self.message,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Outcome of one validation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Verdict {
    Accepted,
    Rejected(Rejection),
}

impl Verdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }

    pub fn is_rejected(&self) -> bool {
        !self.is_accepted()
    }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Verdict::Accepted => None,
            Verdict::Rejected(rejection) => Some(rejection),
        }
    }

    /// Diagnostic message; always present on rejection
    pub fn message(&self) -> Option<&str> {
        self.rejection().map(Rejection::message)
    }

    pub fn kind(&self) -> Option<RejectionKind> {
        self.rejection().map(Rejection::kind)
    }

    /// Convert into a top-level result for variable `name`
    pub fn into_result(self, name: &str) -> BspResult<()> {
        match self {
            Verdict::Accepted => Ok(()),
            Verdict::Rejected(rejection) => Err(rejection.into_error(name)),
        }
    }
}

impl From<Result<(), Rejection>> for Verdict {
    fn from(result: Result<(), Rejection>) -> Self {
        match result {
            Ok(()) => Verdict::Accepted,
            Err(rejection) => Verdict::Rejected(rejection),
        }
    }
}
