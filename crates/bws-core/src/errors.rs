//! Structured error types shared across BWS crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`BwsError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (row numbers, sizes, item labels, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the best-worst scaling toolkit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum BwsError {
    /// Trial count, group size or pool size violate the design preconditions.
    #[error("invalid design parameters: {0}")]
    InvalidDesignParameters(ErrorInfo),
    /// A strict design could not satisfy its pair-novelty constraint.
    #[error("infeasible constraint: {0}")]
    InfeasibleConstraint(ErrorInfo),
    /// A single response row is unusable.
    #[error("malformed trial record: {0}")]
    MalformedTrialRecord(ErrorInfo),
    /// No usable trials remain after parsing.
    #[error("no valid trials: {0}")]
    NoValidTrials(ErrorInfo),
    /// A scoring method name is not present in the registry.
    #[error("unknown scoring method: {0}")]
    UnknownMethod(ErrorInfo),
    /// A scoring method returned output that does not fit the score table.
    #[error("scoring method failed: {0}")]
    MethodFailed(ErrorInfo),
    /// Filesystem and stream errors.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// Serialization, CSV and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl BwsError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            BwsError::InvalidDesignParameters(info)
            | BwsError::InfeasibleConstraint(info)
            | BwsError::MalformedTrialRecord(info)
            | BwsError::NoValidTrials(info)
            | BwsError::UnknownMethod(info)
            | BwsError::MethodFailed(info)
            | BwsError::Io(info)
            | BwsError::Serde(info) => info,
        }
    }

    /// Wraps an I/O failure, recording the path involved.
    pub fn io(code: &str, path: impl Display, err: std::io::Error) -> Self {
        BwsError::Io(
            ErrorInfo::new(code, "filesystem operation failed")
                .with_context("path", path.to_string())
                .with_hint(err.to_string()),
        )
    }
}
