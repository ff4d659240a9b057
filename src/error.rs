//! Error types for compiling and writing CMMN documents.

use std::fmt;

use thiserror::Error;

use crate::base::LineCol;

fn position_suffix(position: &Option<LineCol>, open: &str, close: &str) -> String {
    position
        .map(|p| format!("{open}{p}{close}"))
        .unwrap_or_default()
}

/// The category of a symbolic reference that failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `planItem/@definitionRef`
    PlanItemDefinition,
    /// `entryCriterion/@sentryRef` or `exitCriterion/@sentryRef`
    Sentry,
    /// `planItemOnPart/@sourceRef`
    SentryOnPart,
    /// `timerEventListener/planItemStartTrigger/@sourceRef`
    PlanItemStartTrigger,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::PlanItemDefinition => "PlanItemDefinition",
            ReferenceKind::Sentry => "Sentry",
            ReferenceKind::SentryOnPart => "SentryOnPart",
            ReferenceKind::PlanItemStartTrigger => "PlanItemStartTrigger",
        };
        f.write_str(name)
    }
}

/// A schema validation failure reported by a [`SchemaValidator`](crate::validate::SchemaValidator).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}{}", position_suffix(.position, " (at ", ")"))]
pub struct ValidationError {
    pub message: String,
    pub position: Option<LineCol>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            position: None,
        }
    }

    pub fn at(mut self, position: LineCol) -> Self {
        self.position = Some(position);
        self
    }
}

/// Errors that abort a compilation or a write.
///
/// Recoverable modeling problems are never reported through this type; they
/// surface as [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Malformed token stream: unbalanced tags, unexpected end of input,
    /// elements outside the scope they require.
    #[error("Structural error{}: {message}", position_suffix(.position, " at ", ""))]
    Structural {
        message: String,
        position: Option<LineCol>,
    },

    /// The document was rejected by the schema validator before tree building.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A required symbolic reference did not resolve within its search scope.
    #[error("Dangling {kind} reference '{reference}' from '{referrer_id}'")]
    DanglingReference {
        kind: ReferenceKind,
        referrer_id: String,
        reference: String,
    },

    /// The declared character encoding is not supported.
    #[error("Unsupported encoding: {0}")]
    UnsupportedEncoding(String),

    /// XML serialization error while writing.
    #[error("XML error: {0}")]
    Xml(String),

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompileError {
    /// Create a structural error without a source position.
    pub fn structural(message: impl Into<String>) -> Self {
        Self::Structural {
            message: message.into(),
            position: None,
        }
    }

    /// Create a structural error pointing at a source position.
    pub fn structural_at(message: impl Into<String>, position: LineCol) -> Self {
        Self::Structural {
            message: message.into(),
            position: Some(position),
        }
    }

    /// Create a dangling reference error.
    pub fn dangling(
        kind: ReferenceKind,
        referrer_id: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self::DanglingReference {
            kind,
            referrer_id: referrer_id.into(),
            reference: reference.into(),
        }
    }

    /// Create an XML write error.
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }

    /// The reference kind, if this is a dangling reference error.
    pub fn dangling_kind(&self) -> Option<ReferenceKind> {
        match self {
            Self::DanglingReference { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
