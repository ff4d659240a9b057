//! Diagnostics: recoverable modeling warnings.
//!
//! Warnings never change the outcome of a compilation. Each one is logged
//! through `tracing` when it is recorded and is also returned to the caller
//! alongside the compiled model.

use std::fmt;
use std::sync::Arc;

use crate::base::LineCol;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Info,
}

/// A diagnostic message tied to an element of the compiled document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Warning code (e.g., "W0002").
    pub code: &'static str,
    /// The diagnostic message.
    pub message: Arc<str>,
    /// Identifier of the element the message is about, if it has one.
    pub element_id: Option<Arc<str>>,
    /// Start tag position of that element, if known.
    pub position: Option<LineCol>,
}

impl Diagnostic {
    /// Create a new warning diagnostic.
    pub fn warning(code: &'static str, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            element_id: None,
            position: None,
        }
    }

    /// Attach the element the warning is about.
    pub fn with_element(mut self, id: Option<&str>) -> Self {
        self.element_id = id.map(Arc::from);
        self
    }

    /// Attach a source position.
    pub fn with_position(mut self, position: Option<LineCol>) -> Self {
        self.position = position;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(id) = &self.element_id {
            write!(f, " (element '{id}')")?;
        }
        if let Some(pos) = self.position {
            write!(f, " at {pos}")?;
        }
        Ok(())
    }
}

/// Ordered collection of diagnostics gathered during one compilation.
#[derive(Clone, Debug, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning and log it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(code = diagnostic.code, "{}", diagnostic);
        self.items.push(diagnostic);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True if any diagnostic carries the given code.
    pub fn has_code(&self, code: &str) -> bool {
        self.items.iter().any(|d| d.code == code)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard warning codes.
pub mod codes {
    /// Optional date attribute could not be parsed; the field is left unset.
    pub const UNPARSABLE_DATE: &str = "W0001";
    /// Exit criteria on a non-blocking task without blocking expression.
    pub const EXIT_CRITERIA_ON_NON_BLOCKING_TASK: &str = "W0002";
    /// Process task references a process that is not in the document.
    pub const UNRESOLVED_PROCESS: &str = "W0003";
    /// Decision task references a decision that is not in the document.
    pub const UNRESOLVED_DECISION: &str = "W0004";
    /// Two elements of one case share an identifier.
    pub const DUPLICATE_ID: &str = "W0005";
    /// Diagram shape or edge references an unknown element.
    pub const UNKNOWN_DIAGRAM_ELEMENT: &str = "W0007";
}
