//! # cmmn-compiler
//!
//! Compiler for CMMN 1.1 case model documents (with Flowable extension
//! attributes and CMMN DI diagram data) into a resolved, navigable case
//! model, and back to XML.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! format    → ModelFormat trait over reader + writer
//!   ↓
//! reader    → Token stream, handler registry, tree builder
//! writer    → Model → XML
//!   ↓
//! resolve   → Cross references, timer triggers, ids, element index, diagram
//!   ↓
//! model     → Arena-backed case model with typed ids
//!   ↓
//! base      → Primitives (LineCol, LineIndex)
//! ```
//!
//! ## Usage
//!
//! ```no_run
//! use cmmn::{CmmnXmlReader, CmmnXmlWriter};
//!
//! let compilation = CmmnXmlReader::new().compile_path("claims.cmmn")?;
//! for warning in &compilation.diagnostics {
//!     eprintln!("{warning}");
//! }
//! let xml = CmmnXmlWriter::new().to_string(&compilation.model)?;
//! # Ok::<(), cmmn::CompileError>(())
//! ```

// ============================================================================
// MODULES (dependency order: base → model → resolve → reader/writer → format)
// ============================================================================

/// Foundation types: LineCol, LineIndex
pub mod base;

/// Recoverable warnings raised during compilation
pub mod diagnostics;

/// Fatal compilation errors
pub mod error;

/// Compilation options and document encodings
pub mod options;

/// Case model: cases, plan items, definitions, sentries, diagram data
pub mod model;

/// Reader: token stream, handler registry, tree builder
pub mod reader;

/// Post-parse resolution passes
pub mod resolve;

/// Optional pre-parse document validation
pub mod validate;

/// Writer: model → CMMN XML
pub mod writer;

/// Format trait tying reader and writer together
pub mod format;

// Re-export foundation types
pub use base::{LineCol, LineIndex};

pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CompileError, ReferenceKind, ValidationError};
pub use format::{CmmnXml, ModelFormat};
pub use model::{CmmnModel, ElementRef};
pub use options::{CompileOptions, Encoding};
pub use reader::{CmmnXmlReader, Compilation, HandlerRegistry};
pub use validate::{SchemaValidator, StructuralValidator};
pub use writer::CmmnXmlWriter;
