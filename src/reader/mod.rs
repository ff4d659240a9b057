//! Document reader: bytes → resolved [`CmmnModel`].
//!
//! ```text
//! bytes ─decode─▶ text ─validate?─▶ TokenReader ─builder─▶ ParsedDocument
//!                                                              │
//!                                       resolve ◀──────────────┘
//!                                          │
//!                                          ▼
//!                                     Compilation { model, diagnostics }
//! ```
//!
//! Each call creates its own [`ParseContext`]; the handler registry is the
//! only state shared between calls and is never mutated after creation.

mod builder;
mod context;
mod handlers;
mod registry;
mod tokens;

pub use context::{
    Collections, ConditionTarget, ControlTarget, DiagramRecords, EdgeRecord, ParseContext,
    ParsedDocument, ShapeRecord,
};
pub use registry::{ElementHandler, HandlerRegistry, TextHandler};
pub use tokens::{StartTag, Token, TokenReader, local_name};

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::diagnostics::Diagnostic;
use crate::error::CompileError;
use crate::model::CmmnModel;
use crate::options::CompileOptions;
use crate::resolve;
use crate::validate::{SchemaValidator, StructuralValidator};

/// Result of a successful compilation.
#[derive(Clone, Debug)]
pub struct Compilation {
    pub model: CmmnModel,
    /// Recoverable warnings, in the order they were raised.
    pub diagnostics: Vec<Diagnostic>,
}

impl Compilation {
    /// True if a warning with this code was raised.
    pub fn has_warning(&self, code: &str) -> bool {
        self.diagnostics.iter().any(|d| d.code == code)
    }

    pub fn into_model(self) -> CmmnModel {
        self.model
    }
}

/// Compiles CMMN documents.
pub struct CmmnXmlReader<'r> {
    registry: &'r HandlerRegistry,
    options: CompileOptions,
    validator: Option<&'r dyn SchemaValidator>,
}

impl Default for CmmnXmlReader<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl CmmnXmlReader<'static> {
    /// Reader over the process-wide standard registry.
    pub fn new() -> Self {
        Self::with_registry(HandlerRegistry::global())
    }
}

impl<'r> CmmnXmlReader<'r> {
    pub fn with_registry(registry: &'r HandlerRegistry) -> Self {
        Self {
            registry,
            options: CompileOptions::default(),
            validator: None,
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Validator used when schema validation is enabled. Without one, a
    /// [`StructuralValidator`] over this reader's registry is used.
    pub fn with_validator(mut self, validator: &'r dyn SchemaValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile a document from a byte stream in the configured encoding.
    pub fn compile(&self, mut input: impl Read) -> Result<Compilation, CompileError> {
        let mut bytes = Vec::new();
        input.read_to_end(&mut bytes)?;
        self.compile_bytes(&bytes)
    }

    pub fn compile_bytes(&self, bytes: &[u8]) -> Result<Compilation, CompileError> {
        let text = self.options.encoding.decode(bytes)?;
        self.compile_text(&text)
    }

    /// Compile already decoded text; the configured encoding is not used.
    pub fn compile_str(&self, text: &str) -> Result<Compilation, CompileError> {
        self.compile_text(text)
    }

    pub fn compile_path(&self, path: impl AsRef<Path>) -> Result<Compilation, CompileError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "compiling file");
        let bytes = std::fs::read(path)?;
        self.compile_bytes(&bytes)
    }

    fn compile_text(&self, text: &str) -> Result<Compilation, CompileError> {
        if self.options.validate_schema {
            match self.validator {
                Some(validator) => validator.validate(text)?,
                None => StructuralValidator::new(self.registry).validate(text)?,
            }
        }

        let document = builder::build(text, self.registry, self.options.safe_mode)?;
        debug!(
            cases = document.model.cases.len(),
            plan_items = document.collections.plan_items.len(),
            "document parsed"
        );
        let (model, diagnostics) = resolve::resolve(document)?;
        Ok(Compilation {
            model,
            diagnostics: diagnostics.into_vec(),
        })
    }
}
