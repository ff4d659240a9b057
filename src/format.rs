//! Common trait for case model document formats.

use crate::error::CompileError;
use crate::model::CmmnModel;
use crate::options::CompileOptions;
use crate::reader::{CmmnXmlReader, HandlerRegistry};
use crate::validate::{SchemaValidator, StructuralValidator};
use crate::writer::CmmnXmlWriter;

/// Capabilities supported by a format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatCapability {
    pub read: bool,
    pub write: bool,
    /// Preserves all semantic information across a write/read cycle.
    pub lossless: bool,
}

impl FormatCapability {
    pub const FULL: Self = Self {
        read: true,
        write: true,
        lossless: true,
    };
}

/// A serialization of [`CmmnModel`].
///
/// Implementations are stateless and shareable across threads; per-call
/// state lives inside `read` and `write`.
pub trait ModelFormat: Send + Sync {
    /// Human-readable name of the format.
    fn name(&self) -> &'static str;

    /// File extension(s) for this format.
    fn extensions(&self) -> &'static [&'static str];

    fn mime_type(&self) -> &'static str;

    fn capabilities(&self) -> FormatCapability;

    /// Read and resolve a model. Warnings are discarded; use the reader
    /// directly to inspect them.
    fn read(&self, input: &[u8]) -> Result<CmmnModel, CompileError>;

    fn write(&self, model: &CmmnModel) -> Result<Vec<u8>, CompileError>;

    /// Check a document against the format's structure without building a
    /// model.
    fn validate(&self, input: &[u8]) -> Result<(), CompileError>;

    /// True if `path` ends with one of this format's extensions.
    fn matches_extension(&self, path: &str) -> bool {
        let lower = path.to_ascii_lowercase();
        self.extensions()
            .iter()
            .any(|ext| lower.ends_with(&format!(".{ext}")))
    }
}

/// CMMN 1.1 XML with Flowable extensions and CMMN DI.
#[derive(Debug, Clone, Default)]
pub struct CmmnXml {
    options: CompileOptions,
}

impl CmmnXml {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }
}

impl ModelFormat for CmmnXml {
    fn name(&self) -> &'static str {
        "CMMN"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["cmmn", "cmmn.xml", "cmmn11.xml"]
    }

    fn mime_type(&self) -> &'static str {
        "application/xml"
    }

    fn capabilities(&self) -> FormatCapability {
        FormatCapability::FULL
    }

    fn read(&self, input: &[u8]) -> Result<CmmnModel, CompileError> {
        CmmnXmlReader::new()
            .with_options(self.options.clone())
            .compile_bytes(input)
            .map(|compilation| compilation.model)
    }

    fn write(&self, model: &CmmnModel) -> Result<Vec<u8>, CompileError> {
        CmmnXmlWriter::new()
            .with_encoding(self.options.encoding)
            .to_bytes(model)
    }

    fn validate(&self, input: &[u8]) -> Result<(), CompileError> {
        let text = self.options.encoding.decode(input)?;
        let validator = StructuralValidator::new(HandlerRegistry::global());
        validator.validate(&text)?;
        Ok(())
    }
}

/// Pick a format by file name.
pub fn format_for_path(path: &str) -> Option<Box<dyn ModelFormat>> {
    let xml = CmmnXml::default();
    xml.matches_extension(path).then(|| Box::new(xml) as Box<dyn ModelFormat>)
}
