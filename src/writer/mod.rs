//! Document writer: resolved [`CmmnModel`] → CMMN 1.1 XML.
//!
//! The model is first mapped to an [`XmlNode`] tree, then serialized with
//! two-space indentation. Cases without plan items are left out, as are
//! the sentries and criteria the resolver synthesized for timer start
//! triggers; reading the output back produces them again.

mod document;
mod node;

pub use node::XmlNode;

use std::io::{Cursor, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, Event};
use tracing::debug;

use crate::error::CompileError;
use crate::model::CmmnModel;
use crate::options::Encoding;

use document::DocumentBuilder;

/// Serializes compiled models.
#[derive(Debug, Clone, Copy, Default)]
pub struct CmmnXmlWriter {
    encoding: Encoding,
}

impl CmmnXmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoding declared in, and used for, the output document.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Build the element tree without serializing it.
    pub fn to_tree(&self, model: &CmmnModel) -> XmlNode {
        DocumentBuilder::new(model).build()
    }

    pub fn to_string(&self, model: &CmmnModel) -> Result<String, CompileError> {
        let root = self.to_tree(model);
        let mut buffer = Cursor::new(Vec::new());
        let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new(
                "1.0",
                Some(self.encoding.label()),
                None,
            )))
            .map_err(|e| CompileError::xml(format!("Write error: {e}")))?;
        root.write_to(&mut writer)?;

        let text = String::from_utf8(buffer.into_inner())
            .map_err(|e| CompileError::xml(format!("Invalid UTF-8 in output: {e}")))?;
        debug!(bytes = text.len(), "document written");
        Ok(text)
    }

    pub fn to_bytes(&self, model: &CmmnModel) -> Result<Vec<u8>, CompileError> {
        let text = self.to_string(model)?;
        self.encoding.encode(&text)
    }

    pub fn write(&self, model: &CmmnModel, mut output: impl Write) -> Result<(), CompileError> {
        let bytes = self.to_bytes(model)?;
        output.write_all(&bytes)?;
        output.flush()?;
        Ok(())
    }
}
