//! Compilation options

use crate::error::CompileError;

/// Character encoding declared for an input or output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    UsAscii,
    Latin1,
}

impl Encoding {
    /// Look up an encoding by its IANA label.
    pub fn from_label(label: &str) -> Result<Self, CompileError> {
        match label.trim().to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Ok(Self::Utf8),
            "US-ASCII" | "ASCII" => Ok(Self::UsAscii),
            "ISO-8859-1" | "LATIN1" | "ISO8859-1" => Ok(Self::Latin1),
            _ => Err(CompileError::UnsupportedEncoding(label.to_string())),
        }
    }

    /// Label written into the XML declaration.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::UsAscii => "US-ASCII",
            Self::Latin1 => "ISO-8859-1",
        }
    }

    /// Decode raw document bytes into text.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, CompileError> {
        match self {
            Self::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| CompileError::structural(format!("Invalid UTF-8: {e}"))),
            Self::UsAscii => {
                if let Some(pos) = bytes.iter().position(|b| !b.is_ascii()) {
                    return Err(CompileError::structural(format!(
                        "Non-ASCII byte at offset {pos}"
                    )));
                }
                Ok(bytes.iter().map(|&b| b as char).collect())
            }
            Self::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    /// Encode document text for output.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, CompileError> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::UsAscii | Self::Latin1 => {
                let limit = if *self == Self::UsAscii { 0x7f } else { 0xff };
                let mut out = Vec::with_capacity(text.len());
                for c in text.chars() {
                    if (c as u32) <= limit {
                        out.push(c as u8);
                    } else {
                        // Character references keep the document loss-free.
                        out.extend_from_slice(format!("&#x{:X};", c as u32).as_bytes());
                    }
                }
                Ok(out)
            }
        }
    }
}

/// Options for one compilation call.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Encoding of the supplied byte stream.
    pub encoding: Encoding,
    /// Run the schema validator before building the tree.
    pub validate_schema: bool,
    /// Use a hardened reader that rejects DOCTYPE declarations.
    pub safe_mode: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Utf8,
            validate_schema: false,
            safe_mode: true,
        }
    }
}

impl CompileOptions {
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate_schema = validate;
        self
    }

    pub fn with_safe_mode(mut self, safe: bool) -> Self {
        self.safe_mode = safe;
        self
    }
}
