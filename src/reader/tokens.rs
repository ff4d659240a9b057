//! Token stream over a CMMN document.
//!
//! Wraps a `quick_xml::Reader` and normalises its events into start / end /
//! text tokens: self-closing elements are reported as a start token followed
//! by a synthetic end token, so handlers never need to distinguish the two.

use indexmap::IndexMap;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::base::{LineCol, LineIndex};
use crate::error::CompileError;

/// An element start tag with its attributes decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StartTag {
    /// Qualified name as written (`flowable:field`).
    pub name: String,
    /// Local part of the name (`field`).
    pub local: String,
    pub prefix: Option<String>,
    /// Attributes by qualified name, in document order.
    pub attributes: IndexMap<String, String>,
    pub position: LineCol,
}

impl StartTag {
    /// Unprefixed attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Non-empty unprefixed attribute, owned.
    pub fn attr_string(&self, name: &str) -> Option<String> {
        self.attr(name)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Extension attribute: a prefixed attribute whose local name matches.
    /// Namespace plumbing prefixes (`xmlns`, `xsi`, `xml`) are skipped.
    pub fn ext_attr(&self, local: &str) -> Option<&str> {
        self.attributes.iter().find_map(|(key, value)| {
            let (prefix, name) = key.split_once(':')?;
            if name == local && !matches!(prefix, "xmlns" | "xsi" | "xml") {
                Some(value.as_str())
            } else {
                None
            }
        })
    }

    pub fn ext_attr_string(&self, local: &str) -> Option<String> {
        self.ext_attr(local)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Unprefixed attribute, falling back to the extension attribute.
    pub fn any_attr(&self, local: &str) -> Option<&str> {
        self.attr(local).or_else(|| self.ext_attr(local))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    Start(StartTag),
    /// Local name of the closed element.
    End(String),
    Text(String),
    Eof,
}

/// Streaming reader with depth tracking.
pub struct TokenReader<'a> {
    reader: Reader<&'a [u8]>,
    lines: LineIndex,
    depth: usize,
    pending_end: Option<String>,
    safe_mode: bool,
}

impl<'a> TokenReader<'a> {
    pub fn new(text: &'a str, safe_mode: bool) -> Self {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);
        Self {
            reader,
            lines: LineIndex::new(text),
            depth: 0,
            pending_end: None,
            safe_mode,
        }
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn position(&self) -> LineCol {
        self.lines.line_col(self.reader.buffer_position() as usize)
    }

    pub fn next_token(&mut self) -> Result<Token, CompileError> {
        if let Some(local) = self.pending_end.take() {
            self.depth -= 1;
            return Ok(Token::End(local));
        }

        loop {
            let event = self.reader.read_event().map_err(|e| {
                let offset = self.reader.error_position() as usize;
                CompileError::structural_at(format!("XML parse error: {e}"), self.lines.line_col(offset))
            })?;
            let end_offset = self.reader.buffer_position() as usize;

            match event {
                Event::Start(e) => {
                    let tag = self.start_tag(&e, end_offset.saturating_sub(e.len() + 2))?;
                    self.depth += 1;
                    return Ok(Token::Start(tag));
                }
                Event::Empty(e) => {
                    let tag = self.start_tag(&e, end_offset.saturating_sub(e.len() + 3))?;
                    self.depth += 1;
                    self.pending_end = Some(tag.local.clone());
                    return Ok(Token::Start(tag));
                }
                Event::End(e) => {
                    let name = decode_name(e.name().as_ref())?;
                    if self.depth == 0 {
                        return Err(CompileError::structural_at(
                            format!("Unbalanced closing tag '{name}'"),
                            self.position(),
                        ));
                    }
                    self.depth -= 1;
                    return Ok(Token::End(local_name(&name).to_string()));
                }
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| {
                        CompileError::structural_at(format!("Invalid text: {e}"), self.position())
                    })?;
                    if !text.trim().is_empty() {
                        return Ok(Token::Text(text.into_owned()));
                    }
                }
                Event::CData(c) => {
                    let text = String::from_utf8_lossy(&c).into_owned();
                    if !text.trim().is_empty() {
                        return Ok(Token::Text(text.trim().to_string()));
                    }
                }
                Event::DocType(_) if self.safe_mode => {
                    return Err(CompileError::structural_at(
                        "DOCTYPE declarations are not allowed",
                        self.position(),
                    ));
                }
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(CompileError::structural_at(
                            format!("Unexpected end of input with {} unclosed element(s)", self.depth),
                            self.position(),
                        ));
                    }
                    return Ok(Token::Eof);
                }
                _ => {}
            }
        }
    }

    /// Collect the text content of the element whose start tag was just
    /// returned, consuming everything up to and including its end tag.
    pub fn read_text(&mut self) -> Result<String, CompileError> {
        let target = self.depth;
        let mut text = String::new();
        loop {
            match self.next_token()? {
                Token::Text(t) => text.push_str(&t),
                Token::End(_) if self.depth < target => return Ok(text),
                Token::Eof => {
                    return Err(CompileError::structural_at(
                        "Unexpected end of input inside text element",
                        self.position(),
                    ));
                }
                _ => {}
            }
        }
    }

    /// Skip the element whose start tag was just returned.
    pub fn skip_element(&mut self) -> Result<(), CompileError> {
        let target = self.depth;
        loop {
            match self.next_token()? {
                Token::End(_) if self.depth < target => return Ok(()),
                Token::Eof => {
                    return Err(CompileError::structural_at(
                        "Unexpected end of input",
                        self.position(),
                    ));
                }
                _ => {}
            }
        }
    }

    fn start_tag(&self, e: &BytesStart<'_>, offset: usize) -> Result<StartTag, CompileError> {
        let name = decode_name(e.name().as_ref())?;
        let (prefix, local) = match name.split_once(':') {
            Some((p, l)) => (Some(p.to_string()), l.to_string()),
            None => (None, name.clone()),
        };

        let mut attributes = IndexMap::new();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| {
                CompileError::structural_at(format!("Attribute error: {e}"), self.position())
            })?;
            let key = decode_name(attr.key.as_ref())?;
            let value = attr
                .unescape_value()
                .map_err(|e| {
                    CompileError::structural_at(format!("Attribute value error: {e}"), self.position())
                })?
                .into_owned();
            attributes.insert(key, value);
        }

        Ok(StartTag {
            name,
            local,
            prefix,
            attributes,
            position: self.lines.line_col(offset),
        })
    }
}

fn decode_name(bytes: &[u8]) -> Result<String, CompileError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| CompileError::structural(format!("Invalid name: {e}")))
}

/// Local part of a qualified name.
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, l)| l).unwrap_or(name)
}
