//! Output element tree.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::CompileError;
use crate::model::ExtensionElement;

/// An element to be written, with attributes in output order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    /// Attribute written only when present and non-empty.
    pub fn opt_attr(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value.filter(|v| !v.is_empty()) {
            Some(value) => self.attr(name, value),
            None => self,
        }
    }

    /// Boolean attribute written only when it differs from its default.
    pub fn flag(self, name: impl Into<String>, value: bool, default: bool) -> Self {
        if value == default {
            self
        } else {
            self.attr(name, value.to_string())
        }
    }

    pub fn list_attr(self, name: impl Into<String>, values: &[String]) -> Self {
        if values.is_empty() {
            self
        } else {
            self.attr(name, values.join(","))
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: XmlNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn opt_child(self, child: Option<XmlNode>) -> Self {
        match child {
            Some(child) => self.child(child),
            None => self,
        }
    }

    pub fn children(mut self, children: impl IntoIterator<Item = XmlNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// A text-only element, or nothing for absent text.
    pub fn text_element(name: impl Into<String>, text: Option<&str>) -> Option<Self> {
        text.map(|t| Self::new(name).text(t))
    }

    /// Serialize this node and its descendants.
    pub fn write_to<W: Write>(&self, writer: &mut Writer<W>) -> Result<(), CompileError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }

        if self.children.is_empty() && self.text.is_none() {
            return emit(writer, Event::Empty(start));
        }

        emit(writer, Event::Start(start))?;
        if let Some(text) = &self.text {
            emit(writer, Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write_to(writer)?;
        }
        emit(writer, Event::End(BytesEnd::new(self.name.as_str())))
    }
}

impl From<&ExtensionElement> for XmlNode {
    fn from(element: &ExtensionElement) -> Self {
        XmlNode {
            name: element.qualified_name(),
            attributes: element
                .attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            text: element.text.clone(),
            children: element.children.iter().map(XmlNode::from).collect(),
        }
    }
}

fn emit<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<(), CompileError> {
    writer
        .write_event(event)
        .map_err(|e| CompileError::xml(format!("Write error: {e}")))
}
