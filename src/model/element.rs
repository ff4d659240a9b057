//! Attributes shared by every semantic element.

use indexmap::IndexMap;

use crate::base::LineCol;

/// Identity, source position, documentation and extension content.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BaseElement {
    /// Authored or generated identifier. `None` until identifier completion
    /// for elements the author left anonymous.
    pub id: Option<String>,
    /// Start tag position in the source document.
    pub position: Option<LineCol>,
    pub documentation: Option<String>,
    pub extension_elements: Vec<ExtensionElement>,
}

impl BaseElement {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// The identifier, or an empty string for anonymous elements.
    pub fn id_or_empty(&self) -> &str {
        self.id.as_deref().unwrap_or("")
    }

    pub fn has_id(&self) -> bool {
        self.id().is_some()
    }

    pub fn has_id_value(&self, value: &str) -> bool {
        self.id() == Some(value)
    }
}

/// Free-form content of an `extensionElements` block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtensionElement {
    /// Namespace prefix as authored (`flowable` in `flowable:field`).
    pub prefix: Option<String>,
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub text: Option<String>,
    pub children: Vec<ExtensionElement>,
}

impl ExtensionElement {
    pub fn new(prefix: Option<String>, name: impl Into<String>) -> Self {
        Self {
            prefix,
            name: name.into(),
            ..Self::default()
        }
    }

    /// `prefix:name`, or the bare name.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn child(&self, name: &str) -> Option<&ExtensionElement> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// A `flowable:field` injection on a task.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldExtension {
    pub name: String,
    pub string_value: Option<String>,
    pub expression: Option<String>,
}

impl FieldExtension {
    /// Build a field from its extension element: values may be given as
    /// attributes or as `string`/`expression` children.
    pub fn from_extension(element: &ExtensionElement) -> Option<Self> {
        let name = element.attribute("name")?.to_string();
        let string_value = element
            .attribute("stringValue")
            .map(str::to_string)
            .or_else(|| element.child("string").and_then(|c| c.text.clone()));
        let expression = element
            .attribute("expression")
            .map(str::to_string)
            .or_else(|| element.child("expression").and_then(|c| c.text.clone()));
        Some(Self {
            name,
            string_value,
            expression,
        })
    }
}
