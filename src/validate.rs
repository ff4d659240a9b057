//! Schema validation before tree building.
//!
//! [`SchemaValidator`] is the seam for a full XSD validator. The built-in
//! [`StructuralValidator`] checks well-formedness, the root element and that
//! every element in the CMMN namespace is one the compiler understands or
//! deliberately ignores.

use rustc_hash::FxHashSet;

use crate::error::ValidationError;
use crate::model::namespace;
use crate::reader::{HandlerRegistry, StartTag, Token, TokenReader};

/// Accepts or rejects a whole document.
pub trait SchemaValidator: Send + Sync {
    fn validate(&self, text: &str) -> Result<(), ValidationError>;
}

/// CMMN elements that are valid but carry nothing the compiler models.
const IGNORED_ELEMENTS: &[&str] = &[
    "caseFileModel",
    "caseFileItem",
    "caseFileItemDefinition",
    "caseFileItemOnPart",
    "caseFileItemStartTrigger",
    "caseRoles",
    "role",
    "input",
    "output",
    "parameterMapping",
    "transformation",
    "planningTable",
    "discretionaryItem",
    "applicabilityRule",
    "body",
    "import",
    "relationship",
    "extension",
    "property",
    "children",
    "sourceRef",
    "targetRef",
];

pub struct StructuralValidator {
    known: FxHashSet<String>,
}

impl StructuralValidator {
    /// Validator accepting whatever `registry` handles plus the ignored
    /// CMMN elements.
    pub fn new(registry: &HandlerRegistry) -> Self {
        let known = registry
            .element_names()
            .chain(registry.text_names())
            .chain(IGNORED_ELEMENTS.iter().copied())
            .map(str::to_string)
            .collect();
        Self { known }
    }
}

impl SchemaValidator for StructuralValidator {
    fn validate(&self, text: &str) -> Result<(), ValidationError> {
        let mut tokens = TokenReader::new(text, true);
        // One frame of (prefix, uri) declarations per open element.
        let mut scopes: Vec<Vec<(String, String)>> = Vec::new();
        // Depth of the open extensionElements block, if any.
        let mut extension_depth: Option<usize> = None;
        let mut seen_root = false;

        loop {
            let token = tokens
                .next_token()
                .map_err(|e| ValidationError::new(e.to_string()))?;
            match token {
                Token::Start(tag) => {
                    scopes.push(declarations(&tag));
                    let uri = resolve_prefix(&scopes, tag.prefix.as_deref());

                    if !seen_root {
                        seen_root = true;
                        if tag.local != "definitions" || uri != Some(namespace::CMMN) {
                            return Err(ValidationError::new(format!(
                                "Root element must be 'definitions' in namespace {}, found '{}'",
                                namespace::CMMN,
                                tag.name
                            ))
                            .at(tag.position));
                        }
                    }

                    if extension_depth.is_some() {
                        continue;
                    }
                    if tag.local == "extensionElements" {
                        extension_depth = Some(tokens.depth());
                    }
                    if uri == Some(namespace::CMMN) && !self.known.contains(&tag.local) {
                        return Err(ValidationError::new(format!(
                            "Unknown element '{}'",
                            tag.name
                        ))
                        .at(tag.position));
                    }
                }
                Token::End(_) => {
                    scopes.pop();
                    if extension_depth.is_some_and(|d| tokens.depth() < d) {
                        extension_depth = None;
                    }
                }
                Token::Text(_) => {}
                Token::Eof => break,
            }
        }

        if !seen_root {
            return Err(ValidationError::new("Document has no root element"));
        }
        Ok(())
    }
}

fn declarations(tag: &StartTag) -> Vec<(String, String)> {
    tag.attributes
        .iter()
        .filter_map(|(key, value)| {
            if key == "xmlns" {
                Some((String::new(), value.clone()))
            } else {
                key.strip_prefix("xmlns:")
                    .map(|prefix| (prefix.to_string(), value.clone()))
            }
        })
        .collect()
}

fn resolve_prefix<'a>(scopes: &'a [Vec<(String, String)>], prefix: Option<&str>) -> Option<&'a str> {
    let prefix = prefix.unwrap_or("");
    scopes
        .iter()
        .rev()
        .flat_map(|frame| frame.iter())
        .find(|(p, _)| p == prefix)
        .map(|(_, uri)| uri.as_str())
}
