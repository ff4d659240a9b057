//! `extensionElements`: free-form vendor content.
//!
//! The block is read by driving the token stream directly instead of
//! dispatching through the registry, so its children may use any names
//! (including ones the registry knows, such as `condition`).

use crate::error::CompileError;
use crate::model::{ElementRef, ExtensionElement, FieldExtension};
use crate::reader::context::ParseContext;
use crate::reader::registry::ElementHandler;
use crate::reader::tokens::{StartTag, Token, TokenReader};

pub struct ExtensionElementsHandler;

impl ElementHandler for ExtensionElementsHandler {
    fn convert(
        &self,
        tag: &StartTag,
        tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let elements = read_block(tag, tokens)?;
        let Some(owner) = ctx.current_element() else {
            tracing::trace!("dropping extension elements outside any semantic element");
            return Ok(None);
        };

        if let ElementRef::Definition(def) = owner {
            let fields: Vec<FieldExtension> = elements
                .iter()
                .filter(|e| e.name == "field")
                .filter_map(FieldExtension::from_extension)
                .collect();
            if let Some(task) = ctx.model_mut().definition_mut(def).as_task_mut() {
                task.field_extensions.extend(fields);
            }
        }
        if let Some(base) = ctx.model_mut().base_mut(owner) {
            base.extension_elements.extend(elements);
        }
        Ok(None)
    }

    fn is_case_scoped(&self) -> bool {
        false
    }

    fn consumes_element(&self) -> bool {
        true
    }
}

/// Read the children of the block whose start tag was just returned, up to
/// and including its end tag.
fn read_block(
    tag: &StartTag,
    tokens: &mut TokenReader<'_>,
) -> Result<Vec<ExtensionElement>, CompileError> {
    let target = tokens.depth();
    let mut open: Vec<ExtensionElement> = Vec::new();
    let mut roots = Vec::new();

    loop {
        match tokens.next_token()? {
            Token::Start(child) => {
                let mut element = ExtensionElement::new(child.prefix, child.local);
                element.attributes = child.attributes;
                open.push(element);
            }
            Token::Text(text) => {
                if let Some(current) = open.last_mut() {
                    current.text.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Token::End(_) => {
                if tokens.depth() < target {
                    return Ok(roots);
                }
                if let Some(done) = open.pop() {
                    match open.last_mut() {
                        Some(parent) => parent.children.push(done),
                        None => roots.push(done),
                    }
                }
            }
            Token::Eof => {
                return Err(CompileError::structural_at(
                    format!("Unexpected end of input inside <{}>", tag.name),
                    tag.position,
                ));
            }
        }
    }
}
