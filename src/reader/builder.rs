//! Streaming tree builder.
//!
//! Walks the token stream once, dispatching each start tag to its registered
//! handler and each end tag to the handler that opened it. Unregistered
//! elements are skipped together with their content.

use tracing::trace;

use super::context::{ParseContext, ParsedDocument};
use super::registry::{ElementHandler, HandlerRegistry};
use super::tokens::{StartTag, Token, TokenReader};
use crate::error::CompileError;
use crate::model::ElementRef;

/// An element opened by a handler and not yet closed.
struct Frame<'r> {
    handler: &'r dyn ElementHandler,
    /// Whether the element became the current semantic element.
    entered: bool,
}

/// Build the element tree of a document.
pub fn build(
    text: &str,
    registry: &HandlerRegistry,
    safe_mode: bool,
) -> Result<ParsedDocument, CompileError> {
    let mut tokens = TokenReader::new(text, safe_mode);
    let mut ctx = ParseContext::new();
    let mut frames: Vec<Frame<'_>> = Vec::new();

    loop {
        match tokens.next_token()? {
            Token::Start(tag) => {
                if let Some(handler) = registry.text_handler(&tag.local) {
                    let content = tokens.read_text()?;
                    trace!(element = %tag.name, "text");
                    handler.convert(&tag, content.trim(), &mut ctx)?;
                    continue;
                }

                let Some(handler) = registry.element_handler(&tag.local) else {
                    trace!(element = %tag.name, "skipping unregistered element");
                    tokens.skip_element()?;
                    continue;
                };

                trace!(element = %tag.name, "dispatch");
                let node = handler.convert(&tag, &mut tokens, &mut ctx)?;
                let mut entered = false;
                if let Some(node) = node {
                    stamp(&mut ctx, node, &tag);
                    if let ElementRef::Definition(definition) = node {
                        ctx.attach_definition(definition);
                    }
                    if handler.is_case_scoped() {
                        ctx.enter_element(node);
                        entered = true;
                    }
                }

                let frame = Frame { handler, entered };
                if handler.consumes_element() {
                    close(frame, &mut ctx);
                } else {
                    frames.push(frame);
                }
            }
            Token::End(local) => match frames.pop() {
                Some(frame) => close(frame, &mut ctx),
                None => {
                    return Err(CompileError::structural_at(
                        format!("Unexpected closing tag '{local}'"),
                        tokens.position(),
                    ));
                }
            },
            Token::Text(_) => {}
            Token::Eof => break,
        }
    }

    Ok(ctx.finish())
}

fn close(frame: Frame<'_>, ctx: &mut ParseContext) {
    frame.handler.on_close(ctx);
    if frame.entered {
        ctx.leave_element();
    }
}

/// Copy the `id` attribute and the start tag position onto a new node.
fn stamp(ctx: &mut ParseContext, node: ElementRef, tag: &StartTag) {
    if let Some(base) = ctx.model_mut().base_mut(node) {
        if let Some(id) = tag.attr_string("id") {
            base.id = Some(id);
        }
        base.position = Some(tag.position);
    }
}
