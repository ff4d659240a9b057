//! Element handler registry.
//!
//! Maps element local names to the handler that converts them. The standard
//! registry is built once per process and shared read-only by every
//! compilation; custom registries can be assembled with
//! [`HandlerRegistry::standard`] plus extra registrations before first use.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

use super::context::ParseContext;
use super::handlers;
use super::tokens::{StartTag, TokenReader};
use crate::error::CompileError;
use crate::model::ElementRef;

/// Converts one kind of element into model nodes.
pub trait ElementHandler: Send + Sync {
    /// Convert the element whose start tag was just read.
    ///
    /// Returns the created node, which the tree builder stamps with the
    /// `id` attribute and source position, or `None` for handlers that only
    /// update the parse context.
    fn convert(
        &self,
        tag: &StartTag,
        tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError>;

    /// Case-scoped nodes become the current semantic element while open.
    fn is_case_scoped(&self) -> bool {
        true
    }

    /// Handlers that drive the token stream themselves return only after
    /// consuming their own end tag; the builder then sees no end token.
    fn consumes_element(&self) -> bool {
        false
    }

    /// Called when the element's end tag is reached.
    fn on_close(&self, _ctx: &mut ParseContext) {}
}

/// Converts the text content of a character-data element.
pub trait TextHandler: Send + Sync {
    fn convert(&self, tag: &StartTag, text: &str, ctx: &mut ParseContext) -> Result<(), CompileError>;
}

/// Name → handler tables for elements and text elements.
#[derive(Default)]
pub struct HandlerRegistry {
    elements: FxHashMap<&'static str, Box<dyn ElementHandler>>,
    texts: FxHashMap<&'static str, Box<dyn TextHandler>>,
}

impl HandlerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every handler of the CMMN dialect.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        handlers::register_all(&mut registry);
        registry
    }

    /// The process-wide standard registry.
    pub fn global() -> &'static HandlerRegistry {
        static REGISTRY: OnceLock<HandlerRegistry> = OnceLock::new();
        REGISTRY.get_or_init(HandlerRegistry::standard)
    }

    pub fn register_element(&mut self, name: &'static str, handler: impl ElementHandler + 'static) {
        self.elements.insert(name, Box::new(handler));
    }

    pub fn register_text(&mut self, name: &'static str, handler: impl TextHandler + 'static) {
        self.texts.insert(name, Box::new(handler));
    }

    pub fn element_handler(&self, local: &str) -> Option<&dyn ElementHandler> {
        self.elements.get(local).map(|h| h.as_ref())
    }

    pub fn text_handler(&self, local: &str) -> Option<&dyn TextHandler> {
        self.texts.get(local).map(|h| h.as_ref())
    }

    /// True if either table knows the name.
    pub fn knows(&self, local: &str) -> bool {
        self.elements.contains_key(local) || self.texts.contains_key(local)
    }

    pub fn element_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.elements.keys().copied()
    }

    pub fn text_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.texts.keys().copied()
    }
}
