//! CMMN DI: diagrams, shapes, edges, labels, bounds and waypoints.
//!
//! Diagram elements are recorded as-is and merged with the semantic model
//! only after reference resolution.

use super::parse_number;
use crate::error::CompileError;
use crate::model::{DiagramInfo, ElementRef, GraphicInfo};
use crate::reader::context::{EdgeRecord, ParseContext, ShapeRecord};
use crate::reader::registry::ElementHandler;
use crate::reader::tokens::{StartTag, TokenReader};

/// `CMMNDI`: only makes its children visible to the builder.
pub struct ContainerHandler;

impl ElementHandler for ContainerHandler {
    fn convert(
        &self,
        _tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        _ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        Ok(None)
    }

    fn is_case_scoped(&self) -> bool {
        false
    }
}

pub struct DiagramHandler;

impl ElementHandler for DiagramHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        ctx.model_mut().diagrams.push(DiagramInfo {
            id: tag.attr_string("id"),
            name: tag.attr_string("name"),
        });
        Ok(None)
    }

    fn is_case_scoped(&self) -> bool {
        false
    }
}

pub struct ShapeHandler;

impl ElementHandler for ShapeHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        ctx.begin_shape(ShapeRecord {
            id: tag.attr_string("id"),
            element_ref: tag.attr_string("cmmnElementRef"),
            position: Some(tag.position),
            ..ShapeRecord::default()
        });
        Ok(None)
    }

    fn is_case_scoped(&self) -> bool {
        false
    }

    fn on_close(&self, ctx: &mut ParseContext) {
        ctx.end_diagram_element();
    }
}

pub struct EdgeHandler;

impl ElementHandler for EdgeHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        ctx.begin_edge(EdgeRecord {
            id: tag.attr_string("id"),
            element_ref: tag.attr_string("cmmnElementRef"),
            source_ref: tag.attr_string("sourceCMMNElementRef"),
            target_ref: tag.attr_string("targetCMMNElementRef"),
            position: Some(tag.position),
            ..EdgeRecord::default()
        });
        Ok(None)
    }

    fn is_case_scoped(&self) -> bool {
        false
    }

    fn on_close(&self, ctx: &mut ParseContext) {
        ctx.end_diagram_element();
    }
}

pub struct LabelHandler;

impl ElementHandler for LabelHandler {
    fn convert(
        &self,
        _tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        ctx.set_in_label(true);
        Ok(None)
    }

    fn is_case_scoped(&self) -> bool {
        false
    }

    fn on_close(&self, ctx: &mut ParseContext) {
        ctx.set_in_label(false);
    }
}

/// `dc:Bounds` of the open shape or label.
pub struct BoundsHandler;

impl ElementHandler for BoundsHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let bounds = GraphicInfo::bounds(
            coordinate(tag, "x")?,
            coordinate(tag, "y")?,
            coordinate(tag, "width")?,
            coordinate(tag, "height")?,
        );
        ctx.add_bounds(bounds);
        Ok(None)
    }

    fn is_case_scoped(&self) -> bool {
        false
    }
}

/// `di:waypoint` of the open edge.
pub struct WaypointHandler;

impl ElementHandler for WaypointHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        ctx.add_waypoint(GraphicInfo::point(coordinate(tag, "x")?, coordinate(tag, "y")?));
        Ok(None)
    }

    fn is_case_scoped(&self) -> bool {
        false
    }
}

/// Missing coordinates default to zero.
fn coordinate(tag: &StartTag, name: &str) -> Result<f64, CompileError> {
    Ok(parse_number(tag, name, tag.attr(name))?.unwrap_or(0.0))
}
