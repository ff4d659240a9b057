//! Presentational overlay: bounds, waypoints, associations, annotations.

use super::element::BaseElement;

/// Bounds of a shape, or a single waypoint (width/height zero).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GraphicInfo {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl GraphicInfo {
    pub fn bounds(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn point(x: f64, y: f64) -> Self {
        Self::bounds(x, y, 0.0, 0.0)
    }
}

/// A directed visual connection between two elements.
#[derive(Clone, Debug, Default)]
pub struct Association {
    pub base: BaseElement,
    pub source_ref: Option<String>,
    pub target_ref: Option<String>,
    /// Standard event of the sentry on-part the connection depicts.
    pub transition_event: Option<String>,
    /// True when synthesized from a diagram edge rather than authored.
    pub from_diagram: bool,
}

impl Association {
    pub fn id(&self) -> Option<&str> {
        self.base.id()
    }
}

#[derive(Clone, Debug, Default)]
pub struct TextAnnotation {
    pub base: BaseElement,
    pub text: Option<String>,
    pub text_format: Option<String>,
}

/// A `CMMNDiagram` header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DiagramInfo {
    pub id: Option<String>,
    pub name: Option<String>,
}
