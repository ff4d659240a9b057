//! Parse context: all mutable state of one compilation.
//!
//! A context is created per compilation call and threaded explicitly through
//! every handler, so concurrent compilations never share state.

use crate::base::LineCol;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::CompileError;
use crate::model::{
    CaseId, CmmnModel, CriterionId, DefinitionId, ElementRef, GraphicInfo, ItemControl,
    PlanItemId, RuleKind, SentryId,
};

use super::tokens::StartTag;

/// Flat per-category lists in encounter order, consumed by the resolver and
/// identifier completion instead of re-walking the tree.
#[derive(Clone, Debug, Default)]
pub struct Collections {
    /// Stages, case plan models included.
    pub stages: Vec<DefinitionId>,
    /// Plan fragments that are not stages.
    pub plan_fragments: Vec<DefinitionId>,
    /// Definitions that are neither stages nor plan fragments.
    pub definitions: Vec<DefinitionId>,
    pub plan_items: Vec<PlanItemId>,
    pub sentries: Vec<SentryId>,
    pub on_parts: Vec<(SentryId, u32)>,
    pub if_parts: Vec<SentryId>,
    pub entry_criteria: Vec<CriterionId>,
    pub exit_criteria: Vec<CriterionId>,
    pub timer_listeners: Vec<DefinitionId>,
    /// Definitions parsed without an id, attached once ids are completed.
    pub pending_definitions: Vec<DefinitionId>,
    pub process_tasks: Vec<DefinitionId>,
    pub decision_tasks: Vec<DefinitionId>,
}

/// A `CMMNShape` as parsed, before reconciliation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeRecord {
    pub id: Option<String>,
    pub element_ref: Option<String>,
    pub bounds: Option<GraphicInfo>,
    pub label_bounds: Option<GraphicInfo>,
    pub position: Option<LineCol>,
}

/// A `CMMNEdge` as parsed, before reconciliation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeRecord {
    pub id: Option<String>,
    pub element_ref: Option<String>,
    pub source_ref: Option<String>,
    pub target_ref: Option<String>,
    pub waypoints: Vec<GraphicInfo>,
    pub label_bounds: Option<GraphicInfo>,
    pub position: Option<LineCol>,
}

#[derive(Clone, Debug, Default)]
pub struct DiagramRecords {
    pub shapes: Vec<ShapeRecord>,
    pub edges: Vec<EdgeRecord>,
}

/// Owner of an `itemControl` or `defaultControl` block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlTarget {
    PlanItem(PlanItemId),
    Definition(DefinitionId),
}

/// Where the next `condition` text goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionTarget {
    IfPart(SentryId),
    Rule(ControlTarget, RuleKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DiagramTarget {
    Shape(usize),
    Edge(usize),
}

/// Output of the tree-building phase.
pub struct ParsedDocument {
    pub model: CmmnModel,
    pub collections: Collections,
    pub diagram: DiagramRecords,
    pub diagnostics: Diagnostics,
}

pub struct ParseContext {
    pub(crate) model: CmmnModel,
    pub(crate) collections: Collections,
    pub(crate) diagram: DiagramRecords,
    pub(crate) diagnostics: Diagnostics,

    current_case: Option<CaseId>,
    /// Top = attachment point for new plan items and sentries.
    fragment_stack: Vec<DefinitionId>,
    /// Top = attachment point for nested definitions.
    stage_stack: Vec<DefinitionId>,
    /// Open case-scoped elements; top = current semantic element.
    semantic_stack: Vec<ElementRef>,

    current_sentry: Option<SentryId>,
    current_on_part: Option<(SentryId, u32)>,
    control_target: Option<ControlTarget>,
    condition_target: Option<ConditionTarget>,
    start_trigger: Option<DefinitionId>,
    diagram_target: Option<DiagramTarget>,
    in_label: bool,
}

impl Default for ParseContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseContext {
    pub fn new() -> Self {
        Self {
            model: CmmnModel::new(),
            collections: Collections::default(),
            diagram: DiagramRecords::default(),
            diagnostics: Diagnostics::new(),
            current_case: None,
            fragment_stack: Vec::new(),
            stage_stack: Vec::new(),
            semantic_stack: Vec::new(),
            current_sentry: None,
            current_on_part: None,
            control_target: None,
            condition_target: None,
            start_trigger: None,
            diagram_target: None,
            in_label: false,
        }
    }

    pub fn model(&self) -> &CmmnModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut CmmnModel {
        &mut self.model
    }

    pub fn collections_mut(&mut self) -> &mut Collections {
        &mut self.collections
    }

    /// Record a recoverable warning about an element.
    pub fn warn(&mut self, code: &'static str, message: impl Into<String>, element: Option<ElementRef>) {
        let (id, position) = match element.and_then(|e| self.model.base(e)) {
            Some(base) => (base.id.clone(), base.position),
            None => (None, None),
        };
        self.diagnostics.push(
            Diagnostic::warning(code, message.into())
                .with_element(id.as_deref())
                .with_position(position),
        );
    }

    pub fn finish(self) -> ParsedDocument {
        ParsedDocument {
            model: self.model,
            collections: self.collections,
            diagram: self.diagram,
            diagnostics: self.diagnostics,
        }
    }

    // ========================================================================
    // Case scope
    // ========================================================================

    pub fn begin_case(&mut self, case: CaseId) {
        self.current_case = Some(case);
    }

    pub fn end_case(&mut self) {
        self.current_case = None;
    }

    pub fn current_case(&self, tag: &StartTag) -> Result<CaseId, CompileError> {
        self.current_case
            .ok_or_else(|| misplaced(tag, "a case"))
    }

    // ========================================================================
    // Stage / fragment stacks
    // ========================================================================

    /// Entering a stage pushes both stacks.
    pub fn push_stage(&mut self, stage: DefinitionId) {
        self.stage_stack.push(stage);
        self.fragment_stack.push(stage);
    }

    pub fn pop_stage(&mut self) {
        self.stage_stack.pop();
        self.fragment_stack.pop();
    }

    /// Entering a plan fragment that is not a stage pushes only the fragment stack.
    pub fn push_fragment(&mut self, fragment: DefinitionId) {
        self.fragment_stack.push(fragment);
    }

    pub fn pop_fragment(&mut self) {
        self.fragment_stack.pop();
    }

    pub fn current_fragment(&self, tag: &StartTag) -> Result<DefinitionId, CompileError> {
        self.fragment_stack
            .last()
            .copied()
            .ok_or_else(|| misplaced(tag, "a stage or plan fragment"))
    }

    pub fn current_stage(&self, tag: &StartTag) -> Result<DefinitionId, CompileError> {
        self.stage_stack
            .last()
            .copied()
            .ok_or_else(|| misplaced(tag, "a stage"))
    }

    /// Attach a freshly identified definition to the stage it was declared
    /// in. Definitions still lacking an id wait for identifier completion.
    pub fn attach_definition(&mut self, definition: DefinitionId) {
        let (parent, has_id) = {
            let def = self.model.definition(definition);
            (def.parent_stage, def.base.has_id())
        };
        let Some(parent) = parent else {
            return;
        };
        if !has_id {
            self.collections.pending_definitions.push(definition);
            return;
        }
        if let Some(stage) = self.model.definition_mut(parent).as_stage_mut() {
            stage.definitions.push(definition);
        }
    }

    // ========================================================================
    // Current semantic element
    // ========================================================================

    pub fn enter_element(&mut self, element: ElementRef) {
        self.semantic_stack.push(element);
    }

    pub fn leave_element(&mut self) {
        self.semantic_stack.pop();
    }

    pub fn current_element(&self) -> Option<ElementRef> {
        self.semantic_stack.last().copied()
    }

    /// Current element, which must be a plan item definition.
    pub fn current_definition(&self, tag: &StartTag) -> Result<DefinitionId, CompileError> {
        match self.current_element() {
            Some(ElementRef::Definition(id)) => Ok(id),
            _ => Err(misplaced(tag, "a plan item definition")),
        }
    }

    // ========================================================================
    // Sentry scope
    // ========================================================================

    pub fn begin_sentry(&mut self, sentry: SentryId) {
        self.current_sentry = Some(sentry);
    }

    pub fn end_sentry(&mut self) {
        self.current_sentry = None;
        self.current_on_part = None;
    }

    pub fn current_sentry(&self, tag: &StartTag) -> Result<SentryId, CompileError> {
        self.current_sentry.ok_or_else(|| misplaced(tag, "a sentry"))
    }

    pub fn begin_on_part(&mut self, sentry: SentryId, index: u32) {
        self.current_on_part = Some((sentry, index));
    }

    pub fn end_on_part(&mut self) {
        self.current_on_part = None;
    }

    pub fn current_on_part(&self) -> Option<(SentryId, u32)> {
        self.current_on_part
    }

    // ========================================================================
    // Item control, rules and conditions
    // ========================================================================

    pub fn begin_control(&mut self, target: ControlTarget) {
        self.control_target = Some(target);
    }

    pub fn end_control(&mut self) {
        self.control_target = None;
    }

    pub fn current_control(&self, tag: &StartTag) -> Result<ControlTarget, CompileError> {
        self.control_target
            .ok_or_else(|| misplaced(tag, "an itemControl or defaultControl"))
    }

    pub fn item_control_mut(&mut self, target: ControlTarget) -> &mut ItemControl {
        let slot = match target {
            ControlTarget::PlanItem(id) => &mut self.model.plan_item_mut(id).item_control,
            ControlTarget::Definition(id) => &mut self.model.definition_mut(id).default_control,
        };
        slot.get_or_insert_with(ItemControl::default)
    }

    pub fn set_condition_target(&mut self, target: Option<ConditionTarget>) {
        self.condition_target = target;
    }

    pub fn condition_target(&self) -> Option<ConditionTarget> {
        self.condition_target
    }

    pub fn begin_start_trigger(&mut self, timer: DefinitionId) {
        self.start_trigger = Some(timer);
    }

    pub fn end_start_trigger(&mut self) {
        self.start_trigger = None;
    }

    pub fn current_start_trigger(&self) -> Option<DefinitionId> {
        self.start_trigger
    }

    // ========================================================================
    // Diagram records
    // ========================================================================

    pub fn begin_shape(&mut self, shape: ShapeRecord) {
        self.diagram.shapes.push(shape);
        self.diagram_target = Some(DiagramTarget::Shape(self.diagram.shapes.len() - 1));
    }

    pub fn begin_edge(&mut self, edge: EdgeRecord) {
        self.diagram.edges.push(edge);
        self.diagram_target = Some(DiagramTarget::Edge(self.diagram.edges.len() - 1));
    }

    pub fn end_diagram_element(&mut self) {
        self.diagram_target = None;
        self.in_label = false;
    }

    pub fn set_in_label(&mut self, in_label: bool) {
        self.in_label = in_label;
    }

    /// Attach `dc:Bounds` to the open shape, edge or label.
    pub fn add_bounds(&mut self, bounds: GraphicInfo) {
        match self.diagram_target {
            Some(DiagramTarget::Shape(index)) => {
                let shape = &mut self.diagram.shapes[index];
                if self.in_label {
                    shape.label_bounds = Some(bounds);
                } else {
                    shape.bounds = Some(bounds);
                }
            }
            Some(DiagramTarget::Edge(index)) if self.in_label => {
                self.diagram.edges[index].label_bounds = Some(bounds);
            }
            _ => {}
        }
    }

    /// Attach a `di:waypoint` to the open edge.
    pub fn add_waypoint(&mut self, point: GraphicInfo) {
        if let Some(DiagramTarget::Edge(index)) = self.diagram_target {
            self.diagram.edges[index].waypoints.push(point);
        }
    }
}

fn misplaced(tag: &StartTag, scope: &str) -> CompileError {
    CompileError::structural_at(
        format!("<{}> must be nested inside {scope}", tag.name),
        tag.position,
    )
}
