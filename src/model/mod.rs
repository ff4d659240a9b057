//! Compiled case model.
//!
//! The [`CmmnModel`] owns every element in flat arenas; the structural tree
//! (stage owns plan items, sentries and nested definitions) and all cross
//! references (plan item → definition, criterion → sentry, on-part → source)
//! are typed indices into those arenas.
//!
//! ```text
//! CmmnModel
//! ├── cases ──────────── Case { plan_model: DefinitionId, element_index }
//! ├── definitions ────── stages, plan fragments, tasks, milestones, listeners
//! ├── plan_items / sentries / criteria
//! ├── processes / decisions
//! └── location_map / label_location_map / flow_location_map
//! ```

mod case;
mod diagram;
mod element;
mod ids;
mod plan;

pub use case::{Case, Decision, Process};
pub use diagram::{Association, DiagramInfo, GraphicInfo, TextAnnotation};
pub use element::{BaseElement, ExtensionElement, FieldExtension};
pub use ids::{
    AssociationId, CaseId, CriterionId, DecisionId, DefinitionId, ElementRef, PlanItemId,
    ProcessId, SentryId, TextAnnotationId,
};
pub use plan::{
    CaseTask, Criterion, CriterionKind, CriterionOwner, DecisionTask, DefinitionKind,
    EventListener, HumanTask, ItemControl, Milestone, PlainTask, PlanFragment, PlanItem,
    PlanItemDefinition, ProcessTask, RepetitionRule, Rule, RuleKind, Sentry, SentryIfPart,
    SentryOnPart, Stage, StartTrigger, Task, TaskKind, TimerEventListener,
};

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// XML namespaces of the document dialect.
pub mod namespace {
    /// CMMN 1.1 model namespace.
    pub const CMMN: &str = "http://www.omg.org/spec/CMMN/20151109/MODEL";
    /// Flowable extension namespace.
    pub const FLOWABLE: &str = "http://flowable.org/cmmn";
    pub const CMMNDI: &str = "http://www.omg.org/spec/CMMN/20151109/CMMNDI";
    pub const DC: &str = "http://www.omg.org/spec/CMMN/20151109/DC";
    pub const DI: &str = "http://www.omg.org/spec/CMMN/20151109/DI";
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
}

/// A compiled (or in-progress) CMMN document.
#[derive(Clone, Debug, Default)]
pub struct CmmnModel {
    pub target_namespace: Option<String>,
    pub expression_language: Option<String>,
    pub exporter: Option<String>,
    pub exporter_version: Option<String>,
    pub author: Option<String>,
    pub creation_date: Option<DateTime<FixedOffset>>,
    /// `xmlns` declarations of the root element (prefix → URI, `""` for the
    /// default namespace).
    pub namespaces: IndexMap<String, String>,

    pub cases: Vec<Case>,
    pub definitions: Vec<PlanItemDefinition>,
    pub plan_items: Vec<PlanItem>,
    pub sentries: Vec<Sentry>,
    pub criteria: Vec<Criterion>,
    pub processes: Vec<Process>,
    pub decisions: Vec<Decision>,
    pub associations: Vec<Association>,
    pub text_annotations: Vec<TextAnnotation>,

    pub diagrams: Vec<DiagramInfo>,
    /// Shape bounds by semantic element id.
    pub location_map: IndexMap<String, GraphicInfo>,
    /// Label bounds by semantic element or association id.
    pub label_location_map: IndexMap<String, GraphicInfo>,
    /// Edge waypoints by association id.
    pub flow_location_map: IndexMap<String, Vec<GraphicInfo>>,
}

impl CmmnModel {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Arena insertion
    // ========================================================================

    pub fn add_case(&mut self, case: Case) -> CaseId {
        self.cases.push(case);
        CaseId::new(self.cases.len() - 1)
    }

    pub fn add_definition(&mut self, definition: PlanItemDefinition) -> DefinitionId {
        self.definitions.push(definition);
        DefinitionId::new(self.definitions.len() - 1)
    }

    pub fn add_plan_item(&mut self, plan_item: PlanItem) -> PlanItemId {
        self.plan_items.push(plan_item);
        PlanItemId::new(self.plan_items.len() - 1)
    }

    pub fn add_sentry(&mut self, sentry: Sentry) -> SentryId {
        self.sentries.push(sentry);
        SentryId::new(self.sentries.len() - 1)
    }

    pub fn add_criterion(&mut self, criterion: Criterion) -> CriterionId {
        self.criteria.push(criterion);
        CriterionId::new(self.criteria.len() - 1)
    }

    pub fn add_process(&mut self, process: Process) -> ProcessId {
        self.processes.push(process);
        ProcessId::new(self.processes.len() - 1)
    }

    pub fn add_decision(&mut self, decision: Decision) -> DecisionId {
        self.decisions.push(decision);
        DecisionId::new(self.decisions.len() - 1)
    }

    pub fn add_association(&mut self, association: Association) -> AssociationId {
        self.associations.push(association);
        AssociationId::new(self.associations.len() - 1)
    }

    pub fn add_text_annotation(&mut self, annotation: TextAnnotation) -> TextAnnotationId {
        self.text_annotations.push(annotation);
        TextAnnotationId::new(self.text_annotations.len() - 1)
    }

    // ========================================================================
    // Arena access
    // ========================================================================

    pub fn case(&self, id: CaseId) -> &Case {
        &self.cases[id.index()]
    }

    pub fn case_mut(&mut self, id: CaseId) -> &mut Case {
        &mut self.cases[id.index()]
    }

    pub fn definition(&self, id: DefinitionId) -> &PlanItemDefinition {
        &self.definitions[id.index()]
    }

    pub fn definition_mut(&mut self, id: DefinitionId) -> &mut PlanItemDefinition {
        &mut self.definitions[id.index()]
    }

    pub fn plan_item(&self, id: PlanItemId) -> &PlanItem {
        &self.plan_items[id.index()]
    }

    pub fn plan_item_mut(&mut self, id: PlanItemId) -> &mut PlanItem {
        &mut self.plan_items[id.index()]
    }

    pub fn sentry(&self, id: SentryId) -> &Sentry {
        &self.sentries[id.index()]
    }

    pub fn sentry_mut(&mut self, id: SentryId) -> &mut Sentry {
        &mut self.sentries[id.index()]
    }

    pub fn criterion(&self, id: CriterionId) -> &Criterion {
        &self.criteria[id.index()]
    }

    pub fn criterion_mut(&mut self, id: CriterionId) -> &mut Criterion {
        &mut self.criteria[id.index()]
    }

    /// Shared attributes of any element.
    pub fn base(&self, element: ElementRef) -> Option<&BaseElement> {
        Some(match element {
            ElementRef::Case(id) => &self.cases.get(id.index())?.base,
            ElementRef::Definition(id) => &self.definitions.get(id.index())?.base,
            ElementRef::PlanItem(id) => &self.plan_items.get(id.index())?.base,
            ElementRef::Sentry(id) => &self.sentries.get(id.index())?.base,
            ElementRef::OnPart(id, index) => {
                &self.sentries.get(id.index())?.on_parts.get(index as usize)?.base
            }
            ElementRef::IfPart(id) => &self.sentries.get(id.index())?.if_part.as_ref()?.base,
            ElementRef::Criterion(id) => &self.criteria.get(id.index())?.base,
            ElementRef::Process(id) => &self.processes.get(id.index())?.base,
            ElementRef::Decision(id) => &self.decisions.get(id.index())?.base,
            ElementRef::Association(id) => &self.associations.get(id.index())?.base,
            ElementRef::TextAnnotation(id) => &self.text_annotations.get(id.index())?.base,
        })
    }

    pub fn base_mut(&mut self, element: ElementRef) -> Option<&mut BaseElement> {
        Some(match element {
            ElementRef::Case(id) => &mut self.cases.get_mut(id.index())?.base,
            ElementRef::Definition(id) => &mut self.definitions.get_mut(id.index())?.base,
            ElementRef::PlanItem(id) => &mut self.plan_items.get_mut(id.index())?.base,
            ElementRef::Sentry(id) => &mut self.sentries.get_mut(id.index())?.base,
            ElementRef::OnPart(id, index) => {
                &mut self
                    .sentries
                    .get_mut(id.index())?
                    .on_parts
                    .get_mut(index as usize)?
                    .base
            }
            ElementRef::IfPart(id) => {
                &mut self.sentries.get_mut(id.index())?.if_part.as_mut()?.base
            }
            ElementRef::Criterion(id) => &mut self.criteria.get_mut(id.index())?.base,
            ElementRef::Process(id) => &mut self.processes.get_mut(id.index())?.base,
            ElementRef::Decision(id) => &mut self.decisions.get_mut(id.index())?.base,
            ElementRef::Association(id) => &mut self.associations.get_mut(id.index())?.base,
            ElementRef::TextAnnotation(id) => {
                &mut self.text_annotations.get_mut(id.index())?.base
            }
        })
    }

    pub fn element_id(&self, element: ElementRef) -> Option<&str> {
        self.base(element)?.id()
    }

    // ========================================================================
    // Lookups by authored id
    // ========================================================================

    pub fn case_by_id(&self, id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.base.has_id_value(id))
    }

    /// The first case of the document.
    pub fn primary_case(&self) -> Option<&Case> {
        self.cases.first()
    }

    pub fn process_by_id(&self, id: &str) -> Option<ProcessId> {
        self.processes
            .iter()
            .position(|p| p.base.has_id_value(id))
            .map(ProcessId::new)
    }

    pub fn decision_by_id(&self, id: &str) -> Option<DecisionId> {
        self.decisions
            .iter()
            .position(|d| d.base.has_id_value(id))
            .map(DecisionId::new)
    }

    pub fn plan_item_by_id(&self, id: &str) -> Option<PlanItemId> {
        self.plan_items
            .iter()
            .position(|p| p.base.has_id_value(id))
            .map(PlanItemId::new)
    }

    pub fn definition_by_id(&self, id: &str) -> Option<DefinitionId> {
        self.definitions
            .iter()
            .position(|d| d.base.has_id_value(id))
            .map(DefinitionId::new)
    }

    pub fn criterion_by_id(&self, id: &str) -> Option<CriterionId> {
        self.criteria
            .iter()
            .position(|c| c.base.has_id_value(id))
            .map(CriterionId::new)
    }

    pub fn association_by_id(&self, id: &str) -> Option<AssociationId> {
        self.associations
            .iter()
            .position(|a| a.base.has_id_value(id))
            .map(AssociationId::new)
    }

    /// True if any case, process, decision, association or annotation
    /// carries this id.
    pub fn contains_element_id(&self, id: &str) -> bool {
        self.cases
            .iter()
            .any(|c| c.base.has_id_value(id) || c.element_index.contains_key(id))
            || self.processes.iter().any(|p| p.base.has_id_value(id))
            || self.decisions.iter().any(|d| d.base.has_id_value(id))
            || self.associations.iter().any(|a| a.base.has_id_value(id))
            || self.text_annotations.iter().any(|t| t.base.has_id_value(id))
    }

    // ========================================================================
    // Scoped plan item search
    // ========================================================================

    /// Search a fragment's own plan items, then the fragments those plan
    /// items instantiate, depth first. Never looks at enclosing stages.
    pub fn find_plan_item_downwards(&self, fragment: DefinitionId, id: &str) -> Option<PlanItemId> {
        let mut visited = FxHashSet::default();
        self.find_downwards_inner(fragment, id, &mut visited)
    }

    fn find_downwards_inner(
        &self,
        fragment: DefinitionId,
        id: &str,
        visited: &mut FxHashSet<DefinitionId>,
    ) -> Option<PlanItemId> {
        if !visited.insert(fragment) {
            return None;
        }
        let plan_items = &self.definition(fragment).as_fragment()?.plan_items;
        if let Some(found) = plan_items
            .iter()
            .find(|pi| self.plan_item(**pi).base.has_id_value(id))
        {
            return Some(*found);
        }
        plan_items.iter().find_map(|pi| {
            let child = self.plan_item(*pi).definition?;
            if self.definition(child).is_fragment() {
                self.find_downwards_inner(child, id, visited)
            } else {
                None
            }
        })
    }

    /// Search a fragment's own plan items, then those of each enclosing
    /// stage, up to the case plan model. Never looks into nested stages.
    pub fn find_plan_item_upwards(&self, fragment: DefinitionId, id: &str) -> Option<PlanItemId> {
        let mut current = Some(fragment);
        while let Some(scope) = current {
            let definition = self.definition(scope);
            if let Some(fragment) = definition.as_fragment() {
                if let Some(found) = fragment
                    .plan_items
                    .iter()
                    .find(|pi| self.plan_item(**pi).base.has_id_value(id))
                {
                    return Some(*found);
                }
            }
            current = definition.parent_stage;
        }
        None
    }

    /// Sentry declared directly in a fragment.
    pub fn find_sentry_in_fragment(&self, fragment: DefinitionId, id: &str) -> Option<SentryId> {
        self.definition(fragment)
            .as_fragment()?
            .sentries
            .iter()
            .copied()
            .find(|s| self.sentry(*s).base.has_id_value(id))
    }

    /// Definition declared directly in a stage.
    pub fn find_definition_in_stage(&self, stage: DefinitionId, id: &str) -> Option<DefinitionId> {
        self.definition(stage)
            .as_stage()?
            .definitions
            .iter()
            .copied()
            .find(|d| self.definition(*d).base.has_id_value(id))
    }

    // ========================================================================
    // Diagram
    // ========================================================================

    pub fn graphic_info(&self, id: &str) -> Option<&GraphicInfo> {
        self.location_map.get(id)
    }

    pub fn label_graphic_info(&self, id: &str) -> Option<&GraphicInfo> {
        self.label_location_map.get(id)
    }

    pub fn flow_graphic_info(&self, id: &str) -> Option<&[GraphicInfo]> {
        self.flow_location_map.get(id).map(Vec::as_slice)
    }

    /// Prefix bound to a namespace URI in the captured declarations.
    pub fn prefix_for(&self, uri: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .find(|(prefix, value)| value.as_str() == uri && !prefix.is_empty())
            .map(|(prefix, _)| prefix.as_str())
    }
}
