//! Plan items, plan item definitions, sentries and criteria.
//!
//! ```text
//! Stage ──owns──▶ PlanItem ──definition──▶ PlanItemDefinition
//!   │                 │
//!   ├──owns──▶ Sentry ◀──sentry── Criterion (entry | exit)
//!   │            └── SentryOnPart ──source──▶ PlanItem
//!   └──owns──▶ PlanItemDefinition (nested stages, tasks, listeners, ...)
//! ```

use super::element::{BaseElement, FieldExtension};
use super::ids::{CaseId, CriterionId, DecisionId, DefinitionId, PlanItemId, ProcessId, SentryId};

// ============================================================================
// PLAN ITEMS
// ============================================================================

/// A runtime-instantiable use of a definition inside a stage.
#[derive(Clone, Debug)]
pub struct PlanItem {
    pub base: BaseElement,
    pub name: Option<String>,
    /// Authored `definitionRef`.
    pub definition_ref: Option<String>,
    /// Resolved definition.
    pub definition: Option<DefinitionId>,
    /// Fragment (stage or plan fragment) the item is declared in.
    pub parent_fragment: DefinitionId,
    /// Nearest enclosing stage.
    pub parent_stage: DefinitionId,
    pub item_control: Option<ItemControl>,
    pub entry_criteria: Vec<CriterionId>,
    pub exit_criteria: Vec<CriterionId>,
}

impl PlanItem {
    pub fn new(parent_fragment: DefinitionId, parent_stage: DefinitionId) -> Self {
        Self {
            base: BaseElement::default(),
            name: None,
            definition_ref: None,
            definition: None,
            parent_fragment,
            parent_stage,
            item_control: None,
            entry_criteria: Vec::new(),
            exit_criteria: Vec::new(),
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.base.id()
    }
}

/// `itemControl` / `defaultControl` rules.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemControl {
    pub repetition_rule: Option<RepetitionRule>,
    pub required_rule: Option<Rule>,
    pub manual_activation_rule: Option<Rule>,
    pub completion_neutral_rule: Option<Rule>,
}

impl ItemControl {
    pub fn rule_mut(&mut self, kind: RuleKind) -> Option<&mut Rule> {
        match kind {
            RuleKind::Repetition => self.repetition_rule.as_mut().map(|r| &mut r.rule),
            RuleKind::Required => self.required_rule.as_mut(),
            RuleKind::ManualActivation => self.manual_activation_rule.as_mut(),
            RuleKind::CompletionNeutral => self.completion_neutral_rule.as_mut(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Repetition,
    Required,
    ManualActivation,
    CompletionNeutral,
}

impl RuleKind {
    pub fn element_name(&self) -> &'static str {
        match self {
            RuleKind::Repetition => "repetitionRule",
            RuleKind::Required => "requiredRule",
            RuleKind::ManualActivation => "manualActivationRule",
            RuleKind::CompletionNeutral => "completionNeutralRule",
        }
    }
}

/// A rule with an optional condition expression.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rule {
    pub id: Option<String>,
    pub name: Option<String>,
    pub condition: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RepetitionRule {
    pub rule: Rule,
    pub counter_variable: Option<String>,
    pub max_instance_count: Option<u32>,
}

// ============================================================================
// PLAN ITEM DEFINITIONS
// ============================================================================

/// A definition hosted by a stage. Stages themselves are definitions.
#[derive(Clone, Debug)]
pub struct PlanItemDefinition {
    pub base: BaseElement,
    pub name: Option<String>,
    pub case: CaseId,
    /// Hosting stage; `None` only for a case plan model.
    pub parent_stage: Option<DefinitionId>,
    pub default_control: Option<ItemControl>,
    pub kind: DefinitionKind,
}

impl PlanItemDefinition {
    pub fn new(case: CaseId, parent_stage: Option<DefinitionId>, kind: DefinitionKind) -> Self {
        Self {
            base: BaseElement::default(),
            name: None,
            case,
            parent_stage,
            default_control: None,
            kind,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.base.id()
    }

    /// Element name in the document dialect.
    pub fn element_name(&self) -> &'static str {
        match &self.kind {
            DefinitionKind::Stage(stage) if stage.is_plan_model => "casePlanModel",
            DefinitionKind::Stage(_) => "stage",
            DefinitionKind::PlanFragment(_) => "planFragment",
            DefinitionKind::Task(task) => task.kind.element_name(),
            DefinitionKind::Milestone(_) => "milestone",
            DefinitionKind::TimerEventListener(_) => "timerEventListener",
            DefinitionKind::UserEventListener(_) => "userEventListener",
            DefinitionKind::GenericEventListener(_) => "genericEventListener",
        }
    }

    pub fn as_stage(&self) -> Option<&Stage> {
        match &self.kind {
            DefinitionKind::Stage(stage) => Some(stage),
            _ => None,
        }
    }

    pub fn as_stage_mut(&mut self) -> Option<&mut Stage> {
        match &mut self.kind {
            DefinitionKind::Stage(stage) => Some(stage),
            _ => None,
        }
    }

    /// The plan fragment part of a stage or plan fragment.
    pub fn as_fragment(&self) -> Option<&PlanFragment> {
        match &self.kind {
            DefinitionKind::Stage(stage) => Some(&stage.fragment),
            DefinitionKind::PlanFragment(fragment) => Some(fragment),
            _ => None,
        }
    }

    pub fn as_fragment_mut(&mut self) -> Option<&mut PlanFragment> {
        match &mut self.kind {
            DefinitionKind::Stage(stage) => Some(&mut stage.fragment),
            DefinitionKind::PlanFragment(fragment) => Some(fragment),
            _ => None,
        }
    }

    pub fn as_task(&self) -> Option<&Task> {
        match &self.kind {
            DefinitionKind::Task(task) => Some(task),
            _ => None,
        }
    }

    pub fn as_task_mut(&mut self) -> Option<&mut Task> {
        match &mut self.kind {
            DefinitionKind::Task(task) => Some(task),
            _ => None,
        }
    }

    pub fn as_timer(&self) -> Option<&TimerEventListener> {
        match &self.kind {
            DefinitionKind::TimerEventListener(timer) => Some(timer),
            _ => None,
        }
    }

    pub fn as_timer_mut(&mut self) -> Option<&mut TimerEventListener> {
        match &mut self.kind {
            DefinitionKind::TimerEventListener(timer) => Some(timer),
            _ => None,
        }
    }

    pub fn is_stage(&self) -> bool {
        matches!(self.kind, DefinitionKind::Stage(_))
    }

    pub fn is_fragment(&self) -> bool {
        self.as_fragment().is_some()
    }

    /// Whether exit criteria may be attached to plan items using this
    /// definition. Non-blocking tasks without a blocking expression complete
    /// immediately and cannot be exited.
    pub fn allows_exit_criteria(&self) -> bool {
        match self.as_task() {
            Some(task) => task.is_blocking || task.has_blocking_expression(),
            None => true,
        }
    }

    pub fn field_extensions(&self) -> &[FieldExtension] {
        self.as_task().map(|t| t.field_extensions.as_slice()).unwrap_or(&[])
    }

    /// True for definitions that point at something deployed separately.
    pub fn has_external_reference(&self) -> bool {
        matches!(
            self.as_task().map(|t| &t.kind),
            Some(TaskKind::Case(_) | TaskKind::Process(_) | TaskKind::Decision(_))
        )
    }

    pub fn event_listener(&self) -> Option<&EventListener> {
        match &self.kind {
            DefinitionKind::TimerEventListener(timer) => Some(&timer.listener),
            DefinitionKind::UserEventListener(listener)
            | DefinitionKind::GenericEventListener(listener) => Some(listener),
            _ => None,
        }
    }

    pub fn event_listener_mut(&mut self) -> Option<&mut EventListener> {
        match &mut self.kind {
            DefinitionKind::TimerEventListener(timer) => Some(&mut timer.listener),
            DefinitionKind::UserEventListener(listener)
            | DefinitionKind::GenericEventListener(listener) => Some(listener),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub enum DefinitionKind {
    Stage(Stage),
    PlanFragment(PlanFragment),
    Task(Task),
    Milestone(Milestone),
    TimerEventListener(TimerEventListener),
    UserEventListener(EventListener),
    GenericEventListener(EventListener),
}

/// Grouping of plan items and the sentries that guard them.
#[derive(Clone, Debug, Default)]
pub struct PlanFragment {
    pub plan_items: Vec<PlanItemId>,
    pub sentries: Vec<SentryId>,
}

/// A plan fragment with its own lifecycle and nested definitions.
#[derive(Clone, Debug, Default)]
pub struct Stage {
    pub fragment: PlanFragment,
    /// Definitions declared textually inside this stage.
    pub definitions: Vec<DefinitionId>,
    pub is_plan_model: bool,
    pub auto_complete: bool,
    pub auto_complete_condition: Option<String>,
    pub form_key: Option<String>,
    pub display_order: Option<i32>,
    pub include_in_stage_overview: Option<bool>,
    /// Criteria authored directly on the stage element (the case plan model).
    pub exit_criteria: Vec<CriterionId>,
}

/// Blocking semantics shared by every task kind.
#[derive(Clone, Debug)]
pub struct Task {
    pub kind: TaskKind,
    pub is_blocking: bool,
    pub blocking_expression: Option<String>,
    pub is_async: bool,
    pub is_exclusive: bool,
    pub field_extensions: Vec<FieldExtension>,
}

impl Task {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            is_blocking: true,
            blocking_expression: None,
            is_async: false,
            is_exclusive: true,
            field_extensions: Vec::new(),
        }
    }

    pub fn has_blocking_expression(&self) -> bool {
        self.blocking_expression
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty())
    }
}

#[derive(Clone, Debug)]
pub enum TaskKind {
    Plain(PlainTask),
    Human(HumanTask),
    Case(CaseTask),
    Process(ProcessTask),
    Decision(DecisionTask),
}

impl TaskKind {
    pub fn element_name(&self) -> &'static str {
        match self {
            TaskKind::Plain(_) => "task",
            TaskKind::Human(_) => "humanTask",
            TaskKind::Case(_) => "caseTask",
            TaskKind::Process(_) => "processTask",
            TaskKind::Decision(_) => "decisionTask",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct PlainTask {
    /// Flowable `type` (e.g. `java`, `http`, `script`).
    pub task_type: Option<String>,
    pub class_name: Option<String>,
    pub expression: Option<String>,
    pub delegate_expression: Option<String>,
    pub result_variable_name: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct HumanTask {
    pub assignee: Option<String>,
    pub owner: Option<String>,
    pub candidate_users: Vec<String>,
    pub candidate_groups: Vec<String>,
    pub priority: Option<String>,
    pub form_key: Option<String>,
    pub due_date: Option<String>,
    pub category: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct CaseTask {
    /// Case definition key, bound at run time.
    pub case_ref: Option<String>,
    pub case_ref_expression: Option<String>,
    pub fallback_to_default_tenant: bool,
}

#[derive(Clone, Debug, Default)]
pub struct ProcessTask {
    /// Id of a `process` element of the same document.
    pub process_ref: Option<String>,
    pub process_ref_expression: Option<String>,
    /// Resolved `process`; unbound references are late-bound by the runtime.
    pub process: Option<ProcessId>,
    pub fallback_to_default_tenant: bool,
}

#[derive(Clone, Debug, Default)]
pub struct DecisionTask {
    pub decision_ref: Option<String>,
    pub decision_ref_expression: Option<String>,
    pub decision: Option<DecisionId>,
}

#[derive(Clone, Debug, Default)]
pub struct Milestone {
    pub milestone_variable: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct EventListener {
    pub available_condition: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct TimerEventListener {
    pub listener: EventListener,
    pub timer_expression: Option<String>,
    pub start_trigger: Option<StartTrigger>,
}

/// `planItemStartTrigger`: start the timer when a plan item transitions.
#[derive(Clone, Debug, Default)]
pub struct StartTrigger {
    pub id: Option<String>,
    pub source_ref: Option<String>,
    pub standard_event: Option<String>,
    /// Resolved by searching from the listener's stage towards the root.
    pub source: Option<PlanItemId>,
}

// ============================================================================
// SENTRIES AND CRITERIA
// ============================================================================

#[derive(Clone, Debug)]
pub struct Sentry {
    pub base: BaseElement,
    pub name: Option<String>,
    pub trigger_mode: Option<String>,
    /// Fragment the sentry is declared in.
    pub parent: DefinitionId,
    pub on_parts: Vec<SentryOnPart>,
    pub if_part: Option<SentryIfPart>,
}

impl Sentry {
    pub fn new(parent: DefinitionId) -> Self {
        Self {
            base: BaseElement::default(),
            name: None,
            trigger_mode: None,
            parent,
            on_parts: Vec::new(),
            if_part: None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.base.id()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SentryOnPart {
    pub base: BaseElement,
    pub name: Option<String>,
    pub source_ref: Option<String>,
    /// Standard lifecycle transition (`complete`, `start`, `exit`, ...).
    pub standard_event: Option<String>,
    pub source: Option<PlanItemId>,
}

#[derive(Clone, Debug, Default)]
pub struct SentryIfPart {
    pub base: BaseElement,
    pub condition: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CriterionKind {
    Entry,
    Exit,
}

impl CriterionKind {
    pub fn element_name(&self) -> &'static str {
        match self {
            CriterionKind::Entry => "entryCriterion",
            CriterionKind::Exit => "exitCriterion",
        }
    }
}

/// The element a criterion is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CriterionOwner {
    PlanItem(PlanItemId),
    Stage(DefinitionId),
}

#[derive(Clone, Debug)]
pub struct Criterion {
    pub base: BaseElement,
    pub name: Option<String>,
    pub kind: CriterionKind,
    pub sentry_ref: Option<String>,
    pub sentry: Option<SentryId>,
    pub owner: CriterionOwner,
    /// Fragment whose sentries the reference is looked up in.
    pub scope: DefinitionId,
    /// Flowable `exitType` (exit criteria only).
    pub exit_type: Option<String>,
    /// Flowable `exitEventType` (exit criteria only).
    pub exit_event_type: Option<String>,
    /// False for criteria synthesized by the compiler.
    pub authored: bool,
}

impl Criterion {
    pub fn new(kind: CriterionKind, owner: CriterionOwner, scope: DefinitionId) -> Self {
        Self {
            base: BaseElement::default(),
            name: None,
            kind,
            sentry_ref: None,
            sentry: None,
            owner,
            scope,
            exit_type: None,
            exit_event_type: None,
            authored: true,
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.base.id()
    }

    pub fn is_entry(&self) -> bool {
        self.kind == CriterionKind::Entry
    }
}
