//! Plan structure: stages, plan fragments, plan items and the definitions
//! they instantiate.

use super::{parse_bool, parse_number, split_csv};
use crate::error::CompileError;
use crate::model::{
    CaseId, CaseTask, DecisionTask, DefinitionId, DefinitionKind, ElementRef, EventListener, HumanTask,
    Milestone, PlainTask, PlanFragment, PlanItem, PlanItemDefinition, ProcessTask, Stage,
    StartTrigger, Task, TaskKind, TimerEventListener,
};
use crate::reader::context::ParseContext;
use crate::reader::registry::ElementHandler;
use crate::reader::tokens::{StartTag, TokenReader};

/// `casePlanModel` and `stage`.
pub struct StageHandler {
    pub plan_model: bool,
}

impl ElementHandler for StageHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let case = ctx.current_case(tag)?;
        let parent = if self.plan_model {
            if ctx.model().case(case).plan_model.is_some() {
                return Err(CompileError::structural_at(
                    "A case can only have one casePlanModel",
                    tag.position,
                ));
            }
            None
        } else {
            Some(ctx.current_stage(tag)?)
        };

        let stage = Stage {
            is_plan_model: self.plan_model,
            auto_complete: parse_bool(tag.attr("autoComplete")).unwrap_or(false),
            auto_complete_condition: tag.attr_string("autoCompleteCondition"),
            form_key: tag.ext_attr_string("formKey"),
            display_order: parse_number(tag, "displayOrder", tag.ext_attr("displayOrder"))?,
            include_in_stage_overview: parse_bool(tag.ext_attr("includeInStageOverview")),
            ..Stage::default()
        };
        let mut definition = PlanItemDefinition::new(case, parent, DefinitionKind::Stage(stage));
        definition.name = tag.attr_string("name");

        let id = ctx.model_mut().add_definition(definition);
        if self.plan_model {
            ctx.model_mut().case_mut(case).plan_model = Some(id);
        }
        ctx.collections_mut().stages.push(id);
        ctx.push_stage(id);
        Ok(Some(ElementRef::Definition(id)))
    }

    fn on_close(&self, ctx: &mut ParseContext) {
        ctx.pop_stage();
    }
}

pub struct PlanFragmentHandler;

impl ElementHandler for PlanFragmentHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let case = ctx.current_case(tag)?;
        let parent = ctx.current_stage(tag)?;
        let mut definition = PlanItemDefinition::new(
            case,
            Some(parent),
            DefinitionKind::PlanFragment(PlanFragment::default()),
        );
        definition.name = tag.attr_string("name");

        let id = ctx.model_mut().add_definition(definition);
        ctx.collections_mut().plan_fragments.push(id);
        ctx.push_fragment(id);
        Ok(Some(ElementRef::Definition(id)))
    }

    fn on_close(&self, ctx: &mut ParseContext) {
        ctx.pop_fragment();
    }
}

pub struct PlanItemHandler;

impl ElementHandler for PlanItemHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let fragment = ctx.current_fragment(tag)?;
        let stage = ctx.current_stage(tag)?;

        let mut plan_item = PlanItem::new(fragment, stage);
        plan_item.name = tag.attr_string("name");
        plan_item.definition_ref = tag.attr_string("definitionRef");

        let id = ctx.model_mut().add_plan_item(plan_item);
        if let Some(parent) = ctx.model_mut().definition_mut(fragment).as_fragment_mut() {
            parent.plan_items.push(id);
        }
        ctx.collections_mut().plan_items.push(id);
        Ok(Some(ElementRef::PlanItem(id)))
    }
}

// ============================================================================
// TASKS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskFlavor {
    Plain,
    Human,
    Case,
    Process,
    Decision,
}

pub struct TaskHandler(pub TaskFlavor);

impl TaskHandler {
    fn task_kind(&self, tag: &StartTag) -> TaskKind {
        match self.0 {
            TaskFlavor::Plain => TaskKind::Plain(PlainTask {
                task_type: tag.ext_attr_string("type"),
                class_name: tag.ext_attr_string("class"),
                expression: tag.ext_attr_string("expression"),
                delegate_expression: tag.ext_attr_string("delegateExpression"),
                result_variable_name: tag.ext_attr_string("resultVariableName"),
            }),
            TaskFlavor::Human => TaskKind::Human(HumanTask {
                assignee: tag.ext_attr_string("assignee"),
                owner: tag.ext_attr_string("owner"),
                candidate_users: split_csv(tag.ext_attr("candidateUsers")),
                candidate_groups: split_csv(tag.ext_attr("candidateGroups")),
                priority: tag.ext_attr_string("priority"),
                form_key: tag.ext_attr_string("formKey"),
                due_date: tag.ext_attr_string("dueDate"),
                category: tag.ext_attr_string("category"),
            }),
            TaskFlavor::Case => TaskKind::Case(CaseTask {
                case_ref: tag.attr_string("caseRef"),
                case_ref_expression: None,
                fallback_to_default_tenant: parse_bool(tag.ext_attr("fallbackToDefaultTenant"))
                    .unwrap_or(false),
            }),
            TaskFlavor::Process => TaskKind::Process(ProcessTask {
                process_ref: tag.attr_string("processRef"),
                fallback_to_default_tenant: parse_bool(tag.ext_attr("fallbackToDefaultTenant"))
                    .unwrap_or(false),
                ..ProcessTask::default()
            }),
            TaskFlavor::Decision => TaskKind::Decision(DecisionTask {
                decision_ref: tag.attr_string("decisionRef"),
                ..DecisionTask::default()
            }),
        }
    }
}

impl ElementHandler for TaskHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let case = ctx.current_case(tag)?;
        let parent = ctx.current_stage(tag)?;

        let mut task = Task::new(self.task_kind(tag));
        task.is_blocking = parse_bool(tag.any_attr("isBlocking")).unwrap_or(true);
        task.blocking_expression = tag
            .any_attr("isBlockingExpression")
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        task.is_async = parse_bool(tag.ext_attr("async")).unwrap_or(false);
        task.is_exclusive = parse_bool(tag.ext_attr("exclusive")).unwrap_or(true);

        let id = add_definition(ctx, tag, case, parent, DefinitionKind::Task(task));
        let collections = ctx.collections_mut();
        collections.definitions.push(id);
        match self.0 {
            TaskFlavor::Process => collections.process_tasks.push(id),
            TaskFlavor::Decision => collections.decision_tasks.push(id),
            _ => {}
        }
        Ok(Some(ElementRef::Definition(id)))
    }
}

pub struct MilestoneHandler;

impl ElementHandler for MilestoneHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let case = ctx.current_case(tag)?;
        let parent = ctx.current_stage(tag)?;
        let milestone = Milestone {
            milestone_variable: tag.ext_attr_string("milestoneVariable"),
        };
        let id = add_definition(ctx, tag, case, parent, DefinitionKind::Milestone(milestone));
        ctx.collections_mut().definitions.push(id);
        Ok(Some(ElementRef::Definition(id)))
    }
}

// ============================================================================
// EVENT LISTENERS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListenerFlavor {
    Timer,
    User,
    Generic,
}

pub struct ListenerHandler(pub ListenerFlavor);

impl ElementHandler for ListenerHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let case = ctx.current_case(tag)?;
        let parent = ctx.current_stage(tag)?;
        let listener = EventListener {
            available_condition: tag.ext_attr_string("availableCondition"),
        };
        let kind = match self.0 {
            ListenerFlavor::Timer => DefinitionKind::TimerEventListener(TimerEventListener {
                listener,
                ..TimerEventListener::default()
            }),
            ListenerFlavor::User => DefinitionKind::UserEventListener(listener),
            ListenerFlavor::Generic => DefinitionKind::GenericEventListener(listener),
        };

        let id = add_definition(ctx, tag, case, parent, kind);
        let collections = ctx.collections_mut();
        collections.definitions.push(id);
        if self.0 == ListenerFlavor::Timer {
            collections.timer_listeners.push(id);
        }
        Ok(Some(ElementRef::Definition(id)))
    }
}

/// `planItemStartTrigger` inside a `timerEventListener`.
pub struct StartTriggerHandler;

impl ElementHandler for StartTriggerHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let timer = ctx.current_definition(tag)?;
        let Some(listener) = ctx.model_mut().definition_mut(timer).as_timer_mut() else {
            return Err(CompileError::structural_at(
                "<planItemStartTrigger> must be nested inside a timerEventListener",
                tag.position,
            ));
        };
        listener.start_trigger = Some(StartTrigger {
            id: tag.attr_string("id"),
            source_ref: tag.attr_string("sourceRef"),
            ..StartTrigger::default()
        });
        ctx.begin_start_trigger(timer);
        Ok(None)
    }

    fn is_case_scoped(&self) -> bool {
        false
    }

    fn on_close(&self, ctx: &mut ParseContext) {
        ctx.end_start_trigger();
    }
}

fn add_definition(
    ctx: &mut ParseContext,
    tag: &StartTag,
    case: CaseId,
    parent: DefinitionId,
    kind: DefinitionKind,
) -> DefinitionId {
    let mut definition = PlanItemDefinition::new(case, Some(parent), kind);
    definition.name = tag.attr_string("name");
    ctx.model_mut().add_definition(definition)
}
