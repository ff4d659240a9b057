//! Character-data elements.

use crate::error::CompileError;
use crate::model::{ElementRef, TaskKind};
use crate::reader::context::{ConditionTarget, ParseContext};
use crate::reader::registry::TextHandler;
use crate::reader::tokens::StartTag;

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}

/// `documentation` of the current semantic element.
pub struct DocumentationHandler;

impl TextHandler for DocumentationHandler {
    fn convert(&self, _tag: &StartTag, text: &str, ctx: &mut ParseContext) -> Result<(), CompileError> {
        if let Some(element) = ctx.current_element() {
            if let Some(base) = ctx.model_mut().base_mut(element) {
                base.documentation = non_empty(text);
            }
        }
        Ok(())
    }
}

/// `condition` of an if-part or an item control rule.
pub struct ConditionHandler;

impl TextHandler for ConditionHandler {
    fn convert(&self, _tag: &StartTag, text: &str, ctx: &mut ParseContext) -> Result<(), CompileError> {
        match ctx.condition_target() {
            Some(ConditionTarget::IfPart(sentry)) => {
                if let Some(if_part) = ctx.model_mut().sentry_mut(sentry).if_part.as_mut() {
                    if_part.condition = non_empty(text);
                }
            }
            Some(ConditionTarget::Rule(target, kind)) => {
                if let Some(rule) = ctx.item_control_mut(target).rule_mut(kind) {
                    rule.condition = non_empty(text);
                }
            }
            None => tracing::trace!("condition outside ifPart or rule ignored"),
        }
        Ok(())
    }
}

/// `standardEvent` of an on-part or a timer start trigger.
pub struct StandardEventHandler;

impl TextHandler for StandardEventHandler {
    fn convert(&self, _tag: &StartTag, text: &str, ctx: &mut ParseContext) -> Result<(), CompileError> {
        if let Some(timer) = ctx.current_start_trigger() {
            if let Some(trigger) = ctx
                .model_mut()
                .definition_mut(timer)
                .as_timer_mut()
                .and_then(|t| t.start_trigger.as_mut())
            {
                trigger.standard_event = non_empty(text);
            }
        } else if let Some((sentry, index)) = ctx.current_on_part() {
            if let Some(on_part) = ctx
                .model_mut()
                .sentry_mut(sentry)
                .on_parts
                .get_mut(index as usize)
            {
                on_part.standard_event = non_empty(text);
            }
        }
        Ok(())
    }
}

pub struct TimerExpressionHandler;

impl TextHandler for TimerExpressionHandler {
    fn convert(&self, tag: &StartTag, text: &str, ctx: &mut ParseContext) -> Result<(), CompileError> {
        let definition = ctx.current_definition(tag)?;
        if let Some(timer) = ctx.model_mut().definition_mut(definition).as_timer_mut() {
            timer.timer_expression = non_empty(text);
        }
        Ok(())
    }
}

/// `text` of a text annotation.
pub struct AnnotationTextHandler;

impl TextHandler for AnnotationTextHandler {
    fn convert(&self, _tag: &StartTag, text: &str, ctx: &mut ParseContext) -> Result<(), CompileError> {
        if let Some(ElementRef::TextAnnotation(id)) = ctx.current_element() {
            ctx.model_mut().text_annotations[id.index()].text = non_empty(text);
        }
        Ok(())
    }
}

/// `processRefExpression`, `decisionRefExpression`, `caseRefExpression`.
pub enum RefExpressionHandler {
    Process,
    Decision,
    Case,
}

impl TextHandler for RefExpressionHandler {
    fn convert(&self, tag: &StartTag, text: &str, ctx: &mut ParseContext) -> Result<(), CompileError> {
        let definition = ctx.current_definition(tag)?;
        let task = ctx.model_mut().definition_mut(definition).as_task_mut();
        match (self, task.map(|t| &mut t.kind)) {
            (Self::Process, Some(TaskKind::Process(t))) => t.process_ref_expression = non_empty(text),
            (Self::Decision, Some(TaskKind::Decision(t))) => t.decision_ref_expression = non_empty(text),
            (Self::Case, Some(TaskKind::Case(t))) => t.case_ref_expression = non_empty(text),
            _ => {
                return Err(CompileError::structural_at(
                    format!("<{}> does not belong to this task kind", tag.name),
                    tag.position,
                ));
            }
        }
        Ok(())
    }
}
