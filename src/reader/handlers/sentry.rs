//! Sentries, criteria and item control rules.

use super::parse_number;
use crate::error::CompileError;
use crate::model::{
    Criterion, CriterionKind, CriterionOwner, ElementRef, RepetitionRule, Rule, RuleKind, Sentry,
    SentryIfPart, SentryOnPart,
};
use crate::reader::context::{ConditionTarget, ControlTarget, ParseContext};
use crate::reader::registry::ElementHandler;
use crate::reader::tokens::{StartTag, TokenReader};

pub struct SentryHandler;

impl ElementHandler for SentryHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let fragment = ctx.current_fragment(tag)?;
        let mut sentry = Sentry::new(fragment);
        sentry.name = tag.attr_string("name");
        sentry.trigger_mode = tag.ext_attr_string("triggerMode");

        let id = ctx.model_mut().add_sentry(sentry);
        if let Some(parent) = ctx.model_mut().definition_mut(fragment).as_fragment_mut() {
            parent.sentries.push(id);
        }
        ctx.collections_mut().sentries.push(id);
        ctx.begin_sentry(id);
        Ok(Some(ElementRef::Sentry(id)))
    }

    fn on_close(&self, ctx: &mut ParseContext) {
        ctx.end_sentry();
    }
}

pub struct OnPartHandler;

impl ElementHandler for OnPartHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let sentry = ctx.current_sentry(tag)?;
        let on_parts = &mut ctx.model_mut().sentry_mut(sentry).on_parts;
        on_parts.push(SentryOnPart {
            name: tag.attr_string("name"),
            source_ref: tag.attr_string("sourceRef"),
            ..SentryOnPart::default()
        });
        let index = (on_parts.len() - 1) as u32;

        ctx.collections_mut().on_parts.push((sentry, index));
        ctx.begin_on_part(sentry, index);
        Ok(Some(ElementRef::OnPart(sentry, index)))
    }

    fn on_close(&self, ctx: &mut ParseContext) {
        ctx.end_on_part();
    }
}

pub struct IfPartHandler;

impl ElementHandler for IfPartHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let sentry = ctx.current_sentry(tag)?;
        ctx.model_mut().sentry_mut(sentry).if_part = Some(SentryIfPart::default());
        ctx.collections_mut().if_parts.push(sentry);
        ctx.set_condition_target(Some(ConditionTarget::IfPart(sentry)));
        Ok(Some(ElementRef::IfPart(sentry)))
    }

    fn on_close(&self, ctx: &mut ParseContext) {
        ctx.set_condition_target(None);
    }
}

/// `entryCriterion` / `exitCriterion` on a plan item, or `exitCriterion` on
/// a case plan model.
pub struct CriterionHandler {
    pub entry: bool,
}

impl ElementHandler for CriterionHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let kind = if self.entry {
            CriterionKind::Entry
        } else {
            CriterionKind::Exit
        };

        let (owner, scope) = match ctx.current_element() {
            Some(ElementRef::PlanItem(item)) => (
                CriterionOwner::PlanItem(item),
                ctx.model().plan_item(item).parent_fragment,
            ),
            Some(ElementRef::Definition(def))
                if !self.entry
                    && ctx
                        .model()
                        .definition(def)
                        .as_stage()
                        .is_some_and(|s| s.is_plan_model) =>
            {
                (CriterionOwner::Stage(def), def)
            }
            _ => {
                return Err(CompileError::structural_at(
                    format!(
                        "<{}> must be nested inside a planItem{}",
                        tag.name,
                        if self.entry { "" } else { " or casePlanModel" }
                    ),
                    tag.position,
                ));
            }
        };

        let mut criterion = Criterion::new(kind, owner, scope);
        criterion.name = tag.attr_string("name");
        criterion.sentry_ref = tag.attr_string("sentryRef");
        if !self.entry {
            criterion.exit_type = tag.ext_attr_string("exitType");
            criterion.exit_event_type = tag.ext_attr_string("exitEventType");
        }

        let id = ctx.model_mut().add_criterion(criterion);
        let model = ctx.model_mut();
        match owner {
            CriterionOwner::PlanItem(item) if self.entry => {
                model.plan_item_mut(item).entry_criteria.push(id)
            }
            CriterionOwner::PlanItem(item) => model.plan_item_mut(item).exit_criteria.push(id),
            CriterionOwner::Stage(def) => {
                if let Some(stage) = model.definition_mut(def).as_stage_mut() {
                    stage.exit_criteria.push(id);
                }
            }
        }

        let collections = ctx.collections_mut();
        if self.entry {
            collections.entry_criteria.push(id);
        } else {
            collections.exit_criteria.push(id);
        }
        Ok(Some(ElementRef::Criterion(id)))
    }
}

/// `itemControl` on a plan item, `defaultControl` on a definition.
pub struct ControlHandler {
    pub default: bool,
}

impl ElementHandler for ControlHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let target = match (self.default, ctx.current_element()) {
            (false, Some(ElementRef::PlanItem(item))) => ControlTarget::PlanItem(item),
            (true, Some(ElementRef::Definition(def))) => ControlTarget::Definition(def),
            _ => {
                let scope = if self.default {
                    "a plan item definition"
                } else {
                    "a planItem"
                };
                return Err(CompileError::structural_at(
                    format!("<{}> must be nested inside {scope}", tag.name),
                    tag.position,
                ));
            }
        };
        ctx.item_control_mut(target);
        ctx.begin_control(target);
        Ok(None)
    }

    fn is_case_scoped(&self) -> bool {
        false
    }

    fn on_close(&self, ctx: &mut ParseContext) {
        ctx.end_control();
    }
}

pub struct RuleHandler(pub RuleKind);

impl ElementHandler for RuleHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let target = ctx.current_control(tag)?;
        let rule = Rule {
            id: tag.attr_string("id"),
            name: tag.attr_string("name"),
            condition: None,
        };
        let control = ctx.item_control_mut(target);
        match self.0 {
            RuleKind::Repetition => {
                control.repetition_rule = Some(RepetitionRule {
                    rule,
                    counter_variable: tag.ext_attr_string("counterVariable"),
                    max_instance_count: parse_number(
                        tag,
                        "maxInstanceCount",
                        tag.ext_attr("maxInstanceCount"),
                    )?,
                });
            }
            RuleKind::Required => control.required_rule = Some(rule),
            RuleKind::ManualActivation => control.manual_activation_rule = Some(rule),
            RuleKind::CompletionNeutral => control.completion_neutral_rule = Some(rule),
        }
        ctx.set_condition_target(Some(ConditionTarget::Rule(target, self.0)));
        Ok(None)
    }

    fn is_case_scoped(&self) -> bool {
        false
    }

    fn on_close(&self, ctx: &mut ParseContext) {
        ctx.set_condition_target(None);
    }
}
