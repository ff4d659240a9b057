//! Element and text handlers of the CMMN dialect.

mod diagram;
mod document;
mod extension;
mod plan;
mod sentry;
mod text;

use crate::error::CompileError;
use crate::model::RuleKind;

use super::registry::HandlerRegistry;
use super::tokens::StartTag;

/// Register every standard handler.
pub fn register_all(registry: &mut HandlerRegistry) {
    registry.register_element("definitions", document::DefinitionsHandler);
    registry.register_element("case", document::CaseHandler);
    registry.register_element("process", document::ProcessHandler);
    registry.register_element("decision", document::DecisionHandler);
    registry.register_element("association", document::AssociationHandler);
    registry.register_element("textAnnotation", document::TextAnnotationHandler);

    registry.register_element("casePlanModel", plan::StageHandler { plan_model: true });
    registry.register_element("stage", plan::StageHandler { plan_model: false });
    registry.register_element("planFragment", plan::PlanFragmentHandler);
    registry.register_element("planItem", plan::PlanItemHandler);
    registry.register_element("task", plan::TaskHandler(plan::TaskFlavor::Plain));
    registry.register_element("humanTask", plan::TaskHandler(plan::TaskFlavor::Human));
    registry.register_element("caseTask", plan::TaskHandler(plan::TaskFlavor::Case));
    registry.register_element("processTask", plan::TaskHandler(plan::TaskFlavor::Process));
    registry.register_element("decisionTask", plan::TaskHandler(plan::TaskFlavor::Decision));
    registry.register_element("milestone", plan::MilestoneHandler);
    registry.register_element("timerEventListener", plan::ListenerHandler(plan::ListenerFlavor::Timer));
    registry.register_element("userEventListener", plan::ListenerHandler(plan::ListenerFlavor::User));
    registry.register_element(
        "genericEventListener",
        plan::ListenerHandler(plan::ListenerFlavor::Generic),
    );
    registry.register_element("planItemStartTrigger", plan::StartTriggerHandler);

    registry.register_element("sentry", sentry::SentryHandler);
    registry.register_element("planItemOnPart", sentry::OnPartHandler);
    registry.register_element("ifPart", sentry::IfPartHandler);
    registry.register_element("entryCriterion", sentry::CriterionHandler { entry: true });
    registry.register_element("exitCriterion", sentry::CriterionHandler { entry: false });
    registry.register_element("itemControl", sentry::ControlHandler { default: false });
    registry.register_element("defaultControl", sentry::ControlHandler { default: true });
    registry.register_element("repetitionRule", sentry::RuleHandler(RuleKind::Repetition));
    registry.register_element("requiredRule", sentry::RuleHandler(RuleKind::Required));
    registry.register_element(
        "manualActivationRule",
        sentry::RuleHandler(RuleKind::ManualActivation),
    );
    registry.register_element(
        "completionNeutralRule",
        sentry::RuleHandler(RuleKind::CompletionNeutral),
    );

    registry.register_element("extensionElements", extension::ExtensionElementsHandler);

    registry.register_element("CMMNDI", diagram::ContainerHandler);
    registry.register_element("CMMNDiagram", diagram::DiagramHandler);
    registry.register_element("CMMNShape", diagram::ShapeHandler);
    registry.register_element("CMMNEdge", diagram::EdgeHandler);
    registry.register_element("CMMNLabel", diagram::LabelHandler);
    registry.register_element("Bounds", diagram::BoundsHandler);
    registry.register_element("waypoint", diagram::WaypointHandler);

    registry.register_text("documentation", text::DocumentationHandler);
    registry.register_text("condition", text::ConditionHandler);
    registry.register_text("standardEvent", text::StandardEventHandler);
    registry.register_text("timerExpression", text::TimerExpressionHandler);
    registry.register_text("text", text::AnnotationTextHandler);
    registry.register_text("processRefExpression", text::RefExpressionHandler::Process);
    registry.register_text("decisionRefExpression", text::RefExpressionHandler::Decision);
    registry.register_text("caseRefExpression", text::RefExpressionHandler::Case);
}

// ============================================================================
// ATTRIBUTE HELPERS
// ============================================================================

/// `true`/`false` attribute; anything else counts as absent.
fn parse_bool(value: Option<&str>) -> Option<bool> {
    match value?.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Comma separated list, blanks dropped.
fn split_csv(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Numeric attribute that must parse when present.
fn parse_number<T: std::str::FromStr>(tag: &StartTag, name: &str, value: Option<&str>) -> Result<Option<T>, CompileError> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(|_| {
            CompileError::structural_at(
                format!("Invalid number '{raw}' for attribute '{name}' of <{}>", tag.name),
                tag.position,
            )
        }),
    }
}
