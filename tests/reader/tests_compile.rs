//! Whole-document compilation tests.

use std::sync::Arc;
use std::thread;

use cmmn::diagnostics::codes;
use cmmn::model::{DefinitionKind, TaskKind};
use cmmn::{CmmnXmlReader, CompileError, HandlerRegistry, ReferenceKind};
use rstest::rstest;

use crate::helpers::document_fixtures::{CLAIM_FLOW, MINIMAL};
use crate::helpers::{assert_dangling, compile, compile_err, definition_of, entry_sentries};

// ============================================================================
// Minimal documents
// ============================================================================

#[test]
fn test_minimal_case() {
    let compilation = compile(MINIMAL);
    assert!(compilation.diagnostics.is_empty(), "{:?}", compilation.diagnostics);

    let model = &compilation.model;
    assert_eq!(model.target_namespace.as_deref(), Some("http://flowable.org/cmmn"));
    assert_eq!(model.creation_date.map(|d| d.to_rfc3339()).as_deref(), Some("2024-03-01T10:15:00+00:00"));

    let case = model.primary_case().unwrap();
    assert_eq!(case.id(), Some("claimCase"));
    assert_eq!(case.initiator_variable_name.as_deref(), Some("initiator"));
    assert_eq!(definition_of(model, "reviewItem"), "reviewTask");

    let task = model.definition_by_id("reviewTask").unwrap();
    let task = model.definition(task);
    assert_eq!(task.base.documentation.as_deref(), Some("Check the submitted claim"));
    match &task.as_task().unwrap().kind {
        TaskKind::Human(human) => {
            assert_eq!(human.assignee.as_deref(), Some("${initiator}"));
            assert_eq!(human.candidate_groups, vec!["claims", "management"]);
        }
        other => panic!("expected a human task, got {other:?}"),
    }
}

#[test]
fn test_element_index_covers_plan_structure() {
    let compilation = compile(CLAIM_FLOW);
    let case = compilation.model.case_by_id("claims").unwrap();
    for id in [
        "claims", "plan", "review", "approve", "payout", "done", "approveEntry", "payoutExit",
        "afterReview", "onReview", "reviewOk", "reviewTask", "payoutProcess", "doneMilestone",
    ] {
        assert!(case.element(id).is_some(), "element index is missing '{id}'");
    }
}

#[test]
fn test_claim_flow_resolutions() {
    let compilation = compile(CLAIM_FLOW);
    let model = &compilation.model;

    assert_eq!(entry_sentries(model, "approve"), vec!["afterReview"]);
    assert_eq!(entry_sentries(model, "done"), vec!["afterPayout"]);

    let sentry = model.sentries.iter().find(|s| s.id() == Some("afterReview")).unwrap();
    assert_eq!(sentry.on_parts[0].source, model.plan_item_by_id("review"));
    assert_eq!(sentry.on_parts[0].standard_event.as_deref(), Some("complete"));
    assert_eq!(sentry.if_part.as_ref().unwrap().condition.as_deref(), Some("${approved}"));

    let payout = model.definition(model.definition_by_id("payoutProcess").unwrap());
    match &payout.as_task().unwrap().kind {
        TaskKind::Process(task) => assert_eq!(task.process, model.process_by_id("payoutBpmn")),
        other => panic!("expected a process task, got {other:?}"),
    }
    let repetition = payout
        .default_control
        .as_ref()
        .and_then(|c| c.repetition_rule.as_ref())
        .unwrap();
    assert_eq!(repetition.counter_variable.as_deref(), Some("attempt"));
    assert_eq!(repetition.max_instance_count, Some(3));
    assert_eq!(repetition.rule.condition.as_deref(), Some("${retry}"));

    let approve = model.definition(model.definition_by_id("approveTask").unwrap());
    let task = approve.as_task().unwrap();
    assert!(task.is_async);
    assert_eq!(task.field_extensions[0].name, "level");
    assert_eq!(task.field_extensions[0].string_value.as_deref(), Some("senior"));

    let review = model.plan_item(model.plan_item_by_id("review").unwrap());
    let required = review.item_control.as_ref().and_then(|c| c.required_rule.as_ref());
    assert_eq!(required.and_then(|r| r.condition.as_deref()), Some("${mandatory}"));

    assert_eq!(model.text_annotations[0].text.as_deref(), Some("Reviewed by two people"));
}

#[test]
fn test_plan_model_attributes() {
    let compilation = compile(CLAIM_FLOW);
    let model = &compilation.model;
    let root = model.case_by_id("claims").unwrap().plan_model.unwrap();
    let DefinitionKind::Stage(stage) = &model.definition(root).kind else {
        panic!("plan model is not a stage");
    };
    assert!(stage.is_plan_model);
    assert!(stage.auto_complete);
    assert_eq!(stage.fragment.plan_items.len(), 4);
    assert_eq!(stage.fragment.sentries.len(), 3);
}

// ============================================================================
// Dangling references and warnings
// ============================================================================

#[rstest]
#[case::definition(
    r#"<planItem id="a" definitionRef="missing"/><task id="t"/>"#,
    ReferenceKind::PlanItemDefinition,
    "missing"
)]
#[case::sentry(
    r#"<planItem id="a" definitionRef="t"><entryCriterion id="e" sentryRef="nowhere"/></planItem><task id="t"/>"#,
    ReferenceKind::Sentry,
    "nowhere"
)]
#[case::on_part(
    r#"<planItem id="a" definitionRef="t"><entryCriterion id="e" sentryRef="s"/></planItem>
       <sentry id="s"><planItemOnPart id="o" sourceRef="ghost"/></sentry><task id="t"/>"#,
    ReferenceKind::SentryOnPart,
    "ghost"
)]
#[case::missing_definition_ref(r#"<planItem id="a"/><task id="t"/>"#, ReferenceKind::PlanItemDefinition, "")]
fn test_dangling_references(
    #[case] plan: &str,
    #[case] kind: ReferenceKind,
    #[case] reference: &str,
) {
    let text = format!(
        r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
             <case id="c"><casePlanModel id="p">{plan}</casePlanModel></case>
           </definitions>"#
    );
    assert_dangling(&compile_err(&text), kind, reference);
}

#[test]
fn test_exit_criterion_on_non_blocking_task_is_dropped() {
    let compilation = compile(
        r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
  <case id="c"><casePlanModel id="p">
    <planItem id="first" definitionRef="t1"/>
    <planItem id="fire" definitionRef="t2">
      <exitCriterion id="stopFire" sentryRef="s"/>
    </planItem>
    <sentry id="s"><planItemOnPart sourceRef="first"><standardEvent>complete</standardEvent></planItemOnPart></sentry>
    <task id="t1"/>
    <task id="t2" isBlocking="false"/>
  </casePlanModel></case>
</definitions>"#,
    );
    assert!(compilation.has_warning(codes::EXIT_CRITERIA_ON_NON_BLOCKING_TASK));

    let model = &compilation.model;
    let fire = model.plan_item(model.plan_item_by_id("fire").unwrap());
    assert!(fire.exit_criteria.is_empty());
    assert!(model.case_by_id("c").unwrap().element("stopFire").is_none());
}

#[test]
fn test_blocking_expression_keeps_exit_criterion() {
    let compilation = compile(
        r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL"
             xmlns:flowable="http://flowable.org/cmmn">
  <case id="c"><casePlanModel id="p">
    <planItem id="first" definitionRef="t1"/>
    <planItem id="wait" definitionRef="t2"><exitCriterion id="stop" sentryRef="s"/></planItem>
    <sentry id="s"><planItemOnPart sourceRef="first"/></sentry>
    <task id="t1"/>
    <task id="t2" isBlocking="false" flowable:isBlockingExpression="${wait}"/>
  </casePlanModel></case>
</definitions>"#,
    );
    assert!(!compilation.has_warning(codes::EXIT_CRITERIA_ON_NON_BLOCKING_TASK));
    let model = &compilation.model;
    let wait = model.plan_item(model.plan_item_by_id("wait").unwrap());
    assert_eq!(wait.exit_criteria.len(), 1);
}

#[rstest]
#[case::process(r#"<processTask id="t" processRef="elsewhere"/>"#, codes::UNRESOLVED_PROCESS)]
#[case::decision(r#"<decisionTask id="t" decisionRef="elsewhere"/>"#, codes::UNRESOLVED_DECISION)]
fn test_external_callee_is_a_warning(#[case] task: &str, #[case] code: &str) {
    let text = format!(
        r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
             <case id="c"><casePlanModel id="p"><planItem id="a" definitionRef="t"/>{task}</casePlanModel></case>
           </definitions>"#
    );
    assert!(compile(&text).has_warning(code));
}

#[test]
fn test_unparsable_date_is_a_warning() {
    let compilation = compile(
        r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL" creationDate="yesterday">
             <case id="c"><casePlanModel id="p"/></case>
           </definitions>"#,
    );
    assert!(compilation.has_warning(codes::UNPARSABLE_DATE));
    assert!(compilation.model.creation_date.is_none());
}

#[test]
fn test_duplicate_id_first_wins() {
    let compilation = compile(
        r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
             <case id="c"><casePlanModel id="p">
               <planItem id="dup" definitionRef="m"/>
               <milestone id="m"/>
               <milestone id="dup"/>
             </casePlanModel></case>
           </definitions>"#,
    );
    assert!(compilation.has_warning(codes::DUPLICATE_ID));
    let model = &compilation.model;
    let element = model.case_by_id("c").unwrap().element("dup").unwrap();
    assert_eq!(element, cmmn::ElementRef::PlanItem(model.plan_item_by_id("dup").unwrap()));
}

// ============================================================================
// Structural errors
// ============================================================================

#[rstest]
#[case::unbalanced(r#"<definitions><case id="c"></definitions>"#)]
#[case::truncated(r#"<definitions><case id="c"><casePlanModel id="p">"#)]
#[case::plan_item_outside_stage(r#"<definitions><case id="c"><planItem id="x"/></case></definitions>"#)]
#[case::second_plan_model(
    r#"<definitions><case id="c"><casePlanModel id="p1"/><casePlanModel id="p2"/></case></definitions>"#
)]
#[case::sentry_outside_stage(r#"<definitions><sentry id="s"/></definitions>"#)]
#[case::doctype(r#"<!DOCTYPE definitions [<!ENTITY x "y">]><definitions/>"#)]
fn test_structural_errors(#[case] text: &str) {
    let err = compile_err(text);
    assert!(matches!(err, CompileError::Structural { .. }), "got {err}");
}

#[test]
fn test_structural_error_has_position() {
    let err = compile_err("<definitions>\n  <case id=\"c\">\n    <planItem id=\"x\"/>\n  </case>\n</definitions>");
    match err {
        CompileError::Structural { position, .. } => assert_eq!(position.map(|p| p.line), Some(3)),
        other => panic!("expected a structural error, got {other}"),
    }
}

#[test]
fn test_unknown_elements_are_skipped() {
    let compilation = compile(
        r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
             <case id="c"><casePlanModel id="p">
               <planItem id="a" definitionRef="m"/>
               <caseFileModel><caseFileItem id="file"><children/></caseFileItem></caseFileModel>
               <milestone id="m"/>
             </casePlanModel></case>
           </definitions>"#,
    );
    assert!(compilation.model.case_by_id("c").unwrap().element("file").is_none());
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_compilations_share_registry() {
    let registry: &'static HandlerRegistry = HandlerRegistry::global();
    let documents = Arc::new([MINIMAL, CLAIM_FLOW]);

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let documents = Arc::clone(&documents);
            thread::spawn(move || {
                let text = documents[i % 2];
                CmmnXmlReader::with_registry(registry)
                    .compile_str(text)
                    .map(|c| c.model.plan_items.len())
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let count = handle.join().unwrap().unwrap();
        assert_eq!(count, if i % 2 == 0 { 1 } else { 4 });
    }
}
