//! Write then recompile.

use std::collections::BTreeSet;

use cmmn::{CmmnModel, CmmnXmlWriter, Encoding};
use rstest::rstest;
use tempfile::NamedTempFile;

use crate::helpers::document_fixtures::{
    CLAIM_FLOW, MINIMAL, ON_PART_INTO_CHILD_STAGE, TIMER_FROM_ANCESTOR, WITH_DIAGRAM,
};
use crate::helpers::{compile, recompile};

/// (plan item, definition) and (criterion, sentry) pairs by id.
fn resolutions(model: &CmmnModel) -> BTreeSet<(String, String)> {
    let items = model.plan_items.iter().filter_map(|item| {
        let definition = model.definition(item.definition?);
        Some((item.id()?.to_string(), definition.id()?.to_string()))
    });
    let criteria = model.criteria.iter().filter(|c| c.authored).filter_map(|criterion| {
        let sentry = model.sentry(criterion.sentry?);
        Some((criterion.id()?.to_string(), sentry.id()?.to_string()))
    });
    items.chain(criteria).collect()
}

#[rstest]
#[case::minimal(MINIMAL)]
#[case::claim_flow(CLAIM_FLOW)]
#[case::nested_stage(ON_PART_INTO_CHILD_STAGE)]
#[case::timer(TIMER_FROM_ANCESTOR)]
#[case::diagram(WITH_DIAGRAM)]
fn test_resolutions_survive_roundtrip(#[case] text: &str) {
    let original = compile(text).model;
    let again = recompile(&original).model;
    assert_eq!(resolutions(&original), resolutions(&again));
}

#[test]
fn test_roundtrip_is_stable() {
    let writer = CmmnXmlWriter::new();
    let once = writer.to_string(&compile(CLAIM_FLOW).model).unwrap();
    let twice = writer.to_string(&recompile(&compile(CLAIM_FLOW).model).model).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_timer_criterion_is_resynthesized() {
    let again = recompile(&compile(TIMER_FROM_ANCESTOR).model).model;
    let reminder = again.plan_item(again.plan_item_by_id("reminder").unwrap());
    assert_eq!(reminder.entry_criteria.len(), 1);
    assert!(!again.criterion(reminder.entry_criteria[0]).authored);
}

#[test]
fn test_written_document_content() {
    let text = CmmnXmlWriter::new().to_string(&compile(CLAIM_FLOW).model).unwrap();

    assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(text.contains(r#"<casePlanModel id="plan" name="Claims plan" autoComplete="true">"#));
    assert!(text.contains(r#"<entryCriterion id="approveEntry" sentryRef="afterReview"/>"#));
    assert!(text.contains(r#"<processTask id="payoutProcess" name="Payout" processRef="payoutBpmn">"#));
    assert!(text.contains(r#"<process id="payoutBpmn" name="Payout process" externalRef="payout"/>"#));
    assert!(text.contains("<flowable:string>senior</flowable:string>"));
    assert!(text.contains(r#"flowable:maxInstanceCount="3""#));
}

#[test]
fn test_diagram_is_written() {
    let text = CmmnXmlWriter::new().to_string(&compile(WITH_DIAGRAM).model).unwrap();

    assert!(text.contains(r#"<cmmndi:CMMNDiagram id="diagram1" name="Main">"#));
    assert!(text.contains(r#"<cmmndi:CMMNShape id="CMMNShape_first" cmmnElementRef="first">"#));
    assert!(text.contains(r#"<dc:Bounds height="80" width="100" x="50" y="50"/>"#));
    assert!(text.contains(r#"<cmmndi:CMMNEdge id="connector1" sourceCMMNElementRef="first" targetCMMNElementRef="secondEntry">"#));
    assert!(!text.contains("ghost"));

    let again = compile(&text).model;
    assert_eq!(again.graphic_info("first"), compile(WITH_DIAGRAM).model.graphic_info("first"));
    assert_eq!(again.flow_graphic_info("connector1").map(<[_]>::len), Some(2));
}

#[test]
fn test_write_to_file_in_latin1() {
    let mut model = compile(MINIMAL).model;
    model.cases[0].name = Some("Dossier café".to_string());

    let file = NamedTempFile::new().unwrap();
    let writer = CmmnXmlWriter::new().with_encoding(Encoding::Latin1);
    writer.write(&model, file.as_file()).unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    assert!(bytes.windows(2).any(|w| w == [b'f', 0xe9]));

    let reader = cmmn::CmmnXmlReader::new()
        .with_options(cmmn::CompileOptions::default().with_encoding(Encoding::Latin1));
    let again = reader.compile_path(file.path()).unwrap().model;
    assert_eq!(again.cases[0].name.as_deref(), Some("Dossier café"));
}

#[test]
fn test_ascii_output_uses_character_references() {
    let mut model = compile(MINIMAL).model;
    model.cases[0].name = Some("café".to_string());
    let bytes = CmmnXmlWriter::new().with_encoding(Encoding::UsAscii).to_bytes(&model).unwrap();
    assert!(bytes.is_ascii());

    let again = cmmn::CmmnXmlReader::new().compile_bytes(&bytes).unwrap().model;
    assert_eq!(again.cases[0].name.as_deref(), Some("café"));
}

#[test]
fn test_definition_without_id_is_attached_and_written() {
    let model = compile(
        r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
  <case id="c"><casePlanModel id="plan">
    <planItem id="named" definitionRef="namedTask"/>
    <task id="namedTask"/>
    <humanTask name="anon"/>
  </casePlanModel></case>
</definitions>"#,
    )
    .model;

    let anon = model.definitions.iter().position(|d| d.name.as_deref() == Some("anon")).unwrap();
    let anon_id = model.definitions[anon].id().unwrap().to_string();
    assert_eq!(anon_id, "planItemDefinition_1");

    let case = model.case_by_id("c").unwrap();
    let plan = model.definition(case.plan_model.unwrap()).as_stage().unwrap();
    assert_eq!(plan.definitions.len(), 2);
    assert!(case.element(&anon_id).is_some());

    let text = CmmnXmlWriter::new().to_string(&model).unwrap();
    assert!(text.contains(r#"<humanTask id="planItemDefinition_1" name="anon"/>"#));

    let again = recompile(&model).model;
    let definition = again.definition(again.definition_by_id(&anon_id).unwrap());
    assert_eq!(definition.name.as_deref(), Some("anon"));
}
