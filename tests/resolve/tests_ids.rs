//! Identifier completion for anonymous elements.

use rstest::rstest;

use crate::helpers::compile;
use crate::helpers::document_fixtures::anonymous_plan_items;

fn generated_plan_item_ids(n: usize, existing_id: &str) -> Vec<String> {
    let compilation = compile(&anonymous_plan_items(n, existing_id));
    compilation
        .model
        .plan_items
        .iter()
        .skip(1)
        .map(|p| p.id().unwrap().to_string())
        .collect()
}

#[rstest]
#[case(0)]
#[case(1)]
#[case(3)]
#[case(12)]
fn test_ids_are_dense_from_one(#[case] n: usize) {
    let ids = generated_plan_item_ids(n, "authored");
    let expected: Vec<String> = (1..=n).map(|i| format!("planItem_{i}")).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_ids_skip_authored_collisions() {
    let ids = generated_plan_item_ids(3, "planItem_2");
    assert_eq!(ids, vec!["planItem_1", "planItem_3", "planItem_4"]);
}

#[test]
fn test_each_category_has_its_own_counter() {
    let compilation = compile(
        r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
  <case id="c"><casePlanModel>
    <planItem id="first" definitionRef="t1"/>
    <planItem definitionRef="t2"><entryCriterion sentryRef="s"/></planItem>
    <planItem definitionRef="inner"/>
    <sentry id="s"><planItemOnPart sourceRef="first"/><ifPart><condition>${x}</condition></ifPart></sentry>
    <stage id="inner"><planItem definitionRef="t3"/><task id="t3"/></stage>
    <task id="t1"/>
    <task id="t2"/>
  </casePlanModel></case>
</definitions>"#,
    );
    let model = &compilation.model;
    let case = model.case_by_id("c").unwrap();
    for id in [
        "stage_1",
        "entryCriterion_1",
        "onPart_1",
        "ifPart_1",
        "planItem_1",
        "planItem_2",
        "planItem_3",
    ] {
        assert!(case.element(id).is_some(), "missing generated id '{id}'");
    }
    assert_eq!(case.plan_model.and_then(|p| model.definition(p).id()), Some("stage_1"));
}

#[test]
fn test_repeated_compilation_assigns_same_ids() {
    let text = anonymous_plan_items(5, "authored");
    let first: Vec<_> = compile(&text).model.plan_items.iter().map(|p| p.base.id.clone()).collect();
    let second: Vec<_> = compile(&text).model.plan_items.iter().map(|p| p.base.id.clone()).collect();
    assert_eq!(first, second);
}
