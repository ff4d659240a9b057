//! Optional pre-parse validation.

use cmmn::{
    CmmnXmlReader, CompileError, CompileOptions, HandlerRegistry, SchemaValidator,
    StructuralValidator, ValidationError,
};
use rstest::rstest;

use crate::helpers::document_fixtures::{CLAIM_FLOW, MINIMAL, WITH_DIAGRAM};

fn validating() -> CmmnXmlReader<'static> {
    CmmnXmlReader::new().with_options(CompileOptions::default().with_validation(true))
}

const UNKNOWN_ELEMENT: &str = r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
  <case id="c"><casePlanModel id="p">
    <planItem id="a" definitionRef="m"/>
    <milestone id="m"/>
    <flyingTask id="bogus"/>
  </casePlanModel></case>
</definitions>"#;

#[rstest]
#[case::minimal(MINIMAL)]
#[case::claim_flow(CLAIM_FLOW)]
#[case::diagram(WITH_DIAGRAM)]
fn test_valid_documents_pass(#[case] text: &str) {
    assert!(validating().compile_str(text).is_ok());
}

#[test]
fn test_unknown_element_rejected_only_when_validating() {
    let err = validating().compile_str(UNKNOWN_ELEMENT).unwrap_err();
    match err {
        CompileError::Validation(ValidationError { message, position }) => {
            assert!(message.contains("flyingTask"), "{message}");
            assert_eq!(position.map(|p| p.line), Some(5));
        }
        other => panic!("expected a validation error, got {other}"),
    }

    assert!(CmmnXmlReader::new().compile_str(UNKNOWN_ELEMENT).is_ok());
}

#[rstest]
#[case::foreign_root(r#"<process xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL"/>"#)]
#[case::wrong_namespace(r#"<definitions xmlns="urn:not-cmmn"/>"#)]
#[case::no_namespace(r#"<definitions/>"#)]
fn test_root_element_checked(#[case] text: &str) {
    let err = validating().compile_str(text).unwrap_err();
    assert!(matches!(err, CompileError::Validation(_)), "got {err}");
}

#[test]
fn test_extension_content_is_not_checked() {
    let text = r#"<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
  <case id="c"><casePlanModel id="p">
    <planItem id="a" definitionRef="m"/>
    <milestone id="m">
      <extensionElements><anything xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL"/></extensionElements>
    </milestone>
  </casePlanModel></case>
</definitions>"#;
    assert!(validating().compile_str(text).is_ok());
}

struct RejectAll;

impl SchemaValidator for RejectAll {
    fn validate(&self, _text: &str) -> Result<(), ValidationError> {
        Err(ValidationError::new("rejected"))
    }
}

#[test]
fn test_custom_validator_is_used() {
    let validator = RejectAll;
    let reader = CmmnXmlReader::new()
        .with_options(CompileOptions::default().with_validation(true))
        .with_validator(&validator);
    assert!(matches!(reader.compile_str(MINIMAL), Err(CompileError::Validation(_))));

    let reader = CmmnXmlReader::new().with_validator(&validator);
    assert!(reader.compile_str(MINIMAL).is_ok());
}

#[test]
fn test_validator_follows_registry() {
    let empty = HandlerRegistry::new();
    let validator = StructuralValidator::new(&empty);
    assert!(validator.validate(MINIMAL).is_err());
    assert!(StructuralValidator::new(HandlerRegistry::global()).validate(MINIMAL).is_ok());
}
