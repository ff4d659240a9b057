//! Encodings and input sources.

use std::fs;
use std::io::Cursor;

use cmmn::{CmmnXmlReader, CompileError, CompileOptions, Encoding};
use rstest::rstest;
use tempfile::tempdir;

use crate::helpers::document_fixtures::MINIMAL;

fn latin1_document() -> Vec<u8> {
    let text = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<definitions xmlns="http://www.omg.org/spec/CMMN/20151109/MODEL">
  <case id="c" name="Dossier café">
    <casePlanModel id="p"><planItem id="a" definitionRef="m"/><milestone id="m" name="Réglé"/></casePlanModel>
  </case>
</definitions>"#;
    Encoding::Latin1.encode(text).unwrap()
}

#[test]
fn test_latin1_input() {
    let bytes = latin1_document();
    assert!(bytes.contains(&0xe9));

    let reader = CmmnXmlReader::new().with_options(CompileOptions::default().with_encoding(Encoding::Latin1));
    let compilation = reader.compile_bytes(&bytes).unwrap();
    let case = compilation.model.primary_case().unwrap();
    assert_eq!(case.name.as_deref(), Some("Dossier café"));
}

#[test]
fn test_latin1_bytes_are_not_utf8() {
    let err = CmmnXmlReader::new().compile_bytes(&latin1_document()).unwrap_err();
    assert!(matches!(err, CompileError::Structural { .. }), "got {err}");
}

#[rstest]
#[case("UTF-8", Encoding::Utf8)]
#[case("us-ascii", Encoding::UsAscii)]
#[case("latin1", Encoding::Latin1)]
fn test_supported_labels(#[case] label: &str, #[case] expected: Encoding) {
    assert_eq!(Encoding::from_label(label).unwrap(), expected);
}

#[rstest]
#[case("EBCDIC-US")]
#[case("UTF-16")]
#[case("")]
fn test_unsupported_labels(#[case] label: &str) {
    match Encoding::from_label(label) {
        Err(CompileError::UnsupportedEncoding(name)) => assert_eq!(name, label),
        other => panic!("expected UnsupportedEncoding, got {other:?}"),
    }
}

#[test]
fn test_compile_from_reader() {
    let compilation = CmmnXmlReader::new()
        .compile(Cursor::new(MINIMAL.as_bytes()))
        .unwrap();
    assert_eq!(compilation.model.cases.len(), 1);
}

#[test]
fn test_compile_path() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("claim.cmmn");
    fs::write(&path, MINIMAL).unwrap();

    let compilation = CmmnXmlReader::new().compile_path(&path).unwrap();
    assert_eq!(compilation.model.primary_case().unwrap().id(), Some("claimCase"));
}

#[test]
fn test_compile_missing_path_is_io_error() {
    let dir = tempdir().unwrap();
    let err = CmmnXmlReader::new()
        .compile_path(dir.path().join("absent.cmmn"))
        .unwrap_err();
    assert!(matches!(err, CompileError::Io(_)), "got {err}");
}

#[test]
fn test_lenient_mode_accepts_doctype() {
    let text = MINIMAL.replacen("<definitions", "<!DOCTYPE definitions>\n<definitions", 1);
    let strict = CmmnXmlReader::new().compile_str(&text);
    assert!(strict.is_err());

    let lenient = CmmnXmlReader::new()
        .with_options(CompileOptions::default().with_safe_mode(false))
        .compile_str(&text)
        .unwrap();
    assert_eq!(lenient.model.cases.len(), 1);
}
