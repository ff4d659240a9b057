//! Shared test helpers.

#![allow(dead_code)]

pub mod document_fixtures;

use cmmn::{CmmnModel, CmmnXmlReader, CmmnXmlWriter, Compilation, CompileError, ReferenceKind};

/// Compile a document with default options, panicking on failure.
pub fn compile(text: &str) -> Compilation {
    match CmmnXmlReader::new().compile_str(text) {
        Ok(compilation) => compilation,
        Err(err) => panic!("Expected compilation to succeed, got: {err}"),
    }
}

/// Compile a document that is expected to fail.
pub fn compile_err(text: &str) -> CompileError {
    match CmmnXmlReader::new().compile_str(text) {
        Ok(_) => panic!("Expected compilation to fail"),
        Err(err) => err,
    }
}

/// Write a model and compile the output again.
pub fn recompile(model: &CmmnModel) -> Compilation {
    let text = CmmnXmlWriter::new()
        .to_string(model)
        .expect("model should serialize");
    compile(&text)
}

/// Assert the error is a dangling reference of the given kind.
pub fn assert_dangling(err: &CompileError, expected_kind: ReferenceKind, expected_reference: &str) {
    match err {
        CompileError::DanglingReference {
            kind, reference, ..
        } => {
            assert_eq!(*kind, expected_kind, "wrong reference kind in: {err}");
            assert_eq!(reference, expected_reference, "wrong reference in: {err}");
        }
        other => panic!("Expected a dangling reference error, got: {other}"),
    }
}

/// Id of the definition a plan item resolved to.
pub fn definition_of<'m>(model: &'m CmmnModel, plan_item: &str) -> &'m str {
    let item = model
        .plan_item_by_id(plan_item)
        .unwrap_or_else(|| panic!("no plan item '{plan_item}'"));
    let definition = model
        .plan_item(item)
        .definition
        .unwrap_or_else(|| panic!("plan item '{plan_item}' is unresolved"));
    model.definition(definition).id().unwrap_or_default()
}

/// Sentry ids that a plan item's entry criteria resolved to.
pub fn entry_sentries(model: &CmmnModel, plan_item: &str) -> Vec<String> {
    let item = model
        .plan_item_by_id(plan_item)
        .unwrap_or_else(|| panic!("no plan item '{plan_item}'"));
    model
        .plan_item(item)
        .entry_criteria
        .iter()
        .filter_map(|c| model.criterion(*c).sentry)
        .filter_map(|s| model.sentry(s).id().map(str::to_string))
        .collect()
}
