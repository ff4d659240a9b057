//! Document-level elements: `definitions`, `case`, callee definitions and
//! artifacts.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use super::{parse_bool, split_csv};
use crate::diagnostics::{Diagnostic, codes};
use crate::error::CompileError;
use crate::model::{Association, Case, Decision, ElementRef, Process, TextAnnotation};
use crate::reader::context::ParseContext;
use crate::reader::registry::ElementHandler;
use crate::reader::tokens::{StartTag, TokenReader};

pub struct DefinitionsHandler;

impl ElementHandler for DefinitionsHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let model = ctx.model_mut();
        for (key, value) in &tag.attributes {
            if key == "xmlns" {
                model.namespaces.insert(String::new(), value.clone());
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                model.namespaces.insert(prefix.to_string(), value.clone());
            }
        }
        model.target_namespace = tag.attr_string("targetNamespace");
        model.expression_language = tag.attr_string("expressionLanguage");
        model.exporter = tag.attr_string("exporter");
        model.exporter_version = tag.attr_string("exporterVersion");
        model.author = tag.any_attr("author").filter(|v| !v.is_empty()).map(str::to_string);

        if let Some(raw) = tag.any_attr("creationDate").filter(|v| !v.trim().is_empty()) {
            match parse_date(raw) {
                Some(date) => ctx.model_mut().creation_date = Some(date),
                None => ctx.diagnostics.push(
                    Diagnostic::warning(
                        codes::UNPARSABLE_DATE,
                        format!("Ignoring unparsable creationDate '{raw}'"),
                    )
                    .with_position(Some(tag.position)),
                ),
            }
        }
        Ok(None)
    }

    fn is_case_scoped(&self) -> bool {
        false
    }
}

/// RFC 3339, or a local date-time / date taken as UTC.
fn parse_date(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().fixed_offset());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

pub struct CaseHandler;

impl ElementHandler for CaseHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let case = Case {
            name: tag.attr_string("name"),
            initiator_variable_name: tag.ext_attr_string("initiatorVariableName"),
            candidate_starter_users: split_csv(tag.ext_attr("candidateStarterUsers")),
            candidate_starter_groups: split_csv(tag.ext_attr("candidateStarterGroups")),
            is_async: parse_bool(tag.ext_attr("async")).unwrap_or(false),
            ..Case::default()
        };
        let id = ctx.model_mut().add_case(case);
        ctx.begin_case(id);
        Ok(Some(ElementRef::Case(id)))
    }

    fn on_close(&self, ctx: &mut ParseContext) {
        ctx.end_case();
    }
}

pub struct ProcessHandler;

impl ElementHandler for ProcessHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let process = Process {
            name: tag.attr_string("name"),
            external_ref: tag.attr_string("externalRef"),
            implementation_type: tag.attr_string("implementationType"),
            ..Process::default()
        };
        Ok(Some(ElementRef::Process(ctx.model_mut().add_process(process))))
    }
}

pub struct DecisionHandler;

impl ElementHandler for DecisionHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let decision = Decision {
            name: tag.attr_string("name"),
            external_ref: tag.attr_string("externalRef"),
            implementation_type: tag.attr_string("implementationType"),
            ..Decision::default()
        };
        Ok(Some(ElementRef::Decision(ctx.model_mut().add_decision(decision))))
    }
}

pub struct AssociationHandler;

impl ElementHandler for AssociationHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let association = Association {
            source_ref: tag.attr_string("sourceRef"),
            target_ref: tag.attr_string("targetRef"),
            ..Association::default()
        };
        Ok(Some(ElementRef::Association(
            ctx.model_mut().add_association(association),
        )))
    }
}

pub struct TextAnnotationHandler;

impl ElementHandler for TextAnnotationHandler {
    fn convert(
        &self,
        tag: &StartTag,
        _tokens: &mut TokenReader<'_>,
        ctx: &mut ParseContext,
    ) -> Result<Option<ElementRef>, CompileError> {
        let annotation = TextAnnotation {
            text_format: tag.attr_string("textFormat"),
            ..TextAnnotation::default()
        };
        Ok(Some(ElementRef::TextAnnotation(
            ctx.model_mut().add_text_annotation(annotation),
        )))
    }
}
