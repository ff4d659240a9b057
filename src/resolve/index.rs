//! Per-case element index.

use indexmap::IndexMap;
use indexmap::map::Entry;

use crate::diagnostics::{Diagnostic, Diagnostics, codes};
use crate::model::{CaseId, CmmnModel, DefinitionId, ElementRef, SentryId};

/// Fill `Case::element_index` by walking each case's plan model. The first
/// element wins when two share an id.
pub fn build_element_index(model: &mut CmmnModel, diagnostics: &mut Diagnostics) {
    for case_index in 0..model.cases.len() {
        let case = &model.cases[case_index];
        let mut index = IndexMap::new();
        let mut duplicates = Vec::new();
        let mut insert = |element: ElementRef, model: &CmmnModel| {
            let Some(id) = model.element_id(element) else {
                return;
            };
            match index.entry(id.to_string()) {
                Entry::Vacant(slot) => {
                    slot.insert(element);
                }
                Entry::Occupied(_) => duplicates.push(element),
            }
        };

        insert(ElementRef::Case(CaseId::new(case_index)), model);
        if let Some(root) = case.plan_model {
            walk_definition(model, root, &mut insert);
        }

        for element in duplicates {
            let base = model.base(element);
            let id = base.and_then(|b| b.id());
            diagnostics.push(
                Diagnostic::warning(
                    codes::DUPLICATE_ID,
                    format!("Duplicate id '{}' in case", id.unwrap_or_default()),
                )
                .with_element(id)
                .with_position(base.and_then(|b| b.position)),
            );
        }
        model.cases[case_index].element_index = index;
    }
}

fn walk_definition(
    model: &CmmnModel,
    definition: DefinitionId,
    insert: &mut impl FnMut(ElementRef, &CmmnModel),
) {
    insert(ElementRef::Definition(definition), model);
    let def = model.definition(definition);
    let Some(fragment) = def.as_fragment() else {
        return;
    };

    for &item in &fragment.plan_items {
        insert(ElementRef::PlanItem(item), model);
        let plan_item = model.plan_item(item);
        for &criterion in plan_item.entry_criteria.iter().chain(&plan_item.exit_criteria) {
            insert(ElementRef::Criterion(criterion), model);
            // Synthetic sentries are not listed by any fragment.
            let criterion = model.criterion(criterion);
            if let (false, Some(sentry)) = (criterion.authored, criterion.sentry) {
                walk_sentry(model, sentry, insert);
            }
        }
    }
    for &sentry in &fragment.sentries {
        walk_sentry(model, sentry, insert);
    }

    if let Some(stage) = def.as_stage() {
        for &criterion in &stage.exit_criteria {
            insert(ElementRef::Criterion(criterion), model);
        }
        for &nested in &stage.definitions {
            walk_definition(model, nested, insert);
        }
    }
}

fn walk_sentry(model: &CmmnModel, sentry_id: SentryId, insert: &mut impl FnMut(ElementRef, &CmmnModel)) {
    insert(ElementRef::Sentry(sentry_id), model);
    let sentry = model.sentry(sentry_id);
    for index in 0..sentry.on_parts.len() {
        insert(ElementRef::OnPart(sentry_id, index as u32), model);
    }
    if sentry.if_part.is_some() {
        insert(ElementRef::IfPart(sentry_id), model);
    }
}
