//! Identifier completion for elements the author left anonymous.

use rustc_hash::FxHashSet;

use crate::model::{CmmnModel, CriterionId, DefinitionId, ElementRef};
use crate::reader::Collections;

/// Give every anonymous element of the id-bearing categories an id of the
/// form `prefix + n`, taking the smallest `n >= 1` not used anywhere in the
/// model. Elements are visited in encounter order, so repeated runs over the
/// same document produce the same ids.
///
/// Returns the number of generated ids.
pub fn complete_identifiers(model: &mut CmmnModel, collections: &Collections) -> usize {
    let mut used = existing_ids(model);

    let categories: [(&str, Vec<ElementRef>); 9] = [
        ("planFragment_", definitions(&collections.plan_fragments)),
        ("stage_", definitions(&collections.stages)),
        ("entryCriterion_", criteria(&collections.entry_criteria)),
        ("exitCriterion_", criteria(&collections.exit_criteria)),
        ("sentry_", collections.sentries.iter().map(|s| ElementRef::Sentry(*s)).collect()),
        (
            "onPart_",
            collections
                .on_parts
                .iter()
                .map(|(s, i)| ElementRef::OnPart(*s, *i))
                .collect(),
        ),
        ("ifPart_", collections.if_parts.iter().map(|s| ElementRef::IfPart(*s)).collect()),
        (
            "planItem_",
            collections.plan_items.iter().map(|p| ElementRef::PlanItem(*p)).collect(),
        ),
        ("planItemDefinition_", definitions(&collections.definitions)),
    ];

    let mut generated = 0;
    for (prefix, elements) in categories {
        let mut next = 1u32;
        for element in elements {
            let Some(base) = model.base_mut(element) else {
                continue;
            };
            if base.has_id() {
                continue;
            }
            let id = loop {
                let candidate = format!("{prefix}{next}");
                next += 1;
                if used.insert(candidate.clone()) {
                    break candidate;
                }
            };
            base.id = Some(id);
            generated += 1;
        }
    }
    generated
}

fn definitions(ids: &[DefinitionId]) -> Vec<ElementRef> {
    ids.iter().map(|d| ElementRef::Definition(*d)).collect()
}

fn criteria(ids: &[CriterionId]) -> Vec<ElementRef> {
    ids.iter().map(|c| ElementRef::Criterion(*c)).collect()
}

fn existing_ids(model: &CmmnModel) -> FxHashSet<String> {
    let mut used = FxHashSet::default();
    let mut add = |id: Option<&str>| {
        if let Some(id) = id {
            used.insert(id.to_string());
        }
    };
    model.cases.iter().for_each(|c| add(c.base.id()));
    model.definitions.iter().for_each(|d| add(d.base.id()));
    model.plan_items.iter().for_each(|p| add(p.base.id()));
    model.criteria.iter().for_each(|c| add(c.base.id()));
    for sentry in &model.sentries {
        add(sentry.base.id());
        sentry.on_parts.iter().for_each(|o| add(o.base.id()));
        add(sentry.if_part.as_ref().and_then(|i| i.base.id()));
    }
    model.processes.iter().for_each(|p| add(p.base.id()));
    model.decisions.iter().for_each(|d| add(d.base.id()));
    model.associations.iter().for_each(|a| add(a.base.id()));
    model.text_annotations.iter().for_each(|t| add(t.base.id()));
    used
}
