//! Merge parsed diagram records into the resolved model.

use tracing::trace;

use crate::diagnostics::{Diagnostic, Diagnostics, codes};
use crate::model::{Association, BaseElement, CmmnModel, CriterionOwner, PlanItemId};
use crate::reader::{DiagramRecords, EdgeRecord};

pub fn reconcile(model: &mut CmmnModel, records: DiagramRecords, diagnostics: &mut Diagnostics) {
    for shape in records.shapes {
        let Some(element) = shape.element_ref.filter(|r| model.contains_element_id(r)) else {
            diagnostics.push(
                Diagnostic::warning(
                    codes::UNKNOWN_DIAGRAM_ELEMENT,
                    "Shape does not reference a known element; ignoring it",
                )
                .with_element(shape.id.as_deref())
                .with_position(shape.position),
            );
            continue;
        };
        if let Some(bounds) = shape.bounds {
            model.location_map.insert(element.clone(), bounds);
        }
        if let Some(label) = shape.label_bounds {
            model.label_location_map.insert(element, label);
        }
    }

    for (index, edge) in records.edges.into_iter().enumerate() {
        reconcile_edge(model, edge, index, diagnostics);
    }
}

fn reconcile_edge(
    model: &mut CmmnModel,
    edge: EdgeRecord,
    index: usize,
    diagnostics: &mut Diagnostics,
) {
    for endpoint in [&edge.source_ref, &edge.target_ref].into_iter().flatten() {
        if !model.contains_element_id(endpoint) {
            diagnostics.push(
                Diagnostic::warning(
                    codes::UNKNOWN_DIAGRAM_ELEMENT,
                    format!("Edge endpoint '{endpoint}' is not a known element"),
                )
                .with_element(edge.id.as_deref())
                .with_position(edge.position),
            );
        }
    }

    let authored = edge
        .element_ref
        .as_deref()
        .and_then(|r| model.association_by_id(r));
    let association = match authored {
        Some(id) => id,
        None => {
            let id = edge
                .id
                .clone()
                .or_else(|| edge.element_ref.clone())
                .unwrap_or_else(|| format!("CMMNEdge_{}", index + 1));
            model.add_association(Association {
                base: BaseElement {
                    position: edge.position,
                    ..BaseElement::with_id(id)
                },
                from_diagram: true,
                ..Association::default()
            })
        }
    };

    let transition_event = match (&edge.source_ref, &edge.target_ref) {
        (Some(source), Some(target)) => transition_event(model, source, target)
            .or_else(|| transition_event(model, target, source)),
        _ => None,
    };

    let entry = &mut model.associations[association.index()];
    if entry.source_ref.is_none() {
        entry.source_ref = edge.source_ref;
    }
    if entry.target_ref.is_none() {
        entry.target_ref = edge.target_ref;
    }
    if transition_event.is_some() {
        entry.transition_event = transition_event;
    }
    let key = entry.base.id_or_empty().to_string();
    trace!(association = %key, "reconciled edge");

    if !edge.waypoints.is_empty() {
        model.flow_location_map.insert(key.clone(), edge.waypoints);
    }
    if let Some(label) = edge.label_bounds {
        model.label_location_map.insert(key, label);
    }
}

/// Plan item an endpoint stands for: the item itself, or the item owning
/// the referenced criterion.
fn plan_item_for(model: &CmmnModel, endpoint: &str) -> Option<PlanItemId> {
    model.plan_item_by_id(endpoint).or_else(|| {
        let criterion = model.criterion_by_id(endpoint)?;
        match model.criterion(criterion).owner {
            CriterionOwner::PlanItem(item) => Some(item),
            CriterionOwner::Stage(_) => None,
        }
    })
}

/// Standard event of the first entry criterion of `this` whose sentry's
/// first on-part is sourced at `other`.
fn transition_event(model: &CmmnModel, this: &str, other: &str) -> Option<String> {
    let item = plan_item_for(model, this)?;
    let other = plan_item_for(model, other)?;
    model
        .plan_item(item)
        .entry_criteria
        .iter()
        .filter_map(|c| model.criterion(*c).sentry)
        .filter_map(|s| model.sentry(s).on_parts.first())
        .find(|on_part| on_part.source == Some(other))
        .and_then(|on_part| on_part.standard_event.clone())
}
