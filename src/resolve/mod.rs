//! Cross-reference resolution.
//!
//! Runs after the whole document has been read, over the flat collections
//! the builder gathered:
//!
//! 1. plan item `definitionRef` → definition declared in the item's stage
//! 2. entry criteria `sentryRef` → sentry of the criterion's fragment
//! 3. exit criteria likewise, after dropping those a non-blocking task
//!    cannot honour
//! 4. nested fragments depth first, before the enclosing fragment's sentries
//! 5. on-part `sourceRef` → plan item, searching downwards
//! 6. process / decision task references (optional)
//! 7. timer start triggers, searching upwards, plus the synthetic entry
//!    criterion that makes them visible as sentries
//!
//! Then identifier completion, the per-case element index and diagram
//! reconciliation. The first dangling required reference aborts the whole
//! compilation.

mod diagram;
mod ids;
mod index;

pub use ids::complete_identifiers;

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

use crate::diagnostics::{Diagnostic, Diagnostics, codes};
use crate::error::{CompileError, ReferenceKind};
use crate::model::{
    CmmnModel, Criterion, CriterionId, CriterionKind, CriterionOwner, DefinitionId, ElementRef,
    PlanItemId, Sentry, SentryId, SentryOnPart, TaskKind,
};
use crate::reader::{Collections, ParsedDocument};

/// Resolve a parsed document into a finished model.
pub fn resolve(document: ParsedDocument) -> Result<(CmmnModel, Diagnostics), CompileError> {
    let ParsedDocument {
        mut model,
        mut collections,
        diagram,
        mut diagnostics,
    } = document;

    let mut resolver = Resolver {
        model: &mut model,
        diagnostics: &mut diagnostics,
    };
    resolver.resolve_cases()?;
    resolver.resolve_callees(&collections);
    resolver.synthesize_timer_triggers(&mut collections)?;
    debug!("references resolved");

    let generated = complete_identifiers(&mut model, &collections);
    backfill_sentry_refs(&mut model);
    attach_pending_definitions(&mut model, &collections);
    debug!(generated, "identifiers completed");

    index::build_element_index(&mut model, &mut diagnostics);
    diagram::reconcile(&mut model, diagram, &mut diagnostics);
    debug!(
        shapes = model.location_map.len(),
        edges = model.flow_location_map.len(),
        "diagram reconciled"
    );

    Ok((model, diagnostics))
}

struct Resolver<'a> {
    model: &'a mut CmmnModel,
    diagnostics: &'a mut Diagnostics,
}

impl Resolver<'_> {
    fn warn(&mut self, code: &'static str, message: String, element: ElementRef) {
        let (id, position) = match self.model.base(element) {
            Some(base) => (base.id.clone(), base.position),
            None => (None, None),
        };
        self.diagnostics.push(
            Diagnostic::warning(code, message)
                .with_element(id.as_deref())
                .with_position(position),
        );
    }

    // ========================================================================
    // Steps 1-5: plan structure
    // ========================================================================

    fn resolve_cases(&mut self) -> Result<(), CompileError> {
        let roots: Vec<DefinitionId> = self.model.cases.iter().filter_map(|c| c.plan_model).collect();
        let mut visited = FxHashSet::default();
        for root in roots {
            self.process_fragment(root, &mut visited)?;
        }
        Ok(())
    }

    fn process_fragment(
        &mut self,
        fragment: DefinitionId,
        visited: &mut FxHashSet<DefinitionId>,
    ) -> Result<(), CompileError> {
        if !visited.insert(fragment) {
            return Ok(());
        }
        let Some(parts) = self.model.definition(fragment).as_fragment() else {
            return Ok(());
        };
        let plan_items = parts.plan_items.clone();
        let sentries = parts.sentries.clone();

        for item in plan_items {
            let definition = self.resolve_definition(item)?;

            let entry = self.model.plan_item(item).entry_criteria.clone();
            for criterion in entry {
                self.resolve_criterion(criterion)?;
            }

            let exit = self.model.plan_item(item).exit_criteria.clone();
            if !exit.is_empty() {
                if self.model.definition(definition).allows_exit_criteria() {
                    for criterion in exit {
                        self.resolve_criterion(criterion)?;
                    }
                } else {
                    self.model.plan_item_mut(item).exit_criteria.clear();
                    self.warn(
                        codes::EXIT_CRITERIA_ON_NON_BLOCKING_TASK,
                        format!(
                            "Dropping {} exit criteria: the task is non-blocking and has no blocking expression",
                            exit.len()
                        ),
                        ElementRef::PlanItem(item),
                    );
                }
            }

            if self.model.definition(definition).is_fragment() {
                self.process_fragment(definition, visited)?;
            }
        }

        let stage_exit = self
            .model
            .definition(fragment)
            .as_stage()
            .map(|s| s.exit_criteria.clone())
            .unwrap_or_default();
        for criterion in stage_exit {
            self.resolve_criterion(criterion)?;
        }

        for sentry in sentries {
            self.resolve_on_parts(sentry)?;
        }
        Ok(())
    }

    fn resolve_definition(&mut self, item: PlanItemId) -> Result<DefinitionId, CompileError> {
        let plan_item = self.model.plan_item(item);
        let reference = plan_item.definition_ref.clone().unwrap_or_default();
        let Some(definition) = self
            .model
            .find_definition_in_stage(plan_item.parent_stage, &reference)
        else {
            return Err(CompileError::dangling(
                ReferenceKind::PlanItemDefinition,
                plan_item.base.id_or_empty(),
                reference,
            ));
        };
        trace!(plan_item = plan_item.base.id_or_empty(), definition = %reference, "resolved definition");
        self.model.plan_item_mut(item).definition = Some(definition);
        Ok(definition)
    }

    fn resolve_criterion(&mut self, id: CriterionId) -> Result<(), CompileError> {
        let criterion = self.model.criterion(id);
        let reference = criterion.sentry_ref.clone().unwrap_or_default();
        let Some(sentry) = self.model.find_sentry_in_fragment(criterion.scope, &reference) else {
            return Err(CompileError::dangling(
                ReferenceKind::Sentry,
                criterion.base.id_or_empty(),
                reference,
            ));
        };
        self.model.criterion_mut(id).sentry = Some(sentry);
        Ok(())
    }

    /// On-part sources are searched downwards from the stage that encloses
    /// the sentry; plan items of enclosing stages are never visible.
    fn resolve_on_parts(&mut self, sentry_id: SentryId) -> Result<(), CompileError> {
        let sentry = self.model.sentry(sentry_id);
        let parent = self.model.definition(sentry.parent);
        let root = if parent.is_stage() {
            sentry.parent
        } else {
            parent.parent_stage.unwrap_or(sentry.parent)
        };

        let mut sources = Vec::with_capacity(sentry.on_parts.len());
        for on_part in &sentry.on_parts {
            let reference = on_part.source_ref.clone().unwrap_or_default();
            match self.model.find_plan_item_downwards(root, &reference) {
                Some(source) => sources.push(source),
                None => {
                    let referrer = on_part.base.id().unwrap_or(sentry.base.id_or_empty());
                    return Err(CompileError::dangling(
                        ReferenceKind::SentryOnPart,
                        referrer,
                        reference,
                    ));
                }
            }
        }

        let on_parts = &mut self.model.sentry_mut(sentry_id).on_parts;
        for (on_part, source) in on_parts.iter_mut().zip(sources) {
            on_part.source = Some(source);
        }
        Ok(())
    }

    // ========================================================================
    // Step 6: callees
    // ========================================================================

    fn resolve_callees(&mut self, collections: &Collections) {
        for &definition in &collections.process_tasks {
            let reference = match self.model.definition(definition).as_task().map(|t| &t.kind) {
                Some(TaskKind::Process(task)) => task.process_ref.clone(),
                _ => None,
            };
            let Some(reference) = reference else { continue };
            let resolved = self.model.process_by_id(&reference);
            if let Some(TaskKind::Process(task)) =
                self.model.definition_mut(definition).as_task_mut().map(|t| &mut t.kind)
            {
                task.process = resolved;
            }
            if resolved.is_none() {
                self.warn(
                    codes::UNRESOLVED_PROCESS,
                    format!("Process '{reference}' is not part of the document; it will be bound at run time"),
                    ElementRef::Definition(definition),
                );
            }
        }

        for &definition in &collections.decision_tasks {
            let reference = match self.model.definition(definition).as_task().map(|t| &t.kind) {
                Some(TaskKind::Decision(task)) => task.decision_ref.clone(),
                _ => None,
            };
            let Some(reference) = reference else { continue };
            let resolved = self.model.decision_by_id(&reference);
            if let Some(TaskKind::Decision(task)) =
                self.model.definition_mut(definition).as_task_mut().map(|t| &mut t.kind)
            {
                task.decision = resolved;
            }
            if resolved.is_none() {
                self.warn(
                    codes::UNRESOLVED_DECISION,
                    format!("Decision '{reference}' is not part of the document; it will be bound at run time"),
                    ElementRef::Definition(definition),
                );
            }
        }
    }

    // ========================================================================
    // Step 7: timer start triggers
    // ========================================================================

    fn synthesize_timer_triggers(&mut self, collections: &mut Collections) -> Result<(), CompileError> {
        for timer in collections.timer_listeners.clone() {
            let definition = self.model.definition(timer);
            let Some(trigger) = definition.as_timer().and_then(|t| t.start_trigger.as_ref()) else {
                continue;
            };
            let Some(reference) = trigger.source_ref.clone() else {
                continue;
            };
            let standard_event = trigger.standard_event.clone();
            let timer_id = definition.base.id_or_empty().to_string();

            let owners: Vec<PlanItemId> = collections
                .plan_items
                .iter()
                .copied()
                .filter(|pi| self.model.plan_item(*pi).definition == Some(timer))
                .collect();
            // An unused timer is still checked from the stage that declares it.
            let scopes: Vec<(Option<PlanItemId>, DefinitionId)> = if owners.is_empty() {
                definition.parent_stage.map(|stage| (None, stage)).into_iter().collect()
            } else {
                owners
                    .iter()
                    .map(|&owner| (Some(owner), self.model.plan_item(owner).parent_fragment))
                    .collect()
            };

            for (owner, fragment) in scopes {
                let Some(source) = self.model.find_plan_item_upwards(fragment, &reference) else {
                    return Err(CompileError::dangling(
                        ReferenceKind::PlanItemStartTrigger,
                        &timer_id,
                        reference,
                    ));
                };
                if let Some(trigger) = self
                    .model
                    .definition_mut(timer)
                    .as_timer_mut()
                    .and_then(|t| t.start_trigger.as_mut())
                {
                    trigger.source.get_or_insert(source);
                }
                let Some(owner) = owner else {
                    continue;
                };

                let mut sentry = Sentry::new(fragment);
                sentry.on_parts.push(SentryOnPart {
                    source_ref: Some(reference.clone()),
                    standard_event: standard_event.clone(),
                    source: Some(source),
                    ..SentryOnPart::default()
                });
                let sentry = self.model.add_sentry(sentry);
                collections.sentries.push(sentry);
                collections.on_parts.push((sentry, 0));

                let mut criterion =
                    Criterion::new(CriterionKind::Entry, CriterionOwner::PlanItem(owner), fragment);
                criterion.sentry = Some(sentry);
                criterion.authored = false;
                let criterion = self.model.add_criterion(criterion);
                self.model.plan_item_mut(owner).entry_criteria.push(criterion);
                collections.entry_criteria.push(criterion);

                trace!(source = %reference, "synthesized start trigger criterion");
            }
        }
        Ok(())
    }
}

/// Definitions parsed without an id join their stage after completion.
fn attach_pending_definitions(model: &mut CmmnModel, collections: &Collections) {
    for &definition in &collections.pending_definitions {
        let Some(parent) = model.definition(definition).parent_stage else {
            continue;
        };
        if let Some(stage) = model.definition_mut(parent).as_stage_mut() {
            stage.definitions.push(definition);
        }
    }
}

/// Synthetic criteria point at their sentry by object only; give them the
/// textual reference once the sentry has an id.
fn backfill_sentry_refs(model: &mut CmmnModel) {
    for index in 0..model.criteria.len() {
        let criterion = &model.criteria[index];
        if criterion.sentry_ref.is_some() {
            continue;
        }
        let Some(sentry) = criterion.sentry else { continue };
        let id = model.sentry(sentry).id().map(str::to_string);
        model.criteria[index].sentry_ref = id;
    }
}
