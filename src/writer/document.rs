//! Model → element tree.

use rustc_hash::FxHashSet;

use super::node::XmlNode;
use crate::model::{
    Association, BaseElement, Case, CmmnModel, Criterion, DefinitionId, DefinitionKind,
    GraphicInfo, ItemControl, PlanItem, PlanItemDefinition, Rule, RuleKind, Sentry, TaskKind,
    namespace,
};

/// Element name prefixes in use for the output document.
struct Prefixes {
    cmmn: String,
    flowable: String,
    cmmndi: String,
    dc: String,
    di: String,
}

impl Prefixes {
    fn qualify(prefix: &str, local: &str) -> String {
        if prefix.is_empty() {
            local.to_string()
        } else {
            format!("{prefix}:{local}")
        }
    }
}

pub struct DocumentBuilder<'m> {
    model: &'m CmmnModel,
    prefixes: Prefixes,
    namespaces: Vec<(String, String)>,
    /// Ids of semantic elements emitted so far; diagram output is limited
    /// to these.
    written: FxHashSet<String>,
}

impl<'m> DocumentBuilder<'m> {
    pub fn new(model: &'m CmmnModel) -> Self {
        let mut namespaces: Vec<(String, String)> = model
            .namespaces
            .iter()
            .map(|(p, u)| (p.clone(), u.clone()))
            .collect();

        let mut bind = |uri: &str, preferred: &str, fallback: &str| -> String {
            if let Some((prefix, _)) = namespaces.iter().find(|(_, u)| u == uri) {
                return prefix.clone();
            }
            let prefix = if namespaces.iter().any(|(p, _)| p == preferred) {
                fallback.to_string()
            } else {
                preferred.to_string()
            };
            namespaces.push((prefix.clone(), uri.to_string()));
            prefix
        };
        let cmmn = bind(namespace::CMMN, "", "cmmn");
        let flowable = bind(namespace::FLOWABLE, "flowable", "flowable1");
        let cmmndi = bind(namespace::CMMNDI, "cmmndi", "cmmndi1");
        let dc = bind(namespace::DC, "dc", "dc1");
        let di = bind(namespace::DI, "di", "di1");

        Self {
            model,
            prefixes: Prefixes {
                cmmn,
                flowable,
                cmmndi,
                dc,
                di,
            },
            namespaces,
            written: FxHashSet::default(),
        }
    }

    fn cmmn(&self, local: &str) -> String {
        Prefixes::qualify(&self.prefixes.cmmn, local)
    }

    fn flowable(&self, local: &str) -> String {
        Prefixes::qualify(&self.prefixes.flowable, local)
    }

    fn element(&mut self, local: &str, base: &BaseElement) -> XmlNode {
        if let Some(id) = base.id() {
            self.written.insert(id.to_string());
        }
        let documentation =
            XmlNode::text_element(self.cmmn("documentation"), base.documentation.as_deref());
        let extensions = (!base.extension_elements.is_empty()).then(|| {
            XmlNode::new(self.cmmn("extensionElements"))
                .children(base.extension_elements.iter().map(XmlNode::from))
        });
        XmlNode::new(self.cmmn(local))
            .opt_attr("id", base.id())
            .opt_child(documentation)
            .opt_child(extensions)
    }

    pub fn build(mut self) -> XmlNode {
        let model = self.model;
        let mut root = XmlNode::new(self.cmmn("definitions"));
        for (prefix, uri) in &self.namespaces {
            let name = if prefix.is_empty() {
                "xmlns".to_string()
            } else {
                format!("xmlns:{prefix}")
            };
            root = root.attr(name, uri.clone());
        }
        root = root
            .opt_attr("targetNamespace", model.target_namespace.as_deref())
            .opt_attr("expressionLanguage", model.expression_language.as_deref())
            .opt_attr("exporter", model.exporter.as_deref())
            .opt_attr("exporterVersion", model.exporter_version.as_deref())
            .opt_attr("author", model.author.as_deref());
        if let Some(date) = model.creation_date {
            root = root.attr("creationDate", date.to_rfc3339());
        }

        for case in &model.cases {
            if let Some(node) = self.case(case) {
                root = root.child(node);
            }
        }
        for process in &model.processes {
            let node = self
                .element("process", &process.base)
                .opt_attr("name", process.name.as_deref())
                .opt_attr("externalRef", process.external_ref.as_deref())
                .opt_attr("implementationType", process.implementation_type.as_deref());
            root = root.child(node);
        }
        for decision in &model.decisions {
            let node = self
                .element("decision", &decision.base)
                .opt_attr("name", decision.name.as_deref())
                .opt_attr("externalRef", decision.external_ref.as_deref())
                .opt_attr("implementationType", decision.implementation_type.as_deref());
            root = root.child(node);
        }
        for association in model.associations.iter().filter(|a| !a.from_diagram) {
            let node = self
                .element("association", &association.base)
                .opt_attr("sourceRef", association.source_ref.as_deref())
                .opt_attr("targetRef", association.target_ref.as_deref());
            root = root.child(node);
        }
        for annotation in &model.text_annotations {
            let text = XmlNode::text_element(self.cmmn("text"), annotation.text.as_deref());
            let node = self
                .element("textAnnotation", &annotation.base)
                .opt_attr("textFormat", annotation.text_format.as_deref())
                .opt_child(text);
            root = root.child(node);
        }

        root.opt_child(self.diagram())
    }

    // ========================================================================
    // Cases and plan structure
    // ========================================================================

    /// `None` for cases whose plan model has no plan items.
    fn case(&mut self, case: &Case) -> Option<XmlNode> {
        let plan_model = case.plan_model?;
        let is_empty = self
            .model
            .definition(plan_model)
            .as_fragment()
            .is_none_or(|f| f.plan_items.is_empty());
        if is_empty {
            tracing::debug!(case = case.base.id_or_empty(), "skipping empty case");
            return None;
        }

        let node = self
            .element("case", &case.base)
            .opt_attr("name", case.name.as_deref())
            .opt_attr(
                self.flowable("initiatorVariableName"),
                case.initiator_variable_name.as_deref(),
            )
            .list_attr(self.flowable("candidateStarterUsers"), &case.candidate_starter_users)
            .list_attr(self.flowable("candidateStarterGroups"), &case.candidate_starter_groups)
            .flag(self.flowable("async"), case.is_async, false);
        let plan = self.definition(plan_model);
        Some(node.child(plan))
    }

    fn definition(&mut self, id: DefinitionId) -> XmlNode {
        let model = self.model;
        let definition = model.definition(id);
        let mut node = self
            .element(definition.element_name(), &definition.base)
            .opt_attr("name", definition.name.as_deref());
        node = self.definition_attributes(node, definition);
        if let Some(control) = &definition.default_control {
            node = node.child(self.item_control("defaultControl", control));
        }

        match &definition.kind {
            DefinitionKind::Stage(stage) => {
                node = self.fragment_content(node, id);
                for &nested in &stage.definitions {
                    node = node.child(self.definition(nested));
                }
                for &criterion in &stage.exit_criteria {
                    node = node.child(self.criterion(model.criterion(criterion)));
                }
            }
            DefinitionKind::PlanFragment(_) => {
                node = self.fragment_content(node, id);
            }
            DefinitionKind::Task(task) => {
                let expression = match &task.kind {
                    TaskKind::Case(t) => {
                        XmlNode::text_element(self.cmmn("caseRefExpression"), t.case_ref_expression.as_deref())
                    }
                    TaskKind::Process(t) => XmlNode::text_element(
                        self.cmmn("processRefExpression"),
                        t.process_ref_expression.as_deref(),
                    ),
                    TaskKind::Decision(t) => XmlNode::text_element(
                        self.cmmn("decisionRefExpression"),
                        t.decision_ref_expression.as_deref(),
                    ),
                    _ => None,
                };
                node = node.opt_child(expression);
            }
            DefinitionKind::TimerEventListener(timer) => {
                node = node.opt_child(XmlNode::text_element(
                    self.cmmn("timerExpression"),
                    timer.timer_expression.as_deref(),
                ));
                if let Some(trigger) = &timer.start_trigger {
                    let trigger_node = XmlNode::new(self.cmmn("planItemStartTrigger"))
                        .opt_attr("id", trigger.id.as_deref())
                        .opt_attr("sourceRef", trigger.source_ref.as_deref())
                        .opt_child(XmlNode::text_element(
                            self.cmmn("standardEvent"),
                            trigger.standard_event.as_deref(),
                        ));
                    node = node.child(trigger_node);
                }
            }
            DefinitionKind::Milestone(_)
            | DefinitionKind::UserEventListener(_)
            | DefinitionKind::GenericEventListener(_) => {}
        }
        node
    }

    fn definition_attributes(&self, node: XmlNode, definition: &PlanItemDefinition) -> XmlNode {
        match &definition.kind {
            DefinitionKind::Stage(stage) => node
                .flag("autoComplete", stage.auto_complete, false)
                .opt_attr("autoCompleteCondition", stage.auto_complete_condition.as_deref())
                .opt_attr(self.flowable("formKey"), stage.form_key.as_deref())
                .opt_attr(
                    self.flowable("displayOrder"),
                    stage.display_order.map(|o| o.to_string()).as_deref(),
                )
                .opt_attr(
                    self.flowable("includeInStageOverview"),
                    stage.include_in_stage_overview.map(|b| b.to_string()).as_deref(),
                ),
            DefinitionKind::PlanFragment(_) => node,
            DefinitionKind::Task(task) => {
                let node = node
                    .flag("isBlocking", task.is_blocking, true)
                    .opt_attr(self.flowable("isBlockingExpression"), task.blocking_expression.as_deref())
                    .flag(self.flowable("async"), task.is_async, false)
                    .flag(self.flowable("exclusive"), task.is_exclusive, true);
                match &task.kind {
                    TaskKind::Plain(t) => node
                        .opt_attr(self.flowable("type"), t.task_type.as_deref())
                        .opt_attr(self.flowable("class"), t.class_name.as_deref())
                        .opt_attr(self.flowable("expression"), t.expression.as_deref())
                        .opt_attr(self.flowable("delegateExpression"), t.delegate_expression.as_deref())
                        .opt_attr(self.flowable("resultVariableName"), t.result_variable_name.as_deref()),
                    TaskKind::Human(t) => node
                        .opt_attr(self.flowable("assignee"), t.assignee.as_deref())
                        .opt_attr(self.flowable("owner"), t.owner.as_deref())
                        .list_attr(self.flowable("candidateUsers"), &t.candidate_users)
                        .list_attr(self.flowable("candidateGroups"), &t.candidate_groups)
                        .opt_attr(self.flowable("priority"), t.priority.as_deref())
                        .opt_attr(self.flowable("formKey"), t.form_key.as_deref())
                        .opt_attr(self.flowable("dueDate"), t.due_date.as_deref())
                        .opt_attr(self.flowable("category"), t.category.as_deref()),
                    TaskKind::Case(t) => node
                        .opt_attr("caseRef", t.case_ref.as_deref())
                        .flag(self.flowable("fallbackToDefaultTenant"), t.fallback_to_default_tenant, false),
                    TaskKind::Process(t) => node
                        .opt_attr("processRef", t.process_ref.as_deref())
                        .flag(self.flowable("fallbackToDefaultTenant"), t.fallback_to_default_tenant, false),
                    TaskKind::Decision(t) => node.opt_attr("decisionRef", t.decision_ref.as_deref()),
                }
            }
            DefinitionKind::Milestone(m) => {
                node.opt_attr(self.flowable("milestoneVariable"), m.milestone_variable.as_deref())
            }
            DefinitionKind::TimerEventListener(_)
            | DefinitionKind::UserEventListener(_)
            | DefinitionKind::GenericEventListener(_) => node.opt_attr(
                self.flowable("availableCondition"),
                definition
                    .event_listener()
                    .and_then(|l| l.available_condition.as_deref()),
            ),
        }
    }

    /// Plan items then sentries of a stage or plan fragment.
    fn fragment_content(&mut self, mut node: XmlNode, fragment: DefinitionId) -> XmlNode {
        let model = self.model;
        let Some(parts) = model.definition(fragment).as_fragment() else {
            return node;
        };
        for &item in &parts.plan_items {
            node = node.child(self.plan_item(model.plan_item(item)));
        }
        for &sentry in &parts.sentries {
            node = node.child(self.sentry(model.sentry(sentry)));
        }
        node
    }

    fn plan_item(&mut self, item: &PlanItem) -> XmlNode {
        let model = self.model;
        let definition_ref = item
            .definition
            .and_then(|d| model.definition(d).id())
            .or(item.definition_ref.as_deref());
        let mut node = self
            .element("planItem", &item.base)
            .opt_attr("name", item.name.as_deref())
            .opt_attr("definitionRef", definition_ref);
        if let Some(control) = &item.item_control {
            node = node.child(self.item_control("itemControl", control));
        }
        for &criterion in item.entry_criteria.iter().chain(&item.exit_criteria) {
            let criterion = model.criterion(criterion);
            if criterion.authored {
                node = node.child(self.criterion(criterion));
            }
        }
        node
    }

    fn criterion(&mut self, criterion: &Criterion) -> XmlNode {
        let model = self.model;
        let sentry_ref = criterion
            .sentry
            .and_then(|s| model.sentry(s).id())
            .or(criterion.sentry_ref.as_deref());
        self.element(criterion.kind.element_name(), &criterion.base)
            .opt_attr("name", criterion.name.as_deref())
            .opt_attr("sentryRef", sentry_ref)
            .opt_attr(self.flowable("exitType"), criterion.exit_type.as_deref())
            .opt_attr(self.flowable("exitEventType"), criterion.exit_event_type.as_deref())
    }

    fn sentry(&mut self, sentry: &Sentry) -> XmlNode {
        let model = self.model;
        let mut node = self
            .element("sentry", &sentry.base)
            .opt_attr("name", sentry.name.as_deref())
            .opt_attr(self.flowable("triggerMode"), sentry.trigger_mode.as_deref());
        for on_part in &sentry.on_parts {
            let source_ref = on_part
                .source
                .and_then(|s| model.plan_item(s).id())
                .or(on_part.source_ref.as_deref());
            let event = XmlNode::text_element(self.cmmn("standardEvent"), on_part.standard_event.as_deref());
            let child = self
                .element("planItemOnPart", &on_part.base)
                .opt_attr("name", on_part.name.as_deref())
                .opt_attr("sourceRef", source_ref)
                .opt_child(event);
            node = node.child(child);
        }
        if let Some(if_part) = &sentry.if_part {
            let condition = XmlNode::text_element(self.cmmn("condition"), if_part.condition.as_deref());
            node = node.child(self.element("ifPart", &if_part.base).opt_child(condition));
        }
        node
    }

    fn item_control(&self, local: &str, control: &ItemControl) -> XmlNode {
        let mut node = XmlNode::new(self.cmmn(local));
        if let Some(repetition) = &control.repetition_rule {
            let rule = self
                .rule(RuleKind::Repetition, &repetition.rule)
                .opt_attr(self.flowable("counterVariable"), repetition.counter_variable.as_deref())
                .opt_attr(
                    self.flowable("maxInstanceCount"),
                    repetition.max_instance_count.map(|c| c.to_string()).as_deref(),
                );
            node = node.child(rule);
        }
        let rules = [
            (RuleKind::Required, &control.required_rule),
            (RuleKind::ManualActivation, &control.manual_activation_rule),
            (RuleKind::CompletionNeutral, &control.completion_neutral_rule),
        ];
        for (kind, rule) in rules {
            if let Some(rule) = rule {
                node = node.child(self.rule(kind, rule));
            }
        }
        node
    }

    fn rule(&self, kind: RuleKind, rule: &Rule) -> XmlNode {
        XmlNode::new(self.cmmn(kind.element_name()))
            .opt_attr("id", rule.id.as_deref())
            .opt_attr("name", rule.name.as_deref())
            .opt_child(XmlNode::text_element(self.cmmn("condition"), rule.condition.as_deref()))
    }

    // ========================================================================
    // Diagram
    // ========================================================================

    fn diagram(&self) -> Option<XmlNode> {
        let model = self.model;
        let shapes: Vec<XmlNode> = model
            .location_map
            .iter()
            .filter(|(id, _)| self.written.contains(id.as_str()))
            .map(|(id, bounds)| self.shape(id, bounds))
            .collect();
        let edges: Vec<XmlNode> = model
            .associations
            .iter()
            .filter_map(|a| self.edge(a))
            .collect();
        if shapes.is_empty() && edges.is_empty() {
            return None;
        }

        let info = model.diagrams.first();
        let diagram = XmlNode::new(self.di_name(&self.prefixes.cmmndi, "CMMNDiagram"))
            .attr(
                "id",
                info.and_then(|d| d.id.clone())
                    .unwrap_or_else(|| "CMMNDiagram_1".to_string()),
            )
            .opt_attr("name", info.and_then(|d| d.name.as_deref()))
            .children(shapes)
            .children(edges);
        Some(XmlNode::new(self.di_name(&self.prefixes.cmmndi, "CMMNDI")).child(diagram))
    }

    fn di_name(&self, prefix: &str, local: &str) -> String {
        Prefixes::qualify(prefix, local)
    }

    fn bounds(&self, bounds: &GraphicInfo) -> XmlNode {
        XmlNode::new(self.di_name(&self.prefixes.dc, "Bounds"))
            .attr("height", bounds.height.to_string())
            .attr("width", bounds.width.to_string())
            .attr("x", bounds.x.to_string())
            .attr("y", bounds.y.to_string())
    }

    fn label(&self, id: &str) -> Option<XmlNode> {
        let bounds = self.model.label_graphic_info(id)?;
        Some(XmlNode::new(self.di_name(&self.prefixes.cmmndi, "CMMNLabel")).child(self.bounds(bounds)))
    }

    fn shape(&self, id: &str, bounds: &GraphicInfo) -> XmlNode {
        XmlNode::new(self.di_name(&self.prefixes.cmmndi, "CMMNShape"))
            .attr("id", format!("CMMNShape_{id}"))
            .attr("cmmnElementRef", id)
            .child(self.bounds(bounds))
            .opt_child(self.label(id))
    }

    /// Edges for authored associations carry a `cmmnElementRef`; edges the
    /// model synthesized from a diagram keep the association id as their own.
    fn edge(&self, association: &Association) -> Option<XmlNode> {
        let id = association.id()?;
        let waypoints = self.model.flow_graphic_info(id)?;
        let node = XmlNode::new(self.di_name(&self.prefixes.cmmndi, "CMMNEdge"));
        let node = if association.from_diagram {
            node.attr("id", id)
        } else {
            node.attr("id", format!("CMMNEdge_{id}")).attr("cmmnElementRef", id)
        };
        let node = node
            .opt_attr("sourceCMMNElementRef", association.source_ref.as_deref())
            .opt_attr("targetCMMNElementRef", association.target_ref.as_deref())
            .children(waypoints.iter().map(|point| {
                XmlNode::new(self.di_name(&self.prefixes.di, "waypoint"))
                    .attr("x", point.x.to_string())
                    .attr("y", point.y.to_string())
            }))
            .opt_child(self.label(id));
        Some(node)
    }
}
