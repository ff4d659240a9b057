//! Cases and the callee definitions (processes, decisions) tasks point at.

use indexmap::IndexMap;

use super::element::BaseElement;
use super::ids::{DefinitionId, ElementRef};

/// A single case definition, rooted in its plan model stage.
#[derive(Clone, Debug, Default)]
pub struct Case {
    pub base: BaseElement,
    pub name: Option<String>,
    pub initiator_variable_name: Option<String>,
    pub candidate_starter_users: Vec<String>,
    pub candidate_starter_groups: Vec<String>,
    pub is_async: bool,
    /// The root stage (`casePlanModel`).
    pub plan_model: Option<DefinitionId>,
    /// Every element of the case by id; filled after identifier completion.
    pub element_index: IndexMap<String, ElementRef>,
}

impl Case {
    pub fn id(&self) -> Option<&str> {
        self.base.id()
    }

    pub fn element(&self, id: &str) -> Option<ElementRef> {
        self.element_index.get(id).copied()
    }
}

/// A `process` element: an externally deployed process a process task starts.
#[derive(Clone, Debug, Default)]
pub struct Process {
    pub base: BaseElement,
    pub name: Option<String>,
    /// Deployment key the runtime binds to.
    pub external_ref: Option<String>,
    pub implementation_type: Option<String>,
}

/// A `decision` element: an externally deployed decision table.
#[derive(Clone, Debug, Default)]
pub struct Decision {
    pub base: BaseElement,
    pub name: Option<String>,
    pub external_ref: Option<String>,
    pub implementation_type: Option<String>,
}
