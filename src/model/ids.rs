//! Typed arena indices.
//!
//! Ownership lives in the arenas of [`CmmnModel`](super::CmmnModel); every
//! cross reference and back reference between elements is one of these
//! copyable indices.

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an id from an arena index.
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            /// Get the index into the arena.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

arena_id!(
    /// Index of a [`Case`](super::Case).
    CaseId
);
arena_id!(
    /// Index of a [`PlanItemDefinition`](super::PlanItemDefinition), stages included.
    DefinitionId
);
arena_id!(
    /// Index of a [`PlanItem`](super::PlanItem).
    PlanItemId
);
arena_id!(
    /// Index of a [`Sentry`](super::Sentry).
    SentryId
);
arena_id!(
    /// Index of a [`Criterion`](super::Criterion).
    CriterionId
);
arena_id!(ProcessId);
arena_id!(DecisionId);
arena_id!(AssociationId);
arena_id!(TextAnnotationId);

/// A reference to any addressable element of the model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Case(CaseId),
    Definition(DefinitionId),
    PlanItem(PlanItemId),
    Sentry(SentryId),
    /// The on-part at `index` of a sentry.
    OnPart(SentryId, u32),
    IfPart(SentryId),
    Criterion(CriterionId),
    Process(ProcessId),
    Decision(DecisionId),
    Association(AssociationId),
    TextAnnotation(TextAnnotationId),
}
