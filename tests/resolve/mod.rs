//! Resolution tests
//!
//! Post-parse passes over compiled documents:
//! - Scoped reference resolution (on-parts, timer start triggers)
//! - Identifier completion
//! - Diagram reconciliation

pub mod tests_ids;
