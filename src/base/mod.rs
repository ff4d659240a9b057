//! Foundation types for the CMMN compiler.
//!
//! - [`LineCol`], [`LineIndex`] - byte offset to line/column conversion
//!
//! This module has NO dependencies on other crate modules.

mod position;

pub use position::{LineCol, LineIndex};
