//! Reader tests
//!
//! Tree building from whole documents:
//! - Element conversion and attribute mapping
//! - Structural errors
//! - Encodings, validation and file input

pub mod tests_compile;
pub mod tests_encoding;
pub mod tests_validation;
