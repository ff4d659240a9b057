//! Writer tests

pub mod tests_roundtrip;
