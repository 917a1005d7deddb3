//! Utility functions shared across layers.
//!
//! - [`code_generator`] - Short code alphabet and sequential code generation

pub mod code_generator;
