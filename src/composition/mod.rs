//! Input timeline model and its builder DSL.

pub mod dsl;
pub mod model;
