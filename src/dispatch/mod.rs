//! Renderer-facing request dispatch over a layout plan.

/// Immutable render snapshot and request outcomes.
pub mod context;
/// Request resolution, cancellation and batch dispatch.
pub mod dispatcher;
