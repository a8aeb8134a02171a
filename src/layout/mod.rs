//! The layout pass: timeline in, composition plan out.
//!
//! Stages run in a fixed order: [`flatten`] the layer tree, place slots with the
//! [`builder`], allocate [`tracks`], then emit [`instructions`]. [`plan`] ties them
//! together.

pub(crate) mod builder;
pub(crate) mod flatten;
pub(crate) mod instructions;
pub(crate) mod plan;
pub(crate) mod tracks;
