/// Error taxonomy shared by every module.
pub mod error;
/// Tick-based media time and half-open ranges.
pub mod time;
