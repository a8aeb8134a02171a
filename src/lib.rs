//! strata lays out multi-layer video timelines for a frame-accurate compositor.
//!
//! Given an ordered set of layers (video, audio, still images and nested groups) with
//! ranges, stacking levels and transitions, a single [`layout`] pass produces a
//! [`CompositionPlan`]:
//!
//! - a [`TrackTable`] mapping every layer to physical media tracks, reusing video tracks
//!   for time-disjoint layers and reserving one alternating pair for cross-transitions
//! - the breakpoints of the output timeline with its passthrough and transition ranges
//! - one [`Instruction`] per sub-interval naming the contributing layers (top first),
//!   the foreground/background tracks when blending, and the transition window
//! - the per-track [`AudioMix`] inputs
//!
//! The pass is pure and deterministic: equal timelines give equal plans and equal
//! [`CompositionPlan::fingerprint`]s. A [`Dispatcher`] turns instants into frame jobs
//! against a swappable plan snapshot for a downstream renderer.
#![forbid(unsafe_code)]

mod audio;
mod compile;
mod composition;
mod dispatch;
mod effects;
mod foundation;
mod layout;

pub use audio::mix::{AudioMix, AudioMixInput};
pub use compile::fingerprint::PlanFingerprint;
pub use composition::dsl::{LayerBuilder, TimelineBuilder};
pub use composition::model::{AudioParams, Layer, LayerKind, PitchAlgorithm, Timeline, Transition};
pub use dispatch::context::{BlendJob, FrameJob, RenderContext, RequestOutcome, SourceSample};
pub use dispatch::dispatcher::{CancelHandle, DispatchOpts, Dispatcher};
pub use effects::transitions::{
    EffectSpec, TransitionKind, TransitionRegistry, WipeDir, parse_effect_spec,
    parse_transition_kind_params,
};
pub use foundation::error::{StrataError, StrataResult};
pub use foundation::time::{MediaTime, TIMESCALE, TimeRange};
pub use layout::builder::CompositionLayout;
pub use layout::instructions::Instruction;
pub use layout::plan::{
    CompositionPlan, GroupMembers, LayerId, LayoutDiagnostic, LayoutOptions, LeafKind,
    PlacedLayer, layout, layout_with_opts,
};
pub use layout::tracks::{BlankTrack, LayerTracks, MediaKind, Track, TrackId, TrackRole, TrackTable};
