use std::sync::Arc;

use crate::composition::model::Transition;
use crate::effects::transitions::{TransitionKind, TransitionRegistry};
use crate::foundation::time::MediaTime;
use crate::layout::plan::{CompositionPlan, LayerId};
use crate::layout::tracks::TrackId;

/// Immutable snapshot a request is served from. Replaced wholesale, never mutated.
#[derive(Clone, Debug)]
pub struct RenderContext {
    pub plan: Arc<CompositionPlan>,
    pub registry: Arc<TransitionRegistry>,
    /// Bumped on every plan swap.
    pub generation: u64,
}

impl RenderContext {
    pub fn new(plan: CompositionPlan, registry: TransitionRegistry) -> Self {
        Self {
            plan: Arc::new(plan),
            registry: Arc::new(registry),
            generation: 0,
        }
    }
}

/// One source the renderer samples for a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct SourceSample {
    pub layer: LayerId,
    /// Video track to read from. Images read from the blank filler track.
    pub track: Option<TrackId>,
    /// Time inside the layer, zero at its placed start.
    pub local_time: MediaTime,
}

/// Blend step for a frame that falls inside a transition window.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BlendJob {
    pub transition: Transition,
    /// Registry entry for the effect; `None` for the identity transition.
    pub kind: Option<TransitionKind>,
    pub progress: f64,
    pub foreground: TrackId,
    pub background: TrackId,
}

/// Work description for one output frame.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FrameJob {
    pub time: MediaTime,
    pub generation: u64,
    /// Index of the instruction that produced the job.
    pub instruction: usize,
    /// Sources bottom-most first, the order they are composited in.
    pub sources: Vec<SourceSample>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blend: Option<BlendJob>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RequestOutcome {
    Frame(FrameJob),
    /// Nothing to draw: a gap or a time outside the timeline.
    Empty { time: MediaTime },
    Cancelled { time: MediaTime },
}

impl RequestOutcome {
    pub fn time(&self) -> MediaTime {
        match self {
            Self::Frame(job) => job.time,
            Self::Empty { time } | Self::Cancelled { time } => *time,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    pub fn as_frame(&self) -> Option<&FrameJob> {
        match self {
            Self::Frame(job) => Some(job),
            _ => None,
        }
    }
}
