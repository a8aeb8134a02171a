use smallvec::SmallVec;

use crate::composition::model::Transition;
use crate::foundation::time::{MediaTime, TimeRange};
use crate::layout::builder::CompositionLayout;
use crate::layout::plan::{LayerId, PlacedLayer};
use crate::layout::tracks::{TrackId, TrackTable};

/// The unit of rendering work for one sub-interval between consecutive breakpoints.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Instruction {
    pub range: TimeRange,
    /// Contributing layers, highest z-level first.
    pub layers: SmallVec<[LayerId; 4]>,
    pub is_transition: bool,
    pub foreground_track: Option<TrackId>,
    pub background_track: Option<TrackId>,
    /// Track to sample directly when no blending happens.
    pub passthrough_track: Option<TrackId>,
    pub transition: Transition,
    /// Full transition window this instruction belongs to.
    pub transition_range: Option<TimeRange>,
}

impl Instruction {
    /// No layer contributes; the renderer draws nothing for this interval.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Blend progress at `t`: `(t - start) / duration` of the transition window, clamped
    /// to `[0, 1]`. Passthrough instructions report `0`.
    pub fn progress_at(&self, t: MediaTime) -> f64 {
        let Some(window) = self.transition_range else {
            return 0.0;
        };
        let dur = window.duration();
        if !dur.is_positive() {
            return 1.0;
        }
        let p = (t - window.start).ticks() as f64 / dur.ticks() as f64;
        p.clamp(0.0, 1.0)
    }
}

/// One instruction per consecutive breakpoint pair.
///
/// Transition windows alternate the reserved track pair by the parity of their first
/// segment, so two tracks carry every cross-fade in the timeline. A window split by a
/// group member's breakpoint keeps one foreground/background pair throughout.
pub(crate) fn generate_instructions(
    layers: &[PlacedLayer],
    layout: &CompositionLayout,
    tracks: &TrackTable,
) -> Vec<Instruction> {
    let times = &layout.breakpoints;
    let mut out = Vec::with_capacity(times.len().saturating_sub(1));

    let mut by_start: Vec<&PlacedLayer> = layers.iter().filter(|l| l.is_visual()).collect();
    by_start.sort_by_key(|l| (l.placement.start, l.id));

    let mut open_window: Option<(TimeRange, usize)> = None;

    for (index, pair) in times.windows(2).enumerate() {
        let segment = TimeRange {
            start: pair[0],
            end: pair[1],
        };
        let transition_range = layout.transition_containing(segment);

        let mut contributing: SmallVec<[&PlacedLayer; 4]> = by_start
            .iter()
            .copied()
            .filter(|l| l.placement.intersects(segment))
            .collect();

        let transition = transition_range
            .and_then(|window| {
                contributing
                    .iter()
                    .find(|l| l.transition.is_animated() && l.placement.intersects(window))
                    .map(|l| l.transition.clone())
            })
            .unwrap_or_default();

        // Stable: equal levels keep placement order.
        contributing.sort_by_key(|l| std::cmp::Reverse(l.z_level));

        let is_transition = transition_range.is_some();
        let parity_index = match (transition_range, open_window) {
            (Some(window), Some((open, first))) if open == window => Some(first),
            (Some(window), _) => {
                open_window = Some((window, index));
                Some(index)
            }
            (None, _) => None,
        };
        let (foreground_track, background_track) = match (parity_index, tracks.transition_tracks) {
            (Some(first), Some(pair)) => {
                let alternating = first % 2;
                (Some(pair[1 - alternating]), Some(pair[alternating]))
            }
            _ => (None, None),
        };

        let passthrough_track = if is_transition {
            None
        } else {
            contributing
                .iter()
                .rev()
                .find_map(|l| tracks.video_track_of(l.id))
                .or_else(|| {
                    tracks
                        .blank
                        .filter(|_| !contributing.is_empty())
                        .map(|b| b.track)
                })
        };

        let instruction = Instruction {
            range: segment,
            layers: contributing.iter().map(|l| l.id).collect(),
            is_transition,
            foreground_track,
            background_track,
            passthrough_track,
            transition,
            transition_range,
        };
        tracing::debug!(
            range = %instruction.range,
            layers = instruction.layers.len(),
            transition = instruction.is_transition,
            foreground = ?instruction.foreground_track,
            background = ?instruction.background_track,
            "instruction"
        );
        out.push(instruction);
    }

    out
}

#[cfg(test)]
#[path = "../../tests/unit/layout/instructions.rs"]
mod tests;
