use std::collections::BTreeSet;

use crate::composition::model::Transition;
use crate::foundation::time::{MediaTime, TimeRange};
use crate::layout::flatten::{FlatLeaf, Slot};
use crate::layout::plan::LayoutDiagnostic;

/// Breakpoints plus the classification of the sub-ranges between them.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CompositionLayout {
    /// Sorted, deduplicated instants where the active layer set or blend state changes.
    pub breakpoints: Vec<MediaTime>,
    /// Sub-ranges rendered without cross-blending.
    pub passthrough_ranges: Vec<TimeRange>,
    /// Overlap windows where two consecutive layers are cross-applied.
    pub transition_ranges: Vec<TimeRange>,
}

impl CompositionLayout {
    /// Transition range containing `segment`, if any.
    pub fn transition_containing(&self, segment: TimeRange) -> Option<TimeRange> {
        self.transition_ranges
            .iter()
            .copied()
            .find(|r| r.contains_range(segment))
    }

    /// `[first, last]` breakpoint span; `None` without breakpoints.
    pub fn span(&self) -> Option<TimeRange> {
        let first = *self.breakpoints.first()?;
        let last = *self.breakpoints.last()?;
        Some(TimeRange {
            start: first,
            end: last,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct BuiltLayout {
    pub(crate) layout: CompositionLayout,
    /// Placed range per slot, indexed like the slot list.
    pub(crate) slot_placements: Vec<TimeRange>,
    /// Transition per slot after normalization.
    pub(crate) slot_transitions: Vec<Transition>,
    /// Placed range per leaf, indexed like the leaf list.
    pub(crate) leaf_placements: Vec<TimeRange>,
    pub(crate) diagnostics: Vec<LayoutDiagnostic>,
}

struct Previous {
    placed: TimeRange,
    transition: MediaTime,
}

/// Place slots back to back and classify the resulting sub-ranges.
///
/// Slots are walked in start order (stable). A transitioning slot lends its trailing
/// `duration` to the next slot, so transitions shorten the timeline instead of
/// extending it.
pub(crate) fn build_layout(slots: &[Slot<'_>], leaves: &[FlatLeaf<'_>]) -> BuiltLayout {
    let mut order: Vec<usize> = (0..slots.len()).collect();
    order.sort_by_key(|&i| slots[i].range.start);

    let mut out = BuiltLayout {
        slot_placements: vec![TimeRange::default(); slots.len()],
        slot_transitions: vec![Transition::none(); slots.len()],
        ..BuiltLayout::default()
    };
    let mut breakpoints = BTreeSet::<MediaTime>::new();
    let mut next_start = MediaTime::ZERO;
    let mut previous: Option<Previous> = None;

    for (pos, &si) in order.iter().enumerate() {
        let slot = &slots[si];
        let duration = slot.range.duration();
        let is_last = pos + 1 == order.len();
        let lead = previous.as_ref().map_or(MediaTime::ZERO, |p| p.transition);

        let mut transition = slot.layer.transition.clone();
        // The last slot has no neighbour to overlap, so its transition is never clamped.
        if transition.is_animated()
            && let Some(&next) = order.get(pos + 1)
        {
            let bound = (duration - lead)
                .min(slots[next].range.duration())
                .max(MediaTime::ZERO);
            if transition.duration >= bound {
                tracing::warn!(
                    layer = %slot.layer.id,
                    requested = %transition.duration,
                    clamped = %bound,
                    "transition does not fit its neighbours, clamping"
                );
                out.diagnostics.push(LayoutDiagnostic::DegenerateTransition {
                    layer: slot.layer.id.clone(),
                    requested: transition.duration,
                    clamped: bound,
                });
                transition.duration = bound;
            }
        }
        let transitioning = transition.is_animated();
        let trail = if transitioning {
            transition.duration
        } else {
            MediaTime::ZERO
        };

        let placed = TimeRange::from_duration(next_start, duration);

        if let Some(prev) = &previous
            && prev.transition.is_positive()
        {
            out.layout.transition_ranges.push(TimeRange {
                start: placed.start,
                end: prev.placed.end,
            });
        }

        let mut passthrough_end = placed.end - trail;
        if is_last {
            // Nothing follows to own the tail.
            passthrough_end = placed.end;
        }
        let passthrough = TimeRange {
            start: placed.start + lead,
            end: passthrough_end,
        };
        if !passthrough.is_empty() {
            out.layout.passthrough_ranges.push(passthrough);
        }

        breakpoints.insert(placed.start);
        breakpoints.insert(placed.end);

        tracing::debug!(layer = %slot.layer.id, placed = %placed, "placed slot");

        out.slot_placements[si] = placed;
        out.slot_transitions[si] = transition;

        next_start = next_start + duration - trail;
        previous = Some(Previous {
            placed,
            transition: trail,
        });
    }

    out.leaf_placements = leaves
        .iter()
        .map(|leaf| match leaf.slot {
            Some(si) => {
                let slot = &slots[si];
                let offset = leaf.layer.range.start - slot.range.start;
                let placed = if leaf.id == slot.id {
                    out.slot_placements[si]
                } else {
                    TimeRange::from_duration(
                        out.slot_placements[si].start + offset,
                        leaf.layer.range.duration(),
                    )
                };
                if leaf.layer.is_visual() {
                    breakpoints.insert(placed.start);
                    breakpoints.insert(placed.end);
                }
                placed
            }
            None => leaf.layer.range,
        })
        .collect();

    out.layout.breakpoints = breakpoints.into_iter().collect();

    for r in &out.layout.transition_ranges {
        tracing::debug!(range = %r, "transition range");
    }
    for r in &out.layout.passthrough_ranges {
        tracing::debug!(range = %r, "passthrough range");
    }

    out
}

#[cfg(test)]
#[path = "../../tests/unit/layout/builder.rs"]
mod tests;
