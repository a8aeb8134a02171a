use crate::audio::mix::{AudioMix, build_audio_mix};
use crate::composition::model::{AudioParams, LayerKind, Timeline, Transition};
use crate::foundation::error::StrataResult;
use crate::foundation::time::{MediaTime, TimeRange};
use crate::layout::builder::{CompositionLayout, build_layout};
use crate::layout::flatten::flatten;
use crate::layout::instructions::{Instruction, generate_instructions};
use crate::layout::tracks::{TrackAllocator, TrackTable};

/// Identifier of a layer within one layout pass (pre-order position in the layer tree).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct LayerId(pub u32);

/// Media carried by a placed leaf layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Video,
    Audio,
    Image,
}

/// Recoverable input problems that layout normalized instead of failing on.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutDiagnostic {
    /// A group with no resolvable children; it contributes zero duration.
    UnresolvedGroup { layer: String },
    /// A transition that did not fit between its neighbours and was shortened.
    DegenerateTransition {
        layer: String,
        requested: MediaTime,
        clamped: MediaTime,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayoutOptions {
    /// Duration of the neutral filler source. `None` treats it as unbounded.
    pub blank_source_duration: Option<MediaTime>,
    /// Reserve the transition track pair even when no transition occurs.
    pub reserve_transition_tracks: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            blank_source_duration: None,
            reserve_transition_tracks: true,
        }
    }
}

/// A leaf layer with its definitive placement in the output timeline.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PlacedLayer {
    pub id: LayerId,
    /// User-facing layer id.
    pub key: String,
    pub kind: LeafKind,
    pub z_level: i32,
    /// Transition into the next slot. Group members carry their group's transition.
    pub transition: Transition,
    /// Range as declared in the input timeline.
    pub source_range: TimeRange,
    pub placement: TimeRange,
    /// Innermost enclosing group.
    pub group: Option<LayerId>,
    #[serde(default)]
    pub audio: AudioParams,
    pub has_audio: bool,
}

impl PlacedLayer {
    pub fn is_visual(&self) -> bool {
        matches!(self.kind, LeafKind::Video | LeafKind::Image)
    }

    /// Map a timeline instant into this layer's own time (zero at its placed start).
    pub fn local_time(&self, t: MediaTime) -> MediaTime {
        t - self.placement.start
    }
}

/// Everything one layout pass produces. Immutable once built.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompositionPlan {
    pub layers: Vec<PlacedLayer>,
    pub tracks: TrackTable,
    pub layout: CompositionLayout,
    pub instructions: Vec<Instruction>,
    pub audio_mix: AudioMix,
    pub diagnostics: Vec<LayoutDiagnostic>,
    /// Group id to every leaf below it.
    pub groups: Vec<GroupMembers>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GroupMembers {
    pub group: LayerId,
    pub key: String,
    pub members: Vec<LayerId>,
}

impl CompositionPlan {
    /// Placed leaf by id.
    pub fn layer(&self, id: LayerId) -> Option<&PlacedLayer> {
        self.layers
            .binary_search_by_key(&id, |l| l.id)
            .ok()
            .map(|i| &self.layers[i])
    }

    /// Placed leaf by its user-facing id.
    pub fn layer_by_key(&self, key: &str) -> Option<&PlacedLayer> {
        self.layers.iter().find(|l| l.key == key)
    }

    /// Leaves below the group with the given user-facing id.
    pub fn group_members(&self, key: &str) -> Option<&[LayerId]> {
        self.groups
            .iter()
            .find(|g| g.key == key)
            .map(|g| g.members.as_slice())
    }

    /// Instruction covering `t`, by binary search over the ordered instructions.
    pub fn instruction_at(&self, t: MediaTime) -> Option<&Instruction> {
        let idx = self.instruction_index_at(t)?;
        self.instructions.get(idx)
    }

    pub fn instruction_index_at(&self, t: MediaTime) -> Option<usize> {
        let idx = self.instructions.partition_point(|ins| ins.range.end <= t);
        let ins = self.instructions.get(idx)?;
        ins.range.contains(t).then_some(idx)
    }

    /// Span covered by the instructions.
    pub fn duration(&self) -> MediaTime {
        self.layout
            .span()
            .map_or(MediaTime::ZERO, |span| span.duration())
    }
}

/// Lay out a timeline with default options.
pub fn layout(timeline: &Timeline) -> StrataResult<CompositionPlan> {
    layout_with_opts(timeline, &LayoutOptions::default())
}

/// Assign tracks, compute breakpoints and ranges, and emit composition instructions.
///
/// The pass is pure: the same timeline always yields the same plan.
#[tracing::instrument(skip(timeline), fields(layers = timeline.layers.len()))]
pub fn layout_with_opts(
    timeline: &Timeline,
    opts: &LayoutOptions,
) -> StrataResult<CompositionPlan> {
    timeline.validate()?;

    let flat = flatten(timeline);
    let built = build_layout(&flat.slots, &flat.leaves);

    let mut layers = Vec::with_capacity(flat.leaves.len());
    for (leaf, placement) in flat.leaves.iter().zip(built.leaf_placements.iter().copied()) {
        let transition = match leaf.slot {
            Some(si) => built.slot_transitions[si].clone(),
            None => leaf.layer.transition.clone(),
        };
        let (kind, has_audio) = match &leaf.layer.kind {
            LayerKind::Video { has_audio } => (LeafKind::Video, *has_audio),
            LayerKind::Audio => (LeafKind::Audio, true),
            LayerKind::Image => (LeafKind::Image, false),
            LayerKind::Group { .. } => continue,
        };
        layers.push(PlacedLayer {
            id: leaf.id,
            key: leaf.layer.id.clone(),
            kind,
            z_level: leaf.layer.z_level,
            transition,
            source_range: leaf.layer.range,
            placement,
            group: leaf.group,
            audio: leaf.layer.audio,
            has_audio,
        });
    }

    let tracks = allocate_tracks(&layers, &built.layout, opts);
    let instructions = generate_instructions(&layers, &built.layout, &tracks);
    let audio_mix = build_audio_mix(&layers, &tracks);

    let mut diagnostics = flat.diagnostics;
    diagnostics.extend(built.diagnostics);

    let groups = flat
        .groups
        .into_iter()
        .map(|(group, members)| GroupMembers {
            group,
            key: flat.group_keys.get(&group).copied().unwrap_or_default().to_string(),
            members,
        })
        .collect();

    tracing::debug!(
        tracks = tracks.tracks.len(),
        instructions = instructions.len(),
        "layout complete"
    );

    Ok(CompositionPlan {
        layers,
        tracks,
        layout: built.layout,
        instructions,
        audio_mix,
        diagnostics,
        groups,
    })
}

/// Allocation order: transition pair, video layer tracks, blank filler, audio tracks.
/// Layers are visited in placement order so reuse follows the output timeline.
fn allocate_tracks(
    layers: &[PlacedLayer],
    layout: &CompositionLayout,
    opts: &LayoutOptions,
) -> TrackTable {
    let mut alloc = TrackAllocator::new();
    if opts.reserve_transition_tracks || !layout.transition_ranges.is_empty() {
        alloc.reserve_transition_pair();
    }

    let mut by_start: Vec<&PlacedLayer> = layers.iter().collect();
    by_start.sort_by_key(|l| (l.placement.start, l.id));

    for layer in by_start.iter().filter(|l| l.kind == LeafKind::Video) {
        let track = alloc.allocate_video(layer.id, layer.placement);
        tracing::debug!(
            layer = %layer.key,
            track = track.0,
            range = %layer.placement,
            "video track"
        );
    }

    let visual: Vec<&&PlacedLayer> = by_start.iter().filter(|l| l.is_visual()).collect();
    if visual.iter().any(|l| l.kind == LeafKind::Image) {
        let span = visual
            .iter()
            .map(|l| l.placement)
            .reduce(TimeRange::hull)
            .unwrap_or_default();
        let blank = alloc.allocate_blank(span, opts.blank_source_duration);
        tracing::debug!(
            track = blank.track.0,
            range = %blank.range,
            scale = blank.scale,
            "blank track"
        );
    }

    for layer in by_start.iter().filter(|l| l.has_audio) {
        alloc.allocate_audio(layer.id, layer.placement);
    }

    alloc.finish()
}

#[cfg(test)]
#[path = "../../tests/unit/layout/plan.rs"]
mod tests;
