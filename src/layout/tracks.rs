use std::collections::BTreeMap;

use crate::foundation::time::{MediaTime, TimeRange};
use crate::layout::plan::LayerId;

/// Physical track identifier. Ids start at 1 and are unique across media kinds.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TrackId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
}

/// What a track carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackRole {
    /// Media from one or more time-disjoint layers.
    Layer,
    /// One of the two reserved cross-transition tracks.
    Transition,
    /// Neutral filler so every instant has an addressable video track.
    Blank,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Track {
    pub id: TrackId,
    pub kind: MediaKind,
    pub role: TrackRole,
    pub last_occupied_end: MediaTime,
}

/// Neutral-content filler spanning the whole visual timeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BlankTrack {
    pub track: TrackId,
    pub range: TimeRange,
    /// Source duration actually inserted (clipped to the span).
    pub inserted: MediaTime,
    /// Time-scale factor applied to stretch `inserted` over `range` (>= 1).
    pub scale: f64,
}

/// Tracks owned by one layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LayerTracks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<TrackId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<TrackId>,
}

/// Output of track allocation for one layout pass.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrackTable {
    pub tracks: Vec<Track>,
    pub assignments: BTreeMap<LayerId, LayerTracks>,
    /// Reserved cross-transition pair, stable across the whole timeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transition_tracks: Option<[TrackId; 2]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blank: Option<BlankTrack>,
}

impl TrackTable {
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    pub fn video_track_of(&self, layer: LayerId) -> Option<TrackId> {
        self.assignments.get(&layer).and_then(|t| t.video)
    }

    pub fn audio_track_of(&self, layer: LayerId) -> Option<TrackId> {
        self.assignments.get(&layer).and_then(|t| t.audio)
    }
}

/// Hands out track ids for one layout pass.
///
/// Video layer tracks are reused when the previous occupant ended strictly before the
/// new layer starts; candidates are scanned lowest id first. Audio tracks are never
/// reused since mix parameters downstream are keyed one-to-one by track id.
#[derive(Debug, Default)]
pub(crate) struct TrackAllocator {
    last_id: u32,
    reusable_video: BTreeMap<TrackId, MediaTime>,
    table: TrackTable,
}

impl TrackAllocator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> TrackId {
        self.last_id += 1;
        TrackId(self.last_id)
    }

    fn push_track(&mut self, kind: MediaKind, role: TrackRole, end: MediaTime) -> TrackId {
        let id = self.next_id();
        self.table.tracks.push(Track {
            id,
            kind,
            role,
            last_occupied_end: end,
        });
        id
    }

    /// Reserve the cross-transition pair. Idempotent within a pass.
    pub(crate) fn reserve_transition_pair(&mut self) -> [TrackId; 2] {
        if let Some(pair) = self.table.transition_tracks {
            return pair;
        }
        let a = self.push_track(MediaKind::Video, TrackRole::Transition, MediaTime::ZERO);
        let b = self.push_track(MediaKind::Video, TrackRole::Transition, MediaTime::ZERO);
        self.table.transition_tracks = Some([a, b]);
        [a, b]
    }

    pub(crate) fn allocate_video(&mut self, layer: LayerId, range: TimeRange) -> TrackId {
        let reused = self
            .reusable_video
            .iter()
            .find(|(_, last_end)| **last_end < range.start)
            .map(|(id, _)| *id);

        let id = match reused {
            Some(id) => {
                self.reusable_video.insert(id, range.end);
                if let Some(track) = self.table.tracks.iter_mut().find(|t| t.id == id) {
                    track.last_occupied_end = range.end;
                }
                id
            }
            None => {
                let id = self.push_track(MediaKind::Video, TrackRole::Layer, range.end);
                self.reusable_video.insert(id, range.end);
                id
            }
        };

        self.table.assignments.entry(layer).or_default().video = Some(id);
        id
    }

    pub(crate) fn allocate_audio(&mut self, layer: LayerId, range: TimeRange) -> TrackId {
        let id = self.push_track(MediaKind::Audio, TrackRole::Layer, range.end);
        self.table.assignments.entry(layer).or_default().audio = Some(id);
        id
    }

    /// Allocate the filler track over `span`. A shorter source is inserted once and
    /// stretched to cover the span.
    pub(crate) fn allocate_blank(
        &mut self,
        span: TimeRange,
        source_duration: Option<MediaTime>,
    ) -> BlankTrack {
        let id = self.push_track(MediaKind::Video, TrackRole::Blank, span.end);
        let wanted = span.duration();
        let inserted = match source_duration {
            Some(src) if src.is_positive() => src.min(wanted),
            _ => wanted,
        };
        let scale = if inserted.is_positive() {
            wanted.ticks() as f64 / inserted.ticks() as f64
        } else {
            1.0
        };
        let blank = BlankTrack {
            track: id,
            range: span,
            inserted,
            scale,
        };
        self.table.blank = Some(blank);
        blank
    }

    pub(crate) fn finish(self) -> TrackTable {
        self.table
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/tracks.rs"]
mod tests;
