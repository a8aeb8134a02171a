use crate::composition::model::PitchAlgorithm;
use crate::foundation::time::{MediaTime, TimeRange};
use crate::layout::plan::{LayerId, PlacedLayer};
use crate::layout::tracks::{TrackId, TrackTable};

/// Per-track mix parameters for the downstream audio mixer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioMixInput {
    pub track: TrackId,
    pub layer: LayerId,
    pub range: TimeRange,
    pub volume: f32,
    pub pitch: PitchAlgorithm,
}

/// Mix inputs keyed one-to-one by audio track.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioMix {
    pub inputs: Vec<AudioMixInput>,
}

impl AudioMix {
    pub fn input_for(&self, track: TrackId) -> Option<&AudioMixInput> {
        self.inputs.iter().find(|i| i.track == track)
    }

    /// Inputs audible at `t`.
    pub fn active_at(&self, t: MediaTime) -> impl Iterator<Item = &AudioMixInput> {
        self.inputs.iter().filter(move |i| i.range.contains(t))
    }
}

pub(crate) fn build_audio_mix(layers: &[PlacedLayer], tracks: &TrackTable) -> AudioMix {
    let mut inputs: Vec<AudioMixInput> = layers
        .iter()
        .filter_map(|layer| {
            let track = tracks.audio_track_of(layer.id)?;
            Some(AudioMixInput {
                track,
                layer: layer.id,
                range: layer.placement,
                volume: layer.audio.volume,
                pitch: layer.audio.pitch,
            })
        })
        .collect();
    inputs.sort_by_key(|i| i.track);
    AudioMix { inputs }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/mix.rs"]
mod tests;
