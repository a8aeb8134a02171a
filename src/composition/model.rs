use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::time::{MediaTime, TimeRange};

/// An editable timeline: the ordered set of top-level layers handed to layout.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Timeline {
    pub layers: Vec<Layer>,
}

/// A single timed piece of content.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Layer {
    pub id: String,
    /// Placement in the input timeline. Ignored for groups, which span the union of
    /// their children.
    #[serde(default)]
    pub range: TimeRange,
    #[serde(default)]
    pub z_level: i32,
    #[serde(default, skip_serializing_if = "Transition::is_none")]
    pub transition: Transition,
    pub kind: LayerKind,
    #[serde(default)]
    pub audio: AudioParams,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayerKind {
    Video {
        #[serde(default)]
        has_audio: bool,
    },
    Audio,
    Image,
    Group {
        layers: Vec<Layer>,
    },
}

/// Transition from a layer into the one that follows it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Transition {
    /// Effect identifier, resolved by a [`TransitionRegistry`](crate::TransitionRegistry).
    #[serde(default)]
    pub effect: Option<String>,
    #[serde(default)]
    pub duration: MediaTime,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AudioParams {
    #[serde(default = "unit_volume")]
    pub volume: f32, // 0..1
    #[serde(default)]
    pub pitch: PitchAlgorithm,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PitchAlgorithm {
    #[default]
    Spectral,
    TimeDomain,
    Varispeed,
}

fn unit_volume() -> f32 {
    1.0
}

impl Default for AudioParams {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: PitchAlgorithm::Spectral,
        }
    }
}

impl Transition {
    /// The identity transition: no trimming, no track pairing.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(effect: impl Into<String>, duration: MediaTime) -> Self {
        Self {
            effect: Some(effect.into()),
            duration,
        }
    }

    pub fn is_none(&self) -> bool {
        self.effect.is_none()
    }

    pub fn is_animated(&self) -> bool {
        self.effect.is_some() && self.duration.is_positive()
    }
}

impl Layer {
    pub fn is_group(&self) -> bool {
        matches!(self.kind, LayerKind::Group { .. })
    }

    pub fn children(&self) -> &[Layer] {
        match &self.kind {
            LayerKind::Group { layers } => layers,
            _ => &[],
        }
    }

    /// Video or image content, i.e. something that lands in a composition instruction.
    pub fn is_visual(&self) -> bool {
        matches!(self.kind, LayerKind::Video { .. } | LayerKind::Image)
    }

    /// `true` when the layer has a real video stream and therefore needs a video track.
    pub fn has_video_stream(&self) -> bool {
        matches!(self.kind, LayerKind::Video { .. })
    }

    pub fn has_audio_stream(&self) -> bool {
        matches!(
            self.kind,
            LayerKind::Audio | LayerKind::Video { has_audio: true }
        )
    }

    /// Effective range: the declared range for leaves, the union of resolved children
    /// for groups. `None` for groups with nothing inside.
    pub fn effective_range(&self) -> Option<TimeRange> {
        match &self.kind {
            LayerKind::Group { layers } => layers
                .iter()
                .filter_map(Layer::effective_range)
                .reduce(TimeRange::hull),
            _ => Some(self.range),
        }
    }

    /// `true` when the layer is visual or is a group with a visual descendant.
    pub fn contains_visual(&self) -> bool {
        let mut stack = vec![self];
        while let Some(layer) = stack.pop() {
            if layer.is_visual() {
                return true;
            }
            stack.extend(layer.children());
        }
        false
    }
}

impl Timeline {
    pub fn new(layers: Vec<Layer>) -> Self {
        Self { layers }
    }

    /// Parse a timeline from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> StrataResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| StrataError::serde(format!("parse timeline JSON: {e}")))
    }

    /// Parse a timeline from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> StrataResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            StrataError::validation(format!("open timeline JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn to_json_pretty(&self) -> StrataResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| StrataError::serde(format!("serialize timeline JSON: {e}")))
    }

    /// Check every layer in the tree. Fails on the first offending layer.
    pub fn validate(&self) -> StrataResult<()> {
        let mut seen = BTreeSet::<&str>::new();
        let mut stack: Vec<&Layer> = self.layers.iter().rev().collect();

        while let Some(layer) = stack.pop() {
            if layer.id.trim().is_empty() {
                return Err(StrataError::validation("layer id must be non-empty"));
            }
            if !seen.insert(layer.id.as_str()) {
                return Err(StrataError::validation(format!(
                    "duplicate layer id '{}'",
                    layer.id
                )));
            }

            if !layer.is_group() {
                let r = layer.range;
                if r.start < MediaTime::ZERO || r.end <= r.start {
                    return Err(StrataError::InvalidLayerRange {
                        layer: layer.id.clone(),
                        start: r.start,
                        end: r.end,
                    });
                }
            }

            if let Some(effect) = &layer.transition.effect
                && effect.trim().is_empty()
            {
                return Err(StrataError::validation(format!(
                    "layer '{}' transition effect must be non-empty when set",
                    layer.id
                )));
            }
            if layer.transition.duration < MediaTime::ZERO {
                return Err(StrataError::validation(format!(
                    "layer '{}' transition duration must be >= 0",
                    layer.id
                )));
            }

            let volume = layer.audio.volume;
            if !volume.is_finite() || !(0.0..=1.0).contains(&volume) {
                return Err(StrataError::validation(format!(
                    "layer '{}' audio volume must be within 0..=1",
                    layer.id
                )));
            }

            stack.extend(layer.children().iter().rev());
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/model.rs"]
mod tests;
