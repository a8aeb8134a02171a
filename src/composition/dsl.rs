use crate::{
    composition::model::{AudioParams, Layer, LayerKind, PitchAlgorithm, Timeline, Transition},
    foundation::error::{StrataError, StrataResult},
    foundation::time::{MediaTime, TimeRange},
};

/// Builder for [`Timeline`](crate::Timeline).
#[derive(Default)]
pub struct TimelineBuilder {
    layers: Vec<Layer>,
}

impl TimelineBuilder {
    /// Create an empty timeline builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level layer.
    pub fn layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Build and validate final [`Timeline`](crate::Timeline).
    pub fn build(self) -> StrataResult<Timeline> {
        let timeline = Timeline {
            layers: self.layers,
        };
        timeline.validate()?;
        Ok(timeline)
    }
}

/// Builder for [`Layer`](crate::Layer) values.
pub struct LayerBuilder {
    id: String,
    range: TimeRange,
    z_level: i32,
    transition: Transition,
    kind: LayerKind,
    audio: AudioParams,
}

impl LayerBuilder {
    fn with_kind(id: impl Into<String>, range: TimeRange, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            range,
            z_level: 0,
            transition: Transition::none(),
            kind,
            audio: AudioParams::default(),
        }
    }

    /// Video layer without an audio stream.
    pub fn video(id: impl Into<String>, range: TimeRange) -> Self {
        Self::with_kind(id, range, LayerKind::Video { has_audio: false })
    }

    /// Audio-only layer.
    pub fn audio(id: impl Into<String>, range: TimeRange) -> Self {
        Self::with_kind(id, range, LayerKind::Audio)
    }

    /// Still-image layer; it has no video stream of its own.
    pub fn image(id: impl Into<String>, range: TimeRange) -> Self {
        Self::with_kind(id, range, LayerKind::Image)
    }

    /// Group layer. Its range is derived from the children.
    pub fn group(id: impl Into<String>) -> Self {
        Self::with_kind(id, TimeRange::default(), LayerKind::Group { layers: Vec::new() })
    }

    /// Mark a video layer as carrying an audio stream.
    pub fn with_audio(mut self) -> Self {
        if let LayerKind::Video { has_audio } = &mut self.kind {
            *has_audio = true;
        }
        self
    }

    /// Set the stacking level. Higher levels composite on top.
    pub fn z_level(mut self, z: i32) -> Self {
        self.z_level = z;
        self
    }

    /// Set the transition into the following layer.
    pub fn transition(mut self, effect: impl Into<String>, duration: MediaTime) -> Self {
        self.transition = Transition::new(effect, duration);
        self
    }

    /// Set mix volume (0..=1).
    pub fn volume(mut self, volume: f32) -> Self {
        self.audio.volume = volume;
        self
    }

    /// Set the pitch algorithm used when the audio is time-scaled.
    pub fn pitch(mut self, pitch: PitchAlgorithm) -> Self {
        self.audio.pitch = pitch;
        self
    }

    /// Append a child to a group layer.
    pub fn child(mut self, layer: Layer) -> StrataResult<Self> {
        match &mut self.kind {
            LayerKind::Group { layers } => {
                layers.push(layer);
                Ok(self)
            }
            _ => Err(StrataError::validation(format!(
                "layer '{}' is not a group and cannot take children",
                self.id
            ))),
        }
    }

    /// Build the [`Layer`](crate::Layer).
    pub fn build(self) -> StrataResult<Layer> {
        if self.id.trim().is_empty() {
            return Err(StrataError::validation("layer id must be non-empty"));
        }
        Ok(Layer {
            id: self.id,
            range: self.range,
            z_level: self.z_level,
            transition: self.transition,
            kind: self.kind,
            audio: self.audio,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/composition/dsl.rs"]
mod tests;
