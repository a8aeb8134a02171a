use super::*;

fn leaf(id: &str, kind: LayerKind, start: f64, end: f64) -> Layer {
    Layer {
        id: id.to_string(),
        range: TimeRange::from_secs(start, end).unwrap(),
        z_level: 0,
        transition: Transition::none(),
        kind,
        audio: AudioParams::default(),
    }
}

fn group(id: &str, layers: Vec<Layer>) -> Layer {
    Layer {
        id: id.to_string(),
        range: TimeRange::default(),
        z_level: 0,
        transition: Transition::none(),
        kind: LayerKind::Group { layers },
        audio: AudioParams::default(),
    }
}

#[test]
fn transition_is_animated_only_with_effect_and_duration() {
    assert!(!Transition::none().is_animated());
    assert!(!Transition::new("fade", MediaTime::ZERO).is_animated());
    assert!(Transition::new("fade", MediaTime::from_secs(1.0)).is_animated());
    let no_effect = Transition {
        effect: None,
        duration: MediaTime::from_secs(1.5),
    };
    assert!(!no_effect.is_animated());
}

#[test]
fn group_range_is_union_of_children() {
    let g = group(
        "g",
        vec![
            leaf("a", LayerKind::Image, 1.0, 2.0),
            group("inner", vec![leaf("b", LayerKind::Audio, 4.0, 6.0)]),
        ],
    );
    assert_eq!(
        g.effective_range(),
        Some(TimeRange::from_secs(1.0, 6.0).unwrap())
    );
    assert!(group("empty", vec![]).effective_range().is_none());
}

#[test]
fn contains_visual_walks_nested_groups() {
    let audio_only = group("g", vec![leaf("a", LayerKind::Audio, 0.0, 1.0)]);
    assert!(!audio_only.contains_visual());
    let nested = group(
        "g2",
        vec![group(
            "g3",
            vec![leaf("v", LayerKind::Video { has_audio: false }, 0.0, 1.0)],
        )],
    );
    assert!(nested.contains_visual());
}

#[test]
fn validate_rejects_duplicate_ids_across_groups() {
    let timeline = Timeline::new(vec![
        leaf("a", LayerKind::Image, 0.0, 1.0),
        group("g", vec![leaf("a", LayerKind::Image, 0.0, 1.0)]),
    ]);
    let err = timeline.validate().unwrap_err();
    assert!(err.to_string().contains("duplicate layer id 'a'"));
}

#[test]
fn validate_rejects_empty_leaf_range() {
    let timeline = Timeline::new(vec![leaf("a", LayerKind::Image, 3.0, 3.0)]);
    assert!(matches!(
        timeline.validate(),
        Err(StrataError::InvalidLayerRange { .. })
    ));
}

#[test]
fn validate_rejects_negative_start() {
    let mut l = leaf("a", LayerKind::Image, 0.0, 3.0);
    l.range.start = MediaTime::from_secs(-1.0);
    assert!(matches!(
        Timeline::new(vec![l]).validate(),
        Err(StrataError::InvalidLayerRange { .. })
    ));
}

#[test]
fn validate_accepts_empty_groups() {
    let timeline = Timeline::new(vec![group("g", vec![])]);
    assert!(timeline.validate().is_ok());
}

#[test]
fn validate_rejects_bad_volume() {
    let mut l = leaf("a", LayerKind::Audio, 0.0, 3.0);
    l.audio.volume = 1.5;
    assert!(Timeline::new(vec![l]).validate().is_err());
}

#[test]
fn json_roundtrip() {
    let mut v = leaf("v", LayerKind::Video { has_audio: true }, 0.0, 5.0);
    v.transition = Transition::new("fade", MediaTime::from_secs(1.0));
    let timeline = Timeline::new(vec![
        v,
        group("g", vec![leaf("i", LayerKind::Image, 5.0, 8.0)]),
    ]);
    let s = timeline.to_json_pretty().unwrap();
    let de = Timeline::from_reader(s.as_bytes()).unwrap();
    assert_eq!(de, timeline);
}

#[test]
fn json_defaults_fill_optional_fields() {
    let s = r#"{"layers":[{"id":"a","range":{"start":0,"end":2.5},"kind":{"type":"image"}}]}"#;
    let timeline = Timeline::from_reader(s.as_bytes()).unwrap();
    let l = &timeline.layers[0];
    assert_eq!(l.z_level, 0);
    assert!(l.transition.is_none());
    assert_eq!(l.audio, AudioParams::default());
    assert_eq!(l.range.end, MediaTime::from_secs(2.5));
}
