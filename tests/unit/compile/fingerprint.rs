use super::*;
use crate::composition::dsl::{LayerBuilder, TimelineBuilder};
use crate::composition::model::Timeline;
use crate::layout::plan::layout;

fn two_clips(transition_secs: f64) -> Timeline {
    TimelineBuilder::new()
        .layer(
            LayerBuilder::video("a", TimeRange::from_secs(0.0, 5.0).unwrap())
                .transition("crossfade", MediaTime::from_secs(transition_secs))
                .build()
                .unwrap(),
        )
        .layer(
            LayerBuilder::video("b", TimeRange::from_secs(5.0, 10.0).unwrap())
                .with_audio()
                .build()
                .unwrap(),
        )
        .build()
        .unwrap()
}

#[test]
fn fingerprint_is_deterministic_for_same_timeline() {
    let tl = two_clips(1.0);
    let a = layout(&tl).unwrap().fingerprint();
    let b = layout(&tl).unwrap().fingerprint();
    assert_eq!(a, b);
}

#[test]
fn fingerprint_changes_when_layout_changes() {
    let a = layout(&two_clips(1.0)).unwrap().fingerprint();
    let b = layout(&two_clips(2.0)).unwrap().fingerprint();
    assert_ne!(a, b);
}

#[test]
fn fingerprint_displays_as_32_hex_digits() {
    let fp = PlanFingerprint { hi: 1, lo: 0xff };
    let s = fp.to_string();
    assert_eq!(s.len(), 32);
    assert!(s.ends_with("ff"));
    assert!(s.starts_with("0000000000000001"));
}
