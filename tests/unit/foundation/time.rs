use super::*;

fn secs(s: f64) -> MediaTime {
    MediaTime::from_secs(s)
}

#[test]
fn seconds_round_to_nearest_tick() {
    assert_eq!(secs(1.0).ticks(), 600);
    assert_eq!(secs(1.5).ticks(), 900);
    assert_eq!(secs(0.0008).ticks(), 0);
    assert_eq!(secs(0.0009).ticks(), 1);
    assert_eq!(secs(2.25).as_secs(), 2.25);
}

#[test]
fn non_finite_seconds_are_rejected() {
    assert!(MediaTime::try_from_secs(f64::NAN).is_err());
    assert!(MediaTime::try_from_secs(f64::INFINITY).is_err());
    assert_eq!(MediaTime::from_secs(f64::NAN), MediaTime::ZERO);
}

#[test]
fn range_contains_boundaries() {
    let r = TimeRange::new(secs(2.0), secs(5.0)).unwrap();
    assert!(!r.contains(secs(1.0)));
    assert!(r.contains(secs(2.0)));
    assert!(r.contains(secs(4.9)));
    assert!(!r.contains(secs(5.0)));
}

#[test]
fn range_rejects_inverted_bounds() {
    assert!(TimeRange::new(secs(3.0), secs(1.0)).is_err());
    assert!(TimeRange::new(secs(1.0), secs(1.0)).unwrap().is_empty());
}

#[test]
fn intersection_requires_positive_overlap() {
    let a = TimeRange::from_secs(0.0, 5.0).unwrap();
    let b = TimeRange::from_secs(5.0, 9.0).unwrap();
    let c = TimeRange::from_secs(4.0, 9.0).unwrap();
    assert_eq!(a.intersection(b), None);
    assert_eq!(
        a.intersection(c),
        Some(TimeRange::from_secs(4.0, 5.0).unwrap())
    );
    assert!(a.intersects(c));
    assert!(!a.intersects(b));
}

#[test]
fn hull_and_shift() {
    let a = TimeRange::from_secs(1.0, 2.0).unwrap();
    let b = TimeRange::from_secs(4.0, 6.0).unwrap();
    assert_eq!(a.hull(b), TimeRange::from_secs(1.0, 6.0).unwrap());
    assert_eq!(a.shift(secs(3.0)), TimeRange::from_secs(4.0, 5.0).unwrap());
    assert!(a.hull(b).contains_range(b));
}

#[test]
fn from_duration_collapses_negative_lengths() {
    let r = TimeRange::from_duration(secs(4.0), MediaTime(-600));
    assert!(r.is_empty());
    assert_eq!(r.start, r.end);
}

#[test]
fn serde_uses_seconds_on_the_wire() {
    let r = TimeRange::from_secs(0.5, 2.0).unwrap();
    let s = serde_json::to_string(&r).unwrap();
    assert_eq!(s, r#"{"start":0.5,"end":2.0}"#);
    let de: TimeRange = serde_json::from_str(&s).unwrap();
    assert_eq!(de, r);
}

#[test]
fn display_matches_debug_layout() {
    let r = TimeRange::from_secs(4.0, 5.0).unwrap();
    assert_eq!(r.to_string(), "4s - 5s  (1s)");
}
