use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        StrataError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        StrataError::dispatch("x")
            .to_string()
            .contains("dispatch error:")
    );
    assert!(
        StrataError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn invalid_range_names_the_layer() {
    let err = StrataError::InvalidLayerRange {
        layer: "clip-a".to_string(),
        start: MediaTime::from_secs(2.0),
        end: MediaTime::from_secs(1.0),
    };
    let msg = err.to_string();
    assert!(msg.contains("invalid layer range"));
    assert!(msg.contains("clip-a"));
    assert!(msg.contains("2s - 1s"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = StrataError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
