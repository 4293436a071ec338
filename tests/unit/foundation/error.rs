use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FramelaneError::config("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        FramelaneError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        FramelaneError::engine("x")
            .to_string()
            .contains("engine error:")
    );
    assert!(
        FramelaneError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        FramelaneError::DuplicateResult { index: 3 }
            .to_string()
            .contains("reassembly error:")
    );
}

#[test]
fn reassembly_message_names_first_gap() {
    let err = FramelaneError::Reassembly {
        expected: 10,
        missing: 2,
        first_missing: 4,
    };
    let msg = err.to_string();
    assert!(msg.contains("2 of 10"));
    assert!(msg.contains("first missing index 4"));
    assert!(err.is_reassembly());
    assert!(!FramelaneError::config("x").is_reassembly());
}

#[test]
fn at_frame_attributes_prop_errors_only() {
    let err = FramelaneError::frame_prop("_SceneChangePrev", "not present").at_frame(12);
    match err {
        FramelaneError::Property { index, key, .. } => {
            assert_eq!(index, 12);
            assert_eq!(key, "_SceneChangePrev");
        }
        other => panic!("unexpected {other:?}"),
    }

    let err = FramelaneError::engine("boom").at_frame(1);
    assert!(matches!(err, FramelaneError::Engine(_)));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FramelaneError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));

    let io: FramelaneError = std::io::Error::other("pipe").into();
    assert!(io.to_string().contains("io error: pipe"));
}
