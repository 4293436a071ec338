use super::*;

#[test]
fn defaults_match_two_interleaved_lanes() {
    let c = AsyncRenderConfig::default();
    assert_eq!(c.lanes, 2);
    assert!(c.is_multi_lane());
    assert!(!c.is_stacked());
}

#[test]
fn one_pixel_forces_interleaved() {
    let c = AsyncRenderConfig {
        lanes: 4,
        one_pixel_frame: true,
        parallel_input: true,
    };
    assert!(!c.is_stacked());
    let c = AsyncRenderConfig {
        one_pixel_frame: false,
        ..c
    };
    assert!(c.is_stacked());
}

#[test]
fn requests_normalise_like_loose_selectors() {
    assert_eq!(AsyncRequests::Toggle(false).into_config(), None);
    assert_eq!(
        AsyncRequests::Toggle(true).into_config(),
        Some(AsyncRenderConfig::with_lanes(1))
    );
    assert_eq!(AsyncRequests::Lanes(0).into_config(), None);
    assert_eq!(AsyncRequests::Lanes(1).into_config(), None);
    assert_eq!(
        AsyncRequests::Lanes(3).into_config().map(|c| c.lanes),
        Some(3)
    );
    let explicit = AsyncRenderConfig {
        lanes: 1,
        one_pixel_frame: true,
        parallel_input: false,
    };
    assert_eq!(AsyncRequests::from(explicit).into_config(), Some(explicit));
}

#[test]
fn json_accepts_bool_int_and_object() {
    let o = RenderOpts::from_json(r#"{"requests": true}"#).unwrap();
    assert_eq!(o.requests, AsyncRequests::Toggle(true));

    let o = RenderOpts::from_json(r#"{"prefetch": 8, "requests": 4}"#).unwrap();
    assert_eq!(o.prefetch, 8);
    assert_eq!(o.async_config().map(|c| c.lanes), Some(4));

    let o = RenderOpts::from_json(r#"{"requests": {"lanes": 3, "parallel_input": true}}"#)
        .unwrap();
    let c = o.async_config().unwrap();
    assert_eq!(c.lanes, 3);
    assert!(c.is_stacked());

    let o = RenderOpts::from_json("{}").unwrap();
    assert_eq!(o, RenderOpts::default());
    assert_eq!(o.async_config(), None);
}

#[test]
fn bad_json_maps_to_serde_error() {
    let err = AsyncRenderConfig::from_json(r#"{"lanes": "many"}"#).unwrap_err();
    assert!(matches!(err, FramelaneError::Serde(_)));
}
