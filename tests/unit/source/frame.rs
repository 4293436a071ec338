use super::*;

#[test]
fn yuv420_plane_geometry_rounds_chroma_up() {
    let f = FrameFormat::YUV420P8;
    assert_eq!(f.plane_dims(0, 5, 3), (5, 3));
    assert_eq!(f.plane_dims(1, 5, 3), (3, 2));
    assert_eq!(f.frame_len(4, 4), 16 + 4 + 4);
    assert_eq!(FrameFormat::GRAY16.frame_len(3, 2), 12);
    assert_eq!(FrameFormat::RGB24.frame_len(2, 2), 12);
}

#[test]
fn new_rejects_wrong_payload_length() {
    assert!(Frame::new(2, 2, FrameFormat::GRAY8, vec![0; 3]).is_err());
    let f = Frame::new(2, 2, FrameFormat::GRAY8, vec![1, 2, 3, 4]).unwrap();
    assert_eq!(f.plane(0), &[1, 2, 3, 4]);
}

#[test]
fn typed_getters_report_missing_and_wrong_type() {
    let f = Frame::blank(1, 1, FrameFormat::GRAY8)
        .with_prop("_Combed", 1i64)
        .with_prop("_PlaneStatsAverage", 0.25)
        .with_prop("Name", "intro");

    assert_eq!(f.prop_int("_Combed").unwrap(), 1);
    assert_eq!(f.prop_float("_Combed").unwrap(), 1.0);
    assert_eq!(f.prop_float("_PlaneStatsAverage").unwrap(), 0.25);
    assert_eq!(f.prop_str("Name").unwrap(), "intro");

    let err = f.prop_int("missing").unwrap_err();
    assert!(err.to_string().contains("not present"));

    let err = f.prop_int("Name").unwrap_err();
    assert!(err.to_string().contains("expected int got str"));
    assert!(f.prop_node("Name").is_err());
}

#[test]
fn crop_one_pixel_keeps_props_and_first_samples() {
    let mut data = vec![0u8; FrameFormat::YUV420P8.frame_len(4, 2)];
    data[0] = 10;
    data[8] = 20;
    data[10] = 30;
    let f = Frame::new(4, 2, FrameFormat::YUV420P8, data)
        .unwrap()
        .with_prop("X", 7i64);

    let p = f.crop_one_pixel();
    assert!(p.is_one_pixel());
    assert_eq!(p.data(), &[10, 20, 30]);
    assert_eq!(p.prop_int("X").unwrap(), 7);
    assert_eq!(p.format, FrameFormat::YUV420P8);
}

#[test]
fn zero_sized_frames_are_rejected_or_left_alone() {
    assert!(Frame::new(0, 4, FrameFormat::GRAY8, Vec::new()).is_err());
    assert!(Frame::new(4, 0, FrameFormat::YUV420P8, Vec::new()).is_err());

    let empty = Frame::blank(0, 4, FrameFormat::YUV420P8).with_prop("X", 1i64);
    let p = empty.crop_one_pixel();
    assert_eq!((p.width, p.height), (0, 4));
    assert!(p.data().is_empty());
    assert!(p.plane(2).is_empty());
    assert_eq!(p.prop_int("X").unwrap(), 1);
}

#[test]
fn bool_props_become_ints() {
    assert_eq!(PropValue::from(true), PropValue::Int(1));
    assert_eq!(PropValue::from(false).type_name(), "int");
}
