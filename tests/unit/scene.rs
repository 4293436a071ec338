use super::*;
use crate::engine::{Engine, EngineOpts};
use crate::foundation::core::Fps;
use crate::render::config::AsyncRenderConfig;
use crate::source::{FnSource, FrameFormat, SourceInfo};

fn flagged(len: u64, cuts: &'static [u64]) -> impl FrameSource {
    FnSource::new(
        SourceInfo::fixed(len, 4, 4, FrameFormat::YUV420P8, Fps::default()),
        move |n| {
            let cut = i64::from(cuts.contains(&n));
            Ok(Frame::blank(4, 4, FrameFormat::YUV420P8)
                .with_prop("Scenechange", cut)
                .with_prop("_SceneChangePrev", cut)
                .with_prop("Diff", if cuts.contains(&n) { 0.8 } else { 0.05 }))
        },
    )
}

#[test]
fn keyframes_from_detector_flags() {
    let engine = Engine::new(EngineOpts { threads: Some(2) }).unwrap();
    let src = flagged(40, &[0, 12, 30]);
    let opts = RenderOpts::with_config(AsyncRenderConfig {
        lanes: 3,
        one_pixel_frame: true,
        parallel_input: false,
    });
    let kf = Keyframes::from_source(&engine, &src, WWXD_KEYS, &opts).unwrap();
    assert_eq!(kf.frames, vec![0, 12, 30]);
    assert_eq!(kf.end_frame, 40);
    assert_eq!(kf.scenes(), vec![(0, 11), (12, 29), (30, 39)]);

    let both: Vec<&str> = WWXD_KEYS.iter().chain(SCXVID_KEYS).copied().collect();
    let kf2 = Keyframes::from_source(&engine, &src, &both, &RenderOpts::default()).unwrap();
    assert_eq!(kf, kf2);
}

#[test]
fn metric_threshold_detection() {
    let engine = Engine::new(EngineOpts { threads: Some(2) }).unwrap();
    let src = flagged(25, &[7, 19]);
    let kf = detect_scene_changes(&engine, &src, "Diff", 0.5, &RenderOpts::default()).unwrap();
    assert_eq!(kf.frames, vec![7, 19]);
    assert_eq!(kf.scene_bounds(), vec![0, 7, 19]);
}

#[test]
fn missing_flag_fails_at_that_frame() {
    let engine = Engine::new(EngineOpts { threads: Some(1) }).unwrap();
    let src = flagged(5, &[]);
    let err = Keyframes::from_source(&engine, &src, &["Nope"], &RenderOpts::default()).unwrap_err();
    assert!(matches!(err, FramelaneError::Property { ref key, .. } if key == "Nope"));
    assert!(Keyframes::from_source(&engine, &src, &[], &RenderOpts::default()).is_err());
}

#[test]
fn new_sorts_dedups_and_validates() {
    let kf = Keyframes::new(vec![9, 3, 3, 0], 10).unwrap();
    assert_eq!(kf.frames, vec![0, 3, 9]);
    assert_eq!(kf.len(), 3);
    assert!(Keyframes::new(vec![10], 10).is_err());
    assert!(Keyframes::new(vec![], 0).unwrap().scenes().is_empty());
}

#[test]
fn v1_text_lists_one_keyframe_per_line() {
    let kf = Keyframes::new(vec![0, 12, 30], 40).unwrap();
    let mut out = Vec::new();
    kf.write_to(&mut out, KeyframesFormat::V1).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "# keyframe format v1\nfps 0\n\n0\n12\n30\n"
    );

    let mut out = Vec::new();
    Keyframes::new(vec![], 5)
        .unwrap()
        .write_to(&mut out, KeyframesFormat::V1)
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "# keyframe format v1\nfps 0\n\n");
}

#[test]
fn xvid_text_marks_every_frame() {
    let kf = Keyframes::new(vec![0, 3], 5).unwrap();
    let mut out = Vec::new();
    kf.write_to(&mut out, KeyframesFormat::Xvid).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "# XviD 2pass stat file\n\ni\nb\nb\ni\nb"
    );

    let mut out = Vec::new();
    Keyframes::new(vec![], 0)
        .unwrap()
        .write_to(&mut out, KeyframesFormat::Xvid)
        .unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "# XviD 2pass stat file\n");
}
