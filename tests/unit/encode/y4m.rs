use super::*;
use crate::foundation::core::Fps;

fn cfg(format: FrameFormat) -> SinkConfig {
    SinkConfig {
        width: 4,
        height: 2,
        format,
        fps: Fps::new(30000, 1001).unwrap(),
        len: 1,
    }
}

#[test]
fn header_and_frame_markers() {
    let mut sink = Y4mSink::new(Vec::new());
    sink.begin(cfg(FrameFormat::YUV420P8)).unwrap();
    let f = Frame::blank(4, 2, FrameFormat::YUV420P8);
    sink.push_frame(FrameIndex(0), &f).unwrap();
    sink.end().unwrap();

    let out = sink.into_inner();
    let header = b"YUV4MPEG2 W4 H2 F30000:1001 Ip A0:0 C420jpeg\n";
    assert!(out.starts_with(header));
    assert_eq!(&out[header.len()..header.len() + 6], b"FRAME\n");
    assert_eq!(out.len(), header.len() + 6 + f.data().len());
}

#[test]
fn rgb_is_rejected_in_begin() {
    let mut sink = Y4mSink::new(Vec::new());
    let err = sink.begin(cfg(FrameFormat::RGB24)).unwrap_err();
    assert!(matches!(err, FramelaneError::Config(_)));
    assert!(sink.into_inner().is_empty());
}

#[test]
fn chroma_tags() {
    assert_eq!(chroma_tag(FrameFormat::GRAY8).unwrap(), "mono");
    assert_eq!(chroma_tag(FrameFormat::GRAY16).unwrap(), "mono16");
    assert_eq!(chroma_tag(FrameFormat::YUV444P8).unwrap(), "444");
    assert_eq!(chroma_tag(FrameFormat::YUV420P16).unwrap(), "420p16");
}

#[test]
fn mismatched_frame_is_rejected() {
    let mut sink = Y4mSink::new(Vec::new());
    sink.begin(cfg(FrameFormat::GRAY8)).unwrap();
    let f = Frame::blank(2, 2, FrameFormat::GRAY8);
    assert!(sink.push_frame(FrameIndex(0), &f).is_err());
    assert!(sink.self_describing());
}
