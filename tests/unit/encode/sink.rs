use super::*;

fn cfg() -> SinkConfig {
    SinkConfig {
        width: 1,
        height: 1,
        fps: Fps::new(30, 1).unwrap(),
        audio_source: None,
    }
}

#[test]
fn captures_frames_and_config() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(0), &FrameRGBA::transparent(1, 1)).unwrap();
    sink.push_frame(FrameIndex(1), &FrameRGBA::transparent(1, 1)).unwrap();
    sink.end().unwrap();
    assert!(sink.is_finished());
    assert_eq!(sink.frames().len(), 2);
    assert_eq!(sink.config().unwrap().width, 1);
}

#[test]
fn rejects_out_of_order_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(cfg()).unwrap();
    sink.push_frame(FrameIndex(3), &FrameRGBA::transparent(1, 1)).unwrap();
    assert!(sink.push_frame(FrameIndex(3), &FrameRGBA::transparent(1, 1)).is_err());
}
