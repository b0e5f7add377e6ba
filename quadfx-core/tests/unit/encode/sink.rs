use super::*;

fn cfg(w: u32, h: u32) -> SinkConfig {
    SinkConfig {
        width: w,
        height: h,
        fps: Rational { num: 30, den: 1 },
    }
}

#[test]
fn default_target_is_reference_format() {
    let t = RenderTarget::default();
    assert_eq!((t.width, t.height, t.fps), (640, 480, 30));
    assert_eq!(t.codec, "libx264");
    assert_eq!(t.pix_fmt, "yuv420p");
    t.validate().unwrap();
}

#[test]
fn target_rejects_odd_yuv420p_and_zero_fps() {
    let odd = RenderTarget {
        width: 641,
        ..RenderTarget::default()
    };
    assert!(matches!(odd.validate(), Err(QuadfxError::Validation(_))));

    let odd_rgb = RenderTarget {
        width: 641,
        pix_fmt: "rgb24".to_string(),
        ..RenderTarget::default()
    };
    odd_rgb.validate().unwrap();

    let still = RenderTarget {
        fps: 0,
        ..RenderTarget::default()
    };
    assert!(still.validate().is_err());
}

#[test]
fn in_memory_sink_records_after_drop() {
    let factory = InMemorySinkFactory::new();
    let path = PathBuf::from("/virtual/a.mp4");
    let frame = Frame::filled(2, 2, [1, 2, 3]).unwrap();

    {
        let mut sink = factory.create(&path).unwrap();
        sink.begin(cfg(2, 2)).unwrap();
        sink.push_frame(0, &frame).unwrap();
        sink.push_frame(1, &frame).unwrap();
        sink.end().unwrap();
    }

    let rec = factory.recorded(&path).unwrap();
    assert!(rec.finished);
    assert_eq!(rec.indices(), vec![0, 1]);
    assert_eq!(rec.config, Some(cfg(2, 2)));
}

#[test]
fn out_of_order_frames_are_rejected() {
    let factory = InMemorySinkFactory::new();
    let frame = Frame::filled(1, 1, [0, 0, 0]).unwrap();
    let mut sink = factory.create(Path::new("x.mp4")).unwrap();
    sink.begin(cfg(1, 1)).unwrap();
    sink.push_frame(3, &frame).unwrap();
    assert!(matches!(sink.push_frame(3, &frame), Err(QuadfxError::Encode(_))));
    assert!(sink.push_frame(2, &frame).is_err());
}

#[test]
fn push_before_begin_fails() {
    let factory = InMemorySinkFactory::new();
    let mut sink = factory.create(Path::new("x.mp4")).unwrap();
    let frame = Frame::filled(1, 1, [0, 0, 0]).unwrap();
    assert!(sink.push_frame(0, &frame).is_err());
    assert!(sink.end().is_err());
}

#[test]
fn scripted_failure_keeps_partial_record() {
    let path = PathBuf::from("fail.mp4");
    let factory = InMemorySinkFactory::new().failing_at(&path, 2);
    let frame = Frame::filled(1, 1, [0, 0, 0]).unwrap();
    {
        let mut sink = factory.create(&path).unwrap();
        sink.begin(cfg(1, 1)).unwrap();
        sink.push_frame(0, &frame).unwrap();
        sink.push_frame(1, &frame).unwrap();
        assert!(sink.push_frame(2, &frame).is_err());
    }
    let rec = factory.recorded(&path).unwrap();
    assert!(!rec.finished);
    assert_eq!(rec.indices(), vec![0, 1]);
}

#[test]
fn writing_factory_creates_placeholder_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("v.mp4");
    let factory = InMemorySinkFactory::new().writing_files();
    let mut sink = factory.create(&path).unwrap();
    sink.begin(cfg(1, 1)).unwrap();
    sink.end().unwrap();
    assert!(path.is_file());
}

#[test]
fn ensure_parent_dir_accepts_bare_file_names() {
    ensure_parent_dir(Path::new("bare.mp4")).unwrap();
}
