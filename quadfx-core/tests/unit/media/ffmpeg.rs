use super::*;

#[test]
fn probe_json_maps_streams_in_container_order() {
    let json = br#"{
        "streams": [
            {"index": 0, "codec_type": "video", "width": 1280, "height": 720,
             "avg_frame_rate": "30000/1001", "r_frame_rate": "30000/1001", "time_base": "1/30000"},
            {"index": 1, "codec_type": "audio", "sample_rate": "48000", "channels": 2,
             "channel_layout": "stereo"},
            {"index": 2, "codec_type": "data"}
        ]
    }"#;

    let streams = parse_probe_json(json).unwrap();
    assert_eq!(streams.len(), 3);
    assert_eq!(
        streams[0].kind,
        StreamKind::Video {
            width: 1280,
            height: 720,
            frame_rate: Rational { num: 30000, den: 1001 },
            time_base: Rational { num: 1, den: 30000 },
        }
    );
    assert_eq!(
        streams[1].kind,
        StreamKind::Audio {
            sample_rate: 48000,
            channels: 2,
            layout: Some("stereo".to_string()),
        }
    );
    assert_eq!(
        streams[2].kind,
        StreamKind::Other {
            codec_type: "data".to_string()
        }
    );
}

#[test]
fn zero_avg_frame_rate_falls_back_to_r_frame_rate() {
    let json = br#"{"streams": [{"index": 0, "codec_type": "video", "width": 64, "height": 48,
        "avg_frame_rate": "0/0", "r_frame_rate": "25/1", "time_base": "1/25"}]}"#;
    let streams = parse_probe_json(json).unwrap();
    match &streams[0].kind {
        StreamKind::Video { frame_rate, .. } => assert_eq!(*frame_rate, Rational { num: 25, den: 1 }),
        other => panic!("expected video stream, got {other:?}"),
    }
}

#[test]
fn video_stream_without_dimensions_is_a_demux_error() {
    let json = br#"{"streams": [{"index": 0, "codec_type": "video"}]}"#;
    let err = parse_probe_json(json).unwrap_err();
    assert!(matches!(err, QuadfxError::Demux(_)));
}

#[test]
fn empty_probe_output_has_no_streams() {
    assert!(parse_probe_json(b"{}").unwrap().is_empty());
}

#[test]
fn garbage_probe_output_is_rejected() {
    assert!(matches!(
        parse_probe_json(b"not json").unwrap_err(),
        QuadfxError::Demux(_)
    ));
}

#[test]
fn missing_source_fails_before_probing() {
    let dir = tempfile::tempdir().unwrap();
    let err = FfmpegOpener
        .open(&dir.path().join("absent.mp4"))
        .err()
        .unwrap();
    assert!(matches!(err, QuadfxError::Demux(_)));
}

#[test]
fn read_full_stops_at_eof() {
    let mut src: &[u8] = &[1, 2, 3, 4, 5];
    let mut buf = [0u8; 3];
    assert_eq!(read_full(&mut src, &mut buf).unwrap(), 3);
    assert_eq!(read_full(&mut src, &mut buf).unwrap(), 2);
    assert_eq!(read_full(&mut src, &mut buf).unwrap(), 0);
}

#[test]
fn decoder_keeps_coded_orientation() {
    let args = decoder_args(Path::new("/clips/portrait.mp4"), 1);
    let args: Vec<String> = args
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    let flag = args.iter().position(|a| a == "-noautorotate").unwrap();
    let input = args.iter().position(|a| a == "-i").unwrap();
    assert!(flag < input, "-noautorotate must precede -i: {args:?}");
    assert_eq!(args[input + 1], "/clips/portrait.mp4");
    assert_eq!(
        &args[input + 2..],
        ["-map", "0:v:1", "-f", "rawvideo", "-pix_fmt", "rgb24", "pipe:1"]
    );
}
