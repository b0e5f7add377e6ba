use super::*;
use crate::media::container::StreamDesc;
use crate::media::memory::{InMemoryOpener, InMemorySource};

fn video(index: usize, width: u32, height: u32, fps: u32) -> StreamDesc {
    StreamDesc {
        index,
        kind: StreamKind::Video {
            width,
            height,
            frame_rate: Rational { num: fps, den: 1 },
            time_base: Rational { num: 1, den: fps * 512 },
        },
    }
}

fn audio(index: usize, sample_rate: u32, channels: u16, layout: &str) -> StreamDesc {
    StreamDesc {
        index,
        kind: StreamKind::Audio {
            sample_rate,
            channels,
            layout: Some(layout.to_string()),
        },
    }
}

fn gradient(width: u32, height: u32, seed: u8) -> Frame {
    Frame::from_fn(width, height, |x, y| {
        [x as u8 ^ seed, y as u8, (x + y) as u8]
    })
    .unwrap()
}

#[test]
fn loads_all_frames_and_first_stream_metadata() {
    let source = InMemorySource {
        streams: vec![
            video(0, 8, 6, 30),
            audio(1, 44_100, 2, "stereo"),
            StreamDesc {
                index: 2,
                kind: StreamKind::Other {
                    codec_type: "data".to_string(),
                },
            },
        ],
        frames: vec![gradient(8, 6, 1), gradient(8, 6, 2)],
        ..InMemorySource::default()
    };
    let opener = InMemoryOpener::new().with_source("in.mp4", source);

    let store = demux_once(&opener, Path::new("in.mp4")).unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.frames()[1], gradient(8, 6, 2));
    assert_eq!(
        store.video(),
        Some(&VideoInfo {
            width: 8,
            height: 6,
            frame_rate: Rational { num: 30, den: 1 },
            time_base: Rational { num: 1, den: 15_360 },
        })
    );
    assert_eq!(
        store.audio(),
        Some(&AudioInfo {
            sample_rate: 44_100,
            channels: 2,
            layout: Some("stereo".to_string()),
        })
    );
    assert_eq!(opener.close_count(), 1);
}

#[test]
fn empty_container_is_present_but_empty() {
    let opener = InMemoryOpener::new().with_source("empty.mp4", InMemorySource::default());
    let store = demux_once(&opener, Path::new("empty.mp4")).unwrap();
    assert!(store.is_empty());
    assert!(store.video().is_none());
    assert!(store.audio().is_none());
}

#[test]
fn missing_file_is_an_error_not_an_empty_store() {
    let opener = InMemoryOpener::new();
    let err = demux_once(&opener, Path::new("nope.mp4")).unwrap_err();
    assert!(matches!(err, QuadfxError::Demux(_)));
    assert_eq!(opener.close_count(), 0);
}

#[test]
fn corrupt_container_is_an_error() {
    let source = InMemorySource {
        corrupt: true,
        ..InMemorySource::default()
    };
    let opener = InMemoryOpener::new().with_source("bad.mp4", source);
    assert!(matches!(
        demux_once(&opener, Path::new("bad.mp4")),
        Err(QuadfxError::Demux(_))
    ));
}

#[test]
fn decode_failure_exposes_no_partial_frames_and_still_closes() {
    let source = InMemorySource {
        streams: vec![video(0, 4, 4, 25)],
        frames: vec![gradient(4, 4, 0), gradient(4, 4, 1), gradient(4, 4, 2)],
        fail_after: Some(2),
        ..InMemorySource::default()
    };
    let opener = InMemoryOpener::new().with_source("broken.mp4", source);
    let res = demux_once(&opener, Path::new("broken.mp4"));
    assert!(matches!(res, Err(QuadfxError::Demux(_))));
    assert_eq!(opener.close_count(), 1);
}

#[test]
fn first_stream_of_each_type_wins() {
    let source = InMemorySource {
        streams: vec![
            video(0, 1280, 720, 30),
            audio(1, 48_000, 2, "stereo"),
            video(2, 640, 480, 15),
            audio(3, 22_050, 1, "mono"),
        ],
        ..InMemorySource::default()
    };
    let opener = InMemoryOpener::new().with_source("multi.mkv", source);
    let store = demux_once(&opener, Path::new("multi.mkv")).unwrap();
    let v = store.video().unwrap();
    assert_eq!((v.width, v.height, v.frame_rate.num), (1280, 720, 30));
    let a = store.audio().unwrap();
    assert_eq!((a.sample_rate, a.channels), (48_000, 2));
}

#[test]
fn audio_only_container_decodes_no_frames() {
    let source = InMemorySource {
        streams: vec![audio(0, 44_100, 2, "stereo")],
        ..InMemorySource::default()
    };
    let opener = InMemoryOpener::new().with_source("a.m4a", source);
    let store = demux_once(&opener, Path::new("a.m4a")).unwrap();
    assert!(store.is_empty());
    assert!(store.video().is_none());
    assert_eq!(store.audio().unwrap().sample_rate, 44_100);
}

#[test]
fn frame_size_mismatch_fails_the_whole_demux() {
    let source = InMemorySource {
        streams: vec![video(0, 4, 4, 25)],
        frames: vec![gradient(4, 4, 0), gradient(2, 2, 0)],
        ..InMemorySource::default()
    };
    let opener = InMemoryOpener::new().with_source("odd.mp4", source);
    assert!(demux_once(&opener, Path::new("odd.mp4")).is_err());
}
