use super::*;
use crate::encode::sink::InMemorySinkFactory;
use crate::foundation::core::Frame;
use crate::media::store::VideoInfo;
use std::path::Path;

fn store(n: usize) -> FrameStore {
    let frames = (0..n)
        .map(|i| Frame::from_fn(8, 6, |x, y| [(x * 30) as u8, (y * 40) as u8, i as u8]).unwrap())
        .collect();
    let video = VideoInfo {
        width: 8,
        height: 6,
        frame_rate: Rational { num: 25, den: 1 },
        time_base: Rational { num: 1, den: 25 },
    };
    FrameStore::new(frames, Some(video), None)
}

fn variant(id: u32) -> VariantDescriptor {
    VariantDescriptor::new(id, "test", format!("v{id}.mp4"), format!("o{id}.mp4"))
}

#[test]
fn pushes_every_frame_in_order() {
    let sinks = InMemorySinkFactory::new();
    let report = render_variant(
        &store(7),
        &variant(1),
        &sinks,
        NoiseSeed::Fixed(1),
        &CancelToken::new(),
    );

    match &report.outcome {
        RenderOutcome::Completed(stats) => assert_eq!(stats.frames_written, 7),
        other => panic!("unexpected outcome {other:?}"),
    }
    let rec = sinks.recorded(Path::new("v1.mp4")).unwrap();
    assert!(rec.finished);
    assert_eq!(rec.indices(), (0..7).collect::<Vec<u64>>());
    assert_eq!(
        rec.config,
        Some(SinkConfig {
            width: 8,
            height: 6,
            fps: Rational { num: 25, den: 1 },
        })
    );
}

#[test]
fn encoded_frames_match_effect_engine() {
    let sinks = InMemorySinkFactory::new();
    let src = store(3);
    render_variant(&src, &variant(2), &sinks, NoiseSeed::Fixed(4), &CancelToken::new());

    let mut rng = NoiseSeed::Fixed(4).rng_for(2);
    let expected: Vec<Frame> = src
        .frames()
        .iter()
        .map(|f| apply_variant(f, 2, &mut rng))
        .collect();
    let got: Vec<Frame> = sinks
        .recorded(Path::new("v2.mp4"))
        .unwrap()
        .frames
        .into_iter()
        .map(|(_, f)| f)
        .collect();
    assert_eq!(got, expected);
}

#[test]
fn sink_failure_becomes_failed_report() {
    let sinks = InMemorySinkFactory::new().failing_at("v0.mp4", 2);
    let report = render_variant(
        &store(5),
        &variant(0),
        &sinks,
        NoiseSeed::Fixed(1),
        &CancelToken::new(),
    );
    match report.outcome {
        RenderOutcome::Failed { reason } => assert!(reason.contains("frame 2"), "{reason}"),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(report.variant_id, 0);
    assert_eq!(report.intermediate_path, PathBuf::from("v0.mp4"));
}

struct PanickingFactory;

impl SinkFactory for PanickingFactory {
    fn create(&self, _path: &std::path::Path) -> QuadfxResult<Box<dyn FrameSink>> {
        panic!("encoder exploded");
    }
}

#[test]
fn panics_are_caught_at_the_renderer() {
    let report = render_variant(
        &store(2),
        &variant(3),
        &PanickingFactory,
        NoiseSeed::Fixed(1),
        &CancelToken::new(),
    );
    match report.outcome {
        RenderOutcome::Failed { reason } => assert!(reason.contains("encoder exploded")),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn raised_token_cancels_before_first_frame() {
    let sinks = InMemorySinkFactory::new();
    let cancel = CancelToken::new();
    cancel.cancel();
    let report = render_variant(&store(4), &variant(0), &sinks, NoiseSeed::Fixed(1), &cancel);
    assert_eq!(report.outcome, RenderOutcome::Cancelled { frames_written: 0 });

    let rec = sinks.recorded(Path::new("v0.mp4")).unwrap();
    assert!(rec.finished, "sink must be finalized on cancel");
    assert!(rec.frames.is_empty());
}

#[test]
fn empty_store_completes_without_opening_a_sink() {
    let sinks = InMemorySinkFactory::new();
    let report = render_variant(
        &FrameStore::default(),
        &variant(0),
        &sinks,
        NoiseSeed::Entropy,
        &CancelToken::new(),
    );
    assert_eq!(report.outcome, RenderOutcome::Completed(RenderStats::default()));
    assert!(sinks.recorded(Path::new("v0.mp4")).is_none());
}

#[test]
fn missing_frame_rate_falls_back_to_thirty() {
    let sinks = InMemorySinkFactory::new();
    let frames = vec![Frame::filled(2, 2, [1, 1, 1]).unwrap()];
    let src = FrameStore::new(frames, None, None);
    render_variant(&src, &variant(0), &sinks, NoiseSeed::Fixed(0), &CancelToken::new());
    let cfg = sinks.recorded(Path::new("v0.mp4")).unwrap().config.unwrap();
    assert_eq!(cfg.fps, Rational { num: 30, den: 1 });
}

#[test]
fn outcome_serializes_with_status_tag() {
    let json = serde_json::to_value(RenderOutcome::Cancelled { frames_written: 3 }).unwrap();
    assert_eq!(json["status"], "cancelled");
    assert_eq!(json["frames_written"], 3);
}
