use super::*;

#[test]
fn default_table_matches_reference() {
    let v = default_variants();
    assert_eq!(v.len(), 4);
    assert_eq!(v[0], VariantDescriptor::new(0, "Classic Film", "temp_processed_1.mp4", "out1.mp4"));
    assert_eq!(v[1].name, "Neon/Cyberpunk");
    assert_eq!(v[2].intermediate, PathBuf::from("temp_processed_3.mp4"));
    assert_eq!(v[3], VariantDescriptor::new(3, "Fire/Energy", "temp_processed_4.mp4", "out4.mp4"));
}

#[test]
fn default_config_is_valid() {
    let cfg = PipelineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.audio_codec, "aac");
    assert_eq!(cfg.render_timeout(), None);
}

#[test]
fn partial_json_takes_defaults() {
    let cfg: PipelineConfig =
        serde_json::from_str(r#"{"source": "clip.mp4", "noise": {"fixed": 9}}"#).unwrap();
    assert_eq!(cfg.source, PathBuf::from("clip.mp4"));
    assert_eq!(cfg.noise, NoiseSeed::Fixed(9));
    assert_eq!(cfg.variants, default_variants());
    assert_eq!(cfg.target, RenderTarget::default());
}

#[test]
fn json_round_trips_defaults() {
    let cfg = PipelineConfig::default();
    let text = serde_json::to_string_pretty(&cfg).unwrap();
    let back: PipelineConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(back, cfg);
}

#[test]
fn from_json_file_reads_and_reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.json");
    std::fs::write(&good, r#"{"keep_intermediates": true, "render_timeout_secs": 5}"#).unwrap();
    let cfg = PipelineConfig::from_json_file(&good).unwrap();
    assert!(cfg.keep_intermediates);
    assert_eq!(cfg.render_timeout(), Some(Duration::from_secs(5)));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ nope").unwrap();
    assert!(matches!(
        PipelineConfig::from_json_file(&bad),
        Err(QuadfxError::Json(_))
    ));

    assert!(matches!(
        PipelineConfig::from_json_file(&dir.path().join("missing.json")),
        Err(QuadfxError::Other(_))
    ));
}

#[test]
fn validate_rejects_bad_tables() {
    let empty = PipelineConfig {
        variants: Vec::new(),
        ..PipelineConfig::default()
    };
    assert!(matches!(empty.validate(), Err(QuadfxError::Validation(_))));

    let mut dup = PipelineConfig::default();
    dup.variants[1].id = 0;
    assert!(dup.validate().is_err());

    let mut unknown = PipelineConfig::default();
    unknown.variants[2].id = 7;
    let err = unknown.validate().unwrap_err();
    assert!(matches!(err, QuadfxError::Validation(_)));
    assert!(err.to_string().contains("unknown variant id 7"), "{err}");

    let json = r#"{"variants": [{"id": 9, "name": "x", "intermediate": "t.mp4", "output": "o.mp4"}]}"#;
    let from_file: PipelineConfig = serde_json::from_str(json).unwrap();
    assert!(from_file.validate().is_err());

    let mut shared_path = PipelineConfig::default();
    shared_path.variants[1].output = "out1.mp4".into();
    assert!(shared_path.validate().is_err());

    let zero_timeout = PipelineConfig {
        render_timeout_secs: Some(0),
        ..PipelineConfig::default()
    };
    assert!(zero_timeout.validate().is_err());

    let odd = PipelineConfig {
        target: RenderTarget {
            height: 481,
            ..RenderTarget::default()
        },
        ..PipelineConfig::default()
    };
    assert!(odd.validate().is_err());
}

#[test]
fn resolved_variants_join_directories() {
    let cfg = PipelineConfig {
        output_dir: "/data/out".into(),
        work_dir: "/data/work".into(),
        ..PipelineConfig::default()
    };
    let v = cfg.resolved_variants();
    assert_eq!(v[0].intermediate, PathBuf::from("/data/work/temp_processed_1.mp4"));
    assert_eq!(v[3].output, PathBuf::from("/data/out/out4.mp4"));
}
