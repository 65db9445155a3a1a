use super::*;

const PAGE: &str = r#"{
  "fps": 60,
  "scroll_region_height_multiple": 3.0,
  "sequences": [
    {
      "id": "hero",
      "frame_path_template": "hero-animation/{i}.webp",
      "frame_count": 240,
      "playback_range": [0.0, 0.5],
      "transition": { "threshold": 0.8 }
    },
    {
      "id": "outro",
      "frame_path_template": "outro-animation/{i}.webp",
      "frame_count": 240,
      "playback_range": [0.5, 1.0],
      "initial_batch": 10
    }
  ]
}"#;

#[test]
fn parses_page_with_defaults() {
    let cfg = EngineConfig::from_json_str(PAGE).unwrap();
    assert_eq!(cfg.sequences.len(), 2);
    assert_eq!(cfg.background_rgba, [0, 0, 0, 255]);
    assert_eq!(cfg.smoothing, SpringConfig::hero());

    let hero = &cfg.sequences[0];
    assert_eq!(hero.initial_batch, 20);
    assert_eq!(hero.batch_size, 30);
    assert_eq!(hero.frame_path_template.render(0), "hero-animation/00001.webp");
    assert_eq!(hero.transition.map(|t| t.threshold), Some(0.8));

    let outro = &cfg.sequences[1];
    assert_eq!(outro.batch_policy().initial_batch, 10);
    assert_eq!(outro.batch_policy().batch_delay, Duration::from_millis(50));
    assert!(outro.transition.is_none());
}

#[test]
fn rejects_zero_frame_count() {
    let err = SequenceConfig::new("hero", "h/{i}.png", 0).unwrap_err();
    assert!(matches!(err, ReelError::Config(_)));
}

#[test]
fn rejects_malformed_template_at_parse_time() {
    let json = PAGE.replace("hero-animation/{i}.webp", "hero-animation/frame.webp");
    assert!(EngineConfig::from_json_str(&json).is_err());
}

#[test]
fn rejects_duplicate_ids_and_empty_sequences() {
    let json = PAGE.replace("\"outro\"", "\"hero\"");
    assert!(EngineConfig::from_json_str(&json).is_err());

    let mut cfg = EngineConfig::from_json_str(PAGE).unwrap();
    cfg.sequences.clear();
    assert!(cfg.validate().is_err());
}

#[test]
fn rejects_bad_ranges_and_region() {
    let json = PAGE.replace("[0.5, 1.0]", "[0.9, 0.2]");
    assert!(EngineConfig::from_json_str(&json).is_err());

    let mut cfg = EngineConfig::from_json_str(PAGE).unwrap();
    cfg.scroll_region_height_multiple = 0.5;
    assert!(cfg.validate().is_err());

    let mut cfg = EngineConfig::from_json_str(PAGE).unwrap();
    cfg.fps = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn builder_helpers_compose() {
    let seq = SequenceConfig::new("outro", "o/{i}.webp", 120)
        .unwrap()
        .with_playback_range(PlaybackRange::new(0.5, 1.0).unwrap())
        .with_batches(10, 30, Duration::from_millis(5))
        .with_transition(ZoomThrough::default());
    assert!(seq.validate().is_ok());
    assert_eq!(seq.batch_policy().batch_delay, Duration::from_millis(5));
    let cfg = EngineConfig::single(seq);
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.background().to_array(), [0, 0, 0, 255]);
}

#[test]
fn missing_file_is_a_config_error() {
    let err = EngineConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("open engine config"));
}
