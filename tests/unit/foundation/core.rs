use super::*;

#[test]
fn playback_range_rejects_inverted_and_out_of_bounds() {
    assert!(PlaybackRange::new(0.5, 0.5).is_err());
    assert!(PlaybackRange::new(0.8, 0.2).is_err());
    assert!(PlaybackRange::new(-0.1, 0.5).is_err());
    assert!(PlaybackRange::new(0.0, 1.5).is_err());
    assert!(PlaybackRange::new(f64::NAN, 1.0).is_err());
    assert!(PlaybackRange::new(0.5, 1.0).is_ok());
}

#[test]
fn playback_range_local_is_clamped() {
    let r = PlaybackRange::new(0.5, 1.0).unwrap();
    assert_eq!(r.local(0.4), 0.0);
    assert_eq!(r.local(0.5), 0.0);
    assert_eq!(r.local(0.75), 0.5);
    assert_eq!(r.local(1.0), 1.0);
}

#[test]
fn playback_range_serializes_as_pair() {
    let r: PlaybackRange = serde_json::from_str("[0.25, 0.75]").unwrap();
    assert_eq!(r, PlaybackRange::new(0.25, 0.75).unwrap());
    assert_eq!(serde_json::to_string(&r).unwrap(), "[0.25,0.75]");
}

#[test]
fn fps_frame_duration() {
    let fps = Fps::new(60, 1).unwrap();
    assert!((fps.frame_duration_secs() - 1.0 / 60.0).abs() < 1e-12);
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(60, 0).is_err());
}

#[test]
fn straight_rgba_is_premultiplied() {
    let c = Rgba8Premul::from_straight_rgba(255, 100, 0, 128);
    assert_eq!(c.to_array(), [128, 50, 0, 128]);
}
