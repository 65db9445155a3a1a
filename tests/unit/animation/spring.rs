use super::*;

const DT: f64 = 1.0 / 60.0;

fn settle(spring: &mut Spring, target: f64, ticks: usize) {
    for _ in 0..ticks {
        spring.step(target, DT);
    }
}

#[test]
fn held_target_converges_without_offset() {
    for cfg in [SpringConfig::hero(), SpringConfig::outro()] {
        let mut s = Spring::new(cfg, 0.0);
        settle(&mut s, 0.73, 600);
        assert_eq!(s.position(), 0.73, "{cfg:?}");
        assert!(s.is_at_rest());
    }
}

#[test]
fn hero_preset_tracks_jumps_within_a_few_dozen_frames() {
    let mut s = Spring::new(SpringConfig::hero(), 0.0);
    let mut frames = 0;
    while (s.position() - 1.0).abs() > 0.05 {
        s.step(1.0, DT);
        frames += 1;
        assert!(frames < 60, "spring lagged more than a second behind");
    }
}

#[test]
fn overdamped_presets_do_not_overshoot() {
    let mut s = Spring::new(SpringConfig::outro(), 0.0);
    for _ in 0..600 {
        let p = s.step(1.0, DT);
        assert!(p <= 1.0 + 1e-9);
    }
}

#[test]
fn huge_dt_is_clamped_and_stable() {
    let mut s = Spring::new(SpringConfig::hero(), 0.0);
    let p = s.step(1.0, 10.0);
    assert!(p.is_finite());
    assert!((0.0..=1.0).contains(&p));
}

#[test]
fn jump_resets_velocity() {
    let mut s = Spring::new(SpringConfig::hero(), 0.0);
    s.step(1.0, DT);
    s.jump(0.5);
    assert_eq!(s.position(), 0.5);
    assert_eq!(s.velocity(), 0.0);
    assert_eq!(s.step(0.5, DT), 0.5);
}

#[test]
fn validate_rejects_non_positive_parameters() {
    let mut cfg = SpringConfig::hero();
    cfg.mass = 0.0;
    assert!(cfg.validate().is_err());
    let mut cfg = SpringConfig::hero();
    cfg.stiffness = f64::NAN;
    assert!(cfg.validate().is_err());
    assert!(SpringConfig::outro().validate().is_ok());
}
