use super::*;

fn policy(initial: u32, size: u32) -> BatchPolicy {
    BatchPolicy {
        initial_batch: initial,
        batch_size: size,
        ..BatchPolicy::default()
    }
}

#[test]
fn hero_plan_starts_with_initial_batch() {
    let batches = plan_batches(240, &policy(20, 30));
    assert_eq!(batches[0], 0..20);
    assert_eq!(batches[1], 20..50);
    assert_eq!(batches.last().cloned(), Some(230..240));
    assert_eq!(batches.len(), 1 + 8);
}

#[test]
fn batches_cover_every_index_once_in_order() {
    for (n, initial, size) in [(1, 20, 30), (7, 3, 2), (240, 10, 30), (31, 1, 1), (100, 100, 5)] {
        let batches = plan_batches(n, &policy(initial, size));
        let flat: Vec<u32> = batches.iter().cloned().flatten().collect();
        assert_eq!(flat, (0..n).collect::<Vec<_>>(), "n={n}");
        assert!(batches.iter().all(|b| !b.is_empty()));
    }
}

#[test]
fn initial_batch_larger_than_sequence_is_truncated() {
    assert_eq!(plan_batches(5, &policy(20, 30)), vec![0..5]);
}

#[test]
fn empty_sequence_has_no_batches() {
    assert!(plan_batches(0, &BatchPolicy::default()).is_empty());
}

#[test]
fn validate_rejects_zero_sizes() {
    assert!(policy(0, 30).validate().is_err());
    assert!(policy(20, 0).validate().is_err());
    let mut p = BatchPolicy::default();
    p.fetch_timeout = Duration::ZERO;
    assert!(p.validate().is_err());
    assert!(BatchPolicy::default().validate().is_ok());
}
