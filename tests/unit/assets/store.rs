use std::thread;

use super::*;

fn store(n: u32) -> FrameStore {
    FrameStore::with_template("hero", PathTemplate::parse("/hero/{i}.webp").unwrap(), n)
}

fn px(v: u8) -> DecodedFrame {
    DecodedFrame::solid(2, 1, [v, v, v, 255]).unwrap()
}

#[test]
fn new_store_is_all_pending() {
    let s = store(3);
    assert_eq!(s.frame_count(), 3);
    for i in 0..3 {
        assert_eq!(s.state(i), Some(FrameState::Pending));
    }
    assert!(s.get(3).is_none());
    assert_eq!(s.progress_fraction(), 0.0);
    assert_eq!(s.path_for(2), "/hero/00003.webp");
}

#[test]
fn lifecycle_pending_loading_ready() {
    let s = store(2);
    assert!(s.mark_loading(0));
    assert!(!s.mark_loading(0));
    assert_eq!(s.state(0), Some(FrameState::Loading));
    assert!(s.mark_ready(0, px(7)));
    let f = s.get(0).unwrap();
    assert!(f.is_ready());
    assert_eq!(f.natural_width(), Some(2));
    assert_eq!(f.natural_height(), Some(1));
    assert_eq!(s.natural_size(), Some(Size::new(2.0, 1.0)));
}

#[test]
fn mark_ready_twice_is_a_noop() {
    let s = store(2);
    assert!(s.mark_ready(1, px(1)));
    let first = s.get(1).unwrap().image.unwrap();
    assert!(!s.mark_ready(1, px(2)));
    let after = s.get(1).unwrap().image.unwrap();
    assert!(Arc::ptr_eq(&first, &after));
    assert_eq!(s.resolved_count(), 1);
    assert_eq!(s.ready_count(), 1);
}

#[test]
fn failed_is_terminal_and_counts_toward_progress() {
    let s = store(4);
    assert!(s.mark_failed(2));
    assert!(!s.mark_ready(2, px(1)));
    assert!(!s.mark_failed(2));
    assert_eq!(s.state(2), Some(FrameState::Failed));
    assert!(s.get(2).unwrap().image.is_none());
    assert_eq!(s.progress_fraction(), 0.25);
}

#[test]
fn out_of_range_marks_are_ignored() {
    let s = store(1);
    assert!(!s.mark_ready(5, px(1)));
    assert!(!s.mark_failed(5));
    assert!(!s.mark_loading(5));
    assert_eq!(s.resolved_count(), 0);
}

#[test]
fn concurrent_out_of_order_writers_and_readers() {
    let s = Arc::new(store(256));
    let writers: Vec<_> = (0..4u32)
        .map(|w| {
            let s = Arc::clone(&s);
            thread::spawn(move || {
                for i in (0..256u32).rev().filter(|i| i % 4 == w) {
                    if i % 10 == 0 {
                        s.mark_failed(i);
                    } else {
                        s.mark_ready(i, px(i as u8));
                    }
                }
            })
        })
        .collect();
    let reader = {
        let s = Arc::clone(&s);
        thread::spawn(move || {
            for _ in 0..2_000 {
                for i in [0u32, 17, 128, 255] {
                    let f = s.get(i).unwrap();
                    assert_eq!(f.is_ready(), f.image.is_some());
                }
            }
        })
    };
    for w in writers {
        w.join().unwrap();
    }
    reader.join().unwrap();

    assert!(s.is_complete());
    assert_eq!(s.progress_fraction(), 1.0);
    assert_eq!(s.ready_count(), 256 - 26);
    assert_eq!(s.get(17).unwrap().image.unwrap().pixel(0, 0)[0], 17);
}

#[test]
fn natural_size_follows_lowest_ready_index() {
    let s = store(4);
    s.mark_ready(3, DecodedFrame::solid(8, 4, [1, 1, 1, 255]).unwrap());
    assert_eq!(s.natural_size(), Some(Size::new(8.0, 4.0)));
    s.mark_ready(1, px(1));
    assert_eq!(s.natural_size(), Some(Size::new(2.0, 1.0)));
    s.mark_ready(2, DecodedFrame::solid(6, 6, [1, 1, 1, 255]).unwrap());
    assert_eq!(s.natural_size(), Some(Size::new(2.0, 1.0)));
}

#[test]
fn release_only_undoes_loading() {
    let s = store(2);
    assert!(!s.release(0));
    assert!(s.mark_loading(0));
    assert!(s.release(0));
    assert_eq!(s.state(0), Some(FrameState::Pending));
    assert!(s.mark_loading(0));
    assert!(s.mark_ready(0, px(3)));
    assert!(!s.release(0));
    assert_eq!(s.state(0), Some(FrameState::Ready));
    assert!(!s.release(9));
}

#[tokio::test]
async fn settled_waits_for_loading_slot() {
    let s = Arc::new(store(3));
    assert_eq!(s.settled(0).await, Some(FrameState::Pending));
    assert_eq!(s.settled(7).await, None);

    assert!(s.mark_loading(1));
    let waiter = tokio::spawn({
        let s = Arc::clone(&s);
        async move { s.settled(1).await }
    });
    tokio::task::yield_now().await;
    assert!(!waiter.is_finished());
    s.mark_failed(1);
    assert_eq!(waiter.await.unwrap(), Some(FrameState::Failed));

    assert!(s.mark_loading(2));
    let waiter = tokio::spawn({
        let s = Arc::clone(&s);
        async move { s.settled(2).await }
    });
    tokio::task::yield_now().await;
    s.release(2);
    assert_eq!(waiter.await.unwrap(), Some(FrameState::Pending));
}
