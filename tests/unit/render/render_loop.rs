use std::time::Duration;

use super::*;
use crate::animation::spring::SpringConfig;
use crate::assets::decode::DecodedFrame;
use crate::assets::store::FrameStore;
use crate::config::template::PathTemplate;
use crate::foundation::core::{PlaybackRange, Rgba8Premul};
use crate::player::sequence::{Segment, SequencePlayer};
use crate::render::compositor::{TickOutcome, Track};
use crate::render::surface::CpuSurface;
use crate::scroll::{bus::ScrollBus, region::ScrollRegion, source::ScrollProgressSource};

fn compositor(bus: &ScrollBus, n: u32) -> (Arc<FrameStore>, Compositor<CpuSurface>) {
    let template = PathTemplate::parse("seq/{i}.png").unwrap();
    let store = Arc::new(FrameStore::with_template("seq", template, n));
    let player = SequencePlayer::new(vec![Segment::new("seq", n, PlaybackRange::FULL)]).unwrap();
    let surface = CpuSurface::new(4, 2, Rgba8Premul::from_straight_rgba(0, 0, 0, 255)).unwrap();
    let region = ScrollRegion::new(0.0, 3.0, 100.0).unwrap();
    let source = ScrollProgressSource::new(bus.subscribe(), region, SpringConfig::hero());
    let c = Compositor::new(player, vec![Track::new(Arc::clone(&store), None)], surface)
        .unwrap()
        .with_scroll(source);
    (store, c)
}

fn fps60() -> Fps {
    Fps::new(60, 1).unwrap()
}

#[tokio::test(start_paused = true)]
async fn ticks_continuously_and_stop_returns_compositor() {
    let bus = ScrollBus::new(100.0);
    let (store, c) = compositor(&bus, 8);
    for i in 0..8 {
        store.mark_ready(i, DecodedFrame::solid(2, 1, [i as u8 * 10, 0, 0, 255]).unwrap());
    }

    let handle = RenderLoop::spawn(c, fps60());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(handle.ticks() >= 3);
    assert!(handle.is_running());

    bus.publish_offset(200.0);
    tokio::time::sleep(Duration::from_secs(3)).await;

    let mut c = handle.stop().await.unwrap();
    assert_eq!(c.state().progress, 1.0);
    assert_eq!(c.state().displayed.map(|d| d.index), Some(7));
    assert_eq!(c.surface().pixel(0, 0), Some([70, 0, 0, 255]));
    assert_eq!(c.tick(0.016).unwrap(), TickOutcome::Unchanged);
}

#[tokio::test(start_paused = true)]
async fn loop_keeps_ticking_without_scroll_events() {
    let bus = ScrollBus::new(100.0);
    let (_store, c) = compositor(&bus, 4);
    let handle = RenderLoop::spawn(c, fps60());
    tokio::time::sleep(Duration::from_millis(50)).await;
    let a = handle.ticks();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(handle.ticks() > a);
    let c = handle.stop().await.unwrap();
    assert_eq!(c.state().displayed, None);
}

#[tokio::test(start_paused = true)]
async fn dropping_handle_cancels_loop_and_releases_listener() {
    let bus = ScrollBus::new(100.0);
    let (_store, c) = compositor(&bus, 4);
    assert_eq!(bus.listener_count(), 1);

    let handle = RenderLoop::spawn(c, fps60());
    tokio::time::sleep(Duration::from_millis(50)).await;
    drop(handle);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(bus.listener_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn multi_thread_runtime_ticks_and_draws() {
    let bus = ScrollBus::new(100.0);
    let (store, c) = compositor(&bus, 2);
    for i in 0..2 {
        store.mark_ready(i, DecodedFrame::solid(2, 1, [50, 0, 0, 255]).unwrap());
    }

    let handle = RenderLoop::spawn(c, fps60());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(handle.ticks() > 0);

    let c = handle.stop().await.unwrap();
    assert_eq!(c.state().displayed.map(|d| d.index), Some(0));
    assert_eq!(c.surface().pixel(0, 0), Some([50, 0, 0, 255]));
}
