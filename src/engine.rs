use std::sync::Arc;

use tokio::sync::watch;

use crate::assets::source::FrameSource;
use crate::assets::store::FrameStore;
use crate::config::sequence::EngineConfig;
use crate::foundation::core::Fps;
use crate::foundation::error::ReelResult;
use crate::loader::progressive::{
    LoadCallbacks, LoadHandle, LoadJob, LoadReport, ProgressiveLoader,
};
use crate::player::sequence::{Segment, SequencePlayer};
use crate::render::compositor::{Compositor, TickOutcome, Track};
use crate::render::render_loop::{RenderLoop, RenderLoopHandle};
use crate::render::surface::Surface;
use crate::scroll::bus::ScrollBus;
use crate::scroll::region::ScrollRegion;
use crate::scroll::source::ScrollProgressSource;

/// User-visible load state of a page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LoadStatus {
    Loading { percent: f64 },
    Ready,
}

/// One scroll-synchronized page: every configured sequence, its frame store, and the player
/// that hands off between them.
#[derive(Debug)]
pub struct ScrollEngine {
    config: EngineConfig,
    fps: Fps,
    loader: ProgressiveLoader,
    stores: Vec<Arc<FrameStore>>,
    player: SequencePlayer,
}

impl ScrollEngine {
    /// Validate `config` and allocate empty frame stores. Does no IO.
    pub fn new(config: EngineConfig, source: Arc<dyn FrameSource>) -> ReelResult<Self> {
        config.validate()?;
        let fps = config.fps()?;
        let stores = config
            .sequences
            .iter()
            .map(|s| Arc::new(FrameStore::new(s)))
            .collect::<Vec<_>>();
        let player = SequencePlayer::new(config.sequences.iter().map(Segment::from).collect())?;
        tracing::debug!(
            sequences = stores.len(),
            frames = stores.iter().map(|s| s.frame_count()).sum::<u32>(),
            "scroll engine configured"
        );
        Ok(Self {
            config,
            fps,
            loader: ProgressiveLoader::new(source),
            stores,
            player,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stores(&self) -> &[Arc<FrameStore>] {
        &self.stores
    }

    pub fn store(&self, id: &str) -> Option<&Arc<FrameStore>> {
        self.stores.iter().find(|s| s.id() == id)
    }

    pub fn player(&self) -> &SequencePlayer {
        &self.player
    }

    /// Region for a container `top` pixels into the document, sized by the configured
    /// viewport multiple.
    pub fn region_at(&self, top: f64, viewport_height: f64) -> ReelResult<ScrollRegion> {
        ScrollRegion::new(top, self.config.scroll_region_height_multiple, viewport_height)
    }

    fn jobs(&self) -> Vec<LoadJob> {
        self.config
            .sequences
            .iter()
            .zip(&self.stores)
            .map(|(cfg, store)| LoadJob::new(Arc::clone(store), cfg.batch_policy()))
            .collect()
    }

    /// Start loading every sequence in configured order. Never blocks.
    pub fn load(&self, callbacks: LoadCallbacks) -> LoadHandle {
        self.loader.load_all(self.jobs(), callbacks)
    }

    /// Load every sequence on the current task.
    pub async fn preload(&self) -> LoadReport {
        self.loader.run(self.jobs(), LoadCallbacks::noop()).await
    }

    /// Compositor over this engine's stores, not bound to any scroll source.
    pub fn compositor<S: Surface>(&self, surface: S) -> ReelResult<Compositor<S>> {
        let tracks = self
            .config
            .sequences
            .iter()
            .zip(&self.stores)
            .map(|(cfg, store)| Track::new(Arc::clone(store), cfg.transition))
            .collect();
        Compositor::new(self.player.clone(), tracks, surface)
    }

    /// Compose global `progress` once from whatever is loaded right now.
    pub fn render_once<S: Surface>(
        &self,
        progress: f64,
        surface: S,
    ) -> ReelResult<(S, TickOutcome)> {
        let mut compositor = self.compositor(surface)?;
        let outcome = compositor.compose(progress)?;
        Ok((compositor.into_surface(), outcome))
    }

    /// Begin loading and register the render loop.
    ///
    /// Without a scroll region there is nothing to bind to: returns `Ok(None)` and starts
    /// nothing.
    pub fn start<S: Surface + 'static>(
        &self,
        bus: &ScrollBus,
        region: Option<ScrollRegion>,
        surface: S,
        callbacks: LoadCallbacks,
    ) -> ReelResult<Option<EngineHandle<S>>> {
        let Some(region) = region else {
            tracing::debug!("no scroll region to bind; engine not started");
            return Ok(None);
        };

        let scroll = ScrollProgressSource::new(bus.subscribe(), region, self.config.smoothing);
        let compositor = self.compositor(surface)?.with_scroll(scroll);

        let (status_tx, status_rx) = watch::channel(LoadStatus::Loading { percent: 0.0 });
        let status_tx = Arc::new(status_tx);
        let progress_tx = Arc::clone(&status_tx);
        let callbacks = callbacks.tee(
            move |percent| {
                progress_tx.send_replace(LoadStatus::Loading { percent });
            },
            move || {
                status_tx.send_replace(LoadStatus::Ready);
            },
        );

        let load = self.load(callbacks);
        let render = RenderLoop::spawn(compositor, self.fps);
        tracing::debug!(fps = self.fps.as_f64(), "scroll engine started");
        Ok(Some(EngineHandle {
            status: status_rx,
            load,
            render,
        }))
    }
}

/// Running page. Dropping it cancels the render loop; loads in flight finish harmlessly.
#[derive(Debug)]
pub struct EngineHandle<S> {
    status: watch::Receiver<LoadStatus>,
    load: LoadHandle,
    render: RenderLoopHandle<S>,
}

impl<S> EngineHandle<S> {
    pub fn status(&self) -> watch::Receiver<LoadStatus> {
        self.status.clone()
    }

    pub fn current_status(&self) -> LoadStatus {
        *self.status.borrow()
    }

    /// Resolves once every frame has resolved. Returns `false` if loading was abandoned.
    pub async fn loaded(&self) -> bool {
        let mut rx = self.status.clone();
        rx.wait_for(|s| *s == LoadStatus::Ready).await.is_ok()
    }

    pub fn is_loaded(&self) -> bool {
        self.load.is_finished()
    }

    pub fn render_ticks(&self) -> u64 {
        self.render.ticks()
    }

    /// Stop the render loop and hand back its compositor. Loading is left to finish.
    pub async fn stop(self) -> ReelResult<Compositor<S>> {
        self.render.stop().await
    }
}

#[cfg(test)]
#[path = "../tests/unit/engine.rs"]
mod tests;
