use std::sync::Arc;

use crate::assets::decode::DecodedFrame;
use crate::assets::store::FrameStore;
use crate::foundation::core::{Affine, Size};
use crate::foundation::error::{ReelError, ReelResult};
use crate::player::sequence::SequencePlayer;
use crate::render::fit::cover_fit;
use crate::render::surface::{DrawParams, Surface};
use crate::render::transition::{TransitionParams, ZoomThrough};
use crate::scroll::source::ScrollProgressSource;

/// Frame storage and exit effect for one player segment.
#[derive(Clone, Debug)]
pub struct Track {
    pub store: Arc<FrameStore>,
    pub transition: Option<ZoomThrough>,
}

impl Track {
    pub fn new(store: Arc<FrameStore>, transition: Option<ZoomThrough>) -> Self {
        Self { store, transition }
    }
}

/// Identity of the frame currently on the surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayedFrame {
    pub segment: usize,
    pub index: u32,
}

/// Everything derived for the current tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderState {
    /// Global (smoothed) progress.
    pub progress: f64,
    pub segment: usize,
    pub local_progress: f64,
    pub target_index: u32,
    /// Whether the target frame was Ready this tick.
    pub target_ready: bool,
    pub displayed: Option<DisplayedFrame>,
    pub transition: TransitionParams,
    /// Frame of the incoming segment drawn at rest underneath, where two ranges overlap.
    pub underlay: Option<DisplayedFrame>,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            progress: 0.0,
            segment: 0,
            local_progress: 0.0,
            target_index: 0,
            target_ready: false,
            displayed: None,
            transition: TransitionParams::REST,
            underlay: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The surface was redrawn.
    Redrawn,
    /// Nothing visible changed.
    Unchanged,
    /// No frame has been Ready yet; the surface still shows the background.
    Idle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DrawKey {
    displayed: Option<DisplayedFrame>,
    transition: TransitionParams,
    underlay: Option<DisplayedFrame>,
    viewport: Size,
}

/// One drawn frame slot with its last good image.
#[derive(Debug, Default)]
struct Layer {
    shown: Option<DisplayedFrame>,
    image: Option<Arc<DecodedFrame>>,
}

impl Layer {
    /// Switch to `wanted` if it is Ready, otherwise keep what is shown. Returns readiness.
    fn offer(&mut self, store: &FrameStore, wanted: DisplayedFrame) -> bool {
        let Some(img) = store.get(wanted.index).and_then(|f| f.image) else {
            return false;
        };
        if self.shown != Some(wanted) {
            self.image = Some(img);
            self.shown = Some(wanted);
        }
        true
    }

    fn reset(&mut self) {
        self.shown = None;
        self.image = None;
    }
}

/// Resolves progress to a frame and draws it.
///
/// The displayed frame only changes when the target frame is Ready; Pending, Loading and
/// Failed targets keep the last good frame on screen. Where two playback ranges overlap the
/// later segment is drawn at rest first and the resolved one, with its exit transition, on top.
pub struct Compositor<S> {
    player: SequencePlayer,
    tracks: Vec<Track>,
    scroll: Option<ScrollProgressSource>,
    surface: S,
    state: RenderState,
    top: Layer,
    under: Layer,
    last_drawn: Option<DrawKey>,
}

impl<S> std::fmt::Debug for Compositor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("segments", &self.tracks.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<S: Surface> Compositor<S> {
    pub fn new(player: SequencePlayer, tracks: Vec<Track>, surface: S) -> ReelResult<Self> {
        let segments = player.segments();
        if segments.len() != tracks.len() {
            return Err(ReelError::config(format!(
                "player has {} segments but {} tracks were given",
                segments.len(),
                tracks.len()
            )));
        }
        for (seg, track) in segments.iter().zip(&tracks) {
            if seg.frame_count != track.store.frame_count() {
                return Err(ReelError::config(format!(
                    "segment '{}' expects {} frames, store '{}' holds {}",
                    seg.id,
                    seg.frame_count,
                    track.store.id(),
                    track.store.frame_count()
                )));
            }
        }
        Ok(Self {
            player,
            tracks,
            scroll: None,
            surface,
            state: RenderState::default(),
            top: Layer::default(),
            under: Layer::default(),
            last_drawn: None,
        })
    }

    /// Drive progress from a scroll source on every [`tick`](Self::tick).
    pub fn with_scroll(mut self, scroll: ScrollProgressSource) -> Self {
        self.state.progress = scroll.smoothed_progress();
        self.scroll = Some(scroll);
        self
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn scroll(&self) -> Option<&ScrollProgressSource> {
        self.scroll.as_ref()
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Advance smoothing by `dt_secs` and compose the result.
    pub fn tick(&mut self, dt_secs: f64) -> ReelResult<TickOutcome> {
        let progress = match self.scroll.as_mut() {
            Some(scroll) => scroll.tick(dt_secs),
            None => self.state.progress,
        };
        self.compose(progress)
    }

    /// Compose global `progress` without touching smoothing.
    pub fn compose(&mut self, progress: f64) -> ReelResult<TickOutcome> {
        let target = self.player.target(progress);
        let track = &self.tracks[target.segment];
        let transition = track
            .transition
            .map(|z| z.params(target.local_progress))
            .unwrap_or(TransitionParams::REST);

        let wanted = DisplayedFrame {
            segment: target.segment,
            index: target.frame_index,
        };
        let previous_segment = self.top.shown.map(|d| d.segment);
        let target_ready = self.top.offer(&track.store, wanted);
        if target_ready && previous_segment != Some(wanted.segment) {
            tracing::debug!(
                sequence = track.store.id(),
                index = wanted.index,
                "displaying sequence"
            );
        }

        match self.player.incoming(progress) {
            Some(incoming) => {
                if self.under.shown.map(|d| d.segment) != Some(incoming.segment) {
                    self.under.reset();
                }
                let wanted = DisplayedFrame {
                    segment: incoming.segment,
                    index: incoming.frame_index,
                };
                self.under.offer(&self.tracks[incoming.segment].store, wanted);
            }
            None => self.under.reset(),
        }

        self.state.progress = progress;
        self.state.segment = target.segment;
        self.state.local_progress = target.local_progress;
        self.state.target_index = target.frame_index;
        self.state.target_ready = target_ready;
        self.state.displayed = self.top.shown;
        self.state.transition = transition;
        self.state.underlay = self.under.shown;

        if self.top.image.is_none() && self.under.image.is_none() {
            return Ok(TickOutcome::Idle);
        }
        let key = DrawKey {
            displayed: self.top.shown,
            transition,
            underlay: self.under.shown,
            viewport: self.surface.viewport(),
        };
        if self.last_drawn == Some(key) {
            return Ok(TickOutcome::Unchanged);
        }

        let mut layers = Vec::with_capacity(2);
        if let Some(img) = &self.under.image {
            layers.push((img, draw_params(img.size(), key.viewport, TransitionParams::REST)));
        }
        if let Some(img) = &self.top.image {
            layers.push((img, draw_params(img.size(), key.viewport, transition)));
        }
        let mut layers = layers.into_iter();
        if let Some((img, params)) = layers.next() {
            self.surface.draw(img, &params)?;
        }
        for (img, params) in layers {
            self.surface.overlay(img, &params)?;
        }
        self.last_drawn = Some(key);
        Ok(TickOutcome::Redrawn)
    }

    /// Resize the output. The next tick redraws the same frame with a new cover fit.
    pub fn resize(&mut self, viewport: Size) -> ReelResult<()> {
        self.surface.resize(viewport)?;
        self.last_drawn = None;
        Ok(())
    }
}

/// Cover fit, then the zoom-through scale about the viewport centre.
fn draw_params(frame: Size, viewport: Size, transition: TransitionParams) -> DrawParams {
    let fit = cover_fit(frame, viewport);
    let centre = viewport.to_rect().center().to_vec2();
    let zoom =
        Affine::translate(centre) * Affine::scale(transition.scale) * Affine::translate(-centre);
    let place = Affine::translate(fit.rect.origin().to_vec2()) * Affine::scale(fit.scale);
    DrawParams {
        transform: zoom * place,
        opacity: transition.opacity,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
