//! scrollreel maps a continuously updating scroll position onto frames of pre-rendered image
//! sequences.
//!
//! - Configure sequences with an [`EngineConfig`] and build a [`ScrollEngine`]
//! - Frames load progressively in priority batches from a [`FrameSource`]
//! - A spring-smoothed [`ScrollProgressSource`] drives a [`Compositor`] that covers a
//!   [`Surface`] with the current frame, ticked continuously by a [`RenderLoop`]
#![forbid(unsafe_code)]

mod foundation;

/// Easing curves and spring smoothing.
pub mod animation;
/// Frame decoding, sources, and storage.
pub mod assets;
/// JSON configuration.
pub mod config;
/// Page-level engine.
pub mod engine;
/// Progressive frame loading.
pub mod loader;
/// Progress to frame mapping.
pub mod player;
/// Composition and the render loop.
pub mod render;
/// Scroll publishing and progress.
pub mod scroll;

pub use crate::foundation::core::{
    Affine, Fps, PlaybackRange, Point, Rect, Rgba8Premul, Size, Vec2,
};
pub use crate::foundation::error::{ReelError, ReelResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::spring::{Spring, SpringConfig};
pub use crate::assets::decode::{DecodedFrame, decode_frame};
pub use crate::assets::source::{FrameSource, FsFrameSource, HttpFrameSource};
pub use crate::assets::store::{Frame, FrameState, FrameStore};
pub use crate::config::sequence::{EngineConfig, SequenceConfig};
pub use crate::config::template::PathTemplate;
pub use crate::engine::{EngineHandle, LoadStatus, ScrollEngine};
pub use crate::loader::batch::{BatchPolicy, plan_batches};
pub use crate::loader::progressive::{
    LoadCallbacks, LoadHandle, LoadJob, LoadReport, ProgressiveLoader,
};
pub use crate::player::sequence::{Resolved, Segment, SequencePlayer, frame_index_for};
pub use crate::render::compositor::{Compositor, RenderState, TickOutcome, Track};
pub use crate::render::fit::{CoverFit, cover_fit};
pub use crate::render::render_loop::{RenderLoop, RenderLoopHandle};
pub use crate::render::surface::{CpuSurface, DrawParams, Surface};
pub use crate::render::transition::{TransitionParams, ZoomThrough};
pub use crate::scroll::bus::{ScrollBus, ScrollListener, ScrollSample};
pub use crate::scroll::region::ScrollRegion;
pub use crate::scroll::source::ScrollProgressSource;
pub use crate::scroll::wheel::{SmoothWheel, SmoothWheelConfig};
