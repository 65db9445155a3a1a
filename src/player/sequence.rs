use crate::config::sequence::SequenceConfig;
use crate::foundation::core::PlaybackRange;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::math::clamp01;

/// One sequence assigned to a sub-range of global progress.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub id: String,
    pub frame_count: u32,
    pub range: PlaybackRange,
}

impl Segment {
    pub fn new(id: impl Into<String>, frame_count: u32, range: PlaybackRange) -> Self {
        Self {
            id: id.into(),
            frame_count,
            range,
        }
    }
}

impl From<&SequenceConfig> for Segment {
    fn from(cfg: &SequenceConfig) -> Self {
        Self::new(cfg.id.clone(), cfg.frame_count, cfg.playback_range)
    }
}

/// Outcome of [`SequencePlayer::resolve`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolved {
    /// Index into the player's segment list.
    pub segment: usize,
    /// Progress rescaled into the segment's own `[0, 1]`.
    pub local_progress: f64,
}

/// Resolved segment plus the frame it should show.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTarget {
    pub segment: usize,
    pub local_progress: f64,
    pub frame_index: u32,
}

#[derive(Clone, Debug)]
pub struct SequencePlayer {
    segments: Vec<Segment>,
}

impl SequencePlayer {
    pub fn new(segments: Vec<Segment>) -> ReelResult<Self> {
        if segments.is_empty() {
            return Err(ReelError::config("sequence player needs at least one segment"));
        }
        for s in &segments {
            if s.frame_count == 0 {
                return Err(ReelError::config(format!(
                    "segment '{}' has frame_count 0",
                    s.id
                )));
            }
            s.range.validate()?;
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// First segment (in configured order) whose range contains `progress`; otherwise the
    /// nearest one, earlier segments winning ties.
    pub fn resolve(&self, progress: f64) -> Resolved {
        let p = clamp01(progress);
        let segment = self
            .segments
            .iter()
            .position(|s| s.range.contains(p))
            .unwrap_or_else(|| self.nearest(p));
        Resolved {
            segment,
            local_progress: self.segments[segment].range.local(p),
        }
    }

    pub fn target(&self, progress: f64) -> FrameTarget {
        let r = self.resolve(progress);
        self.target_in(r.segment, r.local_progress)
    }

    /// A later segment whose range also contains `progress`, i.e. the sequence coming into
    /// view underneath the resolved one where two ranges overlap.
    pub fn incoming(&self, progress: f64) -> Option<FrameTarget> {
        let p = clamp01(progress);
        let current = self.segments.iter().position(|s| s.range.contains(p))?;
        let (offset, seg) = self.segments[current + 1..]
            .iter()
            .enumerate()
            .find(|(_, s)| s.range.contains(p))?;
        Some(self.target_in(current + 1 + offset, seg.range.local(p)))
    }

    fn target_in(&self, segment: usize, local_progress: f64) -> FrameTarget {
        FrameTarget {
            segment,
            local_progress,
            frame_index: frame_index_for(local_progress, self.segments[segment].frame_count),
        }
    }

    fn nearest(&self, p: f64) -> usize {
        let mut best = 0;
        let mut best_d = f64::INFINITY;
        for (i, s) in self.segments.iter().enumerate() {
            let d = s.range.distance_to(p);
            if d < best_d {
                best = i;
                best_d = d;
            }
        }
        best
    }
}

/// `floor(local * (frame_count - 1))`, clamped to a valid index. Floor is the only tie-break,
/// so 0 maps to the first frame and 1 to the last.
pub fn frame_index_for(local_progress: f64, frame_count: u32) -> u32 {
    if frame_count <= 1 {
        return 0;
    }
    let last = frame_count - 1;
    let idx = (clamp01(local_progress) * f64::from(last)).floor();
    (idx as u32).min(last)
}

#[cfg(test)]
#[path = "../../tests/unit/player/sequence.rs"]
mod tests;
