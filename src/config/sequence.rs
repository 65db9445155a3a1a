use std::{collections::HashSet, fs::File, io::BufReader, path::Path, time::Duration};

use crate::{
    animation::spring::SpringConfig,
    config::template::PathTemplate,
    foundation::core::{Fps, PlaybackRange, Rgba8Premul},
    foundation::error::{ReelError, ReelResult},
    loader::batch::BatchPolicy,
    render::transition::ZoomThrough,
};

/// One pre-rendered frame sequence and how it is loaded and played.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SequenceConfig {
    pub id: String,
    pub frame_path_template: PathTemplate,
    pub frame_count: u32,
    #[serde(default)]
    pub playback_range: PlaybackRange,
    #[serde(default = "default_initial_batch")]
    pub initial_batch: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    #[serde(default = "default_batch_delay_ms")]
    pub batch_delay_ms: u64,
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
    /// Zoom-through applied near the end of this sequence's range.
    #[serde(default)]
    pub transition: Option<ZoomThrough>,
}

fn default_initial_batch() -> u32 {
    BatchPolicy::default().initial_batch
}

fn default_batch_size() -> u32 {
    BatchPolicy::default().batch_size
}

fn default_batch_delay_ms() -> u64 {
    BatchPolicy::default().batch_delay.as_millis() as u64
}

fn default_fetch_timeout_ms() -> u64 {
    BatchPolicy::default().fetch_timeout.as_millis() as u64
}

impl SequenceConfig {
    /// Sequence covering the whole scroll range with default batching.
    pub fn new(id: impl Into<String>, template: &str, frame_count: u32) -> ReelResult<Self> {
        let cfg = Self {
            id: id.into(),
            frame_path_template: PathTemplate::parse(template)?,
            frame_count,
            playback_range: PlaybackRange::FULL,
            initial_batch: default_initial_batch(),
            batch_size: default_batch_size(),
            batch_delay_ms: default_batch_delay_ms(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            transition: None,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_playback_range(mut self, range: PlaybackRange) -> Self {
        self.playback_range = range;
        self
    }

    pub fn with_batches(mut self, initial_batch: u32, batch_size: u32, delay: Duration) -> Self {
        self.initial_batch = initial_batch;
        self.batch_size = batch_size;
        self.batch_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_transition(mut self, transition: ZoomThrough) -> Self {
        self.transition = Some(transition);
        self
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy {
            initial_batch: self.initial_batch,
            batch_size: self.batch_size,
            batch_delay: Duration::from_millis(self.batch_delay_ms),
            fetch_timeout: Duration::from_millis(self.fetch_timeout_ms),
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.id.trim().is_empty() {
            return Err(ReelError::config("sequence id must be non-empty"));
        }
        if self.frame_count == 0 {
            return Err(ReelError::config(format!(
                "sequence '{}': frame_count must be >= 1",
                self.id
            )));
        }
        let ctx = |e: ReelError| ReelError::config(format!("sequence '{}': {e}", self.id));
        self.playback_range.validate().map_err(ctx)?;
        self.batch_policy().validate().map_err(ctx)?;
        if let Some(t) = &self.transition {
            t.validate().map_err(ctx)?;
        }
        Ok(())
    }
}

/// Page-level configuration: every sequence played by one engine plus shared tuning.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Render loop rate in ticks per second.
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Straight (non-premultiplied) RGBA clear color of the output surface.
    #[serde(default = "default_background")]
    pub background_rgba: [u8; 4],
    #[serde(default)]
    pub smoothing: SpringConfig,
    /// Height of the scroll-bound container in viewport heights.
    #[serde(default = "default_height_multiple")]
    pub scroll_region_height_multiple: f64,
    pub sequences: Vec<SequenceConfig>,
}

fn default_fps() -> u32 {
    60
}

fn default_background() -> [u8; 4] {
    [0, 0, 0, 255]
}

fn default_height_multiple() -> f64 {
    3.0
}

impl EngineConfig {
    /// Single-sequence configuration with default tuning.
    pub fn single(sequence: SequenceConfig) -> Self {
        Self {
            fps: default_fps(),
            background_rgba: default_background(),
            smoothing: SpringConfig::default(),
            scroll_region_height_multiple: default_height_multiple(),
            sequences: vec![sequence],
        }
    }

    /// Parse an engine configuration from a JSON reader and validate it.
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("parse engine config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse an engine configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::config(format!("open engine config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn fps(&self) -> ReelResult<Fps> {
        Fps::new(self.fps, 1)
    }

    pub fn background(&self) -> Rgba8Premul {
        let [r, g, b, a] = self.background_rgba;
        Rgba8Premul::from_straight_rgba(r, g, b, a)
    }

    pub fn validate(&self) -> ReelResult<()> {
        self.fps()?;
        self.smoothing.validate()?;
        let multiple = self.scroll_region_height_multiple;
        if !multiple.is_finite() || multiple < 1.0 {
            return Err(ReelError::config(
                "scroll_region_height_multiple must be finite and >= 1",
            ));
        }
        if self.sequences.is_empty() {
            return Err(ReelError::config("at least one sequence is required"));
        }
        let mut seen = HashSet::new();
        for seq in &self.sequences {
            seq.validate()?;
            if !seen.insert(seq.id.as_str()) {
                return Err(ReelError::config(format!(
                    "duplicate sequence id '{}'",
                    seq.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/sequence.rs"]
mod tests;
