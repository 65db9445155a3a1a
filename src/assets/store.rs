use std::sync::{
    Arc, PoisonError, RwLock,
    atomic::{AtomicU32, Ordering},
};

use tokio::sync::Notify;

use crate::{
    assets::decode::DecodedFrame,
    config::{sequence::SequenceConfig, template::PathTemplate},
    foundation::core::Size,
};

/// Lifecycle of one frame slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameState {
    /// Allocated, no fetch issued yet.
    Pending,
    /// Fetch/decode in flight.
    Loading,
    /// Decoded and immutable.
    Ready,
    /// Fetch or decode failed. Rendering treats this like "not ready yet".
    Failed,
}

impl FrameState {
    /// Ready and Failed are terminal; every slot reaches exactly one of them once.
    pub fn is_resolved(self) -> bool {
        matches!(self, Self::Ready | Self::Failed)
    }
}

/// Snapshot of one frame slot.
#[derive(Clone, Debug)]
pub struct Frame {
    /// 0-based position within the sequence.
    pub index: u32,
    pub state: FrameState,
    /// Decoded pixels when `state == Ready`.
    pub image: Option<Arc<DecodedFrame>>,
}

impl Frame {
    pub fn is_ready(&self) -> bool {
        self.state == FrameState::Ready
    }

    pub fn natural_width(&self) -> Option<u32> {
        self.image.as_ref().map(|i| i.width)
    }

    pub fn natural_height(&self) -> Option<u32> {
        self.image.as_ref().map(|i| i.height)
    }
}

#[derive(Debug)]
enum Slot {
    Pending,
    Loading,
    Ready(Arc<DecodedFrame>),
    Failed,
}

impl Slot {
    fn state(&self) -> FrameState {
        match self {
            Self::Pending => FrameState::Pending,
            Self::Loading => FrameState::Loading,
            Self::Ready(_) => FrameState::Ready,
            Self::Failed => FrameState::Failed,
        }
    }
}

/// Ordered frame slots of one sequence.
///
/// Writes are index-disjoint (one load task per index) and may arrive in any order. Each slot
/// sits behind its own lock and a Ready slot publishes an `Arc` to fully decoded pixels, so a
/// concurrent `get` observes either the previous state or the complete frame.
#[derive(Debug)]
pub struct FrameStore {
    id: String,
    template: PathTemplate,
    slots: Vec<RwLock<Slot>>,
    resolved: AtomicU32,
    ready: AtomicU32,
    /// Lowest Ready index and its size.
    natural_size: RwLock<Option<(u32, Size)>>,
    /// Signalled whenever a slot leaves Loading.
    changed: Notify,
}

impl FrameStore {
    /// Allocate `frame_count` Pending slots. Does no IO.
    pub fn new(cfg: &SequenceConfig) -> Self {
        Self::with_template(cfg.id.clone(), cfg.frame_path_template.clone(), cfg.frame_count)
    }

    pub fn with_template(id: impl Into<String>, template: PathTemplate, frame_count: u32) -> Self {
        let slots = (0..frame_count).map(|_| RwLock::new(Slot::Pending)).collect();
        Self {
            id: id.into(),
            template,
            slots,
            resolved: AtomicU32::new(0),
            ready: AtomicU32::new(0),
            natural_size: RwLock::new(None),
            changed: Notify::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn frame_count(&self) -> u32 {
        self.slots.len() as u32
    }

    /// Rendered path of frame `index`.
    pub fn path_for(&self, index: u32) -> String {
        self.template.render(index)
    }

    /// O(1) snapshot of slot `index`, `None` when out of range.
    pub fn get(&self, index: u32) -> Option<Frame> {
        let slot = self.slots.get(index as usize)?;
        let guard = slot.read().unwrap_or_else(PoisonError::into_inner);
        let image = match &*guard {
            Slot::Ready(img) => Some(Arc::clone(img)),
            _ => None,
        };
        Some(Frame {
            index,
            state: guard.state(),
            image,
        })
    }

    pub fn state(&self, index: u32) -> Option<FrameState> {
        let slot = self.slots.get(index as usize)?;
        let guard = slot.read().unwrap_or_else(PoisonError::into_inner);
        Some(guard.state())
    }

    /// Pending -> Loading. Returns `false` for any other starting state.
    pub fn mark_loading(&self, index: u32) -> bool {
        let Some(slot) = self.slots.get(index as usize) else {
            return false;
        };
        let mut guard = slot.write().unwrap_or_else(PoisonError::into_inner);
        if matches!(*guard, Slot::Pending) {
            *guard = Slot::Loading;
            true
        } else {
            false
        }
    }

    /// Publish decoded pixels for `index`.
    ///
    /// Idempotent: a slot that already resolved is left untouched and `false` is returned.
    pub fn mark_ready(&self, index: u32, frame: DecodedFrame) -> bool {
        let Some(slot) = self.slots.get(index as usize) else {
            tracing::debug!(sequence = %self.id, index, "mark_ready out of range");
            return false;
        };
        let size = frame.size();
        let frame = Arc::new(frame);
        {
            let mut guard = slot.write().unwrap_or_else(PoisonError::into_inner);
            if guard.state().is_resolved() {
                return false;
            }
            *guard = Slot::Ready(frame);
        }
        {
            let mut natural = self.natural_size.write().unwrap_or_else(PoisonError::into_inner);
            if natural.is_none_or(|(lowest, _)| index < lowest) {
                *natural = Some((index, size));
            }
        }
        self.ready.fetch_add(1, Ordering::AcqRel);
        self.resolved.fetch_add(1, Ordering::AcqRel);
        self.changed.notify_waiters();
        true
    }

    /// Mark `index` as failed. Same terminal rule as [`Self::mark_ready`].
    pub fn mark_failed(&self, index: u32) -> bool {
        let Some(slot) = self.slots.get(index as usize) else {
            return false;
        };
        {
            let mut guard = slot.write().unwrap_or_else(PoisonError::into_inner);
            if guard.state().is_resolved() {
                return false;
            }
            *guard = Slot::Failed;
        }
        self.resolved.fetch_add(1, Ordering::AcqRel);
        self.changed.notify_waiters();
        true
    }

    /// Loading -> Pending, for a fetch abandoned before it resolved. Any other state is left
    /// alone and `false` is returned.
    pub fn release(&self, index: u32) -> bool {
        let Some(slot) = self.slots.get(index as usize) else {
            return false;
        };
        {
            let mut guard = slot.write().unwrap_or_else(PoisonError::into_inner);
            if !matches!(*guard, Slot::Loading) {
                return false;
            }
            *guard = Slot::Pending;
        }
        self.changed.notify_waiters();
        true
    }

    /// Wait until slot `index` is not Loading and return its state. `None` when out of range.
    pub async fn settled(&self, index: u32) -> Option<FrameState> {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            match self.state(index)? {
                FrameState::Loading => notified.await,
                state => return Some(state),
            }
        }
    }

    /// Frames that reached Ready or Failed.
    pub fn resolved_count(&self) -> u32 {
        self.resolved.load(Ordering::Acquire)
    }

    pub fn ready_count(&self) -> u32 {
        self.ready.load(Ordering::Acquire)
    }

    /// `resolved / frame_count`, in `[0, 1]`.
    pub fn progress_fraction(&self) -> f64 {
        let total = self.frame_count();
        if total == 0 {
            return 1.0;
        }
        f64::from(self.resolved_count()) / f64::from(total)
    }

    pub fn is_complete(&self) -> bool {
        self.resolved_count() == self.frame_count()
    }

    /// Natural size of the lowest-index Ready frame. All frames of a sequence are expected to
    /// share it.
    pub fn natural_size(&self) -> Option<Size> {
        let natural = self.natural_size.read().unwrap_or_else(PoisonError::into_inner);
        natural.map(|(_, size)| size)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
