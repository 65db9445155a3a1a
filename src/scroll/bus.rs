use tokio::sync::watch;

/// Latest document scroll state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollSample {
    /// Vertical scroll offset of the document, in pixels.
    pub offset: f64,
    /// Viewport height, in pixels.
    pub viewport_height: f64,
}

/// Publisher of the page's scroll position.
///
/// One bus is created per page and handed to every consumer explicitly. Consumers hold a
/// [`ScrollListener`]; dropping it releases the subscription.
#[derive(Debug)]
pub struct ScrollBus {
    tx: watch::Sender<ScrollSample>,
}

impl ScrollBus {
    pub fn new(viewport_height: f64) -> Self {
        let (tx, _rx) = watch::channel(ScrollSample {
            offset: 0.0,
            viewport_height,
        });
        Self { tx }
    }

    pub fn publish_offset(&self, offset: f64) {
        if !offset.is_finite() {
            return;
        }
        self.tx.send_if_modified(|s| {
            if s.offset == offset {
                return false;
            }
            s.offset = offset;
            true
        });
    }

    /// Viewport resize. Non-positive or non-finite heights (mid-layout reads) are ignored.
    pub fn resize(&self, viewport_height: f64) {
        if !viewport_height.is_finite() || viewport_height <= 0.0 {
            return;
        }
        self.tx.send_if_modified(|s| {
            if s.viewport_height == viewport_height {
                return false;
            }
            s.viewport_height = viewport_height;
            true
        });
    }

    pub fn current(&self) -> ScrollSample {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> ScrollListener {
        ScrollListener {
            rx: self.tx.subscribe(),
        }
    }

    /// Live listeners; returns to its previous value when a listener is dropped.
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Scoped subscription to a [`ScrollBus`].
#[derive(Debug)]
pub struct ScrollListener {
    rx: watch::Receiver<ScrollSample>,
}

impl ScrollListener {
    /// Most recent sample and whether it changed since the previous call.
    pub fn latest(&mut self) -> (ScrollSample, bool) {
        let changed = self.rx.has_changed().unwrap_or(false);
        (*self.rx.borrow_and_update(), changed)
    }

    /// Wait for the next publish. Returns `false` once the bus is gone.
    pub async fn changed(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scroll/bus.rs"]
mod tests;
