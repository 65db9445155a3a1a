use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::compositor::Compositor;
use crate::render::surface::Surface;

/// Continuous per-frame driver of a [`Compositor`].
pub struct RenderLoop;

impl RenderLoop {
    /// Tick `compositor` at `fps` on a tokio task until the handle is stopped or dropped.
    ///
    /// On a multi-thread runtime each tick's raster runs under `block_in_place`, so other tasks
    /// move off the worker while it draws. A current-thread runtime ticks inline.
    pub fn spawn<S: Surface + 'static>(
        compositor: Compositor<S>,
        fps: Fps,
    ) -> RenderLoopHandle<S> {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let ticks = Arc::new(AtomicU64::new(0));
        let ticks_clone = Arc::clone(&ticks);
        let period = fps.frame_duration();
        let offload = matches!(Handle::current().runtime_flavor(), RuntimeFlavor::MultiThread);

        let task = tokio::spawn(async move {
            let mut compositor = compositor;
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut last = Instant::now();
            tracing::debug!(period_ms = period.as_secs_f64() * 1000.0, "render loop started");

            loop {
                if *stop_rx.borrow() {
                    break;
                }
                tokio::select! {
                    biased;
                    changed = stop_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        let now = Instant::now();
                        let dt = now.duration_since(last).as_secs_f64();
                        last = now;
                        let outcome = if offload {
                            tokio::task::block_in_place(|| compositor.tick(dt))
                        } else {
                            compositor.tick(dt)
                        };
                        if let Err(err) = outcome {
                            tracing::warn!(error = %err, "render tick failed");
                        }
                        ticks_clone.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }

            tracing::debug!("render loop stopped");
            compositor
        });

        RenderLoopHandle {
            stop_tx,
            task: Some(task),
            ticks,
        }
    }
}

/// Scoped handle to a running [`RenderLoop`].
///
/// Dropping the handle cancels the loop.
pub struct RenderLoopHandle<S> {
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<Compositor<S>>>,
    ticks: Arc<AtomicU64>,
}

impl<S> std::fmt::Debug for RenderLoopHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLoopHandle")
            .field("ticks", &self.ticks())
            .field("running", &self.is_running())
            .finish()
    }
}

impl<S> RenderLoopHandle<S> {
    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop ticking and hand back the compositor.
    pub async fn stop(mut self) -> ReelResult<Compositor<S>> {
        let _ = self.stop_tx.send(true);
        let task = self
            .task
            .take()
            .ok_or_else(|| ReelError::render("render loop already stopped"))?;
        task.await
            .map_err(|e| ReelError::render(format!("render loop ended abnormally: {e}")))
    }
}

impl<S> Drop for RenderLoopHandle<S> {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/render_loop.rs"]
mod tests;
