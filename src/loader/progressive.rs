use std::{sync::Arc, time::Duration};

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::task::JoinHandle;

use crate::{
    assets::{
        decode::{DecodedFrame, decode_frame},
        source::FrameSource,
        store::{FrameState, FrameStore},
    },
    foundation::error::{ReelError, ReelResult},
    loader::batch::{BatchPolicy, plan_batches},
};

type ProgressFn = Box<dyn FnMut(f64) + Send>;
type CompleteFn = Box<dyn FnOnce() + Send>;

/// Outbound load reporting.
///
/// `on_progress(percent)` fires after every frame resolution with a non-decreasing value in
/// `0..=100`; `on_complete` fires once after the last frame resolved.
pub struct LoadCallbacks {
    on_progress: ProgressFn,
    on_complete: Option<CompleteFn>,
}

impl LoadCallbacks {
    pub fn new(
        on_progress: impl FnMut(f64) + Send + 'static,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            on_progress: Box::new(on_progress),
            on_complete: Some(Box::new(on_complete)),
        }
    }

    pub fn noop() -> Self {
        Self::new(|_| {}, || {})
    }

    /// Also notify a second pair of observers, which run before the existing ones.
    pub fn tee(
        self,
        mut on_progress: impl FnMut(f64) + Send + 'static,
        on_complete: impl FnOnce() + Send + 'static,
    ) -> Self {
        let mut inner_progress = self.on_progress;
        let inner_complete = self.on_complete;
        Self::new(
            move |p| {
                on_progress(p);
                inner_progress(p);
            },
            move || {
                on_complete();
                if let Some(f) = inner_complete {
                    f();
                }
            },
        )
    }

    fn progress(&mut self, percent: f64) {
        (self.on_progress)(percent);
    }

    fn complete(&mut self) {
        if let Some(f) = self.on_complete.take() {
            f();
        }
    }
}

impl std::fmt::Debug for LoadCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadCallbacks")
            .field("completed", &self.on_complete.is_none())
            .finish()
    }
}

/// One sequence to load and how to batch it.
#[derive(Clone, Debug)]
pub struct LoadJob {
    pub store: Arc<FrameStore>,
    pub policy: BatchPolicy,
}

impl LoadJob {
    pub fn new(store: Arc<FrameStore>, policy: BatchPolicy) -> Self {
        Self { store, policy }
    }
}

/// Summary of a finished load.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total: u32,
    pub ready: u32,
    pub failed: u32,
}

/// Fetches and decodes frames in priority batches.
///
/// The first batch of every job is small so the first paint happens quickly. Background
/// batches follow in fixed-size chunks with a short yield between them. Frames inside a batch
/// are fetched concurrently; batches run one after another. Loading is best-effort: a failed
/// frame is marked Failed and still counts toward progress.
#[derive(Clone)]
pub struct ProgressiveLoader {
    source: Arc<dyn FrameSource>,
}

impl std::fmt::Debug for ProgressiveLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressiveLoader")
            .field("source", &self.source.describe())
            .finish()
    }
}

impl ProgressiveLoader {
    pub fn new(source: Arc<dyn FrameSource>) -> Self {
        Self { source }
    }

    /// Start loading one sequence on the current tokio runtime. Never blocks.
    pub fn load(
        &self,
        store: Arc<FrameStore>,
        policy: BatchPolicy,
        callbacks: LoadCallbacks,
    ) -> LoadHandle {
        self.load_all(vec![LoadJob::new(store, policy)], callbacks)
    }

    /// Start loading several sequences, in the given priority order. Never blocks.
    pub fn load_all(&self, jobs: Vec<LoadJob>, callbacks: LoadCallbacks) -> LoadHandle {
        let this = self.clone();
        let task = tokio::spawn(async move { this.run(jobs, callbacks).await });
        LoadHandle { task }
    }

    /// Load body. Resolves once every frame of every job reached Ready or Failed.
    ///
    /// Frames another load already has in flight are awaited rather than fetched twice, so
    /// completion is only reported once every store is complete.
    #[tracing::instrument(skip_all, fields(source = %self.source.describe(), jobs = jobs.len()))]
    pub async fn run(&self, jobs: Vec<LoadJob>, mut callbacks: LoadCallbacks) -> LoadReport {
        let total: u64 = jobs.iter().map(|j| u64::from(j.store.frame_count())).sum();
        let resolved_now =
            || -> u64 { jobs.iter().map(|j| u64::from(j.store.resolved_count())).sum() };
        let mut resolved = resolved_now();
        let mut reported_full = false;
        let mut first_batch = true;

        for job in &jobs {
            let store: &FrameStore = &job.store;
            for batch in plan_batches(store.frame_count(), &job.policy) {
                if !first_batch && !job.policy.batch_delay.is_zero() {
                    tokio::time::sleep(job.policy.batch_delay).await;
                }
                first_batch = false;

                let mut in_flight: FuturesUnordered<_> = batch
                    .clone()
                    .map(|index| self.settle(store, index, job.policy.fetch_timeout))
                    .collect();
                while in_flight.next().await.is_some() {
                    let now = resolved_now();
                    if now <= resolved || reported_full {
                        continue;
                    }
                    resolved = now;
                    let percent = if resolved >= total {
                        reported_full = true;
                        100.0
                    } else {
                        (resolved as f64) * 100.0 / (total as f64)
                    };
                    callbacks.progress(percent);
                }
                tracing::debug!(
                    sequence = store.id(),
                    start = batch.start,
                    end = batch.end,
                    resolved = store.resolved_count(),
                    "batch resolved"
                );
            }
        }

        if !reported_full && jobs.iter().all(|j| j.store.is_complete()) {
            callbacks.progress(100.0);
        }

        let report = LoadReport {
            total: total as u32,
            ready: jobs.iter().map(|j| j.store.ready_count()).sum(),
            failed: jobs
                .iter()
                .map(|j| j.store.resolved_count() - j.store.ready_count())
                .sum(),
        };
        tracing::info!(
            total = report.total,
            ready = report.ready,
            failed = report.failed,
            "frame load complete"
        );
        callbacks.complete();
        report
    }

    /// Drive slot `index` to Ready or Failed: fetch it when it is Pending, otherwise wait for
    /// whoever holds it. A slot given back by an abandoned load is claimed again.
    async fn settle(&self, store: &FrameStore, index: u32, timeout: Duration) {
        loop {
            if store.mark_loading(index) {
                let _claim = Claim { store, index };
                let path = store.path_for(index);
                match self.fetch_decode(&path, timeout).await {
                    Ok(frame) => {
                        store.mark_ready(index, frame);
                    }
                    Err(err) => {
                        tracing::warn!(
                            sequence = store.id(),
                            index,
                            %path,
                            error = %err,
                            "frame failed to load"
                        );
                        store.mark_failed(index);
                    }
                }
                return;
            }
            match store.settled(index).await {
                Some(FrameState::Pending) => continue,
                _ => return,
            }
        }
    }

    async fn fetch_decode(&self, path: &str, timeout: Duration) -> ReelResult<DecodedFrame> {
        let bytes = tokio::time::timeout(timeout, self.source.fetch(path))
            .await
            .map_err(|_| ReelError::asset(format!("fetch '{path}' timed out after {timeout:?}")))??;
        tokio::task::spawn_blocking(move || decode_frame(&bytes))
            .await
            .map_err(|e| ReelError::asset(format!("decode task for '{path}' failed: {e}")))?
    }
}

/// Puts a claimed slot back to Pending if its fetch is dropped before resolving.
struct Claim<'a> {
    store: &'a FrameStore,
    index: u32,
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        self.store.release(self.index);
    }
}

/// Handle to a spawned load.
///
/// Dropping the handle detaches the task: in-flight frames finish against their
/// `Arc<FrameStore>` and the results are simply unused. [`abort`](Self::abort) cancels it and
/// returns frames it had in flight to Pending, so a later load picks them up.
#[derive(Debug)]
pub struct LoadHandle {
    task: JoinHandle<LoadReport>,
}

impl LoadHandle {
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn abort(&self) {
        self.task.abort();
    }

    pub async fn wait(self) -> ReelResult<LoadReport> {
        self.task
            .await
            .map_err(|e| ReelError::asset(format!("load task ended abnormally: {e}")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/loader/progressive.rs"]
mod tests;
