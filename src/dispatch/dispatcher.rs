use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use rayon::prelude::*;

use crate::effects::transitions::TransitionRegistry;
use crate::foundation::error::{StrataError, StrataResult};
use crate::foundation::time::MediaTime;
use crate::layout::plan::{CompositionPlan, LeafKind};

use super::context::{BlendJob, FrameJob, RenderContext, RequestOutcome, SourceSample};

/// Options controlling batch dispatch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchOpts {
    /// Resolve batches on a dedicated rayon pool.
    pub parallel: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
    /// Requests resolved per parallel chunk.
    pub chunk_size: usize,
}

impl Default for DispatchOpts {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            chunk_size: 64,
        }
    }
}

/// Shared cancellation switch. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Turns timeline instants into frame jobs against the current plan.
///
/// Requests read an `Arc` snapshot of the context, so a concurrent [`Dispatcher::swap_plan`]
/// never changes the plan under a request that already started.
pub struct Dispatcher {
    context: RwLock<Arc<RenderContext>>,
    cancel: CancelHandle,
    opts: DispatchOpts,
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("generation", &self.context().generation)
            .field("cancelled", &self.cancel.is_cancelled())
            .field("opts", &self.opts)
            .finish()
    }
}

impl Dispatcher {
    pub fn new(
        plan: CompositionPlan,
        registry: TransitionRegistry,
        opts: DispatchOpts,
    ) -> StrataResult<Self> {
        let pool = if opts.parallel {
            Some(build_thread_pool(opts.threads)?)
        } else {
            None
        };
        Ok(Self {
            context: RwLock::new(Arc::new(RenderContext::new(plan, registry))),
            cancel: CancelHandle::default(),
            opts,
            pool,
        })
    }

    /// Current snapshot.
    pub fn context(&self) -> Arc<RenderContext> {
        self.context
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Install a new plan and return its generation. In-flight requests finish on the
    /// snapshot they started with.
    pub fn swap_plan(&self, plan: CompositionPlan) -> u64 {
        let mut guard = self.context.write().unwrap_or_else(PoisonError::into_inner);
        let generation = guard.generation + 1;
        *guard = Arc::new(RenderContext {
            plan: Arc::new(plan),
            registry: guard.registry.clone(),
            generation,
        });
        tracing::debug!(generation, "plan swapped");
        generation
    }

    /// Make every in-flight and future request complete as cancelled.
    pub fn cancel_all(&self) {
        tracing::debug!("cancelling all requests");
        self.cancel.cancel();
    }

    /// Clear the cancellation flag.
    pub fn resume(&self) {
        self.cancel.flag.store(false, Ordering::SeqCst);
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Resolve a single instant.
    ///
    /// Unknown transition effects are an error; gaps and instants outside the timeline
    /// resolve to [`RequestOutcome::Empty`].
    pub fn resolve(&self, time: MediaTime) -> StrataResult<RequestOutcome> {
        if self.cancel.is_cancelled() {
            return Ok(RequestOutcome::Cancelled { time });
        }

        let ctx = self.context();
        let plan = &ctx.plan;
        let Some(index) = plan.instruction_index_at(time) else {
            return Ok(RequestOutcome::Empty { time });
        };
        let instruction = &plan.instructions[index];
        if instruction.is_empty() {
            return Ok(RequestOutcome::Empty { time });
        }

        let blank = plan.tracks.blank.map(|b| b.track);
        let mut sources = Vec::with_capacity(instruction.layers.len());
        for &id in instruction.layers.iter().rev() {
            let layer = plan.layer(id).ok_or_else(|| {
                StrataError::dispatch(format!("instruction references unknown layer {}", id.0))
            })?;
            let track = match layer.kind {
                LeafKind::Image => blank,
                _ => plan.tracks.video_track_of(id),
            };
            sources.push(SourceSample {
                layer: id,
                track,
                local_time: layer.local_time(time),
            });
        }

        let blend = if instruction.is_transition {
            let (Some(foreground), Some(background)) =
                (instruction.foreground_track, instruction.background_track)
            else {
                return Err(StrataError::dispatch(
                    "transition instruction has no track pair",
                ));
            };
            Some(BlendJob {
                kind: ctx.registry.resolve(&instruction.transition)?,
                transition: instruction.transition.clone(),
                progress: instruction.progress_at(time),
                foreground,
                background,
            })
        } else {
            None
        };

        if self.cancel.is_cancelled() {
            return Ok(RequestOutcome::Cancelled { time });
        }

        Ok(RequestOutcome::Frame(FrameJob {
            time,
            generation: ctx.generation,
            instruction: index,
            sources,
            blend,
        }))
    }

    /// Resolve a batch. Output order matches `times`.
    #[tracing::instrument(
        skip(self, times),
        fields(requests = times.len(), parallel = self.pool.is_some())
    )]
    pub fn dispatch(&self, times: &[MediaTime]) -> StrataResult<Vec<RequestOutcome>> {
        let Some(pool) = &self.pool else {
            return times.iter().map(|&t| self.resolve(t)).collect();
        };

        let chunk_size = self.opts.chunk_size.max(1);
        let mut out = Vec::with_capacity(times.len());
        for chunk in times.chunks(chunk_size) {
            let resolved = pool.install(|| {
                chunk
                    .par_iter()
                    .map(|&t| self.resolve(t))
                    .collect::<Vec<_>>()
            });
            for r in resolved {
                out.push(r?);
            }
        }
        Ok(out)
    }
}

fn build_thread_pool(threads: Option<usize>) -> StrataResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(StrataError::validation(
            "dispatch 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| StrataError::dispatch(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/dispatcher.rs"]
mod tests;
