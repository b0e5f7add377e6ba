use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::effects::noise::NoiseSeed;
use crate::encode::sink::SinkFactory;
use crate::media::store::FrameStore;
use crate::pipeline::config::VariantDescriptor;
use crate::render::cancel::CancelToken;
use crate::render::renderer::{RenderReport, panic_message, render_variant};

/// Signals completion of one unit when dropped, including by unwinding.
struct DoneSignal {
    idx: usize,
    tx: mpsc::Sender<usize>,
}

impl Drop for DoneSignal {
    fn drop(&mut self) {
        let _ = self.tx.send(self.idx);
    }
}

enum Wait {
    Finished(usize),
    TimedOut,
    Closed,
}

fn wait_next(rx: &mpsc::Receiver<usize>, deadline: Option<Duration>, started: Instant) -> Wait {
    let Some(limit) = deadline else {
        return rx.recv().map_or(Wait::Closed, Wait::Finished);
    };
    let Some(left) = limit.checked_sub(started.elapsed()) else {
        return Wait::TimedOut;
    };
    match rx.recv_timeout(left) {
        Ok(idx) => Wait::Finished(idx),
        Err(mpsc::RecvTimeoutError::Timeout) => Wait::TimedOut,
        Err(mpsc::RecvTimeoutError::Disconnected) => Wait::Closed,
    }
}

/// Run `work` once per unit, all units concurrently on scoped threads.
///
/// Every unit is spawned before the coordinator waits on any of them, and the call returns only
/// after all units have terminated. With a `deadline`, the shared `cancel` token is raised once it
/// expires and the coordinator then joins every unit. Results come back in `units` order; a unit
/// that panicked yields `Err` with the panic message.
pub fn fan_out<U, R, F>(
    units: &[U],
    deadline: Option<Duration>,
    cancel: &CancelToken,
    work: F,
) -> Vec<Result<R, String>>
where
    U: Sync,
    R: Send,
    F: Fn(&U, &CancelToken) -> R + Sync,
{
    let started = Instant::now();
    std::thread::scope(|scope| {
        let (tx, rx) = mpsc::channel::<usize>();
        let work = &work;

        let handles: Vec<_> = units
            .iter()
            .enumerate()
            .map(|(idx, unit)| {
                let signal = DoneSignal {
                    idx,
                    tx: tx.clone(),
                };
                let cancel = cancel.clone();
                scope.spawn(move || {
                    let _signal = signal;
                    work(unit, &cancel)
                })
            })
            .collect();
        drop(tx);

        let mut pending = handles.len();
        while pending > 0 {
            match wait_next(&rx, deadline, started) {
                Wait::Finished(idx) => {
                    pending -= 1;
                    tracing::debug!(unit = idx, pending, "unit finished");
                }
                Wait::TimedOut => {
                    tracing::warn!(
                        pending,
                        deadline_secs = deadline.map(|d| d.as_secs_f64()),
                        "render deadline expired; cancelling remaining units"
                    );
                    cancel.cancel();
                    break;
                }
                Wait::Closed => break,
            }
        }

        handles
            .into_iter()
            .map(|h| h.join().map_err(|p| panic_message(p.as_ref())))
            .collect()
    })
}

/// Render every variant in parallel over one shared frame store.
///
/// Reports are returned in `variants` order.
pub fn render_all(
    store: Arc<FrameStore>,
    variants: &[VariantDescriptor],
    sinks: &dyn SinkFactory,
    seed: NoiseSeed,
    deadline: Option<Duration>,
    cancel: &CancelToken,
) -> Vec<RenderReport> {
    tracing::info!(
        variants = variants.len(),
        frames = store.len(),
        "starting parallel render"
    );
    let results = fan_out(variants, deadline, cancel, |variant, cancel| {
        let store = Arc::clone(&store);
        render_variant(&store, variant, sinks, seed, cancel)
    });

    results
        .into_iter()
        .zip(variants)
        .map(|(res, variant)| {
            res.unwrap_or_else(|reason| {
                RenderReport::failed(variant, format!("renderer panicked: {reason}"))
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/render/coordinator.rs"]
mod tests;
