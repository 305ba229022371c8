use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error};

use crate::actions_error;
use crate::error::{ActionsError, ActionsResult, ErrorKind};
use crate::pipeline::Pipeline;

/// The concurrent execution unit driving one pipeline's run loop.
///
/// Starting a worker spawns a dedicated task that invokes
/// [`Pipeline::run`] to completion. A failing run is logged and followed by a
/// best-effort [`Pipeline::stop`] to release resources; the worker then exits
/// without touching the supervisor's bookkeeping, so the record for a crashed
/// pipeline stays in place until it is explicitly terminated.
pub struct PipelineWorker {
    pipeline: Arc<dyn Pipeline>,
}

impl PipelineWorker {
    pub fn new(pipeline: Arc<dyn Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Spawns the worker task and returns a handle to await its termination.
    pub fn start(self) -> PipelineWorkerHandle {
        let pipeline = self.pipeline;
        let name = pipeline.name().to_string();

        let worker_span = tracing::info_span!("pipeline_worker", pipeline = %name);
        let worker = async move {
            if let Err(err) = pipeline.run().await {
                error!("pipeline '{}' failed while running: {}", name, err);

                // Best-effort resource release. The supervisor record is not
                // removed here and must be terminated explicitly.
                if let Err(stop_err) = pipeline.stop().await {
                    error!(
                        "failed to stop pipeline '{}' after a run failure: {}",
                        name, stop_err
                    );
                }
            }

            debug!("worker for pipeline '{}' has terminated", name);
        }
        .instrument(worker_span);

        PipelineWorkerHandle {
            handle: Some(tokio::spawn(worker)),
        }
    }
}

/// Handle to a running pipeline worker.
#[derive(Debug)]
pub struct PipelineWorkerHandle {
    handle: Option<JoinHandle<()>>,
}

impl PipelineWorkerHandle {
    /// Waits for the worker task to exit, bounded by `timeout`.
    ///
    /// An elapsed timeout fails with [`ErrorKind::TerminationTimeout`] and
    /// leaves the handle intact, so a later call can retry the join. A panicked
    /// worker fails with [`ErrorKind::WorkerPanic`]. Waiting on an already
    /// joined handle returns immediately.
    pub async fn wait(&mut self, timeout: Duration) -> ActionsResult<()> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(());
        };

        match tokio::time::timeout(timeout, &mut *handle).await {
            Err(_elapsed) => Err(actions_error!(
                ErrorKind::TerminationTimeout,
                "Timed out waiting for the pipeline worker to exit",
                format!("timeout: {timeout:?}")
            )),
            Ok(join_result) => {
                self.handle = None;
                join_result.map_err(|err| {
                    actions_error!(ErrorKind::WorkerPanic, "Pipeline worker panicked", err)
                })?;

                Ok(())
            }
        }
    }

    /// Returns true if the worker task has exited.
    ///
    /// This says nothing about whether the run loop succeeded or failed.
    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(true)
    }
}
