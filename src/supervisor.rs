//! Pipeline lifecycle supervision.
//!
//! Contains the [`PipelineSupervisor`] that owns the set of currently running
//! pipelines, one worker task per pipeline, and the start/terminate control
//! surface consumed by an external controller.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::actions_error;
use crate::error::{ActionsError, ActionsResult, ErrorKind};
use crate::pipeline::Pipeline;
use crate::worker::{PipelineWorker, PipelineWorkerHandle};

/// Configuration for the supervisor's control operations.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Upper bound on how long a terminate call waits for the worker task to
    /// exit after the pipeline was asked to stop.
    pub terminate_timeout: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            terminate_timeout: Duration::from_secs(30),
        }
    }
}

/// Bookkeeping for one running pipeline.
///
/// Created by a successful start and destroyed only by a successful terminate.
/// Exclusively owned by the supervisor: the worker never mutates it. The
/// worker handle is taken out while a terminate is in flight, which keeps the
/// record (and thus the name reservation) in place without holding the map
/// lock across the stop and join.
struct PipelineRecord {
    name: String,
    pipeline: Arc<dyn Pipeline>,
    worker: Option<PipelineWorkerHandle>,
}

/// Owns the concurrent lifecycle of zero or more independently named pipelines.
///
/// One worker task runs per registered pipeline. Name uniqueness is guaranteed
/// by the record map, and every read-modify-write of that map happens under a
/// single mutex, so control operations may be invoked concurrently from
/// multiple tasks.
///
/// Per name, the lifecycle is `absent -> running (start) -> absent (terminate
/// success)`. A pipeline whose run loop fails leaves its worker dead but its
/// record in place: the name keeps rejecting new starts until an explicit
/// terminate confirms the worker is gone. There is no automatic reaping of
/// such orphaned records.
#[derive(Clone)]
pub struct PipelineSupervisor {
    config: SupervisorConfig,
    pipelines: Arc<Mutex<HashMap<String, PipelineRecord>>>,
}

impl PipelineSupervisor {
    /// Creates a supervisor with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SupervisorConfig::default())
    }

    /// Creates a supervisor with the given configuration.
    pub fn with_config(config: SupervisorConfig) -> Self {
        Self {
            config,
            pipelines: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Starts a new pipeline on a dedicated worker task.
    ///
    /// Fails with [`ErrorKind::PipelineAlreadyRunning`] when `name` is already
    /// registered. Otherwise the worker is spawned and a record is inserted
    /// under `pipeline.name()`, which is the binding key even when it diverges
    /// from the caller-supplied `name`. Returns without waiting for the
    /// pipeline to make progress.
    pub async fn start(&self, name: &str, pipeline: Arc<dyn Pipeline>) -> ActionsResult<()> {
        debug!("attempting to start pipeline with name '{}'", name);

        let mut pipelines = self.pipelines.lock().await;
        if pipelines.contains_key(name) {
            return Err(actions_error!(
                ErrorKind::PipelineAlreadyRunning,
                "A pipeline with this name is already running",
                name
            ));
        }

        let worker = PipelineWorker::new(pipeline.clone()).start();
        let record = PipelineRecord {
            name: pipeline.name().to_string(),
            pipeline,
            worker: Some(worker),
        };
        pipelines.insert(record.name.clone(), record);

        debug!("started pipeline with name '{}'", name);

        Ok(())
    }

    /// Terminates a running pipeline and removes its record.
    ///
    /// Fails with [`ErrorKind::PipelineNotFound`] when no record exists for
    /// `name` and with [`ErrorKind::InvalidState`] when another terminate for
    /// the same name is already in flight. Otherwise the pipeline is asked to
    /// stop cooperatively and the worker task is joined, bounded by the
    /// configured terminate timeout. The pipeline's final statistics are
    /// logged before the record is removed.
    ///
    /// The stop call and the join happen outside the record map lock, so an
    /// unresponsive pipeline never stalls other control operations. The record
    /// stays in the map for the whole duration, keeping the name reserved.
    ///
    /// When the stop call or the join fails the record is deliberately kept: a
    /// name must never be freed for reuse while its worker's termination is
    /// unconfirmed, otherwise a future start under the same name would race a
    /// still-alive worker. The failure is returned to the caller
    /// ([`ErrorKind::TerminationFailed`], [`ErrorKind::TerminationTimeout`], or
    /// [`ErrorKind::WorkerPanic`]).
    pub async fn terminate(&self, name: &str) -> ActionsResult<()> {
        debug!("attempting to terminate pipeline with name '{}'", name);

        let (pipeline, mut worker) = {
            let mut pipelines = self.pipelines.lock().await;
            let Some(record) = pipelines.get_mut(name) else {
                return Err(actions_error!(
                    ErrorKind::PipelineNotFound,
                    "No pipeline with this name is running",
                    name
                ));
            };

            let Some(worker) = record.worker.take() else {
                return Err(actions_error!(
                    ErrorKind::InvalidState,
                    "Termination of this pipeline is already in progress",
                    name
                ));
            };

            (record.pipeline.clone(), worker)
        };

        if let Err(err) = pipeline.stop().await {
            error!("failed to stop pipeline '{}': {}", name, err);
            self.restore_worker(name, worker).await;

            return Err(actions_error!(
                ErrorKind::TerminationFailed,
                "Failed to stop the pipeline",
                err
            ));
        }

        if let Err(err) = worker.wait(self.config.terminate_timeout).await {
            error!(
                "failed to confirm termination of pipeline '{}': {}",
                name, err
            );
            self.restore_worker(name, worker).await;

            return Err(err);
        }

        info!("pipeline with name '{}' has been stopped", name);
        pipeline.stats().pretty_print_summary(name);

        let mut pipelines = self.pipelines.lock().await;
        pipelines.remove(name);

        Ok(())
    }

    /// Puts a worker handle back into its record after a failed terminate.
    ///
    /// The record cannot have been removed in the meantime, since removal only
    /// happens in the terminate that took the handle.
    async fn restore_worker(&self, name: &str, worker: PipelineWorkerHandle) {
        let mut pipelines = self.pipelines.lock().await;
        if let Some(record) = pipelines.get_mut(name) {
            record.worker = Some(worker);
        }
    }

    /// Terminates all running pipelines.
    ///
    /// The set of names is snapshotted before iterating, then each pipeline is
    /// terminated sequentially. The first failure aborts the remaining
    /// sequence and propagates to the caller; already-terminated pipelines
    /// stay terminated.
    pub async fn terminate_all(&self) -> ActionsResult<()> {
        debug!("attempting to terminate all running pipelines");

        let names: Vec<String> = {
            let pipelines = self.pipelines.lock().await;
            pipelines.keys().cloned().collect()
        };

        for name in names {
            self.terminate(&name).await?;
        }

        debug!("successfully terminated all running pipelines");

        Ok(())
    }

    /// Returns a snapshot of the currently registered pipeline names.
    ///
    /// A name in this list means a record exists, not that the worker is still
    /// alive; a crashed pipeline stays listed until explicitly terminated.
    pub async fn running_pipelines(&self) -> Vec<String> {
        let pipelines = self.pipelines.lock().await;
        pipelines.keys().cloned().collect()
    }
}

impl Default for PipelineSupervisor {
    fn default() -> Self {
        Self::new()
    }
}
