use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use actions::bail;
use actions::concurrency::stop::{StopRx, StopTx, create_stop_channel};
use actions::error::{ActionsError, ActionsResult, ErrorKind};
use actions::pipeline::{Pipeline, PipelineStats};

/// Controls how a [`TestPipeline`]'s run loop behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunBehavior {
    /// Run until a stop is requested, then exit cleanly.
    RunUntilStopped,
    /// Fail immediately with a source error, simulating a crashed run loop.
    FailImmediately,
    /// Never exit, ignoring stop requests.
    IgnoreStop,
    /// Panic inside the run loop, simulating a defective pipeline.
    PanicInRun,
}

/// Pipeline used for testing supervisor lifecycles.
///
/// Tracks whether the run loop is currently executing and how many times
/// `stop` was invoked.
pub struct TestPipeline {
    name: String,
    behavior: RunBehavior,
    stop_tx: StopTx,
    stop_rx: StopRx,
    running: Arc<AtomicBool>,
    stop_count: Arc<AtomicU64>,
}

impl TestPipeline {
    pub fn new(name: &str) -> Self {
        Self::with_behavior(name, RunBehavior::RunUntilStopped)
    }

    pub fn with_behavior(name: &str, behavior: RunBehavior) -> Self {
        let (stop_tx, stop_rx) = create_stop_channel();

        Self {
            name: name.to_string(),
            behavior,
            stop_tx,
            stop_rx,
            running: Arc::new(AtomicBool::new(false)),
            stop_count: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns a handle observing whether the run loop is executing.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Returns a handle observing the number of `stop` invocations.
    pub fn stop_count(&self) -> Arc<AtomicU64> {
        self.stop_count.clone()
    }
}

#[async_trait]
impl Pipeline for TestPipeline {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self) -> ActionsResult<()> {
        match self.behavior {
            RunBehavior::FailImmediately => {
                bail!(
                    ErrorKind::SourceError,
                    "Test pipeline failed on purpose",
                    self.name
                );
            }
            RunBehavior::PanicInRun => {
                panic!("test pipeline panicked on purpose");
            }
            RunBehavior::IgnoreStop => {
                self.running.store(true, Ordering::SeqCst);
                std::future::pending::<()>().await;
                Ok(())
            }
            RunBehavior::RunUntilStopped => {
                self.running.store(true, Ordering::SeqCst);
                self.stop_rx.clone().stopped().await;
                self.running.store(false, Ordering::SeqCst);
                Ok(())
            }
        }
    }

    async fn stop(&self) -> ActionsResult<()> {
        self.stop_count.fetch_add(1, Ordering::SeqCst);
        let _ = self.stop_tx.stop();
        Ok(())
    }

    fn stats(&self) -> PipelineStats {
        PipelineStats::default()
    }
}
