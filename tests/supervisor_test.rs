mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use actions::error::ErrorKind;
use actions::pipeline::Pipeline;
use actions::supervisor::{PipelineSupervisor, SupervisorConfig};

use crate::common::init_test_tracing;
use crate::common::pipeline::{RunBehavior, TestPipeline};

/// Yields until the given flag becomes true or the attempts run out.
async fn wait_for_flag(flag: &std::sync::atomic::AtomicBool) {
    for _ in 0..100 {
        if flag.load(Ordering::SeqCst) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("pipeline did not report running in time");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_start_is_single_flight_per_name() {
    init_test_tracing();
    let supervisor = PipelineSupervisor::new();

    let pipeline = Arc::new(TestPipeline::new("p"));
    supervisor.start("p", pipeline.clone()).await.unwrap();

    let err = supervisor
        .start("p", Arc::new(TestPipeline::new("p")))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PipelineAlreadyRunning);

    // Exactly one record exists for "p".
    assert_eq!(supervisor.running_pipelines().await, vec!["p".to_string()]);

    supervisor.terminate("p").await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_terminate_unknown_pipeline_leaves_registry_unchanged() {
    init_test_tracing();
    let supervisor = PipelineSupervisor::new();

    supervisor
        .start("known", Arc::new(TestPipeline::new("known")))
        .await
        .unwrap();

    let err = supervisor.terminate("missing").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PipelineNotFound);

    // The registry mapping is unchanged in size and contents.
    assert_eq!(
        supervisor.running_pipelines().await,
        vec!["known".to_string()]
    );

    supervisor.terminate("known").await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_terminate_all_stops_every_pipeline_once() {
    init_test_tracing();
    let supervisor = PipelineSupervisor::new();

    let pipelines = [
        Arc::new(TestPipeline::new("a")),
        Arc::new(TestPipeline::new("b")),
        Arc::new(TestPipeline::new("c")),
    ];
    let stop_counts: Vec<_> = pipelines.iter().map(|p| p.stop_count()).collect();

    for pipeline in &pipelines {
        supervisor
            .start(pipeline.name(), pipeline.clone())
            .await
            .unwrap();
    }
    assert_eq!(supervisor.running_pipelines().await.len(), 3);

    supervisor.terminate_all().await.unwrap();

    assert!(supervisor.running_pipelines().await.is_empty());
    for stop_count in stop_counts {
        assert_eq!(stop_count.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_crashed_pipeline_does_not_affect_siblings() {
    init_test_tracing();
    let supervisor = PipelineSupervisor::new();

    let crashing = Arc::new(TestPipeline::with_behavior("x", RunBehavior::FailImmediately));
    let healthy = Arc::new(TestPipeline::new("y"));
    let healthy_running = healthy.running_flag();

    supervisor.start("x", crashing.clone()).await.unwrap();
    supervisor.start("y", healthy.clone()).await.unwrap();

    wait_for_flag(&healthy_running).await;

    // Give the crashing worker time to fail and exit.
    tokio::time::sleep(Duration::from_millis(50)).await;

    // The sibling keeps running, and the crashed pipeline's record remains
    // registered until explicitly terminated.
    assert!(healthy_running.load(Ordering::SeqCst));
    let mut names = supervisor.running_pipelines().await;
    names.sort();
    assert_eq!(names, vec!["x".to_string(), "y".to_string()]);

    // The worker crash path already invoked stop once, best-effort.
    assert_eq!(crashing.stop_count().load(Ordering::SeqCst), 1);

    // Terminating the crashed pipeline succeeds quickly, its worker is gone.
    supervisor.terminate("x").await.unwrap();
    assert_eq!(supervisor.running_pipelines().await, vec!["y".to_string()]);

    supervisor.terminate("y").await.unwrap();
    assert!(supervisor.running_pipelines().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_crashed_pipeline_still_blocks_start_under_same_name() {
    init_test_tracing();
    let supervisor = PipelineSupervisor::new();

    let crashing = Arc::new(TestPipeline::with_behavior("x", RunBehavior::FailImmediately));
    supervisor.start("x", crashing).await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;

    // The record is orphaned but still present, so the name stays taken.
    let err = supervisor
        .start("x", Arc::new(TestPipeline::new("x")))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PipelineAlreadyRunning);

    supervisor.terminate("x").await.unwrap();

    // After an explicit terminate the name is free again.
    supervisor
        .start("x", Arc::new(TestPipeline::new("x")))
        .await
        .unwrap();
    supervisor.terminate("x").await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_terminate_times_out_on_unresponsive_pipeline_and_keeps_record() {
    init_test_tracing();
    let supervisor = PipelineSupervisor::with_config(SupervisorConfig {
        terminate_timeout: Duration::from_millis(100),
    });

    let stubborn = Arc::new(TestPipeline::with_behavior("stuck", RunBehavior::IgnoreStop));
    let running = stubborn.running_flag();
    supervisor.start("stuck", stubborn).await.unwrap();
    wait_for_flag(&running).await;

    let err = supervisor.terminate("stuck").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TerminationTimeout);

    // The record must not be dropped while the worker's termination is
    // unconfirmed.
    assert_eq!(
        supervisor.running_pipelines().await,
        vec!["stuck".to_string()]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_terminating_unresponsive_pipeline_does_not_stall_other_control_ops() {
    init_test_tracing();
    let supervisor = PipelineSupervisor::with_config(SupervisorConfig {
        terminate_timeout: Duration::from_secs(2),
    });

    let stubborn = Arc::new(TestPipeline::with_behavior("stuck", RunBehavior::IgnoreStop));
    let running = stubborn.running_flag();
    supervisor.start("stuck", stubborn).await.unwrap();
    wait_for_flag(&running).await;

    let terminating = {
        let supervisor = supervisor.clone();
        tokio::spawn(async move { supervisor.terminate("stuck").await })
    };

    // Let the terminate enter its bounded wait on the worker.
    tokio::time::sleep(Duration::from_millis(50)).await;

    // Control operations on other names proceed while the terminate is still
    // waiting out its two-second timeout.
    let started_at = std::time::Instant::now();
    supervisor
        .start("other", Arc::new(TestPipeline::new("other")))
        .await
        .unwrap();
    assert!(started_at.elapsed() < Duration::from_millis(500));

    // A second terminate of the same name is rejected while one is in flight.
    let err = supervisor.terminate("stuck").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidState);

    let err = terminating.await.unwrap().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TerminationTimeout);

    let mut names = supervisor.running_pipelines().await;
    names.sort();
    assert_eq!(names, vec!["other".to_string(), "stuck".to_string()]);

    supervisor.terminate("other").await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_terminate_all_aborts_on_first_failure() {
    init_test_tracing();
    let supervisor = PipelineSupervisor::with_config(SupervisorConfig {
        terminate_timeout: Duration::from_millis(100),
    });

    let healthy = [
        Arc::new(TestPipeline::new("a")),
        Arc::new(TestPipeline::new("b")),
    ];
    for pipeline in &healthy {
        supervisor
            .start(pipeline.name(), pipeline.clone())
            .await
            .unwrap();
    }

    let stubborn = Arc::new(TestPipeline::with_behavior("stuck", RunBehavior::IgnoreStop));
    let running = stubborn.running_flag();
    supervisor.start("stuck", stubborn).await.unwrap();
    wait_for_flag(&running).await;

    let err = supervisor.terminate_all().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TerminationTimeout);

    // The record whose termination could not be confirmed is retained.
    let names = supervisor.running_pipelines().await;
    assert!(names.contains(&"stuck".to_string()));

    // The first failure aborts the sequence: every healthy pipeline was
    // either fully terminated before the failure or never reached at all,
    // never left half-terminated.
    for pipeline in &healthy {
        let stopped = pipeline.stop_count().load(Ordering::SeqCst);
        let present = names.contains(&pipeline.name().to_string());
        assert!(
            (stopped == 1 && !present) || (stopped == 0 && present),
            "pipeline '{}': stop_count={stopped}, present={present}",
            pipeline.name()
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_panicking_pipeline_surfaces_worker_panic_on_terminate() {
    init_test_tracing();
    let supervisor = PipelineSupervisor::new();

    let panicking = Arc::new(TestPipeline::with_behavior("p", RunBehavior::PanicInRun));
    supervisor.start("p", panicking).await.unwrap();

    let err = supervisor.terminate("p").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::WorkerPanic);

    // The record survives the failed terminate. Once the panic has been
    // observed the worker is confirmed gone, so a second terminate succeeds.
    assert_eq!(supervisor.running_pipelines().await, vec!["p".to_string()]);
    supervisor.terminate("p").await.unwrap();
    assert!(supervisor.running_pipelines().await.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_record_is_keyed_by_the_pipeline_name() {
    init_test_tracing();
    let supervisor = PipelineSupervisor::new();

    // The caller-supplied name and the pipeline's own name diverge; the
    // pipeline's name wins as the binding key.
    supervisor
        .start("caller-name", Arc::new(TestPipeline::new("actual-name")))
        .await
        .unwrap();

    assert_eq!(
        supervisor.running_pipelines().await,
        vec!["actual-name".to_string()]
    );

    let err = supervisor.terminate("caller-name").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PipelineNotFound);

    supervisor.terminate("actual-name").await.unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_starts_admit_exactly_one() {
    init_test_tracing();
    let supervisor = PipelineSupervisor::new();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let supervisor = supervisor.clone();
        handles.push(tokio::spawn(async move {
            supervisor
                .start("contended", Arc::new(TestPipeline::new("contended")))
                .await
        }));
    }

    let mut started = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            started += 1;
        }
    }

    assert_eq!(started, 1);
    assert_eq!(
        supervisor.running_pipelines().await,
        vec!["contended".to_string()]
    );

    supervisor.terminate("contended").await.unwrap();
}
