mod common;

use std::{sync::Arc, time::Duration};

use common::{ScriptedProvider, TIMEOUT, artist, login, pipeline_with};
use tokio_util::sync::CancellationToken;
use tunetrail::{
    Error,
    scheduler::{Scheduler, TickOutcome},
};

#[tokio::test]
async fn test_tick_skips_without_user() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(vec![artist("a1", 1, &[])])]));
    let pipeline = pipeline_with(provider.clone()).await;
    let scheduler = Scheduler::new(pipeline, Duration::from_secs(3600), CancellationToken::new());

    assert!(matches!(scheduler.tick().await, TickOutcome::Skipped));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_failed_tick_does_not_stop_the_next_one() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(vec![artist("a1", 80, &["rock"]), artist("a2", 70, &["pop"])]),
        Err(Error::Network("connection reset".into())),
        Ok(vec![artist("a2", 70, &["pop"]), artist("a1", 80, &["rock"])]),
    ]));
    let pipeline = pipeline_with(provider.clone()).await;
    login(pipeline.sessions(), "u1").await;
    let scheduler = Scheduler::new(
        Arc::clone(&pipeline),
        Duration::from_secs(3600),
        CancellationToken::new(),
    );

    assert!(matches!(scheduler.tick().await, TickOutcome::Completed(_)));
    let before = pipeline.store().list_user_ranks("u1").await.unwrap();

    assert!(matches!(
        scheduler.tick().await,
        TickOutcome::Failed(Error::Network(_))
    ));
    let after_failure = pipeline.store().list_user_ranks("u1").await.unwrap();
    assert_eq!(before, after_failure);

    match scheduler.tick().await {
        TickOutcome::Completed(summary) => assert_eq!(summary.artists[0].artist.id, "a2"),
        other => panic!("expected a completed tick, got {:?}", other),
    }
    assert_eq!(provider.calls(), 3);
}

#[tokio::test]
async fn test_run_keeps_ticking_until_cancelled() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Err(Error::Network("timeout".into())),
        Ok(vec![artist("a1", 80, &["rock"])]),
    ]));
    let pipeline = pipeline_with(provider.clone()).await;
    login(pipeline.sessions(), "u1").await;

    let shutdown = CancellationToken::new();
    let scheduler = Scheduler::new(
        Arc::clone(&pipeline),
        Duration::from_millis(20),
        shutdown.clone(),
    );
    let handle = tokio::spawn(scheduler.run());

    tokio::time::timeout(TIMEOUT, async {
        while provider.calls() < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("scheduler stopped ticking");

    shutdown.cancel();
    tokio::time::timeout(TIMEOUT, handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();

    let ranks = pipeline.store().list_user_ranks("u1").await.unwrap();
    assert_eq!(ranks.len(), 1);
}

#[tokio::test]
async fn test_cancel_interrupts_the_wait() {
    let provider = Arc::new(ScriptedProvider::default());
    let pipeline = pipeline_with(provider.clone()).await;
    let shutdown = CancellationToken::new();
    let scheduler = Scheduler::new(pipeline, Duration::from_secs(3600), shutdown.clone());

    let handle = tokio::spawn(scheduler.run());
    shutdown.cancel();

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();
    assert_eq!(provider.calls(), 0);
}
