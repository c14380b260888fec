use super::*;

#[tokio::test]
async fn test_full_queue_holds_producer_back() {
    let mut config = test_config();
    config.dispatch.queue_capacity = 2;
    let (dispatcher, _executor) =
        create_test_dispatcher_with(config, Arc::new(RecordingExecutor::default())).await;
    stop_workers(&dispatcher).await;

    let producer = tokio::spawn({
        let dispatcher = dispatcher.clone();
        async move { dispatcher.submit(&sample_task(1), 3).await }
    });

    wait_until(|| dispatcher.queued() == 2, "queue to fill").await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!producer.is_finished(), "producer should be blocked");
    // Two queued plus the copy waiting for a slot
    assert_eq!(dispatcher.outstanding(), 3);

    // Closing the queue releases the blocked producer and retires everything
    let discarded = dispatcher.queue.close();
    assert_eq!(discarded.len(), 2);
    drop(discarded);

    let result = tokio::time::timeout(Duration::from_secs(1), producer)
        .await
        .expect("producer never released")
        .unwrap();
    assert!(matches!(result, Err(Error::ShuttingDown)));
    assert_eq!(dispatcher.outstanding(), 0);
}

#[tokio::test]
async fn test_more_tasks_than_queue_capacity_all_complete() {
    let mut config = test_config();
    config.dispatch.queue_capacity = 4;
    config.dispatch.worker_count = 2;
    let (dispatcher, executor) =
        create_test_dispatcher_with(config, Arc::new(RecordingExecutor::default())).await;

    dispatcher.submit(&sample_task(9), 50).await.unwrap();
    assert_eq!(dispatcher.wait().await, 50);
    assert_eq!(executor.executed().len(), 50);
}
