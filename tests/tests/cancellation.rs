//! Cancellation and timeouts stop the statement running on the connection.


use crate::common::*;
use anyhow::Result;
use std::time::Duration;

/// The fixture's task table seen through a deliberately expensive computed column.
struct SlowTask;

impl Entity for SlowTask {
    const TABLE: &'static str = "tasks";

    fn describe(schema: &mut SchemaBuilder) {
        schema.primary_key(["id"]).field("id", StorageKind::Int(64)).field("created_at", StorageKind::Time).computed(
            "spin",
            "(WITH RECURSIVE n(x) AS (SELECT 1 UNION ALL SELECT x + 1 FROM n WHERE x < 500000000) SELECT COUNT(*) FROM n) + {table}.\"id\"",
            StorageKind::Int(64),
        );
    }
}

fn slow_request(paginator: &Paginator<SqliteExecutor>) -> sieve::PaginationRequest { paginator.config().parse([("filter", "spin|0|$gt")]) }

#[tokio::test]
async fn test_cancelled_before_start() -> Result<()> {
    let paginator = seeded().await?;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let request = paginator.config().parse([("filter", "status|A|$eq")]);
    let err = paginator.paginate::<Task>(&request, &Blacklist::new(), &cancel).await.unwrap_err();
    assert!(matches!(err, PaginationError::Cancelled));
    assert!(!err.is_configuration());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cancel_interrupts_running_query() -> Result<()> {
    let paginator = seeded().await?;
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            cancel.cancel();
        });
    }

    let err = paginator.paginate::<SlowTask>(&slow_request(&paginator), &Blacklist::new(), &cancel).await.unwrap_err();
    assert!(matches!(err, PaginationError::Cancelled));

    // the single pooled connection is usable again once the statement has been interrupted
    let page = tokio::time::timeout(Duration::from_secs(10), query(&paginator, &[])).await??;
    assert_eq!(page.pagination.total_rows, 5);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_query_timeout() -> Result<()> {
    let paginator = seeded_with(PaginationConfig::default().with_query_timeout(Duration::from_millis(250))).await?;

    let err = paginator.paginate::<SlowTask>(&slow_request(&paginator), &Blacklist::new(), &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, PaginationError::Timeout));

    let page = tokio::time::timeout(Duration::from_secs(10), query(&paginator, &[("filter", "done|true|$eq")])).await??;
    assert_eq!(ids(&page), vec![4, 1]);
    Ok(())
}
