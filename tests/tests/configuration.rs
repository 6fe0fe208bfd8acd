//! Server-side schema mistakes surface as errors; nothing the caller sends does.


use crate::common::*;
use anyhow::Result;

struct BadComputed;

impl Entity for BadComputed {
    const TABLE: &'static str = "tasks";

    fn describe(schema: &mut SchemaBuilder) {
        schema.primary_key(["id"]).field("id", StorageKind::Int(64)).computed("shout", "upper(\"name\")", StorageKind::Text);
    }
}

/// Keyless view over tasks that still declares a relation.
struct TaskFeed;

impl Entity for TaskFeed {
    const TABLE: &'static str = "tasks";

    fn describe(schema: &mut SchemaBuilder) {
        schema.field("name", StorageKind::Text).field("project_id", StorageKind::Int(64)).field("created_at", StorageKind::Time).to_one::<Project>(
            "project",
            "project_id",
        );
    }
}

#[tokio::test]
async fn test_invalid_computed_field_is_reported() -> Result<()> {
    let paginator = seeded().await?;
    let request = paginator.config().parse([("filter", "id|1|$eq")]);
    let err = paginator.paginate::<BadComputed>(&request, &Blacklist::new(), &CancellationToken::new()).await.unwrap_err();

    assert!(err.is_configuration());
    assert!(matches!(err, PaginationError::Schema(_)));
    Ok(())
}

#[tokio::test]
async fn test_joined_projection_needs_primary_key() -> Result<()> {
    let paginator = seeded().await?;

    let request = paginator.config().parse([("fields", "name,project.name")]);
    let err = paginator.paginate::<TaskFeed>(&request, &Blacklist::new(), &CancellationToken::new()).await.unwrap_err();
    assert!(matches!(err, PaginationError::MissingPrimaryKey { .. }));

    // without joins the keyless entity pages normally
    let request = paginator.config().parse([("fields", "name"), ("filter", "project_id|2|$eq")]);
    let page = paginator.paginate::<TaskFeed>(&request, &Blacklist::new(), &CancellationToken::new()).await?;
    assert_eq!(page.pagination.total_rows, 2);
    assert_eq!(page.rows[0]["name"], serde_json::json!("Deploy"));
    Ok(())
}

#[tokio::test]
async fn test_hostile_input_never_errors() -> Result<()> {
    let paginator = seeded().await?;
    let params = [
        ("filter", "\"tasks\".\"id\"|1|$eq"),
        ("filter", "name) OR (1=1|x|$eq"),
        ("sort", "name; DROP TABLE tasks:asc"),
        ("fields", "*,id"),
        ("join", "project.owner.nope"),
        ("searchOperator", "$nope"),
        ("search", "x"),
        ("page", "-1"),
        ("perPage", "many"),
    ];
    let page = query(&paginator, &params).await?;
    assert_eq!(page.pagination.page, 1);
    Ok(())
}
