//! Field selection, automatic key columns and blacklists.


use crate::common::*;
use anyhow::Result;
use serde_json::json;

fn keys(row: &SqliteRow) -> Vec<&str> {
    let mut keys: Vec<&str> = row.keys().map(String::as_str).collect();
    keys.sort();
    keys
}

#[tokio::test]
async fn test_default_projection_selects_every_field() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("filter", "id|3|$eq")]).await?;

    assert_eq!(page.rows.len(), 1);
    let row = &page.rows[0];
    assert_eq!(
        keys(row),
        vec!["assignee_id", "created_at", "description", "done", "due_at", "id", "label", "name", "priority", "project_id", "status", "tags"]
    );
    assert_eq!(row["label"], json!("Fix bug / B"));
    assert_eq!(row["tags"], json!(r#"["backend","urgent"]"#));
    assert_eq!(row["done"], json!(0));
    Ok(())
}

#[tokio::test]
async fn test_requested_fields_only() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("fields", "name,priority,nope")]).await?;

    assert_eq!(page.rows.len(), 5);
    assert!(page.rows.iter().all(|row| keys(row) == vec!["name", "priority"]));
    assert_eq!(page.rows[0]["name"], json!("Plan sprint"));
    Ok(())
}

#[tokio::test]
async fn test_relation_fields_bring_key_columns() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("fields", "name,project.name")]).await?;

    assert_eq!(page.pagination.total_rows, 5);
    assert_eq!(keys(&page.rows[0]), vec!["assignee_id", "id", "name", "project.name", "project_id"]);
    assert_eq!(ids(&page), vec![5, 4, 3, 2, 1]);
    // left join keeps the task without a project
    assert_eq!(page.rows[0]["project.name"], serde_json::Value::Null);
    assert_eq!(page.rows[2]["project.name"], json!("Gemini"));
    Ok(())
}

#[tokio::test]
async fn test_explicit_join_counts_as_active() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("fields", "name"), ("join", "assignee")]).await?;

    assert_eq!(page.pagination.total_rows, 5);
    assert_eq!(keys(&page.rows[0]), vec!["assignee_id", "id", "name", "project_id"]);
    Ok(())
}

#[tokio::test]
async fn test_blacklisted_field() -> Result<()> {
    let paginator = seeded().await?;
    let blacklist = Blacklist::new().exclude_field("description");
    let page = query_as(&paginator, &[("filter", "description|parser")], &blacklist).await?;

    assert_eq!(page.pagination.total_rows, 5);
    assert!(page.pagination.filters.is_empty());
    assert!(page.rows.iter().all(|row| !row.contains_key("description")));
    Ok(())
}

#[tokio::test]
async fn test_nested_blacklist() -> Result<()> {
    let paginator = seeded().await?;
    let blacklist = Blacklist::new().with_child("project", Blacklist::new().exclude_field("secret").finalized());

    let page = query_as(&paginator, &[("fields", "project.secret,project.name"), ("filter", "project.secret|s1|$eq")], &blacklist).await?;
    assert_eq!(page.pagination.total_rows, 5);
    assert_eq!(keys(&page.rows[0]), vec!["assignee_id", "id", "project.name", "project_id"]);

    // a finalized child allows its own fields but no further relations
    let page = query_as(&paginator, &[("filter", "project.owner.name|Grace|$eq")], &blacklist).await?;
    assert_eq!(page.pagination.total_rows, 5);
    let page = query_as(&paginator, &[("filter", "project.name|Apollo|$eq")], &blacklist).await?;
    assert_eq!(ids(&page), vec![2, 1]);
    Ok(())
}

#[tokio::test]
async fn test_nothing_selectable_keeps_statement_valid() -> Result<()> {
    let paginator = seeded().await?;
    let blacklist = Blacklist::new().exclude_relation("project");
    let page = query_as(&paginator, &[("fields", "project.name")], &blacklist).await?;

    assert_eq!(page.rows.len(), 5);
    assert!(page.rows.iter().all(|row| !row.contains_key("project.name")));
    Ok(())
}
