
use crate::common::*;
use anyhow::Result;

#[tokio::test]
async fn test_sort_column_and_order() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("sortColumn", "name"), ("sortOrder", "asc")]).await?;

    assert_eq!(ids(&page), vec![4, 3, 5, 2, 1]);
    assert_eq!(page.pagination.sort_column, "name");
    assert_eq!(page.pagination.sort_order, SortDirection::Asc);
    Ok(())
}

#[tokio::test]
async fn test_multiple_sort_keys() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("sort", "priority:asc,id:desc")]).await?;
    assert_eq!(ids(&page), vec![1, 5, 2, 3, 4]);
    assert_eq!((page.pagination.sort_column.as_str(), page.pagination.sort_order), ("priority", SortDirection::Asc));
    Ok(())
}

#[tokio::test]
async fn test_sort_by_relation_field() -> Result<()> {
    let paginator = seeded().await?;
    // SQLite orders NULLs first ascending
    let page = query(&paginator, &[("sort", "project.name:asc,id:asc")]).await?;
    assert_eq!(ids(&page), vec![5, 1, 2, 3, 4]);
    Ok(())
}

#[tokio::test]
async fn test_unknown_sort_keys_are_skipped() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("sort", "nope:asc,comments.body,createdAt:asc")]).await?;
    assert_eq!(ids(&page), vec![1, 2, 3, 4, 5]);
    assert_eq!((page.pagination.sort_column.as_str(), page.pagination.sort_order), ("created_at", SortDirection::Asc));
    Ok(())
}

#[tokio::test]
async fn test_unresolvable_sort_falls_back_to_default() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("sortColumn", "nope")]).await?;
    assert_eq!(ids(&page), vec![5, 4, 3, 2, 1]);
    assert_eq!((page.pagination.sort_column.as_str(), page.pagination.sort_order), ("created_at", SortDirection::Desc));

    let page = query(&paginator, &[("sort", "comments.body:asc"), ("sortOrder", "asc")]).await?;
    assert_eq!(ids(&page), vec![1, 2, 3, 4, 5]);
    assert_eq!(page.pagination.sort_column, "created_at");
    Ok(())
}

#[tokio::test]
async fn test_configured_default_sort() -> Result<()> {
    let paginator = seeded_with(PaginationConfig::default().with_default_sort("priority", SortDirection::Desc)).await?;
    let page = query(&paginator, &[("perPage", "2")]).await?;
    assert_eq!(ids(&page), vec![4, 3]);
    assert_eq!(page.pagination.sort_column, "priority");
    Ok(())
}

#[tokio::test]
async fn test_blacklisted_sort_is_ignored() -> Result<()> {
    let paginator = seeded().await?;
    let blacklist = Blacklist::new().exclude_field("name");
    let page = query_as(&paginator, &[("sort", "name:asc,id:asc")], &blacklist).await?;
    assert_eq!(ids(&page), vec![1, 2, 3, 4, 5]);
    assert_eq!(page.pagination.sort_column, "id");
    Ok(())
}
