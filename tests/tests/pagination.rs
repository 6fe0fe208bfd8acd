//! Page arithmetic and the pagination summary returned alongside the rows.


use crate::common::*;
use anyhow::Result;

#[tokio::test]
async fn test_defaults() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[]).await?;

    assert_eq!(ids(&page), vec![5, 4, 3, 2, 1]);
    let summary = &page.pagination;
    assert_eq!((summary.page, summary.page_size, summary.total_rows, summary.total_pages), (1, 10, 5, 1));
    assert_eq!(summary.sort_column, "created_at");
    assert_eq!(summary.sort_order, SortDirection::Desc);
    assert!(summary.filters.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_page_window() -> Result<()> {
    let paginator = seeded().await?;

    let page = query(&paginator, &[("page", "2"), ("perPage", "2")]).await?;
    assert_eq!(ids(&page), vec![3, 2]);
    assert_eq!((page.pagination.total_rows, page.pagination.total_pages), (5, 3));

    let last = query(&paginator, &[("pageNumber", "3"), ("pageSize", "2")]).await?;
    assert_eq!(ids(&last), vec![1]);
    Ok(())
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("page", "9"), ("perPage", "2")]).await?;

    assert!(page.rows.is_empty());
    assert_eq!((page.pagination.page, page.pagination.total_rows, page.pagination.total_pages), (9, 5, 3));
    Ok(())
}

#[tokio::test]
async fn test_page_size_is_clamped() -> Result<()> {
    let paginator = seeded_with(PaginationConfig::default().with_max_page_size(3)).await?;
    let page = query(&paginator, &[("perPage", "5000")]).await?;

    assert_eq!(page.pagination.page_size, 3);
    assert_eq!(page.rows.len(), 3);
    assert_eq!(page.pagination.total_pages, 2);
    Ok(())
}

#[tokio::test]
async fn test_malformed_paging_falls_back_to_defaults() -> Result<()> {
    let paginator = seeded_with(PaginationConfig::default().with_default_page_size(4)).await?;
    let page = query(&paginator, &[("page", "abc"), ("perPage", "0")]).await?;

    assert_eq!((page.pagination.page, page.pagination.page_size), (1, 4));
    assert_eq!(ids(&page), vec![5, 4, 3, 2]);
    Ok(())
}

#[tokio::test]
async fn test_filtered_totals() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("filter", "status|A|$eq"), ("perPage", "2")]).await?;

    assert_eq!(ids(&page), vec![5, 2]);
    assert_eq!((page.pagination.total_rows, page.pagination.total_pages), (3, 2));
    Ok(())
}

#[tokio::test]
async fn test_summary_serializes_camel_case() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("filter", "status|A,B|$in"), ("sort", "name:asc")]).await?;

    let json = serde_json::to_value(&page.pagination)?;
    assert_eq!(
        json,
        serde_json::json!({
            "page": 1,
            "pageSize": 10,
            "sortColumn": "name",
            "sortOrder": "ASC",
            "filters": [{ "column": "status", "values": ["A", "B"] }],
            "totalRows": 4,
            "totalPages": 1,
        })
    );
    Ok(())
}
