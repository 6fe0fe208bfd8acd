
use crate::common::*;
use anyhow::Result;

#[tokio::test]
async fn test_search_across_default_fields() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("search", "parser")]).await?;

    assert_eq!(ids(&page), vec![3, 2]);
    // search terms are not echoed as filters
    assert!(page.pagination.filters.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_search_matches_array_elements() -> Result<()> {
    let paginator = seeded().await?;
    assert_eq!(ids(&query(&paginator, &[("search", "backend")]).await?), vec![3, 2]);
    Ok(())
}

#[tokio::test]
async fn test_search_fields_and_operator() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("search", "BUG"), ("searchFields", "name"), ("searchOperator", "$contL")]).await?;
    assert_eq!(ids(&page), vec![3]);

    let page = query(&paginator, &[("search", "Plan"), ("searchFields", "name,project.name"), ("searchOperator", "$starts")]).await?;
    assert_eq!(ids(&page), vec![5]);
    Ok(())
}

#[tokio::test]
async fn test_search_ands_with_filters() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("filter", "status|A|$eq"), ("search", "parser")]).await?;
    assert_eq!(ids(&page), vec![2]);
    Ok(())
}

#[tokio::test]
async fn test_search_respects_blacklist() -> Result<()> {
    let paginator = seeded().await?;
    let blacklist = Blacklist::new().exclude_field("description");
    let page = query_as(&paginator, &[("search", "parser")], &blacklist).await?;
    assert_eq!(page.pagination.total_rows, 0);
    Ok(())
}

#[tokio::test]
async fn test_search_without_usable_fields_imposes_nothing() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("search", "parser"), ("searchFields", "priority,nope")]).await?;
    assert_eq!(page.pagination.total_rows, 5);

    let page = query(&paginator, &[("search", "")]).await?;
    assert_eq!(page.pagination.total_rows, 5);
    Ok(())
}
