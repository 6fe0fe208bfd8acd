//! Filter clauses end to end: parsing, type coercion, operators and grouping against SQLite.


use crate::common::*;
use anyhow::Result;

async fn filtered(params: &[(&str, &str)]) -> Result<Vec<i64>> {
    let paginator = seeded().await?;
    Ok(ids(&query(&paginator, params).await?))
}

#[tokio::test]
async fn test_equality_and_membership() -> Result<()> {
    assert_eq!(filtered(&[("filter", "status|A,B|$in")]).await?, vec![5, 3, 2, 1]);
    assert_eq!(filtered(&[("filter", "status|A,B|$notin")]).await?, vec![4]);
    assert_eq!(filtered(&[("filter", "status|A|$ne")]).await?, vec![4, 3]);
    assert_eq!(filtered(&[("filter", "priority|2")]).await?, vec![5, 2]);
    assert_eq!(filtered(&[("filter", "done|true|$eq")]).await?, vec![4, 1]);
    assert_eq!(filtered(&[("filter", "name|deploy|$eqL")]).await?, vec![4]);
    assert_eq!(filtered(&[("filter", "status|a,c|$inL")]).await?, vec![5, 4, 2, 1]);
    Ok(())
}

#[tokio::test]
async fn test_substring_operators() -> Result<()> {
    // text fields fall back to $cont
    assert_eq!(filtered(&[("filter", "description|parser")]).await?, vec![3, 2]);
    assert_eq!(filtered(&[("filter", "name|REVIEW|$contL")]).await?, vec![2]);
    assert_eq!(filtered(&[("filter", "name|REVIEW|$cont")]).await?, Vec::<i64>::new());
    assert_eq!(filtered(&[("filter", "description|parser|$excl")]).await?, vec![5, 4, 1]);
    assert_eq!(filtered(&[("filter", "name|Fix|$starts")]).await?, vec![3]);
    assert_eq!(filtered(&[("filter", "name|CODE|$endsL")]).await?, vec![2]);
    assert_eq!(filtered(&[("filter", "name|Deploy|$bogus")]).await?, vec![4]);
    Ok(())
}

#[tokio::test]
async fn test_ranges() -> Result<()> {
    assert_eq!(filtered(&[("filter", "priority|2,3|$between")]).await?, vec![5, 3, 2]);
    assert_eq!(filtered(&[("filter", "priority|3|$gte")]).await?, vec![4, 3]);
    assert_eq!(filtered(&[("filter", "due_at|2024-02-01|$lt")]).await?, vec![3]);
    assert_eq!(filtered(&[("filter", "created_at|2024-01-02,2024-01-03T23:59:59Z|$between")]).await?, vec![3, 2]);
    Ok(())
}

#[tokio::test]
async fn test_null_checks() -> Result<()> {
    assert_eq!(filtered(&[("filter", "due_at||$isnull")]).await?, vec![4, 2]);
    assert_eq!(filtered(&[("filter", "assignee_id||$notnull")]).await?, vec![5, 3, 2, 1]);
    Ok(())
}

#[tokio::test]
async fn test_array_fields() -> Result<()> {
    assert_eq!(filtered(&[("filter", "tags|backend|$cont")]).await?, vec![3, 2]);
    assert_eq!(filtered(&[("filter", "tags|backend,urgent|$cont")]).await?, vec![3]);
    assert_eq!(filtered(&[("filter", "tags|ops,docs|$in")]).await?, vec![4, 1]);
    assert_eq!(filtered(&[("filter", "tags|review")]).await?, vec![2]);
    Ok(())
}

#[tokio::test]
async fn test_computed_field() -> Result<()> {
    assert_eq!(filtered(&[("filter", "label|Fix bug / B|$eq")]).await?, vec![3]);
    assert_eq!(filtered(&[("filter", "label|/ A|$ends")]).await?, vec![5, 2, 1]);
    Ok(())
}

#[tokio::test]
async fn test_relation_paths() -> Result<()> {
    assert_eq!(filtered(&[("filter", "project.name|Apollo|$eq")]).await?, vec![2, 1]);
    assert_eq!(filtered(&[("filter", "project.owner.name|Grace|$eq")]).await?, vec![4, 3]);
    assert_eq!(filtered(&[("filter", "assignee.name|ada|$contL"), ("filter", "project.name|Apollo|$eq")]).await?, vec![1]);
    // camelCase paths are mapped to storage names
    assert_eq!(filtered(&[("filter", "projectId|2|$eq")]).await?, vec![4, 3]);
    Ok(())
}

#[tokio::test]
async fn test_dropped_clauses_impose_nothing() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(
        &paginator,
        &[
            ("filter", "nope|1"),
            ("filter", "priority|x|$gt"),
            ("filter", "done|maybe|$eq"),
            ("filter", "comments.body|review"),
            ("filter", "project.nope|1"),
            ("filter", "status|A|$gt"),
            ("filter", "malformed"),
        ],
    )
    .await?;

    assert_eq!(ids(&page), vec![5, 4, 3, 2, 1]);
    assert!(page.pagination.filters.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_multi_column_filter_ors_columns() -> Result<()> {
    assert_eq!(filtered(&[("filter", "name,description|parser|$cont")]).await?, vec![3, 2]);
    assert_eq!(filtered(&[("combinedFilter", "name,description:sprint")]).await?, vec![5]);
    Ok(())
}

#[tokio::test]
async fn test_multi_column_filter_with_dropped_first_column() -> Result<()> {
    // "Plan sprint" is no integer, so only the name column survives, still ANDed with the status filter
    let dropped = filtered(&[("filter", "status|A|$eq"), ("filter", "priority,name|Plan sprint|$eq")]).await?;
    assert_eq!(dropped, vec![5]);
    assert_eq!(dropped, filtered(&[("filter", "status|A|$eq"), ("filter", "name|Plan sprint|$eq")]).await?);

    assert_eq!(filtered(&[("filter", "done|true|$eq"), ("filter", "priority,name|Plan sprint|$eq")]).await?, Vec::<i64>::new());
    Ok(())
}

#[tokio::test]
async fn test_or_group() -> Result<()> {
    assert_eq!(filtered(&[("or", "status|C|$eq"), ("or", "priority|1|$eq")]).await?, vec![4, 1]);
    // a single or clause alongside filters simply ANDs
    assert_eq!(filtered(&[("filter", "status|A|$eq"), ("or", "done|true|$eq")]).await?, vec![1]);
    Ok(())
}

#[tokio::test]
async fn test_blacklisted_filter_does_not_flatten_or_group() -> Result<()> {
    let paginator = seeded().await?;
    let blacklist = Blacklist::new().exclude_field("description");
    let or_only = [("or", "status|C|$eq"), ("or", "priority|1|$eq")];
    let with_filter = [("filter", "description|x"), ("or", "status|C|$eq"), ("or", "priority|1|$eq")];

    let expected = ids(&query_as(&paginator, &or_only, &blacklist).await?);
    assert_eq!(expected, vec![4, 1]);
    assert_eq!(ids(&query_as(&paginator, &with_filter, &blacklist).await?), expected);
    Ok(())
}

#[tokio::test]
async fn test_mixed_grouping_policies() -> Result<()> {
    let params = [("filter", "status|A|$eq"), ("or", "priority|2|$eq"), ("or", "done|true|$eq")];

    let flat = seeded().await?;
    assert_eq!(ids(&query(&flat, &params).await?), Vec::<i64>::new());

    let nested = seeded_with(PaginationConfig::default().with_grouping(GroupingPolicy::Nested)).await?;
    assert_eq!(ids(&query(&nested, &params).await?), vec![5, 2, 1]);
    Ok(())
}

#[tokio::test]
async fn test_applied_filters_are_echoed() -> Result<()> {
    let paginator = seeded().await?;
    let page = query(&paginator, &[("filter", "priority|2,3|$between"), ("filter", "nope|1"), ("or", "project.name|Apollo|$eq")]).await?;

    let echoed: Vec<(&str, Vec<&str>)> =
        page.pagination.filters.iter().map(|f| (f.column.as_str(), f.values.iter().map(String::as_str).collect())).collect();
    assert_eq!(echoed, vec![("priority", vec!["2", "3"]), ("project.name", vec!["Apollo"])]);
    assert_eq!(ids(&page), vec![2]);
    Ok(())
}

#[tokio::test]
async fn test_values_are_bound_not_spliced() -> Result<()> {
    let paginator = seeded().await?;
    assert!(query(&paginator, &[("filter", "name|x' OR '1'='1|$eq")]).await?.rows.is_empty());
    assert!(query(&paginator, &[("filter", "name|\"; DROP TABLE tasks; --|$cont")]).await?.rows.is_empty());
    assert_eq!(query(&paginator, &[]).await?.pagination.total_rows, 5);
    Ok(())
}
