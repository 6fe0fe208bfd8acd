//! Pages an in-memory table with query parameters given as `key=value` arguments.
//!
//! `cargo run -p sieve-storage-sqlite --example basic -- 'filter=name|an|$contL' sort=name:asc perPage=2`

use sieve_core::{Blacklist, CancellationToken, Entity, PaginationConfig, Paginator, SchemaBuilder, StorageKind};
use sieve_storage_sqlite::SqliteExecutor;

struct Fruit;

impl Entity for Fruit {
    const TABLE: &'static str = "fruits";

    fn describe(schema: &mut SchemaBuilder) {
        schema.primary_key(["id"]).field("id", StorageKind::Int(64)).field("name", StorageKind::Text).field("created_at", StorageKind::Time);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let executor = SqliteExecutor::open_in_memory().await?;
    executor
        .execute_batch(
            r#"CREATE TABLE "fruits" ("id" INTEGER PRIMARY KEY, "name" TEXT NOT NULL, "created_at" TEXT NOT NULL);
               INSERT INTO "fruits" VALUES (1, 'Banana', '2024-01-01'), (2, 'Mango', '2024-01-02'), (3, 'Orange', '2024-01-03');"#,
        )
        .await?;

    let config = PaginationConfig::default();
    let args: Vec<(String, String)> =
        std::env::args().skip(1).filter_map(|arg| arg.split_once('=').map(|(k, v)| (k.to_owned(), v.to_owned()))).collect();
    let request = config.parse(args);

    let paginator = Paginator::with_config(executor, config);
    let page = paginator.paginate::<Fruit>(&request, &Blacklist::new(), &CancellationToken::new()).await?;
    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
