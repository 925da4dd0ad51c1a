use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

pub type WarehousePool = sqlx::PgPool;

pub async fn connect(warehouse_url: &str) -> Result<WarehousePool, sqlx::Error> {
    connect_with_settings(warehouse_url, 5, 30).await
}

pub async fn connect_with_settings(
    warehouse_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<WarehousePool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                // The agent only ever reads; make that the session default.
                sqlx::query("SET default_transaction_read_only = on")
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(warehouse_url)
        .await
}
