//! Schema introspection over `information_schema`, rendered as the plain
//! text the agent consumes as tool observations.

use sqlx::Row;

use crate::connection::WarehousePool;

/// List user tables as `schema.table`, excluding system schemas.
pub async fn list_tables(pool: &WarehousePool) -> Result<Vec<String>, sqlx::Error> {
    // information_schema identifier domains do not decode directly; cast.
    sqlx::query_scalar::<_, String>(
        "SELECT (table_schema || '.' || table_name)::text
         FROM information_schema.tables
         WHERE table_schema NOT IN ('pg_catalog', 'information_schema')
         ORDER BY table_schema, table_name",
    )
    .fetch_all(pool)
    .await
}

/// Describe one table's columns: name, type, nullability. The table may be
/// given bare or qualified as `schema.table`.
pub async fn describe_table(pool: &WarehousePool, table: &str) -> Result<String, sqlx::Error> {
    let (schema, name) = split_table_name(table);

    let rows = match schema {
        Some(schema) => {
            sqlx::query(
                "SELECT column_name::text, data_type::text, is_nullable::text
                 FROM information_schema.columns
                 WHERE table_schema = $1 AND table_name = $2
                 ORDER BY ordinal_position",
            )
            .bind(schema)
            .bind(name)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                "SELECT column_name::text, data_type::text, is_nullable::text
                 FROM information_schema.columns
                 WHERE table_name = $1
                   AND table_schema NOT IN ('pg_catalog', 'information_schema')
                 ORDER BY ordinal_position",
            )
            .bind(name)
            .fetch_all(pool)
            .await?
        }
    };

    if rows.is_empty() {
        return Ok(format!("table `{table}` was not found or has no columns"));
    }

    let mut lines = vec![format!("columns of {table}:")];
    for row in &rows {
        let column: String = row.try_get("column_name")?;
        let data_type: String = row.try_get("data_type")?;
        let is_nullable: String = row.try_get("is_nullable")?;
        let nullable = if is_nullable.eq_ignore_ascii_case("yes") { "null" } else { "not null" };
        lines.push(format!("  {column} {data_type} {nullable}"));
    }

    Ok(lines.join("\n"))
}

fn split_table_name(table: &str) -> (Option<&str>, &str) {
    match table.split_once('.') {
        Some((schema, name)) if !schema.is_empty() && !name.is_empty() => (Some(schema), name),
        _ => (None, table),
    }
}

#[cfg(test)]
mod tests {
    use super::split_table_name;

    #[test]
    fn splits_qualified_table_names() {
        assert_eq!(split_table_name("analytics.orders"), (Some("analytics"), "orders"));
        assert_eq!(split_table_name("orders"), (None, "orders"));
        assert_eq!(split_table_name(".orders"), (None, ".orders"));
    }
}
