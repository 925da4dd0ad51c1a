use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};

use crate::connection::WarehousePool;

/// Bounded, already-rendered result of one warehouse query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub truncated: bool,
}

impl QueryOutput {
    /// Plain-text table for the agent's observation. Kept deliberately
    /// simple: header row, one line per row, pipe-separated values.
    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return "query returned no columns".to_string();
        }

        let mut lines = vec![self.columns.join(" | ")];
        for row in &self.rows {
            lines.push(row.join(" | "));
        }
        if self.rows.is_empty() {
            lines.push("(0 rows)".to_string());
        } else if self.truncated {
            lines.push(format!("({} rows shown, result truncated)", self.rows.len()));
        } else {
            lines.push(format!("({} rows)", self.rows.len()));
        }
        lines.join("\n")
    }
}

/// Run one SQL statement and render at most `max_rows` rows. Which SQL gets
/// run is the agent's decision; this layer only executes and renders.
pub async fn run_query(
    pool: &WarehousePool,
    sql: &str,
    max_rows: usize,
) -> Result<QueryOutput, sqlx::Error> {
    let mut fetched = sqlx::query(sql).fetch_all(pool).await?;

    let truncated = fetched.len() > max_rows;
    fetched.truncate(max_rows);

    let columns = fetched
        .first()
        .map(|row| row.columns().iter().map(|col| col.name().to_string()).collect())
        .unwrap_or_default();

    let rows = fetched
        .iter()
        .map(|row| (0..row.columns().len()).map(|index| render_value(row, index)).collect())
        .collect();

    Ok(QueryOutput { columns, rows, truncated })
}

/// Best-effort decoding by column type. A value this layer cannot decode
/// renders as a typed placeholder instead of failing the whole query.
fn render_value(row: &PgRow, index: usize) -> String {
    if let Ok(value) = row.try_get::<Option<String>, _>(index) {
        return value.unwrap_or_else(|| "NULL".to_string());
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(index) {
        return render_opt(value);
    }
    if let Ok(value) = row.try_get::<Option<i32>, _>(index) {
        return render_opt(value);
    }
    if let Ok(value) = row.try_get::<Option<i16>, _>(index) {
        return render_opt(value);
    }
    if let Ok(value) = row.try_get::<Option<f64>, _>(index) {
        return render_opt(value);
    }
    if let Ok(value) = row.try_get::<Option<f32>, _>(index) {
        return render_opt(value);
    }
    if let Ok(value) = row.try_get::<Option<bool>, _>(index) {
        return render_opt(value);
    }
    if let Ok(value) = row.try_get::<Option<DateTime<Utc>>, _>(index) {
        return value.map(|ts| ts.to_rfc3339()).unwrap_or_else(|| "NULL".to_string());
    }
    if let Ok(value) = row.try_get::<Option<NaiveDateTime>, _>(index) {
        return render_opt(value);
    }
    if let Ok(value) = row.try_get::<Option<NaiveDate>, _>(index) {
        return render_opt(value);
    }
    if let Ok(value) = row.try_get::<Option<uuid::Uuid>, _>(index) {
        return render_opt(value);
    }
    if let Ok(value) = row.try_get::<Option<serde_json::Value>, _>(index) {
        return value.map(|json| json.to_string()).unwrap_or_else(|| "NULL".to_string());
    }

    let type_name =
        row.columns().get(index).map(|col| col.type_info().name().to_string()).unwrap_or_default();
    format!("<{}>", type_name.to_ascii_lowercase())
}

fn render_opt<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|inner| inner.to_string()).unwrap_or_else(|| "NULL".to_string())
}

#[cfg(test)]
mod tests {
    use super::QueryOutput;

    #[test]
    fn render_includes_header_rows_and_count() {
        let output = QueryOutput {
            columns: vec!["region".to_string(), "total".to_string()],
            rows: vec![
                vec!["emea".to_string(), "120".to_string()],
                vec!["amer".to_string(), "340".to_string()],
            ],
            truncated: false,
        };

        let rendered = output.render();
        assert!(rendered.starts_with("region | total"));
        assert!(rendered.contains("emea | 120"));
        assert!(rendered.ends_with("(2 rows)"));
    }

    #[test]
    fn render_marks_truncation_and_empty_results() {
        let truncated = QueryOutput {
            columns: vec!["id".to_string()],
            rows: vec![vec!["1".to_string()]],
            truncated: true,
        };
        assert!(truncated.render().contains("result truncated"));

        let empty = QueryOutput { columns: vec!["id".to_string()], rows: vec![], truncated: false };
        assert!(empty.render().ends_with("(0 rows)"));

        let no_columns = QueryOutput { columns: vec![], rows: vec![], truncated: false };
        assert_eq!(no_columns.render(), "query returned no columns");
    }
}
