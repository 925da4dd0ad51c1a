use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

use datachat_warehouse::WarehousePool;

#[derive(Clone)]
pub struct HealthState {
    pool: WarehousePool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub warehouse: HealthCheck,
    pub checked_at: String,
}

pub fn router(pool: WarehousePool) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { pool })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let warehouse = warehouse_check(&state.pool).await;
    let (status_code, payload) = build_response(warehouse);
    (status_code, Json(payload))
}

fn build_response(warehouse: HealthCheck) -> (StatusCode, HealthResponse) {
    let ready = warehouse.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "datachat-server runtime initialized".to_string(),
        },
        warehouse,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, payload)
}

async fn warehouse_check(pool: &WarehousePool) -> HealthCheck {
    match sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await {
        Ok(_) => HealthCheck { status: "ready", detail: "warehouse query succeeded".to_string() },
        Err(error) => {
            HealthCheck { status: "degraded", detail: format!("warehouse query failed: {error}") }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::{build_response, HealthCheck};

    #[test]
    fn ready_warehouse_yields_ok() {
        let (status, payload) = build_response(HealthCheck {
            status: "ready",
            detail: "warehouse query succeeded".to_string(),
        });

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.service.status, "ready");
        assert_eq!(payload.warehouse.status, "ready");
    }

    #[test]
    fn degraded_warehouse_yields_service_unavailable() {
        let (status, payload) = build_response(HealthCheck {
            status: "degraded",
            detail: "warehouse query failed: connection refused".to_string(),
        });

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.service.status, "ready");
        assert!(payload.warehouse.detail.contains("connection refused"));
    }
}
