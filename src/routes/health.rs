use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::common::AppState;
use crate::store::StoreKind;

#[derive(Debug, Serialize, ToSchema)]
pub struct StoreHealth {
    pub store: StoreKind,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub success: bool,
    pub stores: Vec<StoreHealth>,
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is running", body = String),
    ),
    tag = "health"
)]
pub async fn root() -> &'static str {
    "Turbine sync API is running"
}

/// Health check endpoint
///
/// Pings all three stores. Returns 503 if any of them is unreachable.
/// This endpoint is not rate-limited and suitable for Kubernetes probes.
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "All stores reachable", body = HealthResponse),
        (status = 503, description = "At least one store unreachable", body = HealthResponse),
    ),
    tag = "health"
)]
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let stores: Vec<StoreHealth> = state
        .store
        .ping_all()
        .await
        .into_iter()
        .map(|(store, result)| StoreHealth {
            store,
            ok: result.is_ok(),
            error: result.err().map(|e| e.to_string()),
        })
        .collect();

    let healthy = stores.iter().all(|s| s.ok);
    if !healthy {
        tracing::warn!("Health check failed for at least one store");
    }
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            success: healthy,
            stores,
        }),
    )
}
