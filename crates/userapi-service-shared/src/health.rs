//! `GET /v1/healthcheck`.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use serde::{Deserialize, Serialize};

use crate::codec::write_json_body;
use crate::error::ApiError;
use crate::AppState;

/// Deployment details reported by the healthcheck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub environment: String,
    pub version: String,
}

/// Healthcheck response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always `"available"` while the process is serving.
    pub status: String,
    pub system_info: SystemInfo,
}

impl HealthStatus {
    pub fn available(environment: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            status: "available".to_string(),
            system_info: SystemInfo {
                environment: environment.into(),
                version: version.into(),
            },
        }
    }
}

/// Report that the service is up, with its environment and version.
pub async fn healthcheck(State(state): State<AppState>) -> Result<Response, ApiError> {
    let status = HealthStatus::available(state.environment().as_str(), state.version());
    write_json_body(StatusCode::OK, &status, HeaderMap::new()).map_err(ApiError::internal)
}
