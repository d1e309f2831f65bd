//! API request/response types and error rendering.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::models::errors::AppError;
use crate::models::{FirewallStats, StoredAssessment, ThreatAlert};

// ============================================
// Health
// ============================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthData {
    pub status: String,
    pub timestamp: i64,
    pub uptime: String,
    pub service: String,
    pub ai_status: String,
}

// ============================================
// Risk scoring
// ============================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskScoreResponse {
    pub assessment: StoredAssessment,
    pub ai_insights: AiInsights,
    pub blocked: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsights {
    pub provider: String,
    pub indicators: Vec<String>,
    pub reasoning: String,
    pub process_time: i64,
    pub confidence: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateExploitResponse {
    pub success: bool,
    pub exploit_type: String,
    pub potential_loss: i64,
    pub assessment: StoredAssessment,
    pub alert: ThreatAlert,
}

/// Snapshot returned by the simplified alert streaming endpoint.
#[derive(Debug, Serialize)]
pub struct AlertStreamResponse {
    pub alerts: Vec<ThreatAlert>,
    pub stats: FirewallStats,
}

// ============================================
// Blockchain passthrough
// ============================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRiskRequest {
    pub address: String,
    pub risk_score: u8,
}

#[derive(Debug, Deserialize)]
pub struct BatchUpdateRiskRequest {
    pub updates: Vec<UpdateRiskRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRiskResponse {
    pub success: bool,
    pub tx_hash: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRiskResponse {
    pub address: String,
    pub risk_score: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSafeResponse {
    pub tx_hash: String,
    pub is_safe: bool,
}

// ============================================
// BlockDAG passthrough
// ============================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfileRequest {
    pub contract_address: String,
    pub risk_score: u8,
    pub threat_level: String,
}

#[derive(Debug, Serialize)]
pub struct DagTipsResponse {
    pub tips: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DagValidateResponse {
    pub valid: bool,
}

#[derive(Debug, Serialize)]
pub struct SubmitTransactionResponse {
    pub hash: String,
}

// ============================================
// Error rendering
// ============================================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code_str(),
                message: self.message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_error_status_mapping() {
        let response = AppError::not_found("missing").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::invalid_address("0x12").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::blockdag_not_configured().into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_update_risk_request_wire_shape() {
        let req: UpdateRiskRequest = serde_json::from_str(
            r#"{"address": "0x1234567890abcdef1234567890abcdef12345678", "riskScore": 85}"#,
        )
        .unwrap();
        assert_eq!(req.risk_score, 85);
    }
}
