//! BlockDAG network REST client.
//!
//! Thin passthrough to the BlockDAG node HTTP API: transaction lookup and
//! submission, network stats, per-contract risk profiles, health, and DAG
//! structure queries.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::BlockDagSettings;
use crate::models::errors::{AppError, AppResult};

/// BlockDAG node calls get a generous timeout.
const BLOCKDAG_TIMEOUT: Duration = Duration::from_secs(30);

/// A transaction as reported by the BlockDAG node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDagTransaction {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub gas_used: i64,
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub block_height: i64,
    pub dag_index: i64,
}

/// Network-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockDagStats {
    pub total_transactions: i64,
    pub tps: f64,
    pub network_hash_rate: String,
    pub active_nodes: i64,
    pub dag_size: i64,
    pub finality: String,
}

/// A contract's risk assessment on the BlockDAG network.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub contract_address: String,
    pub risk_score: i64,
    pub threat_level: String,
    pub last_updated: DateTime<Utc>,
    pub incidents: i64,
    pub reputation: f64,
}

#[derive(Debug, Deserialize)]
struct TipsResponse {
    tips: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    valid: bool,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    hash: String,
}

pub struct BlockDagClient {
    node_url: String,
    api_key: Option<String>,
    network_id: String,
    http: reqwest::Client,
}

impl BlockDagClient {
    pub fn from_settings(settings: &BlockDagSettings) -> Self {
        info!(
            "✅ BlockDAG integration initialized - network: {}",
            settings.network_id
        );

        Self {
            node_url: settings.node_url.clone(),
            api_key: settings.api_key.clone(),
            network_id: settings.network_id.clone(),
            http: reqwest::Client::new(),
        }
    }

    pub fn network_id(&self) -> &str {
        &self.network_id
    }

    /// Look up a transaction by hash.
    pub async fn transaction(&self, tx_hash: &str) -> AppResult<BlockDagTransaction> {
        self.get_json(&format!("/api/v1/transaction/{}", tx_hash))
            .await
    }

    /// Submit a transaction; returns the assigned hash.
    pub async fn submit_transaction(&self, tx: serde_json::Value) -> AppResult<String> {
        let response: SubmitResponse = self.post_json("/api/v1/transaction", &tx).await?;
        Ok(response.hash)
    }

    /// Current network statistics.
    pub async fn network_stats(&self) -> AppResult<BlockDagStats> {
        self.get_json("/api/v1/stats").await
    }

    /// Publish a contract's risk profile.
    pub async fn update_risk_profile(
        &self,
        contract_address: &str,
        risk_score: u8,
        threat_level: &str,
    ) -> AppResult<RiskProfile> {
        let profile = RiskProfile {
            contract_address: contract_address.to_string(),
            risk_score: risk_score as i64,
            threat_level: threat_level.to_string(),
            last_updated: Utc::now(),
            incidents: 0,
            reputation: reputation(risk_score),
        };

        let _: serde_json::Value = self.post_json("/api/v1/risk-profile", &profile).await?;
        info!(
            "✅ Updated BlockDAG risk profile for {}: {}% risk",
            contract_address, risk_score
        );
        Ok(profile)
    }

    /// Fetch a contract's risk profile.
    pub async fn risk_profile(&self, contract_address: &str) -> AppResult<RiskProfile> {
        self.get_json(&format!("/api/v1/risk-profile/{}", contract_address))
            .await
    }

    /// Node health report, passed through verbatim.
    pub async fn health(&self) -> AppResult<serde_json::Value> {
        self.get_json("/api/v1/health").await
    }

    /// Current DAG tips for transaction ordering.
    pub async fn dag_tips(&self) -> AppResult<Vec<String>> {
        let response: TipsResponse = self.get_json("/api/v1/dag/tips").await?;
        Ok(response.tips)
    }

    /// Validate DAG structure integrity.
    pub async fn validate_dag(&self) -> AppResult<bool> {
        let response: ValidateResponse = self.get_json("/api/v1/dag/validate").await?;
        Ok(response.valid)
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, path: &str) -> AppResult<T> {
        let mut request = self
            .http
            .get(format!("{}{}", self.node_url, path))
            .timeout(BLOCKDAG_TIMEOUT);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::blockdag_failed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::blockdag_failed(format!(
                "API request failed with status {}",
                status.as_u16()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::blockdag_failed(format!("failed to decode response: {}", e)))
    }

    async fn post_json<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> AppResult<T> {
        let mut request = self
            .http
            .post(format!("{}{}", self.node_url, path))
            .timeout(BLOCKDAG_TIMEOUT)
            .json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::blockdag_failed(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::blockdag_failed(format!(
                "API request failed with status {}: {}",
                status.as_u16(),
                detail
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::blockdag_failed(format!("failed to decode response: {}", e)))
    }
}

/// Reputation score derived from risk: higher risk means lower reputation.
pub fn reputation(risk_score: u8) -> f64 {
    ((100.0 - risk_score as f64) / 100.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reputation_formula() {
        assert_eq!(reputation(0), 1.0);
        assert_eq!(reputation(40), 0.6);
        assert_eq!(reputation(100), 0.0);
    }

    #[test]
    fn test_risk_profile_wire_shape() {
        let profile = RiskProfile {
            contract_address: "0x1234567890abcdef1234567890abcdef12345678".to_string(),
            risk_score: 85,
            threat_level: "HIGH".to_string(),
            last_updated: Utc::now(),
            incidents: 0,
            reputation: reputation(85),
        };

        let json = serde_json::to_value(&profile).unwrap();
        assert!(json.get("contractAddress").is_some());
        assert!(json.get("threatLevel").is_some());
        assert_eq!(json["riskScore"], 85);
    }

    #[test]
    fn test_stats_deserialization() {
        let json = r#"{
            "totalTransactions": 120000,
            "tps": 1433.2,
            "networkHashRate": "12.4 TH/s",
            "activeNodes": 88,
            "dagSize": 450000,
            "finality": "~2s"
        }"#;
        let stats: BlockDagStats = serde_json::from_str(json).unwrap();
        assert_eq!(stats.active_nodes, 88);
        assert_eq!(stats.finality, "~2s");
    }
}
