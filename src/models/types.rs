//! Core wire types shared by the scoring pipeline, the store, and the API.
//!
//! JSON field names are camelCase to stay byte-compatible with the existing
//! frontend clients.

use serde::{Deserialize, Serialize};

use crate::models::errors::{AppError, AppResult};

/// Inbound transaction submitted for risk analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub value: String,
    pub gas_limit: String,
    pub data: String,
}

impl TransactionInput {
    /// Validate the transaction shape before any scoring work begins.
    ///
    /// Hash must be a 32-byte hex value, both addresses 20-byte hex values,
    /// and every required field non-empty.
    pub fn validate(&self) -> AppResult<()> {
        if self.hash.is_empty() {
            return Err(AppError::missing_field("hash"));
        }
        if self.from.is_empty() {
            return Err(AppError::missing_field("from"));
        }
        if self.to.is_empty() {
            return Err(AppError::missing_field("to"));
        }
        if !is_valid_hash(&self.hash) {
            return Err(AppError::invalid_hash(&self.hash));
        }
        if !is_valid_address(&self.from) {
            return Err(AppError::invalid_address(&self.from));
        }
        if !is_valid_address(&self.to) {
            return Err(AppError::invalid_address(&self.to));
        }
        Ok(())
    }

    /// True when the transaction targets a contract with call data attached.
    /// Only these transactions are mirrored on-chain.
    pub fn is_contract_interaction(&self) -> bool {
        !self.to.is_empty() && !self.data.is_empty()
    }
}

/// Result of one provider analysis. Produced fresh per request, never
/// mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Overall risk score (0-100)
    pub risk_score: u8,
    /// Threat classification label
    pub threat_type: String,
    /// Model confidence (0.0-1.0)
    pub confidence: f64,
    /// Free-text security assessment
    pub reasoning: String,
    /// Name of the provider that produced this result
    pub provider: String,
    /// Risk indicator tags
    pub indicators: Vec<String>,
    /// Wall-clock analysis time in milliseconds
    pub process_time: i64,
}

/// A stored risk evaluation, keyed by transaction hash (last write wins).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAssessment {
    pub tx_hash: String,
    pub risk_score: u8,
    pub threat_type: String,
    pub confidence: f64,
    pub reason: String,
    /// Unix seconds at creation
    pub timestamp: i64,
    pub is_blocked: bool,
}

impl StoredAssessment {
    /// Build an assessment from an analysis result. `is_blocked` is derived
    /// from the score, never set independently.
    pub fn from_analysis(tx_hash: &str, result: &AnalysisResult) -> Self {
        Self {
            tx_hash: tx_hash.to_string(),
            risk_score: result.risk_score,
            threat_type: result.threat_type.clone(),
            confidence: result.confidence,
            reason: result.reasoning.clone(),
            timestamp: chrono::Utc::now().timestamp(),
            is_blocked: result.risk_score > BLOCK_THRESHOLD,
        }
    }
}

/// Score above which a transaction counts as blocked.
pub const BLOCK_THRESHOLD: u8 = 80;

/// Security alert raised for a blocked transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: String,
    pub severity: String,
    pub description: String,
    pub timestamp: i64,
    pub tx_hash: String,
}

/// Aggregate firewall statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirewallStats {
    pub transactions_screened: i64,
    pub exploits_blocked: i64,
    pub funds_protected: i64,
    pub false_positive_rate: f64,
    pub uptime: String,
}

/// Map a risk score to an alert severity level.
pub fn severity_for(risk_score: u8) -> &'static str {
    if risk_score >= 90 {
        "CRITICAL"
    } else if risk_score >= 70 {
        "HIGH"
    } else if risk_score >= 40 {
        "MEDIUM"
    } else {
        "LOW"
    }
}

/// Check for a 20-byte hex address: `0x` + 40 hex chars.
pub fn is_valid_address(address: &str) -> bool {
    is_prefixed_hex(address, 40)
}

/// Check for a 32-byte hex hash: `0x` + 64 hex chars.
pub fn is_valid_hash(hash: &str) -> bool {
    is_prefixed_hex(hash, 64)
}

fn is_prefixed_hex(s: &str, hex_len: usize) -> bool {
    match s.strip_prefix("0x") {
        Some(rest) => rest.len() == hex_len && rest.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> TransactionInput {
        TransactionInput {
            hash: format!("0x{}", "0".repeat(64)),
            from: format!("0x{}", "1".repeat(40)),
            to: "0x1234567890abcdef1234567890abcdef12345678".to_string(),
            value: "1000000000".to_string(),
            gas_limit: "350000".to_string(),
            data: String::new(),
        }
    }

    #[test]
    fn test_address_validation() {
        assert!(is_valid_address("0x1234567890abcdef1234567890abcdef12345678"));
        assert!(is_valid_address("0xDAC17F958D2EE523A2206206994597C13D831EC7"));
        assert!(!is_valid_address("0x1234"));
        assert!(!is_valid_address("1234567890abcdef1234567890abcdef12345678"));
        assert!(!is_valid_address("0xzz34567890abcdef1234567890abcdef12345678"));
    }

    #[test]
    fn test_hash_validation() {
        assert!(is_valid_hash(&format!("0x{}", "a".repeat(64))));
        assert!(!is_valid_hash(&format!("0x{}", "a".repeat(63))));
        assert!(!is_valid_hash(&"a".repeat(66)));
    }

    #[test]
    fn test_validate_accepts_well_formed_tx() {
        assert!(sample_tx().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_fields() {
        let mut tx = sample_tx();
        tx.hash = "0x123".to_string();
        assert!(tx.validate().is_err());

        let mut tx = sample_tx();
        tx.from = String::new();
        assert!(tx.validate().is_err());

        let mut tx = sample_tx();
        tx.to = "not-an-address".to_string();
        assert!(tx.validate().is_err());
    }

    #[test]
    fn test_blocked_derivation() {
        let result = AnalysisResult {
            risk_score: 81,
            threat_type: "High Risk Transaction".to_string(),
            confidence: 0.9,
            reasoning: "test".to_string(),
            provider: "heuristic".to_string(),
            indicators: vec![],
            process_time: 1,
        };
        let assessment = StoredAssessment::from_analysis(&sample_tx().hash, &result);
        assert!(assessment.is_blocked);

        let result = AnalysisResult { risk_score: 80, ..result };
        let assessment = StoredAssessment::from_analysis(&sample_tx().hash, &result);
        assert!(!assessment.is_blocked, "score 80 is not blocked, only > 80");
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(severity_for(95), "CRITICAL");
        assert_eq!(severity_for(85), "HIGH");
        assert_eq!(severity_for(55), "MEDIUM");
        assert_eq!(severity_for(10), "LOW");
    }

    #[test]
    fn test_transaction_wire_shape() {
        let json = r#"{
            "hash": "0x1111111111111111111111111111111111111111111111111111111111111111",
            "from": "0x1234567890abcdef1234567890abcdef12345678",
            "to": "0xabcdef1234567890abcdef1234567890abcdef12",
            "value": "1000000000000000000",
            "gasLimit": "21000",
            "data": "0x"
        }"#;
        let tx: TransactionInput = serde_json::from_str(json).unwrap();
        assert_eq!(tx.gas_limit, "21000");

        let out = serde_json::to_value(&tx).unwrap();
        assert!(out.get("gasLimit").is_some(), "gas limit must serialize camelCase");
    }
}
