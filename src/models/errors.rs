//! Centralized error handling.
//!
//! Every failure carries a unique error code for log correlation.
//! Code pattern: CATEGORY_SPECIFIC_ERROR
//! - VAL_xxx: transaction validation errors
//! - PROVIDER_xxx: AI provider errors (absorbed by the manager)
//! - API_xxx: HTTP surface errors
//! - CFG_xxx: configuration errors
//! - CHAIN_xxx / DAG_xxx: optional collaborator errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Validation Errors
    // ============================================
    /// Required transaction field missing
    ValidationMissingField,
    /// Address is not 0x + 40 hex chars
    ValidationInvalidAddress,
    /// Hash is not 0x + 64 hex chars
    ValidationInvalidHash,

    // ============================================
    // Provider Errors
    // ============================================
    /// Provider has no configured credential
    ProviderUnavailable,
    /// Outbound request failed (network/status)
    ProviderRequestFailed,
    /// Remote returned an empty completion
    ProviderEmptyResponse,
    /// Remote text had no decodable JSON verdict
    ProviderMalformedResponse,
    /// Retry budget exhausted
    ProviderExhausted,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request
    ApiBadRequest,
    /// Resource not found
    ApiNotFound,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Configuration / Collaborator Errors
    // ============================================
    /// Missing environment variable
    ConfigMissingEnv,
    /// Blockchain collaborator disabled or missing credentials
    ChainNotConfigured,
    /// Contract call failed
    ChainCallFailed,
    /// BlockDAG collaborator disabled
    BlockDagNotConfigured,
    /// BlockDAG API call failed
    BlockDagRequestFailed,

    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationMissingField => "VAL_MISSING_FIELD",
            Self::ValidationInvalidAddress => "VAL_INVALID_ADDRESS",
            Self::ValidationInvalidHash => "VAL_INVALID_HASH",

            Self::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            Self::ProviderRequestFailed => "PROVIDER_REQUEST_FAILED",
            Self::ProviderEmptyResponse => "PROVIDER_EMPTY_RESPONSE",
            Self::ProviderMalformedResponse => "PROVIDER_MALFORMED_RESPONSE",
            Self::ProviderExhausted => "PROVIDER_EXHAUSTED",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiNotFound => "API_NOT_FOUND",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ChainNotConfigured => "CHAIN_NOT_CONFIGURED",
            Self::ChainCallFailed => "CHAIN_CALL_FAILED",
            Self::BlockDagNotConfigured => "DAG_NOT_CONFIGURED",
            Self::BlockDagRequestFailed => "DAG_REQUEST_FAILED",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ValidationMissingField
            | Self::ValidationInvalidAddress
            | Self::ValidationInvalidHash
            | Self::ApiBadRequest => 400,
            Self::ApiNotFound => 404,
            Self::ChainNotConfigured | Self::BlockDagNotConfigured => 503,
            Self::ChainCallFailed | Self::BlockDagRequestFailed => 502,
            _ => 500,
        }
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::ValidationMissingField,
            format!("transaction {} is required", field),
        )
    }

    pub fn invalid_address(address: &str) -> Self {
        Self::new(
            ErrorCode::ValidationInvalidAddress,
            format!("invalid address format: {}", address),
        )
    }

    pub fn invalid_hash(hash: &str) -> Self {
        Self::new(
            ErrorCode::ValidationInvalidHash,
            format!("invalid transaction hash format: {}", hash),
        )
    }

    pub fn provider_unavailable(name: &str) -> Self {
        Self::new(
            ErrorCode::ProviderUnavailable,
            format!("{} API key not configured", name),
        )
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiNotFound, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }

    pub fn chain_not_configured(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ChainNotConfigured, msg)
    }

    pub fn chain_call_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ChainCallFailed, msg)
    }

    pub fn blockdag_not_configured() -> Self {
        Self::new(
            ErrorCode::BlockDagNotConfigured,
            "BlockDAG node URL not configured",
        )
    }

    pub fn blockdag_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::BlockDagRequestFailed, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::ProviderRequestFailed, "request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::ProviderRequestFailed, "connection failed")
        } else {
            Self::new(ErrorCode::ProviderRequestFailed, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(
            ErrorCode::ProviderMalformedResponse,
            format!("JSON parse error: {}", err),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::invalid_hash("0xdead");
        assert_eq!(err.code, ErrorCode::ValidationInvalidHash);
        assert_eq!(err.code_str(), "VAL_INVALID_HASH");
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ValidationInvalidAddress.http_status(), 400);
        assert_eq!(ErrorCode::ApiNotFound.http_status(), 404);
        assert_eq!(ErrorCode::ChainNotConfigured.http_status(), 503);
        assert_eq!(ErrorCode::ProviderExhausted.http_status(), 500);
    }

    #[test]
    fn test_display_includes_code() {
        let err = AppError::bad_request("bad payload");
        let text = err.to_string();
        assert!(text.contains("API_BAD_REQUEST"));
        assert!(text.contains("bad payload"));
    }
}
