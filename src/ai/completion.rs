//! Generic text-completion risk analyst client.
//!
//! The remote providers are functionally interchangeable: they differ only in
//! endpoint, request/response envelope, and credentials. One client type
//! covers them all, parameterized by a [`ProviderProfile`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::ai::{retry, Provider};
use crate::models::errors::{AppError, AppResult, ErrorCode};
use crate::models::{AnalysisResult, TransactionInput};

/// Outbound AI call timeout.
const AI_TIMEOUT: Duration = Duration::from_secs(10);

/// Request/response wire format of a completion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Envelope {
    /// Google-style `generateContent`: key as query parameter, text at
    /// `candidates[0].content.parts[0].text`.
    GeminiGenerate,
    /// OpenAI-compatible chat completions: Bearer auth, text at
    /// `choices[0].message.content`.
    OpenAiChat,
}

impl Envelope {
    fn request_url(&self, base_url: &str, api_key: &str) -> String {
        match self {
            Self::GeminiGenerate => format!("{}?key={}", base_url, api_key),
            Self::OpenAiChat => base_url.to_string(),
        }
    }

    fn request_body(&self, model: &str, prompt: &str) -> serde_json::Value {
        match self {
            Self::GeminiGenerate => serde_json::json!({
                "contents": [{ "parts": [{ "text": prompt }] }],
                "generationConfig": { "temperature": 0.1, "maxOutputTokens": 1000 },
            }),
            Self::OpenAiChat => serde_json::json!({
                "model": model,
                "messages": [{ "role": "user", "content": prompt }],
                "temperature": 0.1,
                "max_tokens": 1000,
            }),
        }
    }

    /// Pull the completion text out of the provider response.
    fn extract_text(&self, response: &serde_json::Value) -> AppResult<String> {
        let text = match self {
            Self::GeminiGenerate => response["candidates"][0]["content"]["parts"][0]["text"]
                .as_str()
                .map(str::to_string),
            Self::OpenAiChat => response["choices"][0]["message"]["content"]
                .as_str()
                .map(str::to_string),
        };

        text.ok_or_else(|| {
            AppError::new(
                ErrorCode::ProviderEmptyResponse,
                "no completion text in provider response",
            )
        })
    }
}

/// Static description of one remote provider.
pub struct ProviderProfile {
    pub name: &'static str,
    pub display_name: &'static str,
    pub model: &'static str,
    pub latency_hint: &'static str,
    pub capabilities: &'static [&'static str],
    pub default_base_url: &'static str,
    pub envelope: Envelope,
}

impl ProviderProfile {
    pub fn groq() -> Self {
        Self {
            name: "groq",
            display_name: "Groq AI",
            model: "mixtral-8x7b-32768",
            latency_hint: "~150ms",
            capabilities: &[
                "transaction-analysis",
                "threat-detection",
                "risk-scoring",
                "exploit-patterns",
            ],
            default_base_url: "https://api.groq.com/openai/v1/chat/completions",
            envelope: Envelope::OpenAiChat,
        }
    }

    pub fn gemini() -> Self {
        Self {
            name: "gemini",
            display_name: "Gemini AI",
            model: "gemini-2.0-flash",
            latency_hint: "~120ms",
            capabilities: &[
                "transaction-analysis",
                "pattern-recognition",
                "risk-assessment",
                "security-analysis",
            ],
            default_base_url:
                "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent",
            envelope: Envelope::GeminiGenerate,
        }
    }
}

/// Verdict shape the model is asked to return.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiVerdict {
    risk_score: i64,
    threat_type: String,
    confidence: f64,
    reasoning: String,
    #[serde(default)]
    indicators: Vec<String>,
}

impl AiVerdict {
    /// Convert to a result, clamping into the documented ranges.
    fn into_result(self, provider: &str, process_time: i64) -> AnalysisResult {
        AnalysisResult {
            risk_score: self.risk_score.clamp(0, 100) as u8,
            threat_type: self.threat_type,
            confidence: self.confidence.clamp(0.0, 1.0),
            reasoning: self.reasoning,
            provider: provider.to_string(),
            indicators: self.indicators,
            process_time,
        }
    }
}

/// Remote text-completion provider client with primary/backup credentials.
pub struct CompletionClient {
    profile: ProviderProfile,
    base_url: String,
    api_key: Option<String>,
    backup_key: Option<String>,
    http: reqwest::Client,
}

impl CompletionClient {
    pub fn new(
        profile: ProviderProfile,
        base_url: Option<String>,
        api_key: Option<String>,
        backup_key: Option<String>,
    ) -> Self {
        let base_url = base_url.unwrap_or_else(|| profile.default_base_url.to_string());

        Self {
            profile,
            base_url,
            api_key,
            backup_key,
            http: reqwest::Client::new(),
        }
    }

    /// One outbound call, no retries.
    async fn call_once(&self, api_key: &str, prompt: &str) -> AppResult<AiVerdict> {
        let url = self.profile.envelope.request_url(&self.base_url, api_key);
        let body = self.profile.envelope.request_body(self.profile.model, prompt);

        let mut request = self.http.post(&url).timeout(AI_TIMEOUT).json(&body);
        if self.profile.envelope == Envelope::OpenAiChat {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::new(
                ErrorCode::ProviderRequestFailed,
                format!("API error {}: {}", status.as_u16(), detail),
            ));
        }

        let payload: serde_json::Value = response.json().await?;
        let text = self.profile.envelope.extract_text(&payload)?;
        parse_verdict(&text)
    }

    async fn call_with_retry(&self, api_key: &str, prompt: &str) -> AppResult<AiVerdict> {
        retry::with_retry(self.profile.name, || self.call_once(api_key, prompt)).await
    }
}

#[async_trait]
impl Provider for CompletionClient {
    async fn analyze(&self, tx: &TransactionInput) -> AppResult<AnalysisResult> {
        let started = Instant::now();

        tx.validate()?;

        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::provider_unavailable(self.profile.name))?;

        let prompt = build_analysis_prompt(tx);

        let mut verdict = self.call_with_retry(api_key, &prompt).await;
        if verdict.is_err() {
            if let Some(backup) = self.backup_key.as_deref() {
                debug!("{}: primary credential failed, trying backup", self.profile.name);
                verdict = self.call_with_retry(backup, &prompt).await;
            }
        }

        let verdict = verdict?;
        Ok(verdict.into_result(self.profile.name, started.elapsed().as_millis() as i64))
    }

    fn name(&self) -> &str {
        self.profile.name
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Build the natural-language prompt embedding all transaction fields.
fn build_analysis_prompt(tx: &TransactionInput) -> String {
    format!(
        r#"You are a DeFi security expert. Analyze this blockchain transaction for potential exploits and security risks:

Transaction:
Hash: {}
From: {}
To: {}
Value: {}
Gas Limit: {}
Call Data: {}

Security Analysis Required:
- Flash loan attack detection
- Rug pull pattern recognition
- MEV/sandwich attack identification
- Governance exploit detection
- Unusual gas patterns
- Malicious contract interactions

Return analysis as JSON:
{{
  "riskScore": <integer 0-100>,
  "threatType": "<threat classification>",
  "confidence": <float 0.0-1.0>,
  "reasoning": "<security assessment>",
  "indicators": ["<risk factors>"]
}}

Risk Scoring:
0-30: Normal transaction
31-70: Suspicious activity
71-100: High risk/exploit attempt"#,
        tx.hash, tx.from, tx.to, tx.value, tx.gas_limit, tx.data
    )
}

/// Decode the verdict from completion text. Models wrap the JSON in prose,
/// so take everything between the first `{` and the last `}`.
fn parse_verdict(text: &str) -> AppResult<AiVerdict> {
    let start = text.find('{');
    let end = text.rfind('}');

    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if s < e => (s, e),
        _ => {
            return Err(AppError::new(
                ErrorCode::ProviderMalformedResponse,
                "no valid JSON found in response",
            ))
        }
    };

    Ok(serde_json::from_str(&text[start..=end])?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tx() -> TransactionInput {
        TransactionInput {
            hash: format!("0x{}", "0".repeat(64)),
            from: format!("0x{}", "1".repeat(40)),
            to: format!("0x{}", "2".repeat(40)),
            value: "1000".to_string(),
            gas_limit: "21000".to_string(),
            data: String::new(),
        }
    }

    #[test]
    fn test_gemini_envelope_request() {
        let env = Envelope::GeminiGenerate;
        let url = env.request_url("https://example.com/generate", "secret");
        assert_eq!(url, "https://example.com/generate?key=secret");

        let body = env.request_body("gemini-2.0-flash", "hello");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 1000);
    }

    #[test]
    fn test_openai_envelope_request() {
        let env = Envelope::OpenAiChat;
        let url = env.request_url("https://example.com/chat", "secret");
        assert_eq!(url, "https://example.com/chat", "key must not leak into the URL");

        let body = env.request_body("mixtral-8x7b-32768", "hello");
        assert_eq!(body["model"], "mixtral-8x7b-32768");
        assert_eq!(body["messages"][0]["content"], "hello");
    }

    #[test]
    fn test_gemini_text_extraction() {
        let response = serde_json::json!({
            "candidates": [{ "content": { "parts": [{ "text": "verdict here" }] } }]
        });
        let text = Envelope::GeminiGenerate.extract_text(&response).unwrap();
        assert_eq!(text, "verdict here");

        let empty = serde_json::json!({ "candidates": [] });
        assert!(Envelope::GeminiGenerate.extract_text(&empty).is_err());
    }

    #[test]
    fn test_openai_text_extraction() {
        let response = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "verdict" } }]
        });
        let text = Envelope::OpenAiChat.extract_text(&response).unwrap();
        assert_eq!(text, "verdict");
    }

    #[test]
    fn test_parse_verdict_with_surrounding_prose() {
        let text = r#"Sure! Here is my analysis:
{"riskScore": 72, "threatType": "Suspicious Activity", "confidence": 0.8, "reasoning": "high gas", "indicators": ["high-gas-limit"]}
Let me know if you need anything else."#;

        let verdict = parse_verdict(text).unwrap();
        assert_eq!(verdict.risk_score, 72);
        assert_eq!(verdict.indicators, vec!["high-gas-limit"]);
    }

    #[test]
    fn test_parse_verdict_without_braces() {
        let err = parse_verdict("I cannot analyze this transaction.").unwrap_err();
        assert_eq!(err.code, ErrorCode::ProviderMalformedResponse);
    }

    #[test]
    fn test_verdict_clamping() {
        let verdict = AiVerdict {
            risk_score: 250,
            threat_type: "High Risk Transaction".to_string(),
            confidence: 1.7,
            reasoning: "overconfident model".to_string(),
            indicators: vec![],
        };
        let result = verdict.into_result("gemini", 12);
        assert_eq!(result.risk_score, 100);
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.provider, "gemini");
        assert_eq!(result.process_time, 12);
    }

    #[test]
    fn test_prompt_embeds_all_fields() {
        let tx = sample_tx();
        let prompt = build_analysis_prompt(&tx);
        for field in [&tx.hash, &tx.from, &tx.to, &tx.value, &tx.gas_limit] {
            assert!(prompt.contains(field.as_str()));
        }
        assert!(prompt.contains("riskScore"));
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_validation_first() {
        let client = CompletionClient::new(ProviderProfile::gemini(), None, None, None);
        assert!(!client.is_available());

        // Invalid tx must fail fast with a validation error, not a provider error
        let mut tx = sample_tx();
        tx.hash = "0xbad".to_string();
        let err = client.analyze(&tx).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationInvalidHash);

        // Well-formed tx then hits the missing credential
        let err = client.analyze(&sample_tx()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ProviderUnavailable);
    }
}
