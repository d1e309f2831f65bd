//! Provider manager: ordered AI providers with a guaranteed heuristic
//! fallback. Never fails a scoring request.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{info, warn};

use crate::ai::completion::{CompletionClient, ProviderProfile};
use crate::ai::heuristic::HeuristicProvider;
use crate::ai::Provider;
use crate::config::GuardConfig;
use crate::models::{AnalysisResult, AppResult, TransactionInput};

/// Liveness snapshot of the provider stack.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    pub ai_enabled: bool,
    pub providers: HashMap<String, ProviderState>,
    pub fallback_enabled: bool,
    pub last_update: i64,
}

#[derive(Debug, Serialize)]
pub struct ProviderState {
    pub available: bool,
    pub status: String,
}

/// Static capability metadata for one provider.
#[derive(Debug, Serialize)]
pub struct ProviderCapability {
    pub name: String,
    pub provider: String,
    pub available: bool,
    pub capabilities: Vec<String>,
    pub model: String,
    pub latency: String,
}

/// Full capability catalog.
#[derive(Debug, Serialize)]
pub struct ProviderCatalog {
    pub providers: Vec<ProviderCapability>,
    pub fallback: ProviderCapability,
}

/// Holds the configured providers in priority order plus the fallback.
pub struct ProviderManager {
    providers: Vec<Box<dyn Provider>>,
    fallback: HeuristicProvider,
}

impl ProviderManager {
    /// Register every provider whose primary credential is configured.
    /// Registration order is priority order.
    pub fn from_config(config: &GuardConfig) -> Self {
        let mut providers: Vec<Box<dyn Provider>> = Vec::new();

        let groq = CompletionClient::new(
            ProviderProfile::groq(),
            config.groq.base_url.clone(),
            config.groq.api_key.clone(),
            config.groq.backup_key.clone(),
        );
        if groq.is_available() {
            info!("✅ Groq AI provider initialized");
            providers.push(Box::new(groq));
        } else {
            info!("⚠️ Groq API key not found, skipping Groq provider");
        }

        let gemini = CompletionClient::new(
            ProviderProfile::gemini(),
            config.gemini.base_url.clone(),
            config.gemini.api_key.clone(),
            config.gemini.backup_key.clone(),
        );
        if gemini.is_available() {
            info!("✅ Gemini AI provider initialized");
            providers.push(Box::new(gemini));
        } else {
            info!("⚠️ Gemini API key not found, skipping Gemini provider");
        }

        info!(
            "🤖 Provider manager initialized with {} AI providers + heuristic fallback",
            providers.len()
        );

        Self {
            providers,
            fallback: HeuristicProvider::new(),
        }
    }

    /// Explicit construction, used by tests.
    pub fn with_providers(providers: Vec<Box<dyn Provider>>, fallback: HeuristicProvider) -> Self {
        Self { providers, fallback }
    }

    pub fn ai_enabled(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Try each provider in priority order; the heuristic fallback makes
    /// this effectively infallible.
    pub async fn analyze(&self, tx: &TransactionInput) -> AppResult<AnalysisResult> {
        for provider in &self.providers {
            match provider.analyze(tx).await {
                Ok(result) => {
                    info!(
                        "✅ {} analysis successful - risk {}%",
                        provider.name(),
                        result.risk_score
                    );
                    return Ok(result);
                }
                Err(err) => {
                    warn!("⚠️ {} analysis failed: {}", provider.name(), err);
                }
            }
        }

        info!("🔄 Falling back to heuristic analysis");
        self.fallback.analyze(tx).await
    }

    /// Per-provider availability flags.
    pub fn status(&self) -> ProviderStatus {
        let mut providers = HashMap::new();

        for provider in &self.providers {
            providers.insert(
                provider.name().to_string(),
                ProviderState {
                    available: provider.is_available(),
                    status: "active".to_string(),
                },
            );
        }

        providers.insert(
            "heuristic".to_string(),
            ProviderState {
                available: true,
                status: "fallback".to_string(),
            },
        );

        ProviderStatus {
            ai_enabled: self.ai_enabled(),
            providers,
            fallback_enabled: true,
            last_update: chrono::Utc::now().timestamp(),
        }
    }

    /// Static per-provider metadata for the capabilities endpoint.
    pub fn capabilities(&self) -> ProviderCatalog {
        let providers = self
            .providers
            .iter()
            .map(|p| Self::capability_entry(p.name(), p.is_available()))
            .collect();

        ProviderCatalog {
            providers,
            fallback: ProviderCapability {
                name: "Heuristic Fallback".to_string(),
                provider: "heuristic".to_string(),
                available: true,
                capabilities: to_strings(&["rule-based", "pattern-matching", "offline-analysis"]),
                model: "rule-engine".to_string(),
                latency: "<50ms".to_string(),
            },
        }
    }

    fn capability_entry(name: &str, available: bool) -> ProviderCapability {
        let profile = match name {
            "groq" => Some(ProviderProfile::groq()),
            "gemini" => Some(ProviderProfile::gemini()),
            _ => None,
        };

        match profile {
            Some(profile) => ProviderCapability {
                name: profile.display_name.to_string(),
                provider: profile.name.to_string(),
                available,
                capabilities: to_strings(profile.capabilities),
                model: profile.model.to_string(),
                latency: profile.latency_hint.to_string(),
            },
            None => ProviderCapability {
                name: "Heuristic Analysis".to_string(),
                provider: "heuristic".to_string(),
                available: true,
                capabilities: to_strings(&["rule-based", "pattern-matching", "fast-analysis"]),
                model: "rule-engine".to_string(),
                latency: "<50ms".to_string(),
            },
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
