//! AI analysis pipeline: pluggable risk providers with heuristic fallback.

pub mod completion;
pub mod heuristic;
pub mod manager;
pub mod retry;

use async_trait::async_trait;

use crate::models::{AnalysisResult, AppResult, TransactionInput};

/// A pluggable source of risk analysis.
///
/// Implemented by the remote text-completion clients and by the heuristic
/// rule engine. Failures are provider-level: the manager moves on to the
/// next provider and never retries across providers.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Analyze a transaction and produce a complete result.
    async fn analyze(&self, tx: &TransactionInput) -> AppResult<AnalysisResult>;

    /// Short provider identifier (e.g. "groq", "gemini", "heuristic").
    fn name(&self) -> &str;

    /// Whether this provider is configured and can take calls.
    fn is_available(&self) -> bool;
}

pub use completion::{CompletionClient, ProviderProfile};
pub use heuristic::HeuristicProvider;
pub use manager::ProviderManager;
