//! DeFi Transaction Guard
//!
//! Risk-scoring backend for blockchain transactions:
//! - AI provider chain with retry/backoff and heuristic fallback
//! - In-memory assessment store with alerting and firewall counters
//! - Optional on-chain score mirroring (TransactionGuard contract)
//! - Optional BlockDAG network passthrough

pub mod ai;
pub mod api;
pub mod chain;
pub mod config;
pub mod models;
pub mod store;

pub use ai::{CompletionClient, HeuristicProvider, Provider, ProviderManager, ProviderProfile};
pub use chain::{BlockDagClient, GuardClient};
pub use config::GuardConfig;
pub use models::{
    AnalysisResult, AppError, AppResult, ErrorCode, FirewallStats, StoredAssessment, ThreatAlert,
    TransactionInput,
};
pub use store::RiskStore;
