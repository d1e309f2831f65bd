//! Data model: wire types and the application error taxonomy.

pub mod errors;
pub mod types;

pub use errors::{AppError, AppResult, ErrorCode};
pub use types::{
    AnalysisResult, FirewallStats, StoredAssessment, ThreatAlert, TransactionInput,
};
