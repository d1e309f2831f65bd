//! API request handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Json, Path, State};
use rand::Rng;
use tracing::{info, warn};
use uuid::Uuid;

use super::types::*;
use crate::ai::manager::{ProviderCatalog, ProviderManager, ProviderStatus};
use crate::chain::{BlockDagClient, BlockDagStats, BlockDagTransaction, ChainFirewallStats, GuardClient, RiskProfile};
use crate::config::GuardConfig;
use crate::models::errors::{AppError, AppResult};
use crate::models::types::severity_for;
use crate::models::{AnalysisResult, FirewallStats, StoredAssessment, ThreatAlert, TransactionInput};
use crate::store::RiskStore;

/// Shared application state. Owns every piece of mutable state; nothing in
/// the service lives in a process-wide global.
pub struct AppState {
    pub manager: ProviderManager,
    pub store: RiskStore,
    pub guard: Option<Arc<GuardClient>>,
    pub blockdag: Option<BlockDagClient>,
    pub started: Instant,
}

impl AppState {
    pub fn from_config(config: &GuardConfig) -> Self {
        let manager = ProviderManager::from_config(config);

        let guard = config.chain.as_ref().and_then(|settings| {
            match GuardClient::from_settings(settings) {
                Ok(client) => Some(Arc::new(client)),
                Err(err) => {
                    warn!("⚠️ Blockchain integration disabled: {}", err);
                    None
                }
            }
        });

        let blockdag = config
            .blockdag
            .as_ref()
            .map(BlockDagClient::from_settings);

        Self {
            manager,
            store: RiskStore::new(),
            guard,
            blockdag,
            started: Instant::now(),
        }
    }

    pub fn uptime(&self) -> String {
        format!("{}s", self.started.elapsed().as_secs())
    }

    fn guard(&self) -> AppResult<&Arc<GuardClient>> {
        self.guard
            .as_ref()
            .ok_or_else(|| AppError::chain_not_configured("blockchain RPC URL not configured"))
    }

    fn blockdag(&self) -> AppResult<&BlockDagClient> {
        self.blockdag
            .as_ref()
            .ok_or_else(AppError::blockdag_not_configured)
    }
}

// ============================================
// Health
// ============================================

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthData> {
    let ai_status = if state.manager.ai_enabled() {
        "enabled"
    } else {
        "heuristic-only"
    };

    Json(HealthData {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().timestamp(),
        uptime: state.uptime(),
        service: "DeFi Transaction Guard API".to_string(),
        ai_status: ai_status.to_string(),
    })
}

// ============================================
// Risk scoring
// ============================================

pub async fn risk_score(
    State(state): State<Arc<AppState>>,
    Json(tx): Json<TransactionInput>,
) -> Result<Json<RiskScoreResponse>, AppError> {
    tx.validate()?;

    let result = state.manager.analyze(&tx).await?;
    let assessment = StoredAssessment::from_analysis(&tx.hash, &result);

    state.store.record(assessment.clone(), &tx.value);

    // Mirror the score on-chain for contract interactions. Detached task;
    // the handle is dropped here, outcome is only logged.
    if let Some(guard) = &state.guard {
        if guard.can_write() && tx.is_contract_interaction() {
            let _push = Arc::clone(guard).spawn_risk_push(tx.to.clone(), assessment.risk_score);
        }
    }

    info!(
        "Risk assessment completed: {} -> {}% risk",
        tx.hash, assessment.risk_score
    );

    Ok(Json(RiskScoreResponse {
        blocked: assessment.is_blocked,
        ai_insights: AiInsights {
            provider: result.provider.clone(),
            indicators: result.indicators.clone(),
            reasoning: result.reasoning.clone(),
            process_time: result.process_time,
            confidence: result.confidence,
        },
        assessment,
    }))
}

pub async fn get_assessment(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<StoredAssessment>, AppError> {
    state
        .store
        .get(&hash)
        .map(Json)
        .ok_or_else(|| AppError::not_found(format!("assessment not found for hash: {}", hash)))
}

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<FirewallStats> {
    Json(state.store.stats())
}

pub async fn get_alerts(State(state): State<Arc<AppState>>) -> Json<Vec<ThreatAlert>> {
    Json(state.store.alerts(20))
}

pub async fn stream_alerts(State(state): State<Arc<AppState>>) -> Json<AlertStreamResponse> {
    Json(AlertStreamResponse {
        alerts: state.store.alerts(5),
        stats: state.store.stats(),
    })
}

// ============================================
// Demo exploit simulation
// ============================================

const EXPLOIT_TYPES: [&str; 5] = [
    "Flash Loan Attack",
    "Rug Pull Attempt",
    "Liquidity Drain",
    "Sandwich Attack",
    "Governance Exploit",
];

pub async fn simulate_exploit(
    State(state): State<Arc<AppState>>,
) -> Json<SimulateExploitResponse> {
    let (exploit_type, potential_loss, tx_hash, risk_score, confidence) = {
        let mut rng = rand::thread_rng();
        let exploit_type = EXPLOIT_TYPES[rng.gen_range(0..EXPLOIT_TYPES.len())];
        let potential_loss: i64 = rng.gen_range(50_000..250_000);

        let mut hash_bytes = [0u8; 32];
        rng.fill(&mut hash_bytes);
        let tx_hash = format!("0x{}", hex::encode(hash_bytes));

        let risk_score: u8 = 85 + rng.gen_range(0..15);
        let confidence = 0.9 + rng.gen::<f64>() * 0.1;
        (exploit_type, potential_loss, tx_hash, risk_score, confidence)
    };

    let timestamp = chrono::Utc::now().timestamp();
    let assessment = StoredAssessment {
        tx_hash: tx_hash.clone(),
        risk_score,
        threat_type: exploit_type.to_string(),
        confidence,
        reason: "Simulated exploit attempt for demo".to_string(),
        timestamp,
        is_blocked: true,
    };

    let alert = ThreatAlert {
        id: format!("demo_alert_{}", Uuid::new_v4().simple()),
        alert_type: exploit_type.to_string(),
        severity: severity_for(risk_score).to_string(),
        description: format!("Prevented {} - saved ${}", exploit_type, potential_loss),
        timestamp,
        tx_hash,
    };

    state
        .store
        .record_simulated(assessment.clone(), alert.clone(), potential_loss);

    info!("Simulated exploit blocked: {}", exploit_type);

    Json(SimulateExploitResponse {
        success: true,
        exploit_type: exploit_type.to_string(),
        potential_loss,
        assessment,
        alert,
    })
}

// ============================================
// AI provider surface
// ============================================

pub async fn ai_status(State(state): State<Arc<AppState>>) -> Json<ProviderStatus> {
    Json(state.manager.status())
}

pub async fn ai_analyze(
    State(state): State<Arc<AppState>>,
    Json(tx): Json<TransactionInput>,
) -> Result<Json<AnalysisResult>, AppError> {
    tx.validate()?;
    let result = state.manager.analyze(&tx).await?;
    Ok(Json(result))
}

pub async fn ai_providers(State(state): State<Arc<AppState>>) -> Json<ProviderCatalog> {
    Json(state.manager.capabilities())
}

// ============================================
// Blockchain passthrough
// ============================================

pub async fn chain_update_risk(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateRiskRequest>,
) -> Result<Json<UpdateRiskResponse>, AppError> {
    let guard = state.guard()?;
    let tx_hash = guard.update_risk_score(&req.address, req.risk_score).await?;
    Ok(Json(UpdateRiskResponse {
        success: true,
        tx_hash,
        count: 1,
    }))
}

pub async fn chain_batch_update_risk(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchUpdateRiskRequest>,
) -> Result<Json<UpdateRiskResponse>, AppError> {
    let guard = state.guard()?;
    let updates: Vec<(String, u8)> = req
        .updates
        .iter()
        .map(|u| (u.address.clone(), u.risk_score))
        .collect();
    let tx_hash = guard.batch_update_risk_scores(&updates).await?;
    Ok(Json(UpdateRiskResponse {
        success: true,
        tx_hash,
        count: updates.len(),
    }))
}

pub async fn chain_risk(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<ChainRiskResponse>, AppError> {
    let guard = state.guard()?;
    let risk_score = guard.risk_score(&address).await?;
    Ok(Json(ChainRiskResponse { address, risk_score }))
}

pub async fn chain_safe(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<ChainSafeResponse>, AppError> {
    let guard = state.guard()?;
    let is_safe = guard.is_transaction_safe(&hash).await?;
    Ok(Json(ChainSafeResponse {
        tx_hash: hash,
        is_safe,
    }))
}

pub async fn chain_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChainFirewallStats>, AppError> {
    let guard = state.guard()?;
    Ok(Json(guard.firewall_stats().await?))
}

// ============================================
// BlockDAG passthrough
// ============================================

pub async fn blockdag_transaction(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<BlockDagTransaction>, AppError> {
    Ok(Json(state.blockdag()?.transaction(&hash).await?))
}

pub async fn blockdag_submit(
    State(state): State<Arc<AppState>>,
    Json(tx): Json<serde_json::Value>,
) -> Result<Json<SubmitTransactionResponse>, AppError> {
    let hash = state.blockdag()?.submit_transaction(tx).await?;
    Ok(Json(SubmitTransactionResponse { hash }))
}

pub async fn blockdag_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BlockDagStats>, AppError> {
    Ok(Json(state.blockdag()?.network_stats().await?))
}

pub async fn blockdag_update_profile(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RiskProfileRequest>,
) -> Result<Json<RiskProfile>, AppError> {
    let profile = state
        .blockdag()?
        .update_risk_profile(&req.contract_address, req.risk_score, &req.threat_level)
        .await?;
    Ok(Json(profile))
}

pub async fn blockdag_profile(
    State(state): State<Arc<AppState>>,
    Path(address): Path<String>,
) -> Result<Json<RiskProfile>, AppError> {
    Ok(Json(state.blockdag()?.risk_profile(&address).await?))
}

pub async fn blockdag_health(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AppError> {
    Ok(Json(state.blockdag()?.health().await?))
}

pub async fn blockdag_tips(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DagTipsResponse>, AppError> {
    let tips = state.blockdag()?.dag_tips().await?;
    Ok(Json(DagTipsResponse { tips }))
}

pub async fn blockdag_validate(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DagValidateResponse>, AppError> {
    let valid = state.blockdag()?.validate_dag().await?;
    Ok(Json(DagValidateResponse { valid }))
}
