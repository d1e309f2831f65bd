//! TransactionGuard contract client.
//!
//! Mirrors risk scores to the on-chain firewall contract. Reads work with
//! just an RPC URL; writes additionally need the backend oracle signing key
//! and the deployed contract address. The risk push is fire-and-forget but
//! surfaced as an explicit task handle so callers can await it if they need
//! the outcome.

use std::sync::Arc;

use alloy::network::EthereumWallet;
use alloy::providers::ProviderBuilder;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy_primitives::{Address, B256, U256};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ChainSettings;
use crate::models::errors::{AppError, AppResult};

sol! {
    #[sol(rpc)]
    contract TransactionGuard {
        function updateRiskScore(address contractAddr, uint256 score) external;
        function batchUpdateRiskScores(address[] memory contracts, uint256[] memory scores) external;
        function riskScores(address contractAddr) external view returns (uint256);
        function isTransactionSafe(bytes32 txHash) external view returns (bool);
        function getFirewallStats() external view returns (
            uint256 transactionsScreened,
            uint256 exploitsBlocked,
            uint256 fundsProtected,
            uint256 activeValidators,
            uint256 totalStaked
        );
    }
}

/// Firewall statistics read from the contract.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainFirewallStats {
    pub transactions_screened: u64,
    pub exploits_blocked: u64,
    pub funds_protected: u64,
    pub active_validators: u64,
    pub total_staked: u64,
}

#[derive(Debug)]
pub struct GuardClient {
    rpc_url: String,
    signer: Option<PrivateKeySigner>,
    guard_address: Address,
}

impl GuardClient {
    pub fn from_settings(settings: &ChainSettings) -> AppResult<Self> {
        let signer = match &settings.signing_key {
            Some(key) => {
                let signer = key
                    .trim_start_matches("0x")
                    .parse::<PrivateKeySigner>()
                    .map_err(|e| {
                        AppError::chain_not_configured(format!("invalid backend signing key: {}", e))
                    })?;
                Some(signer)
            }
            None => {
                warn!("⚠️ No backend signing key found, on-chain writes disabled");
                None
            }
        };

        let guard_address = match &settings.guard_address {
            Some(addr) => addr
                .parse()
                .map_err(|_| AppError::invalid_address(addr))?,
            None => {
                warn!("⚠️ No TransactionGuard address found, using default");
                Address::ZERO
            }
        };

        info!("✅ Blockchain integration initialized - Guard: {}", guard_address);

        Ok(Self {
            rpc_url: settings.rpc_url.clone(),
            signer,
            guard_address,
        })
    }

    /// Whether the write path (signed transactions) is configured.
    pub fn can_write(&self) -> bool {
        self.signer.is_some() && self.guard_address != Address::ZERO
    }

    /// Push one risk score on-chain. Requires the write path.
    pub async fn update_risk_score(&self, contract_addr: &str, risk_score: u8) -> AppResult<String> {
        let signer = self
            .signer
            .clone()
            .ok_or_else(|| AppError::chain_not_configured("backend signing key not configured"))?;
        let target: Address = contract_addr
            .parse()
            .map_err(|_| AppError::invalid_address(contract_addr))?;

        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.url()?);
        let guard = TransactionGuard::new(self.guard_address, provider);

        let pending = guard
            .updateRiskScore(target, U256::from(risk_score))
            .send()
            .await
            .map_err(|e| AppError::chain_call_failed(format!("updateRiskScore failed: {}", e)))?;

        let tx_hash = *pending.tx_hash();
        info!("📡 Risk score updated on-chain - TX: {}", tx_hash);
        Ok(tx_hash.to_string())
    }

    /// Push several risk scores in one transaction.
    pub async fn batch_update_risk_scores(
        &self,
        updates: &[(String, u8)],
    ) -> AppResult<String> {
        if updates.is_empty() {
            return Err(AppError::bad_request("updates array cannot be empty"));
        }

        let signer = self
            .signer
            .clone()
            .ok_or_else(|| AppError::chain_not_configured("backend signing key not configured"))?;

        let mut contracts = Vec::with_capacity(updates.len());
        let mut scores = Vec::with_capacity(updates.len());
        for (addr, score) in updates {
            let parsed: Address = addr.parse().map_err(|_| AppError::invalid_address(addr))?;
            contracts.push(parsed);
            scores.push(U256::from(*score));
        }

        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.url()?);
        let guard = TransactionGuard::new(self.guard_address, provider);

        let pending = guard
            .batchUpdateRiskScores(contracts, scores)
            .send()
            .await
            .map_err(|e| {
                AppError::chain_call_failed(format!("batchUpdateRiskScores failed: {}", e))
            })?;

        let tx_hash = *pending.tx_hash();
        info!(
            "📡 Batch risk scores updated - TX: {}, Count: {}",
            tx_hash,
            updates.len()
        );
        Ok(tx_hash.to_string())
    }

    /// Read the stored risk score for a contract.
    pub async fn risk_score(&self, contract_addr: &str) -> AppResult<u64> {
        let target: Address = contract_addr
            .parse()
            .map_err(|_| AppError::invalid_address(contract_addr))?;

        let provider = ProviderBuilder::new().on_http(self.url()?);
        let guard = TransactionGuard::new(self.guard_address, provider);

        let result = guard
            .riskScores(target)
            .call()
            .await
            .map_err(|e| AppError::chain_call_failed(format!("riskScores call failed: {}", e)))?;

        Ok(result._0.try_into().unwrap_or(u64::MAX))
    }

    /// Check whether the firewall considers a transaction safe.
    pub async fn is_transaction_safe(&self, tx_hash: &str) -> AppResult<bool> {
        let hash: B256 = tx_hash
            .parse()
            .map_err(|_| AppError::invalid_hash(tx_hash))?;

        let provider = ProviderBuilder::new().on_http(self.url()?);
        let guard = TransactionGuard::new(self.guard_address, provider);

        let result = guard.isTransactionSafe(hash).call().await.map_err(|e| {
            AppError::chain_call_failed(format!("isTransactionSafe call failed: {}", e))
        })?;

        Ok(result._0)
    }

    /// Read aggregate firewall statistics from the contract.
    pub async fn firewall_stats(&self) -> AppResult<ChainFirewallStats> {
        let provider = ProviderBuilder::new().on_http(self.url()?);
        let guard = TransactionGuard::new(self.guard_address, provider);

        let stats = guard.getFirewallStats().call().await.map_err(|e| {
            AppError::chain_call_failed(format!("getFirewallStats call failed: {}", e))
        })?;

        Ok(ChainFirewallStats {
            transactions_screened: stats.transactionsScreened.try_into().unwrap_or(u64::MAX),
            exploits_blocked: stats.exploitsBlocked.try_into().unwrap_or(u64::MAX),
            funds_protected: stats.fundsProtected.try_into().unwrap_or(u64::MAX),
            active_validators: stats.activeValidators.try_into().unwrap_or(u64::MAX),
            total_staked: stats.totalStaked.try_into().unwrap_or(u64::MAX),
        })
    }

    /// Spawn the asynchronous risk push for a scored transaction. The
    /// returned handle can be awaited (tests) or dropped (request path);
    /// failures are only logged and never affect the HTTP response.
    pub fn spawn_risk_push(
        self: Arc<Self>,
        contract_addr: String,
        risk_score: u8,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(err) = self.update_risk_score(&contract_addr, risk_score).await {
                warn!("⚠️ On-chain risk push failed for {}: {}", contract_addr, err);
            }
        })
    }

    fn url(&self) -> AppResult<reqwest::Url> {
        self.rpc_url
            .parse()
            .map_err(|e| AppError::chain_call_failed(format!("invalid RPC URL: {}", e)))
    }
}
