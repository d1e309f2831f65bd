//! Rule-based fallback analysis.
//!
//! Always available, always succeeds. A handful of additive heuristics plus
//! bounded random jitter stand in for a model; the RNG is injectable so tests
//! can pin deterministic outputs.

use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ai::Provider;
use crate::models::{AnalysisResult, AppResult, TransactionInput};

/// Recipients treated as known-malicious.
const DENYLIST: [&str; 3] = [
    "0x1234567890abcdef1234567890abcdef12345678",
    "0xabcdef1234567890abcdef1234567890abcdef12",
    "0x9876543210fedcba9876543210fedcba98765432",
];

/// Threat labels reserved for denylisted recipients.
const DENYLIST_THREATS: [&str; 4] = [
    "Liquidity Drain",
    "Rug Pull Attempt",
    "Flash Loan Attack",
    "Governance Exploit",
];

const CANNED_REASONS: [&str; 5] = [
    "Suspicious gas limit and recipient pattern detected",
    "Unusual transaction value pattern identified",
    "Complex call data suggests potential exploit attempt",
    "Pattern matches known attack vectors",
    "Heuristic analysis indicates elevated risk",
];

/// Gas limit above which the high-gas rule fires.
const HIGH_GAS_LIMIT: i64 = 300_000;

/// Which scoring rules fired for a transaction.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleHits {
    pub denylisted: bool,
    pub high_gas: bool,
    pub large_value: bool,
    pub complex_data: bool,
}

/// Heuristic fallback provider.
pub struct HeuristicProvider {
    denylist: HashSet<String>,
    rng: Mutex<StdRng>,
}

impl HeuristicProvider {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Seeded constructor for deterministic tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            denylist: DENYLIST.iter().map(|a| a.to_string()).collect(),
            rng: Mutex::new(rng),
        }
    }

    /// Evaluate every rule against the transaction. Malformed numeric fields
    /// are treated as "rule did not fire", never as a hard error.
    pub fn evaluate(&self, tx: &TransactionInput) -> RuleHits {
        let high_gas = tx
            .gas_limit
            .parse::<i64>()
            .map(|g| g > HIGH_GAS_LIMIT)
            .unwrap_or(false);

        RuleHits {
            denylisted: self.denylist.contains(&tx.to.to_lowercase()),
            high_gas,
            // Crude large-round-value proxy, kept as-is from the rule set
            large_value: tx.value.contains("000") && tx.value.len() > 10,
            complex_data: tx.data.len() > 1000,
        }
    }

    /// Additive score contribution before jitter.
    pub fn base_score(hits: &RuleHits) -> i32 {
        let mut score = 0;
        if hits.denylisted {
            score += 40;
        }
        if hits.high_gas {
            score += 25;
        }
        if hits.large_value {
            score += 15;
        }
        if hits.complex_data {
            score += 10;
        }
        score
    }

    /// Run the full heuristic analysis synchronously.
    pub fn score(&self, tx: &TransactionInput) -> AnalysisResult {
        let started = Instant::now();
        let hits = self.evaluate(tx);

        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        // Jitter simulates model uncertainty
        let raw = Self::base_score(&hits) + rng.gen_range(-10..10);
        let risk_score = raw.clamp(0, 100) as u8;

        let threat_type = if hits.denylisted {
            DENYLIST_THREATS[rng.gen_range(0..DENYLIST_THREATS.len())].to_string()
        } else if risk_score > 80 {
            "High Risk Transaction".to_string()
        } else if risk_score > 50 {
            "Suspicious Activity".to_string()
        } else {
            "Normal Transaction".to_string()
        };

        let confidence =
            (risk_score as f64 / 100.0 + (rng.gen::<f64>() - 0.5) * 0.1).clamp(0.0, 1.0);

        let reasoning = if hits.denylisted {
            "Recipient address flagged as malicious in threat database".to_string()
        } else {
            CANNED_REASONS[rng.gen_range(0..CANNED_REASONS.len())].to_string()
        };

        let indicators = Self::indicators(&hits, risk_score);

        AnalysisResult {
            risk_score,
            threat_type,
            confidence,
            reasoning,
            provider: "heuristic".to_string(),
            indicators,
            process_time: started.elapsed().as_millis() as i64,
        }
    }

    fn indicators(hits: &RuleHits, risk_score: u8) -> Vec<String> {
        let mut indicators = Vec::new();

        if hits.denylisted {
            indicators.push("malicious-address".to_string());
        }
        if hits.high_gas {
            indicators.push("high-gas-limit".to_string());
        }
        if hits.complex_data {
            indicators.push("complex-call-data".to_string());
        }
        if hits.large_value {
            indicators.push("large-value-transfer".to_string());
        }
        if risk_score > 70 {
            indicators.push("high-risk-pattern".to_string());
        }

        if indicators.is_empty() {
            indicators.push("normal-transaction".to_string());
        }

        indicators
    }
}

impl Default for HeuristicProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Provider for HeuristicProvider {
    async fn analyze(&self, tx: &TransactionInput) -> AppResult<AnalysisResult> {
        Ok(self.score(tx))
    }

    fn name(&self) -> &str {
        "heuristic"
    }

    fn is_available(&self) -> bool {
        true
    }
}
