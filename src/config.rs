//! Environment-driven configuration.
//!
//! Every optional collaborator (AI providers, TransactionGuard contract,
//! BlockDAG node) is enabled by the presence of its settings and silently
//! degraded when they are absent. Credentials are never logged.

use tracing::info;

/// Credentials and endpoint override for one AI provider.
#[derive(Debug, Clone, Default)]
pub struct AiProviderSettings {
    pub api_key: Option<String>,
    pub backup_key: Option<String>,
    pub base_url: Option<String>,
}

/// Settings for the TransactionGuard contract collaborator.
#[derive(Debug, Clone)]
pub struct ChainSettings {
    pub rpc_url: String,
    /// Backend oracle signing key; absent means the write path is disabled.
    pub signing_key: Option<String>,
    pub guard_address: Option<String>,
}

/// Settings for the BlockDAG REST collaborator.
#[derive(Debug, Clone)]
pub struct BlockDagSettings {
    pub node_url: String,
    pub api_key: Option<String>,
    pub network_id: String,
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct GuardConfig {
    pub host: String,
    pub port: u16,
    pub groq: AiProviderSettings,
    pub gemini: AiProviderSettings,
    pub chain: Option<ChainSettings>,
    pub blockdag: Option<BlockDagSettings>,
}

impl GuardConfig {
    /// Load configuration from the environment.
    pub fn from_env() -> Self {
        let host = std::env::var("GUARD_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("PORT")
            .or_else(|_| std::env::var("GUARD_PORT"))
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let groq = AiProviderSettings {
            api_key: env_nonempty("GROQ_API_KEY"),
            backup_key: env_nonempty("GROQ_API_2"),
            base_url: env_nonempty("GROQ_BASE_URL"),
        };
        if groq.api_key.is_some() {
            info!("🔑 GROQ_API_KEY configured (key hidden)");
        }

        let gemini = AiProviderSettings {
            api_key: env_nonempty("GEMINI_API_KEY"),
            backup_key: env_nonempty("GEMINI_API_2"),
            base_url: env_nonempty("GEMINI_BASE_URL"),
        };
        if gemini.api_key.is_some() {
            info!("🔑 GEMINI_API_KEY configured (key hidden)");
        }

        let chain = env_nonempty("BLOCKCHAIN_RPC_URL").map(|rpc_url| ChainSettings {
            rpc_url,
            signing_key: env_nonempty("BACKEND_PRIVATE_KEY"),
            guard_address: env_nonempty("TRANSACTION_GUARD_ADDRESS"),
        });

        let blockdag = env_nonempty("BLOCKDAG_NODE_URL").map(|node_url| BlockDagSettings {
            node_url,
            api_key: env_nonempty("BLOCKDAG_API_KEY"),
            network_id: env_nonempty("BLOCKDAG_NETWORK_ID")
                .unwrap_or_else(|| "mainnet".to_string()),
        });

        Self {
            host,
            port,
            groq,
            gemini,
            chain,
            blockdag,
        }
    }

    /// Defaults with every collaborator disabled, used by tests.
    pub fn disabled() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            groq: AiProviderSettings::default(),
            gemini: AiProviderSettings::default(),
            chain: None,
            blockdag: None,
        }
    }
}

/// Read an env var, treating empty strings and the placeholder value as
/// absent.
fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty() && v != "YOUR_API_KEY")
}
