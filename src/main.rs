//! DeFi Transaction Guard API server.
//!
//! Usage:
//!   cargo run
//!
//! Environment:
//!   GUARD_HOST / PORT          - bind address (default 0.0.0.0:8080)
//!   GROQ_API_KEY, GEMINI_API_KEY (+ _2 backups) - enable AI providers
//!   BLOCKCHAIN_RPC_URL, BACKEND_PRIVATE_KEY, TRANSACTION_GUARD_ADDRESS
//!   BLOCKDAG_NODE_URL, BLOCKDAG_API_KEY, BLOCKDAG_NETWORK_ID
//!   RUST_LOG                   - log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use txguard::api::{create_router, AppState};
use txguard::config::GuardConfig;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    print_banner();

    let config = GuardConfig::from_env();
    let state = Arc::new(AppState::from_config(&config));
    let app = create_router(state.clone());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🛡️ DeFi Transaction Guard API starting on http://{}", addr);
    info!("");
    info!("Endpoints:");
    info!("  POST /api/risk-score        - Score a transaction");
    info!("  GET  /api/assessment/:hash  - Stored assessment lookup");
    info!("  GET  /api/stats             - Firewall statistics");
    info!("  GET  /api/alerts            - Recent threat alerts");
    info!("  POST /api/simulate-exploit  - Demo exploit simulation");
    info!("  GET  /api/ai/status         - Provider availability");
    info!("  POST /api/ai/analyze        - Direct provider analysis");
    info!("  GET  /api/ai/providers      - Provider capabilities");
    info!("  */api/blockchain/*          - TransactionGuard contract passthrough");
    info!("  */api/blockdag/*            - BlockDAG network passthrough");
    info!("  GET  /health                - Health check");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("");
    info!("🛑 Shutdown signal received, cleaning up...");

    let stats = state.store.stats();
    info!("   Transactions screened: {}", stats.transactions_screened);
    info!("   Exploits blocked: {}", stats.exploits_blocked);
    info!("   Funds protected: ${}", stats.funds_protected);

    info!("👋 DeFi Transaction Guard API shutdown complete");

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ================================================
      DeFi TRANSACTION GUARD  v{}
      AI risk scoring with heuristic fallback
    ================================================
    "#,
        env!("CARGO_PKG_VERSION")
    );
}
