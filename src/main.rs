// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use green_bond_registry::{
    api::router, config::Config, logging::init_tracing, state::AppState,
    wallet::LocalWalletSigner,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    let config = Config::from_env();
    init_tracing(config.log_format);

    std::fs::create_dir_all(&config.data_dir).expect("Failed to create data directory");

    let key_pem = std::fs::read(&config.signer_key_path).expect("Failed to read signer key");
    let signer = LocalWalletSigner::from_pem(&key_pem, config.chain_id)
        .expect("Failed to load signer key");

    let addr = config.bind_address();
    let state = AppState::open(config, signer).expect("Failed to open ledger");
    let shutdown = state.shutdown.clone();
    let app = router(state);

    let listener = TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");

    tracing::info!(%addr, "Green bond registry listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutting down");
            shutdown.cancel();
        })
        .await
        .expect("HTTP server failed");
}
