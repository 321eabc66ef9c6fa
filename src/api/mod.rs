// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    decryption::RevealedBond,
    models::{BondRecord, BondStats, BondStatus, Category, NewBond},
    state::AppState,
};

pub mod bonds;
pub mod health;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/bonds", get(bonds::list_bonds).post(bonds::issue_bond))
        .route("/bonds/stats", get(bonds::bond_stats))
        .route("/bonds/{bond_id}", get(bonds::get_bond))
        .route("/bonds/{bond_id}/reveal", post(bonds::reveal))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        bonds::list_bonds,
        bonds::bond_stats,
        bonds::get_bond,
        bonds::issue_bond,
        bonds::reveal
    ),
    components(
        schemas(
            BondRecord,
            BondStats,
            BondStatus,
            Category,
            NewBond,
            RevealedBond,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Bonds", description = "Green bond issuance and browsing"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
