// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    decryption::{reveal_bond, ChallengeParams, RevealedBond},
    error::ApiError,
    models::{BondRecord, BondStats, NewBond},
    query::{self, CategoryFilter},
    state::AppState,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListQuery {
    /// Case-insensitive substring of the project name or category.
    pub search: Option<String>,
    /// `All` or one exact category name.
    #[param(value_type = Option<String>)]
    pub category: Option<CategoryFilter>,
}

#[utoipa::path(
    get,
    path = "/v1/bonds",
    params(ListQuery),
    tag = "Bonds",
    responses((status = 200, body = [BondRecord]))
)]
pub async fn list_bonds(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Vec<BondRecord>>, ApiError> {
    let bonds = state.registry.list().await?;
    let search = params.search.unwrap_or_default();
    let category = params.category.unwrap_or_default();
    Ok(Json(query::filter(&bonds, &search, category)))
}

#[utoipa::path(
    get,
    path = "/v1/bonds/stats",
    tag = "Bonds",
    responses((status = 200, body = BondStats))
)]
pub async fn bond_stats(State(state): State<AppState>) -> Result<Json<BondStats>, ApiError> {
    Ok(Json(state.registry.stats().await?))
}

#[utoipa::path(
    get,
    path = "/v1/bonds/{bond_id}",
    params(
        ("bond_id" = String, Path, description = "Bond identifier")
    ),
    tag = "Bonds",
    responses(
        (status = 200, body = BondRecord),
        (status = 404, description = "Unknown bond")
    )
)]
pub async fn get_bond(
    Path(bond_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<BondRecord>, ApiError> {
    state
        .registry
        .get(&bond_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Bond {bond_id} not found")))
}

/// Issue a bond stamped with the server wallet's address.
#[utoipa::path(
    post,
    path = "/v1/bonds",
    request_body = NewBond,
    tag = "Bonds",
    responses(
        (status = 201, body = BondRecord),
        (status = 400, description = "Invalid bond"),
        (status = 503, description = "Ledger unavailable")
    )
)]
pub async fn issue_bond(
    State(state): State<AppState>,
    Json(request): Json<NewBond>,
) -> Result<(StatusCode, Json<BondRecord>), ApiError> {
    let id = state
        .registry
        .issue_atomic(request, state.signer.as_ref())
        .await?;
    let record = state
        .registry
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::internal(format!("Issued bond {id} could not be read back")))?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Decrypt a bond's yield and amount with the server wallet's signature.
#[utoipa::path(
    post,
    path = "/v1/bonds/{bond_id}/reveal",
    params(
        ("bond_id" = String, Path, description = "Bond identifier")
    ),
    tag = "Bonds",
    responses(
        (status = 200, body = RevealedBond),
        (status = 404, description = "Unknown bond"),
        (status = 504, description = "Signature timed out")
    )
)]
pub async fn reveal(
    Path(bond_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<RevealedBond>, ApiError> {
    let record = state
        .registry
        .get(&bond_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Bond {bond_id} not found")))?;

    let params = ChallengeParams::for_wallet(
        state.signer.as_ref(),
        state.config.contract_address.clone(),
        state.config.decrypt_window_days,
    );
    let revealed = reveal_bond(
        state.signer.as_ref(),
        state.registry.codec(),
        &params,
        &record,
        state.config.signature_timeout,
        &state.shutdown,
    )
    .await?;
    Ok(Json(revealed))
}
