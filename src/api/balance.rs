// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Blockchain balance query endpoint.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::ApiError, state::AppState, transfer::BalanceError};

/// Balance response.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    /// Always `true`
    pub status: bool,
    /// Queried address, as given
    pub address: String,
    /// Balance in ether, full precision
    pub balance: String,
}

/// Get the native balance of any address.
#[utoipa::path(
    get,
    path = "/balance/{address}",
    tag = "Wallet",
    params(
        ("address" = String, Path, description = "Account address (0x + 40 hex chars)")
    ),
    responses(
        (status = 200, description = "Balance retrieved successfully", body = BalanceResponse),
        (status = 400, description = "Invalid address", body = crate::error::ErrorBody),
        (status = 500, description = "Provider unavailable", body = crate::error::ErrorBody)
    )
)]
pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state
        .transfers
        .get_account_balance(&address)
        .await
        .map_err(|e| {
            match e {
                BalanceError::InvalidAddress => tracing::debug!(address = ?address, "Rejected balance query"),
                BalanceError::ProviderUnavailable(_) => {
                    tracing::error!(error = %e, %address, "Balance check error")
                }
            }
            ApiError::from(e)
        })?;

    Ok(Json(BalanceResponse {
        status: true,
        address: balance.address,
        balance: balance.balance,
    }))
}
