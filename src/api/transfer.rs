// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Native-token transfer endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

use crate::{
    error::ApiError,
    state::AppState,
    validation::{sanitize_for_display, validate_transfer},
};

/// Request to send funds from the server account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransferRequest {
    /// Recipient address (0x + 40 hex chars)
    #[serde(default, deserialize_with = "text_or_number")]
    pub recipient: String,
    /// Amount in human-readable format (e.g., "1.5"). A JSON number is
    /// accepted and read as its decimal text.
    #[serde(default, deserialize_with = "text_or_number")]
    pub amount: String,
}

/// Read a string field that clients may also send as a JSON number.
/// `null` reads as empty.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Float(f64),
    }

    Ok(match Option::<Field>::deserialize(deserializer)? {
        None => String::new(),
        Some(Field::Text(text)) => text,
        Some(Field::Unsigned(n)) => n.to_string(),
        Some(Field::Signed(n)) => n.to_string(),
        Some(Field::Float(n)) => n.to_string(),
    })
}

/// Transfer success response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferResponse {
    /// Always `true`
    pub status: bool,
    pub message: String,
    /// Transaction hash
    #[serde(rename = "txHash")]
    pub tx_hash: String,
}

/// Send a native-token transfer signed by the server key.
#[utoipa::path(
    post,
    path = "/transfer",
    request_body = TransferRequest,
    tag = "Wallet",
    responses(
        (status = 200, description = "Transaction broadcast", body = TransferResponse),
        (status = 400, description = "Invalid input or insufficient balance", body = crate::error::ErrorBody),
        (status = 500, description = "Provider, gas estimation or broadcast failure", body = crate::error::ErrorBody)
    )
)]
pub async fn transfer(
    State(state): State<AppState>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Unreadable transfer body");
        ApiError::bad_request("Invalid request body.")
    })?;

    let validated = validate_transfer(&request.recipient, &request.amount).map_err(|e| {
        tracing::debug!(error = %e, "Rejected transfer request");
        ApiError::from(e)
    })?;

    let receipt = state
        .transfers
        .submit_transfer(&validated)
        .await
        .map_err(|e| {
            if e.is_client_error() {
                tracing::warn!(error = %e, recipient = %validated.recipient, "Transfer refused");
            } else {
                tracing::error!(error = %e, recipient = %validated.recipient, "Transaction error");
            }
            ApiError::from(e)
        })?;

    Ok(Json(TransferResponse {
        status: true,
        message: "Transaction successful".to_string(),
        tx_hash: sanitize_for_display(&receipt.tx_hash),
    }))
}
