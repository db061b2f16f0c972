// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    transfer::{BalanceError, TransferError},
    validation::{sanitize_for_display, ValidationError},
};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Sanitized detail of the underlying failure
    pub error: Option<String>,
}

/// Failure body shared by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`
    pub status: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            error: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Attach failure detail; it is sanitized before it reaches the body.
    pub fn with_detail(mut self, detail: impl AsRef<str>) -> Self {
        self.error = Some(sanitize_for_display(detail.as_ref()));
        self
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        if err.is_client_error() {
            ApiError::bad_request(err.to_string())
        } else {
            ApiError::internal("Transaction failed").with_detail(err.to_string())
        }
    }
}

impl From<BalanceError> for ApiError {
    fn from(err: BalanceError) -> Self {
        match err {
            BalanceError::InvalidAddress => ApiError::bad_request(err.to_string()),
            BalanceError::ProviderUnavailable(_) => ApiError::internal("Failed to fetch balance."),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            status: false,
            message: sanitize_for_display(&self.message),
            error: self.error,
        });
        (self.status, body).into_response()
    }
}
