// Copyright (c) 2025 Mikko Tanner. All rights reserved.
// Licensed under the MIT License or the Apache License, Version 2.0.
// SPDX-License-Identifier: MIT OR Apache-2.0

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors raised by the statistics core.
#[derive(Debug, Clone, PartialEq, Error)]
pub(crate) enum StatsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid value {0}: must be finite")]
    InvalidValue(f64),
    #[error("overflow: {value} makes the running {aggregate} of a {capacity}-slot window infinite")]
    Overflow {
        value: f64,
        capacity: usize,
        aggregate: &'static str,
    },
}

impl StatsError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        StatsError::InvalidInput(msg.into())
    }
}

/// Errors surfaced by the HTTP layer.
#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error(transparent)]
    Stats(#[from] StatsError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status: StatusCode = match &self {
            ApiError::Stats(_) => {
                tracing::debug!("rejected request: {self}");
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(_) => {
                tracing::error!("request failed: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
