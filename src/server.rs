// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! JSON-over-HTTP request handling.
//!
//! ## Endpoints
//!
//! - `POST /transfer` - Move funds; returns the sender's new balance
//! - `GET /accounts` - List all accounts
//! - `GET /accounts/{address}` - Get an account (created with zero balance if unseen)
//! - `GET /health` - Liveness probe
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST http://localhost:8080/transfer \
//!   -H "Content-Type: application/json" \
//!   -d '{"from_address": "0x0000000000000000000000000000000000000000",
//!        "to_address": "0x1234567890123456789012345678901234567890",
//!        "amount": "100"}'
//!
//! curl http://localhost:8080/accounts/0x1234567890123456789012345678901234567890
//! ```

use crate::account::Account;
use crate::amount::{Amount, Balance};
use crate::base::{Address, AddressError};
use crate::engine::Engine;
use crate::error::{StoreError, TransferError};
use crate::store::LedgerStore;
use crate::transfer::TransferRequest;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

// === Request/Response DTOs ===

/// Request body for `POST /transfer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferBody {
    pub from_address: Address,
    pub to_address: Address,
    pub amount: Amount,
}

impl From<TransferBody> for TransferRequest {
    fn from(body: TransferBody) -> Self {
        TransferRequest::new(body.from_address, body.to_address, body.amount)
    }
}

/// Response body for account information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResponse {
    pub address: Address,
    pub balance: Balance,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            address: account.address,
            balance: account.balance,
        }
    }
}

/// Response body for errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// === Application State ===

/// Shared application state containing the transfer engine.
pub struct AppState<S> {
    pub engine: Arc<Engine<S>>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

// === Error Handling ===

/// Errors surfaced by the HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    Transfer(TransferError),
    InvalidAddress(AddressError),
    Storage(StoreError),
}

impl From<TransferError> for AppError {
    fn from(err: TransferError) -> Self {
        AppError::Transfer(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Storage(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Transfer(err) => {
                let kind = err.kind();
                let status = match err {
                    TransferError::InvalidAmountNonPositive
                    | TransferError::InvalidAmountNonInteger => StatusCode::BAD_REQUEST,
                    TransferError::SenderNotFound(_) => StatusCode::NOT_FOUND,
                    TransferError::InsufficientBalance => StatusCode::UNPROCESSABLE_ENTITY,
                    TransferError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, kind.code(), err.to_string())
            }
            AppError::InvalidAddress(err) => {
                (StatusCode::BAD_REQUEST, "INVALID_ADDRESS", err.to_string())
            }
            AppError::Storage(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                err.to_string(),
            ),
        };

        if status.is_server_error() {
            error!(error = %message, "request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: code.to_string(),
            }),
        )
            .into_response()
    }
}

// === Handlers ===

/// POST /transfer - Move funds between two addresses.
async fn transfer<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    Json(body): Json<TransferBody>,
) -> Result<Json<AccountResponse>, AppError> {
    let request = TransferRequest::from(body);
    let result = state.engine.execute(&request)?;
    Ok(Json(AccountResponse {
        address: result.address,
        balance: result.sender_balance,
    }))
}

/// GET /accounts/{address} - Get account by address.
async fn get_account<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
    Path(address): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    let address: Address = address.parse().map_err(AppError::InvalidAddress)?;
    let account = state.engine.resolve(&address)?;
    Ok(Json(account.into()))
}

/// GET /accounts - List all accounts.
async fn list_accounts<S: LedgerStore + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<AccountResponse>>, AppError> {
    let accounts = state.engine.accounts()?;
    Ok(Json(accounts.into_iter().map(AccountResponse::from).collect()))
}

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// === Router ===

pub fn router<S: LedgerStore + 'static>(engine: Arc<Engine<S>>) -> Router {
    let state = AppState { engine };
    Router::new()
        .route("/transfer", post(transfer::<S>))
        .route("/accounts", get(list_accounts::<S>))
        .route("/accounts/{address}", get(get_account::<S>))
        .route("/health", get(health))
        .with_state(state)
}

/// Serves the router on `listener` until Ctrl-C or SIGTERM.
pub async fn serve<S: LedgerStore + 'static>(
    listener: TcpListener,
    engine: Arc<Engine<S>>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "ledger API listening");
    }
    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

/// Resolves when the process receives Ctrl-C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl-C, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}
