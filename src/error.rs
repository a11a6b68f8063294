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

//! Error types for transfer processing.
//!
//! [`StoreError`] is what the ledger store reports. [`TransferError`] is what
//! callers of the engine see; `From<StoreError>` is the mapping between the
//! two. [`ErrorKind`] gives each outcome a stable code for wire layers.

use crate::amount::Balance;
use crate::base::Address;
use thiserror::Error;

/// Failures reported by a [`LedgerStore`](crate::LedgerStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No row exists for the address
    #[error("account not found: {0}")]
    AccountNotFound(Address),

    /// Debit would take the balance below zero
    #[error("insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        available: Balance,
        requested: Balance,
    },

    /// Credit would exceed the maximum representable balance
    #[error("balance overflow on account {0}")]
    BalanceOverflow(Address),
}

/// Transfer processing errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Amount is zero or negative
    #[error("transfer amount must be positive")]
    InvalidAmountNonPositive,

    /// Amount has a non-zero fractional part
    #[error("transfer amount must be a whole number")]
    InvalidAmountNonInteger,

    /// Sender has no account row
    #[error("sender address not found: {0}")]
    SenderNotFound(Address),

    /// Sender balance is below the requested amount
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Storage failure unrelated to the transfer's business rules
    #[error("storage error: {0}")]
    Storage(StoreError),
}

/// Distinguishable outcome classes of a failed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidAmountNonPositive,
    InvalidAmountNonInteger,
    SenderNotFound,
    InsufficientBalance,
    Storage,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidAmountNonPositive => "INVALID_AMOUNT_NON_POSITIVE",
            ErrorKind::InvalidAmountNonInteger => "INVALID_AMOUNT_NON_INTEGER",
            ErrorKind::SenderNotFound => "SENDER_NOT_FOUND",
            ErrorKind::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ErrorKind::Storage => "STORAGE_ERROR",
        }
    }

    /// Returns `true` for business-rule failures, `false` for infrastructure.
    pub fn is_domain(&self) -> bool {
        !matches!(self, ErrorKind::Storage)
    }
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::InvalidAmountNonPositive => ErrorKind::InvalidAmountNonPositive,
            TransferError::InvalidAmountNonInteger => ErrorKind::InvalidAmountNonInteger,
            TransferError::SenderNotFound(_) => ErrorKind::SenderNotFound,
            TransferError::InsufficientBalance => ErrorKind::InsufficientBalance,
            TransferError::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<StoreError> for TransferError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AccountNotFound(address) => TransferError::SenderNotFound(address),
            StoreError::InsufficientBalance { .. } => TransferError::InsufficientBalance,
            other => TransferError::Storage(other),
        }
    }
}
