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

//! Transfer requests and results.
//!
//! Neither type is persisted; they live for the duration of one
//! [`Engine::execute`](crate::Engine::execute) call.

use crate::amount::{Amount, Balance};
use crate::base::Address;
use crate::error::TransferError;
use serde::{Deserialize, Serialize};

/// Request to move `amount` from `from` to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from: Address,
    pub to: Address,
    pub amount: Amount,
}

impl TransferRequest {
    pub fn new(from: Address, to: Address, amount: impl Into<Amount>) -> Self {
        Self {
            from,
            to,
            amount: amount.into(),
        }
    }

    /// Checks the amount without touching any account.
    ///
    /// # Errors
    ///
    /// - [`TransferError::InvalidAmountNonPositive`] - amount is zero or negative.
    /// - [`TransferError::InvalidAmountNonInteger`] - amount has a fractional part.
    pub fn validate(&self) -> Result<(), TransferError> {
        if !self.amount.is_positive() {
            return Err(TransferError::InvalidAmountNonPositive);
        }
        if !self.amount.is_integer() {
            return Err(TransferError::InvalidAmountNonInteger);
        }
        Ok(())
    }
}

/// Outcome of a successful transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferResult {
    /// The sender's address.
    pub address: Address,
    /// The sender's balance after the transfer.
    pub sender_balance: Balance,
}
