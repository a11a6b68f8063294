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

//! Transfer engine.
//!
//! The [`Engine`] is the central component that moves funds between accounts.
//! It validates each request, makes sure the sender exists, materializes the
//! recipient, and hands the debit/credit pair to the store as one atomic step.
//!
//! # Transfer Processing
//!
//! 1. **Validation**: the amount must be a positive whole number. No I/O.
//! 2. **Resolution**: the sender must already exist; the recipient is created
//!    with a zero balance if it has never been seen.
//! 3. **Atomic apply**: [`LedgerStore::apply_transfer`] checks the sender
//!    balance and performs both sides of the transfer, or neither.
//!
//! # Thread Safety
//!
//! The engine holds no mutable state of its own. Concurrent calls are
//! serialized by the store only where they share an address.

use crate::account::Account;
use crate::amount::{Amount, Balance};
use crate::base::Address;
use crate::error::{StoreError, TransferError};
use crate::resolver::AccountResolver;
use crate::store::{LedgerStore, MemoryStore};
use crate::transfer::{TransferRequest, TransferResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Transfer engine over an injected [`LedgerStore`].
///
/// # Invariants
///
/// - Balances never go negative.
/// - A successful transfer neither creates nor destroys value.
/// - Sender accounts are never created implicitly; recipients are.
pub struct Engine<S = MemoryStore> {
    store: Arc<S>,
    resolver: AccountResolver<S>,
}

impl Engine<MemoryStore> {
    /// Creates an engine over an empty [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}

impl Default for Engine<MemoryStore> {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl<S: LedgerStore> Engine<S> {
    pub fn new(store: Arc<S>) -> Self {
        let resolver = AccountResolver::new(Arc::clone(&store));
        Engine { store, resolver }
    }

    /// Returns the underlying store handle.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Executes a transfer and returns the sender's resulting balance.
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | amount ≤ 0 | `InvalidAmountNonPositive` |
    /// | amount has a fractional part | `InvalidAmountNonInteger` |
    /// | sender has no account | `SenderNotFound` |
    /// | sender balance < amount | `InsufficientBalance` |
    /// | `from == to` | balance unchanged, still checked |
    ///
    /// Failures leave every balance untouched. Nothing is retried.
    ///
    /// # Errors
    ///
    /// - [`TransferError::InvalidAmountNonPositive`] - Amount is zero or negative.
    /// - [`TransferError::InvalidAmountNonInteger`] - Amount is not a whole number.
    /// - [`TransferError::SenderNotFound`] - Sender address has no account.
    /// - [`TransferError::InsufficientBalance`] - Sender cannot cover the amount.
    /// - [`TransferError::Storage`] - The store failed for another reason.
    pub fn execute(&self, request: &TransferRequest) -> Result<TransferResult, TransferError> {
        request.validate()?;

        // Sender must exist before the recipient row is materialized.
        let sender = self.store.get(&request.from)?;

        let Some(amount) = request.amount.to_balance() else {
            // Validated as a positive integer, so only too large to hold.
            debug!(
                from = %request.from,
                amount = %request.amount,
                "amount exceeds balance capacity"
            );
            return Err(TransferError::InsufficientBalance);
        };

        let recipient = self
            .resolver
            .resolve(&request.to)
            .map_err(TransferError::Storage)?;
        debug!(
            from = %sender.address,
            to = %recipient.address,
            amount = %amount,
            "applying transfer"
        );

        let sender_balance = self
            .store
            .apply_transfer(&request.from, &request.to, &amount)
            .inspect_err(|err| debug!(from = %request.from, error = %err, "transfer rejected"))?;

        info!(
            from = %request.from,
            to = %request.to,
            amount = %amount,
            sender_balance = %sender_balance,
            "transfer applied"
        );

        Ok(TransferResult {
            address: request.from,
            sender_balance,
        })
    }

    /// Convenience wrapper around [`execute`](Engine::execute).
    pub fn transfer(
        &self,
        from: Address,
        to: Address,
        amount: impl Into<Amount>,
    ) -> Result<Balance, TransferError> {
        self.execute(&TransferRequest::new(from, to, amount))
            .map(|result| result.sender_balance)
    }

    /// Returns the current balance, or `None` if the address has no account.
    pub fn balance(&self, address: &Address) -> Result<Option<Balance>, StoreError> {
        match self.store.get(address) {
            Ok(account) => Ok(Some(account.balance)),
            Err(StoreError::AccountNotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Looks up an account for display, creating a zero-balance row if absent.
    pub fn resolve(&self, address: &Address) -> Result<Account, StoreError> {
        self.resolver.resolve(address)
    }

    /// Returns every account, ordered by address.
    pub fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        self.store.accounts()
    }
}
