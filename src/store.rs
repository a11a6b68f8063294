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

//! Ledger storage.
//!
//! [`LedgerStore`] is the only place balances change. Every mutation goes
//! through [`LedgerStore::apply_transfer`], which debits and credits as one
//! step or not at all.
//!
//! # Locking
//!
//! [`MemoryStore`] keeps one [`Mutex`] per account row inside a [`DashMap`].
//! A transfer clones both row handles out of the map first, so no map shard
//! guard is held while waiting on a row. It then locks the rows in ascending
//! address order: two transfers in opposite directions between the same pair
//! always contend on the same first lock and cannot deadlock.

use crate::account::Account;
use crate::amount::Balance;
use crate::base::Address;
use crate::error::StoreError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

/// Storage backend for account balances.
///
/// Implementations must make [`apply_transfer`](LedgerStore::apply_transfer)
/// atomic and serialized against every other call touching either address.
pub trait LedgerStore: Send + Sync {
    /// Returns the account for `address`.
    ///
    /// # Errors
    ///
    /// [`StoreError::AccountNotFound`] if no row exists.
    fn get(&self, address: &Address) -> Result<Account, StoreError>;

    /// Returns the account for `address`, inserting a zero-balance row if absent.
    fn get_or_create(&self, address: &Address) -> Result<Account, StoreError>;

    /// Inserts a row with `balance` unless one already exists.
    ///
    /// Existing rows are returned unchanged.
    fn create_account(&self, address: &Address, balance: Balance) -> Result<Account, StoreError>;

    /// Moves `amount` from `from` to `to` and returns the new sender balance.
    ///
    /// When `from == to` the balance is left unchanged, but it must still
    /// cover `amount`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AccountNotFound`] - either row is missing.
    /// - [`StoreError::InsufficientBalance`] - sender balance is below `amount`.
    /// - [`StoreError::BalanceOverflow`] - recipient would exceed [`Balance::max`].
    fn apply_transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: &Balance,
    ) -> Result<Balance, StoreError>;

    /// Returns a snapshot of every account, ordered by address.
    fn accounts(&self) -> Result<Vec<Account>, StoreError>;
}

type Row = Arc<Mutex<Balance>>;

/// In-process [`LedgerStore`] backed by a [`DashMap`] of row mutexes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: DashMap<Address, Row>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
        }
    }

    /// Number of account rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Clones the row handle out of the map, releasing the shard guard.
    fn row(&self, address: &Address) -> Result<Row, StoreError> {
        self.rows
            .get(address)
            .map(|row| Arc::clone(row.value()))
            .ok_or(StoreError::AccountNotFound(*address))
    }

    fn insert_if_absent(&self, address: &Address, balance: Balance) -> Row {
        match self.rows.entry(*address) {
            Entry::Occupied(entry) => Arc::clone(entry.get()),
            Entry::Vacant(entry) => {
                debug!(address = %address, balance = %balance, "account created");
                let row = Arc::new(Mutex::new(balance));
                entry.insert(Arc::clone(&row));
                row
            }
        }
    }
}

impl LedgerStore for MemoryStore {
    fn get(&self, address: &Address) -> Result<Account, StoreError> {
        let row = self.row(address)?;
        let balance = row.lock().clone();
        Ok(Account::with_balance(*address, balance))
    }

    fn get_or_create(&self, address: &Address) -> Result<Account, StoreError> {
        self.create_account(address, Balance::zero())
    }

    fn create_account(&self, address: &Address, balance: Balance) -> Result<Account, StoreError> {
        let row = self.insert_if_absent(address, balance);
        let balance = row.lock().clone();
        Ok(Account::with_balance(*address, balance))
    }

    fn apply_transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: &Balance,
    ) -> Result<Balance, StoreError> {
        let sender = self.row(from)?;

        if from == to {
            let balance = sender.lock();
            if *balance < *amount {
                return Err(StoreError::InsufficientBalance {
                    available: balance.clone(),
                    requested: amount.clone(),
                });
            }
            return Ok(balance.clone());
        }

        let recipient = self.row(to)?;

        // Lock in address order.
        let (mut sender_balance, mut recipient_balance) = if from < to {
            let sender_guard = sender.lock();
            let recipient_guard = recipient.lock();
            (sender_guard, recipient_guard)
        } else {
            let recipient_guard = recipient.lock();
            let sender_guard = sender.lock();
            (sender_guard, recipient_guard)
        };

        let debited = sender_balance.checked_sub(amount).ok_or_else(|| {
            StoreError::InsufficientBalance {
                available: sender_balance.clone(),
                requested: amount.clone(),
            }
        })?;
        let credited = recipient_balance
            .checked_add(amount)
            .ok_or(StoreError::BalanceOverflow(*to))?;

        *sender_balance = debited.clone();
        *recipient_balance = credited;
        Ok(debited)
    }

    fn accounts(&self) -> Result<Vec<Account>, StoreError> {
        let rows: Vec<(Address, Row)> = self
            .rows
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();

        let mut accounts: Vec<Account> = rows
            .into_iter()
            .map(|(address, row)| Account::with_balance(address, row.lock().clone()))
            .collect();
        accounts.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(accounts)
    }
}
