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

//! Runtime configuration and bootstrap.
//!
//! A ledger starts with one funded account, the default account. Every other
//! account enters the ledger as a transfer recipient.

use crate::account::Account;
use crate::amount::Balance;
use crate::base::Address;
use crate::error::StoreError;
use crate::store::LedgerStore;
use tracing::info;

/// Address of the account funded at bootstrap.
pub const DEFAULT_ACCOUNT: Address = Address::ZERO;

/// Initial balance of the default account.
pub const DEFAULT_BALANCE: u64 = 1_000_000;

/// Ledger bootstrap settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    pub default_account: Address,
    pub default_balance: Balance,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_account: DEFAULT_ACCOUNT,
            default_balance: Balance::from(DEFAULT_BALANCE),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Creates the default account unless it already exists.
///
/// Running it again leaves an existing default account, and its balance, as is.
pub fn bootstrap<S: LedgerStore>(store: &S, config: &LedgerConfig) -> Result<Account, StoreError> {
    let account = store.create_account(&config.default_account, config.default_balance.clone())?;
    info!(
        address = %account.address,
        balance = %account.balance,
        "default account ready"
    );
    Ok(account)
}
