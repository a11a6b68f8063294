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

//! Account records.
//!
//! An [`Account`] is a point-in-time snapshot of one ledger row. The live
//! balance is owned by the store; snapshots are never written back.
//!
//! # Example
//!
//! ```
//! use token_ledger::{Account, Address, Balance};
//!
//! let account = Account::new(Address::ZERO);
//! assert!(account.balance.is_zero());
//! ```

use crate::amount::Balance;
use crate::base::Address;
use serde::{Deserialize, Serialize};

/// Ledger account snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub address: Address,
    pub balance: Balance,
}

impl Account {
    /// Creates a zero-balance account.
    pub fn new(address: Address) -> Self {
        Self::with_balance(address, Balance::zero())
    }

    pub fn with_balance(address: Address, balance: Balance) -> Self {
        Self { address, balance }
    }
}
