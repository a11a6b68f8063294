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

//! Account resolution.

use crate::account::Account;
use crate::base::Address;
use crate::error::StoreError;
use crate::store::LedgerStore;
use std::sync::Arc;

/// Materializes accounts on first reference.
///
/// Resolving an unknown address creates a zero-balance row; resolving it again
/// returns that same row.
pub struct AccountResolver<S> {
    store: Arc<S>,
}

impl<S: LedgerStore> AccountResolver<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn resolve(&self, address: &Address) -> Result<Account, StoreError> {
        self.store.get_or_create(address)
    }
}

impl<S> Clone for AccountResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
