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

//! # Token Ledger
//!
//! This library provides a ledger of per-address token balances with a single
//! mutating operation: transfer a positive whole amount from one address to
//! another, atomically and safely under concurrent access.
//!
//! ## Core Components
//!
//! - [`Engine`]: Validates transfers and applies them through the store
//! - [`LedgerStore`]: Storage trait with an atomic two-row transfer primitive
//! - [`MemoryStore`]: In-process store with per-account row locks
//! - [`AccountResolver`]: Materializes recipient accounts on first reference
//! - [`TransferError`]: Classified transfer failures
//!
//! ## Example
//!
//! ```
//! use token_ledger::{Address, Balance, Engine, LedgerConfig, bootstrap};
//!
//! let engine = Engine::in_memory();
//! bootstrap(engine.store().as_ref(), &LedgerConfig::default()).unwrap();
//!
//! let recipient: Address = "0x1234567890123456789012345678901234567890".parse().unwrap();
//! let remaining = engine.transfer(Address::ZERO, recipient, 100u64).unwrap();
//!
//! assert_eq!(remaining, Balance::from(999_900u64));
//! assert_eq!(engine.balance(&recipient).unwrap(), Some(Balance::from(100u64)));
//! ```
//!
//! ## Thread Safety
//!
//! Transfers that share an address are serialized by row locks taken in
//! address order; transfers over disjoint addresses run in parallel.

pub mod account;
pub mod amount;
mod base;
pub mod config;
mod engine;
pub mod error;
mod resolver;
pub mod server;
pub mod store;
mod transfer;

pub use account::Account;
pub use amount::{Amount, AmountError, Balance};
pub use base::{Address, AddressError};
pub use config::{LedgerConfig, ServerConfig, bootstrap};
pub use engine::Engine;
pub use error::{ErrorKind, StoreError, TransferError};
pub use resolver::AccountResolver;
pub use store::{LedgerStore, MemoryStore};
pub use transfer::{TransferRequest, TransferResult};
