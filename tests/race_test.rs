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

//! Concurrent transfers racing against a shared sender.

use std::collections::BTreeSet;
use std::sync::{Arc, Barrier};
use std::thread;
use token_ledger::{Address, Balance, Engine, LedgerStore, TransferError};

const WALLET: Address = Address::ZERO;

fn address(byte: u8) -> Address {
    Address([byte; Address::LEN])
}

/// Runs every `(from, to, amount)` transfer on its own thread, released together.
fn race(
    engine: &Arc<Engine>,
    transfers: &[(Address, Address, u64)],
) -> Vec<Result<Balance, TransferError>> {
    let barrier = Arc::new(Barrier::new(transfers.len()));
    let handles: Vec<_> = transfers
        .iter()
        .map(|&(from, to, amount)| {
            let engine = engine.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                engine.transfer(from, to, amount)
            })
        })
        .collect();

    handles
        .into_iter()
        .map(|handle| handle.join().expect("Thread panicked"))
        .collect()
}

fn balance(engine: &Engine, address: &Address) -> u64 {
    engine
        .balance(address)
        .unwrap()
        .expect("account should exist")
        .to_string()
        .parse()
        .unwrap()
}

#[test]
fn two_debits_exceeding_balance_never_both_succeed() {
    for _ in 0..200 {
        let engine = Arc::new(Engine::in_memory());
        let store = engine.store();
        store.create_account(&WALLET, Balance::from(10u64)).unwrap();
        store.create_account(&address(0x11), Balance::from(1u64)).unwrap();
        store.create_account(&address(0x22), Balance::from(4u64)).unwrap();
        store.create_account(&address(0x33), Balance::from(7u64)).unwrap();

        let results = race(
            &engine,
            &[
                (address(0x11), WALLET, 1),
                (WALLET, address(0x22), 4),
                (WALLET, address(0x33), 7),
            ],
        );

        let final_balance = balance(&engine, &WALLET);
        assert!(
            [0, 4, 7].contains(&final_balance),
            "final balance {final_balance} not among expected outcomes (0, 4, 7)"
        );

        let insufficient = results
            .iter()
            .filter(|r| matches!(r, Err(TransferError::InsufficientBalance)))
            .count();
        assert!(
            results
                .iter()
                .all(|r| matches!(r, Ok(_) | Err(TransferError::InsufficientBalance)))
        );
        assert!(insufficient <= 1);
        assert_eq!(final_balance == 0, insufficient == 0);
    }
}

#[test]
fn concurrent_debits_apply_a_consistent_subset() {
    let amounts: [u64; 6] = [7, 4, 3, 9, 1, 5];
    let starting = 15u64;

    for _ in 0..100 {
        let engine = Arc::new(Engine::in_memory());
        engine
            .store()
            .create_account(&WALLET, Balance::from(starting))
            .unwrap();

        let transfers: Vec<_> = amounts
            .iter()
            .enumerate()
            .map(|(i, &amount)| (WALLET, address(i as u8 + 1), amount))
            .collect();
        let results = race(&engine, &transfers);

        let applied: u64 = amounts
            .iter()
            .zip(&results)
            .filter(|(_, r)| r.is_ok())
            .map(|(amount, _)| amount)
            .sum();
        let final_balance = balance(&engine, &WALLET);

        assert_eq!(final_balance, starting - applied);

        // Every rejected transfer was larger than the balance left at the end.
        for (amount, result) in amounts.iter().zip(&results) {
            match result {
                Ok(_) => {}
                Err(TransferError::InsufficientBalance) => assert!(*amount > final_balance),
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        // Each recipient holds exactly what it was sent, or nothing.
        for (i, (amount, result)) in amounts.iter().zip(&results).enumerate() {
            let received = balance(&engine, &address(i as u8 + 1));
            assert_eq!(received, if result.is_ok() { *amount } else { 0 });
        }

        // Each successful debit leaves a different sender balance.
        let reported: BTreeSet<String> = results
            .iter()
            .filter_map(|r| r.as_ref().ok().map(ToString::to_string))
            .collect();
        assert_eq!(reported.len(), results.iter().filter(|r| r.is_ok()).count());
    }
}
