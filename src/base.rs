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

//! Account addresses.
//!
//! An [`Address`] is a 20-byte identifier. Its text form is `0x` followed by
//! 40 hex digits, 42 characters in total. Addresses are printed with the
//! EIP-55 mixed-case checksum and parsed in any case.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while parsing an [`Address`] from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// Text is not 40 hex digits (after the optional `0x` prefix)
    #[error("expected {expected} hex digits, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Text contains a character outside `[0-9a-fA-F]`
    #[error("invalid hex character in address")]
    InvalidHex,
}

/// Unique identifier of a ledger account.
///
/// Ordering follows the raw byte value, which is the order in which the store
/// acquires row locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; Address::LEN]);

impl Address {
    /// Number of bytes in an address.
    pub const LEN: usize = 20;

    /// Length of the canonical text form, including the `0x` prefix.
    pub const HEX_LEN: usize = 2 + Self::LEN * 2;

    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; Self::LEN]);

    /// Returns the EIP-55 checksummed `0x`-prefixed form.
    ///
    /// A hex letter is uppercased when the matching nibble of the Keccak-256
    /// hash of the lowercase hex text is 8 or more.
    pub fn to_checksum_hex(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = Keccak256::digest(lower.as_bytes());

        let mut out = String::with_capacity(Self::HEX_LEN);
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);

        if digits.len() != Self::LEN * 2 {
            return Err(AddressError::InvalidLength {
                expected: Self::LEN * 2,
                actual: digits.len(),
            });
        }

        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| AddressError::InvalidHex)?;
        Ok(Address(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum_hex())
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_address_formats_to_42_chars() {
        let hex = Address::ZERO.to_string();
        assert_eq!(hex, "0x0000000000000000000000000000000000000000");
        assert_eq!(hex.len(), Address::HEX_LEN);
    }

    // Reference vectors from EIP-55.
    const CHECKSUMMED: [&str; 8] = [
        "0x52908400098527886E0F7030069857D2E4169EE7",
        "0x8617E340B3D01FA5F11F306F4090FD50C238070D",
        "0xde709f2102306220921060314715629080e2fb77",
        "0x27b1fdb04752bbc536007a920d24acb045561c26",
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn formats_with_eip55_checksum() {
        for expected in CHECKSUMMED {
            let lower: Address = expected.to_lowercase().parse().unwrap();
            let upper: Address = expected[2..].to_uppercase().parse().unwrap();
            assert_eq!(lower, upper);
            assert_eq!(lower.to_checksum_hex(), expected);
            assert_eq!(upper.to_string(), expected);
        }
    }

    #[test]
    fn parse_ignores_case() {
        let address: Address = "0x5AAEB6053f3e94c9b9a09f33669435e7ef1beaed".parse().unwrap();
        assert_eq!(address.to_string(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn parse_without_prefix() {
        let address: Address = "ffffffffffffffffffffffffffffffffffffffff".parse().unwrap();
        assert_eq!(address, Address([0xff; 20]));
    }

    #[test]
    fn parse_rejects_wrong_length() {
        assert_eq!(
            "0xabdefg".parse::<Address>(),
            Err(AddressError::InvalidLength {
                expected: 40,
                actual: 6
            })
        );
        assert!(matches!(
            "".parse::<Address>(),
            Err(AddressError::InvalidLength { actual: 0, .. })
        ));
        assert!(matches!(
            "0x00000000000000000000000000000000000000000000".parse::<Address>(),
            Err(AddressError::InvalidLength { actual: 44, .. })
        ));
    }

    #[test]
    fn parse_rejects_non_hex() {
        assert_eq!(
            "0xzz34567890123456789012345678901234567890".parse::<Address>(),
            Err(AddressError::InvalidHex)
        );
    }

    #[test]
    fn ordering_follows_bytes() {
        let low: Address = "0x0000000000000000000000000000000000000001".parse().unwrap();
        let high: Address = "0x1000000000000000000000000000000000000000".parse().unwrap();
        assert!(low < high);
    }

    #[test]
    fn serde_uses_text_form() {
        let address: Address = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359".parse().unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359\"");

        let back: Address = serde_json::from_str(&json).unwrap();
        assert_eq!(back, address);

        assert!(serde_json::from_str::<Address>("\"0x12\"").is_err());
    }
}
