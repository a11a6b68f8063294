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

//! Exact-precision numeric types.
//!
//! - [`Amount`] is what a caller asks to move: a signed decimal of arbitrary
//!   precision. It may be negative or carry a fractional part, and the engine
//!   rejects those before touching the store.
//! - [`Balance`] is what the ledger holds: an unsigned integer of up to
//!   [`Balance::MAX_DIGITS`] decimal digits.
//!
//! # Example
//!
//! ```
//! use token_ledger::{Amount, Balance};
//!
//! let amount: Amount = "150.5".parse().unwrap();
//! assert!(!amount.is_integer());
//!
//! let amount: Amount = "100.00".parse().unwrap();
//! assert_eq!(amount.to_balance(), Some(Balance::from(100u64)));
//! ```

use num_bigint::BigUint;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Largest decimal exponent accepted when parsing scientific notation.
const MAX_EXPONENT: u64 = 1_000;

/// Most significant digits an [`Amount`] may be written with, counting both
/// sides of the decimal point after leading and trailing zeros are dropped.
pub const MAX_AMOUNT_DIGITS: usize = 2 * Balance::MAX_DIGITS as usize;

/// Largest magnitude a JSON float can carry without losing integer precision.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

fn pow10(exponent: u32) -> BigUint {
    BigUint::from(10u32).pow(exponent)
}

/// Errors produced while parsing an [`Amount`] or [`Balance`] from text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("invalid character {0:?} in amount")]
    InvalidCharacter(char),

    #[error("exponent out of range")]
    ExponentOutOfRange,

    /// Too many digits for a [`Balance`] or an [`Amount`]
    #[error("value has too many digits")]
    TooLarge,
}

// === Balance ===

/// Non-negative integer balance held by an account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Balance(BigUint);

impl Balance {
    /// Maximum number of decimal digits a balance may hold.
    pub const MAX_DIGITS: u32 = 78;

    pub fn zero() -> Self {
        Balance(BigUint::ZERO)
    }

    /// Largest representable balance, `10^78 - 1`.
    pub fn max() -> Self {
        Balance(pow10(Self::MAX_DIGITS) - 1u32)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == BigUint::ZERO
    }

    /// Returns `self + other`, or `None` if the result exceeds [`Balance::max`].
    pub fn checked_add(&self, other: &Balance) -> Option<Balance> {
        let sum = Balance(&self.0 + &other.0);
        (sum <= Self::max()).then_some(sum)
    }

    /// Returns `self - other`, or `None` if the result would be negative.
    pub fn checked_sub(&self, other: &Balance) -> Option<Balance> {
        (self.0 >= other.0).then(|| Balance(&self.0 - &other.0))
    }

}

impl From<u64> for Balance {
    fn from(value: u64) -> Self {
        Balance(BigUint::from(value))
    }
}

impl TryFrom<BigUint> for Balance {
    type Error = AmountError;

    fn try_from(value: BigUint) -> Result<Self, Self::Error> {
        let balance = Balance(value);
        if balance > Self::max() {
            return Err(AmountError::TooLarge);
        }
        Ok(balance)
    }
}

impl FromStr for Balance {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(AmountError::Empty);
        }
        if let Some(c) = s.chars().find(|c| !c.is_ascii_digit()) {
            return Err(AmountError::InvalidCharacter(c));
        }
        if s.trim_start_matches('0').len() > Self::MAX_DIGITS as usize {
            return Err(AmountError::TooLarge);
        }
        let value = BigUint::parse_bytes(s.as_bytes(), 10).ok_or(AmountError::Empty)?;
        Balance::try_from(value)
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Balance {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Balance {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BalanceVisitor;

        impl Visitor<'_> for BalanceVisitor {
            type Value = Balance;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-negative integer or a string of decimal digits")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Balance, E> {
                Ok(Balance::from(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Balance, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(BalanceVisitor)
    }
}

// === Amount ===

/// Signed arbitrary-precision decimal requested for a transfer.
///
/// Stored as `(-1)^negative * mantissa * 10^-scale`. Zero is never negative.
/// Equality and ordering are numeric, so `100` equals `100.00`.
#[derive(Debug, Clone)]
pub struct Amount {
    negative: bool,
    mantissa: BigUint,
    scale: u32,
}

impl Amount {
    fn new(negative: bool, mantissa: BigUint, scale: u32) -> Self {
        let negative = negative && mantissa != BigUint::ZERO;
        Self {
            negative,
            mantissa,
            scale,
        }
    }

    pub fn zero() -> Self {
        Self::new(false, BigUint::ZERO, 0)
    }

    /// Returns `true` if the fractional part is zero.
    pub fn is_integer(&self) -> bool {
        self.scale == 0 || (&self.mantissa % pow10(self.scale)) == BigUint::ZERO
    }

    /// Returns `true` if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.negative && self.mantissa != BigUint::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.negative
    }

    /// Converts a whole, non-negative amount into a [`Balance`].
    ///
    /// Returns `None` for negative or fractional amounts and for values above
    /// [`Balance::max`].
    pub fn to_balance(&self) -> Option<Balance> {
        if self.negative || !self.is_integer() {
            return None;
        }
        Balance::try_from(&self.mantissa / pow10(self.scale)).ok()
    }

    fn magnitude_cmp(&self, other: &Amount) -> Ordering {
        let scale = self.scale.max(other.scale);
        let lhs = &self.mantissa * pow10(scale - self.scale);
        let rhs = &other.mantissa * pow10(scale - other.scale);
        lhs.cmp(&rhs)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parses `[+-]digits[.digits][(e|E)[+-]digits]`.
    ///
    /// Input with more than [`MAX_AMOUNT_DIGITS`] significant digits is
    /// rejected with [`AmountError::TooLarge`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            Some(_) => (false, s),
            None => return Err(AmountError::Empty),
        };

        let (number, exponent) = match rest.find(['e', 'E']) {
            Some(idx) => {
                let exp = &rest[idx + 1..];
                let exp: i64 = exp
                    .parse()
                    .map_err(|_| AmountError::ExponentOutOfRange)?;
                if exp.unsigned_abs() > MAX_EXPONENT {
                    return Err(AmountError::ExponentOutOfRange);
                }
                (&rest[..idx], exp)
            }
            None => (rest, 0),
        };

        let (int_part, frac_part) = match number.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (number, ""),
        };

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountError::Empty);
        }
        if let Some(c) = int_part
            .chars()
            .chain(frac_part.chars())
            .find(|c| !c.is_ascii_digit())
        {
            return Err(AmountError::InvalidCharacter(c));
        }

        let int_part = int_part.trim_start_matches('0');
        let frac_part = frac_part.trim_end_matches('0');
        if int_part.len() + frac_part.len() > MAX_AMOUNT_DIGITS {
            return Err(AmountError::TooLarge);
        }

        let digits = format!("{int_part}{frac_part}");
        let mut mantissa = if digits.is_empty() {
            BigUint::ZERO
        } else {
            BigUint::parse_bytes(digits.as_bytes(), 10).ok_or(AmountError::Empty)?
        };

        let scale = frac_part.len() as i64 - exponent;
        let scale = if scale < 0 {
            mantissa *= pow10((-scale) as u32);
            0
        } else {
            u32::try_from(scale).map_err(|_| AmountError::ExponentOutOfRange)?
        };

        Ok(Amount::new(negative, mantissa, scale))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            f.write_str("-")?;
        }
        let digits = self.mantissa.to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return f.write_str(&digits);
        }
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{int_part}.{frac_part}")
        } else {
            write!(f, "0.{}{}", "0".repeat(scale - digits.len()), digits)
        }
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.negative, other.negative) {
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => self.magnitude_cmp(other),
            (true, true) => other.magnitude_cmp(self),
        }
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount::new(false, BigUint::from(value), 0)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::new(value < 0, BigUint::from(value.unsigned_abs()), 0)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        let mantissa = value.mantissa();
        Amount::new(
            mantissa < 0,
            BigUint::from(mantissa.unsigned_abs()),
            value.scale(),
        )
    }
}

impl From<Balance> for Amount {
    fn from(value: Balance) -> Self {
        Amount::new(false, value.0, 0)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct AmountVisitor;

        impl Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal number or a decimal string")
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                Ok(Amount::from(v))
            }

            // Integers beyond the 64-bit range arrive here already rounded.
            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
                if !v.is_finite() || v.abs() > MAX_EXACT_FLOAT {
                    return Err(E::custom(
                        "numeric amount cannot be represented exactly, send it as a string",
                    ));
                }
                v.to_string().parse().map_err(E::custom)
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(E::custom)
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn amount(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn parse_integer_forms() {
        assert_eq!(amount("100"), Amount::from(100u64));
        assert_eq!(amount("+7"), Amount::from(7u64));
        assert_eq!(amount("-50"), Amount::from(-50i64));
        assert_eq!(amount("1e3"), Amount::from(1000u64));
    }

    #[test]
    fn trailing_zero_fraction_is_integer() {
        let value = amount("100.000");
        assert!(value.is_integer());
        assert_eq!(value.to_string(), "100");
        assert_eq!(value.to_balance(), Some(Balance::from(100u64)));
    }

    #[test]
    fn all_zero_digits_parse_as_zero() {
        assert_eq!(amount("0.000"), Amount::zero());
        assert_eq!(amount("000"), Amount::zero());
        assert_eq!(amount("-.0"), Amount::zero());
    }

    #[test]
    fn digit_count_is_capped() {
        let longest = "1".repeat(MAX_AMOUNT_DIGITS);
        assert!(longest.parse::<Amount>().is_ok());

        let too_long = "1".repeat(MAX_AMOUNT_DIGITS + 1);
        assert_eq!(too_long.parse::<Amount>(), Err(AmountError::TooLarge));

        let huge = format!("{}.{}", "1".repeat(1_000_000), "1".repeat(500_000));
        assert_eq!(huge.parse::<Amount>(), Err(AmountError::TooLarge));

        let tiny = format!("0.{}1", "0".repeat(MAX_AMOUNT_DIGITS));
        assert_eq!(tiny.parse::<Amount>(), Err(AmountError::TooLarge));
    }

    #[test]
    fn padding_zeros_do_not_count_toward_cap() {
        let padded = format!("{}7.5{}", "0".repeat(10_000), "0".repeat(10_000));
        assert_eq!(amount(&padded), amount("7.5"));
    }

    #[test]
    fn fractional_amount_is_not_integer() {
        let value = amount("150.5");
        assert!(!value.is_integer());
        assert!(value.is_positive());
        assert_eq!(value.to_balance(), None);
    }

    #[test]
    fn negative_zero_is_zero() {
        let value = amount("-0.00");
        assert!(!value.is_negative());
        assert!(!value.is_positive());
        assert_eq!(value, Amount::zero());
    }

    #[test]
    fn negative_exponent_adds_scale() {
        let value = amount("15e-1");
        assert_eq!(value, amount("1.5"));
        assert!(!value.is_integer());
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!("".parse::<Amount>(), Err(AmountError::Empty));
        assert_eq!("-".parse::<Amount>(), Err(AmountError::Empty));
        assert_eq!(".".parse::<Amount>(), Err(AmountError::Empty));
        assert_eq!("12a".parse::<Amount>(), Err(AmountError::InvalidCharacter('a')));
        assert_eq!("1.2.3".parse::<Amount>(), Err(AmountError::InvalidCharacter('.')));
        assert_eq!("1e".parse::<Amount>(), Err(AmountError::ExponentOutOfRange));
        assert_eq!("1e5000".parse::<Amount>(), Err(AmountError::ExponentOutOfRange));
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(amount("-100") < amount("-99.5"));
        assert!(amount("-1") < Amount::zero());
        assert!(amount("0.1") > Amount::zero());
        assert!(amount("10.01") > amount("10"));
        assert_eq!(amount("10.10"), amount("10.1"));
    }

    #[test]
    fn display_reinserts_decimal_point() {
        assert_eq!(amount("150.5").to_string(), "150.5");
        assert_eq!(amount("-0.05").to_string(), "-0.05");
        assert_eq!(amount("42").to_string(), "42");
    }

    #[test]
    fn from_decimal_keeps_scale() {
        let value = Amount::from(dec!(-100000.88));
        assert!(value.is_negative());
        assert!(!value.is_integer());
        assert_eq!(value, amount("-100000.88"));

        assert!(Amount::from(dec!(25.00)).is_integer());
    }

    #[test]
    fn amounts_beyond_u128_stay_exact() {
        let big = "1".repeat(78);
        let value = amount(&big);
        assert!(value.is_integer());
        assert_eq!(value.to_balance().unwrap().to_string(), big);
    }

    #[test]
    fn amount_above_balance_capacity_has_no_balance() {
        let value = amount(&format!("1{}", "0".repeat(78)));
        assert!(value.is_positive());
        assert_eq!(value.to_balance(), None);
    }

    #[test]
    fn balance_checked_arithmetic() {
        let ten = Balance::from(10u64);
        let eleven = Balance::from(11u64);
        assert_eq!(ten.checked_sub(&eleven), None);
        assert_eq!(eleven.checked_sub(&ten), Some(Balance::from(1u64)));
        assert_eq!(Balance::max().checked_add(&Balance::from(1u64)), None);
        assert_eq!(Balance::max().to_string().len(), 78);
    }

    #[test]
    fn balance_parse() {
        assert_eq!("1000000".parse::<Balance>(), Ok(Balance::from(1_000_000u64)));
        assert_eq!("-1".parse::<Balance>(), Err(AmountError::InvalidCharacter('-')));
        assert_eq!("1.5".parse::<Balance>(), Err(AmountError::InvalidCharacter('.')));
        assert_eq!(
            "9".repeat(79).parse::<Balance>(),
            Err(AmountError::TooLarge)
        );
        assert_eq!(
            "9".repeat(2_000_000).parse::<Balance>(),
            Err(AmountError::TooLarge)
        );
        assert_eq!(
            format!("{}1", "0".repeat(100)).parse::<Balance>(),
            Ok(Balance::from(1u64))
        );
    }

    #[test]
    fn serde_accepts_strings_and_numbers() {
        let from_str: Amount = serde_json::from_str("\"150.5\"").unwrap();
        let from_int: Amount = serde_json::from_str("-50").unwrap();
        let from_float: Amount = serde_json::from_str("150.5").unwrap();
        assert_eq!(from_str, from_float);
        assert_eq!(from_int, Amount::from(-50i64));

        let exact: Amount = serde_json::from_str("9007199254740992").unwrap();
        assert_eq!(exact, amount("9007199254740992"));

        let balance: Balance = serde_json::from_str("\"999900\"").unwrap();
        assert_eq!(serde_json::to_string(&balance).unwrap(), "\"999900\"");
    }

    #[test]
    fn oversized_json_number_is_rejected_not_rounded() {
        let err = serde_json::from_str::<Amount>("12345678901234567890123").unwrap_err();
        assert!(err.to_string().contains("send it as a string"));

        assert!(serde_json::from_str::<Amount>("-12345678901234567890123").is_err());
        assert!(serde_json::from_str::<Amount>("1e300").is_err());

        let quoted: Amount = serde_json::from_str("\"12345678901234567890123\"").unwrap();
        assert_eq!(quoted.to_string(), "12345678901234567890123");
    }
}
