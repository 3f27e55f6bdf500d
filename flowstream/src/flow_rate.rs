//! Flow rates and the monthly projection shown next to the rate input.
//!
//! A flow rate is the amount of the token's smallest unit streamed per
//! second. The projection is display-only: it is derived from the raw input
//! string and never fed back into an operation.

use alloy_primitives::aliases::I96;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::StreamError;

pub const SECONDS_PER_DAY: u128 = 86_400;
pub const DAYS_PER_MONTH: u128 = 30;
pub const SECONDS_PER_MONTH: u128 = SECONDS_PER_DAY * DAYS_PER_MONTH;

/// Smallest units per whole token (18 decimals).
pub const UNITS_PER_TOKEN: u128 = 1_000_000_000_000_000_000;
const TOKEN_DECIMALS: usize = 18;

/// Largest flow rate the protocol accepts (`int96` max).
pub const MAX_FLOW_RATE: u128 = (1u128 << 95) - 1;

/// Smallest-unit-per-second rate submitted to the protocol.
///
/// Serialized as a decimal string, the way wallets and the protocol SDKs
/// pass flow rates around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowRate(u128);

impl FlowRate {
    pub const ZERO: FlowRate = FlowRate(0);

    pub fn new(units_per_second: u128) -> Result<Self, StreamError> {
        if units_per_second > MAX_FLOW_RATE {
            return Err(StreamError::InvalidNumber(format!(
                "flow rate {} exceeds the int96 maximum",
                units_per_second
            )));
        }
        Ok(Self(units_per_second))
    }

    pub fn units_per_second(&self) -> u128 {
        self.0
    }

    /// The protocol's `int96` argument. Always in range, since
    /// [`new`](Self::new) bounds the value by [`MAX_FLOW_RATE`].
    pub fn to_int96(&self) -> I96 {
        I96::try_from(self.0).unwrap_or(I96::MAX)
    }
}

impl FromStr for FlowRate {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FlowRate::new(parse_units(s)?)
    }
}

impl fmt::Display for FlowRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for FlowRate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FlowRate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Projected amount streamed in 30 days, in smallest units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct MonthlyAmount(u128);

impl MonthlyAmount {
    pub fn units(&self) -> u128 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for MonthlyAmount {
    /// Whole-token decimal with trailing zeros trimmed (`2.592`, `0`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNITS_PER_TOKEN;
        let frac = self.0 % UNITS_PER_TOKEN;
        if frac == 0 {
            return write!(f, "{}", whole);
        }
        let frac = format!("{:0width$}", frac, width = TOKEN_DECIMALS);
        write!(f, "{}.{}", whole, frac.trim_end_matches('0'))
    }
}

/// Convert a per-second smallest-unit amount (as typed into the form) into
/// its monthly projection: `amount × 86400 × 30`, shown in whole tokens.
///
/// An empty field counts as zero. Anything that is not a non-negative
/// integer is rejected with [`StreamError::InvalidNumber`].
pub fn to_monthly_display(amount: &str) -> Result<MonthlyAmount, StreamError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Ok(MonthlyAmount::default());
    }

    let units = parse_units(amount)?;
    units
        .checked_mul(SECONDS_PER_MONTH)
        .map(MonthlyAmount)
        .ok_or_else(|| StreamError::InvalidNumber(format!("{} is too large", amount)))
}

fn parse_units(s: &str) -> Result<u128, StreamError> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StreamError::InvalidNumber(format!(
            "'{}' is not a non-negative integer",
            s
        )));
    }
    s.parse::<u128>()
        .map_err(|_| StreamError::InvalidNumber(format!("{} is too large", s)))
}
