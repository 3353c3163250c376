//! 256-bit unsigned integer used for `UInt` attributes.
//!
//! Stored big-endian in 32 bytes so that the derived byte-wise ordering is
//! also the numeric ordering. Only the operations the registry and its
//! consumers need are provided: construction, comparison, narrowing and
//! text conversion.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 256-bit unsigned integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Uint256([u8; 32]);

/// Error returned when parsing a [`Uint256`] from text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseUint256Error {
    #[error("empty integer literal")]
    Empty,
    #[error("invalid digit in integer literal")]
    InvalidDigit,
    #[error("integer literal does not fit in 256 bits")]
    Overflow,
}

impl Uint256 {
    pub const ZERO: Self = Self([0u8; 32]);
    pub const MAX: Self = Self([0xff; 32]);

    /// Build from 32 big-endian bytes.
    pub const fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Return the 32 big-endian bytes.
    pub const fn to_be_bytes(self) -> [u8; 32] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Narrow to `u128`, or `None` if any of the high 16 bytes are set.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0[..16].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 16];
        low.copy_from_slice(&self.0[16..]);
        Some(u128::from_be_bytes(low))
    }

    /// Narrow to `u64`, or `None` if the value is too large.
    pub fn to_u64(&self) -> Option<u64> {
        self.to_u128().and_then(|v| u64::try_from(v).ok())
    }

    /// Lower-case hex with a `0x` prefix and no leading zeros.
    pub fn to_hex(&self) -> String {
        let full = hex::encode(self.0);
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{trimmed}")
        }
    }

    /// Parse a `0x`-prefixed hex literal of up to 64 digits.
    pub fn from_hex(s: &str) -> Result<Self, ParseUint256Error> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty() {
            return Err(ParseUint256Error::Empty);
        }
        if digits.len() > 64 {
            return Err(ParseUint256Error::Overflow);
        }
        let padded = format!("{digits:0>64}");
        let bytes = hex::decode(padded).map_err(|_| ParseUint256Error::InvalidDigit)?;
        let mut out = [0u8; 32];
        out.copy_from_slice(&bytes);
        Ok(Self(out))
    }

    /// Divide in place by a small divisor, returning the remainder.
    fn div_rem_small(&mut self, divisor: u8) -> u8 {
        let mut rem: u16 = 0;
        for byte in self.0.iter_mut() {
            let cur = (rem << 8) | u16::from(*byte);
            *byte = (cur / u16::from(divisor)) as u8;
            rem = cur % u16::from(divisor);
        }
        rem as u8
    }

    /// `self * 10 + digit`, or `None` on overflow.
    fn mul10_add(self, digit: u8) -> Option<Self> {
        let mut out = [0u8; 32];
        let mut carry: u16 = u16::from(digit);
        for (i, byte) in self.0.iter().enumerate().rev() {
            let cur = u16::from(*byte) * 10 + carry;
            out[i] = (cur & 0xff) as u8;
            carry = cur >> 8;
        }
        if carry != 0 {
            return None;
        }
        Some(Self(out))
    }
}

impl From<u64> for Uint256 {
    fn from(v: u64) -> Self {
        Self::from(u128::from(v))
    }
}

impl From<u128> for Uint256 {
    fn from(v: u128) -> Self {
        let mut out = [0u8; 32];
        out[16..].copy_from_slice(&v.to_be_bytes());
        Self(out)
    }
}

impl std::fmt::Display for Uint256 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut n = *self;
        let mut digits = Vec::with_capacity(78);
        while !n.is_zero() {
            digits.push(b'0' + n.div_rem_small(10));
        }
        digits.reverse();
        // Digits are ASCII by construction.
        write!(f, "{}", String::from_utf8_lossy(&digits))
    }
}

impl std::str::FromStr for Uint256 {
    type Err = ParseUint256Error;

    /// Accepts decimal, or hex with a `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("0x") || s.starts_with("0X") {
            return Self::from_hex(s);
        }
        if s.is_empty() {
            return Err(ParseUint256Error::Empty);
        }
        let mut acc = Self::ZERO;
        for ch in s.chars() {
            let digit = ch.to_digit(10).ok_or(ParseUint256Error::InvalidDigit)? as u8;
            acc = acc.mul10_add(digit).ok_or(ParseUint256Error::Overflow)?;
        }
        Ok(acc)
    }
}

impl Serialize for Uint256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Uint256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
