//! Arbitrary precision integers using dashu
//!
//! Config integers have no fixed width: `2 ** 100` stays exact.
//! Floor division and modulo round toward negative infinity, and the
//! bitwise operators treat negative numbers as infinite two's complement.

use dashu_int::ops::BitTest;
use dashu_int::IBig;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error type for integer operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegerError {
    #[error("invalid literal for int() with base {radix}: '{text}'")]
    ParseError { text: String, radix: u32 },

    #[error("integer division or modulo by zero")]
    DivisionByZero,

    #[error("negative shift count")]
    NegativeShift,

    #[error("cannot convert float {0} to integer")]
    NonFinite(String),

    #[error("{0}")]
    Overflow(&'static str),
}

/// Largest result, in bits, that `pow` and `shl` will build
pub const MAX_RESULT_BITS: usize = 1 << 26;

/// Arbitrary precision signed integer
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Integer {
    inner: IBig,
}

impl Integer {
    // ========== Construction ==========

    pub fn zero() -> Self {
        Self { inner: IBig::ZERO }
    }

    pub fn from_i64(n: i64) -> Self {
        Self { inner: IBig::from(n) }
    }

    /// Parse an integer literal in the given radix.
    ///
    /// Accepts surrounding whitespace, a sign, `_` digit separators and a
    /// `0x`/`0o`/`0b` prefix matching the radix. Radix 0 infers the base
    /// from the prefix (decimal when there is none).
    pub fn parse(text: &str, radix: u32) -> Result<Self, IntegerError> {
        let err = || IntegerError::ParseError { text: text.to_string(), radix };
        let trimmed = text.trim();
        let (negative, body) = match trimmed.as_bytes().first() {
            Some(b'-') => (true, &trimmed[1..]),
            Some(b'+') => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };
        let (radix, digits) = split_radix_prefix(body, radix).ok_or_else(err)?;
        if digits.is_empty()
            || digits.starts_with('_')
            || digits.ends_with('_')
            || digits.contains("__")
        {
            return Err(err());
        }
        let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
        let magnitude = IBig::from_str_radix(&cleaned, radix).map_err(|_| err())?;
        Ok(Self { inner: if negative { -magnitude } else { magnitude } })
    }

    /// Truncate a float toward zero
    pub fn from_f64(value: f64) -> Result<Self, IntegerError> {
        if !value.is_finite() {
            return Err(IntegerError::NonFinite(format!("{}", value)));
        }
        let truncated = value.trunc();
        if truncated.abs() < 9.0e18 {
            return Ok(Self::from_i64(truncated as i64));
        }
        // Beyond i64: go through the exact decimal expansion
        let digits = format!("{:.0}", truncated);
        digits
            .parse::<IBig>()
            .map(|inner| Self { inner })
            .map_err(|_| IntegerError::NonFinite(digits))
    }

    // ========== Predicates ==========

    pub fn is_zero(&self) -> bool {
        self.inner == IBig::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.inner < IBig::ZERO
    }

    // ========== Conversion ==========

    pub fn to_i64(&self) -> Option<i64> {
        i64::try_from(self.inner.clone()).ok()
    }

    pub fn to_usize(&self) -> Option<usize> {
        usize::try_from(self.inner.clone()).ok()
    }

    /// Convert to f64, failing when the magnitude exceeds the float range
    pub fn to_f64(&self) -> Result<f64, IntegerError> {
        if let Some(small) = self.to_i64() {
            return Ok(small as f64);
        }
        let approx: f64 = self
            .inner
            .to_string()
            .parse()
            .map_err(|_| IntegerError::Overflow("int too large to convert to float"))?;
        if approx.is_finite() {
            Ok(approx)
        } else {
            Err(IntegerError::Overflow("int too large to convert to float"))
        }
    }

    /// Render the magnitude in base 2..=36 with lowercase digits, keeping the sign
    pub fn to_str_radix(&self, radix: u32) -> String {
        let base = IBig::from(radix);
        let mut magnitude = self.abs().inner;
        let mut digits = Vec::new();
        while magnitude != IBig::ZERO {
            let digit = u32::try_from(&magnitude % &base).unwrap_or(0);
            digits.push(std::char::from_digit(digit, radix).unwrap_or('0'));
            magnitude = &magnitude / &base;
        }
        if digits.is_empty() {
            digits.push('0');
        }
        if self.is_negative() {
            digits.push('-');
        }
        digits.iter().rev().collect()
    }

    // ========== Arithmetic ==========

    pub fn add(&self, other: &Self) -> Self {
        Self { inner: &self.inner + &other.inner }
    }

    pub fn sub(&self, other: &Self) -> Self {
        Self { inner: &self.inner - &other.inner }
    }

    pub fn mul(&self, other: &Self) -> Self {
        Self { inner: &self.inner * &other.inner }
    }

    pub fn neg(&self) -> Self {
        Self { inner: -(self.inner.clone()) }
    }

    pub fn abs(&self) -> Self {
        if self.is_negative() {
            self.neg()
        } else {
            self.clone()
        }
    }

    /// Quotient rounded toward negative infinity
    pub fn floor_div(&self, other: &Self) -> Result<Self, IntegerError> {
        Ok(self.div_mod(other)?.0)
    }

    /// Remainder with the sign of the divisor
    pub fn modulo(&self, other: &Self) -> Result<Self, IntegerError> {
        Ok(self.div_mod(other)?.1)
    }

    pub fn div_mod(&self, other: &Self) -> Result<(Self, Self), IntegerError> {
        if other.is_zero() {
            return Err(IntegerError::DivisionByZero);
        }
        let mut quotient = &self.inner / &other.inner;
        let mut remainder = &self.inner % &other.inner;
        if remainder != IBig::ZERO && (remainder < IBig::ZERO) != other.is_negative() {
            quotient -= IBig::ONE;
            remainder += &other.inner;
        }
        Ok((Self { inner: quotient }, Self { inner: remainder }))
    }

    /// Magnitude width in bits, zero for zero
    pub fn bit_len(&self) -> usize {
        self.abs().inner.bit_len()
    }

    /// Non-negative integer power
    pub fn pow(&self, exponent: &Self) -> Result<Self, IntegerError> {
        let too_large = IntegerError::Overflow("exponent too large");
        if exponent.is_negative() {
            return Err(too_large);
        }
        // 0, 1 and -1 stay small whatever the exponent
        match self.to_i64() {
            Some(0) => return Ok(Self::from(exponent.is_zero())),
            Some(1) => return Ok(Self::from_i64(1)),
            Some(-1) => return Ok(Self::from_i64(if exponent.inner.bit(0) { -1 } else { 1 })),
            _ => {}
        }
        let exp = exponent.to_usize().ok_or(too_large.clone())?;
        if self.bit_len().saturating_mul(exp) > MAX_RESULT_BITS {
            return Err(too_large);
        }
        Ok(Self { inner: self.inner.pow(exp) })
    }

    /// `self ** exponent % modulus` by square-and-multiply
    pub fn pow_mod(&self, exponent: &Self, modulus: &Self) -> Result<Self, IntegerError> {
        if modulus.is_zero() {
            return Err(IntegerError::DivisionByZero);
        }
        let base = self.modulo(modulus)?;
        let mut result = Self::from_i64(1).modulo(modulus)?;
        for bit in (0..exponent.inner.bit_len()).rev() {
            result = result.mul(&result).modulo(modulus)?;
            if exponent.inner.bit(bit) {
                result = result.mul(&base).modulo(modulus)?;
            }
        }
        Ok(result)
    }

    pub fn shl(&self, count: &Self) -> Result<Self, IntegerError> {
        if count.is_negative() {
            return Err(IntegerError::NegativeShift);
        }
        if self.is_zero() {
            return Ok(Self::zero());
        }
        let too_large = IntegerError::Overflow("shift count too large");
        let bits = count.to_usize().ok_or(too_large.clone())?;
        if self.bit_len().saturating_add(bits) > MAX_RESULT_BITS {
            return Err(too_large);
        }
        Ok(Self { inner: &self.inner << bits })
    }

    pub fn shr(&self, count: &Self) -> Result<Self, IntegerError> {
        if count.is_negative() {
            return Err(IntegerError::NegativeShift);
        }
        match count.to_usize() {
            Some(bits) if bits <= self.inner.bit_len() => {
                let divisor = Self { inner: IBig::ONE << bits };
                self.floor_div(&divisor)
            }
            // Every significant bit shifted out
            _ => Ok(if self.is_negative() { Self::from_i64(-1) } else { Self::zero() }),
        }
    }

    pub fn bit_and(&self, other: &Self) -> Self {
        Self { inner: &self.inner & &other.inner }
    }

    pub fn bit_or(&self, other: &Self) -> Self {
        Self { inner: &self.inner | &other.inner }
    }

    pub fn bit_xor(&self, other: &Self) -> Self {
        Self { inner: &self.inner ^ &other.inner }
    }

    /// `~x == -x - 1`
    pub fn invert(&self) -> Self {
        Self { inner: -(self.inner.clone()) - IBig::ONE }
    }
}

fn split_radix_prefix(body: &str, radix: u32) -> Option<(u32, &str)> {
    let prefixed = match body.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => Some(16),
        Some("0o") => Some(8),
        Some("0b") => Some(2),
        _ => None,
    };
    match (radix, prefixed) {
        (0, Some(r)) => Some((r, &body[2..])),
        (0, None) => Some((10, body)),
        (r, Some(p)) if r == p => Some((r, &body[2..])),
        (r, _) if (2..=36).contains(&r) => Some((r, body)),
        _ => None,
    }
}

// ========== Trait Implementations ==========

impl std::fmt::Display for Integer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<i64> for Integer {
    fn from(n: i64) -> Self {
        Self::from_i64(n)
    }
}

impl From<usize> for Integer {
    fn from(n: usize) -> Self {
        Self { inner: IBig::from(n) }
    }
}

impl From<bool> for Integer {
    fn from(b: bool) -> Self {
        Self::from_i64(i64::from(b))
    }
}

impl Serialize for Integer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Integer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s, 10).map_err(serde::de::Error::custom)
    }
}
