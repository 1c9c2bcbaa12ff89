//! Numeric values backed by promotion ladders.
//!
//! Integers are stored in the narrowest of `i32`, `i64` or [`BigInt`] that
//! holds them; floating values in `f32`, `f64` or [`Decimal`]. Parsing tries
//! each rung in order of capacity and keeps the first that succeeds.
//!
//! Pairwise arithmetic follows a fixed result table rather than a blanket
//! "widest wins" rule:
//!
//! | left / right            | result    |
//! |-------------------------|-----------|
//! | `i32` with `i32`        | `i32`     |
//! | `i32`/`i64` with `i64`  | `i64`     |
//! | anything with `BigInt`  | `BigInt`  |
//! | `f32` with `f32`        | `f32`     |
//! | `Decimal` with `Decimal`| `Decimal` |
//! | any other float pair    | `f64`     |
//! | `i32`/`i64` with `f32`  | `f32`     |
//! | `BigInt` with `f32`     | `f64`     |
//! | any int with `f64`/`Decimal` | `f64` |
//!
//! Integer results that overflow their rung move up the integer ladder
//! instead of wrapping.

use std::{
    cmp::Ordering,
    fmt,
    ops::{Add, Div, Mul, Sub},
    str::FromStr,
};

use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use rust_decimal::Decimal;

use crate::diagnostics::{ErrorKind, Result, fatal};

#[derive(Debug, Clone)]
pub enum PromotedInt {
    Int32(i32),
    Int64(i64),
    Big(BigInt),
}

impl PromotedInt {
    pub fn parse(text: &str) -> Result<Self> {
        if let Ok(value) = text.parse::<i32>() {
            return Ok(Self::Int32(value));
        }
        if let Ok(value) = text.parse::<i64>() {
            return Ok(Self::Int64(value));
        }
        if let Ok(value) = BigInt::from_str(text) {
            return Ok(Self::Big(value));
        }
        Err(fatal(
            ErrorKind::OutOfRange,
            format!("the integer value '{text}' is too big or too small to support"),
        ))
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int32(value) => Some(i64::from(*value)),
            Self::Int64(value) => Some(*value),
            Self::Big(_) => None,
        }
    }

    pub fn to_big(&self) -> BigInt {
        match self {
            Self::Int32(value) => BigInt::from(*value),
            Self::Int64(value) => BigInt::from(*value),
            Self::Big(value) => value.clone(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Int32(value) => f64::from(*value),
            Self::Int64(value) => *value as f64,
            Self::Big(value) => value.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// Count usable for repetition; `None` when negative or too large.
    pub fn to_usize(&self) -> Option<usize> {
        match self {
            Self::Int32(value) => usize::try_from(*value).ok(),
            Self::Int64(value) => usize::try_from(*value).ok(),
            Self::Big(value) => value.to_usize(),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Int32(value) => *value == 0,
            Self::Int64(value) => *value == 0,
            Self::Big(value) => value.is_zero(),
        }
    }

    pub const fn rank(&self) -> &'static str {
        match self {
            Self::Int32(_) => "Int32",
            Self::Int64(_) => "Int64",
            Self::Big(_) => "BigInt",
        }
    }

    fn combine(
        &self,
        other: &Self,
        narrow: fn(i32, i32) -> Option<i32>,
        wide: fn(i64, i64) -> Option<i64>,
        big: fn(&BigInt, &BigInt) -> BigInt,
    ) -> Self {
        let widest = || Self::Big(big(&self.to_big(), &other.to_big()));
        match (self, other) {
            (Self::Int32(a), Self::Int32(b)) => narrow(*a, *b)
                .map(Self::Int32)
                .or_else(|| wide(i64::from(*a), i64::from(*b)).map(Self::Int64))
                .unwrap_or_else(widest),
            (Self::Big(_), _) | (_, Self::Big(_)) => widest(),
            _ => match (self.as_i64(), other.as_i64()) {
                (Some(a), Some(b)) => wide(a, b).map(Self::Int64).unwrap_or_else(widest),
                _ => widest(),
            },
        }
    }

    /// Lowers the value onto the float ladder by re-parsing its text, so a
    /// small integer lands on `f32` and a huge one may lose precision.
    pub fn to_float(&self) -> Result<PromotedFloat> {
        PromotedFloat::parse(&self.to_string())
    }
}

impl From<i32> for PromotedInt {
    fn from(value: i32) -> Self {
        Self::Int32(value)
    }
}

impl From<i64> for PromotedInt {
    fn from(value: i64) -> Self {
        Self::Int64(value)
    }
}

impl From<BigInt> for PromotedInt {
    fn from(value: BigInt) -> Self {
        Self::Big(value)
    }
}

impl fmt::Display for PromotedInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32(value) => write!(f, "{value}"),
            Self::Int64(value) => write!(f, "{value}"),
            Self::Big(value) => write!(f, "{value}"),
        }
    }
}

impl PartialEq for PromotedInt {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PromotedInt {}

impl PartialOrd for PromotedInt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PromotedInt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_i64(), other.as_i64()) {
            (Some(a), Some(b)) => a.cmp(&b),
            _ => self.to_big().cmp(&other.to_big()),
        }
    }
}

impl Add for &PromotedInt {
    type Output = PromotedInt;

    fn add(self, rhs: Self) -> PromotedInt {
        self.combine(rhs, i32::checked_add, i64::checked_add, |a, b| a + b)
    }
}

impl Sub for &PromotedInt {
    type Output = PromotedInt;

    fn sub(self, rhs: Self) -> PromotedInt {
        self.combine(rhs, i32::checked_sub, i64::checked_sub, |a, b| a - b)
    }
}

impl Mul for &PromotedInt {
    type Output = PromotedInt;

    fn mul(self, rhs: Self) -> PromotedInt {
        self.combine(rhs, i32::checked_mul, i64::checked_mul, |a, b| a * b)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PromotedFloat {
    Single(f32),
    Double(f64),
    Decimal(Decimal),
}

impl PromotedFloat {
    /// Narrow rungs win even when a wider one would be exact.
    pub fn parse(text: &str) -> Result<Self> {
        if let Ok(value) = text.parse::<f32>()
            && value.is_finite()
        {
            return Ok(Self::Single(value));
        }
        if let Ok(value) = text.parse::<f64>()
            && value.is_finite()
        {
            return Ok(Self::Double(value));
        }
        if let Ok(value) = Decimal::from_str(text) {
            return Ok(Self::Decimal(value));
        }
        Err(fatal(
            ErrorKind::OutOfRange,
            format!("the floating point number '{text}' is too big or too small to support"),
        ))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Self::Single(value) => f64::from(*value),
            Self::Double(value) => *value,
            Self::Decimal(value) => value.to_f64().unwrap_or(f64::NAN),
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Self::Single(value) => *value == 0.0,
            Self::Double(value) => *value == 0.0,
            Self::Decimal(value) => value.is_zero(),
        }
    }

    pub const fn rank(&self) -> &'static str {
        match self {
            Self::Single(_) => "Single",
            Self::Double(_) => "Double",
            Self::Decimal(_) => "Decimal",
        }
    }

    fn combine(
        &self,
        other: &Self,
        single: fn(f32, f32) -> f32,
        double: fn(f64, f64) -> f64,
        decimal: fn(Decimal, Decimal) -> Option<Decimal>,
    ) -> Self {
        match (self, other) {
            (Self::Single(a), Self::Single(b)) => Self::Single(single(*a, *b)),
            (Self::Decimal(a), Self::Decimal(b)) => decimal(*a, *b)
                .map(Self::Decimal)
                .unwrap_or_else(|| Self::Double(double(self.to_f64(), other.to_f64()))),
            _ => Self::Double(double(self.to_f64(), other.to_f64())),
        }
    }

    /// Representation an integer operand takes when it meets this float.
    #[allow(clippy::cast_precision_loss)]
    fn lift(&self, int: &PromotedInt) -> Self {
        match (int, self) {
            (PromotedInt::Int32(value), Self::Single(_)) => Self::Single(*value as f32),
            (PromotedInt::Int64(value), Self::Single(_)) => Self::Single(*value as f32),
            _ => Self::Double(int.to_f64()),
        }
    }
}

impl From<f32> for PromotedFloat {
    fn from(value: f32) -> Self {
        Self::Single(value)
    }
}

impl From<f64> for PromotedFloat {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<Decimal> for PromotedFloat {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl fmt::Display for PromotedFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
        }
    }
}

impl PartialEq for PromotedFloat {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for PromotedFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl PartialEq<PromotedFloat> for PromotedInt {
    fn eq(&self, other: &PromotedFloat) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd<PromotedFloat> for PromotedInt {
    fn partial_cmp(&self, other: &PromotedFloat) -> Option<Ordering> {
        self.to_f64().partial_cmp(&other.to_f64())
    }
}

impl PartialEq<PromotedInt> for PromotedFloat {
    fn eq(&self, other: &PromotedInt) -> bool {
        other == self
    }
}

impl PartialOrd<PromotedInt> for PromotedFloat {
    fn partial_cmp(&self, other: &PromotedInt) -> Option<Ordering> {
        other.partial_cmp(self).map(Ordering::reverse)
    }
}

macro_rules! float_ops {
    ($($trait:ident :: $method:ident => $op:tt, $checked:ident;)*) => {$(
        impl $trait for &PromotedFloat {
            type Output = PromotedFloat;

            fn $method(self, rhs: Self) -> PromotedFloat {
                self.combine(rhs, |a, b| a $op b, |a, b| a $op b, |a, b| a.$checked(b))
            }
        }

        impl $trait<&PromotedFloat> for &PromotedInt {
            type Output = PromotedFloat;

            fn $method(self, rhs: &PromotedFloat) -> PromotedFloat {
                &rhs.lift(self) $op rhs
            }
        }

        impl $trait<&PromotedInt> for &PromotedFloat {
            type Output = PromotedFloat;

            fn $method(self, rhs: &PromotedInt) -> PromotedFloat {
                self $op &self.lift(rhs)
            }
        }
    )*};
}

float_ops! {
    Add::add => +, checked_add;
    Sub::sub => -, checked_sub;
    Mul::mul => *, checked_mul;
    Div::div => /, checked_div;
}
