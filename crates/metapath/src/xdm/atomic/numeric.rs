//! Integer and decimal values: lexical parsing, casting, rounding and the
//! fixed precision context used for decimal arithmetic.

use super::AtomicItem;
use crate::engine::runtime::{Error, ErrorCode, ErrorKind};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Significant digits kept by decimal arithmetic (decimal64).
pub(crate) const DECIMAL_PRECISION: u32 = 16;

/// Round a decimal arithmetic result to the decimal64 context (half-even).
pub(crate) fn in_context(d: Decimal) -> Decimal {
    if d.is_zero() {
        return Decimal::ZERO;
    }
    d.round_sf_with_strategy(DECIMAL_PRECISION, RoundingStrategy::MidpointNearestEven).unwrap_or(d)
}

/// Numeric classification carrying the promoted value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Num {
    Int(i64),
    Dec(Decimal),
}

impl Num {
    pub(crate) fn to_decimal(self) -> Decimal {
        match self {
            Num::Int(i) => Decimal::from(i),
            Num::Dec(d) => d,
        }
    }

    pub(crate) fn is_zero(self) -> bool {
        match self {
            Num::Int(i) => i == 0,
            Num::Dec(d) => d.is_zero(),
        }
    }
}

fn non_numeric(item: &AtomicItem) -> Error {
    Error::new(ErrorKind::InvalidArgumentType, format!("'{}' of type {} is not numeric", item, item.atomic_type()))
}

impl AtomicItem {
    pub(crate) fn as_num(&self) -> Option<Num> {
        match self {
            AtomicItem::Integer(i) | AtomicItem::NonNegativeInteger(i) | AtomicItem::PositiveInteger(i) => {
                Some(Num::Int(*i))
            }
            AtomicItem::Decimal(d) => Some(Num::Dec(*d)),
            _ => None,
        }
    }

    pub(crate) fn from_num(n: Num) -> Self {
        match n {
            Num::Int(i) => AtomicItem::Integer(i),
            Num::Dec(d) => AtomicItem::Decimal(d),
        }
    }

    /// The numeric value as a decimal, for any numeric item.
    pub fn as_decimal(&self) -> Option<Decimal> {
        self.as_num().map(Num::to_decimal)
    }

    /// The integer value of an integer-typed item.
    pub fn as_integer(&self) -> Option<i64> {
        match self.as_num()? {
            Num::Int(i) => Some(i),
            Num::Dec(_) => None,
        }
    }

    pub fn abs(&self) -> Result<AtomicItem, Error> {
        match self {
            AtomicItem::NonNegativeInteger(_) | AtomicItem::PositiveInteger(_) => Ok(self.clone()),
            AtomicItem::Integer(i) => i
                .checked_abs()
                .map(AtomicItem::Integer)
                .ok_or_else(|| Error::overflow(format!("absolute value of {i} overflows"))),
            AtomicItem::Decimal(d) => Ok(AtomicItem::Decimal(d.abs())),
            other => Err(non_numeric(other)),
        }
    }

    pub fn ceiling(&self) -> Result<AtomicItem, Error> {
        match self.as_num() {
            Some(Num::Int(_)) => Ok(self.clone()),
            Some(Num::Dec(d)) => Ok(AtomicItem::Decimal(d.ceil())),
            None => Err(non_numeric(self)),
        }
    }

    pub fn floor(&self) -> Result<AtomicItem, Error> {
        match self.as_num() {
            Some(Num::Int(_)) => Ok(self.clone()),
            Some(Num::Dec(d)) => Ok(AtomicItem::Decimal(d.floor())),
            None => Err(non_numeric(self)),
        }
    }

    /// Sign flip; integer subtypes collapse to plain integer.
    pub fn negate(&self) -> Result<AtomicItem, Error> {
        match self.as_num() {
            Some(Num::Int(i)) => {
                i.checked_neg().map(AtomicItem::Integer).ok_or_else(|| Error::overflow(format!("-({i}) overflows")))
            }
            Some(Num::Dec(d)) => Ok(AtomicItem::Decimal(-d)),
            None => Err(non_numeric(self)),
        }
    }

    pub fn round(&self) -> Result<AtomicItem, Error> {
        self.round_with_precision(0)
    }

    /// Round to `precision` decimal places; negative precisions round to a
    /// power of ten. Ties round away from zero.
    pub fn round_with_precision(&self, precision: i64) -> Result<AtomicItem, Error> {
        let num = self.as_num().ok_or_else(|| non_numeric(self))?;
        if precision >= 0 {
            return Ok(match num {
                Num::Int(_) => self.clone(),
                Num::Dec(d) => {
                    let dp = u32::try_from(precision).unwrap_or(u32::MAX).min(28);
                    AtomicItem::Decimal(d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero))
                }
            });
        }

        let value: i128 = match num {
            Num::Int(i) => i128::from(i),
            Num::Dec(d) => d.trunc().to_i128().ok_or_else(|| Error::overflow(format!("{d} is out of range")))?,
        };
        let divisor = u32::try_from(precision.unsigned_abs()).ok().and_then(|exp| 10i128.checked_pow(exp));
        let rounded = match divisor {
            Some(divisor) if divisor <= value.abs() => {
                let remainder = value.rem_euclid(divisor);
                let less_remainder = value - remainder;
                if remainder >= divisor / 2 { less_remainder + divisor } else { less_remainder }
            }
            _ => 0,
        };
        match num {
            Num::Int(_) => i64::try_from(rounded)
                .map(AtomicItem::Integer)
                .map_err(|_| Error::overflow(format!("rounding {value} overflows"))),
            Num::Dec(_) => Decimal::try_from_i128_with_scale(rounded, 0)
                .map(AtomicItem::Decimal)
                .map_err(|_| Error::overflow(format!("rounding {value} overflows"))),
        }
    }
}

fn is_integer_lexical(s: &str) -> bool {
    let digits = s.strip_prefix(['+', '-']).unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal_lexical(s: &str) -> bool {
    let body = s.strip_prefix(['+', '-']).unwrap_or(s);
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
    (!int_part.is_empty() || !frac_part.is_empty())
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

pub(crate) fn parse_integer(s: &str, type_name: &str) -> Result<i64, Error> {
    let s = s.trim();
    if !is_integer_lexical(s) {
        return Err(Error::invalid_lexical(type_name, s));
    }
    s.parse::<i64>().map_err(|_| {
        Error::from_code(
            ErrorKind::ArithmeticOverflowOrUnderflow,
            ErrorCode::FOCA0003,
            format!("integer value '{s}' is too large"),
        )
    })
}

pub(crate) fn parse_decimal(s: &str) -> Result<Decimal, Error> {
    let s = s.trim();
    if !is_decimal_lexical(s) {
        return Err(Error::invalid_lexical("decimal", s));
    }
    let unsigned = s.strip_prefix('+').unwrap_or(s);
    let (sign, body) = match unsigned.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", unsigned),
    };
    let mut normalized = String::with_capacity(body.len() + 2);
    normalized.push_str(sign);
    if body.starts_with('.') {
        normalized.push('0');
    }
    normalized.push_str(body.strip_suffix('.').unwrap_or(body));
    Decimal::from_str_exact(&normalized).or_else(|_| Decimal::from_str(&normalized)).map_err(|_| {
        Error::from_code(
            ErrorKind::ArithmeticOverflowOrUnderflow,
            ErrorCode::FOCA0001,
            format!("decimal value '{s}' is too large"),
        )
    })
}

/// Canonical decimal form: no exponent, no trailing fractional zeros.
pub(crate) fn format_decimal(d: &Decimal) -> String {
    if d.is_zero() {
        return "0".to_string();
    }
    d.normalize().to_string()
}

pub(crate) fn cast_to_decimal(item: &AtomicItem) -> Result<Decimal, Error> {
    match item {
        AtomicItem::Boolean(b) => Ok(if *b { Decimal::ONE } else { Decimal::ZERO }),
        other => match other.as_num() {
            Some(n) => Ok(n.to_decimal()),
            None => parse_decimal(&other.as_string()),
        },
    }
}

pub(crate) fn cast_to_integer(item: &AtomicItem, type_name: &str) -> Result<i64, Error> {
    match item {
        AtomicItem::Boolean(b) => Ok(i64::from(*b)),
        other => match other.as_num() {
            Some(Num::Int(i)) => Ok(i),
            Some(Num::Dec(d)) => d.trunc().to_i64().ok_or_else(|| {
                Error::from_code(
                    ErrorKind::ArithmeticOverflowOrUnderflow,
                    ErrorCode::FOCA0003,
                    format!("decimal value '{d}' is too large for an integer"),
                )
            }),
            None => parse_integer(&other.as_string(), type_name),
        },
    }
}

pub(crate) fn check_non_negative(i: i64) -> Result<i64, Error> {
    if i < 0 {
        return Err(Error::new(ErrorKind::InvalidType, format!("integer value '{i}' must not be negative")));
    }
    Ok(i)
}

pub(crate) fn check_positive(i: i64) -> Result<i64, Error> {
    if i <= 0 {
        return Err(Error::new(ErrorKind::InvalidType, format!("integer value '{i}' must be positive")));
    }
    Ok(i)
}
