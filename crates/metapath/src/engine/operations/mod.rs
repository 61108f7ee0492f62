//! Arithmetic and temporal operators.
//!
//! The `op:*` functions operate on typed operands. [`add`], [`subtract`],
//! [`multiply`], [`divide`], [`integer_divide`] and [`modulo`] dispatch on the
//! dynamic types of two atomized operands the way the arithmetic expressions
//! of the language do, promoting untyped operands to decimal first.

mod durations;
mod numeric;
mod temporal;

pub use durations::{
    add_day_time_durations, add_durations, add_year_month_durations, divide_day_time_duration,
    divide_day_time_duration_by_day_time_duration, divide_year_month_duration,
    divide_year_month_duration_by_year_month_duration, multiply_day_time_duration, multiply_year_month_duration,
    subtract_day_time_durations, subtract_durations, subtract_year_month_durations,
};
pub use numeric::{
    numeric_add, numeric_divide, numeric_integer_divide, numeric_mod, numeric_multiply, numeric_subtract,
    numeric_unary_minus, numeric_unary_plus,
};
pub use temporal::{
    add_day_time_duration_to_date, add_day_time_duration_to_date_time, add_day_time_duration_to_time,
    add_year_month_duration_to_date, add_year_month_duration_to_date_time, subtract_date_times, subtract_dates,
    subtract_day_time_duration_from_date, subtract_day_time_duration_from_date_time,
    subtract_day_time_duration_from_time, subtract_times, subtract_year_month_duration_from_date,
    subtract_year_month_duration_from_date_time,
};

use crate::engine::runtime::{DynamicContext, Error, ErrorKind};
use crate::xdm::{AtomicItem, AtomicType};
use std::borrow::Cow;

fn promote(item: &AtomicItem) -> Result<Cow<'_, AtomicItem>, Error> {
    if item.is_untyped() { AtomicType::Decimal.cast(item).map(Cow::Owned) } else { Ok(Cow::Borrowed(item)) }
}

fn unsupported(op: &str, left: &AtomicItem, right: &AtomicItem) -> Error {
    Error::new(
        ErrorKind::InvalidArgumentType,
        format!("the operator '{op}' is not defined for {} and {}", left.atomic_type(), right.atomic_type()),
    )
}

/// `+` over numbers, durations and date/time values.
pub fn add(left: &AtomicItem, right: &AtomicItem) -> Result<AtomicItem, Error> {
    use AtomicItem as A;
    let (left, right) = (promote(left)?, promote(right)?);
    let (l, r) = (left.as_ref(), right.as_ref());
    match (l, r) {
        _ if l.is_numeric() && r.is_numeric() => numeric_add(l, r),
        (A::DayTimeDuration(_) | A::YearMonthDuration(_), A::DayTimeDuration(_) | A::YearMonthDuration(_)) => {
            add_durations(l, r)
        }
        (A::Date(v) | A::DateWithTimezone(v), A::YearMonthDuration(d))
        | (A::YearMonthDuration(d), A::Date(v) | A::DateWithTimezone(v)) => {
            add_year_month_duration_to_date(v, d).map(AtomicItem::date)
        }
        (A::Date(v) | A::DateWithTimezone(v), A::DayTimeDuration(d))
        | (A::DayTimeDuration(d), A::Date(v) | A::DateWithTimezone(v)) => {
            add_day_time_duration_to_date(v, d).map(AtomicItem::date)
        }
        (A::DateTime(v) | A::DateTimeWithTimezone(v), A::YearMonthDuration(d))
        | (A::YearMonthDuration(d), A::DateTime(v) | A::DateTimeWithTimezone(v)) => {
            add_year_month_duration_to_date_time(v, d).map(AtomicItem::date_time)
        }
        (A::DateTime(v) | A::DateTimeWithTimezone(v), A::DayTimeDuration(d))
        | (A::DayTimeDuration(d), A::DateTime(v) | A::DateTimeWithTimezone(v)) => {
            add_day_time_duration_to_date_time(v, d).map(AtomicItem::date_time)
        }
        (A::Time(v) | A::TimeWithTimezone(v), A::DayTimeDuration(d))
        | (A::DayTimeDuration(d), A::Time(v) | A::TimeWithTimezone(v)) => {
            Ok(AtomicItem::time(add_day_time_duration_to_time(v, d)))
        }
        _ => Err(unsupported("+", l, r)),
    }
}

/// `-` over numbers, durations and date/time values. Differences of two
/// date/time values use the implicit timezone of `ctx`.
pub fn subtract(left: &AtomicItem, right: &AtomicItem, ctx: &DynamicContext) -> Result<AtomicItem, Error> {
    use AtomicItem as A;
    let (left, right) = (promote(left)?, promote(right)?);
    let (l, r) = (left.as_ref(), right.as_ref());
    let implicit = ctx.implicit_timezone();
    match (l, r) {
        _ if l.is_numeric() && r.is_numeric() => numeric_subtract(l, r),
        (A::DayTimeDuration(_) | A::YearMonthDuration(_), A::DayTimeDuration(_) | A::YearMonthDuration(_)) => {
            subtract_durations(l, r)
        }
        (A::Date(a) | A::DateWithTimezone(a), A::Date(b) | A::DateWithTimezone(b)) => {
            subtract_dates(a, b, implicit).map(Into::into)
        }
        (A::DateTime(a) | A::DateTimeWithTimezone(a), A::DateTime(b) | A::DateTimeWithTimezone(b)) => {
            subtract_date_times(a, b, implicit).map(Into::into)
        }
        (A::Time(a) | A::TimeWithTimezone(a), A::Time(b) | A::TimeWithTimezone(b)) => {
            subtract_times(a, b, implicit).map(Into::into)
        }
        (A::Date(v) | A::DateWithTimezone(v), A::YearMonthDuration(d)) => {
            subtract_year_month_duration_from_date(v, d).map(AtomicItem::date)
        }
        (A::Date(v) | A::DateWithTimezone(v), A::DayTimeDuration(d)) => {
            subtract_day_time_duration_from_date(v, d).map(AtomicItem::date)
        }
        (A::DateTime(v) | A::DateTimeWithTimezone(v), A::YearMonthDuration(d)) => {
            subtract_year_month_duration_from_date_time(v, d).map(AtomicItem::date_time)
        }
        (A::DateTime(v) | A::DateTimeWithTimezone(v), A::DayTimeDuration(d)) => {
            subtract_day_time_duration_from_date_time(v, d).map(AtomicItem::date_time)
        }
        (A::Time(v) | A::TimeWithTimezone(v), A::DayTimeDuration(d)) => {
            Ok(AtomicItem::time(subtract_day_time_duration_from_time(v, d)))
        }
        _ => Err(unsupported("-", l, r)),
    }
}

/// `*` over numbers, and durations scaled by a number.
pub fn multiply(left: &AtomicItem, right: &AtomicItem) -> Result<AtomicItem, Error> {
    use AtomicItem as A;
    let (left, right) = (promote(left)?, promote(right)?);
    let (l, r) = (left.as_ref(), right.as_ref());
    match (l, r) {
        _ if l.is_numeric() && r.is_numeric() => numeric_multiply(l, r),
        (A::YearMonthDuration(d), n) | (n, A::YearMonthDuration(d)) if n.is_numeric() => {
            multiply_year_month_duration(d, n).map(Into::into)
        }
        (A::DayTimeDuration(d), n) | (n, A::DayTimeDuration(d)) if n.is_numeric() => {
            multiply_day_time_duration(d, n).map(Into::into)
        }
        _ => Err(unsupported("*", l, r)),
    }
}

/// `div` over numbers, durations divided by a number, and duration ratios.
pub fn divide(left: &AtomicItem, right: &AtomicItem) -> Result<AtomicItem, Error> {
    use AtomicItem as A;
    let (left, right) = (promote(left)?, promote(right)?);
    let (l, r) = (left.as_ref(), right.as_ref());
    match (l, r) {
        _ if l.is_numeric() && r.is_numeric() => numeric_divide(l, r),
        (A::YearMonthDuration(d), n) if n.is_numeric() => divide_year_month_duration(d, n).map(Into::into),
        (A::DayTimeDuration(d), n) if n.is_numeric() => divide_day_time_duration(d, n).map(Into::into),
        (A::YearMonthDuration(a), A::YearMonthDuration(b)) => {
            divide_year_month_duration_by_year_month_duration(a, b).map(AtomicItem::Decimal)
        }
        (A::DayTimeDuration(a), A::DayTimeDuration(b)) => {
            divide_day_time_duration_by_day_time_duration(a, b).map(AtomicItem::Decimal)
        }
        _ => Err(unsupported("div", l, r)),
    }
}

/// `idiv`
pub fn integer_divide(left: &AtomicItem, right: &AtomicItem) -> Result<AtomicItem, Error> {
    numeric_integer_divide(promote(left)?.as_ref(), promote(right)?.as_ref())
}

/// `mod`
pub fn modulo(left: &AtomicItem, right: &AtomicItem) -> Result<AtomicItem, Error> {
    numeric_mod(promote(left)?.as_ref(), promote(right)?.as_ref())
}

/// Unary `-`.
pub fn negate(item: &AtomicItem) -> Result<AtomicItem, Error> {
    numeric_unary_minus(promote(item)?.as_ref())
}
