use crate::engine::runtime::{Error, ErrorKind};
use crate::xdm::AtomicItem;
use crate::xdm::atomic::{DayTimeDuration, YearMonthDuration, duration_overflow, in_context};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

fn numeric_operand(item: &AtomicItem) -> Result<Decimal, Error> {
    item.as_decimal().ok_or_else(|| {
        Error::new(ErrorKind::InvalidArgumentType, format!("expected a numeric operand, found {}", item.atomic_type()))
    })
}

fn round_half_away(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// `op:add-yearMonthDurations`
pub fn add_year_month_durations(a: &YearMonthDuration, b: &YearMonthDuration) -> Result<YearMonthDuration, Error> {
    a.checked_add(b).ok_or_else(|| duration_overflow(format!("{a} + {b} overflows")))
}

/// `op:subtract-yearMonthDurations`
pub fn subtract_year_month_durations(
    a: &YearMonthDuration,
    b: &YearMonthDuration,
) -> Result<YearMonthDuration, Error> {
    a.checked_sub(b).ok_or_else(|| duration_overflow(format!("{a} - {b} overflows")))
}

/// `op:add-dayTimeDurations`
pub fn add_day_time_durations(a: &DayTimeDuration, b: &DayTimeDuration) -> Result<DayTimeDuration, Error> {
    a.checked_add(b).ok_or_else(|| duration_overflow(format!("{a} + {b} overflows")))
}

/// `op:subtract-dayTimeDurations`
pub fn subtract_day_time_durations(a: &DayTimeDuration, b: &DayTimeDuration) -> Result<DayTimeDuration, Error> {
    a.checked_sub(b).ok_or_else(|| duration_overflow(format!("{a} - {b} overflows")))
}

/// Multipliers and divisors of a duration are rounded half away from zero
/// to a whole number before the duration is scaled.
fn integral_operand(item: &AtomicItem) -> Result<i64, Error> {
    numeric_operand(item)?;
    numeric_operand(&item.round()?)?
        .to_i64()
        .ok_or_else(|| Error::overflow(format!("{item} does not round to a 64-bit integer")))
}

/// `op:multiply-yearMonthDuration`
pub fn multiply_year_month_duration(d: &YearMonthDuration, factor: &AtomicItem) -> Result<YearMonthDuration, Error> {
    let factor = i32::try_from(integral_operand(factor)?)
        .map_err(|_| Error::overflow(format!("{factor} does not round to a 32-bit integer")))?;
    d.months()
        .checked_mul(factor)
        .map(YearMonthDuration::new)
        .ok_or_else(|| duration_overflow(format!("{d} * {factor} overflows")))
}

/// `op:divide-yearMonthDuration`: the month count of the quotient is rounded
/// half away from zero.
pub fn divide_year_month_duration(d: &YearMonthDuration, divisor: &AtomicItem) -> Result<YearMonthDuration, Error> {
    let divisor = integral_operand(divisor)?;
    if divisor == 0 {
        return Err(Error::division_by_zero());
    }
    Decimal::from(d.months())
        .checked_div(Decimal::from(divisor))
        .map(round_half_away)
        .and_then(|m| m.to_i32())
        .map(YearMonthDuration::new)
        .ok_or_else(|| duration_overflow(format!("{d} div {divisor} overflows")))
}

/// `op:divide-yearMonthDuration-by-yearMonthDuration`
pub fn divide_year_month_duration_by_year_month_duration(
    a: &YearMonthDuration,
    b: &YearMonthDuration,
) -> Result<Decimal, Error> {
    if b.months() == 0 {
        return Err(Error::division_by_zero());
    }
    Decimal::from(a.months())
        .checked_div(Decimal::from(b.months()))
        .map(in_context)
        .ok_or_else(|| duration_overflow(format!("{a} div {b} overflows")))
}

/// `op:multiply-dayTimeDuration`
pub fn multiply_day_time_duration(d: &DayTimeDuration, factor: &AtomicItem) -> Result<DayTimeDuration, Error> {
    let factor = integral_operand(factor)?;
    d.total_nanoseconds()
        .checked_mul(i128::from(factor))
        .and_then(DayTimeDuration::from_nanoseconds)
        .ok_or_else(|| duration_overflow(format!("{d} * {factor} overflows")))
}

/// `op:divide-dayTimeDuration`: the quotient is rounded to the nanosecond.
pub fn divide_day_time_duration(d: &DayTimeDuration, divisor: &AtomicItem) -> Result<DayTimeDuration, Error> {
    let divisor = integral_operand(divisor)?;
    if divisor == 0 {
        return Err(Error::division_by_zero());
    }
    Decimal::try_from_i128_with_scale(d.total_nanoseconds(), 0)
        .ok()
        .and_then(|nanos| nanos.checked_div(Decimal::from(divisor)))
        .map(round_half_away)
        .and_then(|n| n.to_i128())
        .and_then(DayTimeDuration::from_nanoseconds)
        .ok_or_else(|| duration_overflow(format!("{d} div {divisor} overflows")))
}

/// `op:divide-dayTimeDuration-by-dayTimeDuration`: ratio of the total seconds.
pub fn divide_day_time_duration_by_day_time_duration(
    a: &DayTimeDuration,
    b: &DayTimeDuration,
) -> Result<Decimal, Error> {
    if b.total_nanoseconds() == 0 {
        return Err(Error::division_by_zero());
    }
    a.total_seconds()
        .checked_div(b.total_seconds())
        .map(in_context)
        .ok_or_else(|| duration_overflow(format!("{a} div {b} overflows")))
}

fn mixed_durations(op: &str, a: &AtomicItem, b: &AtomicItem) -> Error {
    Error::new(
        ErrorKind::InvalidArgumentType,
        format!("cannot {op} {} and {}: both durations must be of the same kind", a.atomic_type(), b.atomic_type()),
    )
}

/// Add two durations of the same kind.
pub fn add_durations(a: &AtomicItem, b: &AtomicItem) -> Result<AtomicItem, Error> {
    match (a, b) {
        (AtomicItem::DayTimeDuration(x), AtomicItem::DayTimeDuration(y)) => add_day_time_durations(x, y).map(Into::into),
        (AtomicItem::YearMonthDuration(x), AtomicItem::YearMonthDuration(y)) => {
            add_year_month_durations(x, y).map(Into::into)
        }
        _ => Err(mixed_durations("add", a, b)),
    }
}

/// Subtract two durations of the same kind.
pub fn subtract_durations(a: &AtomicItem, b: &AtomicItem) -> Result<AtomicItem, Error> {
    match (a, b) {
        (AtomicItem::DayTimeDuration(x), AtomicItem::DayTimeDuration(y)) => {
            subtract_day_time_durations(x, y).map(Into::into)
        }
        (AtomicItem::YearMonthDuration(x), AtomicItem::YearMonthDuration(y)) => {
            subtract_year_month_durations(x, y).map(Into::into)
        }
        _ => Err(mixed_durations("subtract", a, b)),
    }
}
