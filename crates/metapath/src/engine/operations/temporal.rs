use crate::engine::runtime::{Error, ErrorKind};
use crate::xdm::atomic::{
    DateTimeValue, DateValue, DayTimeDuration, TimeValue, YearMonthDuration, comparable_instants,
    date_time_overflow as date_overflow,
};
use chrono::{FixedOffset, Months, NaiveDateTime};

fn shift_months(value: NaiveDateTime, months: i32) -> Option<NaiveDateTime> {
    let delta = Months::new(months.unsigned_abs());
    if months >= 0 { value.checked_add_months(delta) } else { value.checked_sub_months(delta) }
}

fn negate_months(d: &YearMonthDuration) -> Result<i32, Error> {
    d.months().checked_neg().ok_or_else(|| date_overflow(format!("-({d}) overflows")))
}

/// `op:add-yearMonthDuration-to-dateTime`. Days past the end of the target
/// month are clamped to its last day.
pub fn add_year_month_duration_to_date_time(
    value: &DateTimeValue,
    d: &YearMonthDuration,
) -> Result<DateTimeValue, Error> {
    shift_months(value.value, d.months())
        .map(|v| DateTimeValue::new(v, value.tz))
        .ok_or_else(|| date_overflow(format!("{value} + {d} is out of range")))
}

/// `op:add-dayTimeDuration-to-dateTime`
pub fn add_day_time_duration_to_date_time(
    value: &DateTimeValue,
    d: &DayTimeDuration,
) -> Result<DateTimeValue, Error> {
    value
        .value
        .checked_add_signed(d.delta())
        .map(|v| DateTimeValue::new(v, value.tz))
        .ok_or_else(|| date_overflow(format!("{value} + {d} is out of range")))
}

/// `op:subtract-yearMonthDuration-from-dateTime`
pub fn subtract_year_month_duration_from_date_time(
    value: &DateTimeValue,
    d: &YearMonthDuration,
) -> Result<DateTimeValue, Error> {
    add_year_month_duration_to_date_time(value, &YearMonthDuration::new(negate_months(d)?))
}

/// `op:subtract-dayTimeDuration-from-dateTime`
pub fn subtract_day_time_duration_from_date_time(
    value: &DateTimeValue,
    d: &DayTimeDuration,
) -> Result<DateTimeValue, Error> {
    add_day_time_duration_to_date_time(value, &DayTimeDuration::new(-d.delta()))
}

/// `op:add-yearMonthDuration-to-date`
pub fn add_year_month_duration_to_date(value: &DateValue, d: &YearMonthDuration) -> Result<DateValue, Error> {
    add_year_month_duration_to_date_time(&value.to_date_time(), d).map(|v| v.date())
}

/// `op:add-dayTimeDuration-to-date`: the time of day of the result is dropped.
pub fn add_day_time_duration_to_date(value: &DateValue, d: &DayTimeDuration) -> Result<DateValue, Error> {
    add_day_time_duration_to_date_time(&value.to_date_time(), d).map(|v| v.date())
}

/// `op:subtract-yearMonthDuration-from-date`
pub fn subtract_year_month_duration_from_date(value: &DateValue, d: &YearMonthDuration) -> Result<DateValue, Error> {
    subtract_year_month_duration_from_date_time(&value.to_date_time(), d).map(|v| v.date())
}

/// `op:subtract-dayTimeDuration-from-date`
pub fn subtract_day_time_duration_from_date(value: &DateValue, d: &DayTimeDuration) -> Result<DateValue, Error> {
    subtract_day_time_duration_from_date_time(&value.to_date_time(), d).map(|v| v.date())
}

/// `op:add-dayTimeDuration-to-time`: wraps around midnight.
pub fn add_day_time_duration_to_time(value: &TimeValue, d: &DayTimeDuration) -> TimeValue {
    let (time, _) = value.time.overflowing_add_signed(d.delta());
    TimeValue::new(time, value.tz)
}

/// `op:subtract-dayTimeDuration-from-time`
pub fn subtract_day_time_duration_from_time(value: &TimeValue, d: &DayTimeDuration) -> TimeValue {
    let (time, _) = value.time.overflowing_sub_signed(d.delta());
    TimeValue::new(time, value.tz)
}

fn difference(
    left: &DateTimeValue,
    right: &DateTimeValue,
    implicit: Option<FixedOffset>,
) -> Result<DayTimeDuration, Error> {
    let (a, b) = comparable_instants(left, right, implicit).ok_or_else(|| {
        Error::new(
            ErrorKind::DynamicContextAbsent,
            format!("cannot subtract '{right}' from '{left}' without an implicit timezone"),
        )
    })?;
    a.signed_duration_since(b)
        .map(DayTimeDuration::new)
        .ok_or_else(|| date_overflow(format!("'{left}' - '{right}' is out of range")))
}

/// `op:subtract-dateTimes`. An operand without a timezone takes `implicit`.
pub fn subtract_date_times(
    left: &DateTimeValue,
    right: &DateTimeValue,
    implicit: Option<FixedOffset>,
) -> Result<DayTimeDuration, Error> {
    difference(left, right, implicit)
}

/// `op:subtract-dates`
pub fn subtract_dates(
    left: &DateValue,
    right: &DateValue,
    implicit: Option<FixedOffset>,
) -> Result<DayTimeDuration, Error> {
    difference(&left.to_date_time(), &right.to_date_time(), implicit)
}

/// `op:subtract-times`: both times are placed on the same reference date.
pub fn subtract_times(
    left: &TimeValue,
    right: &TimeValue,
    implicit: Option<FixedOffset>,
) -> Result<DayTimeDuration, Error> {
    difference(&left.to_date_time(), &right.to_date_time(), implicit)
}
