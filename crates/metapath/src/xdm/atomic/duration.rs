use super::{AtomicItem, cannot_cast};
use super::temporal::push_fraction;
use crate::engine::runtime::{Error, ErrorCode, ErrorKind};
use chrono::TimeDelta;
use core::fmt;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

/// A duration of days, hours, minutes and seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DayTimeDuration(TimeDelta);

/// A duration counted in whole months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct YearMonthDuration(i32);

pub(crate) fn duration_overflow(msg: impl Into<String>) -> Error {
    Error::from_code(ErrorKind::ArithmeticOverflowOrUnderflow, ErrorCode::FODT0002, msg)
}

fn delta_from_nanos(nanos: i128) -> Option<TimeDelta> {
    let secs = i64::try_from(nanos.div_euclid(NANOS_PER_SECOND)).ok()?;
    let sub = u32::try_from(nanos.rem_euclid(NANOS_PER_SECOND)).ok()?;
    TimeDelta::new(secs, sub)
}

impl DayTimeDuration {
    pub fn new(delta: TimeDelta) -> Self {
        Self(delta)
    }

    pub fn from_seconds(secs: i64) -> Option<Self> {
        TimeDelta::try_seconds(secs).map(Self)
    }

    pub fn from_nanoseconds(nanos: i128) -> Option<Self> {
        delta_from_nanos(nanos).map(Self)
    }

    /// Build from a (possibly fractional) number of seconds; digits below a
    /// nanosecond are truncated.
    pub fn from_decimal_seconds(secs: Decimal) -> Option<Self> {
        let nanos = secs.checked_mul(Decimal::from(1_000_000_000u32))?.trunc().to_i128()?;
        Self::from_nanoseconds(nanos)
    }

    pub fn delta(&self) -> TimeDelta {
        self.0
    }

    pub fn total_nanoseconds(&self) -> i128 {
        i128::from(self.0.num_seconds()) * NANOS_PER_SECOND + i128::from(self.0.subsec_nanos())
    }

    /// Total length in seconds, exact to the nanosecond.
    pub fn total_seconds(&self) -> Decimal {
        // the TimeDelta range fits comfortably in a 96-bit mantissa
        Decimal::from_i128_with_scale(self.total_nanoseconds(), 9).normalize()
    }

    pub fn is_negative(&self) -> bool {
        self.0 < TimeDelta::zero()
    }

    pub fn days(&self) -> i64 {
        self.0.num_days()
    }

    pub fn hours(&self) -> i64 {
        self.0.num_hours() % 24
    }

    pub fn minutes(&self) -> i64 {
        self.0.num_minutes() % 60
    }

    /// Seconds component including the fraction, signed like the duration.
    pub fn seconds(&self) -> Decimal {
        let nanos = self.total_nanoseconds() % (60 * NANOS_PER_SECOND);
        Decimal::from_i128_with_scale(nanos, 9).normalize()
    }

    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        self.0.checked_add(&other.0).map(Self)
    }

    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        self.0.checked_sub(&other.0).map(Self)
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        let invalid = || Error::invalid_lexical("day-time-duration", s);
        let (negative, body) = split_sign(s);
        let body = body.strip_prefix('P').ok_or_else(invalid)?;
        let (day_part, time_part) = match body.split_once('T') {
            Some((d, t)) => (d, Some(t)),
            None => (body, None),
        };
        if day_part.is_empty() && time_part.is_none() {
            return Err(invalid());
        }

        let mut nanos: i128 = 0;
        if !day_part.is_empty() {
            let days = day_part.strip_suffix('D').and_then(parse_count).ok_or_else(invalid)?;
            nanos = days.checked_mul(86_400 * NANOS_PER_SECOND).ok_or_else(invalid)?;
        }
        if let Some(mut rest) = time_part {
            if rest.is_empty() {
                return Err(invalid());
            }
            for (unit, scale) in [('H', 3_600), ('M', 60)] {
                if let Some((count, tail)) = rest.split_once(unit) {
                    let count = parse_count(count).ok_or_else(invalid)?;
                    let part = count.checked_mul(scale * NANOS_PER_SECOND).ok_or_else(invalid)?;
                    nanos = nanos.checked_add(part).ok_or_else(invalid)?;
                    rest = tail;
                }
            }
            if !rest.is_empty() {
                let secs = rest.strip_suffix('S').and_then(parse_seconds).ok_or_else(invalid)?;
                nanos = nanos.checked_add(secs).ok_or_else(invalid)?;
            }
        }
        let nanos = if negative { -nanos } else { nanos };
        Self::from_nanoseconds(nanos).ok_or_else(|| duration_overflow(format!("day-time-duration '{s}' is out of range")))
    }
}

impl fmt::Display for DayTimeDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total_nanoseconds();
        if total == 0 {
            return f.write_str("PT0S");
        }
        let abs = total.unsigned_abs();
        let nanos_per_second = NANOS_PER_SECOND.unsigned_abs();
        let secs = abs / nanos_per_second;
        let sub = u32::try_from(abs % nanos_per_second).unwrap_or(0);
        let (days, hours, minutes, seconds) = (secs / 86_400, (secs / 3_600) % 24, (secs / 60) % 60, secs % 60);

        let mut out = String::from(if total < 0 { "-P" } else { "P" });
        if days > 0 {
            out.push_str(&format!("{days}D"));
        }
        if hours > 0 || minutes > 0 || seconds > 0 || sub > 0 {
            out.push('T');
            if hours > 0 {
                out.push_str(&format!("{hours}H"));
            }
            if minutes > 0 {
                out.push_str(&format!("{minutes}M"));
            }
            if seconds > 0 || sub > 0 {
                out.push_str(&seconds.to_string());
                push_fraction(&mut out, sub);
                out.push('S');
            }
        }
        f.write_str(&out)
    }
}

impl YearMonthDuration {
    pub fn new(months: i32) -> Self {
        Self(months)
    }

    pub fn months(&self) -> i32 {
        self.0
    }

    pub fn years_component(&self) -> i32 {
        self.0 / 12
    }

    pub fn months_component(&self) -> i32 {
        self.0 % 12
    }

    pub fn checked_add(&self, other: &Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        let invalid = || Error::invalid_lexical("year-month-duration", s);
        let (negative, body) = split_sign(s);
        let mut rest = body.strip_prefix('P').ok_or_else(invalid)?;
        if rest.is_empty() {
            return Err(invalid());
        }
        let mut months: i128 = 0;
        for (unit, scale) in [('Y', 12), ('M', 1)] {
            if let Some((count, tail)) = rest.split_once(unit) {
                let count = parse_count(count).ok_or_else(invalid)?;
                months = count.checked_mul(scale).and_then(|m| months.checked_add(m)).ok_or_else(invalid)?;
                rest = tail;
            }
        }
        if !rest.is_empty() {
            return Err(invalid());
        }
        let months = if negative { -months } else { months };
        i32::try_from(months)
            .map(Self)
            .map_err(|_| duration_overflow(format!("year-month-duration '{s}' is out of range")))
    }
}

impl fmt::Display for YearMonthDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("P0M");
        }
        let abs = self.0.unsigned_abs();
        let (years, months) = (abs / 12, abs % 12);
        let mut out = String::from(if self.0 < 0 { "-P" } else { "P" });
        if years > 0 {
            out.push_str(&format!("{years}Y"));
        }
        if months > 0 {
            out.push_str(&format!("{months}M"));
        }
        f.write_str(&out)
    }
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    }
}

fn parse_count(s: &str) -> Option<i128> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// `n(.n)?` seconds as nanoseconds.
fn parse_seconds(s: &str) -> Option<i128> {
    let (whole, fraction) = s.split_once('.').unwrap_or((s, ""));
    let whole = parse_count(whole)?;
    if s.contains('.') && (fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit())) {
        return None;
    }
    let mut digits: String = fraction.chars().take(9).collect();
    while digits.len() < 9 {
        digits.push('0');
    }
    let sub: i128 = digits.parse().ok()?;
    whole.checked_mul(NANOS_PER_SECOND)?.checked_add(sub)
}

pub(crate) fn cast_to_day_time(item: &AtomicItem) -> Result<DayTimeDuration, Error> {
    match item {
        AtomicItem::DayTimeDuration(d) => Ok(*d),
        other if other.is_string_like() => DayTimeDuration::parse(&other.as_string()),
        other => Err(cannot_cast(other, "day-time-duration")),
    }
}

pub(crate) fn cast_to_year_month(item: &AtomicItem) -> Result<YearMonthDuration, Error> {
    match item {
        AtomicItem::YearMonthDuration(d) => Ok(*d),
        other if other.is_string_like() => YearMonthDuration::parse(&other.as_string()),
        other => Err(cannot_cast(other, "year-month-duration")),
    }
}

/// Cast to the abstract duration type: day-time first, then year-month.
pub(crate) fn cast_to_duration(item: &AtomicItem) -> Result<AtomicItem, Error> {
    match item {
        AtomicItem::DayTimeDuration(_) | AtomicItem::YearMonthDuration(_) => Ok(item.clone()),
        other if other.is_string_like() => {
            let lexical = other.as_string();
            let day_time = match DayTimeDuration::parse(&lexical) {
                Ok(d) => return Ok(AtomicItem::DayTimeDuration(d)),
                Err(e) => e,
            };
            match YearMonthDuration::parse(&lexical) {
                Ok(d) => Ok(AtomicItem::YearMonthDuration(d)),
                Err(year_month) => Err(Error::combined(
                    ErrorKind::InvalidCast,
                    format!("'{lexical}' is neither a day-time-duration nor a year-month-duration"),
                    [day_time, year_month],
                )),
            }
        }
        other => Err(cannot_cast(other, "duration")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("P1DT2H", "P1DT2H")]
    #[case("PT36H", "P1DT12H")]
    #[case("PT0.5S", "PT0.5S")]
    #[case("-PT1M30.25S", "-PT1M30.25S")]
    #[case("P0D", "PT0S")]
    #[case("PT90M", "PT1H30M")]
    fn day_time_canonical_form(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(DayTimeDuration::parse(input).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("P")]
    #[case("PT")]
    #[case("P1Y")]
    #[case("PT1M1H")]
    #[case("P1DT")]
    #[case("PT1.S")]
    fn day_time_rejects(#[case] input: &str) {
        assert_eq!(DayTimeDuration::parse(input).unwrap_err().kind, ErrorKind::InvalidLexicalValue);
    }

    #[rstest]
    #[case("P1Y2M", 14, "P1Y2M")]
    #[case("P14M", 14, "P1Y2M")]
    #[case("-P2Y", -24, "-P2Y")]
    #[case("P0Y", 0, "P0M")]
    fn year_month_canonical_form(#[case] input: &str, #[case] months: i32, #[case] expected: &str) {
        let d = YearMonthDuration::parse(input).unwrap();
        assert_eq!(d.months(), months);
        assert_eq!(d.to_string(), expected);
    }

    #[rstest]
    fn components_follow_the_sign() {
        let d = DayTimeDuration::parse("-P3DT10H30M12.5S").unwrap();
        assert_eq!(d.days(), -3);
        assert_eq!(d.hours(), -10);
        assert_eq!(d.minutes(), -30);
        assert_eq!(d.seconds(), Decimal::new(-125, 1));
    }

    #[rstest]
    fn abstract_duration_keeps_both_failures() {
        let err = cast_to_duration(&AtomicItem::String("P1X".into())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCast);
        assert_eq!(err.causes.len(), 2);
        let ok = cast_to_duration(&AtomicItem::String("P1Y".into())).unwrap();
        assert!(matches!(ok, AtomicItem::YearMonthDuration(_)));
    }
}
