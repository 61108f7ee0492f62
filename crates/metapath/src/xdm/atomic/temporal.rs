//! Dates, date-times and times, each with an optional timezone.
//!
//! A value without a timezone is never silently treated as UTC: operations
//! that need an instant take the implicit timezone of the dynamic context and
//! fail when neither side can supply one.

use super::{AtomicItem, cannot_cast};
use crate::engine::runtime::{Error, ErrorCode, ErrorKind};
use chrono::{Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};
use core::fmt;

/// Reference date used to place times on the time line.
const TIME_ANCHOR: NaiveDate = NaiveDate::from_ymd_opt(1972, 12, 31).expect("1972-12-31 is a valid date");

pub(crate) fn date_time_overflow(msg: impl Into<String>) -> Error {
    Error::from_code(ErrorKind::ArithmeticOverflowOrUnderflow, ErrorCode::FODT0001, msg)
}

/// A point on the UTC time line as seconds and nanoseconds since the epoch.
///
/// Every date-time in range maps to an instant without overflow, whatever its
/// offset, so instants are the common currency for ordering, subtraction and
/// map keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcInstant {
    seconds: i64,
    nanos: u32,
}

impl UtcInstant {
    fn of_wall_clock(value: NaiveDateTime) -> Self {
        let utc = value.and_utc();
        Self { seconds: utc.timestamp(), nanos: utc.timestamp_subsec_nanos() }
    }

    /// The instant of a wall-clock value read at `offset`.
    pub fn at_offset(value: NaiveDateTime, offset: FixedOffset) -> Self {
        let wall = Self::of_wall_clock(value);
        Self { seconds: wall.seconds - i64::from(offset.local_minus_utc()), ..wall }
    }

    pub fn signed_duration_since(self, other: Self) -> Option<TimeDelta> {
        let nanos = i64::from(self.nanos) - i64::from(other.nanos);
        TimeDelta::try_seconds(self.seconds.checked_sub(other.seconds)?)?
            .checked_add(&TimeDelta::nanoseconds(nanos))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateValue {
    pub date: NaiveDate,
    pub tz: Option<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateTimeValue {
    /// Local wall-clock value in the value's own timezone.
    pub value: NaiveDateTime,
    pub tz: Option<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeValue {
    pub time: NaiveTime,
    pub tz: Option<FixedOffset>,
}

impl DateValue {
    pub fn new(date: NaiveDate, tz: Option<FixedOffset>) -> Self {
        Self { date, tz }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        let invalid = || Error::invalid_lexical("date", s);
        let (body, tz) = split_timezone(s);
        let tz = tz.map(|t| parse_offset(t).ok_or_else(invalid)).transpose()?;
        let date = parse_date_part(body).ok_or_else(invalid)?;
        Ok(Self { date, tz })
    }

    pub fn has_timezone(&self) -> bool {
        self.tz.is_some()
    }

    /// Start of the day, keeping the timezone.
    pub fn to_date_time(&self) -> DateTimeValue {
        DateTimeValue { value: self.date.and_time(NaiveTime::MIN), tz: self.tz }
    }

    pub fn adjust_to_timezone(&self, tz: Option<FixedOffset>) -> Result<Self, Error> {
        self.to_date_time().adjust_to_timezone(tz).map(|v| v.date())
    }
}

impl DateTimeValue {
    pub fn new(value: NaiveDateTime, tz: Option<FixedOffset>) -> Self {
        Self { value, tz }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        let invalid = || Error::invalid_lexical("date-time", s);
        let (body, tz) = split_timezone(s);
        let tz = tz.map(|t| parse_offset(t).ok_or_else(invalid)).transpose()?;
        let (date, time) = body.split_once('T').ok_or_else(invalid)?;
        let date = parse_date_part(date).ok_or_else(invalid)?;
        let (time, end_of_day) = parse_time_part(time).ok_or_else(invalid)?;
        let mut value = date.and_time(time);
        if end_of_day {
            value = value.checked_add_signed(TimeDelta::days(1)).ok_or_else(invalid)?;
        }
        Ok(Self { value, tz })
    }

    /// Combine a date and a time; both may carry a timezone only if it is the same.
    pub fn from_date_and_time(date: &DateValue, time: &TimeValue) -> Result<Self, Error> {
        let tz = match (date.tz, time.tz) {
            (Some(a), Some(b)) if a != b => {
                return Err(Error::new(
                    ErrorKind::InconsistentTimezone,
                    format!("the date '{date}' and time '{time}' have different timezones"),
                ));
            }
            (a, b) => a.or(b),
        };
        Ok(Self { value: date.date.and_time(time.time), tz })
    }

    pub fn has_timezone(&self) -> bool {
        self.tz.is_some()
    }

    /// The UTC wall-clock value when interpreted in `tz`.
    pub fn to_utc(&self, tz: FixedOffset) -> Result<NaiveDateTime, Error> {
        self.value
            .checked_sub_offset(tz)
            .ok_or_else(|| date_time_overflow(format!("'{self}' is out of range in UTC")))
    }

    /// The instant in UTC, using `implicit` when the value carries no timezone.
    pub fn instant(&self, implicit: Option<FixedOffset>) -> Option<UtcInstant> {
        self.tz.or(implicit).map(|tz| UtcInstant::at_offset(self.value, tz))
    }

    /// The wall clock read as UTC; for unzoned values that are only compared
    /// with each other.
    pub fn wall_clock(&self) -> UtcInstant {
        UtcInstant::of_wall_clock(self.value)
    }

    pub fn date(&self) -> DateValue {
        DateValue { date: self.value.date(), tz: self.tz }
    }

    pub fn time(&self) -> TimeValue {
        TimeValue { time: self.value.time(), tz: self.tz }
    }

    /// `fn:adjust-dateTime-to-timezone`: attach, convert or strip a timezone.
    /// Fails with `FODT0001` when the converted value leaves the supported
    /// year range.
    pub fn adjust_to_timezone(&self, tz: Option<FixedOffset>) -> Result<Self, Error> {
        match (self.tz, tz) {
            (_, None) => Ok(Self { value: self.value, tz: None }),
            (None, Some(new)) => Ok(Self { value: self.value, tz: Some(new) }),
            (Some(old), Some(new)) => {
                let local = self.to_utc(old)?.checked_add_offset(new).ok_or_else(|| {
                    date_time_overflow(format!("'{self}' is out of range at offset {}", format_offset(&new)))
                })?;
                Ok(Self { value: local, tz: Some(new) })
            }
        }
    }
}

impl TimeValue {
    pub fn new(time: NaiveTime, tz: Option<FixedOffset>) -> Self {
        Self { time, tz }
    }

    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.trim();
        let invalid = || Error::invalid_lexical("time", s);
        let (body, tz) = split_timezone(s);
        let tz = tz.map(|t| parse_offset(t).ok_or_else(invalid)).transpose()?;
        let (time, _) = parse_time_part(body).ok_or_else(invalid)?;
        Ok(Self { time, tz })
    }

    pub fn has_timezone(&self) -> bool {
        self.tz.is_some()
    }

    /// The time on the 1972-12-31 anchor date.
    pub fn to_date_time(&self) -> DateTimeValue {
        DateTimeValue { value: TIME_ANCHOR.and_time(self.time), tz: self.tz }
    }

    pub fn adjust_to_timezone(&self, tz: Option<FixedOffset>) -> Result<Self, Error> {
        self.to_date_time().adjust_to_timezone(tz).map(|v| v.time())
    }
}

/// Instants of two date-times suitable for comparison or subtraction.
///
/// Two unzoned values compare by wall clock. Otherwise each side needs a
/// timezone, its own or the implicit one.
pub(crate) fn comparable_instants(
    a: &DateTimeValue,
    b: &DateTimeValue,
    implicit: Option<FixedOffset>,
) -> Option<(UtcInstant, UtcInstant)> {
    match (a.tz, b.tz) {
        (None, None) => Some((a.wall_clock(), b.wall_clock())),
        _ => Some((a.instant(implicit)?, b.instant(implicit)?)),
    }
}

fn missing_timezone(item: &AtomicItem, target: &str) -> Error {
    Error::invalid_cast(format!("cannot cast '{item}' to {target}: the value has no timezone"))
}

pub(crate) fn cast_to_date(item: &AtomicItem, require_tz: bool) -> Result<AtomicItem, Error> {
    let target = if require_tz { "date-with-timezone" } else { "date" };
    let value = match item {
        AtomicItem::Date(d) | AtomicItem::DateWithTimezone(d) => *d,
        AtomicItem::DateTime(v) | AtomicItem::DateTimeWithTimezone(v) => v.date(),
        other if other.is_string_like() => DateValue::parse(&other.as_string())?,
        other => return Err(cannot_cast(other, target)),
    };
    if require_tz && !value.has_timezone() {
        return Err(missing_timezone(item, target));
    }
    Ok(AtomicItem::date(value))
}

pub(crate) fn cast_to_date_time(item: &AtomicItem, require_tz: bool) -> Result<AtomicItem, Error> {
    let target = if require_tz { "date-time-with-timezone" } else { "date-time" };
    let value = match item {
        AtomicItem::DateTime(v) | AtomicItem::DateTimeWithTimezone(v) => *v,
        AtomicItem::Date(d) | AtomicItem::DateWithTimezone(d) => d.to_date_time(),
        other if other.is_string_like() => DateTimeValue::parse(&other.as_string())?,
        other => return Err(cannot_cast(other, target)),
    };
    if require_tz && !value.has_timezone() {
        return Err(missing_timezone(item, target));
    }
    Ok(AtomicItem::date_time(value))
}

pub(crate) fn cast_to_time(item: &AtomicItem, require_tz: bool) -> Result<AtomicItem, Error> {
    let target = if require_tz { "time-with-timezone" } else { "time" };
    let value = match item {
        AtomicItem::Time(t) | AtomicItem::TimeWithTimezone(t) => *t,
        AtomicItem::DateTime(v) | AtomicItem::DateTimeWithTimezone(v) => v.time(),
        other if other.is_string_like() => TimeValue::parse(&other.as_string())?,
        other => return Err(cannot_cast(other, target)),
    };
    if require_tz && !value.has_timezone() {
        return Err(missing_timezone(item, target));
    }
    Ok(AtomicItem::time(value))
}

fn split_timezone(s: &str) -> (&str, Option<&str>) {
    if let Some(body) = s.strip_suffix('Z') {
        return (body, Some("Z"));
    }
    let bytes = s.as_bytes();
    if bytes.len() > 6 {
        let pos = bytes.len() - 6;
        if matches!(bytes[pos], b'+' | b'-') && bytes[pos + 3] == b':' {
            return (&s[..pos], Some(&s[pos..]));
        }
    }
    (s, None)
}

pub(crate) fn parse_offset(s: &str) -> Option<FixedOffset> {
    if s == "Z" {
        return FixedOffset::east_opt(0);
    }
    let sign = match s.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let (h, m) = s[1..].split_once(':')?;
    if !is_digits(h, 2) || !is_digits(m, 2) {
        return None;
    }
    let h: i32 = h.parse().ok()?;
    let m: i32 = m.parse().ok()?;
    if m >= 60 || h > 14 || (h == 14 && m != 0) {
        return None;
    }
    FixedOffset::east_opt(sign * (h * 3600 + m * 60))
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}

fn parse_date_part(s: &str) -> Option<NaiveDate> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let mut parts = body.splitn(3, '-');
    let (y, m, d) = (parts.next()?, parts.next()?, parts.next()?);
    if y.len() < 4 || (y.len() > 4 && y.starts_with('0')) || !y.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if !is_digits(m, 2) || !is_digits(d, 2) {
        return None;
    }
    let year: i32 = y.parse().ok()?;
    NaiveDate::from_ymd_opt(if negative { -year } else { year }, m.parse().ok()?, d.parse().ok()?)
}

/// Parses `hh:mm:ss(.s+)?`; `24:00:00` is accepted and flagged as end of day.
fn parse_time_part(s: &str) -> Option<(NaiveTime, bool)> {
    let (hms, fraction) = match s.split_once('.') {
        Some((hms, f)) => (hms, Some(f)),
        None => (s, None),
    };
    let mut parts = hms.split(':');
    let (h, m, sec) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() || !is_digits(h, 2) || !is_digits(m, 2) || !is_digits(sec, 2) {
        return None;
    }
    let nanos = match fraction {
        None => 0,
        Some(f) => {
            if f.is_empty() || !f.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let mut digits: String = f.chars().take(9).collect();
            while digits.len() < 9 {
                digits.push('0');
            }
            digits.parse::<u32>().ok()?
        }
    };
    let (h, m, sec): (u32, u32, u32) = (h.parse().ok()?, m.parse().ok()?, sec.parse().ok()?);
    if h == 24 {
        return (m == 0 && sec == 0 && nanos == 0).then_some((NaiveTime::MIN, true));
    }
    NaiveTime::from_hms_nano_opt(h, m, sec, nanos).map(|t| (t, false))
}

pub(crate) fn format_offset(tz: &FixedOffset) -> String {
    let secs = tz.local_minus_utc();
    if secs == 0 {
        return "Z".to_string();
    }
    let sign = if secs < 0 { '-' } else { '+' };
    let secs = secs.abs();
    format!("{sign}{:02}:{:02}", secs / 3600, (secs % 3600) / 60)
}

/// Appends `.fff` with trailing zeros removed; nothing for whole seconds.
pub(crate) fn push_fraction(out: &mut String, nanos: u32) {
    if nanos > 0 {
        let digits = format!("{nanos:09}");
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
}

fn format_date(date: &NaiveDate) -> String {
    let year = date.year();
    let sign = if year < 0 { "-" } else { "" };
    format!("{sign}{:04}-{:02}-{:02}", year.unsigned_abs(), date.month(), date.day())
}

fn format_time(time: &NaiveTime) -> String {
    let mut out = format!("{:02}:{:02}:{:02}", time.hour(), time.minute(), time.second());
    push_fraction(&mut out, time.nanosecond());
    out
}

fn write_tz(f: &mut fmt::Formatter<'_>, tz: Option<&FixedOffset>) -> fmt::Result {
    match tz {
        Some(tz) => f.write_str(&format_offset(tz)),
        None => Ok(()),
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_date(&self.date))?;
        write_tz(f, self.tz.as_ref())
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}T{}", format_date(&self.value.date()), format_time(&self.value.time()))?;
        write_tz(f, self.tz.as_ref())
    }
}

impl fmt::Display for TimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_time(&self.time))?;
        write_tz(f, self.tz.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("2024-02-29", "2024-02-29")]
    #[case("2024-02-29Z", "2024-02-29Z")]
    #[case("2024-02-29+00:00", "2024-02-29Z")]
    #[case("2024-02-29-05:30", "2024-02-29-05:30")]
    #[case("-0044-03-15", "-0044-03-15")]
    fn dates_render_canonically(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(DateValue::parse(input).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("2023-02-29")]
    #[case("2023-2-01")]
    #[case("2023-02-01+15:00")]
    #[case("2023-02-01T00:00:00")]
    fn invalid_dates_are_rejected(#[case] input: &str) {
        assert_eq!(DateValue::parse(input).unwrap_err().kind, ErrorKind::InvalidLexicalValue);
    }

    #[rstest]
    #[case("2020-01-01T12:30:00", "2020-01-01T12:30:00")]
    #[case("2020-01-01T12:30:00.500Z", "2020-01-01T12:30:00.5Z")]
    #[case("2020-12-31T24:00:00", "2021-01-01T00:00:00")]
    #[case("2020-01-01T01:02:03.123456789+01:00", "2020-01-01T01:02:03.123456789+01:00")]
    fn date_times_render_canonically(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(DateTimeValue::parse(input).unwrap().to_string(), expected);
    }

    #[rstest]
    fn times_parse_with_and_without_zone() {
        let t = TimeValue::parse("13:20:00-05:00").unwrap();
        assert_eq!(t.to_string(), "13:20:00-05:00");
        assert!(TimeValue::parse("24:00:01").is_err());
        assert_eq!(TimeValue::parse("24:00:00").unwrap().to_string(), "00:00:00");
    }

    #[rstest]
    fn adjusting_converts_between_offsets() {
        let v = DateTimeValue::parse("2002-03-07T10:00:00-05:00").unwrap();
        let adjusted = v.adjust_to_timezone(FixedOffset::east_opt(-10 * 3600)).unwrap();
        assert_eq!(adjusted.to_string(), "2002-03-07T05:00:00-10:00");
        assert_eq!(v.adjust_to_timezone(None).unwrap().to_string(), "2002-03-07T10:00:00");
    }

    #[rstest]
    #[case("262142-12-31T23:00:00Z", 14 * 3600)]
    #[case("-262143-01-01T01:00:00Z", -14 * 3600)]
    fn adjusting_past_the_year_range_overflows(#[case] input: &str, #[case] offset: i32) {
        let v = DateTimeValue::parse(input).unwrap();
        let err = v.adjust_to_timezone(FixedOffset::east_opt(offset)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArithmeticOverflowOrUnderflow);
        assert_eq!(err.code, ErrorCode::FODT0001);
    }

    #[rstest]
    fn boundary_values_still_order_by_instant() {
        let late = DateTimeValue::parse("262142-12-31T23:00:00-14:00").unwrap();
        let early = DateTimeValue::parse("262142-12-31T23:00:00+14:00").unwrap();
        let (a, b) = comparable_instants(&late, &early, None).unwrap();
        assert!(a > b);
        assert_eq!(a.signed_duration_since(b), Some(TimeDelta::hours(28)));
    }

    #[rstest]
    fn mixed_zones_need_an_implicit_timezone() {
        let zoned = DateTimeValue::parse("2020-01-01T00:00:00Z").unwrap();
        let local = DateTimeValue::parse("2020-01-01T01:00:00").unwrap();
        assert!(comparable_instants(&zoned, &local, None).is_none());
        let (a, b) = comparable_instants(&zoned, &local, FixedOffset::east_opt(3600)).unwrap();
        assert_eq!(a, b);
    }

    #[rstest]
    fn combining_date_and_time_checks_timezones() {
        let date = DateValue::parse("2020-01-01Z").unwrap();
        let time = TimeValue::parse("10:00:00+01:00").unwrap();
        let err = DateTimeValue::from_date_and_time(&date, &time).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InconsistentTimezone);
        let time = TimeValue::parse("10:00:00").unwrap();
        assert_eq!(DateTimeValue::from_date_and_time(&date, &time).unwrap().to_string(), "2020-01-01T10:00:00Z");
    }
}
