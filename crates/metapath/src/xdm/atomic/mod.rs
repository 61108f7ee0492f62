//! Atomic values.
//!
//! [`AtomicItem`] is a closed sum over every concrete atomic type. Each type
//! family lives in its own module with its lexical parser, canonical
//! formatter and cast rules; this module ties them together behind
//! [`AtomicType::value_of`] and [`AtomicType::cast`].

mod binary;
mod boolean;
mod duration;
mod identifier;
mod markup;
mod network;
mod numeric;
mod string;
mod temporal;
mod uri;

pub use duration::{DayTimeDuration, YearMonthDuration};
pub use temporal::{DateTimeValue, DateValue, TimeValue, UtcInstant};

pub(crate) use duration::duration_overflow;
pub(crate) use numeric::{Num, in_context};
pub(crate) use string::collapse_whitespace;
pub(crate) use temporal::{comparable_instants, date_time_overflow};
pub(crate) use uri::resolve as resolve_uri;

use crate::engine::comparison::{Relation, compare_atomic};
use crate::engine::runtime::{Error, ErrorKind};
use crate::xdm::AtomicType;
use core::cmp::Ordering;
use core::fmt;
use rust_decimal::Decimal;
use std::net::{Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, PartialEq)]
pub enum AtomicItem {
    String(String),
    Token(String),
    Hostname(String),
    EmailAddress(String),
    UntypedAtomic(String),
    Boolean(bool),
    Decimal(Decimal),
    Integer(i64),
    NonNegativeInteger(i64),
    PositiveInteger(i64),
    DayTimeDuration(DayTimeDuration),
    YearMonthDuration(YearMonthDuration),
    Date(DateValue),
    DateWithTimezone(DateValue),
    DateTime(DateTimeValue),
    DateTimeWithTimezone(DateTimeValue),
    Time(TimeValue),
    TimeWithTimezone(TimeValue),
    Base64Binary(Vec<u8>),
    HexBinary(Vec<u8>),
    AnyUri(String),
    UriReference(String),
    Ipv4Address(Ipv4Addr),
    Ipv6Address(Ipv6Addr),
    Uuid(uuid::Uuid),
    MarkupLine(String),
    MarkupMultiline(String),
}

pub(crate) fn cannot_cast(item: &AtomicItem, target: &str) -> Error {
    Error::invalid_cast(format!("cannot cast '{item}' of type {} to meta:{target}", item.atomic_type()))
}

impl AtomicItem {
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    pub fn untyped(s: impl Into<String>) -> Self {
        Self::UntypedAtomic(s.into())
    }

    pub fn boolean(b: bool) -> Self {
        Self::Boolean(b)
    }

    pub fn integer(i: i64) -> Self {
        Self::Integer(i)
    }

    pub fn decimal(d: Decimal) -> Self {
        Self::Decimal(d)
    }

    pub fn non_negative_integer(i: i64) -> Result<Self, Error> {
        numeric::check_non_negative(i).map(Self::NonNegativeInteger)
    }

    pub fn positive_integer(i: i64) -> Result<Self, Error> {
        numeric::check_positive(i).map(Self::PositiveInteger)
    }

    /// A date; values with a timezone are typed `date-with-timezone`.
    pub fn date(value: DateValue) -> Self {
        if value.has_timezone() { Self::DateWithTimezone(value) } else { Self::Date(value) }
    }

    pub fn date_time(value: DateTimeValue) -> Self {
        if value.has_timezone() { Self::DateTimeWithTimezone(value) } else { Self::DateTime(value) }
    }

    pub fn time(value: TimeValue) -> Self {
        if value.has_timezone() { Self::TimeWithTimezone(value) } else { Self::Time(value) }
    }

    /// Parse `lexical` in the lexical space of `ty`.
    pub fn value_of_type(ty: AtomicType, lexical: &str) -> Result<Self, Error> {
        ty.value_of(lexical)
    }

    pub fn atomic_type(&self) -> AtomicType {
        match self {
            Self::String(_) => AtomicType::String,
            Self::Token(_) => AtomicType::Token,
            Self::Hostname(_) => AtomicType::Hostname,
            Self::EmailAddress(_) => AtomicType::EmailAddress,
            Self::UntypedAtomic(_) => AtomicType::UntypedAtomic,
            Self::Boolean(_) => AtomicType::Boolean,
            Self::Decimal(_) => AtomicType::Decimal,
            Self::Integer(_) => AtomicType::Integer,
            Self::NonNegativeInteger(_) => AtomicType::NonNegativeInteger,
            Self::PositiveInteger(_) => AtomicType::PositiveInteger,
            Self::DayTimeDuration(_) => AtomicType::DayTimeDuration,
            Self::YearMonthDuration(_) => AtomicType::YearMonthDuration,
            Self::Date(_) => AtomicType::Date,
            Self::DateWithTimezone(_) => AtomicType::DateWithTimezone,
            Self::DateTime(_) => AtomicType::DateTime,
            Self::DateTimeWithTimezone(_) => AtomicType::DateTimeWithTimezone,
            Self::Time(_) => AtomicType::Time,
            Self::TimeWithTimezone(_) => AtomicType::TimeWithTimezone,
            Self::Base64Binary(_) => AtomicType::Base64Binary,
            Self::HexBinary(_) => AtomicType::HexBinary,
            Self::AnyUri(_) => AtomicType::AnyUri,
            Self::UriReference(_) => AtomicType::UriReference,
            Self::Ipv4Address(_) => AtomicType::Ipv4Address,
            Self::Ipv6Address(_) => AtomicType::Ipv6Address,
            Self::Uuid(_) => AtomicType::Uuid,
            Self::MarkupLine(_) => AtomicType::MarkupLine,
            Self::MarkupMultiline(_) => AtomicType::MarkupMultiline,
        }
    }

    /// Whether the value is an instance of `ty`, directly or by derivation.
    pub fn instance_of(&self, ty: AtomicType) -> bool {
        self.atomic_type().is_subtype_of(ty)
    }

    pub fn is_numeric(&self) -> bool {
        self.as_num().is_some()
    }

    pub fn is_untyped(&self) -> bool {
        matches!(self, Self::UntypedAtomic(_))
    }

    /// Strings, their restrictions, and untyped values.
    pub fn is_string_like(&self) -> bool {
        matches!(self, Self::String(_) | Self::Token(_) | Self::Hostname(_) | Self::EmailAddress(_) | Self::UntypedAtomic(_))
    }

    /// Borrow the text of a string-valued item (strings, untyped, URIs, markup).
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s)
            | Self::Token(s)
            | Self::Hostname(s)
            | Self::EmailAddress(s)
            | Self::UntypedAtomic(s)
            | Self::AnyUri(s)
            | Self::UriReference(s)
            | Self::MarkupLine(s)
            | Self::MarkupMultiline(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical lexical form.
    pub fn as_string(&self) -> String {
        match self {
            Self::Boolean(b) => b.to_string(),
            Self::Decimal(d) => numeric::format_decimal(d),
            Self::Integer(i) | Self::NonNegativeInteger(i) | Self::PositiveInteger(i) => i.to_string(),
            Self::DayTimeDuration(d) => d.to_string(),
            Self::YearMonthDuration(d) => d.to_string(),
            Self::Date(d) | Self::DateWithTimezone(d) => d.to_string(),
            Self::DateTime(v) | Self::DateTimeWithTimezone(v) => v.to_string(),
            Self::Time(t) | Self::TimeWithTimezone(t) => t.to_string(),
            Self::Base64Binary(b) => binary::format_base64(b),
            Self::HexBinary(b) => binary::format_hex(b),
            Self::Ipv4Address(ip) => ip.to_string(),
            Self::Ipv6Address(ip) => ip.to_string(),
            Self::Uuid(u) => u.hyphenated().to_string(),
            other => other.as_str().map(str::to_string).unwrap_or_default(),
        }
    }

    pub fn cast_as_type(&self, ty: AtomicType) -> Result<AtomicItem, Error> {
        ty.cast(self)
    }

    /// Ordering against a value of a comparable type.
    ///
    /// Mixed zoned and unzoned temporal values cannot be ordered without an
    /// implicit timezone; use the value comparison with a dynamic context for
    /// those.
    pub fn compare_to(&self, other: &AtomicItem) -> Result<Ordering, Error> {
        match compare_atomic(self, other, None)? {
            Relation::Ordered(ordering) => Ok(ordering),
            Relation::EqualityOnly(true) => Ok(Ordering::Equal),
            Relation::EqualityOnly(false) => Err(Error::new(
                ErrorKind::InvalidComparisonType,
                format!("'{self}' of type {} and '{other}' of type {} have no ordering", self.atomic_type(), other.atomic_type()),
            )),
        }
    }
}

impl fmt::Display for AtomicItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(s) => f.write_str(s),
            None => f.write_str(&self.as_string()),
        }
    }
}

impl From<bool> for AtomicItem {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for AtomicItem {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<Decimal> for AtomicItem {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<String> for AtomicItem {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for AtomicItem {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<DayTimeDuration> for AtomicItem {
    fn from(value: DayTimeDuration) -> Self {
        Self::DayTimeDuration(value)
    }
}

impl From<YearMonthDuration> for AtomicItem {
    fn from(value: YearMonthDuration) -> Self {
        Self::YearMonthDuration(value)
    }
}

impl From<DateValue> for AtomicItem {
    fn from(value: DateValue) -> Self {
        Self::date(value)
    }
}

impl From<DateTimeValue> for AtomicItem {
    fn from(value: DateTimeValue) -> Self {
        Self::date_time(value)
    }
}

impl From<TimeValue> for AtomicItem {
    fn from(value: TimeValue) -> Self {
        Self::time(value)
    }
}

impl From<uuid::Uuid> for AtomicItem {
    fn from(value: uuid::Uuid) -> Self {
        Self::Uuid(value)
    }
}

fn missing_timezone(type_name: &str, lexical: &str) -> Error {
    Error::new(ErrorKind::InvalidLexicalValue, format!("invalid {type_name} value '{}': a timezone is required", lexical.trim()))
}

/// Domain failures of a parsed value are lexical failures for `value_of`.
fn as_lexical(e: Error) -> Error {
    if e.kind == ErrorKind::InvalidType { Error::new(ErrorKind::InvalidLexicalValue, e.message) } else { e }
}

impl AtomicType {
    /// Parse `lexical` in the lexical space of this type.
    ///
    /// Abstract types pick the first concrete subtype whose lexical space
    /// accepts the value.
    pub fn value_of(self, lexical: &str) -> Result<AtomicItem, Error> {
        use AtomicItem as A;
        Ok(match self {
            Self::AnyAtomic | Self::UntypedAtomic => A::UntypedAtomic(lexical.to_string()),
            Self::String => A::String(lexical.to_string()),
            Self::Token => A::Token(string::parse_token(lexical)?),
            Self::Hostname => A::Hostname(string::parse_hostname(lexical)?),
            Self::EmailAddress => A::EmailAddress(string::parse_email_address(lexical)?),
            Self::Boolean => A::Boolean(boolean::parse_boolean(lexical)?),
            Self::Numeric => match numeric::parse_integer(lexical, "integer") {
                Ok(i) => A::Integer(i),
                Err(_) => A::Decimal(numeric::parse_decimal(lexical)?),
            },
            Self::Decimal => A::Decimal(numeric::parse_decimal(lexical)?),
            Self::Integer => A::Integer(numeric::parse_integer(lexical, "integer")?),
            Self::NonNegativeInteger => A::NonNegativeInteger(
                numeric::parse_integer(lexical, "non-negative-integer")
                    .and_then(numeric::check_non_negative)
                    .map_err(as_lexical)?,
            ),
            Self::PositiveInteger => A::PositiveInteger(
                numeric::parse_integer(lexical, "positive-integer").and_then(numeric::check_positive).map_err(as_lexical)?,
            ),
            Self::Duration => duration::cast_to_duration(&A::String(lexical.to_string()))
                .map_err(|e| Error { kind: ErrorKind::InvalidLexicalValue, code: ErrorKind::InvalidLexicalValue.default_code(), ..e })?,
            Self::DayTimeDuration => A::DayTimeDuration(DayTimeDuration::parse(lexical)?),
            Self::YearMonthDuration => A::YearMonthDuration(YearMonthDuration::parse(lexical)?),
            Self::Date => A::date(DateValue::parse(lexical)?),
            Self::DateWithTimezone => {
                let value = DateValue::parse(lexical)?;
                if !value.has_timezone() {
                    return Err(missing_timezone(self.name(), lexical));
                }
                A::DateWithTimezone(value)
            }
            Self::DateTime => A::date_time(DateTimeValue::parse(lexical)?),
            Self::DateTimeWithTimezone => {
                let value = DateTimeValue::parse(lexical)?;
                if !value.has_timezone() {
                    return Err(missing_timezone(self.name(), lexical));
                }
                A::DateTimeWithTimezone(value)
            }
            Self::Time => A::time(TimeValue::parse(lexical)?),
            Self::TimeWithTimezone => {
                let value = TimeValue::parse(lexical)?;
                if !value.has_timezone() {
                    return Err(missing_timezone(self.name(), lexical));
                }
                A::TimeWithTimezone(value)
            }
            Self::Base64Binary => A::Base64Binary(binary::parse_base64(lexical)?),
            Self::HexBinary => A::HexBinary(binary::parse_hex(lexical)?),
            Self::AnyUri => A::AnyUri(uri::parse_uri(lexical)?),
            Self::UriReference => A::UriReference(uri::parse_uri_reference(lexical)?),
            Self::IpAddress => network::parse_ip_address(lexical)?,
            Self::Ipv4Address => A::Ipv4Address(network::parse_ipv4(lexical)?),
            Self::Ipv6Address => A::Ipv6Address(network::parse_ipv6(lexical)?),
            Self::Uuid => A::Uuid(identifier::parse_uuid(lexical)?),
            Self::Markup | Self::MarkupMultiline => A::MarkupMultiline(markup::parse_markup_multiline(lexical)),
            Self::MarkupLine => A::MarkupLine(markup::parse_markup_line(lexical)?),
        })
    }

    /// Convert `item` to this type.
    ///
    /// Values already of this exact type are returned unchanged. Lexical and
    /// domain failures are reported as invalid casts with the underlying
    /// failure kept as the source.
    pub fn cast(self, item: &AtomicItem) -> Result<AtomicItem, Error> {
        if item.atomic_type() == self {
            return Ok(item.clone());
        }
        self.convert(item).map_err(|e| match e.kind {
            ErrorKind::InvalidLexicalValue | ErrorKind::InvalidType => {
                let message = format!("cannot cast '{item}' of type {} to {self}: {}", item.atomic_type(), e.message);
                Error::invalid_cast(message).caused_by(e)
            }
            _ => e,
        })
    }

    fn convert(self, item: &AtomicItem) -> Result<AtomicItem, Error> {
        use AtomicItem as A;
        Ok(match self {
            Self::AnyAtomic => item.clone(),
            Self::String => A::String(item.as_string()),
            Self::UntypedAtomic => A::UntypedAtomic(item.as_string()),
            Self::Token => A::Token(string::parse_token(&item.as_string())?),
            Self::Hostname => A::Hostname(string::parse_hostname(&item.as_string())?),
            Self::EmailAddress => A::EmailAddress(string::parse_email_address(&item.as_string())?),
            Self::Boolean => A::Boolean(boolean::cast_to_boolean(item)?),
            Self::Numeric if item.is_numeric() => item.clone(),
            Self::Numeric | Self::Decimal => A::Decimal(numeric::cast_to_decimal(item)?),
            Self::Integer => A::Integer(numeric::cast_to_integer(item, "integer")?),
            Self::NonNegativeInteger => A::NonNegativeInteger(numeric::check_non_negative(numeric::cast_to_integer(
                item,
                "non-negative-integer",
            )?)?),
            Self::PositiveInteger => {
                A::PositiveInteger(numeric::check_positive(numeric::cast_to_integer(item, "positive-integer")?)?)
            }
            Self::Duration => duration::cast_to_duration(item)?,
            Self::DayTimeDuration => A::DayTimeDuration(duration::cast_to_day_time(item)?),
            Self::YearMonthDuration => A::YearMonthDuration(duration::cast_to_year_month(item)?),
            Self::Date => temporal::cast_to_date(item, false)?,
            Self::DateWithTimezone => temporal::cast_to_date(item, true)?,
            Self::DateTime => temporal::cast_to_date_time(item, false)?,
            Self::DateTimeWithTimezone => temporal::cast_to_date_time(item, true)?,
            Self::Time => temporal::cast_to_time(item, false)?,
            Self::TimeWithTimezone => temporal::cast_to_time(item, true)?,
            Self::Base64Binary => A::Base64Binary(binary::cast_to_base64(item)?),
            Self::HexBinary => A::HexBinary(binary::cast_to_hex(item)?),
            Self::AnyUri => A::AnyUri(uri::cast_to_uri(item)?),
            Self::UriReference => A::UriReference(uri::cast_to_uri_reference(item)?),
            Self::IpAddress => network::cast_to_ip_address(item)?,
            Self::Ipv4Address => A::Ipv4Address(network::cast_to_ipv4(item)?),
            Self::Ipv6Address => A::Ipv6Address(network::cast_to_ipv6(item)?),
            Self::Uuid => A::Uuid(identifier::cast_to_uuid(item)?),
            Self::Markup => markup::cast_to_markup(item)?,
            Self::MarkupLine => A::MarkupLine(markup::cast_to_markup_line(item)?),
            Self::MarkupMultiline => A::MarkupMultiline(markup::cast_to_markup_multiline(item)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AtomicType::Integer, "  0042 ", "42")]
    #[case(AtomicType::Decimal, "1.500", "1.5")]
    #[case(AtomicType::Boolean, "1", "true")]
    #[case(AtomicType::DateTime, "2020-01-01T10:00:00+00:00", "2020-01-01T10:00:00Z")]
    #[case(AtomicType::HexBinary, "0aff", "0AFF")]
    #[case(AtomicType::Ipv6Address, "2001:0db8:0000:0000:0000:0000:0000:0001", "2001:db8::1")]
    fn value_of_renders_canonically(#[case] ty: AtomicType, #[case] lexical: &str, #[case] expected: &str) {
        let item = ty.value_of(lexical).unwrap();
        assert_eq!(item.as_string(), expected);
        assert_eq!(ty.value_of(&item.as_string()).unwrap(), item);
    }

    #[rstest]
    fn zoned_temporal_values_get_the_zoned_type() {
        let zoned = AtomicType::Date.value_of("2020-01-01Z").unwrap();
        assert_eq!(zoned.atomic_type(), AtomicType::DateWithTimezone);
        assert!(zoned.instance_of(AtomicType::Date));
        let err = AtomicType::DateWithTimezone.value_of("2020-01-01").unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidLexicalValue);
    }

    #[rstest]
    #[case(AtomicItem::Decimal(Decimal::new(37, 1)), AtomicType::Integer, AtomicItem::Integer(3))]
    #[case(AtomicItem::Decimal(Decimal::new(-37, 1)), AtomicType::Integer, AtomicItem::Integer(-3))]
    #[case(AtomicItem::Integer(0), AtomicType::Boolean, AtomicItem::Boolean(false))]
    #[case(AtomicItem::Boolean(true), AtomicType::Decimal, AtomicItem::Decimal(Decimal::ONE))]
    #[case(AtomicItem::Integer(5), AtomicType::String, AtomicItem::String("5".into()))]
    #[case(AtomicItem::untyped("7"), AtomicType::Numeric, AtomicItem::Decimal(Decimal::from(7)))]
    #[case(AtomicItem::Integer(7), AtomicType::Numeric, AtomicItem::Integer(7))]
    fn casts(#[case] item: AtomicItem, #[case] ty: AtomicType, #[case] expected: AtomicItem) {
        assert_eq!(ty.cast(&item).unwrap(), expected);
    }

    #[rstest]
    #[case(AtomicItem::string("abc"), AtomicType::Integer)]
    #[case(AtomicItem::Integer(-1), AtomicType::NonNegativeInteger)]
    #[case(AtomicItem::Integer(1), AtomicType::Date)]
    #[case(AtomicItem::string("2020-01-01"), AtomicType::DateWithTimezone)]
    fn failed_casts_are_invalid_casts(#[case] item: AtomicItem, #[case] ty: AtomicType) {
        assert_eq!(ty.cast(&item).unwrap_err().kind, ErrorKind::InvalidCast);
    }

    #[rstest]
    fn cast_to_own_type_is_identity() {
        for lexical in ["P1Y", "PT1S", "2020-02-02", "abc", "1.25"] {
            let item = AtomicType::UntypedAtomic.value_of(lexical).unwrap();
            assert_eq!(AtomicType::UntypedAtomic.cast(&item).unwrap(), item);
        }
        let dt = AtomicType::DateTimeWithTimezone.value_of("2020-01-01T00:00:00Z").unwrap();
        assert_eq!(AtomicType::DateTimeWithTimezone.cast(&dt).unwrap(), dt);
    }

    #[rstest]
    fn date_time_casts_to_its_parts() {
        let dt = AtomicType::DateTime.value_of("2020-05-06T07:08:09-02:00").unwrap();
        assert_eq!(AtomicType::Date.cast(&dt).unwrap().as_string(), "2020-05-06-02:00");
        assert_eq!(AtomicType::Time.cast(&dt).unwrap().as_string(), "07:08:09-02:00");
    }

    #[rstest]
    fn compare_to_orders_same_family_values() {
        assert_eq!(AtomicItem::Integer(2).compare_to(&AtomicItem::Decimal(Decimal::new(25, 1))).unwrap(), Ordering::Less);
        assert_eq!(AtomicItem::string("b").compare_to(&AtomicItem::string("a")).unwrap(), Ordering::Greater);
        assert!(AtomicItem::string("1").compare_to(&AtomicItem::Integer(1)).is_err());
    }
}
