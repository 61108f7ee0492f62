use crate::xdm::{AtomicItem, DateTimeValue, UtcInstant};
use rust_decimal::Decimal;
use std::net::IpAddr;

/// Hashable projection of an atomic value, keyed on its logical value.
///
/// Two items project to the same key exactly when they are the same key
/// under `op:same-key`: strings, URIs and untyped values by their string,
/// numerics by numeric value regardless of scale or integer subtype, and
/// zoned temporal values by instant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MapKey {
    String(String),
    Numeric(Decimal),
    Boolean(bool),
    /// Months and nanoseconds; a zero duration of either kind is one key.
    Duration(i64, i128),
    /// Dates key on the instant their day starts.
    Date(TemporalKey),
    DateTime(TemporalKey),
    /// Times are anchored to 1972-12-31 before zoned values are normalized.
    Time(TemporalKey),
    Base64Binary(Vec<u8>),
    HexBinary(Vec<u8>),
    IpAddress(IpAddr),
    Uuid(uuid::Uuid),
    Markup(String),
}

/// Zoned values by UTC instant, unzoned values by wall clock. The two never
/// share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TemporalKey {
    pub instant: UtcInstant,
    pub zoned: bool,
}

impl From<DateTimeValue> for TemporalKey {
    fn from(value: DateTimeValue) -> Self {
        match value.tz {
            Some(tz) => Self { instant: UtcInstant::at_offset(value.value, tz), zoned: true },
            None => Self { instant: value.wall_clock(), zoned: false },
        }
    }
}

impl AtomicItem {
    pub fn map_key(&self) -> MapKey {
        use AtomicItem as A;
        match self {
            A::String(s)
            | A::Token(s)
            | A::Hostname(s)
            | A::EmailAddress(s)
            | A::UntypedAtomic(s)
            | A::AnyUri(s)
            | A::UriReference(s) => MapKey::String(s.clone()),
            A::Boolean(b) => MapKey::Boolean(*b),
            A::Integer(i) | A::NonNegativeInteger(i) | A::PositiveInteger(i) => MapKey::Numeric(Decimal::from(*i)),
            A::Decimal(d) => MapKey::Numeric(d.normalize()),
            A::DayTimeDuration(d) => MapKey::Duration(0, d.total_nanoseconds()),
            A::YearMonthDuration(d) => MapKey::Duration(i64::from(d.months()), 0),
            A::Date(d) | A::DateWithTimezone(d) => MapKey::Date(d.to_date_time().into()),
            A::DateTime(v) | A::DateTimeWithTimezone(v) => MapKey::DateTime((*v).into()),
            A::Time(t) | A::TimeWithTimezone(t) => MapKey::Time(t.to_date_time().into()),
            A::Base64Binary(b) => MapKey::Base64Binary(b.clone()),
            A::HexBinary(b) => MapKey::HexBinary(b.clone()),
            A::Ipv4Address(ip) => MapKey::IpAddress(IpAddr::V4(*ip)),
            A::Ipv6Address(ip) => MapKey::IpAddress(IpAddr::V6(*ip)),
            A::Uuid(u) => MapKey::Uuid(*u),
            A::MarkupLine(s) | A::MarkupMultiline(s) => MapKey::Markup(s.clone()),
        }
    }

    /// `op:same-key`.
    pub fn same_key(&self, other: &AtomicItem) -> bool {
        self.map_key() == other.map_key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    fn decimal_scale_does_not_change_the_key() {
        let a = AtomicItem::decimal(Decimal::new(150, 2));
        let b = AtomicItem::decimal(Decimal::new(15, 1));
        assert!(a.same_key(&b));
        assert!(AtomicItem::integer(1).same_key(&AtomicItem::decimal(Decimal::new(100, 2))));
    }

    #[rstest]
    fn strings_and_uris_share_keys() {
        let s = AtomicItem::string("http://example.com/");
        let u = AtomicItem::value_of_type(crate::AtomicType::AnyUri, "http://example.com/").unwrap();
        let x = AtomicItem::untyped("http://example.com/");
        assert!(s.same_key(&u));
        assert!(x.same_key(&s));
    }

    #[rstest]
    fn zoned_date_times_key_by_instant() {
        let a = AtomicItem::value_of_type(crate::AtomicType::DateTime, "2020-01-01T12:00:00+02:00").unwrap();
        let b = AtomicItem::value_of_type(crate::AtomicType::DateTime, "2020-01-01T10:00:00Z").unwrap();
        let c = AtomicItem::value_of_type(crate::AtomicType::DateTime, "2020-01-01T10:00:00").unwrap();
        assert!(a.same_key(&b));
        assert!(!b.same_key(&c));
    }

    #[rstest]
    #[case("2020-01-01Z", "2020-01-01T00:00:00Z")]
    #[case("2020-01-01", "2020-01-01T00:00:00")]
    fn dates_and_date_times_never_share_keys(#[case] date: &str, #[case] date_time: &str) {
        let date = AtomicItem::value_of_type(crate::AtomicType::Date, date).unwrap();
        let date_time = AtomicItem::value_of_type(crate::AtomicType::DateTime, date_time).unwrap();
        assert!(!date.same_key(&date_time));
    }

    #[rstest]
    fn zoned_dates_key_by_the_start_of_their_day() {
        let a = AtomicItem::value_of_type(crate::AtomicType::Date, "2020-01-02+12:00").unwrap();
        let b = AtomicItem::value_of_type(crate::AtomicType::Date, "2020-01-01-12:00").unwrap();
        let c = AtomicItem::value_of_type(crate::AtomicType::Date, "2020-01-01").unwrap();
        assert!(a.same_key(&b));
        assert!(!b.same_key(&c));
    }

    #[rstest]
    fn boundary_dates_have_keys() {
        let last = AtomicItem::value_of_type(crate::AtomicType::Date, "262142-12-31-14:00").unwrap();
        assert!(matches!(last.map_key(), MapKey::Date(TemporalKey { zoned: true, .. })));
    }

    #[rstest]
    fn keys_are_usable_in_hash_sets() {
        let keys: HashSet<MapKey> = [
            AtomicItem::integer(2),
            AtomicItem::decimal(Decimal::new(20, 1)),
            AtomicItem::string("2"),
            AtomicItem::boolean(true),
        ]
        .iter()
        .map(AtomicItem::map_key)
        .collect();
        assert_eq!(keys.len(), 3);
    }
}
