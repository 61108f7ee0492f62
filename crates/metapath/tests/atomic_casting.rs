use metapath::{AtomicItem, AtomicType, ErrorCode, ErrorKind};
use rstest::rstest;

fn canonical(ty: AtomicType, lexical: &str) -> String {
    ty.value_of(lexical).expect("valid lexical form").as_string()
}

#[rstest]
#[case(AtomicType::Integer, " 0042 ", "42")]
#[case(AtomicType::Decimal, "1.50", "1.5")]
#[case(AtomicType::Decimal, "-0.0", "0")]
#[case(AtomicType::Boolean, "1", "true")]
#[case(AtomicType::Boolean, "false", "false")]
#[case(AtomicType::DayTimeDuration, "PT36H", "P1DT12H")]
#[case(AtomicType::DayTimeDuration, "PT0.500S", "PT0.5S")]
#[case(AtomicType::YearMonthDuration, "P14M", "P1Y2M")]
#[case(AtomicType::YearMonthDuration, "-P0Y", "P0M")]
#[case(AtomicType::Date, "2024-02-29+00:00", "2024-02-29Z")]
#[case(AtomicType::HexBinary, "0fa0", "0FA0")]
#[case(AtomicType::Uuid, "123E4567-E89B-12D3-A456-426614174000", "123e4567-e89b-12d3-a456-426614174000")]
fn values_render_canonically(#[case] ty: AtomicType, #[case] lexical: &str, #[case] expected: &str) {
    assert_eq!(canonical(ty, lexical), expected);
}

#[rstest]
#[case(AtomicType::Integer, "4.2")]
#[case(AtomicType::Boolean, "yes")]
#[case(AtomicType::PositiveInteger, "0")]
#[case(AtomicType::NonNegativeInteger, "-1")]
#[case(AtomicType::Date, "2023-02-29")]
#[case(AtomicType::DateTimeWithTimezone, "2023-02-01T10:00:00")]
#[case(AtomicType::YearMonthDuration, "P1D")]
#[case(AtomicType::Ipv4Address, "256.0.0.1")]
#[case(AtomicType::Duration, "P")]
fn malformed_lexical_forms_are_rejected(#[case] ty: AtomicType, #[case] lexical: &str) {
    let err = ty.value_of(lexical).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidLexicalValue, "{ty}: {lexical}");
    assert_eq!(err.code, ErrorCode::FOCA0002);
}

#[rstest]
fn casting_to_the_same_type_is_identity() {
    for (ty, lexical) in [
        (AtomicType::String, "text"),
        (AtomicType::Integer, "12"),
        (AtomicType::Decimal, "3.25"),
        (AtomicType::DateTime, "2024-01-01T08:30:00"),
        (AtomicType::DateTimeWithTimezone, "2024-01-01T08:30:00+01:00"),
        (AtomicType::DayTimeDuration, "P1DT2H"),
        (AtomicType::AnyUri, "http://example.com/"),
        (AtomicType::Ipv6Address, "::1"),
    ] {
        let value = ty.value_of(lexical).unwrap();
        assert_eq!(ty.cast(&value).unwrap(), value, "{ty}");
    }
}

#[rstest]
#[case(AtomicType::Integer, "-17")]
#[case(AtomicType::Decimal, "10.125")]
#[case(AtomicType::Boolean, "true")]
#[case(AtomicType::Date, "1999-12-31-05:00")]
#[case(AtomicType::Time, "23:59:59.25")]
#[case(AtomicType::DayTimeDuration, "-P2DT3M")]
#[case(AtomicType::YearMonthDuration, "P3Y")]
#[case(AtomicType::Base64Binary, "aGVsbG8=")]
#[case(AtomicType::Ipv4Address, "192.168.0.1")]
fn string_round_trip_keeps_the_value(#[case] ty: AtomicType, #[case] lexical: &str) {
    let value = ty.value_of(lexical).unwrap();
    let text = AtomicType::String.cast(&value).unwrap();
    assert_eq!(ty.cast(&text).unwrap(), value);
}

/// One value in canonical form for every concrete type.
fn sample(ty: AtomicType) -> &'static str {
    match ty {
        AtomicType::String => "free  text ",
        AtomicType::Token => "a-token_1",
        AtomicType::Hostname => "www.example.com",
        AtomicType::EmailAddress => "user@example.com",
        AtomicType::UntypedAtomic => " untyped ",
        AtomicType::Boolean => "true",
        AtomicType::Decimal => "-10.125",
        AtomicType::Integer => "-17",
        AtomicType::NonNegativeInteger => "0",
        AtomicType::PositiveInteger => "12",
        AtomicType::DayTimeDuration => "-P2DT3M0.5S",
        AtomicType::YearMonthDuration => "P3Y1M",
        AtomicType::Date => "1999-12-31",
        AtomicType::DateWithTimezone => "1999-12-31-05:00",
        AtomicType::DateTime => "2024-02-29T13:45:10.123",
        AtomicType::DateTimeWithTimezone => "2024-02-29T13:45:10+02:00",
        AtomicType::Time => "23:59:59.25",
        AtomicType::TimeWithTimezone => "08:00:00Z",
        AtomicType::Base64Binary => "aGVsbG8=",
        AtomicType::HexBinary => "0FA0",
        AtomicType::AnyUri => "http://example.com/a?b=c",
        AtomicType::UriReference => "../a/b",
        AtomicType::Ipv4Address => "192.168.0.1",
        AtomicType::Ipv6Address => "2001:db8::1",
        AtomicType::Uuid => "123e4567-e89b-12d3-a456-426614174000",
        AtomicType::MarkupLine => "some **bold** text",
        AtomicType::MarkupMultiline => "# Title\n\nA paragraph.",
        abstract_type => panic!("{abstract_type} has no instances of its own"),
    }
}

#[rstest]
fn every_concrete_type_round_trips_through_its_canonical_form() {
    for &ty in AtomicType::CONCRETE {
        let value = ty.value_of(sample(ty)).unwrap();
        let canonical = value.as_string();
        assert_eq!(canonical, sample(ty), "{ty} sample is not canonical");
        let reparsed = ty.value_of(&canonical).unwrap();
        assert_eq!(reparsed, value, "{ty}");
        assert_eq!(reparsed.atomic_type(), ty);
    }
}

/// Lexical forms whose canonical rendering differs from the input. Reparsing
/// the canonical form yields an equal value in every case; only the decimal
/// scale and sub-nanosecond digits are not kept.
#[rstest]
#[case(AtomicType::Decimal, "1.50", "1.5")]
#[case(AtomicType::Decimal, "-0.0", "0")]
#[case(AtomicType::Integer, "+007", "7")]
#[case(AtomicType::Token, "  a  ", "a")]
#[case(AtomicType::HexBinary, "0fa0", "0FA0")]
#[case(AtomicType::Uuid, "123E4567-E89B-12D3-A456-426614174000", "123e4567-e89b-12d3-a456-426614174000")]
#[case(AtomicType::DayTimeDuration, "PT36H", "P1DT12H")]
#[case(AtomicType::YearMonthDuration, "P14M", "P1Y2M")]
#[case(AtomicType::Date, "2024-02-29+00:00", "2024-02-29Z")]
#[case(AtomicType::DateTime, "2020-12-31T24:00:00", "2021-01-01T00:00:00")]
#[case(AtomicType::Time, "24:00:00", "00:00:00")]
#[case(AtomicType::Time, "00:00:00.1234567891", "00:00:00.123456789")]
fn lossy_canonical_forms(#[case] ty: AtomicType, #[case] lexical: &str, #[case] expected: &str) {
    let value = ty.value_of(lexical).unwrap();
    assert_eq!(value.as_string(), expected);
    assert_eq!(ty.value_of(expected).unwrap(), value);
}

#[rstest]
#[case(AtomicItem::Decimal("2.9".parse().unwrap()), AtomicType::Integer, "2")]
#[case(AtomicItem::Decimal("-2.9".parse().unwrap()), AtomicType::Integer, "-2")]
#[case(AtomicItem::Boolean(true), AtomicType::Integer, "1")]
#[case(AtomicItem::Integer(0), AtomicType::Boolean, "false")]
#[case(AtomicItem::untyped("7"), AtomicType::Numeric, "7")]
#[case(AtomicItem::string("P1Y"), AtomicType::Duration, "P1Y")]
#[case(AtomicItem::string("PT90M"), AtomicType::Duration, "PT1H30M")]
fn casts_between_types(#[case] value: AtomicItem, #[case] target: AtomicType, #[case] expected: &str) {
    assert_eq!(target.cast(&value).unwrap().as_string(), expected);
}

#[rstest]
fn untyped_values_cast_to_numeric_become_decimals() {
    let value = AtomicType::Numeric.cast(&AtomicItem::untyped("7")).unwrap();
    assert_eq!(value.atomic_type(), AtomicType::Decimal);
}

#[rstest]
fn failed_casts_keep_the_underlying_failure() {
    let err = AtomicType::Integer.cast(&AtomicItem::string("abc")).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidCast);
    assert_eq!(err.code, ErrorCode::FORG0001);
    assert!(std::error::Error::source(&err).is_some());
}

#[rstest]
fn abstract_duration_reports_both_alternatives() {
    let err = AtomicType::Duration.cast(&AtomicItem::string("nonsense")).unwrap_err();
    assert_eq!(err.causes.len(), 2);
}

#[rstest]
#[case(AtomicType::Integer, AtomicType::Decimal, true)]
#[case(AtomicType::PositiveInteger, AtomicType::Numeric, true)]
#[case(AtomicType::DateTimeWithTimezone, AtomicType::DateTime, true)]
#[case(AtomicType::Token, AtomicType::String, true)]
#[case(AtomicType::Decimal, AtomicType::Integer, false)]
#[case(AtomicType::Date, AtomicType::DateTime, false)]
fn subtype_lattice(#[case] sub: AtomicType, #[case] sup: AtomicType, #[case] expected: bool) {
    assert_eq!(sub.is_subtype_of(sup), expected);
}

#[rstest]
fn every_concrete_type_is_named_and_found_by_name() {
    for &ty in AtomicType::CONCRETE {
        assert!(!ty.is_abstract());
        assert_eq!(AtomicType::from_name(ty.name()), Some(ty));
    }
}
