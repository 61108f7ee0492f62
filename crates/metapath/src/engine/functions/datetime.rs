use super::CallContext;
use super::common::{opt_atomic, opt_single, single};
use crate::engine::runtime::{Error, ErrorCode, ErrorKind};
use crate::xdm::{AtomicItem, DateTimeValue, DayTimeDuration, Sequence};
use chrono::FixedOffset;

fn now(ctx: &CallContext<'_>) -> DateTimeValue {
    let now = ctx.dynamic.current_date_time();
    DateTimeValue::new(now.naive_local(), Some(*now.offset()))
}

pub(super) fn current_date_time_fn(ctx: &CallContext<'_>, _args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(AtomicItem::date_time(now(ctx))))
}

pub(super) fn current_date_fn(ctx: &CallContext<'_>, _args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(AtomicItem::date(now(ctx).date())))
}

pub(super) fn current_time_fn(ctx: &CallContext<'_>, _args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(AtomicItem::time(now(ctx).time())))
}

pub(super) fn implicit_timezone_fn(ctx: &CallContext<'_>, _args: &[Sequence]) -> Result<Sequence, Error> {
    let offset = ctx.dynamic.implicit_timezone().map(|tz| i64::from(tz.local_minus_utc()));
    Ok(opt_single(offset.and_then(DayTimeDuration::from_seconds)))
}

pub(super) fn date_time_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let (Some(date), Some(time)) = (opt_atomic(&args[0]), opt_atomic(&args[1])) else {
        return Ok(Sequence::empty());
    };
    match (date, time) {
        (
            AtomicItem::Date(d) | AtomicItem::DateWithTimezone(d),
            AtomicItem::Time(t) | AtomicItem::TimeWithTimezone(t),
        ) => DateTimeValue::from_date_and_time(d, t).map(AtomicItem::date_time).map(single),
        _ => Err(Error::new(
            ErrorKind::InvalidArgumentType,
            format!("dateTime requires a date and a time, found {} and {}", date.atomic_type(), time.atomic_type()),
        )),
    }
}

/// A timezone given as a duration: whole minutes within fourteen hours.
fn timezone(duration: &DayTimeDuration) -> Result<FixedOffset, Error> {
    let nanos = duration.total_nanoseconds();
    let invalid = || {
        Error::from_code(
            ErrorKind::InvalidArgumentType,
            ErrorCode::FODT0003,
            format!("'{duration}' is not a valid timezone"),
        )
    };
    if nanos % 60_000_000_000 != 0 || nanos.abs() > 14 * 3_600_000_000_000 {
        return Err(invalid());
    }
    i32::try_from(nanos / 1_000_000_000).ok().and_then(FixedOffset::east_opt).ok_or_else(invalid)
}

/// Target timezone of an adjust function: the second argument, possibly
/// empty to strip the timezone, or the implicit timezone for the one
/// argument form.
fn target_timezone(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Option<FixedOffset>, Error> {
    match args.get(1) {
        Some(tz) => match opt_atomic(tz) {
            Some(AtomicItem::DayTimeDuration(d)) => timezone(d).map(Some),
            Some(other) => Err(Error::new(
                ErrorKind::InvalidArgumentType,
                format!("a timezone must be a day-time-duration, found {}", other.atomic_type()),
            )),
            None => Ok(None),
        },
        None => ctx.dynamic.implicit_timezone().map(Some).ok_or_else(|| {
            Error::new(ErrorKind::DynamicContextAbsent, "no implicit timezone is available in the dynamic context")
        }),
    }
}

fn not_temporal(function: &str, value: &AtomicItem) -> Error {
    Error::new(ErrorKind::InvalidArgumentType, format!("{function} is not defined for {}", value.atomic_type()))
}

pub(super) fn adjust_date_time_to_timezone_fn(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let Some(value) = opt_atomic(&args[0]) else {
        return Ok(Sequence::empty());
    };
    let tz = target_timezone(ctx, args)?;
    match value {
        AtomicItem::DateTime(v) | AtomicItem::DateTimeWithTimezone(v) => {
            v.adjust_to_timezone(tz).map(AtomicItem::date_time).map(single)
        }
        other => Err(not_temporal("adjust-dateTime-to-timezone", other)),
    }
}

pub(super) fn adjust_date_to_timezone_fn(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let Some(value) = opt_atomic(&args[0]) else {
        return Ok(Sequence::empty());
    };
    let tz = target_timezone(ctx, args)?;
    match value {
        AtomicItem::Date(v) | AtomicItem::DateWithTimezone(v) => {
            v.adjust_to_timezone(tz).map(AtomicItem::date).map(single)
        }
        other => Err(not_temporal("adjust-date-to-timezone", other)),
    }
}

pub(super) fn adjust_time_to_timezone_fn(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let Some(value) = opt_atomic(&args[0]) else {
        return Ok(Sequence::empty());
    };
    let tz = target_timezone(ctx, args)?;
    match value {
        AtomicItem::Time(v) | AtomicItem::TimeWithTimezone(v) => {
            v.adjust_to_timezone(tz).map(AtomicItem::time).map(single)
        }
        other => Err(not_temporal("adjust-time-to-timezone", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NS_METAPATH_FUNCTIONS;
    use crate::engine::functions::default_function_library;
    use crate::engine::runtime::DynamicContext;
    use crate::xdm::{AtomicType, ExpandedName, Item};
    use chrono::DateTime;
    use rstest::rstest;

    fn context() -> DynamicContext {
        DynamicContext::builder()
            .with_implicit_timezone(FixedOffset::west_opt(5 * 3600).unwrap())
            .with_current_date_time(DateTime::parse_from_rfc3339("2024-02-29T13:45:10.5+02:00").unwrap())
            .build()
    }

    fn call(name: &str, args: &[Sequence]) -> Result<Sequence, Error> {
        let lib = default_function_library()?;
        let f = lib.get_function(&ExpandedName::ns(NS_METAPATH_FUNCTIONS, name), args.len()).unwrap();
        f.execute(args, &context(), None)
    }

    fn value(ty: AtomicType, lexical: &str) -> Sequence {
        Sequence::singleton(ty.value_of(lexical).unwrap())
    }

    fn text(result: Sequence) -> String {
        result.first().and_then(Item::as_atomic).map(AtomicItem::as_string).unwrap_or_default()
    }

    #[rstest]
    fn clock_functions_read_the_context() {
        assert_eq!(text(call("current-dateTime", &[]).unwrap()), "2024-02-29T13:45:10.5+02:00");
        assert_eq!(text(call("current-date", &[]).unwrap()), "2024-02-29+02:00");
        assert_eq!(text(call("current-time", &[]).unwrap()), "13:45:10.5+02:00");
        assert_eq!(text(call("implicit-timezone", &[]).unwrap()), "-PT5H");
    }

    #[rstest]
    fn combines_date_and_time() {
        let out = call("dateTime", &[value(AtomicType::Date, "1999-12-31"), value(AtomicType::Time, "12:00:00Z")]);
        assert_eq!(text(out.unwrap()), "1999-12-31T12:00:00Z");
        let err = call(
            "dateTime",
            &[value(AtomicType::Date, "1999-12-31+01:00"), value(AtomicType::Time, "12:00:00Z")],
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::FORG0008);
    }

    #[rstest]
    #[case("2002-03-07T10:00:00", None, "2002-03-07T10:00:00-05:00")]
    #[case("2002-03-07T10:00:00-07:00", None, "2002-03-07T12:00:00-05:00")]
    #[case("2002-03-07T10:00:00-07:00", Some("-PT10H"), "2002-03-07T07:00:00-10:00")]
    #[case("2002-03-07T10:00:00", Some("PT10H"), "2002-03-07T10:00:00+10:00")]
    fn adjusts_date_times(#[case] input: &str, #[case] tz: Option<&str>, #[case] expected: &str) {
        let mut args = vec![value(AtomicType::DateTime, input)];
        if let Some(tz) = tz {
            args.push(value(AtomicType::DayTimeDuration, tz));
        }
        assert_eq!(text(call("adjust-dateTime-to-timezone", &args).unwrap()), expected);
    }

    #[rstest]
    fn empty_timezone_strips_it() {
        let out = call(
            "adjust-dateTime-to-timezone",
            &[value(AtomicType::DateTime, "2002-03-07T10:00:00-07:00"), Sequence::empty()],
        );
        assert_eq!(text(out.unwrap()), "2002-03-07T10:00:00");
        let out = call("adjust-date-to-timezone", &[value(AtomicType::Date, "2002-03-07-07:00"), Sequence::empty()]);
        assert_eq!(text(out.unwrap()), "2002-03-07");
    }

    #[rstest]
    #[case("PT14H1M")]
    #[case("PT1H0.5S")]
    fn invalid_timezones(#[case] tz: &str) {
        let err = call(
            "adjust-time-to-timezone",
            &[value(AtomicType::Time, "10:00:00"), value(AtomicType::DayTimeDuration, tz)],
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::FODT0003);
    }

    #[rstest]
    fn adjusting_beyond_the_last_year_is_an_error() {
        let err = call(
            "adjust-dateTime-to-timezone",
            &[value(AtomicType::DateTime, "262142-12-31T23:00:00Z"), value(AtomicType::DayTimeDuration, "PT14H")],
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArithmeticOverflowOrUnderflow);
        assert_eq!(err.code, ErrorCode::FODT0001);
    }
}
