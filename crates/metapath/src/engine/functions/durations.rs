use super::CallContext;
use super::common::{opt_atomic, single};
use crate::engine::runtime::{Error, ErrorKind};
use crate::xdm::{AtomicItem, DayTimeDuration, Sequence, YearMonthDuration};

/// Apply one of two component accessors depending on the duration kind.
fn component(
    args: &[Sequence],
    year_month: impl Fn(&YearMonthDuration) -> AtomicItem,
    day_time: impl Fn(&DayTimeDuration) -> AtomicItem,
) -> Result<Sequence, Error> {
    match opt_atomic(&args[0]) {
        None => Ok(Sequence::empty()),
        Some(AtomicItem::YearMonthDuration(d)) => Ok(single(year_month(d))),
        Some(AtomicItem::DayTimeDuration(d)) => Ok(single(day_time(d))),
        Some(other) => Err(Error::new(
            ErrorKind::InvalidArgumentType,
            format!("expected a duration, found {}", other.atomic_type()),
        )),
    }
}

fn zero<T>(_: &T) -> AtomicItem {
    AtomicItem::Integer(0)
}

pub(super) fn years_from_duration_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    component(args, |d| AtomicItem::Integer(d.years_component().into()), zero)
}

pub(super) fn months_from_duration_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    component(args, |d| AtomicItem::Integer(d.months_component().into()), zero)
}

pub(super) fn days_from_duration_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    component(args, zero, |d| AtomicItem::Integer(d.days()))
}

pub(super) fn hours_from_duration_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    component(args, zero, |d| AtomicItem::Integer(d.hours()))
}

pub(super) fn minutes_from_duration_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    component(args, zero, |d| AtomicItem::Integer(d.minutes()))
}

pub(super) fn seconds_from_duration_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    component(args, |_| AtomicItem::Decimal(0.into()), |d| AtomicItem::Decimal(d.seconds()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NS_METAPATH_FUNCTIONS;
    use crate::engine::functions::default_function_library;
    use crate::engine::runtime::DynamicContext;
    use crate::xdm::{AtomicType, ExpandedName};
    use rstest::rstest;

    #[rstest]
    #[case("years-from-duration", "P20Y15M", "21")]
    #[case("years-from-duration", "-P15M", "-1")]
    #[case("years-from-duration", "-P2DT15H", "0")]
    #[case("months-from-duration", "P20Y15M", "3")]
    #[case("months-from-duration", "-P20Y18M", "-6")]
    #[case("days-from-duration", "P3DT10H", "3")]
    #[case("days-from-duration", "P3DT55H", "5")]
    #[case("hours-from-duration", "P3DT10H", "10")]
    #[case("hours-from-duration", "-P3DT10H", "-10")]
    #[case("minutes-from-duration", "-P5DT12H30M", "-30")]
    #[case("seconds-from-duration", "P3DT10H12.5S", "12.5")]
    #[case("seconds-from-duration", "-PT256S", "-16")]
    #[case("seconds-from-duration", "P1Y", "0")]
    fn duration_components(#[case] function: &str, #[case] duration: &str, #[case] expected: &str) {
        let lib = default_function_library().unwrap();
        let f = lib.get_function(&ExpandedName::ns(NS_METAPATH_FUNCTIONS, function), 1).unwrap();
        let arg = Sequence::singleton(AtomicType::Duration.value_of(duration).unwrap());
        let out = f.execute(&[arg], &DynamicContext::default(), None).unwrap();
        assert_eq!(out.first().and_then(|i| i.as_atomic()).map(AtomicItem::as_string).unwrap(), expected);
    }
}
