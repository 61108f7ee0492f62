use super::CallContext;
use super::common::{atomics, integer_arg, opt_atomic, single, untyped_as_decimal};
use crate::engine::comparison::{ComparisonOperator, value_compare};
use crate::engine::operations;
use crate::engine::runtime::{Error, ErrorCode, ErrorKind};
use crate::xdm::{AtomicItem, Sequence};

fn unary(args: &[Sequence], f: impl Fn(&AtomicItem) -> Result<AtomicItem, Error>) -> Result<Sequence, Error> {
    match opt_atomic(&args[0]) {
        Some(value) => f(value).map(single),
        None => Ok(Sequence::empty()),
    }
}

pub(super) fn abs_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    unary(args, AtomicItem::abs)
}

pub(super) fn ceiling_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    unary(args, AtomicItem::ceiling)
}

pub(super) fn floor_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    unary(args, AtomicItem::floor)
}

pub(super) fn round_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let precision = match args.get(1) {
        Some(p) => integer_arg(p, "precision")?,
        None => 0,
    };
    unary(args, |value| value.round_with_precision(precision))
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Family {
    Numeric,
    DayTime,
    YearMonth,
}

fn family(value: &AtomicItem) -> Option<Family> {
    match value {
        AtomicItem::DayTimeDuration(_) => Some(Family::DayTime),
        AtomicItem::YearMonthDuration(_) => Some(Family::YearMonth),
        v if v.is_numeric() => Some(Family::Numeric),
        _ => None,
    }
}

/// Values to aggregate: untyped values become decimals, and all values must
/// be numbers or all durations of one kind.
fn summable(function: &str, arg: &Sequence) -> Result<Vec<AtomicItem>, Error> {
    let values = atomics(arg).map(untyped_as_decimal).collect::<Result<Vec<_>, _>>()?;
    let first = values.first().and_then(family);
    if values.iter().all(|v| family(v).is_some() && family(v) == first) {
        return Ok(values);
    }
    Err(Error::from_code(
        ErrorKind::InvalidArgumentType,
        ErrorCode::FORG0006,
        format!("{function} requires numbers or durations of a single kind"),
    ))
}

fn total(values: Vec<AtomicItem>) -> Result<Option<AtomicItem>, Error> {
    let mut values = values.into_iter();
    let Some(first) = values.next() else {
        return Ok(None);
    };
    values.try_fold(first, |acc, v| operations::add(&acc, &v)).map(Some)
}

/// `sum#1` yields integer zero for an empty input, `sum#2` its second argument.
pub(super) fn sum_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    match total(summable("sum", &args[0])?)? {
        Some(sum) => Ok(single(sum)),
        None => Ok(args.get(1).cloned().unwrap_or_else(|| single(AtomicItem::Integer(0)))),
    }
}

pub(super) fn avg_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let values = summable("avg", &args[0])?;
    let count = AtomicItem::Integer(i64::try_from(values.len()).unwrap_or(i64::MAX));
    match total(values)? {
        Some(sum) => operations::divide(&sum, &count).map(single),
        None => Ok(Sequence::empty()),
    }
}

fn extreme(ctx: &CallContext<'_>, arg: &Sequence, op: ComparisonOperator) -> Result<Sequence, Error> {
    let mut best: Option<AtomicItem> = None;
    for value in atomics(arg) {
        let value = untyped_as_decimal(value)?;
        best = Some(match best {
            Some(current) if !value_compare(&value, op, &current, ctx.dynamic)? => current,
            _ => value,
        });
    }
    Ok(best.map(single).unwrap_or_default())
}

pub(super) fn min_fn(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    extreme(ctx, &args[0], ComparisonOperator::Lt)
}

pub(super) fn max_fn(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    extreme(ctx, &args[0], ComparisonOperator::Gt)
}
