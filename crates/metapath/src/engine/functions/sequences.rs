use super::CallContext;
use super::common::{atomic_arg, atomics, integer_arg, single};
use crate::engine::comparison::{ComparisonOperator, value_compare};
use crate::engine::runtime::Error;
use crate::engine::types::Occurrence;
use crate::xdm::{AtomicItem, Sequence};
use std::collections::HashSet;

fn count(sequence: &Sequence) -> i64 {
    i64::try_from(sequence.len()).unwrap_or(i64::MAX)
}

pub(super) fn count_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(AtomicItem::Integer(count(&args[0]))))
}

pub(super) fn empty_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(args[0].is_empty()))
}

pub(super) fn exists_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(!args[0].is_empty()))
}

pub(super) fn exactly_one_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Occurrence::One.validate(args[0].clone())
}

pub(super) fn zero_or_one_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Occurrence::ZeroOrOne.validate(args[0].clone())
}

pub(super) fn one_or_more_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Occurrence::OneOrMore.validate(args[0].clone())
}

pub(super) fn head_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(args[0].first().cloned().map(Sequence::singleton).unwrap_or_default())
}

pub(super) fn tail_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(args[0].iter().skip(1).cloned().collect::<Vec<_>>().into())
}

pub(super) fn reverse_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(args[0].iter().rev().cloned().collect::<Vec<_>>().into())
}

/// First occurrence of every distinct value, keyed like map keys.
pub(super) fn distinct_values_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let mut seen = HashSet::new();
    Ok(atomics(&args[0]).filter(|v| seen.insert(v.map_key())).cloned().collect())
}

/// 1-based positions of items equal to the search value; values that cannot
/// be compared with it are not equal.
pub(super) fn index_of_fn(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let search = atomic_arg(&args[1], "search")?;
    Ok(atomics(&args[0])
        .enumerate()
        .filter(|(_, v)| value_compare(v, ComparisonOperator::Eq, search, ctx.dynamic).unwrap_or(false))
        .map(|(i, _)| AtomicItem::Integer(i64::try_from(i + 1).unwrap_or(i64::MAX)))
        .collect())
}

pub(super) fn insert_before_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let target = &args[0];
    let position = integer_arg(&args[1], "position")?.clamp(1, count(target).saturating_add(1));
    let index = usize::try_from(position - 1).unwrap_or(target.len());
    let (before, after) = target.as_slice().split_at(index);
    Ok(before.iter().chain(args[2].iter()).chain(after).cloned().collect::<Vec<_>>().into())
}

pub(super) fn remove_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let position = integer_arg(&args[1], "position")?;
    Ok(args[0]
        .iter()
        .enumerate()
        .filter(|(i, _)| i64::try_from(i + 1).map_or(true, |p| p != position))
        .map(|(_, item)| item.clone())
        .collect::<Vec<_>>()
        .into())
}
