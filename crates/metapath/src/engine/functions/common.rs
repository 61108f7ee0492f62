use super::Argument;
use crate::engine::runtime::{Error, ErrorKind};
use crate::engine::types::{ItemType, SequenceType};
use crate::xdm::{AtomicItem, AtomicType, Item, Sequence};
use rust_decimal::Decimal;

pub(super) fn arg(name: &str, sequence_type: SequenceType) -> Argument {
    Argument::new(name, sequence_type)
}

pub(super) fn one(ty: AtomicType) -> SequenceType {
    SequenceType::one(ItemType::Atomic(ty))
}

pub(super) fn opt(ty: AtomicType) -> SequenceType {
    SequenceType::zero_or_one(ItemType::Atomic(ty))
}

pub(super) fn many(ty: AtomicType) -> SequenceType {
    SequenceType::zero_or_more(ItemType::Atomic(ty))
}

/// `item()*`
pub(super) fn items() -> SequenceType {
    SequenceType::any_items()
}

/// `item()?`
pub(super) fn opt_item() -> SequenceType {
    SequenceType::zero_or_one(ItemType::AnyItem)
}

/// `function(*)?`
pub(super) fn opt_function() -> SequenceType {
    SequenceType::zero_or_one(ItemType::Function)
}

pub(super) fn single(value: impl Into<AtomicItem>) -> Sequence {
    Sequence::singleton(Item::Atomic(value.into()))
}

pub(super) fn opt_single(value: Option<impl Into<AtomicItem>>) -> Sequence {
    value.map(single).unwrap_or_default()
}

/// The atomic value of an optional argument.
pub(super) fn opt_atomic(arg: &Sequence) -> Option<&AtomicItem> {
    arg.first().and_then(Item::as_atomic)
}

/// The atomic value of a required argument.
pub(super) fn atomic_arg<'a>(arg: &'a Sequence, name: &str) -> Result<&'a AtomicItem, Error> {
    opt_atomic(arg).ok_or_else(|| {
        Error::new(ErrorKind::InvalidCardinality, format!("argument '${name}' requires a single atomic value"))
    })
}

/// Atomic values of an argument, in order.
pub(super) fn atomics(arg: &Sequence) -> impl Iterator<Item = &AtomicItem> {
    arg.iter().filter_map(Item::as_atomic)
}

/// String value of an optional string argument; empty when absent.
pub(super) fn string_arg(arg: &Sequence) -> String {
    opt_atomic(arg).map(AtomicItem::as_string).unwrap_or_default()
}

pub(super) fn integer_arg(arg: &Sequence, name: &str) -> Result<i64, Error> {
    let value = atomic_arg(arg, name)?;
    value.as_integer().ok_or_else(|| {
        Error::new(ErrorKind::InvalidArgumentType, format!("argument '${name}' requires an integer, found '{value}'"))
    })
}

pub(super) fn decimal_arg(arg: &Sequence, name: &str) -> Result<Decimal, Error> {
    let value = atomic_arg(arg, name)?;
    value.as_decimal().ok_or_else(|| {
        Error::new(ErrorKind::InvalidArgumentType, format!("argument '${name}' requires a number, found '{value}'"))
    })
}

/// Untyped values in numeric aggregates count as decimals.
pub(super) fn untyped_as_decimal(value: &AtomicItem) -> Result<AtomicItem, Error> {
    if value.is_untyped() { AtomicType::Decimal.cast(value) } else { Ok(value.clone()) }
}
