//! Value and general comparison.
//!
//! Value comparison dispatches on the dynamic types of both operands; pairs
//! outside the comparable families are type errors, never `false`. General
//! comparison is existential over two sequences and promotes untyped operands
//! towards the typed side.

use crate::engine::runtime::{DynamicContext, Error, ErrorKind};
use crate::xdm::atomic::{Num, comparable_instants};
use crate::xdm::{AtomicItem, AtomicType, Sequence};
use chrono::FixedOffset;
use core::cmp::Ordering;
use core::fmt;
use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOperator {
    /// Value comparison keyword.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
        }
    }

    /// General comparison symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// How two comparable values relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Relation {
    Ordered(Ordering),
    /// Equality is defined but ordering is not (durations of different kinds).
    EqualityOnly(bool),
}

impl Relation {
    fn is_equal(self) -> bool {
        match self {
            Self::Ordered(o) => o == Ordering::Equal,
            Self::EqualityOnly(eq) => eq,
        }
    }
}

fn incomparable(left: &AtomicItem, op: &str, right: &AtomicItem) -> Error {
    Error::new(
        ErrorKind::InvalidComparisonType,
        format!("invalid types for comparison: {} {op} {}", left.atomic_type(), right.atomic_type()),
    )
}

fn string_value(item: &AtomicItem) -> Option<&str> {
    match item {
        AtomicItem::String(s)
        | AtomicItem::Token(s)
        | AtomicItem::Hostname(s)
        | AtomicItem::EmailAddress(s)
        | AtomicItem::UntypedAtomic(s)
        | AtomicItem::AnyUri(s)
        | AtomicItem::UriReference(s) => Some(s),
        _ => None,
    }
}

fn compare_numbers(left: Num, right: Num) -> Ordering {
    match (left, right) {
        (Num::Int(a), Num::Int(b)) => a.cmp(&b),
        (a, b) => a.to_decimal().cmp(&b.to_decimal()),
    }
}

/// Relate two atomic values.
///
/// Temporal values where exactly one side has a timezone borrow `implicit`
/// for the other; without it they are not comparable.
pub(crate) fn compare_atomic(
    left: &AtomicItem,
    right: &AtomicItem,
    implicit: Option<FixedOffset>,
) -> Result<Relation, Error> {
    use AtomicItem as A;

    if let (Some(a), Some(b)) = (string_value(left), string_value(right)) {
        return Ok(Relation::Ordered(a.cmp(b)));
    }
    if let (Some(a), Some(b)) = (left.as_num(), right.as_num()) {
        return Ok(Relation::Ordered(compare_numbers(a, b)));
    }

    let temporal = match (left, right) {
        (A::DateTime(a) | A::DateTimeWithTimezone(a), A::DateTime(b) | A::DateTimeWithTimezone(b)) => Some((*a, *b)),
        (A::Date(a) | A::DateWithTimezone(a), A::Date(b) | A::DateWithTimezone(b)) => {
            Some((a.to_date_time(), b.to_date_time()))
        }
        (A::Time(a) | A::TimeWithTimezone(a), A::Time(b) | A::TimeWithTimezone(b)) => {
            Some((a.to_date_time(), b.to_date_time()))
        }
        _ => None,
    };
    if let Some((a, b)) = temporal {
        let (a, b) = comparable_instants(&a, &b, implicit).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidComparisonType,
                format!("cannot compare '{left}' and '{right}': one value has no timezone and no implicit timezone is set"),
            )
        })?;
        return Ok(Relation::Ordered(a.cmp(&b)));
    }

    Ok(match (left, right) {
        (A::Boolean(a), A::Boolean(b)) => Relation::Ordered(a.cmp(b)),
        (A::DayTimeDuration(a), A::DayTimeDuration(b)) => Relation::Ordered(a.cmp(b)),
        (A::YearMonthDuration(a), A::YearMonthDuration(b)) => Relation::Ordered(a.cmp(b)),
        (A::DayTimeDuration(dt), A::YearMonthDuration(ym)) | (A::YearMonthDuration(ym), A::DayTimeDuration(dt)) => {
            Relation::EqualityOnly(dt.total_nanoseconds() == 0 && ym.months() == 0)
        }
        (A::Base64Binary(a) | A::HexBinary(a), A::Base64Binary(b) | A::HexBinary(b)) => Relation::Ordered(a.cmp(b)),
        _ => return Err(incomparable(left, "vs", right)),
    })
}

fn ordering(relation: Relation, left: &AtomicItem, op: ComparisonOperator, right: &AtomicItem) -> Result<Ordering, Error> {
    match relation {
        Relation::Ordered(o) => Ok(o),
        Relation::EqualityOnly(_) => Err(incomparable(left, op.keyword(), right)),
    }
}

/// Compare two atomic values with a value comparison operator.
///
/// `le` and `ge` are evaluated as `lt or eq` and `gt or eq`, so they fail
/// wherever `lt` and `gt` fail even when the values are equal.
pub fn value_compare(
    left: &AtomicItem,
    op: ComparisonOperator,
    right: &AtomicItem,
    ctx: &DynamicContext,
) -> Result<bool, Error> {
    let relation = compare_atomic(left, right, ctx.implicit_timezone())?;
    Ok(match op {
        ComparisonOperator::Eq => relation.is_equal(),
        ComparisonOperator::Ne => !relation.is_equal(),
        ComparisonOperator::Lt => ordering(relation, left, op, right)? == Ordering::Less,
        ComparisonOperator::Gt => ordering(relation, left, op, right)? == Ordering::Greater,
        ComparisonOperator::Le => ordering(relation, left, op, right)? == Ordering::Less || relation.is_equal(),
        ComparisonOperator::Ge => ordering(relation, left, op, right)? == Ordering::Greater || relation.is_equal(),
    })
}

/// Cast an untyped operand towards the type family of the typed one.
fn promote_untyped(untyped: &AtomicItem, typed: &AtomicItem) -> Result<AtomicItem, Error> {
    let target = match typed {
        t if t.is_numeric() => AtomicType::Decimal,
        AtomicItem::DayTimeDuration(_) => AtomicType::DayTimeDuration,
        AtomicItem::YearMonthDuration(_) => AtomicType::YearMonthDuration,
        t => t.atomic_type(),
    };
    target.cast(untyped)
}

/// Apply the untyped promotion rules to one pair of atomized operands.
fn general_pair(
    left: &AtomicItem,
    op: ComparisonOperator,
    right: &AtomicItem,
    ctx: &DynamicContext,
) -> Result<bool, Error> {
    match (left.is_untyped(), right.is_untyped()) {
        (true, true) => {
            value_compare(&AtomicItem::string(left.as_string()), op, &AtomicItem::string(right.as_string()), ctx)
        }
        (true, false) => value_compare(&promote_untyped(left, right)?, op, right, ctx),
        (false, true) => value_compare(left, op, &promote_untyped(right, left)?, ctx),
        (false, false) => value_compare(left, op, right, ctx),
    }
}

/// Existential comparison of two sequences: true when any pair of atomized
/// items satisfies `op`. Pairs are tried in order and the first error stops
/// the search.
pub fn general_compare(
    left: &Sequence,
    op: ComparisonOperator,
    right: &Sequence,
    ctx: &DynamicContext,
) -> Result<bool, Error> {
    let left = left.atomize()?;
    let right = right.atomize()?;
    for (l, r) in left.iter().cartesian_product(right.iter()) {
        if general_pair(l, op, r, ctx)? {
            return Ok(true);
        }
    }
    Ok(false)
}
