use crate::engine::runtime::{Error, ErrorKind};
use crate::xdm::AtomicItem;
use crate::xdm::atomic::{Num, in_context};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

fn operands(left: &AtomicItem, right: &AtomicItem) -> Result<(Num, Num), Error> {
    match (left.as_num(), right.as_num()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(Error::new(
            ErrorKind::InvalidArgumentType,
            format!("arithmetic requires numeric operands, found {} and {}", left.atomic_type(), right.atomic_type()),
        )),
    }
}

fn overflow(op: &str, left: &AtomicItem, right: &AtomicItem) -> Error {
    Error::overflow(format!("{left} {op} {right} overflows"))
}

fn decimal_result(value: Option<Decimal>, op: &str, left: &AtomicItem, right: &AtomicItem) -> Result<AtomicItem, Error> {
    value.map(|d| AtomicItem::Decimal(in_context(d))).ok_or_else(|| overflow(op, left, right))
}

/// `op:numeric-add`
pub fn numeric_add(left: &AtomicItem, right: &AtomicItem) -> Result<AtomicItem, Error> {
    match operands(left, right)? {
        (Num::Int(a), Num::Int(b)) => a.checked_add(b).map(AtomicItem::Integer).ok_or_else(|| overflow("+", left, right)),
        (a, b) => decimal_result(a.to_decimal().checked_add(b.to_decimal()), "+", left, right),
    }
}

/// `op:numeric-subtract`
pub fn numeric_subtract(left: &AtomicItem, right: &AtomicItem) -> Result<AtomicItem, Error> {
    match operands(left, right)? {
        (Num::Int(a), Num::Int(b)) => a.checked_sub(b).map(AtomicItem::Integer).ok_or_else(|| overflow("-", left, right)),
        (a, b) => decimal_result(a.to_decimal().checked_sub(b.to_decimal()), "-", left, right),
    }
}

/// `op:numeric-multiply`
pub fn numeric_multiply(left: &AtomicItem, right: &AtomicItem) -> Result<AtomicItem, Error> {
    match operands(left, right)? {
        (Num::Int(a), Num::Int(b)) => a.checked_mul(b).map(AtomicItem::Integer).ok_or_else(|| overflow("*", left, right)),
        (a, b) => decimal_result(a.to_decimal().checked_mul(b.to_decimal()), "*", left, right),
    }
}

/// `op:numeric-divide`: the result is always a decimal.
pub fn numeric_divide(left: &AtomicItem, right: &AtomicItem) -> Result<AtomicItem, Error> {
    let (a, b) = operands(left, right)?;
    if b.is_zero() {
        return Err(Error::division_by_zero());
    }
    decimal_result(a.to_decimal().checked_div(b.to_decimal()), "div", left, right)
}

/// `op:numeric-integer-divide`: truncates toward zero.
pub fn numeric_integer_divide(left: &AtomicItem, right: &AtomicItem) -> Result<AtomicItem, Error> {
    let (a, b) = operands(left, right)?;
    if b.is_zero() {
        return Err(Error::division_by_zero());
    }
    let quotient = match (a, b) {
        (Num::Int(a), Num::Int(b)) => a.checked_div(b),
        (a, b) => a.to_decimal().checked_div(b.to_decimal()).and_then(|q| q.trunc().to_i64()),
    };
    quotient.map(AtomicItem::Integer).ok_or_else(|| overflow("idiv", left, right))
}

/// `op:numeric-mod`. A zero dividend is returned as is.
pub fn numeric_mod(left: &AtomicItem, right: &AtomicItem) -> Result<AtomicItem, Error> {
    let (a, b) = operands(left, right)?;
    if b.is_zero() {
        return Err(Error::division_by_zero());
    }
    if a.is_zero() {
        return Ok(left.clone());
    }
    match (a, b) {
        (Num::Int(a), Num::Int(b)) => {
            // i64::MIN mod -1 is the only overflowing case; its remainder is zero
            Ok(AtomicItem::Integer(a.checked_rem(b).unwrap_or(0)))
        }
        (a, b) => decimal_result(a.to_decimal().checked_rem(b.to_decimal()), "mod", left, right),
    }
}

/// `op:numeric-unary-minus`
pub fn numeric_unary_minus(item: &AtomicItem) -> Result<AtomicItem, Error> {
    item.negate()
}

/// `op:numeric-unary-plus`
pub fn numeric_unary_plus(item: &AtomicItem) -> Result<AtomicItem, Error> {
    match item.as_num() {
        Some(n) => Ok(AtomicItem::from_num(n)),
        None => Err(Error::new(ErrorKind::InvalidArgumentType, format!("'{item}' is not numeric"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dec(s: &str) -> AtomicItem {
        AtomicItem::Decimal(s.parse().unwrap())
    }

    #[rstest]
    #[case(AtomicItem::Integer(2), AtomicItem::Integer(3), AtomicItem::Integer(5))]
    #[case(AtomicItem::Integer(2), dec("0.5"), dec("2.5"))]
    #[case(AtomicItem::PositiveInteger(2), AtomicItem::NonNegativeInteger(0), AtomicItem::Integer(2))]
    fn adds(#[case] a: AtomicItem, #[case] b: AtomicItem, #[case] expected: AtomicItem) {
        assert_eq!(numeric_add(&a, &b).unwrap(), expected);
    }

    #[rstest]
    fn integer_overflow_is_reported() {
        let err = numeric_add(&AtomicItem::Integer(i64::MAX), &AtomicItem::Integer(1)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ArithmeticOverflowOrUnderflow);
        assert!(numeric_multiply(&AtomicItem::Integer(i64::MAX), &AtomicItem::Integer(2)).is_err());
    }

    #[rstest]
    fn divide_always_yields_decimal() {
        assert_eq!(numeric_divide(&AtomicItem::Integer(6), &AtomicItem::Integer(3)).unwrap(), dec("2"));
        assert_eq!(
            numeric_divide(&AtomicItem::Integer(1), &AtomicItem::Integer(3)).unwrap(),
            dec("0.3333333333333333")
        );
    }

    #[rstest]
    #[case(AtomicItem::Integer(1), AtomicItem::Integer(0))]
    #[case(dec("1.5"), dec("0.0"))]
    fn zero_divisors(#[case] a: AtomicItem, #[case] b: AtomicItem) {
        assert_eq!(numeric_divide(&a, &b).unwrap_err().kind, ErrorKind::DivisionByZero);
        assert_eq!(numeric_integer_divide(&a, &b).unwrap_err().kind, ErrorKind::DivisionByZero);
        assert_eq!(numeric_mod(&a, &b).unwrap_err().kind, ErrorKind::DivisionByZero);
    }

    #[rstest]
    #[case(AtomicItem::Integer(7), AtomicItem::Integer(2), AtomicItem::Integer(3))]
    #[case(AtomicItem::Integer(-7), AtomicItem::Integer(2), AtomicItem::Integer(-3))]
    #[case(dec("7.5"), dec("2"), AtomicItem::Integer(3))]
    #[case(dec("-7.5"), AtomicItem::Integer(2), AtomicItem::Integer(-3))]
    fn integer_divide_truncates(#[case] a: AtomicItem, #[case] b: AtomicItem, #[case] expected: AtomicItem) {
        assert_eq!(numeric_integer_divide(&a, &b).unwrap(), expected);
    }

    #[rstest]
    #[case(AtomicItem::Integer(5), AtomicItem::Integer(3), AtomicItem::Integer(2))]
    #[case(AtomicItem::Integer(-5), AtomicItem::Integer(3), AtomicItem::Integer(-2))]
    #[case(dec("4.5"), dec("1.2"), dec("0.9"))]
    #[case(AtomicItem::Integer(0), AtomicItem::Integer(5), AtomicItem::Integer(0))]
    fn modulo(#[case] a: AtomicItem, #[case] b: AtomicItem, #[case] expected: AtomicItem) {
        assert_eq!(numeric_mod(&a, &b).unwrap(), expected);
    }

    #[rstest]
    fn zero_dividend_is_returned_unchanged() {
        let zero = dec("0.00");
        assert_eq!(numeric_mod(&zero, &dec("3")).unwrap(), zero);
    }

    #[rstest]
    fn unary_minus_keeps_the_numeric_kind() {
        assert_eq!(numeric_unary_minus(&AtomicItem::Integer(4)).unwrap(), AtomicItem::Integer(-4));
        assert_eq!(numeric_unary_minus(&dec("1.5")).unwrap(), dec("-1.5"));
        assert!(numeric_unary_minus(&AtomicItem::string("1")).is_err());
    }
}
