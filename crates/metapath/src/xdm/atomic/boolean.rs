use super::AtomicItem;
use crate::engine::runtime::{Error, ErrorCode, ErrorKind};

pub(crate) fn parse_boolean(s: &str) -> Result<bool, Error> {
    match s.trim() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(Error::invalid_lexical("boolean", other)),
    }
}

/// Numbers are true when non-zero; everything else goes through the lexical
/// space of `boolean`.
pub(crate) fn cast_to_boolean(item: &AtomicItem) -> Result<bool, Error> {
    match item {
        AtomicItem::Boolean(b) => Ok(*b),
        other => match other.as_num() {
            Some(n) => Ok(!n.is_zero()),
            None => parse_boolean(&other.as_string()),
        },
    }
}

impl AtomicItem {
    /// Effective boolean value of a single atomic item.
    pub fn effective_boolean_value(&self) -> Result<bool, Error> {
        match self {
            AtomicItem::Boolean(b) => Ok(*b),
            AtomicItem::String(s)
            | AtomicItem::Token(s)
            | AtomicItem::Hostname(s)
            | AtomicItem::EmailAddress(s)
            | AtomicItem::UntypedAtomic(s)
            | AtomicItem::AnyUri(s)
            | AtomicItem::UriReference(s) => Ok(!s.is_empty()),
            other => match other.as_num() {
                Some(n) => Ok(!n.is_zero()),
                None => Err(Error::from_code(
                    ErrorKind::InvalidArgumentType,
                    ErrorCode::FORG0006,
                    format!("effective boolean value is not defined for {}", other.atomic_type()),
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case(AtomicItem::Integer(0), false)]
    #[case(AtomicItem::Integer(-3), true)]
    #[case(AtomicItem::Decimal(Decimal::new(1, 2)), true)]
    #[case(AtomicItem::String("true".into()), true)]
    #[case(AtomicItem::UntypedAtomic(" 0 ".into()), false)]
    fn casts_to_boolean(#[case] item: AtomicItem, #[case] expected: bool) {
        assert_eq!(cast_to_boolean(&item).unwrap(), expected);
    }

    #[rstest]
    fn non_boolean_strings_fail() {
        let err = cast_to_boolean(&AtomicItem::String("yes".into())).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidLexicalValue);
    }
}
