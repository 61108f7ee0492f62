use super::{AtomicItem, cannot_cast};
use crate::engine::runtime::Error;
use uuid::Uuid;

/// Only the hyphenated 8-4-4-4-12 form is accepted.
pub(crate) fn parse_uuid(s: &str) -> Result<Uuid, Error> {
    let s = s.trim();
    let hyphenated = s.len() == 36 && s.char_indices().all(|(i, c)| matches!(i, 8 | 13 | 18 | 23) == (c == '-'));
    if !hyphenated {
        return Err(Error::invalid_lexical("uuid", s));
    }
    Uuid::try_parse(s).map_err(|_| Error::invalid_lexical("uuid", s))
}

pub(crate) fn cast_to_uuid(item: &AtomicItem) -> Result<Uuid, Error> {
    match item {
        AtomicItem::Uuid(u) => Ok(*u),
        other if other.is_string_like() => parse_uuid(&other.as_string()),
        other => Err(cannot_cast(other, "uuid")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("123e4567-e89b-12d3-a456-426614174000", true)]
    #[case("123E4567-E89B-12D3-A456-426614174000", true)]
    #[case("123e4567e89b12d3a456426614174000", false)]
    #[case("{123e4567-e89b-12d3-a456-426614174000}", false)]
    #[case("123e4567-e89b-12d3-a456-42661417400g", false)]
    fn hyphenated_form_only(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(parse_uuid(input).is_ok(), valid);
    }

    #[rstest]
    fn canonical_form_is_lower_case() {
        let u = parse_uuid("123E4567-E89B-12D3-A456-426614174000").unwrap();
        assert_eq!(AtomicItem::Uuid(u).as_string(), "123e4567-e89b-12d3-a456-426614174000");
    }
}
