//! String-derived types whose lexical spaces are restricted by pattern.

use crate::engine::runtime::{Error, ErrorKind};
use fancy_regex::Regex;
use std::sync::LazyLock;

type Pattern = LazyLock<Result<Regex, fancy_regex::Error>>;

static TOKEN: Pattern = LazyLock::new(|| Regex::new(r"^(\p{L}|_)(\p{L}|\p{N}|[.\-_])*$"));
static HOSTNAME: Pattern = LazyLock::new(|| {
    Regex::new(r"^(?=.{1,253}\.?$)[\p{L}\p{N}](?:[\p{L}\p{N}\-]{0,62})(?:\.[\p{L}\p{N}](?:[\p{L}\p{N}\-]{0,62}))*\.?$")
});
static EMAIL_ADDRESS: Pattern = LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$"));

fn is_match(pattern: &Pattern, value: &str) -> Result<bool, Error> {
    let re = pattern
        .as_ref()
        .map_err(|e| Error::new(ErrorKind::InvalidRegex, format!("invalid built-in pattern: {e}")))?;
    Ok(re.is_match(value)?)
}

fn restricted(pattern: &Pattern, type_name: &str, value: &str) -> Result<String, Error> {
    let value = collapse_whitespace(value);
    if is_match(pattern, &value)? { Ok(value) } else { Err(Error::invalid_lexical(type_name, &value)) }
}

pub(crate) fn parse_token(s: &str) -> Result<String, Error> {
    restricted(&TOKEN, "token", s)
}

pub(crate) fn parse_hostname(s: &str) -> Result<String, Error> {
    restricted(&HOSTNAME, "hostname", s)
}

pub(crate) fn parse_email_address(s: &str) -> Result<String, Error> {
    restricted(&EMAIL_ADDRESS, "email-address", s)
}

/// XSD `collapse` whitespace normalization.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_ascii_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("abc", true)]
    #[case("_a.b-c_1", true)]
    #[case("übung", true)]
    #[case("1abc", false)]
    #[case("a b", false)]
    fn token_pattern(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(parse_token(input).is_ok(), valid);
    }

    #[rstest]
    #[case("example.com", true)]
    #[case("localhost", true)]
    #[case("a-b.example.org.", true)]
    #[case("-bad.example", false)]
    #[case("bad..example", false)]
    fn hostname_pattern(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(parse_hostname(input).is_ok(), valid);
    }

    #[rstest]
    #[case("user@example.com", true)]
    #[case("user@@example.com", false)]
    #[case("no-at-sign", false)]
    fn email_pattern(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(parse_email_address(input).is_ok(), valid);
    }

    #[rstest]
    fn whitespace_is_collapsed_before_matching() {
        assert_eq!(parse_token("  abc \n").unwrap(), "abc");
        assert_eq!(collapse_whitespace(" a \t b  c "), "a b c");
    }
}
