use super::CallContext;
use super::common::{atomics, decimal_arg, opt_atomic, single, string_arg};
use crate::engine::runtime::{Error, ErrorCode, ErrorKind};
use crate::xdm::atomic::collapse_whitespace;
use crate::xdm::{AtomicItem, Sequence};
use fancy_regex::{Regex, RegexBuilder};
use lru::LruCache;
use rust_decimal::{Decimal, RoundingStrategy};
use std::num::NonZeroUsize;
use std::sync::{Arc, LazyLock, Mutex};

/// String value of the first argument, or of the focus when there is none.
fn string_or_focus(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<String, Error> {
    let item = match args.first() {
        Some(arg) => arg.first(),
        None => Some(ctx.focus()?),
    };
    match item {
        None => Ok(String::new()),
        Some(item) => Ok(item.atomize()?.as_string()),
    }
}

pub(super) fn concat_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(args.iter().map(string_arg).collect::<String>()))
}

pub(super) fn string_fn(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(string_or_focus(ctx, args)?))
}

pub(super) fn string_length_fn(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let length = string_or_focus(ctx, args)?.chars().count();
    Ok(single(AtomicItem::Integer(i64::try_from(length).unwrap_or(i64::MAX))))
}

pub(super) fn string_join_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let separator = args.get(1).map(string_arg).unwrap_or_default();
    let parts = atomics(&args[0]).map(AtomicItem::as_string).collect::<Vec<_>>();
    Ok(single(parts.join(&separator)))
}

pub(super) fn upper_case_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(string_arg(&args[0]).to_uppercase()))
}

pub(super) fn lower_case_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(string_arg(&args[0]).to_lowercase()))
}

pub(super) fn contains_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(string_arg(&args[0]).contains(string_arg(&args[1]).as_str())))
}

pub(super) fn starts_with_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(string_arg(&args[0]).starts_with(string_arg(&args[1]).as_str())))
}

pub(super) fn ends_with_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(string_arg(&args[0]).ends_with(string_arg(&args[1]).as_str())))
}

fn round_position(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Characters at 1-based positions `p` with `start <= p < start + length`,
/// after rounding `start` and `length`.
pub(super) fn substring_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let source = string_arg(&args[0]);
    let start = round_position(decimal_arg(&args[1], "start")?);
    let end = match args.get(2) {
        Some(length) => start.checked_add(round_position(decimal_arg(length, "length")?)),
        None => None,
    };
    let result = source
        .chars()
        .zip(1i64..)
        .filter(|(_, p)| {
            let p = Decimal::from(*p);
            p >= start && end.is_none_or(|end| p < end)
        })
        .map(|(c, _)| c)
        .collect::<String>();
    Ok(single(result))
}

pub(super) fn substring_before_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let (haystack, needle) = (string_arg(&args[0]), string_arg(&args[1]));
    let result = haystack.find(needle.as_str()).map(|i| &haystack[..i]).unwrap_or_default();
    Ok(single(result))
}

pub(super) fn substring_after_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let (haystack, needle) = (string_arg(&args[0]), string_arg(&args[1]));
    let result = haystack.find(needle.as_str()).map(|i| &haystack[i + needle.len()..]).unwrap_or_default();
    Ok(single(result))
}

pub(super) fn normalize_space_fn(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(single(collapse_whitespace(&string_or_focus(ctx, args)?)))
}

/// Codepoint comparison: -1, 0 or 1; empty if either operand is empty.
pub(super) fn compare_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let (Some(a), Some(b)) = (opt_atomic(&args[0]), opt_atomic(&args[1])) else {
        return Ok(Sequence::empty());
    };
    let ordering = a.as_string().cmp(&b.as_string());
    Ok(single(AtomicItem::Integer(ordering as i64)))
}

const REGEX_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(64) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

static REGEX_CACHE: LazyLock<Mutex<LruCache<(String, String), Arc<Regex>>>> =
    LazyLock::new(|| Mutex::new(LruCache::new(REGEX_CACHE_CAPACITY)));

fn escape_literal(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    for c in pattern.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn build_regex(pattern: &str, flags: &str) -> Result<Regex, Error> {
    let literal = flags.contains('q');
    let source = if literal { escape_literal(pattern) } else { pattern.to_string() };
    let mut builder = RegexBuilder::new(&source);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' if !literal => {
                builder.verbose_mode(true);
            }
            'x' | 'q' => {}
            other => {
                return Err(Error::from_code(
                    ErrorKind::InvalidRegex,
                    ErrorCode::FORX0001,
                    format!("unsupported regular expression flag '{other}'"),
                ));
            }
        }
    }
    Ok(builder.build()?)
}

/// Compile `pattern` with `flags`, reusing recently compiled expressions.
fn compile(pattern: &str, flags: &str) -> Result<Arc<Regex>, Error> {
    let key = (pattern.to_string(), flags.to_string());
    if let Ok(mut cache) = REGEX_CACHE.lock()
        && let Some(regex) = cache.get(&key)
    {
        return Ok(regex.clone());
    }
    let regex = Arc::new(build_regex(pattern, flags)?);
    if let Ok(mut cache) = REGEX_CACHE.lock() {
        cache.put(key, regex.clone());
    }
    Ok(regex)
}

pub(super) fn matches_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    let input = string_arg(&args[0]);
    let pattern = string_arg(&args[1]);
    let flags = args.get(2).map(string_arg).unwrap_or_default();
    let regex = compile(&pattern, &flags)?;
    Ok(single(regex.is_match(&input)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NS_METAPATH_FUNCTIONS;
    use crate::engine::functions::default_function_library;
    use crate::engine::runtime::DynamicContext;
    use crate::xdm::{ExpandedName, Item};
    use rstest::rstest;

    fn call(name: &str, args: Vec<Sequence>) -> Result<Sequence, Error> {
        let lib = default_function_library()?;
        let f = lib.get_function(&ExpandedName::ns(NS_METAPATH_FUNCTIONS, name), args.len()).ok_or_else(|| {
            Error::new(ErrorKind::NoFunctionMatch, name)
        })?;
        f.execute(&args, &DynamicContext::default(), None)
    }

    fn s(v: &str) -> Sequence {
        Sequence::singleton(AtomicItem::string(v))
    }

    fn n(v: &str) -> Sequence {
        Sequence::singleton(AtomicItem::Decimal(v.parse().unwrap()))
    }

    fn text(result: Sequence) -> String {
        result.first().and_then(Item::as_atomic).map(AtomicItem::as_string).unwrap()
    }

    #[rstest]
    #[case(vec![s("12345"), n("1.5"), n("2.6")], "234")]
    #[case(vec![s("12345"), n("0"), n("3")], "12")]
    #[case(vec![s("12345"), n("5"), n("-3")], "")]
    #[case(vec![s("12345"), n("-3"), n("5")], "1")]
    #[case(vec![s("motor car"), n("6")], " car")]
    #[case(vec![Sequence::empty(), n("1"), n("3")], "")]
    fn substring(#[case] args: Vec<Sequence>, #[case] expected: &str) {
        assert_eq!(text(call("substring", args).unwrap()), expected);
    }

    #[rstest]
    fn concat_accepts_any_number_of_arguments() {
        let out = call("concat", vec![s("a"), Sequence::empty(), AtomicItem::integer(1).into(), s("b")]).unwrap();
        assert_eq!(text(out), "a1b");
    }

    #[rstest]
    #[case("abracadabra", "bra", "", true)]
    #[case("abracadabra", "^a.*a$", "", true)]
    #[case("abracadabra", "^bra", "", false)]
    #[case("Mary", "mary", "i", true)]
    #[case("a.c", "a.c", "q", true)]
    #[case("abc", "a.c", "q", false)]
    #[case("line1\nline2", "^line2$", "m", true)]
    fn matches(#[case] input: &str, #[case] pattern: &str, #[case] flags: &str, #[case] expected: bool) {
        let out = call("matches", vec![s(input), s(pattern), s(flags)]).unwrap();
        assert_eq!(out, Sequence::singleton(AtomicItem::boolean(expected)));
    }

    #[rstest]
    fn invalid_patterns_and_flags_are_reported() {
        let err = call("matches", vec![s("a"), s("(")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::FORX0002);
        let err = call("matches", vec![s("a"), s("a"), s("z")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::FORX0001);
    }

    #[rstest]
    fn string_helpers() {
        assert_eq!(text(call("substring-before", vec![s("tattoo"), s("attoo")]).unwrap()), "t");
        assert_eq!(text(call("substring-after", vec![s("tattoo"), s("tat")]).unwrap()), "too");
        assert_eq!(text(call("normalize-space", vec![s("  a \t b  ")]).unwrap()), "a b");
        assert_eq!(text(call("string-join", vec![s("a"), s("-")]).unwrap()), "a");
        assert_eq!(text(call("compare", vec![s("abc"), s("abd")]).unwrap()), "-1");
        assert!(call("compare", vec![Sequence::empty(), s("abd")]).unwrap().is_empty());
        assert_eq!(text(call("upper-case", vec![s("abCd0")]).unwrap()), "ABCD0");
        assert_eq!(text(call("string-length", vec![s("Straße")]).unwrap()), "6");
    }

    #[rstest]
    fn zero_arity_forms_read_the_focus() {
        let lib = default_function_library().unwrap();
        let f = lib.get_function(&ExpandedName::ns(NS_METAPATH_FUNCTIONS, "string"), 0).unwrap();
        let focus = Item::Atomic(AtomicItem::integer(42));
        let out = f.execute(&[], &DynamicContext::default(), Some(&focus)).unwrap();
        assert_eq!(text(out), "42");
        let err = f.execute(&[], &DynamicContext::default(), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::XPDY0002);
    }
}
