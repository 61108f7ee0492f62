use super::CallContext;
use super::common::{opt_atomic, single, string_arg};
use crate::engine::runtime::{Error, ErrorCode, ErrorKind};
use crate::xdm::atomic::resolve_uri;
use crate::xdm::{AtomicItem, Sequence};
use url::Url;

/// `resolve-uri#1` resolves against the static base URI, `resolve-uri#2`
/// against its second argument.
pub(super) fn resolve_uri_fn(ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    if opt_atomic(&args[0]).is_none() {
        return Ok(Sequence::empty());
    }
    let relative = string_arg(&args[0]);
    let base = match args.get(1) {
        Some(base) => Url::parse(string_arg(base).trim())?,
        None => ctx.dynamic.static_context().base_uri.clone().ok_or_else(|| {
            Error::from_code(ErrorKind::InvalidUri, ErrorCode::FONS0005, "no base URI is defined in the static context")
        })?,
    };
    let resolved = resolve_uri(relative.trim(), &base)?;
    Ok(single(AtomicItem::AnyUri(resolved.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NS_METAPATH_FUNCTIONS;
    use crate::engine::functions::default_function_library;
    use crate::engine::runtime::{DynamicContext, StaticContext};
    use crate::xdm::{ExpandedName, Item};
    use rstest::rstest;

    fn call(args: &[Sequence], ctx: &DynamicContext) -> Result<Sequence, Error> {
        let lib = default_function_library()?;
        let f = lib.get_function(&ExpandedName::ns(NS_METAPATH_FUNCTIONS, "resolve-uri"), args.len()).unwrap();
        f.execute(args, ctx, None)
    }

    fn text(result: Sequence) -> String {
        result.first().and_then(Item::as_atomic).map(AtomicItem::as_string).unwrap_or_default()
    }

    #[rstest]
    #[case("b/c.xml", "http://example.com/a/doc.xml", "http://example.com/a/b/c.xml")]
    #[case("../x", "http://example.com/a/b/", "http://example.com/a/x")]
    #[case("urn:isbn:0451450523", "http://example.com/", "urn:isbn:0451450523")]
    fn resolves_against_explicit_base(#[case] relative: &str, #[case] base: &str, #[case] expected: &str) {
        let out = call(
            &[Sequence::singleton(AtomicItem::string(relative)), Sequence::singleton(AtomicItem::string(base))],
            &DynamicContext::default(),
        );
        assert_eq!(text(out.unwrap()), expected);
    }

    #[rstest]
    fn uses_static_base_uri() {
        let base = Url::parse("http://example.com/root/").unwrap();
        let ctx = DynamicContext::builder()
            .with_static_context(StaticContext::builder().with_base_uri(base).build())
            .build();
        let out = call(&[Sequence::singleton(AtomicItem::string("leaf"))], &ctx);
        assert_eq!(text(out.unwrap()), "http://example.com/root/leaf");
    }

    #[rstest]
    fn missing_base_uri_is_an_error() {
        let err = call(&[Sequence::singleton(AtomicItem::string("leaf"))], &DynamicContext::default()).unwrap_err();
        assert_eq!(err.code, ErrorCode::FONS0005);
    }

    #[rstest]
    fn empty_relative_yields_empty() {
        assert!(call(&[Sequence::empty()], &DynamicContext::default()).unwrap().is_empty());
    }
}
