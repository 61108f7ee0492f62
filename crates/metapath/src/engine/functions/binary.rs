use super::CallContext;
use super::common::{opt_atomic, single};
use crate::engine::runtime::{Error, ErrorKind};
use crate::xdm::{AtomicItem, Sequence};

pub(super) fn base64_encode_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    Ok(match opt_atomic(&args[0]) {
        Some(value) => single(AtomicItem::Base64Binary(value.as_string().into_bytes())),
        None => Sequence::empty(),
    })
}

/// Decoded bytes must form UTF-8 text.
pub(super) fn base64_decode_fn(_ctx: &CallContext<'_>, args: &[Sequence]) -> Result<Sequence, Error> {
    match opt_atomic(&args[0]) {
        Some(AtomicItem::Base64Binary(bytes)) => String::from_utf8(bytes.clone())
            .map(|s| single(AtomicItem::String(s)))
            .map_err(|e| Error::invalid_cast("decoded base64 content is not valid UTF-8").caused_by(e)),
        Some(other) => Err(Error::new(
            ErrorKind::InvalidArgumentType,
            format!("base64-decode requires a base64-binary value, found {}", other.atomic_type()),
        )),
        None => Ok(Sequence::empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NS_METAPATH_FUNCTIONS;
    use crate::engine::functions::default_function_library;
    use crate::engine::runtime::DynamicContext;
    use crate::xdm::{AtomicType, ExpandedName, Item};
    use rstest::rstest;

    fn call(name: &str, arg: AtomicItem) -> Result<Sequence, Error> {
        let lib = default_function_library()?;
        let f = lib.get_function(&ExpandedName::ns(NS_METAPATH_FUNCTIONS, name), 1).unwrap();
        f.execute(&[Sequence::singleton(arg)], &DynamicContext::default(), None)
    }

    fn text(result: Sequence) -> String {
        result.first().and_then(Item::as_atomic).map(AtomicItem::as_string).unwrap_or_default()
    }

    #[rstest]
    #[case("hello", "aGVsbG8=")]
    #[case("", "")]
    #[case("grüße", "Z3LDvMOfZQ==")]
    fn encodes_utf8_text(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(text(call("base64-encode", AtomicItem::string(input)).unwrap()), expected);
    }

    #[rstest]
    fn decodes_to_text() {
        let encoded = AtomicType::Base64Binary.value_of("aGVsbG8=").unwrap();
        assert_eq!(text(call("base64-decode", encoded).unwrap()), "hello");
    }

    #[rstest]
    fn rejects_non_utf8_content() {
        let err = call("base64-decode", AtomicItem::Base64Binary(vec![0xff, 0xfe])).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidCast);
    }
}
