use crate::consts::{DEFAULT_NAMESPACE_BINDINGS, ERR_NS, NS_METAPATH, NS_METAPATH_FUNCTIONS};
use crate::engine::functions::CallKey;
use crate::xdm::{ExpandedName, Item, Sequence};
use chrono::{DateTime, FixedOffset, Utc};
use core::fmt;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};
use url::Url;

/// Error families used in Metapath error codes.
///
/// The `FO*` families follow the XPath Functions error catalogue, `XP*`/`XQ*`
/// are static/dynamic/type errors of the expression language, and `MPST`
/// covers Metapath specific static errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorFamily {
    /// Arithmetic.
    FOAR,
    /// Casting.
    FOCA,
    /// Date/time.
    FODT,
    /// General function arguments.
    FORG,
    /// Regular expressions.
    FORX,
    /// Types.
    FOTY,
    /// Namespaces and URIs.
    FONS,
    /// JSON.
    FOJS,
    XPTY,
    XPST,
    XPDY,
    XQST,
    MPST,
}

impl ErrorFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FOAR => "FOAR",
            Self::FOCA => "FOCA",
            Self::FODT => "FODT",
            Self::FORG => "FORG",
            Self::FORX => "FORX",
            Self::FOTY => "FOTY",
            Self::FONS => "FONS",
            Self::FOJS => "FOJS",
            Self::XPTY => "XPTY",
            Self::XPST => "XPST",
            Self::XPDY => "XPDY",
            Self::XQST => "XQST",
            Self::MPST => "MPST",
        }
    }

    fn from_prefix(s: &str) -> Option<Self> {
        Some(match s {
            "FOAR" => Self::FOAR,
            "FOCA" => Self::FOCA,
            "FODT" => Self::FODT,
            "FORG" => Self::FORG,
            "FORX" => Self::FORX,
            "FOTY" => Self::FOTY,
            "FONS" => Self::FONS,
            "FOJS" => Self::FOJS,
            "XPTY" => Self::XPTY,
            "XPST" => Self::XPST,
            "XPDY" => Self::XPDY,
            "XQST" => Self::XQST,
            "MPST" => Self::MPST,
            _ => return None,
        })
    }
}

/// A coded error identifier such as `FOAR0001`: a family prefix plus a number
/// within that family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorCode {
    pub family: ErrorFamily,
    pub number: u16,
}

impl ErrorCode {
    pub const fn new(family: ErrorFamily, number: u16) -> Self {
        Self { family, number }
    }

    // Arithmetic
    pub const FOAR0001: Self = Self::new(ErrorFamily::FOAR, 1); // division by zero
    pub const FOAR0002: Self = Self::new(ErrorFamily::FOAR, 2); // numeric overflow/underflow
    // Casting
    pub const FOCA0001: Self = Self::new(ErrorFamily::FOCA, 1); // input too large for decimal
    pub const FOCA0002: Self = Self::new(ErrorFamily::FOCA, 2); // invalid lexical value
    pub const FOCA0003: Self = Self::new(ErrorFamily::FOCA, 3); // input too large for integer
    // Date/time
    pub const FODT0001: Self = Self::new(ErrorFamily::FODT, 1); // date/time arithmetic overflow
    pub const FODT0002: Self = Self::new(ErrorFamily::FODT, 2); // duration arithmetic overflow
    pub const FODT0003: Self = Self::new(ErrorFamily::FODT, 3); // invalid timezone value
    // Arguments
    pub const FORG0001: Self = Self::new(ErrorFamily::FORG, 1); // invalid value for cast
    pub const FORG0002: Self = Self::new(ErrorFamily::FORG, 2); // invalid argument to resolve-uri
    pub const FORG0003: Self = Self::new(ErrorFamily::FORG, 3); // zero-or-one called with more than one item
    pub const FORG0004: Self = Self::new(ErrorFamily::FORG, 4); // one-or-more called with an empty sequence
    pub const FORG0005: Self = Self::new(ErrorFamily::FORG, 5); // exactly-one called with a wrong count
    pub const FORG0006: Self = Self::new(ErrorFamily::FORG, 6); // invalid argument type
    pub const FORG0008: Self = Self::new(ErrorFamily::FORG, 8); // inconsistent timezones
    pub const FORX0001: Self = Self::new(ErrorFamily::FORX, 1); // invalid regular expression flags
    pub const FORX0002: Self = Self::new(ErrorFamily::FORX, 2); // invalid regular expression
    pub const FOTY0013: Self = Self::new(ErrorFamily::FOTY, 13); // atomization of a function item
    pub const FONS0004: Self = Self::new(ErrorFamily::FONS, 4); // no namespace found for prefix
    pub const FONS0005: Self = Self::new(ErrorFamily::FONS, 5); // base URI not defined in the static context
    pub const XPTY0004: Self = Self::new(ErrorFamily::XPTY, 4); // type error
    pub const XPDY0002: Self = Self::new(ErrorFamily::XPDY, 2); // context item absent
    pub const XQST0034: Self = Self::new(ErrorFamily::XQST, 34); // duplicate function declaration
    pub const MPST0001: Self = Self::new(ErrorFamily::MPST, 1); // incomplete function signature
    pub const MPST0017: Self = Self::new(ErrorFamily::MPST, 17); // no function match
    pub const MPST0051: Self = Self::new(ErrorFamily::MPST, 51); // unknown type
    pub const MPST0081: Self = Self::new(ErrorFamily::MPST, 81); // prefix not expandable

    /// Parse the textual form (`FOAR0001`, optionally prefixed with `err:`).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.strip_prefix("err:").unwrap_or(s);
        if s.len() != 8 || !s.is_ascii() {
            return None;
        }
        let (prefix, digits) = s.split_at(4);
        let family = ErrorFamily::from_prefix(prefix)?;
        let number = digits.parse().ok()?;
        Some(Self::new(family, number))
    }

    /// The code as an expanded QName; W3C codes live in the xqt-errors
    /// namespace, Metapath specific ones in the Metapath namespace.
    pub fn qname(&self) -> ExpandedName {
        let ns = match self.family {
            ErrorFamily::MPST => NS_METAPATH,
            _ => ERR_NS,
        };
        ExpandedName::ns(ns, self.to_string())
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", self.family.as_str(), self.number)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed literal for the target type.
    InvalidLexicalValue,
    /// Well-formed value that cannot be represented in the target type.
    InvalidCast,
    /// Value outside the domain of a refined type.
    InvalidType,
    InvalidComparisonType,
    InvalidArgumentType,
    ArithmeticOverflowOrUnderflow,
    DivisionByZero,
    InvalidCardinality,
    DuplicateFunctionRegistration,
    NoFunctionMatch,
    MissingRequiredBuilderField,
    DynamicContextAbsent,
    InconsistentTimezone,
    UnknownNamespacePrefix,
    UnknownType,
    InvalidRegex,
    InvalidUri,
}

impl ErrorKind {
    pub fn default_code(self) -> ErrorCode {
        match self {
            Self::InvalidLexicalValue => ErrorCode::FOCA0002,
            Self::InvalidCast => ErrorCode::FORG0001,
            Self::InvalidType | Self::InvalidComparisonType | Self::InvalidArgumentType => ErrorCode::XPTY0004,
            Self::ArithmeticOverflowOrUnderflow => ErrorCode::FOAR0002,
            Self::DivisionByZero => ErrorCode::FOAR0001,
            Self::InvalidCardinality => ErrorCode::FORG0005,
            Self::DuplicateFunctionRegistration => ErrorCode::XQST0034,
            Self::NoFunctionMatch => ErrorCode::MPST0017,
            Self::MissingRequiredBuilderField => ErrorCode::MPST0001,
            Self::DynamicContextAbsent => ErrorCode::XPDY0002,
            Self::InconsistentTimezone => ErrorCode::FORG0008,
            Self::UnknownNamespacePrefix => ErrorCode::MPST0081,
            Self::UnknownType => ErrorCode::MPST0051,
            Self::InvalidRegex => ErrorCode::FORX0002,
            Self::InvalidUri => ErrorCode::FORG0002,
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub message: String,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>, // optional chained cause
    /// Failures of every alternative tried by a multi-attempt operation.
    pub causes: Vec<Error>,
}

impl Error {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self { kind, code: kind.default_code(), message: msg.into(), source: None, causes: Vec::new() }
    }

    /// Build an error with an explicit code that differs from the kind's default.
    pub fn from_code(kind: ErrorKind, code: ErrorCode, msg: impl Into<String>) -> Self {
        Self::new(kind, msg).with_code(code)
    }

    /// An error reporting that every alternative failed, retaining each failure.
    pub fn combined(kind: ErrorKind, msg: impl Into<String>, causes: impl IntoIterator<Item = Error>) -> Self {
        Self { causes: causes.into_iter().collect(), ..Self::new(kind, msg) }
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    /// Compose an error with a source cause.
    pub fn with_source(mut self, source: impl Into<Option<Arc<dyn std::error::Error + Send + Sync>>>) -> Self {
        self.source = source.into();
        self
    }

    /// Attach an underlying error as the source.
    pub fn caused_by(self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.with_source(Some(Arc::new(source) as Arc<dyn std::error::Error + Send + Sync>))
    }

    pub fn invalid_lexical(type_name: &str, value: &str) -> Self {
        Self::new(ErrorKind::InvalidLexicalValue, format!("invalid {type_name} value '{value}'"))
    }

    pub fn invalid_cast(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCast, msg)
    }

    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::ArithmeticOverflowOrUnderflow, msg)
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero")
    }

    pub fn format_code(&self) -> String {
        self.code.to_string()
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.code == other.code && self.message == other.message
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} ({})", self.message, self.code)?;
        if !self.causes.is_empty() {
            f.write_str(" [")?;
            for (i, cause) in self.causes.iter().enumerate() {
                if i > 0 {
                    f.write_str("; ")?;
                }
                write!(f, "{}: {}", cause.code, cause.message)?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

impl From<fancy_regex::Error> for Error {
    fn from(e: fancy_regex::Error) -> Self {
        Error::new(ErrorKind::InvalidRegex, format!("invalid regular expression: {e}"))
            .caused_by(e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::new(ErrorKind::InvalidUri, format!("invalid URI: {e}"))
            .caused_by(e)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NamespaceBindings {
    pub by_prefix: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct StaticContext {
    pub base_uri: Option<Url>,
    pub default_function_namespace: Option<String>,
    pub namespaces: NamespaceBindings,
}

impl Default for StaticContext {
    fn default() -> Self {
        let mut ns = NamespaceBindings::default();
        for (prefix, uri) in DEFAULT_NAMESPACE_BINDINGS {
            ns.by_prefix.insert((*prefix).to_string(), (*uri).to_string());
        }
        Self { base_uri: None, default_function_namespace: Some(NS_METAPATH_FUNCTIONS.to_string()), namespaces: ns }
    }
}

impl StaticContext {
    pub fn builder() -> StaticContextBuilder {
        StaticContextBuilder::default()
    }

    pub fn namespace_for_prefix(&self, prefix: &str) -> Option<&str> {
        self.namespaces.by_prefix.get(prefix).map(String::as_str)
    }

    /// Resolve a lexical function name (`prefix:local`, `Q{ns}local`, or a bare
    /// local name in the default function namespace).
    pub fn resolve_function_name(&self, lexical: &str) -> Result<ExpandedName, Error> {
        let lexical = lexical.trim();
        if let Some(body) = lexical.strip_prefix("Q{") {
            let (ns, local) = body
                .split_once('}')
                .ok_or_else(|| Error::invalid_lexical("EQName", lexical))?;
            let ns = (!ns.is_empty()).then_some(ns);
            return Ok(ExpandedName::new(ns.map(str::to_string), local));
        }
        match lexical.split_once(':') {
            Some((prefix, local)) => {
                let ns = self.namespace_for_prefix(prefix).ok_or_else(|| {
                    Error::new(
                        ErrorKind::UnknownNamespacePrefix,
                        format!("the namespace prefix '{prefix}' is not bound in the static context"),
                    )
                })?;
                Ok(ExpandedName::ns(ns, local))
            }
            None => Ok(ExpandedName::new(self.default_function_namespace.clone(), lexical)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaticContextBuilder {
    ctx: StaticContext,
}

impl StaticContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_uri(mut self, uri: Url) -> Self {
        self.ctx.base_uri = Some(uri);
        self
    }

    pub fn with_default_function_namespace(mut self, uri: impl Into<String>) -> Self {
        self.ctx.default_function_namespace = Some(uri.into());
        self
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.ctx.namespaces.by_prefix.insert(prefix.into(), uri.into());
        self
    }

    pub fn build(self) -> StaticContext {
        self.ctx
    }
}

pub const DEFAULT_FUNCTION_CACHE_CAPACITY: usize = 256;

/// Evaluation-time state handed to function calls and temporal operations.
///
/// The current date-time is fixed when the context is built so repeated calls
/// within one evaluation observe the same instant.
pub struct DynamicContext {
    static_context: Arc<StaticContext>,
    implicit_timezone: Option<FixedOffset>,
    current_date_time: DateTime<FixedOffset>,
    context_item: Option<Item>,
    function_cache: Option<Mutex<LruCache<CallKey, Sequence>>>,
}

impl Default for DynamicContext {
    fn default() -> Self {
        DynamicContextBuilder::new().build()
    }
}

impl fmt::Debug for DynamicContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicContext")
            .field("implicit_timezone", &self.implicit_timezone)
            .field("current_date_time", &self.current_date_time)
            .field("context_item", &self.context_item)
            .field("caching", &self.function_cache.is_some())
            .finish_non_exhaustive()
    }
}

impl DynamicContext {
    pub fn builder() -> DynamicContextBuilder {
        DynamicContextBuilder::new()
    }

    pub fn static_context(&self) -> &StaticContext {
        &self.static_context
    }

    pub fn implicit_timezone(&self) -> Option<FixedOffset> {
        self.implicit_timezone
    }

    pub fn current_date_time(&self) -> DateTime<FixedOffset> {
        self.current_date_time
    }

    pub fn context_item(&self) -> Option<&Item> {
        self.context_item.as_ref()
    }

    pub(crate) fn cached_result(&self, key: &CallKey) -> Option<Sequence> {
        let cache = self.function_cache.as_ref()?;
        let mut cache = cache.lock().ok()?;
        let hit = cache.get(key).cloned();
        if hit.is_some() {
            tracing::trace!(function = %key.name, "function result cache hit");
        }
        hit
    }

    pub(crate) fn cache_result(&self, key: CallKey, result: &Sequence) {
        if let Some(cache) = &self.function_cache
            && let Ok(mut cache) = cache.lock()
        {
            cache.put(key, result.clone());
        }
    }
}

pub struct DynamicContextBuilder {
    static_context: Arc<StaticContext>,
    implicit_timezone: Option<FixedOffset>,
    current_date_time: Option<DateTime<FixedOffset>>,
    context_item: Option<Item>,
    cache_capacity: usize,
}

impl Default for DynamicContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicContextBuilder {
    pub fn new() -> Self {
        Self {
            static_context: Arc::new(StaticContext::default()),
            implicit_timezone: None,
            current_date_time: None,
            context_item: None,
            cache_capacity: DEFAULT_FUNCTION_CACHE_CAPACITY,
        }
    }

    pub fn with_static_context(mut self, ctx: impl Into<Arc<StaticContext>>) -> Self {
        self.static_context = ctx.into();
        self
    }

    /// Timezone assumed for date/time values that carry none.
    pub fn with_implicit_timezone(mut self, tz: FixedOffset) -> Self {
        self.implicit_timezone = Some(tz);
        self
    }

    pub fn with_current_date_time(mut self, now: DateTime<FixedOffset>) -> Self {
        self.current_date_time = Some(now);
        self
    }

    pub fn with_context_item(mut self, item: impl Into<Item>) -> Self {
        self.context_item = Some(item.into());
        self
    }

    /// Capacity of the deterministic function result cache; zero disables caching.
    pub fn with_function_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn build(self) -> DynamicContext {
        DynamicContext {
            static_context: self.static_context,
            implicit_timezone: self.implicit_timezone,
            current_date_time: self.current_date_time.unwrap_or_else(|| Utc::now().fixed_offset()),
            context_item: self.context_item,
            function_cache: NonZeroUsize::new(self.cache_capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorCode::FOAR0001, "FOAR0001")]
    #[case(ErrorCode::FORG0005, "FORG0005")]
    #[case(ErrorCode::FOTY0013, "FOTY0013")]
    #[case(ErrorCode::MPST0017, "MPST0017")]
    fn codes_render_family_and_number(#[case] code: ErrorCode, #[case] expected: &str) {
        assert_eq!(code.to_string(), expected);
        assert_eq!(ErrorCode::parse(expected), Some(code));
    }

    #[rstest]
    fn error_codes_use_the_error_namespace() {
        assert_eq!(ErrorCode::FOCA0002.qname().ns_uri.as_deref(), Some(ERR_NS));
        assert_eq!(ErrorCode::MPST0017.qname().ns_uri.as_deref(), Some(NS_METAPATH));
        assert_eq!(ErrorCode::parse("err:XPTY0004"), Some(ErrorCode::XPTY0004));
        assert_eq!(ErrorCode::parse("ABCD0001"), None);
    }

    #[rstest]
    fn combined_error_lists_every_cause() {
        let err = Error::combined(
            ErrorKind::InvalidCast,
            "no alternative matched",
            [Error::invalid_lexical("a", "x"), Error::invalid_lexical("b", "x")],
        );
        assert_eq!(err.causes.len(), 2);
        let text = err.to_string();
        assert!(text.starts_with("error: no alternative matched (FORG0001)"));
        assert!(text.contains("invalid a value 'x'"));
        assert!(text.contains("invalid b value 'x'"));
    }

    #[rstest]
    #[case("mp:count", Some(NS_METAPATH_FUNCTIONS), "count")]
    #[case("count", Some(NS_METAPATH_FUNCTIONS), "count")]
    #[case("meta:integer", Some(NS_METAPATH), "integer")]
    #[case("Q{urn:x}f", Some("urn:x"), "f")]
    #[case("Q{}f", None, "f")]
    fn resolves_function_names(#[case] lexical: &str, #[case] ns: Option<&str>, #[case] local: &str) {
        let ctx = StaticContext::default();
        let name = ctx.resolve_function_name(lexical).unwrap();
        assert_eq!(name.ns_uri.as_deref(), ns);
        assert_eq!(name.local, local);
    }

    #[rstest]
    fn unbound_prefix_is_reported() {
        let err = StaticContext::default().resolve_function_name("nope:f").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownNamespacePrefix);
        assert_eq!(err.code, ErrorCode::MPST0081);
    }

    #[rstest]
    fn builder_fixes_the_clock_and_timezone() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let now = DateTime::parse_from_rfc3339("2024-02-29T12:00:00+01:00").unwrap();
        let ctx = DynamicContextBuilder::new().with_implicit_timezone(tz).with_current_date_time(now).build();
        assert_eq!(ctx.implicit_timezone(), Some(tz));
        assert_eq!(ctx.current_date_time(), now);
        assert!(ctx.context_item().is_none());
    }
}
