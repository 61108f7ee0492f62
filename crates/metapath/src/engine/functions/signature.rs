use crate::engine::runtime::{DynamicContext, Error, ErrorCode, ErrorKind};
use crate::engine::types::{ItemType, Occurrence, SequenceType};
use crate::xdm::{AtomicItem, AtomicType, ExpandedName, Item, Sequence};
use bitflags::bitflags;
use core::fmt;
use std::sync::Arc;

bitflags! {
    /// Evaluation properties of a function.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FunctionProperties: u8 {
        /// Same arguments always give the same result.
        const DETERMINISTIC = 1;
        /// Reads the static or dynamic context (base URI, clock, implicit timezone).
        const CONTEXT_DEPENDENT = 1 << 1;
        /// Reads the focus (context item).
        const FOCUS_DEPENDENT = 1 << 2;
        /// The last declared argument repeats to absorb extra call arguments.
        const UNBOUNDED_ARITY = 1 << 3;
    }
}

/// A named, typed parameter of a function signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Argument {
    name: String,
    sequence_type: SequenceType,
}

impl Argument {
    pub fn new(name: impl Into<String>, sequence_type: SequenceType) -> Self {
        Self { name: name.into(), sequence_type }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sequence_type(&self) -> &SequenceType {
        &self.sequence_type
    }

    /// `$name as type`
    pub fn to_signature(&self) -> String {
        format!("${} as {}", self.name, self.sequence_type)
    }
}

/// Implementation of a function. Arguments arrive already converted to the
/// declared parameter types.
pub type FunctionHandler = Arc<dyn Fn(&CallContext<'_>, &[Sequence]) -> Result<Sequence, Error> + Send + Sync>;

/// State visible to a function while it runs.
pub struct CallContext<'a> {
    pub function: &'a FunctionSignature,
    pub dynamic: &'a DynamicContext,
    pub focus: Option<&'a Item>,
}

impl<'a> CallContext<'a> {
    /// The focus item, required by focus dependent functions.
    pub fn focus(&self) -> Result<&'a Item, Error> {
        self.focus.ok_or_else(|| {
            Error::new(
                ErrorKind::DynamicContextAbsent,
                format!("function '{}' requires a context item", self.function.name()),
            )
        })
    }
}

pub struct FunctionSignature {
    name: ExpandedName,
    properties: FunctionProperties,
    arguments: Vec<Argument>,
    result: SequenceType,
    handler: FunctionHandler,
}

impl fmt::Debug for FunctionSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSignature")
            .field("name", &self.name)
            .field("properties", &self.properties)
            .field("arguments", &self.arguments)
            .field("result", &self.result)
            .finish_non_exhaustive()
    }
}

impl FunctionSignature {
    pub fn builder() -> FunctionSignatureBuilder {
        FunctionSignatureBuilder::new()
    }

    pub fn name(&self) -> &ExpandedName {
        &self.name
    }

    pub fn properties(&self) -> FunctionProperties {
        self.properties
    }

    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    pub fn result_type(&self) -> &SequenceType {
        &self.result
    }

    /// Number of declared arguments.
    pub fn arity(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_arity_unbounded(&self) -> bool {
        self.properties.contains(FunctionProperties::UNBOUNDED_ARITY)
    }

    pub fn is_deterministic(&self) -> bool {
        self.properties.contains(FunctionProperties::DETERMINISTIC)
    }

    pub fn is_context_dependent(&self) -> bool {
        self.properties.contains(FunctionProperties::CONTEXT_DEPENDENT)
    }

    pub fn is_focus_dependent(&self) -> bool {
        self.properties.contains(FunctionProperties::FOCUS_DEPENDENT)
    }

    /// Results may be reused across calls with equal arguments.
    pub fn is_cacheable(&self) -> bool {
        self.is_deterministic() && !self.is_context_dependent() && !self.is_focus_dependent()
    }

    /// Whether a call with `arity` arguments can bind to this signature.
    pub fn accepts_arity(&self, arity: usize) -> bool {
        if self.is_arity_unbounded() { arity >= self.arity() } else { arity == self.arity() }
    }

    /// `Q{ns}name($a as t, ...) as result`
    pub fn to_signature(&self) -> String {
        let mut args = self.arguments.iter().map(Argument::to_signature).collect::<Vec<_>>();
        if self.is_arity_unbounded() {
            args.push("...".to_string());
        }
        format!("{}({}) as {}", self.name.to_eqname(), args.join(", "), self.result)
    }

    /// Call the function: convert the arguments to the declared types, run the
    /// handler and check the result against the declared result type.
    ///
    /// The focus falls back to the context item of `ctx`.
    pub fn execute(
        &self,
        arguments: &[Sequence],
        ctx: &DynamicContext,
        focus: Option<&Item>,
    ) -> Result<Sequence, Error> {
        let focus = focus.or_else(|| ctx.context_item());
        if self.is_focus_dependent() && focus.is_none() {
            return Err(Error::new(
                ErrorKind::DynamicContextAbsent,
                format!("function '{}' requires a context item", self.to_signature()),
            ));
        }
        let arguments = self.convert_arguments(arguments)?;

        let key = self.is_cacheable().then(|| CallKey::new(&self.name, &arguments));
        if let Some(key) = &key
            && let Some(hit) = ctx.cached_result(key)
        {
            return Ok(hit);
        }

        let call = CallContext { function: self, dynamic: ctx, focus };
        let result = self.check_result((self.handler)(&call, &arguments)?)?;
        if let Some(key) = key {
            ctx.cache_result(key, &result);
        }
        Ok(result)
    }

    fn convert_arguments(&self, arguments: &[Sequence]) -> Result<Vec<Sequence>, Error> {
        if !self.accepts_arity(arguments.len()) {
            return Err(Error::new(
                ErrorKind::NoFunctionMatch,
                format!("'{}' called with {} argument(s)", self.to_signature(), arguments.len()),
            ));
        }
        let last = self.arguments.len().saturating_sub(1);
        arguments
            .iter()
            .enumerate()
            .map(|(i, sequence)| self.convert_argument(&self.arguments[i.min(last)], sequence))
            .collect()
    }

    fn convert_argument(&self, parameter: &Argument, sequence: &Sequence) -> Result<Sequence, Error> {
        let declared = parameter.sequence_type();
        let sequence = declared.occurrence().validate(sequence.clone()).map_err(|e| {
            Error::from_code(
                e.kind,
                e.code,
                format!("argument '${}' of '{}': {}", parameter.name(), self.name, e.message),
            )
        })?;
        match declared.item_type() {
            Some(ItemType::Atomic(target)) => sequence
                .iter()
                .map(|item| coerce(item.atomize()?, target).map(Item::Atomic))
                .collect::<Result<Sequence, Error>>()
                .map_err(|e| {
                    Error::from_code(
                        e.kind,
                        e.code,
                        format!("argument '${}' of '{}': {}", parameter.name(), self.name, e.message),
                    )
                }),
            Some(ty) if !declared.matches_items(&sequence) => Err(Error::new(
                ErrorKind::InvalidArgumentType,
                format!("argument '${}' of '{}' expects {ty}", parameter.name(), self.name),
            )),
            _ => Ok(sequence),
        }
    }

    fn check_result(&self, result: Sequence) -> Result<Sequence, Error> {
        let result = self.result.occurrence().validate(result).map_err(|e| {
            Error::from_code(e.kind, e.code, format!("result of '{}': {}", self.name, e.message))
        })?;
        if !self.result.matches_items(&result) {
            return Err(Error::from_code(
                ErrorKind::InvalidType,
                ErrorCode::XPTY0004,
                format!("result of '{}' does not match {}", self.name, self.result),
            ));
        }
        Ok(result)
    }
}

/// Convert an atomized argument value to the parameter type: untyped values
/// are cast, URIs are promoted to strings.
fn coerce(value: AtomicItem, target: AtomicType) -> Result<AtomicItem, Error> {
    let value = match value {
        v if v.instance_of(target) => return Ok(v),
        v if v.is_untyped() => target.cast(&v)?,
        AtomicItem::AnyUri(s) | AtomicItem::UriReference(s) if AtomicType::String.is_subtype_of(target) => {
            AtomicItem::String(s)
        }
        v => v,
    };
    if value.instance_of(target) {
        Ok(value)
    } else {
        Err(Error::new(
            ErrorKind::InvalidArgumentType,
            format!("expected {target}, found {} '{value}'", value.atomic_type()),
        ))
    }
}

/// Identity of a call for the deterministic result cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct CallKey {
    pub(crate) name: ExpandedName,
    arguments: Vec<Vec<ArgumentKey>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ArgumentKey {
    // canonical lexical form keeps timezones and subtypes apart
    Atomic(AtomicType, String),
    Function(ExpandedName, usize),
}

impl CallKey {
    fn new(name: &ExpandedName, arguments: &[Sequence]) -> Self {
        let arguments = arguments
            .iter()
            .map(|sequence| {
                sequence
                    .iter()
                    .map(|item| match item {
                        Item::Atomic(a) => ArgumentKey::Atomic(a.atomic_type(), a.as_string()),
                        Item::Function(f) => ArgumentKey::Function(f.name().clone(), f.arity()),
                    })
                    .collect()
            })
            .collect();
        Self { name: name.clone(), arguments }
    }
}

/// Assembles a [`FunctionSignature`]; `build` rejects incomplete signatures.
pub struct FunctionSignatureBuilder {
    namespace: Option<String>,
    name: Option<String>,
    properties: FunctionProperties,
    arguments: Vec<Argument>,
    return_type: Option<ItemType>,
    return_occurrence: Occurrence,
    handler: Option<FunctionHandler>,
}

impl Default for FunctionSignatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionSignatureBuilder {
    /// A deterministic, context and focus independent function returning one
    /// item of any type.
    pub fn new() -> Self {
        Self {
            namespace: None,
            name: None,
            properties: FunctionProperties::DETERMINISTIC,
            arguments: Vec::new(),
            return_type: Some(ItemType::AnyItem),
            return_occurrence: Occurrence::One,
            handler: None,
        }
    }

    pub fn namespace(mut self, uri: impl Into<String>) -> Self {
        self.namespace = Some(uri.into());
        self
    }

    pub fn name(mut self, local: impl Into<String>) -> Self {
        self.name = Some(local.into());
        self
    }

    pub fn deterministic(mut self) -> Self {
        self.properties.insert(FunctionProperties::DETERMINISTIC);
        self
    }

    pub fn non_deterministic(mut self) -> Self {
        self.properties.remove(FunctionProperties::DETERMINISTIC);
        self
    }

    pub fn context_dependent(mut self) -> Self {
        self.properties.insert(FunctionProperties::CONTEXT_DEPENDENT);
        self
    }

    pub fn context_independent(mut self) -> Self {
        self.properties.remove(FunctionProperties::CONTEXT_DEPENDENT);
        self
    }

    pub fn focus_dependent(mut self) -> Self {
        self.properties.insert(FunctionProperties::FOCUS_DEPENDENT);
        self
    }

    pub fn focus_independent(mut self) -> Self {
        self.properties.remove(FunctionProperties::FOCUS_DEPENDENT);
        self
    }

    pub fn allow_unbounded_arity(mut self, allow: bool) -> Self {
        self.properties.set(FunctionProperties::UNBOUNDED_ARITY, allow);
        self
    }

    pub fn argument(mut self, argument: Argument) -> Self {
        self.arguments.push(argument);
        self
    }

    pub fn arguments(mut self, arguments: impl IntoIterator<Item = Argument>) -> Self {
        self.arguments.extend(arguments);
        self
    }

    pub fn return_type(mut self, item_type: ItemType) -> Self {
        self.return_type = Some(item_type);
        self
    }

    pub fn return_occurrence(mut self, occurrence: Occurrence) -> Self {
        self.return_occurrence = occurrence;
        self
    }

    /// Set item type and occurrence of the result at once.
    pub fn returns(mut self, result: SequenceType) -> Self {
        self.return_type = result.item_type();
        self.return_occurrence = result.occurrence();
        self
    }

    pub fn handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CallContext<'_>, &[Sequence]) -> Result<Sequence, Error> + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    pub fn build(self) -> Result<FunctionSignature, Error> {
        fn missing(what: &str) -> Error {
            Error::new(ErrorKind::MissingRequiredBuilderField, format!("the function {what} must be provided"))
        }
        let name = self.name.filter(|n| !n.trim().is_empty()).ok_or_else(|| missing("name"))?;
        let namespace = self.namespace.filter(|n| !n.trim().is_empty()).ok_or_else(|| missing("namespace"))?;
        let handler = self.handler.ok_or_else(|| missing("handler"))?;
        if self.properties.contains(FunctionProperties::UNBOUNDED_ARITY) && self.arguments.is_empty() {
            return Err(Error::new(
                ErrorKind::MissingRequiredBuilderField,
                format!("function '{name}' allows unbounded arity but declares no arguments"),
            ));
        }
        Ok(FunctionSignature {
            name: ExpandedName::ns(namespace, name),
            properties: self.properties,
            arguments: self.arguments,
            result: SequenceType::new(self.return_type, self.return_occurrence),
            handler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::NS_METAPATH_FUNCTIONS;
    use rstest::rstest;

    fn atomic(ty: AtomicType) -> ItemType {
        ItemType::Atomic(ty)
    }

    fn echo() -> FunctionSignatureBuilder {
        FunctionSignature::builder()
            .namespace(NS_METAPATH_FUNCTIONS)
            .name("echo")
            .argument(Argument::new("arg", SequenceType::zero_or_one(atomic(AtomicType::String))))
            .returns(SequenceType::zero_or_one(atomic(AtomicType::String)))
            .handler(|_ctx, args| Ok(args[0].clone()))
    }

    #[rstest]
    fn renders_signature() {
        let f = echo().build().unwrap();
        assert_eq!(
            f.to_signature(),
            format!("Q{{{NS_METAPATH_FUNCTIONS}}}echo($arg as meta:string?) as meta:string?")
        );
        assert!(f.is_deterministic());
        assert!(f.is_cacheable());
    }

    #[rstest]
    #[case(FunctionSignatureBuilder::new().name("f").handler(|_, _| Ok(Sequence::empty())), "namespace")]
    #[case(FunctionSignatureBuilder::new().namespace("urn:x").handler(|_, _| Ok(Sequence::empty())), "name")]
    #[case(FunctionSignatureBuilder::new().namespace("urn:x").name("  "), "name")]
    #[case(FunctionSignatureBuilder::new().namespace("urn:x").name("f"), "handler")]
    fn incomplete_builders_fail(#[case] builder: FunctionSignatureBuilder, #[case] field: &str) {
        let err = builder.build().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRequiredBuilderField);
        assert!(err.message.contains(field), "{}", err.message);
    }

    #[rstest]
    fn unbounded_arity_needs_an_argument() {
        let err = FunctionSignatureBuilder::new()
            .namespace("urn:x")
            .name("f")
            .allow_unbounded_arity(true)
            .handler(|_, _| Ok(Sequence::empty()))
            .build()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MissingRequiredBuilderField);
    }

    #[rstest]
    fn untyped_and_uri_arguments_are_converted() {
        let f = echo().build().unwrap();
        let ctx = DynamicContext::default();
        let out = f.execute(&[Sequence::singleton(AtomicItem::untyped("a"))], &ctx, None).unwrap();
        assert_eq!(out, Sequence::singleton(AtomicItem::string("a")));
        let out = f.execute(&[Sequence::singleton(AtomicItem::AnyUri("urn:a".into()))], &ctx, None).unwrap();
        assert_eq!(out, Sequence::singleton(AtomicItem::string("urn:a")));
    }

    #[rstest]
    fn mismatched_arguments_are_rejected() {
        let f = echo().build().unwrap();
        let ctx = DynamicContext::default();
        let err = f.execute(&[Sequence::singleton(AtomicItem::integer(1))], &ctx, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArgumentType);
        let two: Sequence = vec![AtomicItem::string("a"), AtomicItem::string("b")].into_iter().collect();
        let err = f.execute(&[two], &ctx, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::FORG0003);
        let err = f.execute(&[], &ctx, None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoFunctionMatch);
    }

    #[rstest]
    fn integers_satisfy_decimal_parameters() {
        let f = FunctionSignature::builder()
            .namespace("urn:x")
            .name("id")
            .argument(Argument::new("n", SequenceType::one(atomic(AtomicType::Decimal))))
            .returns(SequenceType::one(atomic(AtomicType::Decimal)))
            .handler(|_, args| Ok(args[0].clone()))
            .build()
            .unwrap();
        let out = f.execute(&[Sequence::singleton(AtomicItem::integer(3))], &DynamicContext::default(), None);
        assert_eq!(out.unwrap(), Sequence::singleton(AtomicItem::integer(3)));
    }

    #[rstest]
    fn focus_dependent_functions_need_a_focus() {
        let f = FunctionSignature::builder()
            .namespace("urn:x")
            .name("dot")
            .focus_dependent()
            .handler(|call, _| Ok(Sequence::singleton(call.focus()?.clone())))
            .build()
            .unwrap();
        let err = f.execute(&[], &DynamicContext::default(), None).unwrap_err();
        assert_eq!(err.code, ErrorCode::XPDY0002);
        let item = Item::Atomic(AtomicItem::integer(7));
        assert_eq!(f.execute(&[], &DynamicContext::default(), Some(&item)).unwrap(), Sequence::singleton(item));
    }

    #[rstest]
    fn results_are_checked() {
        let f = FunctionSignature::builder()
            .namespace("urn:x")
            .name("lies")
            .returns(SequenceType::one(atomic(AtomicType::Integer)))
            .handler(|_, _| Ok(Sequence::singleton(AtomicItem::string("no"))))
            .build()
            .unwrap();
        let err = f.execute(&[], &DynamicContext::default(), None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidType);
    }

    #[rstest]
    fn deterministic_results_are_cached() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let f = FunctionSignature::builder()
            .namespace("urn:x")
            .name("count-calls")
            .argument(Argument::new("n", SequenceType::one(atomic(AtomicType::Integer))))
            .handler(move |_, args| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(args[0].clone())
            })
            .build()
            .unwrap();
        let ctx = DynamicContext::default();
        let arg = [Sequence::singleton(AtomicItem::integer(1))];
        f.execute(&arg, &ctx, None).unwrap();
        f.execute(&arg, &ctx, None).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        f.execute(&[Sequence::singleton(AtomicItem::integer(2))], &ctx, None).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let uncached = DynamicContext::builder().with_function_cache_capacity(0).build();
        f.execute(&arg, &uncached, None).unwrap();
        f.execute(&arg, &uncached, None).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
