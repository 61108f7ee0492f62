//! Function signatures, the function library and the process-wide function
//! service, together with the core library of built-in functions.

use crate::consts::{NS_METAPATH, NS_METAPATH_FUNCTIONS};
use crate::engine::runtime::Error;
use crate::xdm::AtomicType;

mod binary;
mod boolean;
mod common;
mod constructors;
mod datetime;
mod durations;
mod library;
mod lookup;
mod numeric;
mod sequences;
mod service;
mod signature;
mod strings;
mod uris;

pub use library::FunctionLibrary;
pub use service::{FunctionLibraryRegistration, FunctionService};
pub(crate) use signature::CallKey;
pub use signature::{
    Argument, CallContext, FunctionHandler, FunctionProperties, FunctionSignature, FunctionSignatureBuilder,
};

use common::{arg, items, many, one, opt, opt_item};

crate::register_function_library!("metapath-core", default_function_library);

/// Build the core library: the `meta` type constructors followed by the `mp`
/// functions, so bare local names such as `string` resolve to the latter.
pub fn default_function_library() -> Result<FunctionLibrary, Error> {
    let mut lib = FunctionLibrary::new();
    constructors::register(&mut lib, NS_METAPATH)?;
    register_default_functions(&mut lib)?;
    Ok(lib)
}

fn register_default_functions(lib: &mut FunctionLibrary) -> Result<(), Error> {
    use AtomicType::*;

    macro_rules! reg {
        ($local:expr, [$($arg:expr),* $(,)?] -> $ret:expr, $func:expr $(; $($prop:ident($($p:expr),*)),+)? $(,)?) => {{
            let builder = FunctionSignature::builder()
                .namespace(NS_METAPATH_FUNCTIONS)
                .name($local)
                $(.argument($arg))*
                .returns($ret)
                $($(.$prop($($p),*))+)?
                .handler($func);
            lib.register(builder.build()?)?;
        }};
    }

    // ===== Numeric =====
    reg!("abs", [arg("arg", opt(Numeric))] -> opt(Numeric), numeric::abs_fn);
    reg!("ceiling", [arg("arg", opt(Numeric))] -> opt(Numeric), numeric::ceiling_fn);
    reg!("floor", [arg("arg", opt(Numeric))] -> opt(Numeric), numeric::floor_fn);
    reg!("round", [arg("arg", opt(Numeric))] -> opt(Numeric), numeric::round_fn);
    reg!(
        "round",
        [arg("arg", opt(Numeric)), arg("precision", one(Integer))] -> opt(Numeric),
        numeric::round_fn
    );
    reg!("sum", [arg("arg", many(AnyAtomic))] -> one(AnyAtomic), numeric::sum_fn);
    reg!(
        "sum",
        [arg("arg", many(AnyAtomic)), arg("zero", opt(AnyAtomic))] -> opt(AnyAtomic),
        numeric::sum_fn
    );
    reg!("avg", [arg("arg", many(AnyAtomic))] -> opt(AnyAtomic), numeric::avg_fn);
    reg!("min", [arg("arg", many(AnyAtomic))] -> opt(AnyAtomic), numeric::min_fn; context_dependent());
    reg!("max", [arg("arg", many(AnyAtomic))] -> opt(AnyAtomic), numeric::max_fn; context_dependent());

    // ===== Boolean =====
    reg!("boolean", [arg("arg", items())] -> one(Boolean), boolean::boolean_fn);
    reg!("not", [arg("arg", items())] -> one(Boolean), boolean::not_fn);
    reg!("true", [] -> one(Boolean), boolean::true_fn);
    reg!("false", [] -> one(Boolean), boolean::false_fn);

    // ===== Sequences =====
    reg!("count", [arg("arg", items())] -> one(Integer), sequences::count_fn);
    reg!("empty", [arg("arg", items())] -> one(Boolean), sequences::empty_fn);
    reg!("exists", [arg("arg", items())] -> one(Boolean), sequences::exists_fn);
    reg!("exactly-one", [arg("arg", items())] -> items(), sequences::exactly_one_fn);
    reg!("zero-or-one", [arg("arg", items())] -> items(), sequences::zero_or_one_fn);
    reg!("one-or-more", [arg("arg", items())] -> items(), sequences::one_or_more_fn);
    reg!("head", [arg("arg", items())] -> opt_item(), sequences::head_fn);
    reg!("tail", [arg("arg", items())] -> items(), sequences::tail_fn);
    reg!("reverse", [arg("arg", items())] -> items(), sequences::reverse_fn);
    reg!("distinct-values", [arg("arg", many(AnyAtomic))] -> many(AnyAtomic), sequences::distinct_values_fn);
    reg!(
        "index-of",
        [arg("seq", many(AnyAtomic)), arg("search", one(AnyAtomic))] -> many(Integer),
        sequences::index_of_fn;
        context_dependent()
    );
    reg!(
        "insert-before",
        [arg("target", items()), arg("position", one(Integer)), arg("inserts", items())] -> items(),
        sequences::insert_before_fn
    );
    reg!(
        "remove",
        [arg("target", items()), arg("position", one(Integer))] -> items(),
        sequences::remove_fn
    );

    // ===== Strings =====
    reg!(
        "concat",
        [arg("arg1", opt(AnyAtomic)), arg("arg2", opt(AnyAtomic))] -> one(String),
        strings::concat_fn;
        allow_unbounded_arity(true)
    );
    reg!("string", [] -> one(String), strings::string_fn; focus_dependent());
    reg!("string", [arg("arg", opt_item())] -> one(String), strings::string_fn);
    reg!("string-length", [] -> one(Integer), strings::string_length_fn; focus_dependent());
    reg!("string-length", [arg("arg", opt(String))] -> one(Integer), strings::string_length_fn);
    reg!("string-join", [arg("arg", many(AnyAtomic))] -> one(String), strings::string_join_fn);
    reg!(
        "string-join",
        [arg("arg", many(AnyAtomic)), arg("separator", one(String))] -> one(String),
        strings::string_join_fn
    );
    reg!("upper-case", [arg("arg", opt(String))] -> one(String), strings::upper_case_fn);
    reg!("lower-case", [arg("arg", opt(String))] -> one(String), strings::lower_case_fn);
    reg!(
        "contains",
        [arg("arg1", opt(String)), arg("arg2", opt(String))] -> one(Boolean),
        strings::contains_fn
    );
    reg!(
        "starts-with",
        [arg("arg1", opt(String)), arg("arg2", opt(String))] -> one(Boolean),
        strings::starts_with_fn
    );
    reg!(
        "ends-with",
        [arg("arg1", opt(String)), arg("arg2", opt(String))] -> one(Boolean),
        strings::ends_with_fn
    );
    reg!(
        "substring",
        [arg("source", opt(String)), arg("start", one(Decimal))] -> one(String),
        strings::substring_fn
    );
    reg!(
        "substring",
        [arg("source", opt(String)), arg("start", one(Decimal)), arg("length", one(Decimal))] -> one(String),
        strings::substring_fn
    );
    reg!(
        "substring-before",
        [arg("arg1", opt(String)), arg("arg2", opt(String))] -> one(String),
        strings::substring_before_fn
    );
    reg!(
        "substring-after",
        [arg("arg1", opt(String)), arg("arg2", opt(String))] -> one(String),
        strings::substring_after_fn
    );
    reg!("normalize-space", [] -> one(String), strings::normalize_space_fn; focus_dependent());
    reg!("normalize-space", [arg("arg", opt(String))] -> one(String), strings::normalize_space_fn);
    reg!(
        "compare",
        [arg("comparand1", opt(String)), arg("comparand2", opt(String))] -> opt(Integer),
        strings::compare_fn
    );
    reg!(
        "matches",
        [arg("input", opt(String)), arg("pattern", one(String))] -> one(Boolean),
        strings::matches_fn
    );
    reg!(
        "matches",
        [arg("input", opt(String)), arg("pattern", one(String)), arg("flags", one(String))] -> one(Boolean),
        strings::matches_fn
    );

    // ===== Date/time =====
    reg!("current-date", [] -> one(DateWithTimezone), datetime::current_date_fn; context_dependent());
    reg!(
        "current-dateTime",
        [] -> one(DateTimeWithTimezone),
        datetime::current_date_time_fn;
        context_dependent()
    );
    reg!("current-time", [] -> one(TimeWithTimezone), datetime::current_time_fn; context_dependent());
    reg!("implicit-timezone", [] -> opt(DayTimeDuration), datetime::implicit_timezone_fn; context_dependent());
    reg!("dateTime", [arg("arg1", opt(Date)), arg("arg2", opt(Time))] -> opt(DateTime), datetime::date_time_fn);
    reg!(
        "adjust-dateTime-to-timezone",
        [arg("arg", opt(DateTime))] -> opt(DateTime),
        datetime::adjust_date_time_to_timezone_fn;
        context_dependent()
    );
    reg!(
        "adjust-dateTime-to-timezone",
        [arg("arg", opt(DateTime)), arg("timezone", opt(DayTimeDuration))] -> opt(DateTime),
        datetime::adjust_date_time_to_timezone_fn
    );
    reg!(
        "adjust-date-to-timezone",
        [arg("arg", opt(Date))] -> opt(Date),
        datetime::adjust_date_to_timezone_fn;
        context_dependent()
    );
    reg!(
        "adjust-date-to-timezone",
        [arg("arg", opt(Date)), arg("timezone", opt(DayTimeDuration))] -> opt(Date),
        datetime::adjust_date_to_timezone_fn
    );
    reg!(
        "adjust-time-to-timezone",
        [arg("arg", opt(Time))] -> opt(Time),
        datetime::adjust_time_to_timezone_fn;
        context_dependent()
    );
    reg!(
        "adjust-time-to-timezone",
        [arg("arg", opt(Time)), arg("timezone", opt(DayTimeDuration))] -> opt(Time),
        datetime::adjust_time_to_timezone_fn
    );

    // ===== Durations =====
    reg!("years-from-duration", [arg("arg", opt(Duration))] -> opt(Integer), durations::years_from_duration_fn);
    reg!("months-from-duration", [arg("arg", opt(Duration))] -> opt(Integer), durations::months_from_duration_fn);
    reg!("days-from-duration", [arg("arg", opt(Duration))] -> opt(Integer), durations::days_from_duration_fn);
    reg!("hours-from-duration", [arg("arg", opt(Duration))] -> opt(Integer), durations::hours_from_duration_fn);
    reg!(
        "minutes-from-duration",
        [arg("arg", opt(Duration))] -> opt(Integer),
        durations::minutes_from_duration_fn
    );
    reg!(
        "seconds-from-duration",
        [arg("arg", opt(Duration))] -> opt(Decimal),
        durations::seconds_from_duration_fn
    );

    // ===== URIs and binary =====
    reg!("resolve-uri", [arg("relative", opt(String))] -> opt(AnyUri), uris::resolve_uri_fn; context_dependent());
    reg!(
        "resolve-uri",
        [arg("relative", opt(String)), arg("base", one(String))] -> opt(AnyUri),
        uris::resolve_uri_fn
    );
    reg!("base64-encode", [arg("arg", opt(String))] -> opt(Base64Binary), binary::base64_encode_fn);
    reg!("base64-decode", [arg("arg", opt(Base64Binary))] -> opt(String), binary::base64_decode_fn);

    // ===== Function items =====
    reg!(
        "function-lookup",
        [arg("name", one(String)), arg("arity", one(Integer))] -> common::opt_function(),
        lookup::function_lookup_fn;
        context_dependent()
    );

    Ok(())
}
