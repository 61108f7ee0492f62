//! Namespace URIs and prefixes bound by default in Metapath.

/// Namespace of the Metapath data types and their constructor functions.
pub const NS_METAPATH: &str = "http://csrc.nist.gov/ns/metaschema/metapath";
/// Namespace of the core function library.
pub const NS_METAPATH_FUNCTIONS: &str = "http://csrc.nist.gov/ns/metaschema/metapath-functions";
pub const NS_METAPATH_FUNCTIONS_MATH: &str = "http://csrc.nist.gov/ns/metaschema/metapath-functions/math";
pub const NS_METAPATH_FUNCTIONS_ARRAY: &str = "http://csrc.nist.gov/ns/metaschema/metapath-functions/array";
pub const NS_METAPATH_FUNCTIONS_MAP: &str = "http://csrc.nist.gov/ns/metaschema/metapath-functions/map";
/// Namespace used for W3C-defined error codes (xqt-errors).
pub const ERR_NS: &str = "http://www.w3.org/2005/xqt-errors";

pub const PREFIX_METAPATH: &str = "meta";
pub const PREFIX_XML_SCHEMA: &str = "xs";
pub const PREFIX_METAPATH_FUNCTIONS: &str = "mp";
pub const PREFIX_METAPATH_FUNCTIONS_MATH: &str = "math";
pub const PREFIX_METAPATH_FUNCTIONS_ARRAY: &str = "array";
pub const PREFIX_METAPATH_FUNCTIONS_MAP: &str = "map";

/// Prefix bindings every static context starts with.
pub const DEFAULT_NAMESPACE_BINDINGS: &[(&str, &str)] = &[
    (PREFIX_METAPATH, NS_METAPATH),
    (PREFIX_XML_SCHEMA, NS_METAPATH),
    (PREFIX_METAPATH_FUNCTIONS, NS_METAPATH_FUNCTIONS),
    (PREFIX_METAPATH_FUNCTIONS_MATH, NS_METAPATH_FUNCTIONS_MATH),
    (PREFIX_METAPATH_FUNCTIONS_ARRAY, NS_METAPATH_FUNCTIONS_ARRAY),
    (PREFIX_METAPATH_FUNCTIONS_MAP, NS_METAPATH_FUNCTIONS_MAP),
];
