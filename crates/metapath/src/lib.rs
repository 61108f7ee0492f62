//! Typed value runtime for Metapath expressions.
//!
//! The crate provides the closed algebra of atomic values, sequence
//! cardinality checks, value and general comparison, the arithmetic and
//! temporal operators, and the function signature, library and service
//! machinery used by an expression evaluator. It does not parse Metapath text
//! or walk documents; callers hand in already evaluated sequences.

pub mod consts;
pub mod engine;
pub mod xdm;

pub use engine::comparison::{ComparisonOperator, general_compare, value_compare};
pub use engine::functions::{
    Argument, CallContext, FunctionHandler, FunctionLibrary, FunctionLibraryRegistration, FunctionProperties,
    FunctionService, FunctionSignature, FunctionSignatureBuilder, default_function_library,
};
pub use engine::runtime::{
    DynamicContext, DynamicContextBuilder, Error, ErrorCode, ErrorFamily, ErrorKind, StaticContext,
    StaticContextBuilder,
};
pub use engine::types::{ItemType, Occurrence, SequenceType};
pub use xdm::{AtomicItem, AtomicType, ExpandedName, Item, MapKey, Sequence};

#[doc(hidden)]
pub mod __private {
    pub use inventory;
}
