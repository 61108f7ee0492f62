//! Value model: expanded names, the atomic type lattice, atomic items,
//! items and sequences.

pub mod atomic;
mod map_key;
mod sequence;
mod types;

use core::fmt;

pub use atomic::{
    AtomicItem, DateTimeValue, DateValue, DayTimeDuration, TimeValue, UtcInstant, YearMonthDuration,
};
pub use map_key::{MapKey, TemporalKey};
pub use sequence::{Item, Sequence};
pub use types::AtomicType;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<String>, local: impl Into<String>) -> Self {
        Self { ns_uri, local: local.into() }
    }

    /// A name in the given namespace.
    pub fn ns(ns_uri: impl Into<String>, local: impl Into<String>) -> Self {
        Self { ns_uri: Some(ns_uri.into()), local: local.into() }
    }

    /// A name in no namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self { ns_uri: None, local: local.into() }
    }

    /// Braced URI literal form, `Q{ns}local`.
    pub fn to_eqname(&self) -> String {
        format!("Q{{{}}}{}", self.ns_uri.as_deref().unwrap_or(""), self.local)
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(ns) => write!(f, "Q{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}
