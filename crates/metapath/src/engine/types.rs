//! Sequence types: an item type paired with an occurrence indicator.

use crate::engine::runtime::{Error, ErrorCode, ErrorKind};
use crate::xdm::{AtomicType, Item, Sequence};
use core::fmt;
use std::sync::LazyLock;

/// Cardinality constraint on a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Occurrence {
    /// The empty sequence.
    Zero,
    /// `?`
    ZeroOrOne,
    /// Exactly one item; written without an indicator.
    One,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Occurrence {
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Zero | Self::One => "",
            Self::ZeroOrOne => "?",
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
        }
    }

    fn description(self) -> &'static str {
        match self {
            Self::Zero => "an empty sequence",
            Self::ZeroOrOne => "a sequence of zero or one",
            Self::One => "a sequence of one",
            Self::ZeroOrMore => "a sequence of zero or more",
            Self::OneOrMore => "a sequence of one or more",
        }
    }

    fn code(self) -> ErrorCode {
        match self {
            Self::Zero => ErrorCode::XPTY0004,
            Self::ZeroOrOne => ErrorCode::FORG0003,
            Self::OneOrMore => ErrorCode::FORG0004,
            Self::One | Self::ZeroOrMore => ErrorCode::FORG0005,
        }
    }

    pub fn allows(self, len: usize) -> bool {
        match self {
            Self::Zero => len == 0,
            Self::ZeroOrOne => len <= 1,
            Self::One => len == 1,
            Self::ZeroOrMore => true,
            Self::OneOrMore => len >= 1,
        }
    }

    /// Check the size of `sequence`, handing it back unchanged when it fits.
    pub fn validate(self, sequence: Sequence) -> Result<Sequence, Error> {
        if self.allows(sequence.len()) {
            return Ok(sequence);
        }
        Err(Error::from_code(
            ErrorKind::InvalidCardinality,
            self.code(),
            format!("{} expected, but size is '{}'", self.description(), sequence.len()),
        ))
    }
}

/// The type of a single item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    AnyItem,
    Atomic(AtomicType),
    Function,
}

impl ItemType {
    pub fn matches(self, item: &Item) -> bool {
        match (self, item) {
            (Self::AnyItem, _) => true,
            (Self::Atomic(ty), Item::Atomic(a)) => a.instance_of(ty),
            (Self::Function, Item::Function(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AnyItem => f.write_str("item()"),
            Self::Atomic(ty) => write!(f, "{ty}"),
            Self::Function => f.write_str("function(*)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceType {
    item_type: Option<ItemType>,
    occurrence: Occurrence,
}

static EMPTY: LazyLock<SequenceType> = LazyLock::new(|| SequenceType::new(None, Occurrence::Zero));

impl SequenceType {
    /// `Zero` always drops the item type.
    pub fn new(item_type: Option<ItemType>, occurrence: Occurrence) -> Self {
        let item_type = if occurrence == Occurrence::Zero { None } else { item_type };
        Self { item_type, occurrence }
    }

    /// `empty-sequence()`
    pub fn empty() -> &'static SequenceType {
        &EMPTY
    }

    pub fn one(item_type: ItemType) -> Self {
        Self::new(Some(item_type), Occurrence::One)
    }

    pub fn zero_or_one(item_type: ItemType) -> Self {
        Self::new(Some(item_type), Occurrence::ZeroOrOne)
    }

    pub fn zero_or_more(item_type: ItemType) -> Self {
        Self::new(Some(item_type), Occurrence::ZeroOrMore)
    }

    pub fn one_or_more(item_type: ItemType) -> Self {
        Self::new(Some(item_type), Occurrence::OneOrMore)
    }

    /// `item()*`
    pub fn any_items() -> Self {
        Self::zero_or_more(ItemType::AnyItem)
    }

    pub fn item_type(&self) -> Option<ItemType> {
        self.item_type
    }

    pub fn occurrence(&self) -> Occurrence {
        self.occurrence
    }

    pub fn is_empty_sequence(&self) -> bool {
        self.occurrence == Occurrence::Zero
    }

    /// Whether every item of `sequence` is of the item type.
    pub fn matches_items(&self, sequence: &Sequence) -> bool {
        match self.item_type {
            Some(ty) => sequence.iter().all(|item| ty.matches(item)),
            None => sequence.is_empty(),
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item_type {
            None => f.write_str("empty-sequence()"),
            Some(ty) => write!(f, "{ty}{}", self.occurrence.indicator()),
        }
    }
}
