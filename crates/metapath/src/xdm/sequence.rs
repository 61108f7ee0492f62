use crate::engine::functions::FunctionSignature;
use crate::engine::runtime::{Error, ErrorCode, ErrorKind};
use crate::xdm::AtomicItem;
use smallvec::SmallVec;
use std::sync::Arc;

/// A single member of a sequence: an atomic value or a function item.
#[derive(Debug, Clone)]
pub enum Item {
    Atomic(AtomicItem),
    Function(Arc<FunctionSignature>),
}

impl Item {
    pub fn as_atomic(&self) -> Option<&AtomicItem> {
        match self {
            Item::Atomic(a) => Some(a),
            Item::Function(_) => None,
        }
    }

    /// Atomize the item; function items have no typed value.
    pub fn atomize(&self) -> Result<AtomicItem, Error> {
        match self {
            Item::Atomic(a) => Ok(a.clone()),
            Item::Function(f) => Err(Error::from_code(
                ErrorKind::InvalidArgumentType,
                ErrorCode::FOTY0013,
                format!("the function item '{}' cannot be atomized", f.to_signature()),
            )),
        }
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Item::Atomic(a), Item::Atomic(b)) => a == b,
            (Item::Function(a), Item::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<AtomicItem> for Item {
    fn from(value: AtomicItem) -> Self {
        Item::Atomic(value)
    }
}

impl From<Arc<FunctionSignature>> for Item {
    fn from(value: Arc<FunctionSignature>) -> Self {
        Item::Function(value)
    }
}

/// Ordered collection of items. Singletons, by far the most common shape,
/// are stored inline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sequence(SmallVec<[Item; 1]>);

impl Sequence {
    pub fn empty() -> Self {
        Self(SmallVec::new())
    }

    pub fn singleton(item: impl Into<Item>) -> Self {
        let mut items = SmallVec::new();
        items.push(item.into());
        Self(items)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&Item> {
        self.0.first()
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.0.get(index)
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.0
    }

    pub fn push(&mut self, item: impl Into<Item>) {
        self.0.push(item.into());
    }

    /// Whether the sequence is held without a heap allocation.
    pub fn is_inline(&self) -> bool {
        !self.0.spilled()
    }

    pub fn atomize(&self) -> Result<Vec<AtomicItem>, Error> {
        self.0.iter().map(Item::atomize).collect()
    }

    /// The single atomic value of a sequence of at most one item.
    pub fn first_atomic(&self) -> Result<Option<AtomicItem>, Error> {
        self.0.first().map(Item::atomize).transpose()
    }

    /// Effective boolean value.
    pub fn effective_boolean_value(&self) -> Result<bool, Error> {
        match self.0.as_slice() {
            [] => Ok(false),
            [Item::Function(f)] => Err(Error::from_code(
                ErrorKind::InvalidArgumentType,
                ErrorCode::FORG0006,
                format!("effective boolean value is not defined for the function item '{}'", f.name()),
            )),
            [Item::Atomic(a)] => a.effective_boolean_value(),
            [..] => Err(Error::from_code(
                ErrorKind::InvalidArgumentType,
                ErrorCode::FORG0006,
                format!("effective boolean value is not defined for a sequence of {} items", self.len()),
            )),
        }
    }
}

impl FromIterator<Item> for Sequence {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromIterator<AtomicItem> for Sequence {
    fn from_iter<T: IntoIterator<Item = AtomicItem>>(iter: T) -> Self {
        Self(iter.into_iter().map(Item::Atomic).collect())
    }
}

impl From<Vec<Item>> for Sequence {
    fn from(value: Vec<Item>) -> Self {
        Self(SmallVec::from_vec(value))
    }
}

impl From<AtomicItem> for Sequence {
    fn from(value: AtomicItem) -> Self {
        Self::singleton(value)
    }
}

impl From<Option<AtomicItem>> for Sequence {
    fn from(value: Option<AtomicItem>) -> Self {
        value.map_or_else(Self::empty, Self::singleton)
    }
}

impl IntoIterator for Sequence {
    type Item = Item;
    type IntoIter = smallvec::IntoIter<[Item; 1]>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
