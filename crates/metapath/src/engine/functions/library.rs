use super::FunctionSignature;
use crate::engine::runtime::{Error, ErrorKind};
use crate::xdm::ExpandedName;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

type Overloads = BTreeMap<usize, Arc<FunctionSignature>>;

/// Registry of function signatures indexed by qualified name and by local
/// name, each with its declared arity.
///
/// A qualified name may be registered once per arity. Under the local name
/// index a later registration replaces an earlier one, so several namespaces
/// can expose functions with the same local name.
#[derive(Debug, Default, Clone)]
pub struct FunctionLibrary {
    by_qname: HashMap<ExpandedName, Overloads>,
    by_local: HashMap<String, Overloads>,
    // registration order, replayed by `merge`
    ordered: Vec<Arc<FunctionSignature>>,
}

impl FunctionLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, function: impl Into<Arc<FunctionSignature>>) -> Result<(), Error> {
        let function = function.into();
        let arity = function.arity();
        let overloads = self.by_qname.entry(function.name().clone()).or_default();
        if let Some(existing) = overloads.get(&arity) {
            return Err(Error::new(
                ErrorKind::DuplicateFunctionRegistration,
                format!(
                    "duplicate functions with same arity: {} shadows {}",
                    existing.to_signature(),
                    function.to_signature()
                ),
            ));
        }
        overloads.insert(arity, function.clone());

        let shadowed = self.by_local.entry(function.name().local.clone()).or_default().insert(arity, function.clone());
        if let Some(previous) = shadowed {
            tracing::debug!(
                function = %function.name(),
                shadowed = %previous.name(),
                arity,
                "local function name shadowed"
            );
        }
        tracing::debug!(function = %function.name(), arity, "registered function");
        self.ordered.push(function);
        Ok(())
    }

    /// Resolve a function by name and call arity.
    ///
    /// A name without namespace is looked up by its local name. An exact
    /// arity match wins; otherwise the unbounded overload with the largest
    /// declared arity below `arity` is used.
    pub fn get_function(&self, name: &ExpandedName, arity: usize) -> Option<Arc<FunctionSignature>> {
        let overloads = match name.ns_uri {
            Some(_) => self.by_qname.get(name)?,
            None => self.by_local.get(&name.local)?,
        };
        if let Some(exact) = overloads.get(&arity) {
            return Some(exact.clone());
        }
        overloads.range(..arity).rev().map(|(_, f)| f).find(|f| f.is_arity_unbounded()).cloned()
    }

    pub fn contains(&self, name: &ExpandedName, arity: usize) -> bool {
        self.get_function(name, arity).is_some()
    }

    /// Every registered function in registration order.
    pub fn functions(&self) -> impl Iterator<Item = &Arc<FunctionSignature>> {
        self.ordered.iter()
    }

    /// Register every function of `other`, in its registration order.
    pub fn merge(&mut self, other: &FunctionLibrary) -> Result<(), Error> {
        other.functions().try_for_each(|f| self.register(f.clone()))
    }

    pub fn len(&self) -> usize {
        self.ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }
}
