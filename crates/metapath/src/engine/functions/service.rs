use super::{FunctionLibrary, FunctionSignature};
use crate::engine::runtime::{Error, ErrorKind, StaticContext};
use crate::xdm::ExpandedName;
use std::sync::{Arc, OnceLock};

/// A function library provider discovered at link time.
///
/// Providers are submitted with [`register_function_library!`](crate::register_function_library)
/// and merged by [`FunctionService::discover`] in the order of their names.
pub struct FunctionLibraryRegistration {
    pub name: &'static str,
    pub build: fn() -> Result<FunctionLibrary, Error>,
}

inventory::collect!(FunctionLibraryRegistration);

/// Submit a function library provider to the process-wide function service.
///
/// ```ignore
/// fn build() -> Result<metapath::FunctionLibrary, metapath::Error> { ... }
/// metapath::register_function_library!("my-extensions", build);
/// ```
#[macro_export]
macro_rules! register_function_library {
    ($name:expr, $build:path $(,)?) => {
        $crate::__private::inventory::submit! {
            $crate::engine::functions::FunctionLibraryRegistration { name: $name, build: $build }
        }
    };
}

/// The merged function library every lookup is served from.
#[derive(Debug, Clone)]
pub struct FunctionService {
    library: Arc<FunctionLibrary>,
}

static INSTANCE: OnceLock<Result<FunctionService, Error>> = OnceLock::new();

impl FunctionService {
    /// Build a service from explicitly supplied libraries.
    pub fn from_libraries(libraries: impl IntoIterator<Item = FunctionLibrary>) -> Result<Self, Error> {
        let mut merged = FunctionLibrary::new();
        for library in libraries {
            merged.merge(&library)?;
        }
        Ok(Self { library: Arc::new(merged) })
    }

    /// Build a service from every registered provider.
    pub fn discover() -> Result<Self, Error> {
        let mut providers: Vec<&FunctionLibraryRegistration> =
            inventory::iter::<FunctionLibraryRegistration>.into_iter().collect();
        providers.sort_by_key(|p| p.name);

        let mut merged = FunctionLibrary::new();
        for provider in providers {
            let library = (provider.build)()?;
            tracing::debug!(provider = provider.name, functions = library.len(), "merging function library");
            merged.merge(&library)?;
        }
        tracing::info!(functions = merged.len(), "function service initialized");
        Ok(Self { library: Arc::new(merged) })
    }

    /// The process-wide service, discovered on first use.
    ///
    /// Concurrent first calls block until the single initialization
    /// finishes; a failed initialization is reported to every caller.
    pub fn instance() -> Result<&'static FunctionService, Error> {
        INSTANCE.get_or_init(Self::discover).as_ref().map_err(Clone::clone)
    }

    pub fn library(&self) -> &FunctionLibrary {
        &self.library
    }

    pub fn get_function(&self, name: &ExpandedName, arity: usize) -> Result<Arc<FunctionSignature>, Error> {
        self.library.get_function(name, arity).ok_or_else(|| {
            Error::new(
                ErrorKind::NoFunctionMatch,
                format!("unable to find function with name '{name}' having arity '{arity}'"),
            )
        })
    }

    /// Resolve a lexical function name against `ctx` and look it up.
    pub fn lookup(&self, lexical: &str, arity: usize, ctx: &StaticContext) -> Result<Arc<FunctionSignature>, Error> {
        let name = ctx.resolve_function_name(lexical)?;
        self.get_function(&name, arity)
    }
}
