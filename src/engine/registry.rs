//! Engine module registry.
//!
//! The vendor tree is modelled as a registry of named modules, each with a
//! set of named exports. Lookups go through [`ModuleRegistry::get`] and
//! fail with [`ResolveError::ModuleNotFound`], so an unregistered module is
//! indistinguishable from one that is missing on disk.

use crate::backends::PublicSearchBackend;
use crate::core::{ArcBackend, Backend, ResolveError};
use crate::fetch::Fetcher;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Something a module exports.
#[derive(Clone)]
pub enum Export {
    /// A `search(query, use_proxy)` entry point.
    Search(ArcBackend),
    /// A page fetcher (the `scrape` support module).
    Fetch(Fetcher),
    /// Any other value; never invocable as a search entry point.
    Opaque {
        /// Short description of the value, used in diagnostics.
        kind: String,
    },
}

impl Export {
    /// Creates an opaque export.
    pub fn opaque(kind: impl Into<String>) -> Self {
        Self::Opaque { kind: kind.into() }
    }

    /// Describes the export's shape.
    pub fn shape(&self) -> String {
        match self {
            Self::Search(backend) => format!("search backend '{}'", backend.name()),
            Self::Fetch(_) => "fetcher".to_string(),
            Self::Opaque { kind } => kind.clone(),
        }
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Search(backend) => f.debug_tuple("Search").field(&backend.name()).finish(),
            Self::Fetch(fetcher) => f
                .debug_tuple("Fetch")
                .field(&fetcher.is_available())
                .finish(),
            Self::Opaque { kind } => f.debug_struct("Opaque").field("kind", kind).finish(),
        }
    }
}

/// A named module with exports.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    origin: PathBuf,
    exports: BTreeMap<String, Export>,
}

impl Module {
    /// Creates an empty module.
    pub fn new(name: impl Into<String>, origin: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
            exports: BTreeMap::new(),
        }
    }

    /// Adds an export.
    pub fn with_export(mut self, symbol: impl Into<String>, export: Export) -> Self {
        self.exports.insert(symbol.into(), export);
        self
    }

    /// Exports `backend` as `search`.
    pub fn with_search<B: Backend + 'static>(self, backend: B) -> Self {
        self.with_export("search", Export::Search(Arc::new(backend)))
    }

    /// Returns the module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns where the module was loaded from.
    pub fn origin(&self) -> &Path {
        &self.origin
    }

    /// Looks up an export.
    pub fn export(&self, symbol: &str) -> Option<&Export> {
        self.exports.get(symbol)
    }

    /// Returns the exported symbol names, sorted.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.exports.keys().map(String::as_str)
    }
}

/// Registry of engine modules rooted at a vendor directory.
///
/// # Example
///
/// ```rust
/// use auditor_bridge::backends::MockBackend;
/// use auditor_bridge::engine::{Module, ModuleRegistry};
///
/// let registry = ModuleRegistry::new("/opt/vendor/engine")
///     .with_module(Module::new("engine.search", "/opt/vendor/engine").with_search(MockBackend::new()));
///
/// assert!(registry.get("engine.search").is_ok());
/// assert!(registry.get("search").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ModuleRegistry {
    root: PathBuf,
    modules: BTreeMap<String, Module>,
}

impl ModuleRegistry {
    /// Creates an empty registry rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            modules: BTreeMap::new(),
        }
    }

    /// Creates a registry exposing the built-in engine under `package`.
    ///
    /// Registers `<package>.search` exporting the backend and
    /// `<package>.scrape` exporting the fetcher.
    pub fn with_builtin_engine(
        root: impl Into<PathBuf>,
        package: &str,
        backend: PublicSearchBackend,
        fetcher: Fetcher,
    ) -> Self {
        let root = root.into();
        let origin = root.join(package);

        Self::new(root)
            .with_module(Module::new(format!("{}.search", package), origin.clone()).with_search(backend))
            .with_module(
                Module::new(format!("{}.scrape", package), origin)
                    .with_export("fetch", Export::Fetch(fetcher)),
            )
    }

    /// Returns the vendor root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns `true` if the vendor root exists as a directory.
    pub fn is_present(&self) -> bool {
        self.root.is_dir()
    }

    /// Registers a module, returning any module it replaced.
    pub fn register(&mut self, module: Module) -> Option<Module> {
        self.modules.insert(module.name.clone(), module)
    }

    /// Registers a module (builder form).
    pub fn with_module(mut self, module: Module) -> Self {
        self.register(module);
        self
    }

    /// Looks up a module by name.
    pub fn get(&self, name: &str) -> Result<&Module, ResolveError> {
        self.modules.get(name).ok_or_else(|| ResolveError::ModuleNotFound {
            name: name.to_string(),
        })
    }

    /// Returns the registered module names, sorted.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Returns the number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
