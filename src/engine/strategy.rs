//! Module lookup strategies.

use std::fmt;

/// One way of locating an engine module inside the vendor tree.
///
/// Strategies are tried in order; the first one that resolves wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupStrategy {
    /// The module sits directly at the vendor root (`search`).
    Flat,
    /// The module lives inside a named package (`<package>.search`).
    Package(String),
}

impl LookupStrategy {
    /// Returns the registry name this strategy looks up for `symbol`.
    ///
    /// ```rust
    /// use auditor_bridge::engine::LookupStrategy;
    ///
    /// assert_eq!(LookupStrategy::Flat.module_name("search"), "search");
    /// assert_eq!(
    ///     LookupStrategy::Package("engine".into()).module_name("search"),
    ///     "engine.search"
    /// );
    /// ```
    pub fn module_name(&self, symbol: &str) -> String {
        match self {
            Self::Flat => symbol.to_string(),
            Self::Package(package) => format!("{}.{}", package, symbol),
        }
    }

    /// Short description for run logs.
    pub fn label(&self) -> String {
        match self {
            Self::Flat => "flat".to_string(),
            Self::Package(package) => format!("package '{}'", package),
        }
    }
}

impl fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The default order: flat first, then the named package.
pub fn default_strategies(package: &str) -> Vec<LookupStrategy> {
    vec![
        LookupStrategy::Flat,
        LookupStrategy::Package(package.to_string()),
    ]
}
