//! Code-to-graph decompilation for plexus.
//!
//! Source text is parsed into the shared syntax tree and walked statement
//! by statement. Data-flow links are inferred from variable usage through
//! a provider map: the most recent node that assigned each name.
//!
//! - [`decompiler`] -- the walk, provider map, and id allocation
//! - [`error`] -- malformed and unsupported input

pub mod decompiler;
pub mod error;

pub use decompiler::{decompile, decompile_with};
pub use error::DecompileError;

use serde::{Deserialize, Serialize};

/// How assignments inside a nested block affect lookups after it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderScope {
    /// One provider map for the whole run. An assignment inside an `if`
    /// or `for` body stays visible to later statements outside it.
    #[default]
    Shared,
    /// The provider map is restored when a nested block ends.
    Block,
}

/// Options for decompilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompileOptions {
    pub provider_scope: ProviderScope,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scope_is_shared() {
        assert_eq!(DecompileOptions::default().provider_scope, ProviderScope::Shared);
    }

    #[test]
    fn options_serde() {
        let opts: DecompileOptions =
            serde_json::from_str(r#"{"provider_scope": "block"}"#).unwrap();
        assert_eq!(opts.provider_scope, ProviderScope::Block);
        let empty: DecompileOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, DecompileOptions::default());
    }
}
