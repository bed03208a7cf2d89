//! scopechain: a layered, mutable view over a stack of mappings
//!
//! This layer turns an ordered list of [layers](scopechain_layer::Layer) into
//! one logical mapping:
//! - Lookups search layer 0 first and fall back to deeper layers
//! - Writes and deletes are confined by a [`WritePolicy`]
//! - Derived chains (`new_child`, `parents`, `copy`) share layers by reference
//!
//! Use this layer for:
//! - Nested lexical scopes (locals over enclosing scopes over globals)
//! - Configuration overrides (command line over user file over defaults)
//! - Templating contexts that push and pop variable frames
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use scopechain::{ChainMap, DeepChainMap, LayerRef};
//!
//! type Scope = HashMap<&'static str, i32>;
//!
//! let globals: LayerRef<Scope> = [("x", 1), ("y", 2)].into_iter().collect();
//!
//! // Shadowing: writes land in the innermost scope.
//! let mut local: ChainMap<Scope> = ChainMap::with_layer(globals.clone()).new_child();
//! local.insert("x", 10);
//! assert_eq!(local.get(&"x"), Ok(10));
//! assert_eq!(globals.read()["x"], 1);
//!
//! // Deep: writes update the scope that already defines the name.
//! let mut nonlocal: DeepChainMap<Scope> = DeepChainMap::with_layer(globals.clone()).new_child();
//! nonlocal.insert("y", 20);
//! assert_eq!(globals.read()["y"], 20);
//! ```

mod chain_map;
mod error;
mod nested;
mod policy;

pub use chain_map::{ChainMap, DeepChainMap};
pub use error::{Error, Scope};
pub use policy::{Deep, Shadow, WritePolicy};

// Re-export layer types for convenience
pub use scopechain_layer::{Layer, LayerMut, LayerRef};
