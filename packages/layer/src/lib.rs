//! Layer-level scopechain: the mapping capability
//!
//! This is the narrow waist of the scopechain stack. A layer is any key-value
//! mapping that can answer lookups for its own keys, with no knowledge of the
//! layers stacked above or below it:
//! - `Layer`: lookup, containment, key enumeration, size
//! - `LayerMut`: insertion, removal, popping, clearing
//! - `LayerRef`: a shared handle so several chains can stack the same layer
//!
//! `HashMap` and `BTreeMap` are layers out of the box.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use scopechain_layer::{Layer, LayerRef};
//!
//! let defaults: LayerRef<HashMap<String, u32>> = LayerRef::default();
//! let alias = defaults.clone();
//!
//! alias.write().insert("retries".to_string(), 3);
//!
//! // Both handles see the same layer.
//! assert_eq!(defaults.read().lookup(&"retries".to_string()), Some(3));
//! assert!(defaults.ptr_eq(&alias));
//! ```
//!
//! # Test Utilities
//!
//! Enable the `test-utils` feature for instrumented layers:
//!
//! ```toml
//! [dev-dependencies]
//! scopechain-layer = { version = "0.1", features = ["test-utils"] }
//! ```

mod layer_ref;
mod traits;

pub use layer_ref::LayerRef;
pub use traits::{Layer, LayerMut};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
