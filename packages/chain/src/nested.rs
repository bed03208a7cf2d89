//! A chain is itself a layer, so chains can be stacked inside chains.

use std::collections::HashSet;

use scopechain_layer::{Layer, LayerMut};

use crate::policy::WritePolicy;
use crate::ChainMap;

impl<M: Layer, P> Layer for ChainMap<M, P> {
    type Key = M::Key;
    type Value = M::Value;

    fn lookup(&self, key: &M::Key) -> Option<M::Value> {
        ChainMap::lookup(self, key)
    }

    fn contains(&self, key: &M::Key) -> bool {
        self.contains_key(key)
    }

    fn extend_keys(&self, keys: &mut HashSet<M::Key>) {
        for layer in self.layers() {
            layer.read().extend_keys(keys);
        }
    }

    fn len(&self) -> usize {
        ChainMap::len(self)
    }

    fn is_empty(&self) -> bool {
        ChainMap::is_empty(self)
    }
}

// Writes follow the inner chain's own policy; pops stay on its layer 0.
impl<M: LayerMut, P: WritePolicy> LayerMut for ChainMap<M, P> {
    fn insert(&mut self, key: M::Key, value: M::Value) -> Option<M::Value> {
        ChainMap::insert(self, key, value)
    }

    fn remove(&mut self, key: &M::Key) -> Option<M::Value> {
        ChainMap::remove(self, key).ok()
    }

    fn pop_entry(&mut self) -> Option<(M::Key, M::Value)> {
        self.pop_item().ok()
    }

    fn clear(&mut self) {
        ChainMap::clear(self)
    }
}
