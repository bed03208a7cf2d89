//! Instrumented layers for tests.

use std::cell::Cell;
use std::collections::HashSet;

use crate::{Layer, LayerMut};

/// Wraps a layer and counts how often it is probed.
///
/// Lookups and containment checks are counted separately, so tests can
/// assert that a chain stopped at the first matching layer.
#[derive(Debug, Default, Clone)]
pub struct CountingLayer<M> {
    inner: M,
    lookups: Cell<usize>,
    probes: Cell<usize>,
}

impl<M> CountingLayer<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            lookups: Cell::new(0),
            probes: Cell::new(0),
        }
    }

    /// Number of `lookup` calls so far.
    pub fn lookups(&self) -> usize {
        self.lookups.get()
    }

    /// Number of `contains` calls so far.
    pub fn probes(&self) -> usize {
        self.probes.get()
    }

    pub fn reset(&self) {
        self.lookups.set(0);
        self.probes.set(0);
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M: Layer> Layer for CountingLayer<M> {
    type Key = M::Key;
    type Value = M::Value;

    fn lookup(&self, key: &M::Key) -> Option<M::Value> {
        self.lookups.set(self.lookups.get() + 1);
        self.inner.lookup(key)
    }

    fn contains(&self, key: &M::Key) -> bool {
        self.probes.set(self.probes.get() + 1);
        self.inner.contains(key)
    }

    fn extend_keys(&self, keys: &mut HashSet<M::Key>) {
        self.inner.extend_keys(keys)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<M: LayerMut> LayerMut for CountingLayer<M> {
    fn insert(&mut self, key: M::Key, value: M::Value) -> Option<M::Value> {
        self.inner.insert(key, value)
    }

    fn remove(&mut self, key: &M::Key) -> Option<M::Value> {
        self.inner.remove(key)
    }

    fn pop_entry(&mut self) -> Option<(M::Key, M::Value)> {
        self.inner.pop_entry()
    }

    fn clear(&mut self) {
        self.inner.clear()
    }
}
