//! Core traits for the layer level.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::hash::{BuildHasher, Hash};

/// Read keys and values from a single mapping.
///
/// This is the read half of the mapping capability. A layer only answers for
/// the entries it holds itself; precedence between layers is the chain's job.
///
/// # Object Safety
///
/// This trait is object-safe once the associated types are fixed:
/// `Box<dyn Layer<Key = String, Value = u32>>` works.
pub trait Layer {
    /// Key type. Keys are hashed when the union of several layers is taken.
    type Key: Eq + Hash + Clone;

    /// Value type. Lookups hand out clones.
    type Value: Clone;

    /// Look up a key in this layer.
    ///
    /// # Returns
    ///
    /// * `None` - The key is not present in this layer.
    /// * `Some(value)` - A clone of the stored value.
    fn lookup(&self, key: &Self::Key) -> Option<Self::Value>;

    /// Check whether this layer holds the key.
    fn contains(&self, key: &Self::Key) -> bool {
        self.lookup(key).is_some()
    }

    /// Add every key held by this layer to `keys`.
    fn extend_keys(&self, keys: &mut HashSet<Self::Key>);

    /// Number of entries held by this layer.
    fn len(&self) -> usize;

    /// True if this layer holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Modify the entries of a single mapping.
///
/// Writes never look past the layer they are applied to.
pub trait LayerMut: Layer {
    /// Insert or overwrite a key. Returns the value it replaced, if any.
    fn insert(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value>;

    /// Remove a key. Returns `None` if this layer did not hold it.
    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value>;

    /// Remove and return an arbitrary entry, or `None` if the layer is empty.
    ///
    /// Which entry is popped is up to the implementation.
    fn pop_entry(&mut self) -> Option<(Self::Key, Self::Value)>;

    /// Remove every entry.
    fn clear(&mut self);
}

impl<K, V, S> Layer for HashMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    type Key = K;
    type Value = V;

    fn lookup(&self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn extend_keys(&self, keys: &mut HashSet<K>) {
        keys.extend(self.keys().cloned());
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn is_empty(&self) -> bool {
        HashMap::is_empty(self)
    }
}

impl<K, V, S> LayerMut for HashMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        HashMap::insert(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        HashMap::remove(self, key)
    }

    fn pop_entry(&mut self) -> Option<(K, V)> {
        let key = self.keys().next()?.clone();
        self.remove_entry(&key)
    }

    fn clear(&mut self) {
        HashMap::clear(self)
    }
}

impl<K, V> Layer for BTreeMap<K, V>
where
    K: Ord + Hash + Clone,
    V: Clone,
{
    type Key = K;
    type Value = V;

    fn lookup(&self, key: &K) -> Option<V> {
        self.get(key).cloned()
    }

    fn contains(&self, key: &K) -> bool {
        self.contains_key(key)
    }

    fn extend_keys(&self, keys: &mut HashSet<K>) {
        keys.extend(self.keys().cloned());
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn is_empty(&self) -> bool {
        BTreeMap::is_empty(self)
    }
}

impl<K, V> LayerMut for BTreeMap<K, V>
where
    K: Ord + Hash + Clone,
    V: Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        BTreeMap::insert(self, key, value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        BTreeMap::remove(self, key)
    }

    // Greatest key first, so repeated pops drain in reverse key order.
    fn pop_entry(&mut self) -> Option<(K, V)> {
        self.pop_last()
    }

    fn clear(&mut self) {
        BTreeMap::clear(self)
    }
}

// Blanket implementations for boxes, so heterogeneous layers can share a chain.

impl<T: Layer + ?Sized> Layer for Box<T> {
    type Key = T::Key;
    type Value = T::Value;

    fn lookup(&self, key: &Self::Key) -> Option<Self::Value> {
        self.as_ref().lookup(key)
    }

    fn contains(&self, key: &Self::Key) -> bool {
        self.as_ref().contains(key)
    }

    fn extend_keys(&self, keys: &mut HashSet<Self::Key>) {
        self.as_ref().extend_keys(keys)
    }

    fn len(&self) -> usize {
        self.as_ref().len()
    }

    fn is_empty(&self) -> bool {
        self.as_ref().is_empty()
    }
}

impl<T: LayerMut + ?Sized> LayerMut for Box<T> {
    fn insert(&mut self, key: Self::Key, value: Self::Value) -> Option<Self::Value> {
        self.as_mut().insert(key, value)
    }

    fn remove(&mut self, key: &Self::Key) -> Option<Self::Value> {
        self.as_mut().remove(key)
    }

    fn pop_entry(&mut self) -> Option<(Self::Key, Self::Value)> {
        self.as_mut().pop_entry()
    }

    fn clear(&mut self) {
        self.as_mut().clear()
    }
}
