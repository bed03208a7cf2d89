//! ChainMap: one logical mapping over an ordered stack of layers.
//!
//! Lookups walk the layers from index 0 down and stop at the first layer that
//! holds the key. Writes and deletes are routed by the chain's
//! [`WritePolicy`]: [`Shadow`] confines them to layer 0, [`Deep`] sends them to
//! whichever layer already holds the key.
//!
//! Layers are held through [`LayerRef`] handles, so a chain never owns a copy
//! of its layers. Chains derived with [`ChainMap::new_child`] or
//! [`ChainMap::parents`] share layers with the chain they came from, and every
//! holder observes writes to a shared layer on its next read.

use std::collections::{hash_set, HashSet};
use std::fmt;
use std::iter;
use std::marker::PhantomData;

use scopechain_layer::{Layer, LayerMut, LayerRef};

use crate::policy::{Deep, Shadow, WritePolicy};
use crate::Error;

/// A layered, mutable view over an ordered stack of mappings.
///
/// Layer 0 has the highest priority. A chain always has at least one layer.
///
/// # Example
///
/// ```rust
/// use std::collections::HashMap;
/// use scopechain::{ChainMap, LayerRef};
///
/// let defaults: LayerRef<HashMap<&str, &str>> =
///     [("colour", "red"), ("user", "guest")].into_iter().collect();
///
/// let mut settings: ChainMap<_> = ChainMap::with_layer(defaults.clone()).new_child();
/// settings.insert("colour", "blue");
///
/// assert_eq!(settings.get(&"colour"), Ok("blue"));
/// assert_eq!(settings.get(&"user"), Ok("guest"));
///
/// // The defaults layer was shadowed, not modified.
/// assert_eq!(defaults.read().get("colour"), Some(&"red"));
/// ```
pub struct ChainMap<M, P = Shadow> {
    layers: Vec<LayerRef<M>>,
    policy: PhantomData<P>,
}

/// A chain whose writes and deletes reach into whichever layer holds the key.
pub type DeepChainMap<M> = ChainMap<M, Deep>;

impl<M, P> ChainMap<M, P> {
    // Callers guarantee `layers` is non-empty.
    fn from_vec(layers: Vec<LayerRef<M>>) -> Self {
        debug_assert!(!layers.is_empty());
        Self {
            layers,
            policy: PhantomData,
        }
    }

    /// A chain with a single layer, used by reference.
    pub fn with_layer(layer: LayerRef<M>) -> Self {
        Self::from_vec(vec![layer])
    }

    /// A chain of `first` followed by `fallbacks`, in priority order.
    ///
    /// Unlike [`from_layers`](Self::from_layers) this never needs to create a
    /// layer, so it works for layer types without a `Default`.
    pub fn with_fallbacks<I>(first: LayerRef<M>, fallbacks: I) -> Self
    where
        I: IntoIterator<Item = LayerRef<M>>,
    {
        Self::from_vec(iter::once(first).chain(fallbacks).collect())
    }

    /// The layers, highest priority first.
    pub fn layers(&self) -> &[LayerRef<M>] {
        &self.layers
    }

    /// Layer 0, the target of writes under the [`Shadow`] policy.
    pub fn first(&self) -> &LayerRef<M> {
        &self.layers[0]
    }

    /// Number of layers (not keys).
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    /// Append a layer with the lowest priority.
    pub fn push_layer(&mut self, layer: LayerRef<M>) {
        self.layers.push(layer);
    }

    /// A new chain with `layer` in front of all of this chain's layers.
    ///
    /// `layer` is used by reference; the existing layers are shared.
    pub fn new_child_with(&self, layer: LayerRef<M>) -> Self {
        log::debug!("new child chain over {} layers", self.layers.len());
        Self::with_fallbacks(layer, self.layers.iter().cloned())
    }
}

impl<M: Default, P> ChainMap<M, P> {
    /// A chain with one empty layer.
    pub fn new() -> Self {
        Self::with_layer(LayerRef::default())
    }

    /// A chain over `layers`, in priority order.
    ///
    /// An empty iterator yields a chain with one empty layer.
    pub fn from_layers<I>(layers: I) -> Self
    where
        I: IntoIterator<Item = LayerRef<M>>,
    {
        let mut layers: Vec<_> = layers.into_iter().collect();
        if layers.is_empty() {
            layers.push(LayerRef::default());
        }
        Self::from_vec(layers)
    }

    /// A new chain with a fresh empty layer in front of all of this chain's
    /// layers.
    pub fn new_child(&self) -> Self {
        self.new_child_with(LayerRef::default())
    }

    /// A new chain over every layer except layer 0.
    ///
    /// A single-layer chain has no parents; its parent chain has one empty
    /// layer.
    pub fn parents(&self) -> Self {
        log::debug!("parent chain over {} layers", self.layers.len() - 1);
        Self::from_layers(self.layers[1..].iter().cloned())
    }

    /// Swap in a new list of layers, returning the old one.
    ///
    /// An empty replacement yields one empty layer.
    pub fn replace_layers<I>(&mut self, layers: I) -> Vec<LayerRef<M>>
    where
        I: IntoIterator<Item = LayerRef<M>>,
    {
        let replacement = Self::from_layers(layers).layers;
        std::mem::replace(&mut self.layers, replacement)
    }
}

impl<M: Clone, P> ChainMap<M, P> {
    /// A new chain with a shallow copy of layer 0 and the remaining layers
    /// shared.
    ///
    /// Writes to the copy's layer 0 do not affect this chain; writes to any
    /// deeper layer are visible to both.
    pub fn copy(&self) -> Self {
        log::debug!("copying layer 0, sharing {} layers", self.layers.len() - 1);
        Self::with_fallbacks(self.first().duplicate(), self.layers[1..].iter().cloned())
    }
}

impl<M: Layer, P> ChainMap<M, P> {
    /// The value for `key` from the first layer holding it.
    pub fn get(&self, key: &M::Key) -> Result<M::Value, Error<M::Key>> {
        self.lookup(key).ok_or_else(|| Error::missing(key.clone()))
    }

    /// Like [`get`](Self::get), but `None` when no layer holds `key`.
    pub fn lookup(&self, key: &M::Key) -> Option<M::Value> {
        self.layers.iter().enumerate().find_map(|(index, layer)| {
            let value = layer.read().lookup(key)?;
            log::trace!("lookup served by layer {}", index);
            Some(value)
        })
    }

    /// The value for `key`, or `default` when no layer holds it.
    pub fn get_or(&self, key: &M::Key, default: M::Value) -> M::Value {
        self.lookup(key).unwrap_or(default)
    }

    /// True if any layer holds `key`. Stops at the first match.
    pub fn contains_key(&self, key: &M::Key) -> bool {
        self.layers.iter().any(|layer| layer.read().contains(key))
    }

    /// The distinct keys across all layers.
    pub fn keys(&self) -> HashSet<M::Key> {
        let mut keys = HashSet::new();
        for layer in &self.layers {
            layer.read().extend_keys(&mut keys);
        }
        keys
    }

    /// Number of distinct keys across all layers.
    ///
    /// A key held by several layers counts once.
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    /// True if every layer is empty.
    pub fn is_empty(&self) -> bool {
        self.layers.iter().all(|layer| layer.read().is_empty())
    }

    /// Iterate over the distinct keys, each once, in no particular order.
    pub fn iter(&self) -> hash_set::IntoIter<M::Key> {
        self.keys().into_iter()
    }

    /// The visible value of each distinct key.
    pub fn values(&self) -> impl Iterator<Item = M::Value> + '_ {
        self.iter().filter_map(move |key| self.lookup(&key))
    }

    /// Each distinct key with its visible value.
    pub fn items(&self) -> impl Iterator<Item = (M::Key, M::Value)> + '_ {
        self.iter()
            .filter_map(move |key| self.lookup(&key).map(|value| (key, value)))
    }
}

impl<M: LayerMut, P: WritePolicy> ChainMap<M, P> {
    /// Write `key` into the layer chosen by the write policy.
    ///
    /// Returns the value it replaced in that layer, if any. A value for the
    /// same key in another layer is neither returned nor touched.
    pub fn insert(&mut self, key: M::Key, value: M::Value) -> Option<M::Value> {
        let index = P::insert_target(&self.layers, &key);
        log::trace!("{} insert routed to layer {}", P::NAME, index);
        self.layers[index].write().insert(key, value)
    }

    /// Delete `key` from the layer chosen by the write policy.
    ///
    /// Under [`Shadow`] this fails when layer 0 lacks the key, even if a
    /// deeper layer holds it.
    pub fn remove(&mut self, key: &M::Key) -> Result<M::Value, Error<M::Key>> {
        let index = P::remove_target(&self.layers, key).ok_or_else(|| P::missing(key.clone()))?;
        log::trace!("{} remove routed to layer {}", P::NAME, index);
        self.layers[index]
            .write()
            .remove(key)
            .ok_or_else(|| P::missing(key.clone()))
    }

    /// The visible value of `key`, writing `default` first if no layer holds it.
    pub fn set_default(&mut self, key: M::Key, default: M::Value) -> M::Value {
        if let Some(value) = self.lookup(&key) {
            return value;
        }
        self.insert(key, default.clone());
        default
    }
}

impl<M: LayerMut, P> ChainMap<M, P> {
    /// Remove `key` from layer 0 and return its value.
    pub fn pop(&mut self, key: &M::Key) -> Result<M::Value, Error<M::Key>> {
        self.first()
            .write()
            .remove(key)
            .ok_or_else(|| Error::missing_in_first_layer(key.clone()))
    }

    /// Remove `key` from layer 0, or return `default` without touching
    /// anything if layer 0 lacks it.
    pub fn pop_or(&mut self, key: &M::Key, default: M::Value) -> M::Value {
        self.first().write().remove(key).unwrap_or(default)
    }

    /// Remove and return an arbitrary entry from layer 0.
    ///
    /// Fails with [`Error::EmptyMapping`] when layer 0 is empty, even if
    /// deeper layers are not.
    pub fn pop_item(&mut self) -> Result<(M::Key, M::Value), Error<M::Key>> {
        self.first().write().pop_entry().ok_or(Error::EmptyMapping)
    }

    /// Remove every entry from layer 0. Deeper layers are untouched.
    pub fn clear(&mut self) {
        self.first().write().clear()
    }
}

impl<M: LayerMut + Default, P> ChainMap<M, P> {
    /// A single-layer chain mapping every key to `value`.
    ///
    /// Repeated keys collapse to one entry.
    pub fn from_keys<I>(keys: I, value: M::Value) -> Self
    where
        I: IntoIterator<Item = M::Key>,
    {
        let layer = keys
            .into_iter()
            .map(|key| (key, value.clone()))
            .collect();
        Self::with_layer(layer)
    }

    /// [`from_keys`](Self::from_keys) with the value type's default.
    pub fn from_keys_default<I>(keys: I) -> Self
    where
        I: IntoIterator<Item = M::Key>,
        M::Value: Default,
    {
        Self::from_keys(keys, M::Value::default())
    }
}

impl<M: Default, P> Default for ChainMap<M, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Default, P> FromIterator<LayerRef<M>> for ChainMap<M, P> {
    fn from_iter<I: IntoIterator<Item = LayerRef<M>>>(iter: I) -> Self {
        Self::from_layers(iter)
    }
}

impl<M: LayerMut, P: WritePolicy> Extend<(M::Key, M::Value)> for ChainMap<M, P> {
    fn extend<I: IntoIterator<Item = (M::Key, M::Value)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, M: Layer, P> IntoIterator for &'a ChainMap<M, P> {
    type Item = M::Key;
    type IntoIter = hash_set::IntoIter<M::Key>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Chains are equal when they expose the same keys with equal visible values,
/// however those are spread across layers.
impl<M, P, Q> PartialEq<ChainMap<M, Q>> for ChainMap<M, P>
where
    M: Layer,
    M::Value: PartialEq,
{
    fn eq(&self, other: &ChainMap<M, Q>) -> bool {
        let keys = self.keys();
        keys == other.keys() && keys.iter().all(|key| self.lookup(key) == other.lookup(key))
    }
}

impl<M: fmt::Debug, P: WritePolicy> fmt::Debug for ChainMap<M, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(P::NAME)?;
        f.write_str("(")?;
        f.debug_list().entries(&self.layers).finish()?;
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collection_literals::btree;
    use std::collections::{BTreeMap, HashMap};

    type Map = BTreeMap<&'static str, i32>;

    fn layer(map: Map) -> LayerRef<Map> {
        LayerRef::new(map)
    }

    fn two_layers() -> (LayerRef<Map>, LayerRef<Map>) {
        let first = layer(btree! {
            "a" => 1,
            "b" => 2,
        });
        let second = layer(btree! {
            "b" => 99,
            "c" => 3,
        });
        (first, second)
    }

    #[test]
    fn new_has_one_empty_layer() {
        let chain: ChainMap<Map> = ChainMap::new();
        assert_eq!(chain.depth(), 1);
        assert_eq!(chain.len(), 0);
        assert!(chain.is_empty());
        assert_eq!(chain.iter().count(), 0);
    }

    #[test]
    fn from_no_layers_has_one_empty_layer() {
        let chain: ChainMap<Map> = ChainMap::from_layers(Vec::new());
        assert_eq!(chain.depth(), 1);
        assert!(chain.is_empty());
    }

    #[test]
    fn first_layer_wins_lookup() {
        let (first, second) = two_layers();
        let chain: ChainMap<Map> = ChainMap::from_layers([first, second]);

        assert_eq!(chain.get(&"b"), Ok(2));
        assert_eq!(chain.get(&"c"), Ok(3));
        assert_eq!(chain.get(&"z"), Err(Error::missing("z")));
    }

    #[test]
    fn len_counts_distinct_keys() {
        let (first, second) = two_layers();
        let chain: ChainMap<Map> = ChainMap::from_layers([first, second]);

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.keys(), HashSet::from(["a", "b", "c"]));
    }

    #[test]
    fn get_or_and_lookup_never_fail() {
        let (first, second) = two_layers();
        let chain: ChainMap<Map> = ChainMap::from_layers([first, second]);

        assert_eq!(chain.get_or(&"a", 0), 1);
        assert_eq!(chain.get_or(&"z", 0), 0);
        assert_eq!(chain.lookup(&"z"), None);
    }

    #[test]
    fn contains_key_checks_every_layer() {
        let (first, second) = two_layers();
        let chain: ChainMap<Map> = ChainMap::from_layers([first, second]);

        assert!(chain.contains_key(&"a"));
        assert!(chain.contains_key(&"c"));
        assert!(!chain.contains_key(&"z"));
    }

    #[test]
    fn is_empty_looks_at_all_layers() {
        let chain: ChainMap<Map> = ChainMap::from_layers([layer(Map::new())]);
        assert!(chain.is_empty());

        let chain: ChainMap<Map> =
            ChainMap::from_layers([layer(Map::new()), layer(btree! { "a" => 1, })]);
        assert!(!chain.is_empty());
    }

    #[test]
    fn insert_writes_first_layer_only() {
        let (first, second) = two_layers();
        let mut chain: ChainMap<Map> = ChainMap::from_layers([first.clone(), second.clone()]);

        assert_eq!(chain.insert("c", 30), None);

        assert_eq!(chain.get(&"c"), Ok(30));
        assert_eq!(first.read().get("c"), Some(&30));
        assert_eq!(second.read().get("c"), Some(&3));
    }

    #[test]
    fn insert_returns_replaced_first_layer_value() {
        let (first, second) = two_layers();
        let mut chain: ChainMap<Map> = ChainMap::from_layers([first, second]);

        assert_eq!(chain.insert("a", 10), Some(1));
    }

    #[test]
    fn remove_only_from_first_layer() {
        let (first, second) = two_layers();
        let mut chain: ChainMap<Map> = ChainMap::from_layers([first.clone(), second.clone()]);

        let err = chain.remove(&"c").unwrap_err();
        assert_eq!(err, Error::missing_in_first_layer("c"));
        assert_eq!(second.read().get("c"), Some(&3));

        assert_eq!(chain.remove(&"b"), Ok(2));
        assert!(!first.read().contains_key("b"));
        // The deeper value shows through now.
        assert_eq!(chain.get(&"b"), Ok(99));
    }

    #[test]
    fn pop_and_pop_or() {
        let (first, second) = two_layers();
        let mut chain: ChainMap<Map> = ChainMap::from_layers([first, second.clone()]);

        assert_eq!(chain.pop(&"a"), Ok(1));
        assert_eq!(chain.pop(&"a"), Err(Error::missing_in_first_layer("a")));
        assert_eq!(chain.pop(&"c"), Err(Error::missing_in_first_layer("c")));

        assert_eq!(chain.pop_or(&"c", -1), -1);
        assert_eq!(second.read().get("c"), Some(&3));
    }

    #[test]
    fn pop_item_drains_first_layer() {
        let (first, second) = two_layers();
        let mut chain: ChainMap<Map> = ChainMap::from_layers([first, second]);

        assert_eq!(chain.pop_item(), Ok(("b", 2)));
        assert_eq!(chain.pop_item(), Ok(("a", 1)));
        assert_eq!(chain.pop_item(), Err(Error::EmptyMapping));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn clear_leaves_deeper_layers() {
        let (first, second) = two_layers();
        let mut chain: ChainMap<Map> = ChainMap::from_layers([first.clone(), second]);

        chain.clear();

        assert!(first.read().is_empty());
        assert_eq!(chain.get(&"b"), Ok(99));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn copy_duplicates_first_layer_and_shares_rest() {
        let (first, second) = two_layers();
        let chain: ChainMap<Map> = ChainMap::from_layers([first, second]);
        let mut copy = chain.copy();

        copy.insert("a", 100);
        assert_eq!(chain.get(&"a"), Ok(1));

        copy.layers()[1].write().insert("d", 4);
        assert_eq!(chain.get(&"d"), Ok(4));

        assert!(!copy.first().ptr_eq(chain.first()));
        assert!(copy.layers()[1].ptr_eq(&chain.layers()[1]));
    }

    #[test]
    fn new_child_prepends_layer() {
        let (first, second) = two_layers();
        let chain: ChainMap<Map> = ChainMap::from_layers([first.clone(), second.clone()]);

        let child = chain.new_child_with(layer(btree! { "x" => 1, }));
        assert_eq!(child.depth(), 3);
        assert!(child.layers()[1].ptr_eq(&first));
        assert!(child.layers()[2].ptr_eq(&second));
        assert_eq!(child.get(&"x"), Ok(1));
        assert_eq!(child.get(&"a"), Ok(1));

        let parents = child.parents();
        assert_eq!(parents.depth(), 2);
        assert!(parents.first().ptr_eq(&first));
        assert!(parents.layers()[1].ptr_eq(&second));
    }

    #[test]
    fn new_child_starts_empty() {
        let (first, _) = two_layers();
        let chain: ChainMap<Map> = ChainMap::from_layers([first.clone()]);
        let mut child = chain.new_child();

        child.insert("a", 5);

        assert_eq!(child.get(&"a"), Ok(5));
        assert_eq!(first.read().get("a"), Some(&1));
    }

    #[test]
    fn parents_of_single_layer_is_empty() {
        let chain: ChainMap<Map> = ChainMap::from_layers([layer(btree! { "a" => 1, })]);
        let parents = chain.parents();

        assert_eq!(parents.depth(), 1);
        assert!(parents.is_empty());
    }

    #[test]
    fn from_keys_collapses_duplicates() {
        let chain: ChainMap<Map> = ChainMap::from_keys(["a", "b", "a"], 0);

        assert_eq!(chain.depth(), 1);
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.get(&"a"), Ok(0));
        assert_eq!(chain.get(&"b"), Ok(0));
    }

    #[test]
    fn from_keys_default_uses_default_value() {
        let chain: ChainMap<HashMap<&str, Option<i32>>> = ChainMap::from_keys_default(["a"]);
        assert_eq!(chain.get(&"a"), Ok(None));
    }

    #[test]
    fn set_default_keeps_visible_value() {
        let (first, second) = two_layers();
        let mut chain: ChainMap<Map> = ChainMap::from_layers([first.clone(), second]);

        assert_eq!(chain.set_default("c", 7), 3);
        assert!(!first.read().contains_key("c"));

        assert_eq!(chain.set_default("z", 7), 7);
        assert_eq!(first.read().get("z"), Some(&7));
    }

    #[test]
    fn extend_routes_through_insert() {
        let (first, second) = two_layers();
        let mut chain: ChainMap<Map> = ChainMap::from_layers([first.clone(), second]);

        chain.extend([("c", 30), ("d", 40)]);

        assert_eq!(first.read().get("c"), Some(&30));
        assert_eq!(first.read().get("d"), Some(&40));
    }

    #[test]
    fn values_and_items_use_visible_values() {
        let (first, second) = two_layers();
        let chain: ChainMap<Map> = ChainMap::from_layers([first, second]);

        let mut items: Vec<_> = chain.items().collect();
        items.sort();
        assert_eq!(items, vec![("a", 1), ("b", 2), ("c", 3)]);

        let mut values: Vec<_> = chain.values().collect();
        values.sort();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn iterate_by_reference() {
        let (first, second) = two_layers();
        let chain: ChainMap<Map> = ChainMap::from_layers([first, second]);

        let mut keys = Vec::new();
        for key in &chain {
            keys.push(key);
        }
        keys.sort();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn equality_ignores_layering() {
        let (first, second) = two_layers();
        let layered: ChainMap<Map> = ChainMap::from_layers([first, second]);
        let flat: ChainMap<Map> = ChainMap::from_layers([layer(btree! {
            "a" => 1,
            "b" => 2,
            "c" => 3,
        })]);
        let other: ChainMap<Map> = ChainMap::from_keys(["a", "b", "c"], 1);

        assert!(layered == flat);
        assert!(layered != other);
    }

    #[test]
    fn push_and_replace_layers() {
        let (first, second) = two_layers();
        let mut chain: ChainMap<Map> = ChainMap::from_layers([first.clone()]);

        chain.push_layer(second);
        assert_eq!(chain.get(&"c"), Ok(3));

        let old = chain.replace_layers(Vec::new());
        assert_eq!(old.len(), 2);
        assert_eq!(chain.depth(), 1);
        assert!(chain.is_empty());
        assert!(!chain.first().ptr_eq(&first));
    }

    #[test]
    fn with_fallbacks_keeps_order() {
        let (first, second) = two_layers();
        let chain: ChainMap<Map> = ChainMap::with_fallbacks(second, [first]);
        assert_eq!(chain.get(&"b"), Ok(99));
    }

    #[test]
    fn sees_external_layer_mutation() {
        let (first, second) = two_layers();
        let chain: ChainMap<Map> = ChainMap::from_layers([first, second.clone()]);

        second.write().insert("e", 5);

        assert_eq!(chain.get(&"e"), Ok(5));
        assert_eq!(chain.len(), 4);
    }

    #[test]
    fn debug_lists_layers() {
        let (first, second) = two_layers();
        let chain: ChainMap<Map> = ChainMap::from_layers([first, second]);

        assert_eq!(
            format!("{:?}", chain),
            r#"ChainMap([{"a": 1, "b": 2}, {"b": 99, "c": 3}])"#
        );
    }
}
