//! Write policies: which layer a write or delete lands in.

use scopechain_layer::{Layer, LayerRef};

use crate::Error;

/// Decides where [`ChainMap::insert`](crate::ChainMap::insert) and
/// [`ChainMap::remove`](crate::ChainMap::remove) operate.
///
/// Reads never consult the policy. `pop`, `pop_item` and `clear` always work
/// on layer 0 regardless of policy.
///
/// `layers` is never empty when a policy is asked.
pub trait WritePolicy {
    /// Type name used by `Debug` output.
    const NAME: &'static str;

    /// Index of the layer that receives a write of `key`.
    fn insert_target<M: Layer>(layers: &[LayerRef<M>], key: &M::Key) -> usize;

    /// Index of the layer a delete of `key` removes from, or `None` if no
    /// eligible layer holds it.
    fn remove_target<M: Layer>(layers: &[LayerRef<M>], key: &M::Key) -> Option<usize>;

    /// The error reported when `remove_target` finds nothing.
    fn missing<K>(key: K) -> Error<K>;
}

/// Writes and deletes touch layer 0 only; lower layers are shadowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shadow;

impl WritePolicy for Shadow {
    const NAME: &'static str = "ChainMap";

    fn insert_target<M: Layer>(_layers: &[LayerRef<M>], _key: &M::Key) -> usize {
        0
    }

    fn remove_target<M: Layer>(layers: &[LayerRef<M>], key: &M::Key) -> Option<usize> {
        layers.first()?.read().contains(key).then_some(0)
    }

    fn missing<K>(key: K) -> Error<K> {
        Error::missing_in_first_layer(key)
    }
}

/// Writes and deletes go to the first layer already holding the key.
///
/// New keys are created in layer 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deep;

impl WritePolicy for Deep {
    const NAME: &'static str = "DeepChainMap";

    fn insert_target<M: Layer>(layers: &[LayerRef<M>], key: &M::Key) -> usize {
        Self::remove_target(layers, key).unwrap_or(0)
    }

    fn remove_target<M: Layer>(layers: &[LayerRef<M>], key: &M::Key) -> Option<usize> {
        layers.iter().position(|layer| layer.read().contains(key))
    }

    fn missing<K>(key: K) -> Error<K> {
        Error::missing(key)
    }
}
