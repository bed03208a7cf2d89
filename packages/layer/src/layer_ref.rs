//! Shared handles to layers.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::LayerMut;

/// A shared, interior-mutable handle to one layer.
///
/// Cloning a `LayerRef` aliases the same layer rather than copying it: every
/// clone observes writes made through any other clone. This is what lets
/// several chains stack the same layer and see each other's changes live.
/// Use [`LayerRef::duplicate`] for an independent shallow copy.
///
/// Handles are single-threaded. Holding a [`read`](Self::read) guard while
/// calling [`write`](Self::write) on an alias panics, as with any `RefCell`.
pub struct LayerRef<M> {
    inner: Rc<RefCell<M>>,
}

impl<M> LayerRef<M> {
    /// Wrap a layer in a new handle.
    pub fn new(layer: M) -> Self {
        Self {
            inner: Rc::new(RefCell::new(layer)),
        }
    }

    /// Borrow the layer for reading.
    pub fn read(&self) -> Ref<'_, M> {
        self.inner.borrow()
    }

    /// Borrow the layer for writing.
    pub fn write(&self) -> RefMut<'_, M> {
        self.inner.borrow_mut()
    }

    /// True if both handles point at the same layer.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Number of live handles to this layer, including this one.
    pub fn handle_count(&self) -> usize {
        Rc::strong_count(&self.inner)
    }

    /// Take the layer back out if this is the only handle left.
    pub fn try_unwrap(self) -> Result<M, Self> {
        Rc::try_unwrap(self.inner)
            .map(RefCell::into_inner)
            .map_err(|inner| Self { inner })
    }
}

impl<M: Clone> LayerRef<M> {
    /// A new handle to a shallow copy of this layer.
    ///
    /// The copy starts with the same entries but is independent afterwards.
    pub fn duplicate(&self) -> Self {
        Self::new(self.read().clone())
    }
}

impl<M> Clone for LayerRef<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<M: Default> Default for LayerRef<M> {
    fn default() -> Self {
        Self::new(M::default())
    }
}

impl<M> From<M> for LayerRef<M> {
    fn from(layer: M) -> Self {
        Self::new(layer)
    }
}

impl<M: LayerMut + Default> FromIterator<(M::Key, M::Value)> for LayerRef<M> {
    fn from_iter<I: IntoIterator<Item = (M::Key, M::Value)>>(iter: I) -> Self {
        let mut layer = M::default();
        for (key, value) in iter {
            layer.insert(key, value);
        }
        Self::new(layer)
    }
}

impl<M: fmt::Debug> fmt::Debug for LayerRef<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(layer) => layer.fmt(f),
            Err(_) => f.write_str("<borrowed>"),
        }
    }
}
