//! Shared key/value metadata.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// The plain map behind a [`PropertyBag`].
pub type Properties = Map<String, Value>;

/// Key/value metadata owned by a template or an error record.
///
/// A bag is a handle: cloning it aliases the same map, so a write through one
/// clone is visible through every other. Templates hand their bag to the
/// templates they [extend](crate::Template::extend) and to the records they
/// stamp this way. Use [`PropertyBag::deep_clone`] to get an independent copy.
///
/// Keys iterate in sorted order.
///
/// # Examples
///
/// ```
/// use khata::PropertyBag;
///
/// let bag = PropertyBag::new();
/// let alias = bag.clone();
/// alias.set("service", "billing");
/// assert_eq!(bag.get("service"), Some("billing".into()));
///
/// let copy = bag.deep_clone();
/// copy.remove("service");
/// assert!(bag.contains("service"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct PropertyBag(Arc<RwLock<Properties>>);

impl PropertyBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Properties> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Properties> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.write().insert(key.into(), value.into());
    }

    /// The value stored under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.write().remove(key)
    }

    /// True if `key` has been set, whatever its value (including `null`).
    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Every stored key.
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// A point-in-time copy of the map.
    pub fn snapshot(&self) -> Properties {
        self.read().clone()
    }

    /// Copies every entry of `other` into this bag; `other` wins on conflicts.
    pub fn merge_from(&self, other: &PropertyBag) {
        if self.shares_with(other) {
            return;
        }
        let incoming = other.snapshot();
        self.write().extend(incoming);
    }

    /// A new bag with the same entries and no aliasing.
    pub fn deep_clone(&self) -> Self {
        Self(Arc::new(RwLock::new(self.snapshot())))
    }

    /// True if both handles point at the same map.
    pub fn shares_with(&self, other: &PropertyBag) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Properties> for PropertyBag {
    fn from(map: Properties) -> Self {
        Self(Arc::new(RwLock::new(map)))
    }
}

impl Serialize for PropertyBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.read().serialize(serializer)
    }
}
