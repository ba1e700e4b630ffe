//! TreeProps - ambient inherited key-value map.
//!
//! A component may read entries published by ancestors and may publish
//! new/overridden entries visible only to its descendants. The map is
//! copy-on-write: mutation clones the underlying storage, so the parent's
//! map is never affected by what a subtree publishes. `create_layout`
//! installs the child map around the subtree callbacks and restores the
//! parent's map afterwards.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Entries = HashMap<&'static str, Arc<dyn Any + Send + Sync>>;

/// Inherited key-value map propagated down the component tree.
///
/// Cloning the handle is cheap (shared storage); [`TreeProps::set`] performs
/// the copy-on-write.
#[derive(Clone, Default)]
pub struct TreeProps {
    entries: Arc<Entries>,
}

impl TreeProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read an entry published by an ancestor.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&T> {
        self.entries.get(key)?.downcast_ref::<T>()
    }

    /// Publish an entry visible to descendants of the setting component.
    pub fn set<T: Any + Send + Sync>(&mut self, key: &'static str, value: T) {
        let mut entries = (*self.entries).clone();
        entries.insert(key, Arc::new(value));
        self.entries = Arc::new(entries);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether two handles share the same underlying map.
    pub fn same(&self, other: &TreeProps) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for TreeProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
