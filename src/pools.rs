//! Pooled value carriers - allocation-free measurement plumbing.
//!
//! Layout passes hand small value holders (`Size`, `Output<T>`, `Diff<T>`)
//! across the measure bridge many times per pass. To avoid per-call garbage
//! they are recycled through a global free-list pool keyed by type.
//!
//! Acquisition is scoped: [`acquire`] returns a [`Pooled<T>`] guard whose
//! `Drop` resets the value and returns it to the pool, so every acquired
//! object is released on all exit paths, including unwinding out of a
//! component callback.
//!
//! Pools are mutex-guarded: independent layout passes may run concurrently
//! on different threads.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::{LazyLock, Mutex};

use crate::component::LifecycleId;
use crate::types::MountContent;

/// Upper bound on recycled objects kept per type.
const MAX_POOLED_PER_TYPE: usize = 16;

/// Sentinel written into a [`Size`] before `on_measure` runs.
///
/// A dimension still negative after the callback means the component failed
/// to populate its measurement.
pub const SIZE_UNSET: i32 = i32::MIN;

// =============================================================================
// Value carriers
// =============================================================================

/// A (width, height) measurement result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: SIZE_UNSET,
            height: SIZE_UNSET,
        }
    }
}

/// A single output slot populated by a component callback.
#[derive(Debug)]
pub struct Output<T> {
    value: Option<T>,
}

impl<T> Default for Output<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> Output<T> {
    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn take(&mut self) -> Option<T> {
        self.value.take()
    }
}

/// A (previous, next) pair for change detection on arbitrary props.
#[derive(Debug)]
pub struct Diff<T> {
    pub previous: Option<T>,
    pub next: Option<T>,
}

impl<T> Default for Diff<T> {
    fn default() -> Self {
        Self {
            previous: None,
            next: None,
        }
    }
}

impl<T: PartialEq> Diff<T> {
    /// Whether the value changed between the previous and next pass.
    pub fn changed(&self) -> bool {
        self.previous != self.next
    }
}

// =============================================================================
// Pool
// =============================================================================

/// Types that can be recycled through the global pool.
///
/// `reset` restores the pristine (post-`Default`) state before the object
/// re-enters the pool.
pub trait Poolable: Any + Send + Default {
    fn reset(&mut self);
}

impl Poolable for Size {
    fn reset(&mut self) {
        self.width = SIZE_UNSET;
        self.height = SIZE_UNSET;
    }
}

impl<T: Send + 'static> Poolable for Output<T> {
    fn reset(&mut self) {
        self.value = None;
    }
}

impl<T: Send + 'static> Poolable for Diff<T> {
    fn reset(&mut self) {
        self.previous = None;
        self.next = None;
    }
}

/// Free lists keyed by concrete type.
static POOLS: LazyLock<Mutex<HashMap<TypeId, Vec<Box<dyn Any + Send>>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// RAII guard over a pooled value; releases back to the pool on drop.
pub struct Pooled<T: Poolable> {
    value: Option<Box<T>>,
}

impl<T: Poolable> Deref for Pooled<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.value.as_deref().expect("pooled value taken")
    }
}

impl<T: Poolable> DerefMut for Pooled<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.value.as_deref_mut().expect("pooled value taken")
    }
}

impl<T: Poolable> Drop for Pooled<T> {
    fn drop(&mut self) {
        let Some(mut boxed) = self.value.take() else {
            return;
        };
        boxed.reset();

        let mut pools = match POOLS.lock() {
            Ok(guard) => guard,
            // A panic while the pool lock was held; dropping the value is
            // safer than clearing the poison.
            Err(_) => return,
        };
        let list = pools.entry(TypeId::of::<T>()).or_default();
        if list.len() < MAX_POOLED_PER_TYPE {
            list.push(boxed);
        }
    }
}

/// Acquire a pooled `T`, reusing a recycled instance when one is available.
pub fn acquire<T: Poolable>() -> Pooled<T> {
    let recycled = POOLS
        .lock()
        .ok()
        .and_then(|mut pools| pools.get_mut(&TypeId::of::<T>())?.pop());

    let value = match recycled {
        Some(boxed) => boxed
            .downcast::<T>()
            .unwrap_or_else(|_| Box::new(T::default())),
        None => Box::new(T::default()),
    };

    Pooled { value: Some(value) }
}

/// Acquire a [`Size`] poisoned with the unset sentinel.
pub fn acquire_size() -> Pooled<Size> {
    // Default/reset already poison both dimensions.
    acquire::<Size>()
}

/// Acquire an [`Output<T>`] slot.
pub fn acquire_output<T: Send + 'static>() -> Pooled<Output<T>> {
    acquire::<Output<T>>()
}

/// Acquire a [`Diff<T>`] populated with the given previous/next values.
pub fn acquire_diff<T: Send + 'static>(previous: Option<T>, next: Option<T>) -> Pooled<Diff<T>> {
    let mut diff = acquire::<Diff<T>>();
    diff.previous = previous;
    diff.next = next;
    diff
}

// =============================================================================
// Mount content pool
// =============================================================================

/// Unmounted native content kept for reuse, keyed by component kind.
static MOUNT_CONTENT_POOLS: LazyLock<Mutex<HashMap<LifecycleId, Vec<MountContent>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Take a recycled content object for the given kind, if one is pooled.
pub fn acquire_mount_content(kind: LifecycleId) -> Option<MountContent> {
    MOUNT_CONTENT_POOLS
        .lock()
        .ok()
        .and_then(|mut pools| pools.get_mut(&kind)?.pop())
}

/// Return unmounted content to the kind's pool.
///
/// `max` is the kind's preallocation bound; content beyond it is dropped.
pub fn release_mount_content(kind: LifecycleId, content: MountContent, max: usize) {
    let Ok(mut pools) = MOUNT_CONTENT_POOLS.lock() else {
        return;
    };
    let list = pools.entry(kind).or_default();
    if list.len() < max {
        list.push(content);
    }
}

/// Number of recycled content objects pooled for the given kind.
pub fn pooled_mount_content_count(kind: LifecycleId) -> usize {
    MOUNT_CONTENT_POOLS
        .lock()
        .ok()
        .map(|pools| pools.get(&kind).map(|list| list.len()).unwrap_or(0))
        .unwrap_or(0)
}

/// Number of recycled instances currently pooled for `T`.
pub fn pooled_count<T: Poolable>() -> usize {
    POOLS
        .lock()
        .ok()
        .map(|pools| {
            pools
                .get(&TypeId::of::<T>())
                .map(|list| list.len())
                .unwrap_or(0)
        })
        .unwrap_or(0)
}

// =============================================================================
// Tests
// =============================================================================
