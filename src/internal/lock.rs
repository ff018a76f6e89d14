//! Slot storage lock, `std` by default and `parking_lot` when enabled.
//!
//! The guarded value is a single `Option<Arc<T>>` that is replaced whole, so
//! a poisoned `std` lock still holds a consistent value and is read through.

use std::sync::Arc;

#[cfg(feature = "parking-lot")]
pub(crate) struct SlotCell<T: ?Sized> {
    inner: parking_lot::RwLock<Option<Arc<T>>>,
}

#[cfg(not(feature = "parking-lot"))]
pub(crate) struct SlotCell<T: ?Sized> {
    inner: std::sync::RwLock<Option<Arc<T>>>,
}

impl<T: ?Sized> SlotCell<T> {
    pub(crate) fn empty() -> Self {
        Self {
            #[cfg(feature = "parking-lot")]
            inner: parking_lot::RwLock::new(None),
            #[cfg(not(feature = "parking-lot"))]
            inner: std::sync::RwLock::new(None),
        }
    }

    /// Clone of the stored reference.
    pub(crate) fn load(&self) -> Option<Arc<T>> {
        #[cfg(feature = "parking-lot")]
        {
            self.inner.read().clone()
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            self.inner
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        }
    }

    /// Replaces the stored reference. The previous one is dropped after the
    /// lock is released.
    pub(crate) fn store(&self, value: Arc<T>) {
        let _previous = self.swap(Some(value));
    }

    /// Drops the stored reference, breaking `Arc` cycles between beans.
    pub(crate) fn clear(&self) {
        let _previous = self.swap(None);
    }

    fn swap(&self, value: Option<Arc<T>>) -> Option<Arc<T>> {
        #[cfg(feature = "parking-lot")]
        {
            std::mem::replace(&mut *self.inner.write(), value)
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            let mut guard = self
                .inner
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            std::mem::replace(&mut *guard, value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_then_load_returns_same_allocation() {
        let cell = SlotCell::<str>::empty();
        assert!(cell.load().is_none());

        let value: Arc<str> = Arc::from("gateway");
        cell.store(value.clone());
        let loaded = cell.load().unwrap();
        assert!(Arc::ptr_eq(&loaded, &value));

        cell.clear();
        assert!(cell.load().is_none());
        assert_eq!(Arc::strong_count(&value), 1);
    }

    #[cfg(not(feature = "parking-lot"))]
    #[test]
    fn poisoned_lock_is_read_through() {
        let cell = SlotCell::<str>::empty();
        cell.store(Arc::from("before"));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = cell.inner.write().unwrap();
            panic!("writer died");
        }));
        assert!(result.is_err());
        assert!(cell.inner.is_poisoned());

        assert_eq!(cell.load().as_deref(), Some("before"));
        cell.store(Arc::from("after"));
        assert_eq!(cell.load().as_deref(), Some("after"));
    }
}
