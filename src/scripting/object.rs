//! Host objects shared with scripts by reference.
//!
//! The host keeps sole ownership through [`HostObject`]; scripts only ever
//! hold an [`ObjectView`], a weak handle. Scripts may copy views into their
//! own variables and outlive the host object. When that happens every access
//! through the view raises a script fault instead of touching freed memory.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rhai::EvalAltResult;

/// A host-owned object that can be injected into the script namespace.
pub struct HostObject<T> {
    inner: Arc<RwLock<T>>,
}

impl<T> HostObject<T> {
    /// Share `value` with scripts.
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
        }
    }

    /// Lock for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.inner.read()
    }

    /// Lock for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.inner.write()
    }

    /// A non-owning handle for the script side.
    pub fn view(&self) -> ObjectView<T> {
        ObjectView {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Number of views handed out that have not been dropped yet.
    pub fn view_count(&self) -> usize {
        Arc::weak_count(&self.inner)
    }

    /// Consume the owner. Outstanding views go dead.
    ///
    /// Returns `None` only while a view is mid-access on another thread.
    pub fn into_inner(self) -> Option<T> {
        Arc::into_inner(self.inner).map(RwLock::into_inner)
    }
}

impl<T: Default> Default for HostObject<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for HostObject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostObject")
            .field("value", &*self.inner.read())
            .field("views", &Arc::weak_count(&self.inner))
            .finish()
    }
}

/// Script-side handle to a [`HostObject`].
pub struct ObjectView<T> {
    inner: Weak<RwLock<T>>,
}

impl<T> Clone for ObjectView<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T> fmt::Debug for ObjectView<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectView")
            .field("type", &short_type_name::<T>())
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl<T> ObjectView<T> {
    /// True while the host object still exists.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Run `f` with shared access, or fault if the owner is gone.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, Box<EvalAltResult>> {
        let strong = self.upgrade()?;
        let guard = strong.read();
        Ok(f(&guard))
    }

    /// Run `f` with exclusive access, or fault if the owner is gone.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> Result<R, Box<EvalAltResult>> {
        let strong = self.upgrade()?;
        let mut guard = strong.write();
        Ok(f(&mut guard))
    }

    fn upgrade(&self) -> Result<Arc<RwLock<T>>, Box<EvalAltResult>> {
        self.inner.upgrade().ok_or_else(|| {
            format!(
                "object of type '{}' is no longer alive",
                short_type_name::<T>()
            )
            .into()
        })
    }
}

/// Last path segment of the Rust type name.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Counter {
        hits: u32,
    }

    #[test]
    fn views_share_the_owner_state() {
        let owner = HostObject::new(Counter::default());
        let view = owner.view();
        let copy = view.clone();

        view.with_mut(|c| c.hits += 1).unwrap();
        copy.with_mut(|c| c.hits += 1).unwrap();

        assert_eq!(owner.read().hits, 2);
        assert_eq!(owner.view_count(), 2);
    }

    #[test]
    fn dead_view_faults_instead_of_dangling() {
        let owner = HostObject::new(Counter::default());
        let view = owner.view();
        drop(owner);

        assert!(!view.is_alive());
        let err = view.with(|c| c.hits).unwrap_err();
        assert!(err.to_string().contains("object of type 'Counter' is no longer alive"));
    }

    #[test]
    fn into_inner_returns_value() {
        let owner = HostObject::new(Counter { hits: 7 });
        let _view = owner.view();
        assert_eq!(owner.into_inner().map(|c| c.hits), Some(7));
    }

    #[test]
    fn short_type_name_strips_paths_and_generics() {
        assert_eq!(short_type_name::<Counter>(), "Counter");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
    }
}
