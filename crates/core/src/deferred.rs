//! Deferred property cells
//!
//! A [`Deferred<T>`] field is resolved from the host on first read instead
//! of at construction. The cell is bound by the lazy factory to a
//! [`DeferredSource`]; the first `get()` fetches the raw value, coerces it
//! and stores it. Later reads never touch the host again.
//!
//! # Thread Safety
//!
//! The value lives in a `OnceLock`, so concurrent first reads of the same
//! cell run the loader once; the other readers block until it finishes and
//! then observe the same value.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, OnceLock, Weak};

use tracing::{trace, warn};
use vault_sdk::RawValue;

use crate::coerce::FromRaw;
use crate::context::VaultContext;
use crate::error::CoercionError;

/// Where a deferred property gets its raw value from
#[derive(Clone)]
pub struct DeferredSource {
    property: &'static str,
    fetch: Arc<dyn Fn() -> RawValue + Send + Sync>,
    scope: Weak<VaultContext>,
}

impl DeferredSource {
    /// Create a source for `property`
    ///
    /// The scope is held weakly: cached instances must not keep their own
    /// retrieval scope alive.
    pub fn new<F>(property: &'static str, fetch: F, scope: Weak<VaultContext>) -> Self
    where
        F: Fn() -> RawValue + Send + Sync + 'static,
    {
        Self {
            property,
            fetch: Arc::new(fetch),
            scope,
        }
    }
}

impl fmt::Debug for DeferredSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredSource")
            .field("property", &self.property)
            .field("scope_alive", &(self.scope.strong_count() > 0))
            .finish()
    }
}

/// A property value resolved on first read
///
/// An unbound cell (not produced by the lazy factory) reads as `T::default()`.
pub struct Deferred<T> {
    cell: OnceLock<T>,
    source: Option<DeferredSource>,
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self {
            cell: OnceLock::new(),
            source: None,
        }
    }
}

impl<T> Deferred<T> {
    /// A cell that already holds `value`
    pub fn resolved(value: T) -> Self {
        Self {
            cell: OnceLock::from(value),
            source: None,
        }
    }

    /// Attach a source, discarding any value read so far
    pub fn bind(&mut self, source: DeferredSource) {
        self.cell = OnceLock::new();
        self.source = Some(source);
    }

    /// Check if the value has been resolved
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Check if a source is attached
    pub fn is_bound(&self) -> bool {
        self.source.is_some()
    }
}

impl<T: FromRaw + Default> Deferred<T> {
    /// Read the value, resolving it on first call
    pub fn get(&self) -> &T {
        self.cell.get_or_init(|| self.load())
    }

    /// Consume the cell, resolving it if needed
    pub fn into_inner(self) -> T {
        self.get();
        self.cell.into_inner().unwrap_or_default()
    }

    fn load(&self) -> T {
        let Some(source) = &self.source else {
            return T::default();
        };

        let Some(scope) = source.scope.upgrade() else {
            warn!(
                "Scope ended before deferred property {} was read; using default",
                source.property
            );
            return T::default();
        };

        trace!("Resolving deferred property {}", source.property);
        let raw = (source.fetch)();

        match T::from_raw(raw, &scope) {
            Ok(value) => value,
            Err(CoercionError::Empty { .. }) => T::default(),
            Err(e) => {
                warn!("Deferred property {}: {}", source.property, e);
                T::default()
            }
        }
    }
}

impl<T: FromRaw + Default> Deref for Deferred<T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.get()
    }
}

impl<T: Clone> Clone for Deferred<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            source: self.source.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.get() {
            Some(value) => f.debug_tuple("Deferred").field(value).finish(),
            None if self.source.is_some() => f.write_str("Deferred(<unresolved>)"),
            None => f.write_str("Deferred(<unbound>)"),
        }
    }
}

impl<T: PartialEq + FromRaw + Default> PartialEq for Deferred<T> {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::thread;

    use crate::memory::MemoryContentSource;

    fn scope() -> Arc<VaultContext> {
        VaultContext::new(Arc::new(MemoryContentSource::new()))
    }

    fn counting_source(
        scope: &Arc<VaultContext>,
        value: &'static str,
    ) -> (DeferredSource, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let source = DeferredSource::new(
            "button_text",
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
                RawValue::from(value)
            },
            Arc::downgrade(scope),
        );
        (source, calls)
    }

    #[test]
    fn test_unbound_reads_default() {
        let cell: Deferred<String> = Deferred::default();
        assert!(!cell.is_bound());
        assert_eq!(cell.get(), "");
        assert!(cell.is_resolved());
    }

    #[test]
    fn test_resolved_value() {
        let cell = Deferred::resolved(42i32);
        assert!(cell.is_resolved());
        assert_eq!(*cell, 42);
    }

    #[test]
    fn test_fetches_once() {
        let scope = scope();
        let (source, calls) = counting_source(&scope, "Read more");

        let mut cell: Deferred<String> = Deferred::default();
        cell.bind(source);
        assert!(!cell.is_resolved());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(cell.get(), "Read more");
        assert_eq!(cell.as_str(), "Read more");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_read_fetches_once() {
        const THREADS: usize = 8;

        let scope = scope();
        let (source, calls) = counting_source(&scope, "7");
        let mut cell: Deferred<i32> = Deferred::default();
        cell.bind(source);

        let cell = Arc::new(cell);
        let barrier = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let cell = Arc::clone(&cell);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    *cell.get()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_coercion_failure_reads_default() {
        let scope = scope();
        let (source, _) = counting_source(&scope, "not a number");

        let mut cell: Deferred<i32> = Deferred::default();
        cell.bind(source);
        assert_eq!(*cell.get(), 0);
    }

    #[test]
    fn test_dropped_scope_reads_default() {
        let scope = scope();
        let (source, calls) = counting_source(&scope, "Read more");
        let mut cell: Deferred<String> = Deferred::default();
        cell.bind(source);

        drop(scope);
        assert_eq!(cell.into_inner(), "");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_rebind_discards_value() {
        let scope = scope();
        let (first, _) = counting_source(&scope, "one");
        let (second, _) = counting_source(&scope, "two");

        let mut cell: Deferred<String> = Deferred::default();
        cell.bind(first);
        assert_eq!(cell.get(), "one");

        cell.bind(second);
        assert!(!cell.is_resolved());
        assert_eq!(cell.get(), "two");
    }
}
