//! Diagnostic observers for container builds.
//!
//! The container never logs on its own. Build events go to the observers
//! registered on the [`ComponentRegistry`](crate::ComponentRegistry) and are
//! also collected in the returned [`BuildReport`](crate::BuildReport).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{InjectionFailure, InstantiationFailure};
use crate::key::Key;
use crate::report::{BuildSummary, UnresolvedSlot, WiredSlot};

/// Observer trait for container build events.
///
/// Calls are made synchronously on the building thread, so keep
/// implementations lightweight.
///
/// # Examples
///
/// ```
/// use ferrous_beans::{
///     BeanContainer, Component, ComponentRegistry, ComponentType, ContainerObserver,
///     InjectionFailure, InstantiationFailure, Key,
/// };
/// use std::sync::{Arc, Mutex};
/// use std::time::Duration;
///
/// #[derive(Default)]
/// struct Recorder(Mutex<Vec<String>>);
///
/// impl ContainerObserver for Recorder {
///     fn instantiated(&self, key: &Key, _duration: Duration) {
///         self.0.lock().unwrap().push(key.short_name().to_string());
///     }
///
///     fn instantiation_failed(&self, failure: &InstantiationFailure) {
///         self.0.lock().unwrap().push(failure.to_string());
///     }
///
///     fn injection_failed(&self, failure: &InjectionFailure) {
///         self.0.lock().unwrap().push(failure.to_string());
///     }
/// }
///
/// #[derive(Default)]
/// struct LoggerUtil;
/// impl Component for LoggerUtil {}
///
/// let recorder = Arc::new(Recorder::default());
/// let mut registry = ComponentRegistry::new();
/// registry.register(ComponentType::of::<LoggerUtil>());
/// registry.add_observer(recorder.clone());
///
/// BeanContainer::build(registry).unwrap();
/// assert_eq!(*recorder.0.lock().unwrap(), vec!["LoggerUtil".to_string()]);
/// ```
pub trait ContainerObserver: Send + Sync {
    /// A component was constructed.
    fn instantiated(&self, key: &Key, duration: Duration);

    /// A component could not be constructed.
    fn instantiation_failed(&self, failure: &InstantiationFailure);

    /// A slot was filled.
    fn injected(&self, wired: &WiredSlot) {
        let _ = wired;
    }

    /// No bean matched a slot.
    fn unresolved(&self, slot: &UnresolvedSlot) {
        let _ = slot;
    }

    /// A slot could not be filled although candidates existed.
    fn injection_failed(&self, failure: &InjectionFailure);

    /// The build succeeded.
    fn built(&self, summary: &BuildSummary) {
        let _ = summary;
    }
}

/// Container for registered observers.
///
/// Minimal overhead when no observers are registered.
#[derive(Default, Clone)]
pub(crate) struct Observers {
    observers: Vec<Arc<dyn ContainerObserver>>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, observer: Arc<dyn ContainerObserver>) {
        self.observers.push(observer);
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }

    #[inline]
    pub(crate) fn instantiated(&self, key: &Key, duration: Duration) {
        for observer in &self.observers {
            observer.instantiated(key, duration);
        }
    }

    #[inline]
    pub(crate) fn instantiation_failed(&self, failure: &InstantiationFailure) {
        for observer in &self.observers {
            observer.instantiation_failed(failure);
        }
    }

    #[inline]
    pub(crate) fn injected(&self, wired: &WiredSlot) {
        for observer in &self.observers {
            observer.injected(wired);
        }
    }

    #[inline]
    pub(crate) fn unresolved(&self, slot: &UnresolvedSlot) {
        for observer in &self.observers {
            observer.unresolved(slot);
        }
    }

    #[inline]
    pub(crate) fn injection_failed(&self, failure: &InjectionFailure) {
        for observer in &self.observers {
            observer.injection_failed(failure);
        }
    }

    pub(crate) fn built(&self, summary: &BuildSummary) {
        for observer in &self.observers {
            observer.built(summary);
        }
    }
}

/// Built-in observer that emits `tracing` events.
///
/// Instantiations and slot assignments are `debug`, failures `warn`, the build
/// summary `info`. Install any `tracing` subscriber to see them.
///
/// # Examples
///
/// ```
/// use ferrous_beans::{ComponentRegistry, TracingObserver};
/// use std::sync::Arc;
///
/// let mut registry = ComponentRegistry::new();
/// registry.add_observer(Arc::new(TracingObserver::with_name("orders")));
/// ```
pub struct TracingObserver {
    name: String,
}

impl TracingObserver {
    pub fn new() -> Self {
        Self {
            name: "ferrous-beans".to_string(),
        }
    }

    /// Creates an observer whose events carry `container = name`.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerObserver for TracingObserver {
    fn instantiated(&self, key: &Key, duration: Duration) {
        tracing::debug!(
            container = %self.name,
            component = key.display_name(),
            elapsed_us = duration.as_micros() as u64,
            "instantiated bean"
        );
    }

    fn instantiation_failed(&self, failure: &InstantiationFailure) {
        tracing::warn!(
            container = %self.name,
            component = failure.component,
            cause = %failure.cause,
            "bean instantiation failed, excluding component"
        );
    }

    fn injected(&self, wired: &WiredSlot) {
        tracing::debug!(
            container = %self.name,
            component = wired.component.display_name(),
            slot = wired.slot,
            target = %wired.target_name,
            "injected dependency"
        );
    }

    fn unresolved(&self, slot: &UnresolvedSlot) {
        tracing::debug!(
            container = %self.name,
            component = slot.component.display_name(),
            slot = slot.slot,
            required = slot.required.display_name(),
            "no candidate for slot, leaving it empty"
        );
    }

    fn injection_failed(&self, failure: &InjectionFailure) {
        tracing::warn!(
            container = %self.name,
            component = failure.component,
            slot = failure.slot,
            cause = %failure.cause,
            "dependency injection failed, slot left unchanged"
        );
    }

    fn built(&self, summary: &BuildSummary) {
        tracing::info!(
            container = %self.name,
            beans = summary.beans,
            wired = summary.wired,
            unresolved = summary.unresolved,
            failures = summary.instantiation_failures + summary.injection_failures,
            elapsed_us = summary.duration.as_micros() as u64,
            "container built"
        );
    }
}

/// Observer that counts build events.
#[derive(Default)]
pub struct MetricsObserver {
    instantiated: AtomicU64,
    instantiation_failures: AtomicU64,
    injected: AtomicU64,
    unresolved: AtomicU64,
    injection_failures: AtomicU64,
    instantiation_nanos: AtomicU64,
}

impl MetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instantiated_count(&self) -> u64 {
        self.instantiated.load(Ordering::Relaxed)
    }

    pub fn instantiation_failure_count(&self) -> u64 {
        self.instantiation_failures.load(Ordering::Relaxed)
    }

    pub fn injected_count(&self) -> u64 {
        self.injected.load(Ordering::Relaxed)
    }

    pub fn unresolved_count(&self) -> u64 {
        self.unresolved.load(Ordering::Relaxed)
    }

    pub fn injection_failure_count(&self) -> u64 {
        self.injection_failures.load(Ordering::Relaxed)
    }

    /// Total time spent in constructors.
    pub fn total_instantiation_time(&self) -> Duration {
        Duration::from_nanos(self.instantiation_nanos.load(Ordering::Relaxed))
    }

    /// Resets all counters.
    pub fn reset(&self) {
        for counter in [
            &self.instantiated,
            &self.instantiation_failures,
            &self.injected,
            &self.unresolved,
            &self.injection_failures,
            &self.instantiation_nanos,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

impl ContainerObserver for MetricsObserver {
    fn instantiated(&self, _key: &Key, duration: Duration) {
        self.instantiated.fetch_add(1, Ordering::Relaxed);
        self.instantiation_nanos
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
    }

    fn instantiation_failed(&self, _failure: &InstantiationFailure) {
        self.instantiation_failures.fetch_add(1, Ordering::Relaxed);
    }

    fn injected(&self, _wired: &WiredSlot) {
        self.injected.fetch_add(1, Ordering::Relaxed);
    }

    fn unresolved(&self, _slot: &UnresolvedSlot) {
        self.unresolved.fetch_add(1, Ordering::Relaxed);
    }

    fn injection_failed(&self, _failure: &InjectionFailure) {
        self.injection_failures.fetch_add(1, Ordering::Relaxed);
    }
}
