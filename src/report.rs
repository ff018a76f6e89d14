//! Structured build diagnostics.

use std::time::Duration;

use crate::error::{InjectionFailure, InstantiationFailure};
use crate::instantiate::BeanId;
use crate::key::Key;

/// A slot the wiring pass filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WiredSlot {
    pub bean: BeanId,
    pub component: Key,
    pub slot: &'static str,
    pub required: Key,
    pub target: BeanId,
    pub target_name: String,
}

/// A slot no bean matched; it keeps its previous value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedSlot {
    pub bean: BeanId,
    pub component: Key,
    pub slot: &'static str,
    pub required: Key,
    pub qualifier: Option<&'static str>,
}

/// Outcome of one wiring pass.
#[derive(Debug, Clone, Default)]
pub struct WiringReport {
    pub wired: Vec<WiredSlot>,
    pub unresolved: Vec<UnresolvedSlot>,
    pub failures: Vec<InjectionFailure>,
}

impl WiringReport {
    /// The bean wired into `bean.slot`, if any.
    pub fn target_of(&self, bean: BeanId, slot: &str) -> Option<BeanId> {
        self.wired
            .iter()
            .find(|w| w.bean == bean && w.slot == slot)
            .map(|w| w.target)
    }

    /// `(bean, slot, target)` triples, for comparing passes.
    pub fn assignments(&self) -> Vec<(BeanId, &'static str, BeanId)> {
        self.wired.iter().map(|w| (w.bean, w.slot, w.target)).collect()
    }
}

/// Everything that happened during a container build.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{BeanContainer, Component, ComponentRegistry, ComponentType};
///
/// #[derive(Default)]
/// struct LoggerUtil;
/// impl Component for LoggerUtil {}
///
/// let mut registry = ComponentRegistry::new();
/// registry.register(ComponentType::of::<LoggerUtil>());
/// let container = BeanContainer::build(registry).unwrap();
///
/// let report = container.report();
/// assert!(report.is_clean());
/// assert_eq!(report.summary().beans, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// Components that were instantiated, in registration order
    pub instantiated: Vec<Key>,
    pub instantiation_failures: Vec<InstantiationFailure>,
    pub wiring: WiringReport,
    pub duration: Duration,
}

impl BuildReport {
    /// True when every component was built and every filled-or-attempted slot
    /// succeeded. Unresolved slots do not count as failures.
    pub fn is_clean(&self) -> bool {
        self.instantiation_failures.is_empty() && self.wiring.failures.is_empty()
    }

    pub fn summary(&self) -> BuildSummary {
        BuildSummary {
            beans: self.instantiated.len(),
            instantiation_failures: self.instantiation_failures.len(),
            wired: self.wiring.wired.len(),
            unresolved: self.wiring.unresolved.len(),
            injection_failures: self.wiring.failures.len(),
            duration: self.duration,
        }
    }
}

/// Counts from a [`BuildReport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildSummary {
    pub beans: usize,
    pub instantiation_failures: usize,
    pub wired: usize,
    pub unresolved: usize,
    pub injection_failures: usize,
    pub duration: Duration,
}
