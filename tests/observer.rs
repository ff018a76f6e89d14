/// Observer integration tests
///
/// Observers registered on the registry receive every build event in order
/// and see the events of later rewiring passes too.

use ferrous_beans::{
    BeanContainer, BuildSummary, Component, ComponentRegistry, ComponentType, ContainerObserver,
    Dependency, Inject, InjectionFailure, InstantiationFailure, Key, MetricsObserver,
    TracingObserver, UnresolvedSlot, WiredSlot,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct Recorder {
    events: Mutex<Vec<String>>,
}

impl Recorder {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ContainerObserver for Recorder {
    fn instantiated(&self, key: &Key, _duration: Duration) {
        self.push(format!("new {}", key.short_name()));
    }

    fn instantiation_failed(&self, failure: &InstantiationFailure) {
        self.push(format!("failed {}", failure.component.rsplit("::").next().unwrap_or("")));
    }

    fn injected(&self, wired: &WiredSlot) {
        self.push(format!("{}.{} <- {}", wired.component.short_name(), wired.slot, wired.target_name));
    }

    fn unresolved(&self, slot: &UnresolvedSlot) {
        self.push(format!("{}.{} unresolved", slot.component.short_name(), slot.slot));
    }

    fn injection_failed(&self, failure: &InjectionFailure) {
        self.push(format!("{} failed", failure.slot));
    }

    fn built(&self, summary: &BuildSummary) {
        self.push(format!("built {} beans", summary.beans));
    }
}

#[derive(Default)]
struct AuditLog;
impl Component for AuditLog {}

struct Mailer;
impl Component for Mailer {}

#[derive(Default)]
struct SignupService {
    audit: Inject<AuditLog>,
    mailer: Inject<Mailer>,
}

impl Component for SignupService {
    fn dependencies(&self) -> Vec<Dependency<'_>> {
        vec![
            Dependency::new("audit", &self.audit),
            Dependency::new("mailer", &self.mailer),
        ]
    }
}

fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry
        .register(ComponentType::of::<SignupService>())
        .register(ComponentType::of::<AuditLog>())
        .register(
            ComponentType::with_fallible_constructor(|| -> Result<Mailer, std::io::Error> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "smtp down"))
            })
            .build(),
        );
    registry
}

#[test]
fn test_events_arrive_in_build_order() {
    let recorder = Arc::new(Recorder::default());
    let mut registry = registry();
    registry.add_observer(recorder.clone());

    let container = BeanContainer::build(registry).unwrap();
    assert!(container.get_bean::<AuditLog>().is_ok());

    let events = recorder.events();
    assert_eq!(events.len(), 6);
    assert_eq!(events[0], "new SignupService");
    assert_eq!(events[1], "new AuditLog");
    assert_eq!(events[2], "failed Mailer");
    assert!(events[3].starts_with("SignupService.audit <- "));
    assert_eq!(events[4], "SignupService.mailer unresolved");
    assert_eq!(events[5], "built 2 beans");
}

#[test]
fn test_every_observer_is_notified() {
    let first = Arc::new(MetricsObserver::new());
    let second = Arc::new(MetricsObserver::new());
    let mut registry = registry();
    registry
        .add_observer(first.clone())
        .add_observer(second.clone())
        .add_observer(Arc::new(TracingObserver::with_name("signup")));

    BeanContainer::build(registry).unwrap();

    for metrics in [&first, &second] {
        assert_eq!(metrics.instantiated_count(), 2);
        assert_eq!(metrics.instantiation_failure_count(), 1);
        assert_eq!(metrics.injected_count(), 1);
        assert_eq!(metrics.unresolved_count(), 1);
        assert_eq!(metrics.injection_failure_count(), 0);
    }
}

#[test]
fn test_rewire_notifies_build_observers() {
    let metrics = Arc::new(MetricsObserver::new());
    let mut registry = registry();
    registry.add_observer(metrics.clone());

    let container = BeanContainer::build(registry).unwrap();
    metrics.reset();
    assert_eq!(metrics.injected_count(), 0);

    let wiring = container.rewire();
    assert_eq!(wiring.wired.len(), 1);
    assert_eq!(metrics.injected_count(), 1);
    assert_eq!(metrics.unresolved_count(), 1);
    // instantiation happens once per build
    assert_eq!(metrics.instantiated_count(), 0);
}

#[test]
fn test_build_without_observers_still_reports() {
    let container = BeanContainer::build(registry()).unwrap();
    let summary = container.report().summary();

    assert_eq!(summary.beans, 2);
    assert_eq!(summary.wired, 1);
    assert_eq!(summary.unresolved, 1);
    assert_eq!(summary.instantiation_failures, 1);
}
