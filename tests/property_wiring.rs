/// Property-based tests for building and wiring
///
/// These tests build containers from arbitrary subsets of a fixed set of
/// component types, in arbitrary order, and check the wiring invariants.

use ferrous_beans::{
    BeanContainer, Component, ComponentRegistry, ComponentType, ContainerError, Dependency, Inject,
};
use proptest::prelude::*;
use std::sync::Arc;

trait Store: Send + Sync {}

#[derive(Default)]
struct DiskStore;
impl Component for DiskStore {}
impl Store for DiskStore {}

#[derive(Default)]
struct MemoryStore;
impl Component for MemoryStore {}
impl Store for MemoryStore {}

#[derive(Default)]
struct Indexer {
    store: Inject<dyn Store>,
}

impl Component for Indexer {
    fn dependencies(&self) -> Vec<Dependency<'_>> {
        vec![Dependency::new("store", &self.store)]
    }
}

#[derive(Default)]
struct Search {
    indexer: Inject<Indexer>,
    store: Inject<dyn Store>,
}

impl Component for Search {
    fn dependencies(&self) -> Vec<Dependency<'_>> {
        vec![
            Dependency::new("indexer", &self.indexer),
            Dependency::new("store", &self.store),
        ]
    }
}

#[derive(Default)]
struct Metrics;
impl Component for Metrics {}

const KINDS: usize = 5;

fn component(kind: usize) -> ComponentType {
    match kind {
        0 => ComponentType::define::<DiskStore>()
            .provides::<dyn Store>(|c| c as Arc<dyn Store>)
            .build(),
        1 => ComponentType::define::<MemoryStore>()
            .provides::<dyn Store>(|c| c as Arc<dyn Store>)
            .build(),
        2 => ComponentType::of::<Indexer>(),
        3 => ComponentType::of::<Search>(),
        _ => ComponentType::of::<Metrics>(),
    }
}

fn build(order: &[usize]) -> BeanContainer {
    let registry = ComponentRegistry::from_types(order.iter().map(|k| component(*k))).unwrap();
    BeanContainer::build(registry).unwrap()
}

fn distinct(order: &[usize]) -> Vec<usize> {
    let mut seen = Vec::new();
    for kind in order {
        if !seen.contains(kind) {
            seen.push(*kind);
        }
    }
    seen
}

fn same_bean<A: ?Sized, B: ?Sized>(a: &Arc<A>, b: &Arc<B>) -> bool {
    Arc::as_ptr(a) as *const u8 == Arc::as_ptr(b) as *const u8
}

fn first_store(container: &BeanContainer, kinds: &[usize]) -> Option<Arc<dyn Store>> {
    let first = kinds.iter().find(|k| **k <= 1)?;
    container.get_all::<dyn Store>().ok()?.into_iter().next().filter(|store| {
        let concrete_first = match first {
            0 => container.get_bean::<DiskStore>().map(|b| same_bean(&b, store)),
            _ => container.get_bean::<MemoryStore>().map(|b| same_bean(&b, store)),
        };
        concrete_first.unwrap_or(false)
    })
}

proptest! {
    #[test]
    fn one_bean_per_distinct_type(order in prop::collection::vec(0..KINDS, 1..12)) {
        let container = build(&order);
        let kinds = distinct(&order);

        prop_assert_eq!(container.len(), kinds.len());
        prop_assert_eq!(container.contains::<Metrics>(), kinds.contains(&4));
        prop_assert_eq!(container.contains::<Indexer>(), kinds.contains(&2));
        prop_assert!(container.report().is_clean());
    }
}

proptest! {
    #[test]
    fn slots_hold_the_first_registered_candidate(order in prop::collection::vec(0..KINDS, 1..12)) {
        let container = build(&order);
        let kinds = distinct(&order);
        let expected_store = first_store(&container, &kinds);

        if let Ok(indexer) = container.get_bean::<Indexer>() {
            match (&expected_store, indexer.store.get()) {
                (Some(expected), Some(actual)) => prop_assert!(same_bean(expected, &actual)),
                (None, None) => {}
                _ => prop_assert!(false, "indexer store slot does not match registration"),
            }
        }

        if let Ok(search) = container.get_bean::<Search>() {
            match container.get_bean::<Indexer>() {
                Ok(indexer) => prop_assert!(same_bean(&indexer, &search.indexer.get().unwrap())),
                Err(_) => prop_assert!(!search.indexer.is_wired()),
            }
        }
    }
}

proptest! {
    #[test]
    fn lookups_never_guess(order in prop::collection::vec(0..KINDS, 1..12)) {
        let container = build(&order);
        let kinds = distinct(&order);
        let stores = kinds.iter().filter(|k| **k <= 1).count();

        match (stores, container.get_bean::<dyn Store>()) {
            (0, Err(ContainerError::NoSuchBean { .. })) => {}
            (1, Ok(_)) => {}
            (2, Err(ContainerError::AmbiguousBean { candidates, .. })) => {
                prop_assert_eq!(candidates.len(), 2)
            }
            (n, other) => prop_assert!(false, "{} stores gave {:?}", n, other.map(|_| ())),
        }
    }
}

proptest! {
    #[test]
    fn rewiring_is_idempotent(order in prop::collection::vec(0..KINDS, 1..12)) {
        let container = build(&order);
        let built = container.report().wiring.assignments();
        prop_assert_eq!(container.rewire().assignments(), built.clone());
        prop_assert_eq!(container.rewire().assignments(), built);
    }
}
