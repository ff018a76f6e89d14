/// Concurrent access integration tests
///
/// A built container is shared across threads; lookups must always return
/// the same bean instances and the wiring must be visible from every thread.

use ferrous_beans::{BeanContainer, Component, ComponentRegistry, ComponentType, Dependency, Inject};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[derive(Default)]
pub struct CounterService {
    count: AtomicU32,
}

impl CounterService {
    pub fn increment(&self) -> u32 {
        self.count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn get_count(&self) -> u32 {
        self.count.load(Ordering::SeqCst)
    }
}

impl Component for CounterService {}

#[derive(Default)]
pub struct RequestHandler {
    counter: Inject<CounterService>,
}

impl RequestHandler {
    pub fn handle(&self) -> u32 {
        self.counter.get().map(|c| c.increment()).unwrap_or(0)
    }
}

impl Component for RequestHandler {
    fn dependencies(&self) -> Vec<Dependency<'_>> {
        vec![Dependency::new("counter", &self.counter)]
    }
}

fn container() -> BeanContainer {
    let mut registry = ComponentRegistry::new();
    registry
        .register(ComponentType::of::<RequestHandler>())
        .register(ComponentType::of::<CounterService>());
    BeanContainer::build(registry).unwrap()
}

#[test]
fn test_concurrent_lookups_return_same_instance() {
    let container = container();
    let expected = container.get_bean::<CounterService>().unwrap();

    crossbeam_utils::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|_| {
                for _ in 0..100 {
                    let counter = container.get_bean::<CounterService>().unwrap();
                    assert!(Arc::ptr_eq(&counter, &expected));
                }
            });
        }
    })
    .unwrap();
}

#[test]
fn test_wired_dependency_is_shared_across_threads() {
    const THREADS: u32 = 10;
    const CALLS: u32 = 50;

    let container = container();
    let barrier = Arc::new(Barrier::new(THREADS as usize));
    let mut handles = Vec::new();

    for _ in 0..THREADS {
        let container = container.clone();
        let barrier = barrier.clone();
        handles.push(thread::spawn(move || {
            barrier.wait();
            let handler = container.get_bean::<RequestHandler>().unwrap();
            for _ in 0..CALLS {
                handler.handle();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let counter = container.get_bean::<CounterService>().unwrap();
    assert_eq!(counter.get_count(), THREADS * CALLS);
}

#[test]
fn test_rewire_while_reading() {
    let container = container();
    let handler = container.get_bean::<RequestHandler>().unwrap();
    let counter = container.get_bean::<CounterService>().unwrap();

    crossbeam_utils::thread::scope(|s| {
        s.spawn(|_| {
            for _ in 0..50 {
                container.rewire();
            }
        });
        for _ in 0..4 {
            s.spawn(|_| {
                for _ in 0..200 {
                    // the slot is reassigned to the same bean, never cleared
                    assert!(Arc::ptr_eq(&handler.counter.get().unwrap(), &counter));
                }
            });
        }
    })
    .unwrap();
}
