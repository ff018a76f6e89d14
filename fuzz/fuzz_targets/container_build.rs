#![no_main]

use ferrous_beans::{
    AmbiguityPolicy, BeanContainer, Component, ComponentRegistry, ComponentType, ContainerError,
    ContainerOptions, Dependency, Inject,
};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

trait Handler: Send + Sync {}

#[derive(Default)]
struct Alpha;
impl Component for Alpha {}
impl Handler for Alpha {}

#[derive(Default)]
struct Beta;
impl Component for Beta {}
impl Handler for Beta {}

#[derive(Default)]
struct Router {
    handler: Inject<dyn Handler>,
    audit: Inject<Audit>,
}

impl Component for Router {
    fn dependencies(&self) -> Vec<Dependency<'_>> {
        vec![
            Dependency::new("handler", &self.handler),
            Dependency::new("audit", &self.audit),
        ]
    }
}

#[derive(Default)]
struct Audit {
    router: Inject<Router>,
}

impl Component for Audit {
    fn dependencies(&self) -> Vec<Dependency<'_>> {
        vec![Dependency::new("router", &self.router)]
    }
}

struct Broken;
impl Component for Broken {}

fn component(byte: u8) -> ComponentType {
    match byte % 5 {
        0 => ComponentType::define::<Alpha>()
            .provides::<dyn Handler>(|c| c as Arc<dyn Handler>)
            .build(),
        1 => ComponentType::define::<Beta>()
            .provides::<dyn Handler>(|c| c as Arc<dyn Handler>)
            .build(),
        2 => ComponentType::of::<Router>(),
        3 => ComponentType::of::<Audit>(),
        _ => ComponentType::with_fallible_constructor(|| -> Result<Broken, std::fmt::Error> {
            Err(std::fmt::Error)
        })
        .build(),
    }
}

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let options = if data[0] % 2 == 0 {
        ContainerOptions::default()
    } else {
        ContainerOptions::default().ambiguous_slots(AmbiguityPolicy::Reject)
    };

    let mut registry = ComponentRegistry::new();
    registry.with_options(options);
    for byte in &data[1..] {
        registry.register(component(*byte));
    }

    let container = match BeanContainer::build(registry) {
        Ok(container) => container,
        Err(ContainerError::Configuration(_)) => return,
        Err(other) => panic!("unexpected build error: {}", other),
    };

    // one bean per distinct successfully built type
    assert!(container.len() <= 4);

    let built = container.report().wiring.assignments();
    assert_eq!(container.rewire().assignments(), built);

    match container.get_bean::<dyn Handler>() {
        Ok(_) | Err(ContainerError::NoSuchBean { .. }) | Err(ContainerError::AmbiguousBean { .. }) => {}
        Err(other) => panic!("unexpected lookup error: {}", other),
    }
});
