//! The bean container: builds, wires and serves beans.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::arena::BeanArena;
use crate::collection::ComponentRegistry;
use crate::config::{ContainerOptions, FailurePolicy};
use crate::descriptors::BeanDescriptor;
use crate::error::{BeanResult, ContainerError};
use crate::instantiate::{Bean, BeanId, BeanInstantiator};
use crate::key::Key;
use crate::observer::Observers;
use crate::report::{BuildReport, WiringReport};
use crate::resolver::DependencyResolver;

/// A built, wired and frozen set of beans.
///
/// Holds exactly one bean per successfully instantiated component type.
/// Cloning is cheap and every clone shares the same beans. Lookups are pure
/// and safe from any thread.
///
/// Wiring is never undone implicitly: beans handed out by lookups keep their
/// slots after the last handle is dropped. Beans that reference each other
/// in a cycle stay alive until [`shutdown`](Self::shutdown) is called.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{BeanContainer, Component, ComponentRegistry, ComponentType, Dependency, Inject};
/// use std::sync::Arc;
///
/// pub trait PaymentGateway: Send + Sync {
///     fn charge(&self, cents: u64) -> bool;
/// }
///
/// #[derive(Default)]
/// pub struct StripeGateway;
/// impl Component for StripeGateway {}
/// impl PaymentGateway for StripeGateway {
///     fn charge(&self, cents: u64) -> bool {
///         cents > 0
///     }
/// }
///
/// #[derive(Default)]
/// pub struct OrderService {
///     gateway: Inject<dyn PaymentGateway>,
/// }
///
/// impl Component for OrderService {
///     fn dependencies(&self) -> Vec<Dependency<'_>> {
///         vec![Dependency::new("gateway", &self.gateway)]
///     }
/// }
///
/// impl OrderService {
///     pub fn checkout(&self, cents: u64) -> bool {
///         self.gateway.get().map_or(false, |g| g.charge(cents))
///     }
/// }
///
/// let mut registry = ComponentRegistry::new();
/// registry
///     .register(ComponentType::of::<OrderService>())
///     .register(
///         ComponentType::define::<StripeGateway>()
///             .provides::<dyn PaymentGateway>(|c| c as Arc<dyn PaymentGateway>),
///     );
///
/// let container = BeanContainer::build(registry).unwrap();
/// let orders = container.get_bean::<OrderService>().unwrap();
/// assert!(orders.checkout(1200));
///
/// let gateway = container.get_bean::<dyn PaymentGateway>().unwrap();
/// assert!(Arc::ptr_eq(&gateway, &orders.gateway.get().unwrap()));
/// ```
#[derive(Clone)]
pub struct BeanContainer {
    inner: Arc<ContainerInner>,
}

struct ContainerInner {
    arena: BeanArena,
    report: BuildReport,
    options: ContainerOptions,
    observers: Observers,
}

impl BeanContainer {
    /// Builds a container with the registry's options and observers.
    ///
    /// Instantiates every registered type in order, then wires all slots in a
    /// single pass. Failed components and failed slots are recorded in the
    /// [`BuildReport`] unless the matching [`FailurePolicy`] is `Abort`.
    ///
    /// # Errors
    ///
    /// * [`ContainerError::Configuration`] if the registry is empty
    /// * [`ContainerError::Instantiation`] / [`ContainerError::Injection`]
    ///   for the first failure under an `Abort` policy
    pub fn build(registry: ComponentRegistry) -> BeanResult<Self> {
        let options = registry.options();
        Self::build_with(registry, options)
    }

    /// Builds a container with explicit options, ignoring the registry's.
    pub fn build_with(registry: ComponentRegistry, options: ContainerOptions) -> BeanResult<Self> {
        if registry.is_empty() {
            return Err(ContainerError::Configuration(
                "component type set must not be empty".to_string(),
            ));
        }

        let started = Instant::now();
        let (types, observers) = registry.into_parts();
        let instantiator = BeanInstantiator::new();
        let mut arena = BeanArena::new();
        let mut report = BuildReport::default();

        for ty in &types {
            let attempt = Instant::now();
            match instantiator.instantiate(ty) {
                Ok(bean) => {
                    observers.instantiated(&ty.key(), attempt.elapsed());
                    report.instantiated.push(ty.key());
                    arena.push(bean);
                }
                Err(failure) => {
                    observers.instantiation_failed(&failure);
                    if options.instantiation_failures == FailurePolicy::Abort {
                        return Err(failure.into());
                    }
                    report.instantiation_failures.push(failure);
                }
            }
        }

        let resolver = DependencyResolver::with_observers(options, observers.clone());
        report.wiring = resolver.resolve(&arena);
        report.duration = started.elapsed();

        let first_failure = report.wiring.failures.first().cloned();
        let inner = ContainerInner {
            arena,
            report,
            options,
            observers,
        };
        if let (FailurePolicy::Abort, Some(failure)) = (options.injection_failures, first_failure) {
            // no bean has been handed out yet
            inner.clear_slots();
            return Err(failure.into());
        }

        inner.observers.built(&inner.report.summary());
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// The unique bean assignable to `T`.
    ///
    /// # Errors
    ///
    /// * [`ContainerError::NoSuchBean`] if no bean is assignable to `T`
    /// * [`ContainerError::AmbiguousBean`] if more than one is; use
    ///   [`get_named`](Self::get_named) to pick one
    pub fn get_bean<T: ?Sized + Send + Sync + 'static>(&self) -> BeanResult<Arc<T>> {
        let key = Key::of::<T>();
        match self.inner.arena.assignable(&key) {
            [] => Err(ContainerError::NoSuchBean {
                requested: key.display_name(),
            }),
            [id] => self.view(*id, &key),
            ids => Err(ContainerError::AmbiguousBean {
                requested: key.display_name(),
                candidates: self.inner.arena.names(ids),
            }),
        }
    }

    /// The bean named `name` that is assignable to `T`.
    pub fn get_named<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> BeanResult<Arc<T>> {
        let key = Key::of::<T>();
        let ids = self.inner.arena.candidates(&key, Some(name), None);
        match ids.as_slice() {
            [] => Err(ContainerError::NoSuchBean {
                requested: key.display_name(),
            }),
            [id] => self.view(*id, &key),
            _ => Err(ContainerError::AmbiguousBean {
                requested: key.display_name(),
                candidates: self.inner.arena.names(&ids),
            }),
        }
    }

    /// Every bean assignable to `T`, in registration order.
    pub fn get_all<T: ?Sized + Send + Sync + 'static>(&self) -> BeanResult<Vec<Arc<T>>> {
        let key = Key::of::<T>();
        self.inner
            .arena
            .assignable(&key)
            .iter()
            .map(|id| self.view(*id, &key))
            .collect()
    }

    /// Whether at least one bean is assignable to `T`.
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        !self.inner.arena.assignable(&Key::of::<T>()).is_empty()
    }

    /// Number of beans.
    pub fn len(&self) -> usize {
        self.inner.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.arena.is_empty()
    }

    /// Beans in registration order.
    pub fn beans(&self) -> impl Iterator<Item = &Bean> {
        self.inner.arena.iter()
    }

    pub fn bean(&self, id: BeanId) -> Option<&Bean> {
        self.inner.arena.get(id)
    }

    /// Descriptors of every bean, with the current state of their slots.
    pub fn descriptors(&self) -> Vec<BeanDescriptor> {
        self.inner.arena.iter().map(BeanDescriptor::of_bean).collect()
    }

    /// What happened during the build.
    pub fn report(&self) -> &BuildReport {
        &self.inner.report
    }

    pub fn options(&self) -> ContainerOptions {
        self.inner.options
    }

    /// Runs the wiring pass again over the same beans.
    ///
    /// Assignments are deterministic, so a rewire reproduces the build's
    /// wiring. Observers registered at build time see the events again.
    pub fn rewire(&self) -> WiringReport {
        DependencyResolver::with_observers(self.inner.options, self.inner.observers.clone())
            .resolve(&self.inner.arena)
    }

    /// Empties every dependency slot of every bean.
    ///
    /// Releases reference cycles between beans. Every clone of this container
    /// and every bean obtained from it sees the empty slots afterwards, so
    /// call it only when the beans are no longer in use.
    pub fn shutdown(&self) {
        self.inner.clear_slots();
    }

    fn view<T: ?Sized + Send + Sync + 'static>(&self, id: BeanId, key: &Key) -> BeanResult<Arc<T>> {
        self.inner
            .arena
            .get(id)
            .and_then(|bean| bean.provision(key))
            .and_then(|provision| provision.downcast::<T>())
            .ok_or_else(|| ContainerError::TypeMismatch {
                requested: key.display_name(),
            })
    }
}

impl ContainerInner {
    fn clear_slots(&self) {
        for bean in self.arena.iter() {
            for dep in bean.dependencies() {
                dep.slot().clear();
            }
        }
    }
}

impl fmt::Debug for BeanContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanContainer")
            .field("beans", &self.inner.arena)
            .field("options", &self.inner.options)
            .field("observers", &self.inner.observers.len())
            .finish()
    }
}
