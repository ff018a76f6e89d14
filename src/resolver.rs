//! Dependency wiring: fills every bean's slots from the other beans.

use crate::arena::BeanArena;
use crate::component::Dependency;
use crate::config::{AmbiguityPolicy, ContainerOptions};
use crate::error::{InjectionCause, InjectionFailure};
use crate::instantiate::{Bean, BeanId};
use crate::observer::Observers;
use crate::report::{UnresolvedSlot, WiredSlot, WiringReport};

/// Wires dependency slots by type in a single pass over the arena.
///
/// For each bean, in registration order, each declared slot receives the
/// first *other* bean assignable to the slot's type (narrowed by the slot's
/// qualifier, if any). A slot without candidates keeps its current value and
/// is reported as unresolved. Beans whose own slots are still empty are valid
/// candidates; nothing recurses, so reference cycles between beans are legal.
///
/// Running the pass again on the same arena assigns the same targets.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{
///     BeanArena, BeanInstantiator, Component, ComponentType, ContainerOptions, Dependency,
///     DependencyResolver, Inject,
/// };
///
/// #[derive(Default)]
/// struct Clock;
/// impl Component for Clock {}
///
/// #[derive(Default)]
/// struct Scheduler {
///     clock: Inject<Clock>,
/// }
///
/// impl Component for Scheduler {
///     fn dependencies(&self) -> Vec<Dependency<'_>> {
///         vec![Dependency::new("clock", &self.clock)]
///     }
/// }
///
/// let instantiator = BeanInstantiator::new();
/// let mut arena = BeanArena::new();
/// for ty in [ComponentType::of::<Scheduler>(), ComponentType::of::<Clock>()] {
///     arena.push(instantiator.instantiate(&ty).unwrap());
/// }
///
/// let report = DependencyResolver::new(ContainerOptions::default()).resolve(&arena);
/// assert_eq!(report.wired.len(), 1);
/// assert_eq!(report.wired[0].target_name, "Clock");
/// ```
#[derive(Clone, Default)]
pub struct DependencyResolver {
    ambiguity: AmbiguityPolicy,
    observers: Observers,
}

impl DependencyResolver {
    pub fn new(options: ContainerOptions) -> Self {
        Self {
            ambiguity: options.ambiguous_slots,
            observers: Observers::new(),
        }
    }

    pub(crate) fn with_observers(options: ContainerOptions, observers: Observers) -> Self {
        Self {
            ambiguity: options.ambiguous_slots,
            observers,
        }
    }

    /// Runs one wiring pass and reports every slot's outcome.
    ///
    /// Failures never stop the pass; whether they abort a build is the
    /// container's decision.
    pub fn resolve(&self, arena: &BeanArena) -> WiringReport {
        let mut report = WiringReport::default();
        for bean in arena.iter() {
            for dep in bean.dependencies() {
                self.wire_slot(arena, bean, &dep, &mut report);
            }
        }
        report
    }

    fn wire_slot(&self, arena: &BeanArena, bean: &Bean, dep: &Dependency<'_>, report: &mut WiringReport) {
        let required = dep.required();
        let candidates = arena.candidates(&required, dep.qualifier(), Some(bean.id()));

        let target = match candidates.as_slice() {
            [] => {
                let unresolved = UnresolvedSlot {
                    bean: bean.id(),
                    component: bean.key(),
                    slot: dep.name(),
                    required,
                    qualifier: dep.qualifier(),
                };
                self.observers.unresolved(&unresolved);
                report.unresolved.push(unresolved);
                return;
            }
            [first] => *first,
            [first, ..] => match self.ambiguity {
                AmbiguityPolicy::First => *first,
                AmbiguityPolicy::Reject => {
                    let cause = InjectionCause::Ambiguous {
                        candidates: arena.names(&candidates),
                    };
                    self.fail(bean, dep, cause, report);
                    return;
                }
            },
        };

        if let Err(cause) = assign(arena, target, dep) {
            self.fail(bean, dep, cause, report);
            return;
        }

        let wired = WiredSlot {
            bean: bean.id(),
            component: bean.key(),
            slot: dep.name(),
            required,
            target,
            target_name: arena.names(&[target]).concat(),
        };
        self.observers.injected(&wired);
        report.wired.push(wired);
    }

    fn fail(&self, bean: &Bean, dep: &Dependency<'_>, cause: InjectionCause, report: &mut WiringReport) {
        let failure = InjectionFailure {
            component: bean.key().display_name(),
            slot: dep.name(),
            required: dep.required().display_name(),
            cause,
        };
        self.observers.injection_failed(&failure);
        report.failures.push(failure);
    }
}

fn assign(arena: &BeanArena, target: BeanId, dep: &Dependency<'_>) -> Result<(), InjectionCause> {
    let required = dep.required();
    let provision = arena
        .get(target)
        .and_then(|bean| bean.provision(&required))
        .ok_or_else(|| InjectionCause::TypeMismatch {
            provided: arena
                .get(target)
                .map(|bean| bean.key().display_name())
                .unwrap_or("<missing>"),
            required: required.display_name(),
        })?;
    dep.slot().assign(provision)
}
