//! Dependency slots filled by the container.

use std::fmt;
use std::sync::Arc;

use crate::component::Provision;
use crate::error::InjectionCause;
use crate::internal::SlotCell;
use crate::key::Key;

/// A dependency slot of required type `T`.
///
/// Components declare one `Inject<T>` field per collaborator and list them in
/// [`Component::dependencies`](crate::Component::dependencies). The slot starts
/// empty; the wiring pass fills it with the first other bean assignable to `T`.
/// `T` may be a concrete component type or a `dyn Trait` that some component
/// [provides](crate::ComponentDef::provides).
///
/// A slot left empty after wiring is not an error: it means no registered
/// bean matched.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{BeanContainer, Component, ComponentRegistry, ComponentType, Dependency, Inject};
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
/// let mut registry = ComponentRegistry::new();
/// registry.register(ComponentType::of::<Scheduler>());
/// registry.register(ComponentType::of::<Clock>());
///
/// let container = BeanContainer::build(registry).unwrap();
/// let scheduler = container.get_bean::<Scheduler>().unwrap();
/// assert!(scheduler.clock.is_wired());
/// ```
pub struct Inject<T: ?Sized> {
    cell: SlotCell<T>,
    qualifier: Option<&'static str>,
}

impl<T: ?Sized + Send + Sync + 'static> Inject<T> {
    /// Creates an empty slot that accepts any bean assignable to `T`.
    pub fn new() -> Self {
        Self {
            cell: SlotCell::empty(),
            qualifier: None,
        }
    }

    /// Creates an empty slot that only accepts the bean registered under `name`.
    pub fn qualified(name: &'static str) -> Self {
        Self {
            cell: SlotCell::empty(),
            qualifier: Some(name),
        }
    }

    /// The injected bean, or `None` if nothing was wired.
    pub fn get(&self) -> Option<Arc<T>> {
        self.cell.load()
    }

    /// Whether the wiring pass filled this slot.
    pub fn is_wired(&self) -> bool {
        self.cell.load().is_some()
    }

    /// Qualifier this slot was declared with.
    pub fn qualifier(&self) -> Option<&'static str> {
        self.qualifier
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Inject<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized + Send + Sync + 'static> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("required", &std::any::type_name::<T>())
            .field("qualifier", &self.qualifier)
            .field("wired", &self.is_wired())
            .finish()
    }
}

/// Object-safe view of a dependency slot used by the wiring pass.
///
/// Implemented by [`Inject<T>`]; components normally never implement it
/// themselves.
pub trait Slot: Send + Sync {
    /// Key of the type this slot requires.
    fn required(&self) -> Key;

    /// Bean name this slot is restricted to, if any.
    fn qualifier(&self) -> Option<&'static str>;

    /// Stores `provision` in the slot.
    ///
    /// On failure the slot keeps its previous value.
    fn assign(&self, provision: &Provision) -> Result<(), InjectionCause>;

    /// Whether the slot currently holds a bean.
    fn is_filled(&self) -> bool;

    /// Drops the held reference.
    fn clear(&self);
}

impl<T: ?Sized + Send + Sync + 'static> Slot for Inject<T> {
    fn required(&self) -> Key {
        Key::of::<T>()
    }

    fn qualifier(&self) -> Option<&'static str> {
        self.qualifier
    }

    fn assign(&self, provision: &Provision) -> Result<(), InjectionCause> {
        let value = provision
            .downcast::<T>()
            .ok_or_else(|| InjectionCause::TypeMismatch {
                provided: provision.source().display_name(),
                required: std::any::type_name::<T>(),
            })?;
        self.cell.store(value);
        Ok(())
    }

    fn is_filled(&self) -> bool {
        self.is_wired()
    }

    fn clear(&self) {
        self.cell.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct English;

    impl Greeter for English {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[test]
    fn assign_accepts_matching_provision() {
        let slot: Inject<dyn Greeter> = Inject::new();
        let bean = Arc::new(English);
        let provision = Provision::new(Key::of::<English>(), bean.clone() as Arc<dyn Greeter>);

        slot.assign(&provision).unwrap();

        assert!(slot.is_wired());
        assert_eq!(slot.get().unwrap().greet(), "hello");
    }

    #[test]
    fn assign_rejects_other_types_and_keeps_value() {
        let slot: Inject<String> = Inject::new();
        let first = Provision::new(Key::of::<String>(), Arc::new("first".to_string()));
        slot.assign(&first).unwrap();

        let wrong = Provision::new(Key::of::<u32>(), Arc::new(7u32));
        let err = slot.assign(&wrong).unwrap_err();

        assert!(matches!(err, InjectionCause::TypeMismatch { provided: "u32", .. }));
        assert_eq!(slot.get().as_deref().map(String::as_str), Some("first"));
    }

    #[test]
    fn qualified_slot_reports_name() {
        let slot: Inject<String> = Inject::qualified("primary");
        assert_eq!(Slot::qualifier(&slot), Some("primary"));
        assert_eq!(slot.required(), Key::of::<String>());
        assert!(!slot.is_filled());
    }
}
