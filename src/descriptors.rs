//! Bean descriptors for introspection and diagnostics.

use crate::component::ComponentType;
use crate::instantiate::{Bean, BeanId};
use crate::key::Key;

/// Bean descriptor for introspection and diagnostics
///
/// Describes a declared component type or an instantiated bean: its name,
/// concrete type, the types it can be injected as and, for beans, its
/// dependency slots.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{BeanContainer, Component, ComponentRegistry, ComponentType, Dependency, Inject};
/// use std::sync::Arc;
///
/// pub trait Logger: Send + Sync {}
///
/// #[derive(Default)]
/// struct ConsoleLogger;
/// impl Component for ConsoleLogger {}
/// impl Logger for ConsoleLogger {}
///
/// #[derive(Default)]
/// struct Repository {
///     logger: Inject<dyn Logger>,
/// }
///
/// impl Component for Repository {
///     fn dependencies(&self) -> Vec<Dependency<'_>> {
///         vec![Dependency::new("logger", &self.logger)]
///     }
/// }
///
/// let mut registry = ComponentRegistry::new();
/// registry
///     .register(ComponentType::of::<Repository>())
///     .register(
///         ComponentType::define::<ConsoleLogger>()
///             .provides::<dyn Logger>(|c| c as Arc<dyn Logger>),
///     );
///
/// // Declared types carry no slot information yet
/// assert!(registry.descriptors().iter().all(|d| d.slots.is_empty()));
///
/// let container = BeanContainer::build(registry).unwrap();
/// let descriptors = container.descriptors();
///
/// let repo = descriptors.iter().find(|d| d.name == "Repository").unwrap();
/// assert_eq!(repo.slots.len(), 1);
/// assert_eq!(repo.slots[0].name, "logger");
///
/// let logger = descriptors.iter().find(|d| d.name == "ConsoleLogger").unwrap();
/// assert!(logger.provides_type("Logger"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeanDescriptor {
    /// Arena id, for instantiated beans only
    pub id: Option<BeanId>,
    /// Bean name (qualifier)
    pub name: String,
    /// Concrete component type
    pub key: Key,
    /// Every type the bean can be injected as, concrete key first
    pub provides: Vec<Key>,
    /// Dependency slots; empty when describing a type that was not instantiated
    pub slots: Vec<SlotDescriptor>,
}

/// A declared dependency slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDescriptor {
    pub name: &'static str,
    pub required: Key,
    pub qualifier: Option<&'static str>,
    /// Whether the slot held a bean when the descriptor was taken
    pub filled: bool,
}

impl BeanDescriptor {
    pub(crate) fn of_type(ty: &ComponentType) -> Self {
        Self {
            id: None,
            name: ty.name().to_string(),
            key: ty.key(),
            provides: ty.provided_keys(),
            slots: Vec::new(),
        }
    }

    pub(crate) fn of_bean(bean: &Bean) -> Self {
        let slots = bean
            .dependencies()
            .iter()
            .map(|dep| SlotDescriptor {
                name: dep.name(),
                required: dep.required(),
                qualifier: dep.qualifier(),
                filled: dep.slot().is_filled(),
            })
            .collect();
        Self {
            id: Some(bean.id()),
            name: bean.name().to_string(),
            key: bean.key(),
            provides: bean.provided_keys().collect(),
            slots,
        }
    }

    /// Full type name of the concrete component.
    pub fn type_name(&self) -> &'static str {
        self.key.display_name()
    }

    /// Whether one of the provided types has the given short or full name.
    pub fn provides_type(&self, name: &str) -> bool {
        self.provides
            .iter()
            .any(|key| key.short_name() == name || key.display_name() == name)
    }

    pub fn is_leaf(&self) -> bool {
        self.slots.is_empty()
    }
}
