//! Component registry module.
//!
//! This module contains the ComponentRegistry type: the ordered set of
//! component types a container is built from, plus the build options and
//! observers that apply to that build.

use std::sync::Arc;

use crate::component::ComponentType;
use crate::config::ContainerOptions;
use crate::container::BeanContainer;
use crate::descriptors::BeanDescriptor;
use crate::error::{BeanResult, ContainerError};
use crate::key::Key;
use crate::observer::{ContainerObserver, Observers};

/// Ordered, de-duplicated set of component types.
///
/// Registration order is significant: it is the order beans are instantiated
/// in and the tie-break order when several beans satisfy a slot.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{Component, ComponentRegistry, ComponentType};
///
/// #[derive(Default)]
/// struct Clock;
/// impl Component for Clock {}
///
/// #[derive(Default)]
/// struct Mailer;
/// impl Component for Mailer {}
///
/// let mut registry = ComponentRegistry::new();
/// registry
///     .register(ComponentType::of::<Clock>())
///     .register(ComponentType::of::<Mailer>())
///     .register(ComponentType::define::<Clock>().named("wall-clock"));
///
/// // Re-registering keeps the original position with the new definition
/// let names: Vec<_> = registry.iter().map(|ty| ty.name()).collect();
/// assert_eq!(names, vec!["wall-clock", "Mailer"]);
/// assert!(registry.contains::<Mailer>());
/// ```
#[derive(Default)]
pub struct ComponentRegistry {
    types: Vec<ComponentType>,
    options: ContainerOptions,
    observers: Observers,
}

impl ComponentRegistry {
    /// Creates a new empty registry with default options.
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            options: ContainerOptions::default(),
            observers: Observers::new(),
        }
    }

    /// Creates a registry from an ordered list of types.
    ///
    /// Fails with [`ContainerError::Configuration`] when `types` is empty.
    pub fn from_types<I>(types: I) -> BeanResult<Self>
    where
        I: IntoIterator,
        I::Item: Into<ComponentType>,
    {
        let mut registry = Self::new();
        for ty in types {
            registry.register(ty);
        }
        if registry.is_empty() {
            return Err(ContainerError::Configuration(
                "component type set must not be empty".to_string(),
            ));
        }
        Ok(registry)
    }

    /// Adds a component type.
    ///
    /// A type whose concrete key is already registered keeps its position;
    /// its definition is replaced.
    pub fn register(&mut self, ty: impl Into<ComponentType>) -> &mut Self {
        let ty = ty.into();
        match self.types.iter_mut().find(|existing| existing.key() == ty.key()) {
            Some(existing) => *existing = ty,
            None => self.types.push(ty),
        }
        self
    }

    /// Sets the options the container is built with.
    pub fn with_options(&mut self, options: ContainerOptions) -> &mut Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ContainerOptions {
        self.options
    }

    /// Adds an observer for build events.
    ///
    /// Observers are also notified when the built container is rewired.
    pub fn add_observer(&mut self, observer: Arc<dyn ContainerObserver>) -> &mut Self {
        self.observers.add(observer);
        self
    }

    /// Registered types in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ComponentType> {
        self.types.iter()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether `T` is registered as a concrete component type.
    pub fn contains<T: 'static>(&self) -> bool {
        let key = Key::of::<T>();
        self.types.iter().any(|ty| ty.key() == key)
    }

    /// Descriptors of the registered types, in registration order.
    pub fn descriptors(&self) -> Vec<BeanDescriptor> {
        self.types.iter().map(BeanDescriptor::of_type).collect()
    }

    /// Builds a container; shorthand for [`BeanContainer::build`].
    pub fn build(self) -> BeanResult<BeanContainer> {
        BeanContainer::build(self)
    }

    pub(crate) fn into_parts(self) -> (Vec<ComponentType>, Observers) {
        (self.types, self.observers)
    }
}

impl<T: Into<ComponentType>> Extend<T> for ComponentRegistry {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for ty in iter {
            self.register(ty);
        }
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("types", &self.types)
            .field("options", &self.options)
            .field("observers", &self.observers.len())
            .finish()
    }
}
