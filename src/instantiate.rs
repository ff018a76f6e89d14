//! Bean instantiation: one instance per component type, failures isolated.

use std::fmt;

use crate::component::{ComponentType, Dependency, Instance, Provision};
use crate::error::{InstantiationCause, InstantiationFailure};
use crate::internal::catch_panic;
use crate::key::Key;

/// Handle of a bean inside the container arena.
///
/// Ids follow registration order among the successfully instantiated
/// components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BeanId(pub(crate) usize);

impl BeanId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BeanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A container-managed instance of a component type.
pub struct Bean {
    id: BeanId,
    ty: ComponentType,
    instance: Instance,
    provisions: Vec<(Key, Provision)>,
}

impl Bean {
    pub fn id(&self) -> BeanId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: BeanId) {
        self.id = id;
    }

    /// Key of the concrete type.
    pub fn key(&self) -> Key {
        self.ty.key()
    }

    pub fn name(&self) -> &str {
        self.ty.name()
    }

    pub fn component_type(&self) -> &ComponentType {
        &self.ty
    }

    /// This bean viewed as `key`, if assignable.
    pub fn provision(&self, key: &Key) -> Option<&Provision> {
        self.provisions.iter().find(|(k, _)| k == key).map(|(_, p)| p)
    }

    pub fn provided_keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.provisions.iter().map(|(k, _)| *k)
    }

    /// The bean's dependency slots, as declared by the component.
    pub fn dependencies(&self) -> Vec<Dependency<'_>> {
        self.instance.component.dependencies()
    }
}

impl fmt::Debug for Bean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bean")
            .field("id", &self.id)
            .field("name", &self.ty.name())
            .field("key", &self.ty.key())
            .finish()
    }
}

/// Produces beans from component types.
///
/// Construction errors and panics are reported as [`InstantiationFailure`];
/// whether a failure aborts the build is the container's decision.
#[derive(Debug, Default, Clone, Copy)]
pub struct BeanInstantiator;

impl BeanInstantiator {
    pub fn new() -> Self {
        Self
    }

    /// Constructs one instance of `ty`. No slot is filled here.
    pub fn instantiate(&self, ty: &ComponentType) -> Result<Bean, InstantiationFailure> {
        let component = ty.key().display_name();
        let instance = match catch_panic(|| ty.construct()) {
            Ok(Ok(instance)) => instance,
            Ok(Err(cause)) => return Err(InstantiationFailure { component, cause }),
            Err(message) => {
                return Err(InstantiationFailure {
                    component,
                    cause: InstantiationCause::Panicked(message),
                })
            }
        };

        let provisions = ty.provisions(&instance);
        Ok(Bean {
            id: BeanId(0),
            ty: ty.clone(),
            instance,
            provisions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Component;

    #[derive(Default)]
    struct Leaf;
    impl Component for Leaf {}

    struct Exploding;
    impl Component for Exploding {}

    #[test]
    fn instantiates_default_component() {
        let bean = BeanInstantiator::new()
            .instantiate(&ComponentType::of::<Leaf>())
            .unwrap();
        assert_eq!(bean.key(), Key::of::<Leaf>());
        assert!(bean.provision(&Key::of::<Leaf>()).is_some());
        assert!(bean.dependencies().is_empty());
    }

    #[test]
    fn panicking_constructor_becomes_failure() {
        let ty = ComponentType::with_constructor(|| -> Exploding { panic!("no socket") }).build();
        let failure = BeanInstantiator::new().instantiate(&ty).unwrap_err();

        assert!(failure.component.ends_with("Exploding"));
        assert!(matches!(failure.cause, InstantiationCause::Panicked(ref m) if m == "no socket"));
    }
}
