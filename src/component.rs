//! Component declarations: the `Component` trait, dependency lists and
//! `ComponentType` definitions.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{BoxError, InstantiationCause};
use crate::inject::Slot;
use crate::key::Key;

// Type-erased Arc for storage
pub(crate) type AnyArc = Arc<dyn Any + Send + Sync>;

type Ctor = Arc<dyn Fn() -> Result<Instance, InstantiationCause> + Send + Sync>;
type View = Arc<dyn Fn(&AnyArc) -> Option<Provision> + Send + Sync>;

/// Base trait for container-managed components.
///
/// A component lists its dependency slots explicitly. Leaf components keep
/// the default, empty list.
///
/// ```rust
/// use ferrous_beans::{Component, Dependency, Inject};
///
/// pub trait PaymentGateway: Send + Sync {
///     fn charge(&self, cents: u64) -> bool;
/// }
///
/// #[derive(Default)]
/// pub struct OrderService {
///     pub gateway: Inject<dyn PaymentGateway>,
/// }
///
/// impl Component for OrderService {
///     fn dependencies(&self) -> Vec<Dependency<'_>> {
///         vec![Dependency::new("gateway", &self.gateway)]
///     }
/// }
/// ```
pub trait Component: Send + Sync + 'static {
    /// The dependency slots of this instance as `(slot-name, slot)` pairs.
    fn dependencies(&self) -> Vec<Dependency<'_>> {
        Vec::new()
    }
}

/// One named dependency slot of a component instance.
pub struct Dependency<'a> {
    name: &'static str,
    slot: &'a dyn Slot,
}

impl<'a> Dependency<'a> {
    pub fn new(name: &'static str, slot: &'a dyn Slot) -> Self {
        Self { name, slot }
    }

    /// Slot name, usually the field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Key of the type the slot requires.
    pub fn required(&self) -> Key {
        self.slot.required()
    }

    pub fn qualifier(&self) -> Option<&'static str> {
        self.slot.qualifier()
    }

    pub fn slot(&self) -> &'a dyn Slot {
        self.slot
    }
}

impl fmt::Debug for Dependency<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependency")
            .field("name", &self.name)
            .field("required", &self.required())
            .field("qualifier", &self.qualifier())
            .field("filled", &self.slot.is_filled())
            .finish()
    }
}

/// A bean viewed as one of the types it can be injected as.
///
/// Holds an `Arc<T>` behind type erasure; for a `dyn Trait` view the inner
/// `Arc` is the trait object pointing at the bean's own allocation.
#[derive(Clone)]
pub struct Provision {
    source: Key,
    value: AnyArc,
}

impl Provision {
    pub fn new<T: ?Sized + Send + Sync + 'static>(source: Key, value: Arc<T>) -> Self {
        Self {
            source,
            value: Arc::new(value),
        }
    }

    /// Concrete type of the bean behind this provision.
    pub fn source(&self) -> Key {
        self.source
    }

    /// The bean as `Arc<T>`, if this provision holds that view.
    pub fn downcast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }
}

impl fmt::Debug for Provision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provision").field("source", &self.source).finish_non_exhaustive()
    }
}

/// A freshly constructed instance, seen both as `Any` and as `Component`.
#[derive(Clone)]
pub(crate) struct Instance {
    pub(crate) any: AnyArc,
    pub(crate) component: Arc<dyn Component>,
}

impl Instance {
    fn new<C: Component>(value: C) -> Self {
        let arc = Arc::new(value);
        Self {
            any: arc.clone(),
            component: arc,
        }
    }
}

/// A declared component type: its key, name, zero-argument constructor and the
/// extra types it can be injected as.
///
/// Cheap to clone. Build one with [`ComponentType::of`] for `Default`
/// components, or start from [`ComponentType::define`],
/// [`ComponentType::with_constructor`] or
/// [`ComponentType::with_fallible_constructor`] to add a name or provided
/// views.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{Component, ComponentType};
/// use std::sync::Arc;
///
/// pub trait PaymentGateway: Send + Sync {}
///
/// #[derive(Default)]
/// pub struct StripeGateway;
/// impl Component for StripeGateway {}
/// impl PaymentGateway for StripeGateway {}
///
/// let ty = ComponentType::define::<StripeGateway>()
///     .named("stripe")
///     .provides::<dyn PaymentGateway>(|c| c as Arc<dyn PaymentGateway>)
///     .build();
///
/// assert_eq!(ty.name(), "stripe");
/// assert_eq!(ty.provided_keys().len(), 2);
/// ```
#[derive(Clone)]
pub struct ComponentType {
    inner: Arc<TypeInner>,
}

struct TypeInner {
    key: Key,
    name: String,
    ctor: Ctor,
    views: Vec<(Key, View)>,
}

impl ComponentType {
    /// Declares `C`, constructed with `Default::default`.
    pub fn of<C: Component + Default>() -> Self {
        Self::define::<C>().build()
    }

    /// Starts a definition for `C`, constructed with `Default::default`.
    pub fn define<C: Component + Default>() -> ComponentDef<C> {
        ComponentDef::from_ctor(Arc::new(|| Ok::<_, InstantiationCause>(Instance::new(C::default()))))
    }

    /// Starts a definition for `C` with an infallible constructor.
    pub fn with_constructor<C, F>(ctor: F) -> ComponentDef<C>
    where
        C: Component,
        F: Fn() -> C + Send + Sync + 'static,
    {
        ComponentDef::from_ctor(Arc::new(move || Ok::<_, InstantiationCause>(Instance::new(ctor()))))
    }

    /// Starts a definition for `C` with a constructor that may fail.
    ///
    /// An `Err` becomes an [`InstantiationFailure`](crate::InstantiationFailure)
    /// at build time.
    pub fn with_fallible_constructor<C, E, F>(ctor: F) -> ComponentDef<C>
    where
        C: Component,
        E: Into<BoxError>,
        F: Fn() -> Result<C, E> + Send + Sync + 'static,
    {
        ComponentDef::from_ctor(Arc::new(move || {
            ctor().map(Instance::new).map_err(|e| {
                let source: BoxError = e.into();
                InstantiationCause::Constructor(Arc::from(source))
            })
        }))
    }

    /// Key of the concrete component type.
    pub fn key(&self) -> Key {
        self.inner.key
    }

    /// Bean name, used as a qualifier. Defaults to the short type name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Every key a bean of this type can be looked up or injected as,
    /// starting with its concrete key.
    pub fn provided_keys(&self) -> Vec<Key> {
        self.inner.views.iter().map(|(key, _)| *key).collect()
    }

    /// Whether a bean of this type is assignable to `key`.
    pub fn provides_key(&self, key: &Key) -> bool {
        self.inner.views.iter().any(|(k, _)| k == key)
    }

    pub(crate) fn construct(&self) -> Result<Instance, InstantiationCause> {
        (self.inner.ctor)()
    }

    /// Every view of `instance`, in declaration order.
    pub(crate) fn provisions(&self, instance: &Instance) -> Vec<(Key, Provision)> {
        self.inner
            .views
            .iter()
            .filter_map(|(key, view)| view(&instance.any).map(|p| (*key, p)))
            .collect()
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentType")
            .field("key", &self.inner.key)
            .field("name", &self.inner.name)
            .field("provides", &self.provided_keys())
            .finish()
    }
}

/// Builder for a [`ComponentType`] of concrete type `C`.
pub struct ComponentDef<C> {
    name: Option<String>,
    ctor: Ctor,
    views: Vec<(Key, View)>,
    _marker: PhantomData<fn() -> C>,
}

impl<C: Component> ComponentDef<C> {
    fn from_ctor(ctor: Ctor) -> Self {
        Self {
            name: None,
            ctor,
            views: vec![(Key::of::<C>(), view_fn::<C, C>(|c| c))],
            _marker: PhantomData,
        }
    }

    /// Registers the bean under `name` instead of its short type name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Makes the bean assignable to `T`, usually a `dyn Trait` it implements.
    ///
    /// `view` performs the unsizing, e.g. `|c| c as Arc<dyn Trait>`.
    /// Declaring the same `T` twice keeps the last view.
    pub fn provides<T>(mut self, view: fn(Arc<C>) -> Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = Key::of::<T>();
        let view = view_fn::<C, T>(view);
        match self.views.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = view,
            None => self.views.push((key, view)),
        }
        self
    }

    pub fn build(self) -> ComponentType {
        let key = Key::of::<C>();
        ComponentType {
            inner: Arc::new(TypeInner {
                key,
                name: self.name.unwrap_or_else(|| key.short_name().to_string()),
                ctor: self.ctor,
                views: self.views,
            }),
        }
    }
}

impl<C: Component> From<ComponentDef<C>> for ComponentType {
    fn from(def: ComponentDef<C>) -> Self {
        def.build()
    }
}

fn view_fn<C, T>(view: fn(Arc<C>) -> Arc<T>) -> View
where
    C: Component,
    T: ?Sized + Send + Sync + 'static,
{
    Arc::new(move |any: &AnyArc| {
        let concrete = any.clone().downcast::<C>().ok()?;
        Some(Provision::new(Key::of::<C>(), view(concrete)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Named: Send + Sync {
        fn label(&self) -> String;
    }

    #[derive(Default)]
    struct Widget {
        id: u32,
    }

    impl Component for Widget {}

    impl Named for Widget {
        fn label(&self) -> String {
            format!("widget-{}", self.id)
        }
    }

    #[test]
    fn default_name_is_short_type_name() {
        let ty = ComponentType::of::<Widget>();
        assert_eq!(ty.name(), "Widget");
        assert_eq!(ty.key(), Key::of::<Widget>());
        assert_eq!(ty.provided_keys(), vec![Key::of::<Widget>()]);
    }

    #[test]
    fn provisions_share_the_instance_allocation() {
        let ty = ComponentType::with_constructor(|| Widget { id: 3 })
            .provides::<dyn Named>(|c| c as Arc<dyn Named>)
            .build();
        let instance = ty.construct().unwrap();
        let provisions = ty.provisions(&instance);

        assert_eq!(provisions.len(), 2);
        let concrete = provisions[0].1.downcast::<Widget>().unwrap();
        let named = provisions[1].1.downcast::<dyn Named>().unwrap();
        assert_eq!(named.label(), "widget-3");
        assert_eq!(
            Arc::as_ptr(&concrete) as *const u8,
            Arc::as_ptr(&named) as *const u8
        );
    }

    #[test]
    fn fallible_constructor_reports_error() {
        let ty = ComponentType::with_fallible_constructor(|| -> Result<Widget, String> {
            Err("no config".to_string())
        })
        .build();

        match ty.construct() {
            Err(InstantiationCause::Constructor(e)) => assert_eq!(e.to_string(), "no config"),
            _ => panic!("expected constructor error"),
        }
    }
}
