//! Error types for the bean container.

use std::sync::Arc;

use thiserror::Error;

/// Boxed error returned by fallible component constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Container errors
///
/// Build-time errors (`Configuration`, and `Instantiation`/`Injection` when
/// the matching [`FailurePolicy`](crate::FailurePolicy) is `Abort`) surface
/// from [`BeanContainer::build`](crate::BeanContainer::build). Lookup errors
/// surface from [`BeanContainer::get_bean`](crate::BeanContainer::get_bean)
/// and never during a build.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{BeanContainer, Component, ComponentRegistry, ComponentType, ContainerError};
///
/// #[derive(Default)]
/// struct Clock;
/// impl Component for Clock {}
///
/// struct Unregistered;
///
/// let mut registry = ComponentRegistry::new();
/// registry.register(ComponentType::of::<Clock>());
/// let container = BeanContainer::build(registry).unwrap();
///
/// match container.get_bean::<Unregistered>() {
///     Err(ContainerError::NoSuchBean { requested }) => assert!(requested.ends_with("Unregistered")),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone, Error)]
pub enum ContainerError {
    /// Invalid or empty registration input, or malformed options
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// A component could not be constructed and the policy is `Abort`
    #[error(transparent)]
    Instantiation(#[from] InstantiationFailure),
    /// A slot could not be filled and the policy is `Abort`
    #[error(transparent)]
    Injection(#[from] InjectionFailure),
    /// No bean is assignable to the requested type
    #[error("No bean assignable to: {requested}")]
    NoSuchBean { requested: &'static str },
    /// More than one bean is assignable to the requested type
    #[error("Ambiguous bean for {requested}: {}", .candidates.join(", "))]
    AmbiguousBean {
        requested: &'static str,
        candidates: Vec<String>,
    },
    /// The stored instance could not be viewed as the requested type
    #[error("Type mismatch for: {requested}")]
    TypeMismatch { requested: &'static str },
    /// Wiring graph serialisation failed
    #[error("Graph export failed: {0}")]
    Export(String),
}

/// A single component type could not be constructed.
///
/// Recoverable by default: the failure is recorded in the
/// [`BuildReport`](crate::BuildReport) and the component is left out of the
/// bean set.
#[derive(Debug, Clone, Error)]
#[error("Failed to instantiate {component}: {cause}")]
pub struct InstantiationFailure {
    /// Type name of the component
    pub component: &'static str,
    /// Root cause
    #[source]
    pub cause: InstantiationCause,
}

/// Why a constructor did not produce an instance.
#[derive(Debug, Clone, Error)]
pub enum InstantiationCause {
    /// The constructor returned an error
    #[error("constructor returned an error: {0}")]
    Constructor(#[source] Arc<dyn std::error::Error + Send + Sync + 'static>),
    /// The constructor panicked
    #[error("constructor panicked: {0}")]
    Panicked(String),
}

/// A dependency slot could not be filled although candidates were found.
///
/// Recoverable by default: the slot keeps its previous value.
#[derive(Debug, Clone, Error)]
#[error("Failed to inject {component}.{slot} ({required}): {cause}")]
pub struct InjectionFailure {
    /// Type name of the bean that owns the slot
    pub component: &'static str,
    /// Slot name as declared by the component
    pub slot: &'static str,
    /// Type name the slot requires
    pub required: &'static str,
    /// Root cause
    #[source]
    pub cause: InjectionCause,
}

/// Why a slot assignment failed.
#[derive(Debug, Clone, Error)]
pub enum InjectionCause {
    /// The chosen candidate could not be viewed as the slot's type
    #[error("candidate {provided} is not a {required}")]
    TypeMismatch {
        provided: &'static str,
        required: &'static str,
    },
    /// Several candidates match and the policy rejects ambiguity
    #[error("ambiguous candidates: {}", .candidates.join(", "))]
    Ambiguous { candidates: Vec<String> },
}

/// Result type for container operations
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{BeanResult, ContainerError};
///
/// fn lookup() -> BeanResult<u32> {
///     Err(ContainerError::NoSuchBean { requested: "u32" })
/// }
///
/// assert!(lookup().is_err());
/// ```
pub type BeanResult<T> = Result<T, ContainerError>;
