//! # ferrous-beans
//!
//! A small, type-driven bean container: instantiate a fixed set of component
//! types, wire their dependency slots by type, and look the finished beans up.
//!
//! ## Features
//!
//! - **One bean per type**: every registered component type is instantiated
//!   exactly once, in registration order
//! - **Wiring by type**: each [`Inject<T>`] slot receives the first other bean
//!   assignable to `T`, where `T` may be a `dyn Trait` the bean provides
//! - **Failure isolation**: a failing or panicking constructor excludes only
//!   that component, unless [`FailurePolicy::Abort`] is configured
//! - **Loud ambiguity**: lookups never guess; [`ContainerError::AmbiguousBean`]
//!   names the candidates and [`BeanContainer::get_named`] picks one
//! - **Structured diagnostics**: a [`BuildReport`] plus pluggable
//!   [`ContainerObserver`]s instead of global logging
//! - **Thread-safe**: the built container is `Send + Sync` and cheap to clone
//!
//! ## Quick Start
//!
//! ```rust
//! use ferrous_beans::{BeanContainer, Component, ComponentRegistry, ComponentType, Dependency, Inject};
//! use std::sync::Arc;
//!
//! pub trait PaymentGateway: Send + Sync {
//!     fn charge(&self, cents: u64) -> Result<(), String>;
//! }
//!
//! #[derive(Default)]
//! pub struct FakeGateway;
//! impl Component for FakeGateway {}
//! impl PaymentGateway for FakeGateway {
//!     fn charge(&self, _cents: u64) -> Result<(), String> {
//!         Ok(())
//!     }
//! }
//!
//! #[derive(Default)]
//! pub struct OrderService {
//!     gateway: Inject<dyn PaymentGateway>,
//! }
//!
//! impl Component for OrderService {
//!     fn dependencies(&self) -> Vec<Dependency<'_>> {
//!         vec![Dependency::new("gateway", &self.gateway)]
//!     }
//! }
//!
//! #[derive(Default)]
//! pub struct LoggerUtil;
//! impl Component for LoggerUtil {}
//!
//! let mut registry = ComponentRegistry::new();
//! registry
//!     .register(ComponentType::of::<OrderService>())
//!     .register(
//!         ComponentType::define::<FakeGateway>()
//!             .provides::<dyn PaymentGateway>(|c| c as Arc<dyn PaymentGateway>),
//!     )
//!     .register(ComponentType::of::<LoggerUtil>());
//!
//! let container = BeanContainer::build(registry).unwrap();
//! assert_eq!(container.len(), 3);
//!
//! let orders = container.get_bean::<OrderService>().unwrap();
//! let gateway = container.get_bean::<dyn PaymentGateway>().unwrap();
//! assert!(Arc::ptr_eq(&orders.gateway.get().unwrap(), &gateway));
//! assert!(container.report().is_clean());
//! ```
//!
//! ## Cargo features
//!
//! - `parking-lot`: `parking_lot` locks for dependency slots
//! - `ahash`: faster hashing for the bean index
//! - `config`: serde support and JSON loading for [`ContainerOptions`]
//! - `graph-export`: JSON/YAML wiring graph export
//! - `performance`: `parking-lot` + `ahash`

// Module declarations
pub mod aop;
pub mod arena;
pub mod collection;
pub mod component;
pub mod config;
pub mod container;
pub mod descriptors;
pub mod error;
pub mod graph_export;
pub mod inject;
pub mod instantiate;
pub mod key;
pub mod observer;
pub mod report;
pub mod resolver;

// Internal modules
mod internal;

// Re-export core types
pub use aop::{
    Advisor, InterceptError, InvocationError, MethodInterceptor, MethodInvocation, MethodNamePointcut,
    Pointcut, Proxy, ProxyFactory, TransactionError, TransactionInterceptor, TransactionManager,
    TransactionPhase, TransactionStatus,
};
pub use arena::BeanArena;
pub use collection::ComponentRegistry;
pub use component::{Component, ComponentDef, ComponentType, Dependency, Provision};
pub use config::{AmbiguityPolicy, ContainerOptions, FailurePolicy};
pub use container::BeanContainer;
pub use descriptors::{BeanDescriptor, SlotDescriptor};
pub use error::{
    BeanResult, BoxError, ContainerError, InjectionCause, InjectionFailure, InstantiationCause,
    InstantiationFailure,
};
pub use graph_export::{ExportFormat, GraphEdge, GraphMetadata, GraphNode, UnresolvedEdge, WiringGraph};
pub use inject::{Inject, Slot};
pub use instantiate::{Bean, BeanId, BeanInstantiator};
pub use key::{key_of_type, Key};
pub use observer::{ContainerObserver, MetricsObserver, TracingObserver};
pub use report::{BuildReport, BuildSummary, UnresolvedSlot, WiredSlot, WiringReport};
pub use resolver::DependencyResolver;
