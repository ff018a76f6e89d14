//! Method interception for container beans.
//!
//! A [`Proxy`] wraps a bean and routes named method calls through the
//! interceptors of every [`Advisor`] whose [`Pointcut`] matches. The built-in
//! [`TransactionInterceptor`] runs the call inside a transaction of an
//! externally supplied [`TransactionManager`]: begin, call, then commit, or
//! roll back when the call fails.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::container::BeanContainer;
use crate::error::BeanResult;
use crate::key::Key;

/// Handle of an open transaction, issued by a [`TransactionManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionStatus {
    id: u64,
}

impl TransactionStatus {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Error reported by a transaction backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransactionError {
    pub message: String,
}

impl TransactionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Transaction backend. Implemented outside this crate.
pub trait TransactionManager: Send + Sync {
    fn begin(&self) -> Result<TransactionStatus, TransactionError>;
    fn commit(&self, status: TransactionStatus) -> Result<(), TransactionError>;
    fn rollback(&self, status: TransactionStatus) -> Result<(), TransactionError>;
}

/// Transaction phase that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionPhase {
    Begin,
    Commit,
}

impl fmt::Display for TransactionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionPhase::Begin => f.write_str("begin"),
            TransactionPhase::Commit => f.write_str("commit"),
        }
    }
}

/// Why an interceptor chain did not complete.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterceptError {
    /// The target call returned an error
    #[error("target call failed")]
    TargetFailed,
    #[error("transaction {phase} failed: {source}")]
    Transaction {
        phase: TransactionPhase,
        #[source]
        source: TransactionError,
    },
    /// An interceptor refused the call
    #[error("call rejected: {0}")]
    Rejected(String),
}

/// Result of [`Proxy::invoke`] when the call did not succeed.
#[derive(Debug, Error)]
pub enum InvocationError<E> {
    /// The target method returned this error; any transaction was rolled back
    #[error("target method failed: {0}")]
    Target(E),
    /// An interceptor failed around `method`
    #[error("advice failed around {method}: {source}")]
    Advice {
        method: &'static str,
        #[source]
        source: InterceptError,
    },
    /// An interceptor returned without proceeding to the target
    #[error("interceptor did not proceed to {method}")]
    NotProceeded { method: &'static str },
}

/// Selects the calls an advisor applies to.
pub trait Pointcut: Send + Sync {
    fn matches(&self, target: &Key, method: &str) -> bool;
}

impl<F> Pointcut for F
where
    F: Fn(&Key, &str) -> bool + Send + Sync,
{
    fn matches(&self, target: &Key, method: &str) -> bool {
        self(target, method)
    }
}

/// Matches an explicit set of method names on any target.
#[derive(Debug, Clone, Default)]
pub struct MethodNamePointcut {
    methods: HashSet<String>,
}

impl MethodNamePointcut {
    pub fn new<I, S>(methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            methods: methods.into_iter().map(Into::into).collect(),
        }
    }
}

impl Pointcut for MethodNamePointcut {
    fn matches(&self, _target: &Key, method: &str) -> bool {
        self.methods.contains(method)
    }
}

/// One step of an intercepted call.
///
/// Consumed by [`proceed`](Self::proceed), which runs the remaining
/// interceptors and then the target.
pub struct MethodInvocation<'a> {
    method: &'static str,
    target: Key,
    interceptors: &'a [Arc<dyn MethodInterceptor>],
    call: &'a mut dyn FnMut() -> Result<(), InterceptError>,
}

impl<'a> MethodInvocation<'a> {
    pub fn method(&self) -> &'static str {
        self.method
    }

    /// Key of the proxied type.
    pub fn target(&self) -> Key {
        self.target
    }

    pub fn proceed(self) -> Result<(), InterceptError> {
        match self.interceptors.split_first() {
            Some((next, rest)) => next.invoke(MethodInvocation {
                method: self.method,
                target: self.target,
                interceptors: rest,
                call: self.call,
            }),
            None => (self.call)(),
        }
    }
}

/// Around advice.
pub trait MethodInterceptor: Send + Sync {
    /// Runs around `invocation`; call [`MethodInvocation::proceed`] to
    /// continue the chain.
    fn invoke(&self, invocation: MethodInvocation<'_>) -> Result<(), InterceptError>;
}

/// Runs the call in a transaction: commit on success, rollback on failure.
pub struct TransactionInterceptor {
    manager: Arc<dyn TransactionManager>,
}

impl TransactionInterceptor {
    pub fn new(manager: Arc<dyn TransactionManager>) -> Self {
        Self { manager }
    }
}

impl MethodInterceptor for TransactionInterceptor {
    fn invoke(&self, invocation: MethodInvocation<'_>) -> Result<(), InterceptError> {
        let method = invocation.method();
        let status = self.manager.begin().map_err(|source| InterceptError::Transaction {
            phase: TransactionPhase::Begin,
            source,
        })?;
        tracing::debug!(method, transaction = status.id(), "transaction started");

        match invocation.proceed() {
            Ok(()) => {
                self.manager.commit(status).map_err(|source| InterceptError::Transaction {
                    phase: TransactionPhase::Commit,
                    source,
                })?;
                tracing::debug!(method, transaction = status.id(), "transaction committed");
                Ok(())
            }
            Err(err) => {
                match self.manager.rollback(status) {
                    Ok(()) => tracing::warn!(
                        method,
                        transaction = status.id(),
                        cause = %err,
                        "transaction rolled back"
                    ),
                    Err(rollback) => tracing::warn!(
                        method,
                        transaction = status.id(),
                        cause = %err,
                        error = %rollback,
                        "transaction rollback failed"
                    ),
                }
                Err(err)
            }
        }
    }
}

/// A pointcut paired with the interceptor it triggers.
#[derive(Clone)]
pub struct Advisor {
    pointcut: Arc<dyn Pointcut>,
    interceptor: Arc<dyn MethodInterceptor>,
}

impl Advisor {
    pub fn new(pointcut: Arc<dyn Pointcut>, interceptor: Arc<dyn MethodInterceptor>) -> Self {
        Self {
            pointcut,
            interceptor,
        }
    }

    /// Transactions around the named methods.
    pub fn transactional<I, S>(manager: Arc<dyn TransactionManager>, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            Arc::new(MethodNamePointcut::new(methods)),
            Arc::new(TransactionInterceptor::new(manager)),
        )
    }

    pub fn matches(&self, target: &Key, method: &str) -> bool {
        self.pointcut.matches(target, method)
    }
}

impl fmt::Debug for Advisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advisor").finish_non_exhaustive()
    }
}

/// Creates proxies that apply a fixed list of advisors.
///
/// # Examples
///
/// ```rust
/// use ferrous_beans::{
///     Advisor, InvocationError, ProxyFactory, TransactionError, TransactionManager,
///     TransactionStatus,
/// };
/// use std::sync::{Arc, Mutex};
///
/// #[derive(Default)]
/// struct Journal(Mutex<Vec<&'static str>>);
///
/// impl TransactionManager for Journal {
///     fn begin(&self) -> Result<TransactionStatus, TransactionError> {
///         self.0.lock().unwrap().push("begin");
///         Ok(TransactionStatus::new(1))
///     }
///     fn commit(&self, _: TransactionStatus) -> Result<(), TransactionError> {
///         self.0.lock().unwrap().push("commit");
///         Ok(())
///     }
///     fn rollback(&self, _: TransactionStatus) -> Result<(), TransactionError> {
///         self.0.lock().unwrap().push("rollback");
///         Ok(())
///     }
/// }
///
/// struct Accounts;
///
/// impl Accounts {
///     fn change_password(&self, password: &str) -> Result<(), String> {
///         if password.is_empty() { Err("empty password".into()) } else { Ok(()) }
///     }
/// }
///
/// let journal = Arc::new(Journal::default());
/// let mut factory = ProxyFactory::new();
/// factory.add_advisor(Advisor::transactional(journal.clone(), ["change_password"]));
///
/// let accounts = factory.proxy(Arc::new(Accounts));
/// accounts.invoke("change_password", |a| a.change_password("s3cret")).unwrap();
///
/// let failed = accounts.invoke("change_password", |a| a.change_password(""));
/// assert!(matches!(failed, Err(InvocationError::Target(ref e)) if e == "empty password"));
/// assert_eq!(*journal.0.lock().unwrap(), ["begin", "commit", "begin", "rollback"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProxyFactory {
    advisors: Vec<Advisor>,
}

impl ProxyFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_advisor(&mut self, advisor: Advisor) -> &mut Self {
        self.advisors.push(advisor);
        self
    }

    /// Wraps `target`. Advisors apply in the order they were added.
    pub fn proxy<T: ?Sized + Send + Sync + 'static>(&self, target: Arc<T>) -> Proxy<T> {
        Proxy {
            target,
            key: Key::of::<T>(),
            advisors: self.advisors.clone(),
        }
    }

    /// Wraps the container's unique bean assignable to `T`.
    pub fn from_container<T: ?Sized + Send + Sync + 'static>(&self, container: &BeanContainer) -> BeanResult<Proxy<T>> {
        Ok(self.proxy(container.get_bean::<T>()?))
    }
}

/// A bean whose method calls can be intercepted.
pub struct Proxy<T: ?Sized> {
    target: Arc<T>,
    key: Key,
    advisors: Vec<Advisor>,
}

impl<T: ?Sized + Send + Sync + 'static> Proxy<T> {
    /// The wrapped bean; calls made on it directly are not intercepted.
    pub fn target(&self) -> &Arc<T> {
        &self.target
    }

    /// Whether any advisor applies to `method`.
    pub fn is_advised(&self, method: &str) -> bool {
        self.advisors.iter().any(|a| a.matches(&self.key, method))
    }

    /// Calls `call` on the target as method `method`, through every matching
    /// interceptor. Methods no advisor matches run directly.
    pub fn invoke<R, E, F>(&self, method: &'static str, call: F) -> Result<R, InvocationError<E>>
    where
        F: FnOnce(&T) -> Result<R, E>,
    {
        let interceptors: Vec<Arc<dyn MethodInterceptor>> = self
            .advisors
            .iter()
            .filter(|a| a.matches(&self.key, method))
            .map(|a| a.interceptor.clone())
            .collect();

        if interceptors.is_empty() {
            return call(&self.target).map_err(InvocationError::Target);
        }

        let target: &T = &self.target;
        let mut pending = Some(call);
        let mut outcome: Option<Result<R, E>> = None;
        let mut run = || -> Result<(), InterceptError> {
            // the target runs at most once, however often proceed is called
            let call = pending.take().ok_or(InterceptError::TargetFailed)?;
            let result = call(target);
            let failed = result.is_err();
            outcome = Some(result);
            if failed {
                Err(InterceptError::TargetFailed)
            } else {
                Ok(())
            }
        };

        let chain = MethodInvocation {
            method,
            target: self.key,
            interceptors: &interceptors,
            call: &mut run,
        };
        let advised = chain.proceed();

        match (advised, outcome) {
            (_, Some(Err(e))) => Err(InvocationError::Target(e)),
            (Ok(()), Some(Ok(value))) => Ok(value),
            (Ok(()), None) => Err(InvocationError::NotProceeded { method }),
            (Err(source), _) => Err(InvocationError::Advice { method, source }),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Proxy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("target", &self.key)
            .field("advisors", &self.advisors.len())
            .finish()
    }
}
