//! Build policies for the container.
//!
//! Options come from code, from environment variables, or (with the `config`
//! feature) from JSON.

use std::env;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{BeanResult, ContainerError};

/// What to do when a single component or slot fails during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum FailurePolicy {
    /// Record the failure and keep building without that bean or slot
    #[default]
    Skip,
    /// Abort the build with the failure
    Abort,
}

/// How the wiring pass treats a slot that several beans satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum AmbiguityPolicy {
    /// Inject the first candidate in registration order
    #[default]
    First,
    /// Leave the slot unchanged and report an injection failure
    Reject,
}

/// Container build options.
///
/// The default reproduces the lenient reference behaviour: failed components
/// are dropped, failed slots are left empty, and ambiguous slots take the
/// first registered candidate.
///
/// # Examples
///
/// ```
/// use ferrous_beans::{AmbiguityPolicy, ContainerOptions, FailurePolicy};
///
/// let options = ContainerOptions::default()
///     .on_instantiation_failure(FailurePolicy::Abort)
///     .ambiguous_slots(AmbiguityPolicy::Reject);
///
/// assert_eq!(options.instantiation_failures, FailurePolicy::Abort);
/// assert_eq!(options.injection_failures, FailurePolicy::Skip);
/// assert_ne!(options, ContainerOptions::strict());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ContainerOptions {
    pub instantiation_failures: FailurePolicy,
    pub injection_failures: FailurePolicy,
    pub ambiguous_slots: AmbiguityPolicy,
}

const INSTANTIATION_VAR: &str = "ON_INSTANTIATION_FAILURE";
const INJECTION_VAR: &str = "ON_INJECTION_FAILURE";
const AMBIGUITY_VAR: &str = "AMBIGUOUS_SLOTS";

impl ContainerOptions {
    /// Every failure aborts the build and ambiguous slots are rejected.
    pub fn strict() -> Self {
        Self {
            instantiation_failures: FailurePolicy::Abort,
            injection_failures: FailurePolicy::Abort,
            ambiguous_slots: AmbiguityPolicy::Reject,
        }
    }

    pub fn on_instantiation_failure(mut self, policy: FailurePolicy) -> Self {
        self.instantiation_failures = policy;
        self
    }

    pub fn on_injection_failure(mut self, policy: FailurePolicy) -> Self {
        self.injection_failures = policy;
        self
    }

    pub fn ambiguous_slots(mut self, policy: AmbiguityPolicy) -> Self {
        self.ambiguous_slots = policy;
        self
    }

    /// Reads options from `{PREFIX}_ON_INSTANTIATION_FAILURE`,
    /// `{PREFIX}_ON_INJECTION_FAILURE` and `{PREFIX}_AMBIGUOUS_SLOTS`.
    ///
    /// Unset variables keep their defaults; unknown values are a
    /// configuration error.
    pub fn from_env(prefix: &str) -> BeanResult<Self> {
        let mut options = Self::default();
        if let Some(value) = env_var(prefix, INSTANTIATION_VAR) {
            options.instantiation_failures = value.parse()?;
        }
        if let Some(value) = env_var(prefix, INJECTION_VAR) {
            options.injection_failures = value.parse()?;
        }
        if let Some(value) = env_var(prefix, AMBIGUITY_VAR) {
            options.ambiguous_slots = value.parse()?;
        }
        Ok(options)
    }

    /// Parses options from JSON, e.g. `{"ambiguous_slots": "reject"}`.
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> BeanResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ContainerError::Configuration(format!("invalid container options: {}", e)))
    }

    /// Loads options from a JSON file.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> BeanResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ContainerError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }
}

fn env_var(prefix: &str, name: &str) -> Option<String> {
    let key = if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}_{}", prefix.to_uppercase(), name)
    };
    env::var(key).ok()
}

impl FromStr for FailurePolicy {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(FailurePolicy::Skip),
            "abort" => Ok(FailurePolicy::Abort),
            other => Err(ContainerError::Configuration(format!(
                "unknown failure policy '{}' (expected skip or abort)",
                other
            ))),
        }
    }
}

impl FromStr for AmbiguityPolicy {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(AmbiguityPolicy::First),
            "reject" => Ok(AmbiguityPolicy::Reject),
            other => Err(ContainerError::Configuration(format!(
                "unknown ambiguity policy '{}' (expected first or reject)",
                other
            ))),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailurePolicy::Skip => f.write_str("skip"),
            FailurePolicy::Abort => f.write_str("abort"),
        }
    }
}

impl fmt::Display for AmbiguityPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmbiguityPolicy::First => f.write_str("first"),
            AmbiguityPolicy::Reject => f.write_str("reject"),
        }
    }
}
