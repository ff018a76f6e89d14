/// Container option loading from the environment and from JSON
///
/// Environment tests mutate process-wide state and run serially.

use ferrous_beans::{AmbiguityPolicy, ContainerError, ContainerOptions, FailurePolicy};
use serial_test::serial;
use std::env;

const VARS: [&str; 3] = [
    "BEANS_ON_INSTANTIATION_FAILURE",
    "BEANS_ON_INJECTION_FAILURE",
    "BEANS_AMBIGUOUS_SLOTS",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_from_env_defaults_when_unset() {
    clear_env();
    let options = ContainerOptions::from_env("beans").unwrap();
    assert_eq!(options, ContainerOptions::default());
}

#[test]
#[serial]
fn test_from_env_reads_every_policy() {
    clear_env();
    env::set_var("BEANS_ON_INSTANTIATION_FAILURE", "abort");
    env::set_var("BEANS_ON_INJECTION_FAILURE", " Abort ");
    env::set_var("BEANS_AMBIGUOUS_SLOTS", "REJECT");

    let options = ContainerOptions::from_env("beans");
    clear_env();

    assert_eq!(options.unwrap(), ContainerOptions::strict());
}

#[test]
#[serial]
fn test_from_env_rejects_unknown_values() {
    clear_env();
    env::set_var("BEANS_AMBIGUOUS_SLOTS", "random");

    let result = ContainerOptions::from_env("beans");
    clear_env();

    match result {
        Err(ContainerError::Configuration(message)) => assert!(message.contains("random")),
        other => panic!("expected a configuration error, got {:?}", other),
    }
}

#[test]
#[serial]
fn test_from_env_with_empty_prefix() {
    env::set_var("ON_INJECTION_FAILURE", "abort");
    let options = ContainerOptions::from_env("");
    env::remove_var("ON_INJECTION_FAILURE");

    let options = options.unwrap();
    assert_eq!(options.injection_failures, FailurePolicy::Abort);
    assert_eq!(options.instantiation_failures, FailurePolicy::Skip);
}

#[cfg(feature = "config")]
mod json {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = ContainerOptions::from_json_str(r#"{"ambiguous_slots": "reject"}"#).unwrap();
        assert_eq!(options.ambiguous_slots, AmbiguityPolicy::Reject);
        assert_eq!(options.instantiation_failures, FailurePolicy::Skip);
    }

    #[test]
    fn test_invalid_json_is_a_configuration_error() {
        let result = ContainerOptions::from_json_str(r#"{"ambiguous_slots": "sometimes"}"#);
        assert!(matches!(result, Err(ContainerError::Configuration(_))));
    }

    #[test]
    fn test_from_json_file() {
        let path = env::temp_dir().join(format!("ferrous-beans-options-{}.json", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"instantiation_failures": "abort", "injection_failures": "abort", "ambiguous_slots": "reject"}}"#
        )
        .unwrap();
        drop(file);

        let options = ContainerOptions::from_json_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(options.unwrap(), ContainerOptions::strict());
    }

    #[test]
    fn test_missing_file_is_a_configuration_error() {
        let result = ContainerOptions::from_json_file("/nonexistent/ferrous-beans.json");
        assert!(matches!(result, Err(ContainerError::Configuration(_))));
    }
}

#[test]
fn test_policies_parse_and_display() {
    assert_eq!("skip".parse::<FailurePolicy>().unwrap(), FailurePolicy::Skip);
    assert_eq!("first".parse::<AmbiguityPolicy>().unwrap(), AmbiguityPolicy::First);
    assert_eq!(FailurePolicy::Abort.to_string(), "abort");
    assert_eq!(AmbiguityPolicy::Reject.to_string(), "reject");
}
