//! Updater configuration.
//!
//! The job is configured through four environment variables, set by the
//! update-machine-type API when it creates the Job. Everything is validated
//! once, up front; the resulting `UpdaterConfig` is passed to the updater and
//! the environment is not consulted again.

use crate::error::UpdaterError;
use crate::updater::match_machine_type;
use kubevirt_client::validation::validate_namespace_name;
use kubevirt_client::LabelSelector;

pub const MACHINE_TYPE_GLOB_ENV: &str = "MACHINE_TYPE_GLOB";
pub const NAMESPACE_ENV: &str = "NAMESPACE";
pub const RESTART_REQUIRED_ENV: &str = "RESTART_REQUIRED";
pub const LABEL_SELECTOR_ENV: &str = "LABEL_SELECTOR";

/// Validated updater configuration.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Glob matched against each VM's machine type
    pub machine_type_glob: String,
    /// Namespace whose VMs are updated
    pub namespace: String,
    /// Restart running VMs after their machine type is cleared
    pub restart_required: bool,
    /// Limits which VMs are listed
    pub label_selector: LabelSelector,
}

impl UpdaterConfig {
    /// Loads the configuration from the process environment.
    pub fn from_env() -> Result<Self, UpdaterError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through `lookup`, which returns `None` for
    /// unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, UpdaterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let machine_type_glob = lookup(MACHINE_TYPE_GLOB_ENV)
            .filter(|glob| !glob.is_empty())
            .ok_or_else(|| UpdaterError::InvalidConfig("no machine type was specified".to_string()))?;

        // Match against the empty string to check the pattern is well formed
        if match_machine_type(&machine_type_glob, "").is_err() {
            return Err(UpdaterError::InvalidConfig(format!(
                "syntax error in pattern of {} environment variable, value \"{}\"",
                MACHINE_TYPE_GLOB_ENV, machine_type_glob
            )));
        }

        let namespace = lookup(NAMESPACE_ENV)
            .ok_or_else(|| UpdaterError::InvalidConfig("no namespace was specified".to_string()))?;
        validate_namespace_name(&namespace).map_err(|errs| {
            UpdaterError::InvalidConfig(format!(
                "syntax error in {} environment variable, value \"{}\": {}",
                NAMESPACE_ENV, namespace, errs
            ))
        })?;

        let restart_required = match lookup(RESTART_REQUIRED_ENV) {
            Some(value) => parse_bool(&value).map_err(|reason| {
                UpdaterError::InvalidConfig(format!(
                    "error parsing {} environment variable, value \"{}\": {}",
                    RESTART_REQUIRED_ENV, value, reason
                ))
            })?,
            None => false,
        };

        let label_selector = match lookup(LABEL_SELECTOR_ENV) {
            Some(value) => LabelSelector::parse(&value).map_err(|e| {
                UpdaterError::InvalidConfig(format!(
                    "error parsing {} environment variable, value \"{}\": {}",
                    LABEL_SELECTOR_ENV, value, e
                ))
            })?,
            None => LabelSelector::everything(),
        };

        Ok(Self {
            machine_type_glob,
            namespace,
            restart_required,
            label_selector,
        })
    }
}

/// Parses the boolean spellings accepted by Go's `strconv.ParseBool`, which
/// is what other KubeVirt components write into these variables.
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid syntax for boolean \"{}\"", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<UpdaterConfig, UpdaterError> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        UpdaterConfig::from_lookup(|name| env.get(name).cloned())
    }

    fn message(result: Result<UpdaterConfig, UpdaterError>) -> String {
        match result {
            Err(UpdaterError::InvalidConfig(msg)) => msg,
            Err(other) => panic!("expected InvalidConfig, got {:?}", other),
            Ok(config) => panic!("expected an error, got {:?}", config),
        }
    }

    #[test]
    fn test_missing_machine_type_glob() {
        assert_eq!(message(load(&[])), "no machine type was specified");
        assert_eq!(
            message(load(&[(NAMESPACE_ENV, "default")])),
            "no machine type was specified"
        );
    }

    #[test]
    fn test_empty_machine_type_glob() {
        assert_eq!(
            message(load(&[(MACHINE_TYPE_GLOB_ENV, ""), (NAMESPACE_ENV, "default")])),
            "no machine type was specified"
        );
    }

    #[test]
    fn test_bad_machine_type_glob() {
        let bad_glob = "[--";
        assert_eq!(
            message(load(&[(MACHINE_TYPE_GLOB_ENV, bad_glob), (NAMESPACE_ENV, "default")])),
            format!(
                "syntax error in pattern of {} environment variable, value \"{}\"",
                MACHINE_TYPE_GLOB_ENV, bad_glob
            )
        );
    }

    #[test]
    fn test_double_star_and_negated_class_globs_are_valid() {
        for glob in ["pc-**", "pc-q35-rhel[^78].*", r"pc\*"] {
            let config = load(&[(MACHINE_TYPE_GLOB_ENV, glob), (NAMESPACE_ENV, "default")]).unwrap();
            assert_eq!(config.machine_type_glob, glob);
        }
    }

    #[test]
    fn test_missing_namespace() {
        assert_eq!(
            message(load(&[(MACHINE_TYPE_GLOB_ENV, "*glob8.*")])),
            "no namespace was specified"
        );
    }

    #[test]
    fn test_bad_namespace() {
        let bad_namespace = "bad namespace pattern";
        let msg = message(load(&[
            (MACHINE_TYPE_GLOB_ENV, "*glob8.*"),
            (NAMESPACE_ENV, bad_namespace),
        ]));
        assert!(msg.contains(&format!(
            "syntax error in {} environment variable, value \"{}\"",
            NAMESPACE_ENV, bad_namespace
        )));
    }

    #[test]
    fn test_defaults_for_optional_variables() {
        let config = load(&[(MACHINE_TYPE_GLOB_ENV, "*glob8.*"), (NAMESPACE_ENV, "default")]).unwrap();
        assert_eq!(config.machine_type_glob, "*glob8.*");
        assert_eq!(config.namespace, "default");
        assert!(!config.restart_required);
        assert!(config.label_selector.is_everything());
    }

    #[test]
    fn test_restart_required() {
        let config = load(&[
            (MACHINE_TYPE_GLOB_ENV, "*glob8.*"),
            (NAMESPACE_ENV, "default"),
            (RESTART_REQUIRED_ENV, "true"),
        ])
        .unwrap();
        assert!(config.restart_required);

        let config = load(&[
            (MACHINE_TYPE_GLOB_ENV, "*glob8.*"),
            (NAMESPACE_ENV, "default"),
            (RESTART_REQUIRED_ENV, "false"),
        ])
        .unwrap();
        assert!(!config.restart_required);
    }

    #[test]
    fn test_bad_restart_required() {
        let bad_boolean = "not_a_boolean";
        let msg = message(load(&[
            (MACHINE_TYPE_GLOB_ENV, "*glob8.*"),
            (NAMESPACE_ENV, "default"),
            (RESTART_REQUIRED_ENV, bad_boolean),
        ]));
        assert!(msg.contains(&format!(
            "error parsing {} environment variable, value \"{}\"",
            RESTART_REQUIRED_ENV, bad_boolean
        )));
    }

    #[test]
    fn test_label_selector() {
        let selector = "valid_label in (value1,value2)";
        let config = load(&[
            (MACHINE_TYPE_GLOB_ENV, "*glob8.*"),
            (NAMESPACE_ENV, "default"),
            (LABEL_SELECTOR_ENV, selector),
        ])
        .unwrap();
        assert_eq!(config.label_selector.to_string(), selector);
    }

    #[test]
    fn test_empty_label_selector_matches_everything() {
        // The API always sets LABEL_SELECTOR, possibly to ""
        let config = load(&[
            (MACHINE_TYPE_GLOB_ENV, "*glob8.*"),
            (NAMESPACE_ENV, "default"),
            (RESTART_REQUIRED_ENV, "false"),
            (LABEL_SELECTOR_ENV, ""),
        ])
        .unwrap();
        assert!(config.label_selector.is_everything());
    }

    #[test]
    fn test_bad_label_selector() {
        let bad_selector = "non_a_valid for create error";
        let msg = message(load(&[
            (MACHINE_TYPE_GLOB_ENV, "*glob8.*"),
            (NAMESPACE_ENV, "default"),
            (LABEL_SELECTOR_ENV, bad_selector),
        ]));
        assert!(msg.contains(&format!(
            "error parsing {} environment variable, value \"{}\"",
            LABEL_SELECTOR_ENV, bad_selector
        )));
    }

    #[test]
    fn test_parse_bool_spellings() {
        for value in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(parse_bool(value), Ok(true), "{}", value);
        }
        for value in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(parse_bool(value), Ok(false), "{}", value);
        }
        for value in ["", "yes", "tRUE", " true"] {
            assert!(parse_bool(value).is_err(), "{}", value);
        }
    }
}
