//! Kubernetes name validation
//!
//! Character-level implementations of the apimachinery rules for namespace
//! names, label keys and label values.

use std::fmt;

const DNS1123_LABEL_MAX_LENGTH: usize = 63;
const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;
const QUALIFIED_NAME_MAX_LENGTH: usize = 63;
const LABEL_VALUE_MAX_LENGTH: usize = 63;

const DNS1123_LABEL_ERR: &str = "a lowercase RFC 1123 label must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character (e.g. 'my-name', or '123-abc')";
const DNS1123_SUBDOMAIN_ERR: &str = "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character (e.g. 'example.com')";
const QUALIFIED_NAME_ERR: &str = "name part must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character (e.g. 'MyName', or 'my.name', or '123-abc')";
const LABEL_VALUE_ERR: &str = "a valid label must be an empty string or consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character (e.g. 'MyValue', or 'my_value', or '12345')";

/// One or more reasons a name was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub Vec<String>);

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

impl std::error::Error for ValidationError {}

fn into_result(errs: Vec<String>) -> Result<(), ValidationError> {
    if errs.is_empty() {
        Ok(())
    } else {
        Err(ValidationError(errs))
    }
}

fn max_len_error(max: usize) -> String {
    format!("must be no more than {} characters", max)
}

fn is_lower_alnum(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

fn is_dns1123_label(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    let last = value.chars().last().unwrap_or(first);
    is_lower_alnum(first)
        && is_lower_alnum(last)
        && value.chars().all(|c| is_lower_alnum(c) || c == '-')
}

fn is_qualified_name_part(value: &str) -> bool {
    let Some(first) = value.chars().next() else {
        return false;
    };
    let last = value.chars().last().unwrap_or(first);
    first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Validates a namespace name (an RFC 1123 DNS label).
pub fn validate_namespace_name(name: &str) -> Result<(), ValidationError> {
    let mut errs = Vec::new();
    if name.len() > DNS1123_LABEL_MAX_LENGTH {
        errs.push(max_len_error(DNS1123_LABEL_MAX_LENGTH));
    }
    if !is_dns1123_label(name) {
        errs.push(DNS1123_LABEL_ERR.to_string());
    }
    into_result(errs)
}

/// Validates an RFC 1123 DNS subdomain (dot separated labels).
pub fn validate_dns1123_subdomain(value: &str) -> Result<(), ValidationError> {
    let mut errs = Vec::new();
    if value.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        errs.push(max_len_error(DNS1123_SUBDOMAIN_MAX_LENGTH));
    }
    if !value.split('.').all(is_dns1123_label) {
        errs.push(DNS1123_SUBDOMAIN_ERR.to_string());
    }
    into_result(errs)
}

/// Validates a label key: `[prefix/]name`.
pub fn validate_qualified_name(value: &str) -> Result<(), ValidationError> {
    let mut errs = Vec::new();
    let (prefix, name) = match value.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, value),
    };

    if name.contains('/') {
        errs.push(format!(
            "a qualified name must consist of a name part optionally prefixed by a DNS subdomain and '/', got {:?}",
            value
        ));
        return into_result(errs);
    }

    if let Some(prefix) = prefix {
        if prefix.is_empty() {
            errs.push("prefix part must be non-empty".to_string());
        } else if let Err(ValidationError(prefix_errs)) = validate_dns1123_subdomain(prefix) {
            errs.extend(prefix_errs.into_iter().map(|e| format!("prefix part {}", e)));
        }
    }

    if name.is_empty() {
        errs.push("name part must be non-empty".to_string());
    } else {
        if name.len() > QUALIFIED_NAME_MAX_LENGTH {
            errs.push(format!("name part {}", max_len_error(QUALIFIED_NAME_MAX_LENGTH)));
        }
        if !is_qualified_name_part(name) {
            errs.push(QUALIFIED_NAME_ERR.to_string());
        }
    }
    into_result(errs)
}

/// Validates a label value; the empty string is allowed.
pub fn validate_label_value(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    let mut errs = Vec::new();
    if value.len() > LABEL_VALUE_MAX_LENGTH {
        errs.push(max_len_error(LABEL_VALUE_MAX_LENGTH));
    }
    if !is_qualified_name_part(value) {
        errs.push(LABEL_VALUE_ERR.to_string());
    }
    into_result(errs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_names() {
        assert!(validate_namespace_name("default").is_ok());
        assert!(validate_namespace_name("filter-namespace").is_ok());
        assert!(validate_namespace_name("ns-123").is_ok());

        assert!(validate_namespace_name("").is_err());
        assert!(validate_namespace_name("bad namespace pattern").is_err());
        assert!(validate_namespace_name("Default").is_err());
        assert!(validate_namespace_name("-leading").is_err());
        assert!(validate_namespace_name("trailing-").is_err());
        assert!(validate_namespace_name("dotted.name").is_err());
        assert!(validate_namespace_name(&"a".repeat(64)).is_err());
        assert!(validate_namespace_name(&"a".repeat(63)).is_ok());
    }

    #[test]
    fn test_namespace_error_lists_every_reason() {
        let err = validate_namespace_name(&format!("{}-", "a".repeat(63))).unwrap_err();
        assert_eq!(err.0.len(), 2);
    }

    #[test]
    fn test_qualified_names() {
        assert!(validate_qualified_name("app").is_ok());
        assert!(validate_qualified_name("valid_label").is_ok());
        assert!(validate_qualified_name("kubevirt.io/memory").is_ok());
        assert!(validate_qualified_name("My.Name-1").is_ok());

        assert!(validate_qualified_name("").is_err());
        assert!(validate_qualified_name("/name").is_err());
        assert!(validate_qualified_name("kubevirt.io/").is_err());
        assert!(validate_qualified_name("a/b/c").is_err());
        assert!(validate_qualified_name("_leading").is_err());
        assert!(validate_qualified_name("Bad_Prefix/name").is_err());
    }

    #[test]
    fn test_label_values() {
        assert!(validate_label_value("").is_ok());
        assert!(validate_label_value("value1").is_ok());
        assert!(validate_label_value("large").is_ok());
        assert!(validate_label_value("has space").is_err());
        assert!(validate_label_value("-dash").is_err());
        assert!(validate_label_value(&"v".repeat(64)).is_err());
    }
}
