// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Declaration Invariants
//!
//! Every check a declaration must pass before it becomes a node in a stack.
//! All functions are pure and return the [`ConstructionError`] that explains
//! the failure.
//!
//! # Invariant Categories
//!
//! 1. **Structural**: required fields present, numbers in range
//! 2. **Naming**: identifiers usable as resource names and key segments
//! 3. **Substitution**: no template placeholder survives into the plan

use crate::errors::ConstructionError;

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ConstructionError>;

/// Fail when `value` is empty or whitespace
pub fn require_non_empty(field: &str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ConstructionError::MissingField(field.to_string()));
    }
    Ok(())
}

/// Whether `value` still contains `${...}` or `{{...}}` template syntax
pub fn contains_placeholder(value: &str) -> bool {
    let unclosed = |open: &str, close: &str| {
        value
            .match_indices(open)
            .any(|(at, _)| value[at + open.len()..].contains(close))
    };

    unclosed("${", "}") || unclosed("{{", "}}")
}

/// Fail when `value` contains unexpanded template syntax
pub fn reject_placeholder(field: &str, value: &str) -> ValidationResult {
    if contains_placeholder(value) {
        return Err(ConstructionError::UnexpandedPlaceholder {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Validate an identifier used in resource names and parameter key segments
///
/// # Invariants
/// - Non-empty
/// - No placeholder syntax
/// - ASCII alphanumerics, `-`, `_` and `.` only
pub fn validate_name(field: &str, value: &str) -> ValidationResult {
    require_non_empty(field, value)?;
    reject_placeholder(field, value)?;

    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !valid {
        return Err(ConstructionError::InvalidName {
            field: field.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Fail when a compute-unit quantity is not positive
pub fn validate_positive(field: &str, value: i64) -> ValidationResult {
    if value <= 0 {
        return Err(ConstructionError::InvalidNumber {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Fail when a port is zero
pub fn validate_port(field: &str, port: u16) -> ValidationResult {
    validate_positive(field, port as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("/${var.environment}/ecs_cluster" ; "dollar brace")]
    #[test_case("/{{ env }}/ecs_cluster" ; "double brace")]
    #[test_case("prefix-${config.environment}-suffix" ; "embedded")]
    fn test_placeholder_detected(value: &str) {
        assert!(contains_placeholder(value));
        assert!(reject_placeholder("key", value).is_err());
    }

    #[test_case("/dev/ecs_cluster" ; "plain key")]
    #[test_case("cost: $5" ; "lone dollar")]
    #[test_case("{ \"a\": 1 }" ; "json braces")]
    #[test_case("${unclosed" ; "unclosed")]
    fn test_placeholder_not_detected(value: &str) {
        assert!(!contains_placeholder(value));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("environment", "dev").is_ok());
        assert!(validate_name("environment", "prod-eu_1.a").is_ok());
        assert!(validate_name("environment", "").is_err());
        assert!(validate_name("environment", "has space").is_err());
        assert!(validate_name("environment", "${env}").is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("cpu", 256).is_ok());
        assert_eq!(
            validate_positive("cpu", 0),
            Err(ConstructionError::InvalidNumber {
                field: "cpu".into(),
                value: 0
            })
        );
        assert!(validate_positive("memory", -512).is_err());
        assert!(validate_port("container_port", 0).is_err());
    }
}
