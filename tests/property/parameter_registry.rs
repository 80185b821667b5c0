// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Parameter Registry

use cim_topology::parameters::{keys, ParameterType, PublishedParameter};
use cim_topology::{ConstructionError, ParameterRegistry, Value};
use proptest::prelude::*;

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_-]{0,15}"
}

fn arb_literal() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9:/._-]{1,32}"
}

proptest! {
    /// The last of any number of publications is what resolve returns
    #[test]
    fn prop_last_write_wins(
        namespace in arb_name(),
        name in arb_name(),
        values in prop::collection::vec(arb_literal(), 1..8),
    ) {
        let mut registry = ParameterRegistry::default();
        for value in &values {
            registry.publish(&namespace, &name, value.as_str(), ParameterType::String).unwrap();
        }

        let last = values.last().cloned().map(Value::from);
        prop_assert_eq!(registry.resolve(&namespace, &name).cloned(), last);
        prop_assert_eq!(registry.len(), 1);
        prop_assert_eq!(registry.collisions().len(), values.len() - 1);
    }

    /// A placeholder anywhere in the value is rejected
    #[test]
    fn prop_placeholder_value_rejected(
        prefix in arb_literal(),
        variable in "[a-z.]{1,16}",
        suffix in arb_literal(),
        braces in prop::bool::ANY,
    ) {
        let placeholder = if braces {
            format!("${{{}}}", variable)
        } else {
            format!("{{{{ {} }}}}", variable)
        };
        let value = format!("{}{}{}", prefix, placeholder, suffix);

        let result = PublishedParameter::new("dev", keys::IMAGE_REPO_NAME, value.as_str(), ParameterType::String);
        let rejected = matches!(result, Err(ConstructionError::UnexpandedPlaceholder { .. }));
        prop_assert!(rejected);
    }
}
