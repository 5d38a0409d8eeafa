//! Variant lookup on a single component.

use linkwise_common::types::VariantValue;

use crate::component::Component;
use crate::lookup::Lookup;

/// Returns the value chosen for `variant` on `component`.
///
/// Never fails: an undeclared variant yields [`Lookup::Absent`].
#[must_use]
pub fn get<'c>(component: &'c Component, variant: &str) -> Lookup<&'c VariantValue> {
    let value = component.variants().get(variant);
    tracing::debug!(
        component = %component.name(),
        variant,
        found = value.is_some(),
        "variant lookup"
    );
    value.into()
}

#[cfg(test)]
mod tests {
    use linkwise_common::types::CompilerIdentity;

    use super::*;

    fn root() -> Component {
        Component::new(
            "root",
            CompilerIdentity::new("gcc", "/usr/bin/gcc", "/usr/bin/g++"),
        )
        .with_variant("cxxstd", "20")
        .with_variant("shared", true)
    }

    #[test]
    fn declared_variant_is_found() {
        let component = root();
        assert_eq!(
            get(&component, "cxxstd"),
            Lookup::Found(&VariantValue::Text("20".into()))
        );
        assert_eq!(
            get(&component, "shared"),
            Lookup::Found(&VariantValue::Bool(true))
        );
    }

    #[test]
    fn missing_variant_is_absent() {
        let component = root();
        assert!(get(&component, "cxx_standard").is_absent());
    }

    #[test]
    fn lookup_is_pure() {
        let component = root();
        assert_eq!(get(&component, "cxxstd"), get(&component, "cxxstd"));
        assert_eq!(get(&component, "nope"), get(&component, "nope"));
    }
}
