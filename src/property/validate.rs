//! Shape checks for declared defaults.

use super::coords::is_coordinates;
use super::types::PropertyKind;
use super::value::PropertyValue;

/// Whether `value` is an acceptable default for a property of `type_name`.
///
/// Type names outside the built-in set are accepted; host-registered types
/// carry no shape contract here.
pub fn is_valid_default_value(type_name: &str, value: &PropertyValue) -> bool {
    let Some(kind) = PropertyKind::from_name(type_name) else {
        return true;
    };

    match kind {
        PropertyKind::Audio
        | PropertyKind::Asset
        | PropertyKind::Color
        | PropertyKind::Map
        | PropertyKind::Model
        | PropertyKind::Src
        | PropertyKind::String => matches!(value, PropertyValue::String(_)),
        PropertyKind::Array => matches!(value, PropertyValue::Array(_)),
        PropertyKind::Boolean => matches!(value, PropertyValue::Bool(_)),
        PropertyKind::Int | PropertyKind::Number | PropertyKind::Time => value.is_number(),
        PropertyKind::Selector | PropertyKind::SelectorAll => {
            matches!(value, PropertyValue::String(_) | PropertyValue::Null)
        }
        PropertyKind::Vec2 | PropertyKind::Vec3 | PropertyKind::Vec4 => {
            kind.arity().is_some_and(|arity| is_coordinates(value, arity))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::coords::Vector;
    use std::collections::BTreeMap;

    fn object(pairs: &[(&str, f64)]) -> PropertyValue {
        PropertyValue::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), PropertyValue::Number(*v)))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    #[test]
    fn scalar_shapes() {
        assert!(is_valid_default_value("boolean", &false.into()));
        assert!(!is_valid_default_value("boolean", &"false".into()));
        assert!(is_valid_default_value("int", &3_i64.into()));
        assert!(is_valid_default_value("number", &0.5.into()));
        assert!(!is_valid_default_value("time", &"10".into()));
        assert!(is_valid_default_value("string", &"".into()));
        assert!(!is_valid_default_value("color", &PropertyValue::Null));
        assert!(is_valid_default_value("array", &PropertyValue::Array(vec![])));
        assert!(!is_valid_default_value("array", &"a,b".into()));
        assert!(!is_valid_default_value("asset", &PropertyValue::Null));
    }

    #[test]
    fn selectors_accept_null() {
        assert!(is_valid_default_value("selector", &PropertyValue::Null));
        assert!(is_valid_default_value("selectorAll", &"#a".into()));
        assert!(!is_valid_default_value("selector", &1_i64.into()));
    }

    #[test]
    fn vectors_need_exact_arity() {
        assert!(!is_valid_default_value("vec3", &object(&[("x", 0.0), ("y", 0.0)])));
        assert!(is_valid_default_value("vec3", &PropertyValue::Null));
        assert!(is_valid_default_value("vec3", &object(&[("x", 0.0), ("y", 0.0), ("z", 0.0)])));
        assert!(!is_valid_default_value(
            "vec2",
            &object(&[("x", 0.0), ("y", f64::INFINITY)])
        ));
        assert!(is_valid_default_value("vec4", &Vector::vec4(0.0, 0.0, 0.0, 1.0).into()));
        assert!(!is_valid_default_value("vec4", &Vector::vec3(0.0, 0.0, 0.0).into()));
        assert!(!is_valid_default_value("vec2", &"0 0".into()));
    }

    #[test]
    fn unknown_types_pass() {
        assert!(is_valid_default_value("quaternion", &"anything".into()));
    }
}
