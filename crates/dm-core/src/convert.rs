use serde::{Deserialize, Serialize};

use crate::error::BridgeError;
use crate::member::TypeTag;
use crate::value::DialogueValue;

/// Name-to-integral mapping for one host enumeration, built from its
/// declared variants only, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumBinding {
    pub type_name: String,
    pub variants: Vec<(String, i64)>,
}

impl EnumBinding {
    pub fn new(type_name: impl Into<String>, variants: &[(&str, i64)]) -> Self {
        Self {
            type_name: type_name.into(),
            variants: variants
                .iter()
                .map(|(name, value)| ((*name).to_string(), *value))
                .collect(),
        }
    }

    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|(variant, _)| variant == name)
            .map(|(_, value)| *value)
    }

    pub fn name_of(&self, value: i64) -> Option<&str> {
        self.variants
            .iter()
            .find(|(_, variant)| *variant == value)
            .map(|(name, _)| name.as_str())
    }

    pub fn to_value(&self, name: &str) -> Option<DialogueValue> {
        self.value_of(name).map(DialogueValue::Int)
    }
}

pub fn is_assignable(value: &DialogueValue, target: &TypeTag) -> bool {
    match (value, target) {
        (DialogueValue::Bool(_), TypeTag::Bool)
        | (DialogueValue::Int(_), TypeTag::Int)
        | (DialogueValue::Float(_), TypeTag::Float)
        | (DialogueValue::Str(_), TypeTag::Str) => true,
        // Enumerations travel as their underlying integral representation.
        (DialogueValue::Int(_), TypeTag::Enum { .. }) => true,
        (DialogueValue::Object(handle), TypeTag::Object { type_name }) => {
            handle.type_name == *type_name
        }
        _ => false,
    }
}

/// Identity for directly assignable values, widening/narrowing between the
/// two numeric kinds, `UnsupportedValue` for everything else.
pub fn coerce(
    value: &DialogueValue,
    target: &TypeTag,
    member: &str,
) -> Result<DialogueValue, BridgeError> {
    if is_assignable(value, target) {
        return Ok(value.clone());
    }
    match (value, target) {
        (DialogueValue::Int(v), TypeTag::Float) => Ok(DialogueValue::Float(*v as f64)),
        (DialogueValue::Float(v), TypeTag::Int) => Ok(DialogueValue::Int(*v as i64)),
        _ => Err(BridgeError::unsupported_value(member, value.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ObjectHandle;

    fn time_of_day() -> EnumBinding {
        EnumBinding::new(
            "TimeOfDay",
            &[("Dawn", 0), ("Noon", 1), ("Dusk", 2), ("Midnight", 3)],
        )
    }

    #[test]
    fn enum_round_trips_by_name() {
        let binding = time_of_day();
        for (name, _) in &binding.variants {
            let value = binding.value_of(name).expect("declared variant");
            assert_eq!(binding.name_of(value), Some(name.as_str()));
        }
    }

    #[test]
    fn enum_lookup_misses_are_none() {
        let binding = time_of_day();
        assert_eq!(binding.value_of("Twilight"), None);
        assert_eq!(binding.name_of(9), None);
    }

    #[test]
    fn direct_assignment_is_identity() {
        let value = DialogueValue::Str("hi".to_string());
        assert_eq!(coerce(&value, &TypeTag::Str, "greet"), Ok(value));
    }

    #[test]
    fn numeric_kinds_widen_and_narrow() {
        assert_eq!(
            coerce(&DialogueValue::Int(3), &TypeTag::Float, "speed"),
            Ok(DialogueValue::Float(3.0))
        );
        assert_eq!(
            coerce(&DialogueValue::Float(2.9), &TypeTag::Int, "count"),
            Ok(DialogueValue::Int(2))
        );
    }

    #[test]
    fn unsupported_conversion_names_member_and_kind() {
        let handle = DialogueValue::Object(ObjectHandle {
            type_name: "ForestState".to_string(),
            id: 1,
        });
        assert_eq!(
            coerce(&handle, &TypeTag::Int, "set_health"),
            Err(BridgeError::unsupported_value("set_health", "object"))
        );
    }

    #[test]
    fn object_assignment_requires_matching_type_name() {
        let handle = DialogueValue::Object(ObjectHandle {
            type_name: "ForestState".to_string(),
            id: 1,
        });
        assert!(is_assignable(&handle, &TypeTag::object("ForestState")));
        assert!(!is_assignable(&handle, &TypeTag::object("TownState")));
    }
}
