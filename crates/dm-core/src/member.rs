use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeTag {
    Void,
    Bool,
    Int,
    Float,
    Str,
    Object { type_name: String },
    Enum { type_name: String },
}

impl TypeTag {
    pub fn object(type_name: impl Into<String>) -> Self {
        Self::Object {
            type_name: type_name.into(),
        }
    }

    pub fn r#enum(type_name: impl Into<String>) -> Self {
        Self::Enum {
            type_name: type_name.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MemberKind {
    Property,
    Method,
    Constant,
    Signal,
    Enum,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub declared_type: TypeTag,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, declared_type: TypeTag) -> Self {
        Self {
            name: name.into(),
            declared_type,
        }
    }
}

/// Immutable description of one accessible member on a host type, in the
/// shape external tooling consumes for member listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDescriptor {
    pub name: String,
    pub kind: MemberKind,
    pub declared_type: TypeTag,
    pub parameters: Vec<ParameterDescriptor>,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>, kind: MemberKind, declared_type: TypeTag) -> Self {
        Self {
            name: name.into(),
            kind,
            declared_type,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<ParameterDescriptor>) -> Self {
        self.parameters = parameters;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_round_trips_through_json() {
        let descriptor = MemberDescriptor::new("take_damage", MemberKind::Method, TypeTag::Int)
            .with_parameters(vec![
                ParameterDescriptor::new("amount", TypeTag::Int),
                ParameterDescriptor::new("critical", TypeTag::Bool),
            ]);

        let json = serde_json::to_value(&descriptor).expect("serialize");
        let back: MemberDescriptor = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, descriptor);
    }

    #[test]
    fn type_tag_helpers_carry_type_names() {
        assert_eq!(
            TypeTag::object("ForestState"),
            TypeTag::Object {
                type_name: "ForestState".to_string()
            }
        );
        assert_eq!(
            TypeTag::r#enum("TimeOfDay"),
            TypeTag::Enum {
                type_name: "TimeOfDay".to_string()
            }
        );
    }
}
