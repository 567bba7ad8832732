use dm_core::{MemberDescriptor, MemberKind, TypeTag};

use crate::registry::{HostTypeRegistry, MemberDetail};

impl HostTypeRegistry {
    /// Descriptors for every accessible member of `type_name`, in
    /// declaration order. An enumeration type yields one `Constant`
    /// descriptor per declared variant and exposes nothing beyond the name.
    /// `None` means no such type is bound.
    pub fn list_members(&self, type_name: &str) -> Option<Vec<MemberDescriptor>> {
        if let Some(binding) = self.enum_binding(type_name) {
            return Some(
                binding
                    .variants
                    .iter()
                    .map(|(name, _)| {
                        MemberDescriptor::new(name, MemberKind::Constant, TypeTag::r#enum(type_name))
                    })
                    .collect(),
            );
        }
        self.type_binding(type_name).map(|binding| {
            binding
                .members
                .iter()
                .map(|member| member.descriptor.clone())
                .collect()
        })
    }

    /// Walks a dotted member chain left to right, resolving each segment
    /// against the previous segment's result type. Fails fast with `None`
    /// the moment a segment is not a property, constant, or nested
    /// enumeration type on the current type. Methods do not chain.
    pub fn resolve_chain(&self, root_type: &str, segments: &[&str]) -> Option<TypeTag> {
        let mut current = root_type.to_string();
        let mut resolved = None;
        for segment in segments {
            let tag = self.resolve_segment(&current, segment)?;
            current = match &tag {
                TypeTag::Object { type_name } | TypeTag::Enum { type_name } => type_name.clone(),
                // primitives terminate the chain
                _ => String::new(),
            };
            resolved = Some(tag);
        }
        resolved
    }

    fn resolve_segment(&self, type_name: &str, segment: &str) -> Option<TypeTag> {
        if let Some(binding) = self.enum_binding(type_name) {
            return binding
                .variants
                .iter()
                .any(|(name, _)| name == segment)
                .then(|| TypeTag::r#enum(type_name));
        }
        let binding = self.type_binding(type_name)?;
        binding.members.iter().find_map(|member| {
            if member.descriptor.name != segment {
                return None;
            }
            match &member.detail {
                MemberDetail::Property { .. } | MemberDetail::Constant { .. } => {
                    Some(member.descriptor.declared_type.clone())
                }
                MemberDetail::Enum { enum_type } => Some(TypeTag::r#enum(enum_type)),
                MemberDetail::Method { .. } | MemberDetail::Signal => None,
            }
        })
    }
}
