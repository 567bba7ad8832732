use std::sync::Arc;

use dm_core::{BridgeError, DialogueValue, ObjectHandle};

use crate::registry::{
    HostObjects, HostTypeRegistry, MemberBinding, MemberDetail, ParameterBinding, TypeBinding,
};

/// Invokes registry-bound members on live host objects by name, on behalf
/// of the engine's condition and mutation expressions.
pub struct DynamicInvoker {
    registry: Arc<HostTypeRegistry>,
    objects: HostObjects,
}

impl DynamicInvoker {
    pub fn new(registry: Arc<HostTypeRegistry>, objects: HostObjects) -> Self {
        Self { registry, objects }
    }

    pub fn registry(&self) -> &HostTypeRegistry {
        &self.registry
    }

    pub fn objects(&self) -> &HostObjects {
        &self.objects
    }

    pub fn has_member(&self, handle: &ObjectHandle, member: &str) -> bool {
        self.registry
            .type_binding(&handle.type_name)
            .map(|binding| {
                binding
                    .members
                    .iter()
                    .any(|candidate| candidate.descriptor.name == member)
            })
            .unwrap_or(false)
    }

    /// Resolves and invokes the best matching member, awaiting asynchronous
    /// results before returning. A name bound to no member at all resolves
    /// to `DialogueValue::None`; that is a legitimate outcome, not an
    /// error. A member that exists but cannot accept the supplied argument
    /// count is an `Invocation` error instead.
    pub async fn invoke(
        &self,
        handle: &ObjectHandle,
        member: &str,
        args: &[DialogueValue],
    ) -> Result<DialogueValue, BridgeError> {
        let Some(object) = self.objects.get(handle) else {
            return Err(BridgeError::invocation(
                member,
                "receiver object is no longer registered",
            ));
        };
        let Some(binding) = self.registry.type_binding(&handle.type_name) else {
            return Ok(DialogueValue::None);
        };
        let selected = match select_member(binding, member, args.len()) {
            Selection::Member(selected) => selected,
            Selection::NoSuchName => return Ok(DialogueValue::None),
            Selection::ArityMismatch => {
                return Err(BridgeError::invocation(
                    member,
                    format!(
                        "no overload accepts {} argument(s); an unsupplied parameter has no default",
                        args.len()
                    ),
                ))
            }
        };
        match &selected.detail {
            MemberDetail::Property { get } => get(object),
            MemberDetail::Constant { value } => Ok(value.clone()),
            MemberDetail::Method { parameters, invoke } => {
                let bound = self.bind_arguments(member, parameters, args)?;
                invoke(object, bound).await
            }
            MemberDetail::Signal | MemberDetail::Enum { .. } => Ok(DialogueValue::None),
        }
    }

    fn bind_arguments(
        &self,
        member: &str,
        parameters: &[ParameterBinding],
        args: &[DialogueValue],
    ) -> Result<Vec<DialogueValue>, BridgeError> {
        let mut bound = Vec::with_capacity(parameters.len());
        for (index, parameter) in parameters.iter().enumerate() {
            // A supplied argument passes if assignable or convertible;
            // otherwise the declared default fills the slot.
            let coerced = args.get(index).and_then(|arg| {
                self.registry
                    .coerce_argument(arg, &parameter.descriptor.declared_type, member)
                    .ok()
            });
            match coerced.or_else(|| parameter.default.clone()) {
                Some(value) => bound.push(value),
                None => {
                    return Err(BridgeError::invocation(
                        member,
                        format!(
                            "no usable argument for \"{}\" and no default is declared",
                            parameter.descriptor.name
                        ),
                    ))
                }
            }
        }
        Ok(bound)
    }
}

enum Selection<'a> {
    Member(&'a MemberBinding),
    NoSuchName,
    ArityMismatch,
}

// Among members sharing the name, a candidate is a method whose required
// arity fits the supplied count and whose unfilled tail is fully
// defaulted; the LAST candidate in declaration order wins. Properties and
// constants resolve only for zero-argument calls. A name that is bound
// but has no candidate at this arity is a mismatch, not an absence.
fn select_member<'a>(binding: &'a TypeBinding, member: &str, supplied: usize) -> Selection<'a> {
    let mut name_is_bound = false;
    let mut selected = None;
    for candidate in &binding.members {
        if candidate.descriptor.name != member {
            continue;
        }
        name_is_bound = true;
        let fits = match &candidate.detail {
            MemberDetail::Method { parameters, .. } => {
                required_count(parameters) <= supplied
                    && parameters
                        .iter()
                        .skip(supplied)
                        .all(|parameter| parameter.default.is_some())
            }
            MemberDetail::Property { .. }
            | MemberDetail::Constant { .. }
            | MemberDetail::Enum { .. }
            | MemberDetail::Signal => supplied == 0,
        };
        if fits {
            selected = Some(candidate);
        }
    }
    match (selected, name_is_bound) {
        (Some(member), _) => Selection::Member(member),
        (None, false) => Selection::NoSuchName,
        (None, true) => Selection::ArityMismatch,
    }
}

fn required_count(parameters: &[ParameterBinding]) -> usize {
    parameters
        .iter()
        .filter(|parameter| parameter.default.is_none())
        .count()
}
