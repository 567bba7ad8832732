use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use dm_core::{
    BridgeError, DialogueValue, EnumBinding, MemberDescriptor, MemberKind, ObjectHandle,
    ParameterDescriptor, TypeTag,
};

/// A host object the dialogue engine may call into. Implementors downcast
/// back to their concrete type inside their binding closures via
/// [`downcast`].
pub trait HostObject: Send + Sync + 'static {
    fn type_name(&self) -> &'static str;
    fn as_any(&self) -> &dyn Any;
}

pub type MethodFuture = Pin<Box<dyn Future<Output = Result<DialogueValue, BridgeError>> + Send>>;
pub type MethodFn =
    Arc<dyn Fn(Arc<dyn HostObject>, Vec<DialogueValue>) -> MethodFuture + Send + Sync>;
pub type PropertyFn =
    Arc<dyn Fn(Arc<dyn HostObject>) -> Result<DialogueValue, BridgeError> + Send + Sync>;

pub fn downcast<'a, T: HostObject>(
    object: &'a Arc<dyn HostObject>,
    member: &str,
) -> Result<&'a T, BridgeError> {
    object.as_any().downcast_ref::<T>().ok_or_else(|| {
        BridgeError::invocation(
            member,
            format!("receiver is a {}, not the bound type", object.type_name()),
        )
    })
}

#[derive(Clone)]
pub struct ParameterBinding {
    pub descriptor: ParameterDescriptor,
    pub default: Option<DialogueValue>,
}

impl ParameterBinding {
    pub fn required(name: impl Into<String>, declared_type: TypeTag) -> Self {
        Self {
            descriptor: ParameterDescriptor::new(name, declared_type),
            default: None,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        declared_type: TypeTag,
        default: DialogueValue,
    ) -> Self {
        Self {
            descriptor: ParameterDescriptor::new(name, declared_type),
            default: Some(default),
        }
    }
}

#[derive(Clone)]
pub enum MemberDetail {
    Property {
        get: PropertyFn,
    },
    Method {
        parameters: Vec<ParameterBinding>,
        invoke: MethodFn,
    },
    Constant {
        value: DialogueValue,
    },
    Signal,
    Enum {
        enum_type: String,
    },
}

#[derive(Clone)]
pub struct MemberBinding {
    pub descriptor: MemberDescriptor,
    pub detail: MemberDetail,
}

/// All bound members of one host type, in declaration order. Duplicate
/// names are overloads; declaration order decides which one wins.
#[derive(Clone)]
pub struct TypeBinding {
    pub type_name: String,
    pub members: Vec<MemberBinding>,
}

impl TypeBinding {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            members: Vec::new(),
        }
    }

    pub fn property(
        mut self,
        name: impl Into<String>,
        declared_type: TypeTag,
        get: impl Fn(Arc<dyn HostObject>) -> Result<DialogueValue, BridgeError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        let name = name.into();
        self.members.push(MemberBinding {
            descriptor: MemberDescriptor::new(&name, MemberKind::Property, declared_type),
            detail: MemberDetail::Property { get: Arc::new(get) },
        });
        self
    }

    pub fn constant(mut self, name: impl Into<String>, value: DialogueValue) -> Self {
        let name = name.into();
        let declared_type = match &value {
            DialogueValue::Bool(_) => TypeTag::Bool,
            DialogueValue::Int(_) => TypeTag::Int,
            DialogueValue::Float(_) => TypeTag::Float,
            DialogueValue::Str(_) => TypeTag::Str,
            DialogueValue::Object(handle) => TypeTag::object(&handle.type_name),
            DialogueValue::None => TypeTag::Void,
        };
        self.members.push(MemberBinding {
            descriptor: MemberDescriptor::new(&name, MemberKind::Constant, declared_type),
            detail: MemberDetail::Constant { value },
        });
        self
    }

    pub fn signal(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.members.push(MemberBinding {
            descriptor: MemberDescriptor::new(&name, MemberKind::Signal, TypeTag::Void),
            detail: MemberDetail::Signal,
        });
        self
    }

    pub fn nested_enum(mut self, name: impl Into<String>, enum_type: impl Into<String>) -> Self {
        let name = name.into();
        let enum_type = enum_type.into();
        self.members.push(MemberBinding {
            descriptor: MemberDescriptor::new(&name, MemberKind::Enum, TypeTag::r#enum(&enum_type)),
            detail: MemberDetail::Enum { enum_type },
        });
        self
    }

    pub fn method(
        mut self,
        name: impl Into<String>,
        declared_type: TypeTag,
        parameters: Vec<ParameterBinding>,
        invoke: impl Fn(Arc<dyn HostObject>, Vec<DialogueValue>) -> MethodFuture
            + Send
            + Sync
            + 'static,
    ) -> Self {
        let name = name.into();
        let descriptor = MemberDescriptor::new(&name, MemberKind::Method, declared_type)
            .with_parameters(
                parameters
                    .iter()
                    .map(|parameter| parameter.descriptor.clone())
                    .collect(),
            );
        self.members.push(MemberBinding {
            descriptor,
            detail: MemberDetail::Method {
                parameters,
                invoke: Arc::new(invoke),
            },
        });
        self
    }
}

/// Capability table mapping exposed host types to their members, built
/// explicitly at startup.
#[derive(Default, Clone)]
pub struct HostTypeRegistry {
    types: BTreeMap<String, TypeBinding>,
    enums: BTreeMap<String, EnumBinding>,
}

impl HostTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_type(&mut self, binding: TypeBinding) {
        self.types.insert(binding.type_name.clone(), binding);
    }

    pub fn register_enum(&mut self, binding: EnumBinding) {
        self.enums.insert(binding.type_name.clone(), binding);
    }

    pub fn type_binding(&self, type_name: &str) -> Option<&TypeBinding> {
        self.types.get(type_name)
    }

    pub fn enum_binding(&self, type_name: &str) -> Option<&EnumBinding> {
        self.enums.get(type_name)
    }

    /// Argument coercion with enum awareness: an enum-typed parameter
    /// accepts the underlying integral or a declared variant name.
    pub fn coerce_argument(
        &self,
        value: &DialogueValue,
        target: &TypeTag,
        member: &str,
    ) -> Result<DialogueValue, BridgeError> {
        if let TypeTag::Enum { type_name } = target {
            if let Some(binding) = self.enums.get(type_name) {
                match value {
                    DialogueValue::Int(_) => return Ok(value.clone()),
                    DialogueValue::Str(name) => {
                        if let Some(found) = binding.to_value(name) {
                            return Ok(found);
                        }
                    }
                    _ => {}
                }
            }
            return Err(BridgeError::unsupported_value(member, value.type_name()));
        }
        dm_core::coerce(value, target, member)
    }
}

#[derive(Default)]
struct ObjectTable {
    next_id: u64,
    objects: HashMap<u64, Arc<dyn HostObject>>,
}

/// Live table of host objects the engine holds handles to.
#[derive(Default, Clone)]
pub struct HostObjects {
    inner: Arc<Mutex<ObjectTable>>,
}

impl HostObjects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, object: Arc<dyn HostObject>) -> ObjectHandle {
        let mut table = self.lock();
        table.next_id += 1;
        let handle = ObjectHandle {
            type_name: object.type_name().to_string(),
            id: table.next_id,
        };
        table.objects.insert(handle.id, object);
        handle
    }

    pub fn get(&self, handle: &ObjectHandle) -> Option<Arc<dyn HostObject>> {
        self.lock().objects.get(&handle.id).cloned()
    }

    pub fn release(&self, handle: &ObjectHandle) -> bool {
        self.lock().objects.remove(&handle.id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().objects.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ObjectTable> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
