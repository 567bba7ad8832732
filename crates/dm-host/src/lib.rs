pub mod invoke;
pub mod registry;
pub mod resolve;

pub use invoke::DynamicInvoker;
pub use registry::{
    downcast, HostObject, HostObjects, HostTypeRegistry, MemberBinding, MemberDetail, MethodFn,
    MethodFuture, ParameterBinding, PropertyFn, TypeBinding,
};
