use thiserror::Error;

/// Bridge-level failures. Member and chain resolution misses are not errors
/// and are reported as `None` by the resolver instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("dialogue engine did not register within {ticks} scheduling ticks")]
    SingletonUnavailable { ticks: u32 },

    #[error("cannot invoke \"{member}\": {reason}")]
    Invocation { member: String, reason: String },

    #[error("unsupported value of kind {type_name} while resolving \"{member}\"")]
    UnsupportedValue { member: String, type_name: String },

    #[error("dialogue engine channel is closed")]
    EngineClosed,

    #[error("malformed dialogue line payload: {detail}")]
    MalformedLine { detail: String },
}

impl BridgeError {
    pub fn invocation(member: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invocation {
            member: member.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported_value(member: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self::UnsupportedValue {
            member: member.into(),
            type_name: type_name.into(),
        }
    }
}
