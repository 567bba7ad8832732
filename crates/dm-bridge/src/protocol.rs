use dm_core::{DialogueValue, MutationBehaviour, MutationDescriptor};
use serde::{Deserialize, Serialize};

/// Opaque reference to a compiled dialogue resource held by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHandle(pub String);

impl ResourceHandle {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineRequest {
    NextLine {
        correlation_id: u64,
        resource: ResourceHandle,
        start_key: String,
        extra_state: Vec<DialogueValue>,
        mutation_behaviour: MutationBehaviour,
    },
    LineOnly {
        correlation_id: u64,
        resource: ResourceHandle,
        key: String,
        extra_state: Vec<DialogueValue>,
    },
    Mutation {
        correlation_id: u64,
        mutation: MutationDescriptor,
        extra_state: Vec<DialogueValue>,
        is_inline: bool,
    },
}

impl EngineRequest {
    pub fn correlation_id(&self) -> u64 {
        match self {
            Self::NextLine { correlation_id, .. }
            | Self::LineOnly { correlation_id, .. }
            | Self::Mutation { correlation_id, .. } => *correlation_id,
        }
    }

    pub fn kind(&self) -> CompletionKind {
        match self {
            Self::NextLine { .. } => CompletionKind::NextLine,
            Self::LineOnly { .. } => CompletionKind::LineOnly,
            Self::Mutation { .. } => CompletionKind::Mutation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompletionKind {
    NextLine,
    LineOnly,
    Mutation,
    Resolved,
}

/// One event on the engine's completion stream. The leading correlation id
/// is the only routing key; callers discard completions that are not theirs.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub kind: CompletionKind,
    pub correlation_id: u64,
    pub payload: CompletionPayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompletionPayload {
    /// A dialogue line, or none when playback reached an end.
    Line(Option<serde_json::Value>),
    Mutated,
    /// A host member invocation settled, with its converted result or none.
    Resolved(Option<DialogueValue>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_accessors_cover_every_kind() {
        let requests = [
            EngineRequest::NextLine {
                correlation_id: 1,
                resource: ResourceHandle::new("forest.dialogue"),
                start_key: "start".to_string(),
                extra_state: Vec::new(),
                mutation_behaviour: MutationBehaviour::Wait,
            },
            EngineRequest::LineOnly {
                correlation_id: 2,
                resource: ResourceHandle::new("forest.dialogue"),
                key: "5".to_string(),
                extra_state: Vec::new(),
            },
            EngineRequest::Mutation {
                correlation_id: 3,
                mutation: MutationDescriptor::default(),
                extra_state: Vec::new(),
                is_inline: false,
            },
        ];

        let ids: Vec<u64> = requests.iter().map(EngineRequest::correlation_id).collect();
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(requests[0].kind(), CompletionKind::NextLine);
        assert_eq!(requests[1].kind(), CompletionKind::LineOnly);
        assert_eq!(requests[2].kind(), CompletionKind::Mutation);
    }
}
