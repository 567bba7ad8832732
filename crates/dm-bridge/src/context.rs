use std::sync::{Arc, Mutex};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use dm_core::{BridgeError, DialogueLine, DialogueValue, MutationBehaviour, MutationDescriptor};
use dm_host::DynamicInvoker;

use crate::engine::{EngineHandle, EngineSlot};
use crate::events::BridgeEvents;
use crate::protocol::{CompletionPayload, EngineRequest, ResourceHandle};

/// Correlation-id source owned by the context. Ids only need to be
/// unpredictable enough to never collide across in-flight requests from
/// this process.
pub struct CorrelationIds {
    rng: Mutex<SmallRng>,
}

impl CorrelationIds {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(SmallRng::from_entropy()),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(SmallRng::seed_from_u64(seed)),
        }
    }

    pub fn next(&self) -> u64 {
        self.rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .gen()
    }
}

impl Default for CorrelationIds {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything one bridge instance needs, threaded explicitly instead of
/// reached through globals: the engine handle, the host invoker, the
/// lifecycle event bus, and the correlation-id source.
pub struct BridgeContext {
    pub(crate) engine: EngineHandle,
    pub(crate) invoker: Arc<DynamicInvoker>,
    pub(crate) events: BridgeEvents,
    pub(crate) ids: CorrelationIds,
}

impl BridgeContext {
    pub fn new(engine: EngineHandle, invoker: Arc<DynamicInvoker>, events: BridgeEvents) -> Self {
        Self {
            engine,
            invoker,
            events,
            ids: CorrelationIds::new(),
        }
    }

    /// Discovers the engine through its slot, then builds the context.
    /// Fails with `SingletonUnavailable` when the engine never registers
    /// within the discovery bound.
    pub async fn connect(
        slot: &EngineSlot,
        invoker: Arc<DynamicInvoker>,
        events: BridgeEvents,
    ) -> Result<Self, BridgeError> {
        let engine = slot.discover().await?;
        Ok(Self::new(engine, invoker, events))
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn invoker(&self) -> &DynamicInvoker {
        &self.invoker
    }

    pub fn events(&self) -> &BridgeEvents {
        &self.events
    }

    /// Requests the next playable line starting at `start_key`. `None`
    /// means playback reached an end.
    pub async fn get_next_dialogue_line(
        &self,
        resource: ResourceHandle,
        start_key: impl Into<String>,
        extra_state: Vec<DialogueValue>,
        mutation_behaviour: MutationBehaviour,
    ) -> Result<Option<DialogueLine>, BridgeError> {
        let request = EngineRequest::NextLine {
            correlation_id: self.ids.next(),
            resource: resource.clone(),
            start_key: start_key.into(),
            extra_state,
            mutation_behaviour,
        };
        match self.call(request).await? {
            CompletionPayload::Line(Some(data)) => {
                let line = parse_line(data)?;
                self.events.emit_got_dialogue(line.clone());
                Ok(Some(line))
            }
            CompletionPayload::Line(None) => {
                self.events.emit_dialogue_ended(resource);
                Ok(None)
            }
            _ => Err(unexpected_payload()),
        }
    }

    /// Fetches a single line by key without advancing playback.
    pub async fn get_line(
        &self,
        resource: ResourceHandle,
        key: impl Into<String>,
        extra_state: Vec<DialogueValue>,
    ) -> Result<Option<DialogueLine>, BridgeError> {
        let request = EngineRequest::LineOnly {
            correlation_id: self.ids.next(),
            resource,
            key: key.into(),
            extra_state,
        };
        match self.call(request).await? {
            CompletionPayload::Line(Some(data)) => Ok(Some(parse_line(data)?)),
            CompletionPayload::Line(None) => Ok(None),
            _ => Err(unexpected_payload()),
        }
    }

    /// Runs one mutation to completion on the engine.
    pub async fn mutate(
        &self,
        mutation: MutationDescriptor,
        extra_state: Vec<DialogueValue>,
        is_inline: bool,
    ) -> Result<(), BridgeError> {
        let request = EngineRequest::Mutation {
            correlation_id: self.ids.next(),
            mutation: mutation.clone(),
            extra_state,
            is_inline,
        };
        match self.call(request).await? {
            CompletionPayload::Mutated => {
                self.events.emit_mutated(mutation);
                Ok(())
            }
            _ => Err(unexpected_payload()),
        }
    }

    /// The correlation exchange, identical for every request kind: register
    /// a waiter keyed by this call's kind and id, dispatch, then await the
    /// one completion routed to it. Completions tagged for other callers
    /// never reach this waiter, and the reply channel cannot drop an event
    /// the way a lagging stream subscriber would.
    pub(crate) async fn call(
        &self,
        request: EngineRequest,
    ) -> Result<CompletionPayload, BridgeError> {
        // Registering before dispatch so the completion cannot slip past.
        let reply = self
            .engine
            .expect_completion(request.kind(), request.correlation_id());
        self.engine.dispatch(request)?;
        reply.recv().await
    }
}

fn parse_line(data: serde_json::Value) -> Result<DialogueLine, BridgeError> {
    serde_json::from_value(data).map_err(|error| BridgeError::MalformedLine {
        detail: error.to_string(),
    })
}

fn unexpected_payload() -> BridgeError {
    BridgeError::MalformedLine {
        detail: "completion payload does not match the request kind".to_string(),
    }
}
