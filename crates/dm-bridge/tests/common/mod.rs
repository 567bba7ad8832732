//! Stub engine drivers shared by the integration tests. Each driver owns
//! the request receiver an external engine would consume and answers over
//! the completion stream.

use std::sync::Arc;

use dm_bridge::{
    BridgeContext, BridgeEvents, Completion, CompletionKind, CompletionPayload, EngineHandle,
    EngineRequest,
};
use dm_core::ObjectHandle;
use dm_test_support::{line_json, sample_invoker, GameState};

pub fn completion_for(request: &EngineRequest) -> Completion {
    match request {
        EngineRequest::NextLine {
            correlation_id,
            start_key,
            ..
        } => Completion {
            kind: CompletionKind::NextLine,
            correlation_id: *correlation_id,
            payload: if start_key == "end" {
                CompletionPayload::Line(None)
            } else {
                CompletionPayload::Line(Some(line_json(
                    start_key,
                    "Coco",
                    &format!("line for {start_key}"),
                )))
            },
        },
        EngineRequest::LineOnly {
            correlation_id,
            key,
            ..
        } => Completion {
            kind: CompletionKind::LineOnly,
            correlation_id: *correlation_id,
            payload: CompletionPayload::Line(Some(line_json(key, "Coco", &format!("line {key}")))),
        },
        EngineRequest::Mutation { correlation_id, .. } => Completion {
            kind: CompletionKind::Mutation,
            correlation_id: *correlation_id,
            payload: CompletionPayload::Mutated,
        },
    }
}

/// Answers every request immediately, in arrival order.
pub fn spawn_echo_engine() -> EngineHandle {
    let (handle, mut requests) = EngineHandle::channel();
    let engine = handle.clone();
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            engine.complete(completion_for(&request));
        }
    });
    handle
}

/// Collects `batch` requests, then answers them in reverse arrival order,
/// interleaving completions across callers.
pub fn spawn_reversing_engine(batch: usize) -> EngineHandle {
    let (handle, mut requests) = EngineHandle::channel();
    let engine = handle.clone();
    tokio::spawn(async move {
        loop {
            let mut pending = Vec::with_capacity(batch);
            for _ in 0..batch {
                match requests.recv().await {
                    Some(request) => pending.push(request),
                    None => return,
                }
            }
            for request in pending.iter().rev() {
                engine.complete(completion_for(request));
            }
        }
    });
    handle
}

pub fn context_over(handle: EngineHandle) -> (Arc<BridgeContext>, ObjectHandle, Arc<GameState>) {
    let (invoker, object, state) = sample_invoker(10);
    (
        Arc::new(BridgeContext::new(
            handle,
            Arc::new(invoker),
            BridgeEvents::new(),
        )),
        object,
        state,
    )
}
