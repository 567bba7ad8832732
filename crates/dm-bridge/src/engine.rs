use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use tokio::sync::{broadcast, mpsc, oneshot};

use dm_core::BridgeError;

use crate::protocol::{Completion, CompletionKind, CompletionPayload, EngineRequest};

/// Discovery gives up after this many scheduling ticks.
pub const DISCOVERY_TICK_LIMIT: u32 = 300;

const COMPLETION_STREAM_CAPACITY: usize = 64;

type PendingKey = (CompletionKind, u64);
type PendingWaiters = Arc<Mutex<HashMap<PendingKey, oneshot::Sender<CompletionPayload>>>>;

/// The bridge's side of the engine: a request channel in, a per-request
/// reply channel registered before dispatch, and a bounded completion
/// stream for observers. The external engine consumes the request receiver
/// and answers through [`EngineHandle::complete`].
#[derive(Clone, Debug)]
pub struct EngineHandle {
    requests: mpsc::UnboundedSender<EngineRequest>,
    completions: broadcast::Sender<Completion>,
    pending: PendingWaiters,
}

impl EngineHandle {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<EngineRequest>) {
        Self::channel_with_capacity(COMPLETION_STREAM_CAPACITY)
    }

    pub fn channel_with_capacity(capacity: usize) -> (Self, mpsc::UnboundedReceiver<EngineRequest>) {
        let (requests, receiver) = mpsc::unbounded_channel();
        let (completions, _) = broadcast::channel(capacity);
        (
            Self {
                requests,
                completions,
                pending: PendingWaiters::default(),
            },
            receiver,
        )
    }

    pub fn dispatch(&self, request: EngineRequest) -> Result<(), BridgeError> {
        tracing::debug!(correlation_id = request.correlation_id(), "dispatching request");
        self.requests
            .send(request)
            .map_err(|_| BridgeError::EngineClosed)
    }

    /// Registers a waiter for the one completion tagged with this kind and
    /// id. Must happen before the request is dispatched so the reply cannot
    /// slip past; dropping the reply unregisters the waiter.
    pub fn expect_completion(&self, kind: CompletionKind, correlation_id: u64) -> PendingReply {
        let key = (kind, correlation_id);
        let (sender, receiver) = oneshot::channel();
        self.lock_pending().insert(key, sender);
        PendingReply {
            receiver,
            pending: Arc::clone(&self.pending),
            key,
        }
    }

    pub fn completions(&self) -> broadcast::Receiver<Completion> {
        self.completions.subscribe()
    }

    /// Resolves the waiter registered under the completion's kind and id,
    /// then fans the event out to observers. A completion with no waiter is
    /// expected noise: its caller was abandoned, or the event is meant for
    /// the engine side of the stream.
    pub fn complete(&self, completion: Completion) {
        let key = (completion.kind, completion.correlation_id);
        match self.lock_pending().remove(&key) {
            Some(waiter) => {
                let _ = waiter.send(completion.payload.clone());
            }
            None => {
                tracing::debug!(
                    correlation_id = completion.correlation_id,
                    "completion has no waiting caller"
                );
            }
        }
        let _ = self.completions.send(completion);
    }

    fn lock_pending(&self) -> MutexGuard<'_, HashMap<PendingKey, oneshot::Sender<CompletionPayload>>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// One caller's claim on its completion. Holds the receiving half of the
/// reply channel and the map entry that routes to it.
pub struct PendingReply {
    receiver: oneshot::Receiver<CompletionPayload>,
    pending: PendingWaiters,
    key: PendingKey,
}

impl PendingReply {
    pub async fn recv(mut self) -> Result<CompletionPayload, BridgeError> {
        (&mut self.receiver)
            .await
            .map_err(|_| BridgeError::EngineClosed)
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        // a resolved key is already gone; this only reaps abandoned calls
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&self.key);
    }
}

/// Explicit slot the engine registers itself into at startup, in place of
/// ambient global state. Registration happens at most once.
#[derive(Clone, Default)]
pub struct EngineSlot {
    inner: Arc<OnceLock<EngineHandle>>,
}

impl EngineSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handle: EngineHandle) -> bool {
        self.inner.set(handle).is_ok()
    }

    pub fn get(&self) -> Option<EngineHandle> {
        self.inner.get().cloned()
    }

    /// Polls for the engine once per scheduling tick, up to
    /// [`DISCOVERY_TICK_LIMIT`]. Exceeding the bound is a fatal
    /// `SingletonUnavailable`; discovery never retries past it and never
    /// hands back an absent engine.
    pub async fn discover(&self) -> Result<EngineHandle, BridgeError> {
        for _ in 0..DISCOVERY_TICK_LIMIT {
            if let Some(handle) = self.inner.get() {
                return Ok(handle.clone());
            }
            tokio::task::yield_now().await;
        }
        Err(BridgeError::SingletonUnavailable {
            ticks: DISCOVERY_TICK_LIMIT,
        })
    }
}
