use tokio::sync::broadcast;

use dm_core::{DialogueLine, MutationDescriptor};

use crate::protocol::ResourceHandle;

const EVENT_CAPACITY: usize = 16;

/// Lifecycle fan-out, one typed channel per event kind. The host
/// subscribes to the kinds it cares about; the engine holds a clone to
/// report its own activity (`dialogue_started`, `passed_label`), while the
/// bridge context reports call outcomes (`got_dialogue`, `dialogue_ended`,
/// `mutated`).
#[derive(Clone)]
pub struct BridgeEvents {
    dialogue_started: broadcast::Sender<ResourceHandle>,
    dialogue_ended: broadcast::Sender<ResourceHandle>,
    passed_label: broadcast::Sender<String>,
    got_dialogue: broadcast::Sender<DialogueLine>,
    mutated: broadcast::Sender<MutationDescriptor>,
}

impl BridgeEvents {
    pub fn new() -> Self {
        Self {
            dialogue_started: broadcast::channel(EVENT_CAPACITY).0,
            dialogue_ended: broadcast::channel(EVENT_CAPACITY).0,
            passed_label: broadcast::channel(EVENT_CAPACITY).0,
            got_dialogue: broadcast::channel(EVENT_CAPACITY).0,
            mutated: broadcast::channel(EVENT_CAPACITY).0,
        }
    }

    pub fn subscribe_dialogue_started(&self) -> broadcast::Receiver<ResourceHandle> {
        self.dialogue_started.subscribe()
    }

    pub fn subscribe_dialogue_ended(&self) -> broadcast::Receiver<ResourceHandle> {
        self.dialogue_ended.subscribe()
    }

    pub fn subscribe_passed_label(&self) -> broadcast::Receiver<String> {
        self.passed_label.subscribe()
    }

    pub fn subscribe_got_dialogue(&self) -> broadcast::Receiver<DialogueLine> {
        self.got_dialogue.subscribe()
    }

    pub fn subscribe_mutated(&self) -> broadcast::Receiver<MutationDescriptor> {
        self.mutated.subscribe()
    }

    // Emission with no subscribers is a no-op; subscription is optional.

    pub fn emit_dialogue_started(&self, resource: ResourceHandle) {
        let _ = self.dialogue_started.send(resource);
    }

    pub fn emit_dialogue_ended(&self, resource: ResourceHandle) {
        let _ = self.dialogue_ended.send(resource);
    }

    pub fn emit_passed_label(&self, label: impl Into<String>) {
        let _ = self.passed_label.send(label.into());
    }

    pub fn emit_got_dialogue(&self, line: DialogueLine) {
        let _ = self.got_dialogue.send(line);
    }

    pub fn emit_mutated(&self, mutation: MutationDescriptor) {
        let _ = self.mutated.send(mutation);
    }
}

impl Default for BridgeEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_fan_out_to_multiple_subscribers() {
        let events = BridgeEvents::new();
        let mut first = events.subscribe_passed_label();
        let mut second = events.subscribe_passed_label();

        events.emit_passed_label("chapter_two");

        assert_eq!(first.recv().await.expect("first"), "chapter_two");
        assert_eq!(second.recv().await.expect("second"), "chapter_two");
    }

    #[tokio::test]
    async fn kinds_are_independent_channels() {
        let events = BridgeEvents::new();
        let mut ended = events.subscribe_dialogue_ended();

        events.emit_dialogue_started(ResourceHandle::new("forest.dialogue"));
        events.emit_dialogue_ended(ResourceHandle::new("forest.dialogue"));

        // only the ended event arrives on the ended channel
        assert_eq!(
            ended.recv().await.expect("ended"),
            ResourceHandle::new("forest.dialogue")
        );
        assert!(ended.try_recv().is_err());
    }

    #[test]
    fn emitting_without_subscribers_is_a_no_op() {
        let events = BridgeEvents::new();
        events.emit_mutated(MutationDescriptor::default());
    }
}
