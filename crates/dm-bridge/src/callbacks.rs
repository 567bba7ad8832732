//! The engine-facing side of the bridge: existence probes and member
//! invocations issued while the engine evaluates conditions and mutations.

use dm_core::{BridgeError, DialogueValue, ObjectHandle};

use crate::context::BridgeContext;
use crate::protocol::{Completion, CompletionKind, CompletionPayload};

impl BridgeContext {
    /// Existence probe the engine uses before committing to an invocation.
    pub fn member_exists(&self, handle: &ObjectHandle, member: &str) -> bool {
        self.invoker.has_member(handle, member)
    }

    /// Invokes a host member on the engine's behalf and publishes exactly
    /// one `Resolved` completion tagged with `correlation_id` once the
    /// invocation settles, whether it produced a value or not. An error is
    /// returned to the engine-side caller instead and publishes nothing;
    /// other in-flight requests are unaffected either way.
    pub async fn resolve_member(
        &self,
        correlation_id: u64,
        handle: &ObjectHandle,
        member: &str,
        args: &[DialogueValue],
    ) -> Result<(), BridgeError> {
        let value = self.invoker.invoke(handle, member, args).await?;
        let resolved = match value {
            DialogueValue::None => None,
            value => Some(value),
        };
        self.engine.complete(Completion {
            kind: CompletionKind::Resolved,
            correlation_id,
            payload: CompletionPayload::Resolved(resolved),
        });
        Ok(())
    }
}
