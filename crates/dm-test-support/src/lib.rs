//! Shared fixtures for bridge tests: a sample host state type with its
//! capability binding, and engine line payloads.

use std::any::Any;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

use dm_core::{DialogueValue, EnumBinding, ObjectHandle, TypeTag};
use dm_host::{
    downcast, DynamicInvoker, HostObject, HostObjects, HostTypeRegistry, ParameterBinding,
    TypeBinding,
};

pub fn time_of_day_binding() -> EnumBinding {
    EnumBinding::new(
        "TimeOfDay",
        &[("Dawn", 0), ("Noon", 1), ("Dusk", 2), ("Midnight", 3)],
    )
}

/// Host state the sample dialogue scripts read and mutate.
pub struct GameState {
    pub health: AtomicI64,
    /// Released by [`GameState::finish_long_mutation`]; lets tests hold an
    /// asynchronous member open until they decide it settles.
    gate: Notify,
}

impl GameState {
    pub fn new(health: i64) -> Self {
        Self {
            health: AtomicI64::new(health),
            gate: Notify::new(),
        }
    }

    pub fn finish_long_mutation(&self) {
        self.gate.notify_one();
    }
}

impl HostObject for GameState {
    fn type_name(&self) -> &'static str {
        "GameState"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn game_state_binding() -> TypeBinding {
    TypeBinding::new("GameState")
        .constant("SOME_CONSTANT", DialogueValue::Int(2))
        .property("health", TypeTag::Int, |object| {
            let state: &GameState = downcast(&object, "health")?;
            Ok(DialogueValue::Int(state.health.load(Ordering::SeqCst)))
        })
        .signal("health_changed")
        .nested_enum("TimeOfDay", "TimeOfDay")
        .method(
            "take_damage",
            TypeTag::Int,
            vec![
                ParameterBinding::required("amount", TypeTag::Int),
                ParameterBinding::optional("critical", TypeTag::Bool, false.into()),
            ],
            |object, args| {
                Box::pin(async move {
                    let state: &GameState = downcast(&object, "take_damage")?;
                    let amount = args[0].as_int().unwrap_or(0);
                    let critical = args[1].as_bool().unwrap_or(false);
                    let dealt = if critical { amount * 2 } else { amount };
                    let health = state.health.fetch_sub(dealt, Ordering::SeqCst) - dealt;
                    Ok(DialogueValue::Int(health))
                })
            },
        )
        .method("get_async_value", TypeTag::Int, Vec::new(), |object, _| {
            Box::pin(async move {
                let state: &GameState = downcast(&object, "get_async_value")?;
                state.gate.notified().await;
                Ok(DialogueValue::Int(100))
            })
        })
        .method("long_mutation", TypeTag::Void, Vec::new(), |object, _| {
            Box::pin(async move {
                let state: &GameState = downcast(&object, "long_mutation")?;
                state.gate.notified().await;
                Ok(DialogueValue::None)
            })
        })
}

pub fn sample_registry() -> HostTypeRegistry {
    let mut registry = HostTypeRegistry::new();
    registry.register_enum(time_of_day_binding());
    registry.register_type(game_state_binding());
    registry
}

/// An invoker over the sample registry with one registered `GameState`.
pub fn sample_invoker(health: i64) -> (DynamicInvoker, ObjectHandle, Arc<GameState>) {
    let state = Arc::new(GameState::new(health));
    let objects = HostObjects::new();
    let handle = objects.register(state.clone());
    (
        DynamicInvoker::new(Arc::new(sample_registry()), objects),
        handle,
        state,
    )
}

/// A line payload in the shape the engine emits.
pub fn line_json(id: &str, character: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "next_id": "",
        "character": character,
        "text": text,
        "translation_key": text,
    })
}
