//! Actions: the steps of a verb.
//!
//! Each action type is a plain struct implementing [`ActionSpec`], which ties
//! together its type id, its static parameter table, conversion to and from
//! flat string parameters, and its `run` behaviour. [`Action`] is the closed
//! union of every type; verbs store `Vec<Action>` and the executor steps
//! through it.
//!
//! `run` returns `true` when the action wants the verb to wait. Waiting only
//! happens when the action also deferred a continuation through
//! [`ActionContext::defer`]; the returned token is handed to whichever
//! subsystem will report completion.

pub mod actor_attr;
pub mod camera;
pub mod dialog_option;
pub mod inventory;
pub mod leave;
pub mod look_at;
pub mod registry;
pub mod remove_actor;
pub mod say;
pub mod sound;
pub mod wait;

use std::collections::HashMap;
use std::fmt::Display;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::callback::{CallbackRegistry, CallbackToken, Continuation};
use crate::param::{Param, ParamMap, ParamValues};
use crate::verb::RunKey;
use crate::world::{ActorHome, World};

pub use actor_attr::SetActorAttrAction;
pub use camera::CameraAction;
pub use dialog_option::SetDialogOptionAttrAction;
pub use inventory::{DropAction, PickUpAction};
pub use leave::LeaveAction;
pub use look_at::LookAtAction;
pub use registry::{ACTION_TYPES, ActionType};
pub use remove_actor::RemoveActorAction;
pub use say::SayAction;
pub use sound::SoundAction;
pub use wait::WaitAction;

/// Errors raised while building actions from flat definitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("unknown action type '{0}'")]
    UnknownAction(String),
    #[error("action '{action}': missing mandatory parameter '{param}'")]
    MissingParam { action: &'static str, param: &'static str },
    #[error("action '{action}': invalid value '{value}' for parameter '{param}'")]
    InvalidParam {
        action: &'static str,
        param: &'static str,
        value: String,
    },
}

/// Behaviour shared by every concrete action type.
pub trait ActionSpec: Sized {
    /// Type id used in world definitions.
    const ID: &'static str;
    const DESCRIPTION: &'static str;
    const PARAMS: &'static [Param];

    /// Build from values already checked against [`Self::PARAMS`].
    ///
    /// # Errors
    /// Returns an [`ActionError`] when a mandatory value is missing or unusable.
    fn from_params(values: &ParamValues) -> Result<Self, ActionError>;

    /// Write set fields back out in flat form. Unset optional fields are omitted.
    fn to_params(&self, out: &mut ParamMap);

    /// Execute against the world. `true` asks the verb to wait.
    fn run(&self, ctx: &mut ActionContext) -> bool;
}

/// Everything an action may touch while it runs.
pub struct ActionContext<'a> {
    pub world: &'a mut World,
    registry: &'a mut CallbackRegistry,
    continuation: Continuation,
    deferred: Option<CallbackToken>,
    removed: Vec<(ActorHome, String)>,
}

impl<'a> ActionContext<'a> {
    pub fn new(world: &'a mut World, registry: &'a mut CallbackRegistry, continuation: Continuation) -> Self {
        Self {
            world,
            registry,
            continuation,
            deferred: None,
            removed: Vec::new(),
        }
    }

    pub fn run_key(&self) -> &RunKey {
        &self.continuation.run
    }

    /// Register a continuation for the current step and return its token.
    /// Repeated calls within one step return the same token.
    pub fn defer(&mut self) -> CallbackToken {
        if let Some(token) = &self.deferred {
            return token.clone();
        }
        let token = self.registry.register(self.continuation.clone());
        self.deferred = Some(token.clone());
        token
    }

    /// `Some(token)` when `wait` is set, `None` otherwise.
    pub fn continuation_if(&mut self, wait: bool) -> Option<CallbackToken> {
        wait.then(|| self.defer())
    }

    pub fn has_deferred(&self) -> bool {
        self.deferred.is_some()
    }

    /// Report that an actor left the world so its pending runs can be cancelled.
    pub fn actor_removed(&mut self, home: ActorHome, actor: &str) {
        self.removed.push((home, actor.to_string()));
    }

    /// Deferred token (if any) and the actors removed during this step.
    pub fn finish(self) -> (Option<CallbackToken>, Vec<(ActorHome, String)>) {
        (self.deferred, self.removed)
    }
}

/// Closed set of action types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    Camera(CameraAction),
    LookAt(LookAtAction),
    RemoveActor(RemoveActorAction),
    SetDialogOptionAttr(SetDialogOptionAttrAction),
    Say(SayAction),
    Wait(WaitAction),
    SetActorAttr(SetActorAttrAction),
    PickUp(PickUpAction),
    Drop(DropAction),
    Sound(SoundAction),
    Leave(LeaveAction),
}

macro_rules! action_variants {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Action {
                fn from(action: $ty) -> Self {
                    Action::$variant(action)
                }
            }
        )*

        impl Action {
            /// Type id of this action.
            pub fn type_id(&self) -> &'static str {
                match self {
                    $(Action::$variant(_) => <$ty as ActionSpec>::ID,)*
                }
            }

            /// Static parameter table of this action's type.
            pub fn param_table(&self) -> &'static [Param] {
                match self {
                    $(Action::$variant(_) => <$ty as ActionSpec>::PARAMS,)*
                }
            }

            /// Flat parameters in canonical order.
            pub fn params(&self) -> ParamMap {
                let mut out = ParamMap::new();
                match self {
                    $(Action::$variant(a) => a.to_params(&mut out),)*
                }
                out
            }

            /// Run one step. Returns `true` when the verb should wait.
            pub fn run(&self, ctx: &mut ActionContext) -> bool {
                info!("└─ action: {self}");
                match self {
                    $(Action::$variant(a) => a.run(ctx),)*
                }
            }
        }
    };
}

action_variants! {
    Camera(CameraAction),
    LookAt(LookAtAction),
    RemoveActor(RemoveActorAction),
    SetDialogOptionAttr(SetDialogOptionAttrAction),
    Say(SayAction),
    Wait(WaitAction),
    SetActorAttr(SetActorAttrAction),
    PickUp(PickUpAction),
    Drop(DropAction),
    Sound(SoundAction),
    Leave(LeaveAction),
}

impl Action {
    /// Build an action from its type id and flat parameters.
    ///
    /// # Errors
    /// - [`ActionError::UnknownAction`] if no type has this id.
    /// - [`ActionError::MissingParam`] / [`ActionError::InvalidParam`] for bad parameters.
    pub fn from_params<S: std::hash::BuildHasher>(
        type_id: &str,
        raw: &HashMap<String, String, S>,
    ) -> Result<Action, ActionError> {
        let action_type = registry::lookup(type_id).ok_or_else(|| ActionError::UnknownAction(type_id.to_string()))?;
        let values = ParamValues::resolve(action_type.id, action_type.params, raw)?;
        (action_type.build)(&values)
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self
            .params()
            .iter()
            .map(|(k, v)| format!("{k}={v:?}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({params})", self.type_id())
    }
}

/// Shared helper: write `value` under `key` when present.
pub(crate) fn put<T>(out: &mut ParamMap, key: &str, value: Option<T>, format: impl Fn(T) -> String) {
    if let Some(value) = value {
        out.insert(key.to_string(), format(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::scene::Scene;
    use crate::world::ActorHome;

    fn raw(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn unknown_type_is_rejected() {
        let err = Action::from_params("teleport", &raw(&[])).unwrap_err();
        assert_eq!(err, ActionError::UnknownAction("teleport".into()));
    }

    #[test]
    fn missing_mandatory_param_is_reported() {
        let err = Action::from_params("removeactor", &raw(&[])).unwrap_err();
        assert!(matches!(
            err,
            ActionError::MissingParam {
                action: "removeactor",
                param: "actor"
            }
        ));
    }

    #[test]
    fn params_omit_unset_optionals() {
        let action = Action::from_params("camera", &raw(&[("zoom", "2")])).expect("builds");
        let params = action.params();
        assert_eq!(params.get("zoom").map(String::as_str), Some("2.0"));
        assert!(!params.contains_key("pos"));
        assert!(!params.contains_key("followActor"));
        assert_eq!(action.type_id(), "camera");
    }

    #[test]
    fn flat_params_rebuild_an_equal_action() {
        let action = Action::from_params(
            "setdialogoptionattr",
            &raw(&[("actor", "hall#guard"), ("dialog", "greet"), ("option", "2"), ("visible", "false")]),
        )
        .expect("builds");
        let flat: HashMap<String, String> = action.params().into_iter().collect();
        let rebuilt = Action::from_params(action.type_id(), &flat).expect("rebuilds");
        assert_eq!(rebuilt, action);
    }

    #[test]
    fn defer_registers_once_per_step() {
        let mut world = World::new(vec![Scene::new("hall").with_actor(Actor::new("door"))], "hall");
        let mut registry = CallbackRegistry::new();
        let continuation = Continuation {
            run: RunKey::new(ActorHome::Scene("hall".into()), "door", "open"),
            step: 0,
        };
        let mut ctx = ActionContext::new(&mut world, &mut registry, continuation);
        assert!(ctx.continuation_if(false).is_none());
        let first = ctx.defer();
        let second = ctx.defer();
        assert_eq!(first, second);
        let (deferred, removed) = ctx.finish();
        assert_eq!(deferred, Some(first));
        assert!(removed.is_empty());
        assert_eq!(registry.len(), 1);
    }
}
