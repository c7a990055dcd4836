//! Table of every action type, keyed by type id.
//!
//! Loading and tooling go through this table instead of matching on strings
//! directly, so adding an action type means adding one struct and one entry.

use serde::Serialize;

use super::{
    Action, ActionError, ActionSpec, CameraAction, DropAction, LeaveAction, LookAtAction, PickUpAction,
    RemoveActorAction, SayAction, SetActorAttrAction, SetDialogOptionAttrAction, SoundAction, WaitAction,
};
use crate::param::{Param, ParamValues};

type BuildFn = fn(&ParamValues) -> Result<Action, ActionError>;

/// Descriptor of one action type.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ActionType {
    pub id: &'static str,
    pub description: &'static str,
    pub params: &'static [Param],
    #[serde(skip)]
    pub build: BuildFn,
}

fn build<T: ActionSpec + Into<Action>>(values: &ParamValues) -> Result<Action, ActionError> {
    T::from_params(values).map(Into::into)
}

impl ActionType {
    const fn of<T: ActionSpec + Into<Action>>() -> Self {
        Self {
            id: T::ID,
            description: T::DESCRIPTION,
            params: T::PARAMS,
            build: build::<T>,
        }
    }
}

pub static ACTION_TYPES: [ActionType; 11] = [
    ActionType::of::<CameraAction>(),
    ActionType::of::<LookAtAction>(),
    ActionType::of::<RemoveActorAction>(),
    ActionType::of::<SetDialogOptionAttrAction>(),
    ActionType::of::<SayAction>(),
    ActionType::of::<WaitAction>(),
    ActionType::of::<SetActorAttrAction>(),
    ActionType::of::<PickUpAction>(),
    ActionType::of::<DropAction>(),
    ActionType::of::<SoundAction>(),
    ActionType::of::<LeaveAction>(),
];

/// Find an action type by id, ignoring ASCII case (`LookAt` and `lookat` are the same).
pub fn lookup(id: &str) -> Option<&'static ActionType> {
    let id = id.trim();
    ACTION_TYPES.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

/// All type ids, in table order.
pub fn type_ids() -> impl Iterator<Item = &'static str> {
    ACTION_TYPES.iter().map(|t| t.id)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = type_ids().map(str::to_ascii_lowercase).collect();
        assert_eq!(ids.len(), ACTION_TYPES.len());
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(lookup("LookAt").map(|t| t.id), Some("lookat"));
        assert_eq!(lookup(" camera ").map(|t| t.id), Some("camera"));
        assert!(lookup("teleport").is_none());
    }

    #[test]
    fn param_ids_are_unique_within_each_type() {
        for action_type in &ACTION_TYPES {
            let ids: HashSet<_> = action_type.params.iter().map(|p| p.id).collect();
            assert_eq!(ids.len(), action_type.params.len(), "{}", action_type.id);
        }
    }

    #[test]
    fn table_exports_as_json() {
        let json = serde_json::to_string(&ACTION_TYPES[0]).expect("serializes");
        assert!(json.contains("\"id\":\"camera\""));
        assert!(json.contains("\"kind\":\"VECTOR2\""));
    }
}
