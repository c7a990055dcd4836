use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use super::{ActionContext, ActionError, ActionSpec, put};
use crate::dialog::OptionAttrPatch;
use crate::param::{Param, ParamMap, ParamType, ParamValues, parse_int};
use crate::world::SceneActorRef;

/// Change attributes of one option of a character's dialog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDialogOptionAttrAction {
    pub actor: SceneActorRef,
    pub dialog: String,
    pub option: i32,
    pub patch: OptionAttrPatch,
}

impl ActionSpec for SetDialogOptionAttrAction {
    const ID: &'static str = "setdialogoptionattr";
    const DESCRIPTION: &'static str = "Change the attributes of a dialog option";
    const PARAMS: &'static [Param] = &[
        Param::new("actor", ParamType::SceneActor)
            .desc("Character owning the dialog")
            .mandatory(),
        Param::new("dialog", ParamType::String).desc("Dialog id").mandatory(),
        Param::new("option", ParamType::Integer)
            .desc("Index of the option in the dialog")
            .mandatory(),
        Param::new("visible", ParamType::Boolean).desc("Show or hide the option"),
    ];

    fn from_params(values: &ParamValues) -> Result<Self, ActionError> {
        Ok(Self {
            actor: values.required("actor", SceneActorRef::parse)?,
            dialog: values.required_string("dialog")?,
            option: values.required("option", parse_int)?,
            patch: OptionAttrPatch {
                visible: values.bool("visible"),
            },
        })
    }

    fn to_params(&self, out: &mut ParamMap) {
        out.insert("actor".into(), self.actor.to_string());
        out.insert("dialog".into(), self.dialog.clone());
        out.insert("option".into(), self.option.to_string());
        put(out, "visible", self.patch.visible, |v| v.to_string());
    }

    fn run(&self, ctx: &mut ActionContext) -> bool {
        let Some(actor) = ctx.world.find_actor_mut(&self.actor, true) else {
            error!("setdialogoptionattr: actor '{}' not found", self.actor);
            return false;
        };
        let Some(character) = actor.character.as_mut() else {
            error!("setdialogoptionattr: actor '{}' is not a character", self.actor);
            return false;
        };
        let Some(dialog) = character.dialog_mut(&self.dialog) else {
            error!(
                "setdialogoptionattr: dialog '{}' not found on '{}'",
                self.dialog, self.actor
            );
            return false;
        };
        let Some(option) = usize::try_from(self.option).ok().and_then(|idx| dialog.option_mut(idx)) else {
            error!(
                "setdialogoptionattr: option {} not found in dialog '{}'",
                self.option, self.dialog
            );
            return false;
        };

        if self.patch.is_empty() {
            warn!("setdialogoptionattr: nothing to change on option {}", self.option);
        }
        self.patch.apply(option);
        info!(
            "dialog '{}' option {} now {:?}",
            self.dialog, self.option, self.patch
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::callback::{CallbackRegistry, Continuation};
    use crate::dialog::{Dialog, DialogOption};
    use crate::scene::Scene;
    use crate::verb::RunKey;
    use crate::world::{ActorHome, World};

    fn world() -> World {
        let mut guard = Actor::new_character("guard");
        if let Some(character) = guard.character.as_mut() {
            character.dialogs.insert(
                "gate".into(),
                Dialog::new("gate", vec![DialogOption::new("Let me in"), DialogOption::new("Bye")]),
            );
        }
        World::new(vec![Scene::new("gate").with_actor(guard).with_actor(Actor::new("lamp"))], "gate")
    }

    fn run(world: &mut World, actor: &str, dialog: &str, option: i32) {
        let action = SetDialogOptionAttrAction {
            actor: SceneActorRef::parse(actor).expect("ref"),
            dialog: dialog.into(),
            option,
            patch: OptionAttrPatch { visible: Some(false) },
        };
        let mut registry = CallbackRegistry::new();
        let continuation = Continuation {
            run: RunKey::new(ActorHome::Scene("gate".into()), "guard", "talk"),
            step: 0,
        };
        assert!(!action.run(&mut ActionContext::new(world, &mut registry, continuation)));
    }

    fn option_visible(world: &World, idx: usize) -> Option<bool> {
        world
            .find_actor(&SceneActorRef::current("guard"), false)
            .and_then(|a| a.character.as_ref())
            .and_then(|c| c.dialog("gate"))
            .and_then(|d| d.option(idx))
            .map(|o| o.visible)
    }

    #[test]
    fn hides_the_addressed_option() {
        let mut world = world();
        run(&mut world, "guard", "gate", 1);
        assert_eq!(option_visible(&world, 0), Some(true));
        assert_eq!(option_visible(&world, 1), Some(false));
    }

    #[test]
    fn broken_chain_mutates_nothing() {
        let mut world = world();
        let before = world.clone();
        run(&mut world, "guard", "missing", 0);
        run(&mut world, "ghost", "gate", 0);
        run(&mut world, "lamp", "gate", 0);
        run(&mut world, "guard", "gate", 7);
        run(&mut world, "guard", "gate", -1);
        assert_eq!(world, before);
    }
}
