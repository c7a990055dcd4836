use log::{error, info};
use serde::{Deserialize, Serialize};

use super::{ActionContext, ActionError, ActionSpec};
use crate::param::{Param, ParamMap, ParamType, ParamValues};
use crate::world::{ActorHome, SceneActorRef};

/// Take an actor out of the world.
///
/// The actor's scene is searched first, then the inventory. Actors removed
/// from the current scene or the inventory are disposed; actors in a
/// background scene are only detached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoveActorAction {
    pub actor: SceneActorRef,
}

impl ActionSpec for RemoveActorAction {
    const ID: &'static str = "removeactor";
    const DESCRIPTION: &'static str = "Remove an actor from its scene or the inventory";
    const PARAMS: &'static [Param] = &[Param::new("actor", ParamType::SceneActor)
        .desc("Actor to remove, as 'scene#actor' or 'actor'")
        .mandatory()];

    fn from_params(values: &ParamValues) -> Result<Self, ActionError> {
        Ok(Self {
            actor: values.required("actor", SceneActorRef::parse)?,
        })
    }

    fn to_params(&self, out: &mut ParamMap) {
        out.insert("actor".into(), self.actor.to_string());
    }

    fn run(&self, ctx: &mut ActionContext) -> bool {
        let Some(home) = ctx.world.locate_actor(&self.actor, true) else {
            error!("removeactor: actor '{}' not found", self.actor);
            return false;
        };
        let dispose = match &home {
            ActorHome::Inventory => true,
            ActorHome::Scene(scene) => *scene == ctx.world.current_scene,
        };

        let removed = ctx
            .world
            .holder_mut(&home)
            .and_then(|holder| holder.remove_actor(&self.actor.actor));
        let Some(actor) = removed else {
            error!("removeactor: actor '{}' vanished from {home}", self.actor);
            return false;
        };

        if dispose {
            ctx.world.dispose_actor(actor);
        } else {
            info!("removeactor: detached '{}' from background {home}", actor.id);
        }
        ctx.actor_removed(home, &self.actor.actor);
        false
    }
}
