//! Moving actors between scenes and the inventory.

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use super::{ActionContext, ActionError, ActionSpec, put};
use crate::geometry::Vec2;
use crate::inventory::ActorHolder;
use crate::param::{Param, ParamMap, ParamType, ParamValues, format_vector2};
use crate::world::{ActorHome, SceneActorRef};

/// Move an actor from a scene into the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickUpAction {
    pub actor: SceneActorRef,
}

impl ActionSpec for PickUpAction {
    const ID: &'static str = "pickup";
    const DESCRIPTION: &'static str = "Move an actor from its scene to the inventory";
    const PARAMS: &'static [Param] = &[Param::new("actor", ParamType::SceneActor)
        .desc("Actor to pick up")
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
        let scene_id = ctx.world.scene_id_of(&self.actor).to_string();
        let Some(scene) = ctx.world.find_scene_mut(&scene_id) else {
            error!("pickup: scene '{scene_id}' not found");
            return false;
        };
        if scene.player.as_deref() == Some(self.actor.actor.as_str()) {
            warn!("pickup: refusing to pick up the player '{}'", self.actor.actor);
            return false;
        }
        let Some(actor) = scene.remove_actor(&self.actor.actor) else {
            if ctx.world.inventory.contains_actor(&self.actor.actor) {
                info!("pickup: '{}' is already carried", self.actor.actor);
            } else {
                error!("pickup: actor '{}' not found", self.actor);
            }
            return false;
        };
        info!("picked up '{}' from {}", actor.id, ActorHome::Scene(scene_id));
        ctx.world.inventory.add_actor(actor);
        false
    }
}

/// Move an inventory actor into the current scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropAction {
    pub actor: String,
    pub pos: Option<Vec2>,
}

impl ActionSpec for DropAction {
    const ID: &'static str = "drop";
    const DESCRIPTION: &'static str = "Move an inventory actor into the current scene";
    const PARAMS: &'static [Param] = &[
        Param::new("actor", ParamType::Actor).desc("Inventory actor to drop").mandatory(),
        Param::new("pos", ParamType::Vector2).desc("Where to place it; keeps its position if unset"),
    ];

    fn from_params(values: &ParamValues) -> Result<Self, ActionError> {
        Ok(Self {
            actor: values.required_string("actor")?,
            pos: values.vector2("pos"),
        })
    }

    fn to_params(&self, out: &mut ParamMap) {
        out.insert("actor".into(), self.actor.clone());
        put(out, "pos", self.pos, format_vector2);
    }

    fn run(&self, ctx: &mut ActionContext) -> bool {
        if ctx.world.current_scene().is_none() {
            error!("drop: no current scene '{}'", ctx.world.current_scene);
            return false;
        }
        let Some(mut actor) = ctx.world.inventory.remove_actor(&self.actor) else {
            error!("drop: '{}' is not in the inventory", self.actor);
            return false;
        };
        if let Some(pos) = self.pos {
            actor.position = pos;
        }
        if let Some(scene) = ctx.world.current_scene_mut() {
            info!("dropped '{}' into scene '{}'", actor.id, scene.id);
            scene.add_actor(actor);
        }
        false
    }
}
