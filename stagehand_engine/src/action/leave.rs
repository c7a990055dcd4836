use log::{error, info};
use serde::{Deserialize, Serialize};

use super::{ActionContext, ActionError, ActionSpec};
use crate::inventory::ActorHolder;
use crate::param::{Param, ParamMap, ParamType, ParamValues};

/// Change the current scene, taking the player character along.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaveAction {
    pub scene: String,
}

impl ActionSpec for LeaveAction {
    const ID: &'static str = "leave";
    const DESCRIPTION: &'static str = "Change the current scene";
    const PARAMS: &'static [Param] = &[Param::new("scene", ParamType::Scene)
        .desc("Scene to enter")
        .mandatory()];

    fn from_params(values: &ParamValues) -> Result<Self, ActionError> {
        Ok(Self {
            scene: values.required_string("scene")?,
        })
    }

    fn to_params(&self, out: &mut ParamMap) {
        out.insert("scene".into(), self.scene.clone());
    }

    fn run(&self, ctx: &mut ActionContext) -> bool {
        if ctx.world.current_scene == self.scene {
            info!("leave: already in scene '{}'", self.scene);
            return false;
        }
        if ctx.world.find_scene(&self.scene).is_none() {
            error!("leave: scene '{}' not found", self.scene);
            return false;
        }

        let player = ctx.world.current_scene_mut().and_then(|scene| {
            let id = scene.player.clone()?;
            scene.remove_actor(&id)
        });
        ctx.world.set_current_scene(&self.scene);
        if let Some(player) = player
            && let Some(scene) = ctx.world.current_scene_mut()
        {
            info!("player '{}' follows into '{}'", player.id, scene.id);
            scene.player = Some(player.id.clone());
            scene.add_actor(player);
        }
        false
    }
}
