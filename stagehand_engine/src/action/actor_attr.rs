use log::{error, warn};
use serde::{Deserialize, Serialize};

use super::{ActionContext, ActionError, ActionSpec, put};
use crate::actor::ActorPatch;
use crate::param::{Param, ParamMap, ParamType, ParamValues, format_vector2};
use crate::world::SceneActorRef;

/// Change visibility, interaction, description or position of an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetActorAttrAction {
    pub actor: SceneActorRef,
    pub patch: ActorPatch,
}

impl ActionSpec for SetActorAttrAction {
    const ID: &'static str = "setactorattr";
    const DESCRIPTION: &'static str = "Change the attributes of an actor";
    const PARAMS: &'static [Param] = &[
        Param::new("actor", ParamType::SceneActor).desc("Actor to change").mandatory(),
        Param::new("visible", ParamType::Boolean),
        Param::new("interaction", ParamType::Boolean).desc("Whether the actor reacts to the pointer"),
        Param::new("desc", ParamType::String).named("description"),
        Param::new("pos", ParamType::Vector2).named("position"),
    ];

    fn from_params(values: &ParamValues) -> Result<Self, ActionError> {
        Ok(Self {
            actor: values.required("actor", SceneActorRef::parse)?,
            patch: ActorPatch {
                visible: values.bool("visible"),
                interaction: values.bool("interaction"),
                desc: values.string("desc"),
                position: values.vector2("pos"),
            },
        })
    }

    fn to_params(&self, out: &mut ParamMap) {
        out.insert("actor".into(), self.actor.to_string());
        put(out, "visible", self.patch.visible, |v| v.to_string());
        put(out, "interaction", self.patch.interaction, |v| v.to_string());
        put(out, "desc", self.patch.desc.as_ref(), String::clone);
        put(out, "pos", self.patch.position, format_vector2);
    }

    fn run(&self, ctx: &mut ActionContext) -> bool {
        let Some(actor) = ctx.world.find_actor_mut(&self.actor, true) else {
            error!("setactorattr: actor '{}' not found", self.actor);
            return false;
        };
        if self.patch.is_empty() {
            warn!("setactorattr: nothing to change on '{}'", self.actor);
        }
        self.patch.apply(actor);
        false
    }
}
