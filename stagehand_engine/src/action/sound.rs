use serde::{Deserialize, Serialize};

use super::{ActionContext, ActionError, ActionSpec};
use crate::param::{Param, ParamMap, ParamType, ParamValues};

/// Play one of an actor's sounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundAction {
    pub actor: String,
    pub play: String,
}

impl ActionSpec for SoundAction {
    const ID: &'static str = "sound";
    const DESCRIPTION: &'static str = "Play a sound through an actor";
    const PARAMS: &'static [Param] = &[
        Param::new("actor", ParamType::Actor).mandatory(),
        Param::new("play", ParamType::Sound).desc("Sound id").mandatory(),
    ];

    fn from_params(values: &ParamValues) -> Result<Self, ActionError> {
        Ok(Self {
            actor: values.required_string("actor")?,
            play: values.required_string("play")?,
        })
    }

    fn to_params(&self, out: &mut ParamMap) {
        out.insert("actor".into(), self.actor.clone());
        out.insert("play".into(), self.play.clone());
    }

    fn run(&self, ctx: &mut ActionContext) -> bool {
        ctx.world.play_sound(&self.actor, &self.play);
        false
    }
}
