use log::warn;
use serde::{Deserialize, Serialize};

use super::{ActionContext, ActionError, ActionSpec};
use crate::param::{Param, ParamMap, ParamType, ParamValues, format_float, parse_float};

/// Pause the verb for a number of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WaitAction {
    pub time: f32,
}

impl ActionSpec for WaitAction {
    const ID: &'static str = "wait";
    const DESCRIPTION: &'static str = "Wait for a number of seconds";
    const PARAMS: &'static [Param] = &[Param::new("time", ParamType::Float)
        .desc("Seconds to wait")
        .mandatory()];

    fn from_params(values: &ParamValues) -> Result<Self, ActionError> {
        Ok(Self {
            time: values.required("time", parse_float)?,
        })
    }

    fn to_params(&self, out: &mut ParamMap) {
        out.insert("time".into(), format_float(self.time));
    }

    fn run(&self, ctx: &mut ActionContext) -> bool {
        if self.time <= 0.0 {
            warn!("wait: non-positive time {}; not waiting", self.time);
            return false;
        }
        let token = ctx.defer();
        ctx.world.timers.start(self.time, token);
        true
    }
}
