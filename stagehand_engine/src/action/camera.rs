use log::{error, info};
use serde::{Deserialize, Serialize};

use super::{ActionContext, ActionError, ActionSpec, put};
use crate::geometry::Vec2;
use crate::param::{Param, ParamMap, ParamType, ParamValues, format_float, format_vector2};

/// Sentinel `followActor` value that stops camera following.
pub const FOLLOW_NONE: &str = "none";

/// Change to camera following requested by a `camera` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraFollow {
    Stop,
    Actor(String),
}

/// Move and/or zoom the current scene's camera, optionally animated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraAction {
    pub pos: Option<Vec2>,
    /// Only positive zoom levels are kept; anything else means "leave as is".
    pub zoom: Option<f32>,
    pub duration: f32,
    pub follow_actor: Option<CameraFollow>,
    pub wait: bool,
}

impl ActionSpec for CameraAction {
    const ID: &'static str = "camera";
    const DESCRIPTION: &'static str = "Set or animate the camera position, zoom and follow target";
    const PARAMS: &'static [Param] = &[
        Param::new("pos", ParamType::Vector2).desc("Target position; keeps the current one if unset"),
        Param::new("zoom", ParamType::Float).desc("Target zoom; keeps the current one if unset"),
        Param::new("duration", ParamType::Float)
            .desc("Animation length in seconds; 0 applies instantly")
            .default_value("0"),
        Param::new("followActor", ParamType::Actor)
            .named("follow actor")
            .desc("Actor to follow, or 'none' to stop following"),
        Param::new("wait", ParamType::Boolean)
            .desc("Wait for the animation to finish")
            .mandatory()
            .default_value("true"),
    ];

    fn from_params(values: &ParamValues) -> Result<Self, ActionError> {
        let follow_actor = values.str("followActor").map(str::trim).map(|id| {
            if id.eq_ignore_ascii_case(FOLLOW_NONE) {
                CameraFollow::Stop
            } else {
                CameraFollow::Actor(id.to_string())
            }
        });
        Ok(Self {
            pos: values.vector2("pos"),
            zoom: values.float("zoom").filter(|z| *z > 0.0),
            duration: values.float("duration").unwrap_or(0.0).max(0.0),
            follow_actor,
            wait: values.bool("wait").unwrap_or(true),
        })
    }

    fn to_params(&self, out: &mut ParamMap) {
        put(out, "pos", self.pos, format_vector2);
        put(out, "zoom", self.zoom, format_float);
        out.insert("duration".into(), format_float(self.duration));
        put(out, "followActor", self.follow_actor.as_ref(), |follow| match follow {
            CameraFollow::Stop => FOLLOW_NONE.to_string(),
            CameraFollow::Actor(id) => id.clone(),
        });
        out.insert("wait".into(), self.wait.to_string());
    }

    fn run(&self, ctx: &mut ActionContext) -> bool {
        let Some(scene) = ctx.world.current_scene() else {
            error!("camera: no current scene '{}'", ctx.world.current_scene);
            return false;
        };

        // Outer `None` leaves following unchanged; `Some(None)` stops it.
        let follow = match &self.follow_actor {
            Some(CameraFollow::Actor(id)) => match scene.actors.get(id) {
                Some(actor) => Some(Some((id.clone(), actor.position))),
                None => {
                    error!("camera: follow actor '{id}' not found in scene '{}'", scene.id);
                    None
                },
            },
            Some(CameraFollow::Stop) => Some(None),
            None => None,
        };
        let follow_pos = follow.as_ref().and_then(Option::as_ref).map(|(_, pos)| *pos);
        let pos = self.pos.or(follow_pos).unwrap_or(scene.camera.position);
        let zoom = self.zoom.unwrap_or(scene.camera.zoom);

        let instant = self.duration <= 0.0;
        let on_complete = if instant { None } else { ctx.continuation_if(self.wait) };

        let Some(scene) = ctx.world.current_scene_mut() else {
            return false;
        };
        if let Some(target) = &follow {
            scene.set_camera_follow(target.as_ref().map(|(id, _)| id.as_str()));
        }
        if instant {
            info!("camera set to {pos} zoom {zoom}");
            scene.camera.set(pos, zoom);
            false
        } else {
            scene.camera.start_animation(pos, zoom, self.duration, on_complete);
            self.wait
        }
    }
}
