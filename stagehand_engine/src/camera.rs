//! Scene camera with a single linear tween.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::callback::CallbackToken;
use crate::geometry::Vec2;

/// An in-flight camera move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraTween {
    pub from_pos: Vec2,
    pub from_zoom: f32,
    pub to_pos: Vec2,
    pub to_zoom: f32,
    pub duration: f32,
    pub elapsed: f32,
    pub on_complete: Option<CallbackToken>,
}

impl CameraTween {
    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneCamera {
    pub position: Vec2,
    pub zoom: f32,
    pub animation: Option<CameraTween>,
    /// Tokens of tweens that finished or were superseded, drained by `update`.
    completed: Vec<CallbackToken>,
}

impl Default for SceneCamera {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 1.0)
    }
}

impl SceneCamera {
    pub fn new(position: Vec2, zoom: f32) -> Self {
        Self {
            position,
            zoom,
            animation: None,
            completed: Vec::new(),
        }
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Jump immediately. A running tween is stopped and its token released.
    pub fn set(&mut self, position: Vec2, zoom: f32) {
        self.stop_animation();
        self.position = position;
        self.zoom = zoom;
    }

    /// Tween from the current state to `(position, zoom)` over `duration` seconds.
    ///
    /// A tween already in flight is superseded; its token is still delivered so
    /// whoever waits on it is not left hanging.
    pub fn start_animation(&mut self, position: Vec2, zoom: f32, duration: f32, on_complete: Option<CallbackToken>) {
        self.stop_animation();
        debug!("camera tween to {position} zoom {zoom} over {duration}s");
        self.animation = Some(CameraTween {
            from_pos: self.position,
            from_zoom: self.zoom,
            to_pos: position,
            to_zoom: zoom,
            duration,
            elapsed: 0.0,
            on_complete,
        });
    }

    fn stop_animation(&mut self) {
        if let Some(token) = self.animation.take().and_then(|t| t.on_complete) {
            self.completed.push(token);
        }
    }

    /// Advance the tween and return tokens whose animations completed.
    pub fn update(&mut self, dt: f32) -> Vec<CallbackToken> {
        if let Some(tween) = self.animation.as_mut() {
            tween.elapsed += dt;
            let t = tween.progress();
            self.position = tween.from_pos.lerp(tween.to_pos, t);
            self.zoom = tween.from_zoom + (tween.to_zoom - tween.from_zoom) * t;
            if t >= 1.0 {
                self.stop_animation();
            }
        }
        std::mem::take(&mut self.completed)
    }
}
