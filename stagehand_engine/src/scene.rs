//! Scenes: a set of actors, a camera and an optional player character.

use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::actor::Actor;
use crate::callback::CallbackToken;
use crate::camera::SceneCamera;
use crate::inventory::ActorHolder;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub actors: BTreeMap<String, Actor>,
    pub camera: SceneCamera,
    /// Actor the camera keeps centered on while no tween is running.
    pub camera_follow: Option<String>,
    /// Character controlled by the player while this scene is current.
    pub player: Option<String>,
}

impl Scene {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.add_actor(actor);
        self
    }

    pub fn player(&self) -> Option<&Actor> {
        self.player.as_deref().and_then(|id| self.actors.get(id))
    }

    pub fn player_mut(&mut self) -> Option<&mut Actor> {
        let id = self.player.as_deref()?;
        self.actors.get_mut(id)
    }

    /// Follow `actor`, or stop following with `None`.
    pub fn set_camera_follow(&mut self, actor: Option<&str>) {
        match actor {
            Some(id) if !self.actors.contains_key(id) => {
                warn!("scene '{}': camera cannot follow unknown actor '{id}'", self.id);
            },
            other => self.camera_follow = other.map(str::to_string),
        }
    }

    /// Drop follow/player references to an actor that is leaving the scene.
    pub fn forget_actor(&mut self, id: &str) {
        if self.camera_follow.as_deref() == Some(id) {
            self.camera_follow = None;
        }
        if self.player.as_deref() == Some(id) {
            self.player = None;
        }
    }

    /// Advance the camera and keep it on the followed actor.
    pub fn update(&mut self, dt: f32) -> Vec<CallbackToken> {
        let done = self.camera.update(dt);
        if !self.camera.is_animating()
            && let Some(target) = self.camera_follow.as_deref().and_then(|id| self.actors.get(id))
        {
            self.camera.position = target.position;
        }
        done
    }
}

impl ActorHolder for Scene {
    fn actor(&self, id: &str) -> Option<&Actor> {
        self.actors.get(id)
    }

    fn actor_mut(&mut self, id: &str) -> Option<&mut Actor> {
        self.actors.get_mut(id)
    }

    fn add_actor(&mut self, actor: Actor) {
        self.actors.insert(actor.id.clone(), actor);
    }

    fn remove_actor(&mut self, id: &str) -> Option<Actor> {
        let actor = self.actors.remove(id)?;
        self.forget_actor(id);
        Some(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Vec2;

    #[test]
    fn camera_tracks_followed_actor() {
        let mut scene = Scene::new("street").with_actor(Actor::new_character("hero").with_position(Vec2::new(40.0, 5.0)));
        scene.set_camera_follow(Some("hero"));
        scene.update(0.016);
        assert_eq!(scene.camera.position, Vec2::new(40.0, 5.0));
    }

    #[test]
    fn follow_ignores_unknown_actor() {
        let mut scene = Scene::new("street").with_actor(Actor::new("lamp"));
        scene.set_camera_follow(Some("lamp"));
        scene.set_camera_follow(Some("ghost"));
        assert_eq!(scene.camera_follow.as_deref(), Some("lamp"));
        scene.set_camera_follow(None);
        assert!(scene.camera_follow.is_none());
    }

    #[test]
    fn removing_actor_clears_follow_and_player() {
        let mut scene = Scene::new("street").with_actor(Actor::new_character("hero"));
        scene.player = Some("hero".into());
        scene.camera_follow = Some("hero".into());
        let hero = scene.remove_actor("hero").expect("present");
        assert_eq!(hero.id, "hero");
        assert!(scene.player.is_none());
        assert!(scene.camera_follow.is_none());
    }
}
