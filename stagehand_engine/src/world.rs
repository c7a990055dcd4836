//! Data structures representing the game world.
//!
//! [`World`] owns every scene and the inventory along with the shared display
//! subsystems (text, timers, sound). Actions reach actors through
//! [`SceneActorRef`]s that are resolved against the live world on each use.

use std::collections::BTreeMap;
use std::fmt::Display;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use variantly::Variantly;

use crate::STAGEHAND_VERSION;
use crate::actor::Actor;
use crate::audio::SoundQueue;
use crate::callback::CallbackToken;
use crate::inventory::{ActorHolder, Inventory};
use crate::param::{format_string2, parse_string2};
use crate::scene::Scene;
use crate::text::TextManager;
use crate::timer::Timers;

/// Kinds of places an actor can live.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Variantly)]
pub enum ActorHome {
    Scene(String),
    Inventory,
}

impl Display for ActorHome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActorHome::Scene(id) => write!(f, "scene '{id}'"),
            ActorHome::Inventory => write!(f, "inventory"),
        }
    }
}

/// `(scene, actor)` reference; no scene means the current scene.
///
/// The flat form is `scene#actor` or just `actor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneActorRef {
    pub scene: Option<String>,
    pub actor: String,
}

impl SceneActorRef {
    pub fn new(scene: Option<&str>, actor: &str) -> Self {
        Self {
            scene: scene.map(str::to_string),
            actor: actor.to_string(),
        }
    }

    /// Actor in the current scene.
    pub fn current(actor: &str) -> Self {
        Self::new(None, actor)
    }

    /// Parse the flat form. An empty actor id is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        let (scene, actor) = parse_string2(s.trim());
        let actor = actor.trim();
        if actor.is_empty() {
            return None;
        }
        Some(Self::new(scene.map(str::trim), actor))
    }
}

impl Display for SceneActorRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_string2(self.scene.as_deref(), &self.actor))
    }
}

/// Complete state of the running game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub title: String,
    pub version: String,
    pub scenes: BTreeMap<String, Scene>,
    pub current_scene: String,
    pub inventory: Inventory,
    pub text: TextManager,
    pub timers: Timers,
    pub audio: SoundQueue,
    /// Ids of actors whose resources were released, in disposal order.
    pub released: Vec<String>,
}

impl World {
    /// Create a world from its scenes with `current_scene` active.
    pub fn new(scenes: Vec<Scene>, current_scene: &str) -> World {
        let world = Self {
            version: STAGEHAND_VERSION.to_string(),
            scenes: scenes.into_iter().map(|s| (s.id.clone(), s)).collect(),
            current_scene: current_scene.to_string(),
            ..Self::default()
        };
        info!("new world created with {} scene(s)", world.scenes.len());
        world
    }

    pub fn find_scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    pub fn find_scene_mut(&mut self, id: &str) -> Option<&mut Scene> {
        self.scenes.get_mut(id)
    }

    pub fn current_scene(&self) -> Option<&Scene> {
        self.scenes.get(&self.current_scene)
    }

    pub fn current_scene_mut(&mut self) -> Option<&mut Scene> {
        self.scenes.get_mut(&self.current_scene)
    }

    /// Scene id a reference points at (explicit or current).
    pub fn scene_id_of<'a>(&'a self, r: &'a SceneActorRef) -> &'a str {
        r.scene.as_deref().unwrap_or(&self.current_scene)
    }

    /// The current scene's player character.
    pub fn player(&self) -> Option<&Actor> {
        self.current_scene().and_then(Scene::player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Actor> {
        self.current_scene_mut().and_then(Scene::player_mut)
    }

    /// Where a referenced actor currently lives: its scene first, then the inventory.
    pub fn locate_actor(&self, r: &SceneActorRef, search_inventory: bool) -> Option<ActorHome> {
        let scene_id = self.scene_id_of(r);
        if self.find_scene(scene_id).is_some_and(|s| s.contains_actor(&r.actor)) {
            return Some(ActorHome::Scene(scene_id.to_string()));
        }
        (search_inventory && self.inventory.contains_actor(&r.actor)).then_some(ActorHome::Inventory)
    }

    pub fn find_actor(&self, r: &SceneActorRef, search_inventory: bool) -> Option<&Actor> {
        match self.locate_actor(r, search_inventory)? {
            ActorHome::Scene(id) => self.find_scene(&id)?.actor(&r.actor),
            ActorHome::Inventory => self.inventory.actor(&r.actor),
        }
    }

    pub fn find_actor_mut(&mut self, r: &SceneActorRef, search_inventory: bool) -> Option<&mut Actor> {
        match self.locate_actor(r, search_inventory)? {
            ActorHome::Scene(id) => self.find_scene_mut(&id)?.actor_mut(&r.actor),
            ActorHome::Inventory => self.inventory.actor_mut(&r.actor),
        }
    }

    /// Actor by id in the current scene, falling back to the inventory.
    pub fn find_actor_anywhere(&self, id: &str) -> Option<&Actor> {
        self.find_actor(&SceneActorRef::current(id), true)
    }

    /// True if `id` currently lives in `home`.
    pub fn holds_actor(&self, home: &ActorHome, id: &str) -> bool {
        match home {
            ActorHome::Scene(scene) => self.find_scene(scene).is_some_and(|s| s.contains_actor(id)),
            ActorHome::Inventory => self.inventory.contains_actor(id),
        }
    }

    pub fn holder_mut(&mut self, home: &ActorHome) -> Option<&mut dyn ActorHolder> {
        match home {
            ActorHome::Scene(id) => self.find_scene_mut(id).map(|s| s as &mut dyn ActorHolder),
            ActorHome::Inventory => Some(&mut self.inventory as &mut dyn ActorHolder),
        }
    }

    /// Make `id` the current scene. Unknown ids leave the world unchanged.
    pub fn set_current_scene(&mut self, id: &str) -> bool {
        if !self.scenes.contains_key(id) {
            warn!("cannot switch to unknown scene '{id}'");
            return false;
        }
        info!("current scene: '{}' -> '{id}'", self.current_scene);
        self.current_scene = id.to_string();
        true
    }

    /// Release an actor's resources. Takes the actor by value, so it cannot
    /// be released twice.
    pub fn dispose_actor(&mut self, actor: Actor) {
        info!("disposing actor '{}' ({} sound(s) released)", actor.id, actor.sounds.len());
        self.released.push(actor.id);
    }

    /// Queue a sound played through an actor in the current scene or inventory.
    pub fn play_sound(&mut self, actor: &str, sound: &str) -> bool {
        match self.find_actor_anywhere(actor).map(|a| a.has_sound(sound)) {
            Some(true) => {
                self.audio.push(actor, sound);
                true
            },
            Some(false) => {
                warn!("actor '{actor}' has no sound '{sound}'");
                false
            },
            None => {
                warn!("cannot play '{sound}': actor '{actor}' not found");
                false
            },
        }
    }

    /// Advance cameras, text and timers. Returns completed tokens in completion order.
    pub fn update(&mut self, dt: f32) -> Vec<CallbackToken> {
        let mut done = Vec::new();
        for scene in self.scenes.values_mut() {
            done.extend(scene.update(dt));
        }
        done.extend(self.text.update(dt));
        done.extend(self.timers.update(dt));
        done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> World {
        let hall = Scene::new("hall").with_actor(Actor::new("door"));
        let attic = Scene::new("attic").with_actor(Actor::new("chest"));
        let mut world = World::new(vec![hall, attic], "hall");
        world.inventory.add_actor(Actor::new("key"));
        world
    }

    #[test]
    fn scene_actor_ref_parses_flat_form() {
        assert_eq!(SceneActorRef::parse("attic#chest"), Some(SceneActorRef::new(Some("attic"), "chest")));
        assert_eq!(SceneActorRef::parse("door"), Some(SceneActorRef::current("door")));
        assert_eq!(SceneActorRef::parse("attic#"), None);
        assert_eq!(SceneActorRef::parse("  "), None);
        assert_eq!(SceneActorRef::new(Some("attic"), "chest").to_string(), "attic#chest");
        assert_eq!(SceneActorRef::current("door").to_string(), "door");
    }

    #[test]
    fn find_actor_resolves_scene_then_inventory() {
        let world = world();
        assert!(world.find_actor(&SceneActorRef::current("door"), false).is_some());
        assert!(world.find_actor(&SceneActorRef::new(Some("attic"), "chest"), false).is_some());
        assert!(world.find_actor(&SceneActorRef::current("chest"), true).is_none());
        assert!(world.find_actor(&SceneActorRef::current("key"), false).is_none());
        assert_eq!(
            world.locate_actor(&SceneActorRef::current("key"), true),
            Some(ActorHome::Inventory)
        );
    }

    #[test]
    fn switching_to_unknown_scene_is_refused() {
        let mut world = world();
        assert!(!world.set_current_scene("cellar"));
        assert_eq!(world.current_scene, "hall");
        assert!(world.set_current_scene("attic"));
        assert_eq!(world.current_scene().map(|s| s.id.as_str()), Some("attic"));
    }

    #[test]
    fn sounds_need_a_known_actor_and_sound() {
        let mut world = world();
        if let Some(door) = world.find_actor_mut(&SceneActorRef::current("door"), false) {
            door.sounds.insert("creak".into());
        }
        assert!(world.play_sound("door", "creak"));
        assert!(!world.play_sound("door", "slam"));
        assert!(!world.play_sound("ghost", "boo"));
        assert_eq!(world.audio.drain().len(), 1);
    }
}
