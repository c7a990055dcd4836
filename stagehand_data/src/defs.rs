use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier used across `WorldDef` references (scene, actor, verb and dialog ids).
pub type Id = String;

/// Top-level compiled world data loaded by the engine.
///
/// Compound values (positions, bounding polygons, colors) are kept in their flat
/// string form here; the engine coerces them when the world is built.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorldDef {
    pub game: GameDef,
    #[serde(default)]
    pub scenes: Vec<SceneDef>,
    /// Actors that start in the player's inventory.
    #[serde(default)]
    pub inventory: Vec<ActorDef>,
}

/// Game-level metadata and startup configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GameDef {
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub version: String,
    /// Scene that is current when a new game starts.
    pub init_scene: Id,
}

/// A scene: a set of actors sharing one camera.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SceneDef {
    pub id: Id,
    /// Actor id of the player character in this scene, if the scene has one.
    #[serde(default)]
    pub player: Option<Id>,
    /// Initial camera position, flat `"x,y"` form.
    #[serde(default)]
    pub camera_pos: Option<String>,
    #[serde(default)]
    pub camera_zoom: Option<f32>,
    #[serde(default)]
    pub camera_follow: Option<Id>,
    #[serde(default)]
    pub actors: Vec<ActorDef>,
}

/// An interactive actor. Characters additionally carry dialogs and a text color.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ActorDef {
    pub id: Id,
    #[serde(default)]
    pub desc: Option<String>,
    /// Flat `"x,y"` position.
    #[serde(default)]
    pub pos: Option<String>,
    /// Flat polygon `"x1,y1,x2,y2,x3,y3,..."` relative to `pos`.
    #[serde(default)]
    pub bbox: Option<String>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default = "default_true")]
    pub interaction: bool,
    /// Sound ids the actor can play.
    #[serde(default)]
    pub sounds: Vec<Id>,
    #[serde(default)]
    pub verbs: Vec<VerbDef>,
    #[serde(default)]
    pub character: Option<CharacterDef>,
}

/// Extra data for character actors.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CharacterDef {
    /// Color literal for the character's speech (`"white"`, `"ff8800"`, ...).
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub dialogs: Vec<DialogDef>,
}

/// A named dialog owned by a character.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DialogDef {
    pub id: Id,
    #[serde(default)]
    pub options: Vec<DialogOptionDef>,
}

/// One selectable line of a dialog.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DialogOptionDef {
    pub text: String,
    #[serde(default)]
    pub response_text: Option<String>,
    /// Verb on the owning character to run when the option is chosen.
    #[serde(default)]
    pub verb: Option<Id>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub once: bool,
}

/// A named, ordered list of actions bound to an actor.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerbDef {
    pub id: Id,
    #[serde(default)]
    pub actions: Vec<ActionDef>,
}

/// A declarative action: its type id plus raw parameter strings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ActionDef {
    pub action: String,
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl ActionDef {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: BTreeMap::new(),
        }
    }

    /// Builder-style helper for tests and tooling.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

fn default_true() -> bool {
    true
}
