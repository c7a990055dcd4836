//! Actors -- everything the player can point at in a scene.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::dialog::Dialog;
use crate::geometry::{Color, Polygon, Rect, Vec2};
use crate::verb::Verb;

/// Compass facing used by character animations. `Empty` means "face nothing".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    Empty,
    #[default]
    Front,
    Back,
    Left,
    Right,
    FrontLeft,
    FrontRight,
    BackLeft,
    BackRight,
}

impl Direction {
    /// Names accepted in action parameters.
    pub const NAMES: &'static [&'static str] = &[
        "EMPTY",
        "FRONT",
        "BACK",
        "LEFT",
        "RIGHT",
        "FRONTLEFT",
        "FRONTRIGHT",
        "BACKLEFT",
        "BACKRIGHT",
    ];

    /// Parse a direction name, case-insensitive. A blank string is `Empty`.
    pub fn parse(s: &str) -> Option<Direction> {
        let name = s.trim().to_ascii_uppercase();
        match name.as_str() {
            "" | "EMPTY" => Some(Direction::Empty),
            "FRONT" => Some(Direction::Front),
            "BACK" => Some(Direction::Back),
            "LEFT" => Some(Direction::Left),
            "RIGHT" => Some(Direction::Right),
            "FRONTLEFT" => Some(Direction::FrontLeft),
            "FRONTRIGHT" => Some(Direction::FrontRight),
            "BACKLEFT" => Some(Direction::BackLeft),
            "BACKRIGHT" => Some(Direction::BackRight),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::Empty => "EMPTY",
            Direction::Front => "FRONT",
            Direction::Back => "BACK",
            Direction::Left => "LEFT",
            Direction::Right => "RIGHT",
            Direction::FrontLeft => "FRONTLEFT",
            Direction::FrontRight => "FRONTRIGHT",
            Direction::BackLeft => "BACKLEFT",
            Direction::BackRight => "BACKRIGHT",
        }
    }

    /// Suffix appended to animation names (`stand.f`, `walk.bl`, ...).
    pub fn anim_suffix(self) -> &'static str {
        match self {
            Direction::Empty => "",
            Direction::Front => "f",
            Direction::Back => "b",
            Direction::Left => "l",
            Direction::Right => "r",
            Direction::FrontLeft => "fl",
            Direction::FrontRight => "fr",
            Direction::BackLeft => "bl",
            Direction::BackRight => "br",
        }
    }

    /// Eight-way facing from `from` towards `to`. Y grows upwards, so "back" is up-screen.
    pub fn towards(from: Vec2, to: Vec2) -> Direction {
        let delta = to - from;
        if delta.length_squared() < f32::EPSILON {
            return Direction::Front;
        }
        let angle = delta.y.atan2(delta.x).to_degrees();
        match angle {
            a if (-22.5..22.5).contains(&a) => Direction::Right,
            a if (22.5..67.5).contains(&a) => Direction::BackRight,
            a if (67.5..112.5).contains(&a) => Direction::Back,
            a if (112.5..157.5).contains(&a) => Direction::BackLeft,
            a if (-67.5..-22.5).contains(&a) => Direction::FrontRight,
            a if (-112.5..-67.5).contains(&a) => Direction::Front,
            a if (-157.5..-112.5).contains(&a) => Direction::FrontLeft,
            _ => Direction::Left,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Data carried only by character actors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub text_color: Color,
    pub facing: Direction,
    pub dialogs: BTreeMap<String, Dialog>,
}

impl Default for Character {
    fn default() -> Self {
        Self {
            text_color: Color::WHITE,
            facing: Direction::Front,
            dialogs: BTreeMap::new(),
        }
    }
}

impl Character {
    pub fn dialog(&self, id: &str) -> Option<&Dialog> {
        self.dialogs.get(id)
    }

    pub fn dialog_mut(&mut self, id: &str) -> Option<&mut Dialog> {
        self.dialogs.get_mut(id)
    }
}

/// An interactive actor living in a scene or in the inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub desc: Option<String>,
    pub position: Vec2,
    /// Bounding polygon relative to `position`.
    pub bbox: Polygon,
    pub visible: bool,
    pub interaction: bool,
    pub sounds: BTreeSet<String>,
    pub verbs: BTreeMap<String, Verb>,
    pub character: Option<Character>,
}

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            desc: None,
            position: Vec2::ZERO,
            bbox: Polygon::rectangle(1.0, 1.0),
            visible: true,
            interaction: true,
            sounds: BTreeSet::new(),
            verbs: BTreeMap::new(),
            character: None,
        }
    }

    /// Convenience constructor for a character with default data.
    pub fn new_character(id: impl Into<String>) -> Self {
        let mut actor = Self::new(id);
        actor.character = Some(Character::default());
        actor
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    #[must_use]
    pub fn with_verb(mut self, verb: Verb) -> Self {
        self.verbs.insert(verb.id.clone(), verb);
        self
    }

    pub fn is_character(&self) -> bool {
        self.character.is_some()
    }

    /// Bounding rectangle in scene coordinates.
    pub fn bbox_rect(&self) -> Rect {
        let mut poly = self.bbox.clone();
        poly.set_position(self.bbox.position() + self.position);
        poly.bounding_rect()
    }

    pub fn verb(&self, id: &str) -> Option<&Verb> {
        self.verbs.get(id)
    }

    pub fn has_sound(&self, sound: &str) -> bool {
        self.sounds.contains(sound)
    }

    /// Text color used when this actor speaks. Non-characters speak in white.
    pub fn text_color(&self) -> Color {
        self.character.as_ref().map_or(Color::WHITE, |c| c.text_color)
    }

    /// Face an explicit direction. Only characters have a facing; others ignore it.
    pub fn look_at(&mut self, direction: Direction) {
        match self.character.as_mut() {
            Some(character) => character.facing = direction,
            None => warn!("actor '{}' is not a character and cannot face {direction}", self.id),
        }
    }

    /// Face towards a point in scene coordinates.
    pub fn look_towards(&mut self, point: Vec2) {
        let direction = Direction::towards(self.position, point);
        self.look_at(direction);
    }

    pub fn facing(&self) -> Option<Direction> {
        self.character.as_ref().map(|c| c.facing)
    }

    /// Name of the standing animation matching the current facing.
    pub fn stand_animation(&self) -> Option<String> {
        match self.facing()? {
            Direction::Empty => Some("stand".to_string()),
            dir => Some(format!("stand.{}", dir.anim_suffix())),
        }
    }
}

/// Attribute changes applied to an actor after it has been resolved.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActorPatch {
    pub visible: Option<bool>,
    pub interaction: Option<bool>,
    pub desc: Option<String>,
    pub position: Option<Vec2>,
}

impl ActorPatch {
    pub fn is_empty(&self) -> bool {
        self.visible.is_none() && self.interaction.is_none() && self.desc.is_none() && self.position.is_none()
    }

    pub fn apply(&self, actor: &mut Actor) {
        if let Some(visible) = self.visible {
            actor.visible = visible;
        }
        if let Some(interaction) = self.interaction {
            actor.interaction = interaction;
        }
        if let Some(desc) = &self.desc {
            actor.desc = Some(desc.clone());
        }
        if let Some(position) = self.position {
            actor.position = position;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_parse_accepts_blank_as_empty() {
        assert_eq!(Direction::parse(""), Some(Direction::Empty));
        assert_eq!(Direction::parse(" frontLeft "), Some(Direction::FrontLeft));
        assert_eq!(Direction::parse("sideways"), None);
        for name in Direction::NAMES {
            let dir = Direction::parse(name).expect("listed names parse");
            assert_eq!(dir.name(), *name);
        }
    }

    #[test]
    fn towards_picks_eight_way_sector() {
        let origin = Vec2::ZERO;
        assert_eq!(Direction::towards(origin, Vec2::new(10.0, 0.0)), Direction::Right);
        assert_eq!(Direction::towards(origin, Vec2::new(-10.0, 0.0)), Direction::Left);
        assert_eq!(Direction::towards(origin, Vec2::new(0.0, 10.0)), Direction::Back);
        assert_eq!(Direction::towards(origin, Vec2::new(0.0, -10.0)), Direction::Front);
        assert_eq!(Direction::towards(origin, Vec2::new(10.0, 10.0)), Direction::BackRight);
        assert_eq!(Direction::towards(origin, Vec2::new(-10.0, -10.0)), Direction::FrontLeft);
        assert_eq!(Direction::towards(origin, origin), Direction::Front);
    }

    #[test]
    fn look_at_only_affects_characters() {
        let mut prop = Actor::new("lamp");
        prop.look_at(Direction::Left);
        assert_eq!(prop.facing(), None);

        let mut hero = Actor::new_character("hero");
        hero.look_towards(Vec2::new(-5.0, 0.0));
        assert_eq!(hero.facing(), Some(Direction::Left));
        assert_eq!(hero.stand_animation().as_deref(), Some("stand.l"));
    }

    #[test]
    fn patch_only_touches_set_fields() {
        let mut door = Actor::new("door");
        door.desc = Some("A door".into());
        ActorPatch {
            visible: Some(false),
            ..ActorPatch::default()
        }
        .apply(&mut door);
        assert!(!door.visible);
        assert!(door.interaction);
        assert_eq!(door.desc.as_deref(), Some("A door"));
    }
}
