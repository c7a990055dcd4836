//! WorldDef loader and conversion helpers.
//!
//! Converts the serialized `WorldDef` data model into runtime engine structs.
//! Flat action definitions are cooked through the action type table here, so
//! a bad action aborts loading with the path to the offending definition.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use stagehand_data::{ActionDef, ActorDef, CharacterDef, DialogDef, SceneDef, WorldDef};

use crate::action::Action;
use crate::actor::{Actor, Character};
use crate::camera::SceneCamera;
use crate::dialog::{Dialog, DialogOption};
use crate::geometry::{Color, Polygon, Vec2};
use crate::inventory::ActorHolder;
use crate::param::{parse_color, parse_polygon, parse_vector2};
use crate::scene::Scene;
use crate::verb::Verb;
use crate::world::World;

/// Load a `WorldDef` from a RON file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn load_worlddef(path: &Path) -> Result<WorldDef> {
    let text = fs::read_to_string(path).with_context(|| format!("reading worlddef from '{}'", path.display()))?;
    ron::from_str(&text).with_context(|| format!("parsing worlddef RON from '{}'", path.display()))
}

/// Convert a `WorldDef` into a populated `World`.
///
/// # Errors
/// Returns an error for malformed positions, polygons or colors and for any
/// action that cannot be built from its parameters.
pub fn build_world_from_def(def: &WorldDef) -> Result<World> {
    let scenes = def.scenes.iter().map(scene_from_def).collect::<Result<Vec<_>>>()?;
    let mut world = World::new(scenes, &def.game.init_scene);
    world.title.clone_from(&def.game.title);

    for actor_def in &def.inventory {
        let actor = actor_from_def(actor_def, "inventory")?;
        world.inventory.add_actor(actor);
    }
    Ok(world)
}

fn scene_from_def(def: &SceneDef) -> Result<Scene> {
    let context = format!("scene '{}'", def.id);
    let position = match &def.camera_pos {
        Some(raw) => parse_vector2(raw).ok_or_else(|| anyhow!("{context}: invalid camera position '{raw}'"))?,
        None => Vec2::ZERO,
    };
    let zoom = def.camera_zoom.filter(|z| *z > 0.0).unwrap_or(1.0);

    let mut scene = Scene::new(&def.id);
    scene.camera = SceneCamera::new(position, zoom);
    for actor_def in &def.actors {
        scene.add_actor(actor_from_def(actor_def, &context)?);
    }
    scene.player.clone_from(&def.player);
    scene.camera_follow.clone_from(&def.camera_follow);
    Ok(scene)
}

fn actor_from_def(def: &ActorDef, parent: &str) -> Result<Actor> {
    let context = format!("{parent} actor '{}'", def.id);
    let mut actor = Actor::new(&def.id);
    actor.desc.clone_from(&def.desc);
    actor.visible = def.visible;
    actor.interaction = def.interaction;
    actor.sounds = def.sounds.iter().cloned().collect();

    if let Some(raw) = &def.pos {
        actor.position = parse_vector2(raw).ok_or_else(|| anyhow!("{context}: invalid position '{raw}'"))?;
    }
    if let Some(raw) = &def.bbox {
        actor.bbox = parse_polygon(raw).ok_or_else(|| {
            anyhow!(
                "{context}: invalid bbox '{raw}' (need at least {} comma-separated numbers, even count)",
                Polygon::MIN_COMPONENTS
            )
        })?;
    }

    for verb_def in &def.verbs {
        let actions = verb_def
            .actions
            .iter()
            .enumerate()
            .map(|(idx, action)| {
                cook_action(action).with_context(|| format!("{context} verb '{}' action #{idx}", verb_def.id))
            })
            .collect::<Result<Vec<_>>>()?;
        actor.verbs.insert(verb_def.id.clone(), Verb::new(&verb_def.id, actions));
    }

    if let Some(character) = &def.character {
        actor.character = Some(character_from_def(character, &context)?);
    }
    Ok(actor)
}

fn character_from_def(def: &CharacterDef, context: &str) -> Result<Character> {
    let text_color = match &def.text_color {
        Some(raw) => parse_color(raw).ok_or_else(|| anyhow!("{context}: invalid text color '{raw}'"))?,
        None => Color::WHITE,
    };
    Ok(Character {
        text_color,
        dialogs: def.dialogs.iter().map(|d| (d.id.clone(), dialog_from_def(d))).collect(),
        ..Character::default()
    })
}

fn dialog_from_def(def: &DialogDef) -> Dialog {
    let options = def
        .options
        .iter()
        .map(|o| DialogOption {
            text: o.text.clone(),
            response_text: o.response_text.clone(),
            verb: o.verb.clone(),
            visible: o.visible,
            once: o.once,
            visited: false,
        })
        .collect();
    Dialog::new(&def.id, options)
}

/// Build a runtime action from its flat definition.
///
/// # Errors
/// Returns the underlying `ActionError` for unknown types or bad parameters.
pub fn cook_action(def: &ActionDef) -> Result<Action> {
    let raw: HashMap<String, String> = def.params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    Ok(Action::from_params(&def.action, &raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::SceneActorRef;
    use stagehand_data::{GameDef, VerbDef};

    fn world_def(actions: Vec<ActionDef>) -> WorldDef {
        WorldDef {
            game: GameDef {
                title: "Test".into(),
                init_scene: "hall".into(),
                ..GameDef::default()
            },
            scenes: vec![SceneDef {
                id: "hall".into(),
                camera_pos: Some("10,20".into()),
                actors: vec![ActorDef {
                    id: "door".into(),
                    pos: Some("5,0".into()),
                    bbox: Some("0,0,10,0,10,30,0,30".into()),
                    visible: true,
                    interaction: true,
                    verbs: vec![VerbDef {
                        id: "open".into(),
                        actions,
                    }],
                    ..ActorDef::default()
                }],
                ..SceneDef::default()
            }],
            ..WorldDef::default()
        }
    }

    #[test]
    fn builds_scenes_actors_and_verbs() {
        let def = world_def(vec![
            ActionDef::new("say").with("text", "It creaks."),
            ActionDef::new("removeactor").with("actor", "door"),
        ]);
        let world = build_world_from_def(&def).expect("builds");
        assert_eq!(world.current_scene, "hall");
        assert_eq!(world.title, "Test");
        let scene = world.current_scene().expect("hall");
        assert_eq!(scene.camera.position, Vec2::new(10.0, 20.0));
        let door = world.find_actor(&SceneActorRef::current("door"), false).expect("door");
        assert_eq!(door.position, Vec2::new(5.0, 0.0));
        assert_eq!(door.verb("open").map(|v| v.actions.len()), Some(2));
    }

    #[test]
    fn missing_mandatory_param_names_the_action() {
        let def = world_def(vec![ActionDef::new("say"), ActionDef::new("removeactor")]);
        let err = build_world_from_def(&def).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("verb 'open' action #0"), "{message}");
        assert!(message.contains("missing mandatory parameter 'text'"), "{message}");
    }

    #[test]
    fn malformed_bbox_is_fatal() {
        let mut def = world_def(Vec::new());
        def.scenes[0].actors[0].bbox = Some("0,0,10".into());
        let err = build_world_from_def(&def).unwrap_err();
        assert!(format!("{err:#}").contains("invalid bbox"));
    }
}
