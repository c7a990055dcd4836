use std::collections::HashSet;
use std::fmt;

use crate::*;

/// Validation error for malformed or missing references in a `WorldDef`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateId { kind: &'static str, id: String, context: String },
    MissingReference { kind: &'static str, id: String, context: String },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateId { kind, id, context } => {
                write!(f, "duplicate {kind} id '{id}' ({context})")
            },
            ValidationError::MissingReference { kind, id, context } => {
                write!(f, "missing {kind} '{id}' ({context})")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate cross-references and basic invariants in a `WorldDef`.
///
/// Action parameters are not checked here; the engine coerces and validates them
/// against each action type's parameter table when the world is built.
///
/// ```
/// use stagehand_data::{ActorDef, GameDef, SceneDef, WorldDef, validate_world};
///
/// let world = WorldDef {
///     game: GameDef {
///         title: "Demo".into(),
///         init_scene: "street".into(),
///         ..GameDef::default()
///     },
///     scenes: vec![SceneDef {
///         id: "street".into(),
///         actors: vec![ActorDef { id: "door".into(), ..ActorDef::default() }],
///         ..SceneDef::default()
///     }],
///     ..WorldDef::default()
/// };
/// assert!(validate_world(&world).is_empty());
/// ```
pub fn validate_world(world: &WorldDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut scenes = HashSet::new();
    track_ids(
        "scene",
        world.scenes.iter().map(|s| s.id.as_str()),
        &mut scenes,
        "world",
        &mut errors,
    );

    if world.game.init_scene.trim().is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: "game init scene missing".to_string(),
        });
    } else {
        check_ref("scene", &world.game.init_scene, &scenes, "game init scene", &mut errors);
    }

    for scene in &world.scenes {
        let context = format!("scene '{}'", scene.id);
        let mut actors = HashSet::new();
        track_ids(
            "actor",
            scene.actors.iter().map(|a| a.id.as_str()),
            &mut actors,
            &context,
            &mut errors,
        );

        if let Some(player) = &scene.player {
            check_ref("actor", player, &actors, &format!("{context} player"), &mut errors);
            let is_character = scene
                .actors
                .iter()
                .any(|a| &a.id == player && a.character.is_some());
            if actors.contains(player) && !is_character {
                errors.push(ValidationError::InvalidValue {
                    context: format!("{context} player '{player}' is not a character"),
                });
            }
        }
        if let Some(follow) = &scene.camera_follow {
            check_ref("actor", follow, &actors, &format!("{context} camera follow"), &mut errors);
        }

        for actor in &scene.actors {
            validate_actor(actor, &format!("{context} actor '{}'", actor.id), &mut errors);
        }
    }

    let mut inventory = HashSet::new();
    track_ids(
        "actor",
        world.inventory.iter().map(|a| a.id.as_str()),
        &mut inventory,
        "inventory",
        &mut errors,
    );
    for actor in &world.inventory {
        validate_actor(actor, &format!("inventory actor '{}'", actor.id), &mut errors);
    }

    errors
}

fn validate_actor(actor: &ActorDef, context: &str, errors: &mut Vec<ValidationError>) {
    if actor.id.trim().is_empty() {
        errors.push(ValidationError::InvalidValue {
            context: format!("{context}: empty actor id"),
        });
    }

    let mut verbs = HashSet::new();
    track_ids("verb", actor.verbs.iter().map(|v| v.id.as_str()), &mut verbs, context, errors);

    for verb in &actor.verbs {
        for (idx, action) in verb.actions.iter().enumerate() {
            if action.action.trim().is_empty() {
                errors.push(ValidationError::InvalidValue {
                    context: format!("{context} verb '{}' action #{idx}: empty action type", verb.id),
                });
            }
        }
    }

    if let Some(character) = &actor.character {
        let mut dialogs = HashSet::new();
        track_ids(
            "dialog",
            character.dialogs.iter().map(|d| d.id.as_str()),
            &mut dialogs,
            context,
            errors,
        );
        for dialog in &character.dialogs {
            for (idx, option) in dialog.options.iter().enumerate() {
                if let Some(verb) = &option.verb {
                    check_ref(
                        "verb",
                        verb,
                        &verbs,
                        &format!("{context} dialog '{}' option {idx}", dialog.id),
                        errors,
                    );
                }
            }
        }
    }
}

fn track_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
    set: &mut HashSet<String>,
    context: &str,
    errors: &mut Vec<ValidationError>,
) {
    for id in ids {
        if !set.insert(id.to_string()) {
            errors.push(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
                context: context.to_string(),
            });
        }
    }
}

fn check_ref(kind: &'static str, id: &str, set: &HashSet<String>, context: &str, errors: &mut Vec<ValidationError>) {
    if !set.contains(id) {
        errors.push(ValidationError::MissingReference {
            kind,
            id: id.to_string(),
            context: context.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(id: &str) -> ActorDef {
        ActorDef {
            id: id.to_string(),
            visible: true,
            interaction: true,
            ..ActorDef::default()
        }
    }

    fn base_world() -> WorldDef {
        WorldDef {
            game: GameDef {
                title: "Demo".into(),
                init_scene: "street".into(),
                ..GameDef::default()
            },
            scenes: vec![SceneDef {
                id: "street".into(),
                actors: vec![actor("door")],
                ..SceneDef::default()
            }],
            ..WorldDef::default()
        }
    }

    #[test]
    fn base_world_is_valid() {
        assert!(validate_world(&base_world()).is_empty());
    }

    #[test]
    fn duplicate_actor_ids_are_reported() {
        let mut world = base_world();
        world.scenes[0].actors.push(actor("door"));

        let errors = validate_world(&world);
        assert!(
            errors
                .iter()
                .any(|err| matches!(err, ValidationError::DuplicateId { kind, id, .. } if *kind == "actor" && id == "door"))
        );
    }

    #[test]
    fn missing_init_scene_is_reported() {
        let mut world = base_world();
        world.game.init_scene = "attic".into();

        let errors = validate_world(&world);
        assert!(errors.iter().any(
            |err| matches!(err, ValidationError::MissingReference { kind, id, .. } if *kind == "scene" && id == "attic")
        ));
    }

    #[test]
    fn player_must_be_a_character() {
        let mut world = base_world();
        world.scenes[0].player = Some("door".into());

        let errors = validate_world(&world);
        assert!(
            errors
                .iter()
                .any(|err| matches!(err, ValidationError::InvalidValue { context } if context.contains("not a character")))
        );
    }

    #[test]
    fn dialog_option_verbs_must_exist() {
        let mut world = base_world();
        let mut guard = actor("guard");
        guard.character = Some(CharacterDef {
            text_color: None,
            dialogs: vec![DialogDef {
                id: "greet".into(),
                options: vec![DialogOptionDef {
                    text: "Hello".into(),
                    verb: Some("hello".into()),
                    visible: true,
                    ..DialogOptionDef::default()
                }],
            }],
        });
        world.scenes[0].actors.push(guard);

        let errors = validate_world(&world);
        assert!(
            errors
                .iter()
                .any(|err| matches!(err, ValidationError::MissingReference { kind, id, .. } if *kind == "verb" && id == "hello"))
        );
    }

    #[test]
    fn empty_action_type_is_reported() {
        let mut world = base_world();
        world.scenes[0].actors[0].verbs.push(VerbDef {
            id: "lookat".into(),
            actions: vec![ActionDef::new(" ")],
        });

        let errors = validate_world(&world);
        assert!(
            errors
                .iter()
                .any(|err| matches!(err, ValidationError::InvalidValue { context } if context.contains("empty action type")))
        );
    }
}
