use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::{ActionContext, ActionError, ActionSpec, put};
use crate::actor::{Actor, Direction};
use crate::geometry::Color;
use crate::param::{Param, ParamMap, ParamType, ParamValues};
use crate::text::{TextKind, TextPos, TextStyle};

/// The player looks at something: turns, optionally plays a sound through
/// the target and shows a description subtitle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LookAtAction {
    pub actor: Option<String>,
    pub speech: Option<String>,
    pub text: Option<String>,
    /// Explicit facing; wins over facing the target actor.
    pub direction: Option<Direction>,
    pub wait: bool,
}

impl ActionSpec for LookAtAction {
    const ID: &'static str = "lookat";
    const DESCRIPTION: &'static str = "Turn the player towards an actor and show its description";
    const PARAMS: &'static [Param] = &[
        Param::new("actor", ParamType::Actor).desc("Actor looked at"),
        Param::new("speech", ParamType::Sound).desc("Sound played through the looked-at actor"),
        Param::new("text", ParamType::SmallText).desc("Subtitle shown in the player's color"),
        Param::new("direction", ParamType::String)
            .desc("Direction to face instead of facing the actor")
            .options(Direction::NAMES),
        Param::new("wait", ParamType::Boolean)
            .desc("Keep the verb waiting while the text is shown")
            .mandatory()
            .default_value("true"),
    ];

    fn from_params(values: &ParamValues) -> Result<Self, ActionError> {
        Ok(Self {
            actor: values.string("actor"),
            speech: values.string("speech"),
            text: values.string("text"),
            direction: values.typed("direction", Direction::parse),
            wait: values.bool("wait").unwrap_or(true),
        })
    }

    fn to_params(&self, out: &mut ParamMap) {
        put(out, "actor", self.actor.as_ref(), String::clone);
        put(out, "speech", self.speech.as_ref(), String::clone);
        put(out, "text", self.text.as_ref(), String::clone);
        put(out, "direction", self.direction, |d| d.name().to_string());
        out.insert("wait".into(), self.wait.to_string());
    }

    /// Never asks the verb to wait through its return value; with `wait` set
    /// the subtitle carries the continuation instead.
    fn run(&self, ctx: &mut ActionContext) -> bool {
        let target = self.actor.as_deref().and_then(|id| {
            let found = ctx.world.find_actor_anywhere(id);
            if found.is_none() {
                debug!("lookat: actor '{id}' not found");
            }
            found.map(|a| a.bbox_rect().origin())
        });

        match ctx.world.player_mut() {
            Some(player) => match (self.direction, target) {
                (Some(direction), _) => player.look_at(direction),
                (None, Some(point)) => player.look_towards(point),
                (None, None) => {},
            },
            None => warn!("lookat: scene '{}' has no player", ctx.world.current_scene),
        }

        if let (Some(actor), Some(speech)) = (&self.actor, &self.speech) {
            ctx.world.play_sound(actor, speech);
        }

        if let Some(text) = &self.text {
            let color = ctx.world.player().map_or(Color::WHITE, Actor::text_color);
            let speaker = ctx.world.player().map(|p| p.id.clone());
            let on_complete = ctx.continuation_if(self.wait);
            let style = TextStyle {
                kind: TextKind::Rectangle,
                color,
            };
            ctx.world
                .text
                .add_text(text, TextPos::Subtitle, false, style, speaker.as_deref(), on_complete);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Actor;
    use crate::callback::{CallbackRegistry, Continuation};
    use crate::geometry::{Color, Vec2};
    use crate::scene::Scene;
    use crate::verb::RunKey;
    use crate::world::{ActorHome, World};

    fn world() -> World {
        let mut hero = Actor::new_character("hero").with_position(Vec2::new(100.0, 0.0));
        if let Some(character) = hero.character.as_mut() {
            character.text_color = Color::rgba(1.0, 0.0, 0.0, 1.0);
        }
        let mut clock = Actor::new("clock").with_position(Vec2::new(0.0, 0.0));
        clock.sounds.insert("tick".into());
        let mut scene = Scene::new("study").with_actor(hero).with_actor(clock);
        scene.player = Some("hero".into());
        World::new(vec![scene], "study")
    }

    fn run(action: &LookAtAction, world: &mut World, registry: &mut CallbackRegistry) -> bool {
        let continuation = Continuation {
            run: RunKey::new(ActorHome::Scene("study".into()), "clock", "lookat"),
            step: 0,
        };
        let mut ctx = ActionContext::new(world, registry, continuation);
        action.run(&mut ctx)
    }

    #[test]
    fn player_faces_the_target_and_subtitle_uses_player_color() {
        let mut world = world();
        let mut registry = CallbackRegistry::new();
        let action = LookAtAction {
            actor: Some("clock".into()),
            speech: Some("tick".into()),
            text: Some("An old clock.".into()),
            direction: None,
            wait: true,
        };
        assert!(!run(&action, &mut world, &mut registry));

        assert_eq!(world.player().and_then(Actor::facing), Some(Direction::Left));
        assert_eq!(world.audio.len(), 1);
        let text = world.text.current().expect("subtitle shown");
        assert!(text.pos.is_subtitle());
        assert_eq!(text.style.kind, TextKind::Rectangle);
        assert_eq!(text.style.color, Color::rgba(1.0, 0.0, 0.0, 1.0));
        assert!(text.on_complete.is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn explicit_direction_wins() {
        let mut world = world();
        let mut registry = CallbackRegistry::new();
        let action = LookAtAction {
            actor: Some("clock".into()),
            direction: Some(Direction::BackRight),
            wait: false,
            ..LookAtAction::default()
        };
        run(&action, &mut world, &mut registry);
        assert_eq!(world.player().and_then(Actor::facing), Some(Direction::BackRight));
        assert!(registry.is_empty());
    }

    #[test]
    fn missing_target_still_shows_text_without_waiting() {
        let mut world = world();
        let mut registry = CallbackRegistry::new();
        let action = LookAtAction {
            actor: Some("ghost".into()),
            text: Some("Nothing there.".into()),
            wait: false,
            ..LookAtAction::default()
        };
        assert!(!run(&action, &mut world, &mut registry));
        assert_eq!(world.player().and_then(Actor::facing), Some(Direction::Front));
        assert!(world.text.current().is_some_and(|t| t.on_complete.is_none()));
    }

    #[test]
    fn unknown_direction_is_dropped() {
        use crate::action::Action;
        use std::collections::HashMap;

        let raw = HashMap::from([("direction".to_string(), "UPWARDS".to_string())]);
        let Action::LookAt(action) = Action::from_params("lookat", &raw).expect("builds") else {
            panic!("expected lookat");
        };
        assert_eq!(action.direction, None);
        assert!(action.wait);
    }
}
