//! The engine facade: world, continuation registry and verb executor ticked together.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::STAGEHAND_VERSION;
use crate::audio::SoundEvent;
use crate::callback::{CallbackRegistry, CallbackToken};
use crate::config::EngineConfig;
use crate::text::{TextKind, TextPos, TextStyle};
use crate::verb::{RunKey, TriggerOutcome, VerbRunner};
use crate::world::{SceneActorRef, World};

/// Reasons a verb or dialog choice could not be started.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriggerError {
    #[error("actor '{0}' not found")]
    ActorNotFound(SceneActorRef),
    #[error("actor '{actor}' has no verb '{verb}'")]
    VerbNotFound { actor: SceneActorRef, verb: String },
    #[error("actor '{0}' is not a character")]
    NotACharacter(SceneActorRef),
    #[error("actor '{actor}' has no dialog '{dialog}'")]
    DialogNotFound { actor: SceneActorRef, dialog: String },
    #[error("dialog '{dialog}' has no selectable option {index}")]
    OptionUnavailable { dialog: String, index: usize },
}

/// Snapshot written to save files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveGame {
    pub version: String,
    pub world: World,
    pub runner: VerbRunner,
    pub registry: CallbackRegistry,
}

/// Single-threaded, frame-ticked runtime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Engine {
    pub world: World,
    pub registry: CallbackRegistry,
    pub runner: VerbRunner,
}

impl Engine {
    pub fn new(mut world: World, config: &EngineConfig) -> Self {
        world.text.time_per_char = config.text.time_per_char;
        world.text.min_duration = config.text.min_duration;
        Self {
            world,
            registry: CallbackRegistry::new(),
            runner: VerbRunner::new(config.retrigger),
        }
    }

    /// Rebuild an engine from a save. Configuration is re-applied over the saved state.
    pub fn restore(save: SaveGame, config: &EngineConfig) -> Self {
        let mut engine = Self {
            world: save.world,
            registry: save.registry,
            runner: save.runner,
        };
        engine.runner.policy = config.retrigger;
        engine.world.text.time_per_char = config.text.time_per_char;
        engine.world.text.min_duration = config.text.min_duration;
        info!(
            "restored engine: {} active run(s), {} pending callback(s)",
            engine.runner.runs().count(),
            engine.registry.len()
        );
        engine
    }

    pub fn snapshot(&self) -> SaveGame {
        SaveGame {
            version: STAGEHAND_VERSION.to_string(),
            world: self.world.clone(),
            runner: self.runner.clone(),
            registry: self.registry.clone(),
        }
    }

    /// Run `verb` on the referenced actor.
    ///
    /// # Errors
    /// - [`TriggerError::ActorNotFound`] if the actor is in neither its scene nor the inventory.
    /// - [`TriggerError::VerbNotFound`] if the actor has no such verb.
    pub fn trigger_verb(&mut self, target: &SceneActorRef, verb: &str) -> Result<TriggerOutcome, TriggerError> {
        let home = self
            .world
            .locate_actor(target, true)
            .ok_or_else(|| TriggerError::ActorNotFound(target.clone()))?;
        let actions = self
            .world
            .find_actor(target, true)
            .and_then(|actor| actor.verb(verb))
            .map(|v| v.actions.clone())
            .ok_or_else(|| TriggerError::VerbNotFound {
                actor: target.clone(),
                verb: verb.to_string(),
            })?;
        let key = RunKey::new(home, &target.actor, verb);
        Ok(self.runner.trigger(key, actions, &mut self.world, &mut self.registry))
    }

    /// Advance one frame: tick subsystems, resume runs whose continuations
    /// completed (in completion order), then start queued and ready runs.
    pub fn update(&mut self, dt: f32) {
        for token in self.world.update(dt) {
            self.resume(&token);
        }
        self.runner.step_ready(&mut self.world, &mut self.registry);
    }

    /// Resolve a token and continue its run. Spent or unknown tokens do nothing.
    pub fn resume(&mut self, token: &CallbackToken) -> bool {
        let Some(continuation) = self.registry.resolve(token) else {
            return false;
        };
        self.runner
            .resume(token, &continuation, &mut self.world, &mut self.registry)
    }

    /// End the text on screen now; whatever waited on it continues immediately.
    pub fn skip_text(&mut self) {
        self.world.text.skip();
        for token in self.world.text.update(0.0) {
            self.resume(&token);
        }
    }

    /// Pick a dialog option: the character answers and the option's verb runs.
    ///
    /// # Errors
    /// Returns a [`TriggerError`] if any link from actor to option is missing
    /// or the option is hidden.
    pub fn choose_option(
        &mut self,
        target: &SceneActorRef,
        dialog: &str,
        index: usize,
    ) -> Result<TriggerOutcome, TriggerError> {
        let actor = self
            .world
            .find_actor_mut(target, true)
            .ok_or_else(|| TriggerError::ActorNotFound(target.clone()))?;
        let anchor = actor.bbox_rect().top_center();
        let character = actor
            .character
            .as_mut()
            .ok_or_else(|| TriggerError::NotACharacter(target.clone()))?;
        let color = character.text_color;
        let option = character
            .dialog_mut(dialog)
            .ok_or_else(|| TriggerError::DialogNotFound {
                actor: target.clone(),
                dialog: dialog.to_string(),
            })?
            .choose(index)
            .ok_or_else(|| TriggerError::OptionUnavailable {
                dialog: dialog.to_string(),
                index,
            })?;
        debug!("chose option {index} of dialog '{dialog}': \"{}\"", option.text);

        if let Some(response) = &option.response_text {
            let style = TextStyle {
                kind: TextKind::Talk,
                color,
            };
            self.world
                .text
                .add_text(response, TextPos::At(anchor), true, style, Some(&target.actor), None);
        }
        match &option.verb {
            Some(verb) => self.trigger_verb(target, verb),
            None => Ok(TriggerOutcome::Finished),
        }
    }

    /// No runs, queued triggers, texts, timers or camera moves are pending.
    pub fn is_idle(&self) -> bool {
        self.runner.is_idle()
            && self.world.text.is_empty()
            && self.world.timers.is_empty()
            && self.world.scenes.values().all(|s| !s.camera.is_animating())
    }

    /// Sound requests issued since the last call.
    pub fn drain_sounds(&mut self) -> Vec<SoundEvent> {
        self.world.audio.drain()
    }
}
