#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Stagehand **
//! Verb/action scripting runtime for data-driven point-and-click adventures.
//!
//! Actors carry verbs, verbs are ordered lists of actions, and actions that
//! take time (camera moves, subtitles, waits) suspend their verb on a
//! serializable continuation token until the subsystem reports completion.

pub const STAGEHAND_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod action;
pub mod actor;
pub mod audio;
pub mod callback;
pub mod camera;
pub mod config;
pub mod console;
pub mod data_paths;
pub mod dialog;
pub mod engine;
pub mod geometry;
pub mod inventory;
pub mod loader;
pub mod param;
pub mod save_files;
pub mod scene;
pub mod text;
pub mod timer;
pub mod verb;
pub mod world;

// Re-exports for convenience
pub use action::{Action, ActionContext, ActionError, ActionSpec};
pub use actor::{Actor, Direction};
pub use callback::{CallbackRegistry, CallbackToken};
pub use config::{CONFIG_FILE, EngineConfig, load_config};
pub use console::run_console;
pub use engine::{Engine, SaveGame, TriggerError};
pub use inventory::ActorHolder;
pub use loader::load_world;
pub use scene::Scene;
pub use verb::{RetriggerPolicy, TriggerOutcome, Verb, VerbRunner};
pub use world::{ActorHome, SceneActorRef, World};
