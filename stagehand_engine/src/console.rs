//! Line-oriented console for driving an [`Engine`] by hand.
//!
//! There is no renderer: the console triggers verbs, advances frames and
//! prints whatever the subsystems would have shown (texts, sounds, camera
//! moves). It doubles as a harness for checking verb scripts against a world.

mod input;

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use log::info;

use crate::action::ACTION_TYPES;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::save_files::{SaveFileStatus, build_save_entries, find_slot, format_modified, load_save_file, save_game};
use crate::text::Text;
use crate::verb::{RunState, TriggerOutcome};
use crate::world::SceneActorRef;

use input::{InputEvent, InputManager};

/// Frames `run` will tick before giving up on reaching idle.
const MAX_RUN_FRAMES: u32 = 18_000;

/// First words of every console command, for completion.
pub(crate) const COMMAND_WORDS: &[&str] = &[
    "actions", "choose", "help", "load", "look", "quit", "run", "runs", "save", "saves", "scenes", "skip", "talk",
    "tick", "trigger", "verbs",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    Empty,
    Help,
    Actions,
    Look,
    Scenes,
    Runs,
    Verbs(SceneActorRef),
    Trigger { target: SceneActorRef, verb: String },
    Talk { target: SceneActorRef, dialog: String },
    Choose { target: SceneActorRef, dialog: String, index: usize },
    Tick(u32),
    Run,
    Skip,
    Save(String),
    Load(String),
    Saves,
    Quit,
}

/// Parse one console line. The error is a usage message for the user.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((first, args)) = words.split_first() else {
        return Ok(ConsoleCommand::Empty);
    };
    let command = match (first.to_lowercase().as_str(), args) {
        ("help" | "?", []) => ConsoleCommand::Help,
        ("look" | "l", []) => ConsoleCommand::Look,
        ("actions", []) => ConsoleCommand::Actions,
        ("scenes", []) => ConsoleCommand::Scenes,
        ("runs", []) => ConsoleCommand::Runs,
        ("verbs", [actor]) => ConsoleCommand::Verbs(parse_target(actor)?),
        ("trigger" | "t", [actor, verb]) => ConsoleCommand::Trigger {
            target: parse_target(actor)?,
            verb: (*verb).to_string(),
        },
        ("talk", [actor, dialog]) => ConsoleCommand::Talk {
            target: parse_target(actor)?,
            dialog: (*dialog).to_string(),
        },
        ("choose", [actor, dialog, index]) => ConsoleCommand::Choose {
            target: parse_target(actor)?,
            dialog: (*dialog).to_string(),
            index: index.parse().map_err(|_| format!("'{index}' is not an option number"))?,
        },
        ("tick", []) => ConsoleCommand::Tick(1),
        ("tick", [frames]) => ConsoleCommand::Tick(
            frames
                .parse()
                .map_err(|_| format!("'{frames}' is not a frame count"))?,
        ),
        ("run", []) => ConsoleCommand::Run,
        ("skip", []) => ConsoleCommand::Skip,
        ("save", [slot]) => ConsoleCommand::Save((*slot).to_string()),
        ("load", [slot]) => ConsoleCommand::Load((*slot).to_string()),
        ("saves", []) => ConsoleCommand::Saves,
        ("quit" | "exit" | "q", []) => ConsoleCommand::Quit,
        (word, _) if COMMAND_WORDS.contains(&word) => return Err(format!("wrong arguments for '{word}'; try 'help'")),
        (word, _) => return Err(format!("unknown command '{word}'; try 'help'")),
    };
    Ok(command)
}

fn parse_target(raw: &str) -> Result<SceneActorRef, String> {
    SceneActorRef::parse(raw).ok_or_else(|| format!("'{raw}' is not an actor reference"))
}

/// Tracks what has already been printed so each text appears once.
#[derive(Default)]
struct Screen {
    shown: Option<(String, Option<String>, Option<String>)>,
}

impl Screen {
    fn report(&mut self, engine: &mut Engine) {
        for sound in engine.drain_sounds() {
            println!("{}", format!("♪ {} plays '{}'", sound.actor, sound.sound).italic().dimmed());
        }
        let signature = engine.world.text.current().map(|t| {
            (
                t.text.clone(),
                t.actor.clone(),
                t.on_complete.as_ref().map(ToString::to_string),
            )
        });
        if signature != self.shown {
            if let Some(text) = engine.world.text.current() {
                print_text(text);
            }
            self.shown = signature;
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn print_text(text: &Text) {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    let color = text.style.color;
    let body = textwrap::fill(&text.text, textwrap::Options::with_termwidth().initial_indent("  ").subsequent_indent("  "));
    let speaker = text.actor.as_deref().unwrap_or("narrator");
    println!(
        "{} {}\n{}",
        speaker.bold(),
        format!("[{}]", text.style.kind.name()).dimmed(),
        body.truecolor(channel(color.r), channel(color.g), channel(color.b))
    );
}

/// Run the console loop until the user quits or input ends.
///
/// # Errors
/// Returns an error if reading input fails irrecoverably.
pub fn run_console(engine: &mut Engine, config: &EngineConfig) -> Result<()> {
    let mut input = InputManager::new();
    let mut screen = Screen::default();
    let save_dir = PathBuf::from(&config.data.save_dir);

    println!("{}", engine.world.title.bold().underline());
    println!("{}", "Type 'help' for a list of commands.".dimmed());
    look_handler(engine);

    loop {
        let prompt = format!("\n[{}|{} run(s)]> ", engine.world.current_scene, engine.runner.runs().count())
            .bright_green()
            .to_string();
        let line = match input.read_line(&prompt)? {
            InputEvent::Line(line) => line,
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("Command canceled.");
                continue;
            },
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(usage) => {
                println!("{}", usage.red());
                continue;
            },
        };
        info!("console command: {command:?}");
        match command {
            ConsoleCommand::Empty => {},
            ConsoleCommand::Help => help_handler(),
            ConsoleCommand::Actions => println!("{}", serde_json::to_string_pretty(&ACTION_TYPES)?),
            ConsoleCommand::Look => look_handler(engine),
            ConsoleCommand::Scenes => scenes_handler(engine),
            ConsoleCommand::Runs => runs_handler(engine),
            ConsoleCommand::Verbs(target) => verbs_handler(engine, &target),
            ConsoleCommand::Trigger { target, verb } => match engine.trigger_verb(&target, &verb) {
                Ok(outcome) => print_outcome(outcome),
                Err(err) => println!("{}", err.to_string().red()),
            },
            ConsoleCommand::Talk { target, dialog } => talk_handler(engine, &target, &dialog),
            ConsoleCommand::Choose { target, dialog, index } => match engine.choose_option(&target, &dialog, index) {
                Ok(outcome) => print_outcome(outcome),
                Err(err) => println!("{}", err.to_string().red()),
            },
            ConsoleCommand::Tick(frames) => {
                for _ in 0..frames {
                    engine.update(config.frame_dt);
                    screen.report(engine);
                }
            },
            ConsoleCommand::Run => run_handler(engine, config, &mut screen),
            ConsoleCommand::Skip => engine.skip_text(),
            ConsoleCommand::Save(slot) => match save_game(&save_dir, &slot, &engine.snapshot()) {
                Ok(path) => println!("Saved to {}.", path.display()),
                Err(err) => println!("{}", format!("Save failed: {err:#}").red()),
            },
            ConsoleCommand::Load(slot) => {
                match find_slot(&save_dir, &slot).and_then(|found| load_save_file(&found.path)) {
                    Ok(save) => {
                        *engine = Engine::restore(save, config);
                        screen = Screen::default();
                        println!("Loaded '{slot}'.");
                        look_handler(engine);
                    },
                    Err(err) => println!("{}", format!("Load failed: {err:#}").red()),
                }
            },
            ConsoleCommand::Saves => saves_handler(&save_dir),
            ConsoleCommand::Quit => break,
        }
        screen.report(engine);
    }
    info!("console closed with {} active run(s)", engine.runner.runs().count());
    Ok(())
}

fn print_outcome(outcome: TriggerOutcome) {
    let message = match outcome {
        TriggerOutcome::Finished => "verb finished".green(),
        TriggerOutcome::Waiting => "verb is waiting; 'tick' or 'run' to continue".yellow(),
        TriggerOutcome::Ignored => "verb is already running; trigger ignored".red(),
        TriggerOutcome::Queued => "verb is already running; trigger queued".yellow(),
    };
    println!("{message}");
}

fn help_handler() {
    let rows = [
        ("look", "describe the current scene"),
        ("scenes", "list scenes"),
        ("verbs <actor>", "list an actor's verbs"),
        ("trigger <actor> <verb>", "run a verb; actor is 'id' or 'scene#id'"),
        ("talk <actor> <dialog>", "list a dialog's options"),
        ("choose <actor> <dialog> <n>", "pick a dialog option"),
        ("tick [n]", "advance n frames"),
        ("run", "advance until nothing is pending"),
        ("skip", "end the text on screen"),
        ("runs", "show active verb runs"),
        ("actions", "print the action type catalog as JSON"),
        ("save <slot> / load <slot>", "write or restore a save slot"),
        ("saves", "list save slots"),
        ("quit", "leave the console"),
    ];
    for (usage, what) in rows {
        println!("  {:<30} {}", usage.bold(), what);
    }
}

fn look_handler(engine: &Engine) {
    let world = &engine.world;
    let Some(scene) = world.current_scene() else {
        println!("{}", format!("current scene '{}' does not exist", world.current_scene).red());
        return;
    };
    println!("{}", format!("Scene: {}", scene.id).bold());
    println!(
        "  camera at ({:.1}, {:.1}) zoom {:.2}{}",
        scene.camera.position.x,
        scene.camera.position.y,
        scene.camera.zoom,
        scene
            .camera_follow
            .as_deref()
            .map(|f| format!(", following '{f}'"))
            .unwrap_or_default()
    );
    for actor in scene.actors.values() {
        let mut tags = Vec::new();
        if scene.player.as_deref() == Some(actor.id.as_str()) {
            tags.push("player");
        }
        if !actor.visible {
            tags.push("hidden");
        }
        if actor.is_character() {
            tags.push("character");
        }
        println!(
            "  {} ({:.0}, {:.0}){}{}",
            actor.id.bright_blue(),
            actor.position.x,
            actor.position.y,
            if tags.is_empty() {
                String::new()
            } else {
                format!(" [{}]", tags.join(", "))
            },
            actor.desc.as_deref().map(|d| format!(" - {d}")).unwrap_or_default()
        );
    }
    let carried: Vec<&str> = world.inventory.ids().collect();
    if carried.is_empty() {
        println!("  inventory: (empty)");
    } else {
        println!("  inventory: {}", carried.join(", "));
    }
}

fn scenes_handler(engine: &Engine) {
    for scene in engine.world.scenes.values() {
        let marker = if scene.id == engine.world.current_scene { "*" } else { " " };
        println!("{marker} {} ({} actor(s))", scene.id, scene.actors.len());
    }
}

fn runs_handler(engine: &Engine) {
    let mut any = false;
    for run in engine.runner.runs() {
        any = true;
        let state = match &run.state {
            RunState::Running => "running".to_string(),
            RunState::Waiting(token) => format!("waiting on {token}"),
        };
        println!("  {} step {}/{}: {state}", run.key, run.ip, run.actions.len());
    }
    if engine.runner.queued_len() > 0 {
        println!("  {} queued trigger(s)", engine.runner.queued_len());
    } else if !any {
        println!("  no active runs");
    }
}

fn verbs_handler(engine: &Engine, target: &SceneActorRef) {
    let Some(actor) = engine.world.find_actor(target, true) else {
        println!("{}", format!("actor '{target}' not found").red());
        return;
    };
    if actor.verbs.is_empty() {
        println!("'{}' has no verbs", actor.id);
    }
    for verb in actor.verbs.values() {
        println!("{}", verb.id.bold());
        for action in &verb.actions {
            println!("  {action}");
        }
    }
}

fn talk_handler(engine: &Engine, target: &SceneActorRef, dialog: &str) {
    match dialog_lines(engine, target, dialog) {
        Ok(lines) => lines.iter().for_each(|line| println!("{line}")),
        Err(err) => println!("{}", err.red()),
    }
}

/// Visible options of a dialog, one printable line each.
fn dialog_lines(engine: &Engine, target: &SceneActorRef, dialog: &str) -> Result<Vec<String>, String> {
    let found = engine
        .world
        .find_actor(target, true)
        .and_then(|a| a.character.as_ref())
        .and_then(|c| c.dialog(dialog));
    let Some(found) = found else {
        return Err(format!("no dialog '{dialog}' on '{target}'"));
    };
    if !found.has_visible_options() {
        return Ok(vec!["nothing left to say".to_string()]);
    }
    let lines = found
        .visible_options()
        .map(|(index, option)| {
            let text = if option.visited {
                option.text.dimmed()
            } else {
                option.text.normal()
            };
            format!("  {index}: {text}")
        })
        .collect();
    Ok(lines)
}

fn run_handler(engine: &mut Engine, config: &EngineConfig, screen: &mut Screen) {
    let mut frames = 0;
    while !engine.is_idle() && frames < MAX_RUN_FRAMES {
        engine.update(config.frame_dt);
        screen.report(engine);
        frames += 1;
    }
    if engine.is_idle() {
        println!("{}", format!("idle after {frames} frame(s)").dimmed());
    } else {
        println!("{}", format!("still busy after {frames} frame(s)").yellow());
    }
}

fn saves_handler(dir: &std::path::Path) {
    let entries = match build_save_entries(dir) {
        Ok(entries) => entries,
        Err(err) => {
            println!("{}", format!("Could not read saves: {err:#}").red());
            return;
        },
    };
    if entries.is_empty() {
        println!("No saved games in {}.", dir.display());
        return;
    }
    for entry in entries {
        let age = entry.modified.map(format_modified).unwrap_or_default();
        let status = match &entry.status {
            SaveFileStatus::Ready => "ready".green(),
            SaveFileStatus::VersionMismatch { save_version, .. } => format!("from v{save_version}").yellow(),
            SaveFileStatus::Corrupted { message } => format!("unreadable: {message}").red(),
        };
        let summary = entry
            .summary
            .map(|s| {
                format!(
                    " - {} in '{}', {} run(s) active",
                    s.world_title, s.current_scene, s.active_runs
                )
            })
            .unwrap_or_default();
        println!("  {} [{status}] {age}{summary}", entry.slot.bold());
    }
}
