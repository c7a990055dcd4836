#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Stagehand **
//! Console driver for verb/action scripted adventure worlds.

use std::path::Path;

use stagehand_engine::{CONFIG_FILE, Engine, load_config, load_world, run_console};

use anyhow::{Context, Result};
use log::info;

fn main() -> Result<()> {
    env_logger::init();
    let config = load_config(Path::new(CONFIG_FILE));
    info!("Start: loading world '{}'...", config.data.world_file);
    let world = load_world(&config).context("while loading world")?;
    info!("World '{}' loaded successfully.", world.title);

    let mut engine = Engine::new(world, &config);
    run_console(&mut engine, &config)
}
