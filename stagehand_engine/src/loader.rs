//! Loader utilities for building a `World` from serialized data.
//!
//! World content comes from the `WorldDef` RON file in the data directory;
//! engine tuning lives in `stagehand.toml` (see [`crate::config`]).

pub mod worlddef;

use std::path::Path;

use anyhow::{Context, Result, bail};
use log::info;
use stagehand_data::WorldDef;

use crate::config::EngineConfig;
use crate::data_paths::data_path;
use crate::loader::worlddef::{build_world_from_def, load_worlddef};
use crate::world::World;

/// Load the `World` named by the configuration from the data directory.
///
/// # Errors
/// Errors bubble up from file IO, deserialization, validation or action building.
pub fn load_world(config: &EngineConfig) -> Result<World> {
    load_world_from(&data_path(&config.data.world_file))
}

/// Load a `World` from an explicit RON path.
///
/// # Errors
/// See [`load_world`].
pub fn load_world_from(path: &Path) -> Result<World> {
    let worlddef = load_worlddef(path).context("while loading worlddef from file")?;
    validate_worlddef(&worlddef)?;
    let world = build_world_from_def(&worlddef).context("while building world from worlddef")?;
    info!("{} scene(s) added to world '{}'", world.scenes.len(), world.title);
    for scene in world.scenes.values() {
        info!("scene '{}': {} actor(s)", scene.id, scene.actors.len());
    }
    info!("{} actor(s) start in the inventory", world.inventory.len());
    Ok(world)
}

/// Validate the WorldDef and return a single aggregated error.
fn validate_worlddef(def: &WorldDef) -> Result<()> {
    let errors = stagehand_data::validate_world(def);
    if errors.is_empty() {
        return Ok(());
    }
    let details = errors
        .into_iter()
        .map(|err| format!("- {err}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("worlddef validation failed:\n{details}");
}
