//! Save-game discovery and serialization helpers.
//!
//! A save slot is one RON file holding a [`SaveGame`] snapshot: the world,
//! the verb runner (including any run suspended mid-verb) and the pending
//! continuation registry. File names carry the slot name and the engine
//! version that wrote them: `<slot>-stagehand-<version>.ron`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result, bail};
use log::{info, warn};

use crate::STAGEHAND_VERSION;
use crate::engine::SaveGame;

const SLOT_MARKER: &str = "-stagehand-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSlot {
    pub slot: String,
    pub version: String,
    pub path: PathBuf,
    pub file_name: String,
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub world_title: String,
    pub current_scene: String,
    pub active_runs: usize,
    pub pending_callbacks: usize,
    pub inventory: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFileStatus {
    Ready,
    VersionMismatch { save_version: String, current_version: String },
    Corrupted { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFileEntry {
    pub slot: String,
    pub version: String,
    pub path: PathBuf,
    pub modified: Option<SystemTime>,
    pub summary: Option<SaveSummary>,
    pub status: SaveFileStatus,
}

/// Reduce a user-supplied slot name to `[a-z0-9_]`, collapsing runs of other characters.
pub fn slot_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Path a slot is written to under `dir` by this engine version.
pub fn save_path(dir: &Path, slot: &str) -> PathBuf {
    dir.join(format!("{slot}{SLOT_MARKER}{STAGEHAND_VERSION}.ron"))
}

/// Write a snapshot to `dir`, returning the file path.
///
/// # Errors
/// Returns an error for an empty slot name or if serialization or writing fails.
pub fn save_game(dir: &Path, raw_slot: &str, save: &SaveGame) -> Result<PathBuf> {
    let slot = slot_name(raw_slot);
    if slot.is_empty() {
        bail!("'{raw_slot}' is not a usable save slot name");
    }
    let ron = ron::ser::to_string_pretty(save, ron::ser::PrettyConfig::default())
        .context("error converting game state to 'ron' format")?;
    fs::create_dir_all(dir).with_context(|| format!("creating save directory '{}'", dir.display()))?;
    let path = save_path(dir, &slot);
    fs::write(&path, ron).with_context(|| format!("writing save file '{}'", path.display()))?;
    info!("game saved to slot '{slot}' ({})", path.display());
    Ok(path)
}

/// Load a save file from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or deserialized.
pub fn load_save_file(path: &Path) -> Result<SaveGame> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading save file {}", path.display()))?;
    let save = ron::from_str::<SaveGame>(&raw).with_context(|| format!("parsing save file {}", path.display()))?;
    if save.version != STAGEHAND_VERSION {
        warn!(
            "save file {} was written by version {} (running {STAGEHAND_VERSION})",
            path.display(),
            save.version
        );
    }
    Ok(save)
}

/// Find the newest file for `slot` in `dir`.
///
/// # Errors
/// Returns an error if the directory cannot be read or the slot does not exist.
pub fn find_slot(dir: &Path, raw_slot: &str) -> Result<SaveSlot> {
    let slot = slot_name(raw_slot);
    collect_save_slots(dir)?
        .into_iter()
        .filter(|s| s.slot == slot)
        .max_by(|a, b| a.modified.cmp(&b.modified))
        .with_context(|| format!("no save slot named '{slot}' in {}", dir.display()))
}

/// Discover save slot files stored in `dir`.
///
/// # Errors
/// Returns an error if the directory contents cannot be read or enumerated.
pub fn collect_save_slots(dir: &Path) -> Result<Vec<SaveSlot>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut slots = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry.with_context(|| format!("enumerating {}", dir.display()))?;
        if let Some(slot) = slot_from_entry(&entry) {
            slots.push(slot);
        }
    }
    slots.sort_by(|a, b| a.slot.cmp(&b.slot).then(a.version.cmp(&b.version)));
    Ok(slots)
}

/// Build descriptive entries for save files located in `dir`, newest first.
///
/// # Errors
/// Returns an error if reading the directory fails.
pub fn build_save_entries(dir: &Path) -> Result<Vec<SaveFileEntry>> {
    let slots = collect_save_slots(dir)?;
    let mut entries: Vec<_> = slots.into_iter().map(entry_for_slot).collect();
    entries.sort_by(|a, b| b.modified.cmp(&a.modified).then(a.slot.cmp(&b.slot)));
    Ok(entries)
}

/// Format a human-friendly modified time relative to now.
pub fn format_modified(modified: SystemTime) -> String {
    match SystemTime::now().duration_since(modified) {
        Ok(delta) => format_age(delta),
        Err(_) => "in the future".to_string(),
    }
}

fn entry_for_slot(slot: SaveSlot) -> SaveFileEntry {
    let mut version = slot.version.clone();
    let parsed = fs::read_to_string(&slot.path)
        .map_err(|err| format!("read error: {}", trim_error(&err)))
        .and_then(|raw| ron::from_str::<SaveGame>(&raw).map_err(|err| format!("parse error: {}", trim_error(&err))));

    let (summary, status) = match parsed {
        Ok(save) => {
            version.clone_from(&save.version);
            let status = if save.version == STAGEHAND_VERSION {
                SaveFileStatus::Ready
            } else {
                SaveFileStatus::VersionMismatch {
                    save_version: save.version.clone(),
                    current_version: STAGEHAND_VERSION.to_string(),
                }
            };
            let summary = SaveSummary {
                world_title: save.world.title.clone(),
                current_scene: save.world.current_scene.clone(),
                active_runs: save.runner.runs().count(),
                pending_callbacks: save.registry.len(),
                inventory: save.world.inventory.len(),
            };
            (Some(summary), status)
        },
        Err(message) => {
            warn!("unusable save '{}' ({}): {message}", slot.slot, slot.path.display());
            (None, SaveFileStatus::Corrupted { message })
        },
    };

    SaveFileEntry {
        slot: slot.slot,
        version,
        path: slot.path,
        modified: slot.modified,
        summary,
        status,
    }
}

fn slot_from_entry(entry: &fs::DirEntry) -> Option<SaveSlot> {
    let path = entry.path();
    if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("ron") {
        return None;
    }
    let file_name = path.file_name().and_then(|name| name.to_str())?.to_string();
    let stem = path.file_stem().and_then(|stem| stem.to_str())?;
    let (slot, version) = stem.rsplit_once(SLOT_MARKER)?;
    if slot.is_empty() {
        return None;
    }
    let modified = entry.metadata().ok().and_then(|meta| meta.modified().ok());
    Some(SaveSlot {
        slot: slot.to_string(),
        version: version.to_string(),
        path,
        file_name,
        modified,
    })
}

/// Compact "time ago" string.
fn format_age(duration: Duration) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = MINUTE * 60;
    const DAY: u64 = HOUR * 24;

    let secs = duration.as_secs();
    if secs < 30 {
        "just now".to_string()
    } else if secs < MINUTE {
        format!("{secs}s ago")
    } else if secs < HOUR {
        format!("{}m ago", secs / MINUTE)
    } else if secs < DAY {
        format!("{}h ago", secs / HOUR)
    } else {
        format!("{}d ago", secs / DAY)
    }
}

/// Clamp verbose error messages to a readable length.
fn trim_error(err: &impl ToString) -> String {
    const MAX: usize = 120;
    let message = err.to_string();
    if message.chars().count() <= MAX {
        return message;
    }
    let mut trimmed: String = message.chars().take(MAX - 3).collect();
    trimmed.push_str("...");
    trimmed
}
