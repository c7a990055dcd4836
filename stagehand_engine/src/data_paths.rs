use std::env;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Directory holding world data, resolved once per process.
static DATA_ROOT: LazyLock<PathBuf> = LazyLock::new(detect_data_root);

/// Path of a data file relative to the data root.
pub fn data_path(relative: impl AsRef<Path>) -> PathBuf {
    DATA_ROOT.join(relative)
}

/// `STAGEHAND_DATA` wins; otherwise the first existing candidate near the
/// working directory or the executable.
fn detect_data_root() -> PathBuf {
    if let Some(dir) = env::var_os("STAGEHAND_DATA").map(PathBuf::from)
        && dir.is_dir()
    {
        return dir;
    }

    let mut candidates = vec![PathBuf::from("stagehand_engine/data"), PathBuf::from("data")];
    if let Ok(exe_path) = env::current_exe()
        && let Some(dir) = exe_path.parent()
    {
        candidates.push(dir.join("data"));
        if let Some(parent) = dir.parent() {
            candidates.push(parent.join("stagehand_engine/data"));
        }
    }

    candidates
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| PathBuf::from("stagehand_engine/data"))
}
