use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const PICKER_DIR: &str = ".picker";
pub const CONFIG_FILE: &str = ".picker/config.yaml";
pub const STATE_FILE: &str = ".picker/state.json";

pub const DEFAULT_CATALOGUE_FILE: &str = "public/commanders.json";
pub const DEFAULT_TAGS_FILE: &str = "public/commander-tags.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn picker_dir(root: &Path) -> PathBuf {
    root.join(PICKER_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn state_path(root: &Path) -> PathBuf {
    root.join(STATE_FILE)
}

/// Resolve a configured path: absolute paths are kept, relative ones join `root`.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
