pub mod catalogue;
pub mod challenge;
pub mod commander;
pub mod import;
pub mod init;
pub mod tags;

use anyhow::Context;
use picker_core::{
    paths,
    state::{FileStore, PersistedState},
    PickerError,
};
use std::path::Path;

/// Open the state file of an initialized root.
fn open_state(root: &Path) -> anyhow::Result<(FileStore, PersistedState)> {
    if !paths::picker_dir(root).is_dir() {
        return Err(PickerError::NotInitialized.into());
    }
    let store = FileStore::new(paths::state_path(root));
    let state = PersistedState::load_from(&store).context("failed to read state")?;
    Ok((store, state))
}

fn save_state(store: &FileStore, state: &PersistedState) -> anyhow::Result<()> {
    state
        .save_to(store)
        .with_context(|| format!("failed to write {}", store.path().display()))
}
