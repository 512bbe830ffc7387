use crate::output::print_json;
use anyhow::Context;
use picker_core::{
    config::{Config, WarnLevel},
    io, paths,
    state::PersistedState,
};
use std::path::Path;

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let dir = paths::picker_dir(root);
    std::fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    let config_created = if config_path.exists() {
        false
    } else {
        Config::default()
            .save(root)
            .context("failed to write config.yaml")?;
        true
    };

    let empty = PersistedState::default()
        .to_json()
        .context("failed to encode empty state")?;
    let state_created = io::write_if_missing(&paths::state_path(root), empty.as_bytes())
        .context("failed to write state.json")?;

    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate(root);

    if json {
        print_json(&serde_json::json!({
            "root": root.display().to_string(),
            "config_created": config_created,
            "state_created": state_created,
            "warnings": warnings,
        }))?;
        return Ok(());
    }

    println!("Initializing picker in: {}", root.display());
    let status = |created: bool| if created { "created:" } else { "exists: " };
    println!("  {} {}", status(config_created), paths::CONFIG_FILE);
    println!("  {} {}", status(state_created), paths::STATE_FILE);
    for w in &warnings {
        let prefix = match w.level {
            WarnLevel::Warning => "warning",
            WarnLevel::Error => "error",
        };
        println!("  [{prefix}] {}", w.message);
    }
    println!("\nNext: picker import");
    Ok(())
}
