use super::open_state;
use crate::output::{print_json, print_table};
use anyhow::Context;
use picker_core::{
    config::Config,
    tags::{filter_tags, tag_index},
};
use std::path::Path;

pub fn run(root: &Path, filter: Option<&str>, all: bool, json: bool) -> anyhow::Result<()> {
    let (_, state) = open_state(root)?;
    let config = Config::load(root).context("failed to load config")?;

    let index = tag_index(&state.commanders);
    let limit = (!all).then_some(config.tag_list_limit);
    let shown = filter_tags(&index, filter.unwrap_or_default(), limit);

    if json {
        print_json(&shown)?;
        return Ok(());
    }
    if shown.is_empty() {
        println!("No tags found.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = shown
        .iter()
        .map(|t| vec![t.label.clone(), t.count.to_string()])
        .collect();
    print_table(&["TAG", "COUNT"], rows);
    if shown.len() < index.len() {
        println!("\n{} of {} tags", shown.len(), index.len());
    }
    Ok(())
}
