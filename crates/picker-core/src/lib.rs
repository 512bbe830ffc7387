pub mod catalogue;
pub mod challenge;
pub mod commander;
pub mod config;
pub mod error;
pub mod identity;
pub mod io;
pub mod names;
pub mod partner;
pub mod paths;
pub mod reconcile;
pub mod scryfall;
pub mod search;
pub mod state;
pub mod tags;
pub mod text;

pub use error::{PickerError, Result};
