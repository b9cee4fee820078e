//! State persisted between runs.
//!
//! Only the selected interpreter is remembered, in
//! `<config_dir>/pipdesk/selection.json`.

pub mod selection;

pub use selection::{SavedSelection, SelectionStore};
