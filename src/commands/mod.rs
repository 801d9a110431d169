//! Command handlers for the expense CLI.
//!
//! This module contains implementations for all CLI subcommands.

mod add;
mod count;
mod init;
mod list;
mod remove;

use crate::store::{ExpenseStore, StoreEvent};
use crate::Config;
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info, warn};

pub use add::add;
pub use count::count;
pub use init::init;
pub use list::{list, Section};
pub use remove::remove;

/// The output type for a command. This allows the command to return a consistent message and,
/// optionally, structured data.
#[derive(Debug, Clone, Serialize)]
pub struct Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// A message that can be printed to the user regarding the outcome of the command execution.
    message: String,

    /// Any structured data that needs to be output from the call.
    structure: Option<T>,
}

impl<T, S> From<S> for Out<T>
where
    T: Debug + Clone + Serialize,
    S: Into<String>,
{
    fn from(value: S) -> Self {
        Out::new_message(value)
    }
}

impl<T> Out<T>
where
    T: Serialize + Clone + Debug,
{
    /// Create a new `Out` object that has `Some(structure)`.
    pub fn new<S>(message: S, structure: T) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: Some(structure),
        }
    }

    /// Create a new `Out` object that has `None` for `structure`.
    pub fn new_message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            message: message.into(),
            structure: None,
        }
    }

    /// Get the `message`.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the structured data stored in `structure`.
    pub fn structure(&self) -> Option<&T> {
        self.structure.as_ref()
    }

    /// Print the message to `info!` and the structured data (if it exists) as JSON to `debug!`.
    pub fn print(&self) {
        info!("{}", self.message);
        if let Some(structure) = self.structure() {
            if let Ok(json) = serde_json::to_string_pretty(structure) {
                debug!("Command output:\n\n{json}\n\n");
            }
        }
    }
}

/// Opens the store for a command, logging whether each change reached the snapshot. A change
/// that was not saved is lost when the command exits.
fn open_store(config: &Config) -> ExpenseStore {
    let mut store = config.open_store();
    let location = config.snapshot_path();
    store.subscribe(move |event: &StoreEvent| {
        if event.persisted() {
            debug!("Saved {:?}", event.change());
        } else {
            warn!(
                "{:?} could not be saved to {}",
                event.change(),
                location.display()
            );
        }
    });
    store
}

/// `1 expense`, `2 expenses`.
fn plural(count: usize) -> String {
    format!("{} expense{}", count, if count == 1 { "" } else { "s" })
}
