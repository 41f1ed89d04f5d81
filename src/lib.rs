//! # tasksync
//!
//! A terminal task tracker whose tasks live in a live-updating document store.
//!
//! * [`session`] resolves an identity (stored, custom token, or anonymous).
//! * [`binding`] keeps the visible task list equal to the latest snapshot of
//!   the user's collection.
//! * [`gateway`] issues create/update/toggle/delete writes.
//! * [`tui`] renders the form, the list and the delete confirmation.
//! * [`commands`] offers the same operations as one-shot CLI commands.

pub mod backend;
pub mod binding;
pub mod commands;
pub mod config;
pub mod deadline;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod session;
pub mod tui;
pub mod urgency;

pub use error::{Error, Result};
