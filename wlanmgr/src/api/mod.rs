//! Public API module.
//!
//! This module contains the user-facing types of the `wlanmgr` crate: the
//! plugin and its handle, the element model, the collaborator traits and
//! the data models shared between them.

pub mod backends;
pub mod config;
pub mod elements;
pub mod events;
pub mod models;
pub mod plugin;
