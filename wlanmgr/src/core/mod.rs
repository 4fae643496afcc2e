//! Core internal logic for device and network tracking.
//!
//! This module contains scan reconciliation, the cleanup timer, the
//! connection state machine, the device registry and the driver entry
//! points, along with the production supplicant and link-layer backends.

pub(crate) mod cleanup;
pub(crate) mod device;
pub(crate) mod driver;
pub(crate) mod identifier;
pub(crate) mod link;
pub(crate) mod network;
pub(crate) mod reconcile;
pub(crate) mod registry;
pub(crate) mod state_machine;
pub(crate) mod supplicant;
