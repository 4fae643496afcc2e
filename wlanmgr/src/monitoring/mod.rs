//! Background monitoring of the supplicant.
//!
//! These tasks turn D-Bus signals and rtnetlink notifications into events
//! for the plugin's event loop: links coming and going, interface state and
//! scan completion per device, and the supplicant itself appearing or
//! disappearing.

pub(crate) mod link;
pub(crate) mod service;
pub(crate) mod supplicant;
