//! Type definitions and constants.
//!
//! This module contains supplicant, link-layer and element-property constants.

pub(crate) mod constants;
