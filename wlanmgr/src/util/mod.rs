//! Conversion helpers shared by the supplicant backend and link layer.

pub(crate) mod utils;
