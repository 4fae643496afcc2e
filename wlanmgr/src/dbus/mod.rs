//! D-Bus proxy interfaces for wpa_supplicant.
//!
//! This module contains low-level proxy definitions for the parts of the
//! `fi.w1.wpa_supplicant1` API this crate uses.

mod bss;
mod interface;
mod wpa_supplicant;

pub(crate) use bss::WpaBssProxy;
pub(crate) use interface::WpaInterfaceProxy;
pub(crate) use wpa_supplicant::WpaSupplicantProxy;
