//! Steuerung eines Android-Geräts über adb.
//!
//! Der [`Controller`] übersetzt Geräteoperationen (Tippen, Wischen, Tasten,
//! Texteingabe, App-Start, Bildschirmfoto, UI-Dump, Neustart) in Kommandos
//! eines [`Transport`]s und hält die Log-Aufzeichnung des Geräts am Laufen.
//! Das Log wird über [`LogStream`] nicht-blockierend abgefragt.

mod controller;
pub mod error;
mod log_stream;
#[cfg(any(test, feature = "scripted"))]
pub mod scripted;
mod transport;

pub use controller::{
    list_devices, sanitize_text, swipe_target, Controller, DEFAULT_HOLD_MS, DEFAULT_SWIPE_LENGTH,
    DEFAULT_SWIPE_MS, KEYCODE_BACK, KEYCODE_HOME, REBOOT_SETTLE,
};
pub use error::{ControllerError, Result};
pub use log_stream::LogStream;
pub use transport::{AdbTransport, CommandOutput, Transport};
