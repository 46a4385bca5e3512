//! Diagnosemeldungen der Bibliotheks-Crates.
//!
//! Mit dem Feature `telemetry` landen Meldungen bei `tracing`. Ohne das
//! Feature werden Warnungen über `eprintln!` ausgegeben und Debug-Meldungen
//! verworfen.

pub fn warn(message: &str) {
    #[cfg(feature = "telemetry")]
    tracing::warn!("{message}");
    #[cfg(not(feature = "telemetry"))]
    eprintln!("warning: {message}");
}

pub fn debug(message: &str) {
    #[cfg(feature = "telemetry")]
    tracing::debug!("{message}");
    #[cfg(not(feature = "telemetry"))]
    let _ = message;
}
