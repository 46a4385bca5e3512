//! Gerätesteuerung über einen [`Transport`].
//!
//! Jede Operation liefert die (getrimmte) Ausgabe des entfernten Kommandos
//! oder `None`, wenn es mit einem Status ungleich null endete bzw. gar nicht
//! gestartet werden konnte. Fehler werden gemeldet, aber nie als Panic oder
//! `Err` nach oben gereicht. Einzige Ausnahme ist [`Controller::new`]: ohne
//! Bildschirmgröße ist das Gerät nicht benutzbar.

use crate::error::{ControllerError, Result};
use crate::log_stream::LogStream;
use crate::transport::{AdbTransport, Transport};
use droidlern_core::{diag, Direction, LogLines, Point, Size};
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Standardlänge für [`Controller::swipe_point`].
pub const DEFAULT_SWIPE_LENGTH: i32 = 2;
/// Standarddauer eines Wischens in Millisekunden.
pub const DEFAULT_SWIPE_MS: u32 = 400;
/// Standarddauer von [`Controller::touch_hold`] in Millisekunden.
pub const DEFAULT_HOLD_MS: u32 = 1000;
/// Wartezeit nach einem Neustart, bevor die Log-Aufzeichnung neu startet.
pub const REBOOT_SETTLE: Duration = Duration::from_secs(20);

pub const KEYCODE_HOME: u32 = 3;
pub const KEYCODE_BACK: u32 = 4;

/// Ablageort für Dateien, die vor dem `pull` auf dem Gerät erzeugt werden.
const REMOTE_STAGING_DIR: &str = "/sdcard";

/// Steuert genau ein Gerät.
#[derive(Debug)]
pub struct Controller<T: Transport = AdbTransport> {
    transport: T,
    serial: String,
    size: Size,
    log: LogStream,
    reboot_settle: Duration,
}

impl<T: Transport> Controller<T> {
    /// Verbindet sich mit dem Gerät `serial`, liest die Bildschirmgröße und
    /// startet die Log-Aufzeichnung.
    pub fn new(transport: T, serial: impl Into<String>) -> Result<Self> {
        let serial = serial.into();
        let size = query_size(&transport, &serial).ok_or_else(|| ControllerError::DeviceSize {
            serial: serial.clone(),
        })?;
        let log = start_log(&transport, &serial).map_err(ControllerError::LogStream)?;
        Ok(Self {
            transport,
            serial,
            size,
            log,
            reboot_settle: REBOOT_SETTLE,
        })
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    /// Beim Verbinden ermittelte Bildschirmgröße.
    pub fn size(&self) -> Size {
        self.size
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fragt die Bildschirmgröße erneut beim Gerät ab. Der Cache bleibt unverändert.
    pub fn get_device_size(&self) -> Option<Size> {
        query_size(&self.transport, &self.serial)
    }

    pub fn tap(&self, pos: Point) -> Option<String> {
        self.shell(["input".into(), "tap".into(), pos.x.to_string(), pos.y.to_string()])
    }

    pub fn key_event(&self, code: u32) -> Option<String> {
        self.shell(["input".into(), "keyevent".into(), code.to_string()])
    }

    pub fn home(&self) -> Option<String> {
        self.key_event(KEYCODE_HOME)
    }

    pub fn back(&self) -> Option<String> {
        self.key_event(KEYCODE_BACK)
    }

    /// Hält `pos` gedrückt: ein Wischen vom Punkt zu sich selbst.
    pub fn touch_hold(&self, pos: Point, duration_ms: u32) -> Option<String> {
        self.swipe_points(pos, pos, duration_ms)
    }

    /// Wischt von `pos` aus in `direction`; die Strecke wächst quadratisch mit `length`.
    pub fn swipe_point(
        &self,
        pos: Point,
        direction: Direction,
        length: i32,
        duration_ms: u32,
    ) -> Option<String> {
        let end = swipe_target(self.size, pos, direction, length);
        self.swipe_points(pos, end, duration_ms)
    }

    pub fn swipe_points(&self, start: Point, end: Point, duration_ms: u32) -> Option<String> {
        self.shell([
            "input".into(),
            "swipe".into(),
            start.x.to_string(),
            start.y.to_string(),
            end.x.to_string(),
            end.y.to_string(),
            duration_ms.to_string(),
        ])
    }

    /// Tippt `text` ein. Leerzeichen werden zu `%s`, einfache Anführungszeichen
    /// fallen weg.
    pub fn type_text(&self, text: &str) -> Option<String> {
        self.shell(["input".into(), "text".into(), sanitize_text(text)])
    }

    /// Schreibt ein Bildschirmfoto (PNG) nach `path`.
    pub fn get_screenshot(&self, path: &Path) -> Option<String> {
        let remote = remote_staging_path(path)?;
        self.shell(["screencap".into(), "-p".into(), remote.clone()])?;
        self.fetch(&remote, path)
    }

    /// Schreibt den UI-Hierarchie-Dump nach `path`.
    ///
    /// Der Dateiname von `path` dient auch als Name der Zwischendatei auf dem
    /// Gerät und muss daher pro Gerät eindeutig sein.
    pub fn get_xml(&self, path: &Path) -> Option<String> {
        let remote = remote_staging_path(path)?;
        self.shell(["uiautomator".into(), "dump".into(), remote.clone()])?;
        self.fetch(&remote, path)
    }

    /// Seit dem letzten Aufruf angefallene Log-Zeilen. Blockiert nie, kann leer sein.
    pub fn get_log(&self) -> LogLines {
        self.log.drain().into_iter()
    }

    pub fn install_apk(&self, path: &Path) -> Option<String> {
        self.execute(&[
            "install".to_string(),
            "-r".to_string(),
            path.to_string_lossy().into_owned(),
        ])
    }

    pub fn open_app(&self, package: &str) -> Option<String> {
        self.shell([
            "monkey".into(),
            "-p".into(),
            package.into(),
            "-c".into(),
            "android.intent.category.LAUNCHER".into(),
            "1".into(),
        ])
    }

    pub fn force_stop(&self, package: &str) -> Option<String> {
        self.shell(["am".into(), "force-stop".into(), package.into()])
    }

    /// Löscht Daten und Cache einer App.
    pub fn clear_app_data(&self, package: &str) -> Option<String> {
        self.shell(["pm".into(), "clear".into(), package.into()])
    }

    /// Startet das Gerät neu, wartet [`REBOOT_SETTLE`] und beginnt danach eine
    /// frische Log-Aufzeichnung. Zeilen von vor dem Neustart gehen verloren.
    pub fn reboot(&mut self) -> Option<String> {
        let out = self.execute(&["reboot".to_string()]);
        thread::sleep(self.reboot_settle);
        self.log.stop();
        self.log = match start_log(&self.transport, &self.serial) {
            Ok(log) => log,
            Err(e) => {
                diag::warn(&format!(
                    "log capture on {} did not restart after reboot: {e}",
                    self.serial
                ));
                LogStream::closed()
            }
        };
        out
    }

    /// Beendet die Log-Aufzeichnung. Passiert sonst spätestens beim `Drop`.
    pub fn close(&mut self) {
        self.log.stop();
    }

    fn shell<const N: usize>(&self, args: [String; N]) -> Option<String> {
        let mut full = Vec::with_capacity(N + 1);
        full.push("shell".to_string());
        full.extend(args);
        self.execute(&full)
    }

    /// Holt eine Zwischendatei ab und löscht sie danach auf dem Gerät, auch
    /// wenn der `pull` scheitert.
    fn fetch(&self, remote: &str, local: &Path) -> Option<String> {
        let out = self.pull(remote, local);
        self.shell(["rm".into(), "-f".into(), remote.to_string()]);
        out
    }

    fn pull(&self, remote: &str, local: &Path) -> Option<String> {
        self.execute(&[
            "pull".to_string(),
            remote.to_string(),
            local.to_string_lossy().into_owned(),
        ])
    }

    fn execute(&self, args: &[String]) -> Option<String> {
        execute(&self.transport, Some(self.serial.as_str()), args)
    }

    #[cfg(test)]
    pub(crate) fn set_reboot_settle(&mut self, settle: Duration) {
        self.reboot_settle = settle;
    }
}

/// Seriennummern aller Geräte, die adb im Zustand `device` meldet.
pub fn list_devices<T: Transport>(transport: &T) -> Option<Vec<String>> {
    let out = execute(transport, None, &["devices".to_string()])?;
    Some(parse_device_list(&out))
}

/// Endpunkt eines Wischens aus [`Controller::swipe_point`].
///
/// Bei sehr großem `length` sättigt die Rechnung an den Grenzen von `i32`.
pub fn swipe_target(size: Size, pos: Point, direction: Direction, length: i32) -> Point {
    let width_tenth = i32::try_from(size.width / 10).unwrap_or(i32::MAX);
    let unit = length.saturating_mul(width_tenth);
    let (dx, dy) = direction.vector();
    let offset = |d: i32| unit.saturating_mul(d).saturating_mul(length);
    Point::new(
        pos.x.saturating_add(offset(dx)),
        pos.y.saturating_add(offset(dy)),
    )
}

/// Aufbereitung für `input text`.
pub fn sanitize_text(text: &str) -> String {
    text.replace(' ', "%s").replace('\'', "")
}

fn execute<T: Transport>(transport: &T, serial: Option<&str>, args: &[String]) -> Option<String> {
    match transport.run(serial, args) {
        Ok(out) if out.success() => Some(out.stdout.trim().to_string()),
        Ok(out) => {
            diag::warn(&format!(
                "adb {} exited with status {}: {}",
                args.join(" "),
                out.status,
                out.stderr.trim()
            ));
            None
        }
        Err(e) => {
            diag::warn(&format!("could not run adb {}: {e}", args.join(" ")));
            None
        }
    }
}

fn query_size<T: Transport>(transport: &T, serial: &str) -> Option<Size> {
    let out = execute(
        transport,
        Some(serial),
        &["shell".to_string(), "wm".to_string(), "size".to_string()],
    )?;
    let size = parse_size(&out);
    if size.is_none() {
        diag::warn(&format!("unexpected `wm size` output from {serial}: {out:?}"));
    }
    size
}

/// Liest `Physical size: 1080x2340`. Steht danach noch eine `Override size`,
/// gewinnt die, weil Eingaben in diesen Koordinaten erfolgen.
fn parse_size(output: &str) -> Option<Size> {
    let line = output.lines().rev().find(|l| l.contains(": "))?;
    let (_, dims) = line.split_once(": ")?;
    let (width, height) = dims.trim().split_once('x')?;
    Some(Size {
        width: width.trim().parse().ok()?,
        height: height.trim().parse().ok()?,
    })
}

fn parse_device_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let serial = parts.next()?;
            (parts.next() == Some("device")).then(|| serial.to_string())
        })
        .collect()
}

fn start_log<T: Transport>(transport: &T, serial: &str) -> std::io::Result<LogStream> {
    // Rückstand im Geräte-Puffer verwerfen, damit nur neue Zeilen ankommen.
    execute(
        transport,
        Some(serial),
        &["logcat".to_string(), "-c".to_string()],
    );
    transport.spawn_log(serial)
}

fn remote_staging_path(local: &Path) -> Option<String> {
    match local.file_name() {
        Some(name) => Some(format!("{REMOTE_STAGING_DIR}/{}", name.to_string_lossy())),
        None => {
            diag::warn(&format!("{} has no file name", local.display()));
            None
        }
    }
}
