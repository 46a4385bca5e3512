//! Ein Gerät aus der Konserve.
//!
//! [`ScriptedTransport`] zeichnet alle Kommandos auf, beantwortet `wm size`
//! und `devices`, legt beim `pull` hinterlegte Dateien ab und liefert pro
//! gestarteter Log-Aufzeichnung eine vorbereitete Zeilenfolge. Klone teilen
//! sich denselben Zustand.

use crate::log_stream::LogStream;
use crate::transport::{CommandOutput, Transport};
use droidlern_core::Size;
use std::cell::RefCell;
use std::io::{self, Cursor};
use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

#[derive(Debug)]
struct Script {
    size: Size,
    devices: Vec<String>,
    failing: Vec<String>,
    calls: Vec<String>,
    log_sessions: Vec<Vec<String>>,
    sessions_started: usize,
    pulls: Vec<(String, Vec<u8>)>,
}

impl ScriptedTransport {
    pub fn new(size: Size) -> Self {
        Self {
            script: Rc::new(RefCell::new(Script {
                size,
                devices: vec!["emulator-5554".into()],
                failing: Vec::new(),
                calls: Vec::new(),
                log_sessions: Vec::new(),
                sessions_started: 0,
                pulls: Vec::new(),
            })),
        }
    }

    /// Jedes Kommando, dessen Argumente `fragment` enthalten, endet mit Status 1.
    pub fn fail_on(&self, fragment: &str) {
        self.script.borrow_mut().failing.push(fragment.to_string());
    }

    /// Hebt alle mit [`fail_on`](Self::fail_on) gesetzten Fehler auf.
    pub fn heal(&self) {
        self.script.borrow_mut().failing.clear();
    }

    pub fn set_devices(&self, devices: Vec<String>) {
        self.script.borrow_mut().devices = devices;
    }

    /// Zeilen für die nächste noch nicht vorbereitete Log-Aufzeichnung.
    /// Weitere Aufzeichnungen bleiben leer.
    pub fn log_session(&self, lines: Vec<String>) {
        self.script.borrow_mut().log_sessions.push(lines);
    }

    /// Inhalt für jeden `pull`, dessen entfernter Pfad auf `suffix` endet.
    pub fn serve_pull(&self, suffix: &str, content: Vec<u8>) {
        self.script
            .borrow_mut()
            .pulls
            .push((suffix.to_string(), content));
    }

    /// Bisher ausgeführte Kommandos, Argumente mit Leerzeichen verbunden.
    pub fn calls(&self) -> Vec<String> {
        self.script.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.script.borrow_mut().calls.clear();
    }

    fn reply(status: i32, stdout: impl Into<String>) -> CommandOutput {
        CommandOutput {
            status,
            stdout: stdout.into(),
            stderr: if status == 0 {
                String::new()
            } else {
                "scripted failure".into()
            },
        }
    }
}

impl Transport for ScriptedTransport {
    fn run(&self, _serial: Option<&str>, args: &[String]) -> io::Result<CommandOutput> {
        let line = args.join(" ");
        let mut script = self.script.borrow_mut();
        script.calls.push(line.clone());

        if script.failing.iter().any(|f| line.contains(f.as_str())) {
            return Ok(Self::reply(1, ""));
        }

        match args.first().map(String::as_str) {
            Some("devices") => {
                let mut out = String::from("List of devices attached\n");
                for serial in &script.devices {
                    out.push_str(&format!("{serial}\tdevice\n"));
                }
                Ok(Self::reply(0, out))
            }
            Some("pull") if args.len() == 3 => {
                let served = script
                    .pulls
                    .iter()
                    .find(|(suffix, _)| args[1].ends_with(suffix.as_str()))
                    .map(|(_, content)| content.clone());
                match served {
                    Some(content) => {
                        std::fs::write(Path::new(&args[2]), content)?;
                        Ok(Self::reply(0, format!("{}: 1 file pulled", args[1])))
                    }
                    None => Ok(Self::reply(1, "")),
                }
            }
            _ if line == "shell wm size" => Ok(Self::reply(
                0,
                format!("Physical size: {}x{}\n", script.size.width, script.size.height),
            )),
            _ => Ok(Self::reply(0, "")),
        }
    }

    fn spawn_log(&self, _serial: &str) -> io::Result<LogStream> {
        let mut script = self.script.borrow_mut();
        let lines = script
            .log_sessions
            .get(script.sessions_started)
            .cloned()
            .unwrap_or_default();
        script.sessions_started += 1;
        let mut text = lines.join("\n");
        if !text.is_empty() {
            text.push('\n');
        }
        LogStream::from_reader(Cursor::new(text.into_bytes()))
    }
}
