//! Transportschicht zum Gerät.
//!
//! Der [`Controller`](crate::Controller) spricht ausschließlich über das
//! [`Transport`]-Trait mit dem Gerät. [`AdbTransport`] ist die echte
//! Implementierung über die `adb`-Kommandozeile.

use crate::log_stream::LogStream;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Ergebnis eines entfernten Kommandos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit-Status; `-1`, wenn der Prozess durch ein Signal endete.
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Kanal, über den Kommandos an ein Gerät gehen.
pub trait Transport {
    /// Führt ein adb-Kommando aus. `serial == None` adressiert den adb-Server
    /// selbst (z. B. `devices`).
    fn run(&self, serial: Option<&str>, args: &[String]) -> io::Result<CommandOutput>;

    /// Startet die fortlaufende Log-Aufzeichnung des Geräts.
    fn spawn_log(&self, serial: &str) -> io::Result<LogStream>;
}

/// [`Transport`] über das `adb`-Programm.
#[derive(Debug, Clone)]
pub struct AdbTransport {
    program: PathBuf,
}

impl Default for AdbTransport {
    fn default() -> Self {
        Self {
            program: PathBuf::from("adb"),
        }
    }
}

impl AdbTransport {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self, serial: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.program);
        if let Some(serial) = serial {
            cmd.arg("-s").arg(serial);
        }
        cmd.stdin(Stdio::null());
        cmd
    }
}

impl Transport for AdbTransport {
    fn run(&self, serial: Option<&str>, args: &[String]) -> io::Result<CommandOutput> {
        let output = self.command(serial).args(args).output()?;
        Ok(CommandOutput {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn spawn_log(&self, serial: &str) -> io::Result<LogStream> {
        let mut child = self
            .command(Some(serial))
            .arg("logcat")
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;
        let Some(stdout) = child.stdout.take() else {
            // Ohne stdout-Pipe ist der Kindprozess nutzlos.
            let _ = child.kill();
            let _ = child.wait();
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "logcat stdout unavailable",
            ));
        };
        LogStream::from_child(child, stdout)
    }
}
