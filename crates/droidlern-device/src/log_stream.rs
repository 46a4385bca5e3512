//! Nicht-blockierendes Lesen des Geräte-Logs.
//!
//! Ein Lese-Thread schiebt jede Zeile des Log-Prozesses in einen Kanal.
//! [`LogStream::drain`] holt nur ab, was gerade gepuffert ist, und wartet nie
//! auf neue Daten.

use crossbeam_channel::{Receiver, Sender};
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, ChildStdout};
use std::thread;

/// Laufende Log-Aufzeichnung. Der Kindprozess wird spätestens beim `Drop`
/// beendet.
#[derive(Debug)]
pub struct LogStream {
    lines: Receiver<String>,
    child: Option<Child>,
}

impl LogStream {
    /// Liest Zeilen aus einer beliebigen Quelle, bis sie endet.
    pub fn from_reader<R>(reader: R) -> io::Result<Self>
    where
        R: Read + Send + 'static,
    {
        let (tx, rx) = crossbeam_channel::unbounded();
        thread::Builder::new()
            .name("droidlern-log".into())
            .spawn(move || pump_lines(reader, tx))?;
        Ok(Self {
            lines: rx,
            child: None,
        })
    }

    /// Liest die Ausgabe eines Log-Prozesses; der Prozess gehört danach dem Stream.
    pub fn from_child(child: Child, stdout: ChildStdout) -> io::Result<Self> {
        let mut stream = Self::from_reader(stdout)?;
        stream.child = Some(child);
        Ok(stream)
    }

    /// Ein Stream, der nie Zeilen liefert.
    pub fn closed() -> Self {
        let (_, rx) = crossbeam_channel::unbounded();
        Self {
            lines: rx,
            child: None,
        }
    }

    /// Alle aktuell gepufferten Zeilen, ohne zu blockieren.
    pub fn drain(&self) -> Vec<String> {
        self.lines.try_iter().collect()
    }

    /// Beendet den Log-Prozess und räumt ihn ab. Mehrfaches Aufrufen ist harmlos.
    pub fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        self.stop();
    }
}

fn pump_lines<R: Read>(reader: R, tx: Sender<String>) {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                if tx.send(line.to_string()).is_err() {
                    // Empfänger weg, Stream wurde verworfen.
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::RecvTimeoutError;
    use std::io::Cursor;
    use std::time::{Duration, Instant};

    fn drain_until(stream: &LogStream, expected: usize) -> Vec<String> {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut lines = Vec::new();
        while lines.len() < expected && Instant::now() < deadline {
            lines.extend(stream.drain());
            thread::sleep(Duration::from_millis(5));
        }
        lines
    }

    #[test]
    fn lines_are_delivered_once() {
        let stream = LogStream::from_reader(Cursor::new(b"first\r\nsecond\nthird".to_vec())).unwrap();
        let lines = drain_until(&stream, 3);
        assert_eq!(lines, vec!["first", "second", "third"]);
        assert!(stream.drain().is_empty());
    }

    #[test]
    fn invalid_utf8_is_replaced_not_dropped() {
        let stream = LogStream::from_reader(Cursor::new(vec![b'o', b'k', 0xff, b'\n'])).unwrap();
        let lines = drain_until(&stream, 1);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("ok"));
    }

    #[test]
    fn closed_stream_never_blocks() {
        let mut stream = LogStream::closed();
        assert!(stream.drain().is_empty());
        stream.stop();
        stream.stop();
        assert!(stream.drain().is_empty());
    }

    #[cfg(unix)]
    fn sleeping_child() -> LogStream {
        use std::process::{Command, Stdio};
        let mut child = Command::new("sh")
            .args(["-c", "exec sleep 30"])
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        let stdout = child.stdout.take().unwrap();
        LogStream::from_child(child, stdout).unwrap()
    }

    #[cfg(unix)]
    #[test]
    fn stop_terminates_the_log_process() {
        let mut stream = sleeping_child();
        assert_eq!(
            stream.lines.recv_timeout(Duration::from_millis(50)),
            Err(RecvTimeoutError::Timeout)
        );

        stream.stop();
        assert!(stream.child.is_none());
        // Der Lese-Thread sieht EOF und gibt den Sender frei.
        assert_eq!(
            stream.lines.recv_timeout(Duration::from_secs(5)),
            Err(RecvTimeoutError::Disconnected)
        );
    }

    #[cfg(unix)]
    #[test]
    fn drop_terminates_the_log_process() {
        let stream = sleeping_child();
        let lines = stream.lines.clone();
        drop(stream);
        assert_eq!(
            lines.recv_timeout(Duration::from_secs(5)),
            Err(RecvTimeoutError::Disconnected)
        );
    }
}
