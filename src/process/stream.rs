//! Line-oriented forwarding of child output.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Read};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// One line of child output, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct OutputLine {
    pub stream: StreamKind,
    pub text: String,
}

impl OutputLine {
    /// A stdout line.
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stream: StreamKind::Stdout,
            text: text.into(),
        }
    }

    /// A stderr line.
    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            stream: StreamKind::Stderr,
            text: text.into(),
        }
    }

    /// Text as shown in a combined log (`[stderr] ` prefix for stderr).
    pub fn display_text(&self) -> String {
        match self.stream {
            StreamKind::Stdout => self.text.clone(),
            StreamKind::Stderr => format!("[stderr] {}", self.text),
        }
    }
}

/// Spawn a thread that reads `reader` line by line and sends each line to
/// `tx` as soon as it is complete.
///
/// Lines are split on `\n`; a trailing `\r` is dropped and invalid UTF-8 is
/// replaced rather than ending the stream. The thread exits at EOF or when
/// the receiving side has hung up; `on_line` sees every line that was sent.
pub fn pump_lines<R, F>(
    reader: R,
    stream: StreamKind,
    tx: Sender<OutputLine>,
    mut on_line: F,
) -> JoinHandle<()>
where
    R: Read + Send + 'static,
    F: FnMut(&OutputLine) + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) | Err(_) => break,
                Ok(_) => {
                    while matches!(buf.last(), Some(b'\n') | Some(b'\r')) {
                        buf.pop();
                    }
                    let line = OutputLine {
                        stream,
                        text: String::from_utf8_lossy(&buf).into_owned(),
                    };
                    on_line(&line);
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            }
        }
    })
}
