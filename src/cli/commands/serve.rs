//! The `serve` command: the request surface over JSON lines.
//!
//! Each input line is `{"id": <any>, "command": "<name>", "args": {...}}`.
//! Output lines carry the request's `id` back and are one of
//!
//! ```text
//! {"id": 1, "event": "pip-log", "line": "Collecting flask"}
//! {"id": 1, "response": {"type": "operation", "data": {...}}}
//! {"id": 1, "error": {"kind": "operation_failed", "message": "..."}}
//! ```
//!
//! `select_python` runs on the reader thread, so selections take effect
//! and are saved in the order they arrive. Every other request runs
//! concurrently, so a `cancel_operation` can reach a running install.
//! Frames from different requests may interleave.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::thread;

use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::commands::{ErrorPayload, Request, Response};
use crate::error::{PipdeskError, Result};
use crate::process::OutputLine;
use crate::ui::UserInterface;

use super::context::CommandContext;
use super::dispatcher::{Command, CommandResult};

/// Serves requests from stdin until EOF.
pub struct ServeCommand<'a> {
    ctx: &'a CommandContext,
}

impl<'a> ServeCommand<'a> {
    pub fn new(ctx: &'a CommandContext) -> Self {
        Self { ctx }
    }
}

impl Command for ServeCommand<'_> {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let stdin = io::stdin();
        let stdout = Mutex::new(io::stdout());
        serve(self.ctx, stdin.lock(), &stdout)?;
        Ok(CommandResult::success())
    }
}

/// Read requests from `reader` and write frames to `writer`.
///
/// Returns once `reader` is exhausted and every request has answered.
pub fn serve<W>(ctx: &CommandContext, reader: impl BufRead, writer: &Mutex<W>) -> Result<()>
where
    W: Write + Send,
{
    thread::scope(|s| -> Result<()> {
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match parse_envelope(&line) {
                Ok((id, request @ Request::SelectPython { .. })) => {
                    debug!("Serving {} (id {}) in order", request.name(), id);
                    answer(ctx, id, request, writer);
                }
                Ok((id, request)) => {
                    debug!("Serving {} (id {})", request.name(), id);
                    s.spawn(move || answer(ctx, id, request, writer));
                }
                Err((id, err)) => write_frame(writer, &error_frame(id, &err)),
            }
        }
        Ok(())
    })
}

/// Split a line into its id and request.
///
/// The id is kept when the line is valid JSON so the error can be matched
/// to it.
fn parse_envelope(line: &str) -> std::result::Result<(Value, Request), (Value, PipdeskError)> {
    let mut value: Value = serde_json::from_str(line).map_err(|e| {
        (
            Value::Null,
            PipdeskError::invalid_request(format!("malformed JSON: {}", e)),
        )
    })?;

    let id = value
        .as_object_mut()
        .and_then(|object| object.remove("id"))
        .unwrap_or(Value::Null);

    match serde_json::from_value(value) {
        Ok(request) => Ok((id, request)),
        Err(e) => Err((id, PipdeskError::invalid_request(e.to_string()))),
    }
}

fn answer<W: Write>(ctx: &CommandContext, id: Value, request: Request, writer: &Mutex<W>) {
    let is_select = matches!(request, Request::SelectPython { .. });

    let mut sink = |line: &OutputLine| {
        write_frame(
            writer,
            &json!({"id": id, "event": "pip-log", "line": line.display_text()}),
        );
    };
    let result = ctx.handle(request, &mut sink);

    let frame = match result {
        Ok(response) => {
            if let (true, Response::Interpreter(interpreter)) = (is_select, &response) {
                if let Err(e) = ctx.remember(interpreter) {
                    warn!("Selection not saved: {}", e);
                }
            }
            json!({"id": id, "response": response})
        }
        Err(err) => error_frame(id, &err),
    };
    write_frame(writer, &frame);
}

fn error_frame(id: Value, err: &PipdeskError) -> Value {
    json!({"id": id, "error": ErrorPayload::from(err)})
}

fn write_frame<W: Write>(writer: &Mutex<W>, frame: &Value) {
    let mut out = match writer.lock() {
        Ok(out) => out,
        Err(poisoned) => poisoned.into_inner(),
    };
    let written = serde_json::to_writer(&mut *out, frame)
        .map_err(io::Error::from)
        .and_then(|_| writeln!(out))
        .and_then(|_| out.flush());
    if let Err(e) = written {
        warn!("Failed to write frame: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::Backend;
    use crate::config::PipdeskConfig;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn context() -> CommandContext {
        CommandContext::new(Backend::new(PipdeskConfig::default()).unwrap(), true, None)
    }

    fn run(ctx: &CommandContext, input: &str) -> Vec<Value> {
        let out = Mutex::new(Vec::new());
        serve(ctx, Cursor::new(input.to_string()), &out).unwrap();
        let bytes = out.into_inner().unwrap();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    fn frame_for<'a>(frames: &'a [Value], id: &Value) -> &'a Value {
        frames
            .iter()
            .find(|f| &f["id"] == id && f.get("event").is_none())
            .unwrap()
    }

    #[test]
    fn answers_with_the_request_id() {
        let frames = run(
            &context(),
            "{\"id\": 7, \"command\": \"get_selected_python\"}\n",
        );
        assert_eq!(
            frames,
            vec![json!({"id": 7, "response": {"type": "selected", "data": null}})]
        );
    }

    #[test]
    fn malformed_line_gets_an_error_frame() {
        let frames = run(&context(), "not json\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["id"], Value::Null);
        assert_eq!(frames[0]["error"]["kind"], "invalid_request");
    }

    #[test]
    fn unknown_command_keeps_its_id() {
        let frames = run(&context(), "{\"id\": \"a\", \"command\": \"format_disk\"}\n");
        assert_eq!(frames[0]["id"], "a");
        assert_eq!(frames[0]["error"]["kind"], "invalid_request");
    }

    #[test]
    fn handles_several_requests() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir(temp.path().join("src")).unwrap();
        let request = json!({
            "id": 2,
            "command": "list_directory",
            "args": {"path": temp.path()}
        });
        let input = format!(
            "{{\"id\": 1, \"command\": \"get_drives\"}}\n{}\n{{\"id\": 3, \"command\": \"search_pypi\", \"args\": {{\"query\": \"  \"}}}}\n",
            request
        );

        let frames = run(&context(), &input);
        assert_eq!(frames.len(), 3);
        assert_eq!(frame_for(&frames, &json!(1))["response"]["type"], "paths");

        let listing = frame_for(&frames, &json!(2));
        assert_eq!(listing["response"]["type"], "entries");
        assert_eq!(listing["response"]["data"][0]["name"], "src");

        assert_eq!(
            frame_for(&frames, &json!(3))["error"]["kind"],
            "invalid_request"
        );
    }

    #[cfg(unix)]
    #[test]
    fn operation_logs_precede_the_response() {
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let python = temp.path().join("python3");
        fs::write(
            &python,
            "#!/bin/sh\necho 'Collecting flask'\necho 'oops' >&2\necho 'Successfully installed flask-3.0.0'\n",
        )
        .unwrap();
        fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();

        let request = json!({
            "id": 9,
            "command": "install_package",
            "args": {"python_path": python, "package": "flask"}
        });
        let frames = run(&context(), &format!("{}\n", request));

        let last = frames.last().unwrap();
        assert_eq!(last["id"], 9);
        assert_eq!(last["response"]["type"], "operation");
        assert_eq!(last["response"]["data"]["status"], "succeeded");

        let logs: Vec<&str> = frames
            .iter()
            .filter(|f| f["event"] == "pip-log")
            .map(|f| f["line"].as_str().unwrap())
            .collect();
        assert!(logs.contains(&"Collecting flask"));
        assert!(logs.contains(&"[stderr] oops"));
        assert!(logs.contains(&"Successfully installed flask-3.0.0"));
    }

    #[cfg(unix)]
    #[test]
    fn selections_apply_in_arrival_order() {
        use crate::state::SelectionStore;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let slow = temp.path().join("slow_python");
        let fast = temp.path().join("fast_python");
        fs::write(&slow, "#!/bin/sh\nsleep 1\necho 'Python 3.11.0'\n").unwrap();
        fs::write(&fast, "#!/bin/sh\necho 'Python 3.12.0'\n").unwrap();
        for python in [&slow, &fast] {
            fs::set_permissions(python, fs::Permissions::from_mode(0o755)).unwrap();
        }

        let store = SelectionStore::new(temp.path().join("selection.json"));
        let ctx = CommandContext::new(
            Backend::new(PipdeskConfig::default()).unwrap(),
            true,
            Some(store.clone()),
        );
        let input = format!(
            "{}\n{}\n",
            json!({"id": 1, "command": "select_python", "args": {"path": slow}}),
            json!({"id": 2, "command": "select_python", "args": {"path": fast}}),
        );
        let frames = run(&ctx, &input);

        let ids: Vec<&Value> = frames.iter().map(|f| &f["id"]).collect();
        assert_eq!(ids, [&json!(1), &json!(2)]);
        assert_eq!(
            ctx.backend().selected().current().map(|i| i.path),
            Some(fast.clone())
        );
        assert_eq!(store.load().unwrap().unwrap().interpreter.path, fast);
    }
}
