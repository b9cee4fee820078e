//! The `schema` command: JSON Schema of the request surface.

use schemars::schema_for;

use crate::commands::Request;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// Pretty JSON Schema for [`Request`].
pub fn request_schema() -> Result<String> {
    let schema = schema_for!(Request);
    let text = serde_json::to_string_pretty(&schema)
        .map_err(|e| anyhow::anyhow!("Failed to serialize schema: {}", e))?;
    Ok(text)
}

/// Prints the request schema for client authors.
pub struct SchemaCommand;

impl Command for SchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.message(&request_schema()?);
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    #[test]
    fn schema_names_every_command() {
        let schema = request_schema().unwrap();
        for command in ["select_python", "install_package", "cancel_operation"] {
            assert!(schema.contains(command), "missing {}", command);
        }
    }

    #[test]
    fn schema_is_printed_as_one_message() {
        let mut ui = MockUI::new();
        SchemaCommand.execute(&mut ui).unwrap();
        assert_eq!(ui.messages().len(), 1);
        let parsed: serde_json::Value = serde_json::from_str(&ui.messages()[0]).unwrap();
        assert!(parsed.is_object());
    }
}
