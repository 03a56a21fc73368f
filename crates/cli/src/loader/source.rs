//! NDJSON line -> bulk item

use contracts::{Action, Item};
use serde_json::Value;

use crate::error::{CliError, Result};

/// Turns input lines into items for one fixed action
#[derive(Debug, Clone)]
pub struct LineParser {
    action: Action,
    id_field: Option<String>,
}

impl LineParser {
    pub fn new(action: Action, id_field: Option<String>) -> Self {
        Self { action, id_field }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    /// Parse one line; `None` for blank lines
    ///
    /// The line is forwarded as the source verbatim. It is only parsed when
    /// an id field has to be extracted.
    pub fn parse(&self, line_no: usize, line: &str) -> Result<Option<Item>> {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            return Ok(None);
        }

        let id = match &self.id_field {
            Some(field) => extract_id(line_no, line, field)?,
            None => None,
        };

        if id.is_none() && matches!(self.action, Action::Update | Action::Delete) {
            return Err(CliError::invalid_input(
                line_no,
                format!("{} requires a document id (see --id-field)", self.action),
            ));
        }

        let mut item = Item::new(self.action);
        if self.action.requires_source() {
            item = item.with_body(line.to_string());
        }
        if let Some(id) = id {
            item = item.with_id(id);
        }
        Ok(Some(item))
    }
}

fn extract_id(line_no: usize, line: &str, field: &str) -> Result<Option<String>> {
    let doc: Value = serde_json::from_str(line)
        .map_err(|e| CliError::invalid_input(line_no, format!("invalid JSON: {e}")))?;

    let Value::Object(map) = doc else {
        return Err(CliError::invalid_input(line_no, "document is not a JSON object"));
    };

    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(CliError::invalid_input(
            line_no,
            format!("id field '{field}' must be a string or number, got {other}"),
        )),
    }
}
