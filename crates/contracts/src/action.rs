//! Bulk action kinds

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ContractError;

/// Operation kind carried by a bulk item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create a document, failing if the id already exists
    Create,
    /// Create or replace a document
    Index,
    /// Partial update of an existing document
    Update,
    /// Remove a document
    Delete,
}

impl Action {
    /// All actions, in wire-name order
    pub const ALL: [Action; 4] = [Action::Create, Action::Index, Action::Update, Action::Delete];

    /// Wire name used as the metadata line key
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Index => "index",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }

    /// Whether the action is followed by a source payload line
    pub fn requires_source(&self) -> bool {
        !matches!(self, Action::Delete)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Action::Create),
            "index" => Ok(Action::Index),
            "update" => Ok(Action::Update),
            "delete" => Ok(Action::Delete),
            other => Err(ContractError::decode(format!("unknown bulk action '{other}'"))),
        }
    }
}
