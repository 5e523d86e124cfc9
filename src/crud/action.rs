//! CRUD operation kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The operation a route performs against the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ActionKind {
    Create,
    GetAll,
    GetOne,
    GetMany,
    Merge,
    Update,
    Delete,
}

impl ActionKind {
    /// HTTP method used when a route does not declare one.
    pub fn default_method(self) -> &'static str {
        match self {
            ActionKind::Create => "POST",
            ActionKind::GetAll | ActionKind::GetOne | ActionKind::GetMany => "GET",
            ActionKind::Merge => "PATCH",
            ActionKind::Update => "PUT",
            ActionKind::Delete => "DELETE",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Create => "Create",
            ActionKind::GetAll => "GetAll",
            ActionKind::GetOne => "GetOne",
            ActionKind::GetMany => "GetMany",
            ActionKind::Merge => "Merge",
            ActionKind::Update => "Update",
            ActionKind::Delete => "Delete",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    /// Parse an action name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            ActionKind::Create,
            ActionKind::GetAll,
            ActionKind::GetOne,
            ActionKind::GetMany,
            ActionKind::Merge,
            ActionKind::Update,
            ActionKind::Delete,
        ]
        .into_iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
        .ok_or_else(|| format!("unknown action '{}'", s))
    }
}

impl TryFrom<String> for ActionKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ActionKind> for String {
    fn from(kind: ActionKind) -> Self {
        kind.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_case() {
        assert_eq!("getOne".parse::<ActionKind>().unwrap(), ActionKind::GetOne);
        assert_eq!("DELETE".parse::<ActionKind>().unwrap(), ActionKind::Delete);
        assert!("upsert".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_serde() {
        let kind: ActionKind = serde_json::from_str("\"merge\"").unwrap();
        assert_eq!(kind, ActionKind::Merge);
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"Merge\"");
    }

    #[test]
    fn test_default_methods() {
        assert_eq!(ActionKind::Create.default_method(), "POST");
        assert_eq!(ActionKind::GetMany.default_method(), "GET");
        assert_eq!(ActionKind::Merge.default_method(), "PATCH");
        assert_eq!(ActionKind::Update.default_method(), "PUT");
        assert_eq!(ActionKind::Delete.default_method(), "DELETE");
    }
}
