//! Query-path evaluation over the dataset.
//!
//! # Responsibilities
//! - Substitute `{name}` placeholders with captured route parameters
//! - Evaluate JSONPath expressions (via `jsonpath_lib`)
//! - Translate a selected node back into a location for in-place mutation
//!
//! # Design Decisions
//! - Placeholder names are normalized `-` → `_` before substitution, the same
//!   convention the route matcher uses for capture-group names
//! - Locations are recovered by node identity, so whatever the JSONPath
//!   library selects is exactly what gets mutated

use std::any::Any;
use std::collections::HashMap;
use std::panic;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::store::StoreError;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([^}]+)\}").expect("placeholder pattern is valid"))
}

/// Normalize a parameter name so it is a valid capture-group identifier.
pub fn normalize_param_name(name: &str) -> String {
    name.replace('-', "_")
}

/// Replace `{name}` placeholders in `query` with the matching parameter values.
///
/// Placeholders without a corresponding parameter are left untouched.
pub fn substitute_params(query: &str, params: &HashMap<String, String>) -> String {
    let normalized = placeholder_pattern().replace_all(query, |caps: &Captures<'_>| {
        format!("{{{}}}", normalize_param_name(&caps[1]))
    });

    let mut result = normalized.into_owned();
    for (name, value) in params {
        result = result.replace(&format!("{{{}}}", name), value);
    }
    result
}

/// Evaluate a JSONPath expression, returning references into `root`.
///
/// `jsonpath_lib` panics on some malformed expressions (a zero slice step,
/// for one); those are reported as invalid queries like any parse error.
pub fn select<'a>(root: &'a Value, query: &str) -> Result<Vec<&'a Value>, StoreError> {
    let invalid = |reason: String| StoreError::InvalidQuery {
        query: query.to_string(),
        reason,
    };

    match panic::catch_unwind(|| jsonpath_lib::select(root, query)) {
        Ok(selected) => selected.map_err(|e| invalid(format!("{:?}", e))),
        Err(payload) => Err(invalid(panic_reason(payload.as_ref()))),
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|reason| reason.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "query evaluation aborted".to_string())
}

/// One step from a container to a child node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Find the path from `root` to `target`, where `target` is a reference into `root`.
pub fn locate(root: &Value, target: &Value) -> Option<Vec<Segment>> {
    let mut path = Vec::new();
    if locate_into(root, target, &mut path) {
        Some(path)
    } else {
        None
    }
}

fn locate_into(node: &Value, target: &Value, path: &mut Vec<Segment>) -> bool {
    if std::ptr::eq(node, target) {
        return true;
    }

    match node {
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                path.push(Segment::Index(i));
                if locate_into(item, target, path) {
                    return true;
                }
                path.pop();
            }
            false
        }
        Value::Object(map) => {
            for (key, value) in map {
                path.push(Segment::Key(key.clone()));
                if locate_into(value, target, path) {
                    return true;
                }
                path.pop();
            }
            false
        }
        _ => false,
    }
}

/// Walk `path` from `root`, returning the node it leads to.
pub fn resolve_mut<'a>(root: &'a mut Value, path: &[Segment]) -> Option<&'a mut Value> {
    path.iter().try_fold(root, |node, segment| match segment {
        Segment::Key(key) => node.get_mut(key.as_str()),
        Segment::Index(i) => node.get_mut(*i),
    })
}

/// Render a location as a JSON pointer, for diagnostics.
pub fn to_pointer(path: &[Segment]) -> String {
    path.iter()
        .map(|segment| match segment {
            Segment::Key(key) => format!("/{}", key.replace('~', "~0").replace('/', "~1")),
            Segment::Index(i) => format!("/{}", i),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_substitute_params() {
        let mut params = HashMap::new();
        params.insert("id".to_string(), "7".to_string());

        assert_eq!(substitute_params("$[?(@.id == {id})]", &params), "$[?(@.id == 7)]");
    }

    #[test]
    fn test_substitute_normalizes_dashes() {
        let mut params = HashMap::new();
        params.insert("user_id".to_string(), "42".to_string());

        assert_eq!(
            substitute_params("$[?(@.userId == {user-id})]", &params),
            "$[?(@.userId == 42)]"
        );
        assert_eq!(
            substitute_params("$[?(@.userId == {user_id})]", &params),
            "$[?(@.userId == 42)]"
        );
    }

    #[test]
    fn test_unknown_placeholder_is_kept() {
        let params = HashMap::new();
        assert_eq!(substitute_params("$[?(@.id == {id})]", &params), "$[?(@.id == {id})]");
    }

    #[test]
    fn test_select_zero_step_slice_is_invalid() {
        let doc = json!([{"id": 1}, {"id": 2}]);

        let err = select(&doc, "$[0:0:0]").unwrap_err();
        assert_eq!(err.kind(), "invalid_query");
        assert_eq!(select(&doc, "$[1]").unwrap(), vec![&doc[1]]);
    }

    #[test]
    fn test_locate_selected_node() {
        let doc = json!([{"id": 1}, {"id": 2, "tags": ["a", "b"]}]);
        let selected = select(&doc, "$[?(@.id == 2)]").unwrap();
        assert_eq!(selected.len(), 1);

        let path = locate(&doc, selected[0]).unwrap();
        assert_eq!(path, vec![Segment::Index(1)]);
        assert_eq!(to_pointer(&path), "/1");
    }

    #[test]
    fn test_locate_nested_node() {
        let doc = json!([{"id": 1, "owner": {"name": "x", "a/b": 1}}]);
        let owner = &doc[0]["owner"]["name"];

        let path = locate(&doc, owner).unwrap();
        assert_eq!(to_pointer(&path), "/0/owner/name");

        let escaped = locate(&doc, &doc[0]["owner"]["a/b"]).unwrap();
        assert_eq!(to_pointer(&escaped), "/0/owner/a~1b");
        assert_eq!(
            path,
            vec![
                Segment::Index(0),
                Segment::Key("owner".into()),
                Segment::Key("name".into())
            ]
        );
    }

    #[test]
    fn test_locate_foreign_value() {
        let doc = json!([{"id": 1}]);
        let other = json!({"id": 1});
        assert!(locate(&doc, &other).is_none());
    }

    #[test]
    fn test_resolve_mut() {
        let mut doc = json!([{"id": 1, "name": "x"}]);
        let path = vec![Segment::Index(0), Segment::Key("name".into())];

        *resolve_mut(&mut doc, &path).unwrap() = json!("y");
        assert_eq!(doc[0]["name"], "y");
        assert!(resolve_mut(&mut doc, &[Segment::Index(3)]).is_none());
    }

    #[test]
    fn test_invalid_query() {
        let doc = json!([]);
        let err = select(&doc, "$..[").unwrap_err();
        assert!(matches!(err, StoreError::InvalidQuery { .. }));
    }
}
