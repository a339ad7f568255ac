use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// Structured fields extracted from a saved job posting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRole {
    pub keywords: Vec<String>,
    pub requirements: Vec<String>,
    #[serde(alias = "must_haves")]
    pub must_haves: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RoleParse {
    Parsed(ParsedRole),
    Unparsed,
}

impl RoleParse {
    /// Converts the stored `parsed` column into the tagged form.
    ///
    /// Only an object carrying at least one of the three list fields counts as
    /// parsed. Missing lists default to empty; null, strings and malformed
    /// objects are `Unparsed`.
    pub fn from_json(raw: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = raw else {
            return RoleParse::Unparsed;
        };
        let has_lists = ["keywords", "requirements", "mustHaves", "must_haves"]
            .iter()
            .any(|k| matches!(map.get(*k), Some(Value::Array(_))));
        if !has_lists {
            return RoleParse::Unparsed;
        }
        RoleParse::Parsed(ParsedRole {
            keywords: string_list(map.get("keywords")),
            requirements: string_list(map.get("requirements")),
            must_haves: string_list(map.get("mustHaves").or_else(|| map.get("must_haves"))),
        })
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, RoleParse::Parsed(_))
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: Uuid,
    pub parsed: RoleParse,
}

#[derive(Debug, Clone, FromRow)]
pub struct RoleRow {
    pub id: Uuid,
    pub parsed: Option<Value>,
}

impl From<RoleRow> for RoleRecord {
    fn from(row: RoleRow) -> Self {
        Self {
            id: row.id,
            parsed: RoleParse::from_json(row.parsed.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_with_lists_is_parsed() {
        let raw = json!({
            "keywords": ["rust", "tokio", 7],
            "requirements": ["5+ years"],
            "mustHaves": ["on-call"]
        });
        let parsed = RoleParse::from_json(Some(&raw));
        assert_eq!(
            parsed,
            RoleParse::Parsed(ParsedRole {
                keywords: vec!["rust".to_string(), "tokio".to_string()],
                requirements: vec!["5+ years".to_string()],
                must_haves: vec!["on-call".to_string()],
            })
        );
    }

    #[test]
    fn test_snake_case_must_haves_accepted() {
        let raw = json!({ "must_haves": ["sql"] });
        match RoleParse::from_json(Some(&raw)) {
            RoleParse::Parsed(role) => assert_eq!(role.must_haves, vec!["sql".to_string()]),
            RoleParse::Unparsed => panic!("expected parsed role"),
        }
    }

    #[test]
    fn test_null_string_and_empty_object_are_unparsed() {
        assert_eq!(RoleParse::from_json(None), RoleParse::Unparsed);
        assert_eq!(
            RoleParse::from_json(Some(&json!("pending"))),
            RoleParse::Unparsed
        );
        assert_eq!(RoleParse::from_json(Some(&json!({}))), RoleParse::Unparsed);
        assert_eq!(
            RoleParse::from_json(Some(&json!({ "keywords": "rust" }))),
            RoleParse::Unparsed
        );
    }

    #[test]
    fn test_tagged_serialization() {
        let value = serde_json::to_value(RoleParse::Unparsed).unwrap();
        assert_eq!(value, json!({ "state": "unparsed" }));
    }
}
