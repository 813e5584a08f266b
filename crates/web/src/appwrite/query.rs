//! Appwrite list queries.
//!
//! Appwrite 1.5+ takes queries as JSON objects, one per `queries[]` query
//! parameter: `{"method":"equal","attribute":"accountId","values":["..."]}`.

use serde_json::{Map, Value};

/// A single list query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    method: &'static str,
    attribute: Option<String>,
    values: Vec<Value>,
}

impl Query {
    fn new(method: &'static str, attribute: Option<&str>, values: Vec<Value>) -> Self {
        Self {
            method,
            attribute: attribute.map(str::to_owned),
            values,
        }
    }

    /// Attribute equals `value`.
    #[must_use]
    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Self::new("equal", Some(attribute), vec![value.into()])
    }

    /// Order results by `attribute`, newest first.
    #[must_use]
    pub fn order_desc(attribute: &str) -> Self {
        Self::new("orderDesc", Some(attribute), Vec::new())
    }

    /// Page size.
    #[must_use]
    pub fn limit(limit: u32) -> Self {
        Self::new("limit", None, vec![Value::from(limit)])
    }

    /// Start the page after the document `id`.
    #[must_use]
    pub fn cursor_after(id: &str) -> Self {
        Self::new("cursorAfter", None, vec![Value::from(id)])
    }

    /// JSON form of the query.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("method".to_string(), Value::from(self.method));
        if let Some(attribute) = &self.attribute {
            map.insert("attribute".to_string(), Value::from(attribute.as_str()));
        }
        if !self.values.is_empty() {
            map.insert("values".to_string(), Value::Array(self.values.clone()));
        }
        Value::Object(map)
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_value())
    }
}
