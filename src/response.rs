//! Response body parsing

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ZendeskError, ZendeskResult};
use crate::target::Target;

/// Parse a response body, requiring a JSON object at the root
pub fn parse_json_object(json_text: &str) -> ZendeskResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(json_text)? {
        Value::Object(map) => Ok(map),
        _ => Err(ZendeskError::Data(format!("Expected object node: {}", json_text))),
    }
}

/// One page of results pulled out of a response document
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResponsePage {
    pub records: Vec<Value>,
    pub next_page: Option<String>,
    pub end_time: Option<i64>,
    pub count: Option<u64>,
}

impl ResponsePage {
    pub fn from_document(target: Target, document: &Map<String, Value>) -> Self {
        let records = document
            .get(target.records_key())
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Self {
            records,
            next_page: document.get("next_page").and_then(Value::as_str).map(str::to_string),
            end_time: document.get("end_time").and_then(Value::as_i64),
            count: document.get("count").and_then(Value::as_u64),
        }
    }
}
