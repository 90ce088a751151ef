use serde::Serialize;
use serde_json::{Map, Value};

/// Output fields requested by the endpoint, a JSON array of strings.
pub const FIELD_LIST: &str = "field_list";
/// Whether output fields that are not model columns are tolerated.
pub const CUSTOM_FIELDS: &str = "custom_fields";

/// Open key/value scratch space shared by every pipeline stage of one request.
///
/// Stages may read any key and add their own, but must not assume a key is
/// present unless it is one of the documented ones above.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ExtraContext(Map<String, Value>);

impl ExtraContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Missing or non-boolean keys read as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.0.get(key).and_then(Value::as_bool).unwrap_or(false)
    }

    /// String entries of an array value; non-string entries are ignored.
    pub fn str_list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn extend(&mut self, other: ExtraContext) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Records the output fields and the custom-field policy for this request.
    pub fn set_output_fields(&mut self, fields: &[String], custom_fields: bool) {
        self.insert(
            FIELD_LIST,
            Value::Array(fields.iter().cloned().map(Value::String).collect()),
        );
        self.insert(CUSTOM_FIELDS, custom_fields);
    }

    pub fn field_list(&self) -> Vec<String> {
        self.str_list(FIELD_LIST)
    }

    pub fn custom_fields(&self) -> bool {
        self.flag(CUSTOM_FIELDS)
    }
}

impl From<Map<String, Value>> for ExtraContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
