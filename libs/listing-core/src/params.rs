//! Canonical listing parameters and the adapter that produces them from raw
//! client-site request parameters.
//!
//! Clients send three string-encoded JSON values:
//! - `filter`: `[{"field": alias, "value": {...}}]`
//! - `sort`: `[{"field": alias, "type": "asc"|"dsc"}]`
//! - `pagination`: `{"page": int, "pageSize": int}` (1-based page)

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

pub const FILTER_PARAM: &str = "filter";
pub const SORT_PARAM: &str = "sort";
pub const PAGINATION_PARAM: &str = "pagination";

/// Raw request-scoped parameters as handed over by the transport.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RequestParams(HashMap<String, String>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn into_inner(self) -> HashMap<String, String> {
        self.0
    }
}

impl From<HashMap<String, String>> for RequestParams {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Filter payload. Which keys a filter reads depends on its kind:
/// `search` for comparisons and string matching, `start`/`end` for ranges,
/// `list` for membership.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterValue {
    /// An explicit `"search": null` is kept as `Some(Value::Null)`.
    #[serde(
        default,
        deserialize_with = "explicit_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub search: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list: Option<Vec<Value>>,
}

impl FilterValue {
    pub fn search(v: impl Into<Value>) -> Self {
        Self {
            search: Some(v.into()),
            ..Self::default()
        }
    }

    pub fn range(start: impl Into<Value>, end: impl Into<Value>) -> Self {
        Self {
            start: Some(start.into()),
            end: Some(end.into()),
            ..Self::default()
        }
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            list: Some(items.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_none() && self.start.is_none() && self.end.is_none() && self.list.is_none()
    }
}

/// Only runs when the key is present, so a JSON `null` stays distinguishable
/// from an absent key.
fn explicit_null<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub field: String,
    #[serde(default)]
    pub value: Option<FilterValue>,
}

impl FilterSpec {
    pub fn new(field: impl Into<String>, value: FilterValue) -> Self {
        Self {
            field: field.into(),
            value: Some(value),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    Asc,
    #[default]
    Dsc,
}

impl SortType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "asc" => Some(SortType::Asc),
            "dsc" => Some(SortType::Dsc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortType::Asc => "asc",
            SortType::Dsc => "dsc",
        }
    }
}

impl fmt::Display for SortType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sort request. `sort_type` is kept raw; the sort strategy rejects anything
/// other than `asc`/`dsc`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    #[serde(rename = "type", default)]
    pub sort_type: String,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, sort_type: SortType) -> Self {
        Self {
            field: field.into(),
            sort_type: sort_type.as_str().to_owned(),
        }
    }
}

/// Validated 1-based page coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub page_size: u64,
}

impl PageRequest {
    /// Used whenever the client's pagination does not validate.
    pub const FALLBACK: PageRequest = PageRequest {
        page: 1,
        page_size: 10,
    };

    /// Saturates at `i64::MAX`, the largest offset SQL backends bind.
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(i64::MAX as u64)
    }
}

/// Pagination exactly as the client sent it; validated lazily by the paginator.
#[derive(Clone, Debug, PartialEq)]
pub struct PaginationRequest {
    pub page: Value,
    pub page_size: Value,
}

impl PaginationRequest {
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: Value::from(page),
            page_size: Value::from(page_size),
        }
    }

    /// Valid JSON that is not an object yields an invalid request (fallback later).
    pub fn from_json(value: &Value) -> Self {
        let field = |key: &str| {
            value
                .as_object()
                .and_then(|obj| obj.get(key))
                .cloned()
                .unwrap_or(Value::Null)
        };
        Self {
            page: field("page"),
            page_size: field("pageSize"),
        }
    }

    pub fn requested_page_size(&self) -> Option<u64> {
        positive_int(&self.page_size)
    }

    /// Lowers a valid page size above `max`. Returns the requested size when clamped.
    pub fn clamp_page_size(&mut self, max: u64) -> Option<u64> {
        match self.requested_page_size() {
            Some(requested) if requested > max => {
                self.page_size = Value::from(max);
                Some(requested)
            }
            _ => None,
        }
    }

    /// Both values must be positive integers (integral floats accepted);
    /// anything else resets to [`PageRequest::FALLBACK`].
    pub fn validate(&self) -> PageRequest {
        match (positive_int(&self.page), positive_int(&self.page_size)) {
            (Some(page), Some(page_size)) => PageRequest { page, page_size },
            _ => PageRequest::FALLBACK,
        }
    }
}

/// Pages and sizes are bound as signed 64-bit integers.
const MAX_PAGE_VALUE: u64 = i64::MAX as u64;

fn positive_int(v: &Value) -> Option<u64> {
    let Value::Number(n) = v else {
        return None;
    };
    if let Some(u) = n.as_u64() {
        return (u > 0 && u <= MAX_PAGE_VALUE).then_some(u);
    }
    let f = n.as_f64()?;
    (f.is_finite() && f.fract() == 0.0 && f >= 1.0 && f < MAX_PAGE_VALUE as f64)
        .then(|| f as u64)
}

/// Translates raw request parameters into the pipeline's canonical shape.
pub trait ParamsAdapter: Send + Sync {
    fn filters(&self) -> Result<Vec<FilterSpec>>;
    fn sorts(&self) -> Result<Vec<SortSpec>>;
    /// `None` when the client sent no pagination at all.
    fn pagination(&self) -> Result<Option<PaginationRequest>>;
}

/// Constructor stored in endpoint configuration, invoked once per request.
pub type AdapterFactory = fn(&RequestParams) -> Box<dyn ParamsAdapter>;

/// Default adapter: each parameter is a (possibly percent-encoded) JSON string.
#[derive(Clone, Debug)]
pub struct JsonParamsAdapter {
    params: RequestParams,
}

impl JsonParamsAdapter {
    pub fn new(params: RequestParams) -> Self {
        Self { params }
    }

    pub fn boxed(params: &RequestParams) -> Box<dyn ParamsAdapter> {
        Box::new(Self::new(params.clone()))
    }

    fn decode(&self, param: &'static str) -> Result<Option<Value>> {
        let Some(raw) = self.params.get(param) else {
            return Ok(None);
        };
        let decoded = urlencoding::decode(raw)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| raw.to_owned());
        let decoded = decoded.trim();
        if decoded.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(decoded)
            .map(Some)
            .map_err(|e| Error::invalid_json(param, e))
    }

    fn decode_list<T: serde::de::DeserializeOwned>(&self, param: &'static str) -> Result<Vec<T>> {
        match self.decode(param)? {
            Some(v) => serde_json::from_value(v).map_err(|e| Error::invalid_json(param, e)),
            None => Ok(Vec::new()),
        }
    }
}

impl ParamsAdapter for JsonParamsAdapter {
    fn filters(&self) -> Result<Vec<FilterSpec>> {
        self.decode_list(FILTER_PARAM)
    }

    fn sorts(&self) -> Result<Vec<SortSpec>> {
        self.decode_list(SORT_PARAM)
    }

    fn pagination(&self) -> Result<Option<PaginationRequest>> {
        Ok(self
            .decode(PAGINATION_PARAM)?
            .map(|v| PaginationRequest::from_json(&v)))
    }
}
