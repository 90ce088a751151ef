//! Filter units: one filter policy each, compiled onto a `sea_orm::Select<E>`.
//!
//! A unit receives the already-resolved column and the client payload. Absent
//! or empty payloads leave the query untouched, except for [`HasFieldValue`]
//! which needs a payload to decide between `IS NULL` and `IS NOT NULL`.
//! Structural units ([`GroupBy`], [`DistinctBy`]) ignore the payload.

use chrono::{DateTime, Utc};
use listing_core::{Error, FilterValue, Result};
use sea_orm::sea_query::{ColumnRef, Expr, LikeExpr, SimpleExpr};
use sea_orm::{Condition, EntityTrait, QueryFilter, QueryTrait, Select};
use serde_json::Value;

/// Resolved column a unit operates on; `field` is the internal path, kept for messages.
#[derive(Clone, Debug)]
pub struct FilterTarget<'a> {
    pub field: &'a str,
    pub column: ColumnRef,
}

impl FilterTarget<'_> {
    fn col(&self) -> Expr {
        Expr::col(self.column.clone())
    }
}

pub trait FilterUnit<E: EntityTrait>: Send + Sync {
    /// Stable name used in diagnostics.
    fn name(&self) -> &'static str;

    fn filter(
        &self,
        target: &FilterTarget<'_>,
        value: Option<&FilterValue>,
        query: Select<E>,
    ) -> Result<Select<E>>;
}

/* ---------- payload helpers ---------- */

fn present(value: Option<&FilterValue>) -> Option<&FilterValue> {
    value.filter(|v| !v.is_empty())
}

fn require_search<'v>(t: &FilterTarget<'_>, v: &'v FilterValue) -> Result<&'v Value> {
    v.search
        .as_ref()
        .ok_or_else(|| Error::invalid_filter_value(t.field, "expected a 'search' value"))
}

fn require_text<'v>(t: &FilterTarget<'_>, v: &'v FilterValue) -> Result<&'v str> {
    require_search(t, v)?
        .as_str()
        .ok_or_else(|| Error::invalid_filter_value(t.field, "'search' must be a string"))
}

fn require_range<'v>(t: &FilterTarget<'_>, v: &'v FilterValue) -> Result<(&'v Value, &'v Value)> {
    match (v.start.as_ref(), v.end.as_ref()) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(Error::invalid_filter_value(
            t.field,
            "expected both 'start' and 'end'",
        )),
    }
}

/// JSON scalar → bound SQL value. Nulls, arrays and objects are rejected.
fn coerce(t: &FilterTarget<'_>, v: &Value) -> Result<sea_orm::Value> {
    Ok(match v {
        Value::Bool(b) => sea_orm::Value::from(*b),
        Value::String(s) => sea_orm::Value::from(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                sea_orm::Value::from(i)
            } else if n.is_u64() {
                return Err(Error::invalid_filter_value(
                    t.field,
                    "integer out of range",
                ));
            } else if let Some(f) = n.as_f64() {
                sea_orm::Value::from(f)
            } else {
                return Err(Error::invalid_filter_value(t.field, "unsupported number"));
            }
        }
        Value::Null => {
            return Err(Error::invalid_filter_value(
                t.field,
                "null is not comparable",
            ))
        }
        Value::Array(_) | Value::Object(_) => {
            return Err(Error::invalid_filter_value(
                t.field,
                "expected a scalar value",
            ))
        }
    })
}

fn coerce_millis(t: &FilterTarget<'_>, v: &Value) -> Result<sea_orm::Value> {
    let ms = v
        .as_i64()
        .or_else(|| v.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
        .ok_or_else(|| {
            Error::invalid_filter_value(t.field, "expected a millisecond unix timestamp")
        })?;
    let ts = DateTime::<Utc>::from_timestamp_millis(ms)
        .ok_or_else(|| Error::invalid_filter_value(t.field, "timestamp out of range"))?;
    Ok(sea_orm::Value::from(ts.date_naive()))
}

/// Truthiness of a JSON value: null, false, zero and empty containers are falsy.
fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn apply<E: EntityTrait>(query: Select<E>, expr: SimpleExpr) -> Result<Select<E>> {
    Ok(query.filter(Condition::all().add(expr)))
}

/* ---------- LIKE helpers ---------- */

fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

fn escaped(pattern: String) -> LikeExpr {
    LikeExpr::new(pattern).escape('\\')
}

/* ---------- equality & membership ---------- */

/// `{search: v}` → `field = v`; a null search means `IS NULL`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Equality;

impl<E: EntityTrait> FilterUnit<E> for Equality {
    fn name(&self) -> &'static str {
        "equality"
    }

    fn filter(
        &self,
        t: &FilterTarget<'_>,
        value: Option<&FilterValue>,
        query: Select<E>,
    ) -> Result<Select<E>> {
        let Some(v) = present(value) else {
            return Ok(query);
        };
        let expr = match require_search(t, v)? {
            Value::Null => t.col().is_null(),
            search => t.col().eq(coerce(t, search)?),
        };
        apply(query, expr)
    }
}

/// `{search: v}` → `field <> v`; a null search means `IS NOT NULL`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Inequality;

impl<E: EntityTrait> FilterUnit<E> for Inequality {
    fn name(&self) -> &'static str {
        "inequality"
    }

    fn filter(
        &self,
        t: &FilterTarget<'_>,
        value: Option<&FilterValue>,
        query: Select<E>,
    ) -> Result<Select<E>> {
        let Some(v) = present(value) else {
            return Ok(query);
        };
        let expr = match require_search(t, v)? {
            Value::Null => t.col().is_not_null(),
            search => t.col().ne(coerce(t, search)?),
        };
        apply(query, expr)
    }
}

/// `{list: [v...]}` → `field IN (...)`; an empty list matches nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct InList;

impl<E: EntityTrait> FilterUnit<E> for InList {
    fn name(&self) -> &'static str {
        "in_list"
    }

    fn filter(
        &self,
        t: &FilterTarget<'_>,
        value: Option<&FilterValue>,
        query: Select<E>,
    ) -> Result<Select<E>> {
        let Some(v) = present(value) else {
            return Ok(query);
        };
        let list = v
            .list
            .as_ref()
            .ok_or_else(|| Error::invalid_filter_value(t.field, "expected a 'list' value"))?;
        if list.is_empty() {
            return apply(query, Expr::cust("1=0"));
        }
        let values = list
            .iter()
            .map(|item| coerce(t, item))
            .collect::<Result<Vec<_>>>()?;
        apply(query, t.col().is_in(values))
    }
}

/* ---------- ranges ---------- */

/// `{start, end}` → `start <= field <= end`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Between;

impl<E: EntityTrait> FilterUnit<E> for Between {
    fn name(&self) -> &'static str {
        "between"
    }

    fn filter(
        &self,
        t: &FilterTarget<'_>,
        value: Option<&FilterValue>,
        query: Select<E>,
    ) -> Result<Select<E>> {
        let Some(v) = present(value) else {
            return Ok(query);
        };
        let (start, end) = require_range(t, v)?;
        apply(query, t.col().between(coerce(t, start)?, coerce(t, end)?))
    }
}

/// `{start, end}` as millisecond unix timestamps, converted to UTC calendar
/// dates so both bounds are inclusive for date columns.
#[derive(Clone, Copy, Debug, Default)]
pub struct BetweenUnixMillis;

impl<E: EntityTrait> FilterUnit<E> for BetweenUnixMillis {
    fn name(&self) -> &'static str {
        "between_unix_millis"
    }

    fn filter(
        &self,
        t: &FilterTarget<'_>,
        value: Option<&FilterValue>,
        query: Select<E>,
    ) -> Result<Select<E>> {
        let Some(v) = present(value) else {
            return Ok(query);
        };
        let (start, end) = require_range(t, v)?;
        apply(
            query,
            t.col()
                .between(coerce_millis(t, start)?, coerce_millis(t, end)?),
        )
    }
}

/* ---------- string matching ---------- */

#[derive(Clone, Copy, Debug, Default)]
pub struct StartsWith;

impl<E: EntityTrait> FilterUnit<E> for StartsWith {
    fn name(&self) -> &'static str {
        "starts_with"
    }

    fn filter(
        &self,
        t: &FilterTarget<'_>,
        value: Option<&FilterValue>,
        query: Select<E>,
    ) -> Result<Select<E>> {
        let Some(v) = present(value) else {
            return Ok(query);
        };
        let s = require_text(t, v)?;
        apply(query, t.col().like(escaped(format!("{}%", like_escape(s)))))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct EndsWith;

impl<E: EntityTrait> FilterUnit<E> for EndsWith {
    fn name(&self) -> &'static str {
        "ends_with"
    }

    fn filter(
        &self,
        t: &FilterTarget<'_>,
        value: Option<&FilterValue>,
        query: Select<E>,
    ) -> Result<Select<E>> {
        let Some(v) = present(value) else {
            return Ok(query);
        };
        let s = require_text(t, v)?;
        apply(query, t.col().like(escaped(format!("%{}", like_escape(s)))))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Contains;

impl<E: EntityTrait> FilterUnit<E> for Contains {
    fn name(&self) -> &'static str {
        "contains"
    }

    fn filter(
        &self,
        t: &FilterTarget<'_>,
        value: Option<&FilterValue>,
        query: Select<E>,
    ) -> Result<Select<E>> {
        let Some(v) = present(value) else {
            return Ok(query);
        };
        let s = require_text(t, v)?;
        apply(query, t.col().like(escaped(format!("%{}%", like_escape(s)))))
    }
}

/// Raw LIKE pattern; wildcards in `search` are honored as-is.
#[derive(Clone, Copy, Debug, Default)]
pub struct Like;

impl<E: EntityTrait> FilterUnit<E> for Like {
    fn name(&self) -> &'static str {
        "like"
    }

    fn filter(
        &self,
        t: &FilterTarget<'_>,
        value: Option<&FilterValue>,
        query: Select<E>,
    ) -> Result<Select<E>> {
        let Some(v) = present(value) else {
            return Ok(query);
        };
        let s = require_text(t, v)?;
        apply(query, t.col().like(s))
    }
}

/* ---------- ordering comparisons ---------- */

macro_rules! comparison_unit {
    ($(#[$doc:meta])* $unit:ident, $name:literal, $op:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $unit;

        impl<E: EntityTrait> FilterUnit<E> for $unit {
            fn name(&self) -> &'static str {
                $name
            }

            fn filter(
                &self,
                t: &FilterTarget<'_>,
                value: Option<&FilterValue>,
                query: Select<E>,
            ) -> Result<Select<E>> {
                let Some(v) = present(value) else {
                    return Ok(query);
                };
                let search = coerce(t, require_search(t, v)?)?;
                apply(query, t.col().$op(search))
            }
        }
    };
}

comparison_unit!(
    /// `{search: v}` → `field > v`.
    GreaterThan, "greater_than", gt
);
comparison_unit!(
    /// `{search: v}` → `field >= v`.
    GreaterOrEqual, "greater_or_equal", gte
);
comparison_unit!(
    /// `{search: v}` → `field < v`.
    LessThan, "less_than", lt
);
comparison_unit!(
    /// `{search: v}` → `field <= v`.
    LessOrEqual, "less_or_equal", lte
);

/* ---------- structural ---------- */

#[derive(Clone, Copy, Debug, Default)]
pub struct GroupBy;

impl<E: EntityTrait> FilterUnit<E> for GroupBy {
    fn name(&self) -> &'static str {
        "group_by"
    }

    fn filter(
        &self,
        t: &FilterTarget<'_>,
        _value: Option<&FilterValue>,
        mut query: Select<E>,
    ) -> Result<Select<E>> {
        QueryTrait::query(&mut query).group_by_col(t.column.clone());
        Ok(query)
    }
}

/// `DISTINCT ON (field)`; only meaningful on backends that support it (Postgres).
#[derive(Clone, Copy, Debug, Default)]
pub struct DistinctBy;

impl<E: EntityTrait> FilterUnit<E> for DistinctBy {
    fn name(&self) -> &'static str {
        "distinct_by"
    }

    fn filter(
        &self,
        t: &FilterTarget<'_>,
        _value: Option<&FilterValue>,
        mut query: Select<E>,
    ) -> Result<Select<E>> {
        QueryTrait::query(&mut query).distinct_on([t.column.clone()]);
        Ok(query)
    }
}

/* ---------- null checks ---------- */

/// `{search: truthy}` → `IS NOT NULL`, otherwise `IS NULL`. Requires a payload.
#[derive(Clone, Copy, Debug, Default)]
pub struct HasFieldValue;

impl<E: EntityTrait> FilterUnit<E> for HasFieldValue {
    fn name(&self) -> &'static str {
        "has_field_value"
    }

    fn filter(
        &self,
        t: &FilterTarget<'_>,
        value: Option<&FilterValue>,
        query: Select<E>,
    ) -> Result<Select<E>> {
        let v = value.ok_or_else(|| {
            Error::invalid_filter_value(t.field, "a value with 'search' is required")
        })?;
        let expr = if v.search.as_ref().is_some_and(truthy) {
            t.col().is_not_null()
        } else {
            t.col().is_null()
        };
        apply(query, expr)
    }
}

#[cfg(test)]
#[path = "filters_tests.rs"]
mod filters_tests;
