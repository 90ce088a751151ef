use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// Which database session a caller asked for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionRole {
    /// Read replica, the default for listings.
    Read,
    /// Primary (writable) session.
    Primary,
}

impl fmt::Display for SessionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionRole::Read => f.write_str("read"),
            SessionRole::Primary => f.write_str("primary"),
        }
    }
}

/// Sorted set of field aliases, rendered as `{'a', 'b'}` in rejection messages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldSet(pub BTreeSet<String>);

impl FieldSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.0.contains(alias)
    }
}

impl<S: Into<String>> FromIterator<S> for FieldSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, alias) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "'{alias}'")?;
        }
        f.write_str("}")
    }
}

/// Coarse classification used by transports to pick a status and a log level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad request semantics; the only kind meant to reach the caller verbatim.
    Client,
    /// Endpoint wiring is broken; raised at registration time.
    Config,
    /// A pipeline stage broke its contract; a defect, never retried.
    Contract,
    /// The data source failed.
    Database,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    #[error("{param} param is not a valid json!")]
    InvalidParamJson { param: &'static str, reason: String },

    #[error("Filter(s) not registered with listing: {0}, Did you forget to do it?")]
    FiltersNotRegistered(FieldSet),

    #[error("Sorter(s) not registered with listing: {0}, Did you forget to do it?")]
    SortersNotRegistered(FieldSet),

    #[error("invalid value for filter on '{field}': {reason}")]
    InvalidFilterValue { field: String, reason: String },

    #[error("invalid listing configuration: {0}")]
    Config(String),

    #[error("{kind} '{name}' is not registered/loaded! Did you forget to do it?")]
    NotRegistered { kind: &'static str, name: String },

    #[error("{kind} key '{key}' already in use")]
    DuplicateKey { kind: &'static str, key: String },

    #[error("field alias '{alias}' already registered with {owner}")]
    DuplicateAlias { alias: String, owner: String },

    #[error("sort type must be 'asc' or 'dsc', got {0:?}")]
    InvalidSortType(String),

    #[error("Provided field '{field}' is not an attribute of {model}")]
    UnknownModelField { field: String, model: String },

    #[error("query strategy returned nothing, a query object is expected")]
    EmptyQuery,

    #[error("pagination strategy switch target '{0}' is not registered")]
    InvalidStrategySwitch(String),

    #[error("no {0} database session bound to the current request scope")]
    MissingSession(SessionRole),

    #[error("database error: {0}")]
    Database(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid_json(param: &'static str, reason: impl fmt::Display) -> Self {
        Self::InvalidParamJson {
            param,
            reason: reason.to_string(),
        }
    }

    pub fn invalid_filter_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilterValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn not_registered(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotRegistered {
            kind,
            name: name.into(),
        }
    }

    pub fn unknown_field(field: impl Into<String>, model: impl Into<String>) -> Self {
        Self::UnknownModelField {
            field: field.into(),
            model: model.into(),
        }
    }

    pub fn database(err: impl fmt::Display) -> Self {
        Self::Database(err.to_string())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidParamJson { .. }
            | Error::FiltersNotRegistered(_)
            | Error::SortersNotRegistered(_)
            | Error::InvalidFilterValue { .. } => ErrorKind::Client,
            Error::Config(_)
            | Error::NotRegistered { .. }
            | Error::DuplicateKey { .. }
            | Error::DuplicateAlias { .. } => ErrorKind::Config,
            Error::InvalidSortType(_)
            | Error::UnknownModelField { .. }
            | Error::EmptyQuery
            | Error::InvalidStrategySwitch(_)
            | Error::MissingSession(_) => ErrorKind::Contract,
            Error::Database(_) => ErrorKind::Database,
        }
    }

    /// HTTP-style status for this error.
    pub fn status(&self) -> u16 {
        match self {
            Error::InvalidParamJson { .. } | Error::InvalidFilterValue { .. } => 422,
            Error::FiltersNotRegistered(_) | Error::SortersNotRegistered(_) => 409,
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.kind() == ErrorKind::Client
    }
}
