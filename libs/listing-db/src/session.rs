//! Request-scoped database sessions.
//!
//! Sessions are passed explicitly (the HTTP layer attaches them to the
//! request) instead of living in ambient storage. Listings read from the
//! replica unless told otherwise.

use std::sync::Once;

use listing_core::{Error, Result, SessionRole};
use sea_orm::DatabaseConnection;
use tracing::warn;

static DEGRADED_TOPOLOGY: Once = Once::new();

#[derive(Clone, Debug)]
pub struct DbSessions {
    read: Option<DatabaseConnection>,
    primary: Option<DatabaseConnection>,
}

impl DbSessions {
    /// At least one session is required. A primary without a replica serves
    /// both roles and logs a warning once per process.
    pub fn new(read: Option<DatabaseConnection>, primary: Option<DatabaseConnection>) -> Result<Self> {
        match (read, primary) {
            (None, None) => Err(Error::config(
                "at least one of the read or primary sessions is required",
            )),
            (None, Some(primary)) => Ok(Self::primary_only(primary)),
            (read, primary) => Ok(Self { read, primary }),
        }
    }

    pub fn primary_only(primary: DatabaseConnection) -> Self {
        DEGRADED_TOPOLOGY.call_once(|| {
            warn!("no read replica session supplied; reads will use the primary session");
        });
        Self {
            read: Some(primary.clone()),
            primary: Some(primary),
        }
    }

    pub fn replica_only(read: DatabaseConnection) -> Self {
        Self {
            read: Some(read),
            primary: None,
        }
    }

    pub fn with_replica(read: DatabaseConnection, primary: DatabaseConnection) -> Self {
        Self {
            read: Some(read),
            primary: Some(primary),
        }
    }

    pub fn read(&self) -> Result<&DatabaseConnection> {
        self.read
            .as_ref()
            .ok_or(Error::MissingSession(SessionRole::Read))
    }

    pub fn primary(&self) -> Result<&DatabaseConnection> {
        self.primary
            .as_ref()
            .ok_or(Error::MissingSession(SessionRole::Primary))
    }

    pub fn has_replica(&self) -> bool {
        self.read.is_some()
    }
}
