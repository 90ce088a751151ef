use std::fmt;
use std::sync::Arc;

use listing_core::{Error, Result, SessionRole};
use sea_orm::{DatabaseConnection, EntityTrait, QuerySelect, Select};

use crate::fields::ModelFields;
use crate::session::DbSessions;

/// Read-side data-access contract used by the listing pipeline.
pub trait Dao<E: EntityTrait>: Send + Sync {
    /// Field table of the bound model.
    fn model(&self) -> &Arc<ModelFields<E>>;

    /// Session listings read from.
    fn read_db(&self) -> &DatabaseConnection;

    /// Base query over the given output columns.
    fn get_default_read(&self, columns: Vec<E::Column>) -> Select<E> {
        E::find().select_only().columns(columns)
    }
}

/// Which sessions a DAO is built with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DaoMode {
    #[default]
    Replica,
    Primary,
    Both,
}

pub struct GenericDao<E: EntityTrait> {
    model: Arc<ModelFields<E>>,
    read_db: DatabaseConnection,
    write_db: Option<DatabaseConnection>,
}

impl<E: EntityTrait> Clone for GenericDao<E> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            read_db: self.read_db.clone(),
            write_db: self.write_db.clone(),
        }
    }
}

impl<E: EntityTrait> fmt::Debug for GenericDao<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericDao")
            .field("model", &self.model.model_name())
            .field("read_db", &self.read_db)
            .field("write_db", &self.write_db.is_some())
            .finish()
    }
}

impl<E: EntityTrait> GenericDao<E> {
    pub fn new(read_db: DatabaseConnection) -> Self {
        Self {
            model: Arc::new(ModelFields::new()),
            read_db,
            write_db: None,
        }
    }

    /// Builds a DAO from request-scoped sessions. `Primary` reads through the
    /// primary session too.
    pub fn from_sessions(sessions: &DbSessions, mode: DaoMode) -> Result<Self> {
        let (read_db, write_db) = match mode {
            DaoMode::Replica => (sessions.read()?.clone(), None),
            DaoMode::Primary => {
                let primary = sessions.primary()?.clone();
                (primary.clone(), Some(primary))
            }
            DaoMode::Both => (
                sessions.read()?.clone(),
                Some(sessions.primary()?.clone()),
            ),
        };
        Ok(Self {
            model: Arc::new(ModelFields::new()),
            read_db,
            write_db,
        })
    }

    pub fn write_db(&self) -> Result<&DatabaseConnection> {
        self.write_db
            .as_ref()
            .ok_or(Error::MissingSession(SessionRole::Primary))
    }
}

impl<E: EntityTrait> Dao<E> for GenericDao<E> {
    fn model(&self) -> &Arc<ModelFields<E>> {
        &self.model
    }

    fn read_db(&self) -> &DatabaseConnection {
        &self.read_db
    }
}
