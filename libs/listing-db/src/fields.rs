//! Per-model field-descriptor table.
//!
//! Built once from the entity's column enumeration; lookups by column name
//! replace dynamic attribute access on the model.

use std::collections::HashMap;
use std::fmt;

use listing_core::{Error, Result};
use sea_orm::sea_query::{ColumnRef, IntoColumnRef};
use sea_orm::{EntityTrait, IdenStatic, Iterable};

/// Custom column resolution; receives the trailing segment of the field path.
pub type FieldExtractor = fn(&str) -> ColumnRef;

/// Separator for multi-hop field paths such as `"employee.dept.name"`.
pub const PATH_SEPARATOR: char = '.';

pub struct ModelFields<E: EntityTrait> {
    model: String,
    columns: HashMap<String, E::Column>,
}

impl<E: EntityTrait> Clone for ModelFields<E> {
    fn clone(&self) -> Self {
        Self {
            model: self.model.clone(),
            columns: self.columns.clone(),
        }
    }
}

impl<E: EntityTrait> fmt::Debug for ModelFields<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.columns.keys().collect();
        names.sort();
        f.debug_struct("ModelFields")
            .field("model", &self.model)
            .field("columns", &names)
            .finish()
    }
}

impl<E: EntityTrait> Default for ModelFields<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> ModelFields<E> {
    pub fn new() -> Self {
        let columns = E::Column::iter()
            .map(|c| (c.as_str().to_owned(), c))
            .collect();
        Self {
            model: E::default().table_name().to_owned(),
            columns,
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn get(&self, name: &str) -> Option<E::Column> {
        self.columns.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// All columns in declaration order.
    pub fn all(&self) -> Vec<E::Column> {
        E::Column::iter().collect()
    }

    pub fn column_ref(&self, name: &str) -> Option<ColumnRef> {
        self.get(name).map(|col| (E::default(), col).into_column_ref())
    }

    /// Resolves a (possibly multi-hop) field path to a column.
    ///
    /// Only the last path segment is used. A custom extractor is authoritative;
    /// otherwise the segment must name a column of this model.
    pub fn resolve(&self, path: &str, extractor: Option<FieldExtractor>) -> Result<ColumnRef> {
        let name = last_segment(path);
        match extractor {
            Some(extract) => Ok(extract(name)),
            None => self
                .column_ref(name)
                .ok_or_else(|| Error::unknown_field(name, &self.model)),
        }
    }
}

pub fn last_segment(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}
