use listing_core::{Error, ExtraContext, RequestParams, Result};
use sea_orm::{EntityTrait, Select};
use tracing::debug;

use crate::dao::Dao;

/// Produces the unfiltered, unsorted base query of an endpoint.
///
/// Returning `Ok(None)` means "nothing to read"; the orchestrator treats that
/// as a broken endpoint rather than falling back to a full scan.
pub trait QueryStrategy<E: EntityTrait>: Send + Sync {
    fn get_query(
        &self,
        request: &RequestParams,
        dao: &dyn Dao<E>,
        extra: &ExtraContext,
    ) -> Result<Option<Select<E>>>;
}

/// Selects the columns named in the `field_list` context entry (all columns
/// when the list is empty). With `custom_fields` set, names that are not
/// model columns are skipped so DTOs may carry computed fields.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultQueryStrategy;

impl<E: EntityTrait> QueryStrategy<E> for DefaultQueryStrategy {
    fn get_query(
        &self,
        _request: &RequestParams,
        dao: &dyn Dao<E>,
        extra: &ExtraContext,
    ) -> Result<Option<Select<E>>> {
        let model = dao.model();
        let fields = extra.field_list();
        if fields.is_empty() {
            return Ok(Some(dao.get_default_read(model.all())));
        }

        let custom_fields = extra.custom_fields();
        let mut columns = Vec::with_capacity(fields.len());
        for field in &fields {
            match model.get(field) {
                Some(col) => columns.push(col),
                None if custom_fields => {
                    debug!(field = %field, model = model.model_name(), "skipping custom output field");
                }
                None => return Err(Error::unknown_field(field, model.model_name())),
            }
        }

        if columns.is_empty() {
            return Ok(None);
        }
        Ok(Some(dao.get_default_read(columns)))
    }
}
