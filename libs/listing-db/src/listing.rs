use listing_core::{Error, Page, PaginationRequest, RequestParams, Result};
use sea_orm::EntityTrait;
use serde_json::Value as JsonValue;
use tracing::{instrument, warn};

use crate::dao::Dao;
use crate::meta::{MetaInfo, RegisteredListing};

/// One listing call: request parameters, the DAO to read through and the
/// output fields the response needs.
///
/// Stages run in a fixed order: base query, filters, sort, pagination. All
/// client parameters are parsed and checked against the mappers before any
/// of them touches the query, so an unregistered alias rejects the request
/// as a whole.
pub struct Listing<'a, E: EntityTrait> {
    request: &'a RequestParams,
    dao: &'a dyn Dao<E>,
    fields_to_fetch: Vec<String>,
    custom_fields: bool,
}

impl<'a, E: EntityTrait> Listing<'a, E> {
    pub fn new(request: &'a RequestParams, dao: &'a dyn Dao<E>) -> Self {
        Self {
            request,
            dao,
            fields_to_fetch: Vec::new(),
            custom_fields: false,
        }
    }

    /// Output fields to read; empty means every column.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields_to_fetch = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Tolerate output fields that are not model columns.
    pub fn custom_fields(mut self, allow: bool) -> Self {
        self.custom_fields = allow;
        self
    }

    #[instrument(
        name = "listing.get_response",
        skip_all,
        fields(model = %self.dao.model().model_name())
    )]
    pub async fn get_response(&self, listing: &RegisteredListing<E>) -> Result<Page<JsonValue>> {
        let meta = listing.resolve(self.request, self.dao.model().clone())?;
        self.run(meta).await
    }

    /// Runs the pipeline against already resolved strategies.
    pub async fn run(&self, mut meta: MetaInfo<'_, E>) -> Result<Page<JsonValue>> {
        meta.extra
            .set_output_fields(&self.fields_to_fetch, self.custom_fields);

        let query = meta
            .query_strategy
            .get_query(self.request, self.dao, &meta.extra)?
            .ok_or(Error::EmptyQuery)?;

        let filters = meta.adapter.filters()?;
        let unknown = meta
            .filter_mapper
            .unregistered(filters.iter().map(|f| f.field.as_str()));
        if !unknown.is_empty() {
            return Err(Error::FiltersNotRegistered(unknown));
        }

        let sorts = meta.adapter.sorts()?;
        let unknown = meta
            .sort_mapper
            .unregistered(sorts.iter().map(|s| s.field.as_str()));
        if !unknown.is_empty() {
            return Err(Error::SortersNotRegistered(unknown));
        }

        let pagination = meta.adapter.pagination()?;

        let filters = meta.filter_mapper.rewrite_filters(filters)?;
        let query = meta.filter_mechanics.apply(
            query,
            &filters,
            self.dao,
            self.request,
            &meta.extra,
        )?;

        let sorts = if sorts.is_empty() {
            vec![meta.default_sort.clone()]
        } else {
            meta.sort_mapper.rewrite_sorts(sorts)?
        };
        let query = meta.sort_mechanics.apply(
            query,
            meta.sort_strategy.as_ref(),
            &sorts,
            &meta.extra,
        )?;

        let mut pagination =
            pagination.unwrap_or_else(|| PaginationRequest::new(1, meta.default_page_size));
        if let Some(requested) = pagination.clamp_page_size(meta.max_page_size) {
            warn!(
                requested,
                max = meta.max_page_size,
                "requested page size exceeds the maximum, clamping"
            );
        }

        meta.pagination_strategy
            .paginate(query, &pagination, self.dao.read_db(), &meta.extra)
            .await
    }
}
