//! Pagination strategies.
//!
//! Both strategies run the same stages: validate the requested coordinates
//! (falling back to page 1 / size 10), slice the query, work out `hasNext`
//! and emit the envelope. The counted strategy issues a `COUNT(*)` and reports
//! `totalCount`; the count-less one over-fetches a single row instead and
//! leaves `totalCount` out.

use async_trait::async_trait;
use listing_core::{Error, ExtraContext, Page, PageRequest, PaginationRequest, Result};
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait, QuerySelect, Select};
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

#[async_trait]
pub trait PaginationStrategy<E: EntityTrait>: Send + Sync {
    async fn paginate(
        &self,
        query: Select<E>,
        request: &PaginationRequest,
        conn: &DatabaseConnection,
        extra: &ExtraContext,
    ) -> Result<Page<JsonValue>>;
}

fn slice<E: EntityTrait>(query: Select<E>, page: PageRequest, fetch: u64) -> Select<E> {
    query.limit(fetch.min(i64::MAX as u64)).offset(page.offset())
}

/// Counted mode: `hasNext` iff rows remain after this page.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountedPaginator;

impl CountedPaginator {
    pub fn has_next(total: u64, page: PageRequest) -> bool {
        total > page.page.saturating_mul(page.page_size)
    }
}

#[async_trait]
impl<E: EntityTrait> PaginationStrategy<E> for CountedPaginator {
    #[instrument(
        name = "listing.paginate.counted",
        skip_all,
        fields(page = tracing::field::Empty, page_size = tracing::field::Empty)
    )]
    async fn paginate(
        &self,
        query: Select<E>,
        request: &PaginationRequest,
        conn: &DatabaseConnection,
        _extra: &ExtraContext,
    ) -> Result<Page<JsonValue>> {
        let page = request.validate();
        let span = tracing::Span::current();
        span.record("page", page.page);
        span.record("page_size", page.page_size);

        let total = query
            .clone()
            .into_json()
            .count(conn)
            .await
            .map_err(Error::database)?;

        let rows = slice(query, page, page.page_size)
            .into_json()
            .all(conn)
            .await
            .map_err(Error::database)?;

        let has_next = Self::has_next(total, page);
        debug!(total, rows = rows.len(), has_next, "counted page fetched");
        Ok(Page::counted(
            rows,
            page.page,
            page.page_size,
            has_next,
            total,
        ))
    }
}

/// Count-less mode: fetch one extra row to learn whether another page exists.
#[derive(Clone, Copy, Debug, Default)]
pub struct CountlessPaginator;

#[async_trait]
impl<E: EntityTrait> PaginationStrategy<E> for CountlessPaginator {
    #[instrument(
        name = "listing.paginate.countless",
        skip_all,
        fields(page = tracing::field::Empty, page_size = tracing::field::Empty)
    )]
    async fn paginate(
        &self,
        query: Select<E>,
        request: &PaginationRequest,
        conn: &DatabaseConnection,
        _extra: &ExtraContext,
    ) -> Result<Page<JsonValue>> {
        let page = request.validate();
        let span = tracing::Span::current();
        span.record("page", page.page);
        span.record("page_size", page.page_size);

        let mut rows = slice(query, page, page.page_size.saturating_add(1))
            .into_json()
            .all(conn)
            .await
            .map_err(Error::database)?;

        let has_next = (rows.len() as u64) > page.page_size;
        if has_next {
            rows.truncate(page.page_size as usize);
        }
        debug!(rows = rows.len(), has_next, "count-less page fetched");
        Ok(Page::countless(rows, page.page, page.page_size, has_next))
    }
}
