//! Interceptor layer between the orchestrator and the per-field filter units /
//! sort strategy. Mechanics receive the whole list of rewritten specs and
//! decide how (and whether) each one is applied.

use std::collections::{BTreeMap, BTreeSet};

use listing_core::{ExtraContext, RequestParams, Result};
use sea_orm::{EntityTrait, Select};
use tracing::debug;

use crate::dao::Dao;
use crate::fields::last_segment;
use crate::filters::FilterTarget;
use crate::mapper::{ResolvedFilter, ResolvedSort};
use crate::sorter::SortStrategy;

pub trait FilterMechanics<E: EntityTrait>: Send + Sync {
    fn apply(
        &self,
        query: Select<E>,
        filters: &[ResolvedFilter<E>],
        dao: &dyn Dao<E>,
        request: &RequestParams,
        extra: &ExtraContext,
    ) -> Result<Select<E>>;
}

pub trait SortMechanics<E: EntityTrait>: Send + Sync {
    fn apply(
        &self,
        query: Select<E>,
        sorter: &dyn SortStrategy<E>,
        sorts: &[ResolvedSort],
        extra: &ExtraContext,
    ) -> Result<Select<E>>;
}

fn apply_one<E: EntityTrait>(
    query: Select<E>,
    filter: &ResolvedFilter<E>,
    dao: &dyn Dao<E>,
) -> Result<Select<E>> {
    let target = FilterTarget {
        field: &filter.field,
        column: filter.column(dao.model())?,
    };
    filter.unit.filter(&target, filter.value.as_ref(), query)
}

/// Applies every filter in list order; predicates are ANDed.
#[derive(Clone, Copy, Debug, Default)]
pub struct IterativeFilterMechanics;

impl<E: EntityTrait> FilterMechanics<E> for IterativeFilterMechanics {
    fn apply(
        &self,
        query: Select<E>,
        filters: &[ResolvedFilter<E>],
        dao: &dyn Dao<E>,
        _request: &RequestParams,
        _extra: &ExtraContext,
    ) -> Result<Select<E>> {
        filters
            .iter()
            .try_fold(query, |query, filter| apply_one(query, filter, dao))
    }
}

/// Iterative application with suppression: when a finer field carries a
/// value, filters on the coarser fields it shadows are skipped.
///
/// Fields are matched on the last segment of the internal path.
///
/// ```ignore
/// let mechanics = PrecedenceFilterMechanics::new()
///     .suppress("pincode", ["city", "region"])
///     .suppress("city", ["region"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct PrecedenceFilterMechanics {
    rules: BTreeMap<String, BTreeSet<String>>,
}

impl PrecedenceFilterMechanics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suppress<I, S>(mut self, finer: impl Into<String>, coarser: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .entry(finer.into())
            .or_default()
            .extend(coarser.into_iter().map(Into::into));
        self
    }

    fn suppressed<E: EntityTrait>(&self, filters: &[ResolvedFilter<E>]) -> BTreeSet<String> {
        filters
            .iter()
            .filter(|f| f.value.as_ref().is_some_and(|v| !v.is_empty()))
            .filter_map(|f| self.rules.get(last_segment(&f.field)))
            .flatten()
            .cloned()
            .collect()
    }
}

impl<E: EntityTrait> FilterMechanics<E> for PrecedenceFilterMechanics {
    fn apply(
        &self,
        mut query: Select<E>,
        filters: &[ResolvedFilter<E>],
        dao: &dyn Dao<E>,
        _request: &RequestParams,
        _extra: &ExtraContext,
    ) -> Result<Select<E>> {
        let suppressed = self.suppressed(filters);
        for filter in filters {
            let field = last_segment(&filter.field);
            if suppressed.contains(field) {
                debug!(field, "filter suppressed by a finer filter");
                continue;
            }
            query = apply_one(query, filter, dao)?;
        }
        Ok(query)
    }
}

/// Honors only the most recently specified sort.
#[derive(Clone, Copy, Debug, Default)]
pub struct LatestSortMechanics;

impl<E: EntityTrait> SortMechanics<E> for LatestSortMechanics {
    fn apply(
        &self,
        query: Select<E>,
        sorter: &dyn SortStrategy<E>,
        sorts: &[ResolvedSort],
        extra: &ExtraContext,
    ) -> Result<Select<E>> {
        let Some(latest) = sorts.last() else {
            return Ok(query);
        };
        if sorts.len() > 1 {
            debug!(
                requested = sorts.len(),
                field = %latest.field,
                "multiple sort specs supplied, only the latest is applied"
            );
        }
        sorter.sort(query, latest, extra)
    }
}

/// Applies every sort spec in the order given (first one is the primary key).
#[derive(Clone, Copy, Debug, Default)]
pub struct AllSortMechanics;

impl<E: EntityTrait> SortMechanics<E> for AllSortMechanics {
    fn apply(
        &self,
        query: Select<E>,
        sorter: &dyn SortStrategy<E>,
        sorts: &[ResolvedSort],
        extra: &ExtraContext,
    ) -> Result<Select<E>> {
        sorts
            .iter()
            .try_fold(query, |query, spec| sorter.sort(query, spec, extra))
    }
}
