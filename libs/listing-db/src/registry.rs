//! Named strategy lookup.
//!
//! Registries are filled at startup and only read afterwards, so they are
//! shared behind an `Arc` without locking.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use listing_core::{Error, Result};
use sea_orm::EntityTrait;

use crate::fields::ModelFields;
use crate::mechanics::{
    AllSortMechanics, FilterMechanics, IterativeFilterMechanics, LatestSortMechanics,
    SortMechanics,
};
use crate::paginator::{CountedPaginator, CountlessPaginator, PaginationStrategy};
use crate::query::{DefaultQueryStrategy, QueryStrategy};
use crate::sorter::{DefaultSorter, SortStrategy};

pub const DEFAULT_QUERY: &str = "default_query";
pub const DEFAULT_SORTER: &str = "default_sorter";
pub const DEFAULT_PAGINATOR: &str = "default_paginator";
pub const COUNTLESS_PAGINATOR: &str = "countless_paginator";
pub const ITERATIVE_FILTER_MECHANICS: &str = "iterative_filter_mechanics";
pub const LATEST_SORT_MECHANICS: &str = "latest_sort_mechanics";
pub const ALL_SORT_MECHANICS: &str = "all_sort_mechanics";

/// String-keyed map that refuses empty and duplicate keys.
pub struct Registry<T> {
    kind: &'static str,
    entries: HashMap<String, T>,
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.keys().collect();
        keys.sort_unstable();
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("keys", &keys)
            .finish()
    }
}

impl<T> Registry<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            entries: HashMap::new(),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn register(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::config(format!(
                "{} key must be a non-empty string",
                self.kind
            )));
        }
        if self.entries.contains_key(&key) {
            return Err(Error::DuplicateKey {
                kind: self.kind,
                key,
            });
        }
        self.entries.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<&T> {
        self.entries
            .get(key)
            .ok_or_else(|| Error::not_registered(self.kind, key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type QueryFactory<E> = Arc<dyn Fn() -> Arc<dyn QueryStrategy<E>> + Send + Sync>;
/// Sort strategies are bound to the model they validate against.
pub type SorterFactory<E> =
    Arc<dyn Fn(Arc<ModelFields<E>>) -> Arc<dyn SortStrategy<E>> + Send + Sync>;
pub type PaginatorFactory<E> = Arc<dyn Fn() -> Arc<dyn PaginationStrategy<E>> + Send + Sync>;
pub type FilterMechanicsFactory<E> = Arc<dyn Fn() -> Arc<dyn FilterMechanics<E>> + Send + Sync>;
pub type SortMechanicsFactory<E> = Arc<dyn Fn() -> Arc<dyn SortMechanics<E>> + Send + Sync>;

/// Every named strategy a listing configuration can refer to, for one entity.
pub struct Strategies<E: EntityTrait> {
    queries: Registry<QueryFactory<E>>,
    sorters: Registry<SorterFactory<E>>,
    paginators: Registry<PaginatorFactory<E>>,
    filter_mechanics: Registry<FilterMechanicsFactory<E>>,
    sort_mechanics: Registry<SortMechanicsFactory<E>>,
}

impl<E: EntityTrait> fmt::Debug for Strategies<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategies")
            .field("queries", &self.queries)
            .field("sorters", &self.sorters)
            .field("paginators", &self.paginators)
            .field("filter_mechanics", &self.filter_mechanics)
            .field("sort_mechanics", &self.sort_mechanics)
            .finish()
    }
}

impl<E: EntityTrait> Default for Strategies<E> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl<E: EntityTrait> Strategies<E> {
    /// Empty registries.
    pub fn new() -> Self {
        Self {
            queries: Registry::new("Query strategy"),
            sorters: Registry::new("Sort strategy"),
            paginators: Registry::new("Pagination strategy"),
            filter_mechanics: Registry::new("Filter mechanics"),
            sort_mechanics: Registry::new("Sort mechanics"),
        }
    }

    /// Registries holding the built-in strategies.
    pub fn with_defaults() -> Self {
        let mut s = Self::new();
        let query: QueryFactory<E> =
            Arc::new(|| -> Arc<dyn QueryStrategy<E>> { Arc::new(DefaultQueryStrategy) });
        let sorter: SorterFactory<E> =
            Arc::new(|model: Arc<ModelFields<E>>| -> Arc<dyn SortStrategy<E>> {
                Arc::new(DefaultSorter::new(model))
            });
        let counted: PaginatorFactory<E> =
            Arc::new(|| -> Arc<dyn PaginationStrategy<E>> { Arc::new(CountedPaginator) });
        let countless: PaginatorFactory<E> =
            Arc::new(|| -> Arc<dyn PaginationStrategy<E>> { Arc::new(CountlessPaginator) });
        let iterative: FilterMechanicsFactory<E> =
            Arc::new(|| -> Arc<dyn FilterMechanics<E>> { Arc::new(IterativeFilterMechanics) });
        let latest: SortMechanicsFactory<E> =
            Arc::new(|| -> Arc<dyn SortMechanics<E>> { Arc::new(LatestSortMechanics) });
        let all: SortMechanicsFactory<E> =
            Arc::new(|| -> Arc<dyn SortMechanics<E>> { Arc::new(AllSortMechanics) });

        s.queries.entries.insert(DEFAULT_QUERY.into(), query);
        s.sorters.entries.insert(DEFAULT_SORTER.into(), sorter);
        s.paginators.entries.insert(DEFAULT_PAGINATOR.into(), counted);
        s.paginators.entries.insert(COUNTLESS_PAGINATOR.into(), countless);
        s.filter_mechanics
            .entries
            .insert(ITERATIVE_FILTER_MECHANICS.into(), iterative);
        s.sort_mechanics.entries.insert(LATEST_SORT_MECHANICS.into(), latest);
        s.sort_mechanics.entries.insert(ALL_SORT_MECHANICS.into(), all);
        s
    }

    pub fn register_query<F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn() -> Arc<dyn QueryStrategy<E>> + Send + Sync + 'static,
    {
        self.queries.register(name, Arc::new(factory))
    }

    pub fn register_sorter<F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn(Arc<ModelFields<E>>) -> Arc<dyn SortStrategy<E>> + Send + Sync + 'static,
    {
        self.sorters.register(name, Arc::new(factory))
    }

    pub fn register_paginator<F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn() -> Arc<dyn PaginationStrategy<E>> + Send + Sync + 'static,
    {
        self.paginators.register(name, Arc::new(factory))
    }

    pub fn register_filter_mechanics<F>(
        &mut self,
        name: impl Into<String>,
        factory: F,
    ) -> Result<()>
    where
        F: Fn() -> Arc<dyn FilterMechanics<E>> + Send + Sync + 'static,
    {
        self.filter_mechanics.register(name, Arc::new(factory))
    }

    pub fn register_sort_mechanics<F>(&mut self, name: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn() -> Arc<dyn SortMechanics<E>> + Send + Sync + 'static,
    {
        self.sort_mechanics.register(name, Arc::new(factory))
    }

    pub fn queries(&self) -> &Registry<QueryFactory<E>> {
        &self.queries
    }

    pub fn sorters(&self) -> &Registry<SorterFactory<E>> {
        &self.sorters
    }

    pub fn paginators(&self) -> &Registry<PaginatorFactory<E>> {
        &self.paginators
    }

    pub fn filter_mechanics(&self) -> &Registry<FilterMechanicsFactory<E>> {
        &self.filter_mechanics
    }

    pub fn sort_mechanics(&self) -> &Registry<SortMechanicsFactory<E>> {
        &self.sort_mechanics
    }

    pub fn create_query(&self, name: &str) -> Result<Arc<dyn QueryStrategy<E>>> {
        Ok((self.queries.get(name)?)())
    }

    pub fn create_sorter(
        &self,
        name: &str,
        model: Arc<ModelFields<E>>,
    ) -> Result<Arc<dyn SortStrategy<E>>> {
        Ok((self.sorters.get(name)?)(model))
    }

    pub fn create_paginator(&self, name: &str) -> Result<Arc<dyn PaginationStrategy<E>>> {
        Ok((self.paginators.get(name)?)())
    }

    pub fn create_filter_mechanics(&self, name: &str) -> Result<Arc<dyn FilterMechanics<E>>> {
        Ok((self.filter_mechanics.get(name)?)())
    }

    pub fn create_sort_mechanics(&self, name: &str) -> Result<Arc<dyn SortMechanics<E>>> {
        Ok((self.sort_mechanics.get(name)?)())
    }
}
