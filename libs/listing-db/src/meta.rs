//! Per-endpoint listing configuration.
//!
//! A [`ListingConfig`] is declared once per endpoint, validated against the
//! strategy registries by [`ListingConfig::register`], and resolved into a
//! [`MetaInfo`] at the start of every request.

use std::fmt;
use std::sync::Arc;

use listing_core::{
    AdapterFactory, Error, ExtraContext, JsonParamsAdapter, ParamsAdapter, RequestParams, Result,
    SortType,
};
use sea_orm::EntityTrait;
use tracing::debug;

use crate::config::ListingDefaults;
use crate::fields::ModelFields;
use crate::mapper::{FieldMapper, ResolvedSort};
use crate::mechanics::{FilterMechanics, SortMechanics};
use crate::paginator::PaginationStrategy;
use crate::query::QueryStrategy;
use crate::registry::{
    Strategies, COUNTLESS_PAGINATOR, DEFAULT_PAGINATOR, DEFAULT_QUERY, DEFAULT_SORTER,
    ITERATIVE_FILTER_MECHANICS, LATEST_SORT_MECHANICS,
};
use crate::sorter::SortStrategy;

pub struct ListingConfig<E: EntityTrait> {
    pub filter_mapper: FieldMapper<E>,
    pub sort_mapper: FieldMapper<E>,
    /// Internal field sorted on when the client sends no sort.
    pub default_srt_on: String,
    pub default_srt_ord: SortType,
    pub paginating_strategy: String,
    /// Used instead of `paginating_strategy` when counting is disallowed.
    pub countless_paginating_strategy: String,
    pub query_strategy: String,
    pub sorting_strategy: String,
    pub sort_mecha: String,
    pub filter_mecha: String,
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub params_adapter: AdapterFactory,
    pub allow_count_query_by_paginator: bool,
    /// Seed for every request's extra context.
    pub extra_context: ExtraContext,
}

impl<E: EntityTrait> fmt::Debug for ListingConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListingConfig")
            .field("filter_mapper", &self.filter_mapper)
            .field("sort_mapper", &self.sort_mapper)
            .field("default_srt_on", &self.default_srt_on)
            .field("default_srt_ord", &self.default_srt_ord)
            .field("paginating_strategy", &self.paginating_strategy)
            .field(
                "countless_paginating_strategy",
                &self.countless_paginating_strategy,
            )
            .field("query_strategy", &self.query_strategy)
            .field("sorting_strategy", &self.sorting_strategy)
            .field("sort_mecha", &self.sort_mecha)
            .field("filter_mecha", &self.filter_mecha)
            .field("default_page_size", &self.default_page_size)
            .field("max_page_size", &self.max_page_size)
            .field(
                "allow_count_query_by_paginator",
                &self.allow_count_query_by_paginator,
            )
            .field("extra_context", &self.extra_context)
            .finish_non_exhaustive()
    }
}

impl<E: EntityTrait> ListingConfig<E> {
    pub fn new(default_srt_on: impl Into<String>) -> Self {
        Self::from_defaults(&ListingDefaults::default(), default_srt_on)
    }

    pub fn from_defaults(defaults: &ListingDefaults, default_srt_on: impl Into<String>) -> Self {
        Self {
            filter_mapper: FieldMapper::new(),
            sort_mapper: FieldMapper::new(),
            default_srt_on: default_srt_on.into(),
            default_srt_ord: defaults.default_srt_ord,
            paginating_strategy: DEFAULT_PAGINATOR.to_owned(),
            countless_paginating_strategy: COUNTLESS_PAGINATOR.to_owned(),
            query_strategy: DEFAULT_QUERY.to_owned(),
            sorting_strategy: DEFAULT_SORTER.to_owned(),
            sort_mecha: LATEST_SORT_MECHANICS.to_owned(),
            filter_mecha: ITERATIVE_FILTER_MECHANICS.to_owned(),
            default_page_size: defaults.default_page_size,
            max_page_size: defaults.max_page_size,
            params_adapter: JsonParamsAdapter::boxed,
            allow_count_query_by_paginator: defaults.allow_count_query_by_paginator,
            extra_context: ExtraContext::new(),
        }
    }

    pub fn with_filter_mapper(mut self, mapper: FieldMapper<E>) -> Self {
        self.filter_mapper = mapper;
        self
    }

    pub fn with_sort_mapper(mut self, mapper: FieldMapper<E>) -> Self {
        self.sort_mapper = mapper;
        self
    }

    pub fn with_default_sort_order(mut self, order: SortType) -> Self {
        self.default_srt_ord = order;
        self
    }

    pub fn with_paginating_strategy(mut self, name: impl Into<String>) -> Self {
        self.paginating_strategy = name.into();
        self
    }

    pub fn with_countless_paginating_strategy(mut self, name: impl Into<String>) -> Self {
        self.countless_paginating_strategy = name.into();
        self
    }

    pub fn with_query_strategy(mut self, name: impl Into<String>) -> Self {
        self.query_strategy = name.into();
        self
    }

    pub fn with_sorting_strategy(mut self, name: impl Into<String>) -> Self {
        self.sorting_strategy = name.into();
        self
    }

    pub fn with_sort_mecha(mut self, name: impl Into<String>) -> Self {
        self.sort_mecha = name.into();
        self
    }

    pub fn with_filter_mecha(mut self, name: impl Into<String>) -> Self {
        self.filter_mecha = name.into();
        self
    }

    pub fn with_default_page_size(mut self, size: u64) -> Self {
        self.default_page_size = size;
        self
    }

    pub fn with_max_page_size(mut self, size: u64) -> Self {
        self.max_page_size = size;
        self
    }

    pub fn with_params_adapter(mut self, adapter: AdapterFactory) -> Self {
        self.params_adapter = adapter;
        self
    }

    pub fn with_count_query(mut self, allow: bool) -> Self {
        self.allow_count_query_by_paginator = allow;
        self
    }

    pub fn with_extra(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.extra_context.insert(key, value);
        self
    }

    /// Registration-time checks; any failure means the endpoint must not serve.
    pub fn validate(&self, strategies: &Strategies<E>) -> Result<()> {
        if self.default_srt_on.trim().is_empty() {
            return Err(Error::config("default_srt_on must be a non-empty field name"));
        }
        strategies.queries().get(&self.query_strategy)?;
        strategies.sorters().get(&self.sorting_strategy)?;
        strategies.paginators().get(&self.paginating_strategy)?;
        if !self.allow_count_query_by_paginator {
            strategies
                .paginators()
                .get(&self.countless_paginating_strategy)?;
        }
        strategies.sort_mechanics().get(&self.sort_mecha)?;
        strategies.filter_mechanics().get(&self.filter_mecha)?;

        if self.default_page_size == 0 {
            return Err(Error::config("default_page_size must be positive"));
        }
        if self.default_page_size > self.max_page_size {
            return Err(Error::config(format!(
                "default_page_size ({}) exceeds max_page_size ({})",
                self.default_page_size, self.max_page_size
            )));
        }

        let model = ModelFields::<E>::new();
        let unresolved = |e: Error| Error::config(e.to_string());
        for (alias, spec) in self.filter_mapper.entries() {
            if spec.filter.is_none() {
                return Err(Error::config(format!(
                    "filter alias '{alias}' is not bound to a filter unit"
                )));
            }
            model
                .resolve(&spec.internal_field, spec.extractor)
                .map_err(unresolved)?;
        }
        for (_, spec) in self.sort_mapper.entries() {
            model
                .resolve(&spec.internal_field, spec.extractor)
                .map_err(unresolved)?;
        }
        model
            .resolve(
                &self.default_srt_on,
                self.sort_mapper.extractor_for_internal(&self.default_srt_on),
            )
            .map_err(unresolved)?;
        Ok(())
    }

    /// Validates and binds the configuration to the strategy registries.
    pub fn register(self, strategies: Arc<Strategies<E>>) -> Result<RegisteredListing<E>> {
        self.validate(&strategies)?;
        debug!(
            filters = self.filter_mapper.len(),
            sorts = self.sort_mapper.len(),
            default_srt_on = %self.default_srt_on,
            "listing endpoint registered"
        );
        Ok(RegisteredListing {
            config: self,
            strategies,
        })
    }
}

/// A validated configuration; immutable and shared across requests.
pub struct RegisteredListing<E: EntityTrait> {
    config: ListingConfig<E>,
    strategies: Arc<Strategies<E>>,
}

impl<E: EntityTrait> fmt::Debug for RegisteredListing<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredListing")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E: EntityTrait> RegisteredListing<E> {
    pub fn config(&self) -> &ListingConfig<E> {
        &self.config
    }

    /// Builds the per-request strategy bundle.
    pub fn resolve(&self, request: &RequestParams, model: Arc<ModelFields<E>>) -> Result<MetaInfo<'_, E>> {
        let c = &self.config;
        let s = &self.strategies;

        let pagination_strategy = if c.allow_count_query_by_paginator {
            s.create_paginator(&c.paginating_strategy)?
        } else {
            debug!(
                from = %c.paginating_strategy,
                to = %c.countless_paginating_strategy,
                "count query disallowed, switching to count-less paginator"
            );
            s.create_paginator(&c.countless_paginating_strategy)
                .map_err(|_| Error::InvalidStrategySwitch(c.countless_paginating_strategy.clone()))?
        };

        let default_sort = ResolvedSort {
            field: c.default_srt_on.clone(),
            sort_type: c.default_srt_ord.as_str().to_owned(),
            extractor: c.sort_mapper.extractor_for_internal(&c.default_srt_on),
        };

        Ok(MetaInfo {
            query_strategy: s.create_query(&c.query_strategy)?,
            sort_strategy: s.create_sorter(&c.sorting_strategy, model)?,
            pagination_strategy,
            filter_mechanics: s.create_filter_mechanics(&c.filter_mecha)?,
            sort_mechanics: s.create_sort_mechanics(&c.sort_mecha)?,
            filter_mapper: &c.filter_mapper,
            sort_mapper: &c.sort_mapper,
            default_sort,
            default_page_size: c.default_page_size,
            max_page_size: c.max_page_size,
            adapter: (c.params_adapter)(request),
            extra: c.extra_context.clone(),
        })
    }
}

/// Resolved strategies and mappings driving one listing call.
pub struct MetaInfo<'a, E: EntityTrait> {
    pub query_strategy: Arc<dyn QueryStrategy<E>>,
    pub sort_strategy: Arc<dyn SortStrategy<E>>,
    pub pagination_strategy: Arc<dyn PaginationStrategy<E>>,
    pub filter_mechanics: Arc<dyn FilterMechanics<E>>,
    pub sort_mechanics: Arc<dyn SortMechanics<E>>,
    pub filter_mapper: &'a FieldMapper<E>,
    pub sort_mapper: &'a FieldMapper<E>,
    /// Already internal; bypasses alias rewriting.
    pub default_sort: ResolvedSort,
    pub default_page_size: u64,
    pub max_page_size: u64,
    pub adapter: Box<dyn ParamsAdapter>,
    /// Request-scoped scratch space, seeded from the configuration.
    pub extra: ExtraContext,
}
