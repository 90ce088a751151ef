//! Listing pipeline on top of sea-orm.
//!
//! An endpoint declares a [`ListingConfig`]: which client aliases may be
//! filtered and sorted on ([`FieldMapper`]), which named strategies build,
//! sort and paginate its query, and its page-size bounds. The config is
//! validated once against a [`Strategies`] registry and then driven per
//! request by [`Listing`]:
//!
//! ```ignore
//! let strategies = Arc::new(Strategies::with_defaults());
//! let employees = ListingConfig::<employee::Entity>::new("emp_no")
//!     .with_filter_mapper(FieldMapper::new().filter("gdr", "gender", Equality)?)
//!     .with_sort_mapper(FieldMapper::new().sort("id", "emp_no")?)
//!     .register(strategies)?;
//!
//! let page = Listing::new(&params, &dao)
//!     .fields(["emp_no", "first_name"])
//!     .get_response(&employees)
//!     .await?;
//! ```

pub mod config;
pub mod dao;
pub mod fields;
pub mod filters;
pub mod listing;
pub mod mapper;
pub mod mechanics;
pub mod meta;
pub mod paginator;
pub mod query;
pub mod registry;
pub mod session;
pub mod sorter;

#[cfg(test)]
mod test_support;

pub use config::ListingDefaults;
pub use dao::{Dao, DaoMode, GenericDao};
pub use fields::{FieldExtractor, ModelFields};
pub use filters::{
    Between, BetweenUnixMillis, Contains, DistinctBy, EndsWith, Equality, FilterTarget, FilterUnit,
    GreaterOrEqual, GreaterThan, GroupBy, HasFieldValue, InList, Inequality, LessOrEqual, LessThan,
    Like, StartsWith,
};
pub use listing::Listing;
pub use mapper::{FieldMapper, FieldSpec, ResolvedFilter, ResolvedSort};
pub use mechanics::{
    AllSortMechanics, FilterMechanics, IterativeFilterMechanics, LatestSortMechanics,
    PrecedenceFilterMechanics, SortMechanics,
};
pub use meta::{ListingConfig, MetaInfo, RegisteredListing};
pub use paginator::{CountedPaginator, CountlessPaginator, PaginationStrategy};
pub use query::{DefaultQueryStrategy, QueryStrategy};
pub use registry::Strategies;
pub use session::DbSessions;
pub use sorter::{DefaultSorter, SortStrategy};

// Re-export so dependents name the same sea-orm the pipeline is built on.
pub use sea_orm;
