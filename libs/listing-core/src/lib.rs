//! Transport- and ORM-agnostic building blocks of the listing pipeline.
//!
//! Everything here is plain data: what the client asked for (filters, sorts,
//! pagination), the page envelope returned to it, the scratch context shared
//! by pipeline stages and the error taxonomy. Query compilation lives in
//! `listing-db`, HTTP plumbing in `listing-api`.

pub mod context;
pub mod error;
pub mod page;
pub mod params;

pub use context::ExtraContext;
pub use error::{Error, ErrorKind, FieldSet, Result, SessionRole};
pub use page::Page;
pub use params::{
    AdapterFactory, FilterSpec, FilterValue, JsonParamsAdapter, PageRequest, PaginationRequest,
    ParamsAdapter, RequestParams, SortSpec, SortType,
};

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
