//! Employee directory endpoints built on the listing pipeline.
//!
//! `GET /employees` returns counted pages; `GET /employees/without-count`
//! serves the same listing without the count query.

// === PUBLIC SURFACE ===
pub use api::rest::dto::EmployeeDto;
pub use api::rest::routes::{register_routes, EmployeesApiDoc};
pub use domain::listing::EmployeeListings;
pub use infra::storage::dao::{create_schema, EmployeeDao};

// === INTERNAL MODULES ===
#[doc(hidden)]
pub mod api {
    pub mod rest {
        pub mod dto;
        pub mod handlers;
        pub mod routes;
    }
}
#[doc(hidden)]
pub mod domain {
    pub mod listing;
}
#[doc(hidden)]
pub mod infra {
    pub mod storage {
        pub mod dao;
        pub mod entity;
    }
}
