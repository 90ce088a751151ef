//! axum integration for the listing pipeline: query-string extraction,
//! Problem Details error mapping and request-scoped DB sessions.

pub mod error;
pub mod params;
pub mod problem;
pub mod session;

pub use error::listing_error_to_problem;
pub use params::{extract_listing_params, ListingParams, MAX_PARAM_LEN};
pub use problem::{bad_request, internal_error, Problem, ProblemResponse, APPLICATION_PROBLEM_JSON};
pub use session::{bind_sessions, with_sessions, Sessions};
