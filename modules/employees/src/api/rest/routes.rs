use std::sync::Arc;

use axum::{routing::get, Router};
use listing_api::{with_sessions, Problem};
use listing_db::DbSessions;
use utoipa::OpenApi;

use crate::api::rest::{dto::EmployeeDto, handlers};
use crate::domain::listing::EmployeeListings;

pub const EMPLOYEES_PATH: &str = "/employees";
pub const EMPLOYEES_WITHOUT_COUNT_PATH: &str = "/employees/without-count";

/// Mounts the employee listing endpoints onto `router`, with the DB session
/// binder installed on them.
pub fn register_routes(
    router: Router,
    listings: Arc<EmployeeListings>,
    sessions: Arc<DbSessions>,
) -> Router {
    let employees = Router::new()
        .route(EMPLOYEES_PATH, get(handlers::list_employees))
        .route(
            EMPLOYEES_WITHOUT_COUNT_PATH,
            get(handlers::list_employees_without_count),
        )
        .with_state(listings);

    router.merge(with_sessions(employees, sessions))
}

/// Schemas exposed by the employee endpoints.
#[derive(OpenApi)]
#[openapi(components(schemas(EmployeeDto, Problem)))]
pub struct EmployeesApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_doc_lists_dto_and_problem_schemas() {
        let doc = EmployeesApiDoc::openapi();
        let schemas = doc.components.map(|c| c.schemas).unwrap_or_default();
        assert!(schemas.contains_key("EmployeeDto"));
        assert!(schemas.contains_key("Problem"));
    }
}
