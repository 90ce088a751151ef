use std::sync::Arc;

use axum::{extract::State, http::Uri, response::Json};
use listing_api::{listing_error_to_problem, ListingParams, ProblemResponse, Sessions};
use listing_core::{Error, Page, RequestParams};
use listing_db::{DaoMode, Listing, RegisteredListing};
use tracing::{info, instrument};

use crate::api::rest::dto::EmployeeDto;
use crate::domain::listing::EmployeeListings;
use crate::infra::storage::{dao::EmployeeDao, entity::Entity};

/// List employees with `filter`, `sort` and `pagination` query params.
#[instrument(name = "employees.list", skip_all)]
pub async fn list_employees(
    State(listings): State<Arc<EmployeeListings>>,
    sessions: Sessions,
    uri: Uri,
    ListingParams(params): ListingParams,
) -> Result<Json<Page<EmployeeDto>>, ProblemResponse> {
    list(&listings.counted, &sessions, &params, uri.path()).await.map(Json)
}

/// Same listing without the count query; pages carry no `totalCount`.
#[instrument(name = "employees.list_without_count", skip_all)]
pub async fn list_employees_without_count(
    State(listings): State<Arc<EmployeeListings>>,
    sessions: Sessions,
    uri: Uri,
    ListingParams(params): ListingParams,
) -> Result<Json<Page<EmployeeDto>>, ProblemResponse> {
    list(&listings.countless, &sessions, &params, uri.path()).await.map(Json)
}

async fn list(
    listing: &RegisteredListing<Entity>,
    sessions: &Sessions,
    params: &RequestParams,
    instance: &str,
) -> Result<Page<EmployeeDto>, ProblemResponse> {
    let problem = |e: Error| listing_error_to_problem(&e, instance);

    let dao = EmployeeDao::from_sessions(sessions, DaoMode::Replica).map_err(problem)?;
    let page = Listing::new(params, &dao)
        .fields(EmployeeDto::FIELDS)
        .custom_fields(true)
        .get_response(listing)
        .await
        .map_err(problem)?;

    info!(rows = page.len(), page = page.current_page_number, "employees listed");
    page.try_map_items(EmployeeDto::from_row)
        .map_err(|e| problem(Error::database(format!("employee row: {e}"))))
}
