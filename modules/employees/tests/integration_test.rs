use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use employees::{
    api::rest::handlers, create_schema, infra::storage::entity, register_routes,
    EmployeeListings,
};
use listing_core::Page;
use listing_db::{DbSessions, ListingDefaults};
use sea_orm::{ActiveValue::Set, ConnectOptions, Database, DatabaseConnection, EntityTrait};
use serde_json::Value;
use tower::ServiceExt;

const SEED: [(i32, &str, &str, &str, &str, Option<&str>); 12] = [
    (10001, "Georgi", "Facello", "M", "1986-06-26", Some("1953-09-02")),
    (10002, "Bezalel", "Simmel", "F", "1985-11-21", Some("1964-06-02")),
    (10003, "Parto", "Bamford", "M", "1986-08-28", None),
    (10004, "Chirstian", "Koblick", "M", "1986-12-01", Some("1954-05-01")),
    (10005, "Kyoichi", "Maliniak", "M", "1989-09-12", None),
    (10006, "Anneke", "Preusig", "F", "1989-06-02", Some("1953-04-20")),
    (10007, "Tzvetan", "Zielinski", "F", "1989-02-10", None),
    (10008, "Saniya", "Kalloufi", "M", "1994-09-15", Some("1958-02-19")),
    (10009, "Sumant", "Peac", "F", "1985-02-18", None),
    (10010, "Duangkaew", "Piveteau", "F", "1989-08-24", Some("1963-06-01")),
    (10011, "Mary", "Sluis", "F", "1990-01-22", None),
    (10012, "Patricio", "Bridgland", "M", "1992-12-18", Some("1960-10-04")),
];

/// Fresh in-memory database; one pooled connection keeps it alive.
async fn create_test_db() -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await?;
    create_schema(&db).await?;

    let rows = SEED.iter().map(|(no, first, last, gender, hired, born)| entity::ActiveModel {
        emp_no: Set(*no),
        first_name: Set(first.to_string()),
        last_name: Set(last.to_string()),
        gender: Set(gender.to_string()),
        hire_date: Set(hired.to_string()),
        birth_date: Set(born.map(str::to_string)),
    });
    entity::Entity::insert_many(rows).exec(&db).await?;
    Ok(db)
}

async fn create_test_router() -> Result<Router> {
    let db = create_test_db().await?;
    let listings = Arc::new(EmployeeListings::new(&ListingDefaults::default())?);
    let sessions = Arc::new(DbSessions::replica_only(db));
    Ok(register_routes(Router::new(), listings, sessions))
}

fn uri(path: &str, query: &[(&str, &str)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let query: Vec<String> = query
        .iter()
        .map(|(k, v)| format!("{k}={}", urlencoding::encode(v)))
        .collect();
    format!("{path}?{}", query.join("&"))
}

async fn call(app: Router, uri: &str) -> Result<(StatusCode, Value)> {
    let resp = app
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&body)?))
}

fn ids(page: &Value) -> Vec<i64> {
    page["data"]
        .as_array()
        .map(|rows| rows.iter().filter_map(|r| r["empNo"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn default_listing_is_counted_and_sorted_desc() -> Result<()> {
    let app = create_test_router().await?;
    let (status, body) = call(app, "/employees").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 12);
    assert_eq!(body["currentPageNumber"], 1);
    assert_eq!(body["currentPageSize"], 10);
    assert_eq!(body["hasNext"], true);
    let ids = ids(&body);
    assert_eq!(ids.len(), 10);
    assert_eq!(ids[0], 10012);
    assert_eq!(body["data"][0]["fullName"], "Patricio Bridgland");
    Ok(())
}

#[tokio::test]
async fn filter_sort_and_page_together() -> Result<()> {
    let app = create_test_router().await?;
    let target = uri(
        "/employees",
        &[
            ("filter", r#"[{"field":"gdr","value":{"search":"M"}}]"#),
            ("sort", r#"[{"field":"id","type":"asc"}]"#),
            ("pagination", r#"{"page":2,"pageSize":4}"#),
        ],
    );
    let (status, body) = call(app, &target).await?;

    assert_eq!(status, StatusCode::OK);
    let page: Page<employees::EmployeeDto> = serde_json::from_value(body)?;
    assert_eq!(page.total_count, Some(6));
    assert!(!page.has_next);
    let ids: Vec<i32> = page.data.iter().map(|e| e.emp_no).collect();
    assert_eq!(ids, vec![10008, 10012]);
    assert!(page.data.iter().all(|e| e.gender == "M"));
    Ok(())
}

#[tokio::test]
async fn hire_date_range_in_unix_millis() -> Result<()> {
    let app = create_test_router().await?;
    // 1985-01-01T00:00:00Z .. 1985-12-31T00:00:00Z
    let target = uri(
        "/employees",
        &[
            (
                "filter",
                r#"[{"field":"hd","value":{"start":473385600000,"end":504835200000}}]"#,
            ),
            ("sort", r#"[{"field":"id","type":"asc"}]"#),
        ],
    );
    let (status, body) = call(app, &target).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![10002, 10009]);
    Ok(())
}

#[tokio::test]
async fn birth_date_presence_filter() -> Result<()> {
    let app = create_test_router().await?;
    let target = uri(
        "/employees",
        &[("filter", r#"[{"field":"bd","value":{"search":true}}]"#)],
    );
    let (status, body) = call(app, &target).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 7);
    assert!(body["data"]
        .as_array()
        .is_some_and(|rows| rows.iter().all(|r| r["birthDate"].is_string())));
    Ok(())
}

#[tokio::test]
async fn without_count_endpoint_omits_total() -> Result<()> {
    let app = create_test_router().await?;
    let target = uri(
        "/employees/without-count",
        &[("pagination", r#"{"page":1,"pageSize":5}"#)],
    );
    let (status, body) = call(app, &target).await?;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("totalCount").is_none());
    assert_eq!(body["hasNext"], true);
    assert_eq!(ids(&body), vec![10012, 10011, 10010, 10009, 10008]);
    Ok(())
}

#[tokio::test]
async fn unregistered_filter_is_a_conflict() -> Result<()> {
    let app = create_test_router().await?;
    let target = uri(
        "/employees",
        &[("filter", r#"[{"field":"zzz","value":{"search":"x"}}]"#)],
    );
    let (status, body) = call(app, &target).await?;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "FILTER_NOT_REGISTERED");
    assert_eq!(body["instance"], "/employees");
    assert!(body["detail"].as_str().is_some_and(|d| d.contains("zzz")));
    Ok(())
}

#[tokio::test]
async fn malformed_param_json_is_unprocessable() -> Result<()> {
    let app = create_test_router().await?;
    let target = uri("/employees", &[("sort", "not json")]);
    let (status, body) = call(app, &target).await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "LISTING_PARAM_INVALID_JSON");
    Ok(())
}

#[tokio::test]
async fn oversized_param_is_rejected_before_the_pipeline() -> Result<()> {
    let app = create_test_router().await?;
    let oversized = "x".repeat(9 * 1024);
    let target = uri("/employees", &[("filter", oversized.as_str())]);
    let (status, body) = call(app, &target).await?;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "LISTING_PARAM_TOO_LONG");
    Ok(())
}

#[tokio::test]
async fn handler_without_session_binder_fails_by_name() -> Result<()> {
    let listings = Arc::new(EmployeeListings::new(&ListingDefaults::default())?);
    let app = Router::new()
        .route("/employees", get(handlers::list_employees))
        .with_state(listings);

    let (status, body) = call(app, "/employees").await?;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "MISSING_DB_SESSION");
    Ok(())
}

#[tokio::test]
async fn hire_date_range_includes_its_start_day() -> Result<()> {
    let app = create_test_router().await?;
    // 1985-11-21T00:00:00Z .. 1985-11-22T00:00:00Z
    let target = uri(
        "/employees",
        &[(
            "filter",
            r#"[{"field":"hd","value":{"start":501379200000,"end":501465600000}}]"#,
        )],
    );
    let (status, body) = call(app, &target).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![10002]);
    Ok(())
}

#[tokio::test]
async fn null_search_on_a_required_column_matches_nothing() -> Result<()> {
    let app = create_test_router().await?;
    let target = uri(
        "/employees",
        &[("filter", r#"[{"field":"gdr","value":{"search":null}}]"#)],
    );
    let (status, body) = call(app, &target).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalCount"], 0);
    assert!(ids(&body).is_empty());
    Ok(())
}

#[tokio::test]
async fn oversized_integers_never_reach_the_database() -> Result<()> {
    let app = create_test_router().await?;
    let target = uri(
        "/employees",
        &[("pagination", r#"{"page":18446744073709551615,"pageSize":5}"#)],
    );
    let (status, body) = call(app, &target).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["currentPageNumber"], 1);
    assert_eq!(body["currentPageSize"], 10);

    let app = create_test_router().await?;
    let target = uri(
        "/employees",
        &[(
            "filter",
            r#"[{"field":"emp","value":{"list":[18446744073709551615]}}]"#,
        )],
    );
    let (status, body) = call(app, &target).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_FILTER_VALUE");
    Ok(())
}
