use std::collections::HashMap;
use std::ops::Deref;

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use listing_core::params::{FILTER_PARAM, PAGINATION_PARAM, SORT_PARAM};
use listing_core::RequestParams;

use crate::problem::{bad_request, ProblemResponse};

/// Upper bound on the raw length of each listing parameter.
pub const MAX_PARAM_LEN: usize = 8 * 1024;

/// Collect the query string into [`RequestParams`], enforcing the per-parameter
/// budget. JSON decoding is left to the endpoint's parameter adapter.
pub async fn extract_listing_params<S>(
    parts: &mut Parts,
    state: &S,
) -> Result<RequestParams, ProblemResponse>
where
    S: Send + Sync,
{
    let Query(raw) = Query::<HashMap<String, String>>::from_request_parts(parts, state)
        .await
        .unwrap_or_else(|_| Query(HashMap::new()));

    for key in [FILTER_PARAM, SORT_PARAM, PAGINATION_PARAM] {
        if raw.get(key).is_some_and(|v| v.len() > MAX_PARAM_LEN) {
            let mut problem = bad_request(format!("{key} param too long"));
            problem.0.code = "LISTING_PARAM_TOO_LONG".to_string();
            problem.0.instance = parts.uri.path().to_string();
            return Err(problem);
        }
    }

    Ok(RequestParams::from(raw))
}

/// Axum extractor for listing parameters.
///   async fn list(ListingParams(params): ListingParams, /* ... */) { /* ... */ }
#[derive(Debug, Clone, Default)]
pub struct ListingParams(pub RequestParams);

impl ListingParams {
    #[inline]
    pub fn into_inner(self) -> RequestParams {
        self.0
    }
}

impl Deref for ListingParams {
    type Target = RequestParams;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ListingParams
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            let params = extract_listing_params(parts, state).await?;
            Ok(ListingParams(params))
        }
    }
}
