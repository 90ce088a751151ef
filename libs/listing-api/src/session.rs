//! Request-scoped database sessions for listing handlers.
//!
//! The binder middleware attaches the process' [`DbSessions`] to each request;
//! handlers pull them out with the [`Sessions`] extractor. A handler mounted
//! without the binder is rejected with `MISSING_DB_SESSION` instead of
//! panicking.

use std::ops::Deref;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{request::Parts, Request},
    middleware::{from_fn_with_state, Next},
    response::Response,
    Router,
};
use listing_core::{Error, SessionRole};
use listing_db::DbSessions;

use crate::error::listing_error_to_problem;
use crate::problem::ProblemResponse;

/// Middleware that stores the sessions in `Request.extensions`.
pub async fn bind_sessions(
    State(sessions): State<Arc<DbSessions>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    req.extensions_mut().insert(sessions);
    next.run(req).await
}

/// Installs [`bind_sessions`] on every route of `router`.
pub fn with_sessions<S>(router: Router<S>, sessions: Arc<DbSessions>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(from_fn_with_state(sessions, bind_sessions))
}

#[derive(Debug, Clone)]
pub struct Sessions(pub Arc<DbSessions>);

impl Deref for Sessions {
    type Target = DbSessions;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for Sessions
where
    S: Send + Sync,
{
    type Rejection = ProblemResponse;

    #[allow(clippy::manual_async_fn)]
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl core::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        async move {
            parts
                .extensions
                .get::<Arc<DbSessions>>()
                .cloned()
                .map(Sessions)
                .ok_or_else(|| {
                    listing_error_to_problem(
                        &Error::MissingSession(SessionRole::Read),
                        parts.uri.path(),
                    )
                })
        }
    }
}
