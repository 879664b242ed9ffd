//! User management HTTP service.
//!
//! # Endpoints
//!
//! - `GET /v1/healthcheck` - Service status, environment and version
//! - `GET /v1/users` - Filtered, sorted, paginated user list
//! - `POST /v1/users` - Create a user
//! - `GET /v1/users/{id}` - Fetch a user
//! - `PUT|PATCH /v1/users/{id}` - Partially update a user
//! - `DELETE /v1/users/{id}` - Delete a user
//!
//! Unknown paths answer 404 and known paths with the wrong method answer 405,
//! both as JSON error envelopes. A panicking handler is answered with the
//! generic 500 envelope and does not take the server down.

#![deny(warnings)]

pub mod users;

use std::any::Any;

use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;

use userapi_service_shared::{healthcheck, ApiError, AppState, RequestTraceLayer};

/// Route table without fallbacks or middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/healthcheck", get(healthcheck))
        .route("/v1/users", get(users::list_users).post(users::create_user))
        .route(
            "/v1/users/{id}",
            get(users::show_user)
                .put(users::update_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
}

/// Add JSON fallbacks, panic recovery and request tracing to `routes`.
pub fn finish(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(RequestTraceLayer)
        .with_state(state)
}

/// The complete service.
pub fn router(state: AppState) -> Router {
    finish(routes(), state)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed(method: Method) -> ApiError {
    ApiError::MethodNotAllowed(method)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::internal(format!("handler panicked: {detail}")).into_response()
}
