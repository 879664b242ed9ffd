//! `/v1/users` handlers.

use axum::extract::{FromRequestParts, Path, State};
use axum::http::header::LOCATION;
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use userapi_lib::{validate_user, Filters, Metadata, User, Validator};
use userapi_service_shared::{
    read_id_param, read_int, read_string, write_json, ApiError, AppState, Envelope, Field,
    HasSchema, QueryValues, Schema, StrictJson,
};

/// Columns clients may sort the list by, in both directions.
pub const SORT_SAFELIST: [&str; 10] = [
    "id",
    "name",
    "email",
    "created_at",
    "updated_at",
    "-id",
    "-name",
    "-email",
    "-created_at",
    "-updated_at",
];

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Body of `POST /v1/users`. Missing fields decode as empty and fail
/// validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateUserInput {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl HasSchema for CreateUserInput {
    fn schema() -> Schema {
        Schema::new([
            Field::string("name"),
            Field::string("email"),
            Field::string("password"),
        ])
    }
}

/// Body of `PUT`/`PATCH /v1/users/{id}`. Absent or `null` fields keep their
/// stored value.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl HasSchema for UpdateUserInput {
    fn schema() -> Schema {
        Schema::new([
            Field::string("name").nullable(),
            Field::string("email").nullable(),
            Field::string("password").nullable(),
        ])
    }
}

/// One page of the user list.
#[derive(Debug, Serialize)]
pub struct UserPage {
    pub records: Vec<User>,
    pub metadata: Metadata,
}

/// Positive user id from the `{id}` path segment; anything else is a 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound)?;
        Ok(UserId(read_id_param(&raw)?))
    }
}

fn ok_user(status: StatusCode, user: &User, headers: HeaderMap) -> Result<Response, ApiError> {
    write_json(status, &Envelope::new("user", user), headers).map_err(ApiError::internal)
}

fn ensure_valid(v: Validator) -> Result<(), ApiError> {
    if v.valid() {
        Ok(())
    } else {
        Err(ApiError::FailedValidation(v.into_errors()))
    }
}

/// `POST /v1/users`
pub async fn create_user(
    State(state): State<AppState>,
    StrictJson(input): StrictJson<CreateUserInput>,
) -> Result<Response, ApiError> {
    let mut user = User::new(input.name, input.email, input.password);

    let mut v = Validator::new();
    validate_user(&mut v, &user);
    ensure_valid(v)?;

    state.users().insert(&mut user)?;
    tracing::info!(user_id = user.id, "user created");

    let mut headers = HeaderMap::new();
    let location = HeaderValue::from_str(&format!("/v1/users/{}", user.id)).map_err(ApiError::internal)?;
    headers.insert(LOCATION, location);

    ok_user(StatusCode::CREATED, &user, headers)
}

/// `GET /v1/users/{id}`
pub async fn show_user(State(state): State<AppState>, UserId(id): UserId) -> Result<Response, ApiError> {
    let user = state.users().get(id)?;
    ok_user(StatusCode::OK, &user, HeaderMap::new())
}

/// `PUT`/`PATCH /v1/users/{id}`
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    StrictJson(input): StrictJson<UpdateUserInput>,
) -> Result<Response, ApiError> {
    let mut user = state.users().get(id)?;

    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    if let Some(password) = input.password {
        user.password.set(password);
    }

    let mut v = Validator::new();
    validate_user(&mut v, &user);
    ensure_valid(v)?;

    state.users().update(&mut user)?;
    tracing::info!(user_id = user.id, "user updated");

    ok_user(StatusCode::OK, &user, HeaderMap::new())
}

/// `DELETE /v1/users/{id}`
pub async fn delete_user(State(state): State<AppState>, UserId(id): UserId) -> Result<Response, ApiError> {
    state.users().delete(id)?;
    tracing::info!(user_id = id, "user deleted");
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// `GET /v1/users?name=&email=&page=&page_size=&sort=`
pub async fn list_users(State(state): State<AppState>, qs: QueryValues) -> Result<Response, ApiError> {
    let mut v = Validator::new();

    let name = read_string(&qs, "name", "");
    let email = read_string(&qs, "email", "");
    let filters = Filters {
        page: read_int(&qs, "page", 1, &mut v),
        page_size: read_int(&qs, "page_size", DEFAULT_PAGE_SIZE, &mut v),
        sort: read_string(&qs, "sort", "id"),
        sort_safelist: SORT_SAFELIST.iter().map(|s| s.to_string()).collect(),
    };

    filters.validate(&mut v);
    ensure_valid(v)?;

    let (records, metadata) = state.users().get_all(&email, &name, &filters)?;

    write_json(
        StatusCode::OK,
        &Envelope::new("users", UserPage { records, metadata }),
        HeaderMap::new(),
    )
    .map_err(ApiError::internal)
}
