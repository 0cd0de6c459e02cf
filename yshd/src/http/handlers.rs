use crate::{http::auth::AuthenticatedUser, state::AppState};
use axum::{
    Json,
    extract::{Extension, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use metrics::counter;
use uuid::Uuid;
use ysh_core::{
    dispatch::{PATH_ACTION, PATH_DEVICES, PATH_QUERY, PATH_UNLINK},
    protocol::{ActionStatus, Payload},
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";
/// Stand-in user for diagnostics requests that carry no credentials.
pub const DIAGNOSTICS_USER: &str = "999999";

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn probe() -> impl IntoResponse {
    StatusCode::OK
}

pub async fn devices(
    State(app): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    headers: HeaderMap,
) -> Response {
    respond(&app, PATH_DEVICES, user, &headers, "").await
}

pub async fn query(
    State(app): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    respond(&app, PATH_QUERY, user, &headers, &body).await
}

pub async fn action(
    State(app): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    respond(&app, PATH_ACTION, user, &headers, &body).await
}

pub async fn unlink(
    State(app): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    headers: HeaderMap,
) -> Response {
    respond(&app, PATH_UNLINK, user, &headers, "").await
}

async fn respond(
    app: &AppState,
    path: &'static str,
    user: Option<Extension<AuthenticatedUser>>,
    headers: &HeaderMap,
    body: &str,
) -> Response {
    counter!("ysh.requests", "path" => path).increment(1);

    let request_id = match headers.get(REQUEST_ID_HEADER).and_then(|v| v.to_str().ok()) {
        Some(id) if !id.is_empty() => id.to_string(),
        _ if app.diagnostics => Uuid::new_v4().to_string().to_uppercase(),
        _ => return (StatusCode::BAD_REQUEST, "missing X-Request-Id").into_response(),
    };

    let user_id = match &user {
        Some(Extension(user)) => user.label(),
        None if app.diagnostics => DIAGNOSTICS_USER,
        None => "anonymous",
    };

    tracing::debug!(path, request_id = %request_id, user = %user_id, "handling request");
    let envelope = app.smart_home.handle_message(path, user_id, &request_id, body).await;

    if let Some(Payload::Action(result)) = &envelope.payload {
        let failed = result
            .devices
            .iter()
            .flat_map(|d| d.capabilities.iter().flatten())
            .filter(|c| c.state.action_result.status == ActionStatus::Error)
            .count();
        counter!("ysh.action.errors").increment(failed as u64);
    }

    Json(envelope).into_response()
}
