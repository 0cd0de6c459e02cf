use crate::{
    http::{auth::require_auth, handlers as h},
    state::AppState,
};
use axum::{
    Router, middleware,
    routing::{get, head, post},
};

pub const API_ROOT: &str = "/api/yandex_smart_home/v1.0";

pub fn build(state: AppState) -> Router {
    let protocol = Router::new()
        .route(&format!("{API_ROOT}/user/devices"), get(h::devices))
        .route(&format!("{API_ROOT}/user/devices/query"), post(h::query))
        .route(&format!("{API_ROOT}/user/devices/action"), post(h::action))
        .route(&format!("{API_ROOT}/user/unlink"), post(h::unlink))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/healthz", get(h::healthz))
        .route(API_ROOT, head(h::probe))
        .merge(protocol)
        .with_state(state)
}
