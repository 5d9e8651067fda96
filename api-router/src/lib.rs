#![allow(clippy::missing_docs_in_private_items)]

use api_state::ApiState;
use axum::{
    extract::FromRef,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use middleware_api_auth::api_auth;
use routes::{
    catalog::{get_aliases, get_ingredients, get_sections},
    liveness::live,
    readiness::ready,
    search::search_medications,
};

pub mod api_state;
pub mod error;
mod middleware_api_auth;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>(app_state: &ApiState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    // Public, unauthenticated endpoints (for k8s/systemd probes)
    let public = Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live));

    // Read endpoints behind the shared gateway key
    let protected = Router::new()
        .route("/search", post(search_medications))
        .route("/aliases", get(get_aliases))
        .route("/ingredients", get(get_ingredients))
        .route("/sections", get(get_sections))
        .route_layer(from_fn_with_state(app_state.clone(), api_auth));

    public.merge(protected)
}
