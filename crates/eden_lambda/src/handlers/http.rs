//! HTTP transport.
//!
//! | Method | Path | Parameters |
//! |---|---|---|
//! | GET | `/api/v1/create` | `name`, `image_uri`, optional `profile` |
//! | GET | `/api/v1/delete` | `name`, optional `profile` |
//! | GET | `/api/v1/list` | optional `profile` |

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use eden_core::contract::{QueryParameters, CREATE_RESOURCE, DELETE_RESOURCE, LIST_RESOURCE};
use eden_core::lifecycle::LifecycleManager;
use eden_core::provisioning::ProvisioningGateway;
use eden_core::registry::RegistryStore;
use tower_http::trace::TraceLayer;

pub fn router<S, G>(manager: Arc<LifecycleManager<S, G>>) -> Router
where
    S: RegistryStore + Send + Sync + 'static,
    G: ProvisioningGateway + Send + Sync + 'static,
{
    Router::new()
        .route(CREATE_RESOURCE, get(create_environment::<S, G>))
        .route(DELETE_RESOURCE, get(delete_environment::<S, G>))
        .route(LIST_RESOURCE, get(list_environments::<S, G>))
        .layer(TraceLayer::new_for_http())
        .with_state(manager)
}

/// GET /api/v1/create
async fn create_environment<S, G>(
    State(manager): State<Arc<LifecycleManager<S, G>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response
where
    S: RegistryStore,
    G: ProvisioningGateway,
{
    respond(&manager, CREATE_RESOURCE, params)
}

/// GET /api/v1/delete
async fn delete_environment<S, G>(
    State(manager): State<Arc<LifecycleManager<S, G>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response
where
    S: RegistryStore,
    G: ProvisioningGateway,
{
    respond(&manager, DELETE_RESOURCE, params)
}

/// GET /api/v1/list
async fn list_environments<S, G>(
    State(manager): State<Arc<LifecycleManager<S, G>>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response
where
    S: RegistryStore,
    G: ProvisioningGateway,
{
    respond(&manager, LIST_RESOURCE, params)
}

fn respond<S, G>(
    manager: &LifecycleManager<S, G>,
    resource: &str,
    params: HashMap<String, String>,
) -> Response
where
    S: RegistryStore,
    G: ProvisioningGateway,
{
    let parameters: QueryParameters = params
        .into_iter()
        .map(|(key, value)| (key, Some(value)))
        .collect();
    let envelope = manager.handle(resource, Some(&parameters));

    let status =
        StatusCode::from_u16(envelope.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        envelope.body_json(),
    )
        .into_response()
}
